//! Shared fixtures: both datasets are built in a temp dir through a writable
//! connection, then reopened read-only the same way the server opens them.

#![allow(dead_code)]

use std::{path::Path, sync::Arc, time::Duration};

use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use http_body_util::BodyExt;
use movies_api::{AppState, catalog::Catalog, config::Config};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbBackend, Statement, Value};
use tempfile::TempDir;
use tower::ServiceExt;

/// Number of filler movies released in 1980, all tagged `Documentary`.
pub const FILLER_MOVIES: i64 = 120;
/// Hand-written movies plus filler.
pub const TOTAL_MOVIES: u64 = SAMPLE_MOVIES.len() as u64 + FILLER_MOVIES as u64;

const MOVIES_SCHEMA: &str = "CREATE TABLE movies (
    movieId INTEGER,
    imdbId TEXT,
    title TEXT,
    overview TEXT,
    productionCompanies TEXT,
    releaseDate TEXT,
    budget INTEGER,
    revenue INTEGER,
    runtime REAL,
    language TEXT,
    genres TEXT,
    status TEXT
)";

const RATINGS_SCHEMA: &str = "CREATE TABLE ratings (
    ratingId INTEGER PRIMARY KEY,
    userId INTEGER,
    movieId INTEGER,
    rating REAL,
    timestamp INTEGER
)";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Seed {
    /// Schema plus the sample movies and ratings.
    Full,
    /// Schema with no rows.
    Empty,
    /// Valid database files without any tables, so every query fails.
    NoTables,
}

pub struct Fixture {
    _dir: TempDir,
    pub state: Arc<AppState>,
}

impl Fixture {
    pub async fn new(seed: Seed) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let movies_path = dir.path().join("movies.db");
        let ratings_path = dir.path().join("ratings.db");

        build_movies(&movies_path, seed).await;
        build_ratings(&ratings_path, seed).await;

        let config = Arc::new(Config {
            addr: "127.0.0.1:0".parse().unwrap(),
            movies_database_url: read_only_url(&movies_path),
            ratings_database_url: read_only_url(&ratings_path),
            max_connections: 4,
            request_timeout: Duration::from_secs(10),
        });
        let state = Arc::new(AppState::connect(config).await.unwrap());

        Self { _dir: dir, state }
    }

    pub async fn seeded() -> Self {
        Self::new(Seed::Full).await
    }

    pub fn catalog(&self) -> &Catalog {
        &self.state.catalog
    }

    pub fn app(&self) -> Router {
        movies_api::router(self.state.clone())
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn read_only_url(path: &Path) -> String {
    format!("sqlite://{}?mode=ro", path.display())
}

async fn open_writable(path: &Path) -> DatabaseConnection {
    let db = Database::connect(format!("sqlite://{}?mode=rwc", path.display())).await.unwrap();
    db.execute_unprepared("PRAGMA user_version = 1").await.unwrap();
    db
}

async fn insert(db: &DatabaseConnection, sql: &str, values: Vec<Value>) {
    db.execute(Statement::from_sql_and_values(DbBackend::Sqlite, sql, values)).await.unwrap();
}

struct SampleMovie {
    id: Option<i64>,
    imdb_id: &'static str,
    title: &'static str,
    release_date: &'static str,
    budget: Option<f64>,
    runtime: f64,
    language: &'static str,
    genres: &'static str,
}

const SAMPLE_MOVIES: [SampleMovie; 8] = [
    SampleMovie {
        id: Some(1),
        imdb_id: "tt0114709",
        title: "Toy Story",
        release_date: "1995-10-30",
        budget: Some(1_000_000.0),
        runtime: 81.0,
        language: "en",
        genres: r#"[{"id": 16, "name": "Animation"}, {"id": 35, "name": "Comedy"}]"#,
    },
    SampleMovie {
        id: Some(2),
        imdb_id: "tt0113497",
        title: "Jumanji",
        release_date: "1995-12-15",
        budget: Some(65_000_000.0),
        runtime: 104.0,
        language: "en",
        genres: r#"[{"id": 12, "name": "Adventure"}, {"id": 14, "name": "Fantasy"}]"#,
    },
    SampleMovie {
        id: Some(3),
        imdb_id: "tt0133093",
        title: "The Matrix",
        release_date: "1999-03-30",
        budget: Some(63_000_000.0),
        runtime: 136.0,
        language: "en",
        genres: r#"[{"id": 28, "name": "Action"}, {"id": 878, "name": "Science Fiction"}]"#,
    },
    SampleMovie {
        id: Some(4),
        imdb_id: "tt0137523",
        title: "Fight Club",
        release_date: "1999-10-15",
        budget: Some(63_000_000.0),
        runtime: 139.0,
        language: "en",
        genres: r#"[{"id": 18, "name": "Drama"}, {"id": 18, "name": "Drama"}]"#,
    },
    SampleMovie {
        id: Some(5),
        imdb_id: "tt0245429",
        title: "Spirited Away",
        release_date: "2001-07-20",
        budget: None,
        runtime: 125.0,
        language: "ja",
        genres: "not json",
    },
    SampleMovie {
        id: Some(6),
        imdb_id: "tt0110912",
        title: "Pulp Fiction",
        release_date: "1994-09-10",
        budget: Some(8_000_000.0),
        runtime: 154.0,
        language: "en",
        genres: r#"[{"id": 53, "name": "Thriller"}, {"id": 80, "name": "Crime"}]"#,
    },
    // Fractional budget, and a genres array of bare strings instead of objects.
    SampleMovie {
        id: Some(7),
        imdb_id: "tt0364569",
        title: "Oldboy",
        release_date: "2003-11-21",
        budget: Some(1_500_000.75),
        runtime: 120.0,
        language: "ko",
        genres: r#"["Drama", "Comedy"]"#,
    },
    // Imported without an id.
    SampleMovie {
        id: None,
        imdb_id: "tt1375666",
        title: "Inception",
        release_date: "2010-07-16",
        budget: Some(160_000_000.0),
        runtime: 148.0,
        language: "en",
        genres: "",
    },
];

const INSERT_MOVIE: &str = "INSERT INTO movies \
    (movieId, imdbId, title, overview, productionCompanies, releaseDate, budget, revenue, \
     runtime, language, genres, status) \
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

async fn build_movies(path: &Path, seed: Seed) {
    let db = open_writable(path).await;
    if seed == Seed::NoTables {
        db.close().await.unwrap();
        return;
    }

    db.execute_unprepared(MOVIES_SCHEMA).await.unwrap();

    if seed == Seed::Full {
        for m in &SAMPLE_MOVIES {
            insert(
                &db,
                INSERT_MOVIE,
                vec![
                    m.id.into(),
                    m.imdb_id.into(),
                    m.title.into(),
                    format!("Overview of {}", m.title).into(),
                    r#"[{"name": "Some Studio"}]"#.into(),
                    m.release_date.into(),
                    m.budget.into(),
                    Value::from(0i64),
                    m.runtime.into(),
                    m.language.into(),
                    m.genres.into(),
                    "Released".into(),
                ],
            )
            .await;
        }

        for i in 0..FILLER_MOVIES {
            let id = 1000 + i;
            insert(
                &db,
                INSERT_MOVIE,
                vec![
                    id.into(),
                    format!("tt9{id:06}").into(),
                    format!("Filler {id}").into(),
                    Value::String(None),
                    Value::String(None),
                    "1980-01-01".into(),
                    Value::from(i * 1_000),
                    Value::BigInt(None),
                    Value::Double(None),
                    "en".into(),
                    r#"[{"id": 99, "name": "Documentary"}]"#.into(),
                    "Released".into(),
                ],
            )
            .await;
        }
    }

    db.close().await.unwrap();
}

/// Ratings per movie id. Movie 2 has none; movie 6 has one with no score.
pub const SAMPLE_RATINGS: [(i64, i64, Option<f64>); 6] = [
    (1, 1, Some(4.0)),
    (2, 1, Some(3.5)),
    (3, 1, Some(5.0)),
    (1, 3, Some(2.0)),
    (4, 3, Some(3.0)),
    (5, 6, None),
];

async fn build_ratings(path: &Path, seed: Seed) {
    let db = open_writable(path).await;
    if seed == Seed::NoTables {
        db.close().await.unwrap();
        return;
    }

    db.execute_unprepared(RATINGS_SCHEMA).await.unwrap();

    if seed == Seed::Full {
        for (i, (user_id, movie_id, rating)) in SAMPLE_RATINGS.iter().enumerate() {
            insert(
                &db,
                "INSERT INTO ratings (userId, movieId, rating, timestamp) VALUES (?, ?, ?, ?)",
                vec![
                    (*user_id).into(),
                    (*movie_id).into(),
                    (*rating).into(),
                    Value::from(1_260_759_144i64 + i as i64),
                ],
            )
            .await;
        }
    }

    db.close().await.unwrap();
}
