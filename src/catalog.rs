use sea_orm::{ConnectionTrait, DatabaseConnection, FromQueryResult, Statement, Value};
use tracing::debug;

use crate::{
    error::{AppError, AppResult},
    models::{Genre, Movie, MovieDetails, MovieSummary, Rating},
};

pub const PAGE_SIZE: u64 = 50;
pub const ALL_MOVIES_LIMIT: u64 = 100;

const MOVIE_COLUMNS: &str = "movieId AS movie_id, imdbId AS imdb_id, title, overview, \
     productionCompanies AS production_companies, releaseDate AS release_date, \
     CAST(budget AS REAL) AS budget, CAST(revenue AS REAL) AS revenue, \
     CAST(runtime AS REAL) AS runtime, language, genres, status";

const SUMMARY_COLUMNS: &str = "imdbId AS imdb_id, title, genres, releaseDate AS release_date, \
     CAST(budget AS REAL) AS budget";

const DETAILS_COLUMNS: &str = "imdbId AS imdb_id, title, overview AS description, \
     releaseDate AS release_date, CAST(budget AS REAL) AS budget, \
     CAST(runtime AS REAL) AS runtime, genres, language AS original_language, \
     productionCompanies AS production_companies";

const RATING_COLUMNS: &str =
    "userId AS user_id, movieId AS movie_id, CAST(rating AS REAL) AS rating, timestamp";

// A genres column that is not valid JSON is treated as an empty list.
const GENRE_SOURCE: &str =
    "json_each(CASE WHEN json_valid(m.genres) THEN m.genres ELSE '[]' END)";

// Entries that are not objects (bare strings, numbers) have no id or name.
const GENRE_ID: &str =
    "CASE WHEN g.type = 'object' THEN CAST(json_extract(g.value, '$.id') AS INTEGER) END";
const GENRE_NAME: &str =
    "CASE WHEN g.type = 'object' THEN CAST(json_extract(g.value, '$.name') AS TEXT) END";

#[derive(Debug, FromQueryResult)]
struct CountRow {
    count: i64,
}

#[derive(Debug, FromQueryResult)]
struct AverageRow {
    average: Option<f64>,
}

/// Read access to the movies and ratings datasets. Cloning is cheap; both
/// handles are connection pools.
#[derive(Clone)]
pub struct Catalog {
    movies: DatabaseConnection,
    ratings: DatabaseConnection,
}

impl Catalog {
    pub fn new(movies: DatabaseConnection, ratings: DatabaseConnection) -> Self {
        Self { movies, ratings }
    }

    pub async fn all_movies(&self) -> AppResult<Vec<Movie>> {
        let sql = format!("SELECT {MOVIE_COLUMNS} FROM movies LIMIT ?");
        let stmt = self.movies_stmt(&sql, vec![limit_value(ALL_MOVIES_LIMIT)]);
        let rows = Movie::find_by_statement(stmt).all(&self.movies).await?;

        debug!(rows = rows.len(), "loaded movies");
        non_empty(rows, "No movies found")
    }

    pub async fn movie(&self, movie_id: &str) -> AppResult<Vec<Movie>> {
        let movie_id = required("movieId", movie_id)?;
        let sql = format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE movieId = ?");
        let stmt = self.movies_stmt(&sql, vec![Value::from(movie_id)]);
        let rows = Movie::find_by_statement(stmt).all(&self.movies).await?;

        debug!(movie_id = %movie_id, rows = rows.len(), "loaded movie");
        non_empty(rows, "Movie not found")
    }

    /// Returns one page of movie summaries together with the total number of
    /// movies in the dataset.
    pub async fn movies_page(&self, page: u32) -> AppResult<(Vec<MovieSummary>, u64)> {
        let total = CountRow::find_by_statement(
            self.movies_stmt("SELECT COUNT(*) AS count FROM movies", vec![]),
        )
        .one(&self.movies)
        .await?
        .map(|row| u64::try_from(row.count).unwrap_or(0))
        .unwrap_or(0);

        let sql = format!("SELECT {SUMMARY_COLUMNS} FROM movies LIMIT ? OFFSET ?");
        let stmt = self.movies_stmt(&sql, window(page).to_vec());
        let rows = MovieSummary::find_by_statement(stmt).all(&self.movies).await?;

        debug!(page, total, rows = rows.len(), "loaded movie page");
        Ok((rows, total))
    }

    /// Reads the movie from the movies dataset, then its rounded average from
    /// the ratings dataset. An unknown movie yields an empty list.
    pub async fn movie_details_with_ratings(
        &self,
        movie_id: &str,
    ) -> AppResult<Vec<MovieDetails>> {
        let movie_id = required("movieId", movie_id)?;
        let sql = format!("SELECT {DETAILS_COLUMNS} FROM movies WHERE movieId = ?");
        let stmt = self.movies_stmt(&sql, vec![Value::from(movie_id)]);
        let mut rows = MovieDetails::find_by_statement(stmt).all(&self.movies).await?;

        if rows.is_empty() {
            debug!(movie_id = %movie_id, "no movie for details");
            return Ok(rows);
        }

        let average = self.rounded_average(movie_id).await?;
        for row in &mut rows {
            row.average_rating = average;
        }

        debug!(movie_id = %movie_id, average = ?average, "loaded movie details");
        Ok(rows)
    }

    pub async fn movies_by_year(&self, year: &str, page: u32) -> AppResult<Vec<Movie>> {
        let year = required("year", year)?;
        if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
            return Err(AppError::Validation("year must be a 4-digit year".to_string()));
        }

        let sql = format!(
            "SELECT {MOVIE_COLUMNS} FROM movies \
             WHERE substr(releaseDate, 1, 4) = ? \
             LIMIT ? OFFSET ?"
        );
        let [limit, offset] = window(page);
        let stmt = self.movies_stmt(&sql, vec![Value::from(year), limit, offset]);
        let rows = Movie::find_by_statement(stmt).all(&self.movies).await?;

        debug!(year = %year, page, rows = rows.len(), "loaded movies by year");
        Ok(rows)
    }

    /// Case-sensitive match on the `name` of any entry in the genres array.
    pub async fn movies_by_genre(&self, genre: &str, page: u32) -> AppResult<Vec<Movie>> {
        let genre = required("genre", genre)?;

        let sql = format!(
            "SELECT {MOVIE_COLUMNS} FROM movies m \
             WHERE EXISTS (SELECT 1 FROM {GENRE_SOURCE} g \
                           WHERE {GENRE_NAME} = ?) \
             LIMIT ? OFFSET ?"
        );
        let [limit, offset] = window(page);
        let stmt = self.movies_stmt(&sql, vec![Value::from(genre), limit, offset]);
        let rows = Movie::find_by_statement(stmt).all(&self.movies).await?;

        debug!(genre = %genre, page, rows = rows.len(), "loaded movies by genre");
        Ok(rows)
    }

    pub async fn ratings(&self, movie_id: &str) -> AppResult<Vec<Rating>> {
        let movie_id = required("movieId", movie_id)?;
        let sql = format!("SELECT {RATING_COLUMNS} FROM ratings WHERE movieId = ?");
        let stmt = self.ratings_stmt(&sql, vec![Value::from(movie_id)]);
        let rows = Rating::find_by_statement(stmt).all(&self.ratings).await?;

        debug!(movie_id = %movie_id, rows = rows.len(), "loaded ratings");
        non_empty(rows, "No ratings found")
    }

    /// The average over an empty set is NULL, which is reported as not found.
    pub async fn average_rating(&self, movie_id: &str) -> AppResult<f64> {
        let movie_id = required("movieId", movie_id)?;
        self.rounded_average(movie_id).await?.ok_or(AppError::NotFound("No ratings found"))
    }

    pub async fn genres(&self) -> AppResult<Vec<Genre>> {
        let sql = format!(
            "SELECT DISTINCT {GENRE_ID} AS id, {GENRE_NAME} AS name \
             FROM movies m, {GENRE_SOURCE} g \
             WHERE {GENRE_NAME} IS NOT NULL \
             ORDER BY 2, 1"
        );
        let stmt = self.movies_stmt(&sql, vec![]);
        let rows = Genre::find_by_statement(stmt).all(&self.movies).await?;

        debug!(rows = rows.len(), "loaded genres");
        Ok(rows)
    }

    async fn rounded_average(&self, movie_id: &str) -> AppResult<Option<f64>> {
        let row = AverageRow::find_by_statement(self.ratings_stmt(
            "SELECT ROUND(AVG(CAST(rating AS REAL)), 2) AS average FROM ratings WHERE movieId = ?",
            vec![Value::from(movie_id)],
        ))
        .one(&self.ratings)
        .await?;

        Ok(row.and_then(|r| r.average))
    }

    fn movies_stmt(&self, sql: &str, values: Vec<Value>) -> Statement {
        Statement::from_sql_and_values(self.movies.get_database_backend(), sql, values)
    }

    fn ratings_stmt(&self, sql: &str, values: Vec<Value>) -> Statement {
        Statement::from_sql_and_values(self.ratings.get_database_backend(), sql, values)
    }
}

/// `LIMIT` and `OFFSET` bind values for a 1-based page of `PAGE_SIZE` rows.
fn window(page: u32) -> [Value; 2] {
    let offset = u64::from(page.max(1) - 1) * PAGE_SIZE;
    [limit_value(PAGE_SIZE), limit_value(offset)]
}

fn limit_value(n: u64) -> Value {
    i64::try_from(n).unwrap_or(i64::MAX).into()
}

fn required<'a>(name: &str, value: &'a str) -> AppResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{name} is required")));
    }
    Ok(value)
}

fn non_empty<T>(rows: Vec<T>, what: &'static str) -> AppResult<Vec<T>> {
    if rows.is_empty() {
        return Err(AppError::NotFound(what));
    }
    Ok(rows)
}
