pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod models;
pub mod routes;

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use axum::{Router, http::StatusCode, routing::get};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{catalog::Catalog, config::Config};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Catalog,
}

impl AppState {
    /// Opens both datasets read-only.
    pub async fn connect(config: Arc<Config>) -> anyhow::Result<Self> {
        let movies = db::connect_read_only(&config.movies_database_url, config.max_connections)
            .await
            .context("opening movies dataset")?;
        let ratings = db::connect_read_only(&config.ratings_database_url, config.max_connections)
            .await
            .context("opening ratings dataset")?;

        Ok(Self { config, catalog: Catalog::new(movies, ratings) })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let request_timeout = state.config.request_timeout;

    let routes = Router::new()
        .route("/", get(routes::index))
        .route("/heartbeat", get(routes::heartbeat))
        .route("/genres/all", get(routes::genres))
        .route("/ratings/{movie_id}", get(routes::ratings))
        .route("/ratings/{movie_id}/average", get(routes::average_rating))
        .route("/movies/all", get(routes::all_movies))
        .route("/movies/{movie_id}", get(routes::movie))
        .route("/moviesByPage", get(routes::movies_by_page))
        .route("/movieDetailsWithRatings/{movie_id}", get(routes::movie_details_with_ratings))
        .route("/moviesByYear/", get(routes::missing_year))
        .route("/moviesByYear/{year}", get(routes::movies_by_year))
        .route("/moviesByGenre/", get(routes::missing_genre))
        .route("/moviesByGenre/{genre}", get(routes::movies_by_genre))
        .with_state(state);

    with_middleware(routes, request_timeout)
}

/// Tracing, permissive CORS, and a deadline that answers 408 once
/// `request_timeout` elapses.
pub fn with_middleware(router: Router, request_timeout: Duration) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
            .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, request_timeout)),
    )
}
