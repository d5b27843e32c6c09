use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::{
    AppState,
    catalog::PAGE_SIZE,
    error::{AppError, AppResult},
    format::FormatBudget,
    models::{
        AverageRating, DetailsResponse, FilteredPage, Genre, Movie, MovieDetails, MovieSummary,
        MoviesPage, PageQuery, Rating,
    },
};

pub async fn index() -> &'static str {
    "Welcome to the movie API!"
}

pub async fn heartbeat() -> &'static str {
    "Have fun with the project!"
}

pub async fn genres(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Genre>>> {
    Ok(Json(state.catalog.genres().await?))
}

pub async fn ratings(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<String>,
) -> AppResult<Json<Vec<Rating>>> {
    Ok(Json(state.catalog.ratings(&movie_id).await?))
}

pub async fn average_rating(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<String>,
) -> AppResult<Json<AverageRating>> {
    let average_rating = state.catalog.average_rating(&movie_id).await?;
    Ok(Json(AverageRating { movie_id: movie_id.trim().to_string(), average_rating }))
}

pub async fn all_movies(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Movie>>> {
    Ok(Json(state.catalog.all_movies().await?))
}

pub async fn movie(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<String>,
) -> AppResult<Json<Vec<Movie>>> {
    Ok(Json(state.catalog.movie(&movie_id).await?))
}

pub async fn movies_by_page(
    State(state): State<Arc<AppState>>,
    Query(q): Query<PageQuery>,
) -> AppResult<Json<MoviesPage<MovieSummary<String>>>> {
    let page = q.page();
    let (movies, total_movies) = state.catalog.movies_page(page).await?;

    Ok(Json(MoviesPage {
        page,
        page_size: PAGE_SIZE,
        total_pages: total_movies.div_ceil(PAGE_SIZE),
        total_movies,
        movies: movies.format_budget(),
    }))
}

pub async fn movie_details_with_ratings(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<String>,
) -> AppResult<Json<DetailsResponse<MovieDetails<String>>>> {
    let movies = state.catalog.movie_details_with_ratings(&movie_id).await?;
    Ok(Json(DetailsResponse { movies: movies.format_budget() }))
}

pub async fn movies_by_year(
    State(state): State<Arc<AppState>>,
    Path(year): Path<String>,
    Query(q): Query<PageQuery>,
) -> AppResult<Json<FilteredPage<Movie<String>>>> {
    let page = q.page();
    let movies = state.catalog.movies_by_year(&year, page).await?;
    Ok(Json(FilteredPage { page, page_size: PAGE_SIZE, movies: movies.format_budget() }))
}

pub async fn movies_by_genre(
    State(state): State<Arc<AppState>>,
    Path(genre): Path<String>,
    Query(q): Query<PageQuery>,
) -> AppResult<Json<FilteredPage<Movie<String>>>> {
    let page = q.page();
    let movies = state.catalog.movies_by_genre(&genre, page).await?;
    Ok(Json(FilteredPage { page, page_size: PAGE_SIZE, movies: movies.format_budget() }))
}

/// `/moviesByYear/` with nothing after the slash.
pub async fn missing_year() -> AppError {
    AppError::Validation("year is required".to_string())
}

/// `/moviesByGenre/` with nothing after the slash.
pub async fn missing_genre() -> AppError {
    AppError::Validation("genre is required".to_string())
}
