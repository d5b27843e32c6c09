use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use sea_orm::{DbErr, FromQueryResult, QueryResult};
use serde::{Deserialize, Serialize, Serializer};

/// A numeric column read as stored. Serializes as a JSON integer when the value
/// is whole and as a float otherwise, so `1000000` stays `1000000` and
/// `1500000.75` keeps its cents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Numeric(pub Decimal);

impl Numeric {
    pub fn from_f64(value: f64) -> Option<Self> {
        Decimal::from_f64(value).map(Self)
    }
}

impl From<i64> for Numeric {
    fn from(value: i64) -> Self {
        Self(Decimal::from(value))
    }
}

impl Serialize for Numeric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.fract().is_zero() {
            if let Some(whole) = self.0.to_i64() {
                return serializer.serialize_i64(whole);
            }
        }
        serializer.serialize_f64(self.0.to_f64().unwrap_or_default())
    }
}

fn numeric(res: &QueryResult, pre: &str, col: &str) -> Result<Option<Numeric>, DbErr> {
    Ok(res.try_get::<Option<f64>>(pre, col)?.and_then(Numeric::from_f64))
}

/// Raw budget as stored in the movies dataset, in US dollars.
pub type RawBudget = Option<Numeric>;

/// A full movie row. `B` is the budget representation: the raw number as read
/// from the store, or a formatted currency string.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie<B = RawBudget> {
    pub movie_id: Option<i64>,
    pub imdb_id: Option<String>,
    pub title: Option<String>,
    pub overview: Option<String>,
    pub production_companies: Option<String>,
    pub release_date: Option<String>,
    pub budget: B,
    pub revenue: Option<Numeric>,
    pub runtime: Option<Numeric>,
    pub language: Option<String>,
    pub genres: Option<String>,
    pub status: Option<String>,
}

impl FromQueryResult for Movie {
    fn from_query_result(res: &QueryResult, pre: &str) -> Result<Self, DbErr> {
        Ok(Self {
            movie_id: res.try_get(pre, "movie_id")?,
            imdb_id: res.try_get(pre, "imdb_id")?,
            title: res.try_get(pre, "title")?,
            overview: res.try_get(pre, "overview")?,
            production_companies: res.try_get(pre, "production_companies")?,
            release_date: res.try_get(pre, "release_date")?,
            budget: numeric(res, pre, "budget")?,
            revenue: numeric(res, pre, "revenue")?,
            runtime: numeric(res, pre, "runtime")?,
            language: res.try_get(pre, "language")?,
            genres: res.try_get(pre, "genres")?,
            status: res.try_get(pre, "status")?,
        })
    }
}

impl<B> Movie<B> {
    pub fn map_budget<C>(self, f: impl FnOnce(B) -> C) -> Movie<C> {
        Movie {
            movie_id: self.movie_id,
            imdb_id: self.imdb_id,
            title: self.title,
            overview: self.overview,
            production_companies: self.production_companies,
            release_date: self.release_date,
            budget: f(self.budget),
            revenue: self.revenue,
            runtime: self.runtime,
            language: self.language,
            genres: self.genres,
            status: self.status,
        }
    }
}

/// The fixed projection served by `/moviesByPage`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieSummary<B = RawBudget> {
    pub imdb_id: Option<String>,
    pub title: Option<String>,
    pub genres: Option<String>,
    pub release_date: Option<String>,
    pub budget: B,
}

impl FromQueryResult for MovieSummary {
    fn from_query_result(res: &QueryResult, pre: &str) -> Result<Self, DbErr> {
        Ok(Self {
            imdb_id: res.try_get(pre, "imdb_id")?,
            title: res.try_get(pre, "title")?,
            genres: res.try_get(pre, "genres")?,
            release_date: res.try_get(pre, "release_date")?,
            budget: numeric(res, pre, "budget")?,
        })
    }
}

impl<B> MovieSummary<B> {
    pub fn map_budget<C>(self, f: impl FnOnce(B) -> C) -> MovieSummary<C> {
        MovieSummary {
            imdb_id: self.imdb_id,
            title: self.title,
            genres: self.genres,
            release_date: self.release_date,
            budget: f(self.budget),
        }
    }
}

/// A movie joined with its aggregate rating from the ratings dataset.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDetails<B = RawBudget> {
    pub imdb_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub release_date: Option<String>,
    pub budget: B,
    pub runtime: Option<Numeric>,
    pub genres: Option<String>,
    #[serde(rename = "original_Language")]
    pub original_language: Option<String>,
    pub production_companies: Option<String>,
    #[serde(rename = "average_rating")]
    pub average_rating: Option<f64>,
}

// `average_rating` lives in the other dataset and is attached after the read.
impl FromQueryResult for MovieDetails {
    fn from_query_result(res: &QueryResult, pre: &str) -> Result<Self, DbErr> {
        Ok(Self {
            imdb_id: res.try_get(pre, "imdb_id")?,
            title: res.try_get(pre, "title")?,
            description: res.try_get(pre, "description")?,
            release_date: res.try_get(pre, "release_date")?,
            budget: numeric(res, pre, "budget")?,
            runtime: numeric(res, pre, "runtime")?,
            genres: res.try_get(pre, "genres")?,
            original_language: res.try_get(pre, "original_language")?,
            production_companies: res.try_get(pre, "production_companies")?,
            average_rating: None,
        })
    }
}

impl<B> MovieDetails<B> {
    pub fn map_budget<C>(self, f: impl FnOnce(B) -> C) -> MovieDetails<C> {
        MovieDetails {
            imdb_id: self.imdb_id,
            title: self.title,
            description: self.description,
            release_date: self.release_date,
            budget: f(self.budget),
            runtime: self.runtime,
            genres: self.genres,
            original_language: self.original_language,
            production_companies: self.production_companies,
            average_rating: self.average_rating,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, FromQueryResult)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub user_id: Option<i64>,
    pub movie_id: Option<i64>,
    pub rating: Option<f64>,
    pub timestamp: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AverageRating {
    #[serde(rename = "movieId")]
    pub movie_id: String,
    pub average_rating: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct Genre {
    pub id: Option<i64>,
    pub name: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoviesPage<T> {
    pub page: u32,
    pub page_size: u64,
    pub total_pages: u64,
    pub total_movies: u64,
    pub movies: Vec<T>,
}

/// Page envelope for the year and genre filters, which do not count matches.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredPage<T> {
    pub page: u32,
    pub page_size: u64,
    pub movies: Vec<T>,
}

#[derive(Clone, Debug, Serialize)]
pub struct DetailsResponse<T> {
    pub movies: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    /// 1-based page number. Missing, unparsable and non-positive values all
    /// fall back to the first page.
    pub fn page(&self) -> u32 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1)
    }
}
