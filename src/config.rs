use std::{net::SocketAddr, time::Duration};

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub movies_database_url: String,
    pub ratings_database_url: String,
    pub max_connections: u32,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().context("PORT")?;

        let movies_database_url = std::env::var("MOVIES_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://db/movies.db?mode=ro".to_string());
        let ratings_database_url = std::env::var("RATINGS_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://db/ratings.db?mode=ro".to_string());

        let max_connections: u32 =
            std::env::var("DB_MAX_CONNECTIONS").ok().and_then(|s| s.parse().ok()).unwrap_or(8);

        let request_timeout_secs: u64 =
            std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|s| s.parse().ok()).unwrap_or(10);

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            movies_database_url,
            ratings_database_url,
            max_connections: max_connections.max(1),
            request_timeout: Duration::from_secs(request_timeout_secs.max(1)),
        })
    }
}
