use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

use crate::error::AppResult;

/// Opens a pooled handle to one dataset. The URL should carry `mode=ro`;
/// nothing in this crate issues writes either way.
pub async fn connect_read_only(
    database_url: &str,
    max_connections: u32,
) -> AppResult<DatabaseConnection> {
    let mut opts = ConnectOptions::new(database_url.to_string());
    opts.max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(false);

    let db = Database::connect(opts).await?;
    db.ping().await?;

    info!(url = %database_url, "dataset opened");
    Ok(db)
}
