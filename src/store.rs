use std::str::FromStr;

use futures::{Stream, TryStreamExt};
use log::{info, warn};
use sqlx::{Connection, SqliteConnection, sqlite::SqliteConnectOptions};

use crate::{config::StorageConfig, error::PipelineError, exchange_rate::RateObservation};

const DROP_TABLE: &str = "DROP TABLE IF EXISTS cotacao";
const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS cotacao (\
    id INTEGER PRIMARY KEY AUTOINCREMENT, \
    name TEXT, \
    bid REAL, \
    created_at TEXT)";
const INSERT_OBSERVATION: &str = "INSERT INTO cotacao (name, bid, created_at) VALUES (?, ?, ?)";
const SELECT_ALL: &str = "SELECT id, name, bid, created_at FROM cotacao ORDER BY id";

/// Append-only handle on the `cotacao` table.
///
/// Each request opens its own handle. Dropping it releases the underlying
/// connection on every exit path; `close` does the same but waits for it.
pub struct Store {
    conn: SqliteConnection,
    pair: String,
}

impl Store {
    /// Prepares the table once at process start.
    pub async fn initialize(config: &StorageConfig) -> Result<(), PipelineError> {
        let mut conn = connect(config).await?;

        if config.reset_schema {
            sqlx::query(DROP_TABLE).execute(&mut conn).await?;
            info!("storage event=schema_reset url={}", config.database_url);
        }
        sqlx::query(CREATE_TABLE).execute(&mut conn).await?;

        conn.close().await?;
        Ok(())
    }

    pub async fn open(config: &StorageConfig) -> Result<Self, PipelineError> {
        Ok(Self {
            conn: connect(config).await?,
            pair: config.pair.clone(),
        })
    }

    /// Inserts one observation and returns the id storage assigned to it.
    pub async fn append(&mut self, bid: f64, observed_at: &str) -> Result<i64, PipelineError> {
        let id = sqlx::query(INSERT_OBSERVATION)
            .bind(&self.pair)
            .bind(bid)
            .bind(observed_at)
            .execute(&mut self.conn)
            .await?
            .last_insert_rowid();

        Ok(id)
    }

    pub fn list_all(
        &mut self,
    ) -> impl Stream<Item = Result<RateObservation, PipelineError>> + Send + Unpin + '_ {
        sqlx::query_as::<_, RateObservation>(SELECT_ALL)
            .fetch(&mut self.conn)
            .map_err(PipelineError::from)
    }

    pub async fn close(self) {
        if let Err(e) = self.conn.close().await {
            warn!("storage event=close_failed error={e}");
        }
    }
}

async fn connect(config: &StorageConfig) -> Result<SqliteConnection, PipelineError> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
    Ok(SqliteConnection::connect_with(&options).await?)
}
