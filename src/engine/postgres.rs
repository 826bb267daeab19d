use sqlx::postgres::PgConnection;
use sqlx::{Connection as _, Executor as _};
use tokio::runtime::{Builder, Runtime};
use tracing::warn;

use crate::engine::{Connection, QueryEngine};
use crate::error::BenchError;

pub struct PostgresEngine {
    url: String,
}

impl PostgresEngine {
    pub fn new(url: String) -> PostgresEngine {
        PostgresEngine { url }
    }
}

impl QueryEngine for PostgresEngine {
    type Connection = PostgresConnection;

    fn connect(&self) -> Result<PostgresConnection, BenchError> {
        // sqlx is async only; each worker thread drives its own connection
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| BenchError::Connection(err.to_string()))?;
        let conn = runtime
            .block_on(PgConnection::connect(&self.url))
            .map_err(|err| BenchError::Connection(err.to_string()))?;
        Ok(PostgresConnection { runtime, conn: Some(conn) })
    }
}

pub struct PostgresConnection {
    runtime: Runtime,
    conn: Option<PgConnection>,
}

impl Connection for PostgresConnection {
    fn execute(&mut self, query: &str) -> Result<u64, BenchError> {
        let query_failed =
            |message: String| BenchError::Query { message, query: query.to_string() };
        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| query_failed("connection already closed".to_string()))?;
        // a bare &str runs over the simple protocol, without a prepared statement
        let rows = self
            .runtime
            .block_on(conn.fetch_all(query))
            .map_err(|err| query_failed(err.to_string()))?;
        Ok(rows.len() as u64)
    }
}

impl Drop for PostgresConnection {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Err(err) = self.runtime.block_on(conn.close()) {
                warn!("failed to close database connection: {}", err);
            }
        }
    }
}
