mod postgres;

#[cfg(test)]
pub mod fake;

use crate::error::BenchError;

/// Opens connections to the system under benchmark.
///
/// Shared by reference between workers; every worker opens its own connection.
pub trait QueryEngine: Sync {
    type Connection: Connection;

    fn connect(&self) -> Result<Self::Connection, BenchError>;
}

/// A single engine session. Dropping it closes the session.
pub trait Connection {
    /// Runs `query`, consuming its whole result, and returns the number of rows.
    fn execute(&mut self, query: &str) -> Result<u64, BenchError>;
}

pub use self::postgres::PostgresEngine;
