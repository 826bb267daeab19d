use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::engine::{Connection, QueryEngine};
use crate::error::BenchError;

#[derive(Default)]
struct State {
    executed: Mutex<Vec<(String, String)>>,
    open: AtomicUsize,
    opened: AtomicUsize,
}

/// In-memory engine for tests.
#[derive(Default)]
pub struct FakeEngine {
    refuse_connections: bool,
    fail_host: Option<String>,
    latency: Duration,
    state: Arc<State>,
}

impl FakeEngine {
    pub fn failing_on(host: &str) -> FakeEngine {
        FakeEngine { fail_host: Some(format!("'{}'", host)), ..FakeEngine::default() }
    }

    pub fn refusing_connections() -> FakeEngine {
        FakeEngine { refuse_connections: true, ..FakeEngine::default() }
    }

    /// Makes every query take at least `latency`.
    pub fn with_latency(mut self, latency: Duration) -> FakeEngine {
        self.latency = latency;
        self
    }

    /// Executed queries as `(thread name, query)`, in completion order.
    pub fn executed(&self) -> Vec<(String, String)> {
        self.state.executed.lock().unwrap().clone()
    }

    pub fn open_connections(&self) -> usize {
        self.state.open.load(Ordering::SeqCst)
    }

    pub fn opened_connections(&self) -> usize {
        self.state.opened.load(Ordering::SeqCst)
    }
}

impl QueryEngine for FakeEngine {
    type Connection = FakeConnection;

    fn connect(&self) -> Result<FakeConnection, BenchError> {
        if self.refuse_connections {
            return Err(BenchError::Connection("connection refused".to_string()));
        }
        self.state.open.fetch_add(1, Ordering::SeqCst);
        self.state.opened.fetch_add(1, Ordering::SeqCst);
        Ok(FakeConnection {
            fail_host: self.fail_host.clone(),
            latency: self.latency,
            state: Arc::clone(&self.state),
        })
    }
}

pub struct FakeConnection {
    fail_host: Option<String>,
    latency: Duration,
    state: Arc<State>,
}

impl Connection for FakeConnection {
    fn execute(&mut self, query: &str) -> Result<u64, BenchError> {
        thread::sleep(self.latency);
        if let Some(host) = &self.fail_host {
            if query.contains(host.as_str()) {
                return Err(BenchError::Query {
                    message: format!("relation for {} does not exist", host),
                    query: query.to_string(),
                });
            }
        }
        let thread = thread::current().name().unwrap_or_default().to_string();
        self.state.executed.lock().unwrap().push((thread, query.to_string()));
        Ok(1)
    }
}

impl Drop for FakeConnection {
    fn drop(&mut self) {
        self.state.open.fetch_sub(1, Ordering::SeqCst);
    }
}
