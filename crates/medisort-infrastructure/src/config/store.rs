use std::time::Duration;

/// Tuning for the SQLite store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// How long a writer waits on a locked database before failing
    pub busy_timeout: Duration,

    /// Pool acquire timeout
    pub acquire_timeout: Duration,

    pub max_connections: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_secs(5),
            acquire_timeout: Duration::from_secs(10),
            max_connections: 5,
        }
    }
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections.max(1);
        self
    }
}
