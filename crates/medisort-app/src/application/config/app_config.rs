use std::path::PathBuf;
use std::time::Duration;

use medisort_domain::shared::UserId;
use medisort_infrastructure::config::StoreConfig;

const DATA_DIR_VAR: &str = "MEDISORT_DATA_DIR";
const LOG_DIR_VAR: &str = "MEDISORT_LOG_DIR";
const USER_ID_VAR: &str = "MEDISORT_USER_ID";
const SNOOZE_SECS_VAR: &str = "MEDISORT_SNOOZE_SECS";
const BROADCAST_CAPACITY_VAR: &str = "MEDISORT_BROADCAST_CAPACITY";
const BUSY_TIMEOUT_MS_VAR: &str = "MEDISORT_BUSY_TIMEOUT_MS";

/// Runtime configuration of the adherence service
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding the SQLite database
    pub data_dir: PathBuf,

    pub log_dir: PathBuf,

    /// User signed in at startup, if any
    pub user_id: Option<UserId>,

    /// Delay before a snoozed reminder fires again (default: 60 seconds)
    pub snooze_delay: Duration,

    /// Pending broadcasts the bridge holds before it starts dropping
    pub broadcast_capacity: usize,

    pub store: StoreConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = default_data_dir();
        Self {
            log_dir: data_dir.join("logs"),
            data_dir,
            user_id: None,
            snooze_delay: Duration::from_secs(60),
            broadcast_capacity: 256,
            store: StoreConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = value(DATA_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);
        let log_dir = value(LOG_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("logs"));

        let snooze_delay = value(SNOOZE_SECS_VAR)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.snooze_delay);
        let broadcast_capacity = value(BROADCAST_CAPACITY_VAR)
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|c| *c > 0)
            .unwrap_or(defaults.broadcast_capacity);

        let mut store = defaults.store;
        if let Some(ms) = value(BUSY_TIMEOUT_MS_VAR).and_then(|v| v.trim().parse::<u64>().ok()) {
            store = store.with_busy_timeout(Duration::from_millis(ms));
        }

        Self {
            data_dir,
            log_dir,
            user_id: value(USER_ID_VAR).map(|id| UserId::from_string(id.trim())),
            snooze_delay,
            broadcast_capacity,
            store,
        }
    }

    pub fn with_data_dir(mut self, data_dir: PathBuf) -> Self {
        self.log_dir = data_dir.join("logs");
        self.data_dir = data_dir;
        self
    }

    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_snooze_delay(mut self, delay: Duration) -> Self {
        self.snooze_delay = delay;
        self
    }

    pub fn database_path(&self) -> PathBuf {
        let db_name = if cfg!(debug_assertions) {
            "medisort-dev.db"
        } else {
            "medisort.db"
        };
        self.data_dir.join(db_name)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("medisort")
}
