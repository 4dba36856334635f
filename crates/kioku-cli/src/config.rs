//! Runtime configuration
//!
//! Command-line flags win over environment variables, which win over the
//! platform defaults.

use std::path::PathBuf;

use kioku_core::SqliteStore;

/// Data directory override
pub const DATA_DIR_ENV: &str = "KIOKU_DATA_DIR";
/// Default cap on the `due` listing
pub const DUE_LIMIT_ENV: &str = "KIOKU_DUE_LIMIT";

pub const DEFAULT_DUE_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// SQLite database file
    pub db_path: PathBuf,
    pub due_limit: usize,
}

impl Config {
    /// Resolve from flags and the process environment
    pub fn load(data_dir: Option<PathBuf>, due_limit: Option<usize>) -> anyhow::Result<Self> {
        Self::resolve(data_dir, due_limit, |key| std::env::var(key).ok())
    }

    /// Resolve with an explicit environment lookup
    pub fn resolve(
        data_dir: Option<PathBuf>,
        due_limit: Option<usize>,
        env: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let from_env = || {
            env(DATA_DIR_ENV)
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
        };
        let db_path = match data_dir.or_else(from_env) {
            Some(dir) => SqliteStore::path_in(dir),
            None => SqliteStore::default_path()?,
        };

        let due_limit = match due_limit {
            Some(limit) => limit,
            None => match env(DUE_LIMIT_ENV) {
                Some(raw) => raw.trim().parse().map_err(|_| {
                    anyhow::anyhow!("{} must be a non-negative integer, got '{}'", DUE_LIMIT_ENV, raw)
                })?,
                None => DEFAULT_DUE_LIMIT,
            },
        };

        Ok(Self { db_path, due_limit })
    }
}
