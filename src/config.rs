use std::path::PathBuf;

use crate::money::Locale;

pub const DEFAULT_DB_PATH: &str = "financeiro.db";
pub const DEFAULT_LOG_PATH: &str = "pocket-ledger.log";

/// Startup configuration, built once in `main` and handed to the parts that
/// need it.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_path: PathBuf,
    pub locale: Locale,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            locale: Locale::default(),
        }
    }
}

impl Config {
    /// Default paths plus the monetary locale from `LC_ALL` / `LC_MONETARY` /
    /// `LANG`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            locale: Locale::from_lookup(lookup),
            ..Self::default()
        }
    }
}
