use anyhow::{anyhow, Context, Result};

use crate::hashing::{CollisionStrategy, HashAlgorithm, DEFAULT_TABLE_SIZE};
use crate::matching::tag_matcher::MatcherConfig;
use crate::sorting::SortAlgorithm;

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres URL. `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub match_table_size: usize,
    pub sort_algorithm: SortAlgorithm,
    pub db_max_connections: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: None,
            port: 8080,
            rust_log: "info".to_string(),
            match_table_size: DEFAULT_TABLE_SIZE,
            sort_algorithm: SortAlgorithm::Merge,
            db_max_connections: 10,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        let match_table_size = optional_env("MATCH_TABLE_SIZE")
            .map(|v| {
                v.parse::<usize>()
                    .context("MATCH_TABLE_SIZE must be a positive integer")
            })
            .transpose()?
            .unwrap_or(defaults.match_table_size);
        if match_table_size == 0 {
            return Err(anyhow!("MATCH_TABLE_SIZE must be at least 1"));
        }

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            port: optional_env("PORT")
                .unwrap_or_else(|| defaults.port.to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG").unwrap_or(defaults.rust_log),
            match_table_size,
            sort_algorithm: optional_env("SORT_ALGORITHM")
                .map(|v| v.parse::<SortAlgorithm>().map_err(|e| anyhow!(e)))
                .transpose()
                .context("SORT_ALGORITHM is not a known algorithm")?
                .unwrap_or(defaults.sort_algorithm),
            db_max_connections: optional_env("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|| defaults.db_max_connections.to_string())
                .parse::<u32>()
                .context("DB_MAX_CONNECTIONS must be a positive integer")?,
        })
    }

    /// Production matcher (separate chaining, FNV-1a) at the configured size.
    pub fn matcher_config(&self) -> MatcherConfig {
        MatcherConfig {
            table_size: self.match_table_size,
            strategy: CollisionStrategy::SeparateChaining,
            hash: HashAlgorithm::Fnv1a,
        }
    }
}

/// Unset and empty both count as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
