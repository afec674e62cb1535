//! Local match-data store.
//!
//! Layout under the data directory:
//! - `teams.jsonl`: one [`TeamInfo`](crate::models::TeamInfo) per line
//! - `matches/*.jsonl`: match records, sharded however the exporter likes
//! - `reports.jsonl`: saved scouting reports

mod jsonl;

pub use jsonl::*;

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{path}:{line}: {source}")]
    Parse {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },

    #[error("Invalid path pattern: {0}")]
    InvalidPattern(#[from] glob::PatternError),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn teams_path(&self) -> PathBuf {
        self.data_dir.join(EntityType::Team.filename())
    }

    pub fn matches_dir(&self) -> PathBuf {
        self.data_dir.join("matches")
    }

    pub fn reports_path(&self) -> PathBuf {
        self.data_dir.join(EntityType::Report.filename())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_paths() {
        let config = StorageConfig::new(PathBuf::from("/data"));

        assert_eq!(config.teams_path(), PathBuf::from("/data/teams.jsonl"));
        assert_eq!(config.matches_dir(), PathBuf::from("/data/matches"));
        assert_eq!(config.reports_path(), PathBuf::from("/data/reports.jsonl"));
    }

    #[test]
    fn test_storage_config_default() {
        let config = StorageConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
    }

    #[test]
    fn test_parse_error_names_file_and_line() {
        let source = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = StorageError::Parse {
            path: PathBuf::from("data/teams.jsonl"),
            line: 4,
            source,
        };
        assert!(err.to_string().starts_with("data/teams.jsonl:4: "));
    }
}
