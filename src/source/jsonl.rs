use async_trait::async_trait;
use tracing::debug;

use super::{select_matches, MatchSource, SourceError};
use crate::models::{AnalysisWindow, MatchRecord, TeamId, TeamInfo};
use crate::storage::{self, StorageConfig};

/// Source reading the local JSONL store on every call, so edits to the
/// data directory show up without a restart.
#[derive(Debug, Clone)]
pub struct JsonlSource {
    storage: StorageConfig,
}

impl JsonlSource {
    pub fn new(storage: StorageConfig) -> Self {
        Self { storage }
    }

    /// Run a blocking storage read off the async runtime.
    async fn blocking<T, F>(&self, read: F) -> Result<T, SourceError>
    where
        T: Send + 'static,
        F: FnOnce(StorageConfig) -> Result<T, storage::StorageError> + Send + 'static,
    {
        let config = self.storage.clone();
        tokio::task::spawn_blocking(move || read(config))
            .await
            .map_err(|e| SourceError::Unavailable(format!("storage task failed: {}", e)))?
            .map_err(SourceError::from)
    }
}

#[async_trait]
impl MatchSource for JsonlSource {
    fn name(&self) -> &'static str {
        "jsonl"
    }

    async fn teams(&self) -> Result<Vec<TeamInfo>, SourceError> {
        self.blocking(|config| storage::read_teams(&config)).await
    }

    async fn team(&self, id: &TeamId) -> Result<Option<TeamInfo>, SourceError> {
        let teams = self.teams().await?;
        Ok(teams.into_iter().find(|t| &t.id == id))
    }

    async fn matches(
        &self,
        team: &TeamId,
        window: &AnalysisWindow,
    ) -> Result<Vec<MatchRecord>, SourceError> {
        let all = self.blocking(|config| storage::read_matches(&config)).await?;
        let total = all.len();
        let selected = select_matches(all, team, window);
        debug!(
            "{} of {} stored matches involve {} in the window",
            selected.len(),
            total,
            team
        );
        Ok(selected)
    }
}
