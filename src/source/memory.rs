use async_trait::async_trait;

use super::{select_matches, MatchSource, SourceError};
use crate::models::{AnalysisWindow, MatchRecord, TeamId, TeamInfo};

/// Source backed by records already in memory. Used for fixtures and for
/// callers that fetched the data some other way.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    teams: Vec<TeamInfo>,
    matches: Vec<MatchRecord>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_team(mut self, team: TeamInfo) -> Self {
        self.teams.push(team);
        self
    }

    pub fn with_matches(mut self, matches: Vec<MatchRecord>) -> Self {
        self.matches.extend(matches);
        self
    }
}

#[async_trait]
impl MatchSource for InMemorySource {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn teams(&self) -> Result<Vec<TeamInfo>, SourceError> {
        Ok(self.teams.clone())
    }

    async fn team(&self, id: &TeamId) -> Result<Option<TeamInfo>, SourceError> {
        Ok(self.teams.iter().find(|t| &t.id == id).cloned())
    }

    async fn matches(
        &self,
        team: &TeamId,
        window: &AnalysisWindow,
    ) -> Result<Vec<MatchRecord>, SourceError> {
        Ok(select_matches(self.matches.iter().cloned(), team, window))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{team, window};

    #[tokio::test]
    async fn test_team_lookup() {
        let source = InMemorySource::new().with_team(team("sen"));

        assert!(source.team(&"sen".into()).await.unwrap().is_some());
        assert!(source.team(&"fnc".into()).await.unwrap().is_none());
        assert_eq!(source.teams().await.unwrap().len(), 1);
        assert!(source
            .matches(&"sen".into(), &window())
            .await
            .unwrap()
            .is_empty());
    }
}
