//! Where match records come from.
//!
//! The engine never fetches anything itself; callers pick a [`MatchSource`]
//! and hand the engine a complete [`ScoutingInput`]. Swapping the local
//! store for a fixture set (or a remote provider) is a matter of passing a
//! different source.

mod jsonl;
mod memory;

pub use jsonl::JsonlSource;
pub use memory::InMemorySource;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::analysis::ScoutingInput;
use crate::models::{AnalysisWindow, MatchRecord, TeamId, TeamInfo};
use crate::storage::StorageError;

/// Errors a data source can raise.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Team not found: {0}")]
    TeamNotFound(TeamId),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

/// Provider of team metadata and match history.
#[async_trait]
pub trait MatchSource: Send + Sync {
    /// Source identifier for logging.
    fn name(&self) -> &'static str;

    async fn teams(&self) -> Result<Vec<TeamInfo>, SourceError>;

    async fn team(&self, id: &TeamId) -> Result<Option<TeamInfo>, SourceError>;

    /// Matches `team` played inside `window`, most recent first.
    async fn matches(
        &self,
        team: &TeamId,
        window: &AnalysisWindow,
    ) -> Result<Vec<MatchRecord>, SourceError>;
}

/// Filter and order records the way every source returns them.
pub(crate) fn select_matches(
    records: impl IntoIterator<Item = MatchRecord>,
    team: &TeamId,
    window: &AnalysisWindow,
) -> Vec<MatchRecord> {
    let mut selected: Vec<MatchRecord> = records
        .into_iter()
        .filter(|m| m.involves(team) && window.contains(m.date))
        .collect();
    selected.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
    selected
}

/// Gather both teams and their match histories concurrently.
pub async fn fetch_scouting_input(
    source: &dyn MatchSource,
    team_a: &TeamId,
    team_b: &TeamId,
    window: AnalysisWindow,
) -> Result<ScoutingInput, SourceError> {
    let (info_a, info_b) = tokio::try_join!(source.team(team_a), source.team(team_b))?;
    let info_a = info_a.ok_or_else(|| SourceError::TeamNotFound(team_a.clone()))?;
    let info_b = info_b.ok_or_else(|| SourceError::TeamNotFound(team_b.clone()))?;

    let (matches_a, matches_b) = tokio::try_join!(
        source.matches(team_a, &window),
        source.matches(team_b, &window)
    )?;

    info!(
        "Fetched {} matches for {} and {} for {} from {}",
        matches_a.len(),
        info_a.name,
        matches_b.len(),
        info_b.name,
        source.name()
    );

    Ok(ScoutingInput {
        team_a: info_a,
        team_b: info_b,
        matches_a,
        matches_b,
        window,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{game, series, team, window};

    fn source() -> InMemorySource {
        InMemorySource::new()
            .with_team(team("sen"))
            .with_team(team("fnc"))
            .with_matches(vec![
                series("m1", 3, "sen", "fnc", vec![game("Haven", "sen", "sen", 5)]),
                series("m2", 10, "fnc", "loud", vec![game("Bind", "fnc", "fnc", 5)]),
                series("m3", 200, "sen", "loud", vec![game("Lotus", "sen", "sen", 5)]),
            ])
    }

    #[tokio::test]
    async fn test_fetch_scouting_input() {
        let input = fetch_scouting_input(&source(), &"fnc".into(), &"sen".into(), window())
            .await
            .unwrap();

        assert_eq!(input.team_a.name, "FNC");
        assert_eq!(input.team_b.name, "SEN");
        let ids_a: Vec<&str> = input.matches_a.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids_a, vec!["m1", "m2"]);
        // m3 is outside the window
        assert_eq!(input.matches_b.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_team_is_an_error() {
        let err = fetch_scouting_input(&source(), &"fnc".into(), &"prx".into(), window())
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::TeamNotFound(id) if id.as_str() == "prx"));
    }

    #[test]
    fn test_select_matches_orders_recent_first() {
        let records = vec![
            series("b", 5, "sen", "fnc", vec![]),
            series("a", 5, "sen", "fnc", vec![]),
            series("c", 1, "sen", "fnc", vec![]),
        ];
        let selected = select_matches(records, &"sen".into(), &window());
        let ids: Vec<&str> = selected.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }
}
