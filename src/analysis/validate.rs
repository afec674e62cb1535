//! Structural validation of raw records.
//!
//! Runs before aggregation. Sparse data is fine; malformed data is not, and
//! is rejected here instead of being coerced downstream.

use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{AgentCatalog, AnalysisWindow, GameRecord, MatchId, MatchRecord, TeamId, TeamInfo};

/// A record that cannot be analyzed.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("match {match_id}: {reason}")]
    InvalidMatch { match_id: MatchId, reason: String },

    #[error("team {team_id}: {reason}")]
    InvalidTeam { team_id: TeamId, reason: String },

    #[error("invalid analysis window: {0}")]
    InvalidWindow(String),
}

/// Validates records against the window and, optionally, the catalog.
pub struct RecordValidator<'a> {
    catalog: &'a AgentCatalog,
    strict_catalog: bool,
}

impl<'a> RecordValidator<'a> {
    pub fn new(catalog: &'a AgentCatalog, strict_catalog: bool) -> Self {
        Self {
            catalog,
            strict_catalog,
        }
    }

    pub fn validate_window(&self, window: &AnalysisWindow) -> Result<(), ValidationError> {
        if window.days == 0 {
            return Err(ValidationError::InvalidWindow(
                "time window must cover at least one day".to_string(),
            ));
        }
        Ok(())
    }

    pub fn validate_team(&self, team: &TeamInfo) -> Result<(), ValidationError> {
        if team.id.is_blank() {
            return Err(ValidationError::InvalidTeam {
                team_id: team.id.clone(),
                reason: "team id is empty".to_string(),
            });
        }
        if team.name.trim().is_empty() {
            return Err(ValidationError::InvalidTeam {
                team_id: team.id.clone(),
                reason: "team name is empty".to_string(),
            });
        }
        Ok(())
    }

    /// Validate one team's match list. Matches the team did not play are
    /// tolerated (the aggregator skips them) but still have to be well formed.
    pub fn validate_matches(
        &self,
        team: &TeamId,
        matches: &[MatchRecord],
        window: &AnalysisWindow,
    ) -> Result<(), ValidationError> {
        let mut seen = HashSet::new();

        for record in matches {
            if !seen.insert(&record.id) {
                return Err(invalid(record, "duplicate match id in input"));
            }
            self.validate_match(record, window)?;
            if !record.involves(team) {
                warn!(
                    "Match {} does not involve team {}, it will be ignored",
                    record.id, team
                );
            }
        }

        debug!("Validated {} matches for team {}", matches.len(), team);
        Ok(())
    }

    pub fn validate_match(
        &self,
        record: &MatchRecord,
        window: &AnalysisWindow,
    ) -> Result<(), ValidationError> {
        if record.id.is_blank() {
            return Err(invalid(record, "match id is empty"));
        }
        if record.team_a.is_blank() || record.team_b.is_blank() {
            return Err(invalid(record, "team id is empty"));
        }
        if record.team_a == record.team_b {
            return Err(invalid(record, "a team cannot play itself"));
        }
        if !record.involves(&record.winner) {
            return Err(invalid(
                record,
                &format!("winner '{}' did not play in the match", record.winner),
            ));
        }
        if record.date > window.now {
            return Err(invalid(
                record,
                &format!("dated {} which is after the reference time", record.date),
            ));
        }

        let (winner_score, loser_score) = if record.winner == record.team_a {
            (record.team_a_score, record.team_b_score)
        } else {
            (record.team_b_score, record.team_a_score)
        };
        if winner_score < loser_score || (winner_score == loser_score && winner_score > 0) {
            return Err(invalid(
                record,
                &format!(
                    "game score {}-{} contradicts winner '{}'",
                    record.team_a_score, record.team_b_score, record.winner
                ),
            ));
        }

        for (index, game) in record.games.iter().enumerate() {
            self.validate_game(record, index, game)?;
        }

        Ok(())
    }

    fn validate_game(
        &self,
        record: &MatchRecord,
        index: usize,
        game: &GameRecord,
    ) -> Result<(), ValidationError> {
        let at = |reason: String| invalid(record, &format!("game {}: {}", index + 1, reason));

        if game.map.trim().is_empty() {
            return Err(at("map name is empty".to_string()));
        }
        if self.strict_catalog && !self.catalog.is_known_map(&game.map) {
            return Err(at(format!("unknown map '{}'", game.map)));
        }
        if !record.involves(&game.winner) {
            return Err(at(format!("winner '{}' did not play in the match", game.winner)));
        }

        let (winner_rounds, loser_rounds) = if game.winner == record.team_a {
            (game.team_a_rounds, game.team_b_rounds)
        } else {
            (game.team_b_rounds, game.team_a_rounds)
        };
        if winner_rounds < loser_rounds {
            return Err(at(format!(
                "round score {}-{} contradicts winner '{}'",
                game.team_a_rounds, game.team_b_rounds, game.winner
            )));
        }

        for pick in &game.agent_picks {
            if !record.involves(&pick.team) {
                return Err(at(format!("agent pick for unknown team '{}'", pick.team)));
            }
            if pick.player_id.is_blank() {
                return Err(at("agent pick without a player id".to_string()));
            }
            if pick.agent.trim().is_empty() {
                return Err(at("agent pick without an agent".to_string()));
            }
            if self.strict_catalog && !self.catalog.is_known_agent(&pick.agent) {
                return Err(at(format!("unknown agent '{}'", pick.agent)));
            }
        }

        for stat in &game.player_stats {
            if !record.involves(&stat.team) {
                return Err(at(format!("player stat for unknown team '{}'", stat.team)));
            }
            if stat.player_id.is_blank() {
                return Err(at("player stat without a player id".to_string()));
            }
            if !(stat.adr.is_finite() && stat.adr >= 0.0)
                || !(stat.combat_score.is_finite() && stat.combat_score >= 0.0)
            {
                return Err(at(format!(
                    "player {} has a negative or non-numeric damage/combat score",
                    stat.player_name
                )));
            }
            if let Some(agent) = &stat.agent {
                if self.strict_catalog && !self.catalog.is_known_agent(agent) {
                    return Err(at(format!("unknown agent '{}'", agent)));
                }
            }
        }

        Ok(())
    }
}

fn invalid(record: &MatchRecord, reason: &str) -> ValidationError {
    ValidationError::InvalidMatch {
        match_id: record.id.clone(),
        reason: reason.to_string(),
    }
}
