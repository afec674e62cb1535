//! Raw match records as delivered by the data provider.
//!
//! Records are immutable once ingested. Counts are unsigned, so negative
//! values are rejected at deserialization; the remaining structural checks
//! live in `analysis::validate`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{MatchId, PlayerId, Role, TeamId};

/// A rostered player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: PlayerId,
    pub name: String,
    /// Free-form in-team role ("IGL", "Flex", ...)
    #[serde(default)]
    pub role: Option<String>,
}

/// Team identity and metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamInfo {
    pub id: TeamId,
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub roster: Vec<RosterEntry>,
}

impl TeamInfo {
    pub fn new(id: impl Into<TeamId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            short_name: None,
            region: None,
            roster: Vec::new(),
        }
    }

    /// Builder method to set the region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Builder method to set the short name.
    pub fn with_short_name(mut self, short_name: impl Into<String>) -> Self {
        self.short_name = Some(short_name.into());
        self
    }
}

/// Which half of the map a team is playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Attack,
    Defense,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Attack => Side::Defense,
            Side::Defense => Side::Attack,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Attack => write!(f, "attack"),
            Side::Defense => write!(f, "defense"),
        }
    }
}

/// Result of a match or game from one team's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "W")]
    Win,
    #[serde(rename = "L")]
    Loss,
}

impl Outcome {
    pub fn as_char(self) -> char {
        match self {
            Outcome::Win => 'W',
            Outcome::Loss => 'L',
        }
    }

    pub fn is_win(self) -> bool {
        matches!(self, Outcome::Win)
    }
}

/// Rounds played in one half of a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HalfRecord {
    /// Side team A played in this half; team B played the other one
    pub team_a_side: Side,
    pub team_a_rounds: u32,
    pub team_b_rounds: u32,
}

/// One player's agent choice in a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentPick {
    pub team: TeamId,
    pub player_id: PlayerId,
    pub player_name: String,
    pub agent: String,
    /// Overrides the catalog role when present
    #[serde(default)]
    pub role: Option<Role>,
}

/// One player's performance in a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerGameStat {
    pub team: TeamId,
    pub player_id: PlayerId,
    pub player_name: String,
    #[serde(default)]
    pub agent: Option<String>,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    /// Average damage per round
    pub adr: f64,
    /// Average combat score
    pub combat_score: f64,
    #[serde(default)]
    pub first_kills: u32,
    #[serde(default)]
    pub first_deaths: u32,
}

impl PlayerGameStat {
    /// Kill/death ratio with deaths floored at one.
    pub fn kd_ratio(&self) -> f64 {
        self.kills as f64 / self.deaths.max(1) as f64
    }
}

/// One map played within a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub map: String,
    pub winner: TeamId,
    pub team_a_rounds: u32,
    pub team_b_rounds: u32,
    #[serde(default)]
    pub halves: Vec<HalfRecord>,
    #[serde(default)]
    pub agent_picks: Vec<AgentPick>,
    #[serde(default)]
    pub player_stats: Vec<PlayerGameStat>,
}

/// A completed series between two teams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: MatchId,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub tournament: Option<String>,
    #[serde(default = "default_best_of")]
    pub best_of: u8,
    pub team_a: TeamId,
    pub team_b: TeamId,
    pub winner: TeamId,
    /// Games won by team A
    pub team_a_score: u32,
    /// Games won by team B
    pub team_b_score: u32,
    #[serde(default)]
    pub games: Vec<GameRecord>,
}

fn default_best_of() -> u8 {
    3
}

impl MatchRecord {
    /// Whether `team` played in this match.
    pub fn involves(&self, team: &TeamId) -> bool {
        &self.team_a == team || &self.team_b == team
    }

    /// Whether both teams played in this match, in either slot.
    pub fn is_between(&self, first: &TeamId, second: &TeamId) -> bool {
        first != second && self.involves(first) && self.involves(second)
    }

    /// Match result for `team`, or `None` if it did not play.
    pub fn outcome_for(&self, team: &TeamId) -> Option<Outcome> {
        if !self.involves(team) {
            return None;
        }
        Some(if &self.winner == team {
            Outcome::Win
        } else {
            Outcome::Loss
        })
    }

    /// Rounds (won, lost) by `team` in one of this match's games.
    pub fn rounds_for(&self, game: &GameRecord, team: &TeamId) -> (u32, u32) {
        if &self.team_a == team {
            (game.team_a_rounds, game.team_b_rounds)
        } else {
            (game.team_b_rounds, game.team_a_rounds)
        }
    }

    /// Per-half (side, rounds won, rounds played) for `team` in one game.
    pub fn halves_for<'a>(
        &'a self,
        game: &'a GameRecord,
        team: &'a TeamId,
    ) -> impl Iterator<Item = (Side, u32, u32)> + 'a {
        let is_team_a = &self.team_a == team;
        game.halves.iter().map(move |half| {
            let played = half.team_a_rounds + half.team_b_rounds;
            if is_team_a {
                (half.team_a_side, half.team_a_rounds, played)
            } else {
                (half.team_a_side.opposite(), half.team_b_rounds, played)
            }
        })
    }
}

/// Time window the analysis covers, anchored on a caller-supplied "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisWindow {
    pub now: DateTime<Utc>,
    pub days: u32,
}

impl AnalysisWindow {
    pub fn new(now: DateTime<Utc>, days: u32) -> Self {
        Self { now, days }
    }

    /// Earliest instant inside the window.
    pub fn start(&self) -> DateTime<Utc> {
        self.now - Duration::days(i64::from(self.days))
    }

    /// Inclusive at both ends.
    pub fn contains(&self, date: DateTime<Utc>) -> bool {
        date >= self.start() && date <= self.now
    }
}
