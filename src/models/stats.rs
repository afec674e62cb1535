//! Aggregated, read-only team statistics.

use serde::{Deserialize, Serialize};

use super::{AnalysisWindow, Outcome, PlayerId, Role, Side, TeamInfo};

/// Round results on one side of a map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SideSplit {
    pub rounds_won: u32,
    pub rounds_played: u32,
    /// Games that carried side data for this side
    pub games: u32,
    /// Round win rate in percent, one decimal
    pub win_rate: Option<f64>,
}

/// Per-map statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapStat {
    pub map: String,
    pub wins: u32,
    pub losses: u32,
    /// Games played on this map (wins + losses)
    pub sample_size: u32,
    /// Win rate in percent, one decimal
    pub win_rate: Option<f64>,
    /// "W-L"
    pub record: String,
    pub rounds_won: u32,
    pub rounds_lost: u32,
    /// Average round differential per game, one decimal
    pub avg_round_diff: Option<f64>,
    pub attack: SideSplit,
    pub defense: SideSplit,
}

impl MapStat {
    pub fn side(&self, side: Side) -> &SideSplit {
        match side {
            Side::Attack => &self.attack,
            Side::Defense => &self.defense,
        }
    }
}

/// Per-agent pick statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStat {
    pub agent: String,
    pub role: Option<Role>,
    pub picks: u32,
    /// Picks made in games the team won
    pub wins: u32,
    /// Share of all team picks, percent
    pub pick_rate: Option<f64>,
    /// Percent of picks that ended in a won game
    pub win_rate: Option<f64>,
    /// Share of the picks made for this agent's role, percent
    pub role_share: Option<f64>,
}

/// Per-player averages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStat {
    pub player_id: PlayerId,
    pub name: String,
    pub games: u32,
    pub avg_kills: f64,
    pub avg_deaths: f64,
    pub avg_assists: f64,
    pub avg_adr: f64,
    pub avg_combat_score: f64,
    /// Mean of per-game K/D ratios
    pub avg_kd: f64,
    /// First kills minus first deaths
    pub first_kill_diff: i64,
    pub most_played_agent: Option<String>,
}

/// Aggregated view of one team over one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamStatsSnapshot {
    pub team: TeamInfo,
    pub window: AnalysisWindow,
    pub matches_analyzed: u32,
    pub games_analyzed: u32,
    pub wins: u32,
    pub losses: u32,
    /// Match win rate in percent, one decimal; `None` without matches
    pub overall_win_rate: Option<f64>,
    /// Sorted by map name
    pub maps: Vec<MapStat>,
    /// Sorted by agent name
    pub agents: Vec<AgentStat>,
    /// Sorted by player name
    pub players: Vec<PlayerStat>,
    pub total_agent_picks: u32,
    /// Most recent first
    pub recent_form: Vec<Outcome>,
}

/// Pointer to a numeric value inside a [`TeamStatsSnapshot`].
///
/// Every finding and recommendation cites one of these so the claim can be
/// re-read from the statistics it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "field", rename_all = "snake_case")]
pub enum StatField {
    OverallWinRate,
    MapWinRate { map: String },
    MapSideWinRate { map: String, side: Side },
    AgentWinRate { agent: String },
    AgentPickRate { agent: String },
    AgentRoleShare { agent: String },
    PlayerCombatScore { player: PlayerId },
    /// Wins among the `length` most recent results
    RecentFormWins { length: usize },
}

impl std::fmt::Display for StatField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatField::OverallWinRate => write!(f, "overall_win_rate"),
            StatField::MapWinRate { map } => write!(f, "maps[{}].win_rate", map),
            StatField::MapSideWinRate { map, side } => {
                write!(f, "maps[{}].{}.win_rate", map, side)
            }
            StatField::AgentWinRate { agent } => write!(f, "agents[{}].win_rate", agent),
            StatField::AgentPickRate { agent } => write!(f, "agents[{}].pick_rate", agent),
            StatField::AgentRoleShare { agent } => write!(f, "agents[{}].role_share", agent),
            StatField::PlayerCombatScore { player } => {
                write!(f, "players[{}].avg_combat_score", player)
            }
            StatField::RecentFormWins { length } => write!(f, "recent_form[..{}].wins", length),
        }
    }
}

impl TeamStatsSnapshot {
    /// True when the window held no matches for this team.
    pub fn is_empty(&self) -> bool {
        self.matches_analyzed == 0
    }

    /// Map by its catalog name, the key the aggregator groups games under.
    pub fn map(&self, name: &str) -> Option<&MapStat> {
        self.maps.iter().find(|m| m.map == name)
    }

    /// Agent by its catalog name.
    pub fn agent(&self, name: &str) -> Option<&AgentStat> {
        self.agents.iter().find(|a| a.agent == name)
    }

    /// Player by id; display names are not unique.
    pub fn player(&self, id: &PlayerId) -> Option<&PlayerStat> {
        self.players.iter().find(|p| &p.player_id == id)
    }

    /// Recent form as a compact string, e.g. "WWLWL".
    pub fn recent_form_string(&self) -> String {
        self.recent_form.iter().map(|o| o.as_char()).collect()
    }

    /// Read back the value a [`StatField`] points at.
    pub fn resolve(&self, field: &StatField) -> Option<f64> {
        match field {
            StatField::OverallWinRate => self.overall_win_rate,
            StatField::MapWinRate { map } => self.map(map).and_then(|m| m.win_rate),
            StatField::MapSideWinRate { map, side } => {
                self.map(map).and_then(|m| m.side(*side).win_rate)
            }
            StatField::AgentWinRate { agent } => self.agent(agent).and_then(|a| a.win_rate),
            StatField::AgentPickRate { agent } => self.agent(agent).and_then(|a| a.pick_rate),
            StatField::AgentRoleShare { agent } => self.agent(agent).and_then(|a| a.role_share),
            StatField::PlayerCombatScore { player } => {
                self.player(player).map(|p| p.avg_combat_score)
            }
            StatField::RecentFormWins { length } => {
                if self.recent_form.len() < *length {
                    return None;
                }
                let wins = self.recent_form[..*length]
                    .iter()
                    .filter(|o| o.is_win())
                    .count();
                Some(wins as f64)
            }
        }
    }
}
