//! The terminal scouting report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Finding, Outcome, PlayerId, Recommendation, ReportId, Role, TeamStatsSnapshot};

/// How much data the report rests on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DataStatus {
    Sufficient,
    /// Some matches, fewer than the minimum sample
    Limited { reason: String },
    /// No matches or no games in the window
    Insufficient { reason: String },
}

impl DataStatus {
    pub fn is_insufficient(&self) -> bool {
        matches!(self, DataStatus::Insufficient { .. })
    }
}

/// Direction of the newest results against the older ones in the form
/// window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Momentum {
    Improving,
    Stable,
    Declining,
}

/// Map breakdown of the head-to-head record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadToHeadMap {
    pub map: String,
    pub team_a_wins: u32,
    pub team_b_wins: u32,
}

/// Direct meetings between the two teams inside the window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadToHead {
    pub matches_played: u32,
    pub team_a_wins: u32,
    pub team_b_wins: u32,
    pub team_a_win_rate: Option<f64>,
    pub maps: Vec<HeadToHeadMap>,
}

/// Headline section of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchOverview {
    pub team_a_name: String,
    pub team_b_name: String,
    pub team_a_region: Option<String>,
    pub team_b_region: Option<String>,
    pub matches_analyzed_team_a: u32,
    pub matches_analyzed_team_b: u32,
    pub games_analyzed_team_a: u32,
    pub games_analyzed_team_b: u32,
    pub time_window_days: u32,
    pub opponent_overall_win_rate: Option<f64>,
    pub opponent_recent_form: Vec<Outcome>,
    pub opponent_recent_form_summary: String,
    /// `None` until the form window holds results older than the trend length
    pub opponent_momentum: Option<Momentum>,
    pub head_to_head: HeadToHead,
}

/// One entry of a best/worst map list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSummary {
    pub map: String,
    pub win_rate: Option<f64>,
    pub record: String,
    pub sample_size: u32,
    pub avg_round_diff: Option<f64>,
}

/// Top or bottom maps by win rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapList {
    /// False: every map is eligible regardless of games played
    pub sample_gated: bool,
    pub maps: Vec<MapSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSummary {
    pub agent: String,
    pub role: Option<Role>,
    pub picks: u32,
    pub pick_rate: Option<f64>,
    pub win_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarPlayer {
    pub player_id: PlayerId,
    pub name: String,
    /// Composite of combat score, K/D, ADR and first-kill differential
    pub impact_score: f64,
    pub games: u32,
    pub avg_combat_score: f64,
    pub avg_kd: f64,
    pub avg_adr: f64,
    pub avg_kills: f64,
    pub first_kill_diff: i64,
    pub most_played_agent: Option<String>,
}

/// Opponent at a glance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpponentSnapshot {
    pub best_maps: MapList,
    pub worst_maps: MapList,
    pub top_agents: Vec<AgentSummary>,
    pub star_players: Vec<StarPlayer>,
}

/// A finding as listed in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportFinding {
    pub description: String,
    #[serde(flatten)]
    pub finding: Finding,
}

impl From<Finding> for ReportFinding {
    fn from(finding: Finding) -> Self {
        Self {
            description: finding.description(),
            finding,
        }
    }
}

/// Immutable scouting report. Built by `analysis::ReportBuilder`; a
/// different shape means building a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    report_id: ReportId,
    generated_at: DateTime<Utc>,
    data_status: DataStatus,
    match_overview: MatchOverview,
    opponent_snapshot: OpponentSnapshot,
    key_strengths: Vec<ReportFinding>,
    exploitable_weaknesses: Vec<ReportFinding>,
    recommendations: Vec<Recommendation>,
    recommendations_dropped: usize,
    team_a_stats: TeamStatsSnapshot,
    team_b_stats: TeamStatsSnapshot,
}

/// Owned parts of a [`Report`].
pub(crate) struct ReportParts {
    pub report_id: ReportId,
    pub generated_at: DateTime<Utc>,
    pub data_status: DataStatus,
    pub match_overview: MatchOverview,
    pub opponent_snapshot: OpponentSnapshot,
    pub key_strengths: Vec<ReportFinding>,
    pub exploitable_weaknesses: Vec<ReportFinding>,
    pub recommendations: Vec<Recommendation>,
    pub recommendations_dropped: usize,
    pub team_a_stats: TeamStatsSnapshot,
    pub team_b_stats: TeamStatsSnapshot,
}

impl Report {
    pub(crate) fn from_parts(parts: ReportParts) -> Self {
        Self {
            report_id: parts.report_id,
            generated_at: parts.generated_at,
            data_status: parts.data_status,
            match_overview: parts.match_overview,
            opponent_snapshot: parts.opponent_snapshot,
            key_strengths: parts.key_strengths,
            exploitable_weaknesses: parts.exploitable_weaknesses,
            recommendations: parts.recommendations,
            recommendations_dropped: parts.recommendations_dropped,
            team_a_stats: parts.team_a_stats,
            team_b_stats: parts.team_b_stats,
        }
    }

    pub fn report_id(&self) -> &ReportId {
        &self.report_id
    }

    /// The window's reference time, not the wall clock.
    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn data_status(&self) -> &DataStatus {
        &self.data_status
    }

    pub fn match_overview(&self) -> &MatchOverview {
        &self.match_overview
    }

    pub fn opponent_snapshot(&self) -> &OpponentSnapshot {
        &self.opponent_snapshot
    }

    pub fn key_strengths(&self) -> &[ReportFinding] {
        &self.key_strengths
    }

    pub fn exploitable_weaknesses(&self) -> &[ReportFinding] {
        &self.exploitable_weaknesses
    }

    pub fn recommendations(&self) -> &[Recommendation] {
        &self.recommendations
    }

    /// Recommendations that ranked below the cap and were left out.
    pub fn recommendations_dropped(&self) -> usize {
        self.recommendations_dropped
    }

    /// Snapshot of the requesting team.
    pub fn team_a_stats(&self) -> &TeamStatsSnapshot {
        &self.team_a_stats
    }

    /// Snapshot of the opponent.
    pub fn team_b_stats(&self) -> &TeamStatsSnapshot {
        &self.team_b_stats
    }

    /// Pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
