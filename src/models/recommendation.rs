//! Actionable coaching decisions.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::{Confidence, EntityRef, Evidence, Side};

/// Recommendation type. Declaration order is the tie-break order used
/// when ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendationKind {
    MapBan,
    MapPick,
    AgentBan,
    AgentStrategy,
    PlayerFocus,
    Tactical,
}

impl std::fmt::Display for RecommendationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecommendationKind::MapBan => write!(f, "map-ban"),
            RecommendationKind::MapPick => write!(f, "map-pick"),
            RecommendationKind::AgentBan => write!(f, "agent-ban"),
            RecommendationKind::AgentStrategy => write!(f, "agent-strategy"),
            RecommendationKind::PlayerFocus => write!(f, "player-focus"),
            RecommendationKind::Tactical => write!(f, "tactical"),
        }
    }
}

/// The concrete decision, carrying only what that decision needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    BanMap { map: String },
    PickMap { map: String },
    BanAgent { agent: String },
    CounterAgent { agent: String },
    FocusPlayer { player: String },
    ExploitSide { map: String, side: Side },
}

impl Decision {
    pub fn kind(&self) -> RecommendationKind {
        match self {
            Decision::BanMap { .. } => RecommendationKind::MapBan,
            Decision::PickMap { .. } => RecommendationKind::MapPick,
            Decision::BanAgent { .. } => RecommendationKind::AgentBan,
            Decision::CounterAgent { .. } => RecommendationKind::AgentStrategy,
            Decision::FocusPlayer { .. } => RecommendationKind::PlayerFocus,
            Decision::ExploitSide { .. } => RecommendationKind::Tactical,
        }
    }

    /// Entity the decision acts on.
    pub fn target(&self) -> EntityRef {
        match self {
            Decision::BanMap { map } | Decision::PickMap { map } => EntityRef::map(map.clone()),
            Decision::ExploitSide { map, .. } => EntityRef::map(map.clone()),
            Decision::BanAgent { agent } | Decision::CounterAgent { agent } => {
                EntityRef::agent(agent.clone())
            }
            Decision::FocusPlayer { player } => EntityRef::player(player.clone()),
        }
    }

    /// Short imperative label shown to the coach.
    pub fn label(&self) -> String {
        match self {
            Decision::BanMap { map } => format!("Ban {}", map),
            Decision::PickMap { map } => format!("Pick {}", map),
            Decision::BanAgent { agent } => format!("Ban/punish {}", agent),
            Decision::CounterAgent { agent } => format!("Prepare counters for {}", agent),
            Decision::FocusPlayer { player } => format!("Prioritize shutting down {}", player),
            Decision::ExploitSide { map, side } => {
                format!("Attack their weak {} side on {}", side, map)
            }
        }
    }
}

/// A ranked coaching decision with its justification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: String,
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub decision: Decision,
    pub reasoning: String,
    pub expected_impact: String,
    pub confidence: Confidence,
    pub evidence: Evidence,
    /// Severity of the originating pattern
    pub severity: f64,
}

impl Recommendation {
    pub fn new(
        decision: Decision,
        reasoning: impl Into<String>,
        expected_impact: impl Into<String>,
        confidence: Confidence,
        evidence: Evidence,
        severity: f64,
    ) -> Self {
        Self {
            action: decision.label(),
            kind: decision.kind(),
            decision,
            reasoning: reasoning.into(),
            expected_impact: expected_impact.into(),
            confidence,
            evidence,
            severity,
        }
    }

    /// Deduplication key: one recommendation per (entity, type).
    pub fn dedup_key(&self) -> (EntityRef, RecommendationKind) {
        (self.decision.target(), self.kind)
    }

    /// Ranking order: confidence (high first), severity descending, type
    /// order, then action label.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        self.confidence
            .cmp(&other.confidence)
            .then_with(|| other.severity.total_cmp(&self.severity))
            .then_with(|| self.kind.cmp(&other.kind))
            .then_with(|| self.action.cmp(&other.action))
    }
}
