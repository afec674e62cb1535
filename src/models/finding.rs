//! Classified patterns derived from a snapshot.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::{Role, Side, StatField};

/// Kind of entity a finding or recommendation is about.
///
/// Declaration order is the tie-break order used when ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Map,
    Agent,
    Player,
    Trend,
    Team,
}

/// A named entity of a given kind.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub name: String,
}

impl EntityRef {
    pub fn map(name: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Map,
            name: name.into(),
        }
    }

    pub fn agent(name: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Agent,
            name: name.into(),
        }
    }

    pub fn player(name: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Player,
            name: name.into(),
        }
    }

    pub fn trend(name: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Trend,
            name: name.into(),
        }
    }

    pub fn team(name: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Team,
            name: name.into(),
        }
    }
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            EntityKind::Map => "map",
            EntityKind::Agent => "agent",
            EntityKind::Player => "player",
            EntityKind::Trend => "trend",
            EntityKind::Team => "team",
        };
        write!(f, "{}:{}", kind, self.name)
    }
}

/// Literal citation of the statistic a claim rests on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub field: StatField,
    /// Value of `field` at derivation time
    pub value: f64,
    pub text: String,
}

impl Evidence {
    pub fn new(field: StatField, value: f64, text: impl Into<String>) -> Self {
        Self {
            field,
            value,
            text: text.into(),
        }
    }
}

/// What a win-rate classification applies to: a map, an agent, or the
/// team's match record as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum Subject {
    Map(String),
    Agent(String),
    Overall,
}

impl Subject {
    pub fn name(&self) -> &str {
        match self {
            Subject::Map(name) | Subject::Agent(name) => name,
            Subject::Overall => "overall",
        }
    }

    pub fn entity(&self) -> EntityRef {
        match self {
            Subject::Map(name) => EntityRef::map(name.clone()),
            Subject::Agent(name) => EntityRef::agent(name.clone()),
            Subject::Overall => EntityRef::team("overall"),
        }
    }
}

/// Win rate well above or below the neutral baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceFinding {
    pub subject: Subject,
    pub win_rate: f64,
    pub wins: u32,
    pub losses: u32,
    pub sample_size: u32,
    pub evidence: Evidence,
    pub severity: f64,
}

/// One agent dominating the picks for its role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyFinding {
    pub agent: String,
    pub role: Role,
    pub picks: u32,
    pub role_picks: u32,
    /// Share of the role's picks, percent
    pub role_share: f64,
    /// Share of all picks, percent
    pub pick_rate: f64,
    pub win_rate: Option<f64>,
    /// Dependency share the agent exceeded, percent
    pub threshold: f64,
    pub evidence: Evidence,
    pub severity: f64,
}

impl DependencyFinding {
    /// Percentage points above the dependency threshold.
    pub fn excess(&self) -> f64 {
        self.role_share - self.threshold
    }
}

/// Round win rate gap between attack and defense on one map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideBiasFinding {
    pub map: String,
    pub weaker_side: Side,
    pub attack_win_rate: f64,
    pub defense_win_rate: f64,
    /// Absolute gap in percentage points, one decimal
    pub gap: f64,
    /// Games observed on the less-sampled side
    pub games: u32,
    pub evidence: Evidence,
    pub severity: f64,
}

/// Direction of a uniform run of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Streak {
    Winning,
    Losing,
}

/// Most recent results all went the same way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormTrendFinding {
    pub streak: Streak,
    /// Results inspected
    pub window: usize,
    /// Full length of the current run, at least `window`
    pub streak_length: usize,
    /// Recent form, most recent first
    pub form: String,
    pub evidence: Evidence,
    pub severity: f64,
}

/// Whether a finding favours the team or exposes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Strength,
    Weakness,
}

/// A classified pattern. Never mutated after detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum Finding {
    Strength(PerformanceFinding),
    Weakness(PerformanceFinding),
    Dependency(DependencyFinding),
    SideBias(SideBiasFinding),
    FormTrend(FormTrendFinding),
}

impl Finding {
    pub fn category(&self) -> &'static str {
        match self {
            Finding::Strength(_) => "strength",
            Finding::Weakness(_) => "weakness",
            Finding::Dependency(_) => "dependency",
            Finding::SideBias(_) => "side_bias",
            Finding::FormTrend(_) => "form_trend",
        }
    }

    fn category_order(&self) -> u8 {
        match self {
            Finding::Strength(_) => 0,
            Finding::Weakness(_) => 1,
            Finding::Dependency(_) => 2,
            Finding::SideBias(_) => 3,
            Finding::FormTrend(_) => 4,
        }
    }

    pub fn entity(&self) -> EntityRef {
        match self {
            Finding::Strength(f) | Finding::Weakness(f) => f.subject.entity(),
            Finding::Dependency(f) => EntityRef::agent(f.agent.clone()),
            Finding::SideBias(f) => EntityRef::map(f.map.clone()),
            Finding::FormTrend(_) => EntityRef::trend("recent form"),
        }
    }

    /// Headline number of the finding.
    pub fn metric(&self) -> f64 {
        match self {
            Finding::Strength(f) | Finding::Weakness(f) => f.win_rate,
            Finding::Dependency(f) => f.role_share,
            Finding::SideBias(f) => f.gap,
            Finding::FormTrend(f) => f.streak_length as f64,
        }
    }

    pub fn evidence(&self) -> &Evidence {
        match self {
            Finding::Strength(f) | Finding::Weakness(f) => &f.evidence,
            Finding::Dependency(f) => &f.evidence,
            Finding::SideBias(f) => &f.evidence,
            Finding::FormTrend(f) => &f.evidence,
        }
    }

    pub fn severity(&self) -> f64 {
        match self {
            Finding::Strength(f) | Finding::Weakness(f) => f.severity,
            Finding::Dependency(f) => f.severity,
            Finding::SideBias(f) => f.severity,
            Finding::FormTrend(f) => f.severity,
        }
    }

    pub fn polarity(&self) -> Polarity {
        match self {
            Finding::Strength(_) => Polarity::Strength,
            Finding::FormTrend(f) if f.streak == Streak::Winning => Polarity::Strength,
            _ => Polarity::Weakness,
        }
    }

    /// One-line description for display.
    pub fn description(&self) -> String {
        match self {
            Finding::Strength(f) => match &f.subject {
                Subject::Map(map) => format!("Dominant on {}", map),
                Subject::Agent(agent) => format!("Strong with {}", agent),
                Subject::Overall => format!("High overall win rate ({:.1}%)", f.win_rate),
            },
            Finding::Weakness(f) => match &f.subject {
                Subject::Map(map) => format!("Struggles on {}", map),
                Subject::Agent(agent) => format!("Weak with {}", agent),
                Subject::Overall => format!("Low overall win rate ({:.1}%)", f.win_rate),
            },
            Finding::Dependency(f) => format!("Heavy reliance on {} ({})", f.agent, f.role),
            Finding::SideBias(f) => format!("Weak {} side on {}", f.weaker_side, f.map),
            Finding::FormTrend(f) => match f.streak {
                Streak::Winning => format!("On a {}-match winning streak", f.streak_length),
                Streak::Losing => format!("On a {}-match losing streak", f.streak_length),
            },
        }
    }

    /// Ranking order: severity descending, then entity kind
    /// (map, agent, player, trend, team), then entity name, then category.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .severity()
            .total_cmp(&self.severity())
            .then_with(|| self.entity().cmp(&other.entity()))
            .then_with(|| self.category_order().cmp(&other.category_order()))
    }
}
