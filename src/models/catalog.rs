//! Known competitive maps and agents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Agent role category. Over-reliance is measured within a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Duelist,
    Initiator,
    Controller,
    Sentinel,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Duelist => write!(f, "duelist"),
            Role::Initiator => write!(f, "initiator"),
            Role::Controller => write!(f, "controller"),
            Role::Sentinel => write!(f, "sentinel"),
        }
    }
}

const BUILTIN_MAPS: &[&str] = &[
    "Abyss", "Ascent", "Bind", "Breeze", "Fracture", "Haven", "Icebox", "Lotus", "Pearl",
    "Split", "Sunset",
];

const BUILTIN_AGENTS: &[(&str, Role)] = &[
    ("Jett", Role::Duelist),
    ("Phoenix", Role::Duelist),
    ("Reyna", Role::Duelist),
    ("Raze", Role::Duelist),
    ("Yoru", Role::Duelist),
    ("Neon", Role::Duelist),
    ("Iso", Role::Duelist),
    ("Waylay", Role::Duelist),
    ("Breach", Role::Initiator),
    ("Sova", Role::Initiator),
    ("Skye", Role::Initiator),
    ("KAY/O", Role::Initiator),
    ("Fade", Role::Initiator),
    ("Gekko", Role::Initiator),
    ("Brimstone", Role::Controller),
    ("Viper", Role::Controller),
    ("Omen", Role::Controller),
    ("Astra", Role::Controller),
    ("Harbor", Role::Controller),
    ("Clove", Role::Controller),
    ("Sage", Role::Sentinel),
    ("Cypher", Role::Sentinel),
    ("Killjoy", Role::Sentinel),
    ("Chamber", Role::Sentinel),
    ("Deadlock", Role::Sentinel),
    ("Vyse", Role::Sentinel),
];

/// Lookup table of map names and agent roles.
///
/// Keys are matched case-insensitively; the canonical spelling is kept
/// for display.
#[derive(Debug, Clone, Default)]
pub struct AgentCatalog {
    maps: BTreeMap<String, String>,
    agents: BTreeMap<String, (String, Role)>,
}

impl AgentCatalog {
    /// Catalog with the current competitive map and agent pool.
    pub fn builtin() -> Self {
        let mut catalog = Self::default();
        for map in BUILTIN_MAPS {
            catalog.add_map(map);
        }
        for (agent, role) in BUILTIN_AGENTS {
            catalog.add_agent(agent, *role);
        }
        catalog
    }

    pub fn add_map(&mut self, name: &str) {
        self.maps
            .insert(name.trim().to_lowercase(), name.trim().to_string());
    }

    pub fn add_agent(&mut self, name: &str, role: Role) {
        self.agents.insert(
            name.trim().to_lowercase(),
            (name.trim().to_string(), role),
        );
    }

    pub fn is_known_map(&self, name: &str) -> bool {
        self.maps.contains_key(&name.trim().to_lowercase())
    }

    pub fn is_known_agent(&self, name: &str) -> bool {
        self.agents.contains_key(&name.trim().to_lowercase())
    }

    /// Catalog spelling of a map; unknown maps keep their trimmed input.
    pub fn canonical_map(&self, name: &str) -> String {
        let name = name.trim();
        self.maps
            .get(&name.to_lowercase())
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }

    /// Catalog spelling of an agent; unknown agents keep their trimmed input.
    pub fn canonical_agent(&self, name: &str) -> String {
        let name = name.trim();
        self.agents
            .get(&name.to_lowercase())
            .map(|(canonical, _)| canonical.clone())
            .unwrap_or_else(|| name.to_string())
    }

    /// Role of an agent, if the catalog knows it.
    pub fn role_of(&self, agent: &str) -> Option<Role> {
        self.agents
            .get(&agent.trim().to_lowercase())
            .map(|(_, role)| *role)
    }

    pub fn map_count(&self) -> usize {
        self.maps.len()
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }
}
