//! Configuration loading and validation.
//!
//! Every threshold the analysis stages use lives in [`AnalysisConfig`].
//! Contradictory values are rejected when the engine is constructed, not
//! per request.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::{AgentCatalog, Role};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Analysis thresholds and output sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Games a map or agent needs before it can be classified
    #[serde(default = "default_min_sample_size")]
    pub min_sample_size: u32,

    /// Win rate (percent, inclusive) at or above which a map/agent is a strength
    #[serde(default = "default_strength_win_rate")]
    pub strength_win_rate: f64,

    /// Win rate (percent, inclusive) at or below which a map/agent is a weakness
    #[serde(default = "default_weakness_win_rate")]
    pub weakness_win_rate: f64,

    /// Match win rate (percent, inclusive) at or above which the team's
    /// overall record is a strength
    #[serde(default = "default_overall_strength_win_rate")]
    pub overall_strength_win_rate: f64,

    /// Share of a role's picks (percent) an agent must exceed to be a dependency
    #[serde(default = "default_dependency_share")]
    pub dependency_share: f64,

    /// Points above `dependency_share` for a high-confidence agent ban
    #[serde(default = "default_dependency_high_margin")]
    pub dependency_high_margin: f64,

    /// Points above `dependency_share` for a medium-confidence agent ban
    #[serde(default = "default_dependency_medium_margin")]
    pub dependency_medium_margin: f64,

    /// Attack/defense gap (percentage points) that must be exceeded for side bias
    #[serde(default = "default_side_bias_margin")]
    pub side_bias_margin: f64,

    /// Games each side needs before side bias is considered
    #[serde(default = "default_side_min_games")]
    pub side_min_games: u32,

    /// Results kept in the recent-form sequence
    #[serde(default = "default_recent_form_length")]
    pub recent_form_length: usize,

    /// Most recent results that must agree for a form trend
    #[serde(default = "default_form_trend_length")]
    pub form_trend_length: usize,

    /// Win rate gap (percentage points) between the newest results and the
    /// older ones that must be exceeded to call momentum improving or declining
    #[serde(default = "default_momentum_margin")]
    pub momentum_margin: f64,

    /// Games at which map, agent and player recommendations become high confidence
    #[serde(default = "default_high_confidence_games")]
    pub high_confidence_games: u32,

    /// Pseudo-count damping severity for small samples
    #[serde(default = "default_severity_prior")]
    pub severity_prior: f64,

    /// Fraction of games a player must appear in to be named for focus
    #[serde(default = "default_player_participation")]
    pub player_participation: f64,

    /// Recommendations kept after ranking; the rest are dropped and counted
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,

    /// Strengths and weaknesses listed in the report, each
    #[serde(default = "default_max_findings")]
    pub max_findings: usize,

    /// Entries in the best and worst map lists
    #[serde(default = "default_map_list_size")]
    pub map_list_size: usize,

    #[serde(default = "default_top_agents")]
    pub top_agents: usize,

    #[serde(default = "default_star_players")]
    pub star_players: usize,
}

fn default_min_sample_size() -> u32 {
    3
}

fn default_strength_win_rate() -> f64 {
    65.0
}

fn default_weakness_win_rate() -> f64 {
    40.0
}

fn default_overall_strength_win_rate() -> f64 {
    60.0
}

fn default_dependency_share() -> f64 {
    60.0
}

fn default_dependency_high_margin() -> f64 {
    20.0
}

fn default_dependency_medium_margin() -> f64 {
    10.0
}

fn default_side_bias_margin() -> f64 {
    15.0
}

fn default_side_min_games() -> u32 {
    3
}

fn default_recent_form_length() -> usize {
    5
}

fn default_form_trend_length() -> usize {
    3
}

fn default_momentum_margin() -> f64 {
    20.0
}

fn default_high_confidence_games() -> u32 {
    8
}

fn default_severity_prior() -> f64 {
    5.0
}

fn default_player_participation() -> f64 {
    0.5
}

fn default_max_recommendations() -> usize {
    5
}

fn default_max_findings() -> usize {
    3
}

fn default_map_list_size() -> usize {
    3
}

fn default_top_agents() -> usize {
    5
}

fn default_star_players() -> usize {
    2
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_sample_size: default_min_sample_size(),
            strength_win_rate: default_strength_win_rate(),
            weakness_win_rate: default_weakness_win_rate(),
            overall_strength_win_rate: default_overall_strength_win_rate(),
            dependency_share: default_dependency_share(),
            dependency_high_margin: default_dependency_high_margin(),
            dependency_medium_margin: default_dependency_medium_margin(),
            side_bias_margin: default_side_bias_margin(),
            side_min_games: default_side_min_games(),
            recent_form_length: default_recent_form_length(),
            form_trend_length: default_form_trend_length(),
            momentum_margin: default_momentum_margin(),
            high_confidence_games: default_high_confidence_games(),
            severity_prior: default_severity_prior(),
            player_participation: default_player_participation(),
            max_recommendations: default_max_recommendations(),
            max_findings: default_max_findings(),
            map_list_size: default_map_list_size(),
            top_agents: default_top_agents(),
            star_players: default_star_players(),
        }
    }
}

fn check_percent(name: &str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(ConfigError::ValidationError(format!(
            "{} must be between 0 and 100, got {}",
            name, value
        )));
    }
    Ok(())
}

impl AnalysisConfig {
    /// Validate the thresholds against each other.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_percent("strength_win_rate", self.strength_win_rate)?;
        check_percent("weakness_win_rate", self.weakness_win_rate)?;
        check_percent("dependency_share", self.dependency_share)?;
        check_percent("side_bias_margin", self.side_bias_margin)?;
        check_percent("overall_strength_win_rate", self.overall_strength_win_rate)?;
        check_percent("momentum_margin", self.momentum_margin)?;

        if self.weakness_win_rate >= self.strength_win_rate {
            return Err(ConfigError::ValidationError(format!(
                "weakness_win_rate ({}) must be below strength_win_rate ({})",
                self.weakness_win_rate, self.strength_win_rate
            )));
        }

        if self.min_sample_size == 0 {
            return Err(ConfigError::ValidationError(
                "min_sample_size must be greater than 0".to_string(),
            ));
        }

        if self.side_min_games == 0 {
            return Err(ConfigError::ValidationError(
                "side_min_games must be greater than 0".to_string(),
            ));
        }

        if self.dependency_medium_margin < 0.0
            || self.dependency_high_margin < self.dependency_medium_margin
        {
            return Err(ConfigError::ValidationError(format!(
                "dependency margins must satisfy 0 <= medium ({}) <= high ({})",
                self.dependency_medium_margin, self.dependency_high_margin
            )));
        }

        if self.form_trend_length == 0 || self.form_trend_length > self.recent_form_length {
            return Err(ConfigError::ValidationError(format!(
                "form_trend_length ({}) must be between 1 and recent_form_length ({})",
                self.form_trend_length, self.recent_form_length
            )));
        }

        if !(self.severity_prior >= 0.0 && self.severity_prior.is_finite()) {
            return Err(ConfigError::ValidationError(
                "severity_prior must be a non-negative number".to_string(),
            ));
        }

        if !(self.player_participation > 0.0 && self.player_participation <= 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "player_participation must be in (0, 1], got {}",
                self.player_participation
            )));
        }

        if self.max_recommendations == 0 {
            return Err(ConfigError::ValidationError(
                "max_recommendations must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// An agent added on top of the built-in pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentEntry {
    pub name: String,
    pub role: Role,
}

/// Map and agent identifiers the engine accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Reject records naming maps or agents outside the catalog
    #[serde(default = "default_strict")]
    pub strict: bool,

    #[serde(default)]
    pub extra_maps: Vec<String>,

    #[serde(default)]
    pub extra_agents: Vec<AgentEntry>,
}

fn default_strict() -> bool {
    true
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            strict: default_strict(),
            extra_maps: Vec::new(),
            extra_agents: Vec::new(),
        }
    }
}

impl CatalogConfig {
    /// Built-in catalog extended with the configured extras.
    pub fn build(&self) -> AgentCatalog {
        let mut catalog = AgentCatalog::builtin();
        for map in &self.extra_maps {
            catalog.add_map(map);
        }
        for agent in &self.extra_agents {
            catalog.add_agent(&agent.name, agent.role);
        }
        catalog
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.extra_maps.iter().any(|m| m.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "catalog.extra_maps contains an empty name".to_string(),
            ));
        }
        if self.extra_agents.iter().any(|a| a.name.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "catalog.extra_agents contains an empty name".to_string(),
            ));
        }
        Ok(())
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            analysis: AnalysisConfig::default(),
            catalog: CatalogConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!("No config at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.analysis.validate()?;
        self.catalog.validate()?;
        Ok(())
    }
}
