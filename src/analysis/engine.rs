//! The scouting pipeline: validation, aggregation, detection, ranking and
//! report assembly behind one entry point.

use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::config::{AnalysisConfig, AppConfig, CatalogConfig, ConfigError};
use crate::models::{AgentCatalog, AnalysisWindow, MatchRecord, Report, TeamInfo};

use super::{
    matches_in_window, report_id, PatternDetector, RecommendationEngine, RecordValidator,
    ReportBuilder, ReportInputs, StatsAggregator, ValidationError,
};

/// Fatal engine errors. Thin data is never one of these.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("configuration stage: {0}")]
    Configuration(#[from] ConfigError),

    #[error("validation stage: {0}")]
    InvalidInput(#[from] ValidationError),
}

/// One scouting request: `team_a` is the requesting team, `team_b` the
/// opponent being scouted.
#[derive(Debug, Clone)]
pub struct ScoutingInput {
    pub team_a: TeamInfo,
    pub team_b: TeamInfo,
    pub matches_a: Vec<MatchRecord>,
    pub matches_b: Vec<MatchRecord>,
    pub window: AnalysisWindow,
}

/// Validated configuration plus the catalog it implies. Holds no per-request
/// state, so one engine can serve any number of reports.
#[derive(Debug, Clone)]
pub struct ScoutingEngine {
    config: AnalysisConfig,
    catalog: AgentCatalog,
    strict_catalog: bool,
}

impl ScoutingEngine {
    pub fn new(config: AnalysisConfig, catalog: &CatalogConfig) -> Result<Self, EngineError> {
        config.validate()?;
        catalog.validate()?;
        Ok(Self {
            config,
            catalog: catalog.build(),
            strict_catalog: catalog.strict,
        })
    }

    pub fn from_app_config(config: &AppConfig) -> Result<Self, EngineError> {
        Self::new(config.analysis.clone(), &config.catalog)
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn catalog(&self) -> &AgentCatalog {
        &self.catalog
    }

    /// Run every stage and assemble the report for `input`.
    #[instrument(skip_all, fields(team_a = %input.team_a.id, team_b = %input.team_b.id))]
    pub fn build_report(&self, input: &ScoutingInput) -> Result<Report, EngineError> {
        self.validate(input)?;

        let aggregator = StatsAggregator::new(&self.config, &self.catalog);
        let ours = aggregator.aggregate(&input.team_a, &input.matches_a, input.window);
        let opponent = aggregator.aggregate(&input.team_b, &input.matches_b, input.window);
        let head_to_head = aggregator.head_to_head(
            &input.team_a.id,
            &input.team_b.id,
            &input.matches_a,
            &input.matches_b,
            &input.window,
        );
        debug!(
            "Head-to-head: {} meetings ({}-{})",
            head_to_head.matches_played, head_to_head.team_a_wins, head_to_head.team_b_wins
        );

        let findings = PatternDetector::new(&self.config).detect(&opponent);
        let recommendations =
            RecommendationEngine::new(&self.config).recommend(&opponent, &findings, Some(&ours));

        let analyzed = matches_in_window(&input.team_a.id, &input.matches_a, &input.window)
            .into_iter()
            .chain(matches_in_window(
                &input.team_b.id,
                &input.matches_b,
                &input.window,
            ))
            .map(|m| &m.id);
        let report_id = report_id(&input.team_a.id, &input.team_b.id, &input.window, analyzed);

        let report = ReportBuilder::new(&self.config).build(ReportInputs {
            report_id,
            ours,
            opponent,
            head_to_head,
            findings,
            recommendations,
        });

        info!(
            "Report {} ready: {} recommendations ({} dropped)",
            report.report_id(),
            report.recommendations().len(),
            report.recommendations_dropped()
        );
        Ok(report)
    }

    fn validate(&self, input: &ScoutingInput) -> Result<(), ValidationError> {
        let validator = RecordValidator::new(&self.catalog, self.strict_catalog);
        validator.validate_window(&input.window)?;
        validator.validate_team(&input.team_a)?;
        validator.validate_team(&input.team_b)?;
        if input.team_a.id == input.team_b.id {
            return Err(ValidationError::InvalidTeam {
                team_id: input.team_a.id.clone(),
                reason: "cannot scout a team against itself".to_string(),
            });
        }
        validator.validate_matches(&input.team_a.id, &input.matches_a, &input.window)?;
        validator.validate_matches(&input.team_b.id, &input.matches_b, &input.window)?;
        Ok(())
    }
}
