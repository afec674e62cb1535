//! The scouting pipeline.
//!
//! Records flow one way through four stages, each a pure function of its
//! inputs and the configuration:
//! - **validate**: reject malformed records before anything is counted
//! - **aggregator**: records to per-team snapshots
//! - **patterns**: snapshot to ranked findings
//! - **recommend**: findings to ranked, capped decisions
//! - **report**: everything above to one immutable [`Report`](crate::models::Report)
//!
//! [`ScoutingEngine`] wires the stages together.

mod aggregator;
mod engine;
mod patterns;
mod recommend;
mod report;
mod validate;

pub use aggregator::{matches_in_window, StatsAggregator};
pub use engine::{EngineError, ScoutingEngine, ScoutingInput};
pub use patterns::PatternDetector;
pub use recommend::{RankedRecommendations, RecommendationEngine};
pub use report::{report_id, ReportBuilder, ReportInputs};
pub use validate::{RecordValidator, ValidationError};
