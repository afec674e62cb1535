//! Core data models for the scouting engine.

mod catalog;
mod confidence;
mod finding;
mod ids;
mod recommendation;
mod records;
mod report;
mod stats;

pub use catalog::*;
pub use confidence::*;
pub use finding::*;
pub use ids::*;
pub use recommendation::*;
pub use records::*;
pub use report::*;
pub use stats::*;
