//! Core data models for the combo meta engine.

mod build;
mod ids;
mod match_record;
mod part;
mod stats;

pub use build::*;
pub use ids::*;
pub use match_record::*;
pub use part::*;
pub use stats::*;
