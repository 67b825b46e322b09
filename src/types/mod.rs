//! Type definitions for the serving path

pub mod estimate;
pub mod input;

pub use estimate::Estimate;
pub use input::{Coverage, Ownership, PolicyInput, Region};
