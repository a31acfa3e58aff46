//! Scenario overlap, contradiction and duplicate detection.

pub mod classify;
pub mod detect;
pub mod similarity;

pub use classify::*;
pub use detect::*;
pub use similarity::*;
