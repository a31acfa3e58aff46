//! Scenario group persistence.

pub mod error;
pub mod yaml;

pub use error::*;
pub use yaml::*;

use qa_core::types::{GroupId, ScenarioGroup};

/// Durable home of the scenario corpus.
///
/// `load` reports a missing group as `Ok(None)`. `list` returns every stored
/// group ordered by creation time, oldest first.
pub trait ScenarioStore: Send + Sync {
    fn save(&self, group: &ScenarioGroup) -> Result<(), StoreError>;
    fn load(&self, id: &GroupId) -> Result<Option<ScenarioGroup>, StoreError>;
    fn list(&self) -> Result<Vec<ScenarioGroup>, StoreError>;
}
