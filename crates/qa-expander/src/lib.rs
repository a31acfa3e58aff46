//! Turns a one-line request into draft QA scenarios using a language model.

pub mod anthropic;
pub mod cli;
pub mod error;
pub mod prompt;

pub use anthropic::*;
pub use cli::*;
pub use error::*;
pub use prompt::*;

use async_trait::async_trait;
use qa_core::config::{ExpanderConfig, ExpanderProvider};
use qa_core::types::ScenarioDraft;
use std::sync::Arc;

#[async_trait]
pub trait ScenarioExpander: Send + Sync {
    fn name(&self) -> &str;

    /// Draft scenarios for `request`. Implementations do not retry.
    async fn expand(&self, request: &str) -> Result<Vec<ScenarioDraft>, ExpandError>;
}

pub fn build_expander(config: &ExpanderConfig) -> Result<Arc<dyn ScenarioExpander>, ExpandError> {
    Ok(match config.provider {
        ExpanderProvider::Anthropic => Arc::new(AnthropicExpander::from_config(config)?),
        ExpanderProvider::Cli => Arc::new(CliExpander::from_config(config)),
    })
}

pub(crate) fn require_request(request: &str) -> Result<&str, ExpandError> {
    let request = request.trim();
    if request.is_empty() {
        return Err(ExpandError::EmptyRequest);
    }
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::TypeId;

    #[test]
    fn crate_root_reexports_types() {
        let _ = TypeId::of::<AnthropicExpander>();
        let _ = TypeId::of::<CliExpander>();
        let _ = TypeId::of::<ExpandError>();
        let _build_prompt = build_prompt;
        let _parse = parse_scenarios;
    }

    #[test]
    fn build_expander_selects_configured_provider() {
        let mut config = ExpanderConfig::default();
        assert_eq!(build_expander(&config).unwrap().name(), "anthropic");

        config.provider = ExpanderProvider::Cli;
        assert_eq!(build_expander(&config).unwrap().name(), "cli");
    }

    #[test]
    fn require_request_trims() {
        assert_eq!(require_request("  요청 ").unwrap(), "요청");
        assert!(matches!(require_request("\t"), Err(ExpandError::EmptyRequest)));
    }
}
