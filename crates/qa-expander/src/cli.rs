//! Provider that shells out to a local model CLI (`claude -p` by default).
//!
//! The prompt goes to the child's stdin and the scenarios are parsed from its
//! stdout. The child is killed when the timeout elapses.

use crate::prompt::{build_prompt, parse_scenarios};
use crate::{require_request, ExpandError, ScenarioExpander};
use async_trait::async_trait;
use qa_core::config::ExpanderConfig;
use qa_core::types::ScenarioDraft;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliExpander {
    pub command: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl CliExpander {
    pub fn new(command: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            args,
            timeout,
        }
    }

    pub fn from_config(config: &ExpanderConfig) -> Self {
        Self::new(
            config.cli_command.clone(),
            config.cli_args.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    async fn run(&self, prompt: &str) -> Result<String, ExpandError> {
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| ExpandError::Transport {
                message: format!("failed to start {}: {err}", self.command),
            })?;

        let stdin = child.stdin.take();
        let exchange = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(prompt.as_bytes()).await?;
                stdin.shutdown().await?;
            }
            child.wait_with_output().await
        };

        let output = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| ExpandError::Timeout {
                secs: self.timeout.as_secs(),
            })?
            .map_err(|err| ExpandError::Transport {
                message: format!("{} failed: {err}", self.command),
            })?;

        if !output.status.success() {
            return Err(ExpandError::Transport {
                message: format!(
                    "{} exited with {}: {}",
                    self.command,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl ScenarioExpander for CliExpander {
    fn name(&self) -> &str {
        "cli"
    }

    async fn expand(&self, request: &str) -> Result<Vec<ScenarioDraft>, ExpandError> {
        let request = require_request(request)?;

        info!(command = %self.command, "expanding scenario request via CLI");
        let text = self.run(&build_prompt(request)).await?;
        debug!(bytes = text.len(), "received CLI output");
        parse_scenarios(&text)
    }
}
