//! Validation for configuration and scenario groups.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::config::{ExpanderProvider, QaConfig};
use crate::types::ScenarioGroup;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationLevel {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub level: ValidationLevel,
    pub code: &'static str,
    pub message: String,
}

pub trait Validate {
    fn validate(&self) -> Vec<ValidationIssue>;
}

/// Keep only error-level issues, rendered as `code: message; ...`.
pub fn render_errors(issues: &[ValidationIssue]) -> Option<String> {
    let rendered = issues
        .iter()
        .filter(|issue| issue.level == ValidationLevel::Error)
        .map(|issue| format!("{}: {}", issue.code, issue.message))
        .collect::<Vec<_>>();
    if rendered.is_empty() {
        None
    } else {
        Some(rendered.join("; "))
    }
}

impl Validate for QaConfig {
    fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if self.expander.timeout_secs == 0 {
            issues.push(ValidationIssue {
                level: ValidationLevel::Error,
                code: "expander.timeout.zero",
                message: "expander timeout must be greater than zero".to_string(),
            });
        }

        if self.expander.max_tokens == 0 {
            issues.push(ValidationIssue {
                level: ValidationLevel::Error,
                code: "expander.max_tokens.zero",
                message: "max_tokens must be greater than zero".to_string(),
            });
        }

        match self.expander.provider {
            ExpanderProvider::Anthropic => {
                let base = self.expander.api_base.trim();
                if !base.starts_with("http://") && !base.starts_with("https://") {
                    issues.push(ValidationIssue {
                        level: ValidationLevel::Error,
                        code: "expander.api_base.invalid",
                        message: "api_base must start with http:// or https://".to_string(),
                    });
                }
            }
            ExpanderProvider::Cli => {
                if self.expander.cli_command.trim().is_empty() {
                    issues.push(ValidationIssue {
                        level: ValidationLevel::Error,
                        code: "expander.cli_command.empty",
                        message: "cli provider selected but cli_command is empty".to_string(),
                    });
                }
            }
        }

        if self.storage.scenario_dir.as_os_str().is_empty() {
            issues.push(ValidationIssue {
                level: ValidationLevel::Error,
                code: "storage.scenario_dir.empty",
                message: "scenario_dir must not be empty".to_string(),
            });
        }

        if self.storage.test_dir.as_os_str().is_empty() {
            issues.push(ValidationIssue {
                level: ValidationLevel::Error,
                code: "storage.test_dir.empty",
                message: "test_dir must not be empty".to_string(),
            });
        }

        let base_url = self.codegen.base_url.trim();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            issues.push(ValidationIssue {
                level: ValidationLevel::Warning,
                code: "codegen.base_url.invalid",
                message: "base_url should start with http:// or https://".to_string(),
            });
        }

        if self.web.bind.trim().is_empty() {
            issues.push(ValidationIssue {
                level: ValidationLevel::Error,
                code: "web.bind.empty",
                message: "web bind address must not be empty".to_string(),
            });
        }

        if self.history.max_records == Some(0) {
            issues.push(ValidationIssue {
                level: ValidationLevel::Error,
                code: "history.max_records.zero",
                message: "max_records of 0 would discard every generation record".to_string(),
            });
        }

        issues
    }
}

impl Validate for ScenarioGroup {
    fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if self.id.0.trim().is_empty() {
            issues.push(ValidationIssue {
                level: ValidationLevel::Error,
                code: "group.id.empty",
                message: "group id must not be empty".to_string(),
            });
        }

        if self.input.trim().is_empty() {
            issues.push(ValidationIssue {
                level: ValidationLevel::Error,
                code: "group.input.empty",
                message: "group input must not be empty".to_string(),
            });
        }

        if self.scenarios.is_empty() {
            issues.push(ValidationIssue {
                level: ValidationLevel::Warning,
                code: "group.scenarios.empty",
                message: "group has no scenarios".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for scenario in &self.scenarios {
            if scenario.id.0.trim().is_empty() {
                issues.push(ValidationIssue {
                    level: ValidationLevel::Error,
                    code: "scenario.id.empty",
                    message: format!("scenario '{}' has an empty id", scenario.title),
                });
            } else if !seen.insert(scenario.id.0.as_str()) {
                issues.push(ValidationIssue {
                    level: ValidationLevel::Error,
                    code: "scenario.id.duplicate",
                    message: format!("scenario id '{}' appears more than once", scenario.id),
                });
            }

            if scenario.title.trim().is_empty() {
                issues.push(ValidationIssue {
                    level: ValidationLevel::Warning,
                    code: "scenario.title.empty",
                    message: format!("scenario '{}' has an empty title", scenario.id),
                });
            }
        }

        issues
    }
}
