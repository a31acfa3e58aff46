//! Core scenario types shared by the analyzer, converter, store and service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioId(pub String);

impl ScenarioId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ScenarioId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub String);

impl GroupId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for GroupId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Where a scenario group came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ScenarioSource {
    /// Expanded from a one-line request by the language model.
    #[default]
    #[serde(rename = "claude", alias = "generated")]
    Generated,
    #[serde(rename = "manual")]
    Manual,
}

impl ScenarioSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ScenarioSource::Generated => "claude",
            ScenarioSource::Manual => "manual",
        }
    }
}

impl std::fmt::Display for ScenarioSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single QA scenario. Identity is `id`; contents never change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: ScenarioId,
    pub title: String,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub expected: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl Scenario {
    pub fn from_draft(draft: ScenarioDraft) -> Self {
        Self {
            id: ScenarioId::generate(),
            title: draft.title,
            steps: draft.steps,
            expected: draft.expected,
            tags: draft.tags,
        }
    }

    /// Title, steps and expected outcomes joined by single spaces.
    pub fn full_text(&self) -> String {
        format!(
            "{} {} {}",
            self.title,
            self.steps.join(" "),
            self.expected.join(" ")
        )
    }

    pub fn expected_text(&self) -> String {
        self.expected.join(" ")
    }
}

/// Expander output before ids are assigned.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScenarioDraft {
    pub title: String,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub expected: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRecord {
    pub generated_at: DateTime<Utc>,
    pub test_file: String,
}

/// A set of scenarios expanded from one request. Owned by the scenario store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioGroup {
    pub id: GroupId,
    pub input: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
    #[serde(default)]
    pub source: ScenarioSource,
    #[serde(default)]
    pub generation_history: Vec<GenerationRecord>,
}

impl ScenarioGroup {
    pub fn from_drafts(
        input: impl Into<String>,
        drafts: Vec<ScenarioDraft>,
        source: ScenarioSource,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: GroupId::generate(),
            input: input.into(),
            created_at,
            scenarios: drafts.into_iter().map(Scenario::from_draft).collect(),
            source,
            generation_history: Vec::new(),
        }
    }

    pub fn scenario(&self, id: &ScenarioId) -> Option<&Scenario> {
        self.scenarios.iter().find(|scenario| &scenario.id == id)
    }

    /// Append a generation record. With `cap = Some(n)` only the newest `n`
    /// records are kept.
    pub fn record_generation(&mut self, record: GenerationRecord, cap: Option<usize>) {
        self.generation_history.push(record);
        if let Some(cap) = cap {
            let len = self.generation_history.len();
            if len > cap {
                self.generation_history.drain(..len - cap);
            }
        }
    }

    pub fn last_generation(&self) -> Option<&GenerationRecord> {
        self.generation_history.last()
    }
}
