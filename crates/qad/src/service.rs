//! QA orchestration service.
//!
//! Ties the expander, store, analyzer and converter together. Both the CLI
//! and the web server drive the corpus through this type.

use chrono::Utc;
use qa_analyze::{detect_all_conflicts, detect_conflicts, Conflict, ConflictSummary};
use qa_codegen::{render_test_suite_with, CodegenOptions, TEST_FILE_SUFFIX};
use qa_core::config::QaConfig;
use qa_core::types::{GenerationRecord, GroupId, ScenarioGroup, ScenarioSource};
use qa_core::validation::{render_errors, Validate};
use qa_expander::{build_expander, ExpandError, ScenarioExpander};
use qa_store::{ScenarioStore, StoreError, YamlScenarioStore};
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("scenario request must not be empty")]
    EmptyInput,
    #[error(transparent)]
    Expand(#[from] ExpandError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("expanded scenario group is invalid: {message}")]
    InvalidGroup { message: String },
    #[error("failed to create test directory {path}: {source}")]
    CreateTestDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write test file {path}: {source}")]
    WriteTestFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read test file {path}: {source}")]
    ReadTestFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A newly saved group and the conflicts it raised against the prior corpus.
#[derive(Debug, Clone, Serialize)]
pub struct AddOutcome {
    pub group: ScenarioGroup,
    pub conflicts: Vec<Conflict>,
}

/// A test file written for one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSuite {
    pub group_id: GroupId,
    pub file_name: String,
    /// Same value as `record.test_file`.
    pub file_path: String,
    pub content: String,
    pub record: GenerationRecord,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    #[serde(skip)]
    pub group_count: usize,
    pub conflicts: Vec<Conflict>,
    pub summary: ConflictSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestFile {
    pub file_name: String,
    pub content: String,
}

pub struct QaService {
    store: Arc<dyn ScenarioStore>,
    expander: Arc<dyn ScenarioExpander>,
    test_dir: PathBuf,
    codegen: CodegenOptions,
    history_cap: Option<usize>,
}

impl QaService {
    pub fn new(store: Arc<dyn ScenarioStore>, expander: Arc<dyn ScenarioExpander>) -> Self {
        Self {
            store,
            expander,
            test_dir: PathBuf::from("tests"),
            codegen: CodegenOptions::default(),
            history_cap: None,
        }
    }

    pub fn from_config(config: &QaConfig) -> Result<Self, ServiceError> {
        let store = Arc::new(YamlScenarioStore::new(&config.storage.scenario_dir));
        let expander = build_expander(&config.expander)?;
        Ok(Self::new(store, expander)
            .with_test_dir(&config.storage.test_dir)
            .with_codegen(CodegenOptions::from(&config.codegen))
            .with_history_cap(config.history.max_records))
    }

    pub fn with_test_dir(mut self, test_dir: impl Into<PathBuf>) -> Self {
        self.test_dir = test_dir.into();
        self
    }

    pub fn with_codegen(mut self, codegen: CodegenOptions) -> Self {
        self.codegen = codegen;
        self
    }

    pub fn with_history_cap(mut self, cap: Option<usize>) -> Self {
        self.history_cap = cap;
        self
    }

    pub fn test_dir(&self) -> &Path {
        &self.test_dir
    }

    /// Expand `input`, check it against the stored corpus, then save it.
    ///
    /// Nothing is written when expansion fails.
    pub async fn add_group(&self, input: &str) -> Result<AddOutcome, ServiceError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ServiceError::EmptyInput);
        }

        let drafts = self.expander.expand(input).await?;
        let group = ScenarioGroup::from_drafts(input, drafts, ScenarioSource::Generated, Utc::now());

        let existing = self.store.list()?;
        let conflicts = detect_conflicts(&group.scenarios, &existing);

        let issues = group.validate();
        if let Some(message) = render_errors(&issues) {
            return Err(ServiceError::InvalidGroup { message });
        }
        for issue in &issues {
            warn!(group = %group.id, code = issue.code, "{}", issue.message);
        }

        self.store.save(&group)?;
        info!(
            group = %group.id,
            scenarios = group.scenarios.len(),
            conflicts = conflicts.len(),
            "saved scenario group"
        );
        Ok(AddOutcome { group, conflicts })
    }

    pub fn list_groups(&self) -> Result<Vec<ScenarioGroup>, ServiceError> {
        Ok(self.store.list()?)
    }

    pub fn get_group(&self, id: &GroupId) -> Result<Option<ScenarioGroup>, ServiceError> {
        Ok(self.store.load(id)?)
    }

    /// `None` when no group has this id.
    pub fn generate_for_group(&self, id: &GroupId) -> Result<Option<GeneratedSuite>, ServiceError> {
        match self.store.load(id)? {
            Some(group) => self.generate(group).map(Some),
            None => Ok(None),
        }
    }

    pub fn generate_all(&self) -> Result<Vec<GeneratedSuite>, ServiceError> {
        self.store
            .list()?
            .into_iter()
            .map(|group| self.generate(group))
            .collect()
    }

    fn generate(&self, mut group: ScenarioGroup) -> Result<GeneratedSuite, ServiceError> {
        let suite = render_test_suite_with(&group, &self.codegen);

        fs::create_dir_all(&self.test_dir).map_err(|source| ServiceError::CreateTestDir {
            path: self.test_dir.clone(),
            source,
        })?;
        let path = self.test_dir.join(&suite.file_name);
        fs::write(&path, &suite.content).map_err(|source| ServiceError::WriteTestFile {
            path: path.clone(),
            source,
        })?;

        let record = GenerationRecord {
            generated_at: Utc::now(),
            test_file: relative_to_cwd(&path),
        };
        group.record_generation(record.clone(), self.history_cap);
        self.store.save(&group)?;

        info!(group = %group.id, file = %record.test_file, "generated test file");
        Ok(GeneratedSuite {
            group_id: group.id,
            file_name: suite.file_name,
            file_path: record.test_file.clone(),
            content: suite.content,
            record,
        })
    }

    pub fn check_all(&self) -> Result<CheckReport, ServiceError> {
        let groups = self.store.list()?;
        let conflicts = detect_all_conflicts(&groups);
        let summary = ConflictSummary::from_conflicts(&conflicts);
        info!(
            groups = groups.len(),
            conflicts = summary.total,
            "checked scenario corpus"
        );
        Ok(CheckReport {
            group_count: groups.len(),
            conflicts,
            summary,
        })
    }

    /// Accepts a group id or a full `<id>.test.ts` name.
    pub fn read_test_file(&self, id: &str) -> Result<Option<TestFile>, ServiceError> {
        let file_name = if id.ends_with(TEST_FILE_SUFFIX) {
            id.to_string()
        } else {
            format!("{id}{TEST_FILE_SUFFIX}")
        };
        let stem = &file_name[..file_name.len() - TEST_FILE_SUFFIX.len()];
        if !is_safe_stem(stem) {
            return Ok(None);
        }

        let path = self.test_dir.join(&file_name);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(TestFile { file_name, content })),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ServiceError::ReadTestFile { path, source }),
        }
    }
}

fn is_safe_stem(stem: &str) -> bool {
    !stem.is_empty()
        && stem
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}

fn relative_to_cwd(path: &Path) -> String {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(&cwd).ok().map(Path::to_path_buf))
        .unwrap_or_else(|| path.to_path_buf())
        .display()
        .to_string()
}
