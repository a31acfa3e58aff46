//! One YAML document per scenario group under a single directory.

use crate::{ScenarioStore, StoreError};
use qa_core::types::{GroupId, ScenarioGroup};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const GROUP_FILE_EXTENSION: &str = "yml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YamlScenarioStore {
    pub root: PathBuf,
}

impl YamlScenarioStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn ensure_layout(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root).map_err(|source| StoreError::CreateDir {
            path: self.root.clone(),
            source,
        })
    }

    /// `None` when the id could escape the store directory.
    pub fn group_path(&self, id: &GroupId) -> Option<PathBuf> {
        is_safe_id(id.as_ref())
            .then(|| self.root.join(format!("{id}.{GROUP_FILE_EXTENSION}")))
    }

    fn temp_path(&self, id: &GroupId) -> PathBuf {
        self.root.join(format!(".{id}.{GROUP_FILE_EXTENSION}.tmp"))
    }
}

impl ScenarioStore for YamlScenarioStore {
    fn save(&self, group: &ScenarioGroup) -> Result<(), StoreError> {
        let path = self
            .group_path(&group.id)
            .ok_or_else(|| StoreError::InvalidId {
                id: group.id.to_string(),
            })?;
        self.ensure_layout()?;

        let data = serde_yaml::to_string(group).map_err(|source| StoreError::Serialize {
            id: group.id.to_string(),
            source,
        })?;

        let temp = self.temp_path(&group.id);
        fs::write(&temp, data).map_err(|source| StoreError::Write {
            path: temp.clone(),
            source,
        })?;
        fs::rename(&temp, &path).map_err(|source| StoreError::Write {
            path: path.clone(),
            source,
        })?;

        debug!(group = %group.id, path = %path.display(), "saved scenario group");
        Ok(())
    }

    fn load(&self, id: &GroupId) -> Result<Option<ScenarioGroup>, StoreError> {
        let Some(path) = self.group_path(id) else {
            return Ok(None);
        };
        match fs::read_to_string(&path) {
            Ok(data) => parse_group(&path, &data).map(Some),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Read { path, source }),
        }
    }

    fn list(&self) -> Result<Vec<ScenarioGroup>, StoreError> {
        self.ensure_layout()?;
        let entries = fs::read_dir(&self.root).map_err(|source| StoreError::Read {
            path: self.root.clone(),
            source,
        })?;

        let mut groups = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Read {
                path: self.root.clone(),
                source,
            })?;
            let path = entry.path();
            if !is_group_file(&path) {
                continue;
            }
            let data = fs::read_to_string(&path).map_err(|source| StoreError::Read {
                path: path.clone(),
                source,
            })?;
            groups.push(parse_group(&path, &data)?);
        }

        groups.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        debug!(count = groups.len(), root = %self.root.display(), "listed scenario groups");
        Ok(groups)
    }
}

fn parse_group(path: &Path, data: &str) -> Result<ScenarioGroup, StoreError> {
    serde_yaml::from_str(data).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn is_group_file(path: &Path) -> bool {
    path.is_file()
        && path.extension().and_then(|ext| ext.to_str()) == Some(GROUP_FILE_EXTENSION)
        && path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| !name.starts_with('.'))
}

fn is_safe_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}
