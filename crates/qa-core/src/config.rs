//! Configuration for the scenario tool.
//!
//! Every field has a serde default so a partial (or missing) file still
//! produces a usable configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_API_BASE: &str = "https://api.anthropic.com";
pub const DEFAULT_BASE_URL: &str = "https://letti.nota.ai";
pub const DEFAULT_FIXTURE_PATH: &str = "tests/fixtures/sample.png";
pub const DEFAULT_WEB_BIND: &str = "127.0.0.1:3000";
pub const CONFIG_DIR_NAME: &str = ".letti-qa";
pub const CONFIG_FILE_NAME: &str = "config.toml";

pub const API_KEY_ENV_VARS: [&str; 2] = ["CLAUDE_API_KEY", "ANTHROPIC_API_KEY"];
pub const MODEL_ENV_VAR: &str = "LETTI_QA_CLAUDE_MODEL";
pub const PORT_ENV_VAR: &str = "PORT";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to serialize config at {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: toml::ser::Error,
    },
    #[error("failed to create config parent directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write config file at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QaConfig {
    /// Set once the first-run wizard has been completed or skipped.
    pub setup_complete: bool,
    pub expander: ExpanderConfig,
    pub storage: StorageConfig,
    pub codegen: CodegenConfig,
    pub web: WebConfig,
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExpanderProvider {
    /// Anthropic messages API over HTTPS.
    #[default]
    Anthropic,
    /// A local model CLI that reads the prompt on stdin.
    Cli,
}

impl ExpanderProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            ExpanderProvider::Anthropic => "anthropic",
            ExpanderProvider::Cli => "cli",
        }
    }
}

impl std::str::FromStr for ExpanderProvider {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "anthropic" => Ok(ExpanderProvider::Anthropic),
            "cli" => Ok(ExpanderProvider::Cli),
            other => Err(format!(
                "invalid expander provider '{other}'. valid values: anthropic, cli"
            )),
        }
    }
}

impl std::fmt::Display for ExpanderProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpanderConfig {
    pub provider: ExpanderProvider,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub api_base: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub cli_command: String,
    pub cli_args: Vec<String>,
}

impl Default for ExpanderConfig {
    fn default() -> Self {
        Self {
            provider: ExpanderProvider::Anthropic,
            api_key: None,
            model: None,
            api_base: DEFAULT_API_BASE.to_string(),
            max_tokens: 1200,
            timeout_secs: 90,
            cli_command: "claude".to_string(),
            cli_args: vec!["-p".to_string()],
        }
    }
}

impl ExpanderConfig {
    pub fn model_or_default(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub scenario_dir: PathBuf,
    pub test_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            scenario_dir: PathBuf::from("scenarios"),
            test_dir: PathBuf::from("tests"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodegenConfig {
    pub base_url: String,
    pub fixture_path: String,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            fixture_path: DEFAULT_FIXTURE_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub bind: String,
    pub public_dir: PathBuf,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_WEB_BIND.to_string(),
            public_dir: PathBuf::from("public"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Keep only the newest N generation records per group. `None` keeps all.
    pub max_records: Option<usize>,
}

/// Snapshot of the environment variables that override file settings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnvOverrides {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub port: Option<String>,
}

impl EnvOverrides {
    pub fn from_process_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Self {
            api_key: API_KEY_ENV_VARS.iter().find_map(|key| non_empty(key)),
            model: non_empty(MODEL_ENV_VAR),
            port: non_empty(PORT_ENV_VAR),
        }
    }
}

impl QaConfig {
    /// File values win over the environment for the key and model; the
    /// environment only fills gaps. `PORT` replaces the port of `web.bind`.
    pub fn apply_env(&mut self, env: &EnvOverrides) {
        if self.expander.api_key.as_deref().map_or(true, str::is_empty) {
            if let Some(key) = &env.api_key {
                self.expander.api_key = Some(key.clone());
            }
        }
        if self.expander.model.as_deref().map_or(true, str::is_empty) {
            if let Some(model) = &env.model {
                self.expander.model = Some(model.clone());
            }
        }
        if let Some(port) = &env.port {
            self.web.bind = replace_port(&self.web.bind, port.trim());
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.expander
            .api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }
}

fn replace_port(bind: &str, port: &str) -> String {
    match bind.rsplit_once(':') {
        Some((host, _)) if !host.is_empty() => format!("{host}:{port}"),
        _ => format!("0.0.0.0:{port}"),
    }
}

/// `$HOME/.letti-qa/config.toml`, or a relative path when no home is known.
pub fn default_config_path() -> PathBuf {
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)
}

pub fn parse_config(contents: &str) -> Result<QaConfig, toml::de::Error> {
    toml::from_str(contents)
}

pub fn load_config(path: impl AsRef<Path>) -> Result<QaConfig, ConfigError> {
    let path_ref = path.as_ref();
    let body = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
        path: path_ref.to_path_buf(),
        source,
    })?;
    parse_config(&body).map_err(|source| ConfigError::Parse {
        path: path_ref.to_path_buf(),
        source,
    })
}

/// Like [`load_config`], but a missing file yields the defaults.
pub fn load_or_default_config(path: impl AsRef<Path>) -> Result<QaConfig, ConfigError> {
    let path_ref = path.as_ref();
    if !path_ref.exists() {
        return Ok(QaConfig::default());
    }
    load_config(path_ref)
}

pub fn save_config(path: impl AsRef<Path>, config: &QaConfig) -> Result<(), ConfigError> {
    let path_ref = path.as_ref();
    if let Some(parent_dir) = path_ref.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent_dir).map_err(|source| ConfigError::CreateDir {
            path: parent_dir.to_path_buf(),
            source,
        })?;
    }

    let body = toml::to_string_pretty(config).map_err(|source| ConfigError::Serialize {
        path: path_ref.to_path_buf(),
        source,
    })?;
    fs::write(path_ref, body).map_err(|source| ConfigError::Write {
        path: path_ref.to_path_buf(),
        source,
    })?;
    Ok(())
}
