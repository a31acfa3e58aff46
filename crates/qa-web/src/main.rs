use clap::Parser;
use qa_core::config::{default_config_path, load_or_default_config, ConfigError, EnvOverrides};
use qa_core::validation::{render_errors, Validate};
use qa_web::{run_web_server, WebError, WebState};
use qad::{init_logging, ServiceError, SERVER_LOG_FILTER};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "letti-qa-web", version, about = "Letti QA 웹 대시보드")]
struct Cli {
    /// 설정 파일 경로 (기본값: ~/.letti-qa/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// 바인드 주소 (설정 파일의 web.bind 대신 사용)
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,
}

#[derive(Debug, thiserror::Error)]
enum MainError {
    #[error("{0}")]
    Args(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid config at {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Web(#[from] WebError),
}

#[tokio::main]
async fn main() {
    init_logging(SERVER_LOG_FILTER);
    if let Err(err) = run(Cli::parse()).await {
        eprintln!("letti-qa-web failed: {err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), MainError> {
    let config_path = cli.config.unwrap_or_else(default_config_path);
    let mut config = load_or_default_config(&config_path)?;
    config.apply_env(&EnvOverrides::from_process_env());

    let issues = config.validate();
    if let Some(message) = render_errors(&issues) {
        return Err(MainError::InvalidConfig {
            path: config_path,
            message,
        });
    }
    for issue in &issues {
        tracing::warn!(code = issue.code, "{}", issue.message);
    }

    let bind = resolve_bind(cli.bind, &config.web.bind)?;
    let state = WebState::from_config(&config)?;

    println!("웹 대시보드가 시작되었습니다: http://{bind}");
    run_web_server(&bind, state).await?;
    Ok(())
}

fn resolve_bind(bind_override: Option<String>, config_bind: &str) -> Result<String, MainError> {
    let candidate = bind_override.unwrap_or_else(|| config_bind.to_string());
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        return Err(MainError::Args("bind address must not be empty".to_string()));
    }
    Ok(trimmed.to_string())
}
