use clap::{Parser, Subcommand};
use qa_core::config::{
    default_config_path, load_or_default_config, ConfigError, EnvOverrides, QaConfig,
};
use qa_core::types::GroupId;
use qa_core::validation::{render_errors, Validate};
use qad::report::{
    add_lines, check_lines, generate_lines, list_lines, GROUP_NOT_FOUND, MISSING_INPUT_HINT,
};
use qad::{
    complete_setup, init_logging, needs_first_run, probe_setup, prompt_first_run,
    render_setup_guide, run_setup_wizard, QaService, ServiceError, CLI_LOG_FILTER,
};
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};

const EXAMPLES: &str = "예시:
  letti-qa add \"배경 제거 기능 테스트\"
  letti-qa list
  letti-qa generate [id]
  letti-qa check";

#[derive(Debug, Parser)]
#[command(
    name = "letti-qa",
    version,
    about = "Letti QA 시나리오 자동화 CLI",
    after_help = EXAMPLES
)]
struct Cli {
    /// 설정 파일 경로 (기본값: ~/.letti-qa/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 한 줄 요청을 시나리오로 확장하여 저장
    Add {
        /// 시나리오 요청 문장
        input: Vec<String>,
    },
    /// 저장된 시나리오 그룹 목록 출력
    List {
        /// 그룹 전체를 JSON으로 출력
        #[arg(long)]
        json: bool,
    },
    /// Playwright 테스트 파일 생성
    Generate {
        /// 시나리오 그룹 ID (생략하면 전체)
        id: Option<String>,
    },
    /// 전체 시나리오 충돌 분석
    Check,
    /// 설정 마법사 실행
    Setup,
}

#[derive(Debug, thiserror::Error)]
enum MainError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid config at {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("failed to encode JSON output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

#[tokio::main]
async fn main() {
    init_logging(CLI_LOG_FILTER);
    if let Err(err) = run(Cli::parse()).await {
        eprintln!("letti-qa failed: {err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), MainError> {
    let config_path = cli.config.unwrap_or_else(default_config_path);
    let mut file_config = load_or_default_config(&config_path)?;
    let mut config = file_config.clone();
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

    if !matches!(cli.command, Command::Setup)
        && needs_first_run(&config)
        && io::stdin().is_terminal()
    {
        offer_first_run(&config_path, &mut file_config, &config)?;
    }

    let service = || QaService::from_config(&config);
    match cli.command {
        Command::Add { input } => {
            let input = input.join(" ");
            if input.trim().is_empty() {
                println!("{MISSING_INPUT_HINT}");
                return Ok(());
            }
            let outcome = service()?.add_group(&input).await?;
            print_lines(&add_lines(&outcome));
        }
        Command::List { json } => {
            let groups = service()?.list_groups()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&groups)?);
            } else {
                print_lines(&list_lines(&groups));
            }
        }
        Command::Generate { id: Some(id) } => {
            match service()?.generate_for_group(&GroupId::new(id))? {
                Some(suite) => print_lines(&generate_lines(&[suite])),
                None => println!("{GROUP_NOT_FOUND}"),
            }
        }
        Command::Generate { id: None } => {
            print_lines(&generate_lines(&service()?.generate_all()?));
        }
        Command::Check => print_lines(&check_lines(&service()?.check_all()?)),
        Command::Setup => run_setup(&config_path, &mut file_config, &config)?,
    }
    Ok(())
}

fn run_setup(
    config_path: &Path,
    file_config: &mut QaConfig,
    config: &QaConfig,
) -> Result<(), MainError> {
    let report = probe_setup(config);
    let stdin = io::stdin();
    let mut out = io::stdout().lock();
    if stdin.is_terminal() {
        run_setup_wizard(&report, &mut stdin.lock(), &mut out)?;
    } else {
        write!(out, "{}", render_setup_guide(&report))?;
    }
    complete_setup(config_path, file_config)?;
    Ok(())
}

fn offer_first_run(
    config_path: &Path,
    file_config: &mut QaConfig,
    config: &QaConfig,
) -> Result<(), MainError> {
    let accepted = prompt_first_run(&mut io::stdin().lock(), &mut io::stdout().lock())?;
    if accepted {
        run_setup(config_path, file_config, config)
    } else {
        // Declining still counts as finished so the question is asked once.
        complete_setup(config_path, file_config)?;
        Ok(())
    }
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}
