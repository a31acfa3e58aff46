//! First-run setup: environment probes and the guided setup wizard.

use qa_core::config::{save_config, ConfigError, ExpanderProvider, QaConfig, API_KEY_ENV_VARS};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::{Command, Stdio};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

pub trait SetupCommandRunner {
    fn command_exists(&self, executable: &str) -> bool;
    fn env_var_present(&self, env_key: &str) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessSetupCommandRunner;

impl SetupCommandRunner for ProcessSetupCommandRunner {
    fn command_exists(&self, executable: &str) -> bool {
        Command::new("which")
            .arg(executable)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn env_var_present(&self, env_key: &str) -> bool {
        std::env::var_os(env_key).is_some_and(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupCheck {
    pub name: &'static str,
    pub passed: bool,
    /// Whether the configured provider needs this check to pass.
    pub required: bool,
    pub detail: String,
    pub remediation: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupReport {
    pub provider: ExpanderProvider,
    pub checks: Vec<SetupCheck>,
}

impl SetupReport {
    pub fn check(&self, name: &str) -> Option<&SetupCheck> {
        self.checks.iter().find(|check| check.name == name)
    }

    pub fn ready(&self) -> bool {
        self.checks
            .iter()
            .filter(|check| check.required)
            .all(|check| check.passed)
    }
}

pub const CLI_CHECK: &str = "expander_cli";
pub const API_KEY_CHECK: &str = "api_key";

pub fn probe_setup(config: &QaConfig) -> SetupReport {
    probe_setup_with_runner(config, &ProcessSetupCommandRunner)
}

pub fn probe_setup_with_runner(config: &QaConfig, runner: &dyn SetupCommandRunner) -> SetupReport {
    let provider = config.expander.provider;
    let command = config.expander.cli_command.as_str();

    let cli_found = runner.command_exists(command);
    let cli_check = SetupCheck {
        name: CLI_CHECK,
        passed: cli_found,
        required: provider == ExpanderProvider::Cli,
        detail: if cli_found {
            format!("{command} CLI가 설치되어 있습니다!")
        } else {
            format!("{command} CLI가 설치되어 있지 않습니다.")
        },
        remediation: if cli_found {
            Vec::new()
        } else {
            vec![
                "📋 설치 방법:".to_string(),
                "1. 터미널에서 다음 명령 실행:".to_string(),
                "   npm install -g @anthropic-ai/claude-code".to_string(),
                "2. 설치 확인:".to_string(),
                format!("   {command} --version"),
            ]
        },
    };

    let key_found = config.has_api_key()
        || API_KEY_ENV_VARS
            .iter()
            .any(|key| runner.env_var_present(key));
    let key_check = SetupCheck {
        name: API_KEY_CHECK,
        passed: key_found,
        required: provider == ExpanderProvider::Anthropic,
        detail: if key_found {
            "API 키가 설정되어 있습니다!".to_string()
        } else {
            "API 키가 설정되어 있지 않습니다.".to_string()
        },
        remediation: if key_found {
            Vec::new()
        } else {
            vec![
                "📋 API 키 설정 방법:".to_string(),
                "1️⃣  Anthropic API 키 발급:".to_string(),
                "   • https://console.anthropic.com 접속".to_string(),
                "   • API Keys 메뉴에서 'Create Key' 클릭".to_string(),
                "   • 생성된 키 복사 (sk-ant-... 형태)".to_string(),
                "2️⃣  환경변수 설정 (터미널에서 실행):".to_string(),
                "   export ANTHROPIC_API_KEY=sk-ant-api03-...".to_string(),
                "3️⃣  또는 설정 파일의 [expander] api_key 항목에 저장".to_string(),
            ]
        },
    };

    SetupReport {
        provider,
        checks: vec![cli_check, key_check],
    }
}

/// The full guide without pausing for input.
pub fn render_setup_guide(report: &SetupReport) -> String {
    let mut out = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_guide(report, None, &mut out);
    String::from_utf8_lossy(&out).into_owned()
}

/// Print the guide to `out`. After each failing check the wizard waits for
/// Enter on `input` so the user can fix the problem first.
pub fn run_setup_wizard<R: BufRead, W: Write>(
    report: &SetupReport,
    input: &mut R,
    out: &mut W,
) -> io::Result<()> {
    write_guide(report, Some(input as &mut dyn BufRead), out)
}

fn write_guide<W: Write>(
    report: &SetupReport,
    mut input: Option<&mut dyn BufRead>,
    out: &mut W,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "╔══════════════════════════════════════════════════════════════╗")?;
    writeln!(out, "║               🚀 Letti QA 설정 마법사                        ║")?;
    writeln!(out, "╚══════════════════════════════════════════════════════════════╝")?;
    writeln!(out)?;
    writeln!(out, "이 가이드를 따라하면 Letti QA를 바로 사용할 수 있습니다.")?;
    writeln!(out)?;

    section(out, "📦 1단계: 환경 확인")?;
    writeln!(out, "   ✅ Letti QA 버전: {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(out, "   ✅ 운영체제: {}", std::env::consts::OS)?;
    writeln!(out, "   ✅ 시나리오 생성 방식: {}", report.provider)?;
    writeln!(out)?;

    let steps = [
        (CLI_CHECK, "🤖 2단계: Claude CLI 확인", "설치한 후"),
        (API_KEY_CHECK, "🔑 3단계: Anthropic API 키 설정", "설정한 후"),
    ];
    for (name, title, after) in steps {
        let Some(check) = report.check(name) else {
            continue;
        };
        section(out, title)?;
        let mark = if check.passed { "✅" } else { "❌" };
        writeln!(out, "   {mark} {}", check.detail)?;
        writeln!(out)?;
        if check.passed {
            continue;
        }
        for line in &check.remediation {
            writeln!(out, "   {line}")?;
        }
        writeln!(out)?;
        if let Some(reader) = input.as_deref_mut() {
            let hint = if check.required {
                ""
            } else {
                " (현재 설정에서는 선택 사항)"
            };
            write!(
                out,
                "   {after} Enter를 누르세요{hint} (나중에 하려면 그냥 Enter): "
            )?;
            out.flush()?;
            let mut line = String::new();
            reader.read_line(&mut line)?;
            writeln!(out)?;
        }
    }

    section(out, "📖 4단계: 사용 방법")?;
    writeln!(out, "   1️⃣  시나리오 추가 (한 줄 요청 → AI가 5~8개 시나리오로 확장)")?;
    writeln!(out, "       $ letti-qa add \"로그인 기능 테스트\"")?;
    writeln!(out)?;
    writeln!(out, "   2️⃣  시나리오 목록 확인")?;
    writeln!(out, "       $ letti-qa list")?;
    writeln!(out)?;
    writeln!(out, "   3️⃣  Playwright 테스트 코드 생성")?;
    writeln!(out, "       $ letti-qa generate        # 전체 시나리오")?;
    writeln!(out, "       $ letti-qa generate <id>   # 특정 시나리오")?;
    writeln!(out)?;
    writeln!(out, "   4️⃣  시나리오 충돌 검사")?;
    writeln!(out, "       $ letti-qa check")?;
    writeln!(out)?;
    writeln!(out, "   5️⃣  웹 대시보드 실행")?;
    writeln!(out, "       $ letti-qa-web")?;
    writeln!(out, "       → http://localhost:3000 에서 시나리오 관리")?;
    writeln!(out)?;

    section(out, "✨ 설정이 완료되었습니다!")?;
    writeln!(out, "   도움이 필요하면: letti-qa --help")?;
    writeln!(out, "   다시 설정하려면: letti-qa setup")?;
    writeln!(out)?;
    Ok(())
}

fn section<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out, "{RULE}")?;
    writeln!(out, "{title}")?;
    writeln!(out, "{RULE}")?;
    writeln!(out)
}

/// The wizard is offered once: setup never finished and no key anywhere.
pub fn needs_first_run(config: &QaConfig) -> bool {
    !config.setup_complete && !config.has_api_key()
}

/// Welcome banner and Y/n question. Anything but `n` accepts.
pub fn prompt_first_run<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> io::Result<bool> {
    writeln!(out)?;
    writeln!(out, "╔══════════════════════════════════════════════════════════════╗")?;
    writeln!(out, "║  👋 Letti QA에 오신 것을 환영합니다!                         ║")?;
    writeln!(out, "╚══════════════════════════════════════════════════════════════╝")?;
    writeln!(out)?;
    writeln!(out, "   처음 사용하시는 것 같습니다.")?;
    write!(out, "   설정을 시작하시겠습니까? (Y/n): ")?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let accepted = !answer.trim().eq_ignore_ascii_case("n");
    if !accepted {
        writeln!(out)?;
        writeln!(out, "   ⏭️  나중에 'letti-qa setup' 명령으로 설정할 수 있습니다.")?;
        writeln!(out)?;
    }
    Ok(accepted)
}

/// Persist `setup_complete = true` into the on-disk config.
///
/// `file_config` must be the config as loaded from disk, before environment
/// overrides, so that keys from the environment are not written out.
pub fn complete_setup(path: &Path, file_config: &mut QaConfig) -> Result<(), ConfigError> {
    file_config.setup_complete = true;
    save_config(path, file_config)
}
