//! Playwright suite rendering for a scenario group.

use crate::keywords::{expectation_check, step_actions, ExpectationCheck, StepAction};
use qa_core::config::{CodegenConfig, DEFAULT_BASE_URL, DEFAULT_FIXTURE_PATH};
use qa_core::types::{GroupId, Scenario, ScenarioGroup};
use serde::{Deserialize, Serialize};

pub const TEST_FILE_SUFFIX: &str = ".test.ts";
pub const STEP_COMMENT_PREFIX: &str = "// 단계: ";
pub const EXPECTED_COMMENT_PREFIX: &str = "// 기대: ";
/// Continues the previous step or expectation comment after a line break.
/// Followed by the escaped break and one space, e.g. `//+\n `.
pub const CONTINUATION_COMMENT_PREFIX: &str = "//+";
pub const MISSING_ACTION_LINE: &str = "// TODO: 필요한 사용자 동작을 추가하세요.";
/// Label used when a step names no quoted UI element.
pub const PLACEHOLDER_LABEL: &str = "TODO";
pub const FILL_VALUE: &str = "테스트 입력";

const INDENT: &str = "    ";
const QUOTE_CHARS: [char; 4] = ['"', '“', '”', '\''];
const REGEX_SPECIALS: &str = ".*+?^${}()|[]\\/";
/// JavaScript line terminators and their escaped spelling.
pub(crate) const LINE_BREAK_ESCAPES: [(char, &str); 4] = [
    ('\n', "\\n"),
    ('\r', "\\r"),
    ('\u{2028}', "\\u2028"),
    ('\u{2029}', "\\u2029"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenOptions {
    pub base_url: String,
    pub fixture_path: String,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            fixture_path: DEFAULT_FIXTURE_PATH.to_string(),
        }
    }
}

impl From<&CodegenConfig> for CodegenOptions {
    fn from(config: &CodegenConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            fixture_path: config.fixture_path.clone(),
        }
    }
}

/// A rendered test file, not yet written anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSuite {
    pub file_name: String,
    pub content: String,
}

pub fn suite_file_name(group_id: &GroupId) -> String {
    format!("{group_id}{TEST_FILE_SUFFIX}")
}

pub fn render_test_suite(group: &ScenarioGroup) -> TestSuite {
    render_test_suite_with(group, &CodegenOptions::default())
}

/// Lines are joined with `\n` and the file has no trailing newline.
pub fn render_test_suite_with(group: &ScenarioGroup, options: &CodegenOptions) -> TestSuite {
    let mut lines = vec![
        "import { test, expect } from '@playwright/test';".to_string(),
        String::new(),
        format!("test.describe('{}', () => {{", escape_quote(&group.input)),
    ];

    for scenario in &group.scenarios {
        render_case(&mut lines, scenario, options);
    }

    lines.push("});".to_string());

    TestSuite {
        file_name: suite_file_name(&group.id),
        content: lines.join("\n"),
    }
}

fn render_case(lines: &mut Vec<String>, scenario: &Scenario, options: &CodegenOptions) {
    lines.push(format!(
        "  test('{}', async ({{ page }}) => {{",
        escape_quote(&scenario.title)
    ));
    lines.push(format!("{INDENT}{}", goto_line(options)));
    lines.push(format!(
        "{INDENT}await page.waitForLoadState('domcontentloaded');"
    ));

    for step in &scenario.steps {
        push_comment(lines, STEP_COMMENT_PREFIX, step);
        for action in step_to_actions(step, options) {
            lines.push(format!("{INDENT}{action}"));
        }
    }

    lines.push(format!("{INDENT}await page.waitForLoadState('networkidle');"));

    for expected in &scenario.expected {
        push_comment(lines, EXPECTED_COMMENT_PREFIX, expected);
        lines.push(format!("{INDENT}{}", expected_to_assertion(expected)));
    }

    lines.push("  });".to_string());
    lines.push(String::new());
}

/// Source text stays verbatim; each line break starts a continuation comment.
fn push_comment(lines: &mut Vec<String>, prefix: &str, text: &str) {
    let mut current = prefix.to_string();
    let mut start = 0;
    for (index, ch) in text.char_indices() {
        if let Some(escaped) = line_break_escape(ch) {
            lines.push(format!("{INDENT}{current}{}", &text[start..index]));
            current = format!("{CONTINUATION_COMMENT_PREFIX}{escaped} ");
            start = index + ch.len_utf8();
        }
    }
    lines.push(format!("{INDENT}{current}{}", &text[start..]));
}

fn line_break_escape(ch: char) -> Option<&'static str> {
    LINE_BREAK_ESCAPES
        .iter()
        .find(|(brk, _)| *brk == ch)
        .map(|(_, escaped)| *escaped)
}

/// Action lines for one step; never empty.
pub fn step_to_actions(step: &str, options: &CodegenOptions) -> Vec<String> {
    let actions = step_actions(step);
    if actions.is_empty() {
        return vec![MISSING_ACTION_LINE.to_string()];
    }

    let label = escape_regex(extract_quoted(step).unwrap_or(PLACEHOLDER_LABEL));
    actions
        .into_iter()
        .map(|action| match action {
            StepAction::Navigate => goto_line(options),
            StepAction::Upload => format!(
                "await page.setInputFiles('input[type=\"file\"]', '{}');",
                escape_quote(&options.fixture_path)
            ),
            StepAction::Login => {
                "await page.getByRole('button', { name: /로그인/ }).click();".to_string()
            }
            StepAction::Click => {
                format!("await page.getByRole('button', {{ name: /{label}/ }}).click();")
            }
            StepAction::Fill => {
                format!("await page.getByPlaceholder(/{label}/).fill('{FILL_VALUE}');")
            }
            StepAction::Dropdown => {
                format!("await page.getByRole('option', {{ name: /{label}/ }}).click();")
            }
        })
        .collect()
}

/// Exactly one assertion line per expectation.
pub fn expected_to_assertion(expected: &str) -> String {
    match expectation_check(expected) {
        Some(ExpectationCheck::ErrorVisible) => {
            "await expect(page.getByTestId('error')).toBeVisible();".to_string()
        }
        Some(ExpectationCheck::SuccessToast) => {
            "await expect(page.getByTestId('toast')).toContainText(/성공|완료|정상/);".to_string()
        }
        Some(ExpectationCheck::LoadingHidden) => {
            "await expect(page.getByTestId('loading')).toBeHidden();".to_string()
        }
        Some(ExpectationCheck::ResultVisible) => {
            "await expect(page.getByTestId('result')).toBeVisible();".to_string()
        }
        None => format!(
            "await expect(page.locator('body')).toContainText('{}');",
            escape_quote(expected)
        ),
    }
}

fn goto_line(options: &CodegenOptions) -> String {
    format!("await page.goto('{}');", escape_quote(&options.base_url))
}

/// Text between the first pair of adjacent quote marks that encloses at
/// least one character. Straight and curly quotes are interchangeable.
pub fn extract_quoted(text: &str) -> Option<&str> {
    let quotes = text
        .char_indices()
        .filter(|(_, ch)| QUOTE_CHARS.contains(ch))
        .map(|(idx, ch)| (idx, idx + ch.len_utf8()))
        .collect::<Vec<_>>();

    quotes.windows(2).find_map(|pair| {
        let (_, inner_start) = pair[0];
        let (inner_end, _) = pair[1];
        (inner_end > inner_start).then(|| &text[inner_start..inner_end])
    })
}

/// Escape text for a single-quoted TS string literal: backslashes, single
/// quotes and line terminators.
pub fn escape_quote(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            _ => match line_break_escape(ch) {
                Some(sequence) => escaped.push_str(sequence),
                None => escaped.push(ch),
            },
        }
    }
    escaped
}

/// Backslash-escape regex metacharacters and line terminators for a
/// `/.../` literal.
pub fn escape_regex(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if let Some(sequence) = line_break_escape(ch) {
            escaped.push_str(sequence);
            continue;
        }
        if REGEX_SPECIALS.contains(ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
