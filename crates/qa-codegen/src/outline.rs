//! Reads the scenario structure back out of a rendered suite.
//!
//! Only the comment lines are trusted: each `test('...')` opens a case, and the
//! step/expectation comments that follow belong to it. Continuation comments
//! re-join multi-line text with the original line break.

use crate::playwright::{
    CONTINUATION_COMMENT_PREFIX, EXPECTED_COMMENT_PREFIX, LINE_BREAK_ESCAPES,
    STEP_COMMENT_PREFIX,
};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CaseOutline {
    pub title: String,
    pub steps: Vec<String>,
    pub expected: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SuiteOutline {
    pub describe: String,
    pub cases: Vec<CaseOutline>,
}

const DESCRIBE_OPEN: &str = "test.describe('";
const DESCRIBE_CLOSE: &str = "', () => {";
const CASE_OPEN: &str = "test('";
const CASE_CLOSE: &str = "', async ({ page }) => {";

#[derive(Debug, Clone, Copy)]
enum Open {
    Step,
    Expected,
}

pub fn parse_suite_outline(content: &str) -> SuiteOutline {
    let mut outline = SuiteOutline::default();
    let mut open = None;

    for line in content.lines() {
        let line = line.trim_start();
        if let Some(name) = enclosed(line, DESCRIBE_OPEN, DESCRIBE_CLOSE) {
            outline.describe = unescape_quote(name);
            open = None;
        } else if let Some(title) = enclosed(line, CASE_OPEN, CASE_CLOSE) {
            outline.cases.push(CaseOutline {
                title: unescape_quote(title),
                ..CaseOutline::default()
            });
            open = None;
        } else if let Some(rest) = line.strip_prefix(CONTINUATION_COMMENT_PREFIX) {
            let target = outline.cases.last_mut().and_then(|case| match open {
                Some(Open::Step) => case.steps.last_mut(),
                Some(Open::Expected) => case.expected.last_mut(),
                None => None,
            });
            if let (Some(target), Some((brk, text))) = (target, continuation(rest)) {
                target.push(brk);
                target.push_str(text);
            }
        } else if let Some(step) = line.strip_prefix(STEP_COMMENT_PREFIX) {
            if let Some(case) = outline.cases.last_mut() {
                case.steps.push(step.to_string());
                open = Some(Open::Step);
            }
        } else if let Some(expected) = line.strip_prefix(EXPECTED_COMMENT_PREFIX) {
            if let Some(case) = outline.cases.last_mut() {
                case.expected.push(expected.to_string());
                open = Some(Open::Expected);
            }
        }
    }

    outline
}

fn continuation(rest: &str) -> Option<(char, &str)> {
    LINE_BREAK_ESCAPES.iter().find_map(|(brk, escaped)| {
        let text = rest.strip_prefix(escaped)?.strip_prefix(' ')?;
        Some((*brk, text))
    })
}

fn enclosed<'a>(line: &'a str, open: &str, close: &str) -> Option<&'a str> {
    line.strip_prefix(open)?.strip_suffix(close)
}

/// Reverses `escape_quote`. Unknown escapes are kept as written.
fn unescape_quote(text: &str) -> String {
    let mut unescaped = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            unescaped.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => unescaped.push('\\'),
            Some('\'') => unescaped.push('\''),
            Some('n') => unescaped.push('\n'),
            Some('r') => unescaped.push('\r'),
            Some('u') => {
                let code = chars.by_ref().take(4).collect::<String>();
                match u32::from_str_radix(&code, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if code.len() == 4 => unescaped.push(decoded),
                    _ => {
                        unescaped.push_str("\\u");
                        unescaped.push_str(&code);
                    }
                }
            }
            Some(other) => {
                unescaped.push('\\');
                unescaped.push(other);
            }
            None => unescaped.push('\\'),
        }
    }
    unescaped
}
