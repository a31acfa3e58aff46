//! Keyword tables that map free-text steps and expectations to test actions.
//!
//! Matching is case-sensitive substring containment. Step rules are
//! independent (a step may trigger several actions); expectation rules are
//! checked in order and the first match wins.

/// Bump when a rule or keyword changes so generated suites can be traced back
/// to the table that produced them.
pub const KEYWORD_TABLE_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepAction {
    Navigate,
    Upload,
    Login,
    Click,
    Fill,
    Dropdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpectationCheck {
    ErrorVisible,
    SuccessToast,
    LoadingHidden,
    ResultVisible,
}

#[derive(Debug, Clone, Copy)]
pub struct StepRule {
    pub action: StepAction,
    pub keywords: &'static [&'static str],
}

#[derive(Debug, Clone, Copy)]
pub struct ExpectationRule {
    pub check: ExpectationCheck,
    pub keywords: &'static [&'static str],
}

pub const STEP_RULES: &[StepRule] = &[
    StepRule {
        action: StepAction::Navigate,
        keywords: &["접속", "페이지", "열기"],
    },
    StepRule {
        action: StepAction::Upload,
        keywords: &["업로드", "파일"],
    },
    StepRule {
        action: StepAction::Login,
        keywords: &["로그인", "로그 인"],
    },
    StepRule {
        action: StepAction::Click,
        keywords: &["클릭", "누른다", "선택"],
    },
    StepRule {
        action: StepAction::Fill,
        keywords: &["입력", "작성"],
    },
    StepRule {
        action: StepAction::Dropdown,
        keywords: &["드롭다운", "선택"],
    },
];

/// Order matters: error terms are checked before success terms.
pub const EXPECTATION_RULES: &[ExpectationRule] = &[
    ExpectationRule {
        check: ExpectationCheck::ErrorVisible,
        keywords: &["오류", "실패", "경고"],
    },
    ExpectationRule {
        check: ExpectationCheck::SuccessToast,
        keywords: &["성공", "완료", "정상"],
    },
    ExpectationRule {
        check: ExpectationCheck::LoadingHidden,
        keywords: &["로딩", "대기"],
    },
    ExpectationRule {
        check: ExpectationCheck::ResultVisible,
        keywords: &["표시", "보인다"],
    },
];

/// Every action whose keywords occur in `step`, in table order.
pub fn step_actions(step: &str) -> Vec<StepAction> {
    STEP_RULES
        .iter()
        .filter(|rule| contains_any(step, rule.keywords))
        .map(|rule| rule.action)
        .collect()
}

/// The first matching check, or `None` when the literal-text fallback applies.
pub fn expectation_check(expected: &str) -> Option<ExpectationCheck> {
    EXPECTATION_RULES
        .iter()
        .find(|rule| contains_any(expected, rule.keywords))
        .map(|rule| rule.check)
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| text.contains(keyword))
}
