//! Conflict classification for a scored scenario pair.

use qa_core::types::Scenario;
use serde::{Deserialize, Serialize};

/// Pairs scoring below this are never reported.
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.6;
/// Pairs scoring at or above this are near-duplicates.
pub const REDUNDANT_THRESHOLD: f64 = 0.85;

/// Bump when either sentiment list changes.
pub const SENTIMENT_TABLE_VERSION: u32 = 1;

/// Success, completion and normal-state outcome terms.
pub const POSITIVE_KEYWORDS: &[&str] = &["성공", "완료", "정상", "표시된다", "생성된다", "저장된다"];
/// Failure, error, block and reject outcome terms.
pub const NEGATIVE_KEYWORDS: &[&str] = &["실패", "오류", "경고", "표시되지", "차단", "거부", "중단"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictKind {
    Overlap,
    Contradiction,
    Redundant,
}

impl ConflictKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ConflictKind::Overlap => "overlap",
            ConflictKind::Contradiction => "contradiction",
            ConflictKind::Redundant => "redundant",
        }
    }
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which keyword lists an expected-outcome text hits. Both can be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Sentiment {
    pub positive: bool,
    pub negative: bool,
}

pub fn sentiment(text: &str) -> Sentiment {
    Sentiment {
        positive: contains_any(text, POSITIVE_KEYWORDS),
        negative: contains_any(text, NEGATIVE_KEYWORDS),
    }
}

/// One side reads positive while the other reads negative. Mixed text
/// counts on both sides.
pub fn is_contradiction(a: &Scenario, b: &Scenario) -> bool {
    let a = sentiment(&a.expected_text());
    let b = sentiment(&b.expected_text());
    (a.positive && b.negative) || (a.negative && b.positive)
}

pub fn is_significant(score: f64) -> bool {
    score >= SIGNIFICANCE_THRESHOLD
}

/// First match wins: redundant, then contradiction, then overlap.
pub fn classify(a: &Scenario, b: &Scenario, score: f64) -> ConflictKind {
    if score >= REDUNDANT_THRESHOLD {
        ConflictKind::Redundant
    } else if is_contradiction(a, b) {
        ConflictKind::Contradiction
    } else {
        ConflictKind::Overlap
    }
}

pub fn reason(kind: ConflictKind, score: f64) -> String {
    let percent = (score * 100.0).round() as i64;
    match kind {
        ConflictKind::Redundant => format!("유사도 {percent}%로 거의 동일한 커버리지입니다."),
        ConflictKind::Contradiction => "기대 결과가 서로 상충될 가능성이 있습니다.".to_string(),
        ConflictKind::Overlap => format!("유사도 {percent}%로 중복 커버리지가 있습니다."),
    }
}

pub fn suggestion(kind: ConflictKind) -> &'static str {
    match kind {
        ConflictKind::Redundant => "기존 시나리오와 병합하거나 삭제를 검토하세요.",
        ConflictKind::Contradiction => "기대 결과를 하나로 정리하거나 조건을 분리하세요.",
        ConflictKind::Overlap => "시나리오 범위를 구체화하거나 중복을 줄이세요.",
    }
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| text.contains(keyword))
}
