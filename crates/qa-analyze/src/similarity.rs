//! Token-set similarity between scenarios.
//!
//! Text is lower-cased, every character that is not a letter, digit or
//! whitespace becomes a separator, and the distinct remaining words form the
//! scenario's token set. Two scenarios are compared with the Jaccard index of
//! their token sets.

use qa_core::types::Scenario;
use std::collections::HashSet;

/// Distinct tokens of one scenario.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSet {
    tokens: HashSet<String>,
}

impl TokenSet {
    pub fn from_text(text: &str) -> Self {
        Self {
            tokens: tokenize(text).into_iter().collect(),
        }
    }

    pub fn from_scenario(scenario: &Scenario) -> Self {
        Self::from_text(&scenario.full_text())
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    /// |A ∩ B| / |A ∪ B|, or 0 when both sets are empty.
    pub fn jaccard(&self, other: &TokenSet) -> f64 {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        let intersection = small
            .tokens
            .iter()
            .filter(|token| large.tokens.contains(*token))
            .count();
        let union = self.len() + other.len() - intersection;
        if union == 0 {
            return 0.0;
        }
        intersection as f64 / union as f64
    }
}

/// Split free text into normalized tokens, keeping duplicates and order.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = text
        .to_lowercase()
        .chars()
        .map(|ch| if ch.is_alphanumeric() { ch } else { ' ' })
        .collect::<String>();
    normalized
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Jaccard similarity of the two scenarios' token sets, in `[0, 1]`.
pub fn similarity(a: &Scenario, b: &Scenario) -> f64 {
    TokenSet::from_scenario(a).jaccard(&TokenSet::from_scenario(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use qa_core::types::ScenarioId;

    fn scenario(title: &str, steps: &[&str], expected: &[&str]) -> Scenario {
        Scenario {
            id: ScenarioId::new(title),
            title: title.to_string(),
            steps: steps.iter().map(|s| s.to_string()).collect(),
            expected: expected.iter().map(|s| s.to_string()).collect(),
            tags: None,
        }
    }

    #[test]
    fn tokenize_lowercases_and_strips_punctuation() {
        assert_eq!(
            tokenize("Upload  the \"PNG\" file!\n(max 10MB)"),
            vec!["upload", "the", "png", "file", "max", "10mb"]
        );
    }

    #[test]
    fn tokenize_keeps_hangul_words() {
        assert_eq!(
            tokenize("파일을 업로드한다. 결과가 표시된다!"),
            vec!["파일을", "업로드한다", "결과가", "표시된다"]
        );
    }

    #[test]
    fn tokenize_drops_empty_tokens() {
        assert!(tokenize("  ... --- !!! ").is_empty());
    }

    #[test]
    fn token_set_collapses_duplicates() {
        let set = TokenSet::from_text("a a b A");
        assert_eq!(set.len(), 2);
        assert!(set.contains("a"));
        assert!(set.contains("b"));
    }

    #[test]
    fn identical_scenarios_score_one() {
        let a = scenario("배경 제거", &["이미지를 업로드한다"], &["배경이 제거된다"]);
        assert_eq!(similarity(&a, &a), 1.0);
    }

    #[test]
    fn empty_scenarios_score_zero() {
        let a = scenario("", &[], &[]);
        let b = scenario("?!", &["..."], &[]);
        assert_eq!(similarity(&a, &b), 0.0);
    }

    #[test]
    fn shared_tokens_over_union() {
        let a = scenario("업로드 파일 a1 a2 a3 a4", &[], &[]);
        let b = scenario("업로드 파일 b1 b2 b3 b4", &[], &[]);
        assert!((similarity(&a, &b) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn title_steps_and_expected_all_contribute() {
        let a = scenario("x", &["y"], &["z"]);
        let b = scenario("z", &["x"], &["y"]);
        assert_eq!(similarity(&a, &b), 1.0);
    }

    fn text_strategy() -> impl Strategy<Value = String> {
        proptest::string::string_regex("[a-c가나 .!]{0,24}").expect("valid regex")
    }

    fn scenario_strategy() -> impl Strategy<Value = Scenario> {
        (
            text_strategy(),
            prop::collection::vec(text_strategy(), 0..3),
            prop::collection::vec(text_strategy(), 0..3),
        )
            .prop_map(|(title, steps, expected)| Scenario {
                id: ScenarioId::new("generated"),
                title,
                steps,
                expected,
                tags: None,
            })
    }

    proptest! {
        #[test]
        fn similarity_is_symmetric(a in scenario_strategy(), b in scenario_strategy()) {
            prop_assert_eq!(similarity(&a, &b), similarity(&b, &a));
        }

        #[test]
        fn similarity_is_bounded(a in scenario_strategy(), b in scenario_strategy()) {
            let score = similarity(&a, &b);
            prop_assert!((0.0..=1.0).contains(&score), "score={score}");
        }

        #[test]
        fn similarity_is_reflexive_for_non_empty(a in scenario_strategy()) {
            let score = similarity(&a, &a);
            if TokenSet::from_scenario(&a).is_empty() {
                prop_assert_eq!(score, 0.0);
            } else {
                prop_assert_eq!(score, 1.0);
            }
        }
    }
}
