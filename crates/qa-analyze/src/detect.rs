//! Pairwise conflict detection over the scenario corpus.
//!
//! Two traversals share the same pair evaluation:
//! - [`detect_conflicts`] compares not-yet-saved scenarios with the stored
//!   corpus, so a new scenario is never compared with itself.
//! - [`detect_all_conflicts`] walks every group pair `(i, j)` with `j >= i`.
//!   Pairs inside one group are therefore reported in both directions, while
//!   pairs across groups are reported once. Existing reports depend on this
//!   shape, so it is kept as is.
//!
//! Results come back in visiting order. Nothing is cached between calls.

use qa_core::types::{GroupId, Scenario, ScenarioGroup};
use serde::{Deserialize, Serialize};

use crate::classify::{classify, is_significant, reason, suggestion, ConflictKind};
use crate::similarity::TokenSet;

/// Display label for scenarios that are not persisted yet.
pub const PENDING_GROUP_LABEL: &str = "(신규)";

/// The group a conflicting scenario belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GroupRef {
    Persisted { id: GroupId, input: String },
    /// The scenario is part of a group that has not been saved yet. The
    /// scenario itself is the conflict's `scenario_a`.
    Pending,
}

impl GroupRef {
    pub fn persisted(group: &ScenarioGroup) -> Self {
        GroupRef::Persisted {
            id: group.id.clone(),
            input: group.input.clone(),
        }
    }

    pub fn id(&self) -> Option<&GroupId> {
        match self {
            GroupRef::Persisted { id, .. } => Some(id),
            GroupRef::Pending => None,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            GroupRef::Persisted { id, .. } => id.as_ref(),
            GroupRef::Pending => PENDING_GROUP_LABEL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    #[serde(rename = "type")]
    pub kind: ConflictKind,
    pub scenario_a: Scenario,
    pub group_a: GroupRef,
    pub scenario_b: Scenario,
    pub group_b: GroupRef,
    pub score: f64,
    pub reason: String,
    pub suggestion: String,
}

/// Per-kind counts for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConflictSummary {
    pub total: usize,
    pub overlap: usize,
    pub contradiction: usize,
    pub redundant: usize,
}

impl ConflictSummary {
    pub fn from_conflicts(conflicts: &[Conflict]) -> Self {
        let mut summary = Self::default();
        for conflict in conflicts {
            summary.total += 1;
            match conflict.kind {
                ConflictKind::Overlap => summary.overlap += 1,
                ConflictKind::Contradiction => summary.contradiction += 1,
                ConflictKind::Redundant => summary.redundant += 1,
            }
        }
        summary
    }
}

struct Indexed<'a> {
    scenario: &'a Scenario,
    tokens: TokenSet,
}

impl<'a> Indexed<'a> {
    fn new(scenario: &'a Scenario) -> Self {
        Self {
            scenario,
            tokens: TokenSet::from_scenario(scenario),
        }
    }
}

fn evaluate_pair(
    a: &Indexed<'_>,
    group_a: &GroupRef,
    b: &Indexed<'_>,
    group_b: &GroupRef,
) -> Option<Conflict> {
    let score = a.tokens.jaccard(&b.tokens);
    if !is_significant(score) {
        return None;
    }
    let kind = classify(a.scenario, b.scenario, score);
    Some(Conflict {
        kind,
        scenario_a: a.scenario.clone(),
        group_a: group_a.clone(),
        scenario_b: b.scenario.clone(),
        group_b: group_b.clone(),
        score,
        reason: reason(kind, score),
        suggestion: suggestion(kind).to_string(),
    })
}

/// Compare scenarios that are about to be saved against the existing corpus.
///
/// Visiting order: existing group, then existing scenario, then new scenario.
pub fn detect_conflicts(new_scenarios: &[Scenario], existing: &[ScenarioGroup]) -> Vec<Conflict> {
    let pending = new_scenarios.iter().map(Indexed::new).collect::<Vec<_>>();
    let mut conflicts = Vec::new();

    for group in existing {
        let group_ref = GroupRef::persisted(group);
        for stored in &group.scenarios {
            let stored = Indexed::new(stored);
            for candidate in &pending {
                if let Some(conflict) =
                    evaluate_pair(candidate, &GroupRef::Pending, &stored, &group_ref)
                {
                    conflicts.push(conflict);
                }
            }
        }
    }

    tracing::debug!(
        new_scenarios = new_scenarios.len(),
        groups = existing.len(),
        conflicts = conflicts.len(),
        "incremental conflict detection finished"
    );
    conflicts
}

/// Compare every scenario in the corpus against every other one.
pub fn detect_all_conflicts(groups: &[ScenarioGroup]) -> Vec<Conflict> {
    let indexed = groups
        .iter()
        .map(|group| {
            (
                GroupRef::persisted(group),
                group.scenarios.iter().map(Indexed::new).collect::<Vec<_>>(),
            )
        })
        .collect::<Vec<_>>();
    let mut conflicts = Vec::new();

    for i in 0..groups.len() {
        for j in i..groups.len() {
            let (ref_a, scenarios_a) = &indexed[i];
            let (ref_b, scenarios_b) = &indexed[j];
            let same_group = groups[i].id == groups[j].id;
            for a in scenarios_a {
                for b in scenarios_b {
                    if same_group && a.scenario.id == b.scenario.id {
                        continue;
                    }
                    if let Some(conflict) = evaluate_pair(a, ref_a, b, ref_b) {
                        conflicts.push(conflict);
                    }
                }
            }
        }
    }

    tracing::debug!(
        groups = groups.len(),
        conflicts = conflicts.len(),
        "full conflict detection finished"
    );
    conflicts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use qa_core::types::{ScenarioId, ScenarioSource};

    fn scenario(id: &str, title: &str, expected: &[&str]) -> Scenario {
        Scenario {
            id: ScenarioId::new(id),
            title: title.to_string(),
            steps: Vec::new(),
            expected: expected.iter().map(|s| s.to_string()).collect(),
            tags: None,
        }
    }

    fn group(id: &str, scenarios: Vec<Scenario>) -> ScenarioGroup {
        ScenarioGroup {
            id: GroupId::new(id),
            input: format!("{id} 요청"),
            created_at: Utc::now(),
            scenarios,
            source: ScenarioSource::Generated,
            generation_history: Vec::new(),
        }
    }

    // Nine shared tokens plus one extra: score 0.9.
    const NINE: &str = "t1 t2 t3 t4 t5 t6 t7 t8 t9";
    const TEN: &str = "t1 t2 t3 t4 t5 t6 t7 t8 t9 t10";

    #[test]
    fn empty_corpus_yields_no_conflicts() {
        let new = vec![scenario("n1", NINE, &[])];
        assert!(detect_conflicts(&new, &[]).is_empty());
        assert!(detect_all_conflicts(&[]).is_empty());
    }

    #[test]
    fn low_similarity_pairs_are_excluded() {
        let new = vec![scenario("n1", "업로드 파일 a1 a2 a3 a4", &[])];
        let existing = vec![group("g1", vec![scenario("s1", "업로드 파일 b1 b2 b3 b4", &[])])];
        assert!(detect_conflicts(&new, &existing).is_empty());
    }

    #[test]
    fn incremental_detection_marks_new_side_pending() {
        let new = vec![scenario("n1", NINE, &[])];
        let existing = vec![group("g1", vec![scenario("s1", TEN, &[])])];

        let conflicts = detect_conflicts(&new, &existing);
        assert_eq!(conflicts.len(), 1);
        let conflict = &conflicts[0];
        assert_eq!(conflict.kind, ConflictKind::Redundant);
        assert_eq!(conflict.group_a, GroupRef::Pending);
        assert_eq!(conflict.group_a.label(), PENDING_GROUP_LABEL);
        assert_eq!(conflict.group_b.id(), Some(&GroupId::new("g1")));
        assert_eq!(conflict.scenario_a.id, ScenarioId::new("n1"));
        assert_eq!(conflict.scenario_b.id, ScenarioId::new("s1"));
        assert!((conflict.score - 0.9).abs() < 1e-12);
    }

    #[test]
    fn incremental_detection_visits_existing_scenarios_first() {
        let new = vec![scenario("n1", TEN, &[]), scenario("n2", TEN, &[])];
        let existing = vec![group(
            "g1",
            vec![scenario("s1", TEN, &[]), scenario("s2", TEN, &[])],
        )];
        let order = detect_conflicts(&new, &existing)
            .iter()
            .map(|c| format!("{}-{}", c.scenario_a.id, c.scenario_b.id))
            .collect::<Vec<_>>();
        assert_eq!(order, vec!["n1-s1", "n2-s1", "n1-s2", "n2-s2"]);
    }

    #[test]
    fn single_scenario_group_has_no_self_conflict() {
        let groups = vec![group("g1", vec![scenario("s1", TEN, &[])])];
        assert!(detect_all_conflicts(&groups).is_empty());
    }

    #[test]
    fn intra_group_duplicates_are_redundant() {
        let groups = vec![group(
            "g1",
            vec![scenario("a", NINE, &[]), scenario("b", TEN, &[])],
        )];
        let conflicts = detect_all_conflicts(&groups);
        assert!(conflicts
            .iter()
            .any(|c| c.kind == ConflictKind::Redundant));
    }

    #[test]
    fn intra_group_pairs_are_reported_both_ways_and_cross_group_once() {
        let groups = vec![
            group("g1", vec![scenario("a", TEN, &[]), scenario("b", TEN, &[])]),
            group("g2", vec![scenario("c", TEN, &[])]),
        ];
        let pairs = detect_all_conflicts(&groups)
            .iter()
            .map(|c| {
                format!(
                    "{}:{}-{}:{}",
                    c.group_a.label(),
                    c.scenario_a.id,
                    c.group_b.label(),
                    c.scenario_b.id
                )
            })
            .collect::<Vec<_>>();
        assert_eq!(
            pairs,
            vec!["g1:a-g1:b", "g1:b-g1:a", "g1:a-g2:c", "g1:b-g2:c"]
        );
    }

    #[test]
    fn same_scenario_id_in_different_groups_is_compared() {
        let groups = vec![
            group("g1", vec![scenario("s1", TEN, &[])]),
            group("g2", vec![scenario("s1", TEN, &[])]),
        ];
        let conflicts = detect_all_conflicts(&groups);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].group_b.label(), "g2");
    }

    #[test]
    fn contradiction_is_detected_between_groups() {
        let groups = vec![
            group(
                "g1",
                vec![scenario("a", "파일 업로드 후 저장 버튼 클릭", &["정상적으로 저장된다"])],
            ),
            group(
                "g2",
                vec![scenario("b", "파일 업로드 후 저장 버튼 클릭", &["저장에 실패한다"])],
            ),
        ];
        let conflicts = detect_all_conflicts(&groups);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::Contradiction);
        assert_eq!(conflicts[0].reason, reason(ConflictKind::Contradiction, 0.0));
    }

    #[test]
    fn summary_counts_each_kind() {
        let groups = vec![group(
            "g1",
            vec![scenario("a", NINE, &[]), scenario("b", TEN, &[])],
        )];
        let conflicts = detect_all_conflicts(&groups);
        let summary = ConflictSummary::from_conflicts(&conflicts);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.redundant, 2);
        assert_eq!(summary.overlap + summary.contradiction, 0);
    }

    #[test]
    fn conflict_serializes_with_type_key_and_tagged_groups() {
        let new = vec![scenario("n1", TEN, &[])];
        let existing = vec![group("g1", vec![scenario("s1", TEN, &[])])];
        let conflict = detect_conflicts(&new, &existing).remove(0);
        let value = serde_json::to_value(&conflict).expect("serialize");
        assert_eq!(value["type"], "redundant");
        assert_eq!(value["groupA"]["kind"], "pending");
        assert_eq!(value["groupB"]["kind"], "persisted");
        assert_eq!(value["groupB"]["id"], "g1");
        assert_eq!(value["scenarioB"]["id"], "s1");
    }
}
