//! Plain-text CLI output for each command.

use crate::service::{AddOutcome, CheckReport, GeneratedSuite};
use qa_analyze::Conflict;
use qa_core::types::ScenarioGroup;

pub const MISSING_INPUT_HINT: &str = "추가할 시나리오 한 줄 설명을 입력해 주세요.";
pub const GROUP_NOT_FOUND: &str = "해당 ID의 시나리오 그룹을 찾을 수 없습니다.";
pub const NO_CONFLICTS: &str = "충돌이 감지되지 않았습니다.";

pub fn add_lines(outcome: &AddOutcome) -> Vec<String> {
    let mut lines = vec![
        format!("시나리오 그룹이 저장되었습니다: {}", outcome.group.id),
        format!(
            "총 {}개의 시나리오가 생성되었습니다.",
            outcome.group.scenarios.len()
        ),
    ];
    if outcome.conflicts.is_empty() {
        lines.push(NO_CONFLICTS.to_string());
        return lines;
    }

    lines.push("충돌 후보가 감지되었습니다:".to_string());
    for conflict in &outcome.conflicts {
        lines.push(format!(
            "- [{}] {} ↔ {}:{}",
            conflict.kind,
            conflict.scenario_a.title,
            conflict.group_b.label(),
            conflict.scenario_b.title
        ));
        push_advice(&mut lines, conflict);
    }
    lines
}

pub fn list_lines(groups: &[ScenarioGroup]) -> Vec<String> {
    if groups.is_empty() {
        return vec!["저장된 시나리오 그룹이 없습니다.".to_string()];
    }

    let mut lines = vec!["시나리오 그룹 목록:".to_string()];
    lines.extend(groups.iter().map(|group| {
        format!(
            "- {} | {} | {}개",
            group.id,
            group.input,
            group.scenarios.len()
        )
    }));
    lines
}

pub fn generate_lines(suites: &[GeneratedSuite]) -> Vec<String> {
    if suites.is_empty() {
        return vec!["생성할 시나리오 그룹이 없습니다.".to_string()];
    }
    suites
        .iter()
        .map(|suite| format!("테스트 파일이 생성되었습니다: {}", suite.file_path))
        .collect()
}

pub fn check_lines(report: &CheckReport) -> Vec<String> {
    if report.group_count == 0 {
        return vec!["검사할 시나리오 그룹이 없습니다.".to_string()];
    }
    if report.conflicts.is_empty() {
        return vec![NO_CONFLICTS.to_string()];
    }

    let summary = &report.summary;
    let mut lines = vec![
        format!("총 {}건의 충돌 후보가 있습니다.", summary.total),
        format!(
            "(overlap {} / contradiction {} / redundant {})",
            summary.overlap, summary.contradiction, summary.redundant
        ),
    ];
    for conflict in &report.conflicts {
        lines.push(format!(
            "- [{}] {}:{}",
            conflict.kind,
            conflict.group_a.label(),
            conflict.scenario_a.title
        ));
        lines.push(format!(
            "  대상: {}:{}",
            conflict.group_b.label(),
            conflict.scenario_b.title
        ));
        push_advice(&mut lines, conflict);
    }
    lines
}

fn push_advice(lines: &mut Vec<String>, conflict: &Conflict) {
    lines.push(format!("  이유: {}", conflict.reason));
    lines.push(format!("  제안: {}", conflict.suggestion));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use qa_analyze::{ConflictKind, ConflictSummary, GroupRef};
    use qa_core::types::{GenerationRecord, GroupId, Scenario, ScenarioId, ScenarioSource};

    fn scenario(id: &str, title: &str) -> Scenario {
        Scenario {
            id: ScenarioId::new(id),
            title: title.to_string(),
            steps: Vec::new(),
            expected: Vec::new(),
            tags: None,
        }
    }

    fn group(id: &str, input: &str, scenarios: Vec<Scenario>) -> ScenarioGroup {
        ScenarioGroup {
            id: GroupId::new(id),
            input: input.to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            scenarios,
            source: ScenarioSource::Generated,
            generation_history: Vec::new(),
        }
    }

    fn conflict(group_a: GroupRef, group_b: GroupRef) -> Conflict {
        Conflict {
            kind: ConflictKind::Overlap,
            scenario_a: scenario("a", "새 시나리오"),
            group_a,
            scenario_b: scenario("b", "기존 시나리오"),
            group_b,
            score: 0.7,
            reason: "유사도 70%로 중복 커버리지가 있습니다.".to_string(),
            suggestion: "시나리오 범위를 구체화하거나 중복을 줄이세요.".to_string(),
        }
    }

    #[test]
    fn add_without_conflicts() {
        let outcome = AddOutcome {
            group: group("g1", "로그인", vec![scenario("a", "x"), scenario("b", "y")]),
            conflicts: Vec::new(),
        };
        assert_eq!(
            add_lines(&outcome),
            vec![
                "시나리오 그룹이 저장되었습니다: g1",
                "총 2개의 시나리오가 생성되었습니다.",
                "충돌이 감지되지 않았습니다.",
            ]
        );
    }

    #[test]
    fn add_lists_each_conflict_with_advice() {
        let existing = group("g0", "기존", Vec::new());
        let outcome = AddOutcome {
            group: group("g1", "로그인", vec![scenario("a", "새 시나리오")]),
            conflicts: vec![conflict(GroupRef::Pending, GroupRef::persisted(&existing))],
        };
        let lines = add_lines(&outcome);
        assert_eq!(lines[2], "충돌 후보가 감지되었습니다:");
        assert_eq!(lines[3], "- [overlap] 새 시나리오 ↔ g0:기존 시나리오");
        assert_eq!(lines[4], "  이유: 유사도 70%로 중복 커버리지가 있습니다.");
        assert!(lines[5].starts_with("  제안: "));
    }

    #[test]
    fn list_shows_id_input_and_count() {
        assert_eq!(list_lines(&[]), vec!["저장된 시나리오 그룹이 없습니다."]);
        let lines = list_lines(&[group("g1", "배경 제거", vec![scenario("a", "x")])]);
        assert_eq!(lines, vec!["시나리오 그룹 목록:", "- g1 | 배경 제거 | 1개"]);
    }

    #[test]
    fn generate_prints_each_file() {
        assert_eq!(generate_lines(&[]), vec!["생성할 시나리오 그룹이 없습니다."]);
        let record = GenerationRecord {
            generated_at: Utc::now(),
            test_file: "tests/g1.test.ts".to_string(),
        };
        let suite = GeneratedSuite {
            group_id: GroupId::new("g1"),
            file_name: "g1.test.ts".to_string(),
            file_path: record.test_file.clone(),
            content: String::new(),
            record,
        };
        assert_eq!(
            generate_lines(&[suite]),
            vec!["테스트 파일이 생성되었습니다: tests/g1.test.ts"]
        );
    }

    #[test]
    fn check_distinguishes_empty_corpus_from_clean_corpus() {
        let empty = CheckReport {
            group_count: 0,
            conflicts: Vec::new(),
            summary: ConflictSummary::default(),
        };
        assert_eq!(check_lines(&empty), vec!["검사할 시나리오 그룹이 없습니다."]);

        let clean = CheckReport {
            group_count: 3,
            ..empty
        };
        assert_eq!(check_lines(&clean), vec!["충돌이 감지되지 않았습니다."]);
    }

    #[test]
    fn check_prints_both_sides() {
        let g = group("g1", "x", Vec::new());
        let conflicts = vec![conflict(GroupRef::persisted(&g), GroupRef::persisted(&g))];
        let report = CheckReport {
            group_count: 1,
            summary: ConflictSummary::from_conflicts(&conflicts),
            conflicts,
        };
        let lines = check_lines(&report);
        assert_eq!(lines[0], "총 1건의 충돌 후보가 있습니다.");
        assert_eq!(lines[1], "(overlap 1 / contradiction 0 / redundant 0)");
        assert_eq!(lines[2], "- [overlap] g1:새 시나리오");
        assert_eq!(lines[3], "  대상: g1:기존 시나리오");
    }
}
