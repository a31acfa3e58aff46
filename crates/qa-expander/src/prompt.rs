//! Prompt construction and response parsing shared by every provider.

use crate::ExpandError;
use qa_core::types::ScenarioDraft;
use serde_json::Value;

pub fn build_prompt(request: &str) -> String {
    [
        "너는 QA 테스트 시나리오 작성 전문가야.",
        "사용자의 한 줄 요청을 바탕으로 5~8개의 테스트 시나리오를 생성해.",
        "요구사항:",
        "- 정상 흐름, 엣지 케이스, 오류 처리, UI/UX 검증을 균형 있게 포함",
        "- 각 시나리오는 title, steps(배열), expected(배열), tags(선택)로 구성",
        "- 모든 문장은 한국어로",
        "- 반드시 JSON만 출력",
        "출력 형식:",
        r#"{"scenarios":[{"title":"...","steps":[...],"expected":[...],"tags":[...]}]}"#,
        "사용자 요청:",
        request,
    ]
    .join("\n")
}

/// Parse model output into drafts.
///
/// The whole text is tried first; failing that, the span from the first `{`
/// to the last `}` (models like to wrap JSON in prose or code fences).
pub fn parse_scenarios(text: &str) -> Result<Vec<ScenarioDraft>, ExpandError> {
    let value = extract_json(text).ok_or_else(|| ExpandError::Parse {
        message: "response contains no JSON object".to_string(),
    })?;
    let items = value
        .get("scenarios")
        .and_then(Value::as_array)
        .ok_or_else(|| ExpandError::Parse {
            message: "response has no \"scenarios\" array".to_string(),
        })?;
    Ok(items.iter().map(coerce_draft).collect())
}

fn extract_json(text: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Some(value);
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

fn coerce_draft(item: &Value) -> ScenarioDraft {
    ScenarioDraft {
        title: item.get("title").map(text_of).unwrap_or_default(),
        steps: string_list(item.get("steps")).unwrap_or_default(),
        expected: string_list(item.get("expected")).unwrap_or_default(),
        tags: string_list(item.get("tags")),
    }
}

fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().map(text_of).collect())
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
