use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use qa_core::types::GroupId;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::error::{WebError, GROUP_NOT_FOUND, INPUT_REQUIRED, TEST_FILE_NOT_FOUND};
use crate::model::{AddScenarioRequest, GroupListResponse, GroupResponse};
use crate::state::WebState;

pub fn router(state: WebState) -> Router {
    let public_dir = state.public_dir().to_path_buf();
    let static_files =
        ServeDir::new(&public_dir).fallback(ServeFile::new(public_dir.join("index.html")));

    Router::new()
        .route("/health", get(health))
        .route("/api/scenarios", get(list_scenarios))
        .route("/api/scenarios/add", post(add_scenarios))
        .route("/api/scenarios/{id}", get(get_scenario))
        .route("/api/scenarios/{id}/generate", post(generate_tests))
        .route("/api/check", post(check_conflicts))
        .route("/api/tests/{id}", get(get_test_file))
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}

async fn list_scenarios(State(state): State<WebState>) -> Result<Json<GroupListResponse>, WebError> {
    let groups = state.service().list_groups()?;
    Ok(Json(GroupListResponse { groups }))
}

async fn get_scenario(
    State(state): State<WebState>,
    Path(id): Path<String>,
) -> Result<Json<GroupResponse>, WebError> {
    let group = state
        .service()
        .get_group(&GroupId::new(id))?
        .ok_or_else(|| WebError::NotFound(GROUP_NOT_FOUND.to_string()))?;
    Ok(Json(GroupResponse { group }))
}

async fn add_scenarios(
    State(state): State<WebState>,
    body: Result<Json<AddScenarioRequest>, JsonRejection>,
) -> Result<impl IntoResponse, WebError> {
    let Json(request) = body.map_err(|rejection| WebError::BadRequest(rejection.body_text()))?;
    let input = request.input.unwrap_or_default();
    if input.trim().is_empty() {
        return Err(WebError::BadRequest(INPUT_REQUIRED.to_string()));
    }

    let outcome = state.service().add_group(&input).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

async fn generate_tests(
    State(state): State<WebState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, WebError> {
    let suite = state
        .service()
        .generate_for_group(&GroupId::new(id))?
        .ok_or_else(|| WebError::NotFound(GROUP_NOT_FOUND.to_string()))?;
    Ok(Json(suite))
}

async fn check_conflicts(State(state): State<WebState>) -> Result<impl IntoResponse, WebError> {
    Ok(Json(state.service().check_all()?))
}

async fn get_test_file(
    State(state): State<WebState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, WebError> {
    let file = state
        .service()
        .read_test_file(&id)?
        .ok_or_else(|| WebError::NotFound(TEST_FILE_NOT_FOUND.to_string()))?;
    Ok(Json(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use qa_core::types::ScenarioDraft;
    use qa_expander::{ExpandError, ScenarioExpander};
    use qa_store::YamlScenarioStore;
    use qad::QaService;
    use serde_json::{json, Value};
    use std::fs;
    use std::sync::Arc;
    use tempfile::{tempdir, TempDir};
    use tower::ServiceExt;

    /// Returns `drafts`, or times out when there are none.
    struct FixedExpander {
        drafts: Option<Vec<ScenarioDraft>>,
    }

    #[async_trait]
    impl ScenarioExpander for FixedExpander {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn expand(&self, _request: &str) -> Result<Vec<ScenarioDraft>, ExpandError> {
            self.drafts
                .clone()
                .ok_or(ExpandError::Timeout { secs: 90 })
        }
    }

    fn upload_draft() -> ScenarioDraft {
        ScenarioDraft {
            title: "배경 제거 업로드".to_string(),
            steps: vec!["\"업로드\" 버튼을 클릭한다".to_string()],
            expected: vec!["결과 이미지가 표시된다".to_string()],
            tags: Some(vec!["smoke".to_string()]),
        }
    }

    fn app_with(dir: &TempDir, drafts: Option<Vec<ScenarioDraft>>) -> Router {
        let service = QaService::new(
            Arc::new(YamlScenarioStore::new(dir.path().join("scenarios"))),
            Arc::new(FixedExpander { drafts }),
        )
        .with_test_dir(dir.path().join("tests"));
        router(WebState::new(service, dir.path().join("public")))
    }

    fn app(dir: &TempDir) -> Router {
        app_with(dir, Some(vec![upload_draft()]))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                request = request.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn add(app: &Router, input: &str) -> Value {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/scenarios/add",
            Some(json!({ "input": input })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let dir = tempdir().unwrap();
        let (status, body) = send(&app(&dir), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn add_then_list_and_fetch() {
        let dir = tempdir().unwrap();
        let app = app(&dir);

        let created = add(&app, "배경 제거").await;
        assert_eq!(created["conflicts"], json!([]));
        let id = created["group"]["id"].as_str().unwrap().to_string();
        assert_eq!(created["group"]["source"], "claude");
        assert!(created["group"]["createdAt"].is_string());

        let (status, listed) = send(&app, Method::GET, "/api/scenarios", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed["groups"].as_array().unwrap().len(), 1);

        let (status, fetched) =
            send(&app, Method::GET, &format!("/api/scenarios/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["group"]["input"], "배경 제거");
    }

    #[tokio::test]
    async fn second_add_reports_conflict_with_pending_side() {
        let dir = tempdir().unwrap();
        let app = app(&dir);
        add(&app, "첫 요청").await;

        let created = add(&app, "두번째 요청").await;
        let conflict = &created["conflicts"][0];
        assert_eq!(conflict["type"], "redundant");
        assert_eq!(conflict["groupA"]["kind"], "pending");
        assert_eq!(conflict["groupB"]["kind"], "persisted");
        assert!(conflict["reason"].as_str().unwrap().contains("100%"));
    }

    #[tokio::test]
    async fn blank_or_missing_input_is_bad_request() {
        let dir = tempdir().unwrap();
        let app = app(&dir);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/scenarios/add",
            Some(json!({ "input": "   " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], INPUT_REQUIRED);

        let (status, _) = send(&app, Method::POST, "/api/scenarios/add", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, Method::POST, "/api/scenarios/add", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn expander_failure_is_bad_gateway_and_saves_nothing() {
        let dir = tempdir().unwrap();
        let app = app_with(&dir, None);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/scenarios/add",
            Some(json!({ "input": "배경 제거" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap().contains("90s"));

        let (_, listed) = send(&app, Method::GET, "/api/scenarios", None).await;
        assert_eq!(listed["groups"], json!([]));
    }

    #[tokio::test]
    async fn unknown_group_is_not_found() {
        let dir = tempdir().unwrap();
        let app = app(&dir);

        let (status, body) = send(&app, Method::GET, "/api/scenarios/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], GROUP_NOT_FOUND);

        let (status, _) = send(&app, Method::POST, "/api/scenarios/nope/generate", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn generate_then_read_test_file() {
        let dir = tempdir().unwrap();
        let app = app(&dir);
        let created = add(&app, "배경 제거").await;
        let id = created["group"]["id"].as_str().unwrap().to_string();

        let (status, generated) = send(
            &app,
            Method::POST,
            &format!("/api/scenarios/{id}/generate"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let file_name = format!("{id}.test.ts");
        assert_eq!(generated["fileName"], file_name.as_str());
        assert_eq!(generated["filePath"], generated["record"]["testFile"]);
        let content = generated["content"].as_str().unwrap();
        assert!(content.contains("await page.getByRole('button', { name: /업로드/ }).click();"));

        for uri in [format!("/api/tests/{id}"), format!("/api/tests/{file_name}")] {
            let (status, file) = send(&app, Method::GET, &uri, None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(file["fileName"], file_name.as_str());
            assert_eq!(file["content"], content);
        }

        let (_, fetched) = send(&app, Method::GET, &format!("/api/scenarios/{id}"), None).await;
        assert_eq!(
            fetched["group"]["generationHistory"].as_array().unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn missing_test_file_is_not_found() {
        let dir = tempdir().unwrap();
        let (status, body) = send(&app(&dir), Method::GET, "/api/tests/missing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], TEST_FILE_NOT_FOUND);
    }

    #[tokio::test]
    async fn check_returns_conflicts_and_summary() {
        let dir = tempdir().unwrap();
        let app = app(&dir);
        add(&app, "하나").await;
        add(&app, "둘").await;

        let (status, body) = send(&app, Method::POST, "/api/check", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["conflicts"].as_array().unwrap().len(), 1);
        assert_eq!(body["summary"]["total"], 1);
        assert_eq!(body["summary"]["redundant"], 1);
    }

    #[tokio::test]
    async fn unknown_paths_fall_back_to_index_html() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("public")).unwrap();
        fs::write(dir.path().join("public/index.html"), "<h1>Letti QA</h1>").unwrap();
        fs::write(dir.path().join("public/app.js"), "console.log('hi');").unwrap();
        let app = app(&dir);

        for (uri, expected) in [
            ("/app.js", "console.log('hi');"),
            ("/groups/abc", "<h1>Letti QA</h1>"),
        ] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            assert_eq!(&bytes[..], expected.as_bytes());
        }
    }

    #[tokio::test]
    async fn shipped_dashboard_syncs_groups_and_check() {
        let dir = tempdir().unwrap();
        let public_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../public");
        let service = QaService::new(
            Arc::new(YamlScenarioStore::new(dir.path().join("scenarios"))),
            Arc::new(FixedExpander { drafts: None }),
        );
        let app = router(WebState::new(service, public_dir));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("Promise.all"));
        assert!(html.contains("\"/api/scenarios\""));
        assert!(html.contains("\"/api/check\""));
    }
}
