use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use qa_expander::ExpandError;
use qad::ServiceError;
use serde::{Deserialize, Serialize};

pub const GROUP_NOT_FOUND: &str = "시나리오 그룹을 찾을 수 없습니다.";
pub const TEST_FILE_NOT_FOUND: &str = "테스트 파일을 찾을 수 없습니다.";
pub const INPUT_REQUIRED: &str = "입력 문장이 필요합니다.";
const INTERNAL_MESSAGE: &str = "서버 오류가 발생했습니다.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("scenario expansion failed: {0}")]
    Upstream(String),
    #[error("internal error: {0}")]
    Internal(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::BadRequest(_) => StatusCode::BAD_REQUEST,
            WebError::NotFound(_) => StatusCode::NOT_FOUND,
            WebError::Upstream(_) => StatusCode::BAD_GATEWAY,
            WebError::Internal(_) | WebError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for WebError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::EmptyInput | ServiceError::Expand(ExpandError::EmptyRequest) => {
                WebError::BadRequest(INPUT_REQUIRED.to_string())
            }
            ServiceError::Expand(err) => WebError::Upstream(err.to_string()),
            other => WebError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let message = match &self {
            WebError::Internal(_) | WebError::Io(_) => {
                tracing::error!(error = %self, "request failed");
                INTERNAL_MESSAGE.to_string()
            }
            WebError::Upstream(_) => {
                tracing::warn!(error = %self, "expander request failed");
                self.to_string()
            }
            WebError::BadRequest(_) | WebError::NotFound(_) => self.to_string(),
        };
        (self.status(), Json(ErrorBody { error: message })).into_response()
    }
}
