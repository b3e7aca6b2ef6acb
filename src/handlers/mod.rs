pub mod agentic_summary;
pub mod index;
pub mod search;

use crate::agentic::AgenticError;
use crate::elastic::ElasticError;
use crate::search::SearchError;
use rocket::http::Status;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: String) -> Self {
        self.details = Some(details);
        self
    }
}

/// Successful payload tagged with `"status": "success"`.
#[derive(Serialize, Debug, Clone)]
pub struct Success<T> {
    status: &'static str,
    #[serde(flatten)]
    body: T,
}

pub fn success<T>(body: T) -> Json<Success<T>> {
    Json(Success {
        status: "success",
        body,
    })
}

pub type ApiError = (Status, Json<ErrorResponse>);
pub type ApiResult<T> = Result<Json<Success<T>>, ApiError>;

pub fn api_error(status: Status, response: ErrorResponse) -> ApiError {
    (status, Json(response))
}

/// Maps a search engine failure onto the caller-facing envelope. Upstream
/// status codes pass through; transport failures become 500.
pub fn elastic_error(e: ElasticError) -> ApiError {
    match e {
        ElasticError::Status { status, body } => {
            warn!(status, "search engine rejected request");
            api_error(
                Status::new(status),
                ErrorResponse::new(format!("Elasticsearch search failed: {}", status))
                    .with_details(body),
            )
        }
        ElasticError::Network(e) => {
            warn!(error = %e, "search engine unreachable");
            api_error(
                Status::InternalServerError,
                ErrorResponse::new(format!("Network error: {}", e)),
            )
        }
        other => internal_error(other),
    }
}

pub fn internal_error(e: impl std::fmt::Display) -> ApiError {
    error!(error = %e, "request failed");
    api_error(
        Status::InternalServerError,
        ErrorResponse::new(format!("Server error: {}", e)),
    )
}

pub fn search_error(e: SearchError) -> ApiError {
    match e {
        SearchError::MissingInput(message) => {
            api_error(Status::BadRequest, ErrorResponse::new(message))
        }
        SearchError::Elastic(e) => elastic_error(e),
    }
}

pub fn agentic_error(e: AgenticError) -> ApiError {
    match e {
        AgenticError::Elastic(e) => elastic_error(e),
    }
}
