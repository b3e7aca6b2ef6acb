use crate::agentic::{agentic_summary, AgenticInput, AgenticSummary};
use crate::handlers::{agentic_error, success, ApiResult};
use crate::server::ServerState;
use rocket::post;
use rocket::serde::json::Json;
use rocket::State;
use tracing::info;

#[post("/agentic-summary", data = "<input>")]
pub async fn handle_agentic_summary(
    state: &State<ServerState>,
    input: Option<Json<AgenticInput>>,
) -> ApiResult<AgenticSummary> {
    let input = input.map(Json::into_inner).unwrap_or_default();
    info!(endpoint = "/agentic-summary", username = ?input.username, "POST");
    agentic_summary(
        &state.elastic,
        &state.llm,
        &state.personas,
        &state.default_username,
        &input,
    )
    .await
    .map(success)
    .map_err(agentic_error)
}
