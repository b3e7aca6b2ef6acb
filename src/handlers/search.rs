use crate::handlers::{search_error, success, ApiResult};
use crate::search::{
    browse_by_date, keyword_search, semantic_search, DateBrowseResult, KeywordSearchInput,
    KeywordSearchResult, SemanticSearchInput, SemanticSearchResult,
};
use crate::server::ServerState;
use rocket::post;
use rocket::serde::json::Json;
use rocket::State;
use tracing::info;

#[post("/search-reviews")]
pub async fn handle_search_reviews(state: &State<ServerState>) -> ApiResult<DateBrowseResult> {
    info!(endpoint = "/search-reviews", "POST");
    browse_by_date(&state.elastic)
        .await
        .map(success)
        .map_err(search_error)
}

#[post("/keyword-search", data = "<input>")]
pub async fn handle_keyword_search(
    state: &State<ServerState>,
    input: Option<Json<KeywordSearchInput>>,
) -> ApiResult<KeywordSearchResult> {
    let input = input.map(Json::into_inner).unwrap_or_default();
    info!(endpoint = "/keyword-search", query = ?input.query, "POST");
    keyword_search(&state.elastic, &input)
        .await
        .map(success)
        .map_err(search_error)
}

#[post("/semantic-search", data = "<input>")]
pub async fn handle_semantic_search(
    state: &State<ServerState>,
    input: Option<Json<SemanticSearchInput>>,
) -> ApiResult<SemanticSearchResult> {
    let input = input.map(Json::into_inner).unwrap_or_default();
    info!(endpoint = "/semantic-search", text = ?input.text, "POST");
    semantic_search(&state.elastic, &state.llm, &input)
        .await
        .map(success)
        .map_err(search_error)
}
