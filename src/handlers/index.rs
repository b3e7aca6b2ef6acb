use crate::elastic::ElasticError;
use crate::handlers::{api_error, internal_error, success, ApiResult, ErrorResponse};
use crate::server::ServerState;
use rocket::get;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

#[derive(Serialize, Debug, Clone)]
pub struct ClusterHealth {
    pub elasticsearch: Value,
}

#[get("/")]
pub fn handle_index() -> Json<Value> {
    Json(json!({
        "status": "running",
        "message": "Multi-Search Experience Backend (AI + Keyword + Date Browse + Agentic AI)",
        "search_modes": {
            "ai_search": "Semantic search with AI-generated summaries",
            "keyword_search": "Traditional lexical search using multi-match",
            "date_browse": "All reviews sorted by date (newest first)",
            "agentic_ai": "Automatic pros/cons extraction with personalized recommendations"
        },
        "endpoints": {
            "/search-reviews": "POST - Browse all reviews by date",
            "/semantic-search": "POST - AI-powered semantic search with summary",
            "/keyword-search": "POST - Keyword-based multi-match search",
            "/agentic-summary": "POST - Automatic pros/cons extraction with personalized recommendations",
            "/cluster-health": "GET - Check Elasticsearch health"
        }
    }))
}

#[get("/cluster-health")]
pub async fn handle_cluster_health(state: &State<ServerState>) -> ApiResult<ClusterHealth> {
    info!(endpoint = "/cluster-health", "GET");
    match state.elastic.cluster_health().await {
        Ok(elasticsearch) => Ok(success(ClusterHealth { elasticsearch })),
        Err(ElasticError::Status { status, body }) => Err(api_error(
            Status::new(status),
            ErrorResponse::new(format!("Elasticsearch returned {}", status)).with_details(body),
        )),
        Err(ElasticError::Network(e)) => Err(api_error(
            Status::InternalServerError,
            ErrorResponse::new(format!("Failed to connect to Elasticsearch: {}", e)),
        )),
        Err(e) => Err(internal_error(e)),
    }
}
