use crate::elastic::{ElasticClient, ElasticError};
use crate::llm::LLMClient;
use crate::prompts::build_semantic_summary_prompt;
use crate::query::SearchRequest;
use crate::review::{Review, ReviewView};
use crate::utils::display_reviews_for_summary;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

pub const NO_RELEVANT_REVIEWS: &str = "No relevant reviews found for your search.";
const SUMMARY_MAX_TOKENS: i32 = 500;
const SUMMARY_TEMPERATURE: f64 = 0.7;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    #[serde(rename = "date_browse")]
    DateBrowse,
    #[serde(rename = "keyword")]
    Keyword,
    #[serde(rename = "ai_semantic")]
    AiSemantic,
    #[serde(rename = "agentic_ai")]
    AgenticAi,
}

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("{0}")]
    MissingInput(&'static str),
    #[error(transparent)]
    Elastic(#[from] ElasticError),
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct KeywordSearchInput {
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct SemanticSearchInput {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DateBrowseResult {
    pub total: u64,
    pub took: u64,
    pub reviews: Vec<ReviewView>,
    pub search_mode: SearchMode,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct KeywordSearchResult {
    pub query: String,
    pub total: u64,
    pub took: u64,
    pub reviews: Vec<ReviewView>,
    pub max_score: Option<f64>,
    pub search_mode: SearchMode,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SemanticSearchResult {
    pub query: String,
    pub summary: String,
    pub total_results: usize,
    pub search_score: f64,
    pub search_mode: SearchMode,
}

fn require_text<'a>(value: Option<&'a str>, message: &'static str) -> Result<&'a str, SearchError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(SearchError::MissingInput(message)),
    }
}

/// Newest reviews first. Caller input is ignored.
pub async fn browse_by_date(elastic: &ElasticClient) -> Result<DateBrowseResult, SearchError> {
    let response = elastic.search_reviews(&SearchRequest::date_browse()).await?;
    let reviews: Vec<ReviewView> = response
        .hits
        .hits
        .iter()
        .map(|hit| ReviewView::from_hit(&hit.id, &hit.source))
        .collect();
    info!(returned = reviews.len(), "date browse complete");
    Ok(DateBrowseResult {
        total: response.hits.total.value,
        took: response.took,
        reviews,
        search_mode: SearchMode::DateBrowse,
    })
}

pub async fn keyword_search(
    elastic: &ElasticClient,
    input: &KeywordSearchInput,
) -> Result<KeywordSearchResult, SearchError> {
    let query = require_text(input.query.as_deref(), "No search query provided")?;
    let response = elastic.search_reviews(&SearchRequest::keyword(query)).await?;
    let reviews: Vec<ReviewView> = response
        .hits
        .hits
        .iter()
        .map(|hit| ReviewView::from_hit(&hit.id, &hit.source))
        .collect();
    info!(query, returned = reviews.len(), "keyword search complete");
    Ok(KeywordSearchResult {
        query: query.to_string(),
        total: response.hits.total.value,
        took: response.took,
        reviews,
        max_score: response.hits.max_score,
        search_mode: SearchMode::Keyword,
    })
}

/// Semantic retrieval followed by a model-written summary of the top hits.
/// A failed completion degrades the summary text, not the request.
pub async fn semantic_search(
    elastic: &ElasticClient,
    llm: &LLMClient,
    input: &SemanticSearchInput,
) -> Result<SemanticSearchResult, SearchError> {
    let text = require_text(input.text.as_deref(), "No search text provided")?;
    let response = elastic.search_reviews(&SearchRequest::semantic(text)).await?;
    let hits = &response.hits.hits;

    if hits.is_empty() {
        info!(query = text, "semantic search found nothing");
        return Ok(SemanticSearchResult {
            query: text.to_string(),
            summary: NO_RELEVANT_REVIEWS.to_string(),
            total_results: 0,
            search_score: 0.0,
            search_mode: SearchMode::AiSemantic,
        });
    }

    let reviews: Vec<&Review> = hits.iter().map(|hit| &hit.source).collect();
    let prompt = build_semantic_summary_prompt(text, &display_reviews_for_summary(&reviews));
    let summary = match llm
        .completion()
        .messages(prompt.build_messages())
        .max_completion_tokens(SUMMARY_MAX_TOKENS)
        .temperature(SUMMARY_TEMPERATURE)
        .build()
        .await
    {
        Ok(summary) => summary,
        Err(e) => {
            warn!(error = %e, "summary generation failed");
            format!("Error generating AI summary: {}", e)
        }
    };

    info!(query = text, reviews = hits.len(), "semantic summary generated");
    Ok(SemanticSearchResult {
        query: text.to_string(),
        summary,
        total_results: hits.len(),
        search_score: hits[0].score.unwrap_or(0.0),
        search_mode: SearchMode::AiSemantic,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elastic::tests::client_for as elastic_for;
    use crate::llm::openai::tests::{client_for as llm_for, completion_body};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn hit(id: &str, score: f64, title: &str) -> serde_json::Value {
        json!({
            "_id": id,
            "_score": score,
            "_source": {
                "date": "2024-09-20",
                "username": "alice",
                "product": "Apple Watch Series 10",
                "stars": 4,
                "title": title,
                "review_text": "Screen is great",
                "helpful_votes": 3,
                "verified": true
            }
        })
    }

    #[tokio::test]
    async fn keyword_search_requires_query_without_calling_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let elastic = elastic_for(&server);
        for input in [
            KeywordSearchInput { query: None },
            KeywordSearchInput {
                query: Some(String::new()),
            },
            KeywordSearchInput {
                query: Some("   ".to_string()),
            },
        ] {
            let err = keyword_search(&elastic, &input).await.unwrap_err();
            assert!(matches!(err, SearchError::MissingInput("No search query provided")));
        }
    }

    #[tokio::test]
    async fn keyword_search_projects_hits_and_echoes_query() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/review_index/_search"))
            .and(body_partial_json(json!({"size": 20})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "took": 12,
                "hits": {
                    "total": {"value": 2},
                    "max_score": 3.5,
                    "hits": [hit("a", 3.5, "Great battery"), hit("b", 1.2, "Okay")]
                }
            })))
            .mount(&server)
            .await;

        let input = KeywordSearchInput {
            query: Some("battery".to_string()),
        };
        let result = keyword_search(&elastic_for(&server), &input).await.unwrap();
        assert_eq!(result.query, "battery");
        assert_eq!(result.total, 2);
        assert_eq!(result.took, 12);
        assert_eq!(result.max_score, Some(3.5));
        assert_eq!(result.reviews.len(), 2);
        assert_eq!(result.reviews[0].id, "a");
        assert_eq!(result.reviews[0].helpful_count, 3);
        assert!(result.reviews[0].verified_purchase);
        assert_eq!(result.search_mode, SearchMode::Keyword);
    }

    #[tokio::test]
    async fn browse_tolerates_mistyped_source_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/review_index/_search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "took": 2,
                "hits": {
                    "total": {"value": 4},
                    "hits": [
                        {"_id": "f", "_source": {"helpful_votes": 2.0}},
                        {"_id": "s", "_source": {"helpful_votes": "3"}},
                        {"_id": "d", "_source": {"date": 1727740800000_i64}},
                        {"_id": "v", "_source": {"verified": "true"}}
                    ]
                }
            })))
            .mount(&server)
            .await;

        let result = browse_by_date(&elastic_for(&server)).await.unwrap();
        assert_eq!(result.reviews.len(), 4);
        assert_eq!(result.reviews[0].helpful_count, 2);
        assert_eq!(result.reviews[1].helpful_count, 3);
        assert_eq!(result.reviews[2].date, Some(json!(1727740800000_i64)));
        assert_eq!(result.reviews[2].helpful_count, 0);
        assert!(result.reviews[3].verified_purchase);
        assert!(!result.reviews[0].verified_purchase);
    }

    #[tokio::test]
    async fn browse_passes_upstream_failure_through() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .mount(&server)
            .await;

        let err = browse_by_date(&elastic_for(&server)).await.unwrap_err();
        assert!(matches!(
            err,
            SearchError::Elastic(ElasticError::Status { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn semantic_search_with_no_hits_skips_completion() {
        let es = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "took": 1,
                "hits": {"total": {"value": 0}, "max_score": null, "hits": []}
            })))
            .mount(&es)
            .await;
        let openai = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&openai)
            .await;

        let input = SemanticSearchInput {
            text: Some("waterproof".to_string()),
        };
        let result = semantic_search(&elastic_for(&es), &llm_for(&openai), &input)
            .await
            .unwrap();
        assert_eq!(result.total_results, 0);
        assert_eq!(result.summary, NO_RELEVANT_REVIEWS);
    }

    #[tokio::test]
    async fn semantic_search_summarizes_hits() {
        let es = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "query": {"semantic": {"field": "review_text.semantic", "query": "screen"}},
                "size": 5
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "took": 8,
                "hits": {"total": {"value": 2}, "hits": [hit("a", 9.1, "Bright"), hit("b", 4.0, "Dim")]}
            })))
            .mount(&es)
            .await;
        let openai = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({"max_tokens": 500, "temperature": 0.7})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion_body("Reviewers love the screen.")),
            )
            .expect(1)
            .mount(&openai)
            .await;

        let input = SemanticSearchInput {
            text: Some("screen".to_string()),
        };
        let result = semantic_search(&elastic_for(&es), &llm_for(&openai), &input)
            .await
            .unwrap();
        assert_eq!(result.summary, "Reviewers love the screen.");
        assert_eq!(result.total_results, 2);
        assert_eq!(result.search_score, 9.1);
        assert_eq!(result.search_mode, SearchMode::AiSemantic);
    }

    #[tokio::test]
    async fn semantic_search_survives_completion_failure() {
        let es = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "took": 8,
                "hits": {"total": {"value": 1}, "hits": [hit("a", 2.0, "Bright")]}
            })))
            .mount(&es)
            .await;
        let openai = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&openai)
            .await;

        let input = SemanticSearchInput {
            text: Some("screen".to_string()),
        };
        let result = semantic_search(&elastic_for(&es), &llm_for(&openai), &input)
            .await
            .unwrap();
        assert!(result.summary.starts_with("Error generating AI summary: "));
        assert!(result.summary.contains("boom"));
        assert_eq!(result.total_results, 1);
    }
}
