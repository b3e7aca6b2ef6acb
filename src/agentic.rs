use crate::elastic::{ElasticClient, ElasticError};
use crate::llm::{LLMClient, LLMError, ResponseFormat};
use crate::personas::{Persona, PersonaRegistry, ProsCons};
use crate::prompts::{build_pros_cons_context, Prompt};
use crate::query::SearchRequest;
use crate::review::{Review, UserProfile};
use crate::search::SearchMode;
use crate::utils::{display_reviews_for_analysis, parse_json_response};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};

const PROS_CONS_COUNT: usize = 3;
const PROS_CONS_MAX_TOKENS: i32 = 800;
const PROS_CONS_TEMPERATURE: f64 = 0.3;

pub const NO_REVIEWS_PLACEHOLDER: &str = "No reviews available for analysis";
pub const NO_REVIEWS_RECOMMENDATION: &str = "Unable to generate recommendation without reviews.";

#[derive(Error, Debug)]
pub enum AgenticError {
    #[error(transparent)]
    Elastic(#[from] ElasticError),
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct AgenticInput {
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationSource {
    #[serde(rename = "generated")]
    Generated,
    #[serde(rename = "fallback")]
    Fallback,
    #[serde(rename = "placeholder")]
    Placeholder,
}

/// Outcome of asking the model for a pros/cons summary.
#[derive(Debug, Clone, PartialEq)]
pub enum Generation {
    Generated(ProsCons),
    Fallback { summary: ProsCons, reason: String },
}

impl Generation {
    pub fn source(&self) -> GenerationSource {
        match self {
            Generation::Generated(_) => GenerationSource::Generated,
            Generation::Fallback { .. } => GenerationSource::Fallback,
        }
    }

    pub fn into_summary(self) -> ProsCons {
        match self {
            Generation::Generated(summary) => summary,
            Generation::Fallback { summary, .. } => summary,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
struct GeneratedProsCons {
    #[serde(default)]
    pros: Vec<String>,
    #[serde(default)]
    cons: Vec<String>,
    #[serde(default)]
    personalized_recommendation: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AgenticSummary {
    #[serde(flatten)]
    pub summary: ProsCons,
    pub total_reviews_analyzed: usize,
    /// Milliseconds spent handling the request.
    pub processing_time: u64,
    pub search_mode: SearchMode,
    pub user_profile_loaded: bool,
    pub username: String,
    pub generation: GenerationSource,
}

fn first_non_blank(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .filter(|item| !item.trim().is_empty())
        .take(PROS_CONS_COUNT)
        .collect()
}

/// Validates a completion, substituting the persona's canned summary when it
/// is unusable.
pub fn interpret_completion(completion: Result<String, LLMError>, persona: Persona) -> Generation {
    let fallback = |reason: String| Generation::Fallback {
        summary: persona.fallback(),
        reason,
    };
    let completion = match completion {
        Ok(completion) => completion,
        Err(e) => return fallback(e.to_string()),
    };
    let generated: GeneratedProsCons = match parse_json_response(&completion) {
        Ok(generated) => generated,
        Err(e) => return fallback(LLMError::ParseError(e.to_string()).to_string()),
    };
    let pros = first_non_blank(generated.pros);
    let cons = first_non_blank(generated.cons);
    let recommendation = generated.personalized_recommendation.trim().to_string();
    if pros.len() < PROS_CONS_COUNT || cons.len() < PROS_CONS_COUNT || recommendation.is_empty() {
        return fallback(format!(
            "incomplete response: {} pros, {} cons, recommendation {}",
            pros.len(),
            cons.len(),
            if recommendation.is_empty() { "missing" } else { "present" }
        ));
    }
    Generation::Generated(ProsCons {
        pros,
        cons,
        personalized_recommendation: recommendation,
    })
}

async fn load_profile(elastic: &ElasticClient, username: &str) -> Option<UserProfile> {
    match elastic.user_profile(username).await {
        Ok(Some(profile)) => Some(profile),
        Ok(None) => {
            info!(username, "user profile not found");
            None
        }
        Err(e) => {
            warn!(username, error = %e, "failed to fetch user profile");
            None
        }
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Personalized pros/cons over the whole review corpus.
pub async fn agentic_summary(
    elastic: &ElasticClient,
    llm: &LLMClient,
    personas: &PersonaRegistry,
    default_username: &str,
    input: &AgenticInput,
) -> Result<AgenticSummary, AgenticError> {
    let start = Instant::now();
    let username = match input.username.as_deref() {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => default_username.to_string(),
    };

    let profile = load_profile(elastic, &username).await;
    let response = elastic
        .search_reviews(&SearchRequest::agentic_corpus())
        .await?;
    let hits = &response.hits.hits;

    if hits.is_empty() {
        return Ok(AgenticSummary {
            summary: ProsCons {
                pros: vec![NO_REVIEWS_PLACEHOLDER.to_string()],
                cons: vec![NO_REVIEWS_PLACEHOLDER.to_string()],
                personalized_recommendation: NO_REVIEWS_RECOMMENDATION.to_string(),
            },
            total_reviews_analyzed: 0,
            processing_time: elapsed_ms(start),
            search_mode: SearchMode::AgenticAi,
            user_profile_loaded: profile.is_some(),
            username,
            generation: GenerationSource::Placeholder,
        });
    }

    let reviews: Vec<&Review> = hits.iter().map(|hit| &hit.source).collect();
    let profile_block = profile.as_ref().map(|p| p.to_string()).unwrap_or_default();
    let persona = personas.persona_for(&username);
    let prompt = Prompt::new(
        persona.system_prompt(),
        build_pros_cons_context(
            &profile_block,
            reviews.len(),
            &display_reviews_for_analysis(&reviews),
        ),
    );

    let completion = llm
        .completion()
        .messages(prompt.build_messages())
        .max_completion_tokens(PROS_CONS_MAX_TOKENS)
        .temperature(PROS_CONS_TEMPERATURE)
        .response_format(ResponseFormat::JsonObject)
        .build()
        .await;
    let generation = interpret_completion(completion, persona);
    if let Generation::Fallback { reason, .. } = &generation {
        warn!(username = %username, ?persona, reason = %reason, "using fallback pros/cons");
    }
    let source = generation.source();
    let processing_time = elapsed_ms(start);

    info!(
        username = %username,
        reviews = hits.len(),
        processing_time,
        "personalized summary generated"
    );
    Ok(AgenticSummary {
        summary: generation.into_summary(),
        total_reviews_analyzed: hits.len(),
        processing_time,
        search_mode: SearchMode::AgenticAi,
        user_profile_loaded: profile.is_some(),
        username,
        generation: source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elastic::tests::client_for as elastic_for;
    use crate::llm::openai::tests::{client_for as llm_for, completion_body};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn generated(pros: usize, cons: usize, recommendation: &str) -> String {
        json!({
            "pros": (1..=pros).map(|i| format!("pro {i}")).collect::<Vec<_>>(),
            "cons": (1..=cons).map(|i| format!("con {i}")).collect::<Vec<_>>(),
            "personalized_recommendation": recommendation
        })
        .to_string()
    }

    #[test]
    fn valid_completion_is_truncated_to_three() {
        let generation = interpret_completion(Ok(generated(5, 4, "Buy it")), Persona::Budget);
        let Generation::Generated(summary) = generation else {
            panic!("expected generated summary");
        };
        assert_eq!(summary.pros, vec!["pro 1", "pro 2", "pro 3"]);
        assert_eq!(summary.cons.len(), 3);
        assert_eq!(summary.personalized_recommendation, "Buy it");
    }

    #[test]
    fn short_lists_fall_back() {
        let generation = interpret_completion(Ok(generated(2, 3, "Buy it")), Persona::Premium);
        assert_eq!(generation.source(), GenerationSource::Fallback);
        assert_eq!(generation.into_summary(), Persona::Premium.fallback());
    }

    #[test]
    fn empty_recommendation_falls_back() {
        let generation = interpret_completion(Ok(generated(3, 3, "  ")), Persona::Budget);
        assert_eq!(generation.into_summary(), Persona::Budget.fallback());
    }

    #[test]
    fn malformed_completion_falls_back() {
        let generation = interpret_completion(Ok("not json".to_string()), Persona::Budget);
        match generation {
            Generation::Fallback { summary, reason } => {
                assert_eq!(summary, Persona::Budget.fallback());
                assert!(reason.starts_with("Failed to parse response: "), "{reason}");
            }
            other => panic!("expected fallback, got {other:?}"),
        }
    }

    #[test]
    fn failed_completion_falls_back_with_reason() {
        let generation = interpret_completion(Err(LLMError::EmptyResponse), Persona::Premium);
        match generation {
            Generation::Fallback { summary, reason } => {
                assert_eq!(summary, Persona::Premium.fallback());
                assert_eq!(reason, "LLM response is empty");
            }
            other => panic!("expected fallback, got {other:?}"),
        }
    }

    async fn mount_reviews(server: &MockServer, count: usize) {
        let hits: Vec<_> = (0..count)
            .map(|i| {
                json!({
                    "_id": format!("r{i}"),
                    "_score": 1.0,
                    "_source": {"title": format!("Title {i}"), "stars": 4, "review_text": "Nice"}
                })
            })
            .collect();
        Mock::given(method("POST"))
            .and(path("/review_index/_search"))
            .and(body_partial_json(json!({"size": 100})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "took": 3,
                "hits": {"total": {"value": count}, "hits": hits}
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn defaults_username_and_generates_summary() {
        let es = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user_profile/_doc/Student2025"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "_source": {
                    "username": "Student2025",
                    "occupation": "Student",
                    "annual_income": 15000,
                    "credit_limit": 500,
                    "past_purchases": [{"price": 40}]
                }
            })))
            .mount(&es)
            .await;
        mount_reviews(&es, 2).await;

        let openai = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"response_format": {"type": "json_object"}})))
            .and(body_string_contains("limited budget"))
            .and(body_string_contains("Occupation: Student"))
            .and(body_string_contains("Analyze these 2 Apple Watch Series 10 reviews"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion_body(&generated(3, 3, "Save money"))),
            )
            .expect(1)
            .mount(&openai)
            .await;

        let summary = agentic_summary(
            &elastic_for(&es),
            &llm_for(&openai),
            &PersonaRegistry::default(),
            "Student2025",
            &AgenticInput::default(),
        )
        .await
        .unwrap();
        assert_eq!(summary.username, "Student2025");
        assert!(summary.user_profile_loaded);
        assert_eq!(summary.total_reviews_analyzed, 2);
        assert_eq!(summary.generation, GenerationSource::Generated);
        assert_eq!(summary.summary.personalized_recommendation, "Save money");
    }

    #[tokio::test]
    async fn premium_user_gets_premium_fallback_without_profile() {
        let es = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&es)
            .await;
        mount_reviews(&es, 1).await;

        let openai = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("high income"))
            .respond_with(ResponseTemplate::new(502))
            .expect(1)
            .mount(&openai)
            .await;

        let input = AgenticInput {
            username: Some("TechUser92".to_string()),
        };
        let summary = agentic_summary(
            &elastic_for(&es),
            &llm_for(&openai),
            &PersonaRegistry::default(),
            "Student2025",
            &input,
        )
        .await
        .unwrap();
        assert_eq!(summary.username, "TechUser92");
        assert!(!summary.user_profile_loaded);
        assert_eq!(summary.generation, GenerationSource::Fallback);
        assert_eq!(summary.summary, Persona::Premium.fallback());
    }

    #[tokio::test]
    async fn profile_lookup_failure_proceeds_without_profile() {
        let es = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user_profile/_doc/Student2025"))
            .respond_with(ResponseTemplate::new(500).set_body_string("shard failure"))
            .expect(1)
            .mount(&es)
            .await;
        mount_reviews(&es, 3).await;

        let openai = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion_body(&generated(3, 3, "Wait for a sale"))),
            )
            .expect(1)
            .mount(&openai)
            .await;

        let summary = agentic_summary(
            &elastic_for(&es),
            &llm_for(&openai),
            &PersonaRegistry::default(),
            "Student2025",
            &AgenticInput::default(),
        )
        .await
        .unwrap();
        assert!(!summary.user_profile_loaded);
        assert_eq!(summary.total_reviews_analyzed, 3);
        assert_eq!(summary.generation, GenerationSource::Generated);
    }

    #[tokio::test]
    async fn no_reviews_returns_placeholder() {
        let es = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&es)
            .await;
        mount_reviews(&es, 0).await;
        let openai = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&openai)
            .await;

        let summary = agentic_summary(
            &elastic_for(&es),
            &llm_for(&openai),
            &PersonaRegistry::default(),
            "Student2025",
            &AgenticInput::default(),
        )
        .await
        .unwrap();
        assert_eq!(summary.total_reviews_analyzed, 0);
        assert_eq!(summary.summary.pros, vec![NO_REVIEWS_PLACEHOLDER]);
        assert_eq!(summary.summary.personalized_recommendation, NO_REVIEWS_RECOMMENDATION);
        assert_eq!(summary.generation, GenerationSource::Placeholder);
    }

    #[tokio::test]
    async fn review_search_failure_is_an_error() {
        let es = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&es)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("red"))
            .mount(&es)
            .await;
        let openai = MockServer::start().await;

        let err = agentic_summary(
            &elastic_for(&es),
            &llm_for(&openai),
            &PersonaRegistry::default(),
            "Student2025",
            &AgenticInput::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            AgenticError::Elastic(ElasticError::Status { status: 503, .. })
        ));
    }
}
