use crate::config::Config;
use crate::elastic::{ElasticClient, ElasticError};
use crate::handlers::agentic_summary::handle_agentic_summary;
use crate::handlers::index::{handle_cluster_health, handle_index};
use crate::handlers::search::{handle_keyword_search, handle_search_reviews, handle_semantic_search};
use crate::handlers::ErrorResponse;
use crate::llm::{LLMClient, Model};
use crate::personas::PersonaRegistry;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Method, Status};
use rocket::serde::json::Json;
use rocket::{catch, catchers, options, routes, Request, Response};

#[derive(Debug)]
pub enum ServerError {
    Launch(Box<rocket::Error>),
    Configuration(String),
    Elastic(ElasticError),
}

impl std::error::Error for ServerError {}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerError::Launch(e) => write!(f, "Server launch error: {}", e),
            ServerError::Configuration(e) => write!(f, "Configuration error: {}", e),
            ServerError::Elastic(e) => write!(f, "Elasticsearch client error: {}", e),
        }
    }
}

pub struct ServerState {
    pub elastic: ElasticClient,
    pub llm: LLMClient,
    pub personas: PersonaRegistry,
    pub default_username: String,
}

impl ServerState {
    pub fn from_config(config: &Config) -> Result<Self, ServerError> {
        if config.default_username.trim().is_empty() {
            return Err(ServerError::Configuration(
                "default username must not be empty".to_string(),
            ));
        }
        let elastic = ElasticClient::new(
            config.elasticsearch_url.clone(),
            &config.elasticsearch_api_key,
            &config.review_index,
            &config.profile_index,
        )
        .map_err(ServerError::Elastic)?;
        let llm = LLMClient::new(
            config.openai_base_url.clone(),
            &config.openai_api_key,
            Model::from(config.completion_model.as_str()),
        );
        Ok(Self {
            elastic,
            llm,
            personas: config.persona_registry(),
            default_username: config.default_username.clone(),
        })
    }
}

/// Allows any origin to call the API from a browser.
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "CORS headers",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "GET, POST, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "Content-Type"));
    }
}

#[options("/<_..>")]
fn handle_preflight() -> Status {
    Status::NoContent
}

#[catch(400)]
fn bad_request() -> Json<ErrorResponse> {
    Json(ErrorResponse::new("Malformed request"))
}

#[catch(404)]
fn not_found(request: &Request<'_>) -> Json<ErrorResponse> {
    Json(ErrorResponse::new(format!("Not found: {}", request.uri().path())))
}

#[catch(422)]
fn unprocessable(request: &Request<'_>) -> Json<ErrorResponse> {
    let message = match request.method() {
        Method::Post => "Request body is not valid JSON for this endpoint",
        _ => "Unprocessable request",
    };
    Json(ErrorResponse::new(message))
}

#[catch(default)]
fn server_error(status: Status, _request: &Request<'_>) -> Json<ErrorResponse> {
    Json(ErrorResponse::new(format!("Server error: {}", status)))
}

pub fn create_server(state: ServerState) -> rocket::Rocket<rocket::Build> {
    rocket::build()
        .manage(state)
        .attach(Cors)
        .mount(
            "/",
            routes![
                handle_index,
                handle_cluster_health,
                handle_search_reviews,
                handle_keyword_search,
                handle_semantic_search,
                handle_agentic_summary,
                handle_preflight
            ],
        )
        .register("/", catchers![bad_request, not_found, unprocessable, server_error])
}

pub async fn run_server(rocket: rocket::Rocket<rocket::Build>) -> Result<(), ServerError> {
    match rocket.launch().await {
        Ok(_) => Ok(()),
        Err(e) => {
            tracing::error!(error = %e, "failed to launch rocket server");
            Err(ServerError::Launch(Box::new(e)))
        }
    }
}
