//! Command line and environment configuration.

use crate::personas::{parse_persona_override, Persona, PersonaRegistry};
use clap::Parser;
use std::fmt;
use std::net::IpAddr;
use url::Url;

#[derive(Parser, Clone)]
#[command(
    name = "review-search-server",
    version,
    about = "Review search backend: date browse, keyword, semantic and personalized summaries"
)]
pub struct Config {
    /// Address to bind the HTTP server to
    #[arg(long, env = "REVIEW_SEARCH_ADDRESS", default_value = "0.0.0.0")]
    pub address: IpAddr,

    /// Port to bind the HTTP server to
    #[arg(long, env = "REVIEW_SEARCH_PORT", default_value_t = 8001)]
    pub port: u16,

    /// Base URL of the Elasticsearch deployment
    #[arg(long, env = "ELASTICSEARCH_URL")]
    pub elasticsearch_url: Url,

    #[arg(long, env = "ELASTICSEARCH_API_KEY", hide_env_values = true)]
    pub elasticsearch_api_key: String,

    #[arg(long, env = "REVIEW_INDEX", default_value = "review_index")]
    pub review_index: String,

    #[arg(long, env = "USER_PROFILE_INDEX", default_value = "user_profile")]
    pub profile_index: String,

    /// Base URL of the OpenAI-compatible completion API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub openai_base_url: Url,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: String,

    #[arg(long = "model", env = "OPENAI_MODEL", default_value = "gpt-3.5-turbo")]
    pub completion_model: String,

    /// Identity used by personalized summaries when the caller sends none
    #[arg(long, env = "DEFAULT_USERNAME", default_value = "Student2025")]
    pub default_username: String,

    #[arg(long, env = "DEFAULT_PERSONA", value_enum, default_value_t = Persona::Budget)]
    pub default_persona: Persona,

    /// USERNAME=PERSONA pairs selecting a non-default persona
    #[arg(
        long = "persona",
        env = "PERSONA_OVERRIDES",
        value_delimiter = ',',
        value_parser = parse_persona_override,
        default_value = "TechUser92=premium"
    )]
    pub persona_overrides: Vec<(String, Persona)>,
}

impl Config {
    pub fn persona_registry(&self) -> PersonaRegistry {
        self.persona_overrides
            .iter()
            .fold(PersonaRegistry::new(self.default_persona), |registry, (user, persona)| {
                registry.with_override(user, *persona)
            })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("address", &self.address)
            .field("port", &self.port)
            .field("elasticsearch_url", &self.elasticsearch_url.as_str())
            .field("elasticsearch_api_key", &"[REDACTED]")
            .field("review_index", &self.review_index)
            .field("profile_index", &self.profile_index)
            .field("openai_base_url", &self.openai_base_url.as_str())
            .field("openai_api_key", &"[REDACTED]")
            .field("completion_model", &self.completion_model)
            .field("default_username", &self.default_username)
            .field("default_persona", &self.default_persona)
            .field("persona_overrides", &self.persona_overrides)
            .finish()
    }
}
