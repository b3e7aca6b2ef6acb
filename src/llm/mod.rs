use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use url::Url;
pub mod openai;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "user")]
    User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Model {
    GPT35Turbo,
    GPT4o,
    GPT4oMini,
    Custom(String),
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Model::GPT35Turbo => write!(f, "gpt-3.5-turbo"),
            Model::GPT4o => write!(f, "gpt-4o"),
            Model::GPT4oMini => write!(f, "gpt-4o-mini"),
            Model::Custom(name) => write!(f, "{}", name),
        }
    }
}

impl From<&str> for Model {
    fn from(name: &str) -> Self {
        match name {
            "gpt-3.5-turbo" => Model::GPT35Turbo,
            "gpt-4o" => Model::GPT4o,
            "gpt-4o-mini" => Model::GPT4oMini,
            other => Model::Custom(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseFormat {
    #[default]
    Text,
    JsonObject,
}

#[derive(Clone)]
struct ApiKey(String);

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Connection to an OpenAI-compatible chat completion service.
#[derive(Clone, Debug)]
pub struct LLMClient {
    http: Client,
    base_url: Url,
    api_key: ApiKey,
    model: Model,
}

impl LLMClient {
    pub fn new(base_url: Url, api_key: &str, model: Model) -> Self {
        Self {
            http: Client::new(),
            base_url,
            api_key: ApiKey(api_key.to_string()),
            model,
        }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn completion(&self) -> CompletionBuilder<'_> {
        CompletionBuilder {
            client: self,
            messages: Vec::new(),
            temperature: None,
            max_completion_tokens: None,
            response_format: ResponseFormat::Text,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompletionBuilder<'a> {
    client: &'a LLMClient,
    messages: Vec<Message>,
    temperature: Option<f64>,
    max_completion_tokens: Option<i32>,
    response_format: ResponseFormat,
}

impl CompletionBuilder<'_> {
    pub fn messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_completion_tokens(mut self, tokens: i32) -> Self {
        self.max_completion_tokens = Some(tokens);
        self
    }

    pub fn response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = format;
        self
    }

    pub async fn build(self) -> Result<String, LLMError> {
        if self.messages.is_empty() {
            return Err(LLMError::RequestBuildingError(
                "at least one message is required".to_string(),
            ));
        }

        let options = CompletionOptions {
            temperature: self.temperature.unwrap_or(0.0),
            max_completion_tokens: self.max_completion_tokens.unwrap_or(0),
            response_format: self.response_format,
        };

        openai::completion_openai(self.client, &self.messages, &options).await
    }
}

#[derive(Debug, Clone)]
pub struct CompletionOptions {
    pub temperature: f64,
    pub max_completion_tokens: i32,
    pub response_format: ResponseFormat,
}

#[derive(Error, Debug)]
pub enum LLMError {
    #[error("LLM request building failed: {0}")]
    RequestBuildingError(String),
    #[error("LLM request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("LLM API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Failed to parse response: {0}")]
    ParseError(String),
    #[error("LLM response is empty")]
    EmptyResponse,
}
