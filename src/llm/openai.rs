use crate::llm::{CompletionOptions, LLMClient, LLMError, Message, ResponseFormat};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const COMPLETION_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Serialize)]
struct OpenAIResponseFormat {
    r#type: &'static str,
}

#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model: String,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<OpenAIResponseFormat>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Deserialize)]
struct OpenAIMessage {
    content: Option<String>,
}

pub(crate) async fn completion_openai(
    client: &LLMClient,
    messages: &[Message],
    options: &CompletionOptions,
) -> Result<String, LLMError> {
    let req_body = OpenAIRequest {
        model: client.model.to_string(),
        messages,
        temperature: (options.temperature != 0.0).then_some(options.temperature),
        max_tokens: (options.max_completion_tokens != 0).then_some(options.max_completion_tokens),
        response_format: match options.response_format {
            ResponseFormat::Text => None,
            ResponseFormat::JsonObject => Some(OpenAIResponseFormat {
                r#type: "json_object",
            }),
        },
    };

    let mut headers = HeaderMap::new();

    let mut auth_header = match HeaderValue::from_str(&format!("Bearer {}", client.api_key.0)) {
        Ok(header) => header,
        Err(e) => return Err(LLMError::RequestBuildingError(e.to_string())),
    };
    auth_header.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth_header);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let mut url = client.base_url.clone();
    match url.path_segments_mut() {
        Ok(mut segments) => {
            segments.pop_if_empty().extend(["chat", "completions"]);
        }
        Err(_) => {
            return Err(LLMError::RequestBuildingError(format!(
                "invalid completion base URL: {}",
                client.base_url
            )))
        }
    }

    let response = client
        .http
        .post(url)
        .headers(headers)
        .json(&req_body)
        .timeout(COMPLETION_TIMEOUT)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());
        warn!(status = status.as_u16(), "completion request failed");
        return Err(LLMError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let response_body: OpenAIResponse = response.json().await?;
    debug!(model = %client.model, choices = response_body.choices.len(), "completion received");

    response_body
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .ok_or(LLMError::EmptyResponse)
}
