use crate::query::SearchRequest;
use crate::review::{Review, UserProfile};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

pub const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);
pub const SEARCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum ElasticError {
    #[error("Elasticsearch returned {status}")]
    Status { status: u16, body: String },
    #[error("{0}")]
    Network(#[from] reqwest::Error),
    #[error("Invalid Elasticsearch URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid Elasticsearch API key")]
    InvalidApiKey,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct TotalHits {
    #[serde(default)]
    pub value: u64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Hit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_score")]
    pub score: Option<f64>,
    #[serde(rename = "_source", default)]
    pub source: Review,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Hits {
    #[serde(default)]
    pub total: TotalHits,
    pub max_score: Option<f64>,
    #[serde(default)]
    pub hits: Vec<Hit>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct SearchResponse {
    #[serde(default)]
    pub took: u64,
    #[serde(default)]
    pub hits: Hits,
}

#[derive(Deserialize, Debug)]
struct ProfileDocument {
    #[serde(rename = "_source", default)]
    source: UserProfile,
}

/// HTTP client for the hosted search engine holding reviews and profiles.
#[derive(Clone)]
pub struct ElasticClient {
    http: Client,
    base_url: Url,
    review_index: String,
    profile_index: String,
}

impl ElasticClient {
    pub fn new(
        base_url: Url,
        api_key: &str,
        review_index: &str,
        profile_index: &str,
    ) -> Result<Self, ElasticError> {
        let mut auth = HeaderValue::from_str(&format!("ApiKey {api_key}"))
            .map_err(|_| ElasticError::InvalidApiKey)?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let http = Client::builder().default_headers(headers).build()?;
        Ok(Self {
            http,
            base_url,
            review_index: review_index.to_string(),
            profile_index: profile_index.to_string(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ElasticError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ElasticError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ElasticError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Elasticsearch request failed");
            return Err(ElasticError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }

    pub async fn cluster_health(&self) -> Result<Value, ElasticError> {
        let url = self.endpoint(&["_cluster", "health"])?;
        let response = self.http.get(url).timeout(LOOKUP_TIMEOUT).send().await?;
        debug!(status = response.status().as_u16(), "cluster health response");
        Self::read_json(response).await
    }

    /// Looks up a profile by username. `Ok(None)` when the document does not exist.
    pub async fn user_profile(&self, username: &str) -> Result<Option<UserProfile>, ElasticError> {
        let url = self.endpoint(&[self.profile_index.as_str(), "_doc", username])?;
        let response = self.http.get(url).timeout(LOOKUP_TIMEOUT).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let document: ProfileDocument = Self::read_json(response).await?;
        Ok(Some(document.source))
    }

    pub async fn search_reviews(
        &self,
        request: &SearchRequest,
    ) -> Result<SearchResponse, ElasticError> {
        let url = self.endpoint(&[self.review_index.as_str(), "_search"])?;
        debug!(
            query = %serde_json::to_string(request).unwrap_or_default(),
            "searching review index"
        );
        let response = self
            .http
            .post(url)
            .json(request)
            .timeout(SEARCH_TIMEOUT)
            .send()
            .await?;
        debug!(status = response.status().as_u16(), "search response");
        Self::read_json(response).await
    }
}
