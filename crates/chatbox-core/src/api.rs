//! Typed client for the chat backend's HTTP endpoints

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Serialize)]
struct ChatRequest<'a> {
    user_input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<&'a str>,
}

#[derive(Serialize)]
struct LearnRequest {
    user_input: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    response: String,
}

#[derive(Deserialize)]
struct LearnResponse {
    message: String,
}

#[derive(Deserialize)]
struct WeatherResponse {
    weather: String,
}

#[derive(Deserialize)]
struct NewsResponse {
    news: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    search_results: String,
}

/// The backend reports some bad requests as 200 with an `error` field.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Failed { error: String },
    Ok(T),
}

#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    user_id: Option<String>,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id: None,
        }
    }

    /// Build a client with an overall per-request timeout
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id: None,
        })
    }

    /// Session identifier forwarded to `/chat`
    pub fn user_id(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn chat(&self, user_input: &str) -> Result<String, ApiError> {
        let url = format!("{}/chat", self.base_url);
        let request = ChatRequest {
            user_input,
            user_id: self.user_id.as_deref(),
        };

        let response = self.client.post(&url).json(&request).send().await?;
        let body: ChatResponse = decode(response).await?;
        Ok(body.response)
    }

    pub async fn learn(&self, key: &str, value: &str) -> Result<String, ApiError> {
        let url = format!("{}/learn", self.base_url);
        let request = LearnRequest {
            user_input: format!("{}: {}", key, value),
        };

        let response = self.client.post(&url).json(&request).send().await?;
        let body: LearnResponse = decode(response).await?;
        Ok(body.message)
    }

    pub async fn weather(&self, location: &str) -> Result<String, ApiError> {
        let url = format!(
            "{}/weather/{}",
            self.base_url,
            urlencoding::encode(location)
        );

        let response = self.client.get(&url).send().await?;
        let body: WeatherResponse = decode(response).await?;
        Ok(body.weather)
    }

    pub async fn news(&self) -> Result<String, ApiError> {
        let url = format!("{}/news", self.base_url);

        let response = self.client.get(&url).send().await?;
        let body: NewsResponse = decode(response).await?;
        Ok(body.news)
    }

    pub async fn search(&self, query: &str) -> Result<String, ApiError> {
        let url = format!(
            "{}/search?query={}",
            self.base_url,
            urlencoding::encode(query)
        );

        let response = self.client.get(&url).send().await?;
        let body: SearchResponse = decode(response).await?;
        Ok(body.search_results)
    }

    /// Everything the backend has learned so far, keyed by fact name
    pub async fn personal_info(&self) -> Result<BTreeMap<String, String>, ApiError> {
        let url = format!("{}/personal_info", self.base_url);

        let response = self.client.get(&url).send().await?;
        let body = checked_text(response).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

async fn checked_text(response: Response) -> Result<String, ApiError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ApiError::Status { status, body });
    }

    Ok(body)
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = checked_text(response).await?;

    match serde_json::from_str::<Envelope<T>>(&body) {
        Ok(Envelope::Ok(value)) => Ok(value),
        Ok(Envelope::Failed { error }) => Err(ApiError::Backend(error)),
        Err(err) => Err(ApiError::Decode(err)),
    }
}
