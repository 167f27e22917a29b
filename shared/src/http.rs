//! HTTP client for the forecast backend.
//!
//! Implements [`ReportStore`] and [`ChatEndpoint`] over the backend's REST API:
//! - GET /reports - List the caller's reports
//! - POST /reports - Run a forecast and persist it
//! - GET /reports/{id} - Fetch one report
//! - PUT /reports/{id} - Replace a report's input
//! - DELETE /reports/{id} - Delete a report
//! - POST /chat - Ask about a report or recompute it with overrides

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use crate::chat::{ChatEndpoint, ChatReply, ChatRequest, ChatResponseBody};
use crate::models::{ApiResponse, Report, ReportInput};
use crate::session::Credential;
use crate::store::ReportStore;
use crate::{Config, Error, Result};

/// Client for the forecast backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new client for `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("forecast-assistant/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.api_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn reports_url(&self) -> String {
        format!("{}/reports", self.base_url)
    }

    fn report_url(&self, report_id: &str) -> String {
        format!("{}/reports/{}", self.base_url, urlencoding::encode(report_id))
    }

    fn chat_url(&self) -> String {
        format!("{}/chat", self.base_url)
    }

    async fn execute(&self, request: RequestBuilder, credential: &Credential) -> Result<Response> {
        let response = request
            .header(reqwest::header::AUTHORIZATION, credential.bearer())
            .send()
            .await?;

        debug!("{} {}", response.status(), response.url());
        Ok(response)
    }

    /// Read a report-store envelope, mapping HTTP failures onto [`Error`].
    async fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<ApiResponse<T>> {
        let body = read_success_body(response).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

async fn read_success_body(response: Response) -> Result<Vec<u8>> {
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        let error = status_error(status, &body);
        error!("Backend returned {}: {}", status, error);
        return Err(error);
    }

    Ok(body.to_vec())
}

/// Classify a failed response.
///
/// A 4xx, or any status whose JSON body names an `error` or `detail`, is the
/// backend refusing the request. Anything else (a gateway page, an empty 5xx)
/// never came from the backend's own logic and counts as a transport failure.
fn status_error(status: StatusCode, body: &[u8]) -> Error {
    match body_message(body) {
        Some(message) => Error::from_status(status.as_u16(), message),
        None if status.is_client_error() => {
            let message = match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => "Backend did not accept the session",
                StatusCode::NOT_FOUND => "Report not found",
                _ => "Backend refused the request",
            };
            Error::from_status(status.as_u16(), message)
        }
        None => Error::Internal(format!("Backend returned {}", status)),
    }
}

/// `error`, then `detail`, from a JSON error body.
fn body_message(body: &[u8]) -> Option<String> {
    let parsed: Value = serde_json::from_slice(body).ok()?;
    parsed
        .get("error")
        .and_then(Value::as_str)
        .or_else(|| parsed.get("detail").and_then(Value::as_str))
        .map(String::from)
}

#[async_trait]
impl ReportStore for ApiClient {
    async fn list(&self, credential: &Credential) -> Result<Vec<Report>> {
        let response = self.execute(self.http.get(self.reports_url()), credential).await?;
        let envelope: ApiResponse<Vec<Report>> = Self::read_envelope(response).await?;
        Ok(envelope.into_optional()?.unwrap_or_default())
    }

    async fn fetch(&self, report_id: &str, credential: &Credential) -> Result<Report> {
        let response = self.execute(self.http.get(self.report_url(report_id)), credential).await?;
        Self::read_envelope(response).await?.into_result()
    }

    async fn create(&self, input: &ReportInput, credential: &Credential) -> Result<Report> {
        let request = self.http.post(self.reports_url()).json(input);
        let response = self.execute(request, credential).await?;
        Self::read_envelope(response).await?.into_result()
    }

    async fn update(
        &self,
        report_id: &str,
        input: &ReportInput,
        credential: &Credential,
    ) -> Result<Report> {
        let request = self.http.put(self.report_url(report_id)).json(input);
        let response = self.execute(request, credential).await?;
        Self::read_envelope(response).await?.into_result()
    }

    async fn delete(&self, report_id: &str, credential: &Credential) -> Result<bool> {
        let response = self
            .execute(self.http.delete(self.report_url(report_id)), credential)
            .await?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => read_success_body(response).await.map(|_| false),
        }
    }
}

#[async_trait]
impl ChatEndpoint for ApiClient {
    async fn send(&self, request: &ChatRequest, credential: &Credential) -> Result<ChatReply> {
        let builder = self.http.post(self.chat_url()).json(request);
        let response = self.execute(builder, credential).await?;
        let body = read_success_body(response).await?;
        let parsed: ChatResponseBody = serde_json::from_slice(&body)?;
        parsed.into_reply()
    }
}
