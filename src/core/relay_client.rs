// src/core/relay_client.rs
//! Client side of the relay endpoints, used by the connect and publish flows

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};

const TOKEN_ENDPOINT: &str = "/api/linkedin/token";
const PUBLISH_ENDPOINT: &str = "/api/linkedin/publish";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenExchange {
    pub code: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishBody {
    pub access_token: String,
    pub text: String,
}

/// Status and decoded JSON body of a relay call.
#[derive(Debug, Clone)]
pub struct RelayReply {
    pub status: u16,
    pub body: Value,
}

impl RelayReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The relay's `error` field, when it reported one.
    pub fn error_message(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }
}

/// The relay as seen from the front end. Transport or decode failures are
/// `Err`; any HTTP answer is a `RelayReply`.
#[async_trait]
pub trait RelayApi: Send + Sync {
    async fn exchange_token(&self, request: &TokenExchange) -> Result<RelayReply>;
    async fn publish(&self, request: &PublishBody) -> Result<RelayReply>;
}

#[async_trait]
impl<T: RelayApi + ?Sized> RelayApi for std::sync::Arc<T> {
    async fn exchange_token(&self, request: &TokenExchange) -> Result<RelayReply> {
        (**self).exchange_token(request).await
    }

    async fn publish(&self, request: &PublishBody) -> Result<RelayReply> {
        (**self).publish(request).await
    }
}

pub struct HttpRelay {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRelay {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn post_json<T: Serialize + Sync>(
        &self,
        endpoint: &str,
        payload: &T,
    ) -> Result<RelayReply> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("Calling relay: {}", url);

        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .with_context(|| format!("Failed to POST to {}", url))?;

        let status = response.status();
        trace!("Relay response status: {}", status);

        let body = response
            .json::<Value>()
            .await
            .with_context(|| format!("Relay returned a non-JSON body ({})", status))?;

        Ok(RelayReply {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl RelayApi for HttpRelay {
    async fn exchange_token(&self, request: &TokenExchange) -> Result<RelayReply> {
        self.post_json(TOKEN_ENDPOINT, request).await
    }

    async fn publish(&self, request: &PublishBody) -> Result<RelayReply> {
        self.post_json(PUBLISH_ENDPOINT, request).await
    }
}
