// src/linkedin/client.rs
//! HTTP client for the LinkedIn OAuth and REST endpoints

use anyhow::{Context, Result};
use reqwest::Url;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{info, warn};

use super::types::{
    person_urn, ugc_post_body, AccessToken, AuthorizationRequest, PublishedPost, TokenRequest,
};
use super::LinkedInError;
use crate::environment::LinkedInSettings;

const USERINFO_ENDPOINT: &str = "/v2/userinfo";
const PROFILE_ENDPOINT: &str = "/v2/me";
const UGC_POSTS_ENDPOINT: &str = "/v2/ugcPosts";

const RESTLI_PROTOCOL_HEADER: &str = "X-Restli-Protocol-Version";
const RESTLI_ID_HEADER: &str = "x-restli-id";

/// Build the provider authorization URL the browser is redirected to.
pub fn authorization_url(
    auth_url: &str,
    request: &AuthorizationRequest,
    default_scope: &str,
) -> Result<Url> {
    let scope = request.scope.as_deref().unwrap_or(default_scope);
    Url::parse_with_params(
        auth_url,
        &[
            ("response_type", "code"),
            ("client_id", request.client_id.as_str()),
            ("redirect_uri", request.redirect_uri.as_str()),
            ("state", request.state.as_str()),
            ("scope", scope),
        ],
    )
    .with_context(|| format!("Invalid authorization URL: {}", auth_url))
}

#[derive(Clone)]
pub struct LinkedInClient {
    client: reqwest::Client,
    settings: LinkedInSettings,
}

impl LinkedInClient {
    pub fn new(settings: LinkedInSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &LinkedInSettings {
        &self.settings
    }

    pub fn authorization_url(&self, request: &AuthorizationRequest) -> Result<Url> {
        authorization_url(&self.settings.auth_url, request, &self.settings.scope)
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}{}",
            self.settings.api_base_url.trim_end_matches('/'),
            endpoint
        )
    }

    /// Trade an authorization code for an access token.
    pub async fn exchange_code(
        &self,
        request: &TokenRequest,
    ) -> Result<AccessToken, LinkedInError> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", request.code.as_str()),
            ("redirect_uri", request.redirect_uri.as_str()),
            ("client_id", request.client_id.as_str()),
            ("client_secret", request.client_secret.as_str()),
        ];

        info!("Exchanging authorization code for client {}", request.client_id);

        let response = self
            .client
            .post(&self.settings.token_url)
            .form(&form)
            .send()
            .await?;

        let response = ensure_success(response).await?;
        Ok(response.json::<AccessToken>().await?)
    }

    /// Legacy lite profile of the token owner, returned as LinkedIn sends it.
    pub async fn profile(&self, access_token: &str) -> Result<Value, LinkedInError> {
        let response = self
            .client
            .get(self.api_url(PROFILE_ENDPOINT))
            .bearer_auth(access_token)
            .send()
            .await?;

        let response = ensure_success(response).await?;
        Ok(response.json::<Value>().await?)
    }

    async fn userinfo_subject(&self, access_token: &str) -> Result<String, LinkedInError> {
        let response = self
            .client
            .get(self.api_url(USERINFO_ENDPOINT))
            .bearer_auth(access_token)
            .send()
            .await?;

        let userinfo: Value = ensure_success(response).await?.json().await?;
        string_field(&userinfo, "sub")
    }

    /// Resolve the member id of the token owner.
    ///
    /// OpenID `userinfo` is tried first; tokens granted without the `openid`
    /// scope can only read `/v2/me`, which is the single fallback.
    pub async fn member_id(&self, access_token: &str) -> Result<String, LinkedInError> {
        let primary = match self.userinfo_subject(access_token).await {
            Ok(sub) => return Ok(sub),
            Err(LinkedInError::Transport(e)) => return Err(LinkedInError::Transport(e)),
            Err(e) => e,
        };

        warn!("userinfo lookup failed, falling back to /v2/me: {}", primary);

        let fallback = match self.profile(access_token).await {
            Ok(profile) => string_field(&profile, "id"),
            Err(e) => Err(e),
        };

        match fallback {
            Ok(id) => Ok(id),
            Err(fallback) if primary.is_upstream() || !fallback.is_upstream() => {
                warn!("/v2/me lookup failed as well: {}", fallback);
                Err(primary)
            }
            Err(fallback) => Err(fallback),
        }
    }

    /// Publish a public, text-only UGC post authored by `member_id`.
    pub async fn publish_text(
        &self,
        access_token: &str,
        member_id: &str,
        text: &str,
    ) -> Result<PublishedPost, LinkedInError> {
        let body = ugc_post_body(&person_urn(member_id), text);

        let response = self
            .client
            .post(self.api_url(UGC_POSTS_ENDPOINT))
            .bearer_auth(access_token)
            .header(RESTLI_PROTOCOL_HEADER, "2.0.0")
            .json(&body)
            .send()
            .await?;

        let response = ensure_success(response).await?;
        let post_id = response
            .headers()
            .get(RESTLI_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let text = response.text().await?;

        // ugcPosts answers 201 with the id in a header and often no body.
        let data = if text.trim().is_empty() {
            json!({ "id": post_id })
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(PublishedPost { data })
    }
}

async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, LinkedInError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(LinkedInError::Upstream {
        status: status.as_u16(),
        body,
    })
}

fn string_field(value: &Value, field: &str) -> Result<String, LinkedInError> {
    value
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| LinkedInError::Decode(format!("response has no '{}' field", field)))
}
