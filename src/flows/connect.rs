// src/flows/connect.rs
//! OAuth connect flow.
//!
//! Two phases: `connect` redirects the browser to LinkedIn, and on return a
//! fresh `mount` picks up the `code` from the URL and exchanges it through the
//! relay. Nothing survives the redirect except the URL and the store.

use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::{query_param, strip_oauth_params, Location};
use crate::core::{RelayApi, RelayReply, TokenExchange};
use crate::environment::LinkedInSettings;
use crate::linkedin::{authorization_url, AuthorizationRequest};
use crate::store::{ConfigStore, LINKEDIN_CLIENT_ID, LINKEDIN_CLIENT_SECRET, LINKEDIN_TOKEN};

pub const TOKEN_ERROR_MESSAGE: &str = "Could not obtain the LinkedIn access token";
pub const MISSING_CLIENT_ID_MESSAGE: &str = "LinkedIn client id is missing from the configuration";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectStatus {
    Idle,
    Connecting,
    Connected,
    Error,
}

pub struct ConnectFlow<R> {
    store: Arc<ConfigStore>,
    relay: R,
    redirect_uri: String,
    auth_url: String,
    scope: String,
    status: ConnectStatus,
    error: Option<String>,
}

impl<R: RelayApi> ConnectFlow<R> {
    pub fn new(
        store: Arc<ConfigStore>,
        relay: R,
        redirect_uri: impl Into<String>,
        linkedin: &LinkedInSettings,
    ) -> Self {
        Self {
            store,
            relay,
            redirect_uri: redirect_uri.into(),
            auth_url: linkedin.auth_url.clone(),
            scope: linkedin.scope.clone(),
            status: ConnectStatus::Idle,
            error: None,
        }
    }

    pub fn status(&self) -> ConnectStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Settle the initial state from the store and the current URL, finishing
    /// an authorization round-trip when the URL carries a code.
    pub async fn mount(&mut self, location: &dyn Location) -> ConnectStatus {
        if self.store.get(LINKEDIN_TOKEN).is_some() {
            self.status = ConnectStatus::Connected;
            return self.status;
        }

        let url = location.href();
        let Some(code) = query_param(&url, "code") else {
            return self.status;
        };

        let (Some(client_id), Some(client_secret)) = (
            self.store.get(LINKEDIN_CLIENT_ID),
            self.store.get(LINKEDIN_CLIENT_SECRET),
        ) else {
            debug!("Authorization code present but client credentials are not configured");
            return self.status;
        };

        self.status = ConnectStatus::Connecting;
        self.error = None;

        let request = TokenExchange {
            code,
            client_id,
            client_secret,
            redirect_uri: self.redirect_uri.clone(),
        };

        let token = match self.relay.exchange_token(&request).await {
            Ok(reply) => access_token(&reply),
            Err(e) => {
                error!("Token relay call failed: {:#}", e);
                None
            }
        };

        let Some(token) = token else {
            return self.fail();
        };

        if let Err(e) = self.store.set(LINKEDIN_TOKEN, &token) {
            error!("Failed to persist LinkedIn token: {:#}", e);
            return self.fail();
        }

        info!("LinkedIn account connected");
        self.status = ConnectStatus::Connected;
        location.replace(strip_oauth_params(&url));
        self.status
    }

    /// Start a new authorization by navigating to LinkedIn.
    pub fn connect(&mut self, location: &dyn Location) -> Result<()> {
        let Some(client_id) = self.store.get(LINKEDIN_CLIENT_ID) else {
            self.error = Some(MISSING_CLIENT_ID_MESSAGE.to_string());
            return Ok(());
        };

        let request = AuthorizationRequest {
            client_id,
            redirect_uri: self.redirect_uri.clone(),
            state: uuid::Uuid::new_v4().simple().to_string(),
            scope: None,
        };
        let url = authorization_url(&self.auth_url, &request, &self.scope)?;

        self.error = None;
        location.assign(url);
        Ok(())
    }

    /// Forget the stored token.
    pub fn disconnect(&mut self) -> Result<()> {
        self.store.remove(LINKEDIN_TOKEN)?;
        self.status = ConnectStatus::Idle;
        self.error = None;
        Ok(())
    }

    fn fail(&mut self) -> ConnectStatus {
        self.status = ConnectStatus::Error;
        self.error = Some(TOKEN_ERROR_MESSAGE.to_string());
        self.status
    }
}

fn access_token(reply: &RelayReply) -> Option<String> {
    if let Some(message) = reply.error_message() {
        warn!("Token relay reported an error ({}): {}", reply.status, message);
        return None;
    }
    reply
        .body
        .get("access_token")
        .and_then(|token| token.as_str())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}
