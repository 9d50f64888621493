// src/flows/publish.rs
//! Publish flow: a draft, the current token, and one in-flight submission.

use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

use super::lock;
use crate::core::{PublishBody, RelayApi};
use crate::store::{ConfigStore, Subscription, LINKEDIN_TOKEN};

pub const EMPTY_TEXT_MESSAGE: &str = "Post text cannot be empty";
pub const NOT_CONNECTED_MESSAGE: &str = "No LinkedIn token. Connect your account first.";
pub const PUBLISH_ERROR_MESSAGE: &str = "Error publishing to LinkedIn";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStatus {
    Idle,
    Loading,
    Success,
    Error,
}

/// What a renderer needs to draw the publisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishView {
    pub text: String,
    pub status: PublishStatus,
    pub error: Option<String>,
    pub connected: bool,
}

struct PublishState {
    text: String,
    status: PublishStatus,
    error: Option<String>,
    token: Option<String>,
}

pub struct PublishFlow<R> {
    relay: R,
    state: Arc<Mutex<PublishState>>,
    _subscription: Subscription,
}

impl<R: RelayApi> PublishFlow<R> {
    /// Read the token and keep following it through store notifications,
    /// whether the change was made here or by another process.
    pub fn new(store: &Arc<ConfigStore>, relay: R, initial_text: impl Into<String>) -> Self {
        let state = Arc::new(Mutex::new(PublishState {
            text: initial_text.into(),
            status: PublishStatus::Idle,
            error: None,
            token: store.get(LINKEDIN_TOKEN),
        }));

        let tracked = Arc::clone(&state);
        let subscription = store.subscribe(move |store, _change| {
            lock(&tracked).token = store.get(LINKEDIN_TOKEN);
        });

        Self {
            relay,
            state,
            _subscription: subscription,
        }
    }

    pub fn snapshot(&self) -> PublishView {
        let state = lock(&self.state);
        PublishView {
            text: state.text.clone(),
            status: state.status,
            error: state.error.clone(),
            connected: state.token.is_some(),
        }
    }

    pub fn is_connected(&self) -> bool {
        lock(&self.state).token.is_some()
    }

    pub fn set_text(&self, text: impl Into<String>) {
        lock(&self.state).text = text.into();
    }

    /// Whether the publish control is enabled.
    pub fn can_submit(&self) -> bool {
        let state = lock(&self.state);
        state.status != PublishStatus::Loading && !state.text.trim().is_empty()
    }

    pub async fn publish(&self) -> PublishStatus {
        let body = {
            let mut state = lock(&self.state);
            if state.status == PublishStatus::Loading {
                return state.status;
            }
            if state.text.trim().is_empty() {
                state.error = Some(EMPTY_TEXT_MESSAGE.to_string());
                return state.status;
            }
            let Some(token) = state.token.clone() else {
                state.error = Some(NOT_CONNECTED_MESSAGE.to_string());
                return state.status;
            };

            state.status = PublishStatus::Loading;
            state.error = None;
            PublishBody {
                access_token: token,
                text: state.text.clone(),
            }
        };

        let outcome = self.relay.publish(&body).await;

        let mut state = lock(&self.state);
        match outcome {
            Ok(reply) if reply.is_success() => {
                info!("Post published");
                state.status = PublishStatus::Success;
                state.text.clear();
            }
            Ok(reply) => {
                warn!("Publish relay answered {}: {}", reply.status, reply.body);
                state.status = PublishStatus::Error;
                state.error = Some(
                    reply
                        .error_message()
                        .unwrap_or(PUBLISH_ERROR_MESSAGE)
                        .to_string(),
                );
            }
            Err(e) => {
                error!("Publish relay call failed: {:#}", e);
                state.status = PublishStatus::Error;
                state.error = Some(PUBLISH_ERROR_MESSAGE.to_string());
            }
        }
        state.status
    }
}
