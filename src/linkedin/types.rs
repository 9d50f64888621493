// src/linkedin/types.rs
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Parameters of the authorization redirect. Never persisted.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub client_id: String,
    pub redirect_uri: String,
    pub state: String,
    pub scope: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TokenRequest {
    pub code: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: u64,
    /// Anything else LinkedIn returned (scope, refresh tokens, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of posting to `ugcPosts`.
#[derive(Debug, Clone)]
pub struct PublishedPost {
    pub data: Value,
}

pub fn person_urn(member_id: &str) -> String {
    format!("urn:li:person:{}", member_id)
}

/// Plain-text, public, media-less UGC share.
pub fn ugc_post_body(author_urn: &str, text: &str) -> Value {
    json!({
        "author": author_urn,
        "lifecycleState": "PUBLISHED",
        "specificContent": {
            "com.linkedin.ugc.ShareContent": {
                "shareCommentary": { "text": text },
                "shareMediaCategory": "NONE"
            }
        },
        "visibility": {
            "com.linkedin.ugc.MemberNetworkVisibility": "PUBLIC"
        }
    })
}
