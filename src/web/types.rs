// src/web/types.rs - Relay request bodies and JSON responders

use rocket::form::FromForm;
use rocket::http::{ContentType, Status};
use rocket::response::{self, Responder};
use rocket::serde::{Deserialize, Serialize};
use rocket::{Request, Response};
use serde_json::{json, Value};

use crate::linkedin::TokenRequest;

#[derive(Deserialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct TokenExchangeRequest {
    pub code: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
}

impl TokenExchangeRequest {
    /// All four fields, non-empty, or nothing.
    pub fn into_token_request(self) -> Option<TokenRequest> {
        Some(TokenRequest {
            code: non_empty(self.code)?,
            client_id: non_empty(self.client_id)?,
            client_secret: non_empty(self.client_secret)?,
            redirect_uri: non_empty(self.redirect_uri)?,
        })
    }
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct ProfileRequest {
    pub access_token: Option<String>,
}

#[derive(FromForm)]
pub struct ProfileQuery {
    #[field(name = "accessToken")]
    pub access_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct PublishRequest {
    pub access_token: Option<String>,
    pub text: Option<String>,
}

pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: &str) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}

/// Arbitrary JSON body with an explicit status.
#[derive(Debug)]
pub struct JsonResponse {
    pub status: Status,
    pub body: Value,
}

impl JsonResponse {
    pub fn ok(body: Value) -> Self {
        Self {
            status: Status::Ok,
            body,
        }
    }

    pub fn error(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }

    pub fn with_body(status: Status, body: Value) -> Self {
        Self { status, body }
    }
}

impl<'r> Responder<'r, 'static> for JsonResponse {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let payload = self.body.to_string();
        Response::build()
            .status(self.status)
            .header(ContentType::JSON)
            .sized_body(payload.len(), std::io::Cursor::new(payload))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_request_requires_every_field() {
        let complete = TokenExchangeRequest {
            code: Some("c".to_string()),
            client_id: Some("id".to_string()),
            client_secret: Some("sec".to_string()),
            redirect_uri: Some("uri".to_string()),
        };
        let request = complete.into_token_request().unwrap();
        assert_eq!(request.client_secret, "sec");

        let missing_secret = TokenExchangeRequest {
            code: Some("c".to_string()),
            client_id: Some("id".to_string()),
            client_secret: Some("  ".to_string()),
            redirect_uri: Some("uri".to_string()),
        };
        assert!(missing_secret.into_token_request().is_none());
    }
}
