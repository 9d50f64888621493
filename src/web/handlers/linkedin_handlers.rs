// src/web/handlers/linkedin_handlers.rs - LinkedIn relay endpoints

use crate::linkedin::{LinkedInClient, LinkedInError};
use crate::web::types::{
    non_empty, JsonResponse, ProfileRequest, PublishRequest, TokenExchangeRequest,
};

use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use serde_json::json;
use tracing::{error, info, warn};

const INTERNAL_ERROR: &str = "Internal server error";

pub async fn exchange_token_handler(
    request: Json<TokenExchangeRequest>,
    linkedin: &State<LinkedInClient>,
) -> JsonResponse {
    let Some(token_request) = request.into_inner().into_token_request() else {
        return JsonResponse::error(
            Status::BadRequest,
            "code, clientId, clientSecret and redirectUri are required",
        );
    };

    match linkedin.exchange_code(&token_request).await {
        Ok(token) => match serde_json::to_value(&token) {
            Ok(body) => {
                info!(
                    "Issued LinkedIn token for client {} (expires in {}s)",
                    token_request.client_id, token.expires_in
                );
                JsonResponse::ok(body)
            }
            Err(e) => {
                error!("Failed to serialize token response: {}", e);
                JsonResponse::error(Status::InternalServerError, "Server error")
            }
        },
        Err(LinkedInError::Upstream { status, body }) => {
            warn!("LinkedIn rejected code exchange ({}): {}", status, body);
            JsonResponse::error(Status::BadRequest, "LinkedIn token error")
        }
        Err(e) => {
            error!("Token exchange failed: {}", e);
            JsonResponse::error(Status::InternalServerError, "Server error")
        }
    }
}

pub async fn profile_handler(
    access_token: Option<String>,
    linkedin: &State<LinkedInClient>,
) -> JsonResponse {
    let Some(access_token) = non_empty(access_token) else {
        return JsonResponse::error(Status::BadRequest, "Access token is required");
    };

    match linkedin.profile(&access_token).await {
        Ok(profile) => JsonResponse::ok(profile),
        Err(LinkedInError::Upstream { status, body }) => {
            warn!("LinkedIn profile lookup rejected ({}): {}", status, body);
            JsonResponse::error(
                Status::Forbidden,
                format!("Failed to get profile: Status: {}, Error: {}", status, body),
            )
        }
        Err(e) => {
            error!("Profile lookup failed: {}", e);
            JsonResponse::error(Status::InternalServerError, INTERNAL_ERROR)
        }
    }
}

pub async fn profile_from_body_handler(
    request: Json<ProfileRequest>,
    linkedin: &State<LinkedInClient>,
) -> JsonResponse {
    profile_handler(request.into_inner().access_token, linkedin).await
}

pub async fn publish_handler(
    request: Json<PublishRequest>,
    linkedin: &State<LinkedInClient>,
) -> JsonResponse {
    let request = request.into_inner();
    let (Some(access_token), Some(text)) =
        (non_empty(request.access_token), non_empty(request.text))
    else {
        return JsonResponse::error(Status::BadRequest, "Access token and text are required");
    };

    let member_id = match linkedin.member_id(&access_token).await {
        Ok(id) => id,
        Err(LinkedInError::Upstream { status, body }) => {
            return JsonResponse::error(
                Status::BadRequest,
                format!(
                    "Failed to get user profile: Status: {}, Error: {}",
                    status, body
                ),
            );
        }
        Err(e) => {
            error!("Member id resolution failed: {}", e);
            return JsonResponse::error(Status::InternalServerError, INTERNAL_ERROR);
        }
    };

    match linkedin.publish_text(&access_token, &member_id, &text).await {
        Ok(post) => {
            info!(
                "Published post for member {} ({} chars)",
                member_id,
                text.chars().count()
            );
            JsonResponse::ok(json!({ "success": true, "data": post.data }))
        }
        Err(LinkedInError::Upstream { status, body }) => {
            warn!("LinkedIn rejected post ({}): {}", status, body);
            JsonResponse::with_body(
                Status::BadRequest,
                json!({
                    "error": "Failed to publish post",
                    "details": { "status": status, "error": body }
                }),
            )
        }
        Err(e) => {
            error!("Publishing failed: {}", e);
            JsonResponse::error(Status::InternalServerError, INTERNAL_ERROR)
        }
    }
}
