// src/web/mod.rs - Relay server: routes, CORS and catchers

pub mod handlers;
pub mod types;

pub use types::*;

use crate::environment::AppConfig;
use crate::linkedin::LinkedInClient;
use anyhow::Result;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{catchers, get, options, post, routes, Build, Request, Response, Rocket, State};
use tracing::info;

// CORS Fairing
pub struct Cors {
    allowed_origin: String,
}

impl Cors {
    pub fn new(allowed_origin: impl Into<String>) -> Self {
        Self {
            allowed_origin: allowed_origin.into(),
        }
    }
}

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new(
            "Access-Control-Allow-Origin",
            self.allowed_origin.clone(),
        ));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "Content-Type"));
        response.set_header(Header::new("Vary", "Origin"));
    }
}

#[post("/linkedin/token", data = "<request>")]
pub async fn exchange_token(
    request: Json<TokenExchangeRequest>,
    linkedin: &State<LinkedInClient>,
) -> JsonResponse {
    handlers::exchange_token_handler(request, linkedin).await
}

#[get("/linkedin/profile?<query..>")]
pub async fn get_profile(query: ProfileQuery, linkedin: &State<LinkedInClient>) -> JsonResponse {
    handlers::profile_handler(query.access_token, linkedin).await
}

#[post("/linkedin/profile", data = "<request>")]
pub async fn post_profile(
    request: Json<ProfileRequest>,
    linkedin: &State<LinkedInClient>,
) -> JsonResponse {
    handlers::profile_from_body_handler(request, linkedin).await
}

#[post("/linkedin/publish", data = "<request>")]
pub async fn publish(
    request: Json<PublishRequest>,
    linkedin: &State<LinkedInClient>,
) -> JsonResponse {
    handlers::publish_handler(request, linkedin).await
}

#[get("/health")]
pub async fn health() -> Json<&'static str> {
    handlers::health_handler().await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<ErrorBody> {
    Json(ErrorBody::new("Invalid request format"))
}

#[rocket::catch(422)]
pub fn unprocessable_entity() -> Json<ErrorBody> {
    Json(ErrorBody::new("Invalid request format"))
}

#[rocket::catch(404)]
pub fn not_found() -> Json<ErrorBody> {
    Json(ErrorBody::new("Not found"))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<ErrorBody> {
    Json(ErrorBody::new("Internal server error"))
}

/// Assemble the relay without launching it.
pub fn build_rocket(config: &AppConfig) -> Result<Rocket<Build>> {
    let linkedin = LinkedInClient::new(config.linkedin.clone())?;

    let figment = rocket::Config::figment()
        .merge(("address", config.server.address.clone()))
        .merge(("port", config.server.port));

    Ok(rocket::custom(figment)
        .attach(Cors::new(config.app_origin.clone()))
        .manage(linkedin)
        .register(
            "/",
            catchers![bad_request, unprocessable_entity, not_found, internal_error],
        )
        .mount(
            "/api",
            routes![
                exchange_token,
                get_profile,
                post_profile,
                publish,
                health,
                options,
            ],
        ))
}

// Main server start function
pub async fn start_web_server(config: &AppConfig) -> Result<()> {
    let rocket = build_rocket(config)?;

    info!("Starting social-creator relay server");
    info!(
        "Server: http://{}:{}",
        config.server.address, config.server.port
    );
    info!("LinkedIn API: {}", config.linkedin.api_base_url);
    info!("Allowed origin: {}", config.app_origin);

    rocket
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Relay server failed: {}", e))?;

    Ok(())
}
