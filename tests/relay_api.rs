// Relay endpoints driven through Rocket's local client, LinkedIn mocked.

use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use serde_json::{json, Value};
use social_creator::{build_rocket, AppConfig};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> AppConfig {
    let mut config = AppConfig::default();
    config.app_origin = "http://app.test".to_string();
    config.linkedin.token_url = format!("{}/oauth/v2/accessToken", server.uri());
    config.linkedin.api_base_url = server.uri();
    config.linkedin.timeout_seconds = 5;
    config
}

async fn client_for(config: &AppConfig) -> Client {
    Client::tracked(build_rocket(config).unwrap())
        .await
        .unwrap()
}

async fn post_json(client: &Client, uri: &str, body: Value) -> (Status, Value) {
    let response = client
        .post(uri)
        .header(ContentType::JSON)
        .body(body.to_string())
        .dispatch()
        .await;
    let status = response.status();
    let body = response.into_json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}

fn token_body() -> Value {
    json!({
        "code": "C",
        "clientId": "id",
        "clientSecret": "secret",
        "redirectUri": "http://app.test/linkedin"
    })
}

#[tokio::test]
async fn token_exchange_returns_provider_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/v2/accessToken"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=C"))
        .and(body_string_contains("client_secret=secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "T",
            "expires_in": 5184000,
            "scope": "w_member_social"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&config_for(&server)).await;
    let (status, body) = post_json(&client, "/api/linkedin/token", token_body()).await;

    assert_eq!(status, Status::Ok);
    assert_eq!(body["access_token"], "T");
    assert_eq!(body["expires_in"], 5184000);
    assert_eq!(body["scope"], "w_member_social");
}

#[tokio::test]
async fn token_exchange_requires_every_field() {
    let server = MockServer::start().await;
    let client = client_for(&config_for(&server)).await;

    let (status, body) = post_json(
        &client,
        "/api/linkedin/token",
        json!({"code": "C", "clientId": "id"}),
    )
    .await;

    assert_eq!(status, Status::BadRequest);
    assert_eq!(
        body["error"],
        "code, clientId, clientSecret and redirectUri are required"
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn token_exchange_maps_provider_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/v2/accessToken"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid_grant"))
        .mount(&server)
        .await;

    let client = client_for(&config_for(&server)).await;
    let (status, body) = post_json(&client, "/api/linkedin/token", token_body()).await;

    assert_eq!(status, Status::BadRequest);
    assert_eq!(body["error"], "LinkedIn token error");
}

#[tokio::test]
async fn token_exchange_unreachable_provider_is_server_error() {
    let mut config = AppConfig::default();
    config.linkedin.token_url = "http://127.0.0.1:1/oauth/v2/accessToken".to_string();
    config.linkedin.timeout_seconds = 5;

    let client = client_for(&config).await;
    let (status, body) = post_json(&client, "/api/linkedin/token", token_body()).await;

    assert_eq!(status, Status::InternalServerError);
    assert_eq!(body["error"], "Server error");
}

#[tokio::test]
async fn profile_requires_token() {
    let server = MockServer::start().await;
    let client = client_for(&config_for(&server)).await;

    let response = client.get("/api/linkedin/profile").dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["error"], "Access token is required");

    let (status, body) = post_json(&client, "/api/linkedin/profile", json!({})).await;
    assert_eq!(status, Status::BadRequest);
    assert_eq!(body["error"], "Access token is required");
}

#[tokio::test]
async fn profile_passes_through_provider_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/me"))
        .and(header("authorization", "Bearer T"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "abc123",
            "localizedFirstName": "Ada"
        })))
        .mount(&server)
        .await;

    let client = client_for(&config_for(&server)).await;

    let response = client
        .get("/api/linkedin/profile?accessToken=T")
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["id"], "abc123");
    assert_eq!(body["localizedFirstName"], "Ada");

    let (status, body) =
        post_json(&client, "/api/linkedin/profile", json!({"accessToken": "T"})).await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body["id"], "abc123");
}

#[tokio::test]
async fn profile_rejection_is_forbidden() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/me"))
        .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
        .mount(&server)
        .await;

    let client = client_for(&config_for(&server)).await;
    let response = client
        .get("/api/linkedin/profile?accessToken=T")
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Forbidden);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(
        body["error"],
        "Failed to get profile: Status: 401, Error: expired"
    );
}

#[tokio::test]
async fn publish_requires_token_and_text() {
    let server = MockServer::start().await;
    let client = client_for(&config_for(&server)).await;

    for body in [
        json!({"accessToken": "T"}),
        json!({"text": "hello"}),
        json!({"accessToken": "T", "text": "   "}),
    ] {
        let (status, body) = post_json(&client, "/api/linkedin/publish", body).await;
        assert_eq!(status, Status::BadRequest);
        assert_eq!(body["error"], "Access token and text are required");
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn publish_authors_post_as_userinfo_subject() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/userinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sub": "u1"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/ugcPosts"))
        .and(header("X-Restli-Protocol-Version", "2.0.0"))
        .and(body_string_contains("urn:li:person:u1"))
        .and(body_string_contains("hello world"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "urn:li:share:9"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&config_for(&server)).await;
    let (status, body) = post_json(
        &client,
        "/api/linkedin/publish",
        json!({"accessToken": "T", "text": "hello world"}),
    )
    .await;

    assert_eq!(status, Status::Ok);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["id"], "urn:li:share:9");
}

#[tokio::test]
async fn publish_falls_back_to_legacy_profile_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/userinfo"))
        .respond_with(ResponseTemplate::new(403).set_body_string("no openid scope"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "legacy7"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/ugcPosts"))
        .and(body_string_contains("urn:li:person:legacy7"))
        .respond_with(ResponseTemplate::new(201).insert_header("x-restli-id", "urn:li:share:5"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&config_for(&server)).await;
    let (status, body) = post_json(
        &client,
        "/api/linkedin/publish",
        json!({"accessToken": "T", "text": "hi"}),
    )
    .await;

    assert_eq!(status, Status::Ok);
    assert_eq!(body["data"]["id"], "urn:li:share:5");
}

#[tokio::test]
async fn publish_reports_unresolvable_member() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/userinfo"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad token"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/me"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad token"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/ugcPosts"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&config_for(&server)).await;
    let (status, body) = post_json(
        &client,
        "/api/linkedin/publish",
        json!({"accessToken": "T", "text": "hi"}),
    )
    .await;

    assert_eq!(status, Status::BadRequest);
    assert_eq!(
        body["error"],
        "Failed to get user profile: Status: 401, Error: bad token"
    );
}

#[tokio::test]
async fn publish_reports_rejected_post_with_details() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/userinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sub": "u1"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/ugcPosts"))
        .respond_with(ResponseTemplate::new(422).set_body_string("duplicate post"))
        .mount(&server)
        .await;

    let client = client_for(&config_for(&server)).await;
    let (status, body) = post_json(
        &client,
        "/api/linkedin/publish",
        json!({"accessToken": "T", "text": "again"}),
    )
    .await;

    assert_eq!(status, Status::BadRequest);
    assert_eq!(body["error"], "Failed to publish post");
    assert_eq!(body["details"]["status"], 422);
    assert_eq!(body["details"]["error"], "duplicate post");
}

#[tokio::test]
async fn publish_unreachable_provider_is_internal_error() {
    let mut config = AppConfig::default();
    config.linkedin.api_base_url = "http://127.0.0.1:1".to_string();
    config.linkedin.timeout_seconds = 5;

    let client = client_for(&config).await;
    let (status, body) = post_json(
        &client,
        "/api/linkedin/publish",
        json!({"accessToken": "T", "text": "hi"}),
    )
    .await;

    assert_eq!(status, Status::InternalServerError);
    assert_eq!(body["error"], "Internal server error");
}

#[tokio::test]
async fn malformed_json_is_invalid_request_format() {
    let server = MockServer::start().await;
    let client = client_for(&config_for(&server)).await;

    let response = client
        .post("/api/linkedin/publish")
        .header(ContentType::JSON)
        .body("{not json")
        .dispatch()
        .await;

    assert!([400, 422].contains(&response.status().code));
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["error"], "Invalid request format");
}

#[tokio::test]
async fn unknown_route_is_json_not_found() {
    let server = MockServer::start().await;
    let client = client_for(&config_for(&server)).await;

    let response = client.get("/api/nothing-here").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["error"], "Not found");
}

#[tokio::test]
async fn responses_carry_cors_headers() {
    let server = MockServer::start().await;
    let client = client_for(&config_for(&server)).await;

    let response = client.get("/api/health").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(
        response.headers().get_one("Access-Control-Allow-Origin"),
        Some("http://app.test")
    );

    let preflight = client.options("/api/linkedin/publish").dispatch().await;
    assert_eq!(preflight.status(), Status::Ok);
    assert_eq!(
        preflight.headers().get_one("Access-Control-Allow-Headers"),
        Some("Content-Type")
    );
}
