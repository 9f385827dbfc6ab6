// Integration tests for the PsyConnect generation service
//
// Each test drives the real route configuration through actix's test
// harness; the Gemini API is stubbed with a local mockito server.

use actix_web::{http::StatusCode, test, web, App};
use mockito::Matcher;
use psyconnect_gen::errors::handle_json_payload_error;
use psyconnect_gen::routes::configure_routes;
use psyconnect_gen::routes::generate::AppState;
use psyconnect_gen::services::GeminiClient;
use serde_json::{json, Value};
use std::sync::Arc;

const MODEL: &str = "gemini-2.5-flash-preview-09-2025";
const GENERATE_PATH: &str = "/models/gemini-2.5-flash-preview-09-2025:generateContent";

fn app_state(base_url: &str, api_key: Option<&str>) -> AppState {
    AppState {
        gemini: Arc::new(GeminiClient::new(
            base_url.to_string(),
            MODEL.to_string(),
            api_key.map(str::to_string),
        )),
    }
}

fn profile_fixture() -> Value {
    json!([{
        "name": "Dra. Luna",
        "specialty": "TCC",
        "description": "10 años de experiencia en ansiedad",
        "matchReason": "Experiencia en TCC online para ansiedad severa"
    }])
}

#[actix_web::test]
async fn test_non_post_method_returns_405() {
    let state = app_state("http://127.0.0.1:1", Some("test-key"));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    for uri in ["/api/generate", "/api/generateProfiles"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED, "GET {}", uri);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"message": "Method not allowed"}));
    }

    let req = test::TestRequest::delete().uri("/api/generate").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[actix_web::test]
async fn test_missing_user_prompt_returns_400() {
    let state = app_state("http://127.0.0.1:1", Some("test-key"));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    // Absent field, empty string, and whitespace all count as missing
    for body in [json!({}), json!({"userPrompt": ""}), json!({"userPrompt": "   "})] {
        let req = test::TestRequest::post()
            .uri("/api/generateProfiles")
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body: {}", body);

        let envelope: Value = test::read_body_json(resp).await;
        assert_eq!(envelope, json!({"message": "userPrompt is required"}));
    }
}

#[actix_web::test]
async fn test_malformed_json_body_returns_400_envelope() {
    // The JsonConfig error handler is registered exactly as in main, so a
    // body that is not valid JSON still gets the {message} envelope
    let state = app_state("http://127.0.0.1:1", Some("test-key"));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/generate")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let envelope: Value = test::read_body_json(resp).await;
    let obj = envelope.as_object().unwrap();
    assert_eq!(obj.len(), 1);
    assert!(obj["message"]
        .as_str()
        .unwrap()
        .starts_with("Invalid JSON:"));
}

#[actix_web::test]
async fn test_missing_api_key_returns_500() {
    // Valid body, but no credential configured: the upstream must never be
    // reached, so an unroutable base URL is fine here.
    let state = app_state("http://127.0.0.1:1", None);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/generate")
        .set_json(json!({"userPrompt": "necesito terapia"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let envelope: Value = test::read_body_json(resp).await;
    assert_eq!(
        envelope,
        json!({"message": "API Key not configured on the server"})
    );
}

#[actix_web::test]
async fn test_success_relays_upstream_json_verbatim() {
    let mut server = mockito::Server::new_async().await;
    let fixture = profile_fixture();

    let mock = server
        .mock("POST", GENERATE_PATH)
        .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
        .match_body(Matcher::PartialJson(json!({
            "contents": [{"parts": [{"text": "necesito terapia online"}]}],
            "generationConfig": {"responseMimeType": "application/json"}
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(fixture.to_string())
        .create_async()
        .await;

    let state = app_state(&server.url(), Some("test-key"));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/generateProfiles")
        .set_json(json!({"userPrompt": "necesito terapia online"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, fixture);

    mock.assert_async().await;
}

#[actix_web::test]
async fn test_upstream_error_status_and_text_relayed() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", GENERATE_PATH)
        .match_query(Matcher::Any)
        .with_status(429)
        .with_body("rate limited")
        .create_async()
        .await;

    let state = app_state(&server.url(), Some("test-key"));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/generate")
        .set_json(json!({"userPrompt": "hola"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

    let envelope: Value = test::read_body_json(resp).await;
    assert_eq!(envelope, json!({"message": "Gemini error: rate limited"}));

    mock.assert_async().await;
}

#[actix_web::test]
async fn test_transport_failure_returns_500() {
    // Nothing listens on this port, so the outbound call fails at connect
    let state = app_state("http://127.0.0.1:9", Some("test-key"));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/generate")
        .set_json(json!({"userPrompt": "hola"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let envelope: Value = test::read_body_json(resp).await;
    let message = envelope["message"].as_str().unwrap();
    assert!(
        message.starts_with("Internal server error:"),
        "unexpected message: {}",
        message
    );
}

#[actix_web::test]
async fn test_identical_requests_get_identical_responses() {
    let mut server = mockito::Server::new_async().await;
    let fixture = profile_fixture();

    let mock = server
        .mock("POST", GENERATE_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(fixture.to_string())
        .expect(2)
        .create_async()
        .await;

    let state = app_state(&server.url(), Some("test-key"));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    let mut bodies = Vec::new();
    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/api/generateProfiles")
            .set_json(json!({"userPrompt": "ansiedad severa, formato online"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        bodies.push(test::read_body_json::<Value, _>(resp).await);
    }

    assert_eq!(bodies[0], bodies[1]);
    mock.assert_async().await;
}

#[actix_web::test]
async fn test_health_reports_credential_state() {
    let state = app_state("http://127.0.0.1:1", None);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "degraded");

    let state = app_state("http://127.0.0.1:1", Some("test-key"));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
}
