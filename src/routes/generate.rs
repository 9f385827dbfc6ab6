use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use validator::Validate;
use crate::models::{ErrorMessage, GenerateRequest, HealthResponse};
use crate::prompts::PromptProfile;
use crate::services::{GeminiClient, GeminiError};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub gemini: Arc<GeminiClient>,
}

/// Configure all generation routes
///
/// Each resource carries a default service so that non-POST methods get the
/// 405 error envelope instead of an empty framework response.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .service(
            web::resource("/health")
                .route(web::get().to(health_check))
                .default_service(web::route().to(method_not_allowed)),
        )
        .service(
            web::resource("/generate")
                .route(web::post().to(generate))
                .default_service(web::route().to(method_not_allowed)),
        )
        .service(
            web::resource("/generateProfiles")
                .route(web::post().to(generate_profiles))
                .default_service(web::route().to(method_not_allowed)),
        );
}

async fn method_not_allowed() -> impl Responder {
    HttpResponse::MethodNotAllowed().json(ErrorMessage::new("Method not allowed"))
}

/// Health check endpoint
///
/// GET /api/health
///
/// Reports "degraded" when no Gemini credential is configured; the key
/// itself is never exposed.
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let status = if state.gemini.has_api_key() {
        "healthy"
    } else {
        "degraded"
    };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Generic generation endpoint
///
/// POST /api/generate
///
/// Request body:
/// ```json
/// {
///   "userPrompt": "string"
/// }
/// ```
async fn generate(
    state: web::Data<AppState>,
    req: web::Json<GenerateRequest>,
) -> impl Responder {
    run_generation(&state, &req, PromptProfile::Generate).await
}

/// Specialist profile generation endpoint
///
/// POST /api/generateProfiles
///
/// Same contract as /api/generate; only the system instruction and the
/// schema field descriptions sent upstream differ.
async fn generate_profiles(
    state: web::Data<AppState>,
    req: web::Json<GenerateRequest>,
) -> impl Responder {
    run_generation(&state, &req, PromptProfile::GenerateProfiles).await
}

/// Shared handler body for both generation routes.
///
/// One success path, four terminal failure exits: empty prompt (400),
/// missing credential (500), upstream error (upstream's own status),
/// transport failure (500).
async fn run_generation(
    state: &web::Data<AppState>,
    req: &GenerateRequest,
    profile: PromptProfile,
) -> HttpResponse {
    if req.validate().is_err() || req.prompt_is_empty() {
        tracing::info!("Rejected {:?} request with empty userPrompt", profile);
        return HttpResponse::BadRequest().json(ErrorMessage::new("userPrompt is required"));
    }

    tracing::info!(
        "Handling {:?} request, prompt length: {}",
        profile,
        req.user_prompt.len()
    );

    match state.gemini.generate_content(&req.user_prompt, profile).await {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(GeminiError::MissingApiKey) => {
            tracing::error!("Gemini API key is not configured");
            HttpResponse::InternalServerError()
                .json(ErrorMessage::new("API Key not configured on the server"))
        }
        Err(GeminiError::Upstream { status, body }) => {
            // Relay the upstream status and raw error text to the caller
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            HttpResponse::build(status).json(ErrorMessage::new(format!("Gemini error: {}", body)))
        }
        Err(e) => {
            tracing::error!("Gemini request failed: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorMessage::new(format!("Internal server error: {}", e)))
        }
    }
}
