use actix_web::{error, http::StatusCode, HttpResponse};

/// Error response for request payloads the framework rejects before a
/// handler runs. Serializes to the same `{message}` envelope the handlers
/// return.
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub message: String,
    #[serde(skip)]
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .content_type("application/json")
            .body(serde_json::to_string(self).unwrap())
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(
    err: error::JsonPayloadError,
    req: &actix_web::HttpRequest,
) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}
