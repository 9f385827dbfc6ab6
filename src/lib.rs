//! PsyConnect Gen - Gemini proxy service for PsyConnect
//!
//! This library exposes the two generation endpoints used by the PsyConnect
//! frontend. Each request is validated, wrapped with a fixed system
//! instruction and response schema, sent to the Gemini API, and the upstream
//! JSON (or an error envelope) is relayed back to the caller.

pub mod config;
pub mod errors;
pub mod models;
pub mod prompts;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use config::{GeminiSettings, Settings};
pub use errors::handle_json_payload_error;
pub use models::{ErrorMessage, GenerateRequest, HealthResponse};
pub use prompts::PromptProfile;
pub use services::{GeminiClient, GeminiError};
