// Model exports
pub mod requests;
pub mod responses;

pub use requests::GenerateRequest;
pub use responses::{ErrorMessage, HealthResponse};
