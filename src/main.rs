mod config;
mod errors;
mod models;
mod prompts;
mod routes;
mod services;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use config::Settings;
use errors::handle_json_payload_error;
use routes::generate::AppState;
use services::GeminiClient;
use std::sync::Arc;
use tracing::{info, warn};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration first so the logging setup can honor it
    let settings = Settings::load().unwrap_or_else(|e| {
        panic!("Configuration error: {}", e);
    });

    // Initialize logging; RUST_LOG still wins over the configured level
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if settings.logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting PsyConnect generation service...");
    info!("Configuration loaded successfully");

    // Initialize Gemini client. A missing key is not fatal at startup;
    // generation requests answer 500 until it is configured.
    let gemini = Arc::new(GeminiClient::from_settings(&settings.gemini));

    if gemini.has_api_key() {
        info!("Gemini client initialized (model: {})", settings.gemini.model);
    } else {
        warn!("Gemini API key not configured; generation endpoints will return 500");
    }

    // Build application state
    let app_state = AppState { gemini };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
