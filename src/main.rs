use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use bank_match::config::Settings;
use bank_match::core::Matcher;
use bank_match::models::ScoringWeights;
use bank_match::routes::{self, matches::{json_payload_error, AppState}};
use bank_match::services::PostgresClient;
use bank_match::telemetry;
use std::sync::Arc;
use tracing::{info, error};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e));
        }
    };

    telemetry::init(&settings.logging)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    info!("Starting Bank Match service...");

    let postgres = match PostgresClient::from_settings(&settings.database).await {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to connect to PostgreSQL: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::Other, e));
        }
    };

    info!(
        "PostgreSQL client initialized (max: {} connections)",
        settings.database.max_connections.unwrap_or(10)
    );

    let matcher = Matcher::new(ScoringWeights::from(&settings.scoring.weights));

    info!("Matcher initialized with weights: {:?}", matcher.weights());

    let credit_box = Arc::new(settings.credit_box.engine());

    info!("Credit box loaded with {} rules", credit_box.len());

    let app_state = AppState {
        postgres,
        matcher,
        credit_box,
        matching: settings.matching.clone(),
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
