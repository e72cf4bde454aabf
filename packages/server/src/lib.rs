#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for CompeteIntel.
//!
//! Serves competitor search with analytics, CNPJ lookup, catalog metadata
//! and landing-page demo requests. Demo requests are persisted in a
//! `SQLite` database at `DEMO_DB_PATH`. All settings come from the
//! environment, see [`config::ServerConfig`].

pub mod config;
mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, middleware, web};
use compete_intel_email::{DisabledEmailSender, EmailSender, MockEmailSender};
use compete_intel_server_models::ErrorBody;
use compete_intel_source::catalog::Catalog;
use compete_intel_source::mock::MockCompetitorSource;
use compete_intel_source::{CompetitorSource, UnavailableCompetitorSource};
use switchy_database::Database;

use crate::config::ServerConfig;

/// Shared application state.
pub struct AppState {
    /// Settings the server was started with.
    pub config: ServerConfig,
    /// Where competitors come from.
    pub source: Box<dyn CompetitorSource>,
    /// How analysis emails are delivered.
    pub email: Box<dyn EmailSender>,
    /// `SQLite` database of demo requests.
    pub db: Arc<dyn Database>,
    /// Supported cities and categories.
    pub catalog: Catalog,
}

impl AppState {
    /// Builds the state for `config` over an already opened demo database.
    #[must_use]
    pub fn new(config: ServerConfig, db: Arc<dyn Database>) -> Self {
        let source: Box<dyn CompetitorSource> = if config.use_mock_data {
            Box::new(MockCompetitorSource::new(config.mock_cache_capacity))
        } else {
            log::warn!("USE_MOCK_DATA is off and no live source exists; searches will fail");
            Box::new(UnavailableCompetitorSource)
        };
        let email: Box<dyn EmailSender> = if config.use_mock_email {
            Box::new(MockEmailSender)
        } else {
            Box::new(DisabledEmailSender)
        };

        Self {
            config,
            source,
            email,
            db,
            catalog: Catalog::embedded(),
        }
    }
}

/// Answers unreadable request bodies with a JSON error instead of plain text.
fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = HttpResponse::BadRequest().json(ErrorBody::new(err.to_string()));
    InternalError::from_response(err, response).into()
}

/// Registers every route. Shared by the server and tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error));
    cfg.route("/", web::get().to(handlers::root)).service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/search", web::post().to(handlers::search))
            .route("/cnpj/{cnpj}", web::get().to(handlers::cnpj))
            .route("/categories", web::get().to(handlers::categories))
            .route("/cities", web::get().to(handlers::cities))
            .route("/demo-request", web::post().to(handlers::create_demo_request))
            .route("/demo-request/{id}", web::get().to(handlers::get_demo_request)),
    );
}

fn cors(origins: &[String]) -> Cors {
    origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .max_age(3600)
}

/// Starts the CompeteIntel API server.
///
/// Opens the demo request database, selects the competitor source and
/// email sender from `config`, and starts the Actix-Web HTTP server. This
/// is a regular async function; the caller provides the async runtime
/// (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the demo database cannot be
/// opened, or if the HTTP server fails to bind or encounters a runtime
/// error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    log::info!(
        "Starting {} v{} ({})",
        config.api_title,
        config.api_version,
        config.environment
    );

    log::info!("Opening demo request database at {}...", config.demo_db_path.display());
    let db = compete_intel_demo::db::open_db(&config.demo_db_path)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let bind_addr = config.bind_addr.clone();
    let port = config.port;
    let state = web::Data::new(AppState::new(config, Arc::from(db)));

    log::info!(
        "Using {} competitor source and {} email sender",
        state.source.id(),
        state.email.id()
    );
    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        App::new()
            .wrap(cors(&state.config.cors_origins))
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
