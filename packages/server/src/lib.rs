#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the violations dashboard.
//!
//! Loads both incident datasets once at startup and serves overview
//! figures and chart specifications over a JSON API. Clients either pass
//! their selection explicitly (`/api/datasets/{id}/...?from=&to=`) or open
//! a session whose selection is held server-side
//! (`/api/sessions/{id}/...`). An optional static directory is served at
//! `/` for the front-end bundle.

pub mod charts;
pub mod config;
mod handlers;
pub mod interactive;
pub mod sessions;

use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use violations_dashboard_dataset::{DatasetError, DatasetStore};

use crate::config::{ConfigError, ServerConfig};
use crate::sessions::SessionStore;

/// Errors that can stop the server from starting or running.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A dataset failed to load.
    #[error("Failed to load datasets: {0}")]
    Dataset(#[from] DatasetError),

    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP server failed to bind or crashed.
    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared application state.
pub struct AppState {
    /// Both datasets, read-only after startup.
    pub store: Arc<DatasetStore>,
    /// Per-client selections.
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    #[must_use]
    pub fn new(store: DatasetStore, max_sessions: usize, idle_timeout: Duration) -> Self {
        Self {
            store: Arc::new(store),
            sessions: Arc::new(SessionStore::new(max_sessions, idle_timeout)),
        }
    }
}

/// Registers the `/api` routes.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/datasets", web::get().to(handlers::datasets))
            .route("/datasets/{id}/overview", web::get().to(handlers::overview))
            .route("/datasets/{id}/trend", web::get().to(handlers::trend))
            .route("/datasets/{id}/status", web::get().to(handlers::status))
            .route("/datasets/{id}/locations", web::get().to(handlers::locations))
            .route("/datasets/{id}/age-groups", web::get().to(handlers::age_groups))
            .route("/sessions", web::post().to(handlers::create_session))
            .route("/sessions/{id}", web::get().to(handlers::get_session))
            .route("/sessions/{id}", web::delete().to(handlers::delete_session))
            .route(
                "/sessions/{id}/dataset",
                web::put().to(handlers::set_session_dataset),
            )
            .route(
                "/sessions/{id}/range",
                web::put().to(handlers::set_session_range),
            )
            .route(
                "/sessions/{id}/dashboard",
                web::get().to(handlers::session_dashboard),
            ),
    );
}

/// Starts the dashboard API server.
///
/// Loads both datasets and starts the Actix-Web HTTP server. This is a
/// regular async function; the caller is responsible for providing the
/// async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns [`ServerError::Dataset`] if either dataset fails to load (the
/// server never starts with a missing dataset), or [`ServerError::Io`] if
/// the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    log::info!("Loading datasets...");
    let store = DatasetStore::load(&config.dataset_paths())?;

    let state = web::Data::new(AppState::new(
        store,
        config.max_sessions,
        config.session_idle_timeout(),
    ));

    let static_dir = config.static_dir.clone().filter(|dir| {
        let exists = dir.is_dir();
        if !exists {
            log::warn!("Static directory {} not found, not serving it", dir.display());
        }
        exists
    });

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        let mut app = App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure_api);

        // Serve front-end static files (production)
        if let Some(dir) = &static_dir {
            app = app.service(Files::new("/", dir).index_file("index.html"));
        }

        app
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}

#[cfg(test)]
pub(crate) mod test_utils {
    pub use violations_dashboard_dataset::test_utils::store;

    use super::*;

    pub fn state() -> web::Data<AppState> {
        web::Data::new(AppState::new(store(), 64, Duration::from_secs(1800)))
    }
}
