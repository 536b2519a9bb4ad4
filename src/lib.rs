//! Freight logistics backend: waybill drafting, preview and commit, quote
//! conversion, waybill documents, and pickup scheduling.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{delete, get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod config;
pub mod db;
pub mod drafts;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod openapi;
pub mod services;

pub use config::AppConfig;

use auth::{AuthConfig, AuthService};
use db::DbPool;
use drafts::DraftStore;
use events::EventSender;
use handlers::AppServices;

/// Shared application state passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: Arc<AppConfig>,
    pub auth_service: Arc<AuthService>,
    pub drafts: Arc<DraftStore>,
    pub event_sender: Arc<EventSender>,
    pub services: Arc<AppServices>,
}

impl AppState {
    pub fn new(db: Arc<DbPool>, config: AppConfig, event_sender: EventSender) -> Self {
        let drafts = Arc::new(DraftStore::new(Duration::from_secs(config.draft_ttl_secs)));
        let auth_service = Arc::new(AuthService::new(AuthConfig::new(
            config.jwt_secret.clone(),
            Duration::from_secs(config.jwt_expiration as u64),
        )));
        let event_sender = Arc::new(event_sender);
        let services = Arc::new(AppServices::new(
            db.clone(),
            &config,
            drafts.clone(),
            event_sender.clone(),
        ));

        Self {
            db,
            config: Arc::new(config),
            auth_service,
            drafts,
            event_sender,
            services,
        }
    }
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/waybills", get(handlers::waybills::list_waybills))
        .route("/waybills/new", get(handlers::waybills::new_waybill))
        .route("/waybills/preview", post(handlers::waybills::preview_waybill))
        .route("/waybills/commit", post(handlers::waybills::commit_waybill))
        .route("/waybills/draft", delete(handlers::waybills::discard_draft))
        .route(
            "/waybills/convert/:quote_id",
            post(handlers::waybills::convert_quote),
        )
        .route("/waybills/:id", get(handlers::waybills::get_waybill))
        .route(
            "/waybills/:id/document",
            get(handlers::waybills::get_waybill_document),
        )
        .route(
            "/pickup-requests",
            post(handlers::pickups::create_pickup_request),
        )
}

/// Build the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
        .nest("/api/v1", api_v1_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
