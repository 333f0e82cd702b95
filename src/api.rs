//! HTTP surface: router, shared state and CORS

pub mod error;
pub mod handlers;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::{
    admin::AdminGate,
    config::{AppConfig, ServerConfig},
    database::Database,
    locations::LocationStore,
    uploads::UploadStore,
};

/// Components shared by every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub locations: LocationStore,
    pub admin: AdminGate,
    pub uploads: UploadStore,
}

impl AppState {
    pub fn new(database: Database, config: &AppConfig) -> Self {
        Self {
            locations: LocationStore::new(database.clone()),
            admin: AdminGate::new(database, config.admin.default_pin.clone()),
            uploads: UploadStore::new(
                config.uploads.dir.clone(),
                format!("{}/uploads", config.server.api_prefix),
            ),
        }
    }
}

/// Build the application router with every route under `api_prefix`
pub fn build_router(state: AppState, config: &AppConfig) -> Router {
    let prefix = config.server.api_prefix.as_str();
    let api = |path: &str| format!("{prefix}{path}");

    Router::new()
        .route("/", get(handlers::root))
        .route(prefix, get(handlers::root))
        .route(&api("/"), get(handlers::root))
        .route(&api("/admin/verify-pin"), post(handlers::verify_pin))
        .route(
            &api("/locations"),
            get(handlers::list_locations).post(handlers::create_location),
        )
        .route(
            &api("/locations/{id}"),
            get(handlers::get_location)
                .put(handlers::update_location)
                .delete(handlers::delete_location),
        )
        .route(
            &api("/upload"),
            post(handlers::upload_file)
                .layer(DefaultBodyLimit::max(config.uploads.max_size_bytes)),
        )
        .route(&api("/uploads/{filename}"), get(handlers::get_upload))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.server))
        .with_state(state)
}

/// `*` allows any origin without credentials, a list allows those origins with credentials
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::new()
            .allow_origin(AllowOrigin::any())
            .allow_methods(AllowMethods::any())
            .allow_headers(AllowHeaders::any());
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin {:?}: {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
