//! Route definitions and server setup

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::presentation::controllers::{AppState, health_check, scan};
use crate::presentation::models::*;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::controllers::scan,
        crate::presentation::controllers::health_check
    ),
    components(
        schemas(
            ScanRequest,
            ScanResponse,
            FindingDto,
            MessageResponse,
            ErrorResponse,
            HealthResponse,
            crate::domain::SourceKind
        )
    ),
    tags(
        (name = "scan", description = "Repository secret scanning endpoints"),
        (name = "health", description = "System health monitoring endpoints")
    ),
    info(
        title = "Leaksweep API",
        version = "0.1.0",
        description = "Secret scanning API: clones a repository at shallow depth, runs gitleaks against the checkout, and returns structured findings."
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    )
)]
pub struct ApiDoc;

/// Create the application router with the middleware stack
pub fn create_router(state: AppState, config: Arc<Config>) -> Router {
    // Scan requests run a full clone plus a scanner pass, so they carry their
    // own timeout window instead of the general request timeout.
    let scan_routes = Router::new()
        .route("/scan", post(scan))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.server.scan_timeout_seconds),
        ));

    // Root route - API info
    async fn root_handler() -> Response {
        axum::Json(serde_json::json!({
            "name": "Leaksweep API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Repository secret scanning API",
            "endpoints": {
                "health": "/health",
                "scan": "/v1/scan",
                "docs": "/docs"
            }
        }))
        .into_response()
    }

    let info_routes = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.server.request_timeout_seconds),
        ));

    // Build CORS layer from configuration
    let cors_layer = if config.server.allowed_origins.len() == 1
        && config.server.allowed_origins[0] == "*"
    {
        tracing::warn!(
            "CORS: Using wildcard origin (*); restrict allowed_origins for production deployments"
        );
        CorsLayer::new()
            .allow_origin(tower_http::cors::AllowOrigin::any())
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::ACCEPT,
                axum::http::header::USER_AGENT,
                axum::http::header::ORIGIN,
                axum::http::header::ACCESS_CONTROL_REQUEST_METHOD,
                axum::http::header::ACCESS_CONTROL_REQUEST_HEADERS,
            ])
            .max_age(Duration::from_secs(3600))
    } else {
        tracing::debug!("CORS: Configured with specific origins");

        let origins: Vec<axum::http::HeaderValue> = config
            .server
            .allowed_origins
            .iter()
            .filter_map(|origin| {
                axum::http::HeaderValue::from_str(origin)
                    .map_err(|_| {
                        tracing::warn!(origin = %origin, "Invalid CORS origin in config; skipping");
                    })
                    .ok()
            })
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::ACCEPT,
                axum::http::header::USER_AGENT,
                axum::http::header::ORIGIN,
                axum::http::header::ACCESS_CONTROL_REQUEST_METHOD,
                axum::http::header::ACCESS_CONTROL_REQUEST_HEADERS,
            ])
            .max_age(Duration::from_secs(3600))
    };

    let mut router = Router::new().nest("/v1", scan_routes).merge(info_routes);

    // Conditionally expose Swagger UI based on configuration (avoid leaking docs in production).
    if config.server.enable_docs {
        router =
            router.merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }

    let service_builder = ServiceBuilder::new()
        // HTTP tracing
        .layer(TraceLayer::new_for_http())
        // CORS handling
        .layer(cors_layer);

    router.layer(service_builder).with_state(state)
}
