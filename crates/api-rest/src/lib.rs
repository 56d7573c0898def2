//! # API REST
//!
//! REST API implementation for CareGraph.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (plain text and JSON responses, CORS)
//!
//! Uses `api-shared` for the health service and DTO schemas.

#![warn(rust_2018_idioms)]

use api_shared::dto;
use api_shared::{HealthRes, HealthService};
use axum::{extract::State, response::Json, routing::get, Router};
use caregraph_core::GraphStore;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across REST handlers.
#[derive(Clone)]
pub struct AppState {
    health: HealthService,
}

impl AppState {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self {
            health: HealthService::new(store),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health, graph_health),
    components(schemas(
        HealthRes,
        dto::PatientDto,
        dto::DoctorDto,
        dto::HospitalDto,
        dto::AppointmentDto,
        dto::DiagnosisDto,
        dto::TreatmentDto,
        dto::MedicationDto,
        dto::TestDto,
        dto::AlertDto,
        dto::LeadsToDto,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router with Swagger UI at `/swagger-ui`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/neo4j/health", get(graph_health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `addr` and serves the router until the process stops.
///
/// # Errors
/// Returns an error if the address cannot be bound or the server fails while running.
pub async fn serve(addr: &str, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("-- Starting CareGraph REST API on {}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Process liveness. Does not touch the graph store.
#[axum::debug_handler]
async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/api/neo4j/health",
    responses(
        (status = 200, description = "Graph store connectivity message", body = String, content_type = "text/plain")
    )
)]
/// Graph store connectivity check
///
/// Runs the liveness query against the configured store. Failures are reported in the
/// message body, so this endpoint always answers `200 OK`.
#[axum::debug_handler]
async fn graph_health(State(state): State<AppState>) -> String {
    state.health.check_graph().await
}
