//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: record stores and settings shared by every handler
//! - `routes/`: HTTP routes + handlers (one file per page of the inventory app)
//! - `dto.rs`: query/request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: services::AppServices) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(ServiceBuilder::new().layer(Extension(Arc::new(services))))
}
