//! Esther Storefront library.
//!
//! JSON API over the catalog, plus the data gateway and image store adapters
//! used by both the server binary and the admin CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod admin;
pub mod config;
pub mod error;
pub mod gateway;
pub mod local_store;
pub mod media;
pub mod routes;
pub mod sections;
pub mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Router, routing::get};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the data store is not reachable, even
/// when cached reads would still succeed.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.gateway().ping().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::gateway::{CachedGateway, InMemoryGateway};
    use crate::local_store::LocalStore;

    async fn status(state: AppState, uri: &str) -> StatusCode {
        app(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_readiness_ignores_warm_cache() {
        let gateway = Arc::new(CachedGateway::new(InMemoryGateway::default()));
        let state = AppState::new(
            gateway.clone(),
            Arc::new(LocalStore::in_memory()),
            "59170000000",
        );

        assert_eq!(status(state.clone(), "/health/ready").await, StatusCode::OK);
        assert_eq!(status(state.clone(), "/api/catalog/women").await, StatusCode::OK);

        gateway.inner().set_unavailable(true);

        // Cached reads keep serving while the store is down.
        assert_eq!(status(state.clone(), "/api/catalog/women").await, StatusCode::OK);
        assert_eq!(
            status(state, "/health/ready").await,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
