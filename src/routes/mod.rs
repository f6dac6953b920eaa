//! Router de la API
//!
//! `/health` y `/api/auth/login` son públicos; el resto de `/api` pasa por
//! `auth_middleware` y por los guards de rol/permiso de cada ruta.

pub mod admin_routes;
pub mod auth_routes;
pub mod customer_routes;
pub mod driver_routes;
pub mod expense_routes;
pub mod handover_routes;
pub mod report_routes;
pub mod transaction_routes;
pub mod trip_routes;
pub mod vehicle_routes;

use std::time::Duration;

use axum::{
    error_handling::HandleErrorLayer,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json},
    routing::get,
    BoxError, Router,
};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::middleware::auth::{auth_middleware, require_roles, ADMIN, ADMIN_DISPATCHER};
use crate::state::AppState;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .nest("/auth", auth_routes::create_auth_router())
        .nest("/trips", trip_routes::create_trip_router())
        .nest("/vehicles", vehicle_routes::create_vehicle_router())
        .nest(
            "/drivers",
            driver_routes::create_driver_router()
                .route_layer(middleware::from_fn_with_state(ADMIN_DISPATCHER, require_roles)),
        )
        .nest("/customers", customer_routes::create_customer_router())
        .nest("/transactions", transaction_routes::create_transaction_router())
        .nest("/expenses", expense_routes::create_expense_router())
        .nest("/handover", handover_routes::create_handover_router())
        .nest("/reports", report_routes::create_report_router())
        .nest(
            "/admin",
            admin_routes::create_admin_router()
                .route_layer(middleware::from_fn_with_state(ADMIN, require_roles)),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let api = Router::new()
        .nest("/auth", auth_routes::create_public_auth_router())
        .merge(protected);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(HandleErrorLayer::new(handle_timeout))
                .timeout(REQUEST_TIMEOUT),
        )
        .with_state(state)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "taxi_dispatch",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn handle_timeout(error: BoxError) -> impl IntoResponse {
    if error.is::<tower::timeout::error::Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            Json(json!({ "success": false, "message": "La solicitud tardó demasiado" })),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "success": false, "message": "Error interno del servidor" })),
        )
    }
}
