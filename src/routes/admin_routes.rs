use axum::{
    extract::{Path, State},
    routing::{patch, post},
    Json, Router,
};
use serde_json::Value;

use crate::controllers::admin_controller::AdminController;
use crate::dto::api_response::ApiResponse;
use crate::middleware::auth::CurrentUser;
use crate::models::user::UserResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extractors::IdPath;

/// Rutas de administración de cuentas (solo admin, guard en `build_router`)
pub fn create_admin_router() -> Router<AppState> {
    Router::new()
        .route("/reactivate-all", post(reactivate_all))
        .route("/reactivate/:id_or_username", post(reactivate_user))
        .route("/users/:id/deactivate", patch(deactivate_user))
}

async fn reactivate_all(State(state): State<AppState>) -> Result<Json<ApiResponse<Value>>, AppError> {
    let controller = AdminController::new(state.pool.clone());
    Ok(Json(controller.reactivate_all().await?))
}

async fn reactivate_user(
    State(state): State<AppState>,
    Path(id_or_username): Path<String>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let controller = AdminController::new(state.pool.clone());
    Ok(Json(controller.reactivate(&id_or_username).await?))
}

async fn deactivate_user(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let controller = AdminController::new(state.pool.clone());
    Ok(Json(controller.deactivate(&admin, id).await?))
}
