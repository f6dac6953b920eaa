use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};

use crate::controllers::driver_controller::DriverController;
use crate::dto::api_response::ApiResponse;
use crate::dto::driver_dto::{CreateDriverRequest, DriverFilters, DriverTripFilters, UpdateDriverRequest};
use crate::middleware::auth::{require_roles, ADMIN};
use crate::models::trip::TripView;
use crate::models::user::{DriverDetail, DriverListItem, UserResponse};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extractors::{IdPath, QueryParams, ValidatedJson};
use crate::utils::pagination::PageParams;

/// Todas las rutas exigen admin o dispatcher (guard en `build_router`)
pub fn create_driver_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_drivers))
        .route("/", post(create_driver))
        .route("/:id", get(get_driver))
        .route("/:id", put(update_driver))
        .route(
            "/:id",
            delete(delete_driver).route_layer(middleware::from_fn_with_state(ADMIN, require_roles)),
        )
        .route("/:id/trips", get(driver_trips))
}

async fn list_drivers(
    State(state): State<AppState>,
    QueryParams(filters): QueryParams<DriverFilters>,
    QueryParams(page): QueryParams<PageParams>,
) -> Result<Json<ApiResponse<Vec<DriverListItem>>>, AppError> {
    let controller = DriverController::new(state.pool.clone());
    let response = controller.list(filters, page).await?;
    Ok(Json(response))
}

async fn create_driver(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateDriverRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), AppError> {
    let controller = DriverController::new(state.pool.clone());
    let response = controller.create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn get_driver(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<DriverDetail>>, AppError> {
    let controller = DriverController::new(state.pool.clone());
    let response = controller.get(id).await?;
    Ok(Json(response))
}

async fn update_driver(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ValidatedJson(request): ValidatedJson<UpdateDriverRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let controller = DriverController::new(state.pool.clone());
    let response = controller.update(id, request).await?;
    Ok(Json(response))
}

async fn delete_driver(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = DriverController::new(state.pool.clone());
    let response = controller.delete(id).await?;
    Ok(Json(response))
}

async fn driver_trips(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    QueryParams(filters): QueryParams<DriverTripFilters>,
    QueryParams(page): QueryParams<PageParams>,
) -> Result<Json<ApiResponse<Vec<TripView>>>, AppError> {
    let controller = DriverController::new(state.pool.clone());
    let response = controller.trips(id, filters, page).await?;
    Ok(Json(response))
}
