use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};

use crate::controllers::vehicle_controller::VehicleController;
use crate::dto::api_response::ApiResponse;
use crate::dto::vehicle_dto::{
    AddMaintenanceRequest, CreateVehicleRequest, DateRangeQuery, UpdateVehicleRequest, VehicleFilters,
};
use crate::middleware::auth::{require_roles, ADMIN, ADMIN_DISPATCHER};
use crate::models::vehicle::{MaintenanceRecord, Vehicle, VehicleRevenue, VehicleView};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extractors::{IdPath, QueryParams, ValidatedJson};
use crate::utils::pagination::PageParams;

pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vehicles))
        .route(
            "/",
            post(create_vehicle).route_layer(middleware::from_fn_with_state(ADMIN, require_roles)),
        )
        .route("/:id", get(get_vehicle))
        .route(
            "/:id",
            put(update_vehicle).route_layer(middleware::from_fn_with_state(ADMIN_DISPATCHER, require_roles)),
        )
        .route(
            "/:id",
            delete(delete_vehicle).route_layer(middleware::from_fn_with_state(ADMIN, require_roles)),
        )
        .route("/:id/maintenance", get(maintenance_history))
        .route(
            "/:id/maintenance",
            post(add_maintenance).route_layer(middleware::from_fn_with_state(ADMIN_DISPATCHER, require_roles)),
        )
        .route("/:id/revenue", get(vehicle_revenue))
}

async fn create_vehicle(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateVehicleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Vehicle>>), AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let response = controller.create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_vehicles(
    State(state): State<AppState>,
    QueryParams(filters): QueryParams<VehicleFilters>,
    QueryParams(page): QueryParams<PageParams>,
) -> Result<Json<ApiResponse<Vec<VehicleView>>>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let response = controller.list(filters, page).await?;
    Ok(Json(response))
}

async fn get_vehicle(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<VehicleView>>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let response = controller.get(id).await?;
    Ok(Json(response))
}

async fn update_vehicle(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ValidatedJson(request): ValidatedJson<UpdateVehicleRequest>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let response = controller.update(id, request).await?;
    Ok(Json(response))
}

async fn delete_vehicle(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let response = controller.delete(id).await?;
    Ok(Json(response))
}

async fn maintenance_history(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<Vec<MaintenanceRecord>>>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let response = controller.maintenance_history(id).await?;
    Ok(Json(response))
}

async fn add_maintenance(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ValidatedJson(request): ValidatedJson<AddMaintenanceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MaintenanceRecord>>), AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let response = controller.add_maintenance(id, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn vehicle_revenue(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    QueryParams(range): QueryParams<DateRangeQuery>,
) -> Result<Json<ApiResponse<VehicleRevenue>>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let response = controller.revenue(id, range).await?;
    Ok(Json(response))
}
