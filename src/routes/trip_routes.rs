use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{delete, get, patch, post, put},
    Json, Router,
};

use crate::controllers::trip_controller::TripController;
use crate::dto::api_response::ApiResponse;
use crate::dto::trip_dto::{
    AddNoteRequest, AssignTripRequest, CreateTripRequest, TripFilters, UpdateTripRequest,
    UpdateTripStatusRequest,
};
use crate::middleware::auth::{require_roles, CurrentUser, ADMIN, ADMIN_DISPATCHER, ADMIN_DISPATCHER_DRIVER};
use crate::models::trip::{TripDetail, TripNote, TripView};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extractors::{IdPath, QueryParams, ValidatedJson};
use crate::utils::pagination::PageParams;

pub fn create_trip_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_trips))
        .route(
            "/",
            post(create_trip).route_layer(middleware::from_fn_with_state(ADMIN_DISPATCHER, require_roles)),
        )
        .route("/:id", get(get_trip))
        .route(
            "/:id",
            put(update_trip).route_layer(middleware::from_fn_with_state(ADMIN_DISPATCHER, require_roles)),
        )
        .route(
            "/:id",
            delete(cancel_trip).route_layer(middleware::from_fn_with_state(ADMIN, require_roles)),
        )
        .route(
            "/:id/assign",
            patch(assign_trip).route_layer(middleware::from_fn_with_state(ADMIN_DISPATCHER, require_roles)),
        )
        .route(
            "/:id/status",
            patch(update_trip_status)
                .route_layer(middleware::from_fn_with_state(ADMIN_DISPATCHER_DRIVER, require_roles)),
        )
        .route("/:id/notes", post(add_trip_note))
        .route("/vehicle/:vehicle_id/active", get(active_trips_by_vehicle))
}

async fn create_trip(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(request): ValidatedJson<CreateTripRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TripView>>), AppError> {
    let controller = TripController::new(state.pool.clone());
    let response = controller.create(&user, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_trips(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    QueryParams(filters): QueryParams<TripFilters>,
    QueryParams(page): QueryParams<PageParams>,
) -> Result<Json<ApiResponse<Vec<TripView>>>, AppError> {
    let controller = TripController::new(state.pool.clone());
    let response = controller.list(&user, filters, page).await?;
    Ok(Json(response))
}

async fn get_trip(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<TripDetail>>, AppError> {
    let controller = TripController::new(state.pool.clone());
    let response = controller.get(&user, id).await?;
    Ok(Json(response))
}

async fn update_trip(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ValidatedJson(request): ValidatedJson<UpdateTripRequest>,
) -> Result<Json<ApiResponse<TripView>>, AppError> {
    let controller = TripController::new(state.pool.clone());
    let response = controller.update(id, request).await?;
    Ok(Json(response))
}

async fn assign_trip(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    IdPath(id): IdPath,
    ValidatedJson(request): ValidatedJson<AssignTripRequest>,
) -> Result<Json<ApiResponse<TripView>>, AppError> {
    let controller = TripController::new(state.pool.clone());
    let response = controller.assign(&user, id, request).await?;
    Ok(Json(response))
}

async fn update_trip_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    IdPath(id): IdPath,
    ValidatedJson(request): ValidatedJson<UpdateTripStatusRequest>,
) -> Result<Json<ApiResponse<TripView>>, AppError> {
    let controller = TripController::new(state.pool.clone());
    let response = controller.update_status(&user, id, request).await?;
    Ok(Json(response))
}

async fn add_trip_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    IdPath(id): IdPath,
    ValidatedJson(request): ValidatedJson<AddNoteRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TripNote>>), AppError> {
    let controller = TripController::new(state.pool.clone());
    let response = controller.add_note(&user, id, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn cancel_trip(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<TripView>>, AppError> {
    let controller = TripController::new(state.pool.clone());
    let response = controller.cancel(&user, id).await?;
    Ok(Json(response))
}

async fn active_trips_by_vehicle(
    State(state): State<AppState>,
    IdPath(vehicle_id): IdPath,
) -> Result<Json<ApiResponse<Vec<TripView>>>, AppError> {
    let controller = TripController::new(state.pool.clone());
    let response = controller.active_by_vehicle(vehicle_id).await?;
    Ok(Json(response))
}
