use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, patch, post, put},
    Json, Router,
};

use crate::controllers::handover_controller::HandoverController;
use crate::dto::api_response::ApiResponse;
use crate::dto::handover_dto::{CreateHandoverRequest, HandoverFilters, UpdateHandoverRequest};
use crate::middleware::auth::{require_roles, CurrentUser, ADMIN_DISPATCHER, ADMIN_DISPATCHER_DRIVER};
use crate::models::handover::{HandoverType, HandoverView};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extractors::{IdPath, QueryParams, ValidatedJson};
use crate::utils::pagination::PageParams;

pub fn create_handover_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_handovers))
        .route(
            "/check-in",
            post(check_in).route_layer(middleware::from_fn_with_state(ADMIN_DISPATCHER_DRIVER, require_roles)),
        )
        .route(
            "/check-out",
            post(check_out).route_layer(middleware::from_fn_with_state(ADMIN_DISPATCHER_DRIVER, require_roles)),
        )
        .route("/:id", get(get_handover))
        .route(
            "/:id",
            put(update_handover)
                .route_layer(middleware::from_fn_with_state(ADMIN_DISPATCHER_DRIVER, require_roles)),
        )
        .route(
            "/:id/complete",
            patch(complete_handover).route_layer(middleware::from_fn_with_state(ADMIN_DISPATCHER, require_roles)),
        )
}

async fn check_in(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(request): ValidatedJson<CreateHandoverRequest>,
) -> Result<(StatusCode, Json<ApiResponse<HandoverView>>), AppError> {
    let controller = HandoverController::new(state.pool.clone());
    let response = controller.create(&user, HandoverType::CheckIn, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn check_out(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(request): ValidatedJson<CreateHandoverRequest>,
) -> Result<(StatusCode, Json<ApiResponse<HandoverView>>), AppError> {
    let controller = HandoverController::new(state.pool.clone());
    let response = controller.create(&user, HandoverType::CheckOut, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_handovers(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    QueryParams(filters): QueryParams<HandoverFilters>,
    QueryParams(page): QueryParams<PageParams>,
) -> Result<Json<ApiResponse<Vec<HandoverView>>>, AppError> {
    let controller = HandoverController::new(state.pool.clone());
    let response = controller.list(&user, filters, page).await?;
    Ok(Json(response))
}

async fn get_handover(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<HandoverView>>, AppError> {
    let controller = HandoverController::new(state.pool.clone());
    let response = controller.get(id).await?;
    Ok(Json(response))
}

async fn update_handover(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    IdPath(id): IdPath,
    ValidatedJson(request): ValidatedJson<UpdateHandoverRequest>,
) -> Result<Json<ApiResponse<HandoverView>>, AppError> {
    let controller = HandoverController::new(state.pool.clone());
    let response = controller.update(&user, id, request).await?;
    Ok(Json(response))
}

async fn complete_handover(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<HandoverView>>, AppError> {
    let controller = HandoverController::new(state.pool.clone());
    let response = controller.complete(&user, id).await?;
    Ok(Json(response))
}
