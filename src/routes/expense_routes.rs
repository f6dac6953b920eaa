use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{delete, get, patch, post, put},
    Json, Router,
};

use crate::controllers::expense_controller::ExpenseController;
use crate::dto::api_response::ApiResponse;
use crate::dto::expense_dto::{
    ApproveExpenseRequest, CreateExpenseRequest, ExpenseFilters, RejectExpenseRequest,
    UpdateExpenseRequest,
};
use crate::middleware::auth::{require_permission, require_roles, CurrentUser, ADMIN, ADMIN_DISPATCHER};
use crate::models::expense::ExpenseView;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extractors::{IdPath, OptionalJson, QueryParams, ValidatedJson};
use crate::utils::pagination::PageParams;

pub fn create_expense_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_expenses))
        .route(
            "/",
            post(create_expense).route_layer(middleware::from_fn_with_state(ADMIN_DISPATCHER, require_roles)),
        )
        .route("/:id", get(get_expense))
        .route("/:id", put(update_expense))
        .route(
            "/:id",
            delete(delete_expense).route_layer(middleware::from_fn_with_state(ADMIN, require_roles)),
        )
        .route(
            "/:id/approve",
            patch(approve_expense)
                .route_layer(middleware::from_fn_with_state(("approve", "expenses"), require_permission)),
        )
        .route(
            "/:id/reject",
            patch(reject_expense)
                .route_layer(middleware::from_fn_with_state(("reject", "expenses"), require_permission)),
        )
}

async fn create_expense(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(request): ValidatedJson<CreateExpenseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ExpenseView>>), AppError> {
    let controller = ExpenseController::new(state.pool.clone());
    let response = controller.create(&user, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_expenses(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    QueryParams(filters): QueryParams<ExpenseFilters>,
    QueryParams(page): QueryParams<PageParams>,
) -> Result<Json<ApiResponse<Vec<ExpenseView>>>, AppError> {
    let controller = ExpenseController::new(state.pool.clone());
    let response = controller.list(&user, filters, page).await?;
    Ok(Json(response))
}

async fn get_expense(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<ExpenseView>>, AppError> {
    let controller = ExpenseController::new(state.pool.clone());
    let response = controller.get(id).await?;
    Ok(Json(response))
}

// Creador o admin; la comprobación vive en el controlador
async fn update_expense(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    IdPath(id): IdPath,
    ValidatedJson(request): ValidatedJson<UpdateExpenseRequest>,
) -> Result<Json<ApiResponse<ExpenseView>>, AppError> {
    let controller = ExpenseController::new(state.pool.clone());
    let response = controller.update(&user, id, request).await?;
    Ok(Json(response))
}

async fn approve_expense(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    IdPath(id): IdPath,
    OptionalJson(request): OptionalJson<ApproveExpenseRequest>,
) -> Result<Json<ApiResponse<ExpenseView>>, AppError> {
    let controller = ExpenseController::new(state.pool.clone());
    let response = controller.approve(&user, id, request).await?;
    Ok(Json(response))
}

async fn reject_expense(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    IdPath(id): IdPath,
    ValidatedJson(request): ValidatedJson<RejectExpenseRequest>,
) -> Result<Json<ApiResponse<ExpenseView>>, AppError> {
    let controller = ExpenseController::new(state.pool.clone());
    let response = controller.reject(&user, id, request).await?;
    Ok(Json(response))
}

async fn delete_expense(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = ExpenseController::new(state.pool.clone());
    let response = controller.delete(id).await?;
    Ok(Json(response))
}
