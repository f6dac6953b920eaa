use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, patch, post},
    Json, Router,
};

use crate::controllers::transaction_controller::TransactionController;
use crate::dto::api_response::ApiResponse;
use crate::dto::transaction_dto::{
    ConfirmTransactionRequest, CreateDepositRequest, CreateExpenseTransactionRequest,
    RejectTransactionRequest, TransactionFilters,
};
use crate::middleware::auth::{
    require_permission, require_roles, CurrentUser, ADMIN_DISPATCHER_DRIVER, DRIVER,
};
use crate::models::transaction::{TransactionView, UnpaidSummary};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extractors::{IdPath, OptionalJson, QueryParams, ValidatedJson};
use crate::utils::pagination::PageParams;

pub fn create_transaction_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_transactions))
        .route(
            "/deposit",
            post(create_deposit).route_layer(middleware::from_fn_with_state(DRIVER, require_roles)),
        )
        .route(
            "/expense",
            post(create_expense_transaction)
                .route_layer(middleware::from_fn_with_state(ADMIN_DISPATCHER_DRIVER, require_roles)),
        )
        .route(
            "/driver/unpaid",
            get(unpaid_summary).route_layer(middleware::from_fn_with_state(DRIVER, require_roles)),
        )
        .route("/:id", get(get_transaction))
        .route(
            "/:id/confirm",
            patch(confirm_transaction)
                .route_layer(middleware::from_fn_with_state(("confirm", "transactions"), require_permission)),
        )
        .route(
            "/:id/reject",
            patch(reject_transaction)
                .route_layer(middleware::from_fn_with_state(("reject", "transactions"), require_permission)),
        )
}

async fn create_deposit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(request): ValidatedJson<CreateDepositRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TransactionView>>), AppError> {
    let controller = TransactionController::new(state.pool.clone());
    let response = controller.create_deposit(&user, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn create_expense_transaction(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(request): ValidatedJson<CreateExpenseTransactionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TransactionView>>), AppError> {
    let controller = TransactionController::new(state.pool.clone());
    let response = controller.create_expense(&user, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn unpaid_summary(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ApiResponse<UnpaidSummary>>, AppError> {
    let controller = TransactionController::new(state.pool.clone());
    let response = controller.unpaid(&user).await?;
    Ok(Json(response))
}

async fn list_transactions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    QueryParams(filters): QueryParams<TransactionFilters>,
    QueryParams(page): QueryParams<PageParams>,
) -> Result<Json<ApiResponse<Vec<TransactionView>>>, AppError> {
    let controller = TransactionController::new(state.pool.clone());
    let response = controller.list(&user, filters, page).await?;
    Ok(Json(response))
}

async fn get_transaction(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<TransactionView>>, AppError> {
    let controller = TransactionController::new(state.pool.clone());
    let response = controller.get(&user, id).await?;
    Ok(Json(response))
}

async fn confirm_transaction(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    IdPath(id): IdPath,
    OptionalJson(request): OptionalJson<ConfirmTransactionRequest>,
) -> Result<Json<ApiResponse<TransactionView>>, AppError> {
    let controller = TransactionController::new(state.pool.clone());
    let response = controller.confirm(&user, id, request).await?;
    Ok(Json(response))
}

async fn reject_transaction(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    IdPath(id): IdPath,
    ValidatedJson(request): ValidatedJson<RejectTransactionRequest>,
) -> Result<Json<ApiResponse<TransactionView>>, AppError> {
    let controller = TransactionController::new(state.pool.clone());
    let response = controller.reject(&user, id, request).await?;
    Ok(Json(response))
}
