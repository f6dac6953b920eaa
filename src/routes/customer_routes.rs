use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};

use crate::controllers::customer_controller::CustomerController;
use crate::dto::api_response::ApiResponse;
use crate::dto::customer_dto::{CreateCustomerRequest, CustomerFilters, UpdateCustomerRequest};
use crate::middleware::auth::{require_permission, require_roles, ADMIN};
use crate::models::customer::{Customer, CustomerDetail};
use crate::models::trip::TripView;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extractors::{IdPath, QueryParams, ValidatedJson};
use crate::utils::pagination::PageParams;

pub fn create_customer_router() -> Router<AppState> {
    let read = || middleware::from_fn_with_state(("read", "customers"), require_permission);

    Router::new()
        .route("/", get(list_customers).route_layer(read()))
        .route(
            "/",
            post(create_customer)
                .route_layer(middleware::from_fn_with_state(("create", "customers"), require_permission)),
        )
        .route("/:id", get(get_customer).route_layer(read()))
        .route(
            "/:id",
            put(update_customer)
                .route_layer(middleware::from_fn_with_state(("update", "customers"), require_permission)),
        )
        .route(
            "/:id",
            delete(delete_customer).route_layer(middleware::from_fn_with_state(ADMIN, require_roles)),
        )
        .route("/phone/:phone/trips", get(customer_trips_by_phone).route_layer(read()))
}

async fn list_customers(
    State(state): State<AppState>,
    QueryParams(filters): QueryParams<CustomerFilters>,
    QueryParams(page): QueryParams<PageParams>,
) -> Result<Json<ApiResponse<Vec<Customer>>>, AppError> {
    let controller = CustomerController::new(state.pool.clone());
    let response = controller.list(filters, page).await?;
    Ok(Json(response))
}

async fn create_customer(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Customer>>), AppError> {
    let controller = CustomerController::new(state.pool.clone());
    let response = controller.create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn get_customer(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<CustomerDetail>>, AppError> {
    let controller = CustomerController::new(state.pool.clone());
    let response = controller.get(id).await?;
    Ok(Json(response))
}

async fn update_customer(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ValidatedJson(request): ValidatedJson<UpdateCustomerRequest>,
) -> Result<Json<ApiResponse<Customer>>, AppError> {
    let controller = CustomerController::new(state.pool.clone());
    let response = controller.update(id, request).await?;
    Ok(Json(response))
}

async fn delete_customer(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = CustomerController::new(state.pool.clone());
    let response = controller.delete(id).await?;
    Ok(Json(response))
}

async fn customer_trips_by_phone(
    State(state): State<AppState>,
    Path(phone): Path<String>,
    QueryParams(page): QueryParams<PageParams>,
) -> Result<Json<ApiResponse<Vec<TripView>>>, AppError> {
    let controller = CustomerController::new(state.pool.clone());
    let response = controller.trips_by_phone(phone, page).await?;
    Ok(Json(response))
}
