use axum::{extract::State, middleware, routing::get, Json, Router};

use crate::controllers::report_controller::ReportController;
use crate::dto::api_response::ApiResponse;
use crate::dto::report_dto::{
    DriverPerformanceQuery, ExpensesReportQuery, RevenueByStaffQuery, RevenueByTimeQuery,
    RevenueByVehicleQuery,
};
use crate::dto::vehicle_dto::DateRangeQuery;
use crate::middleware::auth::{require_roles, ADMIN, ADMIN_ACCOUNTANT, ADMIN_DISPATCHER};
use crate::models::report::{
    Dashboard, DriverPerformanceRow, ExpensesReport, RevenueByStaffReport, RevenueByVehicleReport,
    TimeSeriesRow,
};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extractors::QueryParams;

pub fn create_report_router() -> Router<AppState> {
    let admin = || middleware::from_fn_with_state(ADMIN, require_roles);
    let finance = || middleware::from_fn_with_state(ADMIN_ACCOUNTANT, require_roles);

    Router::new()
        .route("/dashboard", get(dashboard).route_layer(admin()))
        .route("/revenue-by-car", get(revenue_by_car).route_layer(finance()))
        .route("/revenue-by-staff", get(revenue_by_staff).route_layer(admin()))
        .route("/revenue-by-time", get(revenue_by_time).route_layer(finance()))
        .route("/expenses", get(expenses_report).route_layer(finance()))
        .route(
            "/driver-performance",
            get(driver_performance).route_layer(middleware::from_fn_with_state(ADMIN_DISPATCHER, require_roles)),
        )
}

async fn dashboard(
    State(state): State<AppState>,
    QueryParams(range): QueryParams<DateRangeQuery>,
) -> Result<Json<ApiResponse<Dashboard>>, AppError> {
    let controller = ReportController::new(state.pool.clone());
    Ok(Json(controller.dashboard(range).await?))
}

async fn revenue_by_car(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<RevenueByVehicleQuery>,
) -> Result<Json<ApiResponse<RevenueByVehicleReport>>, AppError> {
    let controller = ReportController::new(state.pool.clone());
    Ok(Json(controller.revenue_by_vehicle(query).await?))
}

async fn revenue_by_staff(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<RevenueByStaffQuery>,
) -> Result<Json<ApiResponse<RevenueByStaffReport>>, AppError> {
    let controller = ReportController::new(state.pool.clone());
    Ok(Json(controller.revenue_by_staff(query).await?))
}

async fn revenue_by_time(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<RevenueByTimeQuery>,
) -> Result<Json<ApiResponse<Vec<TimeSeriesRow>>>, AppError> {
    let controller = ReportController::new(state.pool.clone());
    Ok(Json(controller.revenue_by_time(query).await?))
}

async fn expenses_report(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ExpensesReportQuery>,
) -> Result<Json<ApiResponse<ExpensesReport>>, AppError> {
    let controller = ReportController::new(state.pool.clone());
    Ok(Json(controller.expenses(query).await?))
}

async fn driver_performance(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<DriverPerformanceQuery>,
) -> Result<Json<ApiResponse<Vec<DriverPerformanceRow>>>, AppError> {
    let controller = ReportController::new(state.pool.clone());
    Ok(Json(controller.driver_performance(query).await?))
}
