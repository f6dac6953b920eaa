//! Controlador de reportes
//!
//! Arma los reportes a partir de las filas agregadas del repositorio y
//! calcula los totales del resumen.

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::dto::api_response::ApiResponse;
use crate::dto::report_dto::{
    DriverPerformanceQuery, ExpensesReportQuery, RevenueByStaffQuery, RevenueByTimeQuery,
    RevenueByVehicleQuery,
};
use crate::dto::vehicle_dto::DateRangeQuery;
use crate::models::report::{
    Dashboard, DriverPerformanceRow, ExpenseSummary, ExpensesReport, RevenueByStaffReport,
    RevenueByVehicleReport, TimeSeriesRow,
};
use crate::repositories::report_repository::{ExpenseReportFilter, Period, ReportRepository};
use crate::repositories::trip_repository::TripRepository;
use crate::utils::errors::AppResult;

const DASHBOARD_RECENT_TRIPS: i64 = 10;
const REPORT_RECENT_EXPENSES: i64 = 10;

pub struct ReportController {
    reports: ReportRepository,
    trips: TripRepository,
}

impl ReportController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            reports: ReportRepository::new(pool.clone()),
            trips: TripRepository::new(pool),
        }
    }

    pub async fn dashboard(&self, range: DateRangeQuery) -> AppResult<ApiResponse<Dashboard>> {
        let period = Period::new(range.start_date, range.end_date);
        let summary = self.reports.dashboard_summary(period).await?;
        let recent_trips = self.trips.recent(DASHBOARD_RECENT_TRIPS).await?;

        Ok(ApiResponse::success(Dashboard {
            summary,
            recent_trips,
        }))
    }

    pub async fn revenue_by_vehicle(
        &self,
        query: RevenueByVehicleQuery,
    ) -> AppResult<ApiResponse<RevenueByVehicleReport>> {
        let period = Period::new(query.start_date, query.end_date);
        let rows = self.reports.revenue_by_vehicle(period, query.vehicle_id).await?;
        Ok(ApiResponse::success(RevenueByVehicleReport::from_rows(rows)))
    }

    pub async fn revenue_by_staff(
        &self,
        query: RevenueByStaffQuery,
    ) -> AppResult<ApiResponse<RevenueByStaffReport>> {
        let period = Period::new(query.start_date, query.end_date);
        let rows = self.reports.revenue_by_staff(period, query.role).await?;
        Ok(ApiResponse::success(RevenueByStaffReport::from_rows(rows)))
    }

    pub async fn revenue_by_time(&self, query: RevenueByTimeQuery) -> AppResult<ApiResponse<Vec<TimeSeriesRow>>> {
        let period = Period::new(query.start_date, query.end_date);
        let rows = self.reports.revenue_by_time(period, query.group_by).await?;
        Ok(ApiResponse::success(rows))
    }

    pub async fn expenses(&self, query: ExpensesReportQuery) -> AppResult<ApiResponse<ExpensesReport>> {
        let period = Period::new(query.start_date, query.end_date);
        let filter = ExpenseReportFilter {
            kind: query.kind,
            status: query.status,
            vehicle_id: query.vehicle_id,
        };

        let by_type = self.reports.expenses_by_type(period, filter).await?;
        let by_vehicle = self.reports.expenses_by_vehicle(period, filter).await?;
        let recent_expenses = self
            .reports
            .recent_expenses(period, filter, REPORT_RECENT_EXPENSES)
            .await?;

        // Los totales salen de la agrupación por tipo: cubre también gastos sin vehículo
        let total_expenses: Decimal = by_type.iter().map(|row| row.total_amount).sum();
        let total_count: usize = by_type.iter().map(|row| row.count as usize).sum();

        Ok(ApiResponse::success(ExpensesReport {
            summary: ExpenseSummary {
                total_expenses,
                total_count,
                by_type,
                by_vehicle,
            },
            recent_expenses,
        }))
    }

    pub async fn driver_performance(
        &self,
        query: DriverPerformanceQuery,
    ) -> AppResult<ApiResponse<Vec<DriverPerformanceRow>>> {
        let period = Period::new(query.start_date, query.end_date);
        let rows = self.reports.driver_performance(period, query.driver_id).await?;
        Ok(ApiResponse::success(rows))
    }
}
