//! Consultas agregadas de reportes
//!
//! Los ingresos siempre salen de viajes completados, filtrados por
//! `completed_time`.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::expense::{ExpenseType, ExpenseView};
use crate::models::report::{
    DashboardSummary, DriverPerformanceRow, ExpenseTypeRow, ExpenseVehicleRow, StaffRevenueRow,
    TimeBucket, TimeSeriesRow, VehicleRevenueRow,
};
use crate::models::transaction::ApprovalStatus;
use crate::models::user::UserRole;
use crate::repositories::expense_repository::EXPENSE_VIEW_SELECT;
use crate::utils::errors::AppResult;
use crate::utils::validation::{end_of_day, start_of_day};

/// Rango de fechas ya convertido a instantes UTC inclusivos
#[derive(Debug, Clone, Copy, Default)]
pub struct Period {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl Period {
    pub fn new(start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> Self {
        Self {
            from: start_date.map(start_of_day),
            to: end_date.map(end_of_day),
        }
    }
}

/// Filtros del reporte de gastos
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpenseReportFilter {
    pub kind: Option<ExpenseType>,
    pub status: Option<ApprovalStatus>,
    pub vehicle_id: Option<Uuid>,
}

const EXPENSE_REPORT_FILTERS: &str = r#"
    WHERE ($1::timestamptz IS NULL OR e.expense_date >= $1)
      AND ($2::timestamptz IS NULL OR e.expense_date <= $2)
      AND ($3::expense_type IS NULL OR e.type = $3)
      AND ($4::approval_status IS NULL OR e.status = $4)
      AND ($5::uuid IS NULL OR e.vehicle_id = $5)
"#;

pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn revenue_by_vehicle(
        &self,
        period: Period,
        vehicle_id: Option<Uuid>,
    ) -> AppResult<Vec<VehicleRevenueRow>> {
        let rows = sqlx::query_as::<_, VehicleRevenueRow>(
            r#"
            SELECT v.id AS vehicle_id, v.license_plate, v.brand, v.model,
                   COALESCE(SUM(t.final_price), 0) AS total_revenue,
                   COUNT(t.id) AS total_trips,
                   COALESCE(SUM(t.distance), 0)::float8 AS total_distance,
                   COALESCE(ROUND(AVG(t.final_price), 2), 0) AS avg_price
            FROM vehicles v
            JOIN trips t ON t.vehicle_id = v.id AND t.status = 'completed'
            WHERE ($1::timestamptz IS NULL OR t.completed_time >= $1)
              AND ($2::timestamptz IS NULL OR t.completed_time <= $2)
              AND ($3::uuid IS NULL OR v.id = $3)
            GROUP BY v.id
            ORDER BY total_revenue DESC
            "#,
        )
        .bind(period.from)
        .bind(period.to)
        .bind(vehicle_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Ingresos y comisiones por usuario que reservó los viajes
    pub async fn revenue_by_staff(
        &self,
        period: Period,
        role: Option<UserRole>,
    ) -> AppResult<Vec<StaffRevenueRow>> {
        let rows = sqlx::query_as::<_, StaffRevenueRow>(
            r#"
            SELECT u.id AS staff_id, u.full_name, u.phone, u.role, u.commission_rate,
                   COALESCE(SUM(t.commission_amount), 0) AS total_commission,
                   COUNT(t.id) AS total_trips,
                   COALESCE(SUM(t.final_price), 0) AS total_revenue
            FROM users u
            JOIN trips t ON t.dispatcher_id = u.id AND t.status = 'completed'
            WHERE ($1::timestamptz IS NULL OR t.completed_time >= $1)
              AND ($2::timestamptz IS NULL OR t.completed_time <= $2)
              AND ($3::user_role IS NULL OR u.role = $3)
            GROUP BY u.id
            ORDER BY total_revenue DESC
            "#,
        )
        .bind(period.from)
        .bind(period.to)
        .bind(role)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn revenue_by_time(&self, period: Period, bucket: TimeBucket) -> AppResult<Vec<TimeSeriesRow>> {
        let rows = sqlx::query_as::<_, TimeSeriesRow>(
            r#"
            SELECT to_char(t.completed_time AT TIME ZONE 'UTC', $3) AS date,
                   COALESCE(SUM(t.final_price), 0) AS total_revenue,
                   COUNT(t.id) AS total_trips,
                   COALESCE(SUM(t.distance), 0)::float8 AS total_distance,
                   COALESCE(ROUND(AVG(t.final_price), 2), 0) AS avg_price
            FROM trips t
            WHERE t.status = 'completed'
              AND ($1::timestamptz IS NULL OR t.completed_time >= $1)
              AND ($2::timestamptz IS NULL OR t.completed_time <= $2)
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .bind(period.from)
        .bind(period.to)
        .bind(bucket.pg_format())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn expenses_by_type(
        &self,
        period: Period,
        filter: ExpenseReportFilter,
    ) -> AppResult<Vec<ExpenseTypeRow>> {
        let sql = format!(
            r#"
            SELECT e.type, COALESCE(SUM(e.amount), 0) AS total_amount, COUNT(*) AS count
            FROM expenses e
            {}
            GROUP BY e.type
            ORDER BY total_amount DESC
            "#,
            EXPENSE_REPORT_FILTERS
        );
        let rows = sqlx::query_as::<_, ExpenseTypeRow>(&sql)
            .bind(period.from)
            .bind(period.to)
            .bind(filter.kind)
            .bind(filter.status)
            .bind(filter.vehicle_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    pub async fn expenses_by_vehicle(
        &self,
        period: Period,
        filter: ExpenseReportFilter,
    ) -> AppResult<Vec<ExpenseVehicleRow>> {
        let sql = format!(
            r#"
            SELECT v.id AS vehicle_id, v.license_plate,
                   COALESCE(SUM(e.amount), 0) AS total_amount, COUNT(*) AS count
            FROM expenses e
            JOIN vehicles v ON v.id = e.vehicle_id
            {}
            GROUP BY v.id
            ORDER BY total_amount DESC
            "#,
            EXPENSE_REPORT_FILTERS
        );
        let rows = sqlx::query_as::<_, ExpenseVehicleRow>(&sql)
            .bind(period.from)
            .bind(period.to)
            .bind(filter.kind)
            .bind(filter.status)
            .bind(filter.vehicle_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    pub async fn recent_expenses(
        &self,
        period: Period,
        filter: ExpenseReportFilter,
        limit: i64,
    ) -> AppResult<Vec<ExpenseView>> {
        let sql = format!(
            "{} {} ORDER BY e.expense_date DESC LIMIT $6",
            EXPENSE_VIEW_SELECT, EXPENSE_REPORT_FILTERS
        );
        let rows = sqlx::query_as::<_, ExpenseView>(&sql)
            .bind(period.from)
            .bind(period.to)
            .bind(filter.kind)
            .bind(filter.status)
            .bind(filter.vehicle_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    pub async fn dashboard_summary(&self, period: Period) -> AppResult<DashboardSummary> {
        let (total_revenue, total_trips, total_distance): (Decimal, i64, f64) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(final_price), 0),
                   COUNT(*),
                   COALESCE(SUM(distance), 0)::float8
            FROM trips
            WHERE status = 'completed'
              AND ($1::timestamptz IS NULL OR completed_time >= $1)
              AND ($2::timestamptz IS NULL OR completed_time <= $2)
            "#,
        )
        .bind(period.from)
        .bind(period.to)
        .fetch_one(&self.pool)
        .await?;

        let (active_trips, active_vehicles, active_drivers, total_customers, pending_transactions, pending_expenses): (
            i64,
            i64,
            i64,
            i64,
            i64,
            i64,
        ) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM trips WHERE status IN ('assigned', 'called', 'picked_up')),
                (SELECT COUNT(*) FROM vehicles WHERE is_active = TRUE AND status = 'active'),
                (SELECT COUNT(*) FROM users WHERE role = 'driver' AND is_active = TRUE),
                (SELECT COUNT(*) FROM customers),
                (SELECT COUNT(*) FROM transactions WHERE status = 'pending'),
                (SELECT COUNT(*) FROM expenses WHERE status = 'pending')
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(DashboardSummary {
            total_revenue,
            total_trips,
            total_distance,
            active_trips,
            active_vehicles,
            active_drivers,
            total_customers,
            pending_transactions,
            pending_expenses,
        })
    }

    pub async fn driver_performance(
        &self,
        period: Period,
        driver_id: Option<Uuid>,
    ) -> AppResult<Vec<DriverPerformanceRow>> {
        let rows = sqlx::query_as::<_, DriverPerformanceRow>(
            r#"
            SELECT u.id AS driver_id, u.full_name, u.phone,
                   COUNT(t.id) AS total_trips,
                   COALESCE(SUM(t.final_price), 0) AS total_revenue,
                   COALESCE(SUM(t.distance), 0)::float8 AS total_distance,
                   COALESCE(ROUND(AVG(t.final_price), 2), 0) AS avg_price
            FROM users u
            LEFT JOIN trips t ON t.driver_id = u.id
                AND t.status = 'completed'
                AND ($1::timestamptz IS NULL OR t.completed_time >= $1)
                AND ($2::timestamptz IS NULL OR t.completed_time <= $2)
            WHERE u.role = 'driver'
              AND ($3::uuid IS NULL OR u.id = $3)
            GROUP BY u.id
            ORDER BY total_revenue DESC, u.full_name
            "#,
        )
        .bind(period.from)
        .bind(period.to)
        .bind(driver_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
