//! Modelos de reportes
//!
//! Filas agregadas que devuelven las consultas de reportes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::expense::ExpenseType;
use crate::models::expense::ExpenseView;
use crate::models::trip::TripView;
use crate::models::user::UserRole;

/// Agrupación temporal para revenue-by-time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeBucket {
    #[default]
    Day,
    Month,
    Year,
}

impl TimeBucket {
    /// Formato de `to_char` de PostgreSQL para el bucket
    pub fn pg_format(&self) -> &'static str {
        match self {
            TimeBucket::Day => "YYYY-MM-DD",
            TimeBucket::Month => "YYYY-MM",
            TimeBucket::Year => "YYYY",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, FromRow)]
pub struct RevenueTotals {
    pub total_revenue: Decimal,
    pub total_trips: i64,
    pub total_distance: f64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct VehicleRevenueRow {
    pub vehicle_id: Uuid,
    pub license_plate: String,
    pub brand: String,
    pub model: String,
    pub total_revenue: Decimal,
    pub total_trips: i64,
    pub total_distance: f64,
    pub avg_price: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct RevenueByVehicleReport {
    pub summary: RevenueTotals,
    pub details: Vec<VehicleRevenueRow>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StaffRevenueRow {
    pub staff_id: Uuid,
    pub full_name: String,
    pub phone: String,
    pub role: UserRole,
    pub commission_rate: Decimal,
    pub total_commission: Decimal,
    pub total_trips: i64,
    pub total_revenue: Decimal,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StaffRevenueTotals {
    pub total_commission: Decimal,
    pub total_trips: i64,
    pub total_revenue: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct RevenueByStaffReport {
    pub summary: StaffRevenueTotals,
    pub details: Vec<StaffRevenueRow>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ExpenseTypeRow {
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: ExpenseType,
    pub total_amount: Decimal,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ExpenseVehicleRow {
    pub vehicle_id: Uuid,
    pub license_plate: String,
    pub total_amount: Decimal,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpenseSummary {
    pub total_expenses: Decimal,
    pub total_count: usize,
    pub by_type: Vec<ExpenseTypeRow>,
    pub by_vehicle: Vec<ExpenseVehicleRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpensesReport {
    pub summary: ExpenseSummary,
    pub recent_expenses: Vec<ExpenseView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub total_revenue: Decimal,
    pub total_trips: i64,
    pub total_distance: f64,
    pub active_trips: i64,
    pub active_vehicles: i64,
    pub active_drivers: i64,
    pub total_customers: i64,
    pub pending_transactions: i64,
    pub pending_expenses: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub summary: DashboardSummary,
    pub recent_trips: Vec<TripView>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DriverPerformanceRow {
    pub driver_id: Uuid,
    pub full_name: String,
    pub phone: String,
    pub total_trips: i64,
    pub total_revenue: Decimal,
    pub total_distance: f64,
    pub avg_price: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TimeSeriesRow {
    pub date: String,
    pub total_revenue: Decimal,
    pub total_trips: i64,
    pub total_distance: f64,
    pub avg_price: Decimal,
}

impl RevenueByVehicleReport {
    pub fn from_rows(details: Vec<VehicleRevenueRow>) -> Self {
        let summary = details.iter().fold(RevenueTotals::default(), |mut acc, row| {
            acc.total_revenue += row.total_revenue;
            acc.total_trips += row.total_trips;
            acc.total_distance += row.total_distance;
            acc
        });
        Self { summary, details }
    }
}

impl RevenueByStaffReport {
    pub fn from_rows(details: Vec<StaffRevenueRow>) -> Self {
        let summary = details.iter().fold(StaffRevenueTotals::default(), |mut acc, row| {
            acc.total_commission += row.total_commission;
            acc.total_trips += row.total_trips;
            acc.total_revenue += row.total_revenue;
            acc
        });
        Self { summary, details }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle_row(revenue: i64, trips: i64, distance: f64) -> VehicleRevenueRow {
        VehicleRevenueRow {
            vehicle_id: Uuid::new_v4(),
            license_plate: "30A-000.01".to_string(),
            brand: "Kia".to_string(),
            model: "Morning".to_string(),
            total_revenue: Decimal::from(revenue),
            total_trips: trips,
            total_distance: distance,
            avg_price: Decimal::ZERO,
        }
    }

    #[test]
    fn test_vehicle_report_summary_adds_up_rows() {
        let report = RevenueByVehicleReport::from_rows(vec![
            vehicle_row(300_000, 3, 42.5),
            vehicle_row(120_000, 1, 10.0),
        ]);
        assert_eq!(report.summary.total_revenue, Decimal::from(420_000));
        assert_eq!(report.summary.total_trips, 4);
        assert!((report.summary.total_distance - 52.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_report_has_zero_summary() {
        let report = RevenueByStaffReport::from_rows(vec![]);
        assert_eq!(report.summary.total_commission, Decimal::ZERO);
        assert_eq!(report.summary.total_trips, 0);
    }

    #[test]
    fn test_time_bucket_formats() {
        assert_eq!(TimeBucket::default().pg_format(), "YYYY-MM-DD");
        assert_eq!(TimeBucket::Month.pg_format(), "YYYY-MM");
        assert_eq!(TimeBucket::Year.pg_format(), "YYYY");
    }
}
