use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::expense::ExpenseType;
use crate::models::report::TimeBucket;
use crate::models::transaction::ApprovalStatus;
use crate::models::user::UserRole;

#[derive(Debug, Default, Deserialize)]
pub struct RevenueByVehicleQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub vehicle_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RevenueByStaffQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub role: Option<UserRole>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExpensesReportQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub kind: Option<ExpenseType>,
    pub status: Option<ApprovalStatus>,
    pub vehicle_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DriverPerformanceQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub driver_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RevenueByTimeQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub group_by: TimeBucket,
}
