use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::expense::ExpenseType;
use crate::models::transaction::ApprovalStatus;
use crate::utils::validation::{validate_non_negative, validate_not_blank};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateExpenseRequest {
    #[serde(rename = "type")]
    pub kind: ExpenseType,
    #[validate(custom = "validate_not_blank")]
    pub description: String,
    #[validate(custom = "validate_non_negative")]
    pub amount: Decimal,
    pub expense_date: Option<DateTime<Utc>>,
    pub vehicle_id: Option<Uuid>,
    pub trip_id: Option<Uuid>,
    #[serde(default)]
    pub attachments: Vec<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateExpenseRequest {
    #[serde(rename = "type")]
    pub kind: Option<ExpenseType>,
    #[validate(custom = "validate_not_blank")]
    pub description: Option<String>,
    #[validate(custom = "validate_non_negative")]
    pub amount: Option<Decimal>,
    pub expense_date: Option<DateTime<Utc>>,
    pub vehicle_id: Option<Uuid>,
    pub trip_id: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ApproveExpenseRequest {
    pub approval_note: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RejectExpenseRequest {
    #[validate(custom = "validate_not_blank")]
    pub rejection_reason: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExpenseFilters {
    #[serde(rename = "type")]
    pub kind: Option<ExpenseType>,
    pub status: Option<ApprovalStatus>,
    pub vehicle_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
