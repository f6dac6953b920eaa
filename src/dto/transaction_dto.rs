use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::transaction::{ApprovalStatus, PaymentMethod, TransactionType};
use crate::utils::validation::{validate_not_blank, validate_positive};

// Depósito de un conductor por sus viajes completados sin pagar
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDepositRequest {
    #[validate(custom = "validate_positive")]
    pub amount: Decimal,
    #[validate(length(min = 1, message = "Debe indicar al menos un viaje"))]
    pub trip_ids: Vec<Uuid>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub description: Option<String>,
}

// Gasto registrado como transacción
#[derive(Debug, Deserialize, Validate)]
pub struct CreateExpenseTransactionRequest {
    #[validate(custom = "validate_positive")]
    pub amount: Decimal,
    pub vehicle_id: Option<Uuid>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[validate(custom = "validate_not_blank")]
    pub description: String,
    #[serde(default)]
    pub attachments: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ConfirmTransactionRequest {
    pub accountant_note: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RejectTransactionRequest {
    #[validate(custom = "validate_not_blank")]
    pub rejection_reason: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct TransactionFilters {
    #[serde(rename = "type")]
    pub kind: Option<TransactionType>,
    pub status: Option<ApprovalStatus>,
    pub driver_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
