//! Modelo de Transaction
//!
//! Depósitos de efectivo de los conductores y gastos registrados como
//! transacción. Los depósitos enlazan viajes vía `transaction_trips`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Tipo de transacción - mapea al ENUM transaction_type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "transaction_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Deposit,
    Expense,
}

/// Estado de aprobación compartido por transacciones y gastos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "approval_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Confirmed,
    Rejected,
}

/// Método de pago - mapea al ENUM payment_method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, Default)]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    BankTransfer,
    EWallet,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Transaction {
    pub id: Uuid,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub created_by: Uuid,
    pub confirmed_by: Option<Uuid>,
    pub amount: Decimal,
    pub status: ApprovalStatus,
    pub description: Option<String>,
    pub payment_method: PaymentMethod,
    pub vehicle_id: Option<Uuid>,
    pub attachments: Vec<String>,
    pub accountant_note: Option<String>,
    pub rejection_reason: Option<String>,
    pub transaction_date: DateTime<Utc>,
    pub confirmed_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Transacción con referencias resueltas y viajes enlazados
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TransactionView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub transaction: Transaction,
    pub created_by_name: Option<String>,
    pub confirmed_by_name: Option<String>,
    pub vehicle_plate: Option<String>,
    pub trip_ids: Vec<Uuid>,
}

/// Total pendiente de depósito de un conductor
#[derive(Debug, Clone, Serialize)]
pub struct UnpaidSummary {
    pub total_unpaid: Decimal,
    pub trip_count: usize,
    pub trips: Vec<crate::models::trip::UnpaidTrip>,
}
