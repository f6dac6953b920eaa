//! Modelo de Expense
//!
//! Gastos operativos (combustible, mantenimiento, seguros...) con flujo de
//! aprobación. Solo se pueden editar mientras están pendientes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

use crate::models::transaction::ApprovalStatus;

/// Tipo de gasto - mapea al ENUM expense_type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "expense_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ExpenseType {
    Fuel,
    Maintenance,
    Insurance,
    Dispatch,
    Other,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Expense {
    pub id: Uuid,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: ExpenseType,
    pub description: String,
    pub amount: Decimal,
    pub status: ApprovalStatus,
    pub created_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub approved_date: Option<DateTime<Utc>>,
    pub expense_date: DateTime<Utc>,
    pub vehicle_id: Option<Uuid>,
    pub trip_id: Option<Uuid>,
    pub attachments: Vec<String>,
    pub notes: Option<String>,
    pub approval_note: Option<String>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    pub fn is_pending(&self) -> bool {
        self.status == ApprovalStatus::Pending
    }
}

/// Gasto con nombres resueltos para listados
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ExpenseView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub expense: Expense,
    pub created_by_name: Option<String>,
    pub approved_by_name: Option<String>,
    pub vehicle_plate: Option<String>,
    pub trip_code: Option<String>,
}
