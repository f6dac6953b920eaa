//! Modelo de Customer
//!
//! Clientes identificados por su número de teléfono.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::trip::TripStatus;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Customer {
    pub id: Uuid,
    pub phone: String,
    pub name: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub total_trips: i32,
    pub total_spent: Decimal,
    pub is_vip: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Resumen de un viaje dentro del detalle de un cliente
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CustomerTripSummary {
    pub id: Uuid,
    pub trip_code: String,
    pub scheduled_time: DateTime<Utc>,
    pub final_price: Option<Decimal>,
    pub status: TripStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerDetail {
    #[serde(flatten)]
    pub customer: Customer,
    pub recent_trips: Vec<CustomerTripSummary>,
}
