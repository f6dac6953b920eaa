//! Modelo de Trip
//!
//! Viajes reservados por los dispatchers y ejecutados por los conductores.
//! Mapea a las tablas `trips`, `trip_status_history` y `trip_notes`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use std::fmt;
use uuid::Uuid;

/// Estado del viaje - mapea al ENUM trip_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "trip_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    New,
    Assigned,
    Called,
    PickedUp,
    Incident,
    Completed,
    Cancelled,
}

impl TripStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::New => "new",
            TripStatus::Assigned => "assigned",
            TripStatus::Called => "called",
            TripStatus::PickedUp => "picked_up",
            TripStatus::Incident => "incident",
            TripStatus::Completed => "completed",
            TripStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TripStatus::Completed | TripStatus::Cancelled)
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trip - mapea exactamente a la tabla trips
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Trip {
    pub id: Uuid,
    pub trip_code: String,
    pub customer_id: Uuid,
    pub customer_phone: String,
    pub customer_name: String,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub scheduled_time: DateTime<Utc>,
    pub passengers: i32,
    pub customer_note: Option<String>,
    pub estimated_price: Decimal,
    pub actual_price: Option<Decimal>,
    pub discount: Decimal,
    pub final_price: Option<Decimal>,
    pub distance: Option<f64>,
    pub commission_amount: Decimal,
    pub vehicle_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub dispatcher_id: Uuid,
    pub status: TripStatus,
    pub is_paid: bool,
    pub is_locked: bool,
    pub completed_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Viaje con las referencias resueltas (cliente, vehículo, conductor, dispatcher)
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TripView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub trip: Trip,
    pub vehicle_plate: Option<String>,
    pub driver_name: Option<String>,
    pub driver_phone: Option<String>,
    pub dispatcher_name: Option<String>,
}

/// Entrada del historial de estados (ordenada por fecha)
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StatusHistoryEntry {
    pub status: TripStatus,
    pub changed_at: DateTime<Utc>,
    pub changed_by: Option<Uuid>,
    pub changed_by_name: Option<String>,
    pub note: Option<String>,
}

/// Nota interna de un viaje
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TripNote {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub content: String,
    pub created_by: Option<Uuid>,
    pub created_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Detalle completo de un viaje
#[derive(Debug, Clone, Serialize)]
pub struct TripDetail {
    #[serde(flatten)]
    pub trip: TripView,
    pub status_history: Vec<StatusHistoryEntry>,
    pub notes: Vec<TripNote>,
}

/// Viaje completado pendiente de depósito
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UnpaidTrip {
    pub id: Uuid,
    pub trip_code: String,
    pub final_price: Decimal,
    pub completed_time: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde_uses_snake_case() {
        assert_eq!(serde_json::to_string(&TripStatus::PickedUp).unwrap(), "\"picked_up\"");
        let parsed: TripStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(parsed, TripStatus::Cancelled);
    }

    #[test]
    fn test_terminal_states() {
        assert!(TripStatus::Completed.is_terminal());
        assert!(TripStatus::Cancelled.is_terminal());
        assert!(!TripStatus::Incident.is_terminal());
    }
}
