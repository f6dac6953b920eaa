//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle y su historial de mantenimiento.
//! Mapea a las tablas `vehicles` y `vehicle_maintenance`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado del vehículo - mapea al ENUM vehicle_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "vehicle_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    Active,
    Maintenance,
    Rented,
    Inactive,
}

/// Vehicle principal - mapea exactamente a la tabla vehicles
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    pub license_plate: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub seats: i32,
    pub color: Option<String>,
    pub status: VehicleStatus,
    pub current_driver_id: Option<Uuid>,
    pub total_revenue: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    /// Un vehículo solo puede recibir viajes si está activo y no dado de baja
    pub fn is_assignable(&self) -> bool {
        self.is_active && self.status == VehicleStatus::Active
    }
}

/// Vehículo con el conductor actual resuelto
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct VehicleView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub vehicle: Vehicle,
    pub current_driver_name: Option<String>,
    pub current_driver_phone: Option<String>,
}

/// Registro del historial de mantenimiento (solo se agregan registros)
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MaintenanceRecord {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub service_date: DateTime<Utc>,
    pub description: String,
    pub cost: Decimal,
    pub odometer: Option<i64>,
    pub performed_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Resumen de ingresos de un vehículo para un rango de fechas
#[derive(Debug, Clone, Serialize)]
pub struct VehicleRevenue {
    pub total_revenue: Decimal,
    pub total_trips: i64,
    pub total_distance: f64,
    pub trips: Vec<VehicleRevenueTrip>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct VehicleRevenueTrip {
    pub id: Uuid,
    pub trip_code: String,
    pub final_price: Option<Decimal>,
    pub distance: Option<f64>,
    pub completed_time: Option<DateTime<Utc>>,
}

impl VehicleRevenue {
    pub fn from_trips(trips: Vec<VehicleRevenueTrip>) -> Self {
        let total_revenue: Decimal = trips.iter().filter_map(|t| t.final_price).sum();
        let total_distance: f64 = trips.iter().filter_map(|t| t.distance).sum();
        Self {
            total_revenue,
            total_trips: trips.len() as i64,
            total_distance,
            trips,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle(status: VehicleStatus, is_active: bool) -> Vehicle {
        Vehicle {
            id: Uuid::new_v4(),
            license_plate: "29A-123.45".to_string(),
            brand: "Toyota".to_string(),
            model: "Vios".to_string(),
            year: 2023,
            seats: 4,
            color: None,
            status,
            current_driver_id: None,
            total_revenue: Decimal::ZERO,
            is_active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_only_active_vehicles_are_assignable() {
        assert!(vehicle(VehicleStatus::Active, true).is_assignable());
        assert!(!vehicle(VehicleStatus::Maintenance, true).is_assignable());
        assert!(!vehicle(VehicleStatus::Rented, true).is_assignable());
        assert!(!vehicle(VehicleStatus::Active, false).is_assignable());
    }

    #[test]
    fn test_revenue_totals_skip_missing_values() {
        let trip = |price: Option<i64>, distance: Option<f64>| VehicleRevenueTrip {
            id: Uuid::new_v4(),
            trip_code: "TX260101AAAAAA".to_string(),
            final_price: price.map(Decimal::from),
            distance,
            completed_time: Some(Utc::now()),
        };

        let revenue = VehicleRevenue::from_trips(vec![
            trip(Some(90_000), Some(12.5)),
            trip(Some(150_000), None),
            trip(None, Some(3.0)),
        ]);
        assert_eq!(revenue.total_revenue, Decimal::from(240_000));
        assert_eq!(revenue.total_trips, 3);
        assert!((revenue.total_distance - 15.5).abs() < f64::EPSILON);
    }
}
