//! Modelo de User
//!
//! Usuarios internos del sistema (admin, dispatcher, driver, accountant...).
//! Mapea a la tabla `users`.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Rol del usuario - mapea al ENUM user_role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Dispatcher,
    Driver,
    Accountant,
    Customer,
    Staff,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Dispatcher => "dispatcher",
            UserRole::Driver => "driver",
            UserRole::Accountant => "accountant",
            UserRole::Customer => "customer",
            UserRole::Staff => "staff",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "dispatcher" => Ok(UserRole::Dispatcher),
            "driver" => Ok(UserRole::Driver),
            "accountant" => Ok(UserRole::Accountant),
            "customer" => Ok(UserRole::Customer),
            "staff" => Ok(UserRole::Staff),
            other => Err(format!("Rol desconocido: {}", other)),
        }
    }
}

/// User - mapea exactamente a la tabla users
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone: String,
    pub role: UserRole,
    pub is_active: bool,
    pub commission_rate: Decimal,
    pub driver_license: Option<String>,
    pub license_expiry: Option<NaiveDate>,
    pub address: Option<String>,
    pub salary: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Usuario sin credenciales, seguro para devolver en la API
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub phone: String,
    pub role: UserRole,
    pub is_active: bool,
    pub commission_rate: Decimal,
    pub driver_license: Option<String>,
    pub license_expiry: Option<NaiveDate>,
    pub address: Option<String>,
    pub salary: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            phone: user.phone,
            role: user.role,
            is_active: user.is_active,
            commission_rate: user.commission_rate,
            driver_license: user.driver_license,
            license_expiry: user.license_expiry,
            address: user.address,
            salary: user.salary,
            created_at: user.created_at,
        }
    }
}

/// Estadísticas acumuladas de un conductor (viajes completados)
#[derive(Debug, Clone, Default, Serialize, FromRow)]
pub struct DriverStatistics {
    pub total_trips: i64,
    pub total_revenue: Decimal,
    pub total_distance: f64,
}

/// Conductor en listados, con el vehículo que tiene asignado
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DriverListItem {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub phone: String,
    pub is_active: bool,
    pub driver_license: Option<String>,
    pub license_expiry: Option<NaiveDate>,
    pub address: Option<String>,
    pub salary: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub current_vehicle_id: Option<Uuid>,
    pub current_vehicle_plate: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DriverDetail {
    #[serde(flatten)]
    pub driver: UserResponse,
    pub current_vehicle: Option<crate::models::vehicle::Vehicle>,
    pub statistics: DriverStatistics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_through_str() {
        for role in [
            UserRole::Admin,
            UserRole::Dispatcher,
            UserRole::Driver,
            UserRole::Accountant,
            UserRole::Customer,
            UserRole::Staff,
        ] {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
        }
        assert!("superuser".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&UserRole::Accountant).unwrap();
        assert_eq!(json, "\"accountant\"");
    }
}
