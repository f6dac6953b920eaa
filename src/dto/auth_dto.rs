use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::{UserResponse, UserRole};
use crate::utils::validation::{validate_non_negative, validate_percentage, validate_phone};

// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "El usuario es requerido"))]
    pub username: String,
    #[validate(length(min = 1, message = "La contraseña es requerida"))]
    pub password: String,
}

// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

// Registro de usuarios (solo admin)
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres"))]
    pub password: String,
    #[validate(length(min = 1, max = 255))]
    pub full_name: String,
    #[validate(custom = "validate_phone")]
    pub phone: String,
    pub role: UserRole,
    #[validate(custom = "validate_percentage")]
    pub commission_rate: Option<Decimal>,
    pub driver_license: Option<String>,
    pub license_expiry: Option<NaiveDate>,
    pub address: Option<String>,
    #[validate(custom = "validate_non_negative")]
    pub salary: Option<Decimal>,
}

// Identidad actual
#[derive(Debug, Serialize)]
pub struct MeResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub permissions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_register_request_validation() {
        let valid: RegisterRequest = serde_json::from_value(json!({
            "username": "dispatcher01",
            "email": "d01@taxi.vn",
            "password": "secret123",
            "full_name": "Tran Thi B",
            "phone": "0987654321",
            "role": "dispatcher",
            "commission_rate": 5
        }))
        .unwrap();
        assert!(valid.validate().is_ok());

        let invalid: RegisterRequest = serde_json::from_value(json!({
            "username": "x",
            "email": "not-an-email",
            "password": "123",
            "full_name": "",
            "phone": "12345",
            "role": "driver"
        }))
        .unwrap();
        let errors = invalid.validate().unwrap_err();
        let fields = errors.field_errors();
        for field in ["username", "email", "password", "full_name", "phone"] {
            assert!(fields.contains_key(field), "{} should fail", field);
        }
    }
}
