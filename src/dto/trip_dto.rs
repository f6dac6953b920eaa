use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::trip::TripStatus;
use crate::utils::validation::{validate_non_negative, validate_not_blank, validate_phone};

// Request para crear un viaje
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTripRequest {
    #[validate(custom = "validate_phone")]
    pub customer_phone: String,
    #[validate(length(max = 255))]
    pub customer_name: Option<String>,
    #[validate(custom = "validate_not_blank")]
    pub pickup_location: String,
    #[validate(custom = "validate_not_blank")]
    pub dropoff_location: String,
    pub scheduled_time: DateTime<Utc>,
    #[validate(range(min = 1, max = 50))]
    pub passengers: Option<i32>,
    pub customer_note: Option<String>,
    #[validate(custom = "validate_non_negative")]
    pub estimated_price: Decimal,
    #[validate(custom = "validate_non_negative")]
    pub discount: Option<Decimal>,
    #[validate(range(min = 0.0))]
    pub distance: Option<f64>,
    pub vehicle_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
}

// Request para editar un viaje no bloqueado
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTripRequest {
    #[validate(custom = "validate_not_blank")]
    pub pickup_location: Option<String>,
    #[validate(custom = "validate_not_blank")]
    pub dropoff_location: Option<String>,
    pub scheduled_time: Option<DateTime<Utc>>,
    #[validate(custom = "validate_non_negative")]
    pub estimated_price: Option<Decimal>,
    #[validate(range(min = 1, max = 50))]
    pub passengers: Option<i32>,
    pub customer_note: Option<String>,
    #[validate(custom = "validate_non_negative")]
    pub discount: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AssignTripRequest {
    pub vehicle_id: Uuid,
    pub driver_id: Uuid,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTripStatusRequest {
    pub status: TripStatus,
    #[validate(length(max = 1000))]
    pub note: Option<String>,
    pub actual_price: Option<Decimal>,
    #[validate(range(min = 0.0))]
    pub distance: Option<f64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddNoteRequest {
    #[validate(custom = "validate_not_blank", length(max = 2000))]
    pub content: String,
}

// Filtros del listado de viajes
#[derive(Debug, Default, Deserialize)]
pub struct TripFilters {
    pub status: Option<TripStatus>,
    pub driver_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
    pub customer_phone: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_trip_validation() {
        let request: CreateTripRequest = serde_json::from_value(json!({
            "customer_phone": "0912345678",
            "customer_name": "Le Van C",
            "pickup_location": "Ba Dinh",
            "dropoff_location": "Noi Bai",
            "scheduled_time": "2025-06-01T08:00:00Z",
            "estimated_price": 350000
        }))
        .unwrap();
        assert!(request.validate().is_ok());

        let request: CreateTripRequest = serde_json::from_value(json!({
            "customer_phone": "12",
            "pickup_location": " ",
            "dropoff_location": "Noi Bai",
            "scheduled_time": "2025-06-01T08:00:00Z",
            "estimated_price": -1,
            "passengers": 0
        }))
        .unwrap();
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("customer_phone"));
        assert!(fields.contains_key("pickup_location"));
        assert!(fields.contains_key("estimated_price"));
        assert!(fields.contains_key("passengers"));
    }

    #[test]
    fn test_status_request_parses_snake_case() {
        let request: UpdateTripStatusRequest = serde_json::from_value(json!({
            "status": "picked_up",
            "note": "Đã đón khách"
        }))
        .unwrap();
        assert_eq!(request.status, TripStatus::PickedUp);
        assert!(request.actual_price.is_none());
    }
}
