use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::models::vehicle::VehicleStatus;
use crate::utils::validation::{validate_license_plate, validate_non_negative, validate_not_blank};

fn validate_year(year: i32) -> Result<(), ValidationError> {
    let max = Utc::now().year() + 1;
    if !(1990..=max).contains(&year) {
        return Err(ValidationError::new("year"));
    }
    Ok(())
}

// Request para crear un vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(custom = "validate_license_plate")]
    pub license_plate: String,
    #[validate(custom = "validate_not_blank")]
    pub brand: String,
    #[validate(custom = "validate_not_blank")]
    pub model: String,
    #[validate(custom = "validate_year")]
    pub year: i32,
    #[validate(range(min = 1, max = 50))]
    pub seats: Option<i32>,
    pub color: Option<String>,
    pub status: Option<VehicleStatus>,
}

// Request para actualizar un vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[validate(custom = "validate_license_plate")]
    pub license_plate: Option<String>,
    #[validate(custom = "validate_not_blank")]
    pub brand: Option<String>,
    #[validate(custom = "validate_not_blank")]
    pub model: Option<String>,
    #[validate(custom = "validate_year")]
    pub year: Option<i32>,
    #[validate(range(min = 1, max = 50))]
    pub seats: Option<i32>,
    pub color: Option<String>,
    pub status: Option<VehicleStatus>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddMaintenanceRequest {
    pub service_date: Option<DateTime<Utc>>,
    #[validate(custom = "validate_not_blank")]
    pub description: String,
    #[validate(custom = "validate_non_negative")]
    pub cost: Decimal,
    #[validate(range(min = 0))]
    pub odometer: Option<i64>,
    pub performed_by: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VehicleFilters {
    pub status: Option<VehicleStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DateRangeQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl DateRangeQuery {
    /// Límites inclusivos en UTC
    pub fn bounds(&self) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        use crate::utils::validation::{end_of_day, start_of_day};
        (self.start_date.map(start_of_day), self.end_date.map(end_of_day))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_vehicle_validation() {
        let request: CreateVehicleRequest = serde_json::from_value(json!({
            "license_plate": "29A-123.45",
            "brand": "Toyota",
            "model": "Vios",
            "year": 2022
        }))
        .unwrap();
        assert!(request.validate().is_ok());

        let request: CreateVehicleRequest = serde_json::from_value(json!({
            "license_plate": "1",
            "brand": "",
            "model": "Vios",
            "year": 1950,
            "seats": 0
        }))
        .unwrap();
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        for field in ["license_plate", "brand", "year", "seats"] {
            assert!(fields.contains_key(field), "{} should fail", field);
        }
    }

    #[test]
    fn test_date_range_bounds() {
        let query = DateRangeQuery {
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1),
            end_date: None,
        };
        let (start, end) = query.bounds();
        assert_eq!(start.unwrap().to_rfc3339(), "2025-01-01T00:00:00+00:00");
        assert!(end.is_none());
    }
}
