use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use crate::models::trip::TripStatus;
use crate::utils::validation::{validate_non_negative, validate_percentage, validate_phone};

// Request para crear un conductor; el username por defecto es el teléfono
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDriverRequest {
    #[validate(length(min = 1, max = 255))]
    pub full_name: String,
    #[validate(custom = "validate_phone")]
    pub phone: String,
    #[validate(length(min = 3, max = 50))]
    pub username: Option<String>,
    #[validate(length(min = 6))]
    pub password: String,
    #[validate(email)]
    pub email: String,
    pub address: Option<String>,
    pub driver_license: Option<String>,
    pub license_expiry: Option<NaiveDate>,
    #[validate(custom = "validate_non_negative")]
    pub salary: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDriverRequest {
    #[validate(length(min = 1, max = 255))]
    pub full_name: Option<String>,
    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub driver_license: Option<String>,
    pub license_expiry: Option<NaiveDate>,
    pub address: Option<String>,
    #[validate(custom = "validate_non_negative")]
    pub salary: Option<Decimal>,
    #[validate(custom = "validate_percentage")]
    pub commission_rate: Option<Decimal>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverStatusFilter {
    Active,
    Inactive,
}

#[derive(Debug, Default, Deserialize)]
pub struct DriverFilters {
    pub status: Option<DriverStatusFilter>,
    pub search: Option<String>,
}

impl DriverFilters {
    pub fn is_active(&self) -> Option<bool> {
        self.status.map(|s| s == DriverStatusFilter::Active)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DriverTripFilters {
    pub status: Option<TripStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
