use serde::Deserialize;
use validator::Validate;

use crate::utils::validation::validate_phone;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCustomerRequest {
    #[validate(custom = "validate_phone")]
    pub phone: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub is_vip: bool,
}

// El teléfono es la clave del cliente y no se edita
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCustomerRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub is_vip: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CustomerFilters {
    pub search: Option<String>,
    pub is_vip: Option<bool>,
}
