//! DTOs de request/response de la API

pub mod api_response;
pub mod auth_dto;
pub mod customer_dto;
pub mod driver_dto;
pub mod expense_dto;
pub mod handover_dto;
pub mod report_dto;
pub mod transaction_dto;
pub mod trip_dto;
pub mod vehicle_dto;
