//! Acceso a datos (PostgreSQL vía sqlx)

pub mod customer_repository;
pub mod expense_repository;
pub mod handover_repository;
pub mod report_repository;
pub mod transaction_repository;
pub mod trip_repository;
pub mod user_repository;
pub mod vehicle_repository;
