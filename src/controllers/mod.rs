pub mod admin_controller;
pub mod auth_controller;
pub mod customer_controller;
pub mod driver_controller;
pub mod expense_controller;
pub mod handover_controller;
pub mod report_controller;
pub mod transaction_controller;
pub mod trip_controller;
pub mod vehicle_controller;
