//! Services module
//!
//! Lógica de negocio que no pertenece a un único repositorio: autenticación,
//! permisos por rol y la máquina de estados de los viajes.

pub mod auth_service;
pub mod authorization_service;
pub mod trip_state_machine;
