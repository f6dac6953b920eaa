//! Utilidades del sistema
//!
//! Este módulo contiene utilidades para manejo de errores, validación,
//! JWT, paginación y extractores de Axum.

pub mod errors;
pub mod extractors;
pub mod jwt;
pub mod pagination;
pub mod validation;
