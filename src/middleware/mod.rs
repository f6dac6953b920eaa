//! Middleware del sistema
//!
//! Autenticación JWT y guards de autorización por ruta.

pub mod auth;

pub use auth::*;
