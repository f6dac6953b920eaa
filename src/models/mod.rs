//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean exactamente
//! al schema PostgreSQL (`sql/schema.sql`).

pub mod auth;
pub mod customer;
pub mod expense;
pub mod handover;
pub mod report;
pub mod transaction;
pub mod trip;
pub mod user;
pub mod vehicle;
