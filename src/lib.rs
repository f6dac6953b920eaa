//! Backend de despacho de taxis
//!
//! API REST sobre Axum + PostgreSQL: usuarios y roles, vehículos, viajes con
//! su máquina de estados, clientes, transacciones de caja, gastos, handovers
//! de vehículos y reportes.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
