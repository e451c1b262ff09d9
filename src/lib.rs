//! Motor de sesiones de scooter
//!
//! Simula el ciclo de vida de viaje de un scooter (idle → tracking →
//! parked/charging) y mantiene el registro del servidor sincronizado con
//! los clientes observadores a través de un canal de eventos.

pub mod api;
pub mod config;
pub mod controllers;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;
