//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos del motor de sesiones:
//! el estado autoritativo del scooter y las métricas de viaje.

pub mod scooter;
pub mod trip;
