//! Controllers
//!
//! Mediadores entre la superficie de red y el motor de sesiones.

pub mod gateway_controller;

pub use gateway_controller::GatewayController;
