//! Services module
//!
//! Este módulo contiene la lógica de negocio del motor de sesiones: el
//! modelo de movimiento, la máquina de estados del viaje, el worker que la
//! serializa y el registro proceso-global de sesiones.

pub mod motion_service;
pub mod session_registry;
pub mod session_worker;
pub mod trip_session;

pub use session_registry::SessionRegistry;
pub use session_worker::{SessionCommand, SessionHandle};
pub use trip_session::{TickOutcome, TripSession};
