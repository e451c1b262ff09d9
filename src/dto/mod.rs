//! DTOs del protocolo

pub mod events;
