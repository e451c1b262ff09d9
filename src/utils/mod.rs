//! Utilidades compartidas

pub mod errors;
