//! Modelo de Scooter
//!
//! Este módulo contiene el estado autoritativo de un scooter y los tipos
//! que lo componen. El estado es propiedad exclusiva de su TripSession;
//! nadie más lo muta directamente.

use serde::{Deserialize, Serialize};

/// Identificador opaco de un scooter, único por unidad
pub type ScooterId = String;

/// Posición en grados decimales (WGS84)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

impl Default for Location {
    fn default() -> Self {
        // Punto de partida de la flota (Estocolmo centro)
        Self {
            lat: 59.3293,
            lon: 18.0686,
        }
    }
}

/// Dirección cardinal del movimiento (sin rumbos intermedios)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    N,
    S,
    E,
    W,
}

/// Estado del scooter dentro del ciclo de vida del viaje
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScooterStatus {
    Idle,
    Tracking,
    Parked,
    Charging,
}

impl ScooterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScooterStatus::Idle => "idle",
            ScooterStatus::Tracking => "tracking",
            ScooterStatus::Parked => "parked",
            ScooterStatus::Charging => "charging",
        }
    }
}

/// Registro autoritativo de un scooter
#[derive(Debug, Clone)]
pub struct ScooterState {
    pub id: ScooterId,
    pub location: Location,
    pub speed_kmh: f64,
    pub battery_pct: f64,
    pub status: ScooterStatus,
    pub direction: Direction,
    pub rider_email: Option<String>,
}

impl ScooterState {
    /// Crear el estado de un scooter recién registrado (batería llena, sin rider)
    pub fn new(id: ScooterId, location: Location) -> Self {
        Self {
            id,
            location,
            speed_kmh: 0.0,
            battery_pct: 100.0,
            status: ScooterStatus::Idle,
            direction: Direction::N,
            rider_email: None,
        }
    }
}

/// Punto GeoJSON - los clientes existentes leen `coordinates[0]` = lon,
/// `coordinates[1]` = lat, así que el orden es [lon, lat]
#[derive(Debug, Clone, Serialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub point_type: &'static str,
    pub coordinates: [f64; 2],
}

impl From<Location> for GeoPoint {
    fn from(location: Location) -> Self {
        Self {
            point_type: "Point",
            coordinates: [location.lon, location.lat],
        }
    }
}

/// Snapshot completo del estado para enviar por el canal de eventos.
/// Los nombres de campo son los del protocolo original.
#[derive(Debug, Clone, Serialize)]
pub struct ScooterSnapshot {
    #[serde(rename = "scooterId")]
    pub scooter_id: ScooterId,
    pub email: Option<String>,
    pub current_location: GeoPoint,
    pub battery_level: f64,
    pub currentstatus: String,
    pub direction: Direction,
    pub speed: f64,
    pub low_battery: bool,
}

impl ScooterSnapshot {
    pub fn from_state(state: &ScooterState, low_battery_pct: f64) -> Self {
        Self {
            scooter_id: state.id.clone(),
            email: state.rider_email.clone(),
            current_location: state.location.into(),
            battery_level: state.battery_pct,
            currentstatus: state.status.as_str().to_string(),
            direction: state.direction,
            speed: state.speed_kmh,
            low_battery: state.battery_pct <= low_battery_pct,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_uses_protocol_field_names() {
        let state = ScooterState::new("scooter-7".to_string(), Location::default());
        let snapshot = ScooterSnapshot::from_state(&state, 20.0);
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["scooterId"], "scooter-7");
        assert_eq!(json["currentstatus"], "idle");
        assert_eq!(json["battery_level"], 100.0);
        assert_eq!(json["current_location"]["type"], "Point");
        // GeoJSON: [lon, lat]
        assert_eq!(json["current_location"]["coordinates"][0], 18.0686);
        assert_eq!(json["current_location"]["coordinates"][1], 59.3293);
        assert_eq!(json["low_battery"], false);
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ScooterStatus::Charging).unwrap(),
            "\"charging\""
        );
        assert_eq!(ScooterStatus::Tracking.as_str(), "tracking");
    }
}
