//! DTOs del canal de eventos
//!
//! Eventos entrantes (cliente → motor) y salientes (motor → clientes) con
//! los nombres de campo y de evento del protocolo original. El framing es
//! `{"event": "...", "data": {...}}` sobre el canal.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::scooter::{Direction, Location, ScooterId, ScooterSnapshot};
use crate::models::trip::TripSummary;

/// Payload de `joinScooter`. La posición es opcional: solo se usa si el
/// scooter aún no existe en el registro (un re-join nunca resetea posición
/// ni batería).
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct JoinScooterData {
    #[serde(rename = "scooterId")]
    pub scooter_id: ScooterId,
    #[validate(email)]
    pub email: String,
    pub current_location: Option<Location>,
}

/// Eventos entrantes del cliente
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "joinScooter")]
    JoinScooter(JoinScooterData),

    #[serde(rename = "leaveScooter")]
    LeaveScooter {
        #[serde(rename = "scooterId")]
        scooter_id: ScooterId,
    },

    /// Override directo de posición (edición manual en el cliente)
    #[serde(rename = "moving")]
    Moving {
        #[serde(rename = "scooterId")]
        scooter_id: ScooterId,
        current_location: Location,
        email: Option<String>,
    },

    #[serde(rename = "speedchange")]
    SpeedChange {
        #[serde(rename = "scooterId")]
        scooter_id: ScooterId,
        speed: f64,
    },

    #[serde(rename = "batterychange")]
    BatteryChange {
        #[serde(rename = "scooterId")]
        scooter_id: ScooterId,
        battery: f64,
    },

    #[serde(rename = "directionchange")]
    DirectionChange {
        #[serde(rename = "scooterId")]
        scooter_id: ScooterId,
        direction: Direction,
    },

    #[serde(rename = "startTrip")]
    StartTrip {
        #[serde(rename = "scooterId")]
        scooter_id: ScooterId,
    },

    /// Detener el tracking sin cerrar el viaje con resumen (botón Stop)
    #[serde(rename = "stopTrip")]
    StopTrip {
        #[serde(rename = "scooterId")]
        scooter_id: ScooterId,
    },

    /// Toggle de carga
    #[serde(rename = "charging")]
    Charging {
        #[serde(rename = "scooterId")]
        scooter_id: ScooterId,
    },

    #[serde(rename = "endTrip")]
    EndTrip {
        #[serde(rename = "scooterId")]
        scooter_id: ScooterId,
        email: Option<String>,
        current_location: Option<Location>,
        battery: Option<f64>,
    },
}

impl ClientEvent {
    /// Id del scooter al que va dirigido el evento
    pub fn scooter_id(&self) -> &ScooterId {
        match self {
            ClientEvent::JoinScooter(data) => &data.scooter_id,
            ClientEvent::LeaveScooter { scooter_id }
            | ClientEvent::Moving { scooter_id, .. }
            | ClientEvent::SpeedChange { scooter_id, .. }
            | ClientEvent::BatteryChange { scooter_id, .. }
            | ClientEvent::DirectionChange { scooter_id, .. }
            | ClientEvent::StartTrip { scooter_id }
            | ClientEvent::StopTrip { scooter_id }
            | ClientEvent::Charging { scooter_id }
            | ClientEvent::EndTrip { scooter_id, .. } => scooter_id,
        }
    }
}

/// Eventos salientes hacia los clientes suscritos. `Error` nunca se
/// difunde: va solo a la conexión que originó el fallo.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "scooterJoined")]
    ScooterJoined(ScooterSnapshot),

    #[serde(rename = "statusChange")]
    StatusChange {
        #[serde(rename = "scooterId")]
        scooter_id: ScooterId,
        status: String,
    },

    /// Eco de un cambio de velocidad aceptado, a todos los suscriptores
    /// incluido el emisor
    #[serde(rename = "receivechangingspeed")]
    ReceiveChangingSpeed {
        #[serde(rename = "scooterId")]
        scooter_id: ScooterId,
        speed: f64,
    },

    #[serde(rename = "tripEnded")]
    TripEnded(TripSummary),

    #[serde(rename = "error")]
    Error { code: String, message: String },
}
