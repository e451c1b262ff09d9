//! Métricas de viaje
//!
//! Acumuladores de un viaje en curso (distancia, integral de velocidad,
//! segundos rastreados) y el resumen que se emite al terminar. La media de
//! velocidad es ponderada por tiempo: Σ(v_i × Δt_i) / Σ(Δt_i).

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::scooter::ScooterId;

/// Acumuladores del viaje actual. Se resetean en cada transición a Tracking
/// y se leen (sin resetear) en stop/park.
#[derive(Debug, Clone, Default)]
pub struct TripMetrics {
    pub accumulated_distance_km: f64,
    pub speed_integral: f64,
    pub elapsed_tracked_seconds: f64,
}

impl TripMetrics {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Un tick de integración: suma `v·Δt` a la integral y `Δt` al tiempo
    /// rastreado. La distancia se deriva de la misma velocidad constante
    /// durante el tick.
    pub fn accumulate(&mut self, speed_kmh: f64, elapsed_secs: f64) {
        self.speed_integral += speed_kmh * elapsed_secs;
        self.elapsed_tracked_seconds += elapsed_secs;
        self.accumulated_distance_km += speed_kmh * elapsed_secs / 3600.0;
    }

    /// Media ponderada por tiempo. Es pura: se puede consultar en medio del
    /// viaje (display en vivo) o al final (resumen) sin mutar nada.
    pub fn average_speed_kmh(&self) -> f64 {
        if self.elapsed_tracked_seconds > 0.0 {
            self.speed_integral / self.elapsed_tracked_seconds
        } else {
            0.0
        }
    }
}

/// Registro de fin de viaje que se emite en park/endTrip/batería agotada
#[derive(Debug, Clone, Serialize)]
pub struct TripSummary {
    pub trip_id: Uuid,
    #[serde(rename = "scooterId")]
    pub scooter_id: ScooterId,
    pub email: Option<String>,
    pub distance_km: f64,
    pub avg_speed_kmh: f64,
    pub duration_seconds: i64,
    pub cost: f64,
    pub ended_at: DateTime<Utc>,
}
