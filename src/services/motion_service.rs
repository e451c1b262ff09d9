//! Modelo de movimiento
//!
//! Dead reckoning puro: posición nueva a partir de velocidad, rumbo cardinal
//! y tiempo transcurrido sobre una esfera de radio terrestre medio, más el
//! drenaje de batería asociado. Sin estado propio.

use crate::config::environment::EngineConfig;
use crate::models::scooter::{Direction, Location};

/// Radio terrestre medio en metros (aproximación esférica)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Bajo este valor de cos(lat) el delta de longitud se trata como 0
/// en lugar de dividir hacia NaN/Infinity en los polos
const MIN_COS_LAT: f64 = 1e-12;

/// Proyectar la posición tras `elapsed_secs` a `speed_kmh` en la dirección
/// cardinal dada. Solo cambia el eje correspondiente a la dirección.
pub fn advance(
    location: Location,
    speed_kmh: f64,
    direction: Direction,
    elapsed_secs: f64,
) -> Location {
    let distance_m = speed_kmh * 1000.0 / 3600.0 * elapsed_secs;
    let delta_lat = (distance_m / EARTH_RADIUS_M).to_degrees();

    let cos_lat = location.lat.to_radians().cos();
    let delta_lon = if cos_lat.abs() < MIN_COS_LAT {
        0.0
    } else {
        (distance_m / (EARTH_RADIUS_M * cos_lat)).to_degrees()
    };

    match direction {
        Direction::N => Location {
            lat: location.lat + delta_lat,
            lon: location.lon,
        },
        Direction::S => Location {
            lat: location.lat - delta_lat,
            lon: location.lon,
        },
        Direction::E => Location {
            lat: location.lat,
            lon: location.lon + delta_lon,
        },
        Direction::W => Location {
            lat: location.lat,
            lon: location.lon - delta_lon,
        },
    }
}

/// Drenaje de batería para un tick: componente proporcional a la velocidad
/// más el consumo base. La batería solo drena, nunca regenera por movimiento.
pub fn drain_battery(speed_kmh: f64, elapsed_secs: f64, config: &EngineConfig) -> f64 {
    let drain = speed_kmh * config.drain_rate_per_kmh * elapsed_secs
        + config.idle_drain_per_second * elapsed_secs;
    drain.max(0.0)
}
