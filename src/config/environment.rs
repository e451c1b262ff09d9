//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y las constantes de
//! simulación del motor. Las cinco copias del cliente original divergían en
//! las constantes de drenaje; aquí vive el único juego canónico, ajustable
//! por despliegue vía variables `SCOOTER_*`.

use std::env;
use std::time::Duration;

/// Constantes de simulación del motor (movimiento, batería, ticks, tarifa)
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Velocidad máxima almacenable en km/h; valores mayores se recortan
    pub max_speed_kmh: f64,
    /// Drenaje de batería por km/h de velocidad y segundo transcurrido
    pub drain_rate_per_kmh: f64,
    /// Drenaje base por segundo mientras el scooter avanza
    pub idle_drain_per_second: f64,
    /// Cadencia del tick de simulación en segundos (referencia: 1-3 s)
    pub tick_interval_secs: f64,
    /// Tarifa por minuto de viaje para el resumen de fin de viaje
    pub cost_per_minute: f64,
    /// Umbral de aviso de batería baja en porcentaje
    pub low_battery_pct: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_speed_kmh: 30.0,
            drain_rate_per_kmh: 0.002,
            idle_drain_per_second: 0.01,
            tick_interval_secs: 3.0,
            cost_per_minute: 20.0,
            low_battery_pct: 20.0,
        }
    }
}

impl EngineConfig {
    /// Cargar la configuración del motor desde el entorno, con los valores
    /// canónicos como fallback
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_speed_kmh: env_f64("SCOOTER_MAX_SPEED_KMH", defaults.max_speed_kmh),
            drain_rate_per_kmh: env_f64("SCOOTER_DRAIN_RATE_PER_KMH", defaults.drain_rate_per_kmh),
            idle_drain_per_second: env_f64(
                "SCOOTER_IDLE_DRAIN_PER_SECOND",
                defaults.idle_drain_per_second,
            ),
            tick_interval_secs: env_f64("SCOOTER_TICK_INTERVAL_SECS", defaults.tick_interval_secs),
            cost_per_minute: env_f64("SCOOTER_COST_PER_MINUTE", defaults.cost_per_minute),
            low_battery_pct: env_f64("SCOOTER_LOW_BATTERY_PCT", defaults.low_battery_pct),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(self.tick_interval_secs)
    }
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub cors_origins: Vec<String>,
    pub engine: EngineConfig,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8585".to_string())
                .parse()
                .expect("PORT must be a valid number"),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            engine: EngineConfig::from_env(),
        }
    }
}

impl EnvironmentConfig {
    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}
