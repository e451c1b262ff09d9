//! Máquina de estados del viaje
//!
//! TripSession es el núcleo síncrono que gobierna el ciclo de vida de un
//! scooter (idle → tracking → parked/charging) y aplica el modelo de
//! movimiento y la integración de velocidad en cada tick. Es determinista y
//! no conoce el runtime: el worker asíncrono lo envuelve y serializa todas
//! las mutaciones.
//!
//! Las transiciones inválidas (p. ej. `start` durante la carga) se tragan
//! como no-op con un diagnóstico, nunca como fallo duro: los clientes pueden
//! operar sobre UI desactualizada.

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::config::environment::EngineConfig;
use crate::models::scooter::{
    Direction, Location, ScooterId, ScooterSnapshot, ScooterState, ScooterStatus,
};
use crate::models::trip::{TripMetrics, TripSummary};
use crate::services::motion_service;

/// Resultado de aplicar un tick de simulación
#[derive(Debug)]
pub enum TickOutcome {
    /// El tick aplicó movimiento, drenaje e integración
    Advanced { low_battery: bool },
    /// La batería llegó a 0 durante el tick: park forzado
    BatteryExhausted(TripSummary),
    /// Nada que aplicar (sin tracking, velocidad 0 o cargando)
    Skipped,
}

pub struct TripSession {
    state: ScooterState,
    metrics: TripMetrics,
    started_at: Option<DateTime<Utc>>,
    config: EngineConfig,
}

impl TripSession {
    pub fn new(id: ScooterId, location: Location, config: EngineConfig) -> Self {
        Self {
            state: ScooterState::new(id, location),
            metrics: TripMetrics::default(),
            started_at: None,
            config,
        }
    }

    pub fn state(&self) -> &ScooterState {
        &self.state
    }

    pub fn snapshot(&self) -> ScooterSnapshot {
        ScooterSnapshot::from_state(&self.state, self.config.low_battery_pct)
    }

    pub fn is_tracking(&self) -> bool {
        self.state.status == ScooterStatus::Tracking
    }

    /// Media de velocidad ponderada por tiempo del viaje en curso (o del
    /// último viaje si no hay uno activo). 0 sin tiempo rastreado.
    pub fn average_speed_kmh(&self) -> f64 {
        self.metrics.average_speed_kmh()
    }

    /// Adjuntar un rider a la sesión. Re-join sobre una sesión existente
    /// rehidrata: no resetea ni posición ni batería.
    pub fn join(&mut self, email: String) -> ScooterSnapshot {
        self.state.rider_email = Some(email);
        self.snapshot()
    }

    /// Soltar al rider sin destruir el estado de la sesión. Si había un
    /// viaje activo queda aparcado; el estado sobrevive para un re-join.
    pub fn leave(&mut self) -> Option<ScooterStatus> {
        self.state.rider_email = None;
        if self.state.status == ScooterStatus::Tracking {
            debug!(scooter_id = %self.state.id, "rider se fue durante el viaje, aparcando");
            self.state.status = ScooterStatus::Parked;
            return Some(ScooterStatus::Parked);
        }
        None
    }

    /// Transición Idle/Parked → Tracking. Resetea los acumuladores del viaje
    /// y fija `started_at`. Devuelve `false` (no-op) si el scooter está
    /// cargando, no hay rider, o ya está en tracking.
    pub fn start(&mut self) -> bool {
        if self.state.status == ScooterStatus::Charging {
            debug!(scooter_id = %self.state.id, "start ignorado: el scooter está cargando");
            return false;
        }
        if self.state.rider_email.is_none() {
            debug!(scooter_id = %self.state.id, "start ignorado: sin rider");
            return false;
        }
        if self.state.status == ScooterStatus::Tracking {
            return false;
        }

        self.metrics.reset();
        self.started_at = Some(Utc::now());
        self.state.status = ScooterStatus::Tracking;
        true
    }

    /// Un tick de simulación: movimiento + drenaje + integración, o nada.
    /// El tick se aplica entero o se salta; nunca parcialmente.
    pub fn tick(&mut self, elapsed_secs: f64) -> TickOutcome {
        if self.state.status != ScooterStatus::Tracking || self.state.speed_kmh <= 0.0 {
            return TickOutcome::Skipped;
        }

        self.state.location = motion_service::advance(
            self.state.location,
            self.state.speed_kmh,
            self.state.direction,
            elapsed_secs,
        );
        let drain = motion_service::drain_battery(self.state.speed_kmh, elapsed_secs, &self.config);
        self.state.battery_pct = (self.state.battery_pct - drain).max(0.0);
        self.metrics.accumulate(self.state.speed_kmh, elapsed_secs);

        if self.state.battery_pct <= 0.0 {
            debug!(scooter_id = %self.state.id, "batería agotada, park forzado");
            return TickOutcome::BatteryExhausted(self.finish_trip());
        }

        TickOutcome::Advanced {
            low_battery: self.state.battery_pct <= self.config.low_battery_pct,
        }
    }

    /// Tracking → Parked sin resumen: expone la media del viaje y cancela
    /// el tick. No-op si no había tracking.
    pub fn stop(&mut self) -> Option<f64> {
        if self.state.status != ScooterStatus::Tracking {
            return None;
        }
        self.state.status = ScooterStatus::Parked;
        Some(self.metrics.average_speed_kmh())
    }

    /// Fin de viaje explícito (evento `endTrip`). Acepta overrides finales
    /// de posición y batería del cliente y emite el resumen del viaje.
    /// No-op si ya está aparcado o cargando.
    pub fn park(&mut self, location: Option<Location>, battery: Option<f64>) -> Option<TripSummary> {
        match self.state.status {
            ScooterStatus::Parked => {
                debug!(scooter_id = %self.state.id, "park duplicado ignorado");
                return None;
            }
            ScooterStatus::Charging => {
                debug!(scooter_id = %self.state.id, "park ignorado: el scooter está cargando");
                return None;
            }
            ScooterStatus::Tracking | ScooterStatus::Idle => {}
        }

        if let Some(location) = location {
            self.state.location = location;
        }
        if let Some(battery) = battery {
            self.state.battery_pct = battery.clamp(0.0, 100.0);
        }
        Some(self.finish_trip())
    }

    /// Toggle de carga: Idle/Parked → Charging (velocidad forzada a 0) y
    /// Charging → estado de reposo. No permitido durante tracking.
    pub fn toggle_charging(&mut self) -> Option<ScooterStatus> {
        match self.state.status {
            ScooterStatus::Tracking => {
                debug!(scooter_id = %self.state.id, "charging ignorado durante tracking");
                None
            }
            ScooterStatus::Charging => {
                let resumed = if self.state.rider_email.is_some() {
                    ScooterStatus::Parked
                } else {
                    ScooterStatus::Idle
                };
                self.state.status = resumed;
                Some(resumed)
            }
            ScooterStatus::Idle | ScooterStatus::Parked => {
                self.state.status = ScooterStatus::Charging;
                self.state.speed_kmh = 0.0;
                Some(ScooterStatus::Charging)
            }
        }
    }

    /// Actualizar la velocidad, recortada a [0, max]. Devuelve `None` si el
    /// valor almacenado no cambió (supresión de duplicados). Durante la
    /// carga el valor se acepta pero no tiene efecto de movimiento.
    pub fn change_speed(&mut self, speed_kmh: f64) -> Option<f64> {
        if !speed_kmh.is_finite() {
            debug!(scooter_id = %self.state.id, "speedchange ignorado: valor no finito");
            return None;
        }
        let clamped = speed_kmh.clamp(0.0, self.config.max_speed_kmh);
        if (clamped - self.state.speed_kmh).abs() < f64::EPSILON {
            return None;
        }
        self.state.speed_kmh = clamped;
        Some(clamped)
    }

    pub fn change_direction(&mut self, direction: Direction) {
        self.state.direction = direction;
    }

    /// Override directo de posición (evento `moving`, edición manual del
    /// cliente). Rechazado durante la carga; duplicado exacto es no-op.
    pub fn move_to(&mut self, location: Location) -> bool {
        if self.state.status == ScooterStatus::Charging {
            debug!(scooter_id = %self.state.id, "moving ignorado: el scooter está cargando");
            return false;
        }
        if location == self.state.location {
            return false;
        }
        self.state.location = location;
        true
    }

    /// Override directo de batería, recortado a [0, 100]. Si la deja a 0 en
    /// pleno tracking, fuerza el park y devuelve el resumen.
    pub fn set_battery(&mut self, battery_pct: f64) -> Option<TripSummary> {
        if !battery_pct.is_finite() {
            return None;
        }
        self.state.battery_pct = battery_pct.clamp(0.0, 100.0);
        if self.state.battery_pct <= 0.0 && self.state.status == ScooterStatus::Tracking {
            debug!(scooter_id = %self.state.id, "batería puesta a 0 durante el viaje, park forzado");
            return Some(self.finish_trip());
        }
        None
    }

    /// Cerrar el viaje en curso: resumen con media ponderada, distancia,
    /// duración de pared y coste; el estado pasa a Parked y `started_at`
    /// se limpia. El worker deja de programar ticks al instante porque el
    /// estado ya no es Tracking.
    fn finish_trip(&mut self) -> TripSummary {
        let ended_at = Utc::now();
        let duration_seconds = self
            .started_at
            .map(|t| (ended_at - t).num_seconds().max(0))
            .unwrap_or(0);
        let cost = duration_seconds as f64 / 60.0 * self.config.cost_per_minute;

        self.state.status = ScooterStatus::Parked;
        self.started_at = None;

        TripSummary {
            trip_id: Uuid::new_v4(),
            scooter_id: self.state.id.clone(),
            email: self.state.rider_email.clone(),
            distance_km: self.metrics.accumulated_distance_km,
            avg_speed_kmh: self.metrics.average_speed_kmh(),
            duration_seconds,
            cost,
            ended_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    fn session() -> TripSession {
        TripSession::new(
            "scooter-1".to_string(),
            Location::default(),
            EngineConfig::default(),
        )
    }

    fn riding_session() -> TripSession {
        let mut s = session();
        s.join("rider@example.com".to_string());
        s
    }

    #[test]
    fn change_speed_clamps_to_max() {
        let mut s = session();
        assert_eq!(s.change_speed(45.0), Some(30.0));
        assert_eq!(s.state().speed_kmh, 30.0);
    }

    #[test]
    fn change_speed_clamps_negative_to_zero() {
        let mut s = session();
        s.change_speed(10.0);
        assert_eq!(s.change_speed(-5.0), Some(0.0));
    }

    #[test]
    fn duplicate_speed_change_is_suppressed() {
        let mut s = session();
        assert_eq!(s.change_speed(20.0), Some(20.0));
        assert_eq!(s.change_speed(20.0), None);
    }

    #[test]
    fn start_requires_a_rider() {
        let mut s = session();
        assert!(!s.start());
        assert_eq!(s.state().status, ScooterStatus::Idle);
    }

    #[test]
    fn start_while_charging_is_a_noop() {
        let mut s = riding_session();
        s.toggle_charging();
        assert_eq!(s.state().status, ScooterStatus::Charging);
        assert!(!s.start());
        assert_eq!(s.state().status, ScooterStatus::Charging);
        assert!(!s.is_tracking());
    }

    #[test]
    fn average_is_zero_right_after_start() {
        let mut s = riding_session();
        assert!(s.start());
        assert_eq!(s.average_speed_kmh(), 0.0);
        assert_eq!(s.average_speed_kmh(), 0.0);
    }

    #[test]
    fn constant_speed_trip_average_equals_instantaneous() {
        let mut s = riding_session();
        s.change_speed(18.0);
        s.change_direction(Direction::N);
        assert!(s.start());
        for _ in 0..3 {
            assert!(matches!(s.tick(3.0), TickOutcome::Advanced { .. }));
        }
        let avg = s.stop().expect("stop tras tracking devuelve la media");
        assert!((avg - 18.0).abs() < TOL);
        assert_eq!(s.state().status, ScooterStatus::Parked);
    }

    #[test]
    fn tick_moves_exactly_one_axis() {
        let mut s = riding_session();
        s.change_speed(18.0);
        s.change_direction(Direction::E);
        s.start();
        let before = s.state().location;
        s.tick(3.0);
        let after = s.state().location;
        assert!((after.lat - before.lat).abs() < TOL);
        assert!(after.lon > before.lon);
    }

    #[test]
    fn tick_without_tracking_is_skipped() {
        let mut s = riding_session();
        s.change_speed(18.0);
        assert!(matches!(s.tick(3.0), TickOutcome::Skipped));
    }

    #[test]
    fn tick_with_zero_speed_is_skipped() {
        let mut s = riding_session();
        s.start();
        assert!(matches!(s.tick(3.0), TickOutcome::Skipped));
    }

    #[test]
    fn battery_exhaustion_forces_park() {
        let config = EngineConfig {
            idle_drain_per_second: 1.0,
            ..EngineConfig::default()
        };
        let mut s = TripSession::new("scooter-2".to_string(), Location::default(), config);
        s.join("rider@example.com".to_string());
        s.set_battery(0.5);
        s.change_speed(5.0);
        s.start();

        // drenaje de un tick ≈ 1.01% > 0.5% restante
        let outcome = s.tick(1.0);
        let summary = match outcome {
            TickOutcome::BatteryExhausted(summary) => summary,
            other => panic!("se esperaba park forzado, fue {:?}", other),
        };
        assert_eq!(s.state().battery_pct, 0.0);
        assert_eq!(s.state().status, ScooterStatus::Parked);
        assert_eq!(summary.scooter_id, "scooter-2");

        // sin más ticks: la sesión ya no está en tracking
        assert!(matches!(s.tick(1.0), TickOutcome::Skipped));
    }

    #[test]
    fn battery_never_leaves_bounds() {
        let mut s = riding_session();
        s.set_battery(150.0);
        assert_eq!(s.state().battery_pct, 100.0);
        s.set_battery(-3.0);
        assert_eq!(s.state().battery_pct, 0.0);
    }

    #[test]
    fn metrics_reset_on_every_restart() {
        let mut s = riding_session();
        s.change_speed(18.0);
        s.start();
        s.tick(3.0);
        s.stop();
        assert!(s.average_speed_kmh() > 0.0);

        s.start();
        assert_eq!(s.average_speed_kmh(), 0.0);
    }

    #[test]
    fn charging_forces_speed_to_zero_and_suppresses_motion() {
        let mut s = riding_session();
        s.change_speed(25.0);
        assert_eq!(s.toggle_charging(), Some(ScooterStatus::Charging));
        assert_eq!(s.state().speed_kmh, 0.0);

        // la velocidad se acepta durante la carga pero no mueve nada
        assert_eq!(s.change_speed(15.0), Some(15.0));
        let before = s.state().location;
        assert!(matches!(s.tick(3.0), TickOutcome::Skipped));
        assert!(!s.move_to(Location { lat: 1.0, lon: 1.0 }));
        assert_eq!(s.state().location, before);

        // toggle de vuelta: con rider presente vuelve a Parked
        assert_eq!(s.toggle_charging(), Some(ScooterStatus::Parked));
    }

    #[test]
    fn charging_is_rejected_during_tracking() {
        let mut s = riding_session();
        s.change_speed(10.0);
        s.start();
        assert_eq!(s.toggle_charging(), None);
        assert_eq!(s.state().status, ScooterStatus::Tracking);
    }

    #[test]
    fn join_then_leave_preserves_state_for_rejoin() {
        let mut s = riding_session();
        s.change_speed(10.0);
        s.move_to(Location { lat: 57.7, lon: 11.97 });
        s.set_battery(64.0);
        let location = s.state().location;
        let battery = s.state().battery_pct;
        let status = s.state().status;

        s.leave();
        assert!(s.state().rider_email.is_none());
        assert_eq!(s.state().location, location);
        assert_eq!(s.state().battery_pct, battery);
        assert_eq!(s.state().status, status);

        let snapshot = s.join("rider@example.com".to_string());
        assert_eq!(snapshot.battery_level, battery);
    }

    #[test]
    fn duplicate_move_is_suppressed() {
        let mut s = riding_session();
        let target = Location { lat: 59.5, lon: 18.1 };
        assert!(s.move_to(target));
        assert!(!s.move_to(target));
    }

    #[test]
    fn park_emits_summary_with_trip_totals() {
        let mut s = riding_session();
        s.change_speed(18.0);
        s.change_direction(Direction::N);
        s.start();
        for _ in 0..3 {
            s.tick(3.0);
        }
        let summary = s.park(None, Some(80.0)).expect("park con viaje activo");
        assert!((summary.avg_speed_kmh - 18.0).abs() < TOL);
        // 18 km/h durante 9 s = 45 m
        assert!((summary.distance_km - 0.045).abs() < TOL);
        assert_eq!(s.state().battery_pct, 80.0);
        assert_eq!(s.state().status, ScooterStatus::Parked);

        // park duplicado: no-op, sin segundo resumen
        assert!(s.park(None, None).is_none());
    }
}
