//! Worker de sesión
//!
//! Cada scooter tiene exactamente un worker: una task de tokio que posee su
//! TripSession y serializa todas las mutaciones a través de un inbox mpsc.
//! El tick de simulación vive en el mismo `select!`, de modo que ningún tick
//! puede solaparse con un comando ni dispararse después de que un comando
//! haya sacado la sesión de Tracking: la transición invalida el tick de
//! forma síncrona, dentro de la misma task, antes de la siguiente iteración.
//!
//! Los comandos llegan en orden de recepción y no se coalescen.

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::environment::EngineConfig;
use crate::dto::events::ServerEvent;
use crate::models::scooter::{Direction, Location, ScooterId, ScooterSnapshot};
use crate::services::trip_session::{TickOutcome, TripSession};
use crate::utils::errors::EngineError;

/// Capacidad del inbox de comandos por sesión
const COMMAND_BUFFER: usize = 64;

/// Comandos que el gateway envía al worker de una sesión
#[derive(Debug)]
pub enum SessionCommand {
    Join {
        email: String,
        reply: oneshot::Sender<ScooterSnapshot>,
    },
    Leave,
    Start,
    Stop,
    Park {
        location: Option<Location>,
        battery: Option<f64>,
    },
    ToggleCharging,
    ChangeSpeed(f64),
    ChangeDirection(Direction),
    MoveTo(Location),
    SetBattery(f64),
    Snapshot {
        reply: oneshot::Sender<ScooterSnapshot>,
    },
}

/// Handle clonable hacia el worker de una sesión
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub scooter_id: ScooterId,
    tx: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    /// Encolar un comando. Falla solo si el worker ya terminó (sesión
    /// expulsada del registro).
    pub async fn send(&self, command: SessionCommand) -> Result<(), EngineError> {
        self.tx
            .send(command)
            .await
            .map_err(|_| EngineError::SessionClosed(self.scooter_id.clone()))
    }

    /// Adjuntar un rider y obtener el snapshot resultante
    pub async fn join(&self, email: String) -> Result<ScooterSnapshot, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::Join { email, reply }).await?;
        rx.await
            .map_err(|_| EngineError::SessionClosed(self.scooter_id.clone()))
    }

    /// Snapshot del estado actual sin mutarlo
    pub async fn snapshot(&self) -> Result<ScooterSnapshot, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::Snapshot { reply }).await?;
        rx.await
            .map_err(|_| EngineError::SessionClosed(self.scooter_id.clone()))
    }
}

/// Arrancar el worker de una sesión nueva en estado Idle
pub fn spawn_session(
    scooter_id: ScooterId,
    location: Location,
    config: EngineConfig,
    events_tx: broadcast::Sender<ServerEvent>,
) -> SessionHandle {
    let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
    let session = TripSession::new(scooter_id.clone(), location, config);
    tokio::spawn(run_session(session, rx, events_tx, config));
    SessionHandle { scooter_id, tx }
}

async fn run_session(
    mut session: TripSession,
    mut rx: mpsc::Receiver<SessionCommand>,
    events_tx: broadcast::Sender<ServerEvent>,
    config: EngineConfig,
) {
    let scooter_id = session.state().id.clone();
    info!(%scooter_id, "worker de sesión arrancado");

    let mut ticker = time::interval(config.tick_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            // los comandos tienen prioridad sobre el tick para que un
            // stop/park en ráfaga nunca vea un tick colado por delante
            biased;

            command = rx.recv() => {
                match command {
                    Some(command) => handle_command(&mut session, command, &events_tx, &mut ticker),
                    // el registro soltó el handle: teardown
                    None => break,
                }
            }

            _ = ticker.tick(), if session.is_tracking() => {
                match session.tick(config.tick_interval_secs) {
                    TickOutcome::Advanced { low_battery } => {
                        if low_battery {
                            debug!(%scooter_id, battery = session.state().battery_pct, "batería baja");
                        }
                    }
                    TickOutcome::BatteryExhausted(summary) => {
                        warn!(%scooter_id, "batería agotada, viaje terminado");
                        broadcast_status(&events_tx, &session);
                        let _ = events_tx.send(ServerEvent::TripEnded(summary));
                    }
                    TickOutcome::Skipped => {}
                }
            }
        }
    }

    info!(%scooter_id, "worker de sesión terminado");
}

fn handle_command(
    session: &mut TripSession,
    command: SessionCommand,
    events_tx: &broadcast::Sender<ServerEvent>,
    ticker: &mut time::Interval,
) {
    match command {
        SessionCommand::Join { email, reply } => {
            let snapshot = session.join(email);
            let _ = events_tx.send(ServerEvent::ScooterJoined(snapshot.clone()));
            let _ = reply.send(snapshot);
        }

        SessionCommand::Leave => {
            if session.leave().is_some() {
                broadcast_status(events_tx, session);
            }
        }

        SessionCommand::Start => {
            if session.start() {
                // cadencia limpia desde el arranque del viaje; sin esto el
                // interval dispararía inmediatamente los ticks acumulados
                ticker.reset();
                broadcast_status(events_tx, session);
            }
        }

        SessionCommand::Stop => {
            if let Some(avg) = session.stop() {
                debug!(scooter_id = %session.state().id, avg_speed_kmh = avg, "viaje detenido");
                broadcast_status(events_tx, session);
            }
        }

        SessionCommand::Park { location, battery } => {
            if let Some(summary) = session.park(location, battery) {
                broadcast_status(events_tx, session);
                let _ = events_tx.send(ServerEvent::TripEnded(summary));
            }
        }

        SessionCommand::ToggleCharging => {
            if session.toggle_charging().is_some() {
                broadcast_status(events_tx, session);
            }
        }

        SessionCommand::ChangeSpeed(speed) => {
            if let Some(accepted) = session.change_speed(speed) {
                let _ = events_tx.send(ServerEvent::ReceiveChangingSpeed {
                    scooter_id: session.state().id.clone(),
                    speed: accepted,
                });
            }
        }

        SessionCommand::ChangeDirection(direction) => {
            session.change_direction(direction);
        }

        SessionCommand::MoveTo(location) => {
            // sin eco: los observadores consultan snapshots, y un duplicado
            // exacto ya fue descartado por la sesión
            session.move_to(location);
        }

        SessionCommand::SetBattery(battery) => {
            if let Some(summary) = session.set_battery(battery) {
                broadcast_status(events_tx, session);
                let _ = events_tx.send(ServerEvent::TripEnded(summary));
            }
        }

        SessionCommand::Snapshot { reply } => {
            let _ = reply.send(session.snapshot());
        }
    }
}

fn broadcast_status(events_tx: &broadcast::Sender<ServerEvent>, session: &TripSession) {
    let _ = events_tx.send(ServerEvent::StatusChange {
        scooter_id: session.state().id.clone(),
        status: session.state().status.as_str().to_string(),
    });
}
