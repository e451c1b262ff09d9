//! Gateway de protocolo
//!
//! Traduce eventos entrantes del canal a comandos de sesión y localiza la
//! sesión destino en el registro. Es el único componente que ve la frontera
//! de red; el resto del motor solo conoce comandos y snapshots.
//!
//! El canal se asume con entrega al-menos-una-vez: los duplicados exactos
//! de `moving`/`speedchange` ya los descarta la propia sesión, y aquí un
//! `UnknownScooter` se devuelve al llamador como fallo recuperable en vez
//! de difundirse o tumbar nada.

use tracing::debug;
use validator::Validate;

use crate::dto::events::ClientEvent;
use crate::models::scooter::ScooterId;
use crate::services::session_registry::SessionRegistry;
use crate::services::session_worker::{SessionCommand, SessionHandle};
use crate::utils::errors::EngineError;

pub struct GatewayController {
    registry: SessionRegistry,
}

impl GatewayController {
    pub fn new(registry: SessionRegistry) -> Self {
        Self { registry }
    }

    /// Aplicar un evento entrante. Los eventos para una misma conexión se
    /// procesan secuencialmente (el handler del socket espera cada uno), y
    /// el inbox mpsc de la sesión conserva el orden de recepción.
    pub async fn handle_event(&self, event: ClientEvent) -> Result<(), EngineError> {
        debug!(scooter_id = %event.scooter_id(), "evento entrante");

        match event {
            ClientEvent::JoinScooter(data) => {
                data.validate()?;
                let handle = self
                    .registry
                    .get_or_create(&data.scooter_id, data.current_location)
                    .await;
                // el worker difunde scooterJoined a todos los suscriptores
                handle.join(data.email).await?;
                Ok(())
            }

            ClientEvent::LeaveScooter { scooter_id } => {
                self.send(&scooter_id, SessionCommand::Leave).await
            }

            ClientEvent::Moving {
                scooter_id,
                current_location,
                ..
            } => {
                self.send(&scooter_id, SessionCommand::MoveTo(current_location))
                    .await
            }

            ClientEvent::SpeedChange { scooter_id, speed } => {
                self.send(&scooter_id, SessionCommand::ChangeSpeed(speed))
                    .await
            }

            ClientEvent::BatteryChange { scooter_id, battery } => {
                self.send(&scooter_id, SessionCommand::SetBattery(battery))
                    .await
            }

            ClientEvent::DirectionChange {
                scooter_id,
                direction,
            } => {
                self.send(&scooter_id, SessionCommand::ChangeDirection(direction))
                    .await
            }

            ClientEvent::StartTrip { scooter_id } => {
                self.send(&scooter_id, SessionCommand::Start).await
            }

            ClientEvent::StopTrip { scooter_id } => {
                self.send(&scooter_id, SessionCommand::Stop).await
            }

            ClientEvent::Charging { scooter_id } => {
                self.send(&scooter_id, SessionCommand::ToggleCharging).await
            }

            ClientEvent::EndTrip {
                scooter_id,
                current_location,
                battery,
                ..
            } => {
                self.send(
                    &scooter_id,
                    SessionCommand::Park {
                        location: current_location,
                        battery,
                    },
                )
                .await
            }
        }
    }

    /// Localizar la sesión de un id ya registrado
    async fn lookup(&self, scooter_id: &ScooterId) -> Result<SessionHandle, EngineError> {
        self.registry
            .get(scooter_id)
            .await
            .ok_or_else(|| EngineError::UnknownScooter(scooter_id.clone()))
    }

    async fn send(
        &self,
        scooter_id: &ScooterId,
        command: SessionCommand,
    ) -> Result<(), EngineError> {
        self.lookup(scooter_id).await?.send(command).await
    }
}
