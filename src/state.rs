//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum: el registro de sesiones y el canal de
//! difusión de eventos salientes.

use tokio::sync::broadcast;

use crate::config::environment::EnvironmentConfig;
use crate::dto::events::ServerEvent;
use crate::services::session_registry::SessionRegistry;

/// Capacidad del canal de difusión; los suscriptores lentos se saltan
/// eventos (Lagged) en vez de bloquear al motor
const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub registry: SessionRegistry,
    pub events_tx: broadcast::Sender<ServerEvent>,
}

impl AppState {
    pub fn new(config: EnvironmentConfig) -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let registry = SessionRegistry::new(config.engine, events_tx.clone());
        Self {
            config,
            registry,
            events_tx,
        }
    }
}
