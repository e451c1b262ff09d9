//! Registro de sesiones
//!
//! Mapa proceso-global de scooter → sesión. Es la única estructura mutada
//! por múltiples llamadores concurrentes; todo lo demás es propiedad de su
//! worker. Las sesiones se crean en el primer join y sobreviven a park y
//! leave para permitir re-joins; `remove` existe para el teardown.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tracing::info;

use crate::config::environment::EngineConfig;
use crate::dto::events::ServerEvent;
use crate::models::scooter::{Location, ScooterId};
use crate::services::session_worker::{spawn_session, SessionHandle};

#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<ScooterId, SessionHandle>>>,
    config: EngineConfig,
    events_tx: broadcast::Sender<ServerEvent>,
}

impl SessionRegistry {
    pub fn new(config: EngineConfig, events_tx: broadcast::Sender<ServerEvent>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            config,
            events_tx,
        }
    }

    /// Sesión existente para un id, si la hay
    pub async fn get(&self, scooter_id: &ScooterId) -> Option<SessionHandle> {
        self.sessions.read().await.get(scooter_id).cloned()
    }

    /// Devolver la sesión del scooter o crear una nueva en Idle. Dos joins
    /// concurrentes para el mismo id resuelven a la misma sesión: la
    /// creación ocurre bajo el write lock vía `entry`.
    pub async fn get_or_create(
        &self,
        scooter_id: &ScooterId,
        location: Option<Location>,
    ) -> SessionHandle {
        if let Some(handle) = self.get(scooter_id).await {
            return handle;
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(scooter_id.clone())
            .or_insert_with(|| {
                info!(%scooter_id, "registrando scooter nuevo");
                spawn_session(
                    scooter_id.clone(),
                    location.unwrap_or_default(),
                    self.config,
                    self.events_tx.clone(),
                )
            })
            .clone()
    }

    /// Expulsar una sesión. Soltar el handle cierra el inbox del worker y
    /// la task termina sola. No se usa en el fin normal de un viaje.
    pub async fn remove(&self, scooter_id: &ScooterId) -> bool {
        self.sessions.write().await.remove(scooter_id).is_some()
    }

    /// Ids actualmente registrados
    pub async fn ids(&self) -> Vec<ScooterId> {
        self.sessions.read().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
