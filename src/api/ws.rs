//! Endpoint WebSocket del canal de eventos
//!
//! Superficie concreta del canal abstracto: cada conexión recibe la
//! difusión completa de eventos del motor (los clientes filtran por
//! scooterId, como hacía el cliente original) y envía eventos entrantes que
//! el gateway traduce a comandos. Los errores recuperables vuelven solo a
//! la conexión que los originó.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::StreamExt;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::controllers::gateway_controller::GatewayController;
use crate::dto::events::{ClientEvent, ServerEvent};
use crate::state::AppState;
use crate::utils::errors::EngineError;

pub async fn ws_handler(
    State(app_state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(mut socket: WebSocket, app_state: AppState) {
    info!("cliente conectado al canal de eventos");
    let mut events_rx = app_state.events_tx.subscribe();
    let gateway = GatewayController::new(app_state.registry.clone());

    loop {
        tokio::select! {
            outbound = events_rx.recv() => {
                match outbound {
                    Ok(event) => {
                        if send_event(&mut socket, &event).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "suscriptor lento, eventos saltados");
                        continue;
                    }
                    Err(_) => break,
                }
            }

            inbound = socket.next() => {
                match inbound {
                    Some(Ok(Message::Text(raw))) => {
                        // secuencial: se espera cada evento antes de leer el
                        // siguiente, preservando el orden de recepción
                        if let Some(error) = apply_inbound(&gateway, &raw).await {
                            if send_event(&mut socket, &error).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        if socket.send(Message::Pong(payload)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) => break,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        warn!(?err, "error de websocket");
                        break;
                    }
                    None => break,
                }
            }
        }
    }
    info!("cliente desconectado del canal de eventos");
}

/// Parsear y aplicar un evento entrante; devuelve el evento de error a
/// responder directamente, si lo hay
async fn apply_inbound(gateway: &GatewayController, raw: &str) -> Option<ServerEvent> {
    let event: ClientEvent = match serde_json::from_str(raw) {
        Ok(event) => event,
        Err(err) => {
            let error = EngineError::MalformedEvent(err.to_string());
            return Some(ServerEvent::Error {
                code: error.code().to_string(),
                message: error.to_string(),
            });
        }
    };

    match gateway.handle_event(event).await {
        Ok(()) => None,
        Err(error) => Some(ServerEvent::Error {
            code: error.code().to_string(),
            message: error.to_string(),
        }),
    }
}

async fn send_event(socket: &mut WebSocket, event: &ServerEvent) -> Result<(), axum::Error> {
    match serde_json::to_string(event) {
        Ok(payload) => socket.send(Message::Text(payload)).await,
        Err(err) => {
            warn!(?err, "no se pudo serializar el evento saliente");
            Ok(())
        }
    }
}
