//! Tests de la superficie HTTP de inspección, conduciendo el router real
//! con `tower::ServiceExt::oneshot`.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use scooter_tracking::api;
use scooter_tracking::config::environment::EnvironmentConfig;
use scooter_tracking::controllers::gateway_controller::GatewayController;
use scooter_tracking::dto::events::{ClientEvent, JoinScooterData};
use scooter_tracking::state::AppState;

fn create_test_app() -> (Router, AppState) {
    let state = AppState::new(EnvironmentConfig::default());
    let app = Router::new()
        .nest("/api", api::create_api_router())
        .with_state(state.clone());
    (app, state)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&body).unwrap();
    (status, json)
}

#[tokio::test]
async fn test_health_check() {
    let (app, _state) = create_test_app();
    let (status, body) = get_json(app, "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "scooter-tracking");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_unknown_scooter_returns_not_found() {
    let (app, _state) = create_test_app();
    let (status, body) = get_json(app, "/api/scooters/fantasma").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_scooter_listing_and_snapshot() {
    let (app, state) = create_test_app();

    // sin scooters registrados
    let (status, body) = get_json(app.clone(), "/api/scooters").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);

    // registrar uno vía el gateway
    let gateway = GatewayController::new(state.registry.clone());
    gateway
        .handle_event(ClientEvent::JoinScooter(JoinScooterData {
            scooter_id: "scooter-1".to_string(),
            email: "rider@example.com".to_string(),
            current_location: None,
        }))
        .await
        .unwrap();

    let (status, body) = get_json(app.clone(), "/api/scooters").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["scooters"][0], "scooter-1");

    let (status, body) = get_json(app, "/api/scooters/scooter-1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["scooterId"], "scooter-1");
    assert_eq!(body["currentstatus"], "idle");
    assert_eq!(body["email"], "rider@example.com");
}
