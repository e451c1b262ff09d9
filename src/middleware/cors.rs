//! Middleware de CORS
//!
//! Este módulo maneja la configuración de CORS para permitir
//! requests desde diferentes orígenes.

use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::CorsLayer;

/// Crear middleware de CORS configurado para desarrollo
/// NOTA: Permite cualquier origen - solo para desarrollo
pub fn cors_middleware() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Elegir la capa de CORS según la configuración: wildcard ("*") usa la
/// capa permisiva, cualquier otra lista restringe a esos orígenes
pub fn cors_layer_from_config(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin == "*") {
        cors_middleware()
    } else {
        cors_middleware_with_origins(origins.to_vec())
    }
}

/// Crear middleware de CORS con orígenes específicos
pub fn cors_middleware_with_origins(origins: Vec<String>) -> CorsLayer {
    let mut cors = CorsLayer::new();

    for origin in origins {
        if let Ok(header_value) = HeaderValue::from_str(&origin) {
            cors = cors.allow_origin(header_value);
        }
    }

    cors.allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("accept"),
            HeaderName::from_static("origin"),
        ])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_selects_the_permissive_layer() {
        // construye sin panics para ambas ramas
        let _ = cors_layer_from_config(&["*".to_string()]);
        let _ = cors_layer_from_config(&[]);
    }

    #[test]
    fn explicit_origins_build_a_restricted_layer() {
        let origins = vec![
            "http://localhost:3000".to_string(),
            "https://app.example.com".to_string(),
        ];
        let _ = cors_layer_from_config(&origins);
        // orígenes malformados se descartan sin panic
        let _ = cors_middleware_with_origins(vec!["\u{0}invalid".to_string()]);
    }
}
