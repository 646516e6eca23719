use std::path::Path;
use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{delete, get, post},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::AppState;
use crate::handlers;

fn cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = if cfg!(debug_assertions) {
        let dev_ports = [3000, 8000, 8080, 8081, 5173];
        dev_ports
            .iter()
            .flat_map(|port| {
                [
                    format!("http://localhost:{port}"),
                    format!("http://127.0.0.1:{port}"),
                ]
            })
            .filter_map(|origin| HeaderValue::from_str(&origin).ok())
            .collect()
    } else {
        // Production origins - add your domains here
        Vec::new()
    };

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_headers([header::CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
}

/// Setup the routes for the server and configure CORS and request tracing
pub fn setup_routes(state: Arc<AppState>, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/", get(handlers::activities::root))
        .route("/health", get(handlers::health::get))
        .route("/activities", get(handlers::activities::list))
        .route(
            "/activities/{activity}/signup",
            post(handlers::activities::signup),
        )
        .route(
            "/activities/{activity}/unregister",
            delete(handlers::activities::unregister),
        )
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
