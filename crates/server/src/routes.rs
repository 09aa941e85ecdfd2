use std::sync::Arc;
use std::time::Duration;

use aria_core::config::ServerConfig;
use axum::{http::HeaderValue, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

use crate::bootstrap::Application;
use crate::chat::{self, ChatService};
use crate::{erp, health};

pub fn router(app: &Application) -> Router {
    let chat_service =
        Arc::new(ChatService::new(app.agent_runtime.clone(), app.conversations.clone()));

    Router::new()
        .merge(health::router(app.db_pool.clone(), app.gateway.clone()))
        .merge(chat::router(chat_service))
        .merge(erp::router(
            app.gateway.clone(),
            Duration::from_secs(app.config.erp.timeout_secs),
        ))
        .layer(cors_layer(&app.config.server))
}

/// `*` anywhere in the list allows every origin.
pub fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if server.cors_allowed_origins.iter().any(|origin| origin.trim() == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = server
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(
                    event_name = "system.server.cors_origin_ignored",
                    origin = %origin,
                    error = %error,
                    "ignoring unparsable CORS origin"
                );
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}
