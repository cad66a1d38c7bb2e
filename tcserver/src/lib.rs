//! HTTP surface for tickerchat.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use tcserver::{AppState, HeaderAuthProvider, router};
//! use tickerchat::{ChatRuntime, ServerKeys};
//!
//! let state = AppState::new(
//!     Arc::new(ChatRuntime::new(ServerKeys::default())),
//!     Arc::new(HeaderAuthProvider::default()),
//! );
//! let _app = router(state);
//! ```

mod auth;
mod config;
mod error;
mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tickerchat::ChatRuntime;

pub use auth::{AuthProvider, HeaderAuthProvider, USER_ID_HEADER};
pub use config::{DEFAULT_INFERENCE_URL, ServerConfig};
pub use error::{ApiError, INTERNAL_ERROR_MESSAGE};
pub use routes::{ChatPayload, ClientMessage, DeleteParams, KeysResponse};

#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<ChatRuntime>,
    pub auth: Arc<dyn AuthProvider>,
}

impl AppState {
    pub fn new(runtime: Arc<ChatRuntime>, auth: Arc<dyn AuthProvider>) -> Self {
        Self { runtime, auth }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/chat",
            post(routes::post_chat).delete(routes::delete_chat),
        )
        .route("/api/keys", get(routes::get_keys))
        .with_state(state)
}
