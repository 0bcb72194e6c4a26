//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, request span)
//!     → handlers.rs (POST /validate, GET /healthz, GET /status)
//!     → admission::review (verdict)
//!     → Send to API server
//! ```

pub mod handlers;
pub mod request;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, WebhookServer};
