//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, metrics)
//!     → routing::resolve (method gate, path to Gemini URL)
//!     → POST: form.rs (input answer becomes a query string redirect)
//!     → GET: upstream fetch under deadline
//!     → dispatch.rs (status → page, redirect, passthrough or error)
//!     → error.rs (failures as plain-text HTTP errors)
//!     → Send to client
//! ```

pub mod dispatch;
pub mod error;
pub mod form;
pub mod server;

pub use dispatch::{dispatch, DispatchContext, Outcome};
pub use error::GatewayError;
pub use server::{AppState, GatewayServer, StartupError};
