//! Gemini-to-HTTP gateway library.
//!
//! Serves one Gemini capsule, and anything it links to, as HTML over HTTP.
//!
//! # Architecture Overview
//!
//! ```text
//!     Browser request
//!     ───────────────▶ http::server ──▶ routing ──▶ gemini::client ──▶ Gemini host
//!                                                        │
//!     Browser response                                   ▼
//!     ◀─────────────── http::dispatch ◀── render ◀── gemini::response
//! ```
//!
//! Cross-cutting: `config`, `observability`, `resilience`, `lifecycle`.

// Core subsystems
pub mod config;
pub mod gemini;
pub mod http;
pub mod render;
pub mod routing;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::schema::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
