//! Request routing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound HTTP request (method, path, query)
//!     → resolve.rs (method gate, favicon, namespace decode)
//!     → namespace.rs (gateway path → gemini URL)
//!     → ProxyTarget handed to the dispatcher
//!
//! While rendering:
//!     link / redirect reference
//!     → namespace.rs (resolve against current URL, re-encode as gateway path)
//! ```
//!
//! # Design Decisions
//! - The root host is fixed for the lifetime of the server
//! - Every other host lives under `/x/<host>/`
//! - Mapping is pure; no per-request state lives here

pub mod namespace;
pub mod resolve;

pub use namespace::{is_executable_scheme, GatewayPath, LinkTarget, Namespace, NamespaceError};
pub use resolve::{resolve, ProxyTarget, Route, RouteError};
