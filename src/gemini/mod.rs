//! Gemini protocol subsystem.
//!
//! # Data Flow
//! ```text
//! Url (gemini://host/path?query)
//!     → client.rs (TCP connect, TLS handshake, request line)
//!     → response.rs (status + meta header, buffered body)
//!     → status.rs (behavioral class of the status code)
//!     → mime.rs (media type of a 2x meta line)
//!     → line.rs (body decoded into typed gemtext lines)
//! ```
//!
//! # Design Decisions
//! - One connection per request, closed when the body is dropped
//! - Server certificates are never validated
//! - Bodies stay streaming readers; nothing here buffers a whole document

pub mod client;
pub mod line;
pub mod mime;
pub mod response;
pub mod status;

pub use client::{GeminiClient, TransportError, Upstream};
pub use line::{Line, LineClassifier, LineReader, MAX_LINE_LEN};
pub use mime::MediaType;
pub use response::{BodyReader, ProtocolError, Response};
pub use status::{Status, StatusKind};

/// URL scheme of the proxied protocol.
pub const GEMINI_SCHEME: &str = "gemini";

/// Port used when an identifier does not name one.
pub const DEFAULT_PORT: u16 = 1965;

/// Media type of gemtext documents.
pub const GEMTEXT_MIME: &str = "text/gemini";
