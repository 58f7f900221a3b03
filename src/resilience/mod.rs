//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → gemini client (connect timeout)
//!     → timeouts.rs (deadline over fetch and translation)
//!     → On expiry: 502, upstream connection dropped
//! ```
//!
//! # Design Decisions
//! - Every upstream exchange has a deadline
//! - Nothing is retried; a failed fetch is reported as is

pub mod timeouts;

pub use timeouts::with_deadline;
