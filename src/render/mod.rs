//! HTML rendering subsystem.
//!
//! # Data Flow
//! ```text
//! gemtext lines ─→ gemtext.rs (structural renderer) ─┐
//! 1x prompt ─────→ input.rs (single-field form) ─────┼→ page.rs (document shell) → HTML
//! redirect notice ───────────────────────────────────┘
//! ```
//!
//! # Design Decisions
//! - Markup comes from `maud` templates, which escape every interpolation
//! - Gemtext is rendered line by line into one growing buffer

pub mod gemtext;
pub mod input;
pub mod page;

pub use gemtext::{render, GemtextRenderer, RenderState, RenderedDocument, MAX_DOCUMENT_LEN};
pub use input::{render_prompt, InputPrompt, QUERY_FIELD};
pub use page::{Details, Page, Stylesheet, StylesheetError, DEFAULT_CSS};

use thiserror::Error;

/// Failure while building markup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("rendered document exceeds {limit} bytes")]
    DocumentTooLarge { limit: usize },
}
