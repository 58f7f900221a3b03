//! Gemtext to HTML rendering.
//!
//! # Responsibilities
//! - Group consecutive list items into one `<ul>`
//! - Wrap preformatted lines between toggles in a labelled `<pre>`
//! - Route every link through the namespace
//! - Pick the page title from the first level-one heading
//!
//! # Design Decisions
//! - Single pass, no lookahead: lines are pushed as they are decoded
//! - All mutable state lives in [`RenderState`], created per document
//! - Open lists and preformatted blocks are buffered until they close
//! - An unterminated preformatted block is closed at end of stream
//! - Output is capped at [`MAX_DOCUMENT_LEN`] bytes

use maud::{html, Markup, PreEscaped};
use url::Url;

use crate::gemini::Line;
use crate::render::RenderError;
use crate::routing::{LinkTarget, Namespace};

/// Largest rendered document, in bytes, before rendering is abandoned.
pub const MAX_DOCUMENT_LEN: usize = 16 * 1024 * 1024;

/// An open preformatted block.
#[derive(Debug)]
struct Preformatted {
    label: String,
    text: String,
}

impl Preformatted {
    fn markup(&self) -> Markup {
        html! {
            div aria-label=(self.label) {
                pre aria-hidden="true" alt=(self.label) { (self.text) }
            }
        }
    }
}

/// Per-document rendering state.
#[derive(Debug)]
pub struct RenderState<'a> {
    namespace: &'a Namespace,
    base: &'a Url,
    /// Rendered `<li>` items of the open list.
    list: Option<String>,
    preformatted: Option<Preformatted>,
}

impl<'a> RenderState<'a> {
    pub fn new(namespace: &'a Namespace, base: &'a Url) -> Self {
        Self {
            namespace,
            base,
            list: None,
            preformatted: None,
        }
    }

    pub fn in_list(&self) -> bool {
        self.list.is_some()
    }

    pub fn in_preformatted(&self) -> bool {
        self.preformatted.is_some()
    }

    fn buffered_len(&self) -> usize {
        self.list.as_ref().map_or(0, String::len)
            + self.preformatted.as_ref().map_or(0, |block| block.text.len())
    }
}

/// Output of a finished render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    /// Text of the first non-empty level-one heading, if any.
    pub title: Option<String>,
    pub html: String,
}

/// Incremental gemtext renderer.
#[derive(Debug)]
pub struct GemtextRenderer<'a> {
    state: RenderState<'a>,
    title: Option<String>,
    html: String,
    limit: usize,
}

impl<'a> GemtextRenderer<'a> {
    pub fn new(state: RenderState<'a>) -> Self {
        Self::with_limit(state, MAX_DOCUMENT_LEN)
    }

    pub fn with_limit(state: RenderState<'a>, limit: usize) -> Self {
        Self {
            state,
            title: None,
            html: String::with_capacity(4096),
            limit,
        }
    }

    pub fn push(&mut self, line: &Line) -> Result<(), RenderError> {
        if self.state.in_list() && !matches!(line, Line::ListItem(_)) {
            self.close_list();
        }

        match line {
            Line::Heading { level, text } => {
                if *level == 1 && self.title.is_none() && !text.trim().is_empty() {
                    self.title = Some(text.clone());
                }
                let heading = match level {
                    1 => html! { h1 { (text) } },
                    2 => html! { h2 { (text) } },
                    _ => html! { h3 { (text) } },
                };
                self.emit(heading);
            }
            Line::Link { target, name } => {
                let label = name.as_deref().unwrap_or(target.as_str());
                let link = match self.state.namespace.resolve_link(self.state.base, target) {
                    LinkTarget::Proxied(path) => html! {
                        p { a href=(path.to_string()) { (label) } }
                    },
                    LinkTarget::External(href) => html! {
                        p { a href=(href) { (label) } }
                    },
                    LinkTarget::Invalid => {
                        tracing::debug!(link = %target, "Unresolvable link rendered inert");
                        html! { p { a title=(target) { "error" } } }
                    }
                };
                self.emit(link);
            }
            Line::Quote(text) => self.emit(html! { blockquote { (text) } }),
            Line::ListItem(text) => {
                let item = html! { li { (text) } };
                self.state
                    .list
                    .get_or_insert_with(String::new)
                    .push_str(&item.into_string());
            }
            Line::PreformattingToggle { label } => match self.state.preformatted.take() {
                Some(block) => self.emit(block.markup()),
                None => {
                    self.state.preformatted = Some(Preformatted {
                        label: label.clone(),
                        text: String::new(),
                    })
                }
            },
            Line::PreformattedText(text) if self.state.in_preformatted() => {
                if let Some(block) = self.state.preformatted.as_mut() {
                    block.text.push_str(text);
                    block.text.push('\n');
                }
            }
            Line::PreformattedText(text) | Line::Text(text) => self.emit(html! { p { (text) } }),
        }

        if self.html.len() + self.state.buffered_len() > self.limit {
            return Err(RenderError::DocumentTooLarge { limit: self.limit });
        }
        Ok(())
    }

    pub fn finish(mut self) -> RenderedDocument {
        if self.state.in_list() {
            self.close_list();
        }
        if let Some(block) = self.state.preformatted.take() {
            self.emit(block.markup());
        }
        RenderedDocument {
            title: self.title,
            html: self.html,
        }
    }

    fn close_list(&mut self) {
        if let Some(items) = self.state.list.take() {
            self.emit(html! { ul { (PreEscaped(items)) } });
        }
    }

    fn emit(&mut self, markup: Markup) {
        self.html.push_str(&markup.into_string());
        self.html.push('\n');
    }
}

/// Render a complete line sequence.
pub fn render<'a, I>(lines: I, state: RenderState<'_>) -> Result<RenderedDocument, RenderError>
where
    I: IntoIterator<Item = &'a Line>,
{
    let mut renderer = GemtextRenderer::new(state);
    for line in lines {
        renderer.push(line)?;
    }
    Ok(renderer.finish())
}
