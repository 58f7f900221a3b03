//! Input prompt forms for 1x responses.

use maud::{html, Markup};

use crate::routing::GatewayPath;

/// Name of the form field carrying the user's answer.
pub const QUERY_FIELD: &str = "q";

/// A prompt received from upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPrompt {
    pub prompt: String,
    /// Mask the input (status 11).
    pub secret: bool,
    /// Gateway path the form posts back to.
    pub target: GatewayPath,
}

pub fn render_prompt(prompt: &InputPrompt) -> Markup {
    let input_type = if prompt.secret { "password" } else { "text" };
    html! {
        form method="POST" action=(prompt.target.path()) {
            label for=(QUERY_FIELD) { (prompt.prompt) }
            input type=(input_type) id=(QUERY_FIELD) name=(QUERY_FIELD) autofocus;
            button type="submit" { "Submit" }
        }
    }
}
