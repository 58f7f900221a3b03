//! Page shell shared by every HTML response.

use std::fs;
use std::path::PathBuf;

use maud::{html, Markup, PreEscaped, DOCTYPE};
use url::Url;

use crate::config::StyleConfig;
use crate::gemini::Status;

/// Built-in stylesheet, inlined when nothing else is configured.
pub const DEFAULT_CSS: &str = include_str!("default.css");

/// Stylesheet source, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stylesheet {
    Inline(String),
    External(String),
    None,
}

impl Stylesheet {
    /// A local file wins over an external URL; the built-in sheet is the fallback.
    pub fn from_config(style: &StyleConfig) -> Result<Self, StylesheetError> {
        if let Some(path) = &style.css_path {
            let css = fs::read_to_string(path).map_err(|source| StylesheetError {
                path: path.clone(),
                source,
            })?;
            return Ok(Stylesheet::Inline(css));
        }
        if let Some(url) = &style.css_url {
            return Ok(Stylesheet::External(url.clone()));
        }
        if style.inline_default {
            Ok(Stylesheet::Inline(DEFAULT_CSS.to_string()))
        } else {
            Ok(Stylesheet::None)
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("failed to read stylesheet {path:?}: {source}")]
pub struct StylesheetError {
    pub path: PathBuf,
    pub source: std::io::Error,
}

/// Details of the upstream exchange shown below the content.
#[derive(Debug, Clone, Copy)]
pub struct Details<'a> {
    pub url: &'a Url,
    pub status: Status,
    pub meta: &'a str,
    pub external: bool,
}

/// A complete HTML document around a rendered body.
#[derive(Debug, Clone, Copy)]
pub struct Page<'a> {
    pub title: &'a str,
    pub lang: Option<&'a str>,
    pub stylesheet: &'a Stylesheet,
    pub details: Option<Details<'a>>,
}

impl Page<'_> {
    pub fn render(&self, body: Markup) -> Markup {
        html! {
            (DOCTYPE)
            html lang=[self.lang] {
                head {
                    meta charset="utf-8";
                    meta name="viewport" content="width=device-width, initial-scale=1";
                    @match self.stylesheet {
                        Stylesheet::Inline(css) => {
                            style { (PreEscaped(inline_css(css))) }
                        },
                        Stylesheet::External(href) => {
                            link rel="stylesheet" href=(href);
                        },
                        Stylesheet::None => {},
                    }
                    title { (self.title) }
                }
                body {
                    article { (body) }
                    @if let Some(details) = &self.details {
                        (details.markup())
                    }
                }
            }
        }
    }
}

impl Details<'_> {
    fn markup(&self) -> Markup {
        let url = self.url.as_str();
        html! {
            details {
                summary {
                    "Proxied content from "
                    a href=(url) { (url) }
                    @if self.external {
                        " (external content)"
                    }
                }
                p { "Gemini request details:" }
                dl {
                    dt { "Original URL" }
                    dd { a href=(url) { (url) } }
                    dt { "Status code" }
                    dd { (self.status.code()) }
                    dt { "Meta" }
                    dd { (self.meta) }
                    dt { "Proxied by" }
                    dd { (env!("CARGO_PKG_NAME")) " " (env!("CARGO_PKG_VERSION")) }
                }
                p { "Be advised that no attempt was made to verify the remote TLS certificate." }
            }
        }
    }
}

/// Stylesheet text safe to place inside `<style>`.
///
/// `</` is written as the CSS escape `<\/` so the sheet cannot close the element.
fn inline_css(css: &str) -> String {
    css.replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_with_details() {
        let url = Url::parse("gemini://root.example/a").unwrap();
        let sheet = Stylesheet::External("https://cdn.example/s.css".into());
        let page = Page {
            title: "A & B",
            lang: Some("en"),
            stylesheet: &sheet,
            details: Some(Details {
                url: &url,
                status: Status::new(20),
                meta: "text/gemini; lang=en",
                external: true,
            }),
        };
        let html = page.render(html! { p { "body" } }).into_string();

        assert!(html.contains("<html lang=\"en\">"));
        assert!(html.contains("<link rel=\"stylesheet\" href=\"https://cdn.example/s.css\">"));
        assert!(html.contains("<title>A &amp; B</title>"));
        assert!(html.contains("<article><p>body</p></article>"));
        assert!(html.contains("(external content)"));
        assert!(html.contains("<dd>20</dd>"));
        assert!(html.contains("<dd>text/gemini; lang=en</dd>"));
        assert!(html.contains("no attempt was made to verify"));
    }

    #[test]
    fn test_default_stylesheet_is_inlined() {
        let style = StyleConfig::default();
        let sheet = Stylesheet::from_config(&style).unwrap();
        assert_eq!(sheet, Stylesheet::Inline(DEFAULT_CSS.to_string()));

        let page = Page {
            title: "t",
            lang: None,
            stylesheet: &sheet,
            details: None,
        };
        let html = page.render(html! {}).into_string();
        assert!(html.contains("<html><head>"));
        assert!(html.contains("<style>html {"));
        assert!(!html.contains("<details>"));
    }

    #[test]
    fn test_upstream_text_is_escaped() {
        let url = Url::parse("gemini://root.example/?<b>").unwrap();
        let sheet = Stylesheet::None;
        let page = Page {
            title: "<script>alert(1)</script>",
            lang: Some("en\"><script>"),
            stylesheet: &sheet,
            details: Some(Details {
                url: &url,
                status: Status::new(20),
                meta: "text/gemini; x=\"<i>\"",
                external: false,
            }),
        };
        let html = page.render(html! {}).into_string();
        assert!(!html.contains("<script>"));
        assert!(html.contains("<title>&lt;script&gt;alert(1)&lt;/script&gt;</title>"));
        assert!(html.contains("lang=\"en&quot;&gt;&lt;script&gt;\""));
        assert!(html.contains("<dd>text/gemini; x=&quot;&lt;i&gt;&quot;</dd>"));
        assert!(!html.contains("(external content)"));
    }

    #[test]
    fn test_inline_css_cannot_close_style() {
        let sheet = Stylesheet::Inline("p { color: red }</style><script>x()</script>".into());
        let page = Page {
            title: "t",
            lang: None,
            stylesheet: &sheet,
            details: None,
        };
        let html = page.render(html! {}).into_string();
        assert_eq!(html.matches("</style>").count(), 1);
        assert!(!html.contains("</script>"));
    }

    #[test]
    fn test_external_stylesheet_from_config() {
        let style = StyleConfig {
            css_url: Some("https://cdn.example/s.css".into()),
            ..StyleConfig::default()
        };
        assert_eq!(
            Stylesheet::from_config(&style).unwrap(),
            Stylesheet::External("https://cdn.example/s.css".into())
        );
    }

    #[test]
    fn test_missing_stylesheet_file() {
        let style = StyleConfig {
            css_path: Some(PathBuf::from("/nonexistent/gateway.css")),
            ..StyleConfig::default()
        };
        assert!(Stylesheet::from_config(&style).is_err());
    }
}
