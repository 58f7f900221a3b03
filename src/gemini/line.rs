//! Gemtext line classification.
//!
//! # Responsibilities
//! - Tag each body line with exactly one line kind
//! - Track preformatted mode so fenced lines are never reinterpreted
//! - Decode a body incrementally, one line at a time
//!
//! # Design Decisions
//! - Invalid UTF-8 is replaced, not rejected; partial documents still render
//! - A link line without a target is plain text
//! - Lines longer than [`MAX_LINE_LEN`] are truncated; the rest is skipped

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

/// One classified gemtext line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Heading { level: u8, text: String },
    Link { target: String, name: Option<String> },
    Quote(String),
    ListItem(String),
    PreformattingToggle { label: String },
    PreformattedText(String),
    Text(String),
}

impl Line {
    /// Classify a line read outside of a preformatted block.
    pub fn parse(raw: &str) -> Line {
        if let Some(rest) = raw.strip_prefix("```") {
            return Line::PreformattingToggle {
                label: rest.trim().to_string(),
            };
        }

        if let Some(rest) = raw.strip_prefix("=>") {
            let rest = rest.trim();
            if rest.is_empty() {
                return Line::Text(raw.to_string());
            }
            let (target, name) = match rest.split_once(char::is_whitespace) {
                Some((target, name)) => (target, name.trim()),
                None => (rest, ""),
            };
            return Line::Link {
                target: target.to_string(),
                name: (!name.is_empty()).then(|| name.to_string()),
            };
        }

        for (prefix, level) in [("###", 3), ("##", 2), ("#", 1)] {
            if let Some(text) = raw.strip_prefix(prefix) {
                return Line::Heading {
                    level,
                    text: text.trim().to_string(),
                };
            }
        }

        if let Some(text) = raw.strip_prefix("* ") {
            return Line::ListItem(text.trim().to_string());
        }

        if let Some(text) = raw.strip_prefix('>') {
            return Line::Quote(text.trim().to_string());
        }

        Line::Text(raw.to_string())
    }
}

/// Stateful classifier: lines between toggles are preformatted text.
#[derive(Debug, Default)]
pub struct LineClassifier {
    preformatted: bool,
}

impl LineClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classify(&mut self, raw: &str) -> Line {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        if raw.starts_with("```") {
            self.preformatted = !self.preformatted;
            return Line::parse(raw);
        }
        if self.preformatted {
            return Line::PreformattedText(raw.to_string());
        }
        Line::parse(raw)
    }
}

/// Longest line kept, in bytes, excluding the terminator.
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Incremental decoder over a response body.
pub struct LineReader<R> {
    reader: R,
    classifier: LineClassifier,
    buf: Vec<u8>,
}

impl<R: AsyncBufRead + Unpin> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            classifier: LineClassifier::new(),
            buf: Vec::with_capacity(256),
        }
    }

    /// Next classified line, or `None` once the body is exhausted.
    pub async fn next_line(&mut self) -> std::io::Result<Option<Line>> {
        self.buf.clear();
        let read = (&mut self.reader)
            .take(MAX_LINE_LEN as u64 + 1)
            .read_until(b'\n', &mut self.buf)
            .await?;
        if read == 0 {
            return Ok(None);
        }
        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
        } else if self.buf.len() > MAX_LINE_LEN {
            self.buf.truncate(MAX_LINE_LEN);
            let skipped = self.skip_rest_of_line().await?;
            tracing::debug!(kept = MAX_LINE_LEN, skipped, "Truncated overlong line");
        }
        let text = String::from_utf8_lossy(&self.buf);
        Ok(Some(self.classifier.classify(&text)))
    }

    /// Discard input up to and including the next newline.
    async fn skip_rest_of_line(&mut self) -> std::io::Result<usize> {
        let mut skipped = 0;
        loop {
            let (used, done) = {
                let available = self.reader.fill_buf().await?;
                match available.iter().position(|&b| b == b'\n') {
                    Some(i) => (i + 1, true),
                    None => (available.len(), available.is_empty()),
                }
            };
            self.reader.consume(used);
            skipped += used;
            if done {
                return Ok(skipped);
            }
        }
    }
}
