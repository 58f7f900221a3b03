//! Media type parsing for success meta lines.

use crate::gemini::response::ProtocolError;
use crate::gemini::GEMTEXT_MIME;

/// Meta assumed when a success response carries an empty meta.
const DEFAULT_META: &str = "text/gemini; charset=utf-8";

/// A parsed `type/subtype; key=value` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    essence: String,
    params: Vec<(String, String)>,
}

impl MediaType {
    pub fn parse(meta: &str) -> Result<Self, ProtocolError> {
        let meta = match meta.trim() {
            "" => DEFAULT_META,
            trimmed => trimmed,
        };
        let invalid = || ProtocolError::InvalidMediaType(meta.to_string());

        let mut parts = meta.split(';');
        let essence = parts.next().unwrap_or_default().trim().to_ascii_lowercase();
        match essence.split_once('/') {
            Some((kind, sub)) if is_token(kind) && is_token(sub) => {}
            _ => return Err(invalid()),
        }

        let mut params = Vec::new();
        for param in parts {
            let param = param.trim();
            if param.is_empty() {
                continue;
            }
            let (key, value) = param.split_once('=').ok_or_else(invalid)?;
            let key = key.trim();
            if !is_token(key) {
                return Err(invalid());
            }
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            params.push((key.to_ascii_lowercase(), value.to_string()));
        }

        Ok(Self { essence, params })
    }

    /// Lowercased `type/subtype`.
    pub fn essence(&self) -> &str {
        &self.essence
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_gemtext(&self) -> bool {
        self.essence == GEMTEXT_MIME
    }

    pub fn charset(&self) -> Option<&str> {
        self.param("charset")
    }

    /// True unless a charset other than UTF-8 is declared.
    pub fn is_utf8(&self) -> bool {
        self.charset()
            .map(|c| c.eq_ignore_ascii_case("utf-8") || c.eq_ignore_ascii_case("utf8"))
            .unwrap_or(true)
    }

    pub fn lang(&self) -> Option<&str> {
        self.param("lang").filter(|l| !l.is_empty())
    }
}

fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b"!#$&-^_.+*'%`|~".contains(&b)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_params() {
        let media = MediaType::parse("text/gemini; charset=UTF-8; lang=\"en\"").unwrap();
        assert!(media.is_gemtext());
        assert_eq!(media.charset(), Some("UTF-8"));
        assert!(media.is_utf8());
        assert_eq!(media.lang(), Some("en"));
    }

    #[test]
    fn test_empty_meta_defaults_to_gemtext() {
        let media = MediaType::parse("").unwrap();
        assert!(media.is_gemtext());
        assert!(media.is_utf8());
    }

    #[test]
    fn test_other_charsets() {
        let media = MediaType::parse("text/gemini; charset=iso-8859-1").unwrap();
        assert!(!media.is_utf8());

        let media = MediaType::parse("Image/PNG").unwrap();
        assert_eq!(media.essence(), "image/png");
        assert!(!media.is_gemtext());
    }

    #[test]
    fn test_malformed() {
        assert!(MediaType::parse("gemini").is_err());
        assert!(MediaType::parse("text/gemini; charset").is_err());
        assert!(MediaType::parse("text/ gemini").is_err());
    }
}
