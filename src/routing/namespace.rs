//! Mapping between upstream URLs and gateway paths.
//!
//! # Responsibilities
//! - Serve the root host at the gateway's own path root
//! - Serve every other host under `/x/<host>/`
//! - Resolve link and redirect references against the current URL
//!
//! # Design Decisions
//! - Root-relative paths never carry the upstream host
//! - The scheme of a decoded path is always `gemini`
//! - Links to other schemes are left untouched

use std::fmt;

use thiserror::Error;
use url::Url;

use crate::gemini::{DEFAULT_PORT, GEMINI_SCHEME};

/// Path prefix of foreign-host requests.
pub const FOREIGN_PREFIX: &str = "/x/";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NamespaceError {
    #[error("root URL must use the gemini scheme, got {0:?}")]
    RootScheme(String),

    #[error("root URL has no host")]
    RootHost,

    #[error("gateway path {0:?} does not name a host")]
    MissingHost(String),

    #[error("gateway path {path:?} does not map to a valid URL: {source}")]
    InvalidPath {
        path: String,
        source: url::ParseError,
    },
}

/// An HTTP path and query on the gateway's own origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayPath {
    path: String,
    query: Option<String>,
}

impl GatewayPath {
    pub fn new(path: impl Into<String>, query: Option<String>) -> Self {
        Self {
            path: path.into(),
            query,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Whether the path addresses a host other than the root host.
    pub fn is_foreign(&self) -> bool {
        is_foreign_path(&self.path)
    }
}

impl fmt::Display for GatewayPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        if let Some(query) = &self.query {
            write!(f, "?{}", query)?;
        }
        Ok(())
    }
}

/// Where a rendered link should point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// A gemini resource, addressed through the gateway.
    Proxied(GatewayPath),
    /// Any other non-executable scheme, emitted as written.
    External(String),
    /// The reference could not be resolved.
    Invalid,
}

pub fn is_foreign_path(path: &str) -> bool {
    path == "/x" || path.starts_with(FOREIGN_PREFIX)
}

/// Schemes a browser would run as script on the gateway's origin.
const EXECUTABLE_SCHEMES: [&str; 3] = ["javascript", "vbscript", "data"];

pub fn is_executable_scheme(url: &Url) -> bool {
    EXECUTABLE_SCHEMES.contains(&url.scheme())
}

/// The gateway's URL space, anchored at a fixed root host.
#[derive(Debug, Clone)]
pub struct Namespace {
    root: Url,
}

impl Namespace {
    pub fn new(root: Url) -> Result<Self, NamespaceError> {
        if root.scheme() != GEMINI_SCHEME {
            return Err(NamespaceError::RootScheme(root.scheme().to_string()));
        }
        if root.host_str().map_or(true, str::is_empty) {
            return Err(NamespaceError::RootHost);
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Url {
        &self.root
    }

    /// Same host and effective port as the root.
    pub fn is_root_host(&self, url: &Url) -> bool {
        url.host_str() == self.root.host_str()
            && url.port().unwrap_or(DEFAULT_PORT) == self.root.port().unwrap_or(DEFAULT_PORT)
    }

    ///
    /// Root paths that would read back as foreign (`/x`, `/x/...`) are
    /// emitted in the foreign form under the root host instead.
    pub fn to_gateway_path(&self, url: &Url) -> GatewayPath {
        if self.is_root_host(url) && !is_foreign_path(url.path()) {
            let path = match url.path() {
                "" => "/",
                path => path,
            };
            GatewayPath::new(path, url.query().map(str::to_string))
        } else {
            foreign_path(url)
        }
    }

    /// Decode an inbound request path and its raw query string.
    pub fn to_resource(&self, path: &str, query: Option<&str>) -> Result<Url, NamespaceError> {
        let mut url = if is_foreign_path(path) {
            let mut segments = path.splitn(4, '/');
            let host = segments.nth(2).unwrap_or_default();
            if host.is_empty() {
                return Err(NamespaceError::MissingHost(path.to_string()));
            }
            let rest = segments.next().unwrap_or_default();
            Url::parse(&format!("{}://{}/{}", GEMINI_SCHEME, host, rest)).map_err(|source| {
                NamespaceError::InvalidPath {
                    path: path.to_string(),
                    source,
                }
            })?
        } else {
            let mut url = self.root.clone();
            url.set_path(path);
            url
        };
        url.set_query(query);
        url.set_fragment(None);
        Ok(url)
    }

    /// Resolve a link reference found in the document at `base`.
    pub fn resolve_link(&self, base: &Url, raw: &str) -> LinkTarget {
        match base.join(raw.trim()) {
            Ok(url) if url.scheme() == GEMINI_SCHEME => match url.host_str() {
                Some(host) if !host.is_empty() => LinkTarget::Proxied(self.to_gateway_path(&url)),
                _ => LinkTarget::Invalid,
            },
            Ok(url) if is_executable_scheme(&url) => LinkTarget::Invalid,
            Ok(_) => LinkTarget::External(raw.trim().to_string()),
            Err(_) => LinkTarget::Invalid,
        }
    }

    /// Path to redirect the browser to for an upstream redirect target.
    ///
    /// Requests that arrived through the foreign namespace stay in it.
    pub fn redirect_path(&self, target: &Url, foreign: bool) -> GatewayPath {
        if foreign {
            foreign_path(target)
        } else {
            self.to_gateway_path(target)
        }
    }
}

fn foreign_path(url: &Url) -> GatewayPath {
    let host = url.host_str().unwrap_or_default();
    let authority = match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };
    let path = match url.path() {
        "" => "/",
        path => path,
    };
    GatewayPath::new(
        format!("{}{}{}", FOREIGN_PREFIX, authority, path),
        url.query().map(str::to_string),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn namespace() -> Namespace {
        Namespace::new(Url::parse("gemini://root.example").unwrap()).unwrap()
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_root_round_trip() {
        let ns = namespace();
        for id in [
            "gemini://root.example/",
            "gemini://root.example/docs/index.gmi",
            "gemini://root.example/search?rust%20lang",
        ] {
            let id = url(id);
            let path = ns.to_gateway_path(&id);
            assert!(!path.is_foreign());
            assert!(!path.to_string().contains("/x/"));
            assert_eq!(ns.to_resource(path.path(), path.query()).unwrap(), id);
        }
    }

    #[test]
    fn test_foreign_round_trip() {
        let ns = namespace();
        for id in [
            "gemini://other.example/",
            "gemini://other.example/a/b.gmi?q",
            "gemini://other.example:1966/port",
        ] {
            let id = url(id);
            let path = ns.to_gateway_path(&id);
            assert_eq!(path.path().split('/').nth(1), Some("x"));
            let back = ns.to_resource(path.path(), path.query()).unwrap();
            assert_eq!(back.host_str(), id.host_str());
            assert_eq!(back.port(), id.port());
            assert_eq!(back.path(), id.path());
            assert_eq!(back.query(), id.query());
            assert_eq!(back.scheme(), GEMINI_SCHEME);
        }
    }

    #[test]
    fn test_root_host_strips_scheme_and_host() {
        let ns = namespace();
        let path = ns.to_gateway_path(&url("gemini://root.example/a?b"));
        assert_eq!(path.to_string(), "/a?b");

        let path = ns.to_gateway_path(&url("gemini://root.example:1965/a"));
        assert_eq!(path.to_string(), "/a");
    }

    #[test]
    fn test_decode_foreign_without_path() {
        let ns = namespace();
        let resource = ns.to_resource("/x/other.example", None).unwrap();
        assert_eq!(resource.as_str(), "gemini://other.example/");

        assert_eq!(
            ns.to_resource("/x/", None),
            Err(NamespaceError::MissingHost("/x/".into()))
        );
        assert!(ns.to_resource("/x", None).is_err());
    }

    #[test]
    fn test_decode_copies_query_verbatim() {
        let ns = namespace();
        let resource = ns.to_resource("/search", Some("hello%20world")).unwrap();
        assert_eq!(resource.as_str(), "gemini://root.example/search?hello%20world");

        let resource = ns.to_resource("/xylophone", None).unwrap();
        assert_eq!(resource.host_str(), Some("root.example"));
    }

    #[test]
    fn test_resolve_links() {
        let ns = namespace();
        let base = url("gemini://other.example/dir/page.gmi");

        assert_eq!(
            ns.resolve_link(&base, "next.gmi"),
            LinkTarget::Proxied(GatewayPath::new("/x/other.example/dir/next.gmi", None))
        );
        assert_eq!(
            ns.resolve_link(&base, "/top"),
            LinkTarget::Proxied(GatewayPath::new("/x/other.example/top", None))
        );
        assert_eq!(
            ns.resolve_link(&base, "//root.example/home"),
            LinkTarget::Proxied(GatewayPath::new("/home", None))
        );
        assert_eq!(
            ns.resolve_link(&base, "https://www.rust-lang.org/"),
            LinkTarget::External("https://www.rust-lang.org/".into())
        );
        assert_eq!(ns.resolve_link(&base, "gemini://[oops/"), LinkTarget::Invalid);
    }

    #[test]
    fn test_root_path_under_foreign_prefix_round_trips() {
        let ns = namespace();
        for id in [
            "gemini://root.example/x/notes.gmi",
            "gemini://root.example/x",
            "gemini://root.example/x/",
        ] {
            let id = url(id);
            let path = ns.to_gateway_path(&id);
            assert!(path.path().starts_with("/x/root.example/x"), "{path}");
            assert_eq!(ns.to_resource(path.path(), path.query()).unwrap(), id);
        }

        let path = ns.to_gateway_path(&url("gemini://root.example/xylophone"));
        assert_eq!(path.to_string(), "/xylophone");
    }

    #[test]
    fn test_executable_links_are_inert() {
        let ns = namespace();
        let base = url("gemini://root.example/");
        for raw in [
            "javascript:alert(document.cookie)",
            "JavaScript:alert(1)",
            "vbscript:msgbox(1)",
            "data:text/html,<script>alert(1)</script>",
        ] {
            assert_eq!(ns.resolve_link(&base, raw), LinkTarget::Invalid, "{raw}");
        }
        assert_eq!(
            ns.resolve_link(&base, "mailto:someone@example.org"),
            LinkTarget::External("mailto:someone@example.org".into())
        );
    }

    #[test]
    fn test_redirect_path_keeps_foreign_namespace() {
        let ns = namespace();
        let target = url("gemini://root.example/moved");
        assert_eq!(ns.redirect_path(&target, false).to_string(), "/moved");
        assert_eq!(
            ns.redirect_path(&target, true).to_string(),
            "/x/root.example/moved"
        );

        let elsewhere = url("gemini://elsewhere.example/new");
        assert_eq!(
            ns.redirect_path(&elsewhere, false).to_string(),
            "/x/elsewhere.example/new"
        );
    }

    #[test]
    fn test_root_must_be_gemini() {
        assert_eq!(
            Namespace::new(url("https://root.example/")).unwrap_err(),
            NamespaceError::RootScheme("https".into())
        );
    }
}
