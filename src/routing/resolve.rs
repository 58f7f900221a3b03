//! Inbound request resolution.
//!
//! # Responsibilities
//! - Gate methods: GET proxies, POST submits an input form
//! - Short-circuit `/favicon.ico`
//! - Turn the request path into the upstream URL to fetch

use axum::http::Method;
use thiserror::Error;
use url::Url;

use crate::routing::namespace::{is_foreign_path, GatewayPath, Namespace, NamespaceError};

/// What an inbound request asks the gateway to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Fetch `url` upstream and translate the response.
    Proxy(ProxyTarget),
    /// Turn a submitted input form into a query string on `path`.
    SubmitInput { path: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyTarget {
    pub url: Url,
    pub gateway_path: GatewayPath,
    /// Arrived through `/x/<host>/`.
    pub foreign: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("method {0} not allowed")]
    MethodNotAllowed(Method),

    #[error("no favicon")]
    Favicon,

    #[error(transparent)]
    Namespace(#[from] NamespaceError),
}

pub fn resolve(
    namespace: &Namespace,
    method: &Method,
    path: &str,
    query: Option<&str>,
) -> Result<Route, RouteError> {
    if *method == Method::POST {
        return Ok(Route::SubmitInput {
            path: path.to_string(),
        });
    }
    if *method != Method::GET {
        return Err(RouteError::MethodNotAllowed(method.clone()));
    }
    if path == "/favicon.ico" {
        return Err(RouteError::Favicon);
    }

    let url = namespace.to_resource(path, query)?;
    Ok(Route::Proxy(ProxyTarget {
        url,
        gateway_path: GatewayPath::new(path, query.map(str::to_string)),
        foreign: is_foreign_path(path),
    }))
}
