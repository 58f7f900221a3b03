//! Input form submission.
//!
//! A POST carries the answer to an upstream input prompt in the `q` field.
//! The gateway turns it into a redirect to the same path with the value as
//! the raw query string, so the follow-up GET is an ordinary proxy request.

use axum::body::Body;
use axum::extract::{Form, FromRequest};
use axum::http::{HeaderValue, Request};
use serde::Deserialize;

use crate::http::dispatch::Outcome;
use crate::http::error::GatewayError;
use crate::routing::GatewayPath;

#[derive(Debug, Deserialize)]
pub struct QueryForm {
    pub q: String,
}

pub async fn submit_input(path: String, request: Request<Body>) -> Result<Outcome, GatewayError> {
    let Form(form) = Form::<QueryForm>::from_request(request, &())
        .await
        .map_err(|rejection| GatewayError::BadForm(rejection.body_text()))?;

    let target = GatewayPath::new(path, Some(form.q));
    if HeaderValue::from_str(&target.to_string()).is_err() {
        return Err(GatewayError::BadForm(
            "query contains characters not allowed in a URL".to_string(),
        ));
    }
    tracing::debug!(location = %target, "Input submitted");
    Ok(Outcome::Redirect(target))
}
