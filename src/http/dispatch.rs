//! Upstream response classification.
//!
//! # Responsibilities
//! - Route a fetched response by status code
//! - Render gemtext, prompt for input, redirect, stream or fail
//! - Convert every failure into a [`GatewayError`]
//!
//! # Design Decisions
//! - Gemtext is decoded and rendered in the same pass
//! - Non-gemtext bodies are streamed through untouched
//! - Redirects to other schemes are shown, never followed

use std::fmt;

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response as HttpResponse};
use maud::{html, PreEscaped};
use tokio_util::io::ReaderStream;
use url::Url;

use crate::gemini::{BodyReader, LineReader, MediaType, ProtocolError, Response, StatusKind};
use crate::http::error::GatewayError;
use crate::render::{
    render_prompt, Details, GemtextRenderer, InputPrompt, Page, RenderState, Stylesheet,
};
use crate::routing::{is_executable_scheme, GatewayPath, Namespace};

/// Request-scoped inputs of the dispatcher.
#[derive(Debug, Clone, Copy)]
pub struct DispatchContext<'a> {
    pub namespace: &'a Namespace,
    pub stylesheet: &'a Stylesheet,
    /// URL that was fetched.
    pub url: &'a Url,
    /// Gateway path the browser requested.
    pub gateway_path: &'a GatewayPath,
    /// Request arrived through `/x/<host>/`.
    pub foreign: bool,
}

/// Successful result of a dispatch.
pub enum Outcome {
    /// A rendered HTML page.
    Page(String),
    /// A 302 to another gateway path.
    Redirect(GatewayPath),
    /// A body streamed as received.
    Passthrough {
        content_type: String,
        body: BodyReader,
    },
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Page(html) => f.debug_tuple("Page").field(&html.len()).finish(),
            Outcome::Redirect(path) => f.debug_tuple("Redirect").field(path).finish(),
            Outcome::Passthrough { content_type, .. } => f
                .debug_struct("Passthrough")
                .field("content_type", content_type)
                .finish_non_exhaustive(),
        }
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> HttpResponse {
        match self {
            Outcome::Page(html) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                html,
            )
                .into_response(),
            Outcome::Redirect(path) => match HeaderValue::from_str(&path.to_string()) {
                Ok(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
                Err(_) => GatewayError::from(ProtocolError::InvalidRedirect(path.to_string()))
                    .into_response(),
            },
            Outcome::Passthrough { content_type, body } => {
                let content_type = HeaderValue::from_str(&content_type)
                    .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
                (
                    StatusCode::OK,
                    [(header::CONTENT_TYPE, content_type)],
                    Body::from_stream(ReaderStream::new(body)),
                )
                    .into_response()
            }
        }
    }
}

pub async fn dispatch(
    ctx: &DispatchContext<'_>,
    response: Response,
) -> Result<Outcome, GatewayError> {
    let status = response.status;
    tracing::debug!(
        url = %ctx.url,
        status = %status,
        meta = %response.meta,
        "Upstream responded"
    );

    match status.kind() {
        StatusKind::Input { secret } => {
            let prompt = InputPrompt {
                prompt: response.meta.clone(),
                secret,
                target: ctx.gateway_path.clone(),
            };
            let form = render_prompt(&prompt);
            let page = Page {
                title: &prompt.prompt,
                lang: None,
                stylesheet: ctx.stylesheet,
                details: Some(details(ctx, &response)),
            };
            Ok(Outcome::Page(page.render(form).into_string()))
        }
        StatusKind::Success => success(ctx, response).await,
        StatusKind::Redirect { .. } => redirect(ctx, &response),
        StatusKind::TemporaryFailure => Err(GatewayError::TemporaryFailure {
            status: status.code(),
            meta: response.meta,
        }),
        StatusKind::PermanentFailure => Err(GatewayError::PermanentFailure {
            status: status.code(),
            meta: response.meta,
        }),
        StatusKind::OtherFailure => Err(GatewayError::OtherFailure {
            status: status.code(),
            meta: response.meta,
        }),
        StatusKind::Unrecognized => Err(GatewayError::UnrecognizedStatus(status.code())),
    }
}

async fn success(
    ctx: &DispatchContext<'_>,
    mut response: Response,
) -> Result<Outcome, GatewayError> {
    let media = MediaType::parse(&response.meta)?;
    let body = response.body.take().ok_or(ProtocolError::EmptyResponse)?;

    if !media.is_gemtext() {
        return Ok(Outcome::Passthrough {
            content_type: response.meta.trim().to_string(),
            body,
        });
    }
    if !media.is_utf8() {
        let charset = media.charset().unwrap_or_default().to_string();
        return Err(GatewayError::UnsupportedCharset(charset));
    }

    let mut lines = LineReader::new(body);
    let mut renderer = GemtextRenderer::new(RenderState::new(ctx.namespace, ctx.url));
    while let Some(line) = lines
        .next_line()
        .await
        .map_err(crate::gemini::TransportError::Io)?
    {
        renderer.push(&line)?;
    }
    let document = renderer.finish();

    let fallback;
    let title = match &document.title {
        Some(title) => title.as_str(),
        None => {
            fallback = format!("{} {}", ctx.url.host_str().unwrap_or_default(), ctx.url.path());
            fallback.as_str()
        }
    };
    let page = Page {
        title,
        lang: media.lang(),
        stylesheet: ctx.stylesheet,
        details: Some(details(ctx, &response)),
    };
    Ok(Outcome::Page(
        page.render(PreEscaped(document.html)).into_string(),
    ))
}

fn redirect(ctx: &DispatchContext<'_>, response: &Response) -> Result<Outcome, GatewayError> {
    let target = ctx
        .url
        .join(response.meta.trim())
        .map_err(|_| ProtocolError::InvalidRedirect(response.meta.clone()))?;

    if target.scheme() != crate::gemini::GEMINI_SCHEME {
        tracing::info!(
            url = %ctx.url,
            redirect = %target,
            "Not following redirect to another scheme"
        );
        let body = html! {
            p {
                "This page redirects to "
                @if is_executable_scheme(&target) {
                    code { (target.as_str()) }
                } @else {
                    a href=(target.as_str()) { (target.as_str()) }
                }
                ", which is not a Gemini resource."
            }
        };
        let page = Page {
            title: "External redirect",
            lang: None,
            stylesheet: ctx.stylesheet,
            details: Some(details(ctx, response)),
        };
        return Ok(Outcome::Page(page.render(body).into_string()));
    }
    if target.host_str().map_or(true, str::is_empty) {
        return Err(ProtocolError::InvalidRedirect(response.meta.clone()).into());
    }

    let path = ctx.namespace.redirect_path(&target, ctx.foreign);
    tracing::info!(url = %ctx.url, location = %path, "Redirecting");
    Ok(Outcome::Redirect(path))
}

fn details<'a>(ctx: &DispatchContext<'a>, response: &'a Response) -> Details<'a> {
    Details {
        url: ctx.url,
        status: response.status,
        meta: &response.meta,
        external: ctx.foreign,
    }
}
