//! Response header parsing.
//!
//! A response is a single header line, `<STATUS><SPACE><META>\r\n`, followed
//! by a body only when the status is in the 2x class.

use std::fmt;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::gemini::status::Status;

/// Longest meta string a server may send, in bytes.
pub const MAX_META_LEN: usize = 1024;

/// Status digits, the separating space and the CRLF terminator.
const MAX_HEADER_LEN: usize = MAX_META_LEN + 5;

/// Streaming response body.
pub type BodyReader = Box<dyn AsyncBufRead + Send + Unpin>;

/// Malformed data received from an upstream server.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("connection closed before a response header was received")]
    EmptyResponse,

    #[error("response header is not terminated by CRLF")]
    UnterminatedHeader,

    #[error("response header is not valid UTF-8")]
    InvalidEncoding,

    #[error("invalid status code {0:?}")]
    InvalidStatus(String),

    #[error("status code must be followed by a space")]
    MissingSeparator,

    #[error("meta is {0} bytes, longer than the {MAX_META_LEN} byte limit")]
    MetaTooLong(usize),

    #[error("invalid media type {0:?}")]
    InvalidMediaType(String),

    #[error("invalid redirect target {0:?}")]
    InvalidRedirect(String),
}

/// A fetched upstream response.
pub struct Response {
    pub status: Status,
    pub meta: String,
    /// Present only for 2x statuses.
    pub body: Option<BodyReader>,
}

impl Response {
    pub fn new(status: Status, meta: impl Into<String>, body: Option<BodyReader>) -> Self {
        Self {
            status,
            meta: meta.into(),
            body,
        }
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("meta", &self.meta)
            .field("body", &self.body.as_ref().map(|_| ".."))
            .finish()
    }
}

/// Parse a header line, without its line terminator, into status and meta.
pub fn parse_header(line: &str) -> Result<(Status, String), ProtocolError> {
    let digits = line.get(..2).unwrap_or(line);
    let code = match digits.as_bytes() {
        [tens @ b'1'..=b'6', units @ b'0'..=b'9'] => (tens - b'0') * 10 + (units - b'0'),
        _ => return Err(ProtocolError::InvalidStatus(digits.to_string())),
    };

    let meta = match &line[2..] {
        "" => "",
        rest => rest
            .strip_prefix(' ')
            .ok_or(ProtocolError::MissingSeparator)?,
    };
    if meta.len() > MAX_META_LEN {
        return Err(ProtocolError::MetaTooLong(meta.len()));
    }

    Ok((Status::new(code), meta.to_string()))
}

/// Read the header line from `reader` and keep the remainder as the body.
pub async fn read_response<R>(mut reader: R) -> Result<Response, ReadError>
where
    R: AsyncBufRead + Send + Unpin + 'static,
{
    let mut header = Vec::with_capacity(64);
    (&mut reader)
        .take(MAX_HEADER_LEN as u64)
        .read_until(b'\n', &mut header)
        .await?;

    if header.is_empty() {
        return Err(ProtocolError::EmptyResponse.into());
    }
    if header.pop() != Some(b'\n') {
        return Err(ProtocolError::UnterminatedHeader.into());
    }
    if header.last() == Some(&b'\r') {
        header.pop();
    }

    let line = std::str::from_utf8(&header).map_err(|_| ProtocolError::InvalidEncoding)?;
    let (status, meta) = parse_header(line)?;

    let body: Option<BodyReader> = if status.has_body() {
        Some(Box::new(reader))
    } else {
        None
    };

    Ok(Response::new(status, meta, body))
}

/// Failure while reading a response header.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
}
