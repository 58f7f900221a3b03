//! Upstream transport.
//!
//! # Responsibilities
//! - Open one TCP connection per request, bounded by a connect timeout
//! - Run a TLS handshake that accepts any server certificate
//! - Send the absolute URL as the request line and read the header
//!
//! # Design Decisions
//! - No connection reuse, no retries
//! - Dropping the response body closes the connection
//! - Servers that close without `close_notify` are treated as a normal EOF

use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{verify_tls12_signature, verify_tls13_signature, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{DigitallySignedStruct, SignatureScheme};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWriteExt, BufReader, ReadBuf};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use url::Url;

use crate::gemini::response::{read_response, ProtocolError, ReadError, Response};
use crate::gemini::{DEFAULT_PORT, GEMINI_SCHEME};

/// Errors raised while talking to an upstream server.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("unsupported scheme {0:?}")]
    UnsupportedScheme(String),

    #[error("URL has no host: {0}")]
    MissingHost(String),

    #[error("invalid server name: {0}")]
    InvalidServerName(String),

    #[error("TLS configuration error: {0}")]
    Tls(#[from] rustls::Error),

    #[error("could not connect to {addr}: {source}")]
    Connect { addr: String, source: io::Error },

    #[error("connection to {0} timed out")]
    ConnectTimeout(String),

    #[error("TLS handshake with {addr} failed: {source}")]
    Handshake { addr: String, source: io::Error },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl From<ReadError> for TransportError {
    fn from(err: ReadError) -> Self {
        match err {
            ReadError::Protocol(e) => TransportError::Protocol(e),
            ReadError::Io(e) => TransportError::Io(e),
        }
    }
}

/// Anything able to fetch an upstream resource.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn send(&self, url: &Url) -> Result<Response, TransportError>;
}

/// Gemini client over TLS.
#[derive(Clone)]
pub struct GeminiClient {
    connector: TlsConnector,
    connect_timeout: Duration,
}

impl GeminiClient {
    pub fn new(connect_timeout: Duration) -> Result<Self, TransportError> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let config = rustls::ClientConfig::builder_with_provider(provider.clone())
            .with_safe_default_protocol_versions()?
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate(provider)))
            .with_no_client_auth();

        Ok(Self {
            connector: TlsConnector::from(Arc::new(config)),
            connect_timeout,
        })
    }
}

#[async_trait]
impl Upstream for GeminiClient {
    async fn send(&self, url: &Url) -> Result<Response, TransportError> {
        if url.scheme() != GEMINI_SCHEME {
            return Err(TransportError::UnsupportedScheme(url.scheme().to_string()));
        }
        let host = url
            .host_str()
            .ok_or_else(|| TransportError::MissingHost(url.to_string()))?;
        let port = url.port().unwrap_or(DEFAULT_PORT);
        let addr = format!("{}:{}", host, port);

        // IPv6 literals are bracketed in URLs but not in TLS server names.
        let bare_host = host.trim_start_matches('[').trim_end_matches(']');
        let server_name = ServerName::try_from(bare_host.to_string())
            .map_err(|_| TransportError::InvalidServerName(host.to_string()))?;

        let tcp = match timeout(self.connect_timeout, TcpStream::connect(&addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => return Err(TransportError::Connect { addr, source }),
            Err(_) => return Err(TransportError::ConnectTimeout(addr)),
        };

        let mut tls = self
            .connector
            .connect(server_name, tcp)
            .await
            .map_err(|source| TransportError::Handshake {
                addr: addr.clone(),
                source,
            })?;

        tls.write_all(format!("{}\r\n", url).as_bytes()).await?;
        tls.flush().await?;

        tracing::debug!(url = %url, addr = %addr, "Request sent upstream");

        let reader = BufReader::new(TolerateUncleanClose { inner: tls });
        Ok(read_response(reader).await?)
    }
}

/// Accepts every certificate while still checking handshake signatures.
#[derive(Debug)]
struct AcceptAnyCertificate(Arc<CryptoProvider>);

impl ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}

/// Maps an abrupt TLS close after the last byte to a clean EOF.
struct TolerateUncleanClose<S> {
    inner: S,
}

impl<S: AsyncRead + Unpin> AsyncRead for TolerateUncleanClose<S> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match Pin::new(&mut self.inner).poll_read(cx, buf) {
            Poll::Ready(Err(e)) if e.kind() == io::ErrorKind::UnexpectedEof => Poll::Ready(Ok(())),
            other => other,
        }
    }
}
