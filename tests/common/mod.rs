//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpListener;
use url::Url;

use gemini_gateway::config::GatewayConfig;
use gemini_gateway::gemini::{BodyReader, Response, Status, TransportError, Upstream};
use gemini_gateway::http::GatewayServer;
use gemini_gateway::lifecycle::Shutdown;
use gemini_gateway::render::Stylesheet;

pub const ROOT: &str = "gemini://capsule.example";

/// A canned upstream reply.
#[derive(Clone)]
pub struct Reply {
    pub status: u8,
    pub meta: String,
    pub body: Option<Vec<u8>>,
    pub delay: Option<Duration>,
}

impl Reply {
    pub fn gemtext(body: &str) -> Self {
        Self::success("text/gemini; charset=utf-8", body.as_bytes())
    }

    pub fn success(meta: &str, body: &[u8]) -> Self {
        Self {
            status: 20,
            meta: meta.to_string(),
            body: Some(body.to_vec()),
            delay: None,
        }
    }

    pub fn status(status: u8, meta: &str) -> Self {
        Self {
            status,
            meta: meta.to_string(),
            body: None,
            delay: None,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// Upstream that answers from a table keyed by absolute URL.
///
/// Unknown URLs get `51 Not found`.
#[derive(Default)]
pub struct ScriptedUpstream {
    replies: Mutex<HashMap<String, Reply>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedUpstream {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, url: &str, reply: Reply) {
        self.replies.lock().unwrap().insert(url.to_string(), reply);
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Upstream for ScriptedUpstream {
    async fn send(&self, url: &Url) -> Result<Response, TransportError> {
        self.requests.lock().unwrap().push(url.to_string());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get(url.as_str())
            .cloned()
            .unwrap_or_else(|| Reply::status(51, "Not found"));

        if let Some(delay) = reply.delay {
            tokio::time::sleep(delay).await;
        }
        let body = reply
            .body
            .map(|bytes| Box::new(Cursor::new(bytes)) as BodyReader);
        Ok(Response::new(Status::new(reply.status), reply.meta, body))
    }
}

pub fn config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.upstream.root = Some(ROOT.to_string());
    config
}

/// A running gateway bound to an ephemeral port.
pub struct TestGateway {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a gateway over a scripted upstream.
pub async fn start_gateway(config: GatewayConfig, upstream: Arc<ScriptedUpstream>) -> TestGateway {
    let server = GatewayServer::with_upstream(config, Stylesheet::None, upstream).unwrap();
    serve(server).await
}

/// Start a gateway that talks real Gemini over TLS.
pub async fn start_tls_gateway(config: GatewayConfig) -> TestGateway {
    let server = GatewayServer::new(config, Stylesheet::None).unwrap();
    serve(server).await
}

async fn serve(server: GatewayServer) -> TestGateway {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });
    TestGateway { addr, shutdown }
}

/// HTTP client that reports redirects instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
