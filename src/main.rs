//! Gemini-to-HTTP gateway binary.
//!
//! Startup order: config file, command-line overrides, validation, logging,
//! stylesheet, metrics, listener, server.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use gemini_gateway::config::{read_config, validate_config, ConfigError, GatewayConfig};
use gemini_gateway::http::GatewayServer;
use gemini_gateway::lifecycle::Shutdown;
use gemini_gateway::observability::{logging, metrics};
use gemini_gateway::render::Stylesheet;

#[derive(Parser)]
#[command(name = "gemini-gateway")]
#[command(about = "Serve a Gemini capsule as HTML over HTTP", version)]
struct Cli {
    /// Address to listen on, e.g. 0.0.0.0:8080
    #[arg(short, long)]
    bind: Option<String>,

    /// Local stylesheet to inline into every page
    #[arg(short = 's', long = "css-file", conflicts_with = "css_url")]
    css_file: Option<PathBuf>,

    /// External stylesheet URL to link from every page
    #[arg(short = 'e', long = "css-url")]
    css_url: Option<String>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Gemini root, e.g. gemini://example.org
    root: Option<String>,
}

impl Cli {
    fn apply(self, config: &mut GatewayConfig) {
        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }
        if let Some(path) = self.css_file {
            config.style.css_path = Some(path);
            config.style.css_url = None;
        }
        if let Some(url) = self.css_url {
            config.style.css_url = Some(url);
            config.style.css_path = None;
        }
        if let Some(root) = self.root {
            config.upstream.root = Some(root);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => GatewayConfig::default(),
    };
    cli.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init(&config.observability)?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        root = config.upstream.root.as_deref().unwrap_or_default(),
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        "gemini-gateway starting"
    );

    let stylesheet = Stylesheet::from_config(&config.style)?;

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let listener = TcpListener::bind(config.listener.bind_target()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = GatewayServer::new(config, stylesheet)?;
    let shutdown = Shutdown::new();
    shutdown.listen_for_signals();
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
