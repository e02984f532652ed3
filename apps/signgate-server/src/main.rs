//! SignGate Server - authenticates `SignedRequest` traffic.
//!
//! Loads the authorized clients from a JSON file, verifies the HMAC-SHA1
//! signature of every incoming request and serves a small set of endpoints
//! behind the check.
//!
//! # Usage
//!
//! ```text
//! SIGNGATE_CLIENTS_FILE=clients.json SIGNGATE_REQUIRE_AUTH=true signgate-server
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SIGNGATE_LISTEN` | `0.0.0.0:8080` | Bind address |
//! | `SIGNGATE_CLIENTS_FILE` | *(unset)* | JSON client registry |
//! | `SIGNGATE_REQUIRE_AUTH` | `false` | Reject unauthenticated requests |
//! | `SIGNGATE_MAX_BODY_SIZE` | `10485760` | Buffered body limit in bytes |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

mod handler;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use signgate_auth::{ClientRegistry, SignatureVerifier, StaticClientRegistry};
use signgate_core::{SignGateConfig, SignGateError, SignGateResult};
use signgate_http::{SignGateHttpConfig, SignGateHttpService};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::handler::GatewayHandler;

/// Server version reported at startup.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

/// Load the client registry named by the configuration, if any.
fn build_registry(config: &SignGateConfig) -> SignGateResult<Option<Arc<dyn ClientRegistry>>> {
    let Some(path) = config.clients_file.as_deref() else {
        return Ok(None);
    };

    let registry = StaticClientRegistry::from_json_file(path)
        .map_err(|e| SignGateError::Config(format!("cannot load clients from {path}: {e}")))?;
    if registry.is_empty() {
        warn!(path, "client registry is empty, no request can authenticate");
    }

    Ok(Some(Arc::new(registry)))
}

/// Build the [`SignGateHttpConfig`] from the application [`SignGateConfig`].
fn build_http_config(config: &SignGateConfig) -> SignGateResult<SignGateHttpConfig> {
    let verifier = build_registry(config)?.map(SignatureVerifier::new);
    if verifier.is_none() {
        warn!("no SIGNGATE_CLIENTS_FILE configured, signature verification is disabled");
    }

    Ok(SignGateHttpConfig {
        require_authentication: config.require_authentication,
        max_body_size: config.max_body_size,
        verifier,
    })
}

/// Run the accept loop, serving connections until a shutdown signal is received.
async fn serve(listener: TcpListener, service: SignGateHttpService<GatewayHandler>) -> Result<()> {
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal, draining connections");
    };

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let svc = service.clone();
                let conn = http.serve_connection(TokioIo::new(stream), svc);
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }

            () = &mut shutdown => {
                info!("shutting down gracefully");
                break;
            }
        }
    }

    graceful.shutdown().await;
    info!("all connections drained, exiting");

    Ok(())
}

/// Perform a health check by connecting to the gateway and requesting the health endpoint.
async fn run_health_check(addr: &str) -> Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("cannot connect to {addr}"))?;

    let (mut reader, mut writer) = stream.into_split();

    let request = format!("GET /health HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    writer.write_all(request.as_bytes()).await?;
    writer.shutdown().await?;

    let mut response = String::new();
    reader.read_to_string(&mut response).await?;

    if response.contains("200 OK") && response.contains("\"status\":\"running\"") {
        Ok(())
    } else {
        anyhow::bail!("unhealthy response from {addr}")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Handle --health-check flag for container health probes.
    if std::env::args().any(|a| a == "--health-check") {
        let config = SignGateConfig::from_env();
        let addr = config.listen.replace("0.0.0.0", "127.0.0.1");
        let healthy = run_health_check(&addr).await.is_ok();
        std::process::exit(i32::from(!healthy));
    }

    let config = SignGateConfig::from_env();

    init_tracing(&config.log_level)?;

    info!(
        listen = %config.listen,
        clients_file = ?config.clients_file,
        require_authentication = config.require_authentication,
        max_body_size = config.max_body_size,
        version = VERSION,
        "starting SignGate Server",
    );

    let http_config = build_http_config(&config).context("invalid SignGate configuration")?;
    let service = SignGateHttpService::new(GatewayHandler, http_config);

    let addr: SocketAddr = config
        .listen
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.listen))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(%addr, "listening for connections");

    serve(listener, service).await
}
