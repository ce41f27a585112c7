//! Test server harness.

use std::net::SocketAddr;
use std::time::Duration;

use leadscore::booster::Booster;
use leadscore::config::Config;
use leadscore::embedding::{EncoderConfig, ProfileEncoder};
use leadscore::gateway::{AppState, create_router_with_state};
use leadscore::scoring::ProfileScorer;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::fixtures::{logistic_booster_json, write_tiny_bundle};

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;

/// Which encoder the test server runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncoderKind {
    /// Deterministic hash-based hidden states; no files.
    #[default]
    Stub,
    /// Tiny random-weight BERT written to a temp dir and loaded from disk.
    TinyModel,
}

#[derive(Debug, Clone)]
pub struct TestServerConfig {
    pub port: u16,
    pub encoder: EncoderKind,
    /// Hidden size of the stub encoder (and feature count of its booster).
    pub stub_hidden_size: usize,
}

impl Default for TestServerConfig {
    fn default() -> Self {
        Self {
            port: 0,
            encoder: EncoderKind::Stub,
            stub_hidden_size: 32,
        }
    }
}

impl TestServerConfig {
    pub fn tiny_model() -> Self {
        Self {
            encoder: EncoderKind::TinyModel,
            ..Default::default()
        }
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    _temp_dir: Option<TempDir>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn find_available_port() -> std::io::Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    Ok(addr.port())
}

pub async fn wait_for_server_ready(
    addr: SocketAddr,
    timeout: Duration,
    interval: Duration,
) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();

    loop {
        if start.elapsed() > timeout {
            return Err(ServerStartupError::Timeout);
        }

        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => {
                tokio::time::sleep(interval).await;
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Server startup failed: {0}")]
    StartupFailed(String),
}

fn startup_failed(e: impl std::fmt::Display) -> ServerStartupError {
    ServerStartupError::StartupFailed(e.to_string())
}

/// Builds the scorer the way the binary does: booster first, then encoder, then the
/// width check.
fn build_scorer(
    config: &TestServerConfig,
) -> Result<(ProfileScorer, Option<TempDir>), ServerStartupError> {
    match config.encoder {
        EncoderKind::Stub => {
            let booster =
                Booster::from_json_str(&logistic_booster_json(config.stub_hidden_size).to_string())
                    .map_err(startup_failed)?;
            let encoder = ProfileEncoder::load(
                EncoderConfig::stub().with_stub_dims(config.stub_hidden_size, 12),
            )
            .map_err(startup_failed)?;
            let scorer = ProfileScorer::new(encoder, booster).map_err(startup_failed)?;
            Ok((scorer, None))
        }
        EncoderKind::TinyModel => {
            let temp_dir = TempDir::new().map_err(startup_failed)?;
            let bundle = write_tiny_bundle(temp_dir.path());

            let server_config = Config {
                encoder_path: bundle.encoder_dir,
                tokenizer_path: bundle.tokenizer_dir,
                booster_path: bundle.booster_path,
                ..Default::default()
            };
            server_config.validate().map_err(startup_failed)?;

            let booster = Booster::load(&server_config.booster_path).map_err(startup_failed)?;
            let encoder =
                ProfileEncoder::load(server_config.encoder_config()).map_err(startup_failed)?;
            let scorer = ProfileScorer::new(encoder, booster).map_err(startup_failed)?;
            Ok((scorer, Some(temp_dir)))
        }
    }
}

/// Spawns a server on a loopback port backed by the configured encoder.
///
/// The server shuts down when the returned [`TestServer`] is dropped.
pub async fn spawn_test_server(config: TestServerConfig) -> Result<TestServer, ServerStartupError> {
    let port = if config.port == 0 {
        find_available_port().await?
    } else {
        config.port
    };

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;

    let (scorer, temp_dir) = build_scorer(&config)?;
    let app = create_router_with_state(AppState::new(scorer));

    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    wait_for_server_ready(
        local_addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok(TestServer {
        addr: local_addr,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
        _temp_dir: temp_dir,
    })
}
