//! Leadscore HTTP server entrypoint.

use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use leadscore::booster::Booster;
use leadscore::config::Config;
use leadscore::constants::{DEFAULT_NUM_LAYERS, DEFAULT_PORT};
use leadscore::embedding::ProfileEncoder;
use leadscore::gateway::{AppState, create_router_with_cors, create_router_with_state};
use leadscore::scoring::ProfileScorer;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!(
        r#"
██╗     ███████╗ █████╗ ██████╗ ███████╗ ██████╗ ██████╗ ██████╗ ███████╗
██║     ██╔════╝██╔══██╗██╔══██╗██╔════╝██╔════╝██╔═══██╗██╔══██╗██╔════╝
██║     █████╗  ███████║██║  ██║███████╗██║     ██║   ██║██████╔╝█████╗
██║     ██╔══╝  ██╔══██║██║  ██║╚════██║██║     ██║   ██║██╔══██╗██╔══╝
███████╗███████╗██║  ██║██████╔╝███████║╚██████╗╚██████╔╝██║  ██║███████╗
╚══════╝╚══════╝╚═╝  ╚═╝╚═════╝ ╚══════╝ ╚═════╝ ╚═════╝ ╚═╝  ╚═╝╚══════╝

        READ. EMBED. SCORE.
                                        AGPL-3.0
"#
    );

    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr = config.socket_addr();

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        booster = %config.booster_path.display(),
        stub_encoder = config.stub_encoder,
        "Leadscore starting"
    );

    let booster = Booster::load(&config.booster_path)?;

    let mut encoder_config = config.encoder_config();
    if config.stub_encoder {
        tracing::warn!("LEADSCORE_STUB_ENCODER is set, scores are not meaningful");
        encoder_config = encoder_config.with_stub_dims(booster.num_features(), DEFAULT_NUM_LAYERS);
    }
    let encoder = ProfileEncoder::load(encoder_config)?;

    let scorer = ProfileScorer::new(encoder, booster)?;
    let state = AppState::new(scorer);

    let app = if config.cors {
        create_router_with_cors(state)
    } else {
        create_router_with_state(state)
    };

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Leadscore shutdown complete");
    Ok(())
}

fn run_health_check() -> i32 {
    let port = std::env::var("LEADSCORE_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let Ok(rt) = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    else {
        return 1;
    };

    rt.block_on(async {
        let Ok(client) = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
        else {
            return 1;
        };

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
