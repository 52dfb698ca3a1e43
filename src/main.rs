use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use mailpulse::application::usecases::RecordOpenUseCase;
use mailpulse::application::KeyValueStore;
use mailpulse::infrastructure::{
    console_notifier::ConsoleNotifier,
    memory_store::{DisabledStore, InMemoryStore},
    multi_notifier::MultiNotifier,
    ntfy_notifier::NtfyNotifier,
    redis_store::RedisStore,
};
use mailpulse::interfaces::config::Config;
use mailpulse::interfaces::http_api::{ApiState, build_router};

#[derive(Parser, Debug)]
#[command(name = "mailpulse")]
struct Args {
    /// Path to a config.yaml; environment variables are used when omitted
    #[arg(long)]
    config: Option<String>,

    /// Do not send external notifications (console only)
    #[arg(long)]
    dry_run: bool,

    /// Keep tracking records in process memory instead of Redis
    #[arg(long)]
    memory_store: bool,
}

#[tokio::main]
async fn main() {
    if dotenvy::dotenv().is_err() {
        let _ = dotenvy::from_path(std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(".env"));
    }
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                "mailpulse=info"
                    .parse()
                    .unwrap_or_else(|_| LevelFilter::INFO.into()),
            ),
        )
        .init();
    let args = Args::parse();

    // 1) load config
    let loaded = match &args.config {
        Some(path) => Config::load_from_file(path),
        None => Config::from_env(),
    };
    let cfg = match loaded {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    // 2) build infra
    let store = build_store(&cfg, args.memory_store).await;

    let mut notifier = MultiNotifier::new().with_channel("console", ConsoleNotifier::new());

    if !args.dry_run {
        if cfg.ntfy_topic.is_empty() {
            tracing::warn!("NTFY_TOPIC not set, notifications will be skipped");
        }
        notifier = notifier.with_channel(
            "ntfy",
            NtfyNotifier::with_base_url(cfg.ntfy_base_url.clone(), cfg.ntfy_topic.clone())
                .with_timeout(cfg.notify_timeout()),
        );
    } else {
        tracing::warn!("--dry-run enabled: only console output");
    }
    tracing::info!(channels = ?notifier.channels(), "notifiers ready");

    // 3) usecase + router
    let record_open = RecordOpenUseCase {
        store,
        notifier: Arc::new(notifier),
        policy: cfg.activation_policy(),
    };
    let app = build_router(ApiState { record_open });

    // 4) serve
    let listener = match TcpListener::bind(&cfg.listen_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind {}: {e}", cfg.listen_addr);
            std::process::exit(1);
        }
    };
    tracing::info!(addr = %cfg.listen_addr, "pixel server running");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }

    tracing::info!("server shut down");
}

async fn build_store(cfg: &Config, in_memory: bool) -> Arc<dyn KeyValueStore> {
    if in_memory {
        tracing::warn!("--memory-store enabled: records are lost on restart");
        return Arc::new(InMemoryStore::new());
    }

    if cfg.redis_url.is_empty() {
        tracing::warn!("No REDIS_URL configured, running in pixel-only mode");
        return Arc::new(DisabledStore);
    }

    let store = match RedisStore::new(&cfg.redis_url) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Invalid REDIS_URL, running in pixel-only mode: {e}");
            return Arc::new(DisabledStore);
        }
    };

    match store.warm_up().await {
        Ok(()) => tracing::info!("Redis connected"),
        Err(e) => tracing::warn!("Redis not reachable yet, retrying on each request: {e}"),
    }
    Arc::new(store)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
