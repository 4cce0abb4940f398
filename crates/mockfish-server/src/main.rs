//! mockfish server
//!
//! Redfish-style management API over HTTPS, backed by in-memory stores.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use mockfish_core::config::load_config;
use mockfish_core::tracing_init::init_tracing;
use mockfish_server::auth::StaticCredentials;
use mockfish_server::server::{AppState, build_router};
use mockfish_server::tls::TlsMode;

#[derive(Parser, Debug)]
#[command(name = "mockfish-server")]
#[command(version, about = "mockfish - Redfish-style management API")]
struct Args {
    /// JSON configuration file, applied before flags and environment.
    #[arg(long, env = "MOCKFISH_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address (`host:port` or `:port`).
    #[arg(long, env = "SERVER_ADDRESS")]
    address: Option<String>,

    /// Request body read timeout in seconds.
    #[arg(long, env = "SERVER_READ_TIMEOUT")]
    read_timeout: Option<u64>,

    /// Response write timeout in seconds.
    #[arg(long, env = "SERVER_WRITE_TIMEOUT")]
    write_timeout: Option<u64>,

    /// Grace period for in-flight requests on shutdown, in seconds.
    #[arg(long, env = "MOCKFISH_SHUTDOWN_TIMEOUT")]
    shutdown_timeout: Option<u64>,

    /// Serve HTTPS (`false` serves plaintext HTTP).
    #[arg(long, env = "TLS_ENABLED")]
    tls_enabled: Option<bool>,

    /// PEM certificate file.
    #[arg(long, env = "TLS_CERT_FILE")]
    tls_cert: Option<PathBuf>,

    /// PEM private key file.
    #[arg(long, env = "TLS_KEY_FILE")]
    tls_key: Option<PathBuf>,

    /// Generate a self-signed development certificate at startup.
    #[arg(long, env = "MOCKFISH_DEV_TLS")]
    dev_tls: bool,

    /// Session lifetime in seconds.
    #[arg(long, env = "MOCKFISH_SESSION_TTL")]
    session_ttl: Option<u64>,

    /// Reject sessions past their expiry.
    #[arg(long, env = "MOCKFISH_ENFORCE_SESSION_EXPIRY")]
    enforce_session_expiry: Option<bool>,

    /// Delay between task progress steps in milliseconds.
    #[arg(long, env = "MOCKFISH_TASK_STEP_DELAY_MS")]
    task_step_delay_ms: Option<u64>,

    /// Maximum number of tasks executing at once.
    #[arg(long, env = "MOCKFISH_TASK_WORKERS")]
    task_workers: Option<usize>,

    /// Pending tasks accepted before new actions are refused.
    #[arg(long, env = "MOCKFISH_TASK_QUEUE")]
    task_queue: Option<usize>,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long, env = "MOCKFISH_LOG_JSON")]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing("mockfish_server=info,tower_http=info", args.log_json)?;

    let mut config = load_config(args.config.as_deref())?;
    if let Some(address) = args.address {
        config.address = address;
    }
    if let Some(secs) = args.read_timeout {
        config.read_timeout_secs = secs;
    }
    if let Some(secs) = args.write_timeout {
        config.write_timeout_secs = secs;
    }
    if let Some(secs) = args.shutdown_timeout {
        config.shutdown_timeout_secs = secs;
    }
    if let Some(enabled) = args.tls_enabled {
        config.tls.enabled = enabled;
    }
    if let Some(cert) = args.tls_cert {
        config.tls.cert_file = cert;
    }
    if let Some(key) = args.tls_key {
        config.tls.key_file = key;
    }
    if args.dev_tls {
        config.tls.enabled = true;
        config.tls.dev_self_signed = true;
    }
    if let Some(ttl) = args.session_ttl {
        config.sessions.ttl_secs = ttl;
    }
    if let Some(enforce) = args.enforce_session_expiry {
        config.sessions.enforce_expiry = enforce;
    }
    if let Some(ms) = args.task_step_delay_ms {
        config.tasks.step_delay_ms = ms;
    }
    if let Some(workers) = args.task_workers {
        config.tasks.workers = workers;
    }
    if let Some(capacity) = args.task_queue {
        config.tasks.queue_capacity = capacity;
    }
    config.validate()?;
    let addr: SocketAddr = config.socket_addr()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %addr,
        "Starting mockfish-server"
    );

    // axum-server is built without a default crypto provider.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let state = AppState::new(&config, Arc::new(StaticCredentials::seeded()));
    spawn_maintenance(&state, &config);
    let app = build_router(state);

    let handle = axum_server::Handle::new();
    let shutdown_handle = handle.clone();
    let grace = config.shutdown_timeout();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_handle.graceful_shutdown(Some(grace));
    });

    match TlsMode::from_settings(&config.tls).to_rustls_config().await? {
        Some(tls) => {
            info!(addr = %addr, "Listening with TLS");
            axum_server::bind_rustls(addr, tls)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            warn!(addr = %addr, "TLS disabled, serving plaintext HTTP");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
    }

    info!("mockfish-server stopped");
    Ok(())
}

/// Background sweeps for expired sessions and finished tasks.
fn spawn_maintenance(state: &AppState, config: &mockfish_core::ServerConfig) {
    let identity = Arc::clone(&state.identity);
    let purge_every = Duration::from_secs(config.sessions.purge_interval_secs.max(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(purge_every);
        interval.tick().await; // Skip first immediate tick
        loop {
            interval.tick().await;
            let removed = identity.purge_expired().await;
            if removed > 0 {
                info!(removed, "Expired sessions purged");
            }
        }
    });

    let auto_delete_minutes = config.tasks.auto_delete_minutes;
    if auto_delete_minutes == 0 {
        return;
    }
    let tasks = Arc::clone(&state.tasks);
    let Some(retention) = i64::try_from(auto_delete_minutes)
        .ok()
        .and_then(chrono::TimeDelta::try_minutes)
    else {
        warn!(auto_delete_minutes, "Task auto-delete window out of range, disabled");
        return;
    };
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        interval.tick().await; // Skip first immediate tick
        loop {
            interval.tick().await;
            let cutoff = chrono::Utc::now() - retention;
            let removed = tasks.purge_finished_before(cutoff).await;
            if removed > 0 {
                info!(removed, "Finished tasks auto-deleted");
            }
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown"),
        () = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}
