use std::convert::Infallible;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use hyper::Request;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::service::TowerToHyperService;
use tokio::net::TcpListener;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tower::ServiceBuilder;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use server::tower_middle::TimeoutLayer;
use server::{AppState, build_router};
use shared::config::{load_config, validate_config};
use shared::types::AppConfig;

const DEFAULT_CONFIG: &str = "config.toml";

#[derive(Debug, Parser)]
#[command(name = "server", about = "Session-gated botdeck dashboard server")]
struct Args {
    /// Path to the TOML config. Without it, ./config.toml is used when
    /// present and built-in defaults otherwise.
    #[arg(short, long)]
    config: Option<String>,
}

fn startup_config(args: &Args) -> Result<(AppConfig, Option<String>)> {
    match &args.config {
        Some(path) => {
            let cfg = load_config(path).with_context(|| format!("Failed to load {}", path))?;
            Ok((cfg, Some(path.clone())))
        }
        None if Path::new(DEFAULT_CONFIG).exists() => {
            let cfg = load_config(DEFAULT_CONFIG)
                .with_context(|| format!("Failed to load {}", DEFAULT_CONFIG))?;
            Ok((cfg, Some(DEFAULT_CONFIG.to_string())))
        }
        None => {
            warn!("No {} found, running with defaults", DEFAULT_CONFIG);
            let cfg = AppConfig::default();
            validate_config(&cfg).context("Default config is invalid")?;
            Ok((cfg, None))
        }
    }
}

/// Reload the config file on SIGHUP. A bad file keeps the old config live.
#[cfg(unix)]
fn spawn_reload_listener(state: AppState, path: String) -> Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut hangups = signal(SignalKind::hangup()).context("Failed to install SIGHUP handler")?;

    tokio::spawn(async move {
        while hangups.recv().await.is_some() {
            info!("SIGHUP received, reloading {}", path);
            match load_config(&path) {
                Ok(new) => {
                    let old = state.config.snapshot().await;
                    if old.session.extra_public_paths != new.session.extra_public_paths
                        || old.server.addr() != new.server.addr()
                    {
                        warn!("Public paths and listen address only change on restart");
                    }
                    state.config.reload(new).await;
                    info!("Configuration reloaded");
                }
                Err(e) => error!("Reload failed, keeping previous config: {}", e),
            }
        }
    });

    Ok(())
}

/// Wait for a connection slot, giving up as soon as `shutdown` resolves.
async fn acquire_or_shutdown<F>(
    limiter: &Arc<Semaphore>,
    shutdown: &mut F,
) -> Result<Option<OwnedSemaphorePermit>>
where
    F: Future + Unpin,
{
    tokio::select! {
        permit = limiter.clone().acquire_owned() => {
            Ok(Some(permit.context("Connection limiter closed")?))
        }
        _ = shutdown => Ok(None),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let (config, config_path) = startup_config(&args)?;

    let addr = config.server.addr();
    let timeout = config.server.request_timeout();
    let limiter = Arc::new(Semaphore::new(config.server.max_connections));

    let state = AppState::new(config);
    let router = Arc::new(build_router());

    #[cfg(unix)]
    {
        if let Some(path) = config_path {
            spawn_reload_listener(state.clone(), path)?;
        }
    }
    #[cfg(not(unix))]
    let _ = config_path;

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Listening on http://{}", addr);
    info!(
        "Public paths: {}",
        state.gate.public_paths().collect::<Vec<_>>().join(", ")
    );

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        let Some(permit) = acquire_or_shutdown(&limiter, &mut shutdown).await? else {
            info!("Shutdown requested");
            break;
        };

        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    warn!("Accept failed: {}", e);
                    continue;
                }
            },
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
        };

        let io = TokioIo::new(stream);
        let router = router.clone();
        let state = state.clone();

        tokio::task::spawn(async move {
            let _permit = permit;

            let service = tower::service_fn(move |req: Request<Incoming>| {
                let router = router.clone();
                let state = state.clone();
                async move { Ok::<_, Infallible>(router.handle(req, state).await) }
            });
            let service = ServiceBuilder::new()
                .layer(TimeoutLayer::new(timeout))
                .service(service);

            if let Err(err) = http1::Builder::new()
                .timer(TokioTimer::new())
                .serve_connection(io, TowerToHyperService::new(service))
                .await
            {
                debug!("Error serving connection from {}: {:?}", peer, err);
            }
        });
    }

    info!("Server closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn free_slot_yields_a_permit() {
        let limiter = Arc::new(Semaphore::new(1));
        let mut never = std::future::pending::<()>();

        let permit = acquire_or_shutdown(&limiter, &mut never).await.unwrap();
        assert!(permit.is_some());
        assert_eq!(limiter.available_permits(), 0);
    }

    #[tokio::test]
    async fn shutdown_wins_when_every_slot_is_taken() {
        let limiter = Arc::new(Semaphore::new(1));
        let _held = limiter.clone().acquire_owned().await.unwrap();
        let mut stop = std::future::ready(());

        let outcome = tokio::time::timeout(
            Duration::from_secs(1),
            acquire_or_shutdown(&limiter, &mut stop),
        )
        .await
        .expect("shutdown should not wait for a free slot");
        assert!(outcome.unwrap().is_none());
    }
}
