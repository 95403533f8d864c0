//! Photo Bingo binary entrypoint: restores the saved game, runs the persistence
//! loop and serves the HTTP API until a shutdown signal arrives.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use photo_bingo::{
    config::AppConfig,
    dao::byte_store::{ByteStorage, FsStorage},
    routes,
    services::{
        loader::load_state,
        persistence::{self, SnapshotWriter, save_channel},
    },
    state::{AppState, SharedState},
};
use tokio::{net::TcpListener, sync::watch, time::timeout};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let image_dir = &config.image_dir;
    tokio::fs::create_dir_all(image_dir)
        .await
        .with_context(|| format!("creating image directory `{image_dir}`"))?;

    let addr = config.socket_addr();
    let grace = config.shutdown_grace;
    let paths = config.snapshot_paths();
    let storage: Arc<dyn ByteStorage> = Arc::new(FsStorage::new());
    let (save_trigger, save_queue) = save_channel(config.save_queue_capacity);
    let app_state = AppState::new(config, save_trigger, storage.clone());

    load_state(app_state.game(), storage.as_ref(), &paths.latest)
        .await
        .context("loading saved game state")?;

    let (stop_persistence, persistence_stopped) = watch::channel(false);
    let persistence = tokio::spawn(persistence::run(
        app_state.clone(),
        SnapshotWriter::new(storage, paths),
        save_queue,
        persistence_stopped,
    ));

    let app = build_router(app_state);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "starting server");

    let (stop_server, mut server_stopped) = watch::channel(false);
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = server_stopped.wait_for(|stop| *stop).await;
            })
            .await
    });

    let finished = tokio::select! {
        result = &mut server => Some(result),
        () = shutdown_signal() => None,
    };
    // Handlers must be done mutating before the final save.
    let served = match finished {
        Some(result) => result,
        None => {
            info!(?grace, "shutdown signal received; draining in-flight requests");
            let _ = stop_server.send(true);
            match timeout(grace, &mut server).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(?grace, "requests still running after grace period; aborting them");
                    server.abort();
                    Ok(Ok(()))
                }
            }
        }
    };

    let _ = stop_persistence.send(true);
    persistence.await.context("persistence loop panicked")?;

    served.context("server task panicked")?.context("serving axum")?;
    info!("server stopped");
    Ok(())
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state).layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler; only Ctrl+C stops the server");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
