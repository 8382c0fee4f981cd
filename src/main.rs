use cycle_countdown::{
    clock::SystemClock,
    effects::ParticleSpawner,
    keep_awake::{AplayLoop, InhibitLock, KeepAwake},
    router, runtime,
    storage::FileStore,
    AppState, Config, CycleTracker, Page,
};
use rand::{rngs::StdRng, SeedableRng};
use std::sync::Arc;
use tokio::{fs, sync::Mutex};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    if let Some(parent) = config.data_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let tracker = CycleTracker::new(FileStore::new(&config.data_path), SystemClock);
    let page = Arc::new(Mutex::new(Page::new(
        tracker,
        ParticleSpawner::new(StdRng::from_entropy()),
    )));
    let outcome = runtime::with_page_blocking(&page, |page| page.load()).await?;
    runtime::handle_outcome(&page, &outcome);
    runtime::spawn_render_loop(Arc::clone(&page));
    runtime::spawn_particle_loop(Arc::clone(&page));

    let keep_awake = if config.keep_awake {
        let lock = config
            .lock_command
            .clone()
            .map(|command| InhibitLock::new(command.program, command.args))
            .unwrap_or_default();
        let audio = config
            .audio_command
            .clone()
            .map(|command| AplayLoop::new(command.program, command.args))
            .unwrap_or_default();
        let keep_awake = Arc::new(Mutex::new(KeepAwake::new(lock, audio)));
        runtime::spawn_keep_awake(Arc::clone(&keep_awake));
        Some(keep_awake)
    } else {
        info!("keep-awake disabled");
        None
    };

    let app = router(AppState::new(page, keep_awake));

    info!("listening on http://{}", config.addr);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
