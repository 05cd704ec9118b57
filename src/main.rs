//! Application entry point — video-digest.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (defaults on first run or when the file
//!    is unreadable) and apply the `VIDEO_DIGEST_API_URL` override.
//! 3. Create the [`tokio`] runtime.
//! 4. Build the [`ApiClient`] from the resolved service config and check
//!    `/health` in the background.
//! 5. Create the [`PipelineCoordinator`] and spawn the pane renderer.
//! 6. Spawn the stdin reader thread.
//! 7. Run the [`Console`] loop until `quit` or end of input.

use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::mpsc;
use video_digest::{
    config::AppConfig,
    console::{render_updates, Console},
    pipeline::PipelineCoordinator,
    service::{check_health, ApiClient, VideoService},
};

/// Upper bound on the startup health check; the console does not wait for it.
const HEALTH_CHECK_LIMIT: Duration = Duration::from_secs(5);

/// Forward stdin lines into `tx` from a dedicated OS thread; blocking reads
/// must stay off the runtime.
fn spawn_stdin_reader(tx: mpsc::Sender<String>) -> anyhow::Result<()> {
    std::thread::Builder::new()
        .name("stdin-reader".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.blocking_send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        log::warn!("stdin read failed: {e}");
                        break;
                    }
                }
            }
        })
        .context("failed to spawn stdin reader thread")?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("video-digest starting up");

    // 2. Configuration
    let config = AppConfig::load();
    log::info!("analysis service at {}", config.service.base_url);

    // 3. Tokio runtime
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    rt.block_on(async move {
        // 4. Remote capability client
        let service: Arc<dyn VideoService> = Arc::new(ApiClient::from_config(&config.service));
        let health_service = Arc::clone(&service);
        tokio::spawn(async move {
            match check_health(health_service.as_ref(), HEALTH_CHECK_LIMIT).await {
                Ok(()) => log::info!("analysis service is healthy"),
                Err(e) => log::warn!("analysis service health check failed: {e}"),
            }
        });

        // 5. Coordinator + renderer
        let coordinator = PipelineCoordinator::new(Arc::clone(&service));
        tokio::spawn(render_updates(coordinator.subscribe(), config.ui.clone()));

        // 6. Input
        let (line_tx, line_rx) = mpsc::channel::<String>(16);
        spawn_stdin_reader(line_tx)?;

        // 7. Console loop
        Console::new(coordinator, service, config.ui).run(line_rx).await;
        Ok::<_, anyhow::Error>(())
    })
}
