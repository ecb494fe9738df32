pub mod blocking;
pub mod config;
pub mod detection;
pub mod host_bridge;
pub mod models;
pub mod service;
pub mod settings;
mod utils;

#[cfg(test)]
mod testing;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use log::{info, warn};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;

use config::DetectionConfig;
use host_bridge::{ConsoleHost, ServiceRegistration};
use models::HostEvent;
use service::{DetectionService, LoopStats, ServiceController};
use settings::{CounterStore, LaunchPrefs, PreferenceStore, KEY_BLOCKED_COUNT, PREFS_NAME};

const DATA_DIR_ENV: &str = "JUDSTOP_DATA_DIR";
const DEFAULT_DATA_DIR: &str = "judstop-data";
const CONFIG_FILE: &str = "detection.json";
const EVENT_QUEUE_DEPTH: usize = 64;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplaySummary {
    registration: ServiceRegistration,
    stats: LoopStats,
    blocked_count: u64,
    back_actions: u64,
}

/// Desktop host: replays newline-delimited JSON `HostEvent`s from stdin
/// through the detection service and prints a JSON summary on stdout.
pub fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("JudStop starting up...");

    let data_dir = std::env::var_os(DATA_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

    let config = DetectionConfig::load(&data_dir.join(CONFIG_FILE))?;

    let launch_prefs = LaunchPrefs::open(&data_dir)?;
    if !launch_prefs.first_launch_dialog_shown()? {
        info!("First launch: enable the accessibility service to start blocking gambling sites");
        launch_prefs.mark_first_launch_dialog_shown()?;
    }

    let counter = Arc::new(PreferenceStore::open(&data_dir, PREFS_NAME)?);
    let host = Arc::new(ConsoleHost::new());
    let service = Arc::new(DetectionService::new(
        Arc::new(config),
        counter.clone(),
        host.clone(),
        host.clone(),
    ));
    service.on_service_connected(host.as_ref())?;
    let registration = host
        .registration()
        .context("service connected without registering")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    let stats = runtime.block_on(replay(Arc::clone(&service), tokio::io::stdin()))?;

    let summary = ReplaySummary {
        registration,
        stats,
        blocked_count: counter.read(KEY_BLOCKED_COUNT)?,
        back_actions: host.back_actions(),
    };
    info!(
        "Replay finished: {} events received, {} blocked, {} blocked in total",
        summary.stats.received, summary.stats.blocked, summary.blocked_count
    );
    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}

/// Feeds newline-delimited JSON events from `input` to a freshly started
/// event loop. The loop is always shut down before this returns, even when
/// reading fails.
async fn replay<R>(service: Arc<DetectionService>, input: R) -> Result<LoopStats>
where
    R: AsyncRead + Unpin,
{
    let (tx, rx) = mpsc::channel::<HostEvent>(EVENT_QUEUE_DEPTH);
    let mut controller = ServiceController::new();
    controller.start(Arc::clone(&service), rx)?;

    let reader = async move {
        let mut lines = BufReader::new(input).lines();
        let mut line_no = 0usize;
        while let Some(line) = lines.next_line().await.context("failed to read event input")? {
            line_no += 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<HostEvent>(line) {
                Ok(event) => {
                    if tx.send(event).await.is_err() {
                        warn!("event loop stopped; discarding remaining input");
                        break;
                    }
                }
                Err(err) => warn!("skipping malformed event on line {line_no}: {err}"),
            }
        }
        Ok::<(), anyhow::Error>(())
    };

    tokio::select! {
        result = reader => match result {
            Ok(()) => controller.join().await,
            Err(err) => {
                if let Err(stop_err) = controller.stop().await {
                    warn!("event loop did not shut down cleanly: {stop_err:?}");
                }
                Err(err)
            }
        },
        _ = tokio::signal::ctrl_c() => {
            service.on_interrupt();
            controller.stop().await
        }
    }
}
