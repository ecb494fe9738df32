use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::blocking::BlockOutcome;
use crate::models::HostEvent;

use super::detection_service::DetectionService;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

const SLOW_EVENT_MS: u128 = 250;

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoopStats {
    pub received: u64,
    pub dispatched: u64,
    /// Events replaced by a newer one inside the same debounce window.
    pub coalesced: u64,
    pub blocked: u64,
}

/// Feeds host events to the service one at a time.
///
/// At most one event is dispatched per notification-timeout window. Events
/// that arrive while a window is still open are folded into the newest one,
/// since only the latest foreground snapshot matters.
pub async fn event_loop(
    service: Arc<DetectionService>,
    mut events: mpsc::Receiver<HostEvent>,
    cancel_token: CancellationToken,
) -> LoopStats {
    let window = Duration::from_millis(service.config().notification_timeout_ms);
    let mut last_dispatch: Option<Instant> = None;
    let mut stats = LoopStats::default();

    loop {
        let received = tokio::select! {
            received = events.recv() => received,
            _ = cancel_token.cancelled() => {
                log_info!("event loop shutting down");
                break;
            }
        };
        let Some(mut pending) = received else {
            log_info!("event source closed");
            break;
        };
        stats.received += 1;

        if let Some(last) = last_dispatch {
            tokio::select! {
                _ = tokio::time::sleep_until(last + window) => {}
                _ = cancel_token.cancelled() => {
                    log_info!("event loop shutting down with one event pending");
                    break;
                }
            }
        }

        while let Ok(newer) = events.try_recv() {
            stats.received += 1;
            stats.coalesced += 1;
            // A scannable event never gives way to one the router would ignore.
            if service.accepts(&newer.event) || !service.accepts(&pending.event) {
                pending = newer;
            }
        }

        last_dispatch = Some(Instant::now());
        stats.dispatched += 1;

        match dispatch(&service, pending).await {
            Ok(Some(outcome)) => {
                stats.blocked += 1;
                log_debug!("blocked: {:?}", outcome);
            }
            Ok(None) => {}
            // A panicking scan must not take the service down with it.
            Err(err) => log_error!("event handling failed: {err:?}"),
        }
    }

    service.on_destroy();
    stats
}

async fn dispatch(service: &Arc<DetectionService>, host_event: HostEvent) -> Result<Option<BlockOutcome>> {
    let started = Instant::now();
    let kind = host_event.event.kind;
    let service = Arc::clone(service);

    let outcome = tokio::task::spawn_blocking(move || {
        service.on_accessibility_event(Some(&host_event.event), host_event.root.as_ref())
    })
    .await
    .context("event worker join failed")?;

    let elapsed_ms = started.elapsed().as_millis();
    if elapsed_ms > SLOW_EVENT_MS {
        log_warn!("{} event took {}ms to handle", kind.as_str(), elapsed_ms);
    }

    Ok(outcome)
}
