use std::sync::Arc;

use anyhow::{bail, Context, Result};
use log::info;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::models::HostEvent;

use super::detection_service::DetectionService;
use super::loop_worker::{event_loop, LoopStats};

pub struct ServiceController {
    handle: Option<JoinHandle<LoopStats>>,
    cancel_token: Option<CancellationToken>,
}

impl ServiceController {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
        }
    }

    /// Spawns the event loop on the current runtime.
    pub fn start(
        &mut self,
        service: Arc<DetectionService>,
        events: mpsc::Receiver<HostEvent>,
    ) -> Result<()> {
        if self.handle.is_some() {
            bail!("event loop already active");
        }

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(event_loop(service, events, cancel_token.clone()));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        info!("Event loop started");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Waits for the event source to close and the backlog to drain.
    pub async fn join(&mut self) -> Result<LoopStats> {
        self.cancel_token = None;
        self.await_loop().await
    }

    /// Cancels the loop; events still queued are dropped.
    pub async fn stop(&mut self) -> Result<LoopStats> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        self.await_loop().await
    }

    async fn await_loop(&mut self) -> Result<LoopStats> {
        match self.handle.take() {
            Some(handle) => handle.await.context("event loop task failed to join"),
            None => Ok(LoopStats::default()),
        }
    }
}

impl Default for ServiceController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DetectionConfig;
    use crate::models::{DetectionEvent, EventKind, NodeSnapshot};
    use crate::settings::{CounterStore, KEY_BLOCKED_COUNT};
    use crate::testing::{MemoryCounter, RecordingHost};
    use tokio::time::{sleep, Duration};

    fn service(timeout_ms: u64, host: &Arc<RecordingHost>, counter: &Arc<MemoryCounter>) -> Arc<DetectionService> {
        let mut config = DetectionConfig::default();
        config.notification_timeout_ms = timeout_ms;
        Arc::new(DetectionService::new(
            Arc::new(config),
            counter.clone(),
            host.clone(),
            host.clone(),
        ))
    }

    fn gambling_event(text: &str) -> HostEvent {
        HostEvent {
            event: DetectionEvent::new(EventKind::ContentChanged, Some("com.android.chrome")),
            root: Some(NodeSnapshot::new().with_child(NodeSnapshot::with_text(text))),
        }
    }

    #[tokio::test]
    async fn spaced_events_are_each_handled() -> Result<()> {
        let host = Arc::new(RecordingHost::new());
        let counter = Arc::new(MemoryCounter::new());
        let (tx, rx) = mpsc::channel(16);

        let mut controller = ServiceController::new();
        controller.start(service(1, &host, &counter), rx)?;
        assert!(controller.start(service(1, &host, &counter), mpsc::channel(1).1).is_err());

        for text in ["slot gacor", "casino", "togel"] {
            tx.send(gambling_event(text)).await?;
            sleep(Duration::from_millis(30)).await;
        }
        drop(tx);

        let stats = controller.join().await?;
        assert_eq!(stats.dispatched, 3);
        assert_eq!(stats.blocked, 3);
        assert_eq!(counter.read(KEY_BLOCKED_COUNT)?, 3);
        assert_eq!(host.notifications().len(), 3);
        assert_eq!(host.back_actions(), 3);
        assert!(!controller.is_running());
        Ok(())
    }

    #[tokio::test]
    async fn burst_inside_window_is_coalesced() -> Result<()> {
        let host = Arc::new(RecordingHost::new());
        let counter = Arc::new(MemoryCounter::new());
        let (tx, rx) = mpsc::channel(16);

        // Queued before the loop starts, so the whole burst drains at once.
        tx.send(gambling_event("read a book")).await?;
        for _ in 0..4 {
            tx.send(gambling_event("weather")).await?;
        }
        tx.send(gambling_event("slot online")).await?;
        drop(tx);

        let mut controller = ServiceController::new();
        controller.start(service(50, &host, &counter), rx)?;
        let stats = controller.join().await?;

        assert_eq!(stats.received, 6);
        assert_eq!(stats.dispatched, 1);
        assert_eq!(stats.coalesced, 5);
        assert_eq!(stats.blocked, 1);
        assert_eq!(host.back_actions(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn ignored_kinds_do_not_displace_window_changes() -> Result<()> {
        let host = Arc::new(RecordingHost::new());
        let counter = Arc::new(MemoryCounter::new());
        let (tx, rx) = mpsc::channel(16);

        tx.send(gambling_event("poker")).await?;
        let mut click = gambling_event("nothing");
        click.event.kind = EventKind::Other;
        tx.send(click).await?;
        drop(tx);

        let mut controller = ServiceController::new();
        controller.start(service(50, &host, &counter), rx)?;
        let stats = controller.join().await?;

        assert_eq!(stats.dispatched, 1);
        assert_eq!(stats.blocked, 1);
        Ok(())
    }

    #[tokio::test]
    async fn non_browser_events_do_not_displace_browser_events() -> Result<()> {
        let host = Arc::new(RecordingHost::new());
        let counter = Arc::new(MemoryCounter::new());
        let (tx, rx) = mpsc::channel(16);

        tx.send(gambling_event("slot gacor")).await?;
        let mut chat = gambling_event("see you tonight");
        chat.event.source_package = Some("com.whatsapp".into());
        tx.send(chat).await?;
        drop(tx);

        let mut controller = ServiceController::new();
        controller.start(service(50, &host, &counter), rx)?;
        let stats = controller.join().await?;

        assert_eq!(stats.received, 2);
        assert_eq!(stats.dispatched, 1);
        assert_eq!(stats.coalesced, 1);
        assert_eq!(stats.blocked, 1);
        assert_eq!(host.back_actions(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn newer_browser_event_still_replaces_older_one() -> Result<()> {
        let host = Arc::new(RecordingHost::new());
        let counter = Arc::new(MemoryCounter::new());
        let (tx, rx) = mpsc::channel(16);

        let mut chat = gambling_event("casino night");
        chat.event.source_package = Some("com.whatsapp".into());
        tx.send(chat).await?;
        tx.send(gambling_event("togel hari ini")).await?;
        drop(tx);

        let mut controller = ServiceController::new();
        controller.start(service(50, &host, &counter), rx)?;
        let stats = controller.join().await?;

        assert_eq!(stats.dispatched, 1);
        assert_eq!(stats.blocked, 1);
        assert_eq!(
            host.notifications()[0].short_body,
            "gambling content detected: togel hari ini"
        );
        Ok(())
    }

    #[tokio::test]
    async fn stop_cancels_an_idle_loop() -> Result<()> {
        let host = Arc::new(RecordingHost::new());
        let counter = Arc::new(MemoryCounter::new());
        let (_tx, rx) = mpsc::channel::<HostEvent>(4);

        let mut controller = ServiceController::new();
        controller.start(service(100, &host, &counter), rx)?;
        assert!(controller.is_running());

        let stats = controller.stop().await?;
        assert_eq!(stats, LoopStats::default());
        assert!(!controller.is_running());
        // Stopping twice is harmless.
        assert_eq!(controller.stop().await?, LoopStats::default());
        Ok(())
    }
}
