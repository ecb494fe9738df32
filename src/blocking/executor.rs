use std::sync::Arc;

use serde::Serialize;

use crate::host_bridge::{Navigator, Notifier};
use crate::models::Detection;
use crate::settings::{CounterStore, KEY_BLOCKED_COUNT};

use super::notification::{BlockNotification, NotificationIds};

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info};

/// What a block action managed to do. Back navigation is always attempted and
/// therefore not reported.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BlockOutcome {
    pub detection: Detection,
    /// Counter value after the increment, `None` if persisting failed.
    pub blocked_count: Option<u64>,
    pub notification_id: i32,
    pub notified: bool,
}

/// Runs the block sequence: count, notify, navigate back.
///
/// Counter and notification failures are logged and swallowed; neither may
/// keep the offending content on screen.
pub struct BlockActionExecutor {
    counter: Arc<dyn CounterStore>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    ids: NotificationIds,
}

impl BlockActionExecutor {
    pub fn new(
        counter: Arc<dyn CounterStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            counter,
            notifier,
            navigator,
            ids: NotificationIds::new(),
        }
    }

    pub fn on_detected(&self, detection: &Detection) -> BlockOutcome {
        log_info!("{}: {}", detection.reason.describe(), detection.payload);

        let blocked_count = match self.counter.increment(KEY_BLOCKED_COUNT) {
            Ok(count) => {
                log_info!("Blocked count incremented to {count}");
                Some(count)
            }
            Err(err) => {
                log_error!("failed to persist blocked count: {err:?}");
                None
            }
        };

        let notification = BlockNotification::for_detection(self.ids.next(), detection);
        let notified = match self.notifier.notify(&notification) {
            Ok(()) => true,
            Err(err) => {
                log_error!("failed to deliver notification {}: {err:?}", notification.id);
                false
            }
        };

        self.navigator.go_back();

        BlockOutcome {
            detection: detection.clone(),
            blocked_count,
            notification_id: notification.id,
            notified,
        }
    }

    pub fn blocked_count(&self) -> anyhow::Result<u64> {
        self.counter.read(KEY_BLOCKED_COUNT)
    }
}
