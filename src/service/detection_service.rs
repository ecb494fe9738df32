use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::blocking::{BlockActionExecutor, BlockOutcome};
use crate::config::DetectionConfig;
use crate::detection::DetectionRouter;
use crate::host_bridge::{
    AccessibilityHost, FeedbackType, Navigator, Notifier, ServiceRegistration,
};
use crate::models::{DetectionEvent, EventKind, UiNode};
use crate::settings::CounterStore;

/// The accessibility service as the host sees it: lifecycle callbacks plus one
/// entry point per event.
pub struct DetectionService {
    router: DetectionRouter,
    executor: BlockActionExecutor,
}

impl DetectionService {
    pub fn new(
        config: Arc<DetectionConfig>,
        counter: Arc<dyn CounterStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            router: DetectionRouter::new(config),
            executor: BlockActionExecutor::new(counter, notifier, navigator),
        }
    }

    pub fn config(&self) -> &DetectionConfig {
        self.router.config()
    }

    pub fn registration(&self) -> ServiceRegistration {
        let config = self.router.config();
        ServiceRegistration {
            event_mask: EventKind::ContentChanged.mask_bit()
                | EventKind::WindowStateChanged.mask_bit(),
            package_names: config.browser_package_allow_list.clone(),
            feedback_type: FeedbackType::Generic,
            notification_timeout_ms: config.notification_timeout_ms,
        }
    }

    pub fn on_service_connected(&self, host: &dyn AccessibilityHost) -> Result<()> {
        let registration = self.registration();
        host.register(&registration)
            .context("failed to register accessibility service")?;
        info!(
            "Accessibility service connected; watching {} browser packages",
            registration.package_names.len()
        );
        Ok(())
    }

    /// Whether the router would scan `event` at all.
    pub fn accepts(&self, event: &DetectionEvent) -> bool {
        self.router.accepts(event)
    }

    /// Handles one host event. A missing event or snapshot means there is
    /// nothing to inspect.
    pub fn on_accessibility_event<N: UiNode>(
        &self,
        event: Option<&DetectionEvent>,
        root: Option<&N>,
    ) -> Option<BlockOutcome> {
        let event = event?;
        let root = root?;

        let detection = self.router.on_event(event, Some(root))?;
        Some(self.executor.on_detected(&detection))
    }

    pub fn on_interrupt(&self) {
        info!("Accessibility service interrupted");
    }

    pub fn on_destroy(&self) {
        info!("Accessibility service destroyed");
    }

    /// Current persisted count for the UI layer; may lag a concurrent write.
    pub fn blocked_count(&self) -> Result<u64> {
        self.executor.blocked_count().map_err(|err| {
            warn!("blocked count unavailable: {err:?}");
            err
        })
    }
}
