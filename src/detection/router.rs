use std::sync::Arc;

use crate::config::DetectionConfig;
use crate::models::{Detection, DetectionEvent, UiNode};

use super::scanner::TreeScanner;

const ENABLE_LOGS: bool = true;

use crate::log_debug;

/// Decides which events are worth a scan and runs it. Holds no mutable state.
#[derive(Debug, Clone)]
pub struct DetectionRouter {
    config: Arc<DetectionConfig>,
    scanner: TreeScanner,
}

impl DetectionRouter {
    pub fn new(config: Arc<DetectionConfig>) -> Self {
        let scanner = TreeScanner::new(&config);
        Self { config, scanner }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Whether `event` is a window change from an allow-listed browser.
    pub fn accepts(&self, event: &DetectionEvent) -> bool {
        event.kind.is_window_change()
            && event
                .source_package
                .as_deref()
                .is_some_and(|package| self.config.is_allowed_package(package))
    }

    pub fn on_event<N: UiNode>(&self, event: &DetectionEvent, foreground: Option<&N>) -> Option<Detection> {
        if !self.accepts(event) {
            log_debug!(
                "ignoring {} from {}",
                event.kind.as_str(),
                event.source_package.as_deref().unwrap_or("unknown package")
            );
            return None;
        }

        self.scanner.scan(foreground, event.source_package.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventKind, NodeSnapshot};

    fn router() -> DetectionRouter {
        DetectionRouter::new(Arc::new(DetectionConfig::default()))
    }

    fn gambling_page() -> NodeSnapshot {
        NodeSnapshot::new().with_child(NodeSnapshot::with_text("Situs judi terpercaya"))
    }

    #[test]
    fn scans_window_changes_from_browsers() {
        let page = gambling_page();
        for kind in [EventKind::ContentChanged, EventKind::WindowStateChanged] {
            let event = DetectionEvent::new(kind, Some("com.sec.android.app.sbrowser"));
            assert_eq!(
                router().on_event(&event, Some(&page)),
                Some(Detection::content("Situs judi terpercaya"))
            );
        }
    }

    #[test]
    fn other_event_kinds_are_ignored() {
        let event = DetectionEvent::new(EventKind::Other, Some("com.android.chrome"));
        assert_eq!(router().on_event(&event, Some(&gambling_page())), None);
    }

    #[test]
    fn non_browser_packages_are_ignored() {
        let event = DetectionEvent::new(EventKind::ContentChanged, Some("com.whatsapp"));
        assert_eq!(router().on_event(&event, Some(&gambling_page())), None);

        let anonymous = DetectionEvent::new(EventKind::ContentChanged, None);
        assert_eq!(router().on_event(&anonymous, Some(&gambling_page())), None);
    }

    #[test]
    fn accepts_only_allow_listed_window_changes() {
        let router = router();
        let chrome = DetectionEvent::new(EventKind::ContentChanged, Some("com.android.chrome"));
        let whatsapp = DetectionEvent::new(EventKind::ContentChanged, Some("com.whatsapp"));
        let click = DetectionEvent::new(EventKind::Other, Some("com.android.chrome"));
        let anonymous = DetectionEvent::new(EventKind::WindowStateChanged, None);

        assert!(router.accepts(&chrome));
        assert!(!router.accepts(&whatsapp));
        assert!(!router.accepts(&click));
        assert!(!router.accepts(&anonymous));
    }

    #[test]
    fn missing_foreground_is_nothing_to_do() {
        let event = DetectionEvent::new(EventKind::ContentChanged, Some("com.android.chrome"));
        assert_eq!(router().on_event::<NodeSnapshot>(&event, None), None);
    }

    #[test]
    fn custom_allow_list_is_honoured() {
        let mut config = DetectionConfig::default();
        config.browser_package_allow_list = vec!["org.example.kiosk".into()];
        let router = DetectionRouter::new(Arc::new(config));

        let chrome = DetectionEvent::new(EventKind::ContentChanged, Some("com.android.chrome"));
        let kiosk = DetectionEvent::new(EventKind::ContentChanged, Some("org.example.kiosk"));
        assert_eq!(router.on_event(&chrome, Some(&gambling_page())), None);
        assert!(router.on_event(&kiosk, Some(&gambling_page())).is_some());
    }
}
