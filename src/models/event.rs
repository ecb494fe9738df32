use serde::{Deserialize, Serialize};

use super::node::NodeSnapshot;

/// Raw accessibility event codes used by the host platform.
pub const TYPE_WINDOW_STATE_CHANGED: u32 = 0x0000_0020;
pub const TYPE_WINDOW_CONTENT_CHANGED: u32 = 0x0000_0800;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    ContentChanged,
    WindowStateChanged,
    #[serde(other)]
    Other,
}

impl EventKind {
    pub fn from_raw(event_type: u32) -> Self {
        match event_type {
            TYPE_WINDOW_CONTENT_CHANGED => EventKind::ContentChanged,
            TYPE_WINDOW_STATE_CHANGED => EventKind::WindowStateChanged,
            _ => EventKind::Other,
        }
    }

    /// Bit this kind occupies in a registration event mask. `Other` has none.
    pub fn mask_bit(self) -> u32 {
        match self {
            EventKind::ContentChanged => TYPE_WINDOW_CONTENT_CHANGED,
            EventKind::WindowStateChanged => TYPE_WINDOW_STATE_CHANGED,
            EventKind::Other => 0,
        }
    }

    pub fn is_window_change(self) -> bool {
        matches!(self, EventKind::ContentChanged | EventKind::WindowStateChanged)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::ContentChanged => "ContentChanged",
            EventKind::WindowStateChanged => "WindowStateChanged",
            EventKind::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DetectionEvent {
    pub kind: EventKind,
    #[serde(default)]
    pub source_package: Option<String>,
}

impl DetectionEvent {
    pub fn new(kind: EventKind, source_package: Option<&str>) -> Self {
        Self {
            kind,
            source_package: source_package.map(str::to_string),
        }
    }
}

/// One event as handed over by a host, together with the foreground snapshot
/// taken when it fired.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostEvent {
    #[serde(flatten)]
    pub event: DetectionEvent,
    #[serde(default)]
    pub root: Option<NodeSnapshot>,
}
