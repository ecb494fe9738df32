use std::sync::Mutex;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::models::Detection;

pub const NOTIFICATION_TITLE: &str = "JudStop: gambling activity blocked";
pub const SHORT_BODY_MAX_CHARS: usize = 100;
const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BlockNotification {
    pub id: i32,
    pub title: String,
    /// Collapsed text, at most `SHORT_BODY_MAX_CHARS` plus the ellipsis.
    pub short_body: String,
    /// Expanded text shown in the detail view.
    pub long_body: String,
}

impl BlockNotification {
    pub fn for_detection(id: i32, detection: &Detection) -> Self {
        let summary = detection.summary();
        Self {
            id,
            title: NOTIFICATION_TITLE.to_string(),
            short_body: truncate_with_ellipsis(&summary, SHORT_BODY_MAX_CHARS),
            long_body: format!(
                "Gambling-related content detected: \"{summary}\". Access was blocked for your safety."
            ),
        }
    }
}

/// Cuts `text` to `max_chars` characters (not bytes) and marks the cut.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}{ELLIPSIS}", &text[..byte_index]),
        None => text.to_string(),
    }
}

/// Hands out notification ids derived from the wall clock.
///
/// Ids never repeat within a process: two detections in the same millisecond
/// (or a clock step backwards) get the previous id plus one.
#[derive(Debug, Default)]
pub struct NotificationIds {
    last: Mutex<Option<i32>>,
}

impl NotificationIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> i32 {
        let candidate = clock_id(Utc::now().timestamp_millis());
        let mut guard = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let id = match *guard {
            Some(previous) if candidate <= previous => previous.checked_add(1).unwrap_or(1),
            _ => candidate,
        };
        *guard = Some(id);
        id
    }
}

/// Platform notification ids are 32-bit; fold epoch millis into positive range.
fn clock_id(epoch_millis: i64) -> i32 {
    let folded = epoch_millis.rem_euclid(i32::MAX as i64);
    // rem_euclid keeps this in 0..i32::MAX
    folded.max(1) as i32
}
