use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DetectionReason {
    /// An address-bar node carried a gambling URL.
    GamblingUrl,
    /// Some node's text or label contained a gambling keyword.
    GamblingContent,
}

impl DetectionReason {
    pub fn describe(self) -> &'static str {
        match self {
            DetectionReason::GamblingUrl => "gambling URL detected",
            DetectionReason::GamblingContent => "gambling content detected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    pub reason: DetectionReason,
    pub payload: String,
}

impl Detection {
    pub fn url(payload: impl Into<String>) -> Self {
        Self {
            reason: DetectionReason::GamblingUrl,
            payload: payload.into(),
        }
    }

    pub fn content(payload: impl Into<String>) -> Self {
        Self {
            reason: DetectionReason::GamblingContent,
            payload: payload.into(),
        }
    }

    /// One-line summary used as the notification's short text.
    pub fn summary(&self) -> String {
        format!("{}: {}", self.reason.describe(), self.payload)
    }
}
