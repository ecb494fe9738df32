//! Narrow capabilities the engine needs from its host: registration with the
//! accessibility subsystem, notification delivery and the global back action.
//!
//! A mobile host implements these over its platform APIs. `ConsoleHost` is the
//! desktop implementation used by the replay binary; it only logs.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Mutex,
};

use anyhow::{anyhow, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::blocking::BlockNotification;

/// Feedback category reported at registration; the service gives none of its own.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FeedbackType {
    Generic,
}

impl FeedbackType {
    pub fn raw(self) -> u32 {
        match self {
            FeedbackType::Generic => 0x10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRegistration {
    pub event_mask: u32,
    pub package_names: Vec<String>,
    pub feedback_type: FeedbackType,
    pub notification_timeout_ms: u64,
}

pub trait AccessibilityHost: Send + Sync {
    fn register(&self, registration: &ServiceRegistration) -> Result<()>;
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &BlockNotification) -> Result<()>;
}

/// Fire-and-forget "press back" primitive.
pub trait Navigator: Send + Sync {
    fn go_back(&self);
}

#[derive(Default)]
pub struct ConsoleHost {
    registration: Mutex<Option<ServiceRegistration>>,
    back_actions: AtomicU64,
    notifications: AtomicU64,
}

impl ConsoleHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registration(&self) -> Option<ServiceRegistration> {
        match self.registration.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn back_actions(&self) -> u64 {
        self.back_actions.load(Ordering::Relaxed)
    }

    pub fn notifications(&self) -> u64 {
        self.notifications.load(Ordering::Relaxed)
    }
}

impl AccessibilityHost for ConsoleHost {
    fn register(&self, registration: &ServiceRegistration) -> Result<()> {
        let mut guard = self
            .registration
            .lock()
            .map_err(|_| anyhow!("console host registration lock poisoned"))?;
        if guard.is_some() {
            warn!("Service registered twice; replacing previous registration");
        }
        info!(
            "Registered event mask {:#x}, feedback {:#x}, for {} packages (timeout {}ms)",
            registration.event_mask,
            registration.feedback_type.raw(),
            registration.package_names.len(),
            registration.notification_timeout_ms
        );
        *guard = Some(registration.clone());
        Ok(())
    }
}

impl Notifier for ConsoleHost {
    fn notify(&self, notification: &BlockNotification) -> Result<()> {
        self.notifications.fetch_add(1, Ordering::Relaxed);
        info!(
            "[notification #{}] {} | {}",
            notification.id, notification.title, notification.short_body
        );
        Ok(())
    }
}

impl Navigator for ConsoleHost {
    fn go_back(&self) {
        let total = self.back_actions.fetch_add(1, Ordering::Relaxed) + 1;
        info!("Global back action performed ({total} so far)");
    }
}
