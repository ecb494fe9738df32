//! In-memory stand-ins for host capabilities, shared by the unit tests.

use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Mutex,
};

use anyhow::{anyhow, bail, Result};

use crate::blocking::BlockNotification;
use crate::host_bridge::{AccessibilityHost, Navigator, Notifier, ServiceRegistration};
use crate::settings::{CounterStore, KEY_BLOCKED_COUNT};

#[derive(Default)]
pub struct MemoryCounter {
    values: Mutex<HashMap<String, u64>>,
}

impl MemoryCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(blocked: u64) -> Self {
        let counter = Self::default();
        counter
            .values
            .lock()
            .unwrap()
            .insert(KEY_BLOCKED_COUNT.to_string(), blocked);
        counter
    }
}

impl CounterStore for MemoryCounter {
    fn read(&self, key: &str) -> Result<u64> {
        let values = self.values.lock().map_err(|_| anyhow!("poisoned"))?;
        Ok(values.get(key).copied().unwrap_or(0))
    }

    fn increment(&self, key: &str) -> Result<u64> {
        let mut values = self.values.lock().map_err(|_| anyhow!("poisoned"))?;
        let value = values.entry(key.to_string()).or_insert(0);
        *value += 1;
        Ok(*value)
    }
}

pub struct FailingCounter;

impl CounterStore for FailingCounter {
    fn read(&self, _key: &str) -> Result<u64> {
        bail!("counter store unavailable")
    }

    fn increment(&self, _key: &str) -> Result<u64> {
        bail!("counter store unavailable")
    }
}

/// Records every registration, notification and back action.
#[derive(Default)]
pub struct RecordingHost {
    registrations: Mutex<Vec<ServiceRegistration>>,
    notifications: Mutex<Vec<BlockNotification>>,
    back_actions: AtomicU64,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registrations(&self) -> Vec<ServiceRegistration> {
        self.registrations.lock().unwrap().clone()
    }

    pub fn notifications(&self) -> Vec<BlockNotification> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn back_actions(&self) -> u64 {
        self.back_actions.load(Ordering::SeqCst)
    }
}

impl AccessibilityHost for RecordingHost {
    fn register(&self, registration: &ServiceRegistration) -> Result<()> {
        self.registrations.lock().unwrap().push(registration.clone());
        Ok(())
    }
}

impl Notifier for RecordingHost {
    fn notify(&self, notification: &BlockNotification) -> Result<()> {
        self.notifications.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

impl Navigator for RecordingHost {
    fn go_back(&self) {
        self.back_actions.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct FailingNotifier {
    attempts: AtomicU64,
}

impl FailingNotifier {
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Notifier for FailingNotifier {
    fn notify(&self, _notification: &BlockNotification) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        bail!("notification channel disabled")
    }
}

/// Host whose registration call is rejected.
pub struct RejectingHost;

impl AccessibilityHost for RejectingHost {
    fn register(&self, _registration: &ServiceRegistration) -> Result<()> {
        bail!("accessibility service not permitted")
    }
}
