use anyhow::{anyhow, Context, Result};
use log::warn;
use serde_json::Value;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::RwLock,
};

/// Namespace holding the blocked counter.
pub const PREFS_NAME: &str = "JudStopPrefs";
pub const KEY_BLOCKED_COUNT: &str = "blockedCount";

/// Namespace holding app-launch flags, kept apart from detection state.
pub const PREFS_APP_LAUNCH: &str = "JudStopAppLaunchPrefs";
pub const KEY_FIRST_LAUNCH_DIALOG_SHOWN: &str = "firstLaunchDialogShown";

/// Durable integer counters, read by the UI and bumped by the block executor.
///
/// `increment` is read-modify-write; callers rely on the host delivering
/// events to a single process one at a time.
pub trait CounterStore: Send + Sync {
    fn read(&self, key: &str) -> Result<u64>;
    fn increment(&self, key: &str) -> Result<u64>;
}

type Preferences = BTreeMap<String, Value>;

/// One named key-value namespace persisted as `<dir>/<namespace>.json`.
pub struct PreferenceStore {
    path: PathBuf,
    data: RwLock<Preferences>,
}

impl PreferenceStore {
    pub fn open(dir: &Path, namespace: &str) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create preference directory {}", dir.display()))?;
        let path = dir.join(format!("{namespace}.json"));
        let data = load_preferences(&path)?;

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get_int(&self, key: &str, default: u64) -> Result<u64> {
        let guard = self
            .data
            .read()
            .map_err(|_| anyhow!("preference lock poisoned"))?;
        Ok(guard.get(key).and_then(Value::as_u64).unwrap_or(default))
    }

    pub fn get_bool(&self, key: &str, default: bool) -> Result<bool> {
        let guard = self
            .data
            .read()
            .map_err(|_| anyhow!("preference lock poisoned"))?;
        Ok(guard.get(key).and_then(Value::as_bool).unwrap_or(default))
    }

    pub fn put_bool(&self, key: &str, value: bool) -> Result<()> {
        self.put(key, Value::Bool(value))
    }

    fn put(&self, key: &str, value: Value) -> Result<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow!("preference lock poisoned"))?;
        let previous = guard.insert(key.to_string(), value);
        if let Err(err) = self.persist(&guard) {
            restore(&mut guard, key, previous);
            return Err(err);
        }
        Ok(())
    }

    fn persist(&self, data: &Preferences) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write preferences to {}", self.path.display()))
    }

    /// Re-reads the file, picking up writes made through another handle.
    pub fn reload(&self) -> Result<()> {
        let data = load_preferences(&self.path)?;
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow!("preference lock poisoned"))?;
        *guard = data;
        Ok(())
    }
}

impl CounterStore for PreferenceStore {
    fn read(&self, key: &str) -> Result<u64> {
        self.get_int(key, 0)
    }

    fn increment(&self, key: &str) -> Result<u64> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow!("preference lock poisoned"))?;
        let next = guard
            .get(key)
            .and_then(Value::as_u64)
            .unwrap_or(0)
            .saturating_add(1);
        let previous = guard.insert(key.to_string(), Value::from(next));
        if let Err(err) = self.persist(&guard) {
            // Keep memory in step with disk so a later retry counts once.
            restore(&mut guard, key, previous);
            return Err(err);
        }
        Ok(next)
    }
}

fn restore(data: &mut Preferences, key: &str, previous: Option<Value>) {
    match previous {
        Some(value) => {
            data.insert(key.to_string(), value);
        }
        None => {
            data.remove(key);
        }
    }
}

fn load_preferences(path: &Path) -> Result<Preferences> {
    if !path.exists() {
        return Ok(Preferences::new());
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read preferences from {}", path.display()))?;
    match serde_json::from_str(&contents) {
        Ok(data) => Ok(data),
        Err(err) => {
            warn!(
                "Discarding unreadable preferences at {}: {err}",
                path.display()
            );
            Ok(Preferences::new())
        }
    }
}

/// Flags the UI consults on launch.
pub struct LaunchPrefs {
    store: PreferenceStore,
}

impl LaunchPrefs {
    pub fn open(dir: &Path) -> Result<Self> {
        Ok(Self {
            store: PreferenceStore::open(dir, PREFS_APP_LAUNCH)?,
        })
    }

    pub fn first_launch_dialog_shown(&self) -> Result<bool> {
        self.store.get_bool(KEY_FIRST_LAUNCH_DIALOG_SHOWN, false)
    }

    pub fn mark_first_launch_dialog_shown(&self) -> Result<()> {
        self.store.put_bool(KEY_FIRST_LAUNCH_DIALOG_SHOWN, true)
    }
}
