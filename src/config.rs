//! Detection policy: trigger lists, browser allow-list and scan bounds.
//!
//! The built-in defaults mirror the lists the service shipped with. A JSON
//! file with the same camelCase keys replaces any subset of them.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::detection::matcher::TriggerList;

const DEFAULT_GENERAL_KEYWORDS: &[&str] = &[
    "slot",
    "lottery",
    "slots",
    "wager",
    "slot online",
    "casino",
    "poker",
    "togel",
    "gacor",
    "rtp live",
    "situs judi",
    "bandar",
    "taruhan",
];

const DEFAULT_URL_KEYWORDS: &[&str] = &[
    "slot", "casino", "poker", "togel", "judol", "gacor", "rtp", "sbobet", "betting", "gambling",
    "taruhan", "lottery", "toto",
];

const DEFAULT_ADDRESS_BAR_IDS: &[&str] = &[
    "com.android.chrome:id/url_bar",
    "org.mozilla.firefox:id/mozac_browser_toolbar_url_view",
    "org.mozilla.firefox:id/url_bar_title",
];

const DEFAULT_BROWSER_PACKAGES: &[&str] = &[
    "com.android.chrome",
    "org.mozilla.firefox",
    "com.UCMobile.intl",
    "com.opera.browser",
    "com.opera.gx",
    "com.opera.mini.native",
    "com.duckduckgo.mobile.android",
    "com.vivo.browser",
    "com.mi.globalbrowser",
    "com.sec.android.app.sbrowser",
    "com.android.browser",
    "com.android.chrome.beta",
    "com.android.chrome.dev",
    "com.microsoft.emmx",
    "secure.unblock.unlimited.proxy.snap.hotspot.shield",
];

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetectionConfig {
    /// Substrings matched against visible text and accessible labels.
    pub general_keywords: Vec<String>,
    /// Substrings matched against address-bar contents.
    pub url_keywords: Vec<String>,
    /// Fully qualified view ids of known address-bar widgets.
    pub address_bar_identifiers: Vec<String>,
    /// Packages whose events are scanned; everything else is ignored.
    pub browser_package_allow_list: Vec<String>,

    /// Event debounce interval handed to the host at registration.
    pub notification_timeout_ms: u64,

    /// Nodes below this depth are not descended into.
    pub max_scan_depth: usize,
    /// Upper bound on nodes visited per scan pass.
    pub max_scan_nodes: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            general_keywords: owned(DEFAULT_GENERAL_KEYWORDS),
            url_keywords: owned(DEFAULT_URL_KEYWORDS),
            address_bar_identifiers: owned(DEFAULT_ADDRESS_BAR_IDS),
            browser_package_allow_list: owned(DEFAULT_BROWSER_PACKAGES),
            notification_timeout_ms: 100,
            max_scan_depth: 256,
            max_scan_nodes: 20_000,
        }
    }
}

impl DetectionConfig {
    /// Loads the policy from `path`, or the defaults when the file is absent.
    pub fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read detection config from {}", path.display()))?;
            serde_json::from_str::<Self>(&contents)
                .with_context(|| format!("Invalid detection config in {}", path.display()))?
        } else {
            Self::default()
        };

        let config = config.normalized();
        validation::validate(&config)?;
        Ok(config)
    }

    /// Trims every entry, lowercases the keyword lists and drops blanks and
    /// repeats while keeping first-seen order.
    pub fn normalized(mut self) -> Self {
        self.general_keywords = normalize_list(self.general_keywords, true);
        self.url_keywords = normalize_list(self.url_keywords, true);
        self.address_bar_identifiers = normalize_list(self.address_bar_identifiers, false);
        self.browser_package_allow_list = normalize_list(self.browser_package_allow_list, false);
        self
    }

    pub fn general_triggers(&self) -> TriggerList {
        TriggerList::new(&self.general_keywords)
    }

    pub fn url_triggers(&self) -> TriggerList {
        TriggerList::new(&self.url_keywords)
    }

    pub fn is_allowed_package(&self, package: &str) -> bool {
        self.browser_package_allow_list
            .iter()
            .any(|allowed| allowed == package)
    }
}

fn normalize_list(items: Vec<String>, lowercase: bool) -> Vec<String> {
    let mut seen = Vec::with_capacity(items.len());
    for item in items {
        let trimmed = item.trim();
        if trimmed.is_empty() {
            continue;
        }
        // Package names are case-sensitive (com.UCMobile.intl), keywords are not.
        let value = if lowercase {
            trimmed.to_lowercase()
        } else {
            trimmed.to_string()
        };
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}

pub mod validation {
    use super::DetectionConfig;
    use anyhow::{bail, Result};

    const MAX_NOTIFICATION_TIMEOUT_MS: u64 = 10_000;

    pub fn validate(config: &DetectionConfig) -> Result<()> {
        if config.general_keywords.is_empty() {
            bail!("generalKeywords must contain at least one keyword");
        }
        if config.url_keywords.is_empty() {
            bail!("urlKeywords must contain at least one keyword");
        }
        if config.browser_package_allow_list.is_empty() {
            bail!("browserPackageAllowList must name at least one package");
        }
        for id in &config.address_bar_identifiers {
            if !id.contains(":id/") {
                bail!("Invalid address bar identifier '{id}'. Expected package:id/name");
            }
        }
        if config.notification_timeout_ms == 0
            || config.notification_timeout_ms > MAX_NOTIFICATION_TIMEOUT_MS
        {
            bail!("notificationTimeoutMs must be between 1 and {MAX_NOTIFICATION_TIMEOUT_MS}");
        }
        if config.max_scan_depth == 0 || config.max_scan_nodes == 0 {
            bail!("maxScanDepth and maxScanNodes must be positive");
        }
        Ok(())
    }
}
