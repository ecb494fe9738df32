use crate::config::DetectionConfig;
use crate::models::{Detection, UiNode};

use super::matcher::{is_gambling_url, TriggerList};

// Per-node chatter is debug-level; flip off when profiling.
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

/// Two-pass scanner over one foreground snapshot.
///
/// Traversal is iterative with an explicit stack, bounded both in depth and in
/// the number of nodes visited, so a malformed host tree cannot exhaust the
/// event thread's stack.
#[derive(Debug, Clone)]
pub struct TreeScanner {
    general: TriggerList,
    urls: TriggerList,
    address_bar_ids: Vec<String>,
    max_depth: usize,
    max_nodes: usize,
}

impl TreeScanner {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            general: config.general_triggers(),
            urls: config.url_triggers(),
            address_bar_ids: config.address_bar_identifiers.clone(),
            max_depth: config.max_scan_depth,
            max_nodes: config.max_scan_nodes,
        }
    }

    /// Address-bar lookup first, then a full pre-order keyword pass. Returns
    /// the first hit; nothing after it is visited.
    pub fn scan<N: UiNode>(&self, root: Option<&N>, source_package: Option<&str>) -> Option<Detection> {
        let root = root?;

        if let Some(detection) = self.scan_address_bar(root, source_package) {
            return Some(detection);
        }

        self.scan_content(root)
    }

    fn scan_address_bar<N: UiNode>(&self, root: &N, source_package: Option<&str>) -> Option<Detection> {
        let package = source_package?;

        for id in &self.address_bar_ids {
            // TODO: compare against the package segment before ":id/" once browser
            // families that share a prefix (com.android.chrome.beta) get their own ids.
            if !id.starts_with(package) {
                continue;
            }

            let hit = self.walk(root, |node| {
                if node.view_id() != Some(id.as_str()) {
                    return None;
                }
                let url = node.text()?;
                is_gambling_url(url, &self.urls).then(|| Detection::url(url))
            });

            if let Some(detection) = hit {
                log_debug!("address bar {} carries gambling URL: {}", id, detection.payload);
                return Some(detection);
            }
        }

        None
    }

    fn scan_content<N: UiNode>(&self, root: &N) -> Option<Detection> {
        self.walk(root, |node| {
            let text = node.text_to_check()?;
            if self.general.matches(text) {
                log_debug!("gambling keyword found in node text: {}", text);
                Some(Detection::content(text))
            } else {
                None
            }
        })
    }

    /// Depth-first pre-order walk that stops at the first node `visit` accepts.
    fn walk<'a, N, F>(&self, root: &'a N, mut visit: F) -> Option<Detection>
    where
        N: UiNode,
        F: FnMut(&'a N) -> Option<Detection>,
    {
        let mut stack: Vec<(&'a N, usize)> = vec![(root, 0)];
        let mut visited = 0usize;

        while let Some((node, depth)) = stack.pop() {
            if visited >= self.max_nodes {
                log_warn!(
                    "scan stopped after {} nodes without finishing the tree",
                    self.max_nodes
                );
                return None;
            }
            visited += 1;

            if let Some(detection) = visit(node) {
                return Some(detection);
            }

            if depth + 1 >= self.max_depth {
                if node.child_count() > 0 {
                    log_warn!("skipping children below depth {}", self.max_depth);
                }
                continue;
            }

            // Reverse push keeps the leftmost child on top, giving pre-order.
            for index in (0..node.child_count()).rev() {
                if let Some(child) = node.child(index) {
                    stack.push((child, depth + 1));
                }
            }
        }

        None
    }
}
