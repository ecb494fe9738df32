/// Case-insensitive substring test of `text` against every trigger.
///
/// Empty text never matches. Blank triggers are ignored rather than treated
/// as matching everything.
pub fn matches<S: AsRef<str>>(text: &str, triggers: &[S]) -> bool {
    if text.is_empty() {
        return false;
    }

    let haystack = text.to_lowercase();
    triggers.iter().any(|trigger| {
        let trigger = trigger.as_ref();
        !trigger.is_empty() && haystack.contains(&trigger.to_lowercase())
    })
}

/// Ordered set of lowercase trigger substrings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerList {
    triggers: Vec<String>,
}

impl TriggerList {
    pub fn new<S: AsRef<str>>(triggers: &[S]) -> Self {
        let mut list: Vec<String> = Vec::with_capacity(triggers.len());
        for trigger in triggers {
            let lowered = trigger.as_ref().trim().to_lowercase();
            if !lowered.is_empty() && !list.contains(&lowered) {
                list.push(lowered);
            }
        }
        Self { triggers: list }
    }

    pub fn matches(&self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        // Triggers are stored lowercase, only the text needs folding.
        let haystack = text.to_lowercase();
        self.triggers
            .iter()
            .any(|trigger| haystack.contains(trigger.as_str()))
    }
}

/// URL classifier: the same substring semantics, applied with the URL list.
pub fn is_gambling_url(url: &str, url_triggers: &TriggerList) -> bool {
    url_triggers.matches(url)
}
