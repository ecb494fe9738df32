use serde::{Deserialize, Serialize};

/// Read-only view of one element in the foreground window's UI tree.
///
/// Hosts wrap their platform node type in this trait so the scanner never
/// depends on a concrete accessibility API. `child` may return `None` for a
/// slot the platform could not resolve; the scanner skips those slots.
pub trait UiNode {
    fn text(&self) -> Option<&str>;
    fn content_description(&self) -> Option<&str>;
    fn view_id(&self) -> Option<&str>;
    fn child_count(&self) -> usize;
    fn child(&self, index: usize) -> Option<&Self>;

    /// Text shown to the user, falling back to the accessible label.
    fn text_to_check(&self) -> Option<&str> {
        self.text().or_else(|| self.content_description())
    }
}

/// Owned snapshot of a UI tree, as delivered by the desktop host or a test.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

impl NodeSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_description(description: impl Into<String>) -> Self {
        Self {
            content_description: Some(description.into()),
            ..Self::default()
        }
    }

    pub fn with_view_id(mut self, view_id: impl Into<String>) -> Self {
        self.view_id = Some(view_id.into());
        self
    }

    pub fn with_child(mut self, child: NodeSnapshot) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = NodeSnapshot>) -> Self {
        self.children.extend(children);
        self
    }
}

impl UiNode for NodeSnapshot {
    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn content_description(&self) -> Option<&str> {
        self.content_description.as_deref()
    }

    fn view_id(&self) -> Option<&str> {
        self.view_id.as_deref()
    }

    fn child_count(&self) -> usize {
        self.children.len()
    }

    fn child(&self, index: usize) -> Option<&Self> {
        self.children.get(index)
    }
}
