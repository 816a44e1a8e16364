//! Widget content: the visual node tree a loader produces.
//!
//! The host renders these trees; this crate only needs their structure to
//! decide whether a press landed on something interactive.

mod capabilities;
mod loader;
mod markup;

pub use capabilities::Capabilities;
pub use loader::{BoxFuture, ContentLoader};
pub use markup::MarkupLoader;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Content errors.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Access denied: {0}")]
    Denied(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Load error: {0}")]
    Load(String),
}

/// Result type for content operations.
pub type ContentResult<T> = Result<T, ContentError>;

/// Role of a content node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    /// Layout container.
    #[default]
    Box,
    /// Static text.
    Label,
    /// Clickable button.
    Button,
    /// Text entry.
    Entry,
    /// Icon (clickable in widget skins).
    Icon,
}

impl NodeRole {
    /// Roles that receive presses themselves instead of starting a drag.
    pub fn is_interactive(&self) -> bool {
        matches!(self, Self::Button | Self::Entry | Self::Icon)
    }
}

/// A node in a widget's content tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentNode {
    pub role: NodeRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    /// Explicit interactive tag for nodes whose role alone does not say so.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub interactive: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ContentNode>,
}

impl ContentNode {
    pub fn container(children: Vec<ContentNode>) -> Self {
        Self {
            role: NodeRole::Box,
            children,
            ..Self::default()
        }
    }

    pub fn label(text: impl Into<String>) -> Self {
        Self {
            role: NodeRole::Label,
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn button(text: impl Into<String>) -> Self {
        Self {
            role: NodeRole::Button,
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Inline placeholder shown instead of content that could not be produced.
    pub fn placeholder(message: impl Into<String>) -> Self {
        Self {
            role: NodeRole::Label,
            text: Some(message.into()),
            style: Some("any-widget-placeholder".to_string()),
            ..Self::default()
        }
    }

    /// Mark this node interactive regardless of role.
    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Capability predicate used by drag classification.
    pub fn is_interactive(&self) -> bool {
        self.interactive || self.role.is_interactive()
    }

    /// Nodes from `self` down along `path` (child indices), `self` first.
    /// Stops early when an index does not exist.
    pub fn path_nodes(&self, path: &[usize]) -> Vec<&ContentNode> {
        let mut nodes = vec![self];
        let mut current = self;
        for &index in path {
            match current.children.get(index) {
                Some(child) => {
                    nodes.push(child);
                    current = child;
                }
                None => break,
            }
        }
        nodes
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }
}
