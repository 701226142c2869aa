//! Relationship network records (`output/networks/*.json`).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use super::osis::Testament;

/// Kind of a network node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A biblical reference, chapter or book.
    Bible,
    /// A corpus document.
    Document,
    /// A register person.
    Person,
    /// Anything else.
    #[serde(other)]
    Other,
}

impl Default for NodeKind {
    fn default() -> Self {
        Self::Bible
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bible => write!(f, "bible"),
            Self::Document => write!(f, "document"),
            Self::Person => write!(f, "person"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// A node as exported from the network files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkNode {
    /// Stable node id (`b:gen-1-1`, `d:brief-an-x`).
    pub id: String,
    /// Display label; for bible nodes the OSIS text.
    #[serde(default)]
    pub label: Option<String>,
    /// Node kind; absent means `bible`.
    #[serde(rename = "type", default)]
    pub kind: Option<NodeKind>,
    /// Testament for bible nodes.
    #[serde(default)]
    pub testament: Option<Testament>,
    /// Remaining exported attributes (`book`, `title`, ...).
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Value>,
}

impl NetworkNode {
    /// Create a node with an id, label and kind.
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            label: Some(label.into()),
            kind: Some(kind),
            testament: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Label, falling back to the id when missing or empty.
    pub fn name(&self) -> &str {
        match self.label.as_deref() {
            Some(label) if !label.is_empty() => label,
            _ => &self.id,
        }
    }

    /// Kind, defaulting to `bible`.
    pub fn kind(&self) -> NodeKind {
        self.kind.unwrap_or_default()
    }
}

/// A weighted edge between two node ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkLink {
    /// Edge id, if exported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Source node id.
    pub source: String,
    /// Target node id.
    pub target: String,
    /// Edge weight; missing or zero counts as `1`.
    #[serde(default)]
    pub weight: Option<f64>,
}

impl NetworkLink {
    /// Create a link.
    pub fn new(source: impl Into<String>, target: impl Into<String>, weight: f64) -> Self {
        Self {
            id: None,
            source: source.into(),
            target: target.into(),
            weight: Some(weight),
        }
    }

    /// Effective weight.
    pub fn effective_weight(&self) -> f64 {
        match self.weight {
            Some(w) if w != 0.0 && !w.is_nan() => w,
            _ => 1.0,
        }
    }
}

/// A node/link graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkGraph {
    /// Nodes.
    #[serde(default)]
    pub nodes: Vec<NetworkNode>,
    /// Links.
    #[serde(default)]
    pub links: Vec<NetworkLink>,
}
