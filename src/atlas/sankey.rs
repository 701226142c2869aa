//! Sankey graph shaping for the citation-flow chart.
//!
//! The chart draws bible nodes on one side and documents on the other. This
//! module turns an exported network into the node/link arrays the layout
//! takes: node order values, index-based links, and optionally verse nodes
//! collapsed into chapters.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::normalizer::OsisNormalizer;
use crate::types::{NetworkGraph, NodeKind, OsisReference, Testament};

/// Granularity of the bible side of the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SankeyLevel {
    /// One node per cited reference.
    Verse,
    /// Verse nodes merged per chapter.
    Chapter,
    /// One node per book.
    Book,
}

impl SankeyLevel {
    /// All levels.
    pub const ALL: [SankeyLevel; 3] = [Self::Verse, Self::Chapter, Self::Book];

    /// Network file the level is built from.
    pub fn source_file(&self) -> &'static str {
        match self {
            Self::Verse | Self::Chapter => "bible_document.json",
            Self::Book => "bible_book_document.json",
        }
    }

    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verse => "verse",
            Self::Chapter => "chapter",
            Self::Book => "book",
        }
    }
}

impl Default for SankeyLevel {
    fn default() -> Self {
        Self::Verse
    }
}

impl fmt::Display for SankeyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized level name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sankey level '{0}', expected verse, chapter or book")]
pub struct UnknownLevel(pub String);

impl FromStr for SankeyLevel {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "verse" => Ok(Self::Verse),
            "chapter" => Ok(Self::Chapter),
            "book" => Ok(Self::Book),
            _ => Err(UnknownLevel(s.to_string())),
        }
    }
}

/// Sort value of a node: canonical key for bible nodes, lowercase name otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeOrder {
    /// Order key from the normalizer.
    Canonical(u64),
    /// Lowercased display name.
    Lexical(String),
}

/// A chart node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SankeyNode {
    /// Node id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Node kind.
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Sort value.
    pub order: NodeOrder,
    /// Testament of bible nodes.
    pub testament: Option<Testament>,
}

/// A chart link between node indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SankeyLink {
    /// Index of the source node.
    pub source: usize,
    /// Index of the target node.
    pub target: usize,
    /// Flow weight.
    pub value: f64,
}

/// Nodes and index-based links ready for layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SankeyGraph {
    /// Nodes.
    pub nodes: Vec<SankeyNode>,
    /// Links.
    pub links: Vec<SankeyLink>,
}

impl SankeyGraph {
    /// Node indices in drawing order: bible nodes by canonical order, then the
    /// rest by name.
    pub fn display_order(&self, normalizer: &OsisNormalizer) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.nodes.len()).collect();
        indices.sort_by(|&a, &b| compare_nodes(&self.nodes[a], &self.nodes[b], normalizer));
        indices
    }

    /// Sum of all link values.
    pub fn total_flow(&self) -> f64 {
        self.links.iter().map(|l| l.value).sum()
    }
}

/// Sort nodes into drawing order in place.
pub fn sort_nodes(nodes: &mut [SankeyNode], normalizer: &OsisNormalizer) {
    nodes.sort_by(|a, b| compare_nodes(a, b, normalizer));
}

fn compare_nodes(a: &SankeyNode, b: &SankeyNode, normalizer: &OsisNormalizer) -> Ordering {
    match (a.kind == NodeKind::Bible, b.kind == NodeKind::Bible) {
        (true, true) => match (&a.order, &b.order) {
            (NodeOrder::Canonical(x), NodeOrder::Canonical(y)) => {
                x.cmp(y).then_with(|| normalizer.compare(&a.name, &b.name))
            }
            _ => normalizer.compare(&a.name, &b.name),
        },
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => lexical_key(a).cmp(&lexical_key(b)),
    }
}

fn lexical_key(node: &SankeyNode) -> String {
    match &node.order {
        NodeOrder::Lexical(s) => s.clone(),
        NodeOrder::Canonical(_) => node.name.to_lowercase(),
    }
}

fn node_order(kind: NodeKind, name: &str, normalizer: &OsisNormalizer) -> NodeOrder {
    match kind {
        NodeKind::Bible => NodeOrder::Canonical(normalizer.order_key(name)),
        _ => NodeOrder::Lexical(name.to_lowercase()),
    }
}

/// Keep every node and map links onto node indices.
///
/// Used for the verse and book levels. Links whose endpoints are missing
/// are dropped.
pub fn normalize_graph(graph: &NetworkGraph, normalizer: &OsisNormalizer) -> SankeyGraph {
    let nodes: Vec<SankeyNode> = graph
        .nodes
        .iter()
        .map(|n| {
            let name = n.name().to_string();
            let kind = n.kind();
            SankeyNode {
                id: n.id.clone(),
                order: node_order(kind, &name, normalizer),
                name,
                kind,
                testament: n.testament,
            }
        })
        .collect();

    let index: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();

    let mut dropped = 0usize;
    let links = graph
        .links
        .iter()
        .filter_map(|l| {
            match (index.get(l.source.as_str()), index.get(l.target.as_str())) {
                (Some(&source), Some(&target)) => Some(SankeyLink {
                    source,
                    target,
                    value: l.effective_weight(),
                }),
                _ => {
                    dropped += 1;
                    None
                }
            }
        })
        .collect();

    if dropped > 0 {
        debug!(dropped, "links with unknown endpoints dropped");
    }

    SankeyGraph { nodes, links }
}

/// Collapse bible nodes into chapter nodes (`b:Gen.3`) and sum their links.
///
/// Document nodes are kept, other node kinds are dropped. Node and link
/// order follow first appearance in the input.
pub fn aggregate_to_chapters(graph: &NetworkGraph, normalizer: &OsisNormalizer) -> SankeyGraph {
    let mut chapter_nodes: Vec<SankeyNode> = Vec::new();
    let mut chapter_index: HashMap<String, usize> = HashMap::new();
    let mut document_nodes: Vec<SankeyNode> = Vec::new();
    let mut document_index: HashMap<String, usize> = HashMap::new();
    let mut bible_to_chapter: HashMap<&str, String> = HashMap::new();

    for node in &graph.nodes {
        let name = node.name();
        match node.kind() {
            NodeKind::Document => {
                if !document_index.contains_key(&node.id) {
                    document_index.insert(node.id.clone(), document_nodes.len());
                    document_nodes.push(SankeyNode {
                        id: node.id.clone(),
                        name: name.to_string(),
                        kind: NodeKind::Document,
                        order: NodeOrder::Lexical(name.to_lowercase()),
                        testament: None,
                    });
                }
            }
            NodeKind::Bible => {
                let reference = OsisReference::parse(name);
                if reference.book.is_empty() {
                    continue;
                }
                let chapter_key = reference.chapter_key();
                let chapter_id = format!("b:{}", chapter_key);
                bible_to_chapter.insert(node.id.as_str(), chapter_id.clone());
                if !chapter_index.contains_key(&chapter_id) {
                    chapter_index.insert(chapter_id.clone(), chapter_nodes.len());
                    chapter_nodes.push(SankeyNode {
                        id: chapter_id,
                        order: NodeOrder::Canonical(normalizer.order_key(&chapter_key)),
                        name: chapter_key,
                        kind: NodeKind::Bible,
                        testament: Some(normalizer.testament(&reference.book)),
                    });
                }
            }
            NodeKind::Person | NodeKind::Other => {}
        }
    }

    let chapter_count = chapter_nodes.len();
    let mut nodes = chapter_nodes;
    nodes.extend(document_nodes);

    let lookup = |id: &str| -> Option<usize> {
        chapter_index
            .get(id)
            .copied()
            .or_else(|| document_index.get(id).map(|i| i + chapter_count))
    };

    let mut weights: Vec<((usize, usize), f64)> = Vec::new();
    let mut weight_index: HashMap<(usize, usize), usize> = HashMap::new();

    for link in &graph.links {
        let source_id = bible_to_chapter
            .get(link.source.as_str())
            .map(String::as_str)
            .unwrap_or(link.source.as_str());
        let (Some(source), Some(target)) = (lookup(source_id), lookup(&link.target)) else {
            continue;
        };
        let key = (source, target);
        match weight_index.get(&key) {
            Some(&i) => weights[i].1 += link.effective_weight(),
            None => {
                weight_index.insert(key, weights.len());
                weights.push((key, link.effective_weight()));
            }
        }
    }

    let links = weights
        .into_iter()
        .map(|((source, target), value)| SankeyLink {
            source,
            target,
            value,
        })
        .collect();

    SankeyGraph { nodes, links }
}

/// Shape a network for the given level.
pub fn build_sankey(
    graph: &NetworkGraph,
    level: SankeyLevel,
    normalizer: &OsisNormalizer,
) -> SankeyGraph {
    match level {
        SankeyLevel::Chapter => aggregate_to_chapters(graph, normalizer),
        SankeyLevel::Verse | SankeyLevel::Book => normalize_graph(graph, normalizer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NetworkLink, NetworkNode};

    fn verse_graph() -> NetworkGraph {
        NetworkGraph {
            nodes: vec![
                NetworkNode::new("b:gen-1-1", "Gen.1.1", NodeKind::Bible),
                NetworkNode::new("b:gen-1-2", "Gen.1.2", NodeKind::Bible),
                NetworkNode::new("b:rom-8-28", "Rom.8.28", NodeKind::Bible),
                NetworkNode::new("d:brief", "Brief an X", NodeKind::Document),
                NetworkNode::new("d:akte", "Akte", NodeKind::Document),
                NetworkNode::new("p:paulus", "Paulus", NodeKind::Person),
            ],
            links: vec![
                NetworkLink::new("b:gen-1-1", "d:brief", 2.0),
                NetworkLink::new("b:gen-1-2", "d:brief", 1.0),
                NetworkLink::new("b:rom-8-28", "d:akte", 0.0),
                NetworkLink::new("b:gen-1-1", "d:missing", 4.0),
            ],
        }
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!("Chapter".parse::<SankeyLevel>().unwrap(), SankeyLevel::Chapter);
        assert!("testament".parse::<SankeyLevel>().is_err());
        assert_eq!(SankeyLevel::Book.source_file(), "bible_book_document.json");
    }

    #[test]
    fn test_normalize_graph() {
        let normalizer = OsisNormalizer::default();
        let graph = normalize_graph(&verse_graph(), &normalizer);

        assert_eq!(graph.nodes.len(), 6);
        assert_eq!(graph.nodes[0].order, NodeOrder::Canonical(1_001));
        assert_eq!(graph.nodes[3].order, NodeOrder::Lexical("brief an x".to_string()));
        // The link to a missing document is dropped.
        assert_eq!(graph.links.len(), 3);
        assert_eq!(graph.links[2].value, 1.0);
    }

    #[test]
    fn test_node_name_falls_back_to_id() {
        let mut input = verse_graph();
        input.nodes[0].label = None;
        let graph = normalize_graph(&input, &OsisNormalizer::default());
        assert_eq!(graph.nodes[0].name, "b:gen-1-1");
    }

    #[test]
    fn test_aggregate_to_chapters() {
        let normalizer = OsisNormalizer::default();
        let graph = aggregate_to_chapters(&verse_graph(), &normalizer);

        let ids: Vec<_> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["b:Gen.1", "b:Rom.8", "d:brief", "d:akte"]);
        assert_eq!(graph.nodes[1].testament, Some(Testament::New));

        assert_eq!(graph.links.len(), 2);
        assert_eq!(graph.links[0].source, 0);
        assert_eq!(graph.links[0].target, 2);
        assert_eq!(graph.links[0].value, 3.0);
        assert_eq!(graph.total_flow(), 4.0);
    }

    #[test]
    fn test_display_order() {
        let normalizer = OsisNormalizer::default();
        let mut input = verse_graph();
        input.nodes.swap(0, 2);
        let graph = normalize_graph(&input, &normalizer);

        let names: Vec<_> = graph
            .display_order(&normalizer)
            .into_iter()
            .map(|i| graph.nodes[i].name.as_str())
            .collect();
        assert_eq!(
            names,
            ["Gen.1.1", "Gen.1.2", "Rom.8.28", "Akte", "Brief an X", "Paulus"]
        );
    }

    #[test]
    fn test_sort_nodes_in_place() {
        let normalizer = OsisNormalizer::default();
        let mut graph = normalize_graph(&verse_graph(), &normalizer);
        graph.nodes.reverse();
        sort_nodes(&mut graph.nodes, &normalizer);
        assert_eq!(graph.nodes[0].name, "Gen.1.1");
        assert_eq!(graph.nodes[5].name, "Paulus");
    }

    #[test]
    fn test_serialized_shape() {
        let graph = normalize_graph(&verse_graph(), &OsisNormalizer::default());
        let json = serde_json::to_value(&graph).unwrap();
        assert_eq!(json["nodes"][0]["type"], "bible");
        assert_eq!(json["nodes"][0]["order"], 1001);
        assert_eq!(json["nodes"][3]["order"], "brief an x");
        assert_eq!(json["links"][0]["source"], 0);
    }
}
