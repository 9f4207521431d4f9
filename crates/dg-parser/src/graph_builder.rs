use dg_core::{DecisionGraph, GraphEdge, GraphNode, NodeIndex, ParseWarning, ParseWarningCode};
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::ParseResult;

pub(crate) struct GraphBuilder {
    graph: DecisionGraph,
    node_index_by_id: FxHashMap<String, NodeIndex>,
    warnings: Vec<ParseWarning>,
    degraded: bool,
}

impl GraphBuilder {
    pub(crate) fn new() -> Self {
        Self {
            graph: DecisionGraph::empty(),
            node_index_by_id: FxHashMap::default(),
            warnings: Vec::new(),
            degraded: false,
        }
    }

    pub(crate) fn add_warning(&mut self, code: ParseWarningCode, line: usize, message: String) {
        self.warnings.push(ParseWarning::new(code, line, message));
    }

    /// Drop everything collected so far; the result will be an empty graph.
    pub(crate) fn degrade(&mut self, code: ParseWarningCode, line: usize, message: String) {
        self.degraded = true;
        self.add_warning(code, line, message);
    }

    pub(crate) fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub(crate) fn node_count(&self) -> usize {
        self.graph.nodes.len()
    }

    pub(crate) fn edge_count(&self) -> usize {
        self.graph.edges.len()
    }

    pub(crate) fn finish(self, from_fenced_block: bool) -> ParseResult {
        let graph = if self.degraded {
            DecisionGraph::empty()
        } else {
            self.graph
        };
        ParseResult {
            graph,
            warnings: self.warnings,
            from_fenced_block,
        }
    }

    /// Declare a node. A repeated token keeps its first position and takes
    /// the newest label. An empty token (`[label]`) is declared like any other.
    pub(crate) fn intern_node(&mut self, id: &str, label: &str, line: usize) -> NodeIndex {
        let normalized_id = id.trim();
        if normalized_id.is_empty() {
            self.add_warning(
                ParseWarningCode::EmptyToken,
                line,
                "node declaration has an empty token".to_string(),
            );
        }

        if let Some(existing) = self.node_index_by_id.get(normalized_id).copied() {
            if let Some(node) = self.graph.nodes.get_mut(existing.0) {
                trace!(id = normalized_id, line, "redeclared node replaces label");
                node.label = label.to_string();
                node.line = line;
            }
            return existing;
        }

        let index = NodeIndex(self.graph.nodes.len());
        self.graph.nodes.push(GraphNode {
            id: normalized_id.to_string(),
            label: label.to_string(),
            line,
        });
        self.node_index_by_id
            .insert(normalized_id.to_string(), index);
        index
    }

    pub(crate) fn push_edge(&mut self, from: &str, to: &str, line: usize) {
        self.graph.edges.push(GraphEdge {
            from: from.to_string(),
            to: to.to_string(),
            line,
        });
    }
}
