#![forbid(unsafe_code)]

//! Shared data model for the decision graph engine.
//!
//! A [`DecisionGraph`] is what the extractor produces from one text blob:
//! nodes in first-declaration order and edges in declaration order. It is
//! built once and never patched; a new text input yields a new graph.

mod config;

pub use config::{EngineConfig, LayoutMetrics, LevelPolicy, RevealConfig};

use std::path::PathBuf;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Marker that splits a node label into display lines.
pub const LABEL_LINE_BREAK: &str = "<br>";

/// Edge delimiter recognised by the extractor.
pub const EDGE_DELIMITER: &str = "-->";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct NodeIndex(pub usize);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    /// Source line (1-based) of the declaration that set the current label.
    pub line: usize,
}

impl GraphNode {
    /// Split the label on [`LABEL_LINE_BREAK`].
    #[must_use]
    pub fn label_lines(&self) -> Vec<&str> {
        split_label_lines(&self.label)
    }
}

#[must_use]
pub fn split_label_lines(label: &str) -> Vec<&str> {
    label.split(LABEL_LINE_BREAK).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    pub line: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DecisionGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl DecisionGraph {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Token → declaration index lookup.
    #[must_use]
    pub fn node_index_by_id(&self) -> FxHashMap<&str, NodeIndex> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.as_str(), NodeIndex(index)))
            .collect()
    }

    #[must_use]
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Edges whose endpoints are both declared nodes.
    #[must_use]
    pub fn resolved_edge_count(&self) -> usize {
        let index = self.node_index_by_id();
        self.edges
            .iter()
            .filter(|edge| {
                index.contains_key(edge.from.as_str()) && index.contains_key(edge.to.as_str())
            })
            .count()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum ParseWarningCode {
    #[default]
    EmptyInput,
    UnbalancedBracket,
    EmptyToken,
    NoGraphContent,
}

impl ParseWarningCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmptyInput => "dg/warn/empty-input",
            Self::UnbalancedBracket => "dg/warn/unbalanced-bracket",
            Self::EmptyToken => "dg/warn/empty-token",
            Self::NoGraphContent => "dg/warn/no-graph-content",
        }
    }
}

/// Non-fatal note about input the extractor had to skip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ParseWarning {
    pub code: ParseWarningCode,
    pub message: String,
    /// 1-based source line, 0 when the warning concerns the whole input.
    pub line: usize,
}

impl ParseWarning {
    #[must_use]
    pub fn new(code: ParseWarningCode, line: usize, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            line,
        }
    }
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.line == 0 {
            write!(f, "{}: {}", self.code.as_str(), self.message)
        } else {
            write!(f, "{} (line {}): {}", self.code.as_str(), self.line, self.message)
        }
    }
}

/// Errors raised around the engine: configuration and file loading.
///
/// Extraction, layout and reveal never fail; malformed diagrams degrade
/// instead of erroring.
#[derive(Debug, Error)]
pub enum DecisionGraphError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),
    #[error("invalid config value for `{field}`: {message}")]
    ConfigValue { field: String, message: String },
}
