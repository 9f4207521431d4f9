use dg_layout::{DiagramLayout, LayoutEdge};
use serde::Serialize;

/// Progress of a reveal over one layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RevealState {
    #[default]
    Idle,
    Revealing { counter: usize, total: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// One more node became visible; carries the new counter.
    Advanced(usize),
    Finished,
    Idle,
}

impl RevealState {
    #[must_use]
    pub const fn begin(total: usize) -> Self {
        Self::Revealing { counter: 0, total }
    }

    #[must_use]
    pub const fn counter(self) -> usize {
        match self {
            Self::Idle => 0,
            Self::Revealing { counter, .. } => counter,
        }
    }

    #[must_use]
    pub const fn total(self) -> usize {
        match self {
            Self::Idle => 0,
            Self::Revealing { total, .. } => total,
        }
    }

    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Revealing { counter, total } if counter >= total)
    }

    /// Advance by one node. Never moves past `total`.
    pub fn tick(&mut self) -> TickOutcome {
        match self {
            Self::Idle => TickOutcome::Idle,
            Self::Revealing { counter, total } if *counter >= *total => TickOutcome::Finished,
            Self::Revealing { counter, .. } => {
                *counter += 1;
                TickOutcome::Advanced(*counter)
            }
        }
    }

    /// Node `index` (declaration order) is visible once the counter passes it.
    #[must_use]
    pub const fn node_visible(self, index: usize) -> bool {
        self.counter() > index
    }

    /// An edge appears with its destination; unresolved edges never appear.
    #[must_use]
    pub fn edge_visible(self, edge: &LayoutEdge) -> bool {
        edge.is_resolved()
            && edge
                .to_node_index
                .is_some_and(|target| self.node_visible(target))
    }
}

/// Visibility of every node and edge of a layout at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevealFrame {
    pub counter: usize,
    pub total: usize,
    pub visible_nodes: Vec<bool>,
    pub visible_edges: Vec<bool>,
}

impl RevealFrame {
    #[must_use]
    pub fn capture(layout: &DiagramLayout, state: RevealState) -> Self {
        Self {
            counter: state.counter(),
            total: layout.nodes.len(),
            visible_nodes: layout
                .nodes
                .iter()
                .map(|node| state.node_visible(node.node_index))
                .collect(),
            visible_edges: layout
                .edges
                .iter()
                .map(|edge| state.edge_visible(edge))
                .collect(),
        }
    }

    /// Frame with the reveal run to completion.
    #[must_use]
    pub fn complete(layout: &DiagramLayout) -> Self {
        let total = layout.nodes.len();
        Self::capture(
            layout,
            RevealState::Revealing {
                counter: total,
                total,
            },
        )
    }

    /// Frame after `step` ticks, clamped to the node count.
    #[must_use]
    pub fn at_step(layout: &DiagramLayout, step: usize) -> Self {
        let total = layout.nodes.len();
        Self::capture(
            layout,
            RevealState::Revealing {
                counter: step.min(total),
                total,
            },
        )
    }

    #[must_use]
    pub fn node_visible(&self, index: usize) -> bool {
        self.visible_nodes.get(index).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn edge_visible(&self, index: usize) -> bool {
        self.visible_edges.get(index).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn visible_node_count(&self) -> usize {
        self.visible_nodes.iter().filter(|visible| **visible).count()
    }
}
