#![forbid(unsafe_code)]

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use dg_core::{DecisionGraph, LayoutMetrics, LevelPolicy, NodeIndex};
use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
pub struct LayoutPoint {
    pub x: f32,
    pub y: f32,
}

impl LayoutPoint {
    /// Placeholder for an edge endpoint that names no declared node.
    pub const SENTINEL: Self = Self { x: 0.0, y: 0.0 };

    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl LayoutRect {
    #[must_use]
    pub fn origin(self) -> LayoutPoint {
        LayoutPoint::new(self.x, self.y)
    }

    #[must_use]
    pub fn top_center(self) -> LayoutPoint {
        LayoutPoint::new(self.x + self.width / 2.0, self.y)
    }

    #[must_use]
    pub fn bottom_center(self) -> LayoutPoint {
        LayoutPoint::new(self.x + self.width / 2.0, self.y + self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutNodeBox {
    /// Position in first-declaration order; doubles as the reveal index.
    pub node_index: usize,
    pub node_id: String,
    pub label_lines: Vec<String>,
    pub level: usize,
    /// Slot within the level, left to right.
    pub order: usize,
    pub bounds: LayoutRect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutEdge {
    pub edge_index: usize,
    pub from_id: String,
    pub to_id: String,
    /// Top-left of the source node, or [`LayoutPoint::SENTINEL`].
    pub from: LayoutPoint,
    /// Top-left of the destination node, or [`LayoutPoint::SENTINEL`].
    pub to: LayoutPoint,
    pub from_node_index: Option<usize>,
    pub to_node_index: Option<usize>,
}

impl LayoutEdge {
    /// Both endpoints name declared nodes.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.from_node_index.is_some() && self.to_node_index.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct LayoutStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub root_count: usize,
    pub level_count: usize,
    pub unresolved_edges: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagramLayout {
    pub width: f32,
    pub height: f32,
    pub node_width: f32,
    pub node_height: f32,
    pub level_policy: LevelPolicy,
    pub nodes: Vec<LayoutNodeBox>,
    pub edges: Vec<LayoutEdge>,
    pub stats: LayoutStats,
}

impl DiagramLayout {
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&LayoutNodeBox> {
        self.nodes.iter().find(|node| node.node_id == id)
    }

    /// Bottom-center of the source and top-center of the destination, for
    /// resolved edges only.
    #[must_use]
    pub fn edge_anchors(&self, edge: &LayoutEdge) -> Option<(LayoutPoint, LayoutPoint)> {
        let source = self.nodes.get(edge.from_node_index?)?;
        let target = self.nodes.get(edge.to_node_index?)?;
        Some((source.bounds.bottom_center(), target.bounds.top_center()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutStageSnapshot {
    pub stage: &'static str,
    pub node_count: usize,
    pub edge_count: usize,
    pub root_count: usize,
    pub level_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct LayoutTrace {
    pub snapshots: Vec<LayoutStageSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TracedLayout {
    pub layout: DiagramLayout,
    pub trace: LayoutTrace,
}

#[must_use]
pub fn layout_graph(graph: &DecisionGraph) -> DiagramLayout {
    layout_graph_traced(graph).layout
}

#[must_use]
pub fn layout_graph_with_metrics(graph: &DecisionGraph, metrics: &LayoutMetrics) -> DiagramLayout {
    layout_graph_traced_with_metrics(graph, metrics).layout
}

#[must_use]
pub fn layout_graph_traced(graph: &DecisionGraph) -> TracedLayout {
    layout_graph_traced_with_metrics(graph, &LayoutMetrics::default())
}

#[must_use]
pub fn layout_graph_traced_with_metrics(
    graph: &DecisionGraph,
    metrics: &LayoutMetrics,
) -> TracedLayout {
    let mut trace = LayoutTrace::default();
    let node_count = graph.nodes.len();
    let edge_count = graph.edges.len();

    let node_index = graph.node_index_by_id();
    let edges = resolved_edges(graph, &node_index);

    let roots = identify_roots(graph, &node_index);
    push_snapshot(&mut trace, "root_identification", graph, roots.len(), 0);

    if node_count == 0 {
        debug!(edges = edge_count, "empty graph; using minimum canvas");
        let edges = build_edges(graph, &node_index, &[]);
        let stats = LayoutStats {
            node_count,
            edge_count,
            root_count: 0,
            level_count: 0,
            unresolved_edges: edges.iter().filter(|edge| !edge.is_resolved()).count(),
        };
        push_snapshot(&mut trace, "canvas_sizing", graph, 0, 0);
        return TracedLayout {
            layout: DiagramLayout {
                width: metrics.min_canvas_width,
                height: metrics.min_canvas_height,
                node_width: metrics.node_width,
                node_height: metrics.node_height,
                level_policy: metrics.level_policy,
                nodes: Vec::new(),
                edges,
                stats,
            },
            trace,
        };
    }

    let levels = match metrics.level_policy {
        LevelPolicy::LastWriteWins => assign_levels_scan(node_count, &roots, &edges),
        LevelPolicy::LongestPath => assign_levels_longest_path(node_count, &edges),
    };
    let groups = group_by_level(&levels);
    push_snapshot(&mut trace, "level_assignment", graph, roots.len(), groups.len());
    push_snapshot(&mut trace, "grouping", graph, roots.len(), groups.len());

    let nodes = place_nodes(graph, &levels, &groups, metrics);
    push_snapshot(&mut trace, "placement", graph, roots.len(), groups.len());

    let (width, height) = canvas_size(&nodes, metrics);
    push_snapshot(&mut trace, "canvas_sizing", graph, roots.len(), groups.len());

    let edges = build_edges(graph, &node_index, &nodes);
    let stats = LayoutStats {
        node_count,
        edge_count,
        root_count: roots.len(),
        level_count: groups.len(),
        unresolved_edges: edges.iter().filter(|edge| !edge.is_resolved()).count(),
    };

    debug!(
        policy = metrics.level_policy.as_str(),
        nodes = stats.node_count,
        edges = stats.edge_count,
        levels = stats.level_count,
        unresolved = stats.unresolved_edges,
        width,
        height,
        "laid out decision graph"
    );

    TracedLayout {
        layout: DiagramLayout {
            width,
            height,
            node_width: metrics.node_width,
            node_height: metrics.node_height,
            level_policy: metrics.level_policy,
            nodes,
            edges,
            stats,
        },
        trace,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ResolvedEdge {
    source: usize,
    target: usize,
}

/// Edges whose endpoints are both declared, in declaration order.
fn resolved_edges(
    graph: &DecisionGraph,
    node_index: &FxHashMap<&str, NodeIndex>,
) -> Vec<ResolvedEdge> {
    graph
        .edges
        .iter()
        .filter_map(|edge| {
            let source = node_index.get(edge.from.as_str())?.0;
            let target = node_index.get(edge.to.as_str())?.0;
            Some(ResolvedEdge { source, target })
        })
        .collect()
}

/// Nodes no edge points at, in declaration order. An edge from an undeclared
/// source still counts as incoming.
fn identify_roots(
    graph: &DecisionGraph,
    node_index: &FxHashMap<&str, NodeIndex>,
) -> Vec<usize> {
    let mut has_incoming = vec![false; graph.nodes.len()];
    for edge in &graph.edges {
        if let Some(target) = node_index.get(edge.to.as_str()) {
            has_incoming[target.0] = true;
        }
    }
    (0..graph.nodes.len())
        .filter(|index| !has_incoming[*index])
        .collect()
}

/// Single forward pass in edge order: a destination takes its source's level
/// plus one whenever the source already has a level, so the last such edge
/// wins. Nodes never reached stay on level 0.
fn assign_levels_scan(node_count: usize, roots: &[usize], edges: &[ResolvedEdge]) -> Vec<usize> {
    let mut levels: Vec<Option<usize>> = vec![None; node_count];
    for &root in roots {
        levels[root] = Some(0);
    }

    for edge in edges {
        let Some(source_level) = levels[edge.source] else {
            trace!(
                source = edge.source,
                target = edge.target,
                "source has no level yet; edge skipped"
            );
            continue;
        };
        levels[edge.target] = Some(source_level.saturating_add(1));
    }

    levels.into_iter().map(|level| level.unwrap_or(0)).collect()
}

/// Longest path from any root via a topological pass. Nodes on a cycle keep
/// the largest level offered by predecessors outside it.
fn assign_levels_longest_path(node_count: usize, edges: &[ResolvedEdge]) -> Vec<usize> {
    let mut levels = vec![0_usize; node_count];
    let mut in_degree = vec![0_usize; node_count];
    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); node_count];

    for edge in edges {
        if edge.source == edge.target {
            continue;
        }
        in_degree[edge.target] = in_degree[edge.target].saturating_add(1);
        outgoing[edge.source].push(edge.target);
    }

    let mut heap: BinaryHeap<Reverse<usize>> = (0..node_count)
        .filter(|index| in_degree[*index] == 0)
        .map(Reverse)
        .collect();

    let mut visited = 0_usize;
    while let Some(Reverse(node)) = heap.pop() {
        visited = visited.saturating_add(1);
        let candidate = levels[node].saturating_add(1);
        for &target in &outgoing[node] {
            if candidate > levels[target] {
                levels[target] = candidate;
            }
            in_degree[target] = in_degree[target].saturating_sub(1);
            if in_degree[target] == 0 {
                heap.push(Reverse(target));
            }
        }
    }

    if visited < node_count {
        trace!(
            cyclic = node_count - visited,
            "cycle residue left at predecessor levels"
        );
    }

    levels
}

/// Node indexes bucketed by level, declaration order within a level.
fn group_by_level(levels: &[usize]) -> Vec<Vec<usize>> {
    let level_count = levels.iter().copied().max().map_or(0, |max| max + 1);
    let mut groups = vec![Vec::new(); level_count];
    for (node_index, &level) in levels.iter().enumerate() {
        groups[level].push(node_index);
    }
    groups
}

/// Slot nodes left to right within each level. The first populated level
/// starts at the origin; each later level starts at
/// `max(origin, (right-most x placed so far - level width) / 2)`.
fn place_nodes(
    graph: &DecisionGraph,
    levels: &[usize],
    groups: &[Vec<usize>],
    metrics: &LayoutMetrics,
) -> Vec<LayoutNodeBox> {
    let stride = metrics.slot_stride();
    let mut placed: Vec<Option<LayoutNodeBox>> = vec![None; graph.nodes.len()];
    let mut max_placed_x: Option<f32> = None;

    for (level, group) in groups.iter().enumerate() {
        if group.is_empty() {
            continue;
        }

        let group_width = group.len() as f32 * stride;
        let start_x = match max_placed_x {
            Some(max_x) => metrics.origin.max((max_x - group_width) / 2.0),
            None => metrics.origin,
        };
        let y = metrics.origin + level as f32 * metrics.level_stride();

        for (order, &node_index) in group.iter().enumerate() {
            let x = start_x + order as f32 * stride;
            max_placed_x = Some(max_placed_x.map_or(x, |max_x| max_x.max(x)));

            let node = &graph.nodes[node_index];
            placed[node_index] = Some(LayoutNodeBox {
                node_index,
                node_id: node.id.clone(),
                label_lines: node.label_lines().into_iter().map(str::to_string).collect(),
                level: levels[node_index],
                order,
                bounds: LayoutRect {
                    x,
                    y,
                    width: metrics.node_width,
                    height: metrics.node_height,
                },
            });
        }
    }

    placed.into_iter().flatten().collect()
}

fn canvas_size(nodes: &[LayoutNodeBox], metrics: &LayoutMetrics) -> (f32, f32) {
    if nodes.is_empty() {
        return (metrics.min_canvas_width, metrics.min_canvas_height);
    }

    let max_x = nodes
        .iter()
        .map(|node| node.bounds.x)
        .fold(f32::MIN, f32::max);
    let max_y = nodes
        .iter()
        .map(|node| node.bounds.y)
        .fold(f32::MIN, f32::max);

    (
        metrics
            .min_canvas_width
            .max(max_x + metrics.node_width + metrics.canvas_margin),
        metrics
            .min_canvas_height
            .max(max_y + metrics.node_height + metrics.canvas_margin),
    )
}

/// Resolve each edge's endpoints to node positions. Missing endpoints fall
/// back to [`LayoutPoint::SENTINEL`] independently.
fn build_edges(
    graph: &DecisionGraph,
    node_index: &FxHashMap<&str, NodeIndex>,
    nodes: &[LayoutNodeBox],
) -> Vec<LayoutEdge> {
    let position_of = |id: &str| -> (LayoutPoint, Option<usize>) {
        node_index
            .get(id)
            .and_then(|index| nodes.get(index.0))
            .map_or((LayoutPoint::SENTINEL, None), |node| {
                (node.bounds.origin(), Some(node.node_index))
            })
    };

    graph
        .edges
        .iter()
        .enumerate()
        .map(|(edge_index, edge)| {
            let (from, from_node_index) = position_of(&edge.from);
            let (to, to_node_index) = position_of(&edge.to);
            LayoutEdge {
                edge_index,
                from_id: edge.from.clone(),
                to_id: edge.to.clone(),
                from,
                to,
                from_node_index,
                to_node_index,
            }
        })
        .collect()
}

fn push_snapshot(
    trace: &mut LayoutTrace,
    stage: &'static str,
    graph: &DecisionGraph,
    root_count: usize,
    level_count: usize,
) {
    trace.snapshots.push(LayoutStageSnapshot {
        stage,
        node_count: graph.nodes.len(),
        edge_count: graph.edges.len(),
        root_count,
        level_count,
    });
}

#[cfg(test)]
mod tests {
    use super::{
        LayoutPoint, group_by_level, layout_graph, layout_graph_traced, layout_graph_with_metrics,
    };
    use dg_core::{DecisionGraph, GraphEdge, GraphNode, LayoutMetrics, LevelPolicy};
    use dg_parser::parse;
    use proptest::prelude::*;

    fn graph_of(source: &str) -> DecisionGraph {
        parse(source).graph
    }

    fn level_of(source: &str, id: &str, policy: LevelPolicy) -> usize {
        let metrics = LayoutMetrics {
            level_policy: policy,
            ..LayoutMetrics::default()
        };
        let layout = layout_graph_with_metrics(&graph_of(source), &metrics);
        layout.node(id).map(|node| node.level).expect("node present")
    }

    #[test]
    fn empty_graph_uses_minimum_canvas() {
        let layout = layout_graph(&DecisionGraph::empty());
        assert_eq!(layout.width, 400.0);
        assert_eq!(layout.height, 200.0);
        assert!(layout.nodes.is_empty());
        assert!(layout.edges.is_empty());
    }

    #[test]
    fn single_node_sits_at_origin() {
        let layout = layout_graph(&graph_of("A[Only]"));
        assert_eq!(layout.nodes.len(), 1);
        assert_eq!(layout.nodes[0].bounds.origin(), LayoutPoint::new(50.0, 50.0));
        assert_eq!(layout.width, 400.0);
        assert_eq!(layout.height, 210.0);
        assert!(layout.width >= 50.0 + 150.0 + 100.0);
    }

    #[test]
    fn root_with_two_children_is_placed_side_by_side() {
        let layout = layout_graph(&graph_of("A[Root]\nA --> B[Left]\nA --> C[Right]"));
        let a = layout.node("A").expect("A");
        let b = layout.node("B").expect("B");
        let c = layout.node("C").expect("C");

        assert_eq!(a.level, 0);
        assert_eq!((b.level, c.level), (1, 1));
        assert_eq!(a.bounds.origin(), LayoutPoint::new(50.0, 50.0));
        assert_eq!(b.bounds.origin(), LayoutPoint::new(50.0, 210.0));
        assert_eq!(c.bounds.origin(), LayoutPoint::new(250.0, 210.0));
        assert_eq!(layout.width, 500.0);
        assert_eq!(layout.height, 370.0);
        assert!(layout.edges.iter().all(super::LayoutEdge::is_resolved));
        assert_eq!(layout.edges[1].to, c.bounds.origin());
    }

    #[test]
    fn wide_upper_level_offsets_next_level() {
        let source = "A[a]\nB[b]\nC[c]\nD[d]\nE[e]\nD --> F[f]";
        let layout = layout_graph(&graph_of(source));
        let f = layout.node("F").expect("F");
        assert_eq!(f.level, 1);
        // Level 0 holds A..E, the right-most at x = 850.
        assert_eq!(f.bounds.x, (850.0 - 200.0) / 2.0);
    }

    #[test]
    fn dangling_edge_resolves_to_sentinel() {
        let layout = layout_graph(&graph_of("X --> Y"));
        assert!(layout.nodes.is_empty());
        assert_eq!(layout.edges.len(), 1);
        let edge = &layout.edges[0];
        assert!(!edge.is_resolved());
        assert_eq!(edge.from, LayoutPoint::SENTINEL);
        assert_eq!(edge.to, LayoutPoint::SENTINEL);
        assert_eq!(layout.stats.unresolved_edges, 1);
        assert_eq!((layout.width, layout.height), (400.0, 200.0));
        assert!(layout.edge_anchors(edge).is_none());
    }

    #[test]
    fn half_resolved_edge_keeps_known_endpoint() {
        let layout = layout_graph(&graph_of("A[Root]\nA --> Ghost"));
        let edge = &layout.edges[0];
        assert_eq!(edge.from, LayoutPoint::new(50.0, 50.0));
        assert_eq!(edge.to, LayoutPoint::SENTINEL);
        assert!(!edge.is_resolved());
        // An undeclared destination does not demote A from being a root.
        assert_eq!(layout.stats.root_count, 1);
    }

    #[test]
    fn undeclared_source_still_demotes_its_destination() {
        let layout = layout_graph(&graph_of("A[Root]\nB[Leaf]\nGhost --> B"));
        assert_eq!(layout.stats.root_count, 1);
        assert_eq!(layout.node("B").map(|node| node.level), Some(0));
        assert_eq!(layout.nodes[1].bounds.origin(), LayoutPoint::new(250.0, 50.0));
        assert!(!layout.edges[0].is_resolved());
    }

    #[test]
    fn diamond_last_write_wins_follows_edge_order() {
        // D is reached via B (level 1) last, so it lands on level 2 even
        // though the path through C is longer.
        let source = "A[a]\nB[b]\nC[c]\nD[d]\nA --> B\nA --> C\nC --> E[e]\nE --> D\nB --> D";
        assert_eq!(level_of(source, "D", LevelPolicy::LastWriteWins), 2);
        assert_eq!(level_of(source, "D", LevelPolicy::LongestPath), 3);
    }

    #[test]
    fn scan_skips_edges_whose_source_has_no_level_yet() {
        // B --> C is processed before A --> B, so C never gets a level.
        let source = "A[a]\nB[b]\nC[c]\nB --> C\nA --> B";
        assert_eq!(level_of(source, "B", LevelPolicy::LastWriteWins), 1);
        assert_eq!(level_of(source, "C", LevelPolicy::LastWriteWins), 0);
        assert_eq!(level_of(source, "C", LevelPolicy::LongestPath), 2);
    }

    #[test]
    fn cycle_without_roots_stays_on_level_zero() {
        let source = "A[a]\nB[b]\nA --> B\nB --> A";
        let layout = layout_graph(&graph_of(source));
        assert_eq!(layout.stats.root_count, 0);
        assert!(layout.nodes.iter().all(|node| node.level == 0));
        assert_eq!(layout.nodes[1].bounds.x, 250.0);
    }

    #[test]
    fn label_lines_are_carried_into_layout() {
        let layout = layout_graph(&graph_of("A[Start up<br>P: 30%<br>E: +100k]"));
        assert_eq!(
            layout.nodes[0].label_lines,
            vec!["Start up", "P: 30%", "E: +100k"]
        );
    }

    #[test]
    fn custom_metrics_scale_positions() {
        let metrics = LayoutMetrics {
            node_width: 100.0,
            node_gap: 20.0,
            origin: 10.0,
            ..LayoutMetrics::default()
        };
        let layout = layout_graph_with_metrics(&graph_of("A[a]\nB[b]"), &metrics);
        assert_eq!(layout.nodes[1].bounds.x, 130.0);
        assert_eq!(layout.nodes[1].bounds.width, 100.0);
    }

    #[test]
    fn traced_layout_records_stages() {
        let traced = layout_graph_traced(&graph_of("A[Root]\nA --> B[Leaf]"));
        let stages: Vec<_> = traced.trace.snapshots.iter().map(|s| s.stage).collect();
        assert_eq!(
            stages,
            vec![
                "root_identification",
                "level_assignment",
                "grouping",
                "placement",
                "canvas_sizing"
            ]
        );
        assert_eq!(traced.layout.stats.level_count, 2);
    }

    #[test]
    fn groups_keep_declaration_order() {
        assert_eq!(group_by_level(&[0, 1, 0, 2]), vec![vec![0, 2], vec![1], vec![3]]);
        assert!(group_by_level(&[]).is_empty());
    }

    #[test]
    fn layout_serializes_to_json() {
        let layout = layout_graph(&graph_of("A[Root]\nA --> B[Leaf]"));
        let json = serde_json::to_string(&layout).expect("serialize layout");
        assert!(json.contains("\"node_id\":\"B\""));
        assert!(json.contains("\"level_policy\":\"last-write-wins\""));
    }

    fn arbitrary_graph() -> impl Strategy<Value = DecisionGraph> {
        (1_usize..10)
            .prop_flat_map(|node_count| {
                (
                    Just(node_count),
                    prop::collection::vec((0..node_count + 2, 0..node_count + 2), 0..16),
                )
            })
            .prop_map(|(node_count, edge_pairs)| DecisionGraph {
                nodes: (0..node_count)
                    .map(|index| GraphNode {
                        id: format!("N{index}"),
                        label: format!("Node {index}"),
                        line: index + 1,
                    })
                    .collect(),
                edges: edge_pairs
                    .into_iter()
                    .enumerate()
                    .map(|(line, (from, to))| GraphEdge {
                        from: format!("N{from}"),
                        to: format!("N{to}"),
                        line,
                    })
                    .collect(),
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_layout_is_idempotent(graph in arbitrary_graph()) {
            prop_assert_eq!(layout_graph(&graph), layout_graph(&graph));
        }

        #[test]
        fn prop_coordinates_are_non_negative_and_canvas_bounded(graph in arbitrary_graph()) {
            let layout = layout_graph(&graph);
            prop_assert!(layout.width >= 400.0 && layout.height >= 200.0);
            for node in &layout.nodes {
                prop_assert!(node.bounds.x >= 0.0 && node.bounds.y >= 0.0);
                prop_assert!(node.bounds.x + node.bounds.width <= layout.width);
                prop_assert!(node.bounds.y + node.bounds.height <= layout.height);
            }
            for edge in &layout.edges {
                prop_assert!(edge.from.x >= 0.0 && edge.from.y >= 0.0);
                prop_assert!(edge.to.x >= 0.0 && edge.to.y >= 0.0);
            }
        }

        #[test]
        fn prop_roots_are_level_zero(graph in arbitrary_graph()) {
            let layout = layout_graph(&graph);
            for node in &layout.nodes {
                let has_incoming = layout
                    .edges
                    .iter()
                    .any(|edge| edge.to_node_index == Some(node.node_index) && edge.from_node_index.is_some());
                if !has_incoming {
                    prop_assert_eq!(node.level, 0);
                }
            }
        }

        #[test]
        fn prop_deeper_levels_have_an_incoming_edge(graph in arbitrary_graph()) {
            let layout = layout_graph(&graph);
            for node in layout.nodes.iter().filter(|node| node.level > 0) {
                prop_assert!(layout
                    .edges
                    .iter()
                    .any(|edge| edge.is_resolved() && edge.to_node_index == Some(node.node_index)));
            }
        }

        #[test]
        fn prop_longest_path_puts_targets_below_sources(
            node_count in 2_usize..10,
            pairs in prop::collection::vec((0_usize..10, 0_usize..10), 0..16),
        ) {
            // Edges only point from lower to higher index, so the graph is acyclic.
            let graph = DecisionGraph {
                nodes: (0..node_count)
                    .map(|index| GraphNode {
                        id: format!("N{index}"),
                        label: String::new(),
                        line: index + 1,
                    })
                    .collect(),
                edges: pairs
                    .into_iter()
                    .map(|(a, b)| (a % node_count, b % node_count))
                    .filter(|(a, b)| a != b)
                    .map(|(a, b)| GraphEdge {
                        from: format!("N{}", a.min(b)),
                        to: format!("N{}", a.max(b)),
                        line: 0,
                    })
                    .collect(),
            };
            let metrics = LayoutMetrics {
                level_policy: LevelPolicy::LongestPath,
                ..LayoutMetrics::default()
            };
            let layout = layout_graph_with_metrics(&graph, &metrics);
            for edge in &layout.edges {
                let (Some(from), Some(to)) = (edge.from_node_index, edge.to_node_index) else {
                    continue;
                };
                prop_assert!(layout.nodes[to].level > layout.nodes[from].level);
            }
        }
    }
}
