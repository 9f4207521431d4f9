#![forbid(unsafe_code)]

//! Graph extractor for decision-tree text.
//!
//! Understands the small subset produced by the upstream prompt contract:
//! `id[label]` node lines and `from --> to` edge lines. Extraction never
//! fails; problems are reported as [`ParseWarning`]s next to a (possibly
//! empty) graph.

mod fenced;
mod graph_builder;
mod line_parser;

use dg_core::{DecisionGraph, ParseWarning};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

pub use fenced::extract_fenced_block;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseResult {
    pub graph: DecisionGraph,
    pub warnings: Vec<ParseWarning>,
    /// True when the graph came from a ```` ```mermaid ```` block inside a
    /// larger response.
    pub from_fenced_block: bool,
}

/// Extract a graph from raw node/edge text.
#[must_use]
pub fn parse(input: &str) -> ParseResult {
    let result = line_parser::parse_lines(input, false);
    log_result(&result);
    result
}

/// Extract a graph from a model response: the first fenced mermaid block if
/// present, otherwise the whole text.
#[must_use]
pub fn parse_response(response: &str) -> ParseResult {
    let result = match extract_fenced_block(response) {
        Some(body) => line_parser::parse_lines(body, true),
        None => line_parser::parse_lines(response, false),
    };
    log_result(&result);
    result
}

fn log_result(result: &ParseResult) {
    debug!(
        nodes = result.graph.nodes.len(),
        edges = result.graph.edges.len(),
        warnings = result.warnings.len(),
        fenced = result.from_fenced_block,
        "extracted decision graph"
    );
}

#[must_use]
pub fn parse_evidence_json(parsed: &ParseResult) -> String {
    json!({
        "node_count": parsed.graph.nodes.len(),
        "edge_count": parsed.graph.edges.len(),
        "resolved_edge_count": parsed.graph.resolved_edge_count(),
        "from_fenced_block": parsed.from_fenced_block,
        "warning_count": parsed.warnings.len(),
        "warnings": parsed
            .warnings
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>(),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::{parse, parse_evidence_json, parse_response};
    use dg_core::{DecisionGraph, ParseWarningCode};
    use proptest::prelude::*;

    #[test]
    fn empty_input_returns_warning() {
        let result = parse("");
        assert!(result.graph.is_empty());
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].code, ParseWarningCode::EmptyInput);
    }

    #[test]
    fn text_without_graph_lines_yields_empty_graph() {
        let result = parse("just some prose\nwith no structure");
        assert!(result.graph.is_empty());
        assert_eq!(result.warnings[0].code, ParseWarningCode::NoGraphContent);
    }

    #[test]
    fn parses_root_with_two_children() {
        let result = parse("A[Root]\nA --> B[Left]\nA --> C[Right]");
        let ids: Vec<_> = result.graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
        assert_eq!(result.graph.nodes[1].label, "Left");
        assert_eq!(result.graph.edges.len(), 2);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn duplicate_declaration_replaces_label_silently() {
        let result = parse("A[First]\nB[Other]\nA[Second]");
        assert_eq!(result.graph.nodes.len(), 2);
        assert_eq!(result.graph.nodes[0].id, "A");
        assert_eq!(result.graph.nodes[0].label, "Second");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn dangling_edge_is_kept_without_nodes() {
        let result = parse("X --> Y");
        assert!(result.graph.nodes.is_empty());
        assert_eq!(result.graph.edges.len(), 1);
        assert_eq!(result.graph.edges[0].from, "X");
        assert_eq!(result.graph.edges[0].to, "Y");
        assert_eq!(result.graph.resolved_edge_count(), 0);
    }

    #[test]
    fn empty_tokens_keep_their_edges_and_nodes() {
        let result = parse("B[Leaf]\n--> B\nA -->");
        assert_eq!(result.graph.edges.len(), 2);
        assert_eq!(result.graph.nodes.len(), 1);
        assert_eq!(result.graph.resolved_edge_count(), 0);
        assert_eq!(
            result
                .warnings
                .iter()
                .filter(|warning| warning.code == ParseWarningCode::EmptyToken)
                .count(),
            2
        );

        let orphan = parse("[Orphan]");
        assert_eq!(orphan.graph.nodes.len(), 1);
        assert_eq!(orphan.graph.nodes[0].id, "");
        assert_eq!(orphan.graph.nodes[0].label, "Orphan");
    }

    #[test]
    fn parse_response_prefers_fenced_block() {
        let response = "Intro A[ignored]\n```mermaid\ngraph TD\nA[Quit?] --> B1[Stay]\nA --> B2[Leave]\n```\nOutro";
        let result = parse_response(response);
        assert!(result.from_fenced_block);
        assert_eq!(result.graph.nodes.len(), 3);
        assert_eq!(result.graph.nodes[0].label, "Quit?");
    }

    #[test]
    fn parse_response_falls_back_to_whole_text() {
        let result = parse_response("A[Root]\nA --> B[Leaf]");
        assert!(!result.from_fenced_block);
        assert_eq!(result.graph.nodes.len(), 2);
    }

    #[test]
    fn evidence_json_contains_counts() {
        let result = parse("A[Root]\nA --> B\nX --> Y");
        let evidence = parse_evidence_json(&result);
        assert!(evidence.contains("\"node_count\":1"));
        assert!(evidence.contains("\"edge_count\":2"));
        assert!(evidence.contains("\"resolved_edge_count\":0"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_parse_is_total_and_serializable(input in ".{0,256}") {
            let result = parse(&input);
            let encoded = serde_json::to_string(&result.graph).expect("serialize graph");
            let decoded: DecisionGraph =
                serde_json::from_str(&encoded).expect("deserialize graph");
            prop_assert_eq!(decoded, result.graph);
        }

        #[test]
        fn prop_parse_is_deterministic(input in "[A-C\\[\\]<> \\-\n]{0,128}") {
            let first = parse(&input);
            let second = parse(&input);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_node_tokens_are_unique(input in "([A-D]\\[[a-z]{0,4}\\]\n|[A-D] --> [A-D]\n){0,16}") {
            let result = parse(&input);
            let mut ids: Vec<_> = result.graph.nodes.iter().map(|n| n.id.clone()).collect();
            let total = ids.len();
            ids.sort();
            ids.dedup();
            prop_assert_eq!(ids.len(), total);
        }
    }
}
