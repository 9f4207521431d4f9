use dg_core::{EDGE_DELIMITER, ParseWarningCode};
use tracing::trace;

use crate::{ParseResult, graph_builder::GraphBuilder};

/// Extract nodes and edges line by line.
///
/// Edge lines (`A --> B`) win over node lines (`A[label]`). Anything else is
/// skipped. A node line whose closing bracket precedes its opening bracket
/// degrades the whole input to an empty graph.
pub(crate) fn parse_lines(input: &str, from_fenced_block: bool) -> ParseResult {
    let mut builder = GraphBuilder::new();

    if input.trim().is_empty() {
        builder.add_warning(
            ParseWarningCode::EmptyInput,
            0,
            "input was empty; returning empty graph".to_string(),
        );
        return builder.finish(from_fenced_block);
    }

    for (index, line) in input.lines().enumerate() {
        let line_number = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || is_comment(trimmed) || is_header(trimmed) {
            continue;
        }

        if parse_edge_line(trimmed, line_number, &mut builder) {
            continue;
        }
        if parse_node_line(trimmed, line_number, &mut builder) {
            if builder.is_degraded() {
                break;
            }
            continue;
        }

        trace!(line = line_number, "ignoring line without node or edge");
    }

    if !builder.is_degraded() && builder.node_count() == 0 && builder.edge_count() == 0 {
        builder.add_warning(
            ParseWarningCode::NoGraphContent,
            0,
            "input contained no node or edge lines".to_string(),
        );
    }

    builder.finish(from_fenced_block)
}

fn parse_edge_line(line: &str, line_number: usize, builder: &mut GraphBuilder) -> bool {
    if !line.contains(EDGE_DELIMITER) {
        return false;
    }

    let mut sides = line.split(EDGE_DELIMITER);
    let from_raw = sides.next().unwrap_or_default();
    let to_raw = sides.next().unwrap_or_default();
    if sides.next().is_some() {
        trace!(
            line = line_number,
            "chained edge line; only the first arrow is recorded"
        );
    }

    let from = parse_endpoint(from_raw, line_number, builder);
    let to = parse_endpoint(to_raw, line_number, builder);
    builder.push_edge(&from, &to, line_number);
    true
}

/// Resolve one side of an edge to its token, declaring a node when the side
/// carries a bracketed label (`B[Left]`). An empty side is still recorded and
/// only resolves against a node declared with an empty token.
fn parse_endpoint(raw: &str, line_number: usize, builder: &mut GraphBuilder) -> String {
    let trimmed = raw.trim();
    let token = match scan_brackets(trimmed) {
        BracketScan::Plain => trimmed.to_string(),
        BracketScan::Labelled { id, label } => {
            builder.intern_node(id, label, line_number);
            id.trim().to_string()
        }
        BracketScan::Unclosed { id } | BracketScan::Reversed { id } => {
            builder.add_warning(
                ParseWarningCode::UnbalancedBracket,
                line_number,
                format!("unbalanced label on edge endpoint `{trimmed}`; label ignored"),
            );
            id.trim().to_string()
        }
    };

    if token.is_empty() {
        builder.add_warning(
            ParseWarningCode::EmptyToken,
            line_number,
            "edge endpoint has an empty token; edge kept unresolved".to_string(),
        );
    }
    token
}

fn parse_node_line(line: &str, line_number: usize, builder: &mut GraphBuilder) -> bool {
    if !(line.contains('[') && line.contains(']')) {
        if line.contains('[') {
            builder.add_warning(
                ParseWarningCode::UnbalancedBracket,
                line_number,
                "node label is missing `]`; line ignored".to_string(),
            );
        }
        return false;
    }

    match scan_brackets(line) {
        BracketScan::Labelled { id, label } => {
            builder.intern_node(id, label, line_number);
        }
        BracketScan::Reversed { .. } | BracketScan::Unclosed { .. } => {
            builder.degrade(
                ParseWarningCode::UnbalancedBracket,
                line_number,
                "`]` appears before `[`; input degraded to an empty graph".to_string(),
            );
        }
        BracketScan::Plain => return false,
    }
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BracketScan<'a> {
    Plain,
    Labelled { id: &'a str, label: &'a str },
    Unclosed { id: &'a str },
    Reversed { id: &'a str },
}

/// Locate `id[label]`: the token is everything before the first `[`, the
/// label runs to the first `]` after it.
fn scan_brackets(fragment: &str) -> BracketScan<'_> {
    let Some(open_idx) = fragment.find('[') else {
        return BracketScan::Plain;
    };
    let id = &fragment[..open_idx];
    let rest = &fragment[open_idx + 1..];
    match rest.find(']') {
        Some(close_idx) => BracketScan::Labelled {
            id,
            label: &rest[..close_idx],
        },
        None if fragment[..open_idx].contains(']') => BracketScan::Reversed { id },
        None => BracketScan::Unclosed { id },
    }
}

fn is_comment(line: &str) -> bool {
    line.starts_with("%%")
}

fn is_header(line: &str) -> bool {
    let Some(first_word) = line.split_whitespace().next() else {
        return false;
    };
    let lower = first_word.to_ascii_lowercase();
    (lower == "graph" || lower == "flowchart")
        && !line.contains(EDGE_DELIMITER)
        && !line.contains('[')
}
