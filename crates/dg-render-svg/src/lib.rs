#![forbid(unsafe_code)]

//! SVG output for a [`DiagramLayout`] at a given reveal step.
//!
//! Every node and resolved edge is always emitted so a viewer can animate
//! between frames with CSS; hidden ones carry `opacity="0"` and the
//! `dg-hidden` class. Edges are drawn before nodes so boxes sit on top.

mod attributes;
mod document;
mod element;

pub use attributes::{AttributeValue, Attributes, escape_xml_text, format_number};
pub use document::SvgDocument;
pub use element::{Element, ElementKind};

use dg_layout::{DiagramLayout, LayoutEdge, LayoutNodeBox};
use dg_reveal::RevealFrame;
use tracing::debug;

pub const VISIBLE_CLASS: &str = "dg-visible";
pub const HIDDEN_CLASS: &str = "dg-hidden";
const ARROW_MARKER_ID: &str = "dg-arrow";

/// Colors and text metrics for the rendered diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgStyle {
    pub node_fill: String,
    pub node_stroke: String,
    pub edge_stroke: String,
    pub text_fill: String,
    pub stroke_width: f32,
    pub corner_radius: f32,
    pub font_size: f32,
    /// Vertical advance between label lines.
    pub line_height: f32,
    /// CSS transition applied when visibility flips.
    pub transition_ms: u64,
    pub arrowheads: bool,
}

impl Default for SvgStyle {
    fn default() -> Self {
        Self {
            node_fill: String::from("white"),
            node_stroke: String::from("#94a3b8"),
            edge_stroke: String::from("#94a3b8"),
            text_fill: String::from("#374151"),
            stroke_width: 2.0,
            corner_radius: 8.0,
            font_size: 14.0,
            line_height: 20.0,
            transition_ms: 300,
            arrowheads: false,
        }
    }
}

#[must_use]
pub fn render_svg(layout: &DiagramLayout, frame: &RevealFrame) -> String {
    render_svg_with_style(layout, frame, &SvgStyle::default())
}

#[must_use]
pub fn render_svg_with_style(
    layout: &DiagramLayout,
    frame: &RevealFrame,
    style: &SvgStyle,
) -> String {
    let document = build_document(layout, frame, style);
    debug!(
        nodes = layout.nodes.len(),
        edges = layout.edges.len(),
        visible = frame.visible_node_count(),
        "rendered svg frame"
    );
    document.to_string()
}

#[must_use]
pub fn build_document(
    layout: &DiagramLayout,
    frame: &RevealFrame,
    style: &SvgStyle,
) -> SvgDocument {
    let mut document = SvgDocument::new()
        .size(layout.width, layout.height)
        .class("dg-diagram")
        .data("nodes", layout.nodes.len())
        .data("visible", frame.visible_node_count())
        .accessible(
            "Decision graph",
            format!(
                "{} decisions, {} links",
                layout.nodes.len(),
                layout.stats.edge_count.saturating_sub(layout.stats.unresolved_edges)
            ),
        )
        .style(stylesheet(style));

    if style.arrowheads {
        document = document.def(arrow_marker(style));
    }

    let edges = layout
        .edges
        .iter()
        .filter_map(|edge| render_edge(layout, edge, frame, style));
    let nodes = layout
        .nodes
        .iter()
        .map(|node| render_node(node, frame, style));

    document
        .child(Element::group().class("dg-edges").children(edges))
        .child(Element::group().class("dg-nodes").children(nodes))
}

fn stylesheet(style: &SvgStyle) -> String {
    format!(
        ".dg-node,.dg-edge{{transition:opacity {ms}ms ease}}.{HIDDEN_CLASS}{{opacity:0}}.dg-label{{font-size:{size}px}}",
        ms = style.transition_ms,
        size = format_number(style.font_size),
    )
}

fn arrow_marker(style: &SvgStyle) -> Element {
    Element::marker()
        .id(ARROW_MARKER_ID)
        .attr("viewBox", "0 0 10 10")
        .attr_num("refX", 10.0)
        .attr_num("refY", 5.0)
        .attr_num("markerWidth", 6.0)
        .attr_num("markerHeight", 6.0)
        .attr("orient", "auto")
        .child(Element::polygon().points("0,0 10,5 0,10").fill(&style.edge_stroke))
}

fn with_visibility(element: Element, visible: bool) -> Element {
    if visible {
        element.class(VISIBLE_CLASS)
    } else {
        element.class(HIDDEN_CLASS).opacity(0.0)
    }
}

/// Straight segment from the source's bottom-center to the destination's
/// top-center. Unresolved edges are not drawn.
fn render_edge(
    layout: &DiagramLayout,
    edge: &LayoutEdge,
    frame: &RevealFrame,
    style: &SvgStyle,
) -> Option<Element> {
    let (start, end) = layout.edge_anchors(edge)?;
    let d = format!(
        "M {} {} L {} {}",
        format_number(start.x),
        format_number(start.y),
        format_number(end.x),
        format_number(end.y)
    );

    let mut path = Element::path()
        .class("dg-edge")
        .data("from", edge.from_id.as_str())
        .data("to", edge.to_id.as_str())
        .d(&d)
        .stroke(&style.edge_stroke)
        .stroke_width(style.stroke_width)
        .fill("none");
    if style.arrowheads {
        path = path.marker_end(&format!("url(#{ARROW_MARKER_ID})"));
    }
    Some(with_visibility(path, frame.edge_visible(edge.edge_index)))
}

fn render_node(node: &LayoutNodeBox, frame: &RevealFrame, style: &SvgStyle) -> Element {
    let bounds = node.bounds;
    let center_x = bounds.width / 2.0;

    let lines = node.label_lines.iter().enumerate().map(|(index, line)| {
        Element::tspan()
            .x(center_x)
            .attr_num("dy", if index == 0 { 0.0 } else { style.line_height })
            .content(line.as_str())
    });

    let group = Element::group()
        .class("dg-node")
        .data("id", node.node_id.as_str())
        .data("index", node.node_index)
        .transform(&format!(
            "translate({}, {})",
            format_number(bounds.x),
            format_number(bounds.y)
        ))
        .child(
            Element::rect()
                .width(bounds.width)
                .height(bounds.height)
                .rx(style.corner_radius)
                .fill(&style.node_fill)
                .stroke(&style.node_stroke)
                .stroke_width(style.stroke_width),
        )
        .child(
            Element::text()
                .class("dg-label")
                .x(center_x)
                .y(bounds.height / 2.0)
                .attr("text-anchor", "middle")
                .attr("dominant-baseline", "middle")
                .fill(&style.text_fill)
                .children(lines),
        );

    with_visibility(group, frame.node_visible(node.node_index))
}
