//! Fluent builder for the handful of SVG elements a decision diagram uses.

use std::fmt;

use crate::attributes::{AttributeValue, Attributes, escape_xml_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Rect,
    Path,
    Polygon,
    Text,
    Tspan,
    Group,
    Marker,
    Defs,
}

impl ElementKind {
    #[must_use]
    pub const fn tag_name(self) -> &'static str {
        match self {
            Self::Rect => "rect",
            Self::Path => "path",
            Self::Polygon => "polygon",
            Self::Text => "text",
            Self::Tspan => "tspan",
            Self::Group => "g",
            Self::Marker => "marker",
            Self::Defs => "defs",
        }
    }

    /// Shapes close as `<rect/>`; containers always get an end tag.
    const fn is_shape(self) -> bool {
        matches!(self, Self::Rect | Self::Path | Self::Polygon)
    }
}

#[derive(Debug, Clone)]
pub struct Element {
    kind: ElementKind,
    attrs: Attributes,
    children: Vec<Element>,
    content: Option<String>,
}

impl Element {
    #[must_use]
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            attrs: Attributes::default(),
            children: Vec::new(),
            content: None,
        }
    }

    #[must_use]
    pub fn rect() -> Self {
        Self::new(ElementKind::Rect)
    }

    #[must_use]
    pub fn path() -> Self {
        Self::new(ElementKind::Path)
    }

    #[must_use]
    pub fn polygon() -> Self {
        Self::new(ElementKind::Polygon)
    }

    #[must_use]
    pub fn text() -> Self {
        Self::new(ElementKind::Text)
    }

    #[must_use]
    pub fn tspan() -> Self {
        Self::new(ElementKind::Tspan)
    }

    #[must_use]
    pub fn group() -> Self {
        Self::new(ElementKind::Group)
    }

    #[must_use]
    pub fn marker() -> Self {
        Self::new(ElementKind::Marker)
    }

    #[must_use]
    pub fn defs() -> Self {
        Self::new(ElementKind::Defs)
    }

    #[must_use]
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push(name, value);
        self
    }

    #[must_use]
    pub fn attr_num(mut self, name: &str, value: f32) -> Self {
        self.attrs.push(name, value);
        self
    }

    #[must_use]
    pub fn x(self, value: f32) -> Self {
        self.attr_num("x", value)
    }

    #[must_use]
    pub fn y(self, value: f32) -> Self {
        self.attr_num("y", value)
    }

    #[must_use]
    pub fn width(self, value: f32) -> Self {
        self.attr_num("width", value)
    }

    #[must_use]
    pub fn height(self, value: f32) -> Self {
        self.attr_num("height", value)
    }

    #[must_use]
    pub fn rx(self, value: f32) -> Self {
        self.attr_num("rx", value)
    }

    #[must_use]
    pub fn d(self, path_data: &str) -> Self {
        self.attr("d", path_data)
    }

    #[must_use]
    pub fn points(self, points: &str) -> Self {
        self.attr("points", points)
    }

    #[must_use]
    pub fn fill(self, color: &str) -> Self {
        self.attr("fill", color)
    }

    #[must_use]
    pub fn stroke(self, color: &str) -> Self {
        self.attr("stroke", color)
    }

    #[must_use]
    pub fn stroke_width(self, width: f32) -> Self {
        self.attr_num("stroke-width", width)
    }

    /// Hidden nodes and edges carry `opacity="0"` next to their class.
    #[must_use]
    pub fn opacity(self, value: f32) -> Self {
        self.attr_num("opacity", value)
    }

    #[must_use]
    pub fn transform(self, value: &str) -> Self {
        self.attr("transform", value)
    }

    #[must_use]
    pub fn marker_end(self, reference: &str) -> Self {
        self.attr("marker-end", reference)
    }

    #[must_use]
    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    #[must_use]
    pub fn class(mut self, class: &str) -> Self {
        self.attrs.add_class(class);
        self
    }

    #[must_use]
    pub fn data(mut self, key: &str, value: impl Into<AttributeValue>) -> Self {
        self.attrs.push_data(key, value);
        self
    }

    /// Text content, escaped on output. Used for label lines.
    #[must_use]
    pub fn content(mut self, text: impl Into<String>) -> Self {
        self.content = Some(text.into());
        self
    }

    #[must_use]
    pub fn child(mut self, element: Element) -> Self {
        self.children.push(element);
        self
    }

    #[must_use]
    pub fn children(mut self, elements: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(elements);
        self
    }

    pub fn write_to_string(&self, output: &mut String) {
        let tag = self.kind.tag_name();
        output.push('<');
        output.push_str(tag);
        self.attrs.write_into(output);

        if self.kind.is_shape() && self.children.is_empty() && self.content.is_none() {
            output.push_str("/>");
            return;
        }

        output.push('>');
        if let Some(text) = &self.content {
            output.push_str(&escape_xml_text(text));
        }
        for child in &self.children {
            child.write_to_string(output);
        }
        output.push_str("</");
        output.push_str(tag);
        output.push('>');
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut output = String::with_capacity(256);
        self.write_to_string(&mut output);
        f.write_str(&output)
    }
}
