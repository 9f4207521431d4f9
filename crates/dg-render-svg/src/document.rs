//! Root `<svg>` element: canvas size, accessibility text, stylesheet, defs.

use std::fmt;

use crate::attributes::{AttributeValue, Attributes, escape_xml_text, format_number};
use crate::element::Element;

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

#[derive(Debug, Clone, Default)]
pub struct SvgDocument {
    attrs: Attributes,
    canvas: Option<(f32, f32)>,
    title: Option<String>,
    description: Option<String>,
    stylesheet: Option<String>,
    defs: Vec<Element>,
    children: Vec<Element>,
}

impl SvgDocument {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Canvas size in pixels; the viewBox matches it from the origin.
    #[must_use]
    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.canvas = Some((width, height));
        self
    }

    /// `<title>`/`<desc>` for screen readers, plus `role="img"`.
    #[must_use]
    pub fn accessible(mut self, title: impl Into<String>, description: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self.description = Some(description.into());
        self.attrs.push("role", "img");
        self
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

    #[must_use]
    pub fn style(mut self, css: impl Into<String>) -> Self {
        self.stylesheet = Some(css.into());
        self
    }

    #[must_use]
    pub fn def(mut self, element: Element) -> Self {
        self.defs.push(element);
        self
    }

    #[must_use]
    pub fn child(mut self, element: Element) -> Self {
        self.children.push(element);
        self
    }

    pub fn write_to_string(&self, output: &mut String) {
        output.push_str("<svg xmlns=\"");
        output.push_str(SVG_NAMESPACE);
        output.push('"');

        if let Some((width, height)) = self.canvas {
            let (w, h) = (format_number(width), format_number(height));
            output.push_str(&format!(
                " width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\""
            ));
        }
        self.attrs.write_into(output);
        output.push('>');

        let text_blocks = [
            ("title", &self.title),
            ("desc", &self.description),
            ("style", &self.stylesheet),
        ];
        for (tag, text) in text_blocks {
            if let Some(text) = text {
                output.push_str(&format!("<{tag}>{}</{tag}>", escape_xml_text(text)));
            }
        }

        if !self.defs.is_empty() {
            Element::defs()
                .children(self.defs.iter().cloned())
                .write_to_string(output);
        }
        for child in &self.children {
            child.write_to_string(output);
        }
        output.push_str("</svg>");
    }
}

impl fmt::Display for SvgDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut output = String::with_capacity(4096);
        self.write_to_string(&mut output);
        f.write_str(&output)
    }
}
