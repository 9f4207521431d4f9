//! Attribute lists for diagram elements.

use std::fmt::{self, Write};

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Text(String),
    Number(f32),
    Count(i64),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(&escape_xml(text, true)),
            Self::Number(value) => f.write_str(&format_number(*value)),
            Self::Count(count) => write!(f, "{count}"),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<f32> for AttributeValue {
    fn from(value: f32) -> Self {
        Self::Number(value)
    }
}

impl From<usize> for AttributeValue {
    fn from(count: usize) -> Self {
        Self::Count(i64::try_from(count).unwrap_or(i64::MAX))
    }
}

/// Attributes in insertion order. Repeated `class` calls extend one
/// space-separated value, which is how visibility classes stack on `dg-node`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    entries: Vec<(String, AttributeValue)>,
}

impl Attributes {
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        self.entries.push((name.into(), value.into()));
    }

    pub fn push_data(&mut self, key: &str, value: impl Into<AttributeValue>) {
        self.push(format!("data-{key}"), value);
    }

    pub fn add_class(&mut self, class: &str) {
        let existing = self.entries.iter_mut().find_map(|(name, value)| match value {
            AttributeValue::Text(text) if name == "class" => Some(text),
            _ => None,
        });
        match existing {
            Some(text) => {
                text.push(' ');
                text.push_str(class);
            }
            None => self.push("class", class),
        }
    }

    pub fn write_into(&self, output: &mut String) {
        for (name, value) in &self.entries {
            let _ = write!(output, " {name}=\"{value}\"");
        }
    }
}

/// Integral values print bare (`50`); anything else keeps two decimals.
#[must_use]
pub fn format_number(value: f32) -> String {
    if value.fract() == 0.0 && value.abs() < 1e9 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

/// Escape text content (labels, title, stylesheet). Quotes are left alone.
#[must_use]
pub fn escape_xml_text(text: &str) -> String {
    escape_xml(text, false)
}

fn escape_xml(text: &str, in_attribute: bool) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' if in_attribute => escaped.push_str("&quot;"),
            '\'' if in_attribute => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::{Attributes, escape_xml_text, format_number};

    fn rendered(attrs: &Attributes) -> String {
        let mut output = String::new();
        attrs.write_into(&mut output);
        output
    }

    #[test]
    fn node_attributes_keep_insertion_order() {
        let mut attrs = Attributes::default();
        attrs.push("width", 150.0_f32);
        attrs.push_data("id", "Q");
        attrs.push_data("index", 3_usize);
        assert_eq!(
            rendered(&attrs),
            " width=\"150\" data-id=\"Q\" data-index=\"3\""
        );
    }

    #[test]
    fn visibility_class_joins_node_class() {
        let mut attrs = Attributes::default();
        attrs.add_class("dg-node");
        attrs.push("transform", "translate(50, 50)");
        attrs.add_class("dg-hidden");
        assert_eq!(
            rendered(&attrs),
            " class=\"dg-node dg-hidden\" transform=\"translate(50, 50)\""
        );
    }

    #[test]
    fn token_with_quotes_is_escaped_in_data_attribute() {
        let mut attrs = Attributes::default();
        attrs.push_data("id", "a\"b'<c>&");
        assert_eq!(
            rendered(&attrs),
            " data-id=\"a&quot;b&#39;&lt;c&gt;&amp;\""
        );
    }

    #[test]
    fn coordinates_print_without_trailing_zeros() {
        assert_eq!(format_number(50.0), "50");
        assert_eq!(format_number(-12.0), "-12");
        assert_eq!(format_number(162.5), "162.50");
    }

    #[test]
    fn label_text_keeps_quotes() {
        assert_eq!(
            escape_xml_text("P < 30% & \"risky\""),
            "P &lt; 30% &amp; \"risky\""
        );
    }
}
