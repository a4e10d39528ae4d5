//! Output node tree produced by the converter.
//!
//! The tree is framework-neutral: hosts walk it to build their own nodes.
//! [`OutputNode::to_html`] is provided for hosts that paint markup directly
//! and for tests.

use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::Serialize;

use crate::document::{Attributes, PropertyValue};

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputElement {
    pub tag: String,
    pub attributes: Attributes,
    /// Identity among siblings, e.g. `li-2`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Markup injected verbatim in place of children.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner_html: Option<String>,
    pub children: Vec<OutputNode>,
}

impl OutputElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Attributes::new(),
            key: None,
            inner_html: None,
            children: Vec::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_attribute(
        mut self,
        name: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Self {
        self.attributes.insert(name, value);
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_children(mut self, children: Vec<OutputNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(OutputNode::Text(text.into()));
        self
    }

    pub fn with_inner_html(mut self, html: impl Into<String>) -> Self {
        self.inner_html = Some(html.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum OutputNode {
    Element(OutputElement),
    Text(String),
    /// Several sibling nodes produced by one renderer.
    Fragment(Vec<OutputNode>),
    /// Renders nothing.
    Empty,
}

impl From<OutputElement> for OutputNode {
    fn from(element: OutputElement) -> Self {
        OutputNode::Element(element)
    }
}

impl OutputNode {
    pub fn text(value: impl Into<String>) -> Self {
        OutputNode::Text(value.into())
    }

    pub fn as_element(&self) -> Option<&OutputElement> {
        match self {
            OutputNode::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Direct children, looking through fragments.
    pub fn children(&self) -> Vec<&OutputNode> {
        match self {
            OutputNode::Element(element) => flatten(&element.children),
            OutputNode::Fragment(nodes) => flatten(nodes),
            _ => Vec::new(),
        }
    }

    /// Concatenated text of the subtree. Injected markup is not included.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            OutputNode::Text(text) => out.push_str(text),
            OutputNode::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
            OutputNode::Fragment(nodes) => {
                for node in nodes {
                    node.collect_text(out);
                }
            }
            OutputNode::Empty => {}
        }
    }

    /// Depth-first search for the first element with the given tag.
    pub fn find_element(&self, tag: &str) -> Option<&OutputElement> {
        match self {
            OutputNode::Element(element) if element.tag == tag => Some(element),
            OutputNode::Element(element) => {
                element.children.iter().find_map(|c| c.find_element(tag))
            }
            OutputNode::Fragment(nodes) => nodes.iter().find_map(|c| c.find_element(tag)),
            _ => None,
        }
    }

    /// Every element with the given tag, in document order.
    pub fn find_elements<'a>(&'a self, tag: &str, found: &mut Vec<&'a OutputElement>) {
        match self {
            OutputNode::Element(element) => {
                if element.tag == tag {
                    found.push(element);
                }
                for child in &element.children {
                    child.find_elements(tag, found);
                }
            }
            OutputNode::Fragment(nodes) => {
                for node in nodes {
                    node.find_elements(tag, found);
                }
            }
            _ => {}
        }
    }

    /// Serialize as HTML. Text and attribute values are escaped, injected
    /// markup is written as-is.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            OutputNode::Text(text) => out.push_str(&encode_text(text)),
            OutputNode::Fragment(nodes) => {
                for node in nodes {
                    node.write_html(out);
                }
            }
            OutputNode::Empty => {}
            OutputNode::Element(element) => {
                out.push('<');
                out.push_str(&element.tag);
                for (name, value) in element.attributes.iter() {
                    write_attribute(out, name, value);
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&element.tag.as_str()) {
                    return;
                }
                match &element.inner_html {
                    Some(html) => out.push_str(html),
                    None => {
                        for child in &element.children {
                            child.write_html(out);
                        }
                    }
                }
                out.push_str("</");
                out.push_str(&element.tag);
                out.push('>');
            }
        }
    }
}

fn flatten(nodes: &[OutputNode]) -> Vec<&OutputNode> {
    let mut out = Vec::new();
    for node in nodes {
        match node {
            OutputNode::Fragment(inner) => out.extend(flatten(inner)),
            OutputNode::Empty => {}
            other => out.push(other),
        }
    }
    out
}

fn write_attribute(out: &mut String, name: &str, value: &PropertyValue) {
    let rendered = match value {
        PropertyValue::Bool(false) => return,
        PropertyValue::Bool(true) => {
            out.push(' ');
            out.push_str(name);
            return;
        }
        PropertyValue::String(s) => s.clone(),
        PropertyValue::Number(n) => n.to_string(),
        PropertyValue::List(items) => items.join(" "),
    };
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&encode_double_quoted_attribute(&rendered));
    out.push('"');
}
