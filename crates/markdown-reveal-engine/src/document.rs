//! # Document Tree
//!
//! The parsed document handed to the converter. The shape follows the hast
//! convention: a `Root` holding `Element`s, text and raw markup, where
//! element properties use DOM property names (`className`, `htmlFor`,
//! `strokeWidth`) rather than attribute names.
//!
//! Children are kept in source order. Nothing downstream reorders them.

use serde::Serialize;

/// A single property or attribute value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    String(String),
    Number(f64),
    Bool(bool),
    /// Space-separated token lists such as `className`.
    List(Vec<String>),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Tokens of a list value, or the whitespace-separated words of a string.
    pub fn tokens(&self) -> Vec<&str> {
        match self {
            PropertyValue::List(items) => items.iter().map(String::as_str).collect(),
            PropertyValue::String(s) => s.split_whitespace().collect(),
            _ => Vec::new(),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(value: Vec<String>) -> Self {
        PropertyValue::List(value)
    }
}

/// Insertion-ordered name/value map.
///
/// Used both for raw element properties and for computed output attributes.
/// Inserting an existing name replaces the value in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PropertyMap(Vec<(String, PropertyValue)>);

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<PropertyValue> {
        let index = self.0.iter().position(|(existing, _)| existing == name)?;
        Some(self.0.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<PropertyValue>> FromIterator<(K, V)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = PropertyMap::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

/// Computed output attributes share the property map representation.
pub type Attributes = PropertyMap;

/// An element node with its raw properties and ordered children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub tag_name: String,
    pub properties: PropertyMap,
    pub children: Vec<DocumentNode>,
}

impl Element {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            properties: PropertyMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_property(
        mut self,
        name: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Self {
        self.properties.insert(name, value);
        self
    }

    pub fn with_child(mut self, child: impl Into<DocumentNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<DocumentNode>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }
}

/// A node of the parsed document tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DocumentNode {
    Root { children: Vec<DocumentNode> },
    Element(Element),
    Text { value: String },
    /// Pre-escaped markup that is injected verbatim.
    Raw { value: String },
    Comment { value: String },
    Doctype,
}

impl DocumentNode {
    pub fn root(children: Vec<DocumentNode>) -> Self {
        DocumentNode::Root { children }
    }

    pub fn text(value: impl Into<String>) -> Self {
        DocumentNode::Text {
            value: value.into(),
        }
    }

    pub fn raw(value: impl Into<String>) -> Self {
        DocumentNode::Raw {
            value: value.into(),
        }
    }

    pub fn children(&self) -> &[DocumentNode] {
        match self {
            DocumentNode::Root { children } => children,
            DocumentNode::Element(element) => &element.children,
            _ => &[],
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            DocumentNode::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            DocumentNode::Text { value } => Some(value),
            _ => None,
        }
    }

    /// Number of nodes a top-level reveal counts: the direct children of a root.
    pub fn top_level_count(&self) -> usize {
        self.children().len()
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn descendant_count(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(DocumentNode::descendant_count)
            .sum::<usize>()
    }
}

impl From<Element> for DocumentNode {
    fn from(element: Element) -> Self {
        DocumentNode::Element(element)
    }
}

impl From<&str> for DocumentNode {
    fn from(value: &str) -> Self {
        DocumentNode::text(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_map_keeps_insertion_order_and_replaces_in_place() {
        let mut map = PropertyMap::new();
        map.insert("b", "1");
        map.insert("a", "2");
        map.insert("b", "3");

        let names: Vec<_> = map.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(map.get("b"), Some(&PropertyValue::from("3")));
    }

    #[test]
    fn tokens_split_strings_and_lists() {
        let list = PropertyValue::List(vec!["a".into(), "language-rs".into()]);
        let string = PropertyValue::from("a  language-rs");

        assert_eq!(list.tokens(), vec!["a", "language-rs"]);
        assert_eq!(string.tokens(), vec!["a", "language-rs"]);
        assert!(PropertyValue::Bool(true).tokens().is_empty());
    }

    #[test]
    fn counts_nodes() {
        let tree = DocumentNode::root(vec![
            Element::new("p").with_child("a").into(),
            Element::new("p").with_child("b").into(),
        ]);

        assert_eq!(tree.top_level_count(), 2);
        assert_eq!(tree.descendant_count(), 5);
    }
}
