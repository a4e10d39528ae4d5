//! Per-element derivation: attributes, updated context, aliases and the
//! semantic properties handed to overrides.

use std::collections::HashMap;

use serde::Serialize;

use crate::document::{Attributes, DocumentNode, Element};
use crate::render::attributes::{self, Namespace};
use crate::render::context::{TableSection, TraversalContext};
use crate::render::overlay::AttributeOverlay;

/// Property carrying the alias of a `slot` element. Never emitted as an attribute.
pub const SLOT_NAME_PROPERTY: &str = "slot-name";

const LANGUAGE_PREFIX: &str = "language-";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CodeInfo {
    /// The full `language-*` class token, empty when absent.
    pub language_original: String,
    /// The token without its `language-` prefix.
    pub language: String,
    pub inline: bool,
    pub content: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ListInfo {
    pub ordered: bool,
    pub depth: i32,
    /// Set for list items only.
    pub index: Option<i32>,
}

/// Semantic properties derived for one element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DerivedProperties {
    /// Positional key among siblings, `tag-n`.
    pub key: String,
    /// Heading level for `h1`..`h6`.
    pub level: Option<u8>,
    pub code: Option<CodeInfo>,
    /// For `tr`/`td`/`th`: whether the row sits in a `thead`.
    pub is_head: Option<bool>,
    pub list: Option<ListInfo>,
}

/// The element's parent, as far as derivation cares.
#[derive(Debug, Clone, Copy)]
pub enum Parent<'a> {
    Root,
    Element(&'a Element),
}

impl Parent<'_> {
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Parent::Root => None,
            Parent::Element(element) => Some(&element.tag_name),
        }
    }
}

/// Occurrences of each tag among the siblings rendered so far.
pub type KeyCounter = HashMap<String, usize>;

#[derive(Debug, Clone, PartialEq)]
pub struct VNodeInfo {
    pub attributes: Attributes,
    /// Context for the element's children.
    pub context: TraversalContext,
    /// Override candidates, least specific first.
    pub alias_list: Vec<String>,
    pub derived: DerivedProperties,
}

fn heading_level(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

fn code_info(element: &Element, parent: Parent<'_>, attributes: &Attributes) -> CodeInfo {
    let language_original = attributes
        .get("class")
        .and_then(|class| {
            class
                .tokens()
                .into_iter()
                .find(|token| token.starts_with(LANGUAGE_PREFIX))
                .map(str::to_string)
        })
        .unwrap_or_default();
    let language = language_original
        .strip_prefix(LANGUAGE_PREFIX)
        .unwrap_or_default()
        .to_string();
    // A root parent is not an element, so top-level code counts as a block.
    let inline = parent.tag_name().is_some_and(|tag| tag != "pre");
    let content = element
        .children
        .first()
        .and_then(DocumentNode::as_text)
        .unwrap_or_default()
        .to_string();

    CodeInfo {
        language_original,
        language,
        inline,
        content,
    }
}

/// Derive everything the converter needs for `element`.
///
/// `context` is the inbound context; the returned [`VNodeInfo::context`] is
/// the value the element's children are rendered with.
pub fn vnode_info(
    element: &Element,
    parent: Parent<'_>,
    context: &TraversalContext,
    key_counter: &mut KeyCounter,
    overlay: &AttributeOverlay,
) -> VNodeInfo {
    let tag = element.tag_name.as_str();
    let mut alias_list = vec![tag.to_string()];
    let mut derived = DerivedProperties::default();
    let mut ctx = *context;

    let occurrence = key_counter.entry(tag.to_string()).or_insert(0);
    *occurrence += 1;
    derived.key = format!("{tag}-{occurrence}");

    if tag == "svg" {
        ctx.svg = true;
    }

    let mut attributes = attributes::translate(Namespace::for_svg(ctx.svg), &element.properties);

    if let Some(level) = heading_level(tag) {
        derived.level = Some(level);
        alias_list.push("heading".to_string());
    }

    match tag {
        "code" => {
            let code = code_info(element, parent, &attributes);
            alias_list.push(if code.inline { "inline-code" } else { "block-code" }.to_string());
            derived.code = Some(code);
        }
        "thead" | "tbody" => {
            ctx.table_section = TableSection::from_tag(tag);
        }
        "td" | "th" | "tr" => {
            derived.is_head = Some(context.in_table_head());
        }
        "ul" | "ol" => {
            ctx.list_depth = context.list_depth + 1;
            ctx.list_ordered = tag == "ol";
            ctx.list_item_index = -1;
            derived.list = Some(ListInfo {
                ordered: ctx.list_ordered,
                depth: ctx.list_depth,
                index: None,
            });
            alias_list.push("list".to_string());
        }
        "li" => {
            ctx.list_item_index = context.list_item_index + 1;
            derived.list = Some(ListInfo {
                ordered: ctx.list_ordered,
                depth: ctx.list_depth,
                index: Some(ctx.list_item_index),
            });
            alias_list.push("list-item".to_string());
        }
        "slot" => {
            if let Some(name) = element
                .properties
                .get(SLOT_NAME_PROPERTY)
                .and_then(|value| value.as_str())
            {
                alias_list.push(name.to_string());
                attributes.remove(SLOT_NAME_PROPERTY);
            }
        }
        _ => {}
    }

    let attributes = overlay.apply(&alias_list, element, attributes, &derived);

    VNodeInfo {
        attributes,
        context: ctx,
        alias_list,
        derived,
    }
}
