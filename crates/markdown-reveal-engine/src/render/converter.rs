//! Tree-to-output conversion.

use crate::document::{Attributes, DocumentNode, Element};
use crate::render::context::TraversalContext;
use crate::render::output::{OutputElement, OutputNode};
use crate::render::overlay::AttributeOverlay;
use crate::render::registry::{ComponentRegistry, RenderProps};
use crate::render::vnode_info::{KeyCounter, Parent, VNodeInfo, vnode_info};

/// Tag of the container wrapping a rendered document.
pub const ROOT_TAG: &str = "div";

/// Converts document trees using one registry and one attribute overlay.
#[derive(Debug, Clone, Copy)]
pub struct Converter<'a> {
    registry: &'a ComponentRegistry,
    overlay: &'a AttributeOverlay,
}

impl<'a> Converter<'a> {
    pub fn new(registry: &'a ComponentRegistry, overlay: &'a AttributeOverlay) -> Self {
        Self { registry, overlay }
    }

    /// Render `tree` inside a container carrying `base_attributes`.
    ///
    /// With `max_node_count`, only that many top-level nodes are rendered.
    /// Deeper levels are never truncated.
    pub fn render(
        &self,
        tree: &DocumentNode,
        base_attributes: Attributes,
        max_node_count: Option<usize>,
    ) -> OutputNode {
        let children = self.render_children(
            tree.children(),
            &TraversalContext::root(),
            Parent::Root,
            max_node_count,
        );
        OutputElement::new(ROOT_TAG)
            .with_attributes(base_attributes)
            .with_children(children)
            .into()
    }

    /// Render a sibling list under `parent`.
    ///
    /// Keys are counted per call, so they are unique among these siblings
    /// only. List item indices advance across the siblings of this call.
    pub fn render_children(
        &self,
        nodes: &[DocumentNode],
        context: &TraversalContext,
        parent: Parent<'_>,
        max_node_count: Option<usize>,
    ) -> Vec<OutputNode> {
        let limit = max_node_count.map_or(nodes.len(), |max| max.min(nodes.len()));
        let mut key_counter = KeyCounter::new();
        let mut sibling_context = *context;
        let mut out = Vec::with_capacity(limit);

        for node in &nodes[..limit] {
            match node {
                DocumentNode::Text { value } => out.push(OutputNode::Text(value.clone())),
                DocumentNode::Raw { value } => out.push(raw_passthrough(value)),
                DocumentNode::Root { children } => {
                    out.extend(self.render_children(children, &sibling_context, parent, None));
                }
                DocumentNode::Element(element) => {
                    let info = vnode_info(
                        element,
                        parent,
                        &sibling_context,
                        &mut key_counter,
                        self.overlay,
                    );
                    if element.tag_name == "li" {
                        sibling_context.list_item_index = info.context.list_item_index;
                    }
                    out.push(self.render_element(element, info));
                }
                DocumentNode::Comment { .. } | DocumentNode::Doctype => {}
            }
        }

        out
    }

    fn render_element(&self, element: &Element, info: VNodeInfo) -> OutputNode {
        let VNodeInfo {
            attributes,
            context,
            alias_list,
            derived,
        } = info;
        let children =
            || self.render_children(&element.children, &context, Parent::Element(element), None);

        if let Some((alias, renderer)) = self.registry.resolve(alias_list.as_slice()) {
            log::trace!("rendering <{}> through override '{alias}'", element.tag_name);
            let props = RenderProps::new(&derived, &attributes, alias, self.registry, &children);
            return renderer.render(&props);
        }

        OutputElement {
            tag: element.tag_name.clone(),
            attributes,
            key: Some(derived.key),
            inner_html: None,
            children: children(),
        }
        .into()
    }
}

/// Raw markup goes into a layout-neutral wrapper that injects it verbatim.
fn raw_passthrough(markup: &str) -> OutputNode {
    OutputElement::new("span")
        .with_attribute("style", "display: contents")
        .with_inner_html(markup)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::PropertyMap;
    use crate::render::registry::renderer;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    fn convert(tree: &DocumentNode, max: Option<usize>) -> OutputNode {
        let registry = ComponentRegistry::new();
        let overlay = AttributeOverlay::new();
        Converter::new(&registry, &overlay).render(tree, PropertyMap::new(), max)
    }

    #[test]
    fn wraps_in_container_with_base_attributes() {
        let registry = ComponentRegistry::new();
        let overlay = AttributeOverlay::new();
        let tree = DocumentNode::root(vec![Element::new("p").with_child("hi").into()]);

        let out = Converter::new(&registry, &overlay).render(
            &tree,
            PropertyMap::new().with("class", "markdown-body"),
            None,
        );
        assert_eq!(out.to_html(), "<div class=\"markdown-body\"><p>hi</p></div>");
    }

    #[test]
    fn truncates_top_level_only() {
        let tree = DocumentNode::root(vec![
            Element::new("p").with_children(["a", "b", "c"]).into(),
            Element::new("p").with_child("d").into(),
            Element::new("p").with_child("e").into(),
        ]);

        let out = convert(&tree, Some(2));
        assert_eq!(out.to_html(), "<div><p>abc</p><p>d</p></div>");

        let out = convert(&tree, Some(10));
        assert_eq!(out.children().len(), 3);
    }

    #[test]
    fn raw_nodes_are_injected_in_passthrough_span() {
        let tree = DocumentNode::root(vec![DocumentNode::raw("<b>x</b>")]);
        assert_eq!(
            convert(&tree, None).to_html(),
            "<div><span style=\"display: contents\"><b>x</b></span></div>"
        );
    }

    #[test]
    fn nested_roots_are_flattened_and_comments_dropped() {
        let tree = DocumentNode::root(vec![
            DocumentNode::Comment {
                value: "note".into(),
            },
            DocumentNode::root(vec!["a".into(), Element::new("br").into()]),
            DocumentNode::Doctype,
        ]);
        assert_eq!(convert(&tree, None).to_html(), "<div>a<br></div>");
    }

    #[test]
    fn generic_elements_carry_positional_keys() {
        let tree = DocumentNode::root(vec![
            Element::new("p").into(),
            Element::new("p").into(),
        ]);
        let out = convert(&tree, None);
        let keys: Vec<_> = out
            .children()
            .iter()
            .filter_map(|c| c.as_element().and_then(|e| e.key.clone()))
            .collect();
        assert_eq!(keys, vec!["p-1", "p-2"]);
    }

    #[test]
    fn override_children_are_lazy() {
        let calls = Rc::new(Cell::new(0));
        let mut registry = ComponentRegistry::new();
        let seen = calls.clone();
        registry.register([(
            "blockquote",
            renderer(move |_: &RenderProps<'_>| {
                seen.set(seen.get() + 1);
                OutputNode::text("quoted")
            }),
        )]);
        let overlay = AttributeOverlay::new();
        let tree = DocumentNode::root(vec![
            Element::new("blockquote")
                .with_child(Element::new("p").with_child("inner"))
                .into(),
        ]);

        let out = Converter::new(&registry, &overlay).render(&tree, PropertyMap::new(), None);
        assert_eq!(out.to_html(), "<div>quoted</div>");
        assert_eq!(calls.get(), 1);
    }
}
