//! Built-in overrides registered before every render pass.
//!
//! `code` is handled by [`CodeComponent`]: inline code delegates to an
//! `inline` override when one is registered, block code to an override
//! registered under its language. Otherwise the default markup is emitted,
//! with block code going through the shared [`Highlighter`].

use std::rc::Rc;

use serde_json::Value;

use crate::render::output::{OutputElement, OutputNode};
use crate::render::registry::{RenderProps, Renderer, RendererRef};
use crate::render::vnode_info::CodeInfo;
use crate::shared::{SharedHandle, SharedResource};

/// Alias a caller registers to take over inline code.
pub const INLINE_CODE_ALIAS: &str = "inline";

const INLINE_CODE_CLASS: &str = "inline-code-tag";
const INLINE_CODE_STYLE: &str = "display: inline; background: #d7e2f8; color: #376fde; \
padding: 0 4px; margin: 0 4px; border-radius: 4px; font-weight: 500; \
border: 1px solid #d7e2f8; word-wrap: break-word; word-break: break-all; line-height: 2";

const DEFAULT_FALLBACK_MESSAGE: &str = "Loading...";
const FALLBACK_STYLE: &str = "color: #888; font-style: italic";

/// Produces highlighted output for a code block.
///
/// Returning `None` leaves the code as plain text.
pub trait Highlighter {
    fn highlight(&self, code: &str, language: &str) -> Option<OutputNode>;
}

/// Highlighter that never highlights.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainHighlighter;

impl Highlighter for PlainHighlighter {
    fn highlight(&self, _code: &str, _language: &str) -> Option<OutputNode> {
        None
    }
}

/// Shared highlighter resource backed by [`PlainHighlighter`].
pub fn plain_highlighter() -> SharedResource<dyn Highlighter> {
    SharedResource::new(|| Rc::new(PlainHighlighter) as Rc<dyn Highlighter>)
}

pub struct CodeComponent {
    highlighter: SharedHandle<dyn Highlighter>,
}

impl CodeComponent {
    pub fn new(highlighter: SharedHandle<dyn Highlighter>) -> Self {
        Self { highlighter }
    }

    /// A fence named after an alias this component is registered under
    /// must not dispatch back into it.
    fn is_same(&self, other: &RendererRef) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(other), self as *const Self)
    }

    fn inline(code: &CodeInfo) -> OutputNode {
        OutputElement::new("span")
            .with_attribute("class", INLINE_CODE_CLASS)
            .with_attribute("style", INLINE_CODE_STYLE)
            .with_text(code.content.clone())
            .into()
    }

    fn block(&self, code: &CodeInfo, props: &RenderProps<'_>) -> OutputNode {
        let body = self
            .highlighter
            .highlight(&code.content, &code.language)
            .unwrap_or_else(|| OutputNode::text(code.content.clone()));
        let mut element = OutputElement::new("code")
            .with_attributes(props.attributes.clone())
            .with_key(props.derived.key.clone())
            .with_children(vec![body]);
        if !code.language.is_empty() {
            element.attributes.insert("data-language", code.language.clone());
        }
        element.into()
    }
}

impl Renderer for CodeComponent {
    fn render(&self, props: &RenderProps<'_>) -> OutputNode {
        let Some(code) = props.derived.code.as_ref() else {
            return OutputElement::new("code")
                .with_attributes(props.attributes.clone())
                .with_children(props.children())
                .into();
        };

        if code.inline {
            if let Some(inline) = props.registry().get(INLINE_CODE_ALIAS) {
                return inline.render(props);
            }
            return Self::inline(code);
        }

        if !code.language.is_empty()
            && let Some(by_language) = props.registry().get(&code.language)
            && !self.is_same(by_language)
        {
            return by_language.render(props);
        }
        self.block(code, props)
    }
}

/// Renders a code block whose content is JSON through a wrapped renderer.
///
/// Content that does not parse (for example while still streaming in)
/// renders a muted fallback message instead.
pub struct JsonComponent<F> {
    render: F,
    fallback_message: String,
}

impl<F> JsonComponent<F>
where
    F: Fn(&Value, &RenderProps<'_>) -> OutputNode,
{
    pub fn new(render: F) -> Self {
        Self {
            render,
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_string(),
        }
    }

    pub fn with_fallback_message(mut self, message: impl Into<String>) -> Self {
        self.fallback_message = message.into();
        self
    }
}

impl<F> Renderer for JsonComponent<F>
where
    F: Fn(&Value, &RenderProps<'_>) -> OutputNode,
{
    fn render(&self, props: &RenderProps<'_>) -> OutputNode {
        let content = props
            .derived
            .code
            .as_ref()
            .map(|code| code.content.trim())
            .unwrap_or_default();

        match serde_json::from_str::<Value>(content) {
            Ok(value) => (self.render)(&value, props),
            Err(e) => {
                log::debug!("'{}' block is not valid JSON yet: {e}", props.alias);
                OutputElement::new("div")
                    .with_attribute("style", FALLBACK_STYLE)
                    .with_text(self.fallback_message.clone())
                    .into()
            }
        }
    }
}

/// The overrides every render pass starts from.
pub fn default_components(
    highlighter: SharedHandle<dyn Highlighter>,
) -> Vec<(&'static str, RendererRef)> {
    vec![("code", Rc::new(CodeComponent::new(highlighter)) as RendererRef)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentNode, Element, PropertyMap};
    use crate::render::converter::Converter;
    use crate::render::overlay::AttributeOverlay;
    use crate::render::registry::{ComponentRegistry, renderer};
    use pretty_assertions::assert_eq;

    fn registry_with_defaults(resource: &SharedResource<dyn Highlighter>) -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        registry.register(default_components(resource.acquire()));
        registry
    }

    fn render(registry: &ComponentRegistry, tree: &DocumentNode) -> String {
        let overlay = AttributeOverlay::new();
        Converter::new(registry, &overlay)
            .render(tree, PropertyMap::new(), None)
            .to_html()
    }

    fn code_block(language: &str, content: &str) -> DocumentNode {
        Element::new("pre")
            .with_child(
                Element::new("code")
                    .with_property("className", vec![format!("language-{language}")])
                    .with_child(content),
            )
            .into()
    }

    #[test]
    fn fence_named_after_the_code_alias_renders_once() {
        // Given a block whose language is the alias the default is registered under
        let resource = plain_highlighter();
        let registry = registry_with_defaults(&resource);
        let tree = DocumentNode::root(vec![code_block("code", "x")]);

        // When rendering
        let html = render(&registry, &tree);

        // Then it falls through to the default block markup
        assert_eq!(
            html,
            "<div><pre><code class=\"language-code\" data-language=\"code\">x</code></pre></div>"
        );
    }

    #[test]
    fn inline_code_uses_default_span() {
        let resource = plain_highlighter();
        let registry = registry_with_defaults(&resource);
        let tree = DocumentNode::root(vec![
            Element::new("p")
                .with_child(Element::new("code").with_child("x"))
                .into(),
        ]);

        let html = render(&registry, &tree);
        assert!(html.starts_with("<div><p><span class=\"inline-code-tag\""));
        assert!(html.ends_with(">x</span></p></div>"));
    }

    #[test]
    fn inline_override_takes_over() {
        let resource = plain_highlighter();
        let mut registry = registry_with_defaults(&resource);
        registry.register([(
            INLINE_CODE_ALIAS,
            renderer(|props: &RenderProps<'_>| {
                let content = props.derived.code.as_ref().map(|c| c.content.clone());
                OutputNode::from(OutputElement::new("kbd").with_text(content.unwrap_or_default()))
            }),
        )]);
        let tree = DocumentNode::root(vec![
            Element::new("p")
                .with_child(Element::new("code").with_child("ctrl"))
                .into(),
        ]);

        assert_eq!(render(&registry, &tree), "<div><p><kbd>ctrl</kbd></p></div>");
    }

    #[test]
    fn block_code_renders_plain_when_nothing_highlights() {
        let resource = plain_highlighter();
        let registry = registry_with_defaults(&resource);
        let tree = DocumentNode::root(vec![code_block("rust", "fn main() {}")]);

        assert_eq!(
            render(&registry, &tree),
            "<div><pre><code class=\"language-rust\" data-language=\"rust\">fn main() {}</code></pre></div>"
        );
    }

    #[test]
    fn language_override_handles_matching_blocks() {
        let resource = plain_highlighter();
        let mut registry = registry_with_defaults(&resource);
        registry.register([(
            "mermaid",
            renderer(|_: &RenderProps<'_>| {
                OutputNode::from(OutputElement::new("figure").with_text("diagram"))
            }),
        )]);
        let tree = DocumentNode::root(vec![code_block("mermaid", "graph TD")]);

        assert_eq!(
            render(&registry, &tree),
            "<div><pre><figure>diagram</figure></pre></div>"
        );
    }

    #[test]
    fn highlighter_output_replaces_plain_text() {
        struct Upper;
        impl Highlighter for Upper {
            fn highlight(&self, code: &str, _language: &str) -> Option<OutputNode> {
                Some(OutputNode::text(code.to_uppercase()))
            }
        }
        let resource: SharedResource<dyn Highlighter> =
            SharedResource::new(|| Rc::new(Upper) as Rc<dyn Highlighter>);
        let registry = registry_with_defaults(&resource);
        let tree = DocumentNode::root(vec![code_block("sh", "ls")]);

        assert!(render(&registry, &tree).contains(">LS</code>"));
    }

    #[test]
    fn json_component_parses_or_falls_back() {
        let resource = plain_highlighter();
        let mut registry = registry_with_defaults(&resource);
        registry.register([(
            "card",
            renderer(JsonComponent::new(|value: &Value, _: &RenderProps<'_>| {
                let title = value["title"].as_str().unwrap_or_default().to_string();
                OutputNode::from(OutputElement::new("article").with_text(title))
            })),
        )]);

        let ok = DocumentNode::root(vec![code_block("card", " {\"title\": \"Hi\"}\n")]);
        assert_eq!(render(&registry, &ok), "<div><pre><article>Hi</article></pre></div>");

        let partial = DocumentNode::root(vec![code_block("card", "{\"title\": \"H")]);
        assert_eq!(
            render(&registry, &partial),
            "<div><pre><div style=\"color: #888; font-style: italic\">Loading...</div></pre></div>"
        );
    }

    #[test]
    fn releasing_the_registry_disposes_the_highlighter() {
        let resource = plain_highlighter();
        let registry = registry_with_defaults(&resource);
        assert!(resource.is_initialized());

        drop(registry);
        assert!(!resource.is_initialized());
    }
}
