//! Registry of rendering overrides, keyed by alias.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::document::Attributes;
use crate::render::output::OutputNode;
use crate::render::vnode_info::DerivedProperties;

/// Everything an override receives for the element it replaces.
pub struct RenderProps<'a> {
    pub derived: &'a DerivedProperties,
    pub attributes: &'a Attributes,
    /// The alias the override was resolved under.
    pub alias: &'a str,
    registry: &'a ComponentRegistry,
    children: &'a dyn Fn() -> Vec<OutputNode>,
}

impl<'a> RenderProps<'a> {
    pub fn new(
        derived: &'a DerivedProperties,
        attributes: &'a Attributes,
        alias: &'a str,
        registry: &'a ComponentRegistry,
        children: &'a dyn Fn() -> Vec<OutputNode>,
    ) -> Self {
        Self {
            derived,
            attributes,
            alias,
            registry,
            children,
        }
    }

    /// Render the element's subtree. Nothing is rendered until this is called.
    pub fn children(&self) -> Vec<OutputNode> {
        (self.children)()
    }

    /// The registry of the current render pass, for overrides that delegate.
    pub fn registry(&self) -> &ComponentRegistry {
        self.registry
    }
}

impl fmt::Debug for RenderProps<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderProps")
            .field("derived", self.derived)
            .field("attributes", self.attributes)
            .field("alias", &self.alias)
            .finish_non_exhaustive()
    }
}

/// Something that renders an element in place of the default output.
pub trait Renderer {
    fn render(&self, props: &RenderProps<'_>) -> OutputNode;
}

impl<F> Renderer for F
where
    F: Fn(&RenderProps<'_>) -> OutputNode,
{
    fn render(&self, props: &RenderProps<'_>) -> OutputNode {
        self(props)
    }
}

/// Shared handle to a renderer.
pub type RendererRef = Rc<dyn Renderer>;

/// Wrap a closure or renderer value for registration.
pub fn renderer<R: Renderer + 'static>(renderer: R) -> RendererRef {
    Rc::new(renderer)
}

/// Alias → renderer map consulted by the converter.
#[derive(Default, Clone)]
pub struct ComponentRegistry {
    components: HashMap<String, RendererRef>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `components` into the registry, replacing same-named entries.
    ///
    /// Registering nothing is rejected with a warning and returns `false`.
    pub fn register<I, K>(&mut self, components: I) -> bool
    where
        I: IntoIterator<Item = (K, RendererRef)>,
        K: Into<String>,
    {
        let mut added = 0usize;
        for (name, renderer) in components {
            self.components.insert(name.into(), renderer);
            added += 1;
        }
        if added == 0 {
            log::warn!("[ComponentRegistry] Attempted to register an empty component set");
            return false;
        }
        log::debug!("[ComponentRegistry] registered {added} component(s)");
        true
    }

    pub fn has(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&RendererRef> {
        self.components.get(name)
    }

    /// Returns whether an entry was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        self.components.remove(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// First registered alias scanning from the most specific (last) entry.
    pub fn resolve<'a, S: AsRef<str>>(&self, aliases: &'a [S]) -> Option<(&'a str, &RendererRef)> {
        aliases.iter().rev().find_map(|alias| {
            let alias = alias.as_ref();
            self.get(alias).map(|renderer| (alias, renderer))
        })
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.components.keys().collect();
        names.sort();
        f.debug_struct("ComponentRegistry")
            .field("components", &names)
            .finish()
    }
}
