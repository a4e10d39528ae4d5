//! Caller-supplied attribute overrides, keyed by alias.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::document::{Attributes, Element};
use crate::render::vnode_info::DerivedProperties;

/// What a computed override sees besides the element itself.
#[derive(Debug)]
pub struct OverlayInput<'a> {
    /// Attributes derived from the element's properties.
    pub attributes: &'a Attributes,
    pub derived: &'a DerivedProperties,
}

type ComputeAttributes = dyn Fn(&Element, &OverlayInput<'_>) -> Attributes;

/// One overlay entry. Either way the result replaces the derived attributes.
#[derive(Clone)]
pub enum AttributeOverride {
    Static(Attributes),
    Computed(Rc<ComputeAttributes>),
}

impl fmt::Debug for AttributeOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeOverride::Static(attributes) => {
                f.debug_tuple("Static").field(attributes).finish()
            }
            AttributeOverride::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct AttributeOverlay {
    entries: HashMap<String, AttributeOverride>,
}

impl AttributeOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_static(mut self, alias: impl Into<String>, attributes: Attributes) -> Self {
        self.entries
            .insert(alias.into(), AttributeOverride::Static(attributes));
        self
    }

    pub fn with_computed<F>(mut self, alias: impl Into<String>, compute: F) -> Self
    where
        F: Fn(&Element, &OverlayInput<'_>) -> Attributes + 'static,
    {
        self.entries
            .insert(alias.into(), AttributeOverride::Computed(Rc::new(compute)));
        self
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.entries.contains_key(alias)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Final attributes for an element.
    ///
    /// Only the entry of the most specific matching alias is applied. Without
    /// a match the derived attributes stand.
    pub fn apply(
        &self,
        aliases: &[String],
        element: &Element,
        attributes: Attributes,
        derived: &DerivedProperties,
    ) -> Attributes {
        let Some(entry) = aliases.iter().rev().find_map(|alias| self.entries.get(alias)) else {
            return attributes;
        };
        match entry {
            AttributeOverride::Static(replacement) => replacement.clone(),
            AttributeOverride::Computed(compute) => compute(
                element,
                &OverlayInput {
                    attributes: &attributes,
                    derived,
                },
            ),
        }
    }
}
