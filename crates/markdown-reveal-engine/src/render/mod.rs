//! # Rendering
//!
//! Conversion of a parsed [`DocumentNode`](crate::document::DocumentNode)
//! tree into an [`OutputNode`] tree.
//!
//! ## Modules
//!
//! - **`context`**: `TraversalContext`, the per-descent list/table/SVG state
//! - **`attributes`**: property → attribute names for the HTML and SVG namespaces
//! - **`vnode_info`**: per-element derivation (aliases, derived properties, context)
//! - **`overlay`**: caller attribute overrides resolved by alias
//! - **`registry`**: `ComponentRegistry` of `Renderer` overrides
//! - **`converter`**: the recursive `Converter`
//! - **`components`**: built-in overrides (`code`, JSON blocks)
//! - **`output`**: the output tree and its HTML serialization
//!
//! ## Override resolution
//!
//! Every element gets an alias list that starts with its tag name and may
//! gain a semantic alias (`heading`, `list`, `list-item`, `inline-code`,
//! `block-code`, or a slot's name). Overrides and attribute overlays are
//! both resolved from the last alias to the first, and only the first match
//! is used.

pub mod attributes;
pub mod components;
pub mod context;
pub mod converter;
pub mod output;
pub mod overlay;
pub mod registry;
pub mod vnode_info;

pub use components::{
    CodeComponent, Highlighter, JsonComponent, PlainHighlighter, default_components,
    plain_highlighter,
};
pub use context::{TableSection, TraversalContext};
pub use converter::Converter;
pub use output::{OutputElement, OutputNode};
pub use overlay::{AttributeOverlay, AttributeOverride, OverlayInput};
pub use registry::{ComponentRegistry, RenderProps, Renderer, RendererRef, renderer};
pub use vnode_info::{CodeInfo, DerivedProperties, ListInfo, Parent, VNodeInfo, vnode_info};
