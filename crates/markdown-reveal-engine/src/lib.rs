pub mod document;
pub mod io;
pub mod markdown;
pub mod render;
pub mod scheduler;
pub mod session;
pub mod shared;

// Re-export key types for easier usage
pub use document::{Attributes, DocumentNode, Element, PropertyMap, PropertyValue};
pub use io::*;
pub use markdown::parse_markdown;
pub use render::{
    AttributeOverlay, ComponentRegistry, Converter, Highlighter, JsonComponent, OutputElement,
    OutputNode, RenderProps, Renderer, RendererRef, renderer,
};
pub use scheduler::{
    BatchConfig, BatchOptions, BatchScheduler, BatchSizeChange, Fired, ManualHost,
    PacingStrategy, RenderConsumer, ScheduleHandle, ScheduleHost, Wake,
};
pub use session::RenderSession;
pub use shared::{SharedHandle, SharedResource};
