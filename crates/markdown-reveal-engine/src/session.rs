//! One document being revealed into output.
//!
//! A [`RenderSession`] owns everything a render pass needs: the document,
//! the registry rebuilt from the default components plus the caller's
//! overrides, the attribute overlay, the shared highlighter and the
//! [`BatchScheduler`] deciding how much of the document is visible.
//! Sessions share nothing with each other except the highlighter resource
//! they were handed.

use crate::document::{Attributes, DocumentNode};
use crate::markdown::parse_markdown;
use crate::render::{
    AttributeOverlay, ComponentRegistry, Converter, Highlighter, OutputNode, RendererRef,
    default_components, plain_highlighter,
};
use crate::scheduler::{
    BatchConfig, BatchScheduler, Fired, ManualHost, ScheduleHandle, ScheduleHost,
};
use crate::shared::SharedResource;

pub struct RenderSession<H: ScheduleHost> {
    document: DocumentNode,
    base_attributes: Attributes,
    overlay: AttributeOverlay,
    overrides: Vec<(String, RendererRef)>,
    highlighter: SharedResource<dyn Highlighter>,
    registry: ComponentRegistry,
    scheduler: BatchScheduler<H>,
    latest: Option<OutputNode>,
}

impl<H: ScheduleHost> RenderSession<H> {
    pub fn new(host: H, config: BatchConfig) -> Self {
        Self::with_highlighter(host, config, plain_highlighter())
    }

    pub fn with_highlighter(
        host: H,
        config: BatchConfig,
        highlighter: SharedResource<dyn Highlighter>,
    ) -> Self {
        let mut session = Self {
            document: DocumentNode::root(Vec::new()),
            base_attributes: Attributes::new(),
            overlay: AttributeOverlay::new(),
            overrides: Vec::new(),
            highlighter,
            registry: ComponentRegistry::new(),
            scheduler: BatchScheduler::new(host, config),
            latest: None,
        };
        session.rebuild_registry();
        session
    }

    pub fn with_overlay(mut self, overlay: AttributeOverlay) -> Self {
        self.overlay = overlay;
        self
    }

    /// Attributes of the container wrapping the rendered document.
    pub fn with_base_attributes(mut self, attributes: Attributes) -> Self {
        self.base_attributes = attributes;
        self
    }

    /// Add caller overrides. They win over the default components and over
    /// earlier overrides of the same name.
    ///
    /// Registering nothing is rejected with a warning and returns `false`.
    pub fn register_components<I, K>(&mut self, components: I) -> bool
    where
        I: IntoIterator<Item = (K, RendererRef)>,
        K: Into<String>,
    {
        let mut added = 0usize;
        for (name, renderer) in components {
            let name = name.into();
            self.overrides.retain(|(existing, _)| *existing != name);
            self.overrides.push((name, renderer));
            added += 1;
        }
        if added == 0 {
            log::warn!("[RenderSession] Attempted to register an empty component set");
            return false;
        }
        self.rebuild_registry();
        true
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn document(&self) -> &DocumentNode {
        &self.document
    }

    /// Replace the document. Growth continues revealing where it was,
    /// anything else starts over.
    pub fn set_document(&mut self, document: DocumentNode) {
        self.document = document;
        self.latest = None;
        self.scheduler.observe_total(self.document.top_level_count());
    }

    pub fn load_markdown(&mut self, source: &str) {
        self.set_document(parse_markdown(source));
    }

    pub fn scheduler(&self) -> &BatchScheduler<H> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut BatchScheduler<H> {
        &mut self.scheduler
    }

    pub fn revealed_count(&self) -> usize {
        self.scheduler.revealed_count()
    }

    pub fn render_progress(&self) -> f64 {
        self.scheduler.render_progress()
    }

    /// Output rendered by the last batch, if one ran since the document changed.
    pub fn latest(&self) -> Option<&OutputNode> {
        self.latest.as_ref()
    }

    /// Render the currently revealed prefix.
    pub fn render(&mut self) -> OutputNode {
        self.rebuild_registry();
        let max_node_count = self
            .scheduler
            .config()
            .enabled
            .then(|| self.scheduler.revealed_count());
        Converter::new(&self.registry, &self.overlay).render(
            &self.document,
            self.base_attributes.clone(),
            max_node_count,
        )
    }

    /// Deliver a host wake-up. Each batch it runs renders the new prefix,
    /// so batch timing includes the conversion cost.
    pub fn on_wake(&mut self, handle: ScheduleHandle, fired: Fired) -> bool {
        let converter = Converter::new(&self.registry, &self.overlay);
        let document = &self.document;
        let base_attributes = &self.base_attributes;
        let latest = &mut self.latest;

        let mut settle = |revealed: usize| {
            *latest = Some(converter.render(document, base_attributes.clone(), Some(revealed)));
        };
        self.scheduler.on_wake(handle, fired, &mut settle)
    }

    fn rebuild_registry(&mut self) {
        let mut registry = ComponentRegistry::new();
        registry.register(default_components(self.highlighter.acquire()));
        if !self.overrides.is_empty() {
            registry.register(self.overrides.iter().cloned());
        }
        self.registry = registry;
    }
}

impl RenderSession<ManualHost> {
    /// Deliver every armed wake-up and render the result.
    pub fn run_to_completion(&mut self) -> OutputNode {
        let mut turns = 0usize;
        while let Some((handle, fired)) = self.scheduler.host().next_due() {
            self.on_wake(handle, fired);
            turns += 1;
        }
        log::debug!(
            "revealed {}/{} nodes in {turns} wake-ups",
            self.revealed_count(),
            self.document.top_level_count()
        );
        self.render()
    }
}
