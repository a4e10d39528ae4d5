use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use markdown_reveal_engine::render::{Highlighter, plain_highlighter};
use markdown_reveal_engine::{
    BatchConfig, BatchOptions, JsonComponent, ManualHost, OutputElement, OutputNode, RenderProps,
    RenderSession, SharedResource, renderer,
};
use pretty_assertions::assert_eq;

fn small_batches() -> BatchConfig {
    BatchConfig::from(BatchOptions {
        initial_batch_size: Some(2),
        batch_size: Some(2),
        batch_delay_ms: Some(0.0),
        ..Default::default()
    })
}

fn paragraphs(range: std::ops::Range<usize>) -> String {
    range.map(|i| format!("p{i}\n\n")).collect()
}

#[test]
fn streaming_growth_keeps_revealed_prefix() {
    // Given a session that has revealed part of a document
    let mut session = RenderSession::new(ManualHost::new(), small_batches());
    session.load_markdown(&paragraphs(0..6));
    let (handle, fired) = session.scheduler().host().next_due().unwrap();
    session.on_wake(handle, fired);
    assert_eq!(session.revealed_count(), 4);

    // When more content arrives
    session.load_markdown(&paragraphs(0..10));

    // Then nothing already shown is hidden and the rest follows
    assert_eq!(session.revealed_count(), 4);
    assert_eq!(session.run_to_completion().children().len(), 10);
}

#[test]
fn replacing_with_shorter_document_starts_over() {
    let mut session = RenderSession::new(ManualHost::new(), small_batches());
    session.load_markdown(&paragraphs(0..6));
    session.run_to_completion();

    session.load_markdown(&paragraphs(0..3));
    assert_eq!(session.revealed_count(), 2);
}

#[test]
fn json_blocks_render_through_language_override() {
    let mut session = RenderSession::new(ManualHost::new(), BatchConfig::default());
    session.register_components([(
        "chart",
        renderer(JsonComponent::new(
            |value: &serde_json::Value, _: &RenderProps<'_>| {
                let bars = value["bars"].as_array().map_or(0, Vec::len);
                OutputNode::from(
                    OutputElement::new("figure").with_attribute("data-bars", bars.to_string()),
                )
            },
        )),
    )]);

    session.load_markdown("```chart\n{\"bars\": [1, 2, 3]}\n```\n\n```chart\n{\"bars\": [\n```\n");
    let html = session.run_to_completion().to_html();

    assert_eq!(
        html,
        "<div><pre><figure data-bars=\"3\"></figure></pre>\
         <pre><div style=\"color: #888; font-style: italic\">Loading...</div></pre></div>"
    );
}

#[test]
fn fence_language_matching_a_default_alias_renders() {
    let mut session = RenderSession::new(ManualHost::new(), BatchConfig::default());
    session.load_markdown("```code\nx\n```\n");

    assert_eq!(
        session.run_to_completion().to_html(),
        "<div><pre><code class=\"language-code\" data-language=\"code\">x\n</code></pre></div>"
    );
}

#[test]
fn sessions_share_one_highlighter() {
    let built = Rc::new(Cell::new(0));
    let counter = built.clone();
    let resource: SharedResource<dyn Highlighter> = SharedResource::new(move || {
        counter.set(counter.get() + 1);
        Rc::new(markdown_reveal_engine::render::PlainHighlighter) as Rc<dyn Highlighter>
    });

    let first = RenderSession::with_highlighter(
        ManualHost::new(),
        BatchConfig::default(),
        resource.clone(),
    );
    let second = RenderSession::with_highlighter(
        ManualHost::new(),
        BatchConfig::default(),
        resource.clone(),
    );
    assert_eq!(built.get(), 1);
    assert_eq!(resource.holders(), 2);

    drop(first);
    assert!(resource.is_initialized());
    drop(second);
    assert!(!resource.is_initialized());
}

#[test]
fn dropping_a_session_cancels_its_wake() {
    let host = ManualHost::new();
    let observer = host.clone();
    let mut session = RenderSession::new(host, small_batches());
    session.load_markdown(&paragraphs(0..6));
    assert_eq!(observer.armed().len(), 1);

    drop(session);
    observer.advance(Duration::from_secs(1));
    assert!(observer.armed().is_empty());
}

#[test]
fn plain_highlighter_is_shared_lazily() {
    let resource = plain_highlighter();
    assert!(!resource.is_initialized());

    let session = RenderSession::with_highlighter(
        ManualHost::new(),
        BatchConfig::default(),
        resource.clone(),
    );
    assert!(resource.is_initialized());
    drop(session);
    assert_eq!(resource.holders(), 0);
}
