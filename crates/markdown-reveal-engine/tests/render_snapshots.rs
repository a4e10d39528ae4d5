use markdown_reveal_engine::{BatchConfig, ManualHost, PropertyMap, RenderSession};

#[test]
fn fixture_document() {
    let html = render_fixture("document");
    insta::assert_snapshot!("document_html", html);
}

/// Revealing in small batches ends in the same output as revealing at once
#[test]
fn batched_reveal_matches_full_render() {
    let md = read_fixture("document");

    let mut batched = RenderSession::new(ManualHost::new(), BatchConfig::default());
    let mut scheduler_config = BatchConfig::default();
    scheduler_config.initial_batch_size = 1;
    scheduler_config.batch_size = 1;
    let mut slow = RenderSession::new(ManualHost::new(), scheduler_config);

    batched.load_markdown(&md);
    slow.load_markdown(&md);
    assert_eq!(slow.render().children().len(), 1);

    assert_eq!(
        batched.run_to_completion().to_html(),
        slow.run_to_completion().to_html()
    );
}

fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(format!(
        "{}/tests/fixtures/{name}.md",
        env!("CARGO_MANIFEST_DIR")
    ))
    .unwrap()
}

fn render_fixture(name: &str) -> String {
    let md = read_fixture(name);
    let mut session = RenderSession::new(ManualHost::new(), BatchConfig::default())
        .with_base_attributes(PropertyMap::new().with("class", "markdown-body"));
    session.load_markdown(&md);
    session.run_to_completion().to_html()
}
