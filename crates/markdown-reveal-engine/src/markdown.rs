//! Markdown source to [`DocumentNode`] trees.
//!
//! pulldown-cmark emits a flat stream of start/end events. Every `Start`
//! opens zero or more elements and records how many, so the matching `End`
//! closes exactly those, whatever the tag. Two cases open elements out of
//! step with the events:
//!
//! - a code block opens `pre` and `code` together
//! - table heads have no row event, so `thead` opens its `tr` itself, and
//!   the first body row opens a `tbody` owned by the table

use pulldown_cmark::{Alignment, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use crate::document::{DocumentNode, Element};

/// Parse `content` with tables, strikethrough and task lists enabled.
pub fn parse_markdown(content: &str) -> DocumentNode {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut builder = TreeBuilder::default();
    for event in Parser::new_ext(content, options) {
        builder.process_event(event);
    }
    builder.finish()
}

#[derive(Default)]
struct TreeBuilder {
    root: Vec<DocumentNode>,
    stack: Vec<Element>,
    /// Elements opened by each unclosed `Start` event.
    frames: Vec<usize>,
    alignments: Vec<Alignment>,
    cell_index: usize,
    in_table_head: bool,
    body_pending: bool,
}

impl TreeBuilder {
    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => {
                let opened = self.start(tag);
                self.frames.push(opened);
            }
            Event::End(end) => self.end(end),
            Event::Text(text) => self.push_text(&text),
            Event::Code(code) => self.append(Element::new("code").with_child(&*code).into()),
            Event::Html(html) | Event::InlineHtml(html) => self.push_raw(&html),
            Event::SoftBreak => self.push_text("\n"),
            Event::HardBreak => self.append(Element::new("br").into()),
            Event::Rule => self.append(Element::new("hr").into()),
            Event::TaskListMarker(checked) => self.task_marker(checked),
            other => log::trace!("skipping unsupported markdown event {other:?}"),
        }
    }

    fn start(&mut self, tag: Tag<'_>) -> usize {
        match tag {
            Tag::Paragraph => self.open(Element::new("p")),
            Tag::Heading { level, .. } => self.open(Element::new(format!("h{}", level as u8))),
            Tag::BlockQuote(_) => self.open(Element::new("blockquote")),
            Tag::CodeBlock(kind) => {
                let mut code = Element::new("code");
                if let CodeBlockKind::Fenced(info) = &kind
                    && let Some(language) = info.split_whitespace().next()
                {
                    code = code.with_property("className", vec![format!("language-{language}")]);
                }
                self.open(Element::new("pre")) + self.open(code)
            }
            Tag::List(Some(start)) => {
                let mut list = Element::new("ol");
                if start != 1 {
                    list = list.with_property("start", start as f64);
                }
                self.open(list)
            }
            Tag::List(None) => self.open(Element::new("ul")),
            Tag::Item => self.open(Element::new("li")),
            Tag::Emphasis => self.open(Element::new("em")),
            Tag::Strong => self.open(Element::new("strong")),
            Tag::Strikethrough => self.open(Element::new("del")),
            Tag::Link {
                dest_url, title, ..
            } => {
                let mut link = Element::new("a").with_property("href", &*dest_url);
                if !title.is_empty() {
                    link = link.with_property("title", &*title);
                }
                self.open(link)
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                let mut image = Element::new("img").with_property("src", &*dest_url);
                if !title.is_empty() {
                    image = image.with_property("title", &*title);
                }
                self.open(image)
            }
            Tag::Table(alignments) => {
                self.alignments = alignments;
                self.open(Element::new("table"))
            }
            Tag::TableHead => {
                self.in_table_head = true;
                self.cell_index = 0;
                self.open(Element::new("thead")) + self.open(Element::new("tr"))
            }
            Tag::TableRow => {
                if self.body_pending {
                    self.body_pending = false;
                    let tbody = self.open(Element::new("tbody"));
                    if let Some(table) = self.frames.last_mut() {
                        *table += tbody;
                    }
                }
                self.cell_index = 0;
                self.open(Element::new("tr"))
            }
            Tag::TableCell => {
                let tag = if self.in_table_head { "th" } else { "td" };
                let mut cell = Element::new(tag);
                if let Some(align) = self.alignments.get(self.cell_index).and_then(alignment_name)
                {
                    cell = cell.with_property("align", align);
                }
                self.cell_index += 1;
                self.open(cell)
            }
            other => {
                log::trace!("flattening unsupported markdown tag {other:?}");
                0
            }
        }
    }

    fn end(&mut self, end: TagEnd) {
        let opened = self.frames.pop().unwrap_or_default();
        for _ in 0..opened {
            self.close();
        }
        match end {
            TagEnd::TableHead => {
                self.in_table_head = false;
                self.body_pending = true;
            }
            TagEnd::Table => {
                self.body_pending = false;
                self.alignments.clear();
            }
            _ => {}
        }
    }

    fn open(&mut self, element: Element) -> usize {
        self.stack.push(element);
        1
    }

    fn close(&mut self) {
        let Some(mut element) = self.stack.pop() else {
            return;
        };
        if element.tag_name == "img" {
            let alt = plain_text(&element.children);
            element.children.clear();
            element.properties.insert("alt", alt);
        }
        self.append(element.into());
    }

    fn children_mut(&mut self) -> &mut Vec<DocumentNode> {
        match self.stack.last_mut() {
            Some(parent) => &mut parent.children,
            None => &mut self.root,
        }
    }

    fn append(&mut self, node: DocumentNode) {
        self.children_mut().push(node);
    }

    fn push_text(&mut self, text: &str) {
        let children = self.children_mut();
        if let Some(DocumentNode::Text { value }) = children.last_mut() {
            value.push_str(text);
        } else {
            children.push(DocumentNode::text(text));
        }
    }

    fn push_raw(&mut self, markup: &str) {
        let children = self.children_mut();
        if let Some(DocumentNode::Raw { value }) = children.last_mut() {
            value.push_str(markup);
        } else {
            children.push(DocumentNode::raw(markup));
        }
    }

    fn task_marker(&mut self, checked: bool) {
        if let Some(item) = self.stack.iter_mut().rev().find(|e| e.tag_name == "li") {
            item.properties
                .insert("className", vec!["task-list-item".to_string()]);
        }
        self.append(
            Element::new("input")
                .with_property("type", "checkbox")
                .with_property("checked", checked)
                .with_property("disabled", true)
                .into(),
        );
    }

    fn finish(mut self) -> DocumentNode {
        while !self.stack.is_empty() {
            self.close();
        }
        DocumentNode::root(self.root)
    }
}

fn alignment_name(alignment: &Alignment) -> Option<&'static str> {
    match alignment {
        Alignment::None => None,
        Alignment::Left => Some("left"),
        Alignment::Center => Some("center"),
        Alignment::Right => Some("right"),
    }
}

fn plain_text(nodes: &[DocumentNode]) -> String {
    let mut text = String::new();
    for node in nodes {
        match node {
            DocumentNode::Text { value } => text.push_str(value),
            other => text.push_str(&plain_text(other.children())),
        }
    }
    text
}
