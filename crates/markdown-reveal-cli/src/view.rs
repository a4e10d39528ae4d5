//! Lays out rendered output as terminal lines.

use markdown_reveal_engine::{OutputElement, OutputNode, PropertyValue};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

pub fn document_lines(output: &OutputNode) -> Vec<Line<'static>> {
    let mut writer = LineWriter::default();
    writer.block(output, 0);
    writer.trim_trailing_blank();
    writer.lines
}

#[derive(Default)]
struct LineWriter {
    lines: Vec<Line<'static>>,
}

impl LineWriter {
    fn blank(&mut self) {
        if self.lines.last().is_some_and(|line| !line.spans.is_empty()) {
            self.lines.push(Line::default());
        }
    }

    fn trim_trailing_blank(&mut self) {
        while self.lines.last().is_some_and(|line| line.spans.is_empty()) {
            self.lines.pop();
        }
    }

    fn text(&mut self, indent: usize, text: &str, style: Style) {
        for part in text.lines().map(str::trim).filter(|part| !part.is_empty()) {
            self.lines.push(Line::from(vec![
                Span::raw(" ".repeat(indent)),
                Span::styled(part.to_string(), style),
            ]));
        }
    }

    fn block(&mut self, node: &OutputNode, indent: usize) {
        let element = match node {
            OutputNode::Element(element) => element,
            OutputNode::Text(text) => return self.text(indent, text, Style::default()),
            OutputNode::Fragment(_) => {
                for child in node.children() {
                    self.block(child, indent);
                }
                return;
            }
            OutputNode::Empty => return,
        };

        match element.tag.as_str() {
            tag @ ("h1" | "h2" | "h3" | "h4" | "h5" | "h6") => {
                let level = tag[1..].parse::<usize>().unwrap_or(1);
                let style = Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD);
                let heading = format!("{} {}", "#".repeat(level), node.text_content());
                self.text(indent, &heading, style);
                self.blank();
            }
            "p" => {
                self.text(indent, &node.text_content(), Style::default());
                self.blank();
            }
            "ul" | "ol" => {
                self.list(element, indent);
                if indent == 0 {
                    self.blank();
                }
            }
            "pre" => {
                let style = Style::default().fg(Color::Yellow);
                let pad = " ".repeat(indent + 2);
                let language = node
                    .find_element("code")
                    .and_then(|code| code.attributes.get("data-language"))
                    .and_then(PropertyValue::as_str);
                if let Some(language) = language {
                    let label = Style::default().fg(Color::DarkGray);
                    self.lines.push(Line::from(vec![
                        Span::raw(pad.clone()),
                        Span::styled(format!("[{language}]"), label),
                    ]));
                }
                for line in node.text_content().lines() {
                    self.lines.push(Line::from(vec![
                        Span::raw(pad.clone()),
                        Span::styled(line.to_string(), style),
                    ]));
                }
                self.blank();
            }
            "blockquote" => {
                let start = self.lines.len();
                for child in node.children() {
                    self.block(child, indent);
                }
                self.trim_trailing_blank();
                let bar = Style::default().fg(Color::DarkGray);
                for line in self.lines.iter_mut().skip(start) {
                    line.spans.insert(0, Span::styled("│ ", bar));
                }
                self.blank();
            }
            "hr" => {
                self.lines.push(Line::from(Span::styled(
                    "─".repeat(24),
                    Style::default().fg(Color::DarkGray),
                )));
                self.blank();
            }
            "table" => {
                let mut rows = Vec::new();
                node.find_elements("tr", &mut rows);
                for row in rows {
                    self.table_row(row, indent);
                }
                self.blank();
            }
            _ => {
                for child in node.children() {
                    self.block(child, indent);
                }
            }
        }
    }

    fn list(&mut self, list: &OutputElement, indent: usize) {
        let ordered = list.tag == "ol";
        let start = match list.attributes.get("start") {
            Some(PropertyValue::Number(n)) if *n >= 0.0 => *n as usize,
            _ => 1,
        };

        let items = list
            .children
            .iter()
            .filter_map(OutputNode::as_element)
            .filter(|item| item.tag == "li");
        for (i, item) in items.enumerate() {
            let marker = if ordered {
                format!("{}. ", start + i)
            } else {
                "• ".to_string()
            };

            let mut label = String::new();
            let mut nested = Vec::new();
            for child in &item.children {
                match child.as_element() {
                    Some(inner) if matches!(inner.tag.as_str(), "ul" | "ol") => nested.push(inner),
                    Some(inner) if inner.tag == "input" => {
                        let checked = matches!(
                            inner.attributes.get("checked"),
                            Some(PropertyValue::Bool(true))
                        );
                        label.push_str(if checked { "[x] " } else { "[ ] " });
                    }
                    _ => label.push_str(&child.text_content()),
                }
            }

            self.lines.push(Line::from(vec![
                Span::raw(" ".repeat(indent)),
                Span::styled(marker, Style::default().fg(Color::Green)),
                Span::raw(label.trim().to_string()),
            ]));
            for inner in nested {
                self.list(inner, indent + 2);
            }
        }
    }

    fn table_row(&mut self, row: &OutputElement, indent: usize) {
        let mut spans = vec![Span::raw(" ".repeat(indent))];
        let cells = row.children.iter().filter_map(OutputNode::as_element);
        for (i, cell) in cells.enumerate() {
            if i > 0 {
                spans.push(Span::styled(" │ ", Style::default().fg(Color::DarkGray)));
            }
            let text: String = cell.children.iter().map(OutputNode::text_content).collect();
            let style = if cell.tag == "th" {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            spans.push(Span::styled(text.trim().to_string(), style));
        }
        self.lines.push(Line::from(spans));
    }
}
