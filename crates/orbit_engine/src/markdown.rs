//! Flattens a Markdown answer into styled text blocks for page layout.
//!
//! Inline markup is dropped; block structure (headings, list items, code,
//! rules, table rows) survives as a [`LineStyle`] plus a line prefix.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag};

use crate::layout::LineStyle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    pub style: LineStyle,
    pub text: String,
    /// Prefix of the first wrapped line, e.g. `"- "` or `"2. "`.
    pub first_prefix: String,
    /// Prefix of continuation lines; aligns them under the first.
    pub rest_prefix: String,
    /// Leave a blank line above this block.
    pub gap_before: bool,
}

#[derive(Default)]
struct Flattener {
    blocks: Vec<TextBlock>,
    text: String,
    style: Option<LineStyle>,
    /// Whether every non-blank run of the current block was inside `**`.
    all_strong: bool,
    strong_depth: usize,
    /// Next number per open list; `None` for bullet lists.
    lists: Vec<Option<u64>>,
    /// (first, rest) prefix per open list item.
    items: Vec<(String, String)>,
    first_in_list: bool,
    in_code: bool,
    /// The next code line opens a new code block.
    code_first: bool,
}

/// Parses `markdown` and returns its blocks in document order.
pub fn markdown_blocks(markdown: &str) -> Vec<TextBlock> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut flat = Flattener {
        all_strong: true,
        ..Flattener::default()
    };
    for event in Parser::new_ext(markdown, options) {
        flat.event(event);
    }
    flat.flush();
    flat.blocks
}

impl Flattener {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if self.in_code {
                    self.code_text(&text);
                } else {
                    self.push_text(&text);
                }
            }
            Event::Code(code) => self.push_text(&code),
            Event::Html(html) => self.push_text(&html),
            Event::SoftBreak | Event::HardBreak => {
                // Model answers lean on single line breaks, so keep them.
                self.text.push('\n');
            }
            Event::Rule => {
                self.flush();
                self.blocks.push(TextBlock {
                    style: LineStyle::Divider,
                    text: String::new(),
                    first_prefix: String::new(),
                    rest_prefix: String::new(),
                    gap_before: true,
                });
            }
            Event::TaskListMarker(done) => {
                self.text.push_str(if done { "[x] " } else { "[ ] " });
            }
            Event::FootnoteReference(label) => self.push_text(&format!("[{label}]")),
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading(level, _, _) => {
                self.flush();
                self.style = Some(if matches!(level, HeadingLevel::H1 | HeadingLevel::H2) {
                    LineStyle::Heading
                } else {
                    LineStyle::Strong
                });
            }
            Tag::Paragraph | Tag::BlockQuote => self.flush(),
            Tag::List(start) => {
                self.flush();
                if self.items.is_empty() {
                    self.first_in_list = true;
                }
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush();
                let marker = match self.lists.last_mut() {
                    Some(Some(number)) => {
                        let marker = format!("{number}. ");
                        *number += 1;
                        marker
                    }
                    _ => "- ".to_string(),
                };
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let rest = format!("{indent}{}", " ".repeat(marker.chars().count()));
                self.items.push((format!("{indent}{marker}"), rest));
            }
            Tag::CodeBlock(_) => {
                self.flush();
                self.in_code = true;
                self.code_first = true;
                self.style = Some(LineStyle::Code);
            }
            Tag::Table(_) => self.flush(),
            Tag::TableCell => {
                if !self.text.is_empty() {
                    self.text.push_str(" | ");
                }
            }
            Tag::Strong => self.strong_depth += 1,
            _ => {}
        }
    }

    fn end(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading(..) | Tag::Paragraph | Tag::BlockQuote => self.flush(),
            Tag::List(_) => {
                self.flush();
                self.lists.pop();
            }
            Tag::Item => {
                self.flush();
                self.items.pop();
            }
            Tag::CodeBlock(_) => {
                self.in_code = false;
                self.style = None;
            }
            Tag::TableHead | Tag::TableRow => {
                // Rows sit directly under each other.
                let first_row = !self.blocks.last().is_some_and(|b| b.style == LineStyle::Row);
                self.style = Some(LineStyle::Row);
                self.flush_with_gap(first_row);
            }
            Tag::Strong => self.strong_depth = self.strong_depth.saturating_sub(1),
            _ => {}
        }
    }

    fn push_text(&mut self, text: &str) {
        if self.strong_depth == 0 && !text.trim().is_empty() {
            self.all_strong = false;
        }
        self.text.push_str(text);
    }

    /// Code blocks keep one block per source line, spacing untouched.
    fn code_text(&mut self, text: &str) {
        for line in text.lines() {
            let first_line = std::mem::take(&mut self.code_first);
            let (first_prefix, rest_prefix) = self.prefixes();
            self.blocks.push(TextBlock {
                style: LineStyle::Code,
                text: line.trim_end().to_string(),
                first_prefix,
                rest_prefix,
                gap_before: first_line,
            });
        }
    }

    fn flush(&mut self) {
        let gap = if self.items.is_empty() {
            true
        } else {
            self.first_in_list
        };
        self.flush_with_gap(gap);
    }

    fn flush_with_gap(&mut self, gap_before: bool) {
        let text = self.text.trim().to_string();
        self.text.clear();
        let style = match self.style.take() {
            Some(style) => style,
            None if self.all_strong => LineStyle::Strong,
            None => LineStyle::Body,
        };
        self.all_strong = true;
        if text.is_empty() || self.in_code {
            return;
        }

        let (first_prefix, rest_prefix) = self.prefixes();
        if let Some(item) = self.items.last_mut() {
            // Later paragraphs of the same item hang under the marker.
            item.0 = item.1.clone();
        }
        self.first_in_list = false;
        self.blocks.push(TextBlock {
            style,
            text,
            first_prefix,
            rest_prefix,
            gap_before,
        });
    }

    fn prefixes(&self) -> (String, String) {
        self.items.last().cloned().unwrap_or_default()
    }
}
