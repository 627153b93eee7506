//! Page layout for exported documents.
//!
//! Layout is kept separate from PDF rendering so pagination can be tested
//! without decoding a PDF. Coordinates are in points, measured from the top
//! edge of the page.

use orbit_core::ExportRequest;

use crate::markdown::{markdown_blocks, TextBlock};

/// Rough Helvetica advance width as a fraction of the font size.
const AVERAGE_CHAR_WIDTH: f32 = 0.5;
const COURIER_CHAR_WIDTH: f32 = 0.6;
const LEADING: f32 = 1.35;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width_pt: f32,
    pub height_pt: f32,
    pub margin_pt: f32,
}

impl Default for PageGeometry {
    /// US Letter, landscape.
    fn default() -> Self {
        Self {
            width_pt: 792.0,
            height_pt: 612.0,
            margin_pt: 24.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Title,
    Heading,
    Label,
    Body,
    /// Bold body text: minor headings and all-bold paragraphs.
    Strong,
    Code,
    /// One table row, cells joined with `|`.
    Row,
    Divider,
}

impl LineStyle {
    pub fn font_size(self) -> f32 {
        match self {
            LineStyle::Title => 22.0,
            LineStyle::Heading => 14.0,
            LineStyle::Label | LineStyle::Body | LineStyle::Strong | LineStyle::Divider => 12.0,
            LineStyle::Row => 11.0,
            LineStyle::Code => 10.0,
        }
    }

    pub fn is_bold(self) -> bool {
        matches!(
            self,
            LineStyle::Title | LineStyle::Heading | LineStyle::Label | LineStyle::Strong
        )
    }

    pub fn is_monospace(self) -> bool {
        self == LineStyle::Code
    }

    fn char_width(self) -> f32 {
        let factor = if self.is_monospace() {
            COURIER_CHAR_WIDTH
        } else {
            AVERAGE_CHAR_WIDTH
        };
        self.font_size() * factor
    }

    fn line_height(self) -> f32 {
        self.font_size() * LEADING
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub style: LineStyle,
    pub text: String,
    /// Distance from the top edge of the page to the text baseline.
    pub baseline_pt: f32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Page {
    pub lines: Vec<PlacedLine>,
}

impl PageGeometry {
    fn usable_width(&self) -> f32 {
        (self.width_pt - 2.0 * self.margin_pt).max(1.0)
    }

    /// Characters that fit on one line at the given style.
    pub fn max_chars(&self, style: LineStyle) -> usize {
        ((self.usable_width() / style.char_width()) as usize).max(1)
    }
}

/// Header, inputs, divider and the Markdown response body, flowed onto pages
/// top-down.
pub fn layout_document(request: &ExportRequest, geometry: &PageGeometry) -> Vec<Page> {
    let mut flow: Vec<(LineStyle, String)> = Vec::new();

    for line in wrap_text(&request.title, geometry.max_chars(LineStyle::Title)) {
        flow.push((LineStyle::Title, line));
    }
    flow.push((LineStyle::Body, String::new()));

    if !request.inputs.is_empty() {
        flow.push((LineStyle::Heading, "Inputs".to_string()));
        for (label, value) in &request.inputs {
            flow.push((LineStyle::Label, format!("{label}:")));
            for line in wrap_text(value, geometry.max_chars(LineStyle::Body)) {
                flow.push((LineStyle::Body, format!("  {line}")));
            }
        }
    }

    let rule_len = geometry.max_chars(LineStyle::Divider);
    flow.push((LineStyle::Divider, "-".repeat(rule_len)));

    for (index, block) in markdown_blocks(&request.body).iter().enumerate() {
        if block.gap_before && index > 0 {
            flow.push((LineStyle::Body, String::new()));
        }
        flow_block(&mut flow, block, geometry);
    }

    paginate(flow, geometry)
}

fn flow_block(flow: &mut Vec<(LineStyle, String)>, block: &TextBlock, geometry: &PageGeometry) {
    let style = block.style;
    if style == LineStyle::Divider {
        flow.push((style, "-".repeat(geometry.max_chars(style))));
        return;
    }
    let indent = block.rest_prefix.chars().count();
    let width = geometry.max_chars(style).saturating_sub(indent).max(1);
    let lines = if style.is_monospace() {
        wrap_verbatim(&block.text, width)
    } else {
        wrap_text(&block.text, width)
    };
    for (index, line) in lines.into_iter().enumerate() {
        let prefix = if index == 0 {
            &block.first_prefix
        } else {
            &block.rest_prefix
        };
        flow.push((style, format!("{prefix}{line}")));
    }
}

/// Hard-wraps a line at `max_chars` without touching its spacing.
fn wrap_verbatim(line: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars
        .chunks(max_chars.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

fn paginate(flow: Vec<(LineStyle, String)>, geometry: &PageGeometry) -> Vec<Page> {
    let bottom = geometry.height_pt - geometry.margin_pt;
    let mut pages = vec![Page::default()];
    let mut cursor = geometry.margin_pt;

    for (style, text) in flow {
        let next = cursor + style.line_height();
        let page_has_lines = pages.last().is_some_and(|page| !page.lines.is_empty());
        if next > bottom && page_has_lines {
            pages.push(Page::default());
            cursor = geometry.margin_pt;
        }
        cursor += style.line_height();
        if let Some(page) = pages.last_mut() {
            page.lines.push(PlacedLine {
                style,
                text,
                baseline_pt: cursor,
            });
        }
    }
    pages
}

/// Greedy word wrap that keeps paragraph breaks and hard-splits words longer
/// than a line.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let paragraph = paragraph.trim_end_matches('\r');
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }
        let mut current = String::new();
        let mut current_len = 0;
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > max_chars {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = word.split_off(max_chars);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            let needed = if current_len == 0 {
                word.len()
            } else {
                current_len + 1 + word.len()
            };
            if needed > max_chars && current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current_len += word.len();
            current.extend(word);
        }
        if current_len > 0 {
            lines.push(current);
        }
    }
    lines
}
