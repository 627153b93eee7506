use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument};

use crate::layout::{Page, PageGeometry};

const MM_PER_PT: f32 = 25.4 / 72.0;
const LAYER_NAME: &str = "content";

fn mm(points: f32) -> Mm {
    Mm(points * MM_PER_PT)
}

/// Renders laid-out pages into PDF bytes using the builtin Helvetica faces,
/// with Courier for code.
pub fn render_pdf(title: &str, pages: &[Page], geometry: &PageGeometry) -> Result<Vec<u8>, String> {
    let width = mm(geometry.width_pt);
    let height = mm(geometry.height_pt);
    let (doc, first_page, first_layer) =
        PdfDocument::new(to_font_text(title), width, height, LAYER_NAME);
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|err| err.to_string())?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|err| err.to_string())?;
    let mono = doc
        .add_builtin_font(BuiltinFont::Courier)
        .map_err(|err| err.to_string())?;

    for (index, page) in pages.iter().enumerate() {
        let (page_index, layer_index) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(width, height, LAYER_NAME)
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);
        for line in &page.lines {
            if line.text.is_empty() {
                continue;
            }
            let font: &IndirectFontRef = if line.style.is_monospace() {
                &mono
            } else if line.style.is_bold() {
                &bold
            } else {
                &regular
            };
            layer.use_text(
                to_font_text(&line.text),
                line.style.font_size(),
                mm(geometry.margin_pt),
                mm(geometry.height_pt - line.baseline_pt),
                font,
            );
        }
    }

    doc.save_to_bytes().map_err(|err| err.to_string())
}

/// Maps text onto what the builtin Latin fonts can show: typographic
/// punctuation is folded to ASCII and anything else outside Latin-1 becomes
/// `?`. Emoji presentation selectors are dropped.
pub fn to_font_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' => out.push('"'),
            '\u{2013}' | '\u{2014}' | '\u{2212}' => out.push('-'),
            '\u{2022}' => out.push('*'),
            '\u{2026}' => out.push_str("..."),
            '\u{FE0F}' | '\u{200D}' => {}
            '\t' => out.push_str("    "),
            ' '..='~' | '\u{A0}'..='\u{FF}' => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::to_font_text;

    #[test]
    fn folds_typographic_punctuation() {
        assert_eq!(to_font_text("30–60 “min” it’s…"), "30-60 \"min\" it's...");
    }

    #[test]
    fn replaces_unsupported_characters() {
        assert_eq!(to_font_text("⚙️ café ✓"), "? café ?");
    }
}
