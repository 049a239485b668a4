//! PDF output via printpdf.
//!
//! Blocks are laid out top to bottom on US-Letter pages with one-inch
//! margins, using the built-in Helvetica fonts. Built-in fonts carry no
//! metrics, so text width is estimated from an average glyph width.

use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Rect, Rgb,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use super::{Block, ReportDocument};

const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 72.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

/// Average Helvetica glyph width as a fraction of the font size.
const GLYPH_WIDTH: f32 = 0.52;
const LEADING: f32 = 1.25;

const BODY_SIZE: f32 = 10.0;
const TITLE_SIZE: f32 = 18.0;
const TABLE_SIZE: f32 = 9.0;
const ROW_HEIGHT: f32 = 18.0;
const BULLET_INDENT: f32 = 14.0;

const LAYER: &str = "Layer 1";

/// Points to printpdf millimetres.
fn mm(pt: f32) -> Mm {
    Mm(pt * 25.4 / 72.0)
}

fn gray(level: f32) -> Color {
    Color::Rgb(Rgb::new(level, level, level, None))
}

fn heading_size(level: u8) -> f32 {
    match level {
        1 => 14.0,
        2 => 12.0,
        _ => 10.5,
    }
}

/// Estimated rendered width of `text`, in points.
fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * GLYPH_WIDTH
}

/// Greedy word wrap to `width` points. Words longer than a line are split.
pub(crate) fn wrap(text: &str, size: f32, width: f32) -> Vec<String> {
    let max_chars = ((width / (size * GLYPH_WIDTH)) as usize).max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let word: String = word.into_iter().collect();
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Replace characters the built-in fonts cannot encode.
fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\t' => ' ',
            c if (c as u32) < 0x20 => ' ',
            c if (c as u32) > 0xFF => '?',
            c => c,
        })
        .collect()
}

struct PageWriter {
    doc: PdfDocumentReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    layer: PdfLayerReference,
    /// Baseline cursor, measured from the bottom of the page.
    y: f32,
}

impl PageWriter {
    fn new(title: &str) -> anyhow::Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, mm(PAGE_WIDTH), mm(PAGE_HEIGHT), LAYER);
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| anyhow::anyhow!("failed to load Helvetica: {:?}", e))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| anyhow::anyhow!("failed to load Helvetica-Bold: {:?}", e))?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            regular,
            bold,
            layer,
            y: PAGE_HEIGHT - MARGIN,
        })
    }

    /// Start a new page unless `height` points still fit on this one.
    fn reserve(&mut self, height: f32) {
        if self.y - height < MARGIN {
            let (page, layer) = self.doc.add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), LAYER);
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn text_at(&self, text: &str, size: f32, x: f32, y: f32, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.use_text(sanitize(text), size, mm(x), mm(y), font);
    }

    fn paragraph(&mut self, text: &str, size: f32, indent: f32, bold: bool) {
        let line_height = size * LEADING;
        for line in wrap(text, size, CONTENT_WIDTH - indent) {
            self.reserve(line_height);
            self.y -= line_height;
            self.text_at(&line, size, MARGIN + indent, self.y + size * 0.25, bold);
        }
    }

    fn title(&mut self, text: &str) {
        let line_height = TITLE_SIZE * LEADING;
        for line in wrap(text, TITLE_SIZE, CONTENT_WIDTH) {
            self.reserve(line_height);
            self.y -= line_height;
            let x = MARGIN + ((CONTENT_WIDTH - text_width(&line, TITLE_SIZE)) / 2.0).max(0.0);
            self.text_at(&line, TITLE_SIZE, x, self.y + TITLE_SIZE * 0.25, true);
        }
    }

    fn bullet(&mut self, text: &str) {
        let line_height = BODY_SIZE * LEADING;
        for (i, line) in wrap(text, BODY_SIZE, CONTENT_WIDTH - BULLET_INDENT)
            .into_iter()
            .enumerate()
        {
            self.reserve(line_height);
            self.y -= line_height;
            let baseline = self.y + BODY_SIZE * 0.25;
            if i == 0 {
                self.layer.set_fill_color(gray(0.0));
                let mid = baseline + BODY_SIZE * 0.3;
                self.layer.add_rect(
                    Rect::new(mm(MARGIN + 4.0), mm(mid - 1.5), mm(MARGIN + 7.0), mm(mid + 1.5))
                        .with_mode(PaintMode::Fill),
                );
            }
            self.text_at(&line, BODY_SIZE, MARGIN + BULLET_INDENT, baseline, false);
        }
    }

    fn table(&mut self, header: &[String], rows: &[Vec<String>], shade_last: bool, widths: &[f32]) {
        let total: f32 = widths.iter().sum::<f32>() * 72.0;
        let scale = if total > CONTENT_WIDTH { CONTENT_WIDTH / total } else { 1.0 };
        let columns: Vec<f32> = widths.iter().map(|w| w * 72.0 * scale).collect();
        let left = MARGIN + (CONTENT_WIDTH - total * scale) / 2.0;

        self.table_row(header, &columns, left, Some(gray(0.5)), true);
        for (i, row) in rows.iter().enumerate() {
            let fill = (shade_last && i + 1 == rows.len()).then(|| gray(0.83));
            self.table_row(row, &columns, left, fill, false);
        }
    }

    fn table_row(&mut self, cells: &[String], columns: &[f32], left: f32, fill: Option<Color>, header: bool) {
        self.reserve(ROW_HEIGHT);
        let top = self.y;
        let bottom = top - ROW_HEIGHT;
        let mut x = left;

        for (cell, width) in cells.iter().zip(columns) {
            let cell_rect = || Rect::new(mm(x), mm(bottom), mm(x + width), mm(top));
            if let Some(color) = &fill {
                self.layer.set_fill_color(color.clone());
                self.layer.add_rect(cell_rect().with_mode(PaintMode::Fill));
            }
            self.layer.set_outline_color(gray(0.0));
            self.layer.set_outline_thickness(0.75);
            self.layer.add_rect(cell_rect().with_mode(PaintMode::Stroke));

            let text = fit(cell, TABLE_SIZE, width - 4.0);
            let text_x = x + ((width - text_width(&text, TABLE_SIZE)) / 2.0).max(2.0);
            self.layer
                .set_fill_color(if header { gray(0.96) } else { gray(0.0) });
            self.text_at(&text, TABLE_SIZE, text_x, bottom + 6.0, header);
            x += width;
        }

        self.layer.set_fill_color(gray(0.0));
        self.y = bottom;
    }

    fn save(self, path: &Path) -> anyhow::Result<()> {
        let file = File::create(path)?;
        self.doc
            .save(&mut BufWriter::new(file))
            .map_err(|e| anyhow::anyhow!("failed to write {}: {:?}", path.display(), e))
    }
}

/// Truncate `text` with an ellipsis so it fits in `width` points.
fn fit(text: &str, size: f32, width: f32) -> String {
    let max_chars = ((width / (size * GLYPH_WIDTH)) as usize).max(1);
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut s: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    s.push_str("...");
    s
}

/// Render `doc` to a PDF file at `path`.
pub fn write_pdf(doc: &ReportDocument, title: &str, path: &Path) -> anyhow::Result<()> {
    let mut writer = PageWriter::new(title)?;

    for block in &doc.blocks {
        match block {
            Block::Title(text) => writer.title(text),
            Block::Heading { level, text } => {
                let size = heading_size(*level);
                writer.reserve(size * LEADING * 3.0);
                writer.paragraph(text, size, 0.0, true);
            }
            Block::Text(text) => writer.paragraph(text, BODY_SIZE, 0.0, false),
            Block::Bullet(text) => writer.bullet(text),
            Block::Table {
                header,
                rows,
                shade_last,
                widths,
            } => writer.table(header, rows, *shade_last, widths),
            Block::Spacer(height) => {
                if writer.y - height > MARGIN {
                    writer.y -= height;
                }
            }
        }
    }

    writer.save(path)?;
    log::info!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_short_line() {
        assert_eq!(wrap("hello world", 10.0, 400.0), vec!["hello world"]);
    }

    #[test]
    fn test_wrap_breaks_on_words() {
        // 10pt at 0.52 -> about 19 characters in 100pt
        let lines = wrap("the quick brown fox jumps over the lazy dog", 10.0, 100.0);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.chars().count() <= 19));
        assert_eq!(lines.join(" "), "the quick brown fox jumps over the lazy dog");
    }

    #[test]
    fn test_wrap_splits_long_words() {
        let long = "x".repeat(50);
        let lines = wrap(&long, 10.0, 100.0);
        assert_eq!(lines.concat(), long);
        assert!(lines.iter().all(|l| l.chars().count() <= 19));
    }

    #[test]
    fn test_wrap_empty() {
        assert_eq!(wrap("", 10.0, 100.0), vec![""]);
    }

    #[test]
    fn test_fit_truncates() {
        assert_eq!(fit("Python", 9.0, 100.0), "Python");
        let fitted = fit(&"y".repeat(40), 9.0, 50.0);
        assert!(fitted.ends_with("..."));
        assert!(fitted.chars().count() <= 10);
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("a\tb\u{2713}é"), "a b?é");
    }
}
