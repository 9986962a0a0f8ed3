//! Page model and the explicit layout state threaded through report drawing.

use crate::prelude::{Point, Rgb};
use serde::{Deserialize, Serialize};

/// Points to millimetres.
pub const PT_TO_MM: f64 = 25.4 / 72.0;

/// Page geometry and typographic constants, in millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSetup {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    pub bottom_margin: f64,
    /// Vertical advance per wrapped body line.
    pub line_height: f64,
    pub text_wrap: f64,
    pub code_wrap: f64,
    pub code_line_height: f64,
    pub pie_radius: f64,
    /// Triangles per pie slice.
    pub pie_segments: usize,
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            width: 210.0,
            height: 297.0,
            margin: 20.0,
            bottom_margin: 10.0,
            line_height: 7.0,
            text_wrap: 170.0,
            code_wrap: 160.0,
            code_line_height: 5.0,
            pie_radius: 30.0,
            pie_segments: 32,
        }
    }
}

impl PageSetup {
    /// Lowest y a block may reach.
    pub fn printable_bottom(&self) -> f64 {
        self.height - self.bottom_margin
    }

    pub fn content_width(&self) -> f64 {
        self.width - 2.0 * self.margin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Font {
    Helvetica,
    HelveticaBold,
    Courier,
}

/// Advance widths in 1/1000 em for U+0020..=U+007E, from the base-14 AFM files.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // space../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

impl Font {
    /// Advance of `ch` in 1/1000 em. Characters outside ASCII take the width
    /// of a lower-case letter.
    fn glyph_units(&self, ch: char) -> u16 {
        let index = (u32::from(ch) as usize).checked_sub(0x20);
        let table = match self {
            Font::Courier => return 600,
            Font::Helvetica => &HELVETICA_WIDTHS,
            Font::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        };
        match index.and_then(|index| table.get(index)) {
            Some(units) => *units,
            None if *self == Font::HelveticaBold => 611,
            None => 556,
        }
    }

    pub fn glyph_width(&self, ch: char, size: f64) -> f64 {
        f64::from(self.glyph_units(ch)) / 1000.0 * size * PT_TO_MM
    }

    /// Advance of an average glyph; exact for the monospaced Courier.
    pub fn char_width(&self, size: f64) -> f64 {
        let em = match self {
            Font::Helvetica => 0.5,
            Font::HelveticaBold => 0.55,
            Font::Courier => 0.6,
        };
        em * size * PT_TO_MM
    }

    pub fn text_width(&self, text: &str, size: f64) -> f64 {
        text.chars().map(|ch| self.glyph_width(ch, size)).sum()
    }

    /// Natural line height for `size`, the advance tables use.
    pub fn line_height(size: f64) -> f64 {
        size * 1.15 * PT_TO_MM
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Absolutely positioned drawing primitive. `y` grows downwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radius: f64,
        fill: Option<Rgb>,
        stroke: Option<Rgb>,
    },
    Triangle {
        points: [Point; 3],
        fill: Rgb,
    },
    /// `y` is the baseline of the first line.
    Text {
        x: f64,
        y: f64,
        lines: Vec<String>,
        font: Font,
        size: f64,
        color: Rgb,
        align: TextAlign,
        line_height: f64,
    },
}

impl Block {
    pub fn fill_rect(x: f64, y: f64, width: f64, height: f64, fill: Rgb) -> Self {
        Block::Rect {
            x,
            y,
            width,
            height,
            radius: 0.0,
            fill: Some(fill),
            stroke: None,
        }
    }

    pub fn text(
        x: f64,
        y: f64,
        content: impl Into<String>,
        font: Font,
        size: f64,
        color: Rgb,
    ) -> Self {
        Block::Text {
            x,
            y,
            lines: vec![content.into()],
            font,
            size,
            color,
            align: TextAlign::Left,
            line_height: Font::line_height(size),
        }
    }

    /// Lowest y the block reaches; the last baseline for text.
    pub fn bottom(&self) -> f64 {
        match self {
            Block::Rect { y, height, .. } => y + height,
            Block::Triangle { points, .. } => {
                points.iter().map(|p| p.y).fold(f64::MIN, f64::max)
            }
            Block::Text {
                y,
                lines,
                line_height,
                ..
            } => y + lines.len().saturating_sub(1) as f64 * line_height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageKind {
    Cover,
    SeverityChart,
    IssueIndex,
    IssueDetail { issue_id: String },
    /// Overflow page continuing the section that started on an earlier page.
    Continuation { parent: Box<PageKind> },
}

impl PageKind {
    /// Section this page belongs to, looking through continuations.
    pub fn section(&self) -> &PageKind {
        match self {
            PageKind::Continuation { parent } => parent.section(),
            other => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub kind: PageKind,
    pub blocks: Vec<Block>,
}

impl Page {
    pub fn triangles(&self) -> impl Iterator<Item = (&[Point; 3], Rgb)> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Triangle { points, fill } => Some((points, *fill)),
            _ => None,
        })
    }

    /// Every text line on the page, top to bottom in draw order.
    pub fn text_lines(&self) -> impl Iterator<Item = &str> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Text { lines, .. } => Some(lines.iter().map(String::as_str)),
                _ => None,
            })
            .flatten()
    }
}

/// Finished report: fixed-size pages of positioned blocks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub setup: PageSetup,
    pub pages: Vec<Page>,
    /// Pages inserted because content ran past the printable height.
    pub overflow_breaks: usize,
}

impl Document {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages_in_section<'a>(&'a self, section: &'a PageKind) -> impl Iterator<Item = &'a Page> {
        self.pages
            .iter()
            .filter(move |page| page.kind.section() == section)
    }
}

/// Current page, vertical cursor and page height, advanced one block at a time.
#[derive(Debug)]
pub struct LayoutState {
    setup: PageSetup,
    pages: Vec<Page>,
    cursor_y: f64,
    overflow_breaks: usize,
}

impl LayoutState {
    pub fn new(setup: PageSetup) -> Self {
        Self {
            setup,
            pages: Vec::new(),
            cursor_y: 0.0,
            overflow_breaks: 0,
        }
    }

    pub fn setup(&self) -> &PageSetup {
        &self.setup
    }

    /// Opens a page for a new section with the cursor at `cursor_y`.
    pub fn start_page(&mut self, kind: PageKind, cursor_y: f64) {
        self.pages.push(Page {
            kind,
            blocks: Vec::new(),
        });
        self.cursor_y = cursor_y;
    }

    /// Continues the current section on a fresh page at the top margin.
    pub fn break_page(&mut self) {
        let parent = self
            .pages
            .last()
            .map(|page| page.kind.section().clone())
            .unwrap_or(PageKind::Cover);
        self.overflow_breaks += 1;
        self.start_page(
            PageKind::Continuation {
                parent: Box::new(parent),
            },
            self.setup.margin,
        );
    }

    pub fn cursor(&self) -> f64 {
        self.cursor_y
    }

    pub fn set_cursor(&mut self, y: f64) {
        self.cursor_y = y;
    }

    pub fn advance(&mut self, dy: f64) {
        self.cursor_y += dy;
    }

    /// Space left between the cursor and the printable bottom.
    pub fn room(&self) -> f64 {
        (self.setup.printable_bottom() - self.cursor_y).max(0.0)
    }

    /// Whether a block of `height` fits below the cursor on this page.
    pub fn fits(&self, height: f64) -> bool {
        self.cursor_y + height <= self.setup.printable_bottom()
    }

    /// Height available on an empty continuation page.
    pub fn fresh_page_room(&self) -> f64 {
        self.setup.printable_bottom() - self.setup.margin
    }

    /// Breaks the page if `height` does not fit; returns whether it broke.
    pub fn ensure_room(&mut self, height: f64) -> bool {
        if self.fits(height) {
            false
        } else {
            self.break_page();
            true
        }
    }

    pub fn push(&mut self, block: Block) {
        if self.pages.is_empty() {
            self.start_page(PageKind::Cover, self.setup.margin);
        }
        if let Some(page) = self.pages.last_mut() {
            page.blocks.push(block);
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn finish(self) -> Document {
        Document {
            setup: self.setup,
            pages: self.pages,
            overflow_breaks: self.overflow_breaks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits_respects_printable_bottom() {
        let mut state = LayoutState::new(PageSetup::default());
        state.start_page(PageKind::Cover, 200.0);
        assert!(state.fits(87.0));
        assert!(!state.fits(87.5));
        assert_eq!(state.room(), 87.0);
    }

    #[test]
    fn break_page_continues_current_section() {
        let mut state = LayoutState::new(PageSetup::default());
        state.start_page(
            PageKind::IssueDetail {
                issue_id: "issue1".into(),
            },
            250.0,
        );
        assert!(state.ensure_room(60.0));
        assert!(state.ensure_room(300.0));
        let document = state.finish();
        assert_eq!(document.page_count(), 3);
        assert_eq!(document.overflow_breaks, 2);
        let section = PageKind::IssueDetail {
            issue_id: "issue1".into(),
        };
        assert_eq!(document.pages_in_section(&section).count(), 3);
        assert_eq!(document.pages[2].kind.section(), &section);
    }

    #[test]
    fn text_width_scales_with_size() {
        let narrow = Font::Helvetica.text_width("abcd", 10.0);
        let wide = Font::Helvetica.text_width("abcd", 20.0);
        assert!((wide - 2.0 * narrow).abs() < 1e-12);
        assert!(Font::Courier.char_width(12.0) > Font::Helvetica.char_width(12.0));
    }

    #[test]
    fn glyph_widths_follow_font_metrics() {
        // "W" is 944/1000 em, "i" 222/1000 em in Helvetica.
        let per_unit = 10.0 * PT_TO_MM / 1000.0;
        assert!((Font::Helvetica.text_width("Wi", 10.0) - 1166.0 * per_unit).abs() < 1e-9);
        let helvetica = Font::Helvetica;
        assert!(helvetica.text_width("SECURITY", 16.0) > helvetica.text_width("security", 16.0));
        let bold = Font::HelveticaBold;
        assert!(bold.text_width("report", 12.0) > helvetica.text_width("report", 12.0));
        assert_eq!(Font::Courier.text_width("iW", 10.0), 2.0 * Font::Courier.char_width(10.0));
        assert_eq!(helvetica.glyph_width('\u{e9}', 10.0), helvetica.glyph_width('e', 10.0));
    }
}
