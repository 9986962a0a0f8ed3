use crate::palette::{BRAND_BLUE, PANEL_FILL};
use crate::prelude::Rgb;
use crate::report::layout::{Block, Font, LayoutState, TextAlign, PT_TO_MM};
use crate::report::text::wrap_text;

/// Cell styling for a [`Table`].
#[derive(Debug, Clone)]
pub struct TableStyle {
    pub font_size: f64,
    pub cell_padding: f64,
    pub head_fill: Option<Rgb>,
    pub head_text: Rgb,
    pub body_text: Rgb,
    pub alternate_fill: Option<Rgb>,
    pub bold_first_column: bool,
}

impl TableStyle {
    /// Blue head row with alternating light rows.
    pub fn striped() -> Self {
        Self {
            font_size: 10.0,
            cell_padding: 3.0,
            head_fill: Some(BRAND_BLUE),
            head_text: Rgb::WHITE,
            body_text: Rgb::new(40, 40, 40),
            alternate_fill: Some(PANEL_FILL),
            bold_first_column: false,
        }
    }

    /// Unfilled key/value grid with a bold key column.
    pub fn plain() -> Self {
        Self {
            font_size: 10.0,
            cell_padding: 5.0,
            head_fill: None,
            head_text: Rgb::BLACK,
            body_text: Rgb::BLACK,
            alternate_fill: None,
            bold_first_column: true,
        }
    }
}

/// Outcome of laying out a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSummary {
    pub rows: usize,
    /// Page breaks taken while placing body rows.
    pub page_breaks: usize,
}

/// Grid of wrapped text cells placed at the layout cursor. A row that does
/// not fit moves to a continuation page, where the head row is repeated; only
/// a row taller than a whole page is split between its lines.
pub struct Table {
    head: Option<Vec<String>>,
    rows: Vec<Vec<String>>,
    widths: Vec<f64>,
    x: f64,
    style: TableStyle,
}

impl Table {
    pub fn new(widths: Vec<f64>, x: f64, style: TableStyle) -> Self {
        Self {
            head: None,
            rows: Vec::new(),
            widths,
            x,
            style,
        }
    }

    pub fn with_head<S: Into<String>>(mut self, head: impl IntoIterator<Item = S>) -> Self {
        self.head = Some(head.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_rows(mut self, rows: Vec<Vec<String>>) -> Self {
        self.rows = rows;
        self
    }

    pub fn layout(&self, state: &mut LayoutState) -> TableSummary {
        let mut page_breaks = 0;

        if let Some(head) = &self.head {
            let cells = self.wrap_row(head, true);
            if state.ensure_room(self.row_height(&cells)) {
                page_breaks += 1;
            }
            self.draw_head(state, &cells);
        }

        for (idx, row) in self.rows.iter().enumerate() {
            let fill = if idx % 2 == 1 {
                self.style.alternate_fill
            } else {
                None
            };
            let mut cells = self.wrap_row(row, false);
            let mut fresh = false;
            loop {
                let height = self.row_height(&cells);
                if state.fits(height) {
                    self.draw_row(state, &cells, height, fill, self.style.body_text, false);
                    break;
                }

                let capacity = self.lines_fitting(state.room());
                let whole_row_fits_fresh = height <= state.fresh_page_room() - self.head_height();
                if !fresh && (whole_row_fits_fresh || capacity == 0) {
                    self.continue_page(state);
                    page_breaks += 1;
                    fresh = true;
                    continue;
                }

                let rest = split_cells(&mut cells, capacity.max(1));
                let height = self.row_height(&cells);
                self.draw_row(state, &cells, height, fill, self.style.body_text, false);
                cells = rest;
                self.continue_page(state);
                page_breaks += 1;
                fresh = true;
            }
        }

        TableSummary {
            rows: self.rows.len(),
            page_breaks,
        }
    }

    fn continue_page(&self, state: &mut LayoutState) {
        state.break_page();
        if let Some(head) = &self.head {
            let head_cells = self.wrap_row(head, true);
            self.draw_head(state, &head_cells);
        }
    }

    fn head_height(&self) -> f64 {
        self.head
            .as_ref()
            .map(|head| self.row_height(&self.wrap_row(head, true)))
            .unwrap_or(0.0)
    }

    /// Body lines of one row that fit in `room`.
    fn lines_fitting(&self, room: f64) -> usize {
        let line_height = Font::line_height(self.style.font_size);
        let lines = (room - 2.0 * self.style.cell_padding) / line_height;
        lines.floor().max(0.0) as usize
    }

    fn font_for(&self, column: usize, head: bool) -> Font {
        if head || (column == 0 && self.style.bold_first_column) {
            Font::HelveticaBold
        } else {
            Font::Helvetica
        }
    }

    fn wrap_row(&self, row: &[String], head: bool) -> Vec<Vec<String>> {
        self.widths
            .iter()
            .enumerate()
            .map(|(column, width)| {
                let content = row.get(column).map(String::as_str).unwrap_or("");
                let inner = (width - 2.0 * self.style.cell_padding).max(1.0);
                let font = self.font_for(column, head);
                let lines = wrap_text(content, font, self.style.font_size, inner);
                if lines.is_empty() {
                    vec![String::new()]
                } else {
                    lines
                }
            })
            .collect()
    }

    fn row_height(&self, cells: &[Vec<String>]) -> f64 {
        let lines = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
        lines as f64 * Font::line_height(self.style.font_size) + 2.0 * self.style.cell_padding
    }

    fn draw_head(&self, state: &mut LayoutState, cells: &[Vec<String>]) {
        let height = self.row_height(cells);
        self.draw_row(state, cells, height, self.style.head_fill, self.style.head_text, true);
    }

    fn draw_row(
        &self,
        state: &mut LayoutState,
        cells: &[Vec<String>],
        height: f64,
        fill: Option<Rgb>,
        color: Rgb,
        head: bool,
    ) {
        let top = state.cursor();
        if let Some(fill) = fill {
            let width: f64 = self.widths.iter().sum();
            state.push(Block::fill_rect(self.x, top, width, height, fill));
        }

        let ascent = self.style.font_size * PT_TO_MM * 0.8;
        let mut x = self.x;
        for (column, (lines, width)) in cells.iter().zip(self.widths.iter()).enumerate() {
            if lines.iter().any(|line| !line.is_empty()) {
                state.push(Block::Text {
                    x: x + self.style.cell_padding,
                    y: top + self.style.cell_padding + ascent,
                    lines: lines.clone(),
                    font: self.font_for(column, head),
                    size: self.style.font_size,
                    color,
                    align: TextAlign::Left,
                    line_height: Font::line_height(self.style.font_size),
                });
            }
            x += width;
        }
        state.advance(height);
    }
}

/// Keeps the first `lines` lines of every cell and returns the remainder.
fn split_cells(cells: &mut [Vec<String>], lines: usize) -> Vec<Vec<String>> {
    cells
        .iter_mut()
        .map(|cell| {
            if cell.len() > lines {
                cell.split_off(lines)
            } else {
                Vec::new()
            }
        })
        .collect()
}
