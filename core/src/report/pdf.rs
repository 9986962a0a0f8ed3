//! Minimal PDF 1.4 writer for laid-out [`Document`]s.
//!
//! Only what the report needs: filled/stroked (rounded) rectangles, filled
//! triangles and text in the three standard fonts. Layout coordinates are
//! millimetres from the top-left corner; PDF user space is points from the
//! bottom-left, so every coordinate is flipped and scaled on the way out.

use crate::prelude::{Point, RenderError, RenderResult, Rgb};
use crate::report::layout::{Block, Document, Font, TextAlign};
use std::fmt::Write as _;

const MM_TO_PT: f64 = 72.0 / 25.4;
/// Bezier control distance for a quarter circle.
const KAPPA: f64 = 0.552_284_749_8;
const FONT_OBJECTS: [(&str, &str); 3] = [
    ("F1", "Helvetica"),
    ("F2", "Helvetica-Bold"),
    ("F3", "Courier"),
];

fn font_resource(font: Font) -> &'static str {
    match font {
        Font::Helvetica => "F1",
        Font::HelveticaBold => "F2",
        Font::Courier => "F3",
    }
}

/// WinAnsiEncoding code for `ch`, if the standard fonts can show it.
fn win_ansi_code(ch: char) -> Option<u8> {
    let code = match ch {
        ' '..='~' | '\u{A0}'..='\u{FF}' => return u8::try_from(u32::from(ch)).ok(),
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        _ => return None,
    };
    Some(code)
}

/// Escapes a text run for a PDF literal string in WinAnsiEncoding. Codes
/// above ASCII are written as octal escapes; characters the encoding lacks
/// become `?`.
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match (ch, win_ansi_code(ch)) {
            ('(' | ')' | '\\', _) => {
                escaped.push('\\');
                escaped.push(ch);
            }
            ('\t', _) => escaped.push_str("  "),
            (_, Some(code)) if code.is_ascii() => escaped.push(char::from(code)),
            (_, Some(code)) => {
                let _ = write!(escaped, "\\{code:03o}");
            }
            (_, None) => escaped.push('?'),
        }
    }
    escaped
}

struct PageWriter {
    height_mm: f64,
    out: String,
}

impl PageWriter {
    fn x(&self, mm: f64) -> f64 {
        mm * MM_TO_PT
    }

    fn y(&self, mm: f64) -> f64 {
        (self.height_mm - mm) * MM_TO_PT
    }

    fn fill_color(&mut self, color: Rgb) -> std::fmt::Result {
        let (r, g, b) = color.unit();
        writeln!(self.out, "{r:.3} {g:.3} {b:.3} rg")
    }

    fn stroke_color(&mut self, color: Rgb) -> std::fmt::Result {
        let (r, g, b) = color.unit();
        writeln!(self.out, "{r:.3} {g:.3} {b:.3} RG")
    }

    fn move_to(&mut self, p: Point) -> std::fmt::Result {
        writeln!(self.out, "{:.2} {:.2} m", self.x(p.x), self.y(p.y))
    }

    fn line_to(&mut self, p: Point) -> std::fmt::Result {
        writeln!(self.out, "{:.2} {:.2} l", self.x(p.x), self.y(p.y))
    }

    fn curve_to(&mut self, c1: Point, c2: Point, p: Point) -> std::fmt::Result {
        writeln!(
            self.out,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
            self.x(c1.x),
            self.y(c1.y),
            self.x(c2.x),
            self.y(c2.y),
            self.x(p.x),
            self.y(p.y)
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radius: f64,
        fill: Option<Rgb>,
        stroke: Option<Rgb>,
    ) -> std::fmt::Result {
        let operator = match (fill, stroke) {
            (Some(_), Some(_)) => "B",
            (Some(_), None) => "f",
            (None, Some(_)) => "S",
            (None, None) => return Ok(()),
        };
        if let Some(color) = fill {
            self.fill_color(color)?;
        }
        if let Some(color) = stroke {
            self.stroke_color(color)?;
        }

        let r = radius.min(width / 2.0).min(height / 2.0).max(0.0);
        if r == 0.0 {
            writeln!(
                self.out,
                "{:.2} {:.2} {:.2} {:.2} re",
                self.x(x),
                self.y(y + height),
                width * MM_TO_PT,
                height * MM_TO_PT
            )?;
        } else {
            let k = r * KAPPA;
            let (right, bottom) = (x + width, y + height);
            self.move_to(Point::new(x + r, y))?;
            self.line_to(Point::new(right - r, y))?;
            self.curve_to(
                Point::new(right - r + k, y),
                Point::new(right, y + r - k),
                Point::new(right, y + r),
            )?;
            self.line_to(Point::new(right, bottom - r))?;
            self.curve_to(
                Point::new(right, bottom - r + k),
                Point::new(right - r + k, bottom),
                Point::new(right - r, bottom),
            )?;
            self.line_to(Point::new(x + r, bottom))?;
            self.curve_to(
                Point::new(x + r - k, bottom),
                Point::new(x, bottom - r + k),
                Point::new(x, bottom - r),
            )?;
            self.line_to(Point::new(x, y + r))?;
            self.curve_to(
                Point::new(x, y + r - k),
                Point::new(x + r - k, y),
                Point::new(x + r, y),
            )?;
            writeln!(self.out, "h")?;
        }
        writeln!(self.out, "{operator}")
    }

    fn triangle(&mut self, points: &[Point; 3], fill: Rgb) -> std::fmt::Result {
        self.fill_color(fill)?;
        self.move_to(points[0])?;
        self.line_to(points[1])?;
        self.line_to(points[2])?;
        writeln!(self.out, "h f")
    }

    #[allow(clippy::too_many_arguments)]
    fn text(
        &mut self,
        x: f64,
        y: f64,
        lines: &[String],
        font: Font,
        size: f64,
        color: Rgb,
        align: TextAlign,
        line_height: f64,
    ) -> std::fmt::Result {
        self.fill_color(color)?;
        for (idx, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let width = font.text_width(line, size);
            let left = match align {
                TextAlign::Left => x,
                TextAlign::Center => x - width / 2.0,
                TextAlign::Right => x - width,
            };
            let baseline = y + idx as f64 * line_height;
            writeln!(
                self.out,
                "BT /{} {:.1} Tf {:.2} {:.2} Td ({}) Tj ET",
                font_resource(font),
                size,
                self.x(left),
                self.y(baseline),
                escape_text(line)
            )?;
        }
        Ok(())
    }

    fn block(&mut self, block: &Block) -> std::fmt::Result {
        match block {
            Block::Rect {
                x,
                y,
                width,
                height,
                radius,
                fill,
                stroke,
            } => self.rect(*x, *y, *width, *height, *radius, *fill, *stroke),
            Block::Triangle { points, fill } => self.triangle(points, *fill),
            Block::Text {
                x,
                y,
                lines,
                font,
                size,
                color,
                align,
                line_height,
            } => self.text(*x, *y, lines, *font, *size, *color, *align, *line_height),
        }
    }
}

/// Serializes a document to PDF bytes.
pub fn encode_pdf(document: &Document, title: &str) -> RenderResult<Vec<u8>> {
    let to_encoding = |_| RenderError::Encoding("formatting PDF content".into());
    let setup = &document.setup;
    let page_count = document.pages.len();

    // 1 catalog, 2 page tree, 3..=5 fonts, then a (page, content) pair per page, then info.
    let first_page_object = 3 + FONT_OBJECTS.len();
    let info_object = first_page_object + 2 * page_count;
    let mut objects: Vec<String> = Vec::with_capacity(info_object);

    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
    let kids = (0..page_count)
        .map(|idx| format!("{} 0 R", first_page_object + 2 * idx))
        .collect::<Vec<_>>()
        .join(" ");
    objects.push(format!("<< /Type /Pages /Kids [{kids}] /Count {page_count} >>"));
    for (_, base_font) in FONT_OBJECTS {
        objects.push(format!(
            "<< /Type /Font /Subtype /Type1 /BaseFont /{base_font} /Encoding /WinAnsiEncoding >>"
        ));
    }

    let font_dict = FONT_OBJECTS
        .iter()
        .enumerate()
        .map(|(idx, (name, _))| format!("/{name} {} 0 R", 3 + idx))
        .collect::<Vec<_>>()
        .join(" ");

    for (idx, page) in document.pages.iter().enumerate() {
        let mut writer = PageWriter {
            height_mm: setup.height,
            out: String::from("0.57 w\n"),
        };
        for block in &page.blocks {
            writer.block(block).map_err(to_encoding)?;
        }
        let content = writer.out;
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] /Resources << /Font << {} >> >> /Contents {} 0 R >>",
            setup.width * MM_TO_PT,
            setup.height * MM_TO_PT,
            font_dict,
            first_page_object + 2 * idx + 1
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}endstream",
            content.len(),
            content
        ));
    }
    objects.push(format!(
        "<< /Title ({}) /Producer (codeiq) >>",
        escape_text(title)
    ));

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (idx, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        write!(out, "{} 0 obj\n{}\nendobj\n", idx + 1, body).map_err(to_encoding)?;
    }

    let xref_offset = out.len();
    write!(out, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).map_err(to_encoding)?;
    for offset in &offsets {
        write!(out, "{offset:010} 00000 n \n").map_err(to_encoding)?;
    }
    write!(
        out,
        "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        info_object + 1,
        xref_offset
    )
    .map_err(to_encoding)?;

    Ok(out.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::layout::{LayoutState, PageKind, PageSetup};

    fn two_page_document() -> Document {
        let mut state = LayoutState::new(PageSetup::default());
        state.start_page(PageKind::Cover, 20.0);
        state.push(Block::fill_rect(0.0, 0.0, 210.0, 40.0, Rgb::new(59, 130, 246)));
        state.push(Block::text(20.0, 25.0, "Report (draft)", Font::Helvetica, 24.0, Rgb::WHITE));
        state.start_page(PageKind::SeverityChart, 20.0);
        state.push(Block::Triangle {
            points: [
                Point::new(70.0, 80.0),
                Point::new(100.0, 80.0),
                Point::new(70.0, 110.0),
            ],
            fill: Rgb::new(239, 68, 68),
        });
        state.finish()
    }

    #[test]
    fn escapes_delimiters_and_encodes_win_ansi() {
        assert_eq!(escape_text("a(b)\\c"), "a\\(b\\)\\\\c");
        assert_eq!(escape_text("Caf\u{e9}"), "Caf\\351");
        assert_eq!(escape_text("users\u{2019} data"), "users\\222 data");
        assert_eq!(escape_text("\u{20AC}5 \u{2014} ok"), "\\2005 \\227 ok");
        assert_eq!(escape_text("\u{4E2D}\u{1F512}"), "??");
    }

    #[test]
    fn latin_text_survives_into_content_stream() {
        let mut state = LayoutState::new(PageSetup::default());
        state.start_page(PageKind::Cover, 20.0);
        state.push(Block::text(
            20.0,
            60.0,
            "Project: Caf\u{e9} \u{dc}ber",
            Font::Helvetica,
            14.0,
            Rgb::BLACK,
        ));
        let bytes = encode_pdf(&state.finish(), "Caf\u{e9}").unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("(Project: Caf\\351 \\334ber) Tj"));
        assert!(text.contains("/Title (Caf\\351)"));
        assert!(!text.contains("Caf?"));
    }

    #[test]
    fn pdf_has_header_pages_and_valid_xref() {
        let bytes = encode_pdf(&two_page_document(), "Security Scan Report").unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("%PDF-1.4\n"));
        assert!(text.ends_with("%%EOF\n"));
        assert!(text.contains("/Count 2"));
        assert!(text.contains("(Report \\(draft\\)) Tj"));

        let startxref = text.rfind("startxref\n").unwrap();
        let offset: usize = text[startxref + 10..]
            .lines()
            .next()
            .unwrap()
            .parse()
            .unwrap();
        assert!(text[offset..].starts_with("xref\n"));

        let first_entry = text[offset..].lines().nth(3).unwrap();
        let object_offset: usize = first_entry[..10].parse().unwrap();
        assert!(text[object_offset..].starts_with("1 0 obj"));
    }

    #[test]
    fn flips_y_axis_into_points() {
        let bytes = encode_pdf(&two_page_document(), "t").unwrap();
        let text = String::from_utf8(bytes).unwrap();
        // Top band: y = 297 - 40 = 257mm -> 728.50pt, height 113.39pt.
        assert!(text.contains("0.00 728.50 595.28 113.39 re"));
    }
}
