use crate::math::geometry::{sector_fan, slice_angles, SliceSpan, ORIGIN_RIGHT};
use crate::model::scan::{IssueRecord, ScanReport, Severity, SeverityCount};
use crate::palette::{SeverityPalette, BRAND_BLUE, PANEL_FILL};
use crate::prelude::{Point, Rgb};
use crate::report::layout::{Block, Document, Font, LayoutState, PageKind, PageSetup, TextAlign};
use crate::report::table::{Table, TableStyle};
use crate::report::text::{group_thousands, wrap_code, wrap_text};
use crate::telemetry::log::LogManager;

pub const REPORT_TITLE: &str = "Security Scan Report";

const COVER_BAND_HEIGHT: f64 = 40.0;
const DETAIL_BAND_HEIGHT: f64 = 30.0;
const TITLE_FONT_SIZE: f64 = 16.0;
const HEADING_GAP: f64 = 10.0;
const SECTION_GAP: f64 = 10.0;
const CODE_BOX_MIN_HEIGHT: f64 = 60.0;
const CODE_BOX_PADDING: f64 = 12.0;
const CODE_FONT_SIZE: f64 = 10.0;
const BODY_FONT_SIZE: f64 = 12.0;
const LEGEND_STEP: f64 = 15.0;

const INK: Rgb = Rgb::BLACK;
const MUTED: Rgb = Rgb::new(100, 116, 139);
const CODE_BORDER: Rgb = Rgb::new(203, 213, 225);

/// One drawn slice of the report's severity pie.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieSlice {
    pub severity: Severity,
    pub count: u32,
    pub color: Rgb,
    pub span: SliceSpan,
}

/// Severity slices starting at 3 o'clock, clockwise, in the fixed severity
/// order. Zero counts are left out; a zero total yields no slices.
pub fn severity_pie(counts: &SeverityCount, palette: &SeverityPalette) -> Vec<PieSlice> {
    let values: Vec<f64> = counts.iter().map(|(_, count)| f64::from(count)).collect();
    slice_angles(&values, ORIGIN_RIGHT)
        .into_iter()
        .zip(counts.iter())
        .filter(|(_, (_, count))| *count > 0)
        .map(|(span, (severity, count))| PieSlice {
            severity,
            count,
            color: palette.color(severity),
            span,
        })
        .collect()
}

/// Legend lines for the severity pie; every severity keeps its row, zero or not.
pub fn severity_legend(counts: &SeverityCount) -> Vec<String> {
    counts
        .iter()
        .map(|(severity, count)| format!("{}: {}", severity.label(), count))
        .collect()
}

/// Lays a [`ScanReport`] out as cover, severity chart, issue index and one
/// detail section per issue.
pub struct ReportGenerator {
    setup: PageSetup,
    palette: SeverityPalette,
    logger: LogManager,
}

impl ReportGenerator {
    pub fn new(setup: PageSetup, palette: SeverityPalette) -> Self {
        Self {
            setup,
            palette,
            logger: LogManager::new("report"),
        }
    }

    pub fn setup(&self) -> &PageSetup {
        &self.setup
    }

    pub fn generate(&self, report: &ScanReport) -> Document {
        let mut state = LayoutState::new(self.setup.clone());

        self.cover_page(&mut state, report);
        self.severity_page(&mut state, &report.issues_by_severity);
        self.index_page(&mut state, &report.issues);
        for issue in &report.issues {
            self.detail_page(&mut state, issue);
        }

        let document = state.finish();
        self.logger.record(&format!(
            "report for {} -> {} pages ({} overflow)",
            report.project_name,
            document.page_count(),
            document.overflow_breaks
        ));
        document
    }

    fn cover_page(&self, state: &mut LayoutState, report: &ScanReport) {
        let width = self.setup.width;
        let margin = self.setup.margin;
        state.start_page(PageKind::Cover, margin);

        state.push(Block::fill_rect(0.0, 0.0, width, COVER_BAND_HEIGHT, BRAND_BLUE));
        state.push(Block::text(margin, 25.0, REPORT_TITLE, Font::Helvetica, 24.0, Rgb::WHITE));
        state.push(Block::Text {
            x: width - margin,
            y: 25.0,
            lines: vec![report.completed_at.format("%-m/%-d/%Y").to_string()],
            font: Font::Helvetica,
            size: 12.0,
            color: Rgb::WHITE,
            align: TextAlign::Right,
            line_height: Font::line_height(12.0),
        });

        let box_top = COVER_BAND_HEIGHT + 10.0;
        state.push(Block::Rect {
            x: margin,
            y: box_top,
            width: self.setup.content_width(),
            height: 40.0,
            radius: 3.0,
            fill: Some(PANEL_FILL),
            stroke: Some(BRAND_BLUE),
        });
        state.push(Block::text(
            margin + 10.0,
            box_top + 15.0,
            format!("Project: {}", report.project_name),
            Font::Helvetica,
            14.0,
            INK,
        ));
        state.push(Block::text(
            margin + 10.0,
            box_top + 30.0,
            format!("Security Score: {}/100", report.security_score),
            Font::Helvetica,
            14.0,
            INK,
        ));

        state.set_cursor(box_top + 50.0);
        let half = self.setup.content_width() / 2.0;
        Table::new(vec![half, half], margin, TableStyle::striped())
            .with_head(["Metric", "Value"])
            .with_rows(vec![
                vec!["Files Scanned".into(), report.files_scanned.to_string()],
                vec!["Lines of Code".into(), group_thousands(report.lines_of_code)],
                vec!["Scan Duration".into(), format!("{} seconds", report.duration)],
                vec!["Total Issues".into(), report.total_issues().to_string()],
            ])
            .layout(state);
    }

    fn severity_page(&self, state: &mut LayoutState, counts: &SeverityCount) {
        let margin = self.setup.margin;
        state.start_page(PageKind::SeverityChart, margin);

        state.push(Block::text(
            margin,
            margin + 10.0,
            "Issues by Severity",
            Font::Helvetica,
            16.0,
            INK,
        ));
        let chart_top = margin + 20.0;
        let radius = self.setup.pie_radius;
        let center = Point::new(margin + 50.0, chart_top + 10.0 + radius);

        let slices = severity_pie(counts, &self.palette);
        if slices.is_empty() {
            self.logger.trace("no findings, pie chart left empty");
            state.push(Block::Text {
                x: center.x,
                y: center.y,
                lines: vec!["No issues found".into()],
                font: Font::Helvetica,
                size: BODY_FONT_SIZE,
                color: MUTED,
                align: TextAlign::Center,
                line_height: Font::line_height(BODY_FONT_SIZE),
            });
        }
        for slice in &slices {
            for points in sector_fan(center, radius, slice.span, self.setup.pie_segments) {
                state.push(Block::Triangle {
                    points,
                    fill: slice.color,
                });
            }
        }

        let legend_x = margin + 100.0;
        let mut legend_y = chart_top;
        for ((severity, _), line) in counts.iter().zip(severity_legend(counts)) {
            state.push(Block::fill_rect(
                legend_x,
                legend_y + 4.0,
                4.0,
                4.0,
                self.palette.color(severity),
            ));
            state.push(Block::text(
                legend_x + 7.0,
                legend_y + 8.0,
                line,
                Font::Helvetica,
                14.0,
                INK,
            ));
            legend_y += LEGEND_STEP;
        }

        state.set_cursor(center.y + radius + SECTION_GAP);
    }

    fn index_page(&self, state: &mut LayoutState, issues: &[IssueRecord]) {
        let margin = self.setup.margin;
        state.start_page(PageKind::IssueIndex, margin);
        state.push(Block::text(
            margin,
            margin + 5.0,
            "Detailed Issues",
            Font::Helvetica,
            16.0,
            INK,
        ));
        state.set_cursor(margin + 12.0);

        let content = self.setup.content_width();
        let rows = issues
            .iter()
            .map(|issue| {
                vec![
                    issue.severity.upper().to_string(),
                    issue.title.clone(),
                    issue.location(),
                    issue.status.to_string(),
                ]
            })
            .collect();
        Table::new(
            vec![content * 0.15, content * 0.44, content * 0.26, content * 0.15],
            margin,
            TableStyle::striped(),
        )
        .with_head(["Severity", "Issue", "Location", "Status"])
        .with_rows(rows)
        .layout(state);
    }

    fn detail_page(&self, state: &mut LayoutState, issue: &IssueRecord) {
        let width = self.setup.width;
        let margin = self.setup.margin;
        state.start_page(
            PageKind::IssueDetail {
                issue_id: issue.id.clone(),
            },
            margin,
        );

        let line_height = self.setup.line_height;
        let mut title_lines =
            wrap_text(&issue.title, Font::Helvetica, TITLE_FONT_SIZE, self.setup.text_wrap);
        // The band never reaches past the printable bottom; the rest of the
        // title continues below it.
        let band_room = self.setup.printable_bottom() - DETAIL_BAND_HEIGHT;
        let band_capacity = (band_room / line_height).floor().max(0.0) as usize + 1;
        let title_rest = title_lines.split_off(band_capacity.min(title_lines.len()));
        let band = DETAIL_BAND_HEIGHT + title_lines.len().saturating_sub(1) as f64 * line_height;
        state.push(Block::fill_rect(0.0, 0.0, width, band, BRAND_BLUE));
        state.push(Block::Text {
            x: margin,
            y: 20.0,
            lines: title_lines,
            font: Font::Helvetica,
            size: TITLE_FONT_SIZE,
            color: Rgb::WHITE,
            align: TextAlign::Left,
            line_height,
        });

        state.set_cursor(band + 10.0);
        if !title_rest.is_empty() {
            self.flow_lines(state, None, &title_rest, Font::HelveticaBold, TITLE_FONT_SIZE);
            state.advance(SECTION_GAP);
        }
        Table::new(vec![40.0, self.setup.content_width() - 40.0], margin, TableStyle::plain())
            .with_rows(vec![
                vec!["Severity".into(), issue.severity.upper().into()],
                vec!["Type".into(), issue.issue_type.clone()],
                vec!["Status".into(), issue.status.to_string()],
                vec!["Location".into(), issue.location()],
            ])
            .layout(state);
        state.advance(SECTION_GAP);

        for (heading, body) in [
            ("Description", &issue.description),
            ("Impact", &issue.impact),
            ("Recommendation", &issue.recommendation),
        ] {
            let lines = wrap_text(body, Font::Helvetica, BODY_FONT_SIZE, self.setup.text_wrap);
            self.text_section(state, heading, lines);
        }

        self.code_block(state, &issue.code_snippet);

        if !issue.references.is_empty() {
            let lines = issue
                .references
                .iter()
                .flat_map(|reference| {
                    wrap_text(
                        &format!("{} - {}", reference.title, reference.url),
                        Font::Helvetica,
                        BODY_FONT_SIZE,
                        self.setup.text_wrap,
                    )
                })
                .collect();
            self.text_section(state, "References", lines);
        }
    }

    /// Heading plus wrapped body lines. The section moves to a new page when it
    /// does not fit; only a section taller than a whole page is split.
    fn text_section(&self, state: &mut LayoutState, heading: &str, lines: Vec<String>) {
        state.ensure_room(HEADING_GAP + lines.len() as f64 * self.setup.line_height);
        self.flow_lines(state, Some(heading), &lines, Font::Helvetica, BODY_FONT_SIZE);
        state.advance(SECTION_GAP);
    }

    /// Places `lines` from the cursor down, continuing on new pages as needed.
    fn flow_lines(
        &self,
        state: &mut LayoutState,
        mut heading: Option<&str>,
        lines: &[String],
        font: Font,
        size: f64,
    ) {
        let margin = self.setup.margin;
        let line_height = self.setup.line_height;
        let mut remaining = lines;
        loop {
            let heading_height = if heading.is_some() { HEADING_GAP } else { 0.0 };
            let fit = ((state.room() - heading_height) / line_height).floor().max(0.0) as usize;
            let fresh = state.room() >= state.fresh_page_room();
            if fit == 0 && !fresh && !remaining.is_empty() {
                state.break_page();
                continue;
            }
            let take = fit.max(1).min(remaining.len());

            if let Some(text) = heading.take() {
                let top = state.cursor();
                state.push(Block::text(margin, top, text, Font::HelveticaBold, 14.0, INK));
            }
            if take > 0 {
                state.push(Block::Text {
                    x: margin,
                    y: state.cursor() + heading_height,
                    lines: remaining[..take].to_vec(),
                    font,
                    size,
                    color: INK,
                    align: TextAlign::Left,
                    line_height,
                });
            }
            state.advance(heading_height + take as f64 * line_height);

            remaining = &remaining[take..];
            if remaining.is_empty() {
                break;
            }
            state.break_page();
        }
    }

    fn code_block(&self, state: &mut LayoutState, snippet: &str) {
        let margin = self.setup.margin;
        let line_height = self.setup.code_line_height;
        let lines = wrap_code(snippet, Font::Courier, CODE_FONT_SIZE, self.setup.code_wrap);
        let box_height = |count: usize| {
            (count as f64 * line_height + CODE_BOX_PADDING).max(CODE_BOX_MIN_HEIGHT)
        };

        state.ensure_room(box_height(lines.len()));

        let mut remaining = lines.as_slice();
        loop {
            let room = ((state.room() - CODE_BOX_PADDING) / line_height).floor().max(1.0) as usize;
            let take = room.min(remaining.len());
            let height = if take == remaining.len() {
                box_height(take)
            } else {
                take as f64 * line_height + CODE_BOX_PADDING
            };
            let top = state.cursor();

            state.push(Block::Rect {
                x: margin,
                y: top,
                width: self.setup.content_width(),
                height,
                radius: 3.0,
                fill: Some(PANEL_FILL),
                stroke: Some(CODE_BORDER),
            });
            if take > 0 {
                state.push(Block::Text {
                    x: margin + 5.0,
                    y: top + 10.0,
                    lines: remaining[..take].to_vec(),
                    font: Font::Courier,
                    size: CODE_FONT_SIZE,
                    color: INK,
                    align: TextAlign::Left,
                    line_height,
                });
            }
            state.advance(height);

            remaining = &remaining[take..];
            if remaining.is_empty() {
                break;
            }
            state.break_page();
        }
        state.advance(SECTION_GAP);
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new(PageSetup::default(), SeverityPalette::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::score::Score;
    use crate::model::scan::{IssueReference, IssueStatus};
    use chrono::{TimeZone, Utc};
    use std::f64::consts::TAU;

    fn issue(id: &str, severity: Severity) -> IssueRecord {
        IssueRecord {
            id: id.into(),
            file_id: "file1".into(),
            file_path: "src/services/api.js".into(),
            line_number: 27,
            title: "Hard-coded API Key".into(),
            description: "An API key is hard-coded directly in the source code.".into(),
            severity,
            issue_type: "API Security".into(),
            status: IssueStatus::Open,
            code_snippet: "const key = 'a1b2c3';".into(),
            impact: "Anyone can extract the key.".into(),
            recommendation: "Move the key to the server.".into(),
            references: vec![IssueReference {
                title: "OWASP Secure Coding Practices".into(),
                url: "https://owasp.org".into(),
            }],
        }
    }

    fn report(issues: Vec<IssueRecord>, counts: SeverityCount) -> ScanReport {
        ScanReport {
            id: "scan123".into(),
            project_id: "101".into(),
            project_name: "E-commerce Frontend".into(),
            scan_type: "Full Scan".into(),
            language: "JavaScript".into(),
            status: "Completed".into(),
            started_at: Utc.with_ymd_and_hms(2023, 8, 15, 12, 20, 45).unwrap(),
            completed_at: Utc.with_ymd_and_hms(2023, 8, 15, 12, 30, 45).unwrap(),
            duration: 10,
            security_score: Score::saturating(82),
            files_scanned: 45,
            lines_of_code: 12500,
            issues_by_severity: counts,
            issues,
        }
    }

    #[test]
    fn page_count_is_three_plus_issues() {
        let issues = vec![
            issue("issue1", Severity::High),
            issue("issue2", Severity::Low),
            issue("issue3", Severity::Critical),
        ];
        let counts = SeverityCount::from_issues(&issues);
        let document = ReportGenerator::default().generate(&report(issues, counts));

        assert_eq!(document.page_count(), 6);
        assert_eq!(document.overflow_breaks, 0);
        assert_eq!(document.pages[0].kind, PageKind::Cover);
        assert_eq!(document.pages[1].kind, PageKind::SeverityChart);
        assert_eq!(document.pages[2].kind, PageKind::IssueIndex);
        assert_eq!(
            document.pages[5].kind,
            PageKind::IssueDetail {
                issue_id: "issue3".into()
            }
        );
    }

    #[test]
    fn zero_issues_yield_empty_index_and_no_detail_pages() {
        let document =
            ReportGenerator::default().generate(&report(Vec::new(), SeverityCount::default()));
        assert_eq!(document.page_count(), 3);
        assert_eq!(document.pages[1].triangles().count(), 0);
        assert!(document.pages[1].text_lines().any(|line| line == "No issues found"));
        let index: Vec<_> = document.pages[2].text_lines().collect();
        assert_eq!(index, vec!["Detailed Issues", "Severity", "Issue", "Location", "Status"]);
    }

    #[test]
    fn cover_summary_rows() {
        let counts = SeverityCount::new(0, 3, 2, 3);
        let document = ReportGenerator::default().generate(&report(Vec::new(), counts));
        let lines: Vec<_> = document.pages[0].text_lines().collect();
        assert!(lines.contains(&"8/15/2023"));
        assert!(lines.contains(&"Project: E-commerce Frontend"));
        assert!(lines.contains(&"Security Score: 82/100"));
        assert!(lines.contains(&"12,500"));
        assert!(lines.contains(&"10 seconds"));
        let total = lines.iter().position(|line| *line == "Total Issues").unwrap();
        assert_eq!(lines[total + 1], "8");
    }

    #[test]
    fn zero_count_severities_skip_the_pie_but_keep_legend_rows() {
        let counts = SeverityCount::new(1, 2, 0, 0);
        let slices = severity_pie(&counts, &SeverityPalette::default());
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].severity, Severity::Critical);
        assert_eq!(slices[1].span.end, TAU);

        assert_eq!(
            severity_legend(&counts),
            vec!["Critical: 1", "High: 2", "Medium: 0", "Low: 0"]
        );

        let document = ReportGenerator::default().generate(&report(Vec::new(), counts));
        let chart = &document.pages[1];
        assert_eq!(chart.triangles().count(), 2 * 32);
        let legend: Vec<_> = chart.text_lines().skip(1).collect();
        assert_eq!(legend, vec!["Critical: 1", "High: 2", "Medium: 0", "Low: 0"]);
    }

    #[test]
    fn pie_spans_follow_fixed_order_from_zero() {
        let slices = severity_pie(&SeverityCount::new(0, 3, 2, 3), &SeverityPalette::default());
        let order: Vec<_> = slices.iter().map(|slice| slice.severity).collect();
        assert_eq!(order, vec![Severity::High, Severity::Medium, Severity::Low]);
        assert_eq!(slices[0].span.start, 0.0);
        assert!((slices[0].span.end - 3.0 / 8.0 * TAU).abs() < 1e-12);
        assert!((slices[1].span.sweep() - 2.0 / 8.0 * TAU).abs() < 1e-12);
        assert!((slices[2].span.sweep() - 3.0 / 8.0 * TAU).abs() < 1e-12);
        assert_eq!(slices[0].color, Rgb::from_u32(0xF97316));
    }

    #[test]
    fn index_rows_keep_report_order() {
        let issues = vec![issue("b", Severity::Low), issue("a", Severity::Critical)];
        let counts = SeverityCount::from_issues(&issues);
        let document = ReportGenerator::default().generate(&report(issues, counts));
        let severities: Vec<_> = document.pages[2]
            .text_lines()
            .filter(|line| *line == "LOW" || *line == "CRITICAL")
            .collect();
        assert_eq!(severities, vec!["LOW", "CRITICAL"]);
        assert!(document.pages[2]
            .text_lines()
            .any(|line| line == "src/services/api.js:27" || line.starts_with("src/services/")));
    }

    #[test]
    fn detail_page_sections_in_order() {
        let issues = vec![issue("issue2", Severity::High)];
        let counts = SeverityCount::from_issues(&issues);
        let document = ReportGenerator::default().generate(&report(issues, counts));
        let lines: Vec<_> = document.pages[3].text_lines().collect();
        let position = |needle: &str| lines.iter().position(|line| *line == needle).unwrap();
        assert_eq!(lines[0], "Hard-coded API Key");
        assert!(position("HIGH") < position("Description"));
        assert!(position("Description") < position("Impact"));
        assert!(position("Impact") < position("Recommendation"));
        assert!(position("Recommendation") < position("const key = 'a1b2c3';"));
        assert!(position("const key = 'a1b2c3';") < position("References"));
    }

    #[test]
    fn long_content_overflows_onto_continuation_pages() {
        let mut long = issue("issue1", Severity::Critical);
        long.description = "word ".repeat(900);
        long.code_snippet = "let x = 1;\n".repeat(30);
        let counts = SeverityCount::from_issues(std::slice::from_ref(&long));
        let document = ReportGenerator::default().generate(&report(vec![long], counts));

        assert!(document.page_count() > 4);
        assert_eq!(document.page_count(), 4 + document.overflow_breaks);
        let section = PageKind::IssueDetail {
            issue_id: "issue1".into(),
        };
        assert_eq!(
            document.pages_in_section(&section).count(),
            1 + document.overflow_breaks
        );
        let code_lines = document
            .pages_in_section(&section)
            .flat_map(|page| page.text_lines())
            .filter(|line| *line == "let x = 1;")
            .count();
        assert_eq!(code_lines, 30);
    }

    fn assert_within_page(document: &Document) {
        let bottom = document.setup.printable_bottom();
        for (index, page) in document.pages.iter().enumerate() {
            for block in &page.blocks {
                assert!(
                    block.bottom() <= bottom && block.bottom() <= document.setup.height,
                    "page {index} block reaches {}",
                    block.bottom()
                );
            }
        }
    }

    #[test]
    fn oversized_title_never_runs_past_the_page() {
        let mut long = issue("issue1", Severity::Critical);
        long.title = "vulnerability ".repeat(300);
        let counts = SeverityCount::from_issues(std::slice::from_ref(&long));
        let document = ReportGenerator::default().generate(&report(vec![long], counts));

        assert_within_page(&document);
        assert!(document.pages[2].text_lines().any(|line| line == "CRITICAL"));
        assert!(document.pages[2]
            .text_lines()
            .any(|line| line.starts_with("vulnerability")));

        let section = PageKind::IssueDetail {
            issue_id: "issue1".into(),
        };
        let title_words: usize = document
            .pages_in_section(&section)
            .flat_map(|page| page.text_lines())
            .map(|line| line.split_whitespace().filter(|word| *word == "vulnerability").count())
            .sum();
        assert_eq!(title_words, 300);
        assert_eq!(document.page_count(), 4 + document.overflow_breaks);
    }

    #[test]
    fn code_block_moves_whole_to_a_fresh_page() {
        let mut long = issue("issue1", Severity::High);
        long.description = "word ".repeat(400);
        long.code_snippet = "let x = 1;\n".repeat(30);
        let counts = SeverityCount::from_issues(std::slice::from_ref(&long));
        let document = ReportGenerator::default().generate(&report(vec![long], counts));
        assert_within_page(&document);

        let is_code_box = |block: &Block| {
            matches!(block, Block::Rect { stroke: Some(stroke), .. } if *stroke == CODE_BORDER)
        };
        let code_pages: Vec<usize> = document
            .pages
            .iter()
            .enumerate()
            .filter(|(_, page)| page.blocks.iter().any(is_code_box))
            .map(|(index, _)| index)
            .collect();
        assert_eq!(code_pages.len(), 1);

        let page = &document.pages[code_pages[0]];
        assert!(code_pages[0] > 3);
        assert!(matches!(page.kind, PageKind::Continuation { .. }));
        assert_eq!(page.blocks.iter().filter(|block| is_code_box(block)).count(), 1);
        assert_eq!(page.text_lines().filter(|line| *line == "let x = 1;").count(), 30);
        assert!(document.pages[code_pages[0] - 1]
            .text_lines()
            .any(|line| line == "Recommendation"));
    }
}
