use chrono::Local;
use codeiqcore::math::Score;
use codeiqcore::model::{ChartDataset, DashboardStats, RecentScan, ScanReport};
use codeiqcore::palette::{score_color, ChartTheme, SeverityPalette};
use codeiqcore::prelude::{DrawingSurface, LineCap, TextAnchor, TextRun};
use codeiqcore::render::donut::DONUT_SIZE;
use codeiqcore::render::{DonutChart, FrameRequest, GaugeSize, RadialGauge};
use codeiqcore::report::{OutputFormat, ReportGenerator};
use codeiqcore::source::{MockDataSource, ScanDataSource};
use codeiqcore::telemetry::LogManager;
use codeiqcore::Rgb;
use iced::{
    font, mouse, time,
    time::Instant,
    widget::{
        button,
        canvas::{self, path, Canvas, Frame, Geometry, Path, Stroke},
        column, row, scrollable, text, Column, Container,
    },
    Alignment, Color, Element, Font, Length, Pixels, Point, Radians, Rectangle, Renderer,
    Subscription, Task, Theme,
};
use std::{sync::Arc, time::Duration};

const FRAME_INTERVAL: Duration = Duration::from_millis(16);
const HISTORY_LIMIT: usize = 20;
const INDEX_ROWS: usize = 12;
const DEFAULT_SCAN: &str = "scan123";

fn main() -> iced::Result {
    env_logger::init();
    iced::application(Dashboard::boot, Dashboard::update, Dashboard::view)
        .title(application_title)
        .subscription(application_subscription)
        .theme(application_theme)
        .run()
}

fn application_title(_: &Dashboard) -> String {
    "CodeIQ Security Dashboard".into()
}

/// Frame ticks only flow while a gauge is animating.
fn application_subscription(state: &Dashboard) -> Subscription<Message> {
    if state.animation.is_some() || state.scan_animation.is_some() {
        time::every(FRAME_INTERVAL).map(Message::Frame)
    } else {
        Subscription::none()
    }
}

fn application_theme(_: &Dashboard) -> Theme {
    Theme::Dark
}

fn to_color(rgb: Rgb) -> Color {
    Color::from_rgb8(rgb.r, rgb.g, rgb.b)
}

struct Dashboard {
    source: Arc<MockDataSource>,
    palette: SeverityPalette,
    theme: ChartTheme,
    stats: Option<DashboardStats>,
    recent: Option<Vec<RecentScan>>,
    scan: Option<ScanReport>,
    gauge: RadialGauge,
    /// Generation and start instant of the running gauge animation.
    animation: Option<(u64, Instant)>,
    /// Medium gauge for the selected scan.
    scan_gauge: RadialGauge,
    scan_animation: Option<(u64, Instant)>,
    status: String,
    history: Vec<String>,
    logger: LogManager,
}

#[derive(Debug, Clone)]
enum Message {
    StatsFetched(Result<DashboardStats, String>),
    RecentScansFetched(Result<Vec<RecentScan>, String>),
    SelectScan(String),
    ScanFetched(Result<ScanReport, String>),
    Frame(Instant),
    Refresh,
    ExportReport,
    ReportExported(Result<String, String>),
}

impl Dashboard {
    fn boot() -> (Self, Task<Message>) {
        let source = Arc::new(MockDataSource::default());
        let theme = ChartTheme::Dark;
        let tasks = fetch_all(&source);
        (
            Dashboard {
                source,
                palette: SeverityPalette::default(),
                theme,
                stats: None,
                recent: None,
                scan: None,
                gauge: RadialGauge::new(GaugeSize::Large, theme),
                animation: None,
                scan_gauge: RadialGauge::new(GaugeSize::Medium, theme),
                scan_animation: None,
                status: "Loading dashboard...".into(),
                history: Vec::new(),
                logger: LogManager::new("visualizer"),
            },
            tasks,
        )
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::StatsFetched(Ok(stats)) => {
                state.start_gauge(stats.security_score);
                state.status = format!(
                    "Dashboard loaded: {} issues across {} files",
                    stats.total_issues, stats.scanned_files
                );
                state.push_history(format!("Stats: score {}", stats.security_score));
                state.stats = Some(stats);
                Task::none()
            }
            Message::StatsFetched(Err(err)) => {
                state.notice(format!("Could not load dashboard stats: {err}"));
                Task::none()
            }
            Message::RecentScansFetched(Ok(scans)) => {
                state.push_history(format!("Recent scans: {}", scans.len()));
                state.recent = Some(scans);
                Task::none()
            }
            Message::RecentScansFetched(Err(err)) => {
                state.notice(format!("Could not load recent scans: {err}"));
                Task::none()
            }
            Message::SelectScan(scan_id) => {
                state.status = format!("Loading scan {scan_id}...");
                Task::perform(fetch_scan(state.source.clone(), scan_id), Message::ScanFetched)
            }
            Message::ScanFetched(Ok(scan)) => {
                let generation = state.scan_gauge.set_target(scan.security_score);
                state.scan_animation = Some((generation, Instant::now()));
                state.status = format!("Showing scan {} ({})", scan.id, scan.project_name);
                state.push_history(format!(
                    "Scan {}: {} issues in {}",
                    scan.id,
                    scan.issues.len(),
                    scan.project_name
                ));
                state.scan = Some(scan);
                Task::none()
            }
            Message::ScanFetched(Err(err)) => {
                state.notice(format!("Could not load scan results: {err}"));
                Task::none()
            }
            Message::Frame(now) => {
                state.animation = advance_gauge(&mut state.gauge, state.animation, now);
                state.scan_animation =
                    advance_gauge(&mut state.scan_gauge, state.scan_animation, now);
                Task::none()
            }
            Message::Refresh => {
                state.status = "Refreshing...".into();
                fetch_all(&state.source)
            }
            Message::ExportReport => match &state.scan {
                Some(scan) => {
                    state.status = "Generating PDF report...".into();
                    Task::perform(
                        export_report(scan.clone(), state.palette.clone()),
                        Message::ReportExported,
                    )
                }
                None => {
                    state.notice("No scan loaded; nothing to export".into());
                    Task::none()
                }
            },
            Message::ReportExported(Ok(path)) => {
                state.status = format!("Report saved to {path}");
                state.push_history(format!("Exported {path}"));
                Task::none()
            }
            Message::ReportExported(Err(err)) => {
                state.notice(format!("Report export failed: {err}"));
                Task::none()
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let stat_line = match &state.stats {
            Some(stats) => text(format!(
                "Issues {} ({:+}) | Files {} ({:+}) | Resolved {} ({:+})",
                stats.total_issues,
                stats.total_issues_trend,
                stats.scanned_files,
                stats.scanned_files_trend,
                stats.resolved_issues,
                stats.resolved_issues_trend
            ))
            .size(16),
            None => text("Loading statistics...").size(16),
        };

        let gauge_size = state.gauge.config();
        let gauge = Canvas::new(GaugeView {
            gauge: &state.gauge,
        })
        .width(Length::Fixed(gauge_size.width as f32))
        .height(Length::Fixed(gauge_size.height as f32 + 40.0));

        let issue_types = state
            .stats
            .as_ref()
            .map(|stats| stats.issue_types.clone())
            .unwrap_or_default();
        let severity = state
            .scan
            .as_ref()
            .map(|scan| {
                ChartDataset::from_severity_counts(&scan.issues_by_severity, &state.palette)
            })
            .unwrap_or_default();

        let scan_size = state.scan_gauge.config();
        let scan_gauge = Canvas::new(GaugeView {
            gauge: &state.scan_gauge,
        })
        .width(Length::Fixed(scan_size.width as f32))
        .height(Length::Fixed(scan_size.height as f32 + 30.0));
        let scan_title = state
            .scan
            .as_ref()
            .map(|scan| scan.project_name.clone())
            .unwrap_or_else(|| "Selected Scan".into());

        let charts = row![
            column![text("Security Score").size(18), gauge].spacing(8),
            donut_panel("Issues by Type", issue_types, state.theme),
            donut_panel("Scan by Severity", severity, state.theme),
            column![text(scan_title).size(18), scan_gauge].spacing(8),
        ]
        .spacing(24)
        .align_y(Alignment::Start);

        let index = match &state.scan {
            Some(scan) if !scan.issues.is_empty() => scan.issues.iter().take(INDEX_ROWS).fold(
                Column::new().spacing(4),
                |col, issue| {
                    col.push(
                        text(format!(
                            "{:<8} {}  ({})  [{}]",
                            issue.severity.upper(),
                            issue.title,
                            issue.location(),
                            issue.status
                        ))
                        .size(12)
                        .color(to_color(state.palette.color(issue.severity))),
                    )
                },
            ),
            Some(_) => Column::new().push(text("No issues found").size(12)),
            None => Column::new().push(text("Waiting for scan results...").size(12)),
        };

        let recent = match &state.recent {
            Some(scans) if !scans.is_empty() => {
                scans.iter().fold(Column::new().spacing(2), |col, scan| {
                    col.push(
                        button(
                            text(format!(
                                "{}  {}  score {}  issues {}  {}",
                                scan.project_name,
                                scan.date.format("%b %-d, %Y"),
                                scan.security_score.value(),
                                scan.total_issues,
                                scan.status
                            ))
                            .size(12)
                            .color(to_color(score_color(scan.security_score))),
                        )
                        .style(button::text)
                        .padding(2)
                        .on_press(Message::SelectScan(scan.id.clone())),
                    )
                })
            }
            Some(_) => Column::new().push(text("No scans yet").size(12)),
            None => Column::new().push(text("Loading recent scans...").size(12)),
        };

        let history_list = if state.history.is_empty() {
            Column::new().push(text("No activity yet").size(12))
        } else {
            state
                .history
                .iter()
                .rev()
                .fold(Column::new().spacing(4), |col, entry| {
                    col.push(text(entry.clone()).size(12))
                })
        };

        let export = button("Export PDF report").padding(10).on_press_maybe(
            state.scan.as_ref().map(|_| Message::ExportReport),
        );

        let layout = column![
            text("Security Dashboard").size(26),
            stat_line,
            charts,
            text("Recent Scans").size(18),
            Container::new(scrollable(recent).height(Length::Fixed(110.0))).padding(6),
            text("Detailed Issues").size(18),
            Container::new(scrollable(index).height(Length::Fixed(180.0))).padding(6),
            row![
                button("Refresh").padding(10).on_press(Message::Refresh),
                export,
                text(&state.status).size(14),
            ]
            .spacing(12)
            .align_y(Alignment::Center),
            text("Activity log").size(16),
            Container::new(scrollable(history_list).height(Length::Fixed(90.0))).padding(6),
        ]
        .spacing(12)
        .padding(20);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn start_gauge(&mut self, score: Score) {
        let generation = self.gauge.set_target(score);
        self.animation = Some((generation, Instant::now()));
    }

    /// Transient, user-visible failure; the affected widget keeps its empty state.
    fn notice(&mut self, message: String) {
        self.logger.notice(&message);
        self.status = message.clone();
        self.push_history(message);
    }

    fn push_history(&mut self, entry: String) {
        self.history.push(entry);
        if self.history.len() > HISTORY_LIMIT {
            self.history.remove(0);
        }
    }
}

fn donut_panel(title: &str, dataset: ChartDataset, theme: ChartTheme) -> Element<'static, Message> {
    let chart = DonutChart::new(dataset, theme);
    let legend = chart.legend();
    let mut rows = Column::new().spacing(2);
    for pair in legend.chunks(2) {
        let cells = pair.iter().fold(row![].spacing(16), |line, entry| {
            line.push(
                text(format!("\u{25A0} {} ({})", entry.label, entry.value))
                    .size(12)
                    .color(to_color(entry.color)),
            )
        });
        rows = rows.push(cells);
    }

    column![
        text(title.to_string()).size(18),
        Canvas::new(DonutView { chart })
            .width(Length::Fixed(DONUT_SIZE as f32))
            .height(Length::Fixed(DONUT_SIZE as f32)),
        rows,
    ]
    .spacing(8)
    .into()
}

fn fetch_all(source: &Arc<MockDataSource>) -> Task<Message> {
    Task::batch([
        Task::perform(fetch_stats(source.clone()), Message::StatsFetched),
        Task::perform(fetch_recent(source.clone()), Message::RecentScansFetched),
        Task::perform(
            fetch_scan(source.clone(), DEFAULT_SCAN.to_string()),
            Message::ScanFetched,
        ),
    ])
}

/// Advances one gauge animation; `None` once it has finished or been replaced.
fn advance_gauge(
    gauge: &mut RadialGauge,
    animation: Option<(u64, Instant)>,
    now: Instant,
) -> Option<(u64, Instant)> {
    let (generation, started) = animation?;
    match gauge.tick(generation, now.saturating_duration_since(started)) {
        FrameRequest::Continue => animation,
        FrameRequest::Done | FrameRequest::Stale => None,
    }
}

async fn fetch_stats(source: Arc<MockDataSource>) -> Result<DashboardStats, String> {
    source.dashboard_stats().await.map_err(|err| err.to_string())
}

async fn fetch_recent(source: Arc<MockDataSource>) -> Result<Vec<RecentScan>, String> {
    source.recent_scans().await.map_err(|err| err.to_string())
}

async fn fetch_scan(source: Arc<MockDataSource>, scan_id: String) -> Result<ScanReport, String> {
    source.scan_result(&scan_id).await.map_err(|err| err.to_string())
}

async fn export_report(scan: ScanReport, palette: SeverityPalette) -> Result<String, String> {
    let generator = ReportGenerator::new(Default::default(), palette);
    let artifact = generator
        .render_artifact(&scan, Local::now().date_naive(), OutputFormat::Pdf)
        .map_err(|err| err.to_string())?;
    tokio::fs::write(&artifact.file_name, &artifact.bytes)
        .await
        .map_err(|err| format!("{}: {err}", artifact.file_name))?;
    Ok(artifact.file_name)
}

/// [`DrawingSurface`] over an iced canvas frame.
struct FrameSurface<'a> {
    frame: &'a mut Frame,
}

impl FrameSurface<'_> {
    fn point(p: codeiqcore::Point) -> Point {
        Point::new(p.x as f32, p.y as f32)
    }

    fn sector_path(center: codeiqcore::Point, radius: f64, start: f64, end: f64) -> Path {
        let center = Self::point(center);
        Path::new(|builder| {
            builder.move_to(center);
            builder.arc(path::Arc {
                center,
                radius: radius as f32,
                start_angle: Radians(start as f32),
                end_angle: Radians(end as f32),
            });
            builder.close();
        })
    }

    fn arc_path(center: codeiqcore::Point, radius: f64, start: f64, end: f64) -> Path {
        let start_point = center.polar(radius, start);
        Path::new(|builder| {
            builder.move_to(Self::point(start_point));
            builder.arc(path::Arc {
                center: Self::point(center),
                radius: radius as f32,
                start_angle: Radians(start as f32),
                end_angle: Radians(end as f32),
            });
        })
    }
}

impl DrawingSurface for FrameSurface<'_> {
    fn fill_background(&mut self, color: Rgb) {
        let size = self.frame.size();
        self.frame.fill_rectangle(Point::ORIGIN, size, to_color(color));
    }

    fn fill_sector(
        &mut self,
        center: codeiqcore::Point,
        radius: f64,
        start: f64,
        end: f64,
        color: Rgb,
    ) {
        let sector = Self::sector_path(center, radius, start, end);
        self.frame.fill(&sector, to_color(color));
    }

    fn stroke_sector(
        &mut self,
        center: codeiqcore::Point,
        radius: f64,
        start: f64,
        end: f64,
        width: f64,
        color: Rgb,
    ) {
        let sector = Self::sector_path(center, radius, start, end);
        self.frame.stroke(
            &sector,
            Stroke::default()
                .with_width(width as f32)
                .with_color(to_color(color)),
        );
    }

    fn stroke_arc(
        &mut self,
        center: codeiqcore::Point,
        radius: f64,
        start: f64,
        end: f64,
        width: f64,
        color: Rgb,
        cap: LineCap,
    ) {
        if end <= start {
            return;
        }
        let arc = Self::arc_path(center, radius, start, end);
        let line_cap = match cap {
            LineCap::Butt => canvas::LineCap::Butt,
            LineCap::Round => canvas::LineCap::Round,
        };
        self.frame.stroke(
            &arc,
            Stroke::default()
                .with_width(width as f32)
                .with_color(to_color(color))
                .with_line_cap(line_cap),
        );
    }

    fn fill_disk(&mut self, center: codeiqcore::Point, radius: f64, color: Rgb) {
        let disk = Path::circle(Self::point(center), radius as f32);
        self.frame.fill(&disk, to_color(color));
    }

    fn draw_text(&mut self, run: TextRun) {
        // Approximate advance; canvas text is positioned by its top-left corner.
        let width = run.content.chars().count() as f64 * run.size * 0.55;
        let x = match run.anchor {
            TextAnchor::Start => run.position.x,
            TextAnchor::Middle => run.position.x - width / 2.0,
            TextAnchor::End => run.position.x - width,
        };
        let font = if run.bold {
            Font {
                weight: font::Weight::Bold,
                ..Font::DEFAULT
            }
        } else {
            Font::DEFAULT
        };
        self.frame.fill_text(canvas::Text {
            content: run.content,
            position: Point::new(x as f32, (run.position.y - run.size / 2.0) as f32),
            color: to_color(run.color),
            size: Pixels(run.size as f32),
            font,
            ..canvas::Text::default()
        });
    }
}

struct GaugeView<'a> {
    gauge: &'a RadialGauge,
}

impl canvas::Program<Message> for GaugeView<'_> {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        self.gauge.render(&mut FrameSurface { frame: &mut frame });
        vec![frame.into_geometry()]
    }
}

struct DonutView {
    chart: DonutChart,
}

impl canvas::Program<Message> for DonutView {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        self.chart.render(&mut FrameSurface { frame: &mut frame });
        vec![frame.into_geometry()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_on<T>(future: impl std::future::Future<Output = T>) -> T {
        tokio::runtime::Runtime::new().unwrap().block_on(future)
    }

    #[test]
    fn recent_scans_fill_the_list_and_selection_animates_scan_gauge() {
        let source = MockDataSource::instant();
        let scans = block_on(source.recent_scans()).unwrap();
        let (mut state, _) = Dashboard::boot();
        assert!(state.recent.is_none());

        let _ = Dashboard::update(&mut state, Message::RecentScansFetched(Ok(scans.clone())));
        assert_eq!(state.recent.as_ref().map(Vec::len), Some(scans.len()));

        let report = block_on(source.scan_result(&scans[0].id)).unwrap();
        let target = report.security_score;
        let _ = Dashboard::update(&mut state, Message::ScanFetched(Ok(report)));
        assert_eq!(state.scan_gauge.config(), GaugeSize::Medium.config());
        let (_, started) = state.scan_animation.unwrap();

        let _ = Dashboard::update(&mut state, Message::Frame(started + Duration::from_secs(2)));
        assert!(state.scan_animation.is_none());
        assert_eq!(state.scan_gauge.animation().displayed(), target);
        assert_eq!(state.scan.as_ref().map(|scan| scan.id.as_str()), Some(scans[0].id.as_str()));
    }

    #[test]
    fn failed_recent_scan_fetch_is_a_notice() {
        let (mut state, _) = Dashboard::boot();
        let _ = Dashboard::update(&mut state, Message::RecentScansFetched(Err("offline".into())));
        assert!(state.recent.is_none());
        assert_eq!(state.status, "Could not load recent scans: offline");
    }
}
