use crate::math::geometry::{slice_angles, ORIGIN_TOP};
use crate::model::chart::ChartDataset;
use crate::palette::ChartTheme;
use crate::prelude::{DrawingSurface, Point, Rgb, TextAnchor, TextRun};
use crate::telemetry::log::LogManager;

/// Logical edge length of the square donut canvas.
pub const DONUT_SIZE: f64 = 200.0;
/// Outer radius as a fraction of the half-width.
const OUTER_RADIUS_FACTOR: f64 = 0.8;
/// Hole radius as a fraction of the outer radius.
const INNER_RADIUS_FACTOR: f64 = 0.6;
const SEPARATOR_WIDTH: f64 = 1.0;
const LEGEND_COLUMNS: usize = 2;

pub const NO_DATA_CAPTION: &str = "No data available";

/// One legend cell of the two-column grid under the donut.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: Rgb,
    pub value: f64,
    pub column: usize,
    pub row: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DonutOutcome {
    /// Slices were drawn; the legend lists every slice in input order.
    Drawn { legend: Vec<LegendEntry> },
    /// Nothing proportional to draw; the "no data" caption was shown instead.
    NoData,
}

/// Proportional ring chart over a [`ChartDataset`].
pub struct DonutChart {
    dataset: ChartDataset,
    theme: ChartTheme,
    logger: LogManager,
}

impl DonutChart {
    pub fn new(dataset: ChartDataset, theme: ChartTheme) -> Self {
        Self {
            dataset,
            theme,
            logger: LogManager::new("donut"),
        }
    }

    pub fn dataset(&self) -> &ChartDataset {
        &self.dataset
    }

    pub fn center(&self) -> Point {
        Point::new(DONUT_SIZE / 2.0, DONUT_SIZE / 2.0)
    }

    pub fn outer_radius(&self) -> f64 {
        (DONUT_SIZE / 2.0) * OUTER_RADIUS_FACTOR
    }

    pub fn inner_radius(&self) -> f64 {
        self.outer_radius() * INNER_RADIUS_FACTOR
    }

    /// Legend cells laid out row-major over two columns.
    pub fn legend(&self) -> Vec<LegendEntry> {
        self.dataset
            .slices()
            .iter()
            .enumerate()
            .map(|(idx, slice)| LegendEntry {
                label: slice.label.clone(),
                color: slice.color,
                value: slice.value,
                column: idx % LEGEND_COLUMNS,
                row: idx / LEGEND_COLUMNS,
            })
            .collect()
    }

    pub fn render<S: DrawingSurface>(&self, surface: &mut S) -> DonutOutcome {
        surface.fill_background(self.theme.background());

        if self.dataset.is_degenerate() {
            self.logger.trace("dataset empty, showing no-data caption");
            surface.draw_text(TextRun {
                content: NO_DATA_CAPTION.to_string(),
                position: self.center(),
                size: 14.0,
                color: self.theme.muted_text(),
                anchor: TextAnchor::Middle,
                bold: false,
            });
            return DonutOutcome::NoData;
        }

        let center = self.center();
        let radius = self.outer_radius();
        let spans = slice_angles(&self.dataset.weights(), ORIGIN_TOP);

        for (slice, span) in self.dataset.slices().iter().zip(spans.iter()) {
            surface.fill_sector(center, radius, span.start, span.end, slice.color);
            surface.stroke_sector(
                center,
                radius,
                span.start,
                span.end,
                SEPARATOR_WIDTH,
                self.theme.separator(),
            );
        }

        surface.fill_disk(center, self.inner_radius(), self.theme.background());
        self.logger
            .trace(&format!("drew {} slices", self.dataset.slices().len()));

        DonutOutcome::Drawn {
            legend: self.legend(),
        }
    }
}
