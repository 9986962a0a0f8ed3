//! Radial score gauge with a clock-independent sweep animation.
//!
//! The gauge never reads a clock. Whoever drives it (a UI frame subscription,
//! a test) measures elapsed time and hands it to [`RadialGauge::tick`]. Each
//! call to [`RadialGauge::set_target`] starts a new animation generation; ticks
//! carrying an older generation are ignored, which is how an in-flight sweep is
//! abandoned when a new score arrives.

use crate::math::geometry::{gauge_end_angle, GAUGE_START, GAUGE_SWEEP};
use crate::math::score::Score;
use crate::palette::{score_color, ChartTheme};
use crate::prelude::{DrawingSurface, LineCap, Point, Rgb, TextAnchor, TextRun};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const ANIMATION_DURATION: Duration = Duration::from_millis(1000);
pub const GAUGE_CAPTION: &str = "Security Score";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GaugeSize {
    Small,
    Medium,
    #[default]
    Large,
}

/// Pixel dimensions fixed by a [`GaugeSize`] preset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeConfig {
    pub width: f64,
    pub height: f64,
    pub thickness: f64,
    pub score_text: f64,
    pub caption_text: f64,
}

impl GaugeSize {
    pub fn config(&self) -> GaugeConfig {
        match self {
            GaugeSize::Small => GaugeConfig {
                width: 120.0,
                height: 120.0,
                thickness: 8.0,
                score_text: 24.0,
                caption_text: 12.0,
            },
            GaugeSize::Medium => GaugeConfig {
                width: 160.0,
                height: 160.0,
                thickness: 10.0,
                score_text: 30.0,
                caption_text: 14.0,
            },
            GaugeSize::Large => GaugeConfig {
                width: 200.0,
                height: 200.0,
                thickness: 12.0,
                score_text: 36.0,
                caption_text: 16.0,
            },
        }
    }
}

/// Linear animation progress in `0.0..=1.0`.
pub fn progress(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / duration.as_secs_f64()).min(1.0)
}

/// Score shown after `progress` of the sweep towards `target`.
pub fn animated_score(target: Score, progress: f64) -> Score {
    let value = (progress.clamp(0.0, 1.0) * f64::from(target.value())).round();
    Score::saturating(value as i64)
}

/// What the frame source should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRequest {
    /// Progress < 1: schedule another frame.
    Continue,
    /// Sweep reached its target; stop scheduling.
    Done,
    /// Tick belonged to an abandoned generation and was ignored.
    Stale,
}

/// Sweep state owned by one gauge.
#[derive(Debug, Clone)]
pub struct GaugeAnimation {
    duration: Duration,
    target: Score,
    displayed: Score,
    generation: u64,
    running: bool,
}

impl GaugeAnimation {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            target: Score::default(),
            displayed: Score::default(),
            generation: 0,
            running: false,
        }
    }

    /// Resets the displayed score to 0 and starts a new generation.
    pub fn retarget(&mut self, target: Score) -> u64 {
        self.generation += 1;
        self.target = target;
        self.displayed = Score::default();
        self.running = true;
        self.generation
    }

    pub fn tick(&mut self, generation: u64, elapsed: Duration) -> FrameRequest {
        if generation != self.generation {
            return FrameRequest::Stale;
        }
        if !self.running {
            return FrameRequest::Done;
        }

        let progress = progress(elapsed, self.duration);
        self.displayed = self.displayed.max(animated_score(self.target, progress));
        if progress < 1.0 {
            FrameRequest::Continue
        } else {
            self.running = false;
            FrameRequest::Done
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn target(&self) -> Score {
        self.target
    }

    pub fn displayed(&self) -> Score {
        self.displayed
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl Default for GaugeAnimation {
    fn default() -> Self {
        Self::new(ANIMATION_DURATION)
    }
}

/// Backend-independent description of one gauge frame.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeGeometry {
    pub center: Point,
    pub radius: f64,
    pub thickness: f64,
    pub track_start: f64,
    pub track_end: f64,
    pub value_end: f64,
    pub track_color: Rgb,
    /// Follows the animated score.
    pub arc_color: Rgb,
    /// Follows the final target score, so it can differ from `arc_color`
    /// while the sweep is still running.
    pub label_color: Rgb,
    pub label: String,
}

/// 270° ring gauge for a 0–100 score.
pub struct RadialGauge {
    size: GaugeSize,
    theme: ChartTheme,
    animation: GaugeAnimation,
}

impl RadialGauge {
    pub fn new(size: GaugeSize, theme: ChartTheme) -> Self {
        Self {
            size,
            theme,
            animation: GaugeAnimation::default(),
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.animation = GaugeAnimation::new(duration);
        self
    }

    pub fn config(&self) -> GaugeConfig {
        self.size.config()
    }

    pub fn set_theme(&mut self, theme: ChartTheme) {
        self.theme = theme;
    }

    pub fn set_target(&mut self, score: Score) -> u64 {
        self.animation.retarget(score)
    }

    pub fn tick(&mut self, generation: u64, elapsed: Duration) -> FrameRequest {
        self.animation.tick(generation, elapsed)
    }

    pub fn animation(&self) -> &GaugeAnimation {
        &self.animation
    }

    pub fn geometry(&self) -> GaugeGeometry {
        let config = self.config();
        let displayed = self.animation.displayed();
        GaugeGeometry {
            center: Point::new(config.width / 2.0, config.height / 2.0),
            radius: config.width / 2.0 - config.thickness / 2.0,
            thickness: config.thickness,
            track_start: GAUGE_START,
            track_end: GAUGE_START + GAUGE_SWEEP,
            value_end: gauge_end_angle(displayed.ratio()),
            track_color: self.theme.gauge_track(),
            arc_color: score_color(displayed),
            label_color: score_color(self.animation.target()),
            label: displayed.to_string(),
        }
    }

    pub fn render<S: DrawingSurface>(&self, surface: &mut S) {
        let config = self.config();
        let geometry = self.geometry();

        surface.stroke_arc(
            geometry.center,
            geometry.radius,
            geometry.track_start,
            geometry.track_end,
            geometry.thickness,
            geometry.track_color,
            LineCap::Butt,
        );
        if geometry.value_end > geometry.track_start {
            surface.stroke_arc(
                geometry.center,
                geometry.radius,
                geometry.track_start,
                geometry.value_end,
                geometry.thickness,
                geometry.arc_color,
                LineCap::Round,
            );
        } else {
            // A zero sweep leaves only the round cap.
            surface.fill_disk(
                geometry.center.polar(geometry.radius, geometry.track_start),
                geometry.thickness / 2.0,
                geometry.arc_color,
            );
        }

        surface.draw_text(TextRun {
            content: geometry.label.clone(),
            position: geometry.center,
            size: config.score_text,
            color: geometry.label_color,
            anchor: TextAnchor::Middle,
            bold: true,
        });
        surface.draw_text(TextRun {
            content: GAUGE_CAPTION.to_string(),
            position: Point::new(
                geometry.center.x,
                geometry.center.y + config.score_text * 0.5 + config.caption_text,
            ),
            size: config.caption_text,
            color: self.theme.muted_text(),
            anchor: TextAnchor::Middle,
            bold: false,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{TIER_GREEN, TIER_RED, TIER_YELLOW};
    use crate::render::recorder::{DrawCommand, RecordingSurface};
    use std::f64::consts::PI;

    fn score(value: i64) -> Score {
        Score::new(value).unwrap()
    }

    #[test]
    fn progress_is_linear_and_capped() {
        let duration = Duration::from_millis(1000);
        assert_eq!(progress(Duration::ZERO, duration), 0.0);
        assert_eq!(progress(Duration::from_millis(250), duration), 0.25);
        assert_eq!(progress(Duration::from_millis(1500), duration), 1.0);
        assert_eq!(progress(Duration::from_millis(5), Duration::ZERO), 1.0);
    }

    #[test]
    fn displayed_sequence_is_monotonic_and_lands_on_target() {
        for target in [0, 1, 37, 79, 80, 100] {
            let mut animation = GaugeAnimation::default();
            let generation = animation.retarget(score(target));
            assert_eq!(animation.displayed().value(), 0);

            let mut previous = 0;
            let mut request = FrameRequest::Continue;
            let mut elapsed = 0;
            while request == FrameRequest::Continue {
                request = animation.tick(generation, Duration::from_millis(elapsed));
                let shown = animation.displayed().value();
                assert!(shown >= previous);
                previous = shown;
                elapsed += 16;
            }
            assert_eq!(request, FrameRequest::Done);
            assert!(elapsed >= 1000);
            assert_eq!(animation.displayed().value() as i64, target);
            assert!(!animation.is_running());
        }
    }

    #[test]
    fn retarget_abandons_previous_sequence() {
        let mut animation = GaugeAnimation::default();
        let first = animation.retarget(score(90));
        animation.tick(first, Duration::from_millis(500));
        assert_eq!(animation.displayed().value(), 45);

        let second = animation.retarget(score(40));
        assert_eq!(animation.displayed().value(), 0);
        assert_eq!(
            animation.tick(first, Duration::from_millis(900)),
            FrameRequest::Stale
        );
        assert_eq!(animation.displayed().value(), 0);
        assert_eq!(
            animation.tick(second, Duration::from_millis(1000)),
            FrameRequest::Done
        );
        assert_eq!(animation.displayed().value(), 40);
    }

    #[test]
    fn presets_fix_dimensions() {
        assert_eq!(GaugeSize::Small.config().width, 120.0);
        assert_eq!(GaugeSize::Medium.config().thickness, 10.0);
        let large = RadialGauge::new(GaugeSize::Large, ChartTheme::Light).geometry();
        assert_eq!(large.radius, 94.0);
        assert_eq!(large.center, Point::new(100.0, 100.0));
    }

    #[test]
    fn label_color_tracks_target_while_arc_tracks_animation() {
        let mut gauge = RadialGauge::new(GaugeSize::Medium, ChartTheme::Light);
        let generation = gauge.set_target(score(90));
        gauge.tick(generation, Duration::from_millis(300));

        let geometry = gauge.geometry();
        assert_eq!(geometry.label, "27");
        assert_eq!(geometry.arc_color, TIER_RED);
        assert_eq!(geometry.label_color, TIER_GREEN);
        assert!((geometry.value_end - (PI * 0.75 + 0.27 * PI * 1.5)).abs() < 1e-12);

        gauge.tick(generation, Duration::from_millis(700));
        assert_eq!(gauge.geometry().arc_color, TIER_YELLOW);
    }

    #[test]
    fn render_strokes_track_then_value_arc() {
        let mut gauge = RadialGauge::new(GaugeSize::Large, ChartTheme::Dark);
        let generation = gauge.set_target(score(82));
        gauge.tick(generation, ANIMATION_DURATION);

        let mut surface = RecordingSurface::new();
        gauge.render(&mut surface);
        let arcs: Vec<_> = surface
            .commands()
            .iter()
            .filter_map(|command| match command {
                DrawCommand::StrokeArc {
                    start,
                    end,
                    color,
                    cap,
                    ..
                } => Some((*start, *end, *color, *cap)),
                _ => None,
            })
            .collect();
        assert_eq!(arcs.len(), 2);
        assert_eq!(arcs[0].2, Rgb::from_u32(0x374151));
        assert!((arcs[0].1 - PI * 2.25).abs() < 1e-12);
        assert_eq!(arcs[1].3, LineCap::Round);
        assert_eq!(arcs[1].2, TIER_GREEN);

        let labels: Vec<_> = surface.texts().map(|run| run.content.as_str()).collect();
        assert_eq!(labels, vec!["82", GAUGE_CAPTION]);
    }

    #[test]
    fn zero_score_draws_the_cap_as_a_dot() {
        let gauge = RadialGauge::new(GaugeSize::Medium, ChartTheme::Light);
        let geometry = gauge.geometry();
        let mut surface = RecordingSurface::new();
        gauge.render(&mut surface);

        let arcs = surface
            .commands()
            .iter()
            .filter(|command| matches!(command, DrawCommand::StrokeArc { .. }))
            .count();
        assert_eq!(arcs, 1);
        let dot = surface.commands().iter().find_map(|command| match command {
            DrawCommand::FillDisk {
                center,
                radius,
                color,
            } => Some((*center, *radius, *color)),
            _ => None,
        });
        let (center, radius, color) = dot.unwrap();
        let expected = geometry.center.polar(geometry.radius, GAUGE_START);
        assert!((center.x - expected.x).abs() < 1e-12 && (center.y - expected.y).abs() < 1e-12);
        assert_eq!(radius, geometry.thickness / 2.0);
        assert_eq!(color, geometry.arc_color);
    }
}
