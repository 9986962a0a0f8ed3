use crate::prelude::Point;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// 12 o'clock, where the dashboard donut starts.
pub const ORIGIN_TOP: f64 = -FRAC_PI_2;
/// 3 o'clock, where the report pie starts.
pub const ORIGIN_RIGHT: f64 = 0.0;

/// Gauge track start (135°, bottom-left).
pub const GAUGE_START: f64 = PI * 0.75;
/// Gauge track extent (270°).
pub const GAUGE_SWEEP: f64 = PI * 1.5;

/// Angular span of one slice, clockwise from `start` to `end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliceSpan {
    pub start: f64,
    pub end: f64,
}

impl SliceSpan {
    pub fn sweep(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.sweep() <= 0.0
    }
}

/// Consecutive clockwise spans proportional to `values`, beginning at `origin`.
///
/// Returns one span per value, in input order. Each boundary is computed from
/// the running sum rather than by accumulating sweeps, so the last span ends
/// at exactly `origin + 2π`. A zero (or non-positive) total yields no spans and
/// the caller is expected to take its empty-state path.
pub fn slice_angles(values: &[f64], origin: f64) -> Vec<SliceSpan> {
    let total: f64 = values.iter().copied().filter(|v| *v > 0.0).sum();
    if total <= 0.0 || !total.is_finite() {
        return Vec::new();
    }

    let mut spans = Vec::with_capacity(values.len());
    let mut cumulative = 0.0;
    let mut start = origin;
    for &value in values {
        cumulative += value.max(0.0);
        let end = if cumulative >= total {
            origin + TAU
        } else {
            origin + cumulative / total * TAU
        };
        spans.push(SliceSpan { start, end });
        start = end;
    }
    spans
}

/// Approximates a circular sector by a fan of `segments` triangles sharing
/// `center`. Empty spans produce no triangles.
pub fn sector_fan(center: Point, radius: f64, span: SliceSpan, segments: usize) -> Vec<[Point; 3]> {
    if span.is_empty() || segments == 0 {
        return Vec::new();
    }
    let step = span.sweep() / segments as f64;
    (0..segments)
        .map(|i| {
            let from = span.start + step * i as f64;
            let to = span.start + step * (i + 1) as f64;
            [center, center.polar(radius, from), center.polar(radius, to)]
        })
        .collect()
}

/// End angle of the gauge's value arc for `ratio` in `0.0..=1.0`.
pub fn gauge_end_angle(ratio: f64) -> f64 {
    GAUGE_START + ratio.clamp(0.0, 1.0) * GAUGE_SWEEP
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn spans_cover_full_circle_without_gaps() {
        let spans = slice_angles(&[5.0, 3.0, 7.0, 4.0, 2.0, 3.0], ORIGIN_TOP);
        assert_eq!(spans.len(), 6);
        let total: f64 = spans.iter().map(SliceSpan::sweep).sum();
        assert!((total - TAU).abs() < EPSILON);
        assert_eq!(spans[0].start, ORIGIN_TOP);
        for pair in spans.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert_eq!(spans[5].end, ORIGIN_TOP + TAU);
    }

    #[test]
    fn zero_total_yields_no_spans() {
        assert!(slice_angles(&[0.0, 0.0], ORIGIN_RIGHT).is_empty());
        assert!(slice_angles(&[], ORIGIN_RIGHT).is_empty());
    }

    #[test]
    fn severity_example_spans() {
        let spans = slice_angles(&[0.0, 3.0, 2.0, 3.0], ORIGIN_RIGHT);
        assert!(spans[0].is_empty());
        assert!((spans[1].end - 3.0 / 8.0 * TAU).abs() < EPSILON);
        assert!((spans[2].sweep() - 2.0 / 8.0 * TAU).abs() < EPSILON);
        assert!((spans[3].sweep() - 3.0 / 8.0 * TAU).abs() < EPSILON);
        assert_eq!(spans[3].end, TAU);
    }

    #[test]
    fn fan_triangles_share_center_and_reach_span_end() {
        let center = Point::new(70.0, 70.0);
        let span = SliceSpan {
            start: 0.0,
            end: FRAC_PI_2,
        };
        let triangles = sector_fan(center, 30.0, span, 32);
        assert_eq!(triangles.len(), 32);
        assert!(triangles.iter().all(|t| t[0] == center));
        let last = triangles[31][2];
        assert!((last.x - 70.0).abs() < 1e-9);
        assert!((last.y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn gauge_angle_is_clamped() {
        assert_eq!(gauge_end_angle(0.0), GAUGE_START);
        assert!((gauge_end_angle(1.0) - PI * 2.25).abs() < EPSILON);
        assert!((gauge_end_angle(3.0) - PI * 2.25).abs() < EPSILON);
    }
}
