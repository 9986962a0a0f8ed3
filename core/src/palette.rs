//! Color tables shared by the dashboard charts and the report generator.

use crate::math::score::{score_to_color_tier, ColorTier, Score};
use crate::model::scan::Severity;
use crate::prelude::Rgb;
use serde::{Deserialize, Serialize};

pub const TIER_GREEN: Rgb = Rgb::from_u32(0x10B981);
pub const TIER_YELLOW: Rgb = Rgb::from_u32(0xFBBF24);
pub const TIER_ORANGE: Rgb = Rgb::from_u32(0xF97316);
pub const TIER_RED: Rgb = Rgb::from_u32(0xEF4444);

/// Report accent blue used for header bands and table heads.
pub const BRAND_BLUE: Rgb = Rgb::new(59, 130, 246);
/// Light slate used for boxes and alternate table rows.
pub const PANEL_FILL: Rgb = Rgb::new(241, 245, 249);

pub fn tier_color(tier: ColorTier) -> Rgb {
    match tier {
        ColorTier::Green => TIER_GREEN,
        ColorTier::Yellow => TIER_YELLOW,
        ColorTier::Orange => TIER_ORANGE,
        ColorTier::Red => TIER_RED,
    }
}

pub fn score_color(score: Score) -> Rgb {
    tier_color(score_to_color_tier(score))
}

/// Immutable severity → color table in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityPalette {
    pub critical: Rgb,
    pub high: Rgb,
    pub medium: Rgb,
    pub low: Rgb,
}

impl Default for SeverityPalette {
    fn default() -> Self {
        Self {
            critical: Rgb::from_u32(0xEF4444),
            high: Rgb::from_u32(0xF97316),
            medium: Rgb::from_u32(0xFBBF24),
            low: Rgb::from_u32(0x3B82F6),
        }
    }
}

impl SeverityPalette {
    pub fn color(&self, severity: Severity) -> Rgb {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }

    /// `(severity, color)` pairs in [`Severity::ORDER`].
    pub fn entries(&self) -> impl Iterator<Item = (Severity, Rgb)> + '_ {
        Severity::ORDER
            .iter()
            .map(move |&severity| (severity, self.color(severity)))
    }
}

/// Light or dark display mode for the chart widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartTheme {
    #[default]
    Light,
    Dark,
}

impl ChartTheme {
    /// Canvas background; also the donut hole and slice separator color.
    pub fn background(&self) -> Rgb {
        match self {
            ChartTheme::Light => Rgb::WHITE,
            ChartTheme::Dark => Rgb::from_u32(0x1F2937),
        }
    }

    pub fn separator(&self) -> Rgb {
        self.background()
    }

    pub fn gauge_track(&self) -> Rgb {
        match self {
            ChartTheme::Light => Rgb::from_u32(0xE5E7EB),
            ChartTheme::Dark => Rgb::from_u32(0x374151),
        }
    }

    pub fn muted_text(&self) -> Rgb {
        match self {
            ChartTheme::Light => Rgb::from_u32(0x6B7280),
            ChartTheme::Dark => Rgb::from_u32(0x9CA3AF),
        }
    }
}
