use crate::model::scan::SeverityCount;
use crate::palette::SeverityPalette;
use crate::prelude::Rgb;
use serde::{Deserialize, Serialize};

/// One labeled category of a proportional chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSlice {
    pub label: String,
    pub value: f64,
    pub color: Rgb,
}

impl ChartSlice {
    pub fn new(label: impl Into<String>, value: f64, color: Rgb) -> Self {
        Self {
            label: label.into(),
            value,
            color,
        }
    }

    /// Value used for angle math; negative or non-finite input counts as zero.
    pub fn weight(&self) -> f64 {
        if self.value.is_finite() && self.value > 0.0 {
            self.value
        } else {
            0.0
        }
    }
}

/// Ordered slices. Insertion order is draw order and legend order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChartDataset {
    slices: Vec<ChartSlice>,
}

impl ChartDataset {
    pub fn new(slices: Vec<ChartSlice>) -> Self {
        Self { slices }
    }

    pub fn push(&mut self, slice: ChartSlice) {
        self.slices.push(slice);
    }

    pub fn slices(&self) -> &[ChartSlice] {
        &self.slices
    }

    pub fn weights(&self) -> Vec<f64> {
        self.slices.iter().map(ChartSlice::weight).collect()
    }

    pub fn total(&self) -> f64 {
        self.slices.iter().map(ChartSlice::weight).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// True when there is nothing proportional to draw.
    pub fn is_degenerate(&self) -> bool {
        self.slices.is_empty() || self.total() <= 0.0
    }

    /// Builds a severity dataset in the palette's fixed order.
    pub fn from_severity_counts(counts: &SeverityCount, palette: &SeverityPalette) -> Self {
        let slices = palette
            .entries()
            .map(|(severity, color)| {
                ChartSlice::new(severity.label(), f64::from(counts.get(severity)), color)
            })
            .collect();
        Self { slices }
    }
}

impl FromIterator<ChartSlice> for ChartDataset {
    fn from_iter<T: IntoIterator<Item = ChartSlice>>(iter: T) -> Self {
        Self {
            slices: iter.into_iter().collect(),
        }
    }
}
