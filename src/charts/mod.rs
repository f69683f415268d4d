//! Chart specs, live chart instances and their per-slot lifecycle.
//!
//! A [`ChartSpec`] is plain data (labels and series). A [`Chart`] is a live
//! instance drawn from a spec; each one gets a fresh [`ChartId`] so tests and
//! diagnostics can tell a rebuilt chart from the one it replaced. Ownership
//! of instances lives in [`slot::ChartSlot`].

pub mod render;
pub mod resize;
pub mod slot;

use std::sync::atomic::{AtomicU64, Ordering};

pub use resize::ResizeDebouncer;
pub use slot::{ChartSlot, SlotState};

static NEXT_CHART_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one live chart instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChartId(pub u64);

impl ChartId {
    fn next() -> Self {
        Self(NEXT_CHART_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Doughnut,
    /// Horizontal bars with series stacked end to end.
    StackedBar,
    /// Vertical grouping: one bar per series per label.
    GroupedBar,
}

/// Palette shared by every view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesColor {
    /// Fraud.
    Red,
    /// Legitimate.
    Green,
    /// Totals.
    Blue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub color: SeriesColor,
    pub values: Vec<u64>,
}

impl Series {
    pub fn new(label: impl Into<String>, color: SeriesColor, values: Vec<u64>) -> Self {
        Self {
            label: label.into(),
            color,
            values,
        }
    }

    pub fn total(&self) -> u64 {
        self.values.iter().sum()
    }
}

/// Everything needed to draw a chart.
///
/// For doughnuts `labels` names the segments and there is exactly one
/// series; for bar charts `labels` names the categories and each series
/// holds one value per category.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub labels: Vec<String>,
    pub series: Vec<Series>,
}

impl ChartSpec {
    /// Doughnut with one segment per `(label, value, color)`.
    pub fn doughnut(title: impl Into<String>, segments: &[(&str, u64, SeriesColor)]) -> Self {
        Self {
            kind: ChartKind::Doughnut,
            title: title.into(),
            labels: segments.iter().map(|(l, _, _)| l.to_string()).collect(),
            series: segments
                .iter()
                .map(|(l, v, c)| Series::new(*l, *c, vec![*v]))
                .collect(),
        }
    }

    pub fn stacked_bar(title: impl Into<String>, labels: Vec<String>, series: Vec<Series>) -> Self {
        Self {
            kind: ChartKind::StackedBar,
            title: title.into(),
            labels,
            series,
        }
    }

    pub fn grouped_bar(title: impl Into<String>, labels: Vec<String>, series: Vec<Series>) -> Self {
        Self {
            kind: ChartKind::GroupedBar,
            title: title.into(),
            labels,
            series,
        }
    }

    /// Sum over every value in every series.
    pub fn total(&self) -> u64 {
        self.series.iter().map(Series::total).sum()
    }

    /// Number of drawn bars (or doughnut segments).
    pub fn bar_count(&self) -> usize {
        match self.kind {
            ChartKind::Doughnut => self.series.len(),
            ChartKind::StackedBar | ChartKind::GroupedBar => {
                self.series.iter().map(|s| s.values.len()).sum()
            }
        }
    }
}

/// A live chart instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    id: ChartId,
    spec: ChartSpec,
    width: u16,
}

impl Chart {
    pub(crate) fn create(spec: ChartSpec, width: u16) -> Self {
        Self {
            id: ChartId::next(),
            spec,
            width: width.max(render::MIN_WIDTH),
        }
    }

    pub fn id(&self) -> ChartId {
        self.id
    }

    pub fn spec(&self) -> &ChartSpec {
        &self.spec
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn resize(&mut self, width: u16) {
        self.width = width.max(render::MIN_WIDTH);
    }

    /// Draw as terminal text.
    pub fn render(&self, colorize: bool) -> String {
        render::render(&self.spec, self.width, colorize)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_instance_gets_a_new_id() {
        let spec = ChartSpec::doughnut("x", &[("Fraud", 1, SeriesColor::Red)]);
        let a = Chart::create(spec.clone(), 40);
        let b = Chart::create(spec, 40);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn totals_and_bar_counts() {
        let spec = ChartSpec::stacked_bar(
            "Categories",
            vec!["Books".into(), "Toys".into()],
            vec![
                Series::new("Fraud", SeriesColor::Red, vec![2, 1]),
                Series::new("Non-Fraud", SeriesColor::Green, vec![5, 0]),
            ],
        );
        assert_eq!(spec.total(), 8);
        assert_eq!(spec.bar_count(), 4);

        let donut = ChartSpec::doughnut(
            "Split",
            &[("Fraud", 3, SeriesColor::Red), ("Legit", 7, SeriesColor::Green)],
        );
        assert_eq!(donut.total(), 10);
        assert_eq!(donut.bar_count(), 2);
    }

    #[test]
    fn resize_respects_minimum_width() {
        let mut chart = Chart::create(ChartSpec::doughnut("x", &[]), 40);
        chart.resize(2);
        assert_eq!(chart.width(), render::MIN_WIDTH);
    }
}
