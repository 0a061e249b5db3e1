use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};
use crate::render::Color;

fn default_fill() -> Color {
    Color::from_rgb8(220, 220, 220, 0.5)
}

fn default_stroke() -> Color {
    Color::from_rgb8(220, 220, 220, 1.0)
}

/// One named series of a category chart. `None` entries are missing points
/// and are skipped by every chart type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default)]
    pub title: String,
    pub data: Vec<Option<f64>>,
    #[serde(default = "default_fill")]
    pub fill_color: Color,
    #[serde(default = "default_stroke")]
    pub stroke_color: Color,
    #[serde(default = "default_stroke")]
    pub point_color: Color,
    #[serde(default = "default_point_stroke")]
    pub point_stroke_color: Color,
    /// Per-point fill overrides (bar charts).
    #[serde(default)]
    pub data_fill_colors: Option<Vec<Color>>,
}

fn default_point_stroke() -> Color {
    Color::WHITE
}

impl Dataset {
    #[must_use]
    pub fn new(title: impl Into<String>, data: impl IntoIterator<Item = f64>) -> Self {
        Self {
            title: title.into(),
            data: data.into_iter().map(Some).collect(),
            fill_color: default_fill(),
            stroke_color: default_stroke(),
            point_color: default_stroke(),
            point_stroke_color: default_point_stroke(),
            data_fill_colors: None,
        }
    }

    #[must_use]
    pub fn with_colors(mut self, fill_color: Color, stroke_color: Color) -> Self {
        self.fill_color = fill_color;
        self.stroke_color = stroke_color;
        self.point_color = stroke_color;
        self
    }

    /// Returns the value at `index` when present and finite.
    #[must_use]
    pub fn value(&self, index: usize) -> Option<f64> {
        self.data
            .get(index)
            .copied()
            .flatten()
            .filter(|value| value.is_finite())
    }

    #[must_use]
    pub fn fill_color_at(&self, index: usize) -> Color {
        self.data_fill_colors
            .as_ref()
            .and_then(|colors| colors.get(index).copied())
            .unwrap_or(self.fill_color)
    }
}

/// Input of Bar, HorizontalBar, StackedBar, HorizontalStackedBar, Line and
/// Radar charts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

impl CategoryData {
    #[must_use]
    pub fn new(labels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
            datasets: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_dataset(mut self, dataset: Dataset) -> Self {
        self.datasets.push(dataset);
        self
    }

    /// Number of category slots: the longest of labels and dataset lengths.
    #[must_use]
    pub fn category_count(&self) -> usize {
        self.datasets
            .iter()
            .map(|dataset| dataset.data.len())
            .chain(std::iter::once(self.labels.len()))
            .max()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn label(&self, index: usize) -> &str {
        self.labels.get(index).map_or("", String::as_str)
    }

    pub fn validate(&self) -> ChartResult<()> {
        if self.datasets.is_empty() {
            return Err(ChartError::InvalidData(
                "category chart requires at least one dataset".to_owned(),
            ));
        }
        if self.category_count() == 0 {
            return Err(ChartError::InvalidData(
                "category chart requires at least one label or value".to_owned(),
            ));
        }
        Ok(())
    }
}

/// One slice of a Pie, Doughnut or PolarArea chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub value: f64,
    pub color: Color,
    #[serde(default)]
    pub title: Option<String>,
}

impl Segment {
    #[must_use]
    pub fn new(value: f64, color: Color) -> Self {
        Self {
            value,
            color,
            title: None,
        }
    }

    #[must_use]
    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Segments with a missing, negative or non-finite value are not drawn.
    #[must_use]
    pub fn is_drawable(&self) -> bool {
        self.value.is_finite() && self.value >= 0.0
    }

    #[must_use]
    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }
}

pub type ProportionData = Vec<Segment>;
