//! Per-chart-type geometry.
//!
//! [`prepare`] runs the shared pipeline (bounds, scale, measurement, geometry
//! constants) once per render pass. The resulting [`PreparedChart`] draws any
//! animation frame and reports the annotation shapes of the final frame.

mod bar;
mod cartesian;
mod line;
mod pie;
mod polar_area;
mod radar;
mod radial;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::{ChartConfig, DrawOrder};
use crate::core::{CategoryData, ProportionData, Segment, Template, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::interaction::AnnotationEntry;
use crate::layout::{LegendEntry, TextMeasurer};
use crate::render::{DrawCommand, RenderFrame, TextHAlign, TextPrimitive, TextVAlign};

pub use bar::{BarChart, bar_thickness};
pub use line::{LineChart, bezier_controls};
pub use pie::{MAX_DRAWN_SWEEP, PieChart, Slice, layout_slices};
pub use polar_area::PolarAreaChart;
pub use radar::RadarChart;

/// Default in-graph data label template.
pub const DEFAULT_DATA_LABEL_TEMPLATE: &str = "<%=value%>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    HorizontalBar,
    StackedBar,
    HorizontalStackedBar,
    Line,
    Pie,
    Doughnut,
    Radar,
    PolarArea,
}

impl ChartKind {
    pub const ALL: [ChartKind; 9] = [
        ChartKind::Bar,
        ChartKind::HorizontalBar,
        ChartKind::StackedBar,
        ChartKind::HorizontalStackedBar,
        ChartKind::Line,
        ChartKind::Pie,
        ChartKind::Doughnut,
        ChartKind::Radar,
        ChartKind::PolarArea,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::HorizontalBar => "horizontal_bar",
            ChartKind::StackedBar => "stacked_bar",
            ChartKind::HorizontalStackedBar => "horizontal_stacked_bar",
            ChartKind::Line => "line",
            ChartKind::Pie => "pie",
            ChartKind::Doughnut => "doughnut",
            ChartKind::Radar => "radar",
            ChartKind::PolarArea => "polar_area",
        }
    }

    /// Chart types laid out around a center instead of along two axes.
    #[must_use]
    pub fn is_radial(self) -> bool {
        matches!(
            self,
            ChartKind::Pie | ChartKind::Doughnut | ChartKind::Radar | ChartKind::PolarArea
        )
    }

    /// Chart types fed with [`ProportionData`] rather than [`CategoryData`].
    #[must_use]
    pub fn uses_segments(self) -> bool {
        matches!(
            self,
            ChartKind::Pie | ChartKind::Doughnut | ChartKind::PolarArea
        )
    }

    /// Only plain bar and line value axes may switch to logarithmic stepping.
    #[must_use]
    pub fn supports_logarithmic(self) -> bool {
        matches!(
            self,
            ChartKind::Bar | ChartKind::HorizontalBar | ChartKind::Line
        )
    }

    /// Tooltip template used when `annotate_label` is not configured.
    #[must_use]
    pub fn default_annotate_template(self) -> &'static str {
        if self.uses_segments() {
            "<%=label + ': ' + value + ' (' + percentage + '%)'%>"
        } else {
            "<%=dataset + ' ' + label + ': ' + value%>"
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Input data of one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartData {
    Category(CategoryData),
    Proportion(ProportionData),
}

impl From<CategoryData> for ChartData {
    fn from(data: CategoryData) -> Self {
        ChartData::Category(data)
    }
}

impl From<ProportionData> for ChartData {
    fn from(segments: ProportionData) -> Self {
        ChartData::Proportion(segments)
    }
}

/// Geometry of one chart type, fixed for a render pass.
pub trait ChartGeometry: fmt::Debug {
    fn kind(&self) -> ChartKind;

    /// Axes, gridlines and scale labels.
    fn draw_scale(&self, frame: &mut RenderFrame);

    /// Data shapes at animation progress `eased` (1.0 is the final frame).
    fn draw_data(&self, frame: &mut RenderFrame, eased: f64);

    /// Shapes of the final frame, in drawing order.
    fn annotations(&self) -> Vec<AnnotationEntry>;
}

/// Everything needed to draw the frames of one render pass.
#[derive(Debug)]
pub struct PreparedChart {
    pub kind: ChartKind,
    /// Static chrome replayed under every frame.
    pub chrome: Vec<DrawCommand>,
    geometry: Box<dyn ChartGeometry>,
}

impl PreparedChart {
    /// Emits chrome, scale and data for one animation frame.
    pub fn draw_frame(&self, frame: &mut RenderFrame, eased: f64, order: DrawOrder) {
        frame.extend(self.chrome.iter().cloned());
        match order {
            DrawOrder::ScaleThenData => {
                self.geometry.draw_scale(frame);
                self.geometry.draw_data(frame, eased);
            }
            DrawOrder::DataThenScale => {
                self.geometry.draw_data(frame, eased);
                self.geometry.draw_scale(frame);
            }
        }
    }

    #[must_use]
    pub fn annotations(&self) -> Vec<AnnotationEntry> {
        self.geometry.annotations()
    }

    #[must_use]
    pub fn geometry(&self) -> &dyn ChartGeometry {
        self.geometry.as_ref()
    }
}

/// Runs the shared preparation pipeline for `kind`.
pub fn prepare(
    kind: ChartKind,
    data: &ChartData,
    config: &ChartConfig,
    viewport: Viewport,
    measurer: &dyn TextMeasurer,
) -> ChartResult<PreparedChart> {
    if !viewport.is_valid() {
        return Err(ChartError::InvalidViewport {
            width: viewport.width,
            height: viewport.height,
        });
    }

    let (chrome, geometry): (Vec<DrawCommand>, Box<dyn ChartGeometry>) = match (kind, data) {
        (
            ChartKind::Bar
            | ChartKind::HorizontalBar
            | ChartKind::StackedBar
            | ChartKind::HorizontalStackedBar,
            ChartData::Category(data),
        ) => {
            let (chart, chrome) = BarChart::prepare(kind, data, config, viewport, measurer)?;
            (chrome, Box::new(chart))
        }
        (ChartKind::Line, ChartData::Category(data)) => {
            let (chart, chrome) = LineChart::prepare(data, config, viewport, measurer)?;
            (chrome, Box::new(chart))
        }
        (ChartKind::Radar, ChartData::Category(data)) => {
            let (chart, chrome) = RadarChart::prepare(data, config, viewport, measurer)?;
            (chrome, Box::new(chart))
        }
        (ChartKind::Pie | ChartKind::Doughnut, ChartData::Proportion(segments)) => {
            let (chart, chrome) =
                PieChart::prepare(kind, segments, config, viewport, measurer)?;
            (chrome, Box::new(chart))
        }
        (ChartKind::PolarArea, ChartData::Proportion(segments)) => {
            let (chart, chrome) = PolarAreaChart::prepare(segments, config, viewport, measurer)?;
            (chrome, Box::new(chart))
        }
        (kind, _) => {
            let expected = if kind.uses_segments() {
                "segment"
            } else {
                "category"
            };
            return Err(ChartError::InvalidData(format!(
                "{kind} chart requires {expected} data"
            )));
        }
    };

    debug!(%kind, chrome = chrome.len(), "prepared chart geometry");
    Ok(PreparedChart {
        kind,
        chrome,
        geometry,
    })
}

/// Legend entries of a category chart: one per titled dataset.
pub(crate) fn dataset_legend(data: &CategoryData, config: &ChartConfig) -> Vec<LegendEntry> {
    if !config.legend {
        return Vec::new();
    }
    data.datasets
        .iter()
        .filter(|dataset| !dataset.title.is_empty())
        .map(|dataset| LegendEntry {
            text: dataset.title.clone(),
            fill: dataset.fill_color,
            stroke: dataset.stroke_color,
        })
        .collect()
}

/// Legend entries of a segment chart: one per titled segment.
pub(crate) fn segment_legend(segments: &[Segment], config: &ChartConfig) -> Vec<LegendEntry> {
    if !config.legend {
        return Vec::new();
    }
    segments
        .iter()
        .filter(|segment| !segment.title_or_empty().is_empty())
        .map(|segment| LegendEntry {
            text: segment.title_or_empty().to_owned(),
            fill: segment.color,
            stroke: segment.color,
        })
        .collect()
}

/// Renders the in-graph data label of every annotated shape.
///
/// Arc and rect labels sit on the shape anchor; point labels sit just above
/// the point.
pub fn draw_data_labels(
    entries: &[AnnotationEntry],
    template: &Template,
    config: &ChartConfig,
    frame: &mut RenderFrame,
) -> ChartResult<()> {
    let format = config.number_format();

    for entry in entries {
        let text = template.render(&entry.template_context(&format))?;
        if text.is_empty() {
            continue;
        }
        let anchor = entry.anchor();
        let (y, v_align) = match entry {
            AnnotationEntry::Point { .. } => {
                (anchor.y - config.point_dot_radius - 2.0, TextVAlign::Bottom)
            }
            _ => (anchor.y, TextVAlign::Middle),
        };
        frame.text(
            TextPrimitive::new(
                text,
                anchor.x,
                y,
                config.in_graph_data_font_size,
                config.in_graph_data_font_color,
                TextHAlign::Center,
            )
            .with_font_family(config.font_family.clone())
            .with_v_align(v_align),
        );
    }
    Ok(())
}
