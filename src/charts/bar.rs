use tracing::trace;

use super::cartesian::{AxesRequest, CartesianAxes, Orientation};
use super::{ChartGeometry, ChartKind, dataset_legend};
use crate::api::ChartConfig;
use crate::core::{
    CategoryData, PixelRect, Point, StackAccumulator, Viewport, series_bounds, stacked_bounds,
};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{AnnotationEntry, AnnotationPayload};
use crate::layout::TextMeasurer;
use crate::render::{Color, DrawCommand, RectPrimitive, RenderFrame};

/// One bar: a value interval at a fixed offset across its category slot.
#[derive(Debug, Clone, PartialEq)]
struct Bar {
    /// Leading edge across the category axis.
    across: f64,
    thickness: f64,
    base_value: f64,
    top_value: f64,
    fill: Color,
    stroke: Color,
    payload: AnnotationPayload,
}

/// Bar, HorizontalBar, StackedBar and HorizontalStackedBar geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    kind: ChartKind,
    axes: CartesianAxes,
    bars: Vec<Bar>,
    stroke_width: f64,
}

/// Width of one bar inside a category slot holding `datasets` bars side by
/// side.
#[must_use]
pub fn bar_thickness(
    slot: f64,
    datasets: usize,
    value_spacing: f64,
    dataset_spacing: f64,
    stroke_width: f64,
) -> f64 {
    let n = datasets.max(1) as f64;
    ((slot - 2.0 * value_spacing - (n - 1.0) * dataset_spacing - n * stroke_width) / n).max(0.0)
}

impl BarChart {
    pub(crate) fn prepare(
        kind: ChartKind,
        data: &CategoryData,
        config: &ChartConfig,
        viewport: Viewport,
        measurer: &dyn TextMeasurer,
    ) -> ChartResult<(Self, Vec<DrawCommand>)> {
        data.validate()?;
        let stacked = matches!(
            kind,
            ChartKind::StackedBar | ChartKind::HorizontalStackedBar
        );
        let orientation = match kind {
            ChartKind::HorizontalBar | ChartKind::HorizontalStackedBar => Orientation::Horizontal,
            _ => Orientation::Vertical,
        };
        let bounds = if stacked {
            stacked_bounds(data)
        } else {
            series_bounds(data)
        }
        .ok_or_else(|| ChartError::InvalidData(format!("{kind} chart has no finite values")))?;

        let categories = data.category_count();
        let labels: Vec<String> = (0..categories).map(|i| data.label(i).to_owned()).collect();
        let (axes, chrome) = CartesianAxes::build(
            AxesRequest {
                orientation,
                bounds,
                category_labels: &labels,
                categories_centered: true,
                allow_logarithmic: kind.supports_logarithmic(),
                legend: dataset_legend(data, config),
            },
            config,
            viewport,
            measurer,
        )?;

        let stroke_width = if config.bar_show_stroke {
            config.bar_stroke_width
        } else {
            0.0
        };
        let columns = if stacked { 1 } else { data.datasets.len() };
        let thickness = bar_thickness(
            axes.category_hop(),
            columns,
            config.bar_value_spacing,
            config.bar_dataset_spacing,
            stroke_width,
        );

        let mut totals = StackAccumulator::new(categories);
        for dataset in &data.datasets {
            for index in 0..categories {
                if let Some(value) = dataset.value(index) {
                    totals.push(index, value);
                }
            }
        }

        let mut stacks = StackAccumulator::new(categories);
        let mut running = vec![0.0; categories];
        let mut bars = Vec::new();
        for (dataset_index, dataset) in data.datasets.iter().enumerate() {
            for index in 0..categories {
                let Some(value) = dataset.value(index) else {
                    trace!(dataset_index, index, "skipping missing bar value");
                    continue;
                };
                let column = if stacked { 0 } else { dataset_index };
                // slot start is the left edge (vertical) or top edge (horizontal)
                let across = axes.category_slot_start(index)
                    + config.bar_value_spacing
                    + column as f64 * (thickness + config.bar_dataset_spacing + stroke_width)
                    + stroke_width / 2.0;
                let (base_value, top_value) = if stacked {
                    stacks.push(index, value)
                } else {
                    (0.0, value)
                };
                running[index] += value;
                bars.push(Bar {
                    across,
                    thickness,
                    base_value,
                    top_value,
                    fill: dataset.fill_color_at(index),
                    stroke: dataset.stroke_color,
                    payload: AnnotationPayload {
                        dataset_title: dataset.title.clone(),
                        label: data.label(index).to_owned(),
                        value,
                        cumulative: running[index],
                        total: totals.total(index),
                        dataset_index,
                        index,
                    },
                });
            }
        }

        Ok((
            Self {
                kind,
                axes,
                bars,
                stroke_width,
            },
            chrome,
        ))
    }

    /// Rectangle of `bar` grown to `eased` of its final length from the
    /// zero line.
    fn bar_rect(&self, bar: &Bar, eased: f64) -> PixelRect {
        let zero = self.axes.zero_position();
        let grow = |value: f64| zero + (self.axes.value_position(value) - zero) * eased;
        let base = grow(bar.base_value);
        let top = grow(bar.top_value);
        let across_end = bar.across + bar.thickness;
        let (first, second) = match self.axes.orientation {
            Orientation::Vertical => (Point::new(bar.across, base), Point::new(across_end, top)),
            Orientation::Horizontal => (Point::new(base, bar.across), Point::new(top, across_end)),
        };
        PixelRect::from_corners(first, second)
    }
}

impl ChartGeometry for BarChart {
    fn kind(&self) -> ChartKind {
        self.kind
    }

    fn draw_scale(&self, frame: &mut RenderFrame) {
        self.axes.draw(frame);
    }

    fn draw_data(&self, frame: &mut RenderFrame, eased: f64) {
        frame.push(DrawCommand::Clip(self.axes.measurement.plot));
        for bar in &self.bars {
            let rect = self.bar_rect(bar, eased);
            frame.rect(
                RectPrimitive::new(rect.left, rect.top, rect.width, rect.height, bar.fill)
                    .with_border(bar.stroke, self.stroke_width),
            );
        }
        frame.push(DrawCommand::ResetClip);
    }

    fn annotations(&self) -> Vec<AnnotationEntry> {
        self.bars
            .iter()
            .map(|bar| AnnotationEntry::Rect {
                rect: self.bar_rect(bar, 1.0),
                payload: bar.payload.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{BarChart, bar_thickness};
    use crate::api::ChartConfig;
    use crate::charts::{ChartGeometry, ChartKind};
    use crate::core::{CategoryData, Dataset, Viewport};
    use crate::interaction::AnnotationEntry;
    use crate::layout::HeuristicTextMeasurer;

    fn data() -> CategoryData {
        CategoryData::new(["a", "b", "c"])
            .with_dataset(Dataset::new("first", [10.0, 20.0, 30.0]))
            .with_dataset(Dataset::new("second", [5.0, 15.0, 25.0]))
    }

    fn chart(kind: ChartKind) -> BarChart {
        let (chart, _) = BarChart::prepare(
            kind,
            &data(),
            &ChartConfig::for_kind(kind),
            Viewport::new(600, 400),
            &HeuristicTextMeasurer,
        )
        .expect("bar chart");
        chart
    }

    #[test]
    fn thickness_splits_slot_between_datasets() {
        assert_relative_eq!(bar_thickness(100.0, 2, 5.0, 2.0, 2.0), 42.0);
        assert_relative_eq!(bar_thickness(10.0, 4, 5.0, 2.0, 2.0), 0.0);
    }

    #[test]
    fn grouped_bars_sit_side_by_side() {
        let chart = chart(ChartKind::Bar);
        let rects: Vec<_> = chart
            .annotations()
            .into_iter()
            .map(|entry| match entry {
                AnnotationEntry::Rect { rect, .. } => rect,
                other => panic!("unexpected entry {other:?}"),
            })
            .collect();
        assert_eq!(rects.len(), 6);
        // first dataset in category a, then second dataset in category a
        assert!(rects[0].right() <= rects[3].left);
        assert_relative_eq!(rects[0].bottom(), rects[3].bottom(), epsilon = 1e-9);
        assert!(rects[2].height > rects[1].height);
    }

    #[test]
    fn stacked_bars_share_a_column() {
        let chart = chart(ChartKind::StackedBar);
        let entries = chart.annotations();
        let first = entries[0].clone();
        let stacked = entries[3].clone();
        match (first, stacked) {
            (
                AnnotationEntry::Rect { rect: lower, .. },
                AnnotationEntry::Rect {
                    rect: upper,
                    payload,
                },
            ) => {
                assert_relative_eq!(lower.left, upper.left, epsilon = 1e-9);
                assert_relative_eq!(lower.top, upper.bottom(), epsilon = 1e-9);
                assert_relative_eq!(payload.cumulative, 15.0);
                assert_relative_eq!(payload.total, 15.0);
            }
            other => panic!("unexpected entries {other:?}"),
        }
    }

    #[test]
    fn horizontal_bars_grow_to_the_right() {
        let chart = chart(ChartKind::HorizontalBar);
        match &chart.annotations()[2] {
            AnnotationEntry::Rect { rect, .. } => {
                assert!(rect.width > rect.height / 10.0);
                assert_relative_eq!(rect.left, chart.axes.zero_position(), epsilon = 1e-9);
            }
            other => panic!("unexpected entry {other:?}"),
        }
    }

    #[test]
    fn frame_grows_with_progress() {
        let chart = chart(ChartKind::Bar);
        let bar = &chart.bars[2];
        let half = chart.bar_rect(bar, 0.5);
        let full = chart.bar_rect(bar, 1.0);
        assert_relative_eq!(half.height * 2.0, full.height, epsilon = 1e-9);
    }
}
