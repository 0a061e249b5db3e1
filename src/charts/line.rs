use tracing::trace;

use super::cartesian::{AxesRequest, CartesianAxes, Orientation};
use super::{ChartGeometry, ChartKind, dataset_legend};
use crate::api::ChartConfig;
use crate::core::{CategoryData, Point, Viewport, series_bounds};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{AnnotationEntry, AnnotationPayload};
use crate::layout::TextMeasurer;
use crate::render::{CirclePrimitive, Color, DrawCommand, PathPrimitive, RenderFrame};

#[derive(Debug, Clone, PartialEq)]
struct LinePoint {
    x: f64,
    value: f64,
    payload: AnnotationPayload,
}

/// One dataset split into runs of consecutive present points.
#[derive(Debug, Clone, PartialEq)]
struct Series {
    runs: Vec<Vec<LinePoint>>,
    fill: Color,
    stroke: Color,
    point_fill: Color,
    point_stroke: Color,
}

#[derive(Debug, Clone, PartialEq)]
struct LineStyle {
    bezier: bool,
    fill: bool,
    stroke: bool,
    stroke_width: f64,
    point_dot: bool,
    point_radius: f64,
    point_stroke_width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    axes: CartesianAxes,
    series: Vec<Series>,
    style: LineStyle,
}

/// Control points of the smoothing curve from `from` to `to`: both sit at
/// the horizontal midpoint, level with their end point.
#[must_use]
pub fn bezier_controls(from: Point, to: Point) -> (Point, Point) {
    let mid_x = (from.x + to.x) / 2.0;
    (Point::new(mid_x, from.y), Point::new(mid_x, to.y))
}

impl LineChart {
    pub(crate) fn prepare(
        data: &CategoryData,
        config: &ChartConfig,
        viewport: Viewport,
        measurer: &dyn TextMeasurer,
    ) -> ChartResult<(Self, Vec<DrawCommand>)> {
        data.validate()?;
        let bounds = series_bounds(data)
            .ok_or_else(|| ChartError::InvalidData("line chart has no finite values".to_owned()))?;
        let categories = data.category_count();
        let labels: Vec<String> = (0..categories).map(|i| data.label(i).to_owned()).collect();
        let (axes, chrome) = CartesianAxes::build(
            AxesRequest {
                orientation: Orientation::Vertical,
                bounds,
                category_labels: &labels,
                categories_centered: false,
                allow_logarithmic: ChartKind::Line.supports_logarithmic(),
                legend: dataset_legend(data, config),
            },
            config,
            viewport,
            measurer,
        )?;

        let mut totals = vec![0.0; categories];
        for dataset in &data.datasets {
            for (index, total) in totals.iter_mut().enumerate() {
                *total += dataset.value(index).unwrap_or(0.0);
            }
        }
        let mut running = vec![0.0; categories];

        let series = data
            .datasets
            .iter()
            .enumerate()
            .map(|(dataset_index, dataset)| {
                let mut runs = Vec::new();
                let mut current = Vec::new();
                for index in 0..categories {
                    let Some(value) = dataset.value(index) else {
                        trace!(dataset_index, index, "gap in line series");
                        if !current.is_empty() {
                            runs.push(std::mem::take(&mut current));
                        }
                        continue;
                    };
                    running[index] += value;
                    current.push(LinePoint {
                        x: axes.category_position(index),
                        value,
                        payload: AnnotationPayload {
                            dataset_title: dataset.title.clone(),
                            label: data.label(index).to_owned(),
                            value,
                            cumulative: running[index],
                            total: totals[index],
                            dataset_index,
                            index,
                        },
                    });
                }
                if !current.is_empty() {
                    runs.push(current);
                }
                Series {
                    runs,
                    fill: dataset.fill_color,
                    stroke: dataset.stroke_color,
                    point_fill: dataset.point_color,
                    point_stroke: dataset.point_stroke_color,
                }
            })
            .collect();

        Ok((
            Self {
                axes,
                series,
                style: LineStyle {
                    bezier: config.bezier_curve,
                    fill: config.dataset_fill,
                    stroke: config.dataset_stroke,
                    stroke_width: config.dataset_stroke_width,
                    point_dot: config.point_dot,
                    point_radius: config.point_dot_radius,
                    point_stroke_width: config.point_dot_stroke_width,
                },
            },
            chrome,
        ))
    }

    fn position(&self, point: &LinePoint, eased: f64) -> Point {
        let zero = self.axes.zero_position();
        Point::new(
            point.x,
            zero + (self.axes.value_position(point.value) - zero) * eased,
        )
    }

    fn trace_run(&self, path: &mut PathPrimitive, run: &[LinePoint], eased: f64) {
        let mut previous: Option<Point> = None;
        for point in run {
            let next = self.position(point, eased);
            match previous {
                None => path.move_to(next.x, next.y),
                Some(from) if self.style.bezier => {
                    let (c1, c2) = bezier_controls(from, next);
                    path.curve_to(c1.x, c1.y, c2.x, c2.y, next.x, next.y);
                }
                Some(_) => path.line_to(next.x, next.y),
            }
            previous = Some(next);
        }
    }
}

impl ChartGeometry for LineChart {
    fn kind(&self) -> ChartKind {
        ChartKind::Line
    }

    fn draw_scale(&self, frame: &mut RenderFrame) {
        self.axes.draw(frame);
    }

    fn draw_data(&self, frame: &mut RenderFrame, eased: f64) {
        let zero = self.axes.zero_position();
        frame.push(DrawCommand::Clip(self.axes.measurement.plot));
        for series in &self.series {
            for run in &series.runs {
                let (Some(first), Some(last)) = (run.first(), run.last()) else {
                    continue;
                };
                if self.style.fill {
                    let mut area = PathPrimitive::new();
                    self.trace_run(&mut area, run, eased);
                    area.line_to(last.x, zero);
                    area.line_to(first.x, zero);
                    area.closed = true;
                    area.fill_color = Some(series.fill);
                    frame.path(area);
                }
                if self.style.stroke && run.len() > 1 {
                    let mut line = PathPrimitive::new();
                    self.trace_run(&mut line, run, eased);
                    line.stroke_color = Some(series.stroke);
                    line.stroke_width = self.style.stroke_width;
                    frame.path(line);
                }
            }
        }
        frame.push(DrawCommand::ResetClip);

        if !self.style.point_dot {
            return;
        }
        for series in &self.series {
            for point in series.runs.iter().flatten() {
                let center = self.position(point, eased);
                frame.circle(CirclePrimitive {
                    center_x: center.x,
                    center_y: center.y,
                    radius: self.style.point_radius,
                    fill_color: series.point_fill,
                    stroke_color: series.point_stroke,
                    stroke_width: self.style.point_stroke_width,
                });
            }
        }
    }

    fn annotations(&self) -> Vec<AnnotationEntry> {
        self.series
            .iter()
            .flat_map(|series| series.runs.iter().flatten())
            .map(|point| AnnotationEntry::Point {
                position: self.position(point, 1.0),
                payload: point.payload.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{LineChart, bezier_controls};
    use crate::api::ChartConfig;
    use crate::charts::{ChartGeometry, ChartKind};
    use crate::core::{CategoryData, Dataset, Point, Viewport};
    use crate::layout::HeuristicTextMeasurer;
    use crate::render::{DrawCommand, PathSegment, RenderFrame};

    fn prepare(data: &CategoryData, config: &ChartConfig) -> LineChart {
        LineChart::prepare(data, config, Viewport::new(600, 400), &HeuristicTextMeasurer)
            .expect("line chart")
            .0
    }

    #[test]
    fn controls_sit_at_horizontal_midpoint() {
        let (c1, c2) = bezier_controls(Point::new(0.0, 10.0), Point::new(20.0, 30.0));
        assert_eq!(c1, Point::new(10.0, 10.0));
        assert_eq!(c2, Point::new(10.0, 30.0));
    }

    #[test]
    fn missing_points_split_the_series() {
        let mut dataset = Dataset::new("s", [1.0, 2.0, 3.0, 4.0]);
        dataset.data[2] = None;
        let data = CategoryData::new(["a", "b", "c", "d"]).with_dataset(dataset);
        let chart = prepare(&data, &ChartConfig::for_kind(ChartKind::Line));
        assert_eq!(chart.series[0].runs.len(), 2);
        assert_eq!(chart.annotations().len(), 3);
    }

    #[test]
    fn straight_segments_without_bezier() {
        let data = CategoryData::new(["a", "b", "c"]).with_dataset(Dataset::new("s", [1.0, 5.0, 2.0]));
        let config = ChartConfig {
            bezier_curve: false,
            dataset_fill: false,
            ..ChartConfig::for_kind(ChartKind::Line)
        };
        let chart = prepare(&data, &config);
        let mut frame = RenderFrame::new(Viewport::new(600, 400));
        chart.draw_data(&mut frame, 1.0);
        let paths: Vec<_> = frame
            .commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Path(path) => Some(path),
                _ => None,
            })
            .collect();
        assert_eq!(paths.len(), 1);
        assert!(
            paths[0]
                .segments
                .iter()
                .all(|segment| !matches!(segment, PathSegment::CurveTo { .. }))
        );
    }

    #[test]
    fn points_rise_from_the_zero_line() {
        let data = CategoryData::new(["a", "b"]).with_dataset(Dataset::new("s", [10.0, 20.0]));
        let chart = prepare(&data, &ChartConfig::for_kind(ChartKind::Line));
        let point = &chart.series[0].runs[0][1];
        let zero = chart.axes.zero_position();
        let full = chart.position(point, 1.0);
        let half = chart.position(point, 0.5);
        assert_relative_eq!(zero - half.y, (zero - full.y) / 2.0, epsilon = 1e-9);
    }
}
