use tracing::trace;

use super::radial::{RadialScale, RingShape, spoke_angle};
use super::{ChartGeometry, ChartKind, dataset_legend};
use crate::api::ChartConfig;
use crate::core::{CategoryData, Point, Viewport, series_bounds};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{AnnotationEntry, AnnotationPayload};
use crate::layout::{RadialMeasureRequest, TextMeasurer, measure_radial};
use crate::render::{
    CirclePrimitive, Color, DrawCommand, PathPrimitive, RenderFrame, TextHAlign, TextPrimitive,
    TextVAlign,
};

const POINT_LABEL_GAP: f64 = 5.0;

#[derive(Debug, Clone, PartialEq)]
struct RadarPoint {
    spoke: usize,
    value: f64,
    payload: AnnotationPayload,
}

#[derive(Debug, Clone, PartialEq)]
struct RadarSeries {
    points: Vec<RadarPoint>,
    fill: Color,
    stroke: Color,
    point_fill: Color,
    point_stroke: Color,
}

/// Radar geometry: one spoke per category, one polygon per dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct RadarChart {
    radial: RadialScale,
    labels: Vec<String>,
    series: Vec<RadarSeries>,
    style: RadarStyle,
}

#[derive(Debug, Clone, PartialEq)]
struct RadarStyle {
    fill: bool,
    stroke: bool,
    stroke_width: f64,
    point_dot: bool,
    point_radius: f64,
    point_stroke_width: f64,
    font_family: String,
    label_font_size: f64,
    label_font_color: Color,
}

impl RadarChart {
    pub(crate) fn prepare(
        data: &CategoryData,
        config: &ChartConfig,
        viewport: Viewport,
        measurer: &dyn TextMeasurer,
    ) -> ChartResult<(Self, Vec<DrawCommand>)> {
        data.validate()?;
        let bounds = series_bounds(data)
            .ok_or_else(|| ChartError::InvalidData("radar chart has no finite values".to_owned()))?;
        let spokes = data.category_count();
        let labels: Vec<String> = (0..spokes).map(|i| data.label(i).to_owned()).collect();
        let layout = measure_radial(
            RadialMeasureRequest {
                viewport,
                config,
                point_labels: &labels,
                legend: dataset_legend(data, config),
            },
            measurer,
        )?;
        let radial = RadialScale::build(
            bounds,
            layout.center,
            layout.radius,
            spokes,
            RingShape::Polygon,
            config,
            measurer,
        )?;

        let mut totals = vec![0.0; spokes];
        for dataset in &data.datasets {
            for (index, total) in totals.iter_mut().enumerate() {
                *total += dataset.value(index).unwrap_or(0.0);
            }
        }
        let mut running = vec![0.0; spokes];
        let mut series = Vec::with_capacity(data.datasets.len());
        for (dataset_index, dataset) in data.datasets.iter().enumerate() {
            let mut points = Vec::with_capacity(spokes);
            for spoke in 0..spokes {
                let Some(value) = dataset.value(spoke) else {
                    trace!(dataset_index, spoke, "skipping missing radar value");
                    continue;
                };
                running[spoke] += value;
                points.push(RadarPoint {
                    spoke,
                    value,
                    payload: AnnotationPayload {
                        dataset_title: dataset.title.clone(),
                        label: data.label(spoke).to_owned(),
                        value,
                        cumulative: running[spoke],
                        total: totals[spoke],
                        dataset_index,
                        index: spoke,
                    },
                });
            }
            series.push(RadarSeries {
                points,
                fill: dataset.fill_color,
                stroke: dataset.stroke_color,
                point_fill: dataset.point_color,
                point_stroke: dataset.point_stroke_color,
            });
        }

        Ok((
            Self {
                radial,
                labels,
                series,
                style: RadarStyle {
                    fill: config.dataset_fill,
                    stroke: config.dataset_stroke,
                    stroke_width: config.dataset_stroke_width,
                    point_dot: config.point_dot,
                    point_radius: config.point_dot_radius,
                    point_stroke_width: config.point_dot_stroke_width,
                    font_family: config.font_family.clone(),
                    label_font_size: config.point_label_font_size,
                    label_font_color: config.point_label_font_color,
                },
            },
            layout.chrome,
        ))
    }

    fn position(&self, point: &RadarPoint, eased: f64) -> Point {
        let angle = spoke_angle(point.spoke, self.radial.spokes);
        self.radial
            .point_at(angle, self.radial.distance(point.value) * eased)
    }
}

impl ChartGeometry for RadarChart {
    fn kind(&self) -> ChartKind {
        ChartKind::Radar
    }

    fn draw_scale(&self, frame: &mut RenderFrame) {
        self.radial.draw(frame);
        for (spoke, label) in self.labels.iter().enumerate() {
            if label.is_empty() {
                continue;
            }
            let angle = spoke_angle(spoke, self.radial.spokes);
            let anchor = self
                .radial
                .point_at(angle, self.radial.radius + POINT_LABEL_GAP);
            let cos = angle.cos();
            let h_align = if cos > 1e-6 {
                TextHAlign::Left
            } else if cos < -1e-6 {
                TextHAlign::Right
            } else {
                TextHAlign::Center
            };
            let sin = angle.sin();
            let v_align = if sin > 1e-6 {
                TextVAlign::Top
            } else if sin < -1e-6 {
                TextVAlign::Bottom
            } else {
                TextVAlign::Middle
            };
            frame.text(
                TextPrimitive::new(
                    label.clone(),
                    anchor.x,
                    anchor.y,
                    self.style.label_font_size,
                    self.style.label_font_color,
                    h_align,
                )
                .with_font_family(self.style.font_family.clone())
                .with_v_align(v_align),
            );
        }
    }

    fn draw_data(&self, frame: &mut RenderFrame, eased: f64) {
        for series in &self.series {
            let mut polygon = PathPrimitive::new();
            for (index, point) in series.points.iter().enumerate() {
                let position = self.position(point, eased);
                if index == 0 {
                    polygon.move_to(position.x, position.y);
                } else {
                    polygon.line_to(position.x, position.y);
                }
            }
            polygon.closed = true;
            if self.style.fill {
                polygon.fill_color = Some(series.fill);
            }
            if self.style.stroke {
                polygon.stroke_color = Some(series.stroke);
                polygon.stroke_width = self.style.stroke_width;
            }
            if polygon.fill_color.is_some() || polygon.stroke_color.is_some() {
                frame.path(polygon);
            }

            if self.style.point_dot {
                for point in &series.points {
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
    }

    fn annotations(&self) -> Vec<AnnotationEntry> {
        self.series
            .iter()
            .flat_map(|series| series.points.iter())
            .map(|point| AnnotationEntry::Point {
                position: self.position(point, 1.0),
                payload: point.payload.clone(),
            })
            .collect()
    }
}
