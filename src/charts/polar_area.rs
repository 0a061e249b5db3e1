use std::f64::consts::TAU;

use tracing::trace;

use super::radial::{RadialScale, RingShape};
use super::{ChartGeometry, ChartKind, MAX_DRAWN_SWEEP, segment_legend};
use crate::api::ChartConfig;
use crate::core::{Segment, Viewport, segment_bounds};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{AnnotationEntry, AnnotationPayload};
use crate::layout::{RadialMeasureRequest, TextMeasurer, measure_radial};
use crate::render::{ArcPrimitive, Color, DrawCommand, RenderFrame};

#[derive(Debug, Clone, PartialEq)]
struct PolarSlice {
    start_angle: f64,
    distance: f64,
    color: Color,
    payload: AnnotationPayload,
}

/// Polar area geometry: equal angular slots, radius proportional to value
/// along the radial scale.
#[derive(Debug, Clone, PartialEq)]
pub struct PolarAreaChart {
    radial: RadialScale,
    base_angle: f64,
    slot: f64,
    slices: Vec<PolarSlice>,
    stroke: Option<(Color, f64)>,
    animate_rotate: bool,
    animate_scale: bool,
}

impl PolarAreaChart {
    pub(crate) fn prepare(
        segments: &[Segment],
        config: &ChartConfig,
        viewport: Viewport,
        measurer: &dyn TextMeasurer,
    ) -> ChartResult<(Self, Vec<DrawCommand>)> {
        let bounds = segment_bounds(segments).ok_or_else(|| {
            ChartError::InvalidData("polar area chart has no drawable segments".to_owned())
        })?;
        let layout = measure_radial(
            RadialMeasureRequest {
                viewport,
                config,
                point_labels: &[],
                legend: segment_legend(segments, config),
            },
            measurer,
        )?;
        let radial = RadialScale::build(
            bounds,
            layout.center,
            layout.radius,
            segments.len(),
            RingShape::Circle,
            config,
            measurer,
        )?;

        let base_angle = -config.start_angle.to_radians();
        let slot = TAU / segments.len().max(1) as f64;
        let total: f64 = segments
            .iter()
            .filter(|segment| segment.is_drawable())
            .map(|segment| segment.value)
            .sum();
        let mut cumulative = 0.0;
        let mut slices = Vec::with_capacity(segments.len());
        for (index, segment) in segments.iter().enumerate() {
            if !segment.is_drawable() {
                trace!(index, value = segment.value, "skipping undrawable segment");
                continue;
            }
            cumulative += segment.value;
            slices.push(PolarSlice {
                start_angle: base_angle + index as f64 * slot,
                distance: radial.distance(segment.value),
                color: segment.color,
                payload: AnnotationPayload {
                    dataset_title: String::new(),
                    label: segment.title_or_empty().to_owned(),
                    value: segment.value,
                    cumulative,
                    total,
                    dataset_index: 0,
                    index,
                },
            });
        }

        Ok((
            Self {
                radial,
                base_angle,
                slot,
                slices,
                stroke: config
                    .segment_show_stroke
                    .then_some((config.segment_stroke_color, config.segment_stroke_width)),
                animate_rotate: config.animate_rotate,
                animate_scale: config.animate_scale,
            },
            layout.chrome,
        ))
    }
}

impl ChartGeometry for PolarAreaChart {
    fn kind(&self) -> ChartKind {
        ChartKind::PolarArea
    }

    fn draw_scale(&self, frame: &mut RenderFrame) {
        self.radial.draw(frame);
    }

    fn draw_data(&self, frame: &mut RenderFrame, eased: f64) {
        let rotate = if self.animate_rotate { eased } else { 1.0 };
        let scale = if self.animate_scale { eased } else { 1.0 };
        let (stroke_color, stroke_width) = self.stroke.unwrap_or((Color::TRANSPARENT, 0.0));
        let sweep = (self.slot * rotate).min(MAX_DRAWN_SWEEP);
        for slice in &self.slices {
            let start = self.base_angle + (slice.start_angle - self.base_angle) * rotate;
            frame.arc(ArcPrimitive {
                center_x: self.radial.center.x,
                center_y: self.radial.center.y,
                inner_radius: 0.0,
                outer_radius: slice.distance * scale,
                start_angle: start,
                end_angle: start + sweep,
                fill_color: slice.color,
                stroke_color,
                stroke_width,
            });
        }
    }

    fn annotations(&self) -> Vec<AnnotationEntry> {
        self.slices
            .iter()
            .map(|slice| AnnotationEntry::Arc {
                center: self.radial.center,
                inner_radius: 0.0,
                outer_radius: slice.distance,
                start_angle: slice.start_angle,
                end_angle: slice.start_angle + self.slot,
                payload: slice.payload.clone(),
            })
            .collect()
    }
}
