use std::f64::consts::TAU;

use tracing::trace;

use super::{ChartGeometry, ChartKind, segment_legend};
use crate::api::ChartConfig;
use crate::core::{Point, Segment, Viewport};
use crate::error::ChartResult;
use crate::interaction::{AnnotationEntry, AnnotationPayload};
use crate::layout::{RadialMeasureRequest, TextMeasurer, measure_radial};
use crate::render::{ArcPrimitive, Color, DrawCommand, RenderFrame};

/// Largest sweep handed to a backend; a full circle would collapse to an
/// empty arc in most path implementations.
pub const MAX_DRAWN_SWEEP: f64 = TAU - 1e-3;

/// One sector with its true (uncapped) angles.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub start_angle: f64,
    pub sweep: f64,
    pub color: Color,
    pub payload: AnnotationPayload,
}

/// Lays segments out clockwise from `start_angle_deg` (0° = three o'clock,
/// 90° = twelve o'clock, counter-clockwise positive).
///
/// Non-drawable segments are skipped; a zero total yields no slices.
#[must_use]
pub fn layout_slices(segments: &[Segment], start_angle_deg: f64) -> Vec<Slice> {
    let total: f64 = segments
        .iter()
        .filter(|segment| segment.is_drawable())
        .map(|segment| segment.value)
        .sum();
    if total <= 0.0 {
        return Vec::new();
    }

    let mut angle = -start_angle_deg.to_radians();
    let mut cumulative = 0.0;
    let mut slices = Vec::with_capacity(segments.len());
    for (index, segment) in segments.iter().enumerate() {
        if !segment.is_drawable() {
            trace!(index, value = segment.value, "skipping undrawable segment");
            continue;
        }
        cumulative += segment.value;
        let sweep = segment.value / total * TAU;
        slices.push(Slice {
            start_angle: angle,
            sweep,
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
        angle += sweep;
    }
    slices
}

/// Pie and Doughnut geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct PieChart {
    kind: ChartKind,
    center: Point,
    radius: f64,
    /// Inner radius as a fraction of the outer radius.
    cutout: f64,
    base_angle: f64,
    slices: Vec<Slice>,
    stroke: Option<(Color, f64)>,
    animate_rotate: bool,
    animate_scale: bool,
}

impl PieChart {
    pub(crate) fn prepare(
        kind: ChartKind,
        segments: &[Segment],
        config: &ChartConfig,
        viewport: Viewport,
        measurer: &dyn TextMeasurer,
    ) -> ChartResult<(Self, Vec<DrawCommand>)> {
        let layout = measure_radial(
            RadialMeasureRequest {
                viewport,
                config,
                point_labels: &[],
                legend: segment_legend(segments, config),
            },
            measurer,
        )?;
        let cutout = if kind == ChartKind::Doughnut {
            config.percentage_inner_cutout / 100.0
        } else {
            0.0
        };
        let chart = Self {
            kind,
            center: layout.center,
            radius: layout.radius,
            cutout,
            base_angle: -config.start_angle.to_radians(),
            slices: layout_slices(segments, config.start_angle),
            stroke: config
                .segment_show_stroke
                .then_some((config.segment_stroke_color, config.segment_stroke_width)),
            animate_rotate: config.animate_rotate,
            animate_scale: config.animate_scale,
        };
        Ok((chart, layout.chrome))
    }

    #[must_use]
    pub fn slices(&self) -> &[Slice] {
        &self.slices
    }
}

impl ChartGeometry for PieChart {
    fn kind(&self) -> ChartKind {
        self.kind
    }

    fn draw_scale(&self, _frame: &mut RenderFrame) {}

    fn draw_data(&self, frame: &mut RenderFrame, eased: f64) {
        let rotate = if self.animate_rotate { eased } else { 1.0 };
        let scale = if self.animate_scale { eased } else { 1.0 };
        let outer = self.radius * scale;
        let (stroke_color, stroke_width) = self.stroke.unwrap_or((Color::TRANSPARENT, 0.0));
        for slice in &self.slices {
            let start = self.base_angle + (slice.start_angle - self.base_angle) * rotate;
            let sweep = (slice.sweep * rotate).min(MAX_DRAWN_SWEEP);
            frame.arc(ArcPrimitive {
                center_x: self.center.x,
                center_y: self.center.y,
                inner_radius: outer * self.cutout,
                outer_radius: outer,
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
                center: self.center,
                inner_radius: self.radius * self.cutout,
                outer_radius: self.radius,
                start_angle: slice.start_angle,
                end_angle: slice.start_angle + slice.sweep,
                payload: slice.payload.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, TAU};

    use approx::assert_relative_eq;

    use super::{MAX_DRAWN_SWEEP, PieChart, layout_slices};
    use crate::api::ChartConfig;
    use crate::charts::{ChartGeometry, ChartKind};
    use crate::core::{Segment, Viewport};
    use crate::layout::HeuristicTextMeasurer;
    use crate::render::{Color, RenderFrame};

    #[test]
    fn slices_start_at_twelve_o_clock() {
        let slices = layout_slices(
            &[Segment::new(10.0, Color::BLACK), Segment::new(30.0, Color::WHITE)],
            90.0,
        );
        assert_relative_eq!(slices[0].start_angle, -FRAC_PI_2);
        assert_relative_eq!(slices[0].sweep.to_degrees(), 90.0, epsilon = 1e-9);
        assert_relative_eq!(slices[1].sweep.to_degrees(), 270.0, epsilon = 1e-9);
        assert_relative_eq!(slices[0].payload.cumulative, 10.0);
        assert_relative_eq!(slices[1].payload.cumulative, 40.0);
    }

    #[test]
    fn zero_total_draws_nothing() {
        assert!(layout_slices(&[Segment::new(0.0, Color::BLACK)], 90.0).is_empty());
        assert!(layout_slices(&[], 90.0).is_empty());
    }

    #[test]
    fn negative_segments_are_skipped() {
        let slices = layout_slices(
            &[Segment::new(-5.0, Color::BLACK), Segment::new(5.0, Color::BLACK)],
            0.0,
        );
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].payload.index, 1);
        assert_relative_eq!(slices[0].sweep, TAU);
    }

    #[test]
    fn single_segment_is_capped_for_drawing_only() {
        let (chart, _) = PieChart::prepare(
            ChartKind::Doughnut,
            &[Segment::new(3.0, Color::BLACK)],
            &ChartConfig::for_kind(ChartKind::Doughnut),
            Viewport::new(400, 400),
            &HeuristicTextMeasurer,
        )
        .expect("doughnut");
        let mut frame = RenderFrame::new(Viewport::new(400, 400));
        chart.draw_data(&mut frame, 1.0);
        let arc = frame.arcs()[0];
        assert_relative_eq!(arc.end_angle - arc.start_angle, MAX_DRAWN_SWEEP);
        assert_relative_eq!(arc.inner_radius, arc.outer_radius * 0.5);
        assert_relative_eq!(chart.annotations()[0].sweep(), TAU);
    }
}
