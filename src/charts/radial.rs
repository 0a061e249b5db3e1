use std::f64::consts::{FRAC_PI_2, TAU};

use crate::api::ChartConfig;
use crate::core::{
    CalculatedScale, Point, ScaleLabelFormat, ScaleRequest, StepWindow, Template, ValueBounds,
    calculate_scale,
};
use crate::error::ChartResult;
use crate::layout::TextMeasurer;
use crate::render::{
    CirclePrimitive, Color, LinePrimitive, PathPrimitive, RectPrimitive, RenderFrame, TextHAlign,
    TextPrimitive, TextVAlign,
};

/// Ring shape of the radial gridlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RingShape {
    /// Polygons through the spokes (radar).
    Polygon,
    /// Circles (polar area).
    Circle,
}

/// Value scale measured outwards from the center.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RadialScale {
    pub center: Point,
    pub radius: f64,
    pub scale: CalculatedScale,
    pub spokes: usize,
    style: RadialStyle,
}

#[derive(Debug, Clone, PartialEq)]
struct RadialStyle {
    shape: RingShape,
    show_rings: bool,
    show_labels: bool,
    show_spokes: bool,
    ring_color: Color,
    ring_width: f64,
    spoke_color: Color,
    spoke_width: f64,
    font_family: String,
    font_size: f64,
    font_color: Color,
    backdrop: Option<(Color, f64, f64)>,
    label_widths: Vec<f64>,
}

/// Canvas angle of spoke `index` out of `count`, starting at twelve o'clock
/// and going clockwise.
#[must_use]
pub(crate) fn spoke_angle(index: usize, count: usize) -> f64 {
    -FRAC_PI_2 + index as f64 * TAU / count.max(1) as f64
}

impl RadialScale {
    pub fn build(
        bounds: ValueBounds,
        center: Point,
        radius: f64,
        spokes: usize,
        shape: RingShape,
        config: &ChartConfig,
        measurer: &dyn TextMeasurer,
    ) -> ChartResult<Self> {
        let label_format = ScaleLabelFormat {
            number: config.number_format(),
            template: Some(Template::parse(&config.scale_label)?),
        };
        let window = StepWindow::from_pixel_budget(radius, config.scale_font_size);
        let bounds = bounds.with_overrides(config.graph_min, config.graph_max);
        let request = ScaleRequest::new(bounds, window)
            .with_begin_at_zero(config.scale_begin_at_zero)
            .with_override(config.scale_override);
        let scale = calculate_scale(&request, &label_format)?;
        let label_widths = scale
            .labels
            .iter()
            .map(|label| measurer.text_width(label, config.scale_font_size, &config.font_family))
            .collect();

        Ok(Self {
            center,
            radius,
            scale,
            spokes,
            style: RadialStyle {
                shape,
                show_rings: config.scale_show_line,
                show_labels: config.scale_show_labels,
                show_spokes: config.angle_show_line_out,
                ring_color: config.scale_line_color,
                ring_width: config.scale_line_width,
                spoke_color: config.angle_line_color,
                spoke_width: config.angle_line_width,
                font_family: config.font_family.clone(),
                font_size: config.scale_font_size,
                font_color: config.scale_font_color,
                backdrop: config.scale_show_label_backdrop.then_some((
                    config.scale_backdrop_color,
                    config.scale_backdrop_padding_x,
                    config.scale_backdrop_padding_y,
                )),
                label_widths,
            },
        })
    }

    /// Pixels per value step along a spoke.
    pub fn hop(&self) -> f64 {
        self.radius / self.scale.steps.max(1) as f64
    }

    /// Distance of `value` from the center.
    pub fn distance(&self, value: f64) -> f64 {
        self.scale.offset(value, self.hop())
    }

    pub fn point_at(&self, angle: f64, distance: f64) -> Point {
        Point::new(
            self.center.x + distance * angle.cos(),
            self.center.y + distance * angle.sin(),
        )
    }

    pub fn draw(&self, frame: &mut RenderFrame) {
        let style = &self.style;
        if style.show_rings {
            for step in 1..=self.scale.steps {
                let distance = self.hop() * step as f64;
                match style.shape {
                    RingShape::Circle => frame.circle(CirclePrimitive {
                        center_x: self.center.x,
                        center_y: self.center.y,
                        radius: distance,
                        fill_color: Color::TRANSPARENT,
                        stroke_color: style.ring_color,
                        stroke_width: style.ring_width,
                    }),
                    RingShape::Polygon => {
                        let mut ring = PathPrimitive::new();
                        for spoke in 0..self.spokes {
                            let point = self.point_at(spoke_angle(spoke, self.spokes), distance);
                            if spoke == 0 {
                                ring.move_to(point.x, point.y);
                            } else {
                                ring.line_to(point.x, point.y);
                            }
                        }
                        ring.closed = true;
                        ring.stroke_color = Some(style.ring_color);
                        ring.stroke_width = style.ring_width;
                        frame.path(ring);
                    }
                }
            }
        }

        if style.show_spokes && style.shape == RingShape::Polygon {
            for spoke in 0..self.spokes {
                let end = self.point_at(spoke_angle(spoke, self.spokes), self.radius);
                frame.line(LinePrimitive::new(
                    self.center.x,
                    self.center.y,
                    end.x,
                    end.y,
                    style.spoke_width,
                    style.spoke_color,
                ));
            }
        }

        if !style.show_labels {
            return;
        }
        // scale labels run up the twelve o'clock spoke
        for (step, label) in self.scale.labels.iter().enumerate().skip(1) {
            if label.is_empty() {
                continue;
            }
            let y = self.center.y - self.hop() * step as f64;
            if let Some((color, padding_x, padding_y)) = style.backdrop {
                let width = style.label_widths.get(step).copied().unwrap_or(0.0);
                frame.rect(RectPrimitive::new(
                    self.center.x - width / 2.0 - padding_x,
                    y - style.font_size / 2.0 - padding_y,
                    width + 2.0 * padding_x,
                    style.font_size + 2.0 * padding_y,
                    color,
                ));
            }
            frame.text(
                TextPrimitive::new(
                    label.clone(),
                    self.center.x,
                    y,
                    style.font_size,
                    style.font_color,
                    TextHAlign::Center,
                )
                .with_font_family(style.font_family.clone())
                .with_v_align(TextVAlign::Middle),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use approx::assert_relative_eq;

    use super::{RadialScale, RingShape, spoke_angle};
    use crate::api::ChartConfig;
    use crate::charts::ChartKind;
    use crate::core::{Point, ValueBounds, Viewport};
    use crate::layout::HeuristicTextMeasurer;
    use crate::render::{RenderFrame, TextPrimitive};

    #[test]
    fn first_spoke_points_up() {
        assert_relative_eq!(spoke_angle(0, 5), -FRAC_PI_2);
        assert_relative_eq!(spoke_angle(1, 4), 0.0);
    }

    #[test]
    fn distances_stay_inside_radius() {
        let scale = RadialScale::build(
            ValueBounds::new(0.0, 80.0),
            Point::new(100.0, 100.0),
            90.0,
            5,
            RingShape::Polygon,
            &ChartConfig::for_kind(ChartKind::Radar),
            &HeuristicTextMeasurer,
        )
        .expect("radial scale");
        assert_relative_eq!(scale.distance(0.0), 0.0);
        assert!(scale.distance(80.0) <= 90.0 + 1e-9);
        assert_relative_eq!(scale.distance(1e9), 90.0, epsilon = 1e-9);

        let mut frame = RenderFrame::new(Viewport::new(200, 200));
        scale.draw(&mut frame);
        let texts: Vec<&TextPrimitive> = frame.texts();
        assert_eq!(texts.len(), scale.scale.steps);
    }
}
