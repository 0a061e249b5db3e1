use tracing::trace;

use crate::api::ChartConfig;
use crate::core::{
    CalculatedScale, LogarithmicMode, ScaleLabelFormat, ScaleRequest, StepWindow, Template,
    ValueBounds, Viewport, calculate_scale,
};
use crate::error::ChartResult;
use crate::layout::{AxisSpec, LegendEntry, MeasureRequest, Measurement, TextMeasurer, measure};
use crate::render::{
    Color, DrawCommand, LinePrimitive, RenderFrame, TextHAlign, TextPrimitive, TextVAlign,
};

/// Which screen axis carries the value scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Orientation {
    /// Values grow upwards, categories run left to right.
    Vertical,
    /// Values grow to the right, categories run bottom to top.
    Horizontal,
}

pub(crate) struct AxesRequest<'a> {
    pub orientation: Orientation,
    pub bounds: ValueBounds,
    pub category_labels: &'a [String],
    /// Bars sit inside category slots; line points sit on slot boundaries.
    pub categories_centered: bool,
    pub allow_logarithmic: bool,
    pub legend: Vec<LegendEntry>,
}

/// Value scale and measurement of a bar or line chart.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CartesianAxes {
    pub orientation: Orientation,
    pub scale: CalculatedScale,
    pub measurement: Measurement,
    pub category_labels: Vec<String>,
    pub categories_centered: bool,
    style: AxesStyle,
}

#[derive(Debug, Clone, PartialEq)]
struct AxesStyle {
    show_labels: bool,
    show_grid_lines: bool,
    font_family: String,
    font_size: f64,
    font_color: Color,
    label_spacing: f64,
    line_color: Color,
    line_width: f64,
    grid_color: Color,
    grid_width: f64,
}

impl CartesianAxes {
    /// Computes scale and measurement together.
    ///
    /// The step window depends on the axis length, and the axis length on
    /// the width of the value labels, so the scale is computed against the
    /// whole canvas first and refined once against the measured axis.
    pub fn build(
        request: AxesRequest<'_>,
        config: &ChartConfig,
        viewport: Viewport,
        measurer: &dyn TextMeasurer,
    ) -> ChartResult<(Self, Vec<DrawCommand>)> {
        let label_format = ScaleLabelFormat {
            number: config.number_format(),
            template: Some(Template::parse(&config.scale_label)?),
        };
        let logarithmic = if request.allow_logarithmic {
            config.logarithmic
        } else {
            LogarithmicMode::Off
        };
        let bounds = request
            .bounds
            .with_overrides(config.graph_min, config.graph_max);
        let scale_for = |budget: f64| {
            let window = StepWindow::from_pixel_budget(budget, config.scale_font_size);
            let mut scale_request = ScaleRequest::new(bounds, window)
                .with_logarithmic(logarithmic)
                .with_begin_at_zero(config.scale_begin_at_zero)
                .with_override(config.scale_override);
            scale_request.fuzzy_threshold = config.logarithmic_fuzzy_threshold;
            calculate_scale(&scale_request, &label_format)
        };
        let category_slots = if request.categories_centered {
            request.category_labels.len()
        } else {
            request.category_labels.len().saturating_sub(1)
        };
        let measure_with = |scale: &CalculatedScale| {
            let value_axis = AxisSpec::new(&scale.labels, scale.steps, false);
            let category_axis = AxisSpec::new(
                request.category_labels,
                category_slots,
                request.categories_centered,
            );
            let (x_axis, y_axis) = match request.orientation {
                Orientation::Vertical => (category_axis, value_axis),
                Orientation::Horizontal => (value_axis, category_axis),
            };
            measure(
                MeasureRequest {
                    viewport,
                    config,
                    x_axis,
                    y_axis,
                    legend: request.legend.clone(),
                },
                measurer,
            )
        };
        let value_extent = |measurement: &Measurement| match request.orientation {
            Orientation::Vertical => measurement.available_height,
            Orientation::Horizontal => measurement.available_width,
        };

        let canvas_extent = match request.orientation {
            Orientation::Vertical => viewport.height_px(),
            Orientation::Horizontal => viewport.width_px(),
        };
        let mut scale = scale_for(canvas_extent)?;
        let mut layout = measure_with(&scale)?;
        let refined = scale_for(value_extent(&layout.measurement))?;
        if refined != scale {
            trace!(
                steps = refined.steps,
                "refined value scale against measured axis"
            );
            scale = refined;
            layout = measure_with(&scale)?;
        }

        let axes = Self {
            orientation: request.orientation,
            scale,
            measurement: layout.measurement,
            category_labels: request.category_labels.to_vec(),
            categories_centered: request.categories_centered,
            style: AxesStyle {
                show_labels: config.scale_show_labels,
                show_grid_lines: config.scale_show_grid_lines,
                font_family: config.font_family.clone(),
                font_size: config.scale_font_size,
                font_color: config.scale_font_color,
                label_spacing: config.scale_label_spacing,
                line_color: config.scale_line_color,
                line_width: config.scale_line_width,
                grid_color: config.scale_grid_line_color,
                grid_width: config.scale_grid_line_width,
            },
        };
        Ok((axes, layout.chrome))
    }

    /// Pixels per value step.
    pub fn value_hop(&self) -> f64 {
        match self.orientation {
            Orientation::Vertical => self.measurement.y_hop,
            Orientation::Horizontal => self.measurement.x_hop,
        }
    }

    /// Pixels per category slot.
    pub fn category_hop(&self) -> f64 {
        match self.orientation {
            Orientation::Vertical => self.measurement.x_hop,
            Orientation::Horizontal => self.measurement.y_hop,
        }
    }

    /// Screen coordinate of `value` along the value axis.
    pub fn value_position(&self, value: f64) -> f64 {
        let offset = self.scale.offset(value, self.value_hop());
        match self.orientation {
            Orientation::Vertical => self.measurement.x_axis_pos_y - offset,
            Orientation::Horizontal => self.measurement.y_axis_pos_x + offset,
        }
    }

    /// Screen coordinate of the zero line, clamped into the scale.
    pub fn zero_position(&self) -> f64 {
        self.value_position(0.0)
    }

    /// Screen coordinate of category `index` (slot center or boundary).
    pub fn category_position(&self, index: usize) -> f64 {
        match self.orientation {
            Orientation::Vertical => self.measurement.x_at(index, self.categories_centered),
            Orientation::Horizontal => self.measurement.y_at(index, self.categories_centered),
        }
    }

    /// Leading edge of the slot of category `index`.
    pub fn category_slot_start(&self, index: usize) -> f64 {
        match self.orientation {
            Orientation::Vertical => self.measurement.x_at(index, false),
            Orientation::Horizontal => self.measurement.y_at(index + 1, false),
        }
    }

    pub fn draw(&self, frame: &mut RenderFrame) {
        let m = &self.measurement;
        let plot = m.plot;
        let style = &self.style;

        if style.show_grid_lines {
            for step in 1..=self.scale.steps {
                let position = self.value_position(self.scale.gridline_value(step));
                let (x1, y1, x2, y2) = match self.orientation {
                    Orientation::Vertical => (plot.left, position, plot.right(), position),
                    Orientation::Horizontal => (position, plot.top, position, plot.bottom()),
                };
                frame.line(LinePrimitive::new(
                    x1,
                    y1,
                    x2,
                    y2,
                    style.grid_width,
                    style.grid_color,
                ));
            }
            let boundaries = if self.categories_centered {
                self.category_labels.len()
            } else {
                self.category_labels.len().saturating_sub(1)
            };
            for index in 1..=boundaries {
                let position = match self.orientation {
                    Orientation::Vertical => m.x_at(index, false),
                    Orientation::Horizontal => m.y_at(index, false),
                };
                let (x1, y1, x2, y2) = match self.orientation {
                    Orientation::Vertical => (position, plot.top, position, plot.bottom()),
                    Orientation::Horizontal => (plot.left, position, plot.right(), position),
                };
                frame.line(LinePrimitive::new(
                    x1,
                    y1,
                    x2,
                    y2,
                    style.grid_width,
                    style.grid_color,
                ));
            }
        }

        frame.line(LinePrimitive::new(
            plot.left,
            m.x_axis_pos_y,
            plot.right(),
            m.x_axis_pos_y,
            style.line_width,
            style.line_color,
        ));
        frame.line(LinePrimitive::new(
            m.y_axis_pos_x,
            plot.top,
            m.y_axis_pos_x,
            plot.bottom(),
            style.line_width,
            style.line_color,
        ));

        if !style.show_labels {
            return;
        }
        let value_labels = self
            .scale
            .labels
            .iter()
            .enumerate()
            .map(|(step, label)| (self.value_position(self.scale.gridline_value(step)), label));
        let category_labels = self
            .category_labels
            .iter()
            .enumerate()
            .map(|(index, label)| (self.category_position(index), label));
        match self.orientation {
            Orientation::Vertical => {
                for (x, label) in category_labels {
                    self.x_label(frame, x, label);
                }
                for (y, label) in value_labels {
                    self.y_label(frame, y, label);
                }
            }
            Orientation::Horizontal => {
                for (x, label) in value_labels {
                    self.x_label(frame, x, label);
                }
                for (y, label) in category_labels {
                    self.y_label(frame, y, label);
                }
            }
        }
    }

    fn x_label(&self, frame: &mut RenderFrame, x: f64, label: &str) {
        if label.is_empty() {
            return;
        }
        let rotation = self.measurement.x_label_rotation_deg;
        let h_align = if rotation == 0.0 {
            TextHAlign::Center
        } else {
            TextHAlign::Right
        };
        frame.text(
            TextPrimitive::new(
                label,
                x,
                self.measurement.x_axis_pos_y + self.style.label_spacing,
                self.style.font_size,
                self.style.font_color,
                h_align,
            )
            .with_font_family(self.style.font_family.clone())
            .with_v_align(TextVAlign::Top)
            .with_rotation(-rotation),
        );
    }

    fn y_label(&self, frame: &mut RenderFrame, y: f64, label: &str) {
        if label.is_empty() {
            return;
        }
        frame.text(
            TextPrimitive::new(
                label,
                self.measurement.y_axis_pos_x - self.style.label_spacing,
                y,
                self.style.font_size,
                self.style.font_color,
                TextHAlign::Right,
            )
            .with_font_family(self.style.font_family.clone()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{AxesRequest, CartesianAxes, Orientation};
    use crate::api::ChartConfig;
    use crate::charts::ChartKind;
    use crate::core::{ValueBounds, Viewport};
    use crate::layout::HeuristicTextMeasurer;

    fn labels() -> Vec<String> {
        ["Jan", "Feb", "Mar"].iter().map(|s| (*s).to_owned()).collect()
    }

    fn axes(orientation: Orientation) -> CartesianAxes {
        let labels = labels();
        let (axes, _) = CartesianAxes::build(
            AxesRequest {
                orientation,
                bounds: ValueBounds::new(0.0, 90.0),
                category_labels: &labels,
                categories_centered: true,
                allow_logarithmic: false,
                legend: Vec::new(),
            },
            &ChartConfig::for_kind(ChartKind::Bar),
            Viewport::new(640, 480),
            &HeuristicTextMeasurer,
        )
        .expect("axes");
        axes
    }

    #[test]
    fn vertical_values_grow_upwards() {
        let axes = axes(Orientation::Vertical);
        assert!(axes.scale.graph_max() >= 90.0);
        assert!(axes.value_position(50.0) < axes.zero_position());
        assert!(axes.category_position(0) < axes.category_position(2));
    }

    #[test]
    fn horizontal_values_grow_to_the_right() {
        let axes = axes(Orientation::Horizontal);
        assert!(axes.value_position(50.0) > axes.zero_position());
        assert!(axes.category_slot_start(0) > axes.category_slot_start(1));
    }
}
