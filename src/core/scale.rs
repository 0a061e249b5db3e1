//! Value-axis stepping: picks a human-friendly step, the first gridline value
//! and the formatted labels for a value range and a pixel budget.

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::core::format::{NumberFormat, Rounding, format_number};
use crate::core::template::{Template, TemplateContext};
use crate::core::ValueBounds;
use crate::error::{ChartError, ChartResult};

/// `Fuzzy` logarithmic mode falls back to linear stepping when the data spans
/// fewer orders of magnitude than this.
pub const FUZZY_LOG_SPAN_THRESHOLD: f64 = 4.0;

/// Ranges narrower than this are treated as a single value.
pub const DEGENERATE_RANGE_EPSILON: f64 = 1e-8;

const MAX_STEP_ADJUSTMENTS: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogarithmicMode {
    #[default]
    Off,
    On,
    /// Logarithmic only when the data spans enough orders of magnitude.
    Fuzzy,
}

/// Accepted gridline-count window.
///
/// `max_steps >= 2 * min_steps + 1` always holds so halving or doubling the
/// step can never jump across the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepWindow {
    pub min_steps: usize,
    pub max_steps: usize,
}

impl StepWindow {
    /// Derives the window from the axis length: at most one gridline per
    /// `1.5 * label_font_size` pixels, at least half of that.
    #[must_use]
    pub fn from_pixel_budget(pixel_budget: f64, label_font_size: f64) -> Self {
        let spacing = (label_font_size * 1.5).max(1.0);
        let fitting = if pixel_budget.is_finite() && pixel_budget > 0.0 {
            (pixel_budget / spacing).floor() as usize
        } else {
            0
        };
        Self::new(fitting / 2, fitting)
    }

    /// Normalizes arbitrary bounds into a valid window.
    #[must_use]
    pub fn new(min_steps: usize, max_steps: usize) -> Self {
        let max_steps = max_steps.max(3);
        let min_steps = min_steps.clamp(1, (max_steps - 1) / 2);
        Self {
            min_steps,
            max_steps,
        }
    }

    #[must_use]
    pub fn contains(self, steps: usize) -> bool {
        (self.min_steps..=self.max_steps).contains(&steps)
    }
}

/// Explicit stepping that bypasses the calculator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleOverride {
    pub steps: usize,
    pub step_width: f64,
    pub start_value: f64,
}

impl ScaleOverride {
    pub fn validate(self) -> ChartResult<Self> {
        if self.steps == 0 {
            return Err(ChartError::InvalidConfig(
                "scale override needs at least one step".to_owned(),
            ));
        }
        if !self.step_width.is_finite() || self.step_width <= 0.0 {
            return Err(ChartError::InvalidConfig(
                "scale override step width must be finite and > 0".to_owned(),
            ));
        }
        if !self.start_value.is_finite() {
            return Err(ChartError::InvalidConfig(
                "scale override start value must be finite".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// Inputs of [`calculate_scale`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleRequest {
    pub bounds: ValueBounds,
    pub window: StepWindow,
    pub logarithmic: LogarithmicMode,
    pub fuzzy_threshold: f64,
    pub begin_at_zero: bool,
    pub scale_override: Option<ScaleOverride>,
}

impl ScaleRequest {
    #[must_use]
    pub fn new(bounds: ValueBounds, window: StepWindow) -> Self {
        Self {
            bounds,
            window,
            logarithmic: LogarithmicMode::Off,
            fuzzy_threshold: FUZZY_LOG_SPAN_THRESHOLD,
            begin_at_zero: false,
            scale_override: None,
        }
    }

    #[must_use]
    pub fn with_logarithmic(mut self, mode: LogarithmicMode) -> Self {
        self.logarithmic = mode;
        self
    }

    #[must_use]
    pub fn with_begin_at_zero(mut self, begin_at_zero: bool) -> Self {
        self.begin_at_zero = begin_at_zero;
        self
    }

    #[must_use]
    pub fn with_override(mut self, scale_override: Option<ScaleOverride>) -> Self {
        self.scale_override = scale_override;
        self
    }
}

/// How gridline values become label text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScaleLabelFormat {
    pub number: NumberFormat,
    /// Receives `value` (formatted text) and `raw` (number).
    pub template: Option<Template>,
}

/// Result of scale stepping for one render pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatedScale {
    pub steps: usize,
    /// Linear step in data units; `1.0` (one decade) in logarithmic mode.
    pub step_value: f64,
    pub graph_min: f64,
    pub logarithmic: bool,
    /// `steps + 1` labels, bottom to top.
    pub labels: Vec<String>,
}

impl CalculatedScale {
    /// Value at the last gridline.
    #[must_use]
    pub fn graph_max(&self) -> f64 {
        self.gridline_value(self.steps)
    }

    /// Value at gridline `index` (`0` is `graph_min`).
    #[must_use]
    pub fn gridline_value(&self, index: usize) -> f64 {
        if self.logarithmic {
            self.graph_min * 10f64.powi(index as i32)
        } else {
            self.graph_min + self.step_value * index as f64
        }
    }

    /// Pixel distance of `value` from the scale origin.
    #[must_use]
    pub fn offset(&self, value: f64, pixels_per_step: f64) -> f64 {
        calculate_offset(value, self, pixels_per_step)
    }
}

/// Pixel distance of `value` from the scale origin, clamped into the scale.
///
/// Non-decreasing in `value` in both linear and logarithmic mode.
#[must_use]
pub fn calculate_offset(value: f64, scale: &CalculatedScale, pixels_per_step: f64) -> f64 {
    let full = pixels_per_step * scale.steps as f64;
    if value.is_nan() {
        return 0.0;
    }
    if scale.logarithmic {
        if value <= 0.0 {
            return 0.0;
        }
        let raw = value.log10() * pixels_per_step - scale.graph_min.log10() * pixels_per_step;
        return raw.max(0.0).min(full.max(0.0));
    }
    let span = scale.steps as f64 * scale.step_value;
    let ratio = ((value - scale.graph_min) / span).clamp(0.0, 1.0);
    full * ratio
}

/// Computes stepping and labels for `request`.
pub fn calculate_scale(
    request: &ScaleRequest,
    labels: &ScaleLabelFormat,
) -> ChartResult<CalculatedScale> {
    let (steps, step_value, graph_min, logarithmic) = match request.scale_override {
        Some(scale_override) => {
            let scale_override = scale_override.validate()?;
            (
                scale_override.steps,
                scale_override.step_width,
                scale_override.start_value,
                false,
            )
        }
        None => {
            let bounds = sanitize_bounds(request.bounds, request.begin_at_zero)?;
            match logarithmic_stepping(request, bounds) {
                Some((steps, graph_min)) => (steps, 1.0, graph_min, true),
                None => {
                    let (steps, step_value, graph_min) = linear_stepping(bounds, request.window);
                    (steps, step_value, graph_min, false)
                }
            }
        }
    };
    let top = graph_min + steps as f64 * step_value;
    if !(step_value.is_finite() && graph_min.is_finite() && top.is_finite()) {
        return Err(ChartError::InvalidData(format!(
            "value range [{}, {}] overflows the scale",
            request.bounds.min, request.bounds.max
        )));
    }

    let mut scale = CalculatedScale {
        steps,
        step_value,
        graph_min,
        logarithmic,
        labels: Vec::with_capacity(steps + 1),
    };
    scale.labels = build_labels(&scale, labels)?;
    trace!(
        steps,
        step_value,
        graph_min,
        logarithmic,
        "calculated value scale"
    );
    Ok(scale)
}

fn sanitize_bounds(bounds: ValueBounds, begin_at_zero: bool) -> ChartResult<ValueBounds> {
    let (mut min, mut max) = if bounds.min <= bounds.max {
        (bounds.min, bounds.max)
    } else {
        (bounds.max, bounds.min)
    };
    if !min.is_finite() || !max.is_finite() {
        return Ok(ValueBounds::new(0.0, 1.0));
    }
    if begin_at_zero {
        min = min.min(0.0);
        max = max.max(0.0);
    }
    let range = max - min;
    if !range.is_finite() {
        return Err(ChartError::InvalidData(format!(
            "value range [{min}, {max}] is too wide to scale"
        )));
    }
    if range.abs() < DEGENERATE_RANGE_EPSILON {
        return Ok(if max > 0.0 {
            ValueBounds::new(0.0, (2.0 * max).max(1.0))
        } else if max < 0.0 {
            ValueBounds::new((2.0 * min).min(-1.0), 0.0)
        } else {
            ValueBounds::new(0.0, 1.0)
        });
    }
    Ok(ValueBounds::new(min, max))
}

fn logarithmic_stepping(request: &ScaleRequest, bounds: ValueBounds) -> Option<(usize, f64)> {
    if request.logarithmic == LogarithmicMode::Off {
        return None;
    }
    if bounds.min <= 0.0 {
        warn!(
            min = bounds.min,
            "logarithmic scale needs strictly positive values; using linear stepping"
        );
        return None;
    }
    let low = bounds.min.log10();
    let high = bounds.max.log10();
    if request.logarithmic == LogarithmicMode::Fuzzy && high - low < request.fuzzy_threshold {
        trace!(span = high - low, "fuzzy logarithmic scale disabled");
        return None;
    }
    let first = low.floor();
    let last = high.ceil().max(first + 1.0);
    Some(((last - first) as usize, 10f64.powf(first)))
}

/// Halves or doubles a power-of-ten step until the step count fits `window`.
fn linear_stepping(bounds: ValueBounds, window: StepWindow) -> (usize, f64, f64) {
    let range = bounds.max - bounds.min;
    let mut step_value = 10f64.powf(range.log10().floor());
    let mut graph_min = (bounds.min / step_value).floor() * step_value;
    let mut steps = count_steps(bounds.max, graph_min, step_value);

    for _ in 0..MAX_STEP_ADJUSTMENTS {
        if window.contains(steps) {
            break;
        }
        if steps < window.min_steps {
            step_value /= 2.0;
        } else {
            step_value *= 2.0;
        }
        graph_min = (bounds.min / step_value).floor() * step_value;
        steps = count_steps(bounds.max, graph_min, step_value);
    }

    (steps, step_value, graph_min)
}

fn count_steps(max: f64, graph_min: f64, step_value: f64) -> usize {
    let exact = (max - graph_min) / step_value;
    ((exact - 1e-9).ceil() as usize).max(1)
}

/// Digits after the decimal point needed to print `step` exactly.
fn step_decimals(step: f64) -> u32 {
    Decimal::from_f64(step)
        .map(|d| d.normalize().scale())
        .unwrap_or(0)
}

fn build_labels(scale: &CalculatedScale, format: &ScaleLabelFormat) -> ChartResult<Vec<String>> {
    let mut number = format.number.clone();
    if number.rounding == Rounding::None {
        let decimals = if scale.logarithmic {
            step_decimals(scale.graph_min)
        } else {
            step_decimals(scale.step_value).max(step_decimals(scale.graph_min))
        };
        number.rounding = Rounding::Decimals(decimals);
    }

    (0..=scale.steps)
        .map(|index| {
            let raw = scale.gridline_value(index);
            let text = format_number(raw, &number);
            match &format.template {
                Some(template) => template.render(
                    &TemplateContext::new()
                        .with("value", text)
                        .with("raw", raw),
                ),
                None => Ok(text),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{
        CalculatedScale, LogarithmicMode, ScaleLabelFormat, ScaleOverride, ScaleRequest,
        StepWindow, calculate_offset, calculate_scale,
    };
    use crate::core::ValueBounds;
    use crate::core::template::Template;
    use crate::error::ChartError;

    fn linear(min: f64, max: f64, window: StepWindow) -> CalculatedScale {
        calculate_scale(
            &ScaleRequest::new(ValueBounds::new(min, max), window),
            &ScaleLabelFormat::default(),
        )
        .expect("scale")
    }

    #[test]
    fn picks_friendly_steps() {
        let scale = linear(0.0, 100.0, StepWindow::new(4, 10));
        assert_eq!(scale.graph_min, 0.0);
        assert_eq!(scale.step_value, 25.0);
        assert_eq!(scale.steps, 4);
        assert_eq!(scale.labels.first().map(String::as_str), Some("0"));
        assert_eq!(scale.labels.last().map(String::as_str), Some("100"));
    }

    #[test]
    fn halves_step_for_narrow_ranges() {
        let scale = linear(0.0, 1.0, StepWindow::new(4, 10));
        assert!((4..=10).contains(&scale.steps));
        assert!(scale.graph_max() >= 1.0);
        assert_eq!(scale.labels[1], "0.25");
    }

    #[test]
    fn window_always_leaves_room_to_converge() {
        let window = StepWindow::new(10, 12);
        assert!(window.max_steps >= 2 * window.min_steps + 1);
        let from_budget = StepWindow::from_pixel_budget(0.0, 12.0);
        assert_eq!((from_budget.min_steps, from_budget.max_steps), (1, 3));
    }

    #[test]
    fn degenerate_range_gets_positive_step() {
        let scale = linear(5.0, 5.0, StepWindow::new(2, 10));
        assert!(scale.step_value > 0.0);
        assert_eq!(scale.graph_min, 0.0);
        assert!(scale.graph_max() >= 10.0);

        let negative = linear(-3.0, -3.0, StepWindow::new(2, 10));
        assert!(negative.step_value > 0.0);
        assert!(negative.graph_min <= -6.0);
    }

    #[test]
    fn overflowing_range_is_rejected() {
        let result = calculate_scale(
            &ScaleRequest::new(ValueBounds::new(-1e308, 1e308), StepWindow::new(2, 10)),
            &ScaleLabelFormat::default(),
        );
        assert!(matches!(result, Err(ChartError::InvalidData(_))));

        let wide = linear(-1e307, 1e307, StepWindow::new(2, 10));
        assert!(wide.step_value.is_finite());
        assert!(wide.labels.iter().all(|label| !label.contains("NaN")));
    }

    #[test]
    fn logarithmic_steps_cover_decades() {
        let request = ScaleRequest::new(ValueBounds::new(3.0, 45_000.0), StepWindow::new(2, 10))
            .with_logarithmic(LogarithmicMode::On);
        let scale = calculate_scale(&request, &ScaleLabelFormat::default()).expect("scale");
        assert!(scale.logarithmic);
        assert_eq!(scale.graph_min, 1.0);
        assert_eq!(scale.steps, 5);
        assert_eq!(scale.labels.last().map(String::as_str), Some("100000"));
    }

    #[test]
    fn fuzzy_logarithmic_falls_back_on_narrow_spans() {
        let request = ScaleRequest::new(ValueBounds::new(10.0, 900.0), StepWindow::new(2, 10))
            .with_logarithmic(LogarithmicMode::Fuzzy);
        let scale = calculate_scale(&request, &ScaleLabelFormat::default()).expect("scale");
        assert!(!scale.logarithmic);

        let wide = ScaleRequest::new(ValueBounds::new(1.0, 1e6), StepWindow::new(2, 10))
            .with_logarithmic(LogarithmicMode::Fuzzy);
        assert!(calculate_scale(&wide, &ScaleLabelFormat::default())
            .expect("scale")
            .logarithmic);
    }

    #[test]
    fn logarithmic_needs_positive_minimum() {
        let request = ScaleRequest::new(ValueBounds::new(-1.0, 100.0), StepWindow::new(2, 10))
            .with_logarithmic(LogarithmicMode::On);
        let scale = calculate_scale(&request, &ScaleLabelFormat::default()).expect("scale");
        assert!(!scale.logarithmic);
    }

    #[test]
    fn override_bypasses_stepping() {
        let request = ScaleRequest::new(ValueBounds::new(0.0, 7.0), StepWindow::new(2, 10))
            .with_override(Some(ScaleOverride {
                steps: 4,
                step_width: 25.0,
                start_value: -50.0,
            }));
        let scale = calculate_scale(&request, &ScaleLabelFormat::default()).expect("scale");
        assert_eq!(scale.labels, vec!["-50", "-25", "0", "25", "50"]);
    }

    #[test]
    fn labels_go_through_template() {
        let format = ScaleLabelFormat {
            template: Some(Template::parse("<%=value%> kg").expect("template")),
            ..ScaleLabelFormat::default()
        };
        let scale = calculate_scale(
            &ScaleRequest::new(ValueBounds::new(0.0, 4.0), StepWindow::new(2, 5)),
            &format,
        )
        .expect("scale");
        assert_eq!(scale.labels[0], "0 kg");
    }

    #[test]
    fn offsets_clamp_to_scale() {
        let scale = linear(0.0, 100.0, StepWindow::new(4, 10));
        assert_eq!(calculate_offset(-5.0, &scale, 20.0), 0.0);
        assert_eq!(calculate_offset(50.0, &scale, 20.0), 40.0);
        assert_eq!(calculate_offset(500.0, &scale, 20.0), 80.0);
    }
}
