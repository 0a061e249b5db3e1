use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::animation::AnimationConfig;
use crate::charts::ChartKind;
use crate::core::format::{NumberFormat, Rounding};
use crate::core::scale::{FUZZY_LOG_SPAN_THRESHOLD, LogarithmicMode, ScaleOverride};
use crate::core::Easing;
use crate::error::{ChartError, ChartResult};
use crate::render::Color;

/// X-axis label rotation policy.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LabelRotation {
    /// 0°, then 45°, then 90° as labels start to overlap.
    #[default]
    Smart,
    /// Explicit angle in degrees, clamped into `[0, 180]`.
    Fixed(f64),
}

impl Serialize for LabelRotation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LabelRotation::Smart => serializer.serialize_str("smart"),
            LabelRotation::Fixed(degrees) => serializer.serialize_f64(*degrees),
        }
    }
}

impl<'de> Deserialize<'de> for LabelRotation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Degrees(f64),
            Keyword(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Degrees(degrees) => Ok(LabelRotation::Fixed(degrees)),
            Raw::Keyword(keyword) if keyword == "smart" => Ok(LabelRotation::Smart),
            Raw::Keyword(other) => Err(serde::de::Error::custom(format!(
                "rotate_labels must be \"smart\" or a number, got `{other}`"
            ))),
        }
    }
}

/// Order of the two per-frame draw callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawOrder {
    #[default]
    ScaleThenData,
    /// Scale drawn over the data ("scale overlay").
    DataThenScale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegendPosition {
    Top,
    #[default]
    Bottom,
}

/// Free text drawn on top of a chart, positioned relative to the plot area
/// (`0.0..=1.0` on each axis, origin top-left).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossText {
    pub text: String,
    pub relative_x: f64,
    pub relative_y: f64,
    pub font_size: f64,
    pub font_color: Color,
    pub rotation_deg: f64,
}

impl Default for CrossText {
    fn default() -> Self {
        Self {
            text: String::new(),
            relative_x: 0.5,
            relative_y: 0.5,
            font_size: 12.0,
            font_color: Color::from_rgb8(102, 102, 102, 1.0),
            rotation_deg: 0.0,
        }
    }
}

/// Fully resolved chart configuration.
///
/// Every field has a documented default; callers override fields by name
/// through [`ConfigOverrides`]. Unknown names are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartConfig {
    // Canvas
    pub canvas_border: bool,
    pub canvas_border_width: f64,
    pub canvas_border_color: Color,
    pub background_color: Option<Color>,
    pub spacing_top: f64,
    pub spacing_bottom: f64,
    pub spacing_left: f64,
    pub spacing_right: f64,
    pub font_family: String,

    // Titles and footnote
    pub graph_title: String,
    pub graph_title_font_size: f64,
    pub graph_title_font_color: Color,
    pub graph_title_spacing_top: f64,
    pub graph_title_spacing_bottom: f64,
    pub graph_subtitle: String,
    pub graph_subtitle_font_size: f64,
    pub graph_subtitle_font_color: Color,
    pub graph_subtitle_spacing_bottom: f64,
    pub footnote: String,
    pub footnote_font_size: f64,
    pub footnote_font_color: Color,
    pub footnote_spacing_top: f64,

    // Axis titles
    pub x_axis_label: String,
    pub y_axis_label: String,
    pub axis_label_font_size: f64,
    pub axis_label_font_color: Color,
    pub axis_label_spacing: f64,

    // Legend
    pub legend: bool,
    pub legend_position: LegendPosition,
    pub legend_font_size: f64,
    pub legend_font_color: Color,
    pub legend_block_size: f64,
    pub legend_spacing_block_text: f64,
    pub legend_spacing_horizontal: f64,
    pub legend_spacing_vertical: f64,
    pub legend_border: bool,
    pub legend_border_color: Color,
    pub legend_border_width: f64,
    pub legend_border_padding: f64,

    // Value scale
    pub scale_show_labels: bool,
    pub scale_font_size: f64,
    pub scale_font_color: Color,
    pub scale_label: String,
    pub scale_label_spacing: f64,
    pub scale_line_color: Color,
    pub scale_line_width: f64,
    pub scale_show_grid_lines: bool,
    pub scale_grid_line_color: Color,
    pub scale_grid_line_width: f64,
    pub scale_override: Option<ScaleOverride>,
    pub scale_begin_at_zero: bool,
    pub graph_min: Option<f64>,
    pub graph_max: Option<f64>,
    pub logarithmic: LogarithmicMode,
    pub logarithmic_fuzzy_threshold: f64,
    pub rotate_labels: LabelRotation,

    // Number formatting
    pub decimal_separator: String,
    pub thousand_separator: String,
    pub round_number: Rounding,
    pub fixed_decimals: bool,

    // Animation
    pub animation: bool,
    pub animation_steps: u32,
    pub animation_easing: Easing,
    pub draw_order: DrawOrder,
    pub dynamic_display: bool,

    // Bar charts
    pub bar_show_stroke: bool,
    pub bar_stroke_width: f64,
    pub bar_value_spacing: f64,
    pub bar_dataset_spacing: f64,

    // Line charts
    pub bezier_curve: bool,
    pub point_dot: bool,
    pub point_dot_radius: f64,
    pub point_dot_stroke_width: f64,
    pub dataset_stroke: bool,
    pub dataset_stroke_width: f64,
    pub dataset_fill: bool,

    // Pie, doughnut and polar area
    pub start_angle: f64,
    pub percentage_inner_cutout: f64,
    pub segment_show_stroke: bool,
    pub segment_stroke_color: Color,
    pub segment_stroke_width: f64,
    pub animate_rotate: bool,
    pub animate_scale: bool,

    // Radar and polar area
    pub scale_show_line: bool,
    pub angle_show_line_out: bool,
    pub angle_line_color: Color,
    pub angle_line_width: f64,
    pub point_label_font_size: f64,
    pub point_label_font_color: Color,
    pub scale_show_label_backdrop: bool,
    pub scale_backdrop_color: Color,
    pub scale_backdrop_padding_x: f64,
    pub scale_backdrop_padding_y: f64,

    // Annotations and tooltips
    pub annotate_display: bool,
    pub annotate_label: Option<String>,
    pub annotate_offset_x: f64,
    pub annotate_offset_y: f64,

    // In-graph data labels and overlays
    pub in_graph_data_show: bool,
    pub in_graph_data_template: Option<String>,
    pub in_graph_data_font_size: f64,
    pub in_graph_data_font_color: Color,
    pub cross_text: Vec<CrossText>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        let text_gray = Color::from_rgb8(102, 102, 102, 1.0);
        let grid_gray = Color::rgba(0.0, 0.0, 0.0, 0.05);
        Self {
            canvas_border: false,
            canvas_border_width: 2.0,
            canvas_border_color: Color::BLACK,
            background_color: None,
            spacing_top: 5.0,
            spacing_bottom: 5.0,
            spacing_left: 5.0,
            spacing_right: 5.0,
            font_family: "Arial".to_owned(),

            graph_title: String::new(),
            graph_title_font_size: 24.0,
            graph_title_font_color: text_gray,
            graph_title_spacing_top: 5.0,
            graph_title_spacing_bottom: 5.0,
            graph_subtitle: String::new(),
            graph_subtitle_font_size: 18.0,
            graph_subtitle_font_color: text_gray,
            graph_subtitle_spacing_bottom: 5.0,
            footnote: String::new(),
            footnote_font_size: 8.0,
            footnote_font_color: text_gray,
            footnote_spacing_top: 5.0,

            x_axis_label: String::new(),
            y_axis_label: String::new(),
            axis_label_font_size: 16.0,
            axis_label_font_color: text_gray,
            axis_label_spacing: 5.0,

            legend: false,
            legend_position: LegendPosition::Bottom,
            legend_font_size: 12.0,
            legend_font_color: text_gray,
            legend_block_size: 15.0,
            legend_spacing_block_text: 5.0,
            legend_spacing_horizontal: 15.0,
            legend_spacing_vertical: 5.0,
            legend_border: false,
            legend_border_color: text_gray,
            legend_border_width: 1.0,
            legend_border_padding: 5.0,

            scale_show_labels: true,
            scale_font_size: 12.0,
            scale_font_color: text_gray,
            scale_label: "<%=value%>".to_owned(),
            scale_label_spacing: 8.0,
            scale_line_color: Color::rgba(0.0, 0.0, 0.0, 0.1),
            scale_line_width: 1.0,
            scale_show_grid_lines: true,
            scale_grid_line_color: grid_gray,
            scale_grid_line_width: 1.0,
            scale_override: None,
            scale_begin_at_zero: false,
            graph_min: None,
            graph_max: None,
            logarithmic: LogarithmicMode::Off,
            logarithmic_fuzzy_threshold: FUZZY_LOG_SPAN_THRESHOLD,
            rotate_labels: LabelRotation::Smart,

            decimal_separator: ".".to_owned(),
            thousand_separator: String::new(),
            round_number: Rounding::None,
            fixed_decimals: false,

            animation: true,
            animation_steps: 60,
            animation_easing: Easing::EaseOutQuart,
            draw_order: DrawOrder::ScaleThenData,
            dynamic_display: false,

            bar_show_stroke: true,
            bar_stroke_width: 2.0,
            bar_value_spacing: 5.0,
            bar_dataset_spacing: 1.0,

            bezier_curve: true,
            point_dot: true,
            point_dot_radius: 4.0,
            point_dot_stroke_width: 2.0,
            dataset_stroke: true,
            dataset_stroke_width: 2.0,
            dataset_fill: true,

            start_angle: 90.0,
            percentage_inner_cutout: 0.0,
            segment_show_stroke: true,
            segment_stroke_color: Color::WHITE,
            segment_stroke_width: 2.0,
            animate_rotate: true,
            animate_scale: false,

            scale_show_line: true,
            angle_show_line_out: true,
            angle_line_color: Color::rgba(0.0, 0.0, 0.0, 0.1),
            angle_line_width: 1.0,
            point_label_font_size: 12.0,
            point_label_font_color: text_gray,
            scale_show_label_backdrop: true,
            scale_backdrop_color: Color::rgba(1.0, 1.0, 1.0, 0.75),
            scale_backdrop_padding_x: 2.0,
            scale_backdrop_padding_y: 2.0,

            annotate_display: false,
            annotate_label: None,
            annotate_offset_x: 10.0,
            annotate_offset_y: 10.0,

            in_graph_data_show: false,
            in_graph_data_template: None,
            in_graph_data_font_size: 12.0,
            in_graph_data_font_color: text_gray,
            cross_text: Vec::new(),
        }
    }
}

impl ChartConfig {
    /// Chart-type defaults: the lowest configuration layer.
    #[must_use]
    pub fn for_kind(kind: ChartKind) -> Self {
        let mut config = Self::default();
        match kind {
            ChartKind::Bar
            | ChartKind::HorizontalBar
            | ChartKind::StackedBar
            | ChartKind::HorizontalStackedBar => {
                config.scale_begin_at_zero = true;
            }
            ChartKind::Line => {}
            ChartKind::Pie => {
                config.percentage_inner_cutout = 0.0;
            }
            ChartKind::Doughnut => {
                config.percentage_inner_cutout = 50.0;
            }
            ChartKind::Radar => {
                config.scale_begin_at_zero = true;
                config.scale_show_label_backdrop = false;
                config.point_dot_radius = 3.0;
                config.point_dot_stroke_width = 1.0;
            }
            ChartKind::PolarArea => {
                config.scale_begin_at_zero = true;
                config.animate_scale = false;
            }
        }
        config
    }

    #[must_use]
    pub fn number_format(&self) -> NumberFormat {
        NumberFormat {
            decimal_separator: self.decimal_separator.clone(),
            thousand_separator: self.thousand_separator.clone(),
            rounding: self.round_number,
            fixed_decimals: self.fixed_decimals,
        }
    }

    #[must_use]
    pub fn animation_config(&self) -> AnimationConfig {
        AnimationConfig {
            enabled: self.animation,
            steps: self.animation_steps,
            easing: self.animation_easing,
        }
    }

    /// Normalizes angle-like options in place.
    pub fn normalize(&mut self) {
        if self.start_angle.is_finite() {
            self.start_angle = self.start_angle.rem_euclid(360.0);
        }
        if let LabelRotation::Fixed(degrees) = self.rotate_labels {
            self.rotate_labels = LabelRotation::Fixed(if degrees.is_finite() {
                degrees.clamp(0.0, 180.0)
            } else {
                0.0
            });
        }
        self.percentage_inner_cutout = self.percentage_inner_cutout.clamp(0.0, 99.0);
    }

    pub fn validate(&self) -> ChartResult<()> {
        let positive = [
            ("graph_title_font_size", self.graph_title_font_size),
            ("graph_subtitle_font_size", self.graph_subtitle_font_size),
            ("footnote_font_size", self.footnote_font_size),
            ("axis_label_font_size", self.axis_label_font_size),
            ("legend_font_size", self.legend_font_size),
            ("scale_font_size", self.scale_font_size),
            ("point_label_font_size", self.point_label_font_size),
            ("in_graph_data_font_size", self.in_graph_data_font_size),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ChartError::InvalidConfig(format!(
                    "`{name}` must be finite and > 0"
                )));
            }
        }

        let non_negative = [
            ("canvas_border_width", self.canvas_border_width),
            ("spacing_top", self.spacing_top),
            ("spacing_bottom", self.spacing_bottom),
            ("spacing_left", self.spacing_left),
            ("spacing_right", self.spacing_right),
            ("legend_block_size", self.legend_block_size),
            ("bar_stroke_width", self.bar_stroke_width),
            ("bar_value_spacing", self.bar_value_spacing),
            ("bar_dataset_spacing", self.bar_dataset_spacing),
            ("point_dot_radius", self.point_dot_radius),
            ("dataset_stroke_width", self.dataset_stroke_width),
            ("segment_stroke_width", self.segment_stroke_width),
            ("scale_line_width", self.scale_line_width),
            ("scale_grid_line_width", self.scale_grid_line_width),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ChartError::InvalidConfig(format!(
                    "`{name}` must be finite and >= 0"
                )));
            }
        }

        if !self.start_angle.is_finite() {
            return Err(ChartError::InvalidConfig(
                "`start_angle` must be finite".to_owned(),
            ));
        }
        if !self.logarithmic_fuzzy_threshold.is_finite() || self.logarithmic_fuzzy_threshold < 0.0
        {
            return Err(ChartError::InvalidConfig(
                "`logarithmic_fuzzy_threshold` must be finite and >= 0".to_owned(),
            ));
        }
        if let (Some(min), Some(max)) = (self.graph_min, self.graph_max) {
            if min > max {
                return Err(ChartError::InvalidConfig(format!(
                    "`graph_min` ({min}) must not exceed `graph_max` ({max})"
                )));
            }
        }
        if let Some(scale_override) = self.scale_override {
            scale_override.validate()?;
        }
        self.number_format().validate()
    }

    /// Resolves layered overrides on top of the chart-type defaults, lowest
    /// precedence first.
    pub fn resolve(kind: ChartKind, layers: &[&ConfigOverrides]) -> ChartResult<Self> {
        let Value::Object(mut merged) = serde_json::to_value(Self::for_kind(kind))? else {
            return Err(ChartError::InvalidConfig(
                "chart defaults did not serialize to an object".to_owned(),
            ));
        };
        for layer in layers {
            for (key, value) in &layer.values {
                merged.insert(key.clone(), value.clone());
            }
        }
        let mut config: ChartConfig = serde_json::from_value(Value::Object(merged))?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }
}

/// One configuration layer: a flat, shallow-merged set of named options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigOverrides {
    values: Map<String, Value>,
}

impl ConfigOverrides {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets option `key`. Later layers win over earlier ones.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn set_color(self, key: impl Into<String>, color: Color) -> Self {
        self.set(key, color.to_string())
    }

    /// Parses a JSON object of options.
    pub fn from_json(json: &str) -> ChartResult<Self> {
        match serde_json::from_str::<Value>(json)? {
            Value::Object(values) => Ok(Self { values }),
            other => Err(ChartError::InvalidConfig(format!(
                "configuration must be a JSON object, got {other}"
            ))),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{ChartConfig, ConfigOverrides, LabelRotation};
    use crate::charts::ChartKind;

    #[test]
    fn later_layers_win() {
        let library = ConfigOverrides::new()
            .set("graph_title", "Library")
            .set("legend", true);
        let caller = ConfigOverrides::new().set("graph_title", "Caller");
        let config = ChartConfig::resolve(ChartKind::Bar, &[&library, &caller]).expect("config");
        assert_eq!(config.graph_title, "Caller");
        assert!(config.legend);
        assert!(config.scale_begin_at_zero);
    }

    #[test]
    fn kind_defaults_differ_for_doughnut() {
        let pie = ChartConfig::resolve(ChartKind::Pie, &[]).expect("pie");
        let doughnut = ChartConfig::resolve(ChartKind::Doughnut, &[]).expect("doughnut");
        assert_eq!(pie.percentage_inner_cutout, 0.0);
        assert_eq!(doughnut.percentage_inner_cutout, 50.0);
    }

    #[test]
    fn angles_are_normalized() {
        let overrides = ConfigOverrides::new()
            .set("start_angle", -90.0)
            .set("rotate_labels", 270.0);
        let config = ChartConfig::resolve(ChartKind::Pie, &[&overrides]).expect("config");
        assert_eq!(config.start_angle, 270.0);
        assert_eq!(config.rotate_labels, LabelRotation::Fixed(180.0));
    }

    #[test]
    fn unknown_and_invalid_options_are_rejected() {
        let unknown = ConfigOverrides::new().set("no_such_option", 1);
        assert!(ChartConfig::resolve(ChartKind::Line, &[&unknown]).is_err());

        let negative = ConfigOverrides::new().set("scale_font_size", -1.0);
        assert!(ChartConfig::resolve(ChartKind::Line, &[&negative]).is_err());

        let inverted = ConfigOverrides::new()
            .set("graph_min", 10.0)
            .set("graph_max", 1.0);
        assert!(ChartConfig::resolve(ChartKind::Line, &[&inverted]).is_err());
    }

    #[test]
    fn overrides_parse_from_json() {
        let overrides = ConfigOverrides::from_json(
            r#"{"rotate_labels": "smart", "logarithmic": "fuzzy", "round_number": {"decimals": 1}}"#,
        )
        .expect("json");
        let config = ChartConfig::resolve(ChartKind::Line, &[&overrides]).expect("config");
        assert_eq!(config.rotate_labels, LabelRotation::Smart);
        assert!(ConfigOverrides::from_json("[1, 2]").is_err());
    }
}
