use std::f64::consts::SQRT_2;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::{ChartConfig, LabelRotation, LegendPosition};
use crate::core::{PixelRect, Point, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::layout::{LegendEntry, LegendLayout, TextMeasurer};
use crate::render::{Color, DrawCommand, RectPrimitive, TextHAlign, TextPrimitive, TextVAlign};

const MIN_PLOT_EXTENT: f64 = 1.0;
const RADIAL_PADDING: f64 = 5.0;

/// Labels and slot count of one axis.
///
/// `slots` is the number of intervals the axis is divided into. With
/// `centered`, labels sit in the middle of each slot (bar categories);
/// otherwise on slot boundaries (value scales, line categories).
#[derive(Debug, Clone, Copy)]
pub struct AxisSpec<'a> {
    pub labels: &'a [String],
    pub slots: usize,
    pub centered: bool,
}

impl<'a> AxisSpec<'a> {
    #[must_use]
    pub fn new(labels: &'a [String], slots: usize, centered: bool) -> Self {
        Self {
            labels,
            slots: slots.max(1),
            centered,
        }
    }
}

pub struct MeasureRequest<'a> {
    pub viewport: Viewport,
    pub config: &'a ChartConfig,
    pub x_axis: AxisSpec<'a>,
    pub y_axis: AxisSpec<'a>,
    pub legend: Vec<LegendEntry>,
}

/// Drawing rectangle and pixel offsets of a category/value chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Clip rectangle of the data area.
    pub plot: PixelRect,
    pub x_axis_pos_y: f64,
    pub y_axis_pos_x: f64,
    pub available_width: f64,
    pub available_height: f64,
    /// Pixel width of one x slot.
    pub x_hop: f64,
    /// Pixel height of one y slot.
    pub y_hop: f64,
    pub x_label_rotation_deg: f64,
}

impl Measurement {
    /// X pixel of slot boundary or center `index` on the x axis.
    #[must_use]
    pub fn x_at(&self, index: usize, centered: bool) -> f64 {
        let base = self.y_axis_pos_x + self.x_hop * index as f64;
        if centered { base + self.x_hop / 2.0 } else { base }
    }

    /// Y pixel of slot boundary or center `index` on the y axis, counted
    /// upwards from the x axis.
    #[must_use]
    pub fn y_at(&self, index: usize, centered: bool) -> f64 {
        let base = self.x_axis_pos_y - self.y_hop * index as f64;
        if centered { base - self.y_hop / 2.0 } else { base }
    }
}

/// Measurement plus the static chrome drawn under every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub measurement: Measurement,
    pub chrome: Vec<DrawCommand>,
}

/// Picks 0°, 45° or 90° so neighbouring x labels do not overlap.
#[must_use]
pub fn smart_rotation(widest_label: f64, font_size: f64, slot_width: f64) -> f64 {
    if widest_label + 4.0 <= slot_width {
        0.0
    } else if font_size * SQRT_2 <= slot_width {
        45.0
    } else {
        90.0
    }
}

fn widest(labels: &[String], config: &ChartConfig, measurer: &dyn TextMeasurer) -> f64 {
    labels
        .iter()
        .map(|label| measurer.text_width(label, config.scale_font_size, &config.font_family))
        .fold(0.0, f64::max)
}

fn chrome_text(
    text: &str,
    x: f64,
    y: f64,
    font_size: f64,
    color: Color,
    h_align: TextHAlign,
    config: &ChartConfig,
) -> DrawCommand {
    DrawCommand::Text(
        TextPrimitive::new(text, x, y, font_size, color, h_align)
            .with_font_family(config.font_family.clone())
            .with_v_align(TextVAlign::Top),
    )
}

/// Bands shared by every chart type: border, titles, footnote and legend.
/// Returns the rectangle left for the chart body.
fn frame_bands(
    viewport: Viewport,
    config: &ChartConfig,
    legend_entries: Vec<LegendEntry>,
    measurer: &dyn TextMeasurer,
    chrome: &mut Vec<DrawCommand>,
) -> ChartResult<PixelRect> {
    if !viewport.is_valid() {
        return Err(ChartError::InvalidViewport {
            width: viewport.width,
            height: viewport.height,
        });
    }
    let width = viewport.width_px();
    let height = viewport.height_px();

    let border = if config.canvas_border {
        config.canvas_border_width
    } else {
        0.0
    };
    if border > 0.0 {
        chrome.push(DrawCommand::Rect(
            RectPrimitive::new(
                border / 2.0,
                border / 2.0,
                (width - border).max(0.0),
                (height - border).max(0.0),
                Color::TRANSPARENT,
            )
            .with_border(config.canvas_border_color, border),
        ));
    }

    let mut top = border + config.spacing_top;
    let mut bottom = height - border - config.spacing_bottom;
    let left = border + config.spacing_left;
    let right = width - border - config.spacing_right;
    let center_x = (left + right) / 2.0;

    if !config.graph_title.is_empty() {
        top += config.graph_title_spacing_top;
        chrome.push(chrome_text(
            &config.graph_title,
            center_x,
            top,
            config.graph_title_font_size,
            config.graph_title_font_color,
            TextHAlign::Center,
            config,
        ));
        top += config.graph_title_font_size + config.graph_title_spacing_bottom;
    }
    if !config.graph_subtitle.is_empty() {
        chrome.push(chrome_text(
            &config.graph_subtitle,
            center_x,
            top,
            config.graph_subtitle_font_size,
            config.graph_subtitle_font_color,
            TextHAlign::Center,
            config,
        ));
        top += config.graph_subtitle_font_size + config.graph_subtitle_spacing_bottom;
    }
    if !config.footnote.is_empty() {
        bottom -= config.footnote_font_size;
        chrome.push(chrome_text(
            &config.footnote,
            left,
            bottom,
            config.footnote_font_size,
            config.footnote_font_color,
            TextHAlign::Left,
            config,
        ));
        bottom -= config.footnote_spacing_top;
    }

    if config.legend {
        if let Some(legend) = LegendLayout::compute(legend_entries, right - left, config, measurer)
        {
            match config.legend_position {
                LegendPosition::Top => {
                    legend.draw(center_x, top, config, chrome);
                    top += legend.height + 2.0 * config.legend_spacing_vertical;
                }
                LegendPosition::Bottom => {
                    bottom -= legend.height;
                    legend.draw(center_x, bottom, config, chrome);
                    bottom -= 2.0 * config.legend_spacing_vertical;
                }
            }
        }
    }

    Ok(PixelRect::new(
        left,
        top,
        (right - left).max(MIN_PLOT_EXTENT),
        (bottom - top).max(MIN_PLOT_EXTENT),
    ))
}

fn push_cross_texts(plot: PixelRect, config: &ChartConfig, chrome: &mut Vec<DrawCommand>) {
    for cross in config.cross_text.iter().filter(|cross| !cross.text.is_empty()) {
        chrome.push(DrawCommand::Text(
            TextPrimitive::new(
                cross.text.clone(),
                plot.left + cross.relative_x * plot.width,
                plot.top + cross.relative_y * plot.height,
                cross.font_size,
                cross.font_color,
                TextHAlign::Center,
            )
            .with_font_family(config.font_family.clone())
            .with_rotation(cross.rotation_deg),
        ));
    }
}

/// Computes the plot rectangle of a category/value chart.
///
/// Dependency order: border, widest x label, widest y label, label space,
/// title/subtitle/footnote bands, legend rows, x label rotation.
pub fn measure(request: MeasureRequest<'_>, measurer: &dyn TextMeasurer) -> ChartResult<Layout> {
    let config = request.config;
    let mut chrome = Vec::new();

    let show_labels = config.scale_show_labels;
    let widest_x = if show_labels {
        widest(request.x_axis.labels, config, measurer)
    } else {
        0.0
    };
    let widest_y = if show_labels {
        widest(request.y_axis.labels, config, measurer)
    } else {
        0.0
    };

    let body = frame_bands(request.viewport, config, request.legend, measurer, &mut chrome)?;
    let mut top = body.top;
    let mut bottom = body.bottom();
    let mut left = body.left;
    let mut right = body.right();

    let x_title_y = if config.x_axis_label.is_empty() {
        None
    } else {
        bottom -= config.axis_label_font_size;
        let y = bottom;
        bottom -= config.axis_label_spacing;
        Some(y)
    };
    if !config.y_axis_label.is_empty() {
        left += config.axis_label_spacing;
        chrome.push(DrawCommand::Text(
            TextPrimitive::new(
                config.y_axis_label.clone(),
                left + config.axis_label_font_size / 2.0,
                (top + bottom) / 2.0,
                config.axis_label_font_size,
                config.axis_label_font_color,
                TextHAlign::Center,
            )
            .with_font_family(config.font_family.clone())
            .with_rotation(-90.0),
        ));
        left += config.axis_label_font_size + config.axis_label_spacing;
    }

    if show_labels {
        if !request.y_axis.labels.is_empty() {
            left += widest_y + config.scale_label_spacing;
        }
        top += config.scale_font_size / 2.0;
        if !request.x_axis.centered && !request.x_axis.labels.is_empty() {
            // the first boundary label overhangs the y axis to the left
            left = left.max(body.left + widest_x / 2.0);
        }
    }

    let slot_width = (right - left).max(MIN_PLOT_EXTENT) / request.x_axis.slots as f64;
    let rotation = match config.rotate_labels {
        LabelRotation::Fixed(degrees) => degrees,
        LabelRotation::Smart => smart_rotation(widest_x, config.scale_font_size, slot_width),
    };
    if show_labels && !request.x_axis.labels.is_empty() {
        let radians = rotation.to_radians();
        bottom -= widest_x * radians.sin().abs()
            + config.scale_font_size * radians.cos().abs()
            + config.scale_label_spacing;
        if !request.x_axis.centered && rotation == 0.0 {
            right -= widest_x / 2.0;
        }
    }

    let available_width = (right - left).max(MIN_PLOT_EXTENT);
    let available_height = (bottom - top).max(MIN_PLOT_EXTENT);
    let plot = PixelRect::new(left, bottom - available_height, available_width, available_height);

    if let Some(y) = x_title_y {
        chrome.push(chrome_text(
            &config.x_axis_label,
            plot.center().x,
            y,
            config.axis_label_font_size,
            config.axis_label_font_color,
            TextHAlign::Center,
            config,
        ));
    }
    push_cross_texts(plot, config, &mut chrome);

    let measurement = Measurement {
        plot,
        x_axis_pos_y: plot.bottom(),
        y_axis_pos_x: plot.left,
        available_width,
        available_height,
        x_hop: available_width / request.x_axis.slots as f64,
        y_hop: available_height / request.y_axis.slots as f64,
        x_label_rotation_deg: rotation,
    };
    debug!(
        width = available_width,
        height = available_height,
        rotation,
        "measured plot area"
    );
    Ok(Layout {
        measurement,
        chrome,
    })
}

pub struct RadialMeasureRequest<'a> {
    pub viewport: Viewport,
    pub config: &'a ChartConfig,
    /// Labels drawn around the outside (radar point labels); empty otherwise.
    pub point_labels: &'a [String],
    pub legend: Vec<LegendEntry>,
}

/// Center and radius of a radial chart plus its chrome.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialLayout {
    pub center: Point,
    pub radius: f64,
    pub body: PixelRect,
    pub chrome: Vec<DrawCommand>,
}

pub fn measure_radial(
    request: RadialMeasureRequest<'_>,
    measurer: &dyn TextMeasurer,
) -> ChartResult<RadialLayout> {
    let config = request.config;
    let mut chrome = Vec::new();
    let body = frame_bands(request.viewport, config, request.legend, measurer, &mut chrome)?;

    let (label_pad_x, label_pad_y) = if request.point_labels.is_empty() {
        (0.0, 0.0)
    } else {
        let widest = request
            .point_labels
            .iter()
            .map(|label| {
                measurer.text_width(label, config.point_label_font_size, &config.font_family)
            })
            .fold(0.0, f64::max);
        (
            widest + RADIAL_PADDING,
            config.point_label_font_size + RADIAL_PADDING,
        )
    };

    let radius = ((body.width / 2.0 - label_pad_x).min(body.height / 2.0 - label_pad_y)
        - RADIAL_PADDING)
        .max(MIN_PLOT_EXTENT);
    push_cross_texts(body, config, &mut chrome);

    Ok(RadialLayout {
        center: body.center(),
        radius,
        body,
        chrome,
    })
}

#[cfg(test)]
mod tests {
    use super::{AxisSpec, MeasureRequest, RadialMeasureRequest, measure, measure_radial, smart_rotation};
    use crate::api::{ChartConfig, LabelRotation};
    use crate::core::Viewport;
    use crate::layout::HeuristicTextMeasurer;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| (*item).to_owned()).collect()
    }

    #[test]
    fn smart_rotation_escalates() {
        assert_eq!(smart_rotation(30.0, 12.0, 50.0), 0.0);
        assert_eq!(smart_rotation(80.0, 12.0, 50.0), 45.0);
        assert_eq!(smart_rotation(80.0, 12.0, 10.0), 90.0);
    }

    #[test]
    fn titles_and_axis_labels_shrink_the_plot() {
        let x = labels(&["Jan", "Feb", "Mar"]);
        let y = labels(&["0", "50", "100"]);
        let plain = ChartConfig::default();
        let titled = ChartConfig {
            graph_title: "Sales".to_owned(),
            x_axis_label: "Month".to_owned(),
            y_axis_label: "Units".to_owned(),
            ..ChartConfig::default()
        };

        let request = |config| MeasureRequest {
            viewport: Viewport::new(600, 400),
            config,
            x_axis: AxisSpec::new(&x, 3, true),
            y_axis: AxisSpec::new(&y, 2, false),
            legend: Vec::new(),
        };
        let a = measure(request(&plain), &HeuristicTextMeasurer).expect("plain");
        let b = measure(request(&titled), &HeuristicTextMeasurer).expect("titled");

        assert!(b.measurement.available_height < a.measurement.available_height);
        assert!(b.measurement.available_width < a.measurement.available_width);
        assert_eq!(b.chrome.len(), a.chrome.len() + 3);
        assert!((a.measurement.x_hop * 3.0 - a.measurement.available_width).abs() < 1e-9);
    }

    #[test]
    fn crowded_labels_rotate_and_fixed_rotation_is_kept() {
        let x: Vec<String> = (0..40).map(|i| format!("Category {i}")).collect();
        let y = labels(&["0", "1"]);
        let smart = ChartConfig::default();
        let fixed = ChartConfig {
            rotate_labels: LabelRotation::Fixed(30.0),
            ..ChartConfig::default()
        };
        let request = |config| MeasureRequest {
            viewport: Viewport::new(400, 300),
            config,
            x_axis: AxisSpec::new(&x, 40, true),
            y_axis: AxisSpec::new(&y, 1, false),
            legend: Vec::new(),
        };
        let smart_layout = measure(request(&smart), &HeuristicTextMeasurer).expect("smart");
        assert_eq!(smart_layout.measurement.x_label_rotation_deg, 90.0);
        let fixed_layout = measure(request(&fixed), &HeuristicTextMeasurer).expect("fixed");
        assert_eq!(fixed_layout.measurement.x_label_rotation_deg, 30.0);
    }

    #[test]
    fn invalid_viewport_is_rejected() {
        let config = ChartConfig::default();
        let result = measure_radial(
            RadialMeasureRequest {
                viewport: Viewport::new(0, 100),
                config: &config,
                point_labels: &[],
                legend: Vec::new(),
            },
            &HeuristicTextMeasurer,
        );
        assert!(result.is_err());
    }

    #[test]
    fn radial_radius_fits_the_shorter_side() {
        let config = ChartConfig::default();
        let layout = measure_radial(
            RadialMeasureRequest {
                viewport: Viewport::new(400, 300),
                config: &config,
                point_labels: &[],
                legend: Vec::new(),
            },
            &HeuristicTextMeasurer,
        )
        .expect("radial");
        assert!((layout.radius - (290.0 / 2.0 - 5.0)).abs() < 1e-9);
        assert!((layout.center.x - 200.0).abs() < 1e-9);
    }
}
