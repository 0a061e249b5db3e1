use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use cairo::{Context, Format, ImageSurface};
use pango::FontDescription;

use crate::error::{ChartError, ChartResult};
use crate::layout::TextMeasurer;
use crate::render::{
    ArcPrimitive, CirclePrimitive, Color, DrawCommand, LinePrimitive, LineStrokeStyle,
    PathPrimitive, PathSegment, RectPrimitive, RenderFrame, Renderer, TextHAlign, TextPrimitive,
    TextVAlign,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CairoRenderStats {
    pub lines_drawn: usize,
    pub rects_drawn: usize,
    pub texts_drawn: usize,
    pub arcs_drawn: usize,
    pub circles_drawn: usize,
    pub paths_drawn: usize,
}

/// Optional extension trait for renderers that can draw into an external Cairo
/// context (for example a GTK `DrawingArea` callback).
pub trait CairoContextRenderer {
    fn render_on_cairo_context(
        &mut self,
        context: &Context,
        frame: &RenderFrame,
    ) -> ChartResult<()>;
}

/// Cairo + Pango + PangoCairo renderer backend.
///
/// This renderer supports two modes:
/// - offscreen image-surface rendering through `Renderer::render`, with
///   [`CairoRenderer::write_png`] for still export
/// - in-place rendering on an external Cairo context through
///   `CairoContextRenderer`
#[derive(Debug)]
pub struct CairoRenderer {
    surface: ImageSurface,
    clear_color: Color,
    last_stats: CairoRenderStats,
}

impl CairoRenderer {
    pub fn new(width: i32, height: i32) -> ChartResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(ChartError::InvalidData(
                "cairo surface size must be > 0".to_owned(),
            ));
        }

        let surface = ImageSurface::create(Format::ARgb32, width, height)
            .map_err(|err| map_backend_error("failed to create cairo surface", err))?;
        Ok(Self {
            surface,
            clear_color: Color::WHITE,
            last_stats: CairoRenderStats::default(),
        })
    }

    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        "cairo+pango+pangocairo"
    }

    #[must_use]
    pub fn surface(&self) -> &ImageSurface {
        &self.surface
    }

    #[must_use]
    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn set_clear_color(&mut self, color: Color) -> ChartResult<()> {
        color.validate()?;
        self.clear_color = color;
        Ok(())
    }

    #[must_use]
    pub fn last_stats(&self) -> CairoRenderStats {
        self.last_stats
    }

    /// Encodes the current surface as PNG.
    pub fn write_png_to(&self, stream: &mut impl Write) -> ChartResult<()> {
        self.surface
            .write_to_png(stream)
            .map_err(|err| ChartError::Backend(format!("failed to encode png: {err}")))
    }

    /// Writes the current surface to a PNG file.
    pub fn write_png(&self, path: impl AsRef<Path>) -> ChartResult<()> {
        let path = path.as_ref();
        let mut file = File::create(path).map_err(|err| {
            ChartError::Backend(format!("failed to create `{}`: {err}", path.display()))
        })?;
        self.write_png_to(&mut file)
    }

    fn render_with_context(&mut self, context: &Context, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;
        let background = frame.background.unwrap_or(self.clear_color);
        background.validate()?;

        context.reset_clip();
        apply_color(context, background);
        context
            .paint()
            .map_err(|err| map_backend_error("failed to clear surface", err))?;

        let mut stats = CairoRenderStats::default();
        for command in &frame.commands {
            match command {
                DrawCommand::Line(line) => {
                    draw_line(context, *line)?;
                    stats.lines_drawn += 1;
                }
                DrawCommand::Rect(rect) => {
                    append_rect_path(context, *rect);
                    fill_and_stroke(
                        context,
                        Some(rect.fill_color),
                        rect.border_color,
                        rect.border_width,
                        "rectangle",
                    )?;
                    stats.rects_drawn += 1;
                }
                DrawCommand::Text(text) => {
                    draw_text(context, text)?;
                    stats.texts_drawn += 1;
                }
                DrawCommand::Arc(arc) => {
                    append_arc_path(context, *arc);
                    fill_and_stroke(
                        context,
                        Some(arc.fill_color),
                        arc.stroke_color,
                        arc.stroke_width,
                        "arc",
                    )?;
                    stats.arcs_drawn += 1;
                }
                DrawCommand::Circle(circle) => {
                    append_circle_path(context, *circle);
                    fill_and_stroke(
                        context,
                        Some(circle.fill_color),
                        circle.stroke_color,
                        circle.stroke_width,
                        "circle",
                    )?;
                    stats.circles_drawn += 1;
                }
                DrawCommand::Path(path) => {
                    append_path(context, path);
                    fill_and_stroke(
                        context,
                        path.fill_color,
                        path.stroke_color.unwrap_or(Color::TRANSPARENT),
                        if path.stroke_color.is_some() {
                            path.stroke_width
                        } else {
                            0.0
                        },
                        "path",
                    )?;
                    stats.paths_drawn += 1;
                }
                DrawCommand::Clip(rect) => {
                    context.reset_clip();
                    context.rectangle(rect.left, rect.top, rect.width, rect.height);
                    context.clip();
                }
                DrawCommand::ResetClip => context.reset_clip(),
            }
        }

        context.reset_clip();
        self.last_stats = stats;
        Ok(())
    }
}

impl Renderer for CairoRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        let context = Context::new(&self.surface)
            .map_err(|err| map_backend_error("failed to create cairo context", err))?;
        self.render_with_context(&context, frame)
    }
}

impl CairoContextRenderer for CairoRenderer {
    fn render_on_cairo_context(
        &mut self,
        context: &Context,
        frame: &RenderFrame,
    ) -> ChartResult<()> {
        self.render_with_context(context, frame)
    }
}

/// Pango-backed text metrics for layout.
#[derive(Debug)]
pub struct PangoTextMeasurer {
    context: Context,
}

impl PangoTextMeasurer {
    pub fn new() -> ChartResult<Self> {
        let surface = ImageSurface::create(Format::ARgb32, 1, 1)
            .map_err(|err| map_backend_error("failed to create measuring surface", err))?;
        let context = Context::new(&surface)
            .map_err(|err| map_backend_error("failed to create measuring context", err))?;
        Ok(Self { context })
    }
}

impl TextMeasurer for PangoTextMeasurer {
    fn text_width(&self, text: &str, font_size: f64, font_family: &str) -> f64 {
        let layout = pangocairo::functions::create_layout(&self.context);
        layout.set_font_description(Some(&font_description(font_family, font_size)));
        layout.set_text(text);
        f64::from(layout.pixel_size().0)
    }
}

fn font_description(family: &str, size_px: f64) -> FontDescription {
    let mut description = FontDescription::new();
    description.set_family(family);
    description.set_absolute_size(size_px * f64::from(pango::SCALE));
    description
}

fn apply_color(context: &Context, color: Color) {
    context.set_source_rgba(color.red, color.green, color.blue, color.alpha);
}

fn draw_line(context: &Context, line: LinePrimitive) -> ChartResult<()> {
    apply_color(context, line.color);
    context.set_line_width(line.stroke_width);
    match line.stroke_style {
        LineStrokeStyle::Solid => context.set_dash(&[], 0.0),
        LineStrokeStyle::Dashed => context.set_dash(&[6.0, 4.0], 0.0),
        LineStrokeStyle::Dotted => context.set_dash(&[1.0, 3.0], 0.0),
    }
    context.new_path();
    context.move_to(line.x1, line.y1);
    context.line_to(line.x2, line.y2);
    let result = context
        .stroke()
        .map_err(|err| map_backend_error("failed to stroke line", err));
    context.set_dash(&[], 0.0);
    result
}

/// Fills the current path, then strokes it when `stroke_width > 0`.
fn fill_and_stroke(
    context: &Context,
    fill: Option<Color>,
    stroke_color: Color,
    stroke_width: f64,
    what: &str,
) -> ChartResult<()> {
    let stroke = stroke_width > 0.0 && !stroke_color.is_transparent();
    if let Some(fill) = fill.filter(|color| !color.is_transparent()) {
        apply_color(context, fill);
        let filled = if stroke {
            context.fill_preserve()
        } else {
            context.fill()
        };
        filled.map_err(|err| map_backend_error(&format!("failed to fill {what}"), err))?;
    }
    if stroke {
        apply_color(context, stroke_color);
        context.set_line_width(stroke_width);
        context
            .stroke()
            .map_err(|err| map_backend_error(&format!("failed to stroke {what}"), err))?;
    }
    context.new_path();
    Ok(())
}

fn append_rect_path(context: &Context, rect: RectPrimitive) {
    context.new_path();
    if rect.corner_radius <= 0.0 {
        context.rectangle(rect.x, rect.y, rect.width, rect.height);
        return;
    }

    let radius = rect
        .corner_radius
        .min(rect.width * 0.5)
        .min(rect.height * 0.5);
    let left = rect.x;
    let top = rect.y;
    let right = rect.x + rect.width;
    let bottom = rect.y + rect.height;

    context.new_sub_path();
    context.arc(right - radius, top + radius, radius, -FRAC_PI_2, 0.0);
    context.arc(right - radius, bottom - radius, radius, 0.0, FRAC_PI_2);
    context.arc(left + radius, bottom - radius, radius, FRAC_PI_2, PI);
    context.arc(left + radius, top + radius, radius, PI, PI + FRAC_PI_2);
    context.close_path();
}

fn append_arc_path(context: &Context, arc: ArcPrimitive) {
    context.new_path();
    context.arc(
        arc.center_x,
        arc.center_y,
        arc.outer_radius,
        arc.start_angle,
        arc.end_angle,
    );
    if arc.inner_radius > 0.0 {
        context.arc_negative(
            arc.center_x,
            arc.center_y,
            arc.inner_radius,
            arc.end_angle,
            arc.start_angle,
        );
    } else {
        context.line_to(arc.center_x, arc.center_y);
    }
    context.close_path();
}

fn append_circle_path(context: &Context, circle: CirclePrimitive) {
    context.new_path();
    context.arc(circle.center_x, circle.center_y, circle.radius, 0.0, TAU);
    context.close_path();
}

fn append_path(context: &Context, path: &PathPrimitive) {
    context.new_path();
    for segment in &path.segments {
        match *segment {
            PathSegment::MoveTo { x, y } => context.move_to(x, y),
            PathSegment::LineTo { x, y } => context.line_to(x, y),
            PathSegment::CurveTo {
                c1x,
                c1y,
                c2x,
                c2y,
                x,
                y,
            } => context.curve_to(c1x, c1y, c2x, c2y, x, y),
        }
    }
    if path.closed {
        context.close_path();
    }
}

fn draw_text(context: &Context, text: &TextPrimitive) -> ChartResult<()> {
    let layout = pangocairo::functions::create_layout(context);
    layout.set_font_description(Some(&font_description(
        &text.font_family,
        text.font_size_px,
    )));
    layout.set_text(&text.text);

    let (width, height) = layout.pixel_size();
    let (width, height) = (f64::from(width), f64::from(height));
    let dx = match text.h_align {
        TextHAlign::Left => 0.0,
        TextHAlign::Center => -width / 2.0,
        TextHAlign::Right => -width,
    };
    let dy = match text.v_align {
        TextVAlign::Top => 0.0,
        TextVAlign::Middle => -height / 2.0,
        TextVAlign::Bottom => -height,
    };

    context
        .save()
        .map_err(|err| map_backend_error("failed to save cairo state", err))?;
    context.translate(text.x, text.y);
    if text.rotation_deg != 0.0 {
        context.rotate(text.rotation_deg.to_radians());
    }
    apply_color(context, text.color);
    context.move_to(dx, dy);
    pangocairo::functions::show_layout(context, &layout);
    context
        .restore()
        .map_err(|err| map_backend_error("failed to restore cairo state", err))
}

fn map_backend_error(prefix: &str, err: cairo::Error) -> ChartError {
    ChartError::Backend(format!("{prefix}: {err}"))
}
