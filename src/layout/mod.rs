//! Measurement of chart chrome and the plot area.
//!
//! `measure` (category and value axes) and `measure_radial` (pie, doughnut,
//! radar, polar area) compute the drawing rectangle from the configuration,
//! the canvas size and text metrics, and emit the static chrome (border,
//! titles, legend, axis titles, footnote, cross texts) as draw commands.

mod legend;
mod measure;

pub use legend::{LegendEntry, LegendLayout};
pub use measure::{
    AxisSpec, Layout, MeasureRequest, Measurement, RadialLayout, RadialMeasureRequest, measure,
    measure_radial, smart_rotation,
};

/// Text metrics provider.
///
/// Layout needs label widths before anything is drawn; backends with real
/// font shaping implement this, headless callers use
/// [`HeuristicTextMeasurer`].
pub trait TextMeasurer {
    fn text_width(&self, text: &str, font_size: f64, font_family: &str) -> f64;
}

/// Assumes an average glyph width of 0.6em.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicTextMeasurer;

impl TextMeasurer for HeuristicTextMeasurer {
    fn text_width(&self, text: &str, font_size: f64, _font_family: &str) -> f64 {
        0.6 * font_size * text.chars().count() as f64
    }
}

impl<M: TextMeasurer + ?Sized> TextMeasurer for &M {
    fn text_width(&self, text: &str, font_size: f64, font_family: &str) -> f64 {
        (**self).text_width(text, font_size, font_family)
    }
}
