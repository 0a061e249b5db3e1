pub mod bounds;
pub mod data;
pub mod easing;
pub mod format;
pub mod scale;
pub mod template;
pub mod types;

pub use bounds::{StackAccumulator, ValueBounds, segment_bounds, series_bounds, stacked_bounds};
pub use data::{CategoryData, Dataset, ProportionData, Segment};
pub use easing::Easing;
pub use format::{NumberFormat, Rounding, format_number, unformat};
pub use scale::{
    CalculatedScale, LogarithmicMode, ScaleLabelFormat, ScaleOverride, ScaleRequest, StepWindow,
    calculate_offset, calculate_scale,
};
pub use template::{Template, TemplateContext, TemplateValue, render_template};
pub use types::{PixelRect, Point, Viewport};
