use serde::{Deserialize, Serialize};

use crate::core::{NumberFormat, Template};
use crate::error::ChartResult;
use crate::interaction::AnnotationEntry;

/// Rendered tooltip text placed at the pointer plus the configured offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tooltip {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// Renders the tooltip of `entry` through `template`.
pub fn render_tooltip(
    entry: &AnnotationEntry,
    template: &Template,
    format: &NumberFormat,
    pointer: (f64, f64),
    offset: (f64, f64),
) -> ChartResult<Tooltip> {
    let text = template.render(&entry.template_context(format))?;
    Ok(Tooltip {
        text,
        x: pointer.0 + offset.0,
        y: pointer.1 + offset.1,
    })
}
