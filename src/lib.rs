//! chartkit: renderer-agnostic animated charting engine.
//!
//! Chart types (bar, horizontal and stacked bar, line, pie, doughnut, radar,
//! polar area) share one pipeline: configuration layers are resolved, the
//! value scale and plot area are measured, and each animation frame is
//! emitted as an ordered list of draw commands for a [`render::Renderer`].
//! The final frame of a pass records annotation shapes used for hit testing
//! and tooltips.

pub mod animation;
pub mod api;
pub mod charts;
pub mod core;
pub mod error;
pub mod extensions;
pub mod interaction;
pub mod layout;
pub mod render;
pub mod telemetry;

pub use api::{ChartConfig, ChartEngine, ConfigOverrides, FrameOutcome, RenderPass};
pub use charts::{ChartData, ChartKind};
pub use error::{ChartError, ChartResult};
