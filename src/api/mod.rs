//! Public engine facade.
//!
//! `ChartEngine` is split across files by concern: chart-type entry points,
//! frame driving, pointer interaction, visibility and plugins.

mod annotation_controller;
mod chart_factory;
mod config;
mod context;
mod dynamic_display;
mod engine;
mod engine_core;
mod plugin_dispatch;
mod plugin_registry;
mod render_coordinator;
mod render_pass;

pub use crate::extensions::PluginEvent;
pub use config::{ChartConfig, ConfigOverrides, CrossText, DrawOrder, LabelRotation, LegendPosition};
pub use context::{ChartContext, DynamicDisplayRecord, RenderRequest};
pub use engine::ChartEngine;
pub use render_pass::{FrameOutcome, RenderPass};
