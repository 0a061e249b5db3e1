use serde::{Deserialize, Serialize};

use crate::animation::RenderGeneration;
use crate::charts::ChartKind;
use crate::core::Viewport;

/// Read-only state snapshot passed to plugin hooks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PluginContext {
    pub viewport: Viewport,
    /// Chart type of the latest render pass, if any.
    pub kind: Option<ChartKind>,
    pub generation: RenderGeneration,
    pub annotations_len: usize,
    pub in_view: bool,
}

/// Event stream exposed to plugins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PluginEvent {
    PassStarted {
        kind: ChartKind,
        generation: RenderGeneration,
    },
    FrameDrawn {
        generation: RenderGeneration,
        fraction: f64,
    },
    AnimationCompleted {
        generation: RenderGeneration,
    },
    PassSuperseded {
        generation: RenderGeneration,
    },
    /// The pointer entered a different annotation.
    AnnotationHit {
        entry: usize,
        dataset_index: usize,
        index: usize,
    },
    /// A render request was stored until the chart becomes visible.
    RenderDeferred {
        kind: ChartKind,
    },
}

/// Extension hook interface for bounded custom logic.
///
/// Plugins can observe events and read engine context without mutating core
/// internals directly.
pub trait ChartPlugin {
    fn id(&self) -> &str;
    fn on_event(&mut self, event: PluginEvent, context: PluginContext);
}
