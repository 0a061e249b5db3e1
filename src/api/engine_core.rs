use indexmap::IndexMap;

use crate::charts::ChartKind;
use crate::core::Viewport;
use crate::extensions::ChartPlugin;

use super::{ChartContext, ConfigOverrides};

/// Configuration layers below the per-call overrides.
#[derive(Debug, Clone, Default)]
pub(super) struct ConfigLayers {
    pub(super) library: ConfigOverrides,
    pub(super) per_kind: IndexMap<ChartKind, ConfigOverrides>,
}

/// Internal engine core state used by the public facade (`ChartEngine`).
pub(super) struct EngineCore {
    pub(super) viewport: Viewport,
    pub(super) layers: ConfigLayers,
    pub(super) context: ChartContext,
    pub(super) plugins: Vec<Box<dyn ChartPlugin>>,
}

impl EngineCore {
    pub(super) fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            layers: ConfigLayers::default(),
            context: ChartContext::default(),
            plugins: Vec::new(),
        }
    }
}
