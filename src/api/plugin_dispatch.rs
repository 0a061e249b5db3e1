use crate::extensions::PluginContext;
use crate::layout::TextMeasurer;
use crate::render::Renderer;

use super::{ChartEngine, PluginEvent};

impl<R: Renderer, M: TextMeasurer> ChartEngine<R, M> {
    pub(super) fn plugin_context(&self) -> PluginContext {
        let context = &self.core.context;
        PluginContext {
            viewport: self.core.viewport,
            kind: context.kind,
            generation: context.generation,
            annotations_len: context.registry.len(),
            in_view: context.display.in_view,
        }
    }

    pub(super) fn emit_plugin_event(&mut self, event: PluginEvent) {
        let context = self.plugin_context();
        for plugin in &mut self.core.plugins {
            plugin.on_event(event, context);
        }
    }
}
