use tracing::trace;

use crate::error::ChartResult;
use crate::interaction::{AnnotationEntry, Tooltip, render_tooltip};
use crate::layout::TextMeasurer;
use crate::render::Renderer;

use super::{ChartEngine, PluginEvent};

impl<R: Renderer, M: TextMeasurer> ChartEngine<R, M> {
    /// Returns the first annotation of the last completed pass containing
    /// the pointer.
    #[must_use]
    pub fn hit_test(&self, x: f64, y: f64) -> Option<&AnnotationEntry> {
        self.core.context.registry.hit_test(x, y)
    }

    /// Tooltip for the pointer position, when tooltips are enabled and an
    /// annotation is hit.
    pub fn tooltip_at(&self, x: f64, y: f64) -> ChartResult<Option<Tooltip>> {
        let context = &self.core.context;
        let Some(settings) = context.tooltip.as_ref().filter(|settings| settings.enabled) else {
            return Ok(None);
        };
        let Some(entry) = context.registry.hit_test(x, y) else {
            return Ok(None);
        };
        render_tooltip(entry, &settings.template, &settings.format, (x, y), settings.offset)
            .map(Some)
    }

    /// Tracks the pointer and returns the tooltip to display, if any.
    pub fn on_pointer_move(&mut self, x: f64, y: f64) -> ChartResult<Option<Tooltip>> {
        let hit = self.core.context.registry.hit_index(x, y);
        if self.core.context.hover.on_pointer_move(x, y, hit) {
            let registry = &self.core.context.registry;
            let hovered = hit.and_then(|entry| {
                let payload = registry.entries().get(entry)?.payload();
                Some((entry, payload.dataset_index, payload.index))
            });
            if let Some((entry, dataset_index, index)) = hovered {
                trace!(entry, dataset_index, index, "annotation hovered");
                self.emit_plugin_event(PluginEvent::AnnotationHit {
                    entry,
                    dataset_index,
                    index,
                });
            }
        }
        self.tooltip_at(x, y)
    }

    pub fn on_pointer_leave(&mut self) {
        self.core.context.hover.on_pointer_leave();
    }
}
