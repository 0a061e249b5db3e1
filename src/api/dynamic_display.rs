use tracing::debug;

use crate::error::ChartResult;
use crate::layout::TextMeasurer;
use crate::render::Renderer;

use super::{ChartEngine, RenderPass};

impl<R: Renderer, M: TextMeasurer> ChartEngine<R, M> {
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.core.context.display.in_view
    }

    /// Reports whether the chart is currently in view.
    ///
    /// The first transition into view replays a render request deferred by
    /// `dynamic_display` and returns its pass. Later transitions return
    /// `Ok(None)`.
    pub fn set_visible(&mut self, visible: bool) -> ChartResult<Option<RenderPass>> {
        let display = &mut self.core.context.display;
        let entered = visible && !display.in_view;
        display.in_view = visible;
        if !entered {
            return Ok(None);
        }
        let Some(request) = display.deferred.take() else {
            return Ok(None);
        };
        debug!(kind = %request.kind, "replaying deferred render");
        self.start_pass(request.kind, request.data, &request.overrides)
    }
}
