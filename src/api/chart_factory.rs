use tracing::debug;

use crate::charts::{ChartData, ChartKind};
use crate::core::{CategoryData, ProportionData};
use crate::error::ChartResult;
use crate::layout::TextMeasurer;
use crate::render::Renderer;

use super::context::RenderRequest;
use super::{ChartEngine, ConfigOverrides, PluginEvent, RenderPass};

impl<R: Renderer, M: TextMeasurer> ChartEngine<R, M> {
    /// Starts a render pass of any chart type.
    ///
    /// Returns `Ok(None)` when `dynamic_display` is on and the chart is not in
    /// view; the request is stored and replayed by
    /// [`ChartEngine::set_visible`]. Starting a pass supersedes every pass
    /// started earlier on this engine.
    pub fn render(
        &mut self,
        kind: ChartKind,
        data: impl Into<ChartData>,
        overrides: &ConfigOverrides,
    ) -> ChartResult<Option<RenderPass>> {
        self.start_pass(kind, data.into(), overrides)
    }

    pub fn bar(
        &mut self,
        data: &CategoryData,
        overrides: &ConfigOverrides,
    ) -> ChartResult<Option<RenderPass>> {
        self.render(ChartKind::Bar, data.clone(), overrides)
    }

    pub fn horizontal_bar(
        &mut self,
        data: &CategoryData,
        overrides: &ConfigOverrides,
    ) -> ChartResult<Option<RenderPass>> {
        self.render(ChartKind::HorizontalBar, data.clone(), overrides)
    }

    pub fn stacked_bar(
        &mut self,
        data: &CategoryData,
        overrides: &ConfigOverrides,
    ) -> ChartResult<Option<RenderPass>> {
        self.render(ChartKind::StackedBar, data.clone(), overrides)
    }

    pub fn horizontal_stacked_bar(
        &mut self,
        data: &CategoryData,
        overrides: &ConfigOverrides,
    ) -> ChartResult<Option<RenderPass>> {
        self.render(ChartKind::HorizontalStackedBar, data.clone(), overrides)
    }

    pub fn line(
        &mut self,
        data: &CategoryData,
        overrides: &ConfigOverrides,
    ) -> ChartResult<Option<RenderPass>> {
        self.render(ChartKind::Line, data.clone(), overrides)
    }

    pub fn radar(
        &mut self,
        data: &CategoryData,
        overrides: &ConfigOverrides,
    ) -> ChartResult<Option<RenderPass>> {
        self.render(ChartKind::Radar, data.clone(), overrides)
    }

    pub fn pie(
        &mut self,
        data: &ProportionData,
        overrides: &ConfigOverrides,
    ) -> ChartResult<Option<RenderPass>> {
        self.render(ChartKind::Pie, data.clone(), overrides)
    }

    pub fn doughnut(
        &mut self,
        data: &ProportionData,
        overrides: &ConfigOverrides,
    ) -> ChartResult<Option<RenderPass>> {
        self.render(ChartKind::Doughnut, data.clone(), overrides)
    }

    pub fn polar_area(
        &mut self,
        data: &ProportionData,
        overrides: &ConfigOverrides,
    ) -> ChartResult<Option<RenderPass>> {
        self.render(ChartKind::PolarArea, data.clone(), overrides)
    }

    pub(super) fn start_pass(
        &mut self,
        kind: ChartKind,
        data: ChartData,
        overrides: &ConfigOverrides,
    ) -> ChartResult<Option<RenderPass>> {
        let config = self.resolve_config(kind, overrides)?;
        if config.dynamic_display && !self.core.context.display.in_view {
            debug!(kind = %kind, "render deferred until chart is in view");
            self.core.context.display.deferred = Some(RenderRequest {
                kind,
                data,
                overrides: overrides.clone(),
            });
            self.emit_plugin_event(PluginEvent::RenderDeferred { kind });
            return Ok(None);
        }

        let mut pass = RenderPass::prepare(kind, &data, config, self.core.viewport, &self.measurer)?;
        pass.generation = self.core.context.begin_pass(kind);
        debug!(
            kind = %kind,
            generation = pass.generation.0,
            frames = pass.animation.frame_count(),
            "render pass started"
        );
        self.emit_plugin_event(PluginEvent::PassStarted {
            kind,
            generation: pass.generation,
        });
        Ok(Some(pass))
    }
}
