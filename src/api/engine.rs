use crate::charts::ChartKind;
use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::layout::TextMeasurer;
use crate::render::Renderer;

use super::{ChartConfig, ChartContext, ConfigOverrides, engine_core::EngineCore};

#[cfg(feature = "cairo-backend")]
use super::{RenderPass, render_coordinator::RenderCoordinator};
#[cfg(feature = "cairo-backend")]
use crate::render::CairoContextRenderer;

/// Main orchestration facade consumed by host applications.
///
/// One engine owns one chart: its renderer, its text measurer, the
/// configuration layers and the per-chart context (annotation registry,
/// render generation, visibility and hover state). Render passes are started
/// through the chart-type methods and driven frame by frame by the host.
pub struct ChartEngine<R: Renderer, M: TextMeasurer> {
    pub(super) renderer: R,
    pub(super) measurer: M,
    pub(super) core: EngineCore,
}

impl<R: Renderer, M: TextMeasurer> ChartEngine<R, M> {
    pub fn new(renderer: R, measurer: M, viewport: Viewport) -> ChartResult<Self> {
        if !viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        Ok(Self {
            renderer,
            measurer,
            core: EngineCore::new(viewport),
        })
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.core.viewport
    }

    /// Resizes the drawing surface. Takes effect from the next pass.
    pub fn set_viewport(&mut self, viewport: Viewport) -> ChartResult<()> {
        if !viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        self.core.viewport = viewport;
        Ok(())
    }

    #[must_use]
    pub fn context(&self) -> &ChartContext {
        &self.core.context
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }

    /// Sets the library-wide layer applied to every chart type.
    pub fn set_library_overrides(&mut self, overrides: ConfigOverrides) -> ChartResult<()> {
        for kind in ChartKind::ALL {
            ChartConfig::resolve(kind, &[&overrides])?;
        }
        self.core.layers.library = overrides;
        Ok(())
    }

    /// Sets the layer applied to one chart type, above the library layer.
    pub fn set_kind_overrides(
        &mut self,
        kind: ChartKind,
        overrides: ConfigOverrides,
    ) -> ChartResult<()> {
        ChartConfig::resolve(kind, &[&self.core.layers.library, &overrides])?;
        self.core.layers.per_kind.insert(kind, overrides);
        Ok(())
    }

    /// Resolves the effective configuration for `kind` with `overrides` on top.
    pub fn resolve_config(
        &self,
        kind: ChartKind,
        overrides: &ConfigOverrides,
    ) -> ChartResult<ChartConfig> {
        let empty = ConfigOverrides::default();
        let per_kind = self.core.layers.per_kind.get(&kind).unwrap_or(&empty);
        ChartConfig::resolve(kind, &[&self.core.layers.library, per_kind, overrides])
    }

    /// Draws the next frame of `pass` into an external cairo context.
    ///
    /// This path is used by toolkit draw callbacks while keeping the renderer
    /// implementation decoupled from toolkit-specific APIs.
    #[cfg(feature = "cairo-backend")]
    pub fn render_on_cairo_context(
        &mut self,
        pass: &mut RenderPass,
        context: &cairo::Context,
    ) -> ChartResult<super::FrameOutcome>
    where
        R: CairoContextRenderer,
    {
        RenderCoordinator::render_on_cairo_context(self, pass, context)
    }
}
