use tracing::{debug, trace};

use crate::animation::{Animation, Frame};
use crate::charts::{ChartData, ChartKind};
use crate::error::ChartResult;
use crate::interaction::AnnotationEntry;
use crate::layout::TextMeasurer;
use crate::render::{RenderFrame, Renderer};

use super::{ChartEngine, ConfigOverrides, FrameOutcome, PluginEvent, RenderPass};

#[cfg(feature = "cairo-backend")]
use crate::render::CairoContextRenderer;

pub(super) struct RenderCoordinator;

enum Step {
    Ready {
        scene: RenderFrame,
        frame: Frame,
        annotations: Option<Vec<AnnotationEntry>>,
        /// Animation state after `frame`, committed once the frame is drawn.
        advanced: Animation,
    },
    Done(FrameOutcome),
}

impl RenderCoordinator {
    pub(super) fn render_next_frame<R: Renderer, M: TextMeasurer>(
        engine: &mut ChartEngine<R, M>,
        pass: &mut RenderPass,
    ) -> ChartResult<FrameOutcome> {
        match Self::compose(engine, pass)? {
            Step::Done(outcome) => Ok(outcome),
            Step::Ready {
                scene,
                frame,
                annotations,
                advanced,
            } => {
                engine.renderer.render(&scene)?;
                Ok(Self::finish_frame(engine, pass, advanced, frame, annotations))
            }
        }
    }

    #[cfg(feature = "cairo-backend")]
    pub(super) fn render_on_cairo_context<R: Renderer + CairoContextRenderer, M: TextMeasurer>(
        engine: &mut ChartEngine<R, M>,
        pass: &mut RenderPass,
        context: &cairo::Context,
    ) -> ChartResult<FrameOutcome> {
        match Self::compose(engine, pass)? {
            Step::Done(outcome) => Ok(outcome),
            Step::Ready {
                scene,
                frame,
                annotations,
                advanced,
            } => {
                engine.renderer.render_on_cairo_context(context, &scene)?;
                Ok(Self::finish_frame(engine, pass, advanced, frame, annotations))
            }
        }
    }

    fn compose<R: Renderer, M: TextMeasurer>(
        engine: &mut ChartEngine<R, M>,
        pass: &mut RenderPass,
    ) -> ChartResult<Step> {
        if !engine.core.context.is_current(pass.generation) {
            if !pass.superseded_reported {
                pass.superseded_reported = true;
                debug!(
                    generation = pass.generation.0,
                    current = engine.core.context.generation.0,
                    "render pass superseded"
                );
                engine.emit_plugin_event(PluginEvent::PassSuperseded {
                    generation: pass.generation,
                });
            }
            return Ok(Step::Done(FrameOutcome::Superseded));
        }
        let mut advanced = pass.animation;
        let Some(frame) = advanced.advance() else {
            return Ok(Step::Done(FrameOutcome::Exhausted));
        };
        let (scene, annotations) = pass.compose(frame)?;
        Ok(Step::Ready {
            scene,
            frame,
            annotations,
            advanced,
        })
    }

    fn finish_frame<R: Renderer, M: TextMeasurer>(
        engine: &mut ChartEngine<R, M>,
        pass: &mut RenderPass,
        advanced: Animation,
        frame: Frame,
        annotations: Option<Vec<AnnotationEntry>>,
    ) -> FrameOutcome {
        pass.animation = advanced;
        trace!(
            generation = pass.generation.0,
            fraction = frame.fraction,
            "frame drawn"
        );
        engine.emit_plugin_event(PluginEvent::FrameDrawn {
            generation: pass.generation,
            fraction: frame.fraction,
        });
        let Some(annotations) = annotations else {
            return FrameOutcome::Drawn(frame);
        };

        let context = &mut engine.core.context;
        context.registry.replace(annotations);
        context.hover.reset_hover();
        context.tooltip = Some(pass.tooltip.clone());
        debug!(
            kind = %pass.kind(),
            generation = pass.generation.0,
            annotations = context.registry.len(),
            "render pass complete"
        );
        engine.emit_plugin_event(PluginEvent::AnimationCompleted {
            generation: pass.generation,
        });
        FrameOutcome::Completed(frame)
    }
}

impl<R: Renderer, M: TextMeasurer> ChartEngine<R, M> {
    /// Draws the next animation frame of `pass`.
    ///
    /// Hosts call this once per display refresh while
    /// [`FrameOutcome::wants_next_frame`] holds.
    pub fn render_next_frame(&mut self, pass: &mut RenderPass) -> ChartResult<FrameOutcome> {
        RenderCoordinator::render_next_frame(self, pass)
    }

    /// Draws every remaining frame of `pass`.
    pub fn run_to_completion(&mut self, pass: &mut RenderPass) -> ChartResult<FrameOutcome> {
        loop {
            let outcome = self.render_next_frame(pass)?;
            if !outcome.wants_next_frame() {
                return Ok(outcome);
            }
        }
    }

    /// Skips the animation of `pass` and draws its final frame.
    pub fn finish_pass(&mut self, pass: &mut RenderPass) -> ChartResult<FrameOutcome> {
        if !self.core.context.is_current(pass.generation) || pass.is_complete() {
            return self.render_next_frame(pass);
        }
        let mut advanced = pass.animation;
        let Some(frame) = advanced.finish() else {
            return Ok(FrameOutcome::Exhausted);
        };
        let (scene, annotations) = pass.compose(frame)?;
        self.renderer.render(&scene)?;
        Ok(RenderCoordinator::finish_frame(
            self,
            pass,
            advanced,
            frame,
            annotations,
        ))
    }

    /// Renders the final frame of a chart into `target` without animation.
    ///
    /// The engine's own renderer and chart context are left untouched, so
    /// still export never supersedes or disturbs an on-screen pass.
    pub fn export_still(
        &self,
        kind: ChartKind,
        data: impl Into<ChartData>,
        overrides: &ConfigOverrides,
        target: &mut dyn Renderer,
    ) -> ChartResult<()> {
        let config = self.resolve_config(kind, overrides)?;
        let pass = RenderPass::prepare(kind, &data.into(), config, self.core.viewport, &self.measurer)?;
        let (scene, _) = pass.compose(Frame {
            fraction: 1.0,
            eased: 1.0,
        })?;
        debug!(kind = %kind, commands = scene.commands.len(), "still exported");
        target.render(&scene)
    }
}
