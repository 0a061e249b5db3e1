use crate::animation::{Animation, AnimationState, Frame, RenderGeneration};
use crate::charts::{
    ChartData, ChartKind, DEFAULT_DATA_LABEL_TEMPLATE, PreparedChart, draw_data_labels, prepare,
};
use crate::core::{Template, Viewport};
use crate::error::ChartResult;
use crate::interaction::{AnnotationEntry, TEMPLATE_SLOTS};
use crate::layout::TextMeasurer;
use crate::render::RenderFrame;

use super::ChartConfig;
use super::context::TooltipSettings;

/// Result of driving one frame of a [`RenderPass`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// An intermediate frame was drawn.
    Drawn(Frame),
    /// The final frame was drawn and the annotation registry updated.
    Completed(Frame),
    /// A newer pass started on the same chart; nothing was drawn.
    Superseded,
    /// The pass already completed; nothing was drawn.
    Exhausted,
}

impl FrameOutcome {
    /// Whether the host should schedule another frame.
    #[must_use]
    pub fn wants_next_frame(self) -> bool {
        matches!(self, Self::Drawn(_))
    }
}

/// One animated rendering of a chart, from first frame to completion.
///
/// Passes own their geometry; the engine only remembers which generation is
/// current, so a pass started by an older call stops at its next frame.
#[derive(Debug)]
pub struct RenderPass {
    pub(super) generation: RenderGeneration,
    pub(super) viewport: Viewport,
    pub(super) config: ChartConfig,
    pub(super) prepared: PreparedChart,
    pub(super) data_labels: Template,
    pub(super) animation: Animation,
    pub(super) tooltip: TooltipSettings,
    pub(super) superseded_reported: bool,
}

impl RenderPass {
    pub(super) fn prepare(
        kind: ChartKind,
        data: &ChartData,
        config: ChartConfig,
        viewport: Viewport,
        measurer: &dyn TextMeasurer,
    ) -> ChartResult<Self> {
        let template = parse_annotation_template(
            config
                .annotate_label
                .as_deref()
                .unwrap_or(kind.default_annotate_template()),
        )?;
        let data_labels = parse_annotation_template(
            config
                .in_graph_data_template
                .as_deref()
                .unwrap_or(DEFAULT_DATA_LABEL_TEMPLATE),
        )?;
        let tooltip = TooltipSettings {
            enabled: config.annotate_display,
            template,
            format: config.number_format(),
            offset: (config.annotate_offset_x, config.annotate_offset_y),
        };
        let prepared = prepare(kind, data, &config, viewport, measurer)?;
        Ok(Self {
            generation: RenderGeneration::default(),
            viewport,
            animation: Animation::new(config.animation_config()),
            config,
            prepared,
            data_labels,
            tooltip,
            superseded_reported: false,
        })
    }

    #[must_use]
    pub fn generation(&self) -> RenderGeneration {
        self.generation
    }

    #[must_use]
    pub fn kind(&self) -> ChartKind {
        self.prepared.kind
    }

    #[must_use]
    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    #[must_use]
    pub fn prepared(&self) -> &PreparedChart {
        &self.prepared
    }

    #[must_use]
    pub fn animation_state(&self) -> AnimationState {
        self.animation.state()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.animation.is_complete()
    }

    /// Builds the scene of `frame`. The final frame also yields the
    /// annotation shapes and carries in-graph data labels when enabled.
    pub(super) fn compose(
        &self,
        frame: Frame,
    ) -> ChartResult<(RenderFrame, Option<Vec<AnnotationEntry>>)> {
        let mut scene = RenderFrame::new(self.viewport);
        if let Some(background) = self.config.background_color {
            scene = scene.with_background(background);
        }
        self.prepared
            .draw_frame(&mut scene, frame.eased, self.config.draw_order);
        if !frame.is_final() {
            return Ok((scene, None));
        }

        let annotations = self.prepared.annotations();
        if self.config.in_graph_data_show {
            draw_data_labels(&annotations, &self.data_labels, &self.config, &mut scene)?;
        }
        Ok((scene, Some(annotations)))
    }
}

/// Parses a tooltip or data-label template and rejects variables no
/// annotation provides, so a bad template fails before the pass starts.
fn parse_annotation_template(source: &str) -> ChartResult<Template> {
    let template = Template::parse(source)?;
    template.check_variables(&TEMPLATE_SLOTS)?;
    Ok(template)
}
