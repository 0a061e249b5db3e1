use crate::animation::RenderGeneration;
use crate::charts::{ChartData, ChartKind};
use crate::core::{NumberFormat, Template};
use crate::interaction::{AnnotationRegistry, HoverState};

use super::ConfigOverrides;

/// A render call captured while the chart was out of view.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub kind: ChartKind,
    pub data: ChartData,
    pub overrides: ConfigOverrides,
}

/// Visibility of a chart with `dynamic_display` enabled.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DynamicDisplayRecord {
    pub in_view: bool,
    /// Replayed once on the first transition into view.
    pub deferred: Option<RenderRequest>,
}

/// Tooltip settings of the last completed pass.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TooltipSettings {
    pub enabled: bool,
    pub template: Template,
    pub format: NumberFormat,
    pub offset: (f64, f64),
}

/// Per-chart mutable state owned by one engine.
#[derive(Debug, Clone, Default)]
pub struct ChartContext {
    pub(crate) registry: AnnotationRegistry,
    pub(crate) generation: RenderGeneration,
    pub(crate) display: DynamicDisplayRecord,
    pub(crate) hover: HoverState,
    pub(crate) tooltip: Option<TooltipSettings>,
    pub(crate) kind: Option<ChartKind>,
}

impl ChartContext {
    #[must_use]
    pub fn registry(&self) -> &AnnotationRegistry {
        &self.registry
    }

    /// Generation of the most recently started pass.
    #[must_use]
    pub fn generation(&self) -> RenderGeneration {
        self.generation
    }

    #[must_use]
    pub fn display(&self) -> &DynamicDisplayRecord {
        &self.display
    }

    #[must_use]
    pub fn hover(&self) -> HoverState {
        self.hover
    }

    /// Chart type of the most recently started pass.
    #[must_use]
    pub fn kind(&self) -> Option<ChartKind> {
        self.kind
    }

    pub(crate) fn begin_pass(&mut self, kind: ChartKind) -> RenderGeneration {
        self.generation = self.generation.next();
        self.kind = Some(kind);
        self.generation
    }

    pub(crate) fn is_current(&self, generation: RenderGeneration) -> bool {
        self.generation == generation
    }
}
