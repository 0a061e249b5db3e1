use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::core::format::{NumberFormat, Rounding, format_number};
use crate::core::{PixelRect, Point, TemplateContext};

/// Pointer distance under which a point annotation is hit.
pub const POINT_HIT_RADIUS: f64 = 10.0;

/// Data carried by every annotation and exposed to tooltip templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationPayload {
    pub dataset_title: String,
    pub label: String,
    pub value: f64,
    pub cumulative: f64,
    pub total: f64,
    pub dataset_index: usize,
    pub index: usize,
}

impl AnnotationPayload {
    /// Share of `total` in percent; `0` when the total is zero.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        if self.total == 0.0 {
            0.0
        } else {
            self.value / self.total * 100.0
        }
    }
}

/// One recorded shape of a completed render pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnnotationEntry {
    /// Annular sector; angles in radians, clockwise from the positive x axis.
    Arc {
        center: Point,
        inner_radius: f64,
        outer_radius: f64,
        start_angle: f64,
        end_angle: f64,
        payload: AnnotationPayload,
    },
    Rect {
        rect: PixelRect,
        payload: AnnotationPayload,
    },
    Point {
        position: Point,
        payload: AnnotationPayload,
    },
}

impl AnnotationEntry {
    #[must_use]
    pub fn payload(&self) -> &AnnotationPayload {
        match self {
            AnnotationEntry::Arc { payload, .. }
            | AnnotationEntry::Rect { payload, .. }
            | AnnotationEntry::Point { payload, .. } => payload,
        }
    }

    /// Sweep of an arc in radians; `0` for other shapes.
    #[must_use]
    pub fn sweep(&self) -> f64 {
        match self {
            AnnotationEntry::Arc {
                start_angle,
                end_angle,
                ..
            } => end_angle - start_angle,
            _ => 0.0,
        }
    }

    /// A point guaranteed to be inside the shape.
    #[must_use]
    pub fn anchor(&self) -> Point {
        match self {
            AnnotationEntry::Arc {
                center,
                inner_radius,
                outer_radius,
                start_angle,
                end_angle,
                ..
            } => {
                let angle = (start_angle + end_angle) / 2.0;
                let radius = (inner_radius + outer_radius) / 2.0;
                Point::new(
                    center.x + radius * angle.cos(),
                    center.y + radius * angle.sin(),
                )
            }
            AnnotationEntry::Rect { rect, .. } => rect.center(),
            AnnotationEntry::Point { position, .. } => *position,
        }
    }

    #[must_use]
    pub fn contains(&self, pointer: Point) -> bool {
        match self {
            AnnotationEntry::Arc {
                center,
                inner_radius,
                outer_radius,
                start_angle,
                end_angle,
                ..
            } => {
                let distance = center.distance_to(pointer);
                if distance < *inner_radius || distance > *outer_radius {
                    return false;
                }
                angle_within(
                    (pointer.y - center.y).atan2(pointer.x - center.x),
                    *start_angle,
                    *end_angle,
                )
            }
            AnnotationEntry::Rect { rect, .. } => rect.contains(pointer),
            AnnotationEntry::Point { position, .. } => {
                position.distance_to(pointer) < POINT_HIT_RADIUS
            }
        }
    }

    /// Tooltip template slots, see [`TEMPLATE_SLOTS`].
    ///
    /// `extent` is the arc sweep in degrees, or the larger side of a bar.
    #[must_use]
    pub fn template_context(&self, format: &NumberFormat) -> TemplateContext {
        let payload = self.payload();
        let percent_format = format.clone().with_rounding(Rounding::Decimals(1));
        let (extent, first, second) = match self {
            AnnotationEntry::Arc { center, .. } => {
                (self.sweep().to_degrees(), self.anchor(), *center)
            }
            AnnotationEntry::Rect { rect, .. } => (
                rect.width.max(rect.height),
                Point::new(rect.left, rect.top),
                Point::new(rect.right(), rect.bottom()),
            ),
            AnnotationEntry::Point { position, .. } => (0.0, *position, *position),
        };

        TemplateContext::new()
            .with("dataset", payload.dataset_title.clone())
            .with("label", payload.label.clone())
            .with("value", format_number(payload.value, format))
            .with("cumulative", format_number(payload.cumulative, format))
            .with("total", format_number(payload.total, format))
            .with(
                "percentage",
                format_number(payload.percentage(), &percent_format),
            )
            .with("extent", extent)
            .with("x", first.x)
            .with("y", first.y)
            .with("x2", second.x)
            .with("y2", second.y)
            .with("dataset_index", payload.dataset_index as f64)
            .with("index", payload.index as f64)
    }
}

/// Variables every annotation exposes to tooltip and data-label templates.
pub const TEMPLATE_SLOTS: [&str; 13] = [
    "dataset",
    "label",
    "value",
    "cumulative",
    "total",
    "percentage",
    "extent",
    "x",
    "y",
    "x2",
    "y2",
    "dataset_index",
    "index",
];

/// `true` when `angle` lies on the clockwise sweep from `start` to `end`.
fn angle_within(angle: f64, start: f64, end: f64) -> bool {
    let sweep = end - start;
    if sweep >= TAU {
        return true;
    }
    if sweep <= 0.0 {
        return false;
    }
    (angle - start).rem_euclid(TAU) <= sweep
}

/// Shapes of the last completed render pass of one chart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationRegistry {
    entries: Vec<AnnotationEntry>,
}

impl AnnotationRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every entry with the shapes of a newly completed pass.
    pub fn replace(&mut self, entries: Vec<AnnotationEntry>) {
        self.entries = entries;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn entries(&self) -> &[AnnotationEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry containing the pointer, in drawing order.
    #[must_use]
    pub fn hit_test(&self, x: f64, y: f64) -> Option<&AnnotationEntry> {
        self.hit_index(x, y).map(|index| &self.entries[index])
    }

    /// Position of the first entry containing the pointer.
    #[must_use]
    pub fn hit_index(&self, x: f64, y: f64) -> Option<usize> {
        let pointer = Point::new(x, y);
        self.entries.iter().position(|entry| entry.contains(pointer))
    }
}
