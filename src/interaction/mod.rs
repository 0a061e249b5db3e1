//! Annotation registry, hit testing and tooltips.

mod annotation;
mod tooltip;

use serde::{Deserialize, Serialize};

pub use annotation::{
    AnnotationEntry, AnnotationPayload, AnnotationRegistry, POINT_HIT_RADIUS, TEMPLATE_SLOTS,
};
pub use tooltip::{Tooltip, render_tooltip};

/// Pointer position and the annotation currently under it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HoverState {
    inside: bool,
    cursor_x: f64,
    cursor_y: f64,
    hovered: Option<usize>,
}

impl HoverState {
    #[must_use]
    pub fn cursor(self) -> Option<(f64, f64)> {
        self.inside.then_some((self.cursor_x, self.cursor_y))
    }

    /// Registry index of the hovered annotation.
    #[must_use]
    pub fn hovered(self) -> Option<usize> {
        self.hovered
    }

    /// Records a pointer move. Returns `true` when the hovered annotation
    /// changed to a different entry.
    pub fn on_pointer_move(&mut self, x: f64, y: f64, hit: Option<usize>) -> bool {
        self.inside = true;
        self.cursor_x = x;
        self.cursor_y = y;
        let changed = hit.is_some() && hit != self.hovered;
        self.hovered = hit;
        changed
    }

    pub fn on_pointer_leave(&mut self) {
        self.inside = false;
        self.hovered = None;
    }

    /// Forgets the hovered entry; registry indices are stale after a pass.
    pub fn reset_hover(&mut self) {
        self.hovered = None;
    }
}

#[cfg(test)]
mod tests {
    use super::HoverState;

    #[test]
    fn reports_only_changes_of_hovered_entry() {
        let mut hover = HoverState::default();
        assert!(hover.cursor().is_none());
        assert!(hover.on_pointer_move(1.0, 2.0, Some(0)));
        assert!(!hover.on_pointer_move(1.5, 2.0, Some(0)));
        assert!(!hover.on_pointer_move(50.0, 2.0, None));
        assert!(hover.on_pointer_move(1.0, 2.0, Some(0)));
        assert_eq!(hover.cursor(), Some((1.0, 2.0)));

        hover.on_pointer_leave();
        assert!(hover.cursor().is_none());
        assert!(hover.hovered().is_none());
    }
}
