/// Question-screen layout in terminal cells.
///
/// Shared by the renderer (what to draw where) and the input loop
/// (hit-testing and measuring the No button for the evasion math),
/// so both always agree on where the buttons are.

use crate::domain::evasive::{EvasiveTarget, Geometry};

/// A rectangle of terminal cells.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl Rect {
    pub fn contains(&self, col: u16, row: u16) -> bool {
        col >= self.x
            && row >= self.y
            && (col as u32) < self.x as u32 + self.w as u32
            && (row as u32) < self.y as u32 + self.h as u32
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    pub fn right(&self) -> u16 {
        self.x.saturating_add(self.w)
    }

    pub fn bottom(&self) -> u16 {
        self.y.saturating_add(self.h)
    }

    #[allow(dead_code)]
    /// Is `other` fully inside `self`?
    pub fn encloses(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Button {
    Yes,
    No,
}

pub const BUTTON_W: u16 = 10;
pub const BUTTON_H: u16 = 3;
const MIN_BUTTON_W: u16 = 4;
/// Below this scale the box border is dropped.
const BOXED_SCALE: f32 = 0.65;

const CONTAINER_MAX_W: u16 = 60;
const CONTAINER_MAX_H: u16 = 11;
/// Title + gap + message + gap above the container.
const HEADER_ROWS: u16 = 4;

/// Yes stays put, left of the No button's starting spot.
pub const YES_POS: (f32, f32) = (30.0, 50.0);

/// Drawn footprint of a button at a given scale.
pub fn button_size(scale: f32) -> (u16, u16) {
    let w = ((BUTTON_W as f32 * scale).round() as u16).clamp(MIN_BUTTON_W, BUTTON_W);
    let h = if scale >= BOXED_SCALE { BUTTON_H } else { 1 };
    (w, h)
}

/// Place a `w`×`h` box centered at a percentage point of `container`,
/// clamped so it never leaves the container.
pub fn place(container: &Rect, center_pct: (f32, f32), w: u16, h: u16) -> Rect {
    fn axis(origin: u16, span: u16, pct: f32, size: u16) -> u16 {
        let center = origin as f32 + pct / 100.0 * span as f32;
        let start = (center - size as f32 / 2.0).round();
        let lo = origin as f32;
        let hi = (origin as f32 + span as f32 - size as f32).max(lo);
        start.clamp(lo, hi) as u16
    }
    Rect {
        x: axis(container.x, container.w, center_pct.0, w),
        y: axis(container.y, container.h, center_pct.1, h),
        w,
        h,
    }
}

#[derive(Clone, Copy, Debug)]
pub struct QuestionLayout {
    pub title_row: u16,
    pub message_row: u16,
    pub container: Rect,
    pub yes: Rect,
    pub no: Rect,
    pub help_row: u16,
}

impl QuestionLayout {
    pub fn compute(term_w: u16, term_h: u16, target: &EvasiveTarget) -> Self {
        let cw = CONTAINER_MAX_W.min(term_w.saturating_sub(4));
        let ch = CONTAINER_MAX_H.min(term_h.saturating_sub(HEADER_ROWS + 3));
        let top = term_h.saturating_sub(HEADER_ROWS + ch) / 2;
        let container = Rect {
            x: term_w.saturating_sub(cw) / 2,
            y: top + HEADER_ROWS,
            w: cw,
            h: ch,
        };

        let (yw, yh) = button_size(1.0);
        let (nw, nh) = button_size(target.scale);

        QuestionLayout {
            title_row: top,
            message_row: top + 2,
            container,
            yes: place(&container, YES_POS, yw, yh),
            no: place(&container, (target.x, target.y), nw, nh),
            help_row: term_h.saturating_sub(1),
        }
    }

    /// Measured sizes for the evasion math; `None` when the terminal is
    /// too small to lay out a container at all.
    pub fn geometry(&self) -> Option<Geometry> {
        if self.container.is_empty() {
            return None;
        }
        Some(Geometry {
            container_w: self.container.w as f32,
            container_h: self.container.h as f32,
            target_w: self.no.w as f32,
            target_h: self.no.h as f32,
        })
    }

    /// No is drawn over Yes, so it wins overlaps.
    pub fn hit(&self, col: u16, row: u16) -> Option<Button> {
        if self.no.contains(col, row) {
            Some(Button::No)
        } else if self.yes.contains(col, row) {
            Some(Button::Yes)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::evasive::SafeRect;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn button_shrinks_with_scale() {
        assert_eq!(button_size(1.0), (10, 3));
        assert_eq!(button_size(0.7), (7, 3));
        assert_eq!(button_size(0.6), (6, 1));
        assert_eq!(button_size(0.4), (4, 1));
    }

    #[test]
    fn start_layout_on_standard_terminal() {
        let l = QuestionLayout::compute(80, 24, &EvasiveTarget::new());
        assert_eq!(l.container.w, 60);
        assert_eq!(l.container.h, 11);
        assert!(l.container.encloses(&l.yes));
        assert!(l.container.encloses(&l.no));
        // No starts to the right of Yes.
        assert!(l.no.x > l.yes.right());
        assert!(l.title_row < l.message_row && l.message_row < l.container.y);
    }

    #[test]
    fn hit_prefers_no_on_overlap() {
        let mut t = EvasiveTarget::new();
        t.x = YES_POS.0;
        t.y = YES_POS.1;
        let l = QuestionLayout::compute(80, 24, &t);
        assert_eq!(l.yes, l.no);
        assert_eq!(l.hit(l.no.x, l.no.y), Some(Button::No));
        assert_eq!(l.hit(0, 0), None);
    }

    #[test]
    fn tiny_terminal_has_no_geometry() {
        let l = QuestionLayout::compute(3, 5, &EvasiveTarget::new());
        assert!(l.geometry().is_none());
    }

    #[test]
    fn geometry_reports_current_footprint() {
        let mut t = EvasiveTarget::new();
        t.scale = 0.5;
        let g = QuestionLayout::compute(100, 40, &t).geometry().unwrap();
        assert_eq!((g.target_w, g.target_h), (5.0, 1.0));
        assert_eq!((g.container_w, g.container_h), (60.0, 11.0));
    }

    proptest! {
        #[test]
        fn evaded_button_stays_in_container(
            term_w in 20u16..220,
            term_h in 12u16..80,
            seed in any::<u64>(),
            evasions in 1usize..12,
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut t = EvasiveTarget::new();
            for _ in 0..evasions {
                let l = QuestionLayout::compute(term_w, term_h, &t);
                let g = l.geometry();
                t.evade(g.as_ref(), &mut rng);
                if let Some(g) = g {
                    let rect = SafeRect::measured(&g).unwrap();
                    prop_assert!(t.x >= rect.min_x - 1e-3 && t.x <= rect.max_x + 1e-3);
                    prop_assert!(t.y >= rect.min_y - 1e-3 && t.y <= rect.max_y + 1e-3);
                }
                let after = QuestionLayout::compute(term_w, term_h, &t);
                prop_assert!(after.container.encloses(&after.no));
            }
        }
    }
}
