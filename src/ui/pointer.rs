/// Pointer handling for the question screen.
///
/// Turns a frame's worth of mouse moves and clicks into `on_approach` /
/// `on_affirm` calls. Approach is edge-triggered: it fires when the
/// pointer enters the No button, not while it rests there. The layout is
/// recomputed after every approach because No has moved.

use crate::sim::show::Show;
use super::layout::{Button, QuestionLayout};

pub struct PointerTracker {
    /// Pointer was over No after the last processed move.
    on_no: bool,
}

impl PointerTracker {
    pub fn new() -> Self {
        PointerTracker { on_no: false }
    }

    /// Feed this frame's moves (oldest first) and clicks.
    ///
    /// A left press is reported both as a move and as a click; a click on
    /// No only approaches if that move did not already.
    pub fn apply(
        &mut self,
        show: &mut Show,
        layout: impl Fn(&Show) -> QuestionLayout,
        moves: &[(u16, u16)],
        clicks: &[(u16, u16)],
    ) {
        let mut entered_at = Vec::new();

        for &(col, row) in moves {
            let before = layout(show);
            let over_no = before.hit(col, row) == Some(Button::No);
            if over_no && !self.on_no {
                if show.on_approach(before.geometry()) {
                    entered_at.push((col, row));
                }
                self.on_no = layout(show).hit(col, row) == Some(Button::No);
            } else {
                self.on_no = over_no;
            }
        }

        for &(col, row) in clicks {
            let l = layout(show);
            match l.hit(col, row) {
                Some(Button::Yes) => { show.on_affirm(); }
                Some(Button::No) if !entered_at.contains(&(col, row)) => {
                    show.on_approach(l.geometry());
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::phase::FinaleStep;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    const QUESTION_AT: Duration = Duration::from_millis(12_500);

    fn layout(show: &Show) -> QuestionLayout {
        QuestionLayout::compute(80, 24, &show.target)
    }

    fn at_question(seed: u64) -> Show {
        let mut s = Show::mount(StdRng::seed_from_u64(seed));
        s.advance(QUESTION_AT);
        s
    }

    fn no_center(show: &Show) -> (u16, u16) {
        let no = layout(show).no;
        (no.x + no.w / 2, no.y + no.h / 2)
    }

    fn yes_center(show: &Show) -> (u16, u16) {
        let yes = layout(show).yes;
        (yes.x + yes.w / 2, yes.y + yes.h / 2)
    }

    #[test]
    fn entering_no_approaches_once() {
        for seed in 0..20 {
            let mut s = at_question(seed);
            let mut p = PointerTracker::new();
            let at = no_center(&s);
            // Jitter in place: only the first move is an entry.
            p.apply(&mut s, layout, &[at, at, at], &[]);
            assert_eq!(s.target.attempts, 1, "seed {seed}");
        }
    }

    #[test]
    fn hovering_no_does_not_repeat() {
        let mut s = Show::mount(StdRng::seed_from_u64(4));
        let mut p = PointerTracker::new();
        let at = no_center(&s);

        // Resting on No before the question appears is ignored...
        p.apply(&mut s, layout, &[at], &[]);
        s.advance(QUESTION_AT);
        assert_eq!(s.target.attempts, 0);

        // ...and moving around inside it is not a new entry.
        let no = layout(&s).no;
        p.apply(&mut s, layout, &[(no.x, no.y), (no.x + 1, no.y), at], &[]);
        assert_eq!(s.target.attempts, 0);

        // Leaving and coming back is.
        p.apply(&mut s, layout, &[(0, 0), at], &[]);
        assert_eq!(s.target.attempts, 1);
    }

    #[test]
    fn press_on_no_counts_once() {
        for seed in 0..20 {
            let mut s = at_question(seed);
            let mut p = PointerTracker::new();
            let at = no_center(&s);
            p.apply(&mut s, layout, &[at], &[at]);
            assert_eq!(s.target.attempts, 1, "seed {seed}");
        }
    }

    #[test]
    fn click_while_resting_on_no_approaches() {
        let mut s = Show::mount(StdRng::seed_from_u64(9));
        let mut p = PointerTracker::new();
        let at = no_center(&s);
        p.apply(&mut s, layout, &[at], &[]);
        s.advance(QUESTION_AT);

        p.apply(&mut s, layout, &[at], &[at]);
        assert_eq!(s.target.attempts, 1);
    }

    #[test]
    fn click_on_yes_affirms() {
        let mut s = at_question(1);
        let mut p = PointerTracker::new();
        let at = yes_center(&s);
        p.apply(&mut s, layout, &[at], &[at]);
        assert!(s.finale_started);
        assert_eq!(s.finale_step, FinaleStep::Freeze);
        assert_eq!(s.target.attempts, 0);
    }

    #[test]
    fn clicks_elsewhere_do_nothing() {
        let mut s = at_question(1);
        let mut p = PointerTracker::new();
        p.apply(&mut s, layout, &[(0, 0)], &[(0, 0)]);
        assert!(!s.finale_started);
        assert_eq!(s.target.attempts, 0);
    }
}
