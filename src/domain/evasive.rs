/// The evasive No button: where it may go, how small it may get,
/// and what it says when cornered.
///
/// Positions are percentages of the buttons container and refer to
/// the button's center. Two placement paths exist:
///   - measured: the legal rectangle is derived from the container and
///     button sizes (half the button + 5% padding on each side)
///   - fallback: a fixed 20..80% square when nothing can be measured
/// They are deliberately kept separate.

use rand::Rng;

pub const PADDING_PCT: f32 = 5.0;
pub const FALLBACK_MIN_PCT: f32 = 20.0;
pub const FALLBACK_SPAN_PCT: f32 = 60.0;

pub const START_SCALE: f32 = 1.0;
pub const SCALE_STEP: f32 = 0.1;
pub const MIN_SCALE: f32 = 0.4;

/// Start position: to the right of the Yes button.
pub const START_POS: (f32, f32) = (70.0, 50.0);

/// Measured sizes, any consistent unit (terminal cells here).
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Geometry {
    pub container_w: f32,
    pub container_h: f32,
    pub target_w: f32,
    pub target_h: f32,
}

/// Legal range for the button center, in percent.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct SafeRect {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl SafeRect {
    pub const FALLBACK: SafeRect = SafeRect {
        min_x: FALLBACK_MIN_PCT,
        max_x: FALLBACK_MIN_PCT + FALLBACK_SPAN_PCT,
        min_y: FALLBACK_MIN_PCT,
        max_y: FALLBACK_MIN_PCT + FALLBACK_SPAN_PCT,
    };

    /// Derive the legal center range from measured sizes.
    /// Returns `None` when the container has no usable size.
    pub fn measured(g: &Geometry) -> Option<SafeRect> {
        if !(g.container_w > 0.0 && g.container_h > 0.0) {
            return None;
        }
        let w_pct = g.target_w.max(0.0) / g.container_w * 100.0;
        let h_pct = g.target_h.max(0.0) / g.container_h * 100.0;
        let (min_x, max_x) = axis_range(w_pct);
        let (min_y, max_y) = axis_range(h_pct);
        Some(SafeRect { min_x, max_x, min_y, max_y })
    }

    /// Uniform draw, independent per axis.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> (f32, f32) {
        let rx: f32 = rng.random();
        let ry: f32 = rng.random();
        (
            rx * (self.max_x - self.min_x) + self.min_x,
            ry * (self.max_y - self.min_y) + self.min_y,
        )
    }

    #[allow(dead_code)]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// `[size/2 + pad, 100 - size/2 - pad]`; a target too big for the
/// container collapses the axis onto its center.
fn axis_range(size_pct: f32) -> (f32, f32) {
    let min = size_pct / 2.0 + PADDING_PCT;
    let max = 100.0 - size_pct / 2.0 - PADDING_PCT;
    if min > max { (50.0, 50.0) } else { (min, max) }
}

/// Message for a given attempt count, if it is a milestone.
pub fn milestone_message(attempts: u32) -> Option<&'static str> {
    match attempts {
        3 => Some("Why are you running from destiny?"),
        5 => Some("The universe is watching you."),
        7 => Some("This is your moment. Don't waste it."),
        n if n >= 9 => Some("You know what you want to say..."),
        _ => None,
    }
}

#[derive(Clone, Debug)]
pub struct EvasiveTarget {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub attempts: u32,
}

impl EvasiveTarget {
    pub fn new() -> Self {
        EvasiveTarget {
            x: START_POS.0,
            y: START_POS.1,
            scale: START_SCALE,
            attempts: 0,
        }
    }

    /// One evasion: count it, jump somewhere legal, shrink.
    /// Returns the milestone message for the new count, if any.
    pub fn evade<R: Rng>(
        &mut self,
        geometry: Option<&Geometry>,
        rng: &mut R,
    ) -> Option<&'static str> {
        self.attempts = self.attempts.saturating_add(1);

        let rect = geometry
            .and_then(SafeRect::measured)
            .unwrap_or(SafeRect::FALLBACK);
        let (x, y) = rect.sample(rng);
        self.x = x;
        self.y = y;

        self.scale = (self.scale - SCALE_STEP).max(MIN_SCALE);

        milestone_message(self.attempts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn geom(cw: f32, ch: f32, tw: f32, th: f32) -> Geometry {
        Geometry { container_w: cw, container_h: ch, target_w: tw, target_h: th }
    }

    #[test]
    fn milestones_only_at_listed_counts() {
        for n in 0..=2 {
            assert_eq!(milestone_message(n), None);
        }
        assert_eq!(milestone_message(3), Some("Why are you running from destiny?"));
        assert_eq!(milestone_message(4), None);
        assert_eq!(milestone_message(5), Some("The universe is watching you."));
        assert_eq!(milestone_message(6), None);
        assert_eq!(milestone_message(7), Some("This is your moment. Don't waste it."));
        assert_eq!(milestone_message(8), None);
        for n in [9, 10, 42, u32::MAX] {
            assert_eq!(milestone_message(n), Some("You know what you want to say..."));
        }
    }

    #[test]
    fn measured_bounds_use_half_size_plus_padding() {
        // 10x2 button in a 100x20 container: 10% wide, 10% tall.
        let r = SafeRect::measured(&geom(100.0, 20.0, 10.0, 2.0)).unwrap();
        assert!((r.min_x - 10.0).abs() < 1e-4);
        assert!((r.max_x - 90.0).abs() < 1e-4);
        assert!((r.min_y - 10.0).abs() < 1e-4);
        assert!((r.max_y - 90.0).abs() < 1e-4);
    }

    #[test]
    fn axes_are_independent() {
        let r = SafeRect::measured(&geom(50.0, 10.0, 10.0, 1.0)).unwrap();
        // x: 20% wide → [15, 85]; y: 10% tall → [10, 90]
        assert!((r.min_x - 15.0).abs() < 1e-4);
        assert!((r.max_x - 85.0).abs() < 1e-4);
        assert!((r.min_y - 10.0).abs() < 1e-4);
        assert!((r.max_y - 90.0).abs() < 1e-4);
    }

    #[test]
    fn unmeasurable_container_has_no_rect() {
        assert!(SafeRect::measured(&geom(0.0, 10.0, 4.0, 1.0)).is_none());
        assert!(SafeRect::measured(&geom(10.0, 0.0, 4.0, 1.0)).is_none());
        assert!(SafeRect::measured(&geom(f32::NAN, 10.0, 4.0, 1.0)).is_none());
    }

    #[test]
    fn oversized_target_is_pinned_to_center() {
        let r = SafeRect::measured(&geom(10.0, 10.0, 12.0, 1.0)).unwrap();
        assert_eq!((r.min_x, r.max_x), (50.0, 50.0));
        assert!(r.min_y < r.max_y);
    }

    #[test]
    fn evade_without_geometry_uses_fallback_square() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut t = EvasiveTarget::new();
        for _ in 0..200 {
            t.evade(None, &mut rng);
            assert!(SafeRect::FALLBACK.contains(t.x, t.y), "({}, {})", t.x, t.y);
        }
    }

    #[test]
    fn degenerate_geometry_falls_back() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut t = EvasiveTarget::new();
        let g = geom(0.0, 0.0, 8.0, 3.0);
        t.evade(Some(&g), &mut rng);
        assert!(SafeRect::FALLBACK.contains(t.x, t.y));
    }

    #[test]
    fn scale_floors_at_minimum() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut t = EvasiveTarget::new();
        for _ in 0..6 {
            t.evade(None, &mut rng);
        }
        assert!((t.scale - 0.4).abs() < 1e-4);
        t.evade(None, &mut rng);
        assert_eq!(t.scale, MIN_SCALE);
        assert_eq!(t.attempts, 7);
    }

    #[test]
    fn evade_reports_milestone_for_new_count() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut t = EvasiveTarget::new();
        let msgs: Vec<_> = (0..10).map(|_| t.evade(None, &mut rng)).collect();
        assert_eq!(msgs[0], None);
        assert_eq!(msgs[1], None);
        assert!(msgs[2].is_some());
        assert_eq!(msgs[3], None);
        assert!(msgs[4].is_some());
        assert!(msgs[8].is_some());
        assert!(msgs[9].is_some());
    }

    proptest! {
        #[test]
        fn measured_position_keeps_target_inside(
            cw in 10.0f32..300.0,
            ch in 3.0f32..60.0,
            tw_frac in 0.01f32..0.8,
            th_frac in 0.01f32..0.8,
            seed in any::<u64>(),
        ) {
            let g = geom(cw, ch, cw * tw_frac, ch * th_frac);
            let mut rng = StdRng::seed_from_u64(seed);
            let mut t = EvasiveTarget::new();
            t.evade(Some(&g), &mut rng);

            let half_w = tw_frac * 50.0;
            let half_h = th_frac * 50.0;
            prop_assert!(t.x - half_w >= PADDING_PCT - 1e-3);
            prop_assert!(t.x + half_w <= 100.0 - PADDING_PCT + 1e-3);
            prop_assert!(t.y - half_h >= PADDING_PCT - 1e-3);
            prop_assert!(t.y + half_h <= 100.0 - PADDING_PCT + 1e-3);
        }

        #[test]
        fn scale_is_non_increasing(steps in 1usize..40, seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut t = EvasiveTarget::new();
            let mut prev = t.scale;
            for _ in 0..steps {
                t.evade(None, &mut rng);
                prop_assert!(t.scale <= prev);
                prop_assert!(t.scale >= MIN_SCALE);
                prev = t.scale;
            }
            prop_assert_eq!(t.attempts as usize, steps);
        }
    }
}
