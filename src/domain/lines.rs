/// Flavor lines revealed late in the finale.
/// One line per pool is drawn when Yes is pressed and never changes.

use rand::Rng;

pub const TEASING_LINES: [&str; 4] = [
    "…make it that easy.",
    "…say yes that fast.",
    "…fall for that so quickly.",
    "…let you win without a challenge.",
];

pub const FINAL_SUBTEXTS: [&str; 4] = [
    "Relax. I'm just messing with you.",
    "Maybe I like that you said yes.",
    "We'll see what happens.",
    "Stay tuned.",
];

pub const WAIT_TEXT: &str = "WAIT.";
pub const BUT_I_WONT_TEXT: &str = "But I won't.";
pub const FINAL_TEXT: &str = "You thought this was simple?";
pub const QUESTION_TEXT: &str = "Will you be my Valentine?";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FlavorLines {
    pub teasing: &'static str,
    pub subtext: &'static str,
}

impl FlavorLines {
    pub fn sample<R: Rng>(rng: &mut R) -> Self {
        FlavorLines {
            teasing: TEASING_LINES[rng.random_range(0..TEASING_LINES.len())],
            subtext: FINAL_SUBTEXTS[rng.random_range(0..FINAL_SUBTEXTS.len())],
        }
    }
}
