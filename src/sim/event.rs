/// Events emitted by the show as it advances.
/// The presentation layer consumes these for sound and logging.

use crate::domain::phase::{FinaleStep, Phase};

#[allow(dead_code)]
#[derive(Clone, Debug, PartialEq)]
pub enum ShowEvent {
    /// Heartbeat, once a second during the intro.
    Pulse,
    /// Countdown decremented.
    Tick,
    /// Intro screen jolts on the last few ticks.
    Jolt,
    PhaseEntered(Phase),
    FinaleStepEntered(FinaleStep),
    /// Bass drop + noise at the dark-glitch step.
    Glitch,
    /// Sustained tone from the final screen onward.
    AmbientStart,
    Evaded { attempts: u32, x: f32, y: f32, scale: f32 },
    MessageShown(&'static str),
    MessageCleared,
}
