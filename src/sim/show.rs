/// Show: the presentation controller.
///
/// Owns every piece of session state (phase, countdown, evasive button,
/// transient message, finale step, flavor lines) and a single timer queue.
/// All choreography is expressed as timers in that queue:
///
///   intro     Pulse every 1s, countdown 10→0 at 1 Hz after a 2s lead-in,
///             Question 500ms after it hits zero
///   question  evasions and their milestone messages (3s each)
///   finale    one `FinaleAdvance` timer at a time, walking the
///             `FinaleStep` hold table until `FinalScreen`
///
/// `teardown()` cancels everything in one call.
///
/// Input handlers schedule relative to the queue's virtual clock, so call
/// `advance()` for the current frame before feeding input.

use std::time::Duration;

use rand::rngs::StdRng;

use crate::domain::evasive::{EvasiveTarget, Geometry};
use crate::domain::lines::FlavorLines;
use crate::domain::phase::{FinaleStep, Phase};
use super::event::ShowEvent;
use super::scheduler::Scheduler;

pub const COUNTDOWN_FROM: u32 = 10;
/// Ticks starting at or below this value jolt the screen, except the one that lands on zero.
pub const JOLT_FROM: u32 = 3;

pub const PULSE_INTERVAL: Duration = Duration::from_millis(1000);
pub const COUNTDOWN_LEAD_IN: Duration = Duration::from_millis(2000);
pub const COUNTDOWN_INTERVAL: Duration = Duration::from_millis(1000);
pub const QUESTION_DELAY: Duration = Duration::from_millis(500);
pub const JOLT_DURATION: Duration = Duration::from_millis(100);
pub const MESSAGE_DURATION: Duration = Duration::from_millis(3000);
pub const SCREEN_SHAKE_DURATION: Duration = Duration::from_millis(200);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Timer {
    Pulse,
    CountdownStart,
    CountdownTick,
    EnterQuestion,
    JoltOff,
    MessageClear,
    FinaleAdvance,
    ScreenShakeOff,
}

pub struct Show {
    pub phase: Phase,
    pub countdown: u32,
    pub jolt: bool,

    pub target: EvasiveTarget,
    pub message: Option<&'static str>,

    pub finale_started: bool,
    pub finale_step: FinaleStep,
    pub flash: bool,
    pub screen_shake: bool,
    /// Set once when Yes is pressed.
    pub lines: Option<FlavorLines>,

    timers: Scheduler<Timer>,
    rng: StdRng,
    events: Vec<ShowEvent>,
    torn_down: bool,
}

// ── Lifecycle ──

impl Show {
    /// Create the show and arm the intro timers.
    pub fn mount(rng: StdRng) -> Self {
        let mut timers = Scheduler::new();
        timers.schedule(PULSE_INTERVAL, Timer::Pulse);
        timers.schedule(COUNTDOWN_LEAD_IN, Timer::CountdownStart);

        Show {
            phase: Phase::Intro,
            countdown: COUNTDOWN_FROM,
            jolt: false,
            target: EvasiveTarget::new(),
            message: None,
            finale_started: false,
            finale_step: FinaleStep::Freeze,
            flash: false,
            screen_shake: false,
            lines: None,
            timers,
            rng,
            events: Vec::new(),
            torn_down: false,
        }
    }

    /// Cancel all pending timers. The show is inert afterwards.
    pub fn teardown(&mut self) {
        let cancelled = self.timers.cancel_all();
        self.torn_down = true;
        log::debug!("show torn down, {cancelled} pending timer(s) cancelled");
    }

    #[allow(dead_code)]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    #[allow(dead_code)]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Fire every timer due by `elapsed` (time since mount).
    pub fn advance(&mut self, elapsed: Duration) {
        if self.torn_down { return; }
        while let Some(timer) = self.timers.pop_due(elapsed) {
            self.fire(timer);
        }
        self.timers.advance_to(elapsed);
    }

    /// Events produced since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<ShowEvent> {
        std::mem::take(&mut self.events)
    }
}

// ── Input ──

impl Show {
    /// Pointer reached the No button. Ignored outside the question phase.
    pub fn on_approach(&mut self, geometry: Option<Geometry>) -> bool {
        if self.torn_down || self.phase != Phase::Question {
            return false;
        }

        if geometry.is_none() {
            log::debug!("no button geometry, using fallback range");
        }
        let milestone = self.target.evade(geometry.as_ref(), &mut self.rng);
        let t = &self.target;
        log::trace!(
            "evade #{} → ({:.1}%, {:.1}%) scale {:.1}",
            t.attempts, t.x, t.y, t.scale
        );
        self.events.push(ShowEvent::Evaded {
            attempts: t.attempts,
            x: t.x,
            y: t.y,
            scale: t.scale,
        });

        if let Some(msg) = milestone {
            self.message = Some(msg);
            self.events.push(ShowEvent::MessageShown(msg));
            // A newer message owns the clear timer.
            self.timers.cancel_where(|t| *t == Timer::MessageClear);
            self.timers.schedule(MESSAGE_DURATION, Timer::MessageClear);
        }
        true
    }

    /// Yes was pressed. Starts the finale exactly once.
    pub fn on_affirm(&mut self) -> bool {
        if self.torn_down || self.phase != Phase::Question || self.finale_started {
            return false;
        }
        self.finale_started = true;
        self.lines = Some(FlavorLines::sample(&mut self.rng));
        log::info!("yes pressed after {} evasion(s)", self.target.attempts);
        self.enter_step(FinaleStep::Freeze);
        true
    }
}

// ── Timers ──

impl Show {
    fn fire(&mut self, timer: Timer) {
        match timer {
            Timer::Pulse => {
                if self.phase == Phase::Intro {
                    self.events.push(ShowEvent::Pulse);
                    self.timers.schedule(PULSE_INTERVAL, Timer::Pulse);
                }
            }
            Timer::CountdownStart => {
                self.timers.schedule(COUNTDOWN_INTERVAL, Timer::CountdownTick);
            }
            Timer::CountdownTick => self.tick_countdown(),
            Timer::EnterQuestion => self.enter_phase(Phase::Question),
            Timer::JoltOff => self.jolt = false,
            Timer::MessageClear => {
                self.message = None;
                self.events.push(ShowEvent::MessageCleared);
            }
            Timer::FinaleAdvance => {
                if let Some(next) = self.finale_step.next() {
                    self.enter_step(next);
                }
            }
            Timer::ScreenShakeOff => self.screen_shake = false,
        }
    }

    fn tick_countdown(&mut self) {
        if self.phase != Phase::Intro || self.countdown == 0 {
            return;
        }
        let prev = self.countdown;
        self.countdown = prev - 1;
        self.events.push(ShowEvent::Tick);

        if prev <= JOLT_FROM && prev > 1 {
            self.jolt = true;
            self.events.push(ShowEvent::Jolt);
            self.timers.schedule(JOLT_DURATION, Timer::JoltOff);
        }

        if self.countdown == 0 {
            self.timers.schedule(QUESTION_DELAY, Timer::EnterQuestion);
        } else {
            self.timers.schedule(COUNTDOWN_INTERVAL, Timer::CountdownTick);
        }
    }

    fn enter_phase(&mut self, phase: Phase) {
        if self.phase == phase { return; }
        log::debug!("phase {:?} → {:?}", self.phase, phase);
        self.phase = phase;
        self.events.push(ShowEvent::PhaseEntered(phase));
    }

    fn enter_step(&mut self, step: FinaleStep) {
        log::debug!("finale step: {}", step.name());
        self.finale_step = step;
        self.events.push(ShowEvent::FinaleStepEntered(step));

        match step {
            FinaleStep::Flash => self.flash = true,
            FinaleStep::Wait => {
                self.flash = false;
                self.enter_phase(Phase::Finale);
            }
            FinaleStep::DarkGlitch => {
                self.events.push(ShowEvent::Glitch);
                self.screen_shake = true;
                self.timers.schedule(SCREEN_SHAKE_DURATION, Timer::ScreenShakeOff);
            }
            FinaleStep::FinalScreen => self.events.push(ShowEvent::AmbientStart),
            FinaleStep::Freeze | FinaleStep::ButIWont | FinaleStep::TeasingLine => {}
        }

        if let Some(hold) = step.hold() {
            self.timers.schedule(hold, Timer::FinaleAdvance);
        } else if step.is_terminal() {
            log::info!("finale complete");
        }
    }
}
