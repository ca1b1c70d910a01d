/// Top-level phases and the finale step table.
/// Step timing lives here so the sequencer is a table walk,
/// not a chain of nested callbacks.

use std::time::Duration;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Intro,
    Question,
    Finale,
}

/// Finale sub-phase. Advances strictly in declaration order.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FinaleStep {
    Freeze,
    Flash,
    Wait,
    DarkGlitch,
    ButIWont,
    TeasingLine,
    FinalScreen,
}

impl FinaleStep {
    pub const ORDER: [FinaleStep; 7] = [
        FinaleStep::Freeze,
        FinaleStep::Flash,
        FinaleStep::Wait,
        FinaleStep::DarkGlitch,
        FinaleStep::ButIWont,
        FinaleStep::TeasingLine,
        FinaleStep::FinalScreen,
    ];

    /// How long the machine stays in this step. `None` = terminal.
    pub fn hold(self) -> Option<Duration> {
        let ms = match self {
            FinaleStep::Freeze => 1000,
            FinaleStep::Flash => 300,
            FinaleStep::Wait => 1000,
            FinaleStep::DarkGlitch => 300,
            FinaleStep::ButIWont => 2000,
            FinaleStep::TeasingLine => 2000,
            FinaleStep::FinalScreen => return None,
        };
        Some(Duration::from_millis(ms))
    }

    pub fn next(self) -> Option<FinaleStep> {
        match self {
            FinaleStep::Freeze => Some(FinaleStep::Flash),
            FinaleStep::Flash => Some(FinaleStep::Wait),
            FinaleStep::Wait => Some(FinaleStep::DarkGlitch),
            FinaleStep::DarkGlitch => Some(FinaleStep::ButIWont),
            FinaleStep::ButIWont => Some(FinaleStep::TeasingLine),
            FinaleStep::TeasingLine => Some(FinaleStep::FinalScreen),
            FinaleStep::FinalScreen => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    pub fn name(self) -> &'static str {
        match self {
            FinaleStep::Freeze => "freeze",
            FinaleStep::Flash => "flash",
            FinaleStep::Wait => "wait",
            FinaleStep::DarkGlitch => "dark-glitch",
            FinaleStep::ButIWont => "but-i-wont",
            FinaleStep::TeasingLine => "teasing-line",
            FinaleStep::FinalScreen => "final-screen",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_walks_the_declared_order() {
        let mut step = FinaleStep::Freeze;
        let mut visited = vec![step];
        while let Some(n) = step.next() {
            step = n;
            visited.push(step);
        }
        assert_eq!(visited, FinaleStep::ORDER.to_vec());
    }

    #[test]
    fn only_final_screen_is_terminal() {
        for step in FinaleStep::ORDER {
            assert_eq!(step.is_terminal(), step == FinaleStep::FinalScreen);
            assert_eq!(step.hold().is_none(), step.is_terminal());
        }
    }

    #[test]
    fn total_hold_until_final_screen() {
        let total: Duration = FinaleStep::ORDER.iter().filter_map(|s| s.hold()).sum();
        assert_eq!(total, Duration::from_millis(6600));
    }
}
