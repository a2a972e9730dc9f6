use std::time::{Duration, Instant};
use strum::Display as StrumDisplay;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoplayState {
    Running { due: Instant },
    PausedByHover,
    PausedByUser,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay)]
#[strum(serialize_all = "kebab-case")]
pub enum AutoplayInput {
    PointerEnter,
    PointerLeave,
    Toggle,
    /// A nav entry was clicked. Autoplay stays off until toggled back on.
    ManualNavigation,
}

#[derive(Debug, Clone)]
pub struct Autoplay {
    state: AutoplayState,
    interval: Duration,
    hovered: bool,
}

impl Autoplay {
    pub fn start(interval: Duration, now: Instant, hovered: bool) -> Self {
        let interval = interval.max(MIN_INTERVAL);
        let state = if hovered {
            AutoplayState::PausedByHover
        } else {
            AutoplayState::Running {
                due: now + interval,
            }
        };
        Self {
            state,
            interval,
            hovered,
        }
    }

    pub fn state(&self) -> AutoplayState {
        self.state
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, AutoplayState::Running { .. })
    }

    pub fn due(&self) -> Option<Instant> {
        match self.state {
            AutoplayState::Running { due } => Some(due),
            _ => None,
        }
    }

    pub fn handle(&mut self, input: AutoplayInput, now: Instant) -> AutoplayState {
        match input {
            AutoplayInput::PointerEnter => self.hovered = true,
            AutoplayInput::PointerLeave => self.hovered = false,
            _ => {}
        }
        self.state = transition(self.state, input, self.hovered, now + self.interval);
        log::trace!("autoplay {input} -> {:?}", self.state);
        self.state
    }

    /// Returns true when an advance is due at `now` and re-arms for the next
    /// period. Missed periods are dropped, not replayed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let AutoplayState::Running { due } = self.state else {
            return false;
        };
        if now < due {
            return false;
        }
        let mut next = due + self.interval;
        if next <= now {
            next = now + self.interval;
        }
        self.state = AutoplayState::Running { due: next };
        true
    }
}

fn transition(
    state: AutoplayState,
    input: AutoplayInput,
    hovered: bool,
    fresh_due: Instant,
) -> AutoplayState {
    use AutoplayInput::*;
    use AutoplayState::*;

    match (state, input) {
        (Running { .. }, PointerEnter) => PausedByHover,
        (PausedByHover, PointerLeave) => Running { due: fresh_due },
        (Running { .. } | PausedByHover, Toggle) => PausedByUser,
        (PausedByUser, Toggle) if hovered => PausedByHover,
        (PausedByUser, Toggle) => Running { due: fresh_due },
        (_, ManualNavigation) => PausedByUser,
        (state, _) => state,
    }
}
