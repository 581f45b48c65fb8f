use instant::Instant;
use std::time::Duration;

/// Rate limiter for one trigger channel: remembers when it last fired.
///
/// A trigger is allowed when nothing has fired yet or when at least `window`
/// has elapsed since the last one. Suppressed triggers are dropped, not queued.
#[derive(Clone, Debug)]
pub struct Cooldown {
    window: Duration,
    last_fired: Option<Instant>,
}

impl Cooldown {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_fired: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn last_fired(&self) -> Option<Instant> {
        self.last_fired
    }

    pub fn ready(&self, now: Instant) -> bool {
        match self.last_fired {
            None => true,
            Some(last) => now >= last && now - last >= self.window,
        }
    }

    /// Fire if ready; returns whether the caller may trigger.
    pub fn try_fire(&mut self, now: Instant) -> bool {
        if self.ready(now) {
            self.last_fired = Some(now);
            true
        } else {
            false
        }
    }
}
