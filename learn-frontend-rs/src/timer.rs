use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Seconds on the clock for every card in study mode.
pub const CARD_SECONDS: u32 = 120;

const STEP: TimeDelta = TimeDelta::seconds(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    /// One or more whole seconds went by.
    Ticked { remaining: u32 },
    /// The clock reached zero. Reported once; the timer is stopped afterwards.
    Expired,
}

/// Per-card countdown. Time only moves when [`CardTimer::advance`] is called with a later
/// instant, one step per elapsed whole second.
#[derive(Clone, Debug)]
pub struct CardTimer {
    duration: u32,
    remaining: u32,
    /// When the next second is taken off. `None` while paused or finished.
    next_step_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct TimerView {
    pub remaining: u32,
    pub duration: u32,
    pub running: bool,
}

impl CardTimer {
    /// Starts running immediately.
    pub fn start(duration: u32, now: DateTime<Utc>) -> Self {
        let mut timer = Self {
            duration,
            remaining: duration,
            next_step_at: None,
        };
        timer.restart(now);
        timer
    }

    pub fn restart(&mut self, now: DateTime<Utc>) {
        self.remaining = self.duration;
        self.next_step_at = (self.duration > 0).then(|| now + STEP);
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.next_step_at.is_some()
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    pub fn pause(&mut self) {
        self.next_step_at = None;
    }

    pub fn resume(&mut self, now: DateTime<Utc>) {
        if self.remaining > 0 && self.next_step_at.is_none() {
            self.next_step_at = Some(now + STEP);
        }
    }

    pub fn toggle(&mut self, now: DateTime<Utc>) {
        if self.is_running() {
            self.pause();
        } else {
            self.resume(now);
        }
    }

    pub fn advance(&mut self, now: DateTime<Utc>) -> Option<TimerEvent> {
        let mut next = self.next_step_at?;
        let before = self.remaining;
        while next <= now && self.remaining > 0 {
            self.remaining -= 1;
            next += STEP;
        }
        if self.remaining == 0 {
            self.next_step_at = None;
            return Some(TimerEvent::Expired);
        }
        self.next_step_at = Some(next);
        (self.remaining != before).then_some(TimerEvent::Ticked {
            remaining: self.remaining,
        })
    }

    pub fn view(&self) -> TimerView {
        TimerView {
            remaining: self.remaining,
            duration: self.duration,
            running: self.is_running(),
        }
    }
}
