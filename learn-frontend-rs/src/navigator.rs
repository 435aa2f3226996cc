//! Study mode: one card at a time over the visible list.

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::catalog::QuestionRecord;
use crate::keyboard::{Key, KeyBindings, KeyOutcome, StudyCommand};
use crate::progress::ProgressTracker;
use crate::timer::{CARD_SECONDS, CardTimer, TimerEvent, TimerView};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    Idle,
    Viewing { cursor: usize },
    Complete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    Moved { cursor: usize },
    Completed,
}

/// Everything that only exists while a card is on screen. Dropping it releases the
/// key bindings and stops the clock.
#[derive(Debug)]
struct Viewing {
    cursor: usize,
    flipped: bool,
    timer: CardTimer,
    bindings: KeyBindings,
}

impl Viewing {
    fn at(cursor: usize, now: DateTime<Utc>) -> Self {
        Self {
            cursor,
            flipped: false,
            timer: CardTimer::start(CARD_SECONDS, now),
            bindings: KeyBindings::study(),
        }
    }

    fn move_to(&mut self, cursor: usize, now: DateTime<Utc>) {
        self.cursor = cursor;
        self.flipped = false;
        self.timer.restart(now);
    }
}

#[derive(Debug, Default)]
pub struct StudySession {
    viewing: Option<Viewing>,
    completed: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub state: SessionState,
    /// 1-based position for the "n / total" label; zero when nothing is shown.
    pub position: usize,
    pub total: usize,
    pub flipped: bool,
    pub timer: Option<TimerView>,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub on_last_card: bool,
}

impl StudySession {
    pub fn state(&self) -> SessionState {
        match &self.viewing {
            Some(viewing) => SessionState::Viewing {
                cursor: viewing.cursor,
            },
            None if self.completed => SessionState::Complete,
            None => SessionState::Idle,
        }
    }

    pub fn is_viewing(&self) -> bool {
        self.viewing.is_some()
    }

    /// Starts (or restarts) at the first card of whatever list is visible.
    pub fn enter(&mut self, now: DateTime<Utc>) {
        debug!("Entering study mode");
        self.viewing = Some(Viewing::at(0, now));
        self.completed = false;
    }

    pub fn exit(&mut self) {
        if self.viewing.take().is_some() {
            debug!("Leaving study mode");
        }
        self.completed = false;
    }

    pub fn current<'a>(&self, list: &'a [QuestionRecord]) -> Option<&'a QuestionRecord> {
        self.viewing.as_ref().and_then(|v| list.get(v.cursor))
    }

    /// The visible list changed under the session: go back to its first card.
    pub fn list_changed(&mut self, now: DateTime<Utc>) {
        if let Some(viewing) = &mut self.viewing {
            debug!("Visible list changed, cursor back to 0");
            viewing.move_to(0, now);
        }
    }

    /// Marks the current card read, then moves forward or finishes the session.
    pub fn next(
        &mut self,
        list: &[QuestionRecord],
        progress: &mut impl ProgressTracker,
        now: DateTime<Utc>,
    ) -> Transition {
        let Some(viewing) = &mut self.viewing else {
            return Transition::Unchanged;
        };
        let Some(record) = list.get(viewing.cursor) else {
            return Transition::Unchanged;
        };
        progress.mark_read(&record.id);

        if viewing.cursor + 1 < list.len() {
            let cursor = viewing.cursor + 1;
            viewing.move_to(cursor, now);
            Transition::Moved { cursor }
        } else {
            debug!("Last card done, study session complete");
            self.viewing = None;
            self.completed = true;
            Transition::Completed
        }
    }

    pub fn prev(&mut self, now: DateTime<Utc>) -> Transition {
        match &mut self.viewing {
            Some(viewing) if viewing.cursor > 0 => {
                let cursor = viewing.cursor - 1;
                viewing.move_to(cursor, now);
                Transition::Moved { cursor }
            }
            _ => Transition::Unchanged,
        }
    }

    /// Returns the new reveal state, or `None` outside study mode.
    pub fn flip(&mut self) -> Option<bool> {
        let viewing = self.viewing.as_mut()?;
        viewing.flipped = !viewing.flipped;
        Some(viewing.flipped)
    }

    /// Add-only: a card that is already read stays read.
    pub fn mark_read(&self, list: &[QuestionRecord], progress: &mut impl ProgressTracker) -> bool {
        match self.current(list) {
            Some(record) => progress.mark_read(&record.id),
            None => false,
        }
    }

    /// Returns the new starred state of the current card.
    pub fn toggle_star(
        &self,
        list: &[QuestionRecord],
        progress: &mut impl ProgressTracker,
    ) -> Option<bool> {
        self.current(list).map(|record| progress.toggle_star(&record.id))
    }

    pub fn toggle_timer(&mut self, now: DateTime<Utc>) {
        if let Some(viewing) = &mut self.viewing {
            viewing.timer.toggle(now);
        }
    }

    /// The timer only runs while a card is on screen.
    pub fn tick(&mut self, list: &[QuestionRecord], now: DateTime<Utc>) -> Option<TimerEvent> {
        let viewing = self.viewing.as_mut()?;
        if viewing.cursor >= list.len() {
            return None;
        }
        viewing.timer.advance(now)
    }

    pub fn apply(
        &mut self,
        command: StudyCommand,
        list: &[QuestionRecord],
        progress: &mut impl ProgressTracker,
        now: DateTime<Utc>,
    ) {
        match command {
            StudyCommand::Next => {
                self.next(list, progress, now);
            }
            StudyCommand::Prev => {
                self.prev(now);
            }
            StudyCommand::Flip => {
                self.flip();
            }
            StudyCommand::MarkRead => {
                self.mark_read(list, progress);
            }
            StudyCommand::ToggleStar => {
                self.toggle_star(list, progress);
            }
        }
    }

    /// `key` is a DOM `KeyboardEvent.key`. Keys are ignored unless a card is on screen.
    pub fn handle_key(
        &mut self,
        key: &str,
        list: &[QuestionRecord],
        progress: &mut impl ProgressTracker,
        now: DateTime<Utc>,
    ) -> KeyOutcome {
        let Some(key) = Key::from_dom_key(key) else {
            return KeyOutcome::IGNORED;
        };
        let Some(command) = self
            .viewing
            .as_ref()
            .and_then(|viewing| viewing.bindings.command_for(key))
        else {
            return KeyOutcome::IGNORED;
        };
        self.apply(command, list, progress, now);
        KeyOutcome {
            handled: true,
            prevent_default: key == Key::Space,
        }
    }

    pub fn view(&self, list: &[QuestionRecord]) -> SessionView {
        let total = list.len();
        match &self.viewing {
            Some(viewing) if total > 0 => SessionView {
                state: self.state(),
                position: viewing.cursor + 1,
                total,
                flipped: viewing.flipped,
                timer: Some(viewing.timer.view()),
                can_go_back: viewing.cursor > 0,
                can_go_forward: true,
                on_last_card: viewing.cursor + 1 == total,
            },
            // viewing an empty list: "no results", navigation disabled
            _ => SessionView {
                state: self.state(),
                position: 0,
                total,
                flipped: false,
                timer: None,
                can_go_back: false,
                can_go_forward: false,
                on_last_card: false,
            },
        }
    }
}
