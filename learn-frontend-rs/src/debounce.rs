use chrono::{DateTime, TimeDelta, Utc};

/// How long the search box must stay unchanged before its text is used for filtering.
pub const SEARCH_QUIET_PERIOD: TimeDelta = TimeDelta::milliseconds(300);

/// A value waiting for a deadline. Scheduling again replaces both the value and the deadline;
/// cancelling (or dropping the owner) discards it. Time is passed in by the caller.
#[derive(Clone, Debug)]
pub struct DelayedAction<T> {
    delay: TimeDelta,
    pending: Option<(T, DateTime<Utc>)>,
}

impl<T> DelayedAction<T> {
    pub fn new(delay: TimeDelta) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn schedule(&mut self, value: T, now: DateTime<Utc>) {
        self.pending = Some((value, now + self.delay));
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    /// Hands out the value once its deadline has been reached.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Option<T> {
        let due = matches!(&self.pending, Some((_, deadline)) if *deadline <= now);
        if due { self.cancel() } else { None }
    }
}

/// The search input: what the user typed, and the term filtering actually uses.
#[derive(Clone, Debug)]
pub struct SearchBox {
    raw: String,
    settled: String,
    pending: DelayedAction<String>,
}

impl Default for SearchBox {
    fn default() -> Self {
        Self {
            raw: String::new(),
            settled: String::new(),
            pending: DelayedAction::new(SEARCH_QUIET_PERIOD),
        }
    }
}

impl SearchBox {
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn settled(&self) -> &str {
        &self.settled
    }

    /// Every keystroke restarts the quiet period.
    pub fn input(&mut self, text: impl Into<String>, now: DateTime<Utc>) {
        self.raw = text.into();
        self.pending.schedule(self.raw.clone(), now);
    }

    /// Returns true when the settled term changed.
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        match self.pending.poll(now) {
            Some(term) if term != self.settled => {
                self.settled = term;
                true
            }
            _ => false,
        }
    }

    /// Empties the box at once, without waiting. Returns true when the settled term changed.
    pub fn clear(&mut self) -> bool {
        self.pending.cancel();
        self.raw.clear();
        !std::mem::take(&mut self.settled).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + TimeDelta::milliseconds(ms)
    }

    #[test]
    fn test_only_last_keystroke_settles() {
        let mut search = SearchBox::default();
        search.input("r", at(0));
        search.input("re", at(100));
        search.input("rea", at(200));

        let mut changes = 0;
        for ms in (200..=600).step_by(50) {
            if search.poll(at(ms)) {
                changes += 1;
                assert_eq!(ms, 500);
            }
        }
        assert_eq!(changes, 1);
        assert_eq!(search.settled(), "rea");
    }

    #[test]
    fn test_nothing_settles_inside_quiet_period() {
        let mut search = SearchBox::default();
        search.input("react", at(0));
        assert!(!search.poll(at(299)));
        assert_eq!(search.settled(), "");
        assert!(search.poll(at(300)));
    }

    #[test]
    fn test_retyping_same_term_is_not_a_change() {
        let mut search = SearchBox::default();
        search.input("css", at(0));
        assert!(search.poll(at(300)));
        search.input("cs", at(400));
        search.input("css", at(450));
        assert!(!search.poll(at(1000)));
    }

    #[test]
    fn test_clear_cancels_pending() {
        let mut search = SearchBox::default();
        search.input("git", at(0));
        assert!(search.poll(at(300)));
        search.input("gitx", at(400));
        assert!(search.clear());
        assert!(!search.poll(at(2000)));
        assert_eq!(search.settled(), "");
        assert_eq!(search.raw(), "");
    }

    #[test]
    fn test_delayed_action_cancel() {
        let mut action = DelayedAction::new(TimeDelta::seconds(1));
        action.schedule(1, at(0));
        assert_eq!(action.deadline(), Some(at(1000)));
        assert_eq!(action.cancel(), Some(1));
        assert!(!action.is_pending());
        assert_eq!(action.poll(at(5000)), None);
    }
}
