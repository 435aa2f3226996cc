pub mod catalog;
pub mod debounce;
pub mod export;
pub mod filter;
pub mod keyboard;
pub mod navigator;
pub mod progress;
pub mod render;
pub mod supabase;
pub mod timer;
mod utils;

use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use stash::{KeyValueStore, ListenerKey, Listeners};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub use catalog::{
    Catalog, CatalogLoader, CatalogStatus, Category, Domain, FetchError, Level, QuestionId,
    QuestionRecord, Source, StaticCatalog,
};
pub use export::ExportDocument;
pub use filter::{Facet, FacetCounts, FilterCriteria};
pub use keyboard::KeyOutcome;
pub use navigator::{SessionState, SessionView};
pub use progress::{ProgressStore, ProgressSummary, ProgressTracker};
pub use render::{AnswerBlock, Highlight};
pub use supabase::{SupabaseCatalog, SupabaseConfig};

use debounce::SearchBox;
use navigator::{StudySession, Transition};
use timer::TimerEvent;

/// What a listener is told about. Listeners re-read whatever they display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Change {
    Catalog,
    Filters,
    Search,
    Visible,
    Progress,
    Session,
    Timer,
    TimerExpired,
    Random,
}

impl Change {
    pub fn as_str(self) -> &'static str {
        match self {
            Change::Catalog => "catalog",
            Change::Filters => "filters",
            Change::Search => "search",
            Change::Visible => "visible",
            Change::Progress => "progress",
            Change::Session => "session",
            Change::Timer => "timer",
            Change::TimerExpired => "timerExpired",
            Change::Random => "random",
        }
    }
}

struct State {
    catalog: Catalog,
    status: CatalogStatus,
    tab: Source,
    search: SearchBox,
    criteria: FilterCriteria,
    progress: ProgressStore,
    visible: Vec<QuestionRecord>,
    session: StudySession,
    random_pick: Option<QuestionRecord>,
    recomputes: u64,
}

impl State {
    fn progress_counts(&self) -> (usize, usize) {
        let state = self.progress.state();
        (state.read_ids.len(), state.starred_ids.len())
    }

    /// Recomputes the visible list. The session goes back to its first card when the id
    /// sequence changed.
    fn refresh_visible(&mut self, now: DateTime<Utc>) -> Vec<Change> {
        self.recomputes += 1;
        let visible: Vec<QuestionRecord> = filter::compute_visible(
            self.catalog.partition(self.tab),
            self.progress.state(),
            &self.criteria,
        )
        .into_iter()
        .cloned()
        .collect();

        let same_ids = visible.len() == self.visible.len()
            && visible.iter().zip(&self.visible).all(|(a, b)| a.id == b.id);
        self.visible = visible;
        if same_ids {
            return Vec::new();
        }
        log::debug!("{} questions visible", self.visible.len());
        let mut changes = vec![Change::Visible];
        if self.session.is_viewing() {
            self.session.list_changed(now);
            changes.push(Change::Session);
        }
        changes
    }
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
pub struct Learn {
    // never hold a borrow across an .await
    state: RefCell<State>,
    listeners: RefCell<Listeners<Change>>,
    pending: RefCell<Vec<Change>>,
    clock: Box<dyn Fn() -> DateTime<Utc>>,
}

// putting this inside LOGGER prevents us from accidentally initializing the logger more than once
#[cfg(target_arch = "wasm32")]
#[allow(clippy::declare_interior_mutable_const)]
const LOGGER: LazyLock<()> = LazyLock::new(|| {
    utils::set_panic_hook();

    wasm_logger::init(wasm_logger::Config::default());
    log::info!("Logging initialized");
});

fn facet_label(label: Option<String>) -> Option<String> {
    label.filter(|label| label != "All")
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
impl Learn {
    /// Progress is kept in `localStorage`. If that is unavailable the page still works, but
    /// nothing survives a reload.
    #[cfg(target_arch = "wasm32")]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(constructor))]
    pub fn new_in_browser() -> Learn {
        // used to only initialize the logger once
        #[allow(clippy::borrow_interior_mutable_const)]
        *LOGGER;

        let storage: Box<dyn KeyValueStore> = match stash::BrowserStorage::local() {
            Ok(storage) => Box::new(storage),
            Err(e) => {
                log::warn!("Progress will not be saved: {e}");
                Box::new(stash::MemoryStore::new())
            }
        };
        Learn::new(storage)
    }

    /// `callback` is called with the name of what changed.
    #[cfg(target_arch = "wasm32")]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn subscribe(&self, callback: js_sys::Function) -> ListenerKey {
        self.listen(move |_, change| {
            let this = JsValue::null();
            let _ = callback.call1(&this, &JsValue::from_str(change.as_str()));
        })
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn unsubscribe(&self, key: ListenerKey) -> bool {
        self.listeners.borrow_mut().unregister(key)
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub async fn sync_catalog(&self, config: SupabaseConfig) {
        // failures are logged and reflected in the status
        let _ = self.load_catalog(&SupabaseCatalog::new(config)).await;
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(getter))]
    pub fn status(&self) -> CatalogStatus {
        self.state.borrow().status
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(getter))]
    pub fn tab(&self) -> Source {
        self.state.borrow().tab
    }

    /// Switching tabs starts from a clean slate: facets reset, search cleared at once, random
    /// pick dismissed, session back to the first card.
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn set_tab(&self, tab: Source) {
        let _flusher = FlushLater::new(self);
        let now = (self.clock)();
        let mut state = self.state.borrow_mut();
        if state.tab == tab {
            return;
        }
        log::debug!("Switching to the {tab} tab");
        state.tab = tab;
        state.criteria = FilterCriteria::default();
        state.search.clear();
        state.random_pick = None;
        state.session.list_changed(now);

        let mut changes = vec![Change::Filters, Change::Search, Change::Random, Change::Session];
        changes.extend(state.refresh_visible(now));
        self.notify(changes);
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(getter))]
    pub fn search_text(&self) -> String {
        self.state.borrow().search.raw().to_string()
    }

    /// The term filtering currently uses; lags the text by the quiet period.
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(getter))]
    pub fn search_term(&self) -> String {
        self.state.borrow().search.settled().to_string()
    }

    /// Filtering catches up on a later [`Learn::tick`].
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn input_search(&self, text: String) {
        let _flusher = FlushLater::new(self);
        let now = (self.clock)();
        self.state.borrow_mut().search.input(text, now);
        self.notify([Change::Search]);
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn clear_search(&self) {
        let _flusher = FlushLater::new(self);
        let now = (self.clock)();
        let mut state = self.state.borrow_mut();
        let mut changes = vec![Change::Search];
        if state.search.clear() {
            state.criteria.search_term.clear();
            changes.extend(state.refresh_visible(now));
        }
        self.notify(changes);
    }

    /// `None` or `"All"` selects every category.
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn set_category(&self, category: Option<String>) {
        let facet = facet_label(category).map_or(Facet::All, |c| Facet::Only(Category(c)));
        self.update_criteria(|criteria| criteria.category = facet);
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn set_level(&self, level: Option<String>) {
        let facet = match facet_label(level) {
            None => Facet::All,
            Some(label) => match label.parse::<Level>() {
                Ok(level) => Facet::Only(level),
                Err(e) => {
                    log::warn!("Ignoring level filter: {e}");
                    return;
                }
            },
        };
        self.update_criteria(|criteria| criteria.level = facet);
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn set_domain(&self, domain: Option<String>) {
        let facet = facet_label(domain).map_or(Facet::All, |d| Facet::Only(Domain(d)));
        self.update_criteria(|criteria| criteria.domain = facet);
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn set_unread_only(&self, unread_only: bool) {
        self.update_criteria(|criteria| criteria.unread_only = unread_only);
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn set_starred_only(&self, starred_only: bool) {
        self.update_criteria(|criteria| criteria.starred_only = starred_only);
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(getter))]
    pub fn criteria(&self) -> FilterCriteria {
        self.state.borrow().criteria.clone()
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn visible(&self) -> Vec<QuestionRecord> {
        self.state.borrow().visible.clone()
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn facet_counts(&self) -> FacetCounts {
        let state = self.state.borrow();
        filter::facet_counts(state.catalog.partition(state.tab))
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn summary(&self) -> ProgressSummary {
        let state = self.state.borrow();
        ProgressSummary::for_records(state.catalog.partition(state.tab), state.progress.state())
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn is_read(&self, id: QuestionId) -> bool {
        self.state.borrow().progress.is_read(&id)
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn is_starred(&self, id: QuestionId) -> bool {
        self.state.borrow().progress.is_starred(&id)
    }

    /// Returns the new read state.
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn toggle_read(&self, id: QuestionId) -> bool {
        self.update_progress(|progress| progress.toggle_read(&id))
    }

    /// Returns the new starred state.
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn toggle_star(&self, id: QuestionId) -> bool {
        self.update_progress(|progress| progress.toggle_star(&id))
    }

    // =======
    // study mode
    // =======

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn enter_study(&self) {
        self.study(|session, _, _, now| session.enter(now));
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn exit_study(&self) {
        self.study(|session, _, _, _| session.exit());
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(getter))]
    pub fn session_state(&self) -> SessionState {
        self.state.borrow().session.state()
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn session_view(&self) -> SessionView {
        let state = self.state.borrow();
        state.session.view(&state.visible)
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn current_question(&self) -> Option<QuestionRecord> {
        let state = self.state.borrow();
        state.session.current(&state.visible).cloned()
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn next(&self) {
        self.study(|session, list, progress, now| {
            if session.next(list, progress, now) == Transition::Completed {
                log::info!("Studied all {} questions", list.len());
            }
        });
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn prev(&self) {
        self.study(|session, _, _, now| {
            session.prev(now);
        });
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn flip(&self) {
        self.study(|session, _, _, _| {
            session.flip();
        });
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn mark_read(&self) {
        self.study(|session, list, progress, _| {
            session.mark_read(list, progress);
        });
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn toggle_star_current(&self) {
        self.study(|session, list, progress, _| {
            session.toggle_star(list, progress);
        });
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn toggle_timer(&self) {
        self.study(|session, _, _, now| session.toggle_timer(now));
    }

    /// `key` is `KeyboardEvent.key`.
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn handle_key(&self, key: String) -> KeyOutcome {
        self.study(|session, list, progress, now| session.handle_key(&key, list, progress, now))
    }

    /// Drives everything time based: the search quiet period and the card timer. The page calls
    /// this on an interval (a few times per second is plenty).
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn tick(&self) {
        let _flusher = FlushLater::new(self);
        let now = (self.clock)();
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let mut changes = Vec::new();

        if state.search.poll(now) {
            state.criteria.search_term = state.search.settled().to_string();
            changes.push(Change::Filters);
            changes.extend(state.refresh_visible(now));
        }

        match state.session.tick(&state.visible, now) {
            Some(TimerEvent::Ticked { .. }) => changes.push(Change::Timer),
            Some(TimerEvent::Expired) => {
                log::info!("Card timer ran out");
                changes.push(Change::Timer);
                changes.push(Change::TimerExpired);
            }
            None => {}
        }
        self.notify(changes);
    }

    // =======
    // export and random pick
    // =======

    /// `None` when nothing is visible.
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn export_markdown(&self) -> Option<ExportDocument> {
        let today = (self.clock)().date_naive();
        let state = self.state.borrow();
        export::export_markdown(&state.visible, state.tab, today)
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn random_question(&self) -> Option<QuestionRecord> {
        let _flusher = FlushLater::new(self);
        let mut state = self.state.borrow_mut();
        #[cfg(not(target_arch = "wasm32"))]
        let pick = export::randomize(&state.visible, &mut rand::rng()).cloned();
        #[cfg(target_arch = "wasm32")]
        let pick = export::randomize(&state.visible).cloned();
        state.random_pick = pick.clone();
        self.notify([Change::Random]);
        pick
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(getter))]
    pub fn random_pick(&self) -> Option<QuestionRecord> {
        self.state.borrow().random_pick.clone()
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn clear_random(&self) {
        let _flusher = FlushLater::new(self);
        if self.state.borrow_mut().random_pick.take().is_some() {
            self.notify([Change::Random]);
        }
    }

    /// Segments of `text` matching the current search term.
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn highlight_search(&self, text: String) -> Vec<Highlight> {
        render::highlight(&text, self.state.borrow().search.settled())
    }
}

impl Learn {
    pub fn new(storage: Box<dyn KeyValueStore>) -> Self {
        Self::with_clock(storage, Utc::now)
    }

    /// Every time-based decision reads `clock`.
    pub fn with_clock(
        storage: Box<dyn KeyValueStore>,
        clock: impl Fn() -> DateTime<Utc> + 'static,
    ) -> Self {
        let state = State {
            catalog: Catalog::default(),
            status: CatalogStatus::NotRequested,
            tab: Source::General,
            search: SearchBox::default(),
            criteria: FilterCriteria::default(),
            progress: ProgressStore::load(storage),
            visible: Vec::new(),
            session: StudySession::default(),
            random_pick: None,
            recomputes: 0,
        };
        Self {
            state: RefCell::new(state),
            listeners: RefCell::new(Listeners::default()),
            pending: RefCell::new(Vec::new()),
            clock: Box::new(clock),
        }
    }

    pub fn listen(&self, listener: impl Fn(ListenerKey, Change) + 'static) -> ListenerKey {
        self.listeners.borrow_mut().register(listener)
    }

    /// Fetches the question list. Only the first call does anything; a failed load leaves the
    /// catalog empty and is not retried.
    pub async fn load_catalog(&self, loader: &impl CatalogLoader) -> Result<(), FetchError> {
        {
            let _flusher = FlushLater::new(self);
            let mut state = self.state.borrow_mut();
            if state.status != CatalogStatus::NotRequested {
                log::debug!("Catalog already requested");
                return Ok(());
            }
            state.status = CatalogStatus::Loading;
            self.notify([Change::Catalog]);
        }

        let result = loader.load().await;

        let _flusher = FlushLater::new(self);
        let now = (self.clock)();
        let mut state = self.state.borrow_mut();
        match result {
            Ok(records) => {
                log::info!("Loaded {} questions", records.len());
                state.catalog = Catalog::new(records);
                state.status = CatalogStatus::Ready;
                let mut changes = vec![Change::Catalog];
                changes.extend(state.refresh_visible(now));
                self.notify(changes);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load questions: {e}");
                state.status = CatalogStatus::Failed;
                self.notify([Change::Catalog]);
                Err(e)
            }
        }
    }

    fn update_criteria(&self, update: impl FnOnce(&mut FilterCriteria)) {
        let _flusher = FlushLater::new(self);
        let now = (self.clock)();
        let mut state = self.state.borrow_mut();
        let before = state.criteria.clone();
        update(&mut state.criteria);
        if state.criteria == before {
            return;
        }
        let mut changes = vec![Change::Filters];
        changes.extend(state.refresh_visible(now));
        self.notify(changes);
    }

    fn update_progress<R>(&self, update: impl FnOnce(&mut ProgressStore) -> R) -> R {
        let _flusher = FlushLater::new(self);
        let now = (self.clock)();
        let mut state = self.state.borrow_mut();
        let result = update(&mut state.progress);
        let mut changes = vec![Change::Progress];
        changes.extend(state.refresh_visible(now));
        self.notify(changes);
        result
    }

    fn study<R>(
        &self,
        command: impl FnOnce(
            &mut StudySession,
            &[QuestionRecord],
            &mut ProgressStore,
            DateTime<Utc>,
        ) -> R,
    ) -> R {
        let _flusher = FlushLater::new(self);
        let now = (self.clock)();
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;

        let view_before = state.session.view(&state.visible);
        let counts_before = state.progress_counts();
        let result = command(&mut state.session, &state.visible, &mut state.progress, now);

        let mut changes = Vec::new();
        if state.progress_counts() != counts_before {
            changes.push(Change::Progress);
            // the current card may no longer pass the read/starred filters
            changes.extend(state.refresh_visible(now));
        }
        if state.session.view(&state.visible) != view_before {
            changes.push(Change::Session);
        }
        self.notify(changes);
        result
    }

    fn notify(&self, changes: impl IntoIterator<Item = Change>) {
        let mut pending = self.pending.borrow_mut();
        for change in changes {
            if !pending.contains(&change) {
                pending.push(change);
            }
        }
    }

    /// Flush pending notifications safely, avoiding RefCell re-borrows during callbacks.
    fn flush_notifications(&self) {
        let topics = std::mem::take(&mut *self.pending.borrow_mut());
        if topics.is_empty() {
            return;
        }
        // collect first: callbacks are free to call back into `self`
        let notifications = self.listeners.borrow().notifications(&topics);
        for notification in notifications {
            notification();
        }
    }
}

/// Flushes listeners when dropped, so no code path of a mutating method forgets to.
struct FlushLater<'a> {
    learn: &'a Learn,
}

impl<'a> FlushLater<'a> {
    fn new(learn: &'a Learn) -> Self {
        Self { learn }
    }
}

impl<'a> Drop for FlushLater<'a> {
    fn drop(&mut self) {
        self.learn.flush_notifications();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::record;
    use chrono::TimeDelta;
    use futures::executor::block_on;
    use stash::{FileStore, MemoryStore};
    use std::cell::Cell;
    use std::rc::Rc;

    /// A clock the test moves by hand.
    #[derive(Clone)]
    struct ManualClock(Rc<Cell<DateTime<Utc>>>);

    impl ManualClock {
        fn new() -> Self {
            ManualClock(Rc::new(Cell::new(DateTime::<Utc>::UNIX_EPOCH)))
        }

        fn set_ms(&self, ms: i64) {
            self.0
                .set(DateTime::<Utc>::UNIX_EPOCH + TimeDelta::milliseconds(ms));
        }
    }

    fn learn_with(records: Vec<QuestionRecord>) -> (Learn, ManualClock) {
        let clock = ManualClock::new();
        let reader = clock.clone();
        let learn = Learn::with_clock(Box::new(MemoryStore::new()), move || reader.0.get());
        block_on(learn.load_catalog(&StaticCatalog::new(records))).unwrap();
        (learn, clock)
    }

    fn ids(records: &[QuestionRecord]) -> Vec<QuestionId> {
        records.iter().map(|r| r.id.clone()).collect()
    }

    fn sample() -> Vec<QuestionRecord> {
        let mut hooks = record(3, "React", Level::Middle, "Frontend");
        hooks.question = "When do React hooks run?".to_string();
        let mut jd = record(4, "Docker", Level::Senior, "Backend");
        jd.source = Source::Jd;
        jd.answer = "react is not involved".to_string();
        vec![
            record(1, "HTML", Level::Junior, "Frontend"),
            record(2, "CSS", Level::Senior, "Backend"),
            hooks,
            jd,
        ]
    }

    #[test]
    fn test_category_facet_narrows_visible() {
        let (learn, _) = learn_with(sample());
        assert_eq!(learn.status(), CatalogStatus::Ready);
        assert_eq!(learn.visible().len(), 3);

        learn.set_category(Some("HTML".to_string()));
        assert_eq!(ids(&learn.visible()), vec![QuestionId::from(1)]);

        learn.set_category(Some("All".to_string()));
        assert_eq!(learn.visible().len(), 3);
    }

    #[test]
    fn test_debounced_search() {
        let (learn, clock) = learn_with(sample());
        let recomputes_before = learn.state.borrow().recomputes;

        clock.set_ms(0);
        learn.input_search("r".to_string());
        clock.set_ms(100);
        learn.input_search("re".to_string());
        clock.set_ms(200);
        learn.input_search("react".to_string());

        for ms in (200..=700).step_by(50) {
            clock.set_ms(ms);
            learn.tick();
            if ms < 500 {
                assert_eq!(learn.search_term(), "");
                assert_eq!(learn.visible().len(), 3);
            }
        }
        assert_eq!(learn.state.borrow().recomputes, recomputes_before + 1);
        assert_eq!(learn.search_term(), "react");
        // the jd record mentions react but lives on the other tab
        assert_eq!(ids(&learn.visible()), vec![QuestionId::from(3)]);
    }

    #[test]
    fn test_study_through_the_list() {
        let (learn, _) = learn_with(sample());
        learn.enter_study();
        assert_eq!(learn.session_state(), SessionState::Viewing { cursor: 0 });

        learn.next();
        learn.next();
        assert!(learn.is_read(QuestionId::from(1)));
        assert!(learn.is_read(QuestionId::from(2)));
        assert_eq!(learn.session_state(), SessionState::Viewing { cursor: 2 });

        learn.next();
        assert_eq!(learn.session_state(), SessionState::Complete);
        assert!(learn.is_read(QuestionId::from(3)));
        assert_eq!(learn.summary().mastered, 3);
        assert_eq!(learn.summary().mastered_percent, 100.0);

        // keys do nothing once complete
        assert_eq!(learn.handle_key("ArrowLeft".to_string()), KeyOutcome::IGNORED);
    }

    #[test]
    fn test_unread_filter_keeps_session_on_next_unread() {
        let (learn, _) = learn_with(sample());
        learn.set_unread_only(true);
        learn.enter_study();

        learn.next();
        assert_eq!(ids(&learn.visible()), vec![QuestionId::from(2), QuestionId::from(3)]);
        assert_eq!(learn.session_state(), SessionState::Viewing { cursor: 0 });
        assert_eq!(learn.current_question().map(|q| q.id), Some(QuestionId::from(2)));
    }

    #[test]
    fn test_shrinking_list_resets_cursor() {
        let (learn, _) = learn_with(sample());
        learn.enter_study();
        learn.handle_key("ArrowRight".to_string());
        learn.handle_key("ArrowRight".to_string());
        assert_eq!(learn.session_state(), SessionState::Viewing { cursor: 2 });

        learn.set_domain(Some("Backend".to_string()));
        assert_eq!(learn.session_state(), SessionState::Viewing { cursor: 0 });
        assert_eq!(learn.current_question().map(|q| q.id), Some(QuestionId::from(2)));
    }

    #[test]
    fn test_tab_switch_resets_everything() {
        let (learn, clock) = learn_with(sample());
        learn.set_level(Some("Senior".to_string()));
        clock.set_ms(0);
        learn.input_search("question".to_string());
        clock.set_ms(300);
        learn.tick();
        assert_eq!(ids(&learn.visible()), vec![QuestionId::from(2)]);
        learn.random_question();
        assert!(learn.random_pick().is_some());

        learn.set_tab(Source::Jd);
        assert_eq!(learn.criteria(), FilterCriteria::default());
        assert_eq!(learn.search_text(), "");
        assert!(learn.random_pick().is_none());
        assert_eq!(ids(&learn.visible()), vec![QuestionId::from(4)]);
        assert_eq!(learn.summary().total, 1);
    }

    #[test]
    fn test_unknown_level_is_ignored() {
        let (learn, _) = learn_with(sample());
        learn.set_level(Some("Junior".to_string()));
        learn.set_level(Some("Wizard".to_string()));
        assert_eq!(learn.criteria().level, Facet::Only(Level::Junior));
    }

    #[test]
    fn test_listeners_hear_changes_and_can_reenter() {
        let (learn, _) = learn_with(sample());
        let learn = Rc::new(learn);
        let heard = Rc::new(RefCell::new(Vec::new()));

        let heard_in = heard.clone();
        let learn_in = Rc::downgrade(&learn);
        let key = learn.listen(move |_, change| {
            // reading state from inside a callback must not panic
            let visible = learn_in.upgrade().map(|l| l.visible().len());
            heard_in.borrow_mut().push((change, visible));
        });

        learn.toggle_star(QuestionId::from(1));
        assert!(heard.borrow().contains(&(Change::Progress, Some(3))));

        heard.borrow_mut().clear();
        learn.set_starred_only(true);
        assert!(heard.borrow().contains(&(Change::Visible, Some(1))));

        assert!(learn.unsubscribe(key));
        heard.borrow_mut().clear();
        learn.toggle_star(QuestionId::from(1));
        assert!(heard.borrow().is_empty());
    }

    #[test]
    fn test_timer_expiry_is_announced_once() {
        let (learn, clock) = learn_with(sample());
        let expired = Rc::new(Cell::new(0));
        let expired_in = expired.clone();
        learn.listen(move |_, change| {
            if change == Change::TimerExpired {
                expired_in.set(expired_in.get() + 1);
            }
        });

        clock.set_ms(0);
        learn.enter_study();
        clock.set_ms(60_000);
        learn.tick();
        assert_eq!(learn.session_view().timer.map(|t| t.remaining), Some(60));

        clock.set_ms(125_000);
        learn.tick();
        clock.set_ms(200_000);
        learn.tick();
        assert_eq!(expired.get(), 1);
        assert_eq!(learn.session_view().timer.map(|t| t.remaining), Some(0));
    }

    #[test]
    fn test_no_timer_over_an_empty_list() {
        let (learn, clock) = learn_with(sample());
        let timer_changes = Rc::new(Cell::new(0));
        let timer_changes_in = timer_changes.clone();
        learn.listen(move |_, change| {
            if matches!(change, Change::Timer | Change::TimerExpired) {
                timer_changes_in.set(timer_changes_in.get() + 1);
            }
        });

        clock.set_ms(0);
        learn.set_starred_only(true);
        assert!(learn.visible().is_empty());
        learn.enter_study();
        for ms in [30_000, 120_000, 300_000] {
            clock.set_ms(ms);
            learn.tick();
        }
        assert_eq!(learn.session_view().timer, None);
        assert_eq!(timer_changes.get(), 0);
    }

    #[test]
    fn test_catalog_loads_once() {
        let (learn, _) = learn_with(sample());
        block_on(learn.load_catalog(&StaticCatalog::new(Vec::new()))).unwrap();
        assert_eq!(learn.visible().len(), 3);
    }

    #[test]
    fn test_export_uses_visible_list() {
        let (learn, clock) = learn_with(sample());
        clock.set_ms(0);
        learn.set_category(Some("CSS".to_string()));
        let document = learn.export_markdown().unwrap();
        assert_eq!(document.file_name, "Interview_CheatSheet_general_1970-01-01.md");
        assert!(document.contents.starts_with("# Question 2\n"));

        learn.set_category(Some("Nothing".to_string()));
        assert!(learn.export_markdown().is_none());
        assert!(learn.random_question().is_none());
    }

    #[test]
    fn test_progress_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        {
            let learn = Learn::new(Box::new(FileStore::new(dir.path()).unwrap()));
            block_on(learn.load_catalog(&StaticCatalog::new(sample()))).unwrap();
            learn.toggle_star(QuestionId::from(2));
            learn.toggle_read(QuestionId::from(3));
        }
        let learn = Learn::new(Box::new(FileStore::new(dir.path()).unwrap()));
        assert!(learn.is_starred(QuestionId::from(2)));
        assert!(learn.is_read(QuestionId::from(3)));
        assert!(!learn.is_read(QuestionId::from(2)));
    }

    #[test]
    fn test_highlight_follows_settled_term() {
        let (learn, clock) = learn_with(sample());
        clock.set_ms(0);
        learn.input_search("HOOKS".to_string());
        assert_eq!(learn.highlight_search("React hooks".to_string()).len(), 1);
        clock.set_ms(300);
        learn.tick();
        let segments = learn.highlight_search("React hooks".to_string());
        assert_eq!(segments.last().map(|s| (s.text.as_str(), s.matched)), Some(("hooks", true)));
    }
}
