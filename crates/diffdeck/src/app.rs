//! The host: wires the review engine to git, the filesystem and the terminal.

use crate::keymap::{self, Command};
use diffdeck_config::AppConfig;
use diffdeck_engine::{
    prefetch_contents, DefaultTheme, DiffSource, EngineConfig, FileActionError, FileActions,
    FileContentProvider, HeightModel, PrefetchOutcome, ReviewAction, ReviewEvent, ReviewListWidget,
    ReviewState, SourceError, ViewedStore,
};
use ratatui::crossterm::event::KeyEvent;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Style};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Engine tunables from the user's configuration.
pub fn engine_config(config: &AppConfig) -> EngineConfig {
    let layout = &config.layout;
    EngineConfig {
        large_diff_threshold: config.large_diff_threshold,
        expand_batch_size: config.expand_batch_size,
        atomic_expand_limit: config.atomic_expand_limit,
        undo_capacity: config.undo_capacity,
        highlight_duration: Duration::from_millis(config.highlight_ms),
        prefetch_concurrency: config.prefetch_concurrency,
        layout: HeightModel {
            per_line_height: layout.per_line_height,
            header_height: layout.header_height,
            collapsed_height: layout.collapsed_height,
            min_height: layout.min_height,
            max_height: layout.max_height,
            overscan: layout.overscan,
        },
    }
}

/// External collaborators used by [`App`].
pub struct Collaborators {
    pub source: Arc<dyn DiffSource>,
    pub content: Arc<dyn FileContentProvider>,
    pub store: Box<dyn ViewedStore>,
    pub actions: Arc<dyn FileActions>,
}

type DiffResult = (u64, Result<String, SourceError>);
type PrefetchBatch = (u64, Vec<PrefetchOutcome>);
type DiscardResult = (String, Result<(), FileActionError>);

pub struct App {
    review: ReviewState,
    collaborators: Collaborators,
    theme: DefaultTheme,
    revision: String,
    session_id: String,
    /// Incremented per reload; diffs and prefetches from older loads are dropped.
    generation: u64,
    diff_tx: mpsc::UnboundedSender<DiffResult>,
    diff_rx: mpsc::UnboundedReceiver<DiffResult>,
    prefetch_tx: mpsc::UnboundedSender<PrefetchBatch>,
    prefetch_rx: mpsc::UnboundedReceiver<PrefetchBatch>,
    discard_tx: mpsc::UnboundedSender<DiscardResult>,
    discard_rx: mpsc::UnboundedReceiver<DiscardResult>,
    status: Option<String>,
    pending_discard: Option<String>,
    reload_requested: bool,
    running: bool,
}

impl App {
    pub fn new(
        config: EngineConfig,
        collaborators: Collaborators,
        revision: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        let mut review = ReviewState::new(config);
        review.subscribe(|event| log::debug!("Review event: {:?}", event));

        let (diff_tx, diff_rx) = mpsc::unbounded_channel();
        let (prefetch_tx, prefetch_rx) = mpsc::unbounded_channel();
        let (discard_tx, discard_rx) = mpsc::unbounded_channel();
        Self {
            review,
            collaborators,
            theme: DefaultTheme,
            revision: revision.into(),
            session_id: session_id.into(),
            generation: 0,
            diff_tx,
            diff_rx,
            prefetch_tx,
            prefetch_rx,
            discard_tx,
            discard_rx,
            status: None,
            pending_discard: None,
            reload_requested: false,
            running: true,
        }
    }

    pub fn review(&self) -> &ReviewState {
        &self.review
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Restore the persisted ledger, apply the initial filter and start loading the diff.
    pub fn start(&mut self, filter: Option<String>) {
        match self.collaborators.store.load(&self.session_id) {
            Ok(states) => self.review.load_viewed(states),
            Err(e) => {
                log::warn!("Could not restore viewed state: {}", e);
                self.status = Some(format!("Viewed state not restored: {}", e));
            }
        }
        self.review.set_filter(filter);
        // Nothing loaded yet; the ledger was just read from the store
        self.review.drain_events();
        self.reload();
    }

    /// Fetch the diff again in the background.
    ///
    /// The engine shows its loading state until [`poll_background`](Self::poll_background)
    /// applies the result.
    pub fn reload(&mut self) {
        self.reload_requested = false;
        self.generation += 1;
        self.review.begin_loading();
        let events = self.review.drain_events();
        self.process_events(events);

        let source = Arc::clone(&self.collaborators.source);
        let revision = self.revision.clone();
        let tx = self.diff_tx.clone();
        let generation = self.generation;

        log::debug!("Fetching diff for {} (load {})", revision, generation);
        tokio::spawn(async move {
            let result = source.get_diff_text(&revision).await;
            if tx.send((generation, result)).is_err() {
                log::debug!("Diff fetch finished after shutdown");
            }
        });
    }

    fn apply_diff(&mut self, result: Result<String, SourceError>) {
        let text = match result {
            Ok(text) => text,
            Err(e) => {
                log::error!("Failed to load diff for {}: {}", self.revision, e);
                self.status = Some(format!("Failed to load diff: {}", e));
                String::new()
            }
        };
        self.review.set_diff_text(&text);
    }

    pub fn take_reload_request(&mut self) -> bool {
        std::mem::take(&mut self.reload_requested)
    }

    /// Apply finished background work; returns the number of results applied.
    pub fn poll_background(&mut self) -> usize {
        let mut applied = 0;
        while let Ok((generation, result)) = self.diff_rx.try_recv() {
            if generation != self.generation {
                log::debug!("Dropping diff from superseded load {}", generation);
                continue;
            }
            self.apply_diff(result);
            applied += 1;
        }
        while let Ok((generation, outcomes)) = self.prefetch_rx.try_recv() {
            if generation != self.generation {
                log::debug!("Dropping {} stale prefetch results", outcomes.len());
                continue;
            }
            self.review.apply_prefetch(outcomes);
            applied += 1;
        }
        while let Ok((path, result)) = self.discard_rx.try_recv() {
            self.finish_discard(&path, result);
            applied += 1;
        }
        if applied > 0 {
            let events = self.review.drain_events();
            self.process_events(events);
        }
        applied
    }

    /// One frame of deferred engine work.
    pub fn tick(&mut self, now: Instant) {
        let events = self.review.tick(now);
        self.process_events(events);
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let Some(command) = keymap::map_key(key) else {
            return;
        };
        if command != Command::RequestDiscard {
            self.pending_discard = None;
        }

        match command {
            Command::Quit => self.running = false,
            Command::Reload => self.reload_requested = true,
            Command::RequestDiscard => self.request_discard(),
            Command::Review(action) => self.dispatch(action),
        }
    }

    fn request_discard(&mut self) {
        let Some(key) = self.review.first_visible_key() else {
            return;
        };
        if self.pending_discard.as_deref() == Some(key.as_str()) {
            self.pending_discard = None;
            self.dispatch(ReviewAction::DiscardFile);
            return;
        }
        let path = self
            .review
            .record(&key)
            .map(|r| r.display_path().to_string())
            .unwrap_or_else(|| key.clone());
        self.status = Some(format!("Press d again to discard changes to {}", path));
        self.pending_discard = Some(key);
    }

    fn dispatch(&mut self, action: ReviewAction) {
        if action.is_delegated() {
            log::info!("Delegating {:?}", action);
        }
        let events = self.review.handle_action(action, Instant::now());
        self.process_events(events);
    }

    fn process_events(&mut self, events: Vec<ReviewEvent>) {
        let mut ledger_changed = false;
        for event in events {
            ledger_changed |= event.touches_ledger();
            match event {
                ReviewEvent::ContentNeeded { paths } => self.spawn_prefetch(paths),
                ReviewEvent::DiscardFile { path, old_path } => self.spawn_discard(path, old_path),
                ReviewEvent::RevealFile { path } => {
                    if let Err(e) = self.collaborators.actions.reveal_in_file_system(&path) {
                        self.report_action_error("reveal", &path, &e);
                    }
                }
                ReviewEvent::OpenInEditor { path } => {
                    if let Err(e) = self.collaborators.actions.open_in_editor(&path) {
                        self.report_action_error("open", &path, &e);
                    }
                }
                _ => {}
            }
        }
        if ledger_changed {
            self.persist_viewed();
        }
    }

    /// Run the discard on the blocking pool; the outcome arrives via `poll_background`.
    fn spawn_discard(&mut self, path: String, old_path: Option<String>) {
        self.status = Some(format!("Discarding changes to {}", path));
        let actions = Arc::clone(&self.collaborators.actions);
        let tx = self.discard_tx.clone();

        tokio::task::spawn_blocking(move || {
            let result = old_path
                .iter()
                .chain(std::iter::once(&path))
                .try_for_each(|p| actions.discard_file(p));
            if tx.send((path, result)).is_err() {
                log::debug!("Discard finished after shutdown");
            }
        });
    }

    fn finish_discard(&mut self, path: &str, result: Result<(), FileActionError>) {
        match result {
            Ok(()) => {
                self.status = Some(format!("Discarded changes to {}", path));
                self.reload_requested = true;
            }
            Err(e) => self.report_action_error("discard", path, &e),
        }
    }

    fn report_action_error(&mut self, what: &str, path: &str, error: &dyn std::fmt::Display) {
        log::warn!("Failed to {} {}: {}", what, path, error);
        self.status = Some(format!("Failed to {} {}: {}", what, path, error));
    }

    fn persist_viewed(&mut self) {
        let snapshot = self.review.viewed_snapshot();
        if let Err(e) = self.collaborators.store.persist(&self.session_id, &snapshot) {
            log::warn!("Failed to persist viewed state: {}", e);
            self.status = Some(format!("Viewed state not saved: {}", e));
        }
    }

    fn spawn_prefetch(&self, paths: Vec<String>) {
        if paths.is_empty() {
            return;
        }
        let provider = Arc::clone(&self.collaborators.content);
        let tx = self.prefetch_tx.clone();
        let generation = self.generation;
        let concurrency = self.review.config().prefetch_concurrency;

        log::debug!("Prefetching {} files", paths.len());
        tokio::spawn(async move {
            let outcomes = prefetch_contents(provider.as_ref(), paths, concurrency).await;
            if tx.send((generation, outcomes)).is_err() {
                log::debug!("Prefetch finished after shutdown");
            }
        });
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let [list_area, status_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(frame.area());

        ReviewListWidget::new(&self.theme)
            .with_footer_hints(keymap::footer_hints())
            .render_with_state(list_area, frame.buffer_mut(), &mut self.review);

        let line = match self.status() {
            Some(status) => status.to_string(),
            None => {
                let mut line = format!("{} · session {}", self.revision, self.session_id);
                if let Some(filter) = self.review.filter() {
                    line.push_str(&format!(" · *{}", filter));
                }
                line
            }
        };
        frame.render_widget(
            Paragraph::new(line).style(Style::default().fg(Color::DarkGray)),
            status_area,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use diffdeck_engine::traits::MemoryViewedStore;
    use diffdeck_engine::{ContentError, ViewedState};
    use pretty_assertions::assert_eq;
    use ratatui::backend::TestBackend;
    use ratatui::crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::Terminal;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const DIFF: &str = "diff --git a/a.rs b/a.rs\n--- a/a.rs\n+++ b/a.rs\n@@ -1,2 +1,2 @@\n keep\n-old\n+new\n\
diff --git a/b.rs b/b.rs\n--- a/b.rs\n+++ b/b.rs\n@@ -1 +1,2 @@\n one\n+two\n";

    struct FixedSource(Mutex<String>);

    #[async_trait]
    impl DiffSource for FixedSource {
        async fn get_diff_text(&self, _revision: &str) -> Result<String, SourceError> {
            Ok(self.0.lock().unwrap().clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl DiffSource for FailingSource {
        async fn get_diff_text(&self, revision: &str) -> Result<String, SourceError> {
            Err(SourceError::UnknownRevision(revision.to_string()))
        }
    }

    struct MapContent(HashMap<String, String>);

    #[async_trait]
    impl FileContentProvider for MapContent {
        async fn get_file_content(&self, path: &str) -> Result<String, ContentError> {
            self.0
                .get(path)
                .cloned()
                .ok_or_else(|| ContentError::FileNotFound(path.to_string()))
        }
    }

    #[derive(Default)]
    struct RecordingActions(Arc<Mutex<Vec<String>>>);

    impl FileActions for RecordingActions {
        fn discard_file(&self, path: &str) -> Result<(), FileActionError> {
            self.0.lock().unwrap().push(format!("discard {}", path));
            Ok(())
        }

        fn reveal_in_file_system(&self, _path: &str) -> Result<(), FileActionError> {
            Err(FileActionError::NotConfigured("reveal"))
        }

        fn open_in_editor(&self, path: &str) -> Result<(), FileActionError> {
            self.0.lock().unwrap().push(format!("open {}", path));
            Ok(())
        }
    }

    struct SharedStore(Arc<MemoryViewedStore>);

    impl ViewedStore for SharedStore {
        fn load(
            &self,
            session_id: &str,
        ) -> Result<HashMap<String, ViewedState>, diffdeck_engine::StoreError> {
            self.0.load(session_id)
        }

        fn persist(
            &self,
            session_id: &str,
            states: &HashMap<String, ViewedState>,
        ) -> Result<(), diffdeck_engine::StoreError> {
            self.0.persist(session_id, states)
        }
    }

    struct Harness {
        app: App,
        store: Arc<MemoryViewedStore>,
        actions: Arc<Mutex<Vec<String>>>,
    }

    fn harness(source: Arc<dyn DiffSource>) -> Harness {
        let store = Arc::new(MemoryViewedStore::default());
        let log = Arc::new(Mutex::new(Vec::new()));
        let content = MapContent(HashMap::from([
            ("a.rs".to_string(), "keep\nnew\n".to_string()),
            ("b.rs".to_string(), "one\ntwo\n".to_string()),
        ]));
        let collaborators = Collaborators {
            source,
            content: Arc::new(content),
            store: Box::new(SharedStore(Arc::clone(&store))),
            actions: Arc::new(RecordingActions(Arc::clone(&log))),
        };
        let mut app = App::new(
            engine_config(&AppConfig::default()),
            collaborators,
            "HEAD",
            "test",
        );
        app.review.set_viewport(40);
        Harness {
            app,
            store,
            actions: log,
        }
    }

    async fn started_with(diff: &str) -> Harness {
        let mut h = harness(Arc::new(FixedSource(Mutex::new(diff.to_string()))));
        h.app.start(None);
        settle(&mut h.app, |app| !app.review().is_loading()).await;
        h
    }

    async fn started() -> Harness {
        started_with(DIFF).await
    }

    fn press(app: &mut App, c: char) {
        app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
    }

    /// Poll background results until `done` holds.
    async fn settle(app: &mut App, done: impl Fn(&App) -> bool) {
        for _ in 0..200 {
            app.poll_background();
            if done(app) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("background work did not finish");
    }

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_engine_config_from_app_config() {
        let config = AppConfig {
            highlight_ms: 500,
            layout: diffdeck_config::LayoutConfig {
                max_height: 12,
                ..Default::default()
            },
            ..AppConfig::default()
        };
        let engine = engine_config(&config);
        assert_eq!(engine.highlight_duration, Duration::from_millis(500));
        assert_eq!(engine.layout.max_height, 12);
        assert_eq!(engine.expand_batch_size, 5);
    }

    #[tokio::test]
    async fn test_start_loads_diff() {
        let h = started().await;
        assert_eq!(h.app.review().stats().file_count, 2);
        assert!(!h.app.review().is_loading());
    }

    #[tokio::test]
    async fn test_loading_is_drawn_before_diff_arrives() {
        let mut h = harness(Arc::new(FixedSource(Mutex::new(DIFF.to_string()))));
        let mut terminal = Terminal::new(TestBackend::new(60, 10)).unwrap();

        h.app.start(None);
        assert!(h.app.review().is_loading());
        terminal.draw(|frame| h.app.render(frame)).unwrap();
        assert!(screen(&terminal).contains("Loading"));

        settle(&mut h.app, |app| !app.review().is_loading()).await;
        assert_eq!(h.app.review().stats().file_count, 2);
        terminal.draw(|frame| h.app.render(frame)).unwrap();
        assert!(!screen(&terminal).contains("Loading"));
    }

    #[tokio::test]
    async fn test_failed_load_reaches_status() {
        let mut h = harness(Arc::new(FailingSource));
        h.app.start(None);
        settle(&mut h.app, |app| !app.review().is_loading()).await;
        assert_eq!(h.app.review().stats().file_count, 0);
        assert!(h
            .app
            .status()
            .is_some_and(|s| s.starts_with("Failed to load diff")));
    }

    #[tokio::test]
    async fn test_viewed_toggle_is_persisted() {
        let mut h = started().await;
        press(&mut h.app, 'v');
        assert_eq!(h.app.review().viewed_count(), 1);
        let saved = h.store.load("test").unwrap();
        assert!(saved.get("a.rs->a.rs").is_some_and(|s| s.viewed));

        press(&mut h.app, 'u');
        assert_eq!(h.app.review().viewed_count(), 0);
        let saved = h.store.load("test").unwrap();
        assert!(!saved.get("a.rs->a.rs").is_some_and(|s| s.viewed));
    }

    #[tokio::test]
    async fn test_viewed_state_survives_restart() {
        let mut h = started().await;
        press(&mut h.app, 'A');
        assert_eq!(h.app.review().viewed_count(), 2);

        let collaborators = Collaborators {
            source: Arc::new(FixedSource(Mutex::new(DIFF.to_string()))),
            content: Arc::new(MapContent(HashMap::new())),
            store: Box::new(SharedStore(Arc::clone(&h.store))),
            actions: Arc::new(RecordingActions::default()),
        };
        let mut again = App::new(EngineConfig::default(), collaborators, "HEAD", "test");
        again.start(None);
        settle(&mut again, |app| !app.review().is_loading()).await;
        assert_eq!(again.review().viewed_count(), 2);
    }

    #[tokio::test]
    async fn test_discard_needs_confirmation() {
        let mut h = started().await;
        press(&mut h.app, 'd');
        assert!(h.actions.lock().unwrap().is_empty());
        assert!(h.app.status().is_some_and(|s| s.contains("again")));

        press(&mut h.app, 'd');
        assert!(h.app.status().is_some_and(|s| s.starts_with("Discarding")));
        settle(&mut h.app, |app| app.reload_requested).await;
        assert_eq!(*h.actions.lock().unwrap(), vec!["discard a.rs"]);
        assert!(h.app.take_reload_request());
    }

    #[tokio::test]
    async fn test_discarding_a_rename_restores_both_paths() {
        let mut h = started_with(
            "diff --git a/old.rs b/new.rs\nrename from old.rs\nrename to new.rs\n--- a/old.rs\n+++ b/new.rs\n@@ -1 +1 @@\n-a\n+b\n",
        )
        .await;
        press(&mut h.app, 'd');
        press(&mut h.app, 'd');
        settle(&mut h.app, |app| app.reload_requested).await;
        assert_eq!(
            *h.actions.lock().unwrap(),
            vec!["discard old.rs", "discard new.rs"]
        );
        assert_eq!(h.app.status(), Some("Discarded changes to new.rs"));
    }

    #[tokio::test]
    async fn test_other_key_cancels_discard() {
        let mut h = started().await;
        press(&mut h.app, 'd');
        press(&mut h.app, 'j');
        press(&mut h.app, 'd');
        assert!(h.actions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_action_errors_reach_status() {
        let mut h = started().await;
        press(&mut h.app, 'o');
        assert_eq!(*h.actions.lock().unwrap(), vec!["open a.rs"]);
        press(&mut h.app, 'r');
        assert!(h.app.status().is_some_and(|s| s.starts_with("Failed to reveal")));
    }

    #[tokio::test]
    async fn test_prefetch_enables_full_view() {
        let mut h = started().await;
        settle(&mut h.app, |app| app.review().can_expand_full("a.rs->a.rs")).await;
        assert!(h.app.review().can_expand_full("b.rs->b.rs"));
    }

    #[tokio::test]
    async fn test_stale_prefetch_is_dropped() {
        let mut h = started().await;
        h.app.reload();
        let stale = vec![PrefetchOutcome {
            path: "a.rs".to_string(),
            result: Err(ContentError::FileNotFound("a.rs".to_string())),
        }];
        h.app.prefetch_tx.send((1, stale)).unwrap();
        h.app.diff_tx.send((1, Ok(String::new()))).unwrap();

        // Spawned fetches have not run yet; only the stale results are queued
        assert_eq!(h.app.poll_background(), 0);
        assert!(h.app.review().is_loading());
        settle(&mut h.app, |app| app.review().can_expand_full("a.rs->a.rs")).await;
        assert_eq!(h.app.review().stats().file_count, 2);
    }

    #[tokio::test]
    async fn test_quit() {
        let mut h = started().await;
        press(&mut h.app, 'q');
        assert!(!h.app.is_running());
    }
}
