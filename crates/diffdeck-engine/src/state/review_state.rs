//! Main state for a review session.

use super::navigation::{next_unviewed, Highlight, NavigationState};
use super::{ExpandScheduler, FileViewMode, RenderWindow, VirtualList};
use crate::action::ReviewAction;
use crate::config::EngineConfig;
use crate::event::ReviewEvent;
use crate::ledger::{ViewedLedger, ViewedState};
use crate::model::{DiffStats, FileDiffRecord, FileStatus};
use crate::parser::split;
use crate::patch::reconstruct_old_content;
use crate::prefetch::PrefetchOutcome;
use crate::render::{render_diff, render_full_file, FileBody, Placeholder};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

type Subscriber = Box<dyn FnMut(&ReviewEvent)>;

/// Owned state of one review session.
///
/// Every mutation goes through a method on this type; maps are replaced or
/// updated in place under `&mut self`, so observers never see a torn state.
/// Events produced by a mutation are delivered to subscribers immediately
/// and queued for [`drain_events`](Self::drain_events).
pub struct ReviewState {
    config: EngineConfig,
    /// Records with real paths, in diff order. Totals are computed from these.
    records: Vec<FileDiffRecord>,
    /// Indices into `records` that pass the filter.
    displayed: Vec<usize>,
    filter: Option<String>,
    modes: HashMap<String, FileViewMode>,
    mode_revision: u64,
    /// Laid-out heights reported by the renderer, by key.
    measured: HashMap<String, u32>,
    ledger: ViewedLedger,
    nav: NavigationState,
    list: VirtualList,
    expand_queue: ExpandScheduler,
    reconstruct_queue: VecDeque<String>,
    /// Current file content, by path.
    contents: HashMap<String, String>,
    /// Diff bodies already rendered, by key. Dropped on collapse.
    diff_bodies: HashMap<String, Arc<FileBody>>,
    /// Full-file bodies built from a successful reconstruction, by key.
    full_bodies: HashMap<String, Arc<FileBody>>,
    /// Keys whose full-file view is disabled.
    full_unavailable: HashSet<String>,
    is_loading: bool,
    subscribers: Vec<Subscriber>,
    outbox: Vec<ReviewEvent>,
}

impl fmt::Debug for ReviewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReviewState")
            .field("records", &self.records.len())
            .field("displayed", &self.displayed.len())
            .field("filter", &self.filter)
            .field("mode_revision", &self.mode_revision)
            .field("nav", &self.nav)
            .field("pending_expand", &self.expand_queue.pending_len())
            .field("pending_reconstruct", &self.reconstruct_queue.len())
            .field("is_loading", &self.is_loading)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl Default for ReviewState {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl ReviewState {
    /// Create an empty review state.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            ledger: ViewedLedger::new(config.undo_capacity),
            expand_queue: ExpandScheduler::new(config.expand_batch_size),
            config,
            records: Vec::new(),
            displayed: Vec::new(),
            filter: None,
            modes: HashMap::new(),
            mode_revision: 0,
            measured: HashMap::new(),
            nav: NavigationState::default(),
            list: VirtualList::default(),
            reconstruct_queue: VecDeque::new(),
            contents: HashMap::new(),
            diff_bodies: HashMap::new(),
            full_bodies: HashMap::new(),
            full_unavailable: HashSet::new(),
            is_loading: false,
            subscribers: Vec::new(),
            outbox: Vec::new(),
        }
    }

    // === Events ===

    /// Register a callback invoked for every event as it is produced.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&ReviewEvent) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Take all events produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<ReviewEvent> {
        std::mem::take(&mut self.outbox)
    }

    fn emit(&mut self, event: ReviewEvent) {
        for subscriber in &mut self.subscribers {
            subscriber(&event);
        }
        self.outbox.push(event);
    }

    // === Accessors ===

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// All records, unfiltered.
    pub fn records(&self) -> &[FileDiffRecord] {
        &self.records
    }

    pub fn record(&self, key: &str) -> Option<&FileDiffRecord> {
        self.index_of(key).map(|idx| &self.records[idx])
    }

    fn index_of(&self, key: &str) -> Option<usize> {
        self.records.iter().position(|r| r.key == key)
    }

    /// Number of records passing the filter.
    pub fn displayed_len(&self) -> usize {
        self.displayed.len()
    }

    /// Record at a position of the displayed list.
    pub fn displayed_record(&self, position: usize) -> Option<&FileDiffRecord> {
        self.displayed.get(position).map(|&idx| &self.records[idx])
    }

    fn displayed_position(&self, key: &str) -> Option<usize> {
        self.displayed
            .iter()
            .position(|&idx| self.records[idx].key == key)
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    pub fn nav(&self) -> &NavigationState {
        &self.nav
    }

    pub fn mode(&self, key: &str) -> FileViewMode {
        self.modes.get(key).copied().unwrap_or_default()
    }

    pub fn mode_revision(&self) -> u64 {
        self.mode_revision
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Totals over the unfiltered record set.
    pub fn stats(&self) -> DiffStats {
        DiffStats::from_records(&self.records, self.is_loading)
    }

    // === Loading ===

    /// Mark a new diff as being fetched.
    pub fn begin_loading(&mut self) {
        self.is_loading = true;
        let stats = self.stats();
        self.emit(ReviewEvent::StatsChanged(stats));
    }

    /// Replace the record set with the sections of a new diff.
    ///
    /// Files present before keep their view mode. Newly appearing files start
    /// collapsed and are expanded: at once for a small set, batched through
    /// [`tick`](Self::tick) otherwise. Viewed entries whose content changed
    /// are reset.
    pub fn set_diff_text(&mut self, diff_text: &str) {
        let parsed = split(diff_text);
        let total = parsed.len();
        let records: Vec<FileDiffRecord> =
            parsed.into_iter().filter(|r| r.has_real_paths()).collect();
        if records.len() < total {
            log::warn!(
                "Ignoring {} diff sections without parseable paths",
                total - records.len()
            );
        }
        let invalid = records.iter().filter(|r| !r.is_valid).count();
        if invalid > 0 {
            log::warn!("{} diff sections are malformed", invalid);
        }

        let previous: HashMap<String, String> = std::mem::take(&mut self.records)
            .into_iter()
            .map(|r| (r.key, r.diff_text))
            .collect();

        let mut modes = HashMap::with_capacity(records.len());
        let mut fresh = Vec::new();
        let mut unchanged_keys = HashSet::new();
        let mut unchanged_paths = HashSet::new();
        for record in &records {
            match previous.get(&record.key) {
                Some(old_text) if *old_text == record.diff_text => {
                    unchanged_keys.insert(record.key.clone());
                    unchanged_paths.insert(record.display_path().to_string());
                    modes.insert(record.key.clone(), self.mode(&record.key));
                }
                Some(_) => {
                    let mode = match self.mode(&record.key) {
                        FileViewMode::ExpandedFull => FileViewMode::Expanded,
                        mode => mode,
                    };
                    modes.insert(record.key.clone(), mode);
                }
                None => {
                    modes.insert(record.key.clone(), FileViewMode::Collapsed);
                    fresh.push(record.key.clone());
                }
            }
        }

        self.modes = modes;
        self.diff_bodies.retain(|key, _| unchanged_keys.contains(key));
        self.full_bodies.retain(|key, _| unchanged_keys.contains(key));
        self.full_unavailable.retain(|key| unchanged_keys.contains(key));
        self.measured.retain(|key, _| unchanged_keys.contains(key));
        self.contents.retain(|path, _| unchanged_paths.contains(path));
        self.reconstruct_queue
            .retain(|key| unchanged_keys.contains(key));
        let present: HashSet<&str> = records.iter().map(|r| r.key.as_str()).collect();
        self.expand_queue.retain(|key| present.contains(key));

        self.records = records;
        self.is_loading = false;
        log::debug!(
            "Loaded {} files ({} new, {} unchanged)",
            self.records.len(),
            fresh.len(),
            unchanged_keys.len()
        );

        let reset = self.ledger.invalidate_stale(&self.records);
        self.refresh_displayed();
        self.rebuild_layout();
        self.expand_new_files(fresh);

        if let Some(selected) = self.nav.selected.clone() {
            if self.index_of(&selected).is_none() {
                self.nav.selected = None;
            }
        }

        let stats = self.stats();
        self.emit(ReviewEvent::StatsChanged(stats));
        if reset > 0 {
            let viewed_count = self.viewed_count();
            self.emit(ReviewEvent::ViewedBulkChanged { viewed_count });
        }
        let paths = self.missing_content_paths();
        if !paths.is_empty() {
            self.emit(ReviewEvent::ContentNeeded { paths });
        }
    }

    fn expand_new_files(&mut self, fresh: Vec<String>) {
        if fresh.is_empty() {
            return;
        }
        if fresh.len() <= self.config.atomic_expand_limit {
            let changes = fresh
                .into_iter()
                .map(|key| (key, FileViewMode::Expanded))
                .collect();
            self.set_modes(changes);
        } else {
            log::debug!("Expanding {} new files in batches", fresh.len());
            self.expand_queue.enqueue(fresh);
        }
    }

    /// Paths whose current content is still needed for full-file views.
    pub fn missing_content_paths(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|r| self.full_view_candidate(r) && r.status() != FileStatus::Deleted)
            .map(|r| r.display_path().to_string())
            .filter(|path| !self.contents.contains_key(path) && seen.insert(path.clone()))
            .collect()
    }

    /// Store fetched file contents. Failed fetches disable the full-file view
    /// of the affected files only.
    pub fn apply_prefetch(&mut self, outcomes: Vec<PrefetchOutcome>) {
        for outcome in outcomes {
            match outcome.result {
                Ok(content) => {
                    self.contents.insert(outcome.path, content);
                }
                Err(err) => {
                    log::warn!("Content of {} unavailable: {}", outcome.path, err);
                    let keys: Vec<String> = self
                        .records
                        .iter()
                        .filter(|r| r.display_path() == outcome.path)
                        .map(|r| r.key.clone())
                        .collect();
                    self.full_unavailable.extend(keys);
                }
            }
        }
    }

    fn content_for(&self, record: &FileDiffRecord) -> Option<&str> {
        if record.status() == FileStatus::Deleted {
            return Some("");
        }
        self.contents.get(record.display_path()).map(String::as_str)
    }

    fn full_view_candidate(&self, record: &FileDiffRecord) -> bool {
        record.is_valid
            && !record.is_binary
            && record.change_count() <= self.config.large_diff_threshold
            && !self.full_unavailable.contains(&record.key)
    }

    // === Filtering ===

    /// Narrow the displayed files to paths ending with `suffix`.
    ///
    /// Totals reported by [`stats`](Self::stats) are not affected.
    pub fn set_filter(&mut self, suffix: Option<String>) {
        self.filter = suffix.filter(|s| !s.is_empty());
        self.refresh_displayed();
        self.rebuild_layout();
    }

    fn refresh_displayed(&mut self) {
        self.displayed = match &self.filter {
            Some(suffix) => self
                .records
                .iter()
                .enumerate()
                .filter(|(_, r)| r.matches_suffix(suffix))
                .map(|(idx, _)| idx)
                .collect(),
            None => (0..self.records.len()).collect(),
        };
    }

    // === Viewed ledger ===

    pub fn is_viewed(&self, key: &str) -> bool {
        self.record(key)
            .is_some_and(|r| self.ledger.is_viewed(&r.key, &r.diff_text))
    }

    pub fn viewed_count(&self) -> usize {
        self.ledger.viewed_count(&self.records)
    }

    /// Flip a file's viewed flag.
    ///
    /// After marking a file viewed, the next unviewed file (in unfiltered
    /// order, wrapping around) is selected. Returns false for unknown keys.
    pub fn toggle_viewed(&mut self, key: &str, now: Instant) -> bool {
        let Some(idx) = self.index_of(key) else {
            return false;
        };
        let viewed = !self.ledger.is_viewed(key, &self.records[idx].diff_text);
        self.ledger
            .set_viewed(key, &self.records[idx].diff_text, viewed);
        self.emit(ReviewEvent::ViewedChanged {
            file_key: key.to_string(),
            viewed,
        });

        if viewed {
            let ledger = &self.ledger;
            let next = next_unviewed(&self.records, idx, |r| {
                ledger.is_viewed(&r.key, &r.diff_text)
            });
            if let Some(next) = next {
                let next_key = self.records[next].key.clone();
                self.select_file(&next_key, now);
            }
        }
        true
    }

    /// Revert the most recent single-file viewed change and select that file.
    ///
    /// Returns false when there is nothing to undo.
    pub fn undo_last_viewed(&mut self, now: Instant) -> bool {
        let Some(entry) = self.ledger.undo() else {
            return false;
        };

        let viewed = match self.record(&entry.file_key) {
            Some(record) => self.ledger.is_viewed(&record.key, &record.diff_text),
            None => entry.previous_state.as_ref().is_some_and(|s| s.viewed),
        };
        self.emit(ReviewEvent::ViewedChanged {
            file_key: entry.file_key.clone(),
            viewed,
        });

        if self.index_of(&entry.file_key).is_some() {
            self.select_file(&entry.file_key, now);
        } else {
            log::debug!("Undo restored {} which is no longer in the diff", entry.file_key);
        }
        true
    }

    /// Mark every file viewed and collapse them all.
    pub fn mark_all_viewed(&mut self) {
        self.ledger.mark_all(&self.records, true);
        let viewed_count = self.viewed_count();
        self.emit(ReviewEvent::ViewedBulkChanged { viewed_count });
        self.collapse_all();
    }

    /// Mark every file unviewed and expand them all.
    pub fn mark_all_unviewed(&mut self) {
        self.ledger.mark_all(&self.records, false);
        let viewed_count = self.viewed_count();
        self.emit(ReviewEvent::ViewedBulkChanged { viewed_count });
        self.expand_all();
    }

    /// Replace the ledger with persisted states, resetting stale entries.
    pub fn load_viewed(&mut self, states: HashMap<String, ViewedState>) {
        self.ledger.load(states);
        self.ledger.invalidate_stale(&self.records);
        let viewed_count = self.viewed_count();
        self.emit(ReviewEvent::ViewedBulkChanged { viewed_count });
    }

    /// Stored viewed states, for persistence.
    pub fn viewed_snapshot(&self) -> HashMap<String, ViewedState> {
        self.ledger.snapshot()
    }

    // === View modes ===

    /// Apply mode changes as one update. No-op changes are dropped.
    fn set_modes(&mut self, changes: Vec<(String, FileViewMode)>) -> usize {
        let mut changed = Vec::new();
        for (key, mode) in changes {
            if self.mode(&key) != mode {
                self.measured.remove(&key);
                if mode.is_collapsed() {
                    self.diff_bodies.remove(&key);
                }
                self.modes.insert(key.clone(), mode);
                changed.push(key);
            }
        }
        if changed.is_empty() {
            return 0;
        }

        self.mode_revision += 1;
        self.rebuild_layout();
        let count = changed.len();
        self.emit(ReviewEvent::ViewModesChanged {
            revision: self.mode_revision,
            changed,
        });
        count
    }

    /// Collapse an expanded file or expand a collapsed one.
    pub fn toggle_expanded(&mut self, key: &str) -> bool {
        if self.index_of(key).is_none() {
            return false;
        }
        let next = self.mode(key).toggled();
        self.expand_queue.retain(|k| k != key);
        self.reconstruct_queue.retain(|k| k != key);
        self.set_modes(vec![(key.to_string(), next)]) > 0
    }

    /// Whether the full-file view can be offered for a file.
    pub fn can_expand_full(&self, key: &str) -> bool {
        self.record(key)
            .is_some_and(|r| self.full_view_candidate(r) && self.content_for(r).is_some())
    }

    /// Switch an expanded file between diff and full-file view.
    ///
    /// Entering full view reverses the patch on the next [`tick`](Self::tick).
    /// Returns true if a change was made or queued.
    pub fn toggle_full_view(&mut self, key: &str) -> bool {
        match self.mode(key) {
            FileViewMode::Collapsed => false,
            FileViewMode::ExpandedFull => {
                self.set_modes(vec![(key.to_string(), FileViewMode::Expanded)]) > 0
            }
            FileViewMode::Expanded if !self.can_expand_full(key) => {
                if self.index_of(key).is_some() {
                    self.emit(ReviewEvent::FullViewUnavailable {
                        file_key: key.to_string(),
                    });
                }
                false
            }
            FileViewMode::Expanded => {
                if self.full_bodies.contains_key(key) {
                    return self.set_modes(vec![(key.to_string(), FileViewMode::ExpandedFull)]) > 0;
                }
                if !self.reconstruct_queue.iter().any(|k| k == key) {
                    self.reconstruct_queue.push_back(key.to_string());
                }
                true
            }
        }
    }

    /// Expand every collapsed file.
    ///
    /// Small sets change in one update; larger ones are queued and expanded a
    /// batch per [`tick`](Self::tick).
    pub fn expand_all(&mut self) {
        let targets: Vec<String> = self
            .records
            .iter()
            .filter(|r| self.mode(&r.key).is_collapsed())
            .map(|r| r.key.clone())
            .collect();

        if self.records.len() <= self.config.atomic_expand_limit {
            self.expand_queue.cancel();
            let changes = targets
                .into_iter()
                .map(|key| (key, FileViewMode::Expanded))
                .collect();
            self.set_modes(changes);
        } else {
            log::debug!("Expanding {} files in batches", targets.len());
            self.expand_queue.schedule(targets);
        }
    }

    /// Collapse every file at once, cancelling any batched expand.
    pub fn collapse_all(&mut self) {
        self.expand_queue.cancel();
        self.reconstruct_queue.clear();
        let changes = self
            .records
            .iter()
            .filter(|r| !self.mode(&r.key).is_collapsed())
            .map(|r| (r.key.clone(), FileViewMode::Collapsed))
            .collect();
        self.set_modes(changes);
    }

    pub fn is_all_collapsed(&self) -> bool {
        self.records
            .iter()
            .all(|r| self.mode(&r.key).is_collapsed())
    }

    pub fn is_all_expanded(&self) -> bool {
        !self.expand_queue.is_pending()
            && self
                .records
                .iter()
                .all(|r| self.mode(&r.key).is_expanded())
    }

    // === Navigation ===

    fn select(&mut self, key: &str) {
        self.nav.selected = Some(key.to_string());
        let index = self.displayed_position(key);
        self.emit(ReviewEvent::SelectionChanged {
            file_key: key.to_string(),
            index,
        });
    }

    /// Select a file: focus-scroll to it when displayed, otherwise only
    /// remember the selection.
    fn select_file(&mut self, key: &str, now: Instant) {
        if !self.focus_file(key, now) {
            self.select(key);
        }
    }

    /// Scroll a displayed file to the top of the viewport, expanding it if
    /// collapsed, and highlight it for a while.
    ///
    /// Returns false if the file is not in the displayed set.
    pub fn focus_file(&mut self, key: &str, now: Instant) -> bool {
        let Some(position) = self.displayed_position(key) else {
            return false;
        };
        if self.mode(key).is_collapsed() {
            self.expand_queue.retain(|k| k != key);
            self.set_modes(vec![(key.to_string(), FileViewMode::Expanded)]);
        }

        let offset = self.list.offset_of(position);
        let max_scroll = self.list.max_scroll(self.nav.viewport_height);
        self.nav.scroll_to(offset, max_scroll);
        self.nav.highlight = Some(Highlight {
            key: key.to_string(),
            expires_at: now + self.config.highlight_duration,
        });
        self.select(key);
        true
    }

    /// Select the next unviewed file after the one at the top of the viewport.
    pub fn focus_next_unviewed(&mut self, now: Instant) -> bool {
        let current = self
            .first_visible_key()
            .and_then(|key| self.index_of(&key));
        let ledger = &self.ledger;
        let is_viewed = |r: &FileDiffRecord| ledger.is_viewed(&r.key, &r.diff_text);
        let next = match current {
            Some(idx) => next_unviewed(&self.records, idx, is_viewed),
            None => self.records.iter().position(|r| !is_viewed(r)),
        };

        match next {
            Some(idx) => {
                let key = self.records[idx].key.clone();
                self.select_file(&key, now);
                true
            }
            None => false,
        }
    }

    // === Layout ===

    fn height_of(&self, record: &FileDiffRecord) -> u32 {
        let layout = &self.config.layout;
        if self.mode(&record.key).is_collapsed() {
            return layout.collapsed_height;
        }
        self.measured
            .get(&record.key)
            .copied()
            .unwrap_or_else(|| layout.expanded_estimate(record.change_count()))
    }

    fn rebuild_layout(&mut self) {
        let heights: Vec<u32> = self
            .displayed
            .iter()
            .map(|&idx| self.height_of(&self.records[idx]))
            .collect();
        self.list = VirtualList::from_heights(heights);
        self.clamp_scroll();
    }

    fn clamp_scroll(&mut self) {
        let max_scroll = self.list.max_scroll(self.nav.viewport_height);
        self.nav.scroll_to(self.nav.scroll_top, max_scroll);
    }

    pub fn set_viewport(&mut self, height: u32) {
        self.nav.viewport_height = height;
        self.clamp_scroll();
    }

    pub fn scroll_by(&mut self, delta: i64) {
        let max_scroll = self.list.max_scroll(self.nav.viewport_height);
        self.nav.scroll_by(delta, max_scroll);
    }

    /// Replace a file's estimated height with its laid-out size.
    ///
    /// Collapsed files keep their fixed height. Returns true if the offset
    /// table changed.
    pub fn set_measured_height(&mut self, key: &str, height: u32) -> bool {
        if self.mode(key).is_collapsed() || self.measured.get(key) == Some(&height) {
            return false;
        }
        self.measured.insert(key.to_string(), height);
        self.rebuild_layout();
        true
    }

    /// Items to lay out for the current viewport.
    pub fn window(&self) -> RenderWindow {
        self.list.window(
            self.nav.scroll_top,
            self.nav.viewport_height,
            self.config.layout.overscan,
        )
    }

    /// Key of the file at the top of the viewport.
    pub fn first_visible_key(&self) -> Option<String> {
        self.list
            .index_at(self.nav.scroll_top)
            .and_then(|position| self.displayed_record(position))
            .map(|r| r.key.clone())
    }

    fn first_visible_path(&self) -> Option<String> {
        self.first_visible_key()
            .and_then(|key| self.record(&key).map(|r| r.display_path().to_string()))
    }

    // === Rendering ===

    /// What to draw for a file in its current mode.
    ///
    /// Diff bodies are rendered on first request and reused until the file
    /// is collapsed or its diff text changes. Full-file bodies are built by
    /// [`tick`](Self::tick), never here.
    pub fn file_body(&mut self, key: &str) -> Arc<FileBody> {
        let mode = self.mode(key);
        let Some(record) = self.record(key) else {
            return Arc::new(FileBody::Collapsed);
        };
        if mode.is_collapsed() {
            return Arc::new(FileBody::Collapsed);
        }
        if record.change_count() > self.config.large_diff_threshold {
            return Arc::new(FileBody::Placeholder(Placeholder::LargeDiff {
                changes: record.change_count(),
            }));
        }
        if record.is_binary {
            return Arc::new(FileBody::Placeholder(Placeholder::Binary));
        }
        if mode == FileViewMode::ExpandedFull {
            if let Some(body) = self.full_bodies.get(key) {
                return Arc::clone(body);
            }
        }
        if let Some(body) = self.diff_bodies.get(key) {
            return Arc::clone(body);
        }

        let body = Arc::new(render_diff(record));
        self.diff_bodies.insert(key.to_string(), Arc::clone(&body));
        body
    }

    // === Scheduling ===

    pub fn has_pending_work(&self) -> bool {
        self.expand_queue.is_pending() || !self.reconstruct_queue.is_empty()
    }

    /// Run one slice of deferred work.
    ///
    /// Expands at most one batch of files, reverses at most one patch and
    /// expires the focus highlight. Returns every event not yet drained.
    pub fn tick(&mut self, now: Instant) -> Vec<ReviewEvent> {
        let batch = self.expand_queue.next_batch();
        if !batch.is_empty() {
            let changes = batch
                .into_iter()
                .filter(|key| self.mode(key).is_collapsed())
                .map(|key| (key, FileViewMode::Expanded))
                .collect();
            self.set_modes(changes);
        }

        if let Some(key) = self.reconstruct_queue.pop_front() {
            self.reconstruct(&key);
        }

        self.nav.clear_expired_highlight(now);
        self.drain_events()
    }

    fn reconstruct(&mut self, key: &str) {
        if self.mode(key) != FileViewMode::Expanded {
            return;
        }
        let Some(idx) = self.index_of(key) else {
            return;
        };

        let record = &self.records[idx];
        let result = self.content_for(record).map(|new_content| {
            reconstruct_old_content(new_content, &record.diff_text)
                .map(|old_content| render_full_file(&old_content, new_content))
        });

        match result {
            Some(Ok(lines)) => {
                let body = FileBody::Lines {
                    lines,
                    warning: None,
                };
                self.full_bodies.insert(key.to_string(), Arc::new(body));
                self.set_modes(vec![(key.to_string(), FileViewMode::ExpandedFull)]);
            }
            Some(Err(err)) => {
                log::warn!("Full view of {} unavailable: {}", key, err);
                self.disable_full_view(key);
            }
            None => {
                log::warn!("Full view of {} unavailable: content not loaded", key);
                self.disable_full_view(key);
            }
        }
    }

    fn disable_full_view(&mut self, key: &str) {
        self.full_unavailable.insert(key.to_string());
        self.emit(ReviewEvent::FullViewUnavailable {
            file_key: key.to_string(),
        });
    }

    // === Actions ===

    /// Apply an action and return the resulting events.
    ///
    /// Per-file actions target the first file visible in the viewport.
    pub fn handle_action(&mut self, action: ReviewAction, now: Instant) -> Vec<ReviewEvent> {
        if !action.is_scroll() {
            log::debug!("Review action: {:?}", action);
        }
        let page = i64::from(self.nav.viewport_height.max(1));
        match action {
            ReviewAction::ScrollDown(amount) => self.scroll_by(i64::from(amount)),
            ReviewAction::ScrollUp(amount) => self.scroll_by(-i64::from(amount)),
            ReviewAction::ScrollPageDown => self.scroll_by(page),
            ReviewAction::ScrollPageUp => self.scroll_by(-page),
            ReviewAction::ScrollTop => self.nav.scroll_top = 0,
            ReviewAction::ScrollBottom => {
                self.nav.scroll_top = self.list.max_scroll(self.nav.viewport_height);
            }
            ReviewAction::ToggleExpand => {
                if let Some(key) = self.first_visible_key() {
                    self.toggle_expanded(&key);
                }
            }
            ReviewAction::ToggleFullView => {
                if let Some(key) = self.first_visible_key() {
                    self.toggle_full_view(&key);
                }
            }
            ReviewAction::ExpandAll => self.expand_all(),
            ReviewAction::CollapseAll => self.collapse_all(),
            ReviewAction::ToggleViewed => {
                if let Some(key) = self.first_visible_key() {
                    self.toggle_viewed(&key, now);
                }
            }
            ReviewAction::UndoViewed => {
                self.undo_last_viewed(now);
            }
            ReviewAction::MarkAllViewed => self.mark_all_viewed(),
            ReviewAction::MarkAllUnviewed => self.mark_all_unviewed(),
            ReviewAction::FocusNextUnviewed => {
                self.focus_next_unviewed(now);
            }
            ReviewAction::FocusFile(key) => {
                self.focus_file(&key, now);
            }
            ReviewAction::SetFilter(suffix) => self.set_filter(suffix),
            ReviewAction::DiscardFile => {
                let target = self
                    .first_visible_key()
                    .and_then(|key| self.record(&key))
                    .map(|r| {
                        let old_path =
                            (r.status() == FileStatus::Renamed).then(|| r.old_path.clone());
                        (r.display_path().to_string(), old_path)
                    });
                if let Some((path, old_path)) = target {
                    self.emit(ReviewEvent::DiscardFile { path, old_path });
                }
            }
            ReviewAction::RevealFile => {
                if let Some(path) = self.first_visible_path() {
                    self.emit(ReviewEvent::RevealFile { path });
                }
            }
            ReviewAction::OpenInEditor => {
                if let Some(path) = self.first_visible_path() {
                    self.emit(ReviewEvent::OpenInEditor { path });
                }
            }
            ReviewAction::SetViewport { height } => self.set_viewport(height),
        }
        self.drain_events()
    }
}
