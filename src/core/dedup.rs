// bs-logviewer - core/dedup.rs
//
// Duplicate-run detection and collapse over the full entry sequence.
// Core layer: pure logic. The display sequence is rebuilt only when a new
// log is loaded; show/hide requests patch it in place.

use crate::core::model::{DedupKey, DisplayEntry, DisplayKind, DuplicateRun, LogEntry};
use crate::util::constants::{DEFAULT_COLLAPSE_THRESHOLD, DEFAULT_DEDUP_WINDOW};
use crate::util::error::ViewError;
use std::collections::{HashMap, VecDeque};

/// Tuning for the detection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupConfig {
    /// How many preceding entries (in original order) are searched.
    pub window: usize,

    /// Minimum run length worth collapsing behind a marker.
    pub collapse_threshold: usize,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_DEDUP_WINDOW,
            collapse_threshold: DEFAULT_COLLAPSE_THRESHOLD,
        }
    }
}

/// Sliding multiset of the last `capacity` deduplication keys.
struct KeyWindow<'a> {
    capacity: usize,
    order: VecDeque<DedupKey<'a>>,
    counts: HashMap<DedupKey<'a>, usize>,
}

impl<'a> KeyWindow<'a> {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity + 1),
            counts: HashMap::with_capacity(capacity + 1),
        }
    }

    fn contains(&self, key: &DedupKey<'a>) -> bool {
        self.counts.contains_key(key)
    }

    fn push(&mut self, key: DedupKey<'a>) {
        if self.capacity == 0 {
            return;
        }
        self.order.push_back(key);
        *self.counts.entry(key).or_insert(0) += 1;
        if self.order.len() > self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                if let Some(count) = self.counts.get_mut(&evicted) {
                    *count -= 1;
                    if *count == 0 {
                        self.counts.remove(&evicted);
                    }
                }
            }
        }
    }
}

/// Entries after duplicate-run collapsing, ready for filtering and paging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplaySequence {
    items: Vec<DisplayEntry>,
}

impl DisplaySequence {
    /// Run the detection pass over `entries`.
    ///
    /// An entry is a duplicate when its key occurs among the `window`
    /// entries before it. Consecutive duplicates form a run; a run of at
    /// least `collapse_threshold` members is hidden behind a
    /// [`DisplayKind::ShowDuplicates`] marker placed directly before it.
    /// Shorter runs stay visible, still flagged as duplicates. The first
    /// occurrence of a repeated line is never part of its run.
    pub fn build(entries: &[LogEntry], config: &DedupConfig) -> Self {
        let mut items: Vec<DisplayEntry> = Vec::with_capacity(entries.len());
        let mut pending: Vec<usize> = Vec::new();
        let mut window = KeyWindow::new(config.window);
        let mut collapsed_runs = 0usize;

        for (index, entry) in entries.iter().enumerate() {
            let key = entry.dedup_key();
            if window.contains(&key) {
                pending.push(index);
            } else {
                collapsed_runs += flush_run(&mut items, &mut pending, config.collapse_threshold);
                items.push(entry_item(index, false, false));
            }
            window.push(key);
        }
        collapsed_runs += flush_run(&mut items, &mut pending, config.collapse_threshold);

        for (id, item) in items.iter_mut().enumerate() {
            item.id = id;
        }

        tracing::debug!(
            entries = entries.len(),
            items = items.len(),
            collapsed_runs,
            window = config.window,
            threshold = config.collapse_threshold,
            "Duplicate detection complete"
        );

        Self { items }
    }

    pub fn items(&self) -> &[DisplayEntry] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&DisplayEntry> {
        self.items.get(id)
    }

    /// Ids of every run marker, in display order.
    pub fn marker_ids(&self) -> Vec<usize> {
        self.items
            .iter()
            .filter(|item| item.is_marker())
            .map(|item| item.id)
            .collect()
    }

    /// Reveal the run behind marker `id`. Idempotent.
    pub fn show_duplicates(&mut self, id: usize) -> Result<(), ViewError> {
        self.set_run_hidden(id, false)
    }

    /// Collapse the run behind marker `id` again. Idempotent.
    pub fn hide_duplicates(&mut self, id: usize) -> Result<(), ViewError> {
        self.set_run_hidden(id, true)
    }

    /// Flip the run behind marker `id`. Returns true if it is now expanded.
    pub fn toggle(&mut self, id: usize) -> Result<bool, ViewError> {
        let expand = matches!(self.marker(id)?.kind, DisplayKind::ShowDuplicates(_));
        self.set_run_hidden(id, !expand)?;
        Ok(expand)
    }

    /// Reveal every collapsed run.
    pub fn expand_all(&mut self) {
        for id in self.marker_ids() {
            // Ids come straight from the marker scan.
            let _ = self.set_run_hidden(id, false);
        }
    }

    /// Collapse every run.
    pub fn collapse_all(&mut self) {
        for id in self.marker_ids() {
            let _ = self.set_run_hidden(id, true);
        }
    }

    fn marker(&self, id: usize) -> Result<&DisplayEntry, ViewError> {
        let item = self.items.get(id).ok_or(ViewError::UnknownId {
            id,
            len: self.items.len(),
        })?;
        if item.is_marker() {
            Ok(item)
        } else {
            Err(ViewError::NotARunMarker { id })
        }
    }

    /// Set the hidden flag on every member of the run and switch the marker
    /// to the matching mode. Touches nothing outside the run.
    fn set_run_hidden(&mut self, id: usize, hidden: bool) -> Result<(), ViewError> {
        let run = match self.marker(id)?.run() {
            Some(run) => run.clone(),
            None => return Err(ViewError::NotARunMarker { id }),
        };

        for item in &mut self.items[run.members.clone()] {
            if let DisplayKind::Entry { hidden: flag, .. } = &mut item.kind {
                *flag = hidden;
            }
        }
        let position = run.position;
        self.items[position].kind = if hidden {
            DisplayKind::ShowDuplicates(run)
        } else {
            DisplayKind::HideDuplicates(run)
        };
        Ok(())
    }
}

fn entry_item(index: usize, duplicate: bool, hidden: bool) -> DisplayEntry {
    DisplayEntry {
        id: 0,
        kind: DisplayKind::Entry {
            index,
            duplicate,
            hidden,
        },
    }
}

/// Append the pending run, collapsed behind a marker if it is long enough.
/// Returns 1 if a marker was inserted.
fn flush_run(items: &mut Vec<DisplayEntry>, pending: &mut Vec<usize>, threshold: usize) -> usize {
    if pending.is_empty() {
        return 0;
    }
    let collapse = pending.len() >= threshold;
    if collapse {
        let position = items.len();
        items.push(DisplayEntry {
            id: 0,
            kind: DisplayKind::ShowDuplicates(DuplicateRun {
                position,
                members: position + 1..position + 1 + pending.len(),
            }),
        });
    }
    items.extend(pending.drain(..).map(|index| entry_item(index, true, collapse)));
    usize::from(collapse)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(line: u64, message: &str) -> LogEntry {
        LogEntry::new(line, "INFO", "Core", "00:00", message)
    }

    fn repeated(count: usize, message: &str) -> Vec<LogEntry> {
        (0..count).map(|i| entry(i as u64 + 1, message)).collect()
    }

    fn with_tail(mut entries: Vec<LogEntry>, message: &str) -> Vec<LogEntry> {
        let line = entries.len() as u64 + 1;
        entries.push(entry(line, message));
        entries
    }

    #[test]
    fn test_long_run_collapses_behind_marker() {
        let entries = with_tail(repeated(12, "spam"), "done");
        let seq = DisplaySequence::build(&entries, &DedupConfig::default());

        // first occurrence, marker, 11 duplicates, tail
        assert_eq!(seq.len(), 14);
        assert_eq!(seq.items()[0].entry_index(), Some(0));
        assert!(!seq.items()[0].is_duplicate());

        let run = seq.items()[1].run().expect("marker at position 1").clone();
        assert!(matches!(seq.items()[1].kind, DisplayKind::ShowDuplicates(_)));
        assert_eq!(run.position, 1);
        assert_eq!(run.members, 2..13);
        assert_eq!(run.run_len(), 11);

        for item in &seq.items()[2..13] {
            assert!(item.is_duplicate() && item.is_hidden());
        }
        assert!(!seq.items()[13].is_hidden());
        assert_eq!(seq.marker_ids(), vec![1]);
    }

    #[test]
    fn test_short_run_stays_visible() {
        let entries = with_tail(repeated(6, "spam"), "done");
        let seq = DisplaySequence::build(&entries, &DedupConfig::default());
        assert_eq!(seq.len(), 7);
        assert!(seq.marker_ids().is_empty());
        let duplicates = seq.items().iter().filter(|i| i.is_duplicate()).count();
        assert_eq!(duplicates, 5);
        assert!(seq.items().iter().all(|i| !i.is_hidden()));
    }

    #[test]
    fn test_run_of_exactly_threshold_collapses() {
        let entries = repeated(11, "spam");
        let seq = DisplaySequence::build(&entries, &DedupConfig::default());
        assert_eq!(seq.marker_ids(), vec![1]);
        assert_eq!(seq.get(1).and_then(|m| m.run()).map(|r| r.run_len()), Some(10));
    }

    #[test]
    fn test_ids_are_sequential() {
        let entries = with_tail(repeated(15, "spam"), "done");
        let seq = DisplaySequence::build(&entries, &DedupConfig::default());
        for (pos, item) in seq.items().iter().enumerate() {
            assert_eq!(item.id, pos);
        }
    }

    #[test]
    fn test_window_limits_lookback() {
        let config = DedupConfig {
            window: 2,
            collapse_threshold: 10,
        };
        let entries = vec![
            entry(1, "a"),
            entry(2, "b"),
            entry(3, "c"),
            entry(4, "a"),
            entry(5, "c"),
        ];
        let seq = DisplaySequence::build(&entries, &config);
        let flags: Vec<bool> = seq.items().iter().map(DisplayEntry::is_duplicate).collect();
        // "a" at 4 is three back, outside the window; "c" at 5 is two back.
        assert_eq!(flags, vec![false, false, false, false, true]);
    }

    #[test]
    fn test_key_includes_urgency_and_source() {
        let entries = vec![
            LogEntry::new(1, "INFO", "A", "t", "same"),
            LogEntry::new(2, "ERROR", "A", "t", "same"),
            LogEntry::new(3, "INFO", "B", "t", "same"),
            LogEntry::new(4, "INFO", "A", "other time", "same"),
        ];
        let seq = DisplaySequence::build(&entries, &DedupConfig::default());
        let flags: Vec<bool> = seq.items().iter().map(DisplayEntry::is_duplicate).collect();
        assert_eq!(flags, vec![false, false, false, true]);
    }

    #[test]
    fn test_alternating_lines_form_one_run() {
        let mut entries = vec![entry(1, "ping"), entry(2, "pong")];
        for i in 0..10 {
            entries.push(entry(3 + i, if i % 2 == 0 { "ping" } else { "pong" }));
        }
        let seq = DisplaySequence::build(&entries, &DedupConfig::default());
        assert_eq!(seq.marker_ids(), vec![2]);
        assert_eq!(seq.get(2).and_then(|m| m.run()).map(|r| r.members.clone()), Some(3..13));
    }

    #[test]
    fn test_show_then_hide_restores_state() {
        let entries = with_tail(repeated(12, "spam"), "done");
        let mut seq = DisplaySequence::build(&entries, &DedupConfig::default());
        let original = seq.clone();

        seq.show_duplicates(1).unwrap();
        assert!(matches!(seq.items()[1].kind, DisplayKind::HideDuplicates(_)));
        assert!(seq.items()[2..13].iter().all(|i| !i.is_hidden()));
        assert!(seq.items()[2..13].iter().all(|i| i.is_duplicate()));

        seq.show_duplicates(1).unwrap();
        seq.hide_duplicates(1).unwrap();
        assert_eq!(seq, original);
    }

    #[test]
    fn test_hide_then_show_restores_expanded_state() {
        let entries = with_tail(repeated(12, "spam"), "done");
        let mut seq = DisplaySequence::build(&entries, &DedupConfig::default());
        seq.show_duplicates(1).unwrap();
        let expanded = seq.clone();

        seq.hide_duplicates(1).unwrap();
        assert!(matches!(seq.items()[1].kind, DisplayKind::ShowDuplicates(_)));
        assert!(seq.items()[2..13].iter().all(|i| i.is_hidden()));

        seq.hide_duplicates(1).unwrap();
        seq.show_duplicates(1).unwrap();
        assert_eq!(seq, expanded);
    }

    #[test]
    fn test_toggle_flips_mode() {
        let entries = repeated(12, "spam");
        let mut seq = DisplaySequence::build(&entries, &DedupConfig::default());
        assert_eq!(seq.toggle(1), Ok(true));
        assert_eq!(seq.toggle(1), Ok(false));
        assert!(seq.items()[2].is_hidden());
    }

    #[test]
    fn test_toggle_only_touches_its_run() {
        let mut entries = repeated(12, "first");
        entries.extend((0..12).map(|i| entry(13 + i, "second")));
        let mut seq = DisplaySequence::build(&entries, &DedupConfig::default());
        let markers = seq.marker_ids();
        assert_eq!(markers.len(), 2);

        seq.show_duplicates(markers[0]).unwrap();
        let second = seq.get(markers[1]).and_then(|m| m.run()).unwrap().clone();
        assert!(seq.items()[second.members].iter().all(|i| i.is_hidden()));
    }

    #[test]
    fn test_expand_and_collapse_all() {
        let mut entries = repeated(12, "first");
        entries.extend((0..12).map(|i| entry(13 + i, "second")));
        let mut seq = DisplaySequence::build(&entries, &DedupConfig::default());
        seq.expand_all();
        assert!(seq.items().iter().all(|i| !i.is_hidden()));
        seq.collapse_all();
        assert_eq!(seq.items().iter().filter(|i| i.is_hidden()).count(), 22);
    }

    #[test]
    fn test_toggle_rejects_bad_ids() {
        let entries = repeated(12, "spam");
        let mut seq = DisplaySequence::build(&entries, &DedupConfig::default());
        assert_eq!(seq.show_duplicates(0), Err(ViewError::NotARunMarker { id: 0 }));
        assert_eq!(
            seq.hide_duplicates(99),
            Err(ViewError::UnknownId { id: 99, len: 13 })
        );
    }

    #[test]
    fn test_empty_input() {
        let seq = DisplaySequence::build(&[], &DedupConfig::default());
        assert!(seq.is_empty());
    }
}
