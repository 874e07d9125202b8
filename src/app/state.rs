// bs-logviewer - app/state.rs
//
// Application state management. Holds the parsed log, both filters, the
// duplicate-collapsed display sequence, the analysis and the current page.
// Every mutation keeps the derived visible-row list in sync.

use crate::core::analysis::analyze;
use crate::core::dedup::DisplaySequence;
use crate::core::filter::{FilterRule, MessageFilter, SourceFilter};
use crate::core::model::{Analysis, LogEntry};
use crate::core::parser::parse_log;
use crate::core::view::{visible_items, Pager};
use crate::platform::config::AppConfig;
use crate::util::error::ViewError;

/// Top-level application state.
#[derive(Debug)]
pub struct AppState {
    /// Validated configuration in effect.
    config: AppConfig,

    /// All parsed log entries, in file order.
    entries: Vec<LogEntry>,

    /// Per (source, urgency) visibility toggles.
    source_filter: SourceFilter,

    /// Case-insensitive message search.
    message_filter: MessageFilter,

    /// Entries interleaved with duplicate-run markers.
    display: DisplaySequence,

    /// Display ids currently visible (recomputed on every change).
    visible: Vec<usize>,

    /// General info and mod list extracted from the log.
    analysis: Analysis,

    /// Current 1-based page (0 when there is nothing to show).
    page: usize,
}

impl AppState {
    /// Create empty state.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            entries: Vec::new(),
            source_filter: SourceFilter::new(),
            message_filter: MessageFilter::default(),
            display: DisplaySequence::default(),
            visible: Vec::new(),
            analysis: Analysis::default(),
            page: 0,
        }
    }

    /// Replace the loaded log with `content`.
    ///
    /// Resets the source filter to every seen pair enabled and the page to
    /// the first one. The message search is kept.
    pub fn load_text(&mut self, content: &str) {
        self.entries = parse_log(content.trim_end());
        self.source_filter = SourceFilter::from_entries(&self.entries);
        self.display = DisplaySequence::build(&self.entries, &self.config.dedup);
        self.analysis = analyze(&self.entries);
        self.page = 1;
        self.refresh();

        tracing::info!(
            entries = self.entries.len(),
            display_items = self.display.len(),
            sources = self.source_filter.sources().len(),
            mods = self.analysis.mods.len(),
            "Log loaded"
        );
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn source_filter(&self) -> &SourceFilter {
        &self.source_filter
    }

    pub fn message_filter(&self) -> &MessageFilter {
        &self.message_filter
    }

    pub fn display(&self) -> &DisplaySequence {
        &self.display
    }

    pub fn analysis(&self) -> &Analysis {
        &self.analysis
    }

    /// Display ids passing the current filters and collapse state.
    pub fn visible(&self) -> &[usize] {
        &self.visible
    }

    // -------------------------------------------------------------------------
    // Filters
    // -------------------------------------------------------------------------

    /// Replace the source filter wholesale.
    pub fn set_source_filter(&mut self, filter: SourceFilter) {
        self.source_filter = filter;
        self.refresh();
    }

    /// Enable or disable the pairs selected by `rule`.
    pub fn apply_rule(&mut self, rule: &FilterRule, value: bool) {
        self.source_filter = self.source_filter.with_rule(rule, value);
        tracing::debug!(?rule, value, "Filter rule applied");
        self.refresh();
    }

    /// Replace the message search string.
    pub fn set_search(&mut self, search: &str) {
        self.message_filter = MessageFilter::new(search);
        self.refresh();
    }

    // -------------------------------------------------------------------------
    // Duplicate runs
    // -------------------------------------------------------------------------

    pub fn show_duplicates(&mut self, id: usize) -> Result<(), ViewError> {
        self.display.show_duplicates(id)?;
        self.refresh();
        Ok(())
    }

    pub fn hide_duplicates(&mut self, id: usize) -> Result<(), ViewError> {
        self.display.hide_duplicates(id)?;
        self.refresh();
        Ok(())
    }

    /// Flip a run marker. Returns `true` when the run is now shown.
    pub fn toggle_run(&mut self, id: usize) -> Result<bool, ViewError> {
        let shown = self.display.toggle(id)?;
        self.refresh();
        Ok(shown)
    }

    pub fn expand_all(&mut self) {
        self.display.expand_all();
        self.refresh();
    }

    pub fn collapse_all(&mut self) {
        self.display.collapse_all();
        self.refresh();
    }

    // -------------------------------------------------------------------------
    // Paging
    // -------------------------------------------------------------------------

    fn pager(&self) -> Pager {
        Pager::new(self.config.rows_per_page)
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        self.pager().page_count(self.visible.len())
    }

    /// Move to the 1-based `page`, clamped into range. Returns the page
    /// actually selected.
    pub fn set_page(&mut self, page: usize) -> usize {
        self.page = self.pager().clamp_page(page, self.visible.len());
        self.page
    }

    /// Display ids on the current page.
    pub fn current_page_rows(&self) -> &[usize] {
        self.pager().page(&self.visible, self.page)
    }

    /// Recompute visible rows and keep the page in range.
    fn refresh(&mut self) {
        self.visible = visible_items(
            &self.display,
            &self.entries,
            &self.source_filter,
            &self.message_filter,
        );
        self.page = self.pager().clamp_page(self.page.max(1), self.visible.len());
        tracing::trace!(
            visible = self.visible.len(),
            page = self.page,
            "Visible rows recomputed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_text() -> String {
        let mut text = String::from(
            "[INFO @ 00:00:01 | IPA] Game version 1.29.1\n\
             [INFO @ 00:00:02 | IPA] SongCore (SongCore): 3.10.0\n",
        );
        for _ in 0..12 {
            text.push_str("[WARNING @ 00:00:03 | HMUI] Missing sprite\n");
        }
        text.push_str("[ERROR @ 00:00:04 | BSML] Failed to parse view\n\n\n");
        text
    }

    fn loaded() -> AppState {
        let mut state = AppState::new(AppConfig::default());
        state.load_text(&sample_text());
        state
    }

    #[test]
    fn test_load_trims_trailing_blank_lines() {
        let state = loaded();
        assert_eq!(state.entries().len(), 15);
        assert_eq!(state.entries().last().unwrap().source(), "BSML");
    }

    #[test]
    fn test_load_builds_all_views() {
        let state = loaded();
        assert!(state.source_filter().is_enabled("HMUI", "WARNING"));
        assert_eq!(state.display().marker_ids(), vec![3]);
        assert_eq!(state.analysis().mods.len(), 1);
        // 2 entries + first warning + marker + error
        assert_eq!(state.visible().len(), 5);
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn test_toggle_run_reveals_duplicates() {
        let mut state = loaded();
        assert!(state.toggle_run(3).unwrap());
        assert_eq!(state.visible().len(), 16);
        assert!(!state.toggle_run(3).unwrap());
        assert_eq!(state.visible().len(), 5);
    }

    #[test]
    fn test_toggle_non_marker_is_error() {
        let mut state = loaded();
        assert_eq!(
            state.toggle_run(0),
            Err(ViewError::NotARunMarker { id: 0 })
        );
    }

    #[test]
    fn test_rule_and_search_narrow_visible_rows() {
        let mut state = loaded();
        state.apply_rule(&"HMUI".parse().unwrap(), false);
        // marker stays visible even when its entries are filtered out
        assert_eq!(state.visible().len(), 4);

        state.set_search("songcore");
        assert_eq!(state.visible().len(), 2);

        state.set_search("");
        state.set_source_filter(state.source_filter().with_all(true));
        assert_eq!(state.visible().len(), 5);
    }

    #[test]
    fn test_paging_clamps() {
        let config = AppConfig {
            rows_per_page: 10,
            ..AppConfig::default()
        };
        let mut state = AppState::new(config);
        state.load_text(&sample_text());
        state.expand_all();
        assert_eq!(state.page_count(), 2);
        assert_eq!(state.set_page(9), 2);
        assert_eq!(state.current_page_rows().len(), 6);
        assert_eq!(state.set_page(0), 1);
        assert_eq!(state.current_page_rows().len(), 10);
    }

    #[test]
    fn test_empty_state_has_no_pages() {
        let mut state = AppState::new(AppConfig::default());
        assert!(state.visible().is_empty());
        assert_eq!(state.page_count(), 0);
        assert!(state.current_page_rows().is_empty());

        // An empty file is still one (empty, unparsed) line.
        state.load_text("");
        assert_eq!(state.entries().len(), 1);
        assert_eq!(state.page(), 1);
    }
}
