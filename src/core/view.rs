// bs-logviewer - core/view.rs
//
// Derives the visible rows from the display sequence and the two filters,
// and slices them into pages.
// Core layer: pure logic, returns indices so nothing is copied.

use crate::core::dedup::DisplaySequence;
use crate::core::filter::{fits_filter, MessageFilter, SourceFilter};
use crate::core::model::{DisplayKind, LogEntry};

/// Ids of display items that should be rendered.
///
/// Run markers are always visible. Real entries are visible when they are
/// not hidden by a collapsed run and pass both filters.
pub fn visible_items(
    display: &DisplaySequence,
    entries: &[LogEntry],
    source_filter: &SourceFilter,
    message_filter: &MessageFilter,
) -> Vec<usize> {
    display
        .items()
        .iter()
        .filter(|item| match item.kind {
            DisplayKind::Entry { index, hidden, .. } => {
                !hidden
                    && entries
                        .get(index)
                        .is_some_and(|entry| fits_filter(entry, source_filter, message_filter))
            }
            DisplayKind::ShowDuplicates(_) | DisplayKind::HideDuplicates(_) => true,
        })
        .map(|item| item.id)
        .collect()
}

/// Fixed-size page slicing over a row list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    rows_per_page: usize,
}

impl Pager {
    /// `rows_per_page` of zero is treated as one.
    pub fn new(rows_per_page: usize) -> Self {
        Self {
            rows_per_page: rows_per_page.max(1),
        }
    }

    /// Number of pages needed for `rows` rows. Zero rows need zero pages.
    pub fn page_count(&self, rows: usize) -> usize {
        rows.div_ceil(self.rows_per_page)
    }

    /// Clamp a 1-based page request into range. Returns 0 when there are
    /// no pages at all.
    pub fn clamp_page(&self, page: usize, rows: usize) -> usize {
        match self.page_count(rows) {
            0 => 0,
            pages => page.clamp(1, pages),
        }
    }

    /// Rows on the (clamped) 1-based `page`.
    pub fn page<'a, T>(&self, rows: &'a [T], page: usize) -> &'a [T] {
        let page = self.clamp_page(page, rows.len());
        if page == 0 {
            return &[];
        }
        let start = (page - 1) * self.rows_per_page;
        let end = (start + self.rows_per_page).min(rows.len());
        &rows[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dedup::DedupConfig;
    use crate::core::parser::parse_log;

    fn spammy_log() -> Vec<LogEntry> {
        let mut text = String::from("[INFO @ 0 | Core] start\n");
        for i in 0..12 {
            text.push_str(&format!("[DEBUG @ {i} | Net] heartbeat\n"));
        }
        text.push_str("[ERROR @ 99 | Core] Fatal ERROR occurred");
        parse_log(&text)
    }

    #[test]
    fn test_collapsed_run_hidden_marker_visible() {
        let entries = spammy_log();
        let display = DisplaySequence::build(&entries, &DedupConfig::default());
        let filter = SourceFilter::from_entries(&entries);
        let visible = visible_items(&display, &entries, &filter, &MessageFilter::default());
        // start, first heartbeat, marker, error
        assert_eq!(visible, vec![0, 1, 2, 14]);
    }

    #[test]
    fn test_expanded_run_respects_filters() {
        let entries = spammy_log();
        let mut display = DisplaySequence::build(&entries, &DedupConfig::default());
        display.show_duplicates(2).unwrap();
        let filter = SourceFilter::from_entries(&entries);

        let all = visible_items(&display, &entries, &filter, &MessageFilter::default());
        assert_eq!(all.len(), 15);

        let no_debug = filter.with_urgency("DEBUG", false);
        let visible = visible_items(&display, &entries, &no_debug, &MessageFilter::default());
        assert_eq!(visible, vec![0, 2, 14], "marker stays even when its run is filtered out");
    }

    #[test]
    fn test_message_filter_applies() {
        let entries = spammy_log();
        let display = DisplaySequence::build(&entries, &DedupConfig::default());
        let filter = SourceFilter::from_entries(&entries);
        let visible = visible_items(&display, &entries, &filter, &MessageFilter::new("error"));
        assert_eq!(visible, vec![2, 14]);
    }

    #[test]
    fn test_pager_counts_and_clamps() {
        let pager = Pager::new(200);
        assert_eq!(pager.page_count(0), 0);
        assert_eq!(pager.page_count(200), 1);
        assert_eq!(pager.page_count(201), 2);
        assert_eq!(pager.clamp_page(9, 201), 2);
        assert_eq!(pager.clamp_page(0, 201), 1);
        assert_eq!(pager.clamp_page(3, 0), 0);
    }

    #[test]
    fn test_pager_slices() {
        let rows: Vec<usize> = (0..25).collect();
        let pager = Pager::new(10);
        assert_eq!(pager.page(&rows, 1), &rows[0..10]);
        assert_eq!(pager.page(&rows, 3), &rows[20..25]);
        assert_eq!(pager.page(&rows, 7), &rows[20..25]);
        let empty: [usize; 0] = [];
        assert!(pager.page(&empty, 1).is_empty());
    }
}
