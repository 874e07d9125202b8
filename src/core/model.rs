// bs-logviewer - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// platform dependencies.
//
// These types are the shared vocabulary across all layers.

use serde::Serialize;
use std::ops::Range;

// =============================================================================
// Log Entry (output of parsing)
// =============================================================================

/// A single parsed log line.
///
/// Entries are created once by the parser and never mutated afterwards, so
/// the fields are private and exposed through accessors. This keeps
/// `lower_message` in lockstep with `message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    /// 1-based position in the source text. Unparseable lines keep their
    /// slot so numbering stays aligned with the file.
    pub(crate) line_number: u64,

    /// Severity label as written in the log (e.g. "INFO", "Warning").
    pub(crate) urgency: String,

    /// Subsystem that emitted the line (e.g. "IPA/Loader").
    pub(crate) source: String,

    /// Raw timestamp text. Opaque; never parsed.
    pub(crate) time: String,

    /// Text after the metadata bracket, or the whole line if unparsed.
    pub(crate) message: String,

    /// `message.to_lowercase()`, computed eagerly because every filter
    /// evaluation reads it.
    #[serde(skip)]
    pub(crate) lower_message: String,
}

impl LogEntry {
    /// Build an entry from already-split fields.
    pub fn new(
        line_number: u64,
        urgency: impl Into<String>,
        source: impl Into<String>,
        time: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let message = message.into();
        let lower_message = message.to_lowercase();
        Self {
            line_number,
            urgency: urgency.into(),
            source: source.into(),
            time: time.into(),
            message,
            lower_message,
        }
    }

    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    pub fn urgency(&self) -> &str {
        &self.urgency
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn time(&self) -> &str {
        &self.time
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn lower_message(&self) -> &str {
        &self.lower_message
    }

    /// The (urgency, source, message) triple that identifies repeated lines.
    pub fn dedup_key(&self) -> DedupKey<'_> {
        DedupKey {
            urgency: &self.urgency,
            source: &self.source,
            message: &self.message,
        }
    }
}

/// Exact-match identity used by the duplicate-run detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DedupKey<'a> {
    pub urgency: &'a str,
    pub source: &'a str,
    pub message: &'a str,
}

// =============================================================================
// Display sequence items
// =============================================================================

/// One row of the display sequence produced by the duplicate-run detector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayEntry {
    /// Position in the display sequence, stamped after the detection pass.
    /// Stable key for show/hide requests.
    pub id: usize,

    pub kind: DisplayKind,
}

/// What a display row stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayKind {
    /// A real log line.
    Entry {
        /// Index into the parsed entry slice.
        index: usize,
        /// Repeats a key seen within the deduplication window.
        duplicate: bool,
        /// Suppressed by a collapsed run.
        hidden: bool,
    },

    /// Marker in front of a collapsed run; activating it reveals the run.
    ShowDuplicates(DuplicateRun),

    /// Marker in front of an expanded run; activating it hides the run again.
    HideDuplicates(DuplicateRun),
}

/// Position bookkeeping for a collapsible run of duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateRun {
    /// Display position of the marker itself.
    pub position: usize,

    /// Display positions of the run members (end exclusive).
    pub members: Range<usize>,
}

impl DuplicateRun {
    /// Number of entries in the run.
    pub fn run_len(&self) -> usize {
        self.members.len()
    }
}

impl DisplayEntry {
    /// True for run markers, which are visible regardless of filter state.
    pub fn is_marker(&self) -> bool {
        !matches!(self.kind, DisplayKind::Entry { .. })
    }

    /// Index into the entry slice for real entries.
    pub fn entry_index(&self) -> Option<usize> {
        match self.kind {
            DisplayKind::Entry { index, .. } => Some(index),
            _ => None,
        }
    }

    pub fn is_hidden(&self) -> bool {
        matches!(self.kind, DisplayKind::Entry { hidden: true, .. })
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self.kind, DisplayKind::Entry { duplicate: true, .. })
    }

    /// Run bookkeeping for markers.
    pub fn run(&self) -> Option<&DuplicateRun> {
        match &self.kind {
            DisplayKind::ShowDuplicates(run) | DisplayKind::HideDuplicates(run) => Some(run),
            DisplayKind::Entry { .. } => None,
        }
    }
}

// =============================================================================
// Analysis output
// =============================================================================

/// Facts mined from recognised messages. Every field is optional because
/// the log may simply never mention it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GeneralInfo {
    /// "Steam" or "Oculus".
    pub platform: Option<String>,

    /// Player display string, "Name (Id)", or the no-info sentinel.
    pub user: Option<String>,

    /// Game version announced by the mod manager.
    pub game_version: Option<String>,
}

/// One installed mod.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModInfo {
    pub mod_name: String,

    /// Unique among mods.
    pub mod_internal_name: String,

    pub mod_version: String,

    /// Game version the mod was built for, when the loader warned about a
    /// mismatch. `None` means built for the running version.
    pub game_version: Option<String>,
}

/// Complete result of one analysis pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Analysis {
    pub general: GeneralInfo,

    /// Sorted by display name.
    pub mods: Vec<ModInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lower_message_computed_at_construction() {
        let entry = LogEntry::new(1, "INFO", "Core", "00:00", "Fatal ERROR Occurred");
        assert_eq!(entry.lower_message(), "fatal error occurred");
        assert_eq!(entry.message(), "Fatal ERROR Occurred");
    }

    #[test]
    fn test_dedup_key_ignores_line_and_time() {
        let a = LogEntry::new(1, "INFO", "Core", "00:00", "tick");
        let b = LogEntry::new(7, "INFO", "Core", "12:34", "tick");
        let c = LogEntry::new(8, "WARNING", "Core", "12:34", "tick");
        assert_eq!(a.dedup_key(), b.dedup_key());
        assert_ne!(a.dedup_key(), c.dedup_key());
    }

    #[test]
    fn test_display_entry_accessors() {
        let entry = DisplayEntry {
            id: 0,
            kind: DisplayKind::Entry {
                index: 3,
                duplicate: true,
                hidden: true,
            },
        };
        assert_eq!(entry.entry_index(), Some(3));
        assert!(entry.is_hidden() && entry.is_duplicate() && !entry.is_marker());

        let marker = DisplayEntry {
            id: 1,
            kind: DisplayKind::ShowDuplicates(DuplicateRun {
                position: 1,
                members: 2..14,
            }),
        };
        assert!(marker.is_marker());
        assert_eq!(marker.run().map(DuplicateRun::run_len), Some(12));
        assert_eq!(marker.entry_index(), None);
    }
}
