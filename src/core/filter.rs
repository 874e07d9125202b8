// bs-logviewer - core/filter.rs
//
// Source x urgency enable matrix and message substring filter.
// An entry is visible when both agree.
// Core layer: pure logic, no I/O or UI dependencies.
//
// SourceFilter values are treated as immutable snapshots: every `with_*`
// operation clones and returns a new filter, leaving the receiver intact for
// whoever still holds it.

use crate::core::analysis::locale_cmp;
use crate::core::model::LogEntry;
use crate::util::constants::URGENCY_ORDER;
use crate::util::error::FilterError;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;

// =============================================================================
// Source filter
// =============================================================================

/// Two-level `source -> urgency -> enabled` matrix.
///
/// Every pair observed in the loaded log has an explicit entry. A missing
/// pair means "never seen" and reads as disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFilter {
    enabled: BTreeMap<String, BTreeMap<String, bool>>,
}

/// Which registered pairs an aggregate query looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterScope<'a> {
    /// Every registered pair.
    All,
    /// One urgency across every source that registered it.
    Urgency(&'a str),
    /// Every urgency registered for one source.
    Source(&'a str),
}

impl SourceFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every (source, urgency) pair in `entries`, all enabled.
    pub fn from_entries(entries: &[LogEntry]) -> Self {
        let mut filter = Self::new();
        for entry in entries {
            filter.ensure_exists(entry.source(), entry.urgency());
        }
        tracing::debug!(
            sources = filter.enabled.len(),
            pairs = filter.pair_count(),
            "Source filter initialised"
        );
        filter
    }

    /// True only for a registered pair whose flag is set.
    pub fn is_enabled(&self, source: &str, urgency: &str) -> bool {
        match self.enabled.get(source).and_then(|inner| inner.get(urgency)) {
            Some(&value) => value,
            None => {
                tracing::trace!(source, urgency, "Lookup of unregistered filter pair");
                false
            }
        }
    }

    /// Register the pair as enabled unless it already has a value.
    pub fn ensure_exists(&mut self, source: &str, urgency: &str) {
        if !self.enabled.contains_key(source) {
            self.enabled.insert(source.to_string(), BTreeMap::new());
        }
        if let Some(inner) = self.enabled.get_mut(source) {
            if !inner.contains_key(urgency) {
                inner.insert(urgency.to_string(), true);
            }
        }
    }

    /// Register the pair if needed, then set its flag.
    ///
    /// Mutates in place; call it on a clone (or use [`Self::with_update`])
    /// when the current filter may still be shared.
    pub fn update(&mut self, source: &str, urgency: &str, value: bool) {
        self.ensure_exists(source, urgency);
        if let Some(flag) = self
            .enabled
            .get_mut(source)
            .and_then(|inner| inner.get_mut(urgency))
        {
            *flag = value;
        }
    }

    /// Number of registered pairs.
    pub fn pair_count(&self) -> usize {
        self.enabled.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }

    // -------------------------------------------------------------------------
    // Aggregate queries
    // -------------------------------------------------------------------------

    fn scoped_values<'a>(&'a self, scope: FilterScope<'a>) -> Box<dyn Iterator<Item = bool> + 'a> {
        match scope {
            FilterScope::All => Box::new(
                self.enabled
                    .values()
                    .flat_map(|inner| inner.values().copied()),
            ),
            FilterScope::Urgency(urgency) => Box::new(
                self.enabled
                    .values()
                    .filter_map(move |inner| inner.get(urgency).copied()),
            ),
            FilterScope::Source(source) => Box::new(
                self.enabled
                    .get(source)
                    .into_iter()
                    .flat_map(|inner| inner.values().copied()),
            ),
        }
    }

    /// True when every registered pair in scope has the same flag.
    /// Vacuously true for an empty scope.
    pub fn is_consistent(&self, scope: FilterScope<'_>) -> bool {
        let mut values = self.scoped_values(scope);
        match values.next() {
            Some(first) => values.all(|v| v == first),
            None => true,
        }
    }

    /// True when no registered pair in scope is disabled.
    /// Vacuously true for an empty scope.
    pub fn overall_value(&self, scope: FilterScope<'_>) -> bool {
        self.scoped_values(scope).all(|v| v)
    }

    // -------------------------------------------------------------------------
    // Ordered accessors
    // -------------------------------------------------------------------------

    /// Registered sources, sorted for display.
    pub fn sources(&self) -> Vec<&str> {
        let mut sources: Vec<&str> = self.enabled.keys().map(String::as_str).collect();
        sources.sort_by(|a, b| locale_cmp(a, b));
        sources
    }

    /// Distinct urgencies across all sources, least severe first.
    pub fn urgencies(&self) -> Vec<&str> {
        let mut urgencies: Vec<&str> = self
            .enabled
            .values()
            .flat_map(|inner| inner.keys().map(String::as_str))
            .collect();
        urgencies.sort_by(|a, b| urgency_cmp(a, b));
        urgencies.dedup();
        urgencies
    }

    /// Urgencies registered for `source` with their flags, least severe first.
    pub fn source_urgencies(&self, source: &str) -> Vec<(&str, bool)> {
        let mut pairs: Vec<(&str, bool)> = self
            .enabled
            .get(source)
            .map(|inner| inner.iter().map(|(u, &v)| (u.as_str(), v)).collect())
            .unwrap_or_default();
        pairs.sort_by(|a, b| urgency_cmp(a.0, b.0));
        pairs
    }

    // -------------------------------------------------------------------------
    // Copy-on-write updates
    // -------------------------------------------------------------------------

    /// Clone with one pair set.
    pub fn with_update(&self, source: &str, urgency: &str, value: bool) -> Self {
        let mut next = self.clone();
        next.update(source, urgency, value);
        next
    }

    /// Clone with every registered pair set.
    pub fn with_all(&self, value: bool) -> Self {
        let mut next = self.clone();
        for inner in next.enabled.values_mut() {
            inner.values_mut().for_each(|flag| *flag = value);
        }
        next
    }

    /// Clone with `urgency` set on every source that registered it.
    /// Sources that never logged this urgency are left untouched.
    pub fn with_urgency(&self, urgency: &str, value: bool) -> Self {
        let mut next = self.clone();
        for inner in next.enabled.values_mut() {
            if let Some(flag) = inner.get_mut(urgency) {
                *flag = value;
            }
        }
        next
    }

    /// Clone with every urgency of `source` set.
    pub fn with_source(&self, source: &str, value: bool) -> Self {
        let mut next = self.clone();
        if let Some(inner) = next.enabled.get_mut(source) {
            inner.values_mut().for_each(|flag| *flag = value);
        }
        next
    }

    /// Clone where exactly the urgencies of `source` listed in `enabled`
    /// are on and the rest of that source is off.
    pub fn with_source_selection(&self, source: &str, enabled: &[&str]) -> Self {
        let mut next = self.clone();
        if let Some(inner) = next.enabled.get_mut(source) {
            for (urgency, flag) in inner.iter_mut() {
                *flag = enabled.contains(&urgency.as_str());
            }
        }
        next
    }

    /// Clone with the pairs selected by `rule` set to `value`.
    pub fn with_rule(&self, rule: &FilterRule, value: bool) -> Self {
        match rule {
            FilterRule::Source(source) => self.with_source(source, value),
            FilterRule::Urgency(urgency) => self.with_urgency(urgency, value),
            FilterRule::Pair { source, urgency } => self.with_update(source, urgency, value),
        }
    }
}

/// Position of `urgency` in the canonical severity order, case-insensitive.
pub fn urgency_rank(urgency: &str) -> Option<usize> {
    let lower = urgency.to_lowercase();
    URGENCY_ORDER.iter().position(|known| *known == lower)
}

/// Ranked urgencies by severity, then unranked ones alphabetically.
pub fn urgency_cmp(a: &str, b: &str) -> Ordering {
    match (urgency_rank(a), urgency_rank(b)) {
        (Some(ra), Some(rb)) => ra.cmp(&rb).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => locale_cmp(a, b),
    }
}

// =============================================================================
// Filter rules (textual pair selectors)
// =============================================================================

/// A textual selector over filter pairs: `SOURCE`, `SOURCE:URGENCY` or
/// `:URGENCY`. The last `:` separates source from urgency, so sources may
/// themselves contain colons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterRule {
    Source(String),
    Urgency(String),
    Pair { source: String, urgency: String },
}

impl FromStr for FilterRule {
    type Err = FilterError;

    fn from_str(rule: &str) -> Result<Self, Self::Err> {
        let (source, urgency) = match rule.rsplit_once(':') {
            Some((source, urgency)) => (source, urgency),
            None => (rule, ""),
        };
        match (source.is_empty(), urgency.is_empty()) {
            (true, true) => Err(FilterError::EmptyRule {
                rule: rule.to_string(),
            }),
            (true, false) => Ok(Self::Urgency(urgency.to_string())),
            (false, true) => Ok(Self::Source(source.to_string())),
            (false, false) => Ok(Self::Pair {
                source: source.to_string(),
                urgency: urgency.to_string(),
            }),
        }
    }
}

// =============================================================================
// Message filter
// =============================================================================

/// Case-insensitive substring search. Replaced wholesale on every change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageFilter {
    search: String,
    substring: String,
}

impl MessageFilter {
    pub fn new(search: impl Into<String>) -> Self {
        let search = search.into();
        let substring = search.to_lowercase();
        Self { search, substring }
    }

    /// The text as the user typed it.
    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_empty()
    }

    /// Empty search matches everything.
    pub fn matches(&self, entry: &LogEntry) -> bool {
        entry.lower_message().contains(&self.substring)
    }
}

/// Visibility of an entry under both filters.
pub fn fits_filter(
    entry: &LogEntry,
    source_filter: &SourceFilter,
    message_filter: &MessageFilter,
) -> bool {
    source_filter.is_enabled(entry.source(), entry.urgency()) && message_filter.matches(entry)
}
