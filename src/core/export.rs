// bs-logviewer - core/export.rs
//
// Text, CSV and JSON rendering of the visible rows and of the analysis.
// Core layer: writes to any Write trait object.

use crate::core::dedup::DisplaySequence;
use crate::core::model::{Analysis, DisplayEntry, DisplayKind, LogEntry};
use crate::util::error::ExportError;
use serde::Serialize;
use std::io::Write;

/// Flattened view of a visible log entry for CSV/JSON output.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    line: u64,
    time: &'a str,
    source: &'a str,
    urgency: &'a str,
    duplicate: bool,
    message: &'a str,
}

impl<'a> ExportRow<'a> {
    fn new(entry: &'a LogEntry, duplicate: bool) -> Self {
        Self {
            line: entry.line_number(),
            time: entry.time(),
            source: entry.source(),
            urgency: entry.urgency(),
            duplicate,
            message: entry.message(),
        }
    }
}

/// Resolve display ids to items, dropping ids that do not exist.
fn resolve<'a>(
    display: &'a DisplaySequence,
    rows: &'a [usize],
) -> impl Iterator<Item = &'a DisplayEntry> {
    rows.iter().filter_map(move |&id| display.get(id))
}

/// Visible real entries among `rows`, markers skipped.
fn entry_rows<'a>(
    display: &'a DisplaySequence,
    entries: &'a [LogEntry],
    rows: &'a [usize],
) -> impl Iterator<Item = ExportRow<'a>> {
    resolve(display, rows).filter_map(move |item| match item.kind {
        DisplayKind::Entry {
            index, duplicate, ..
        } => entries.get(index).map(|entry| ExportRow::new(entry, duplicate)),
        _ => None,
    })
}

/// Render rows as aligned plain text, one line per row.
///
/// Duplicate entries are prefixed with `~`. Run markers print as a
/// separator line with the run length and its state.
pub fn render_text<W: Write>(
    display: &DisplaySequence,
    entries: &[LogEntry],
    rows: &[usize],
    mut writer: W,
    target: &str,
) -> Result<usize, ExportError> {
    let io_err = |source| ExportError::Io {
        target: target.to_string(),
        source,
    };

    let mut count = 0;
    for item in resolve(display, rows) {
        match &item.kind {
            DisplayKind::Entry {
                index, duplicate, ..
            } => {
                let Some(entry) = entries.get(*index) else {
                    continue;
                };
                writeln!(
                    writer,
                    "{}{:>6} {} [{}] {:<8} {}",
                    if *duplicate { "~" } else { " " },
                    entry.line_number(),
                    entry.time(),
                    entry.source(),
                    entry.urgency(),
                    entry.message()
                )
                .map_err(io_err)?;
            }
            DisplayKind::ShowDuplicates(run) => {
                writeln!(writer, "--- {} duplicated entries (hidden) ---", run.run_len())
                    .map_err(io_err)?;
            }
            DisplayKind::HideDuplicates(run) => {
                writeln!(writer, "--- {} duplicated entries (shown) ---", run.run_len())
                    .map_err(io_err)?;
            }
        }
        count += 1;
    }
    writer.flush().map_err(io_err)?;
    Ok(count)
}

/// Export visible entries to CSV.
///
/// Writes: line, time, source, urgency, duplicate, message
pub fn export_csv<W: Write>(
    display: &DisplaySequence,
    entries: &[LogEntry],
    rows: &[usize],
    writer: W,
    target: &str,
) -> Result<usize, ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let csv_err = |source| ExportError::Csv {
        target: target.to_string(),
        source,
    };

    let mut count = 0;
    for row in entry_rows(display, entries, rows) {
        csv_writer.serialize(&row).map_err(csv_err)?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        target: target.to_string(),
        source: e,
    })?;

    Ok(count)
}

/// Export visible entries to JSON (array of objects).
pub fn export_json<W: Write>(
    display: &DisplaySequence,
    entries: &[LogEntry],
    rows: &[usize],
    writer: W,
    target: &str,
) -> Result<usize, ExportError> {
    let records: Vec<ExportRow<'_>> = entry_rows(display, entries, rows).collect();
    serde_json::to_writer_pretty(writer, &records).map_err(|e| ExportError::Json {
        target: target.to_string(),
        source: e,
    })?;
    Ok(records.len())
}

/// Write the analysis as a JSON object `{ general, mods }`.
pub fn export_analysis_json<W: Write>(
    analysis: &Analysis,
    writer: W,
    target: &str,
) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(writer, analysis).map_err(|e| ExportError::Json {
        target: target.to_string(),
        source: e,
    })
}

/// Write the analysis as a short human-readable report.
pub fn render_analysis_text<W: Write>(
    analysis: &Analysis,
    mut writer: W,
    target: &str,
) -> Result<(), ExportError> {
    let io_err = |source| ExportError::Io {
        target: target.to_string(),
        source,
    };

    let general = &analysis.general;
    writeln!(writer, "General").map_err(io_err)?;
    for (label, value) in [
        ("Player", &general.user),
        ("Platform", &general.platform),
        ("Game Version", &general.game_version),
    ] {
        if let Some(value) = value {
            writeln!(writer, "  {label:<13} {value}").map_err(io_err)?;
        }
    }

    writeln!(writer, "Mods ({})", analysis.mods.len()).map_err(io_err)?;
    for info in &analysis.mods {
        writeln!(
            writer,
            "  {:<40} {:<12} {}",
            info.mod_name,
            info.mod_version,
            info.game_version.as_deref().unwrap_or("latest")
        )
        .map_err(io_err)?;
    }
    writer.flush().map_err(io_err)
}
