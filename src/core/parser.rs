// bs-logviewer - core/parser.rs
//
// Line parsing into structured entries.
// Core layer: accepts a fully materialised text blob, never touches the
// filesystem.

use crate::core::model::LogEntry;
use crate::util::constants::UNKNOWN_FIELD;
use regex::Regex;
use std::sync::OnceLock;

/// `[URGENCY @ TIME | SOURCE] MESSAGE`, matched anywhere in the line.
///
/// CRLF mode keeps `.` from consuming a trailing `\r`, so Windows line
/// endings stay out of the captured message.
fn line_pattern() -> &'static Regex {
    static LINE: OnceLock<Regex> = OnceLock::new();
    LINE.get_or_init(|| {
        Regex::new(r"(?R)\[(.*?) @ (.*?) \| (.*?)\] (.*)").expect("line pattern: invalid regex")
    })
}

/// Parse one raw line into an entry.
///
/// Never fails: a line that does not match the bracket shape becomes an
/// entry whose urgency, source and time are `UNKNOWN` and whose message is
/// the whole line verbatim.
pub fn parse_line(line_number: u64, line: &str) -> LogEntry {
    match line_pattern().captures(line) {
        Some(caps) => {
            let field = |i: usize| caps.get(i).map_or("", |m| m.as_str());
            LogEntry::new(line_number, field(1), field(3), field(2), field(4))
        }
        None => LogEntry::new(line_number, UNKNOWN_FIELD, UNKNOWN_FIELD, UNKNOWN_FIELD, line),
    }
}

/// Parse a whole log into entries, one per `\n`-separated line.
///
/// Lines are not trimmed; trimming the overall text is the caller's job.
/// N lines always produce N entries numbered 1..=N, so an empty input
/// yields a single empty, unparsed entry.
pub fn parse_log(content: &str) -> Vec<LogEntry> {
    let entries: Vec<LogEntry> = content
        .split('\n')
        .enumerate()
        .map(|(idx, line)| parse_line(idx as u64 + 1, line))
        .collect();

    tracing::debug!(
        entries = entries.len(),
        unparsed = entries
            .iter()
            .filter(|e| e.source() == UNKNOWN_FIELD && e.urgency() == UNKNOWN_FIELD)
            .count(),
        "Parsing complete"
    );

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed_line() {
        let entry = parse_line(
            1,
            "[INFO @ 12:00:01 | IPA/Loader] Loading plugins from Plugins",
        );
        assert_eq!(entry.line_number(), 1);
        assert_eq!(entry.urgency(), "INFO");
        assert_eq!(entry.time(), "12:00:01");
        assert_eq!(entry.source(), "IPA/Loader");
        assert_eq!(entry.message(), "Loading plugins from Plugins");
        assert_eq!(entry.lower_message(), "loading plugins from plugins");
    }

    #[test]
    fn test_parse_unmatched_line_uses_sentinel() {
        let raw = "   at System.Reflection.MonoMethod.Invoke (System.Object obj)";
        let entry = parse_line(5, raw);
        assert_eq!(entry.urgency(), UNKNOWN_FIELD);
        assert_eq!(entry.source(), UNKNOWN_FIELD);
        assert_eq!(entry.time(), UNKNOWN_FIELD);
        assert_eq!(entry.message(), raw);
    }

    #[test]
    fn test_parse_captures_are_non_greedy() {
        let entry = parse_line(1, "[WARNING @ 10:00 | Core] got [x @ y | z] inside");
        assert_eq!(entry.urgency(), "WARNING");
        assert_eq!(entry.source(), "Core");
        assert_eq!(entry.message(), "got [x @ y | z] inside");
    }

    #[test]
    fn test_parse_match_not_anchored_to_line_start() {
        let entry = parse_line(1, "junk [DEBUG @ 1 | Src] msg");
        assert_eq!(entry.urgency(), "DEBUG");
        assert_eq!(entry.message(), "msg");
    }

    #[test]
    fn test_parse_empty_message_after_space() {
        let entry = parse_line(1, "[INFO @ 1 | Src] ");
        assert_eq!(entry.source(), "Src");
        assert_eq!(entry.message(), "");
    }

    #[test]
    fn test_parse_crlf_not_in_message() {
        let entry = parse_line(1, "[INFO @ 1 | Src] hello\r");
        assert_eq!(entry.message(), "hello");
    }

    #[test]
    fn test_parse_log_preserves_line_count_and_order() {
        let text = "[INFO @ 1 | A] one\nnot a log line\n\n[ERROR @ 2 | B] two";
        let entries = parse_log(text);
        assert_eq!(entries.len(), 4);
        let numbers: Vec<u64> = entries.iter().map(LogEntry::line_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        assert_eq!(entries[1].message(), "not a log line");
        assert_eq!(entries[2].message(), "");
        assert_eq!(entries[3].source(), "B");
    }

    #[test]
    fn test_parse_log_empty_input_yields_one_entry() {
        let entries = parse_log("");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].urgency(), UNKNOWN_FIELD);
    }

    #[test]
    fn test_parse_log_does_not_trim_lines() {
        let entries = parse_log("  padded  ");
        assert_eq!(entries[0].message(), "  padded  ");
    }
}
