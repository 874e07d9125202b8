// bs-logviewer - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Logging initialisation (debug mode support)
// 3. config.toml loading
// 4. Log intake, filtering and rendering to stdout

use bs_logviewer::app::state::AppState;
use bs_logviewer::core::analysis::{sort_mods, ModSortColumn, SortDirection};
use bs_logviewer::core::export;
use bs_logviewer::core::filter::FilterRule;
use bs_logviewer::platform;
use bs_logviewer::util;
use bs_logviewer::util::error::{AppError, Result};

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output encoding for the rendered rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Csv,
    Json,
}

/// Mod list ordering for `--analysis`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SortKey {
    Name,
    GameVersion,
}

/// BS LogViewer - Beat Saber log viewer and analyser.
///
/// Parses a Beat Saber log (plain or .gz), collapses repeated lines, and
/// prints one page of the filtered result, or the extracted game and mod
/// information with --analysis.
#[derive(Parser, Debug)]
#[command(name = "bs-logviewer", version, about)]
struct Cli {
    /// Log file to open (_latest.log, or a rotated *.log.gz).
    path: PathBuf,

    /// Only show entries whose message contains this text (case-insensitive).
    #[arg(short = 's', long = "search")]
    search: Option<String>,

    /// Hide entries matching SOURCE, SOURCE:URGENCY or :URGENCY. Repeatable.
    #[arg(short = 'x', long = "exclude", value_name = "RULE")]
    exclude: Vec<String>,

    /// Re-enable entries matching a rule after exclusions. Repeatable.
    #[arg(short = 'i', long = "include", value_name = "RULE")]
    include: Vec<String>,

    /// Show collapsed duplicate runs in full.
    #[arg(short = 'e', long = "expand")]
    expand: bool,

    /// 1-based page to print (clamped into range).
    #[arg(short = 'p', long = "page", default_value_t = 1)]
    page: usize,

    /// Print every visible row instead of a single page.
    #[arg(long = "all")]
    all: bool,

    /// Output format.
    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Print the general info and mod list instead of log rows.
    #[arg(short = 'a', long = "analysis")]
    analysis: bool,

    /// Mod list ordering for --analysis.
    #[arg(long = "sort", value_enum, default_value_t = SortKey::Name)]
    sort: SortKey,

    /// Reverse the mod list ordering.
    #[arg(long = "desc")]
    desc: bool,

    /// Path to config.toml (defaults to the platform config directory).
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    // Config is read before logging so its level can take effect.
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| platform::config::PlatformPaths::resolve().config_file());
    let (config, config_warnings) = platform::config::load_config(&config_path);

    util::logging::init(
        cli.debug,
        config.log_level.as_deref(),
        config.log_file.as_deref(),
    );

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        config = %config_path.display(),
        "BS LogViewer starting"
    );
    for warning in &config_warnings {
        tracing::warn!("{warning}");
    }

    if let Err(e) = run(&cli, AppState::new(config)) {
        tracing::error!(error = %e, "Viewer failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli, mut state: AppState) -> Result<()> {
    // Rules are checked before the file is read so a typo fails fast.
    let exclude = parse_rules(&cli.exclude)?;
    let include = parse_rules(&cli.include)?;

    let content = platform::fs::read_log_file(&cli.path)?;
    state.load_text(&content);

    let stdout = std::io::stdout();
    let out = stdout.lock();

    if cli.analysis {
        let mut analysis = state.analysis().clone();
        let column = match cli.sort {
            SortKey::Name => ModSortColumn::Name,
            SortKey::GameVersion => ModSortColumn::GameVersion,
        };
        let direction = if cli.desc {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        sort_mods(&mut analysis.mods, column, direction);

        return match cli.format {
            OutputFormat::Json => export::export_analysis_json(&analysis, out, "stdout"),
            _ => export::render_analysis_text(&analysis, out, "stdout"),
        }
        .map_err(AppError::from);
    }

    for rule in &exclude {
        state.apply_rule(rule, false);
    }
    for rule in &include {
        state.apply_rule(rule, true);
    }
    if let Some(ref search) = cli.search {
        state.set_search(search);
    }
    if cli.expand {
        state.expand_all();
    }

    let rows = if cli.all {
        state.visible()
    } else {
        let page = state.set_page(cli.page);
        tracing::debug!(page, pages = state.page_count(), "Page selected");
        state.current_page_rows()
    };

    let written = match cli.format {
        OutputFormat::Text => {
            export::render_text(state.display(), state.entries(), rows, out, "stdout")?
        }
        OutputFormat::Csv => {
            export::export_csv(state.display(), state.entries(), rows, out, "stdout")?
        }
        OutputFormat::Json => {
            export::export_json(state.display(), state.entries(), rows, out, "stdout")?
        }
    };

    tracing::info!(
        rows = written,
        visible = state.visible().len(),
        page = state.page(),
        pages = state.page_count(),
        "Output written"
    );
    Ok(())
}

fn parse_rules(rules: &[String]) -> Result<Vec<FilterRule>> {
    rules
        .iter()
        .map(|rule| rule.parse::<FilterRule>().map_err(AppError::from))
        .collect()
}
