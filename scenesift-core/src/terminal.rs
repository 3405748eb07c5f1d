//! Terminal UI components and styling for scenesift.
//!
//! All user-facing output goes through the `log` facade, at info level except
//! for warnings and errors, so the CLI's logger decides where it ends up
//! (terminal, run log, or both). The
//! progress bar is drawn directly to stderr and hidden when stderr is not a
//! terminal.

use console::{Term, style};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{error, info, warn};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::sync::{LazyLock, Mutex};
use std::time::Duration;
use unicode_width::UnicodeWidthStr;

/// Represents the visual hierarchy levels in the CLI output
#[derive(Debug, Clone, Copy)]
pub enum OutputLevel {
    /// Level 1: Main sections (===== SECTION =====)
    Section,
    /// Level 2: Subsections and major operations (» Operation)
    Subsection,
    /// Level 3: Progress items and sub-operations
    Progress,
    /// Level 4: Key-value status information
    Status,
}

impl OutputLevel {
    fn indent(&self) -> &'static str {
        match self {
            OutputLevel::Section => "",
            OutputLevel::Subsection => "  ",
            OutputLevel::Progress => "    ",
            OutputLevel::Status => "      ",
        }
    }
}

struct TerminalState {
    current_progress: Option<ProgressBar>,
}

static TERMINAL_STATE: LazyLock<Mutex<TerminalState>> = LazyLock::new(|| {
    Mutex::new(TerminalState {
        current_progress: None,
    })
});

/// Check if color should be used (respects NO_COLOR environment variable)
fn should_use_color() -> bool {
    std::env::var("NO_COLOR").is_err()
}

/// Print a section header for major workflow phases
pub fn print_section(title: &str) {
    info!("");
    if should_use_color() {
        info!("===== {} =====", title.to_uppercase().cyan());
    } else {
        info!("===== {} =====", title.to_uppercase());
    }
    info!("");
}

/// Print an item at the specified hierarchy level
pub fn print_item(level: OutputLevel, symbol: Option<&str>, text: &str, bold: bool) {
    let indent = level.indent();
    let output = match symbol {
        Some(sym) if should_use_color() && bold => format!("{indent}{sym} {}", style(text).bold()),
        Some(sym) => format!("{indent}{sym} {text}"),
        None if should_use_color() && bold => format!("{indent}{}", style(text).bold()),
        None => format!("{indent}{text}"),
    };
    info!("{output}");
}

/// Print a subsection or processing step
pub fn print_processing(message: &str) {
    info!("");
    print_item(OutputLevel::Subsection, Some("»"), message, true);
}

/// Print a sub-item under a processing step
pub fn print_sub_item(message: &str) {
    print_item(OutputLevel::Progress, None, message, false);
}

/// Print a success message
pub fn print_success(message: &str) {
    info!("");
    if should_use_color() {
        info!("  ✓ {}", message.green());
    } else {
        info!("  ✓ {message}");
    }
}

/// Print a status line (key-value pair)
pub fn print_status(label: &str, value: &str, highlight: bool) {
    let label_width: usize = 15;
    let padding = label_width.saturating_sub(label.width()).max(1);

    let value = if !should_use_color() {
        value.to_string()
    } else if label.contains("Matches") && value.starts_with('0') {
        value.yellow().to_string()
    } else if highlight {
        value.bold().to_string()
    } else {
        value.to_string()
    };

    info!(
        "{}{}:{} {}",
        OutputLevel::Status.indent(),
        label,
        " ".repeat(padding),
        value
    );
}

/// Print an error message. Logged at error level so it survives a quiet
/// `RUST_LOG`.
pub fn print_error(title: &str, message: &str, suggestion: Option<&str>) {
    if should_use_color() {
        error!("✗ {}", title.red().bold());
    } else {
        error!("✗ {title}");
    }

    error!("");
    error!("  Message:  {message}");

    if let Some(suggestion_text) = suggestion {
        error!("");
        error!("  Suggestion: {suggestion_text}");
    }

    error!("");
}

/// Print a warning message at warn level.
pub fn print_warning(message: &str) {
    if should_use_color() {
        warn!("  ⚠ {}", message.yellow());
    } else {
        warn!("  ⚠ {message}");
    }
}

fn progress_style(label: &str) -> ProgressStyle {
    let term_width = Term::stderr().size().1 as usize;
    let template = if term_width >= 80 {
        format!("  ⧖ {label}: {{pos:>5}}/{{len:5}} [{{bar:30}}] ({{elapsed_precise}} / {{eta_precise}})")
    } else {
        format!("  ⧖ {label}: {{pos}}/{{len}} [{{bar:10}}]")
    };

    ProgressStyle::default_bar()
        .template(&template)
        .map(|s| s.progress_chars("##."))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

/// Starts a counting progress bar, replacing any bar still on screen.
pub fn start_progress(label: &str, total: u64) {
    let pb = ProgressBar::new(total);
    pb.set_style(progress_style(label));
    if !std::io::stderr().is_terminal() {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }
    pb.enable_steady_tick(Duration::from_millis(100));

    if let Ok(mut state) = TERMINAL_STATE.lock() {
        if let Some(previous) = state.current_progress.replace(pb) {
            previous.finish_and_clear();
        }
    }
}

/// Advances the current progress bar by one item. Safe to call from workers.
pub fn advance_progress() {
    if let Ok(state) = TERMINAL_STATE.lock() {
        if let Some(pb) = state.current_progress.as_ref() {
            pb.inc(1);
        }
    }
}

/// Finish the current progress bar (leave final state visible)
pub fn finish_progress_bar() {
    if let Ok(mut state) = TERMINAL_STATE.lock() {
        if let Some(pb) = state.current_progress.take() {
            pb.finish();
        }
    }
}

/// Clear the current progress bar
pub fn clear_progress_bar() {
    if let Ok(mut state) = TERMINAL_STATE.lock() {
        if let Some(pb) = state.current_progress.take() {
            pb.finish_and_clear();
        }
    }
}
