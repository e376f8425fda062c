//! Shared helpers for user-facing messages.

use owo_colors::OwoColorize;

/// Whether stderr/stdout decoration is allowed (`NO_COLOR` unset).
pub fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

pub fn error_prefix() -> String {
    if colors_enabled() {
        "error:".red().bold().to_string()
    } else {
        "error:".to_string()
    }
}

pub fn note_prefix() -> String {
    if colors_enabled() {
        "note:".cyan().bold().to_string()
    } else {
        "note:".to_string()
    }
}

pub fn info_prefix() -> String {
    if colors_enabled() {
        "info:".blue().bold().to_string()
    } else {
        "info:".to_string()
    }
}

/// Split a comma/pipe separated list, trimming and dropping empty tokens.
pub fn split_list(s: &str) -> Vec<String> {
    s.split(|c| c == ',' || c == '|')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
