/// Color support with NO_COLOR, CLICOLOR, and CI log handling
///
/// **Environment Variables**:
/// - `NO_COLOR`: If set (to any value), disable colors
/// - `CLICOLOR_FORCE`: If set to non-zero, force colors even when not a TTY
/// - `CLICOLOR`: If set to 0, disable colors
/// - `GITHUB_ACTIONS`: If `true`, enable colors; the Actions log viewer
///   renders ANSI even though stdout is a pipe
use colored::control;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorChoice {
    Always,
    Never,
    Auto,
}

/// Decide from an environment lookup. `Auto` means follow TTY detection.
pub fn color_choice<F>(var: F) -> ColorChoice
where
    F: Fn(&str) -> Option<String>,
{
    // NO_COLOR takes precedence over everything (https://no-color.org/)
    if var("NO_COLOR").is_some() {
        return ColorChoice::Never;
    }

    if var("CLICOLOR_FORCE").is_some_and(|v| v != "0") {
        return ColorChoice::Always;
    }

    if var("CLICOLOR").is_some_and(|v| v == "0") {
        return ColorChoice::Never;
    }

    if var("GITHUB_ACTIONS").is_some_and(|v| v.eq_ignore_ascii_case("true")) {
        return ColorChoice::Always;
    }

    ColorChoice::Auto
}

/// Configure `colored` for the whole process. Call early in main().
pub fn init_colors() {
    let enabled = match color_choice(|key| std::env::var(key).ok()) {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::io::IsTerminal::is_terminal(&std::io::stdout()),
    };
    control::set_override(enabled);
}
