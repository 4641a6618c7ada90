use crossterm::style::Stylize;
use is_terminal::IsTerminal;
use std::sync::atomic::{AtomicBool, Ordering};

/// Pretty printing utilities for console output
pub struct Formatter;

impl Formatter {
    /// Format a single call output line: `  (<type> <name>) <value>`.
    pub fn format_output_line(ty: &str, name: &str, value: &str) -> String {
        if name.is_empty() {
            format!("  ({}) {}", ty, value)
        } else {
            format!("  ({} {}) {}", ty, name, value)
        }
    }

    /// Format a `name=value` pair of an event record.
    pub fn format_field(name: &str, value: &str) -> String {
        format!("{}={}", name, value)
    }

    /// Render a two column listing, padding the first column to the widest entry.
    pub fn format_listing<'a, I>(entries: I) -> String
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let entries: Vec<(&str, &str)> = entries.into_iter().collect();
        let width = entries.iter().map(|(label, _)| label.len()).max().unwrap_or(0) + 4;

        entries
            .iter()
            .map(|(label, description)| {
                format!("{}{}{}", label, " ".repeat(width - label.len()), description)
                    .trim_end()
                    .to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Format an informational message in blue.
    pub fn info(message: impl AsRef<str>) -> String {
        Self::apply_color(message.as_ref(), ColorKind::Info)
    }

    /// Format a success message in green.
    pub fn success(message: impl AsRef<str>) -> String {
        Self::apply_color(message.as_ref(), ColorKind::Success)
    }

    /// Format a warning message in yellow.
    pub fn warning(message: impl AsRef<str>) -> String {
        Self::apply_color(message.as_ref(), ColorKind::Warning)
    }

    /// Format an error message in red.
    pub fn error(message: impl AsRef<str>) -> String {
        Self::apply_color(message.as_ref(), ColorKind::Error)
    }

    /// Configure whether ANSI colors are enabled.
    pub fn configure_colors(enable: bool) {
        COLOR_ENABLED.store(enable, Ordering::Relaxed);
    }

    /// Auto-configure color output based on environment.
    ///
    /// Colors are off when `NO_COLOR` is set or stdout is not a terminal.
    pub fn configure_colors_from_env() {
        let no_color = std::env::var_os("NO_COLOR").is_some();
        Self::configure_colors(!no_color && std::io::stdout().is_terminal());
    }

    fn apply_color(message: &str, kind: ColorKind) -> String {
        if !COLOR_ENABLED.load(Ordering::Relaxed) {
            return message.to_string();
        }

        match kind {
            ColorKind::Info => format!("{}", message.blue()),
            ColorKind::Success => format!("{}", message.green()),
            ColorKind::Warning => format!("{}", message.yellow()),
            ColorKind::Error => format!("{}", message.red()),
        }
    }
}

/// Print an informational line to stdout.
pub fn print_info(message: impl AsRef<str>) {
    println!("{}", Formatter::info(message));
}

/// Print a success line to stdout.
pub fn print_success(message: impl AsRef<str>) {
    println!("{}", Formatter::success(message));
}

/// Print a warning line to stdout.
pub fn print_warning(message: impl AsRef<str>) {
    println!("{}", Formatter::warning(message));
}

/// Print an error line to stdout.
pub fn print_error(message: impl AsRef<str>) {
    println!("{}", Formatter::error(message));
}

#[derive(Copy, Clone)]
enum ColorKind {
    Info,
    Success,
    Warning,
    Error,
}

static COLOR_ENABLED: AtomicBool = AtomicBool::new(true);
