//! # Progress Output
//!
//! Stages report every sub-action on stdout. This module decides how that
//! output looks (emoji or plain markers, depending on terminal and user
//! preferences) and provides [`Printer`], the handle stages print through.
//!
//! ## Respecting User Preferences
//!
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals

use std::cell::RefCell;
use std::env;

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// `color_flag` is `always`, `never` or `auto`; in auto mode the
    /// environment and the terminal decide.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // The presence of the variable (even if empty) disables colors
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    /// Create a configuration with colors always disabled.
    pub fn plain() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Returns `emoji_str` when colors are enabled, `plain` otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// Where stages print their progress.
///
/// A printer either writes to stdout or, in tests, captures the lines so
/// that assertions can be made on them.
#[derive(Debug)]
pub struct Printer {
    config: OutputConfig,
    captured: Option<RefCell<Vec<String>>>,
}

impl Printer {
    /// A printer writing to stdout.
    pub fn stdout(config: OutputConfig) -> Self {
        Self {
            config,
            captured: None,
        }
    }

    /// A printer that keeps the lines in memory, without emoji.
    pub fn capturing() -> Self {
        Self {
            config: OutputConfig::plain(),
            captured: Some(RefCell::new(Vec::new())),
        }
    }

    fn emit(&self, line: String) {
        match &self.captured {
            Some(lines) => lines.borrow_mut().push(line),
            None => println!("{}", line),
        }
    }

    /// Stage banner.
    pub fn header(&self, text: &str) {
        self.emit(format!("{} {}", emoji(&self.config, "🔧", "==>"), text));
    }

    /// An action that is about to happen.
    pub fn step(&self, text: &str) {
        self.emit(format!("   {}", text));
    }

    /// An action that completed.
    pub fn done(&self, text: &str) {
        self.emit(format!("   {} {}", emoji(&self.config, "✅", "[OK]"), text));
    }

    /// A component or action that was intentionally not processed.
    pub fn skip(&self, text: &str) {
        self.emit(format!("   {} {}", emoji(&self.config, "⏭️", "[SKIP]"), text));
    }

    /// Captured lines; empty for a stdout printer.
    pub fn lines(&self) -> Vec<String> {
        self.captured
            .as_ref()
            .map(|lines| lines.borrow().clone())
            .unwrap_or_default()
    }
}
