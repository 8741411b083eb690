//! Styling helpers for terminal output.
//!
//! The [`NarrativeStyle`] trait applies ANSI styling via the `colored` crate to
//! the few kinds of text the player prints.

use colored::{ColoredString, Colorize};

/// Convenience trait for applying color and style to player output.
pub trait NarrativeStyle {
    fn paragraph_style(&self) -> ColoredString;
    fn output_style(&self) -> ColoredString;
    fn option_style(&self) -> ColoredString;
    fn hint_style(&self) -> ColoredString;
    fn prompt_style(&self) -> ColoredString;
    fn error_style(&self) -> ColoredString;
}

impl NarrativeStyle for &str {
    fn paragraph_style(&self) -> ColoredString {
        self.truecolor(235, 235, 225)
    }
    fn output_style(&self) -> ColoredString {
        self.italic().truecolor(102, 208, 250)
    }
    fn option_style(&self) -> ColoredString {
        self.truecolor(220, 180, 40)
    }
    fn hint_style(&self) -> ColoredString {
        self.dimmed()
    }
    fn prompt_style(&self) -> ColoredString {
        self.bold().truecolor(110, 220, 110)
    }
    fn error_style(&self) -> ColoredString {
        self.truecolor(230, 30, 30)
    }
}

impl NarrativeStyle for String {
    fn paragraph_style(&self) -> ColoredString {
        self.as_str().paragraph_style()
    }
    fn output_style(&self) -> ColoredString {
        self.as_str().output_style()
    }
    fn option_style(&self) -> ColoredString {
        self.as_str().option_style()
    }
    fn hint_style(&self) -> ColoredString {
        self.as_str().hint_style()
    }
    fn prompt_style(&self) -> ColoredString {
        self.as_str().prompt_style()
    }
    fn error_style(&self) -> ColoredString {
        self.as_str().error_style()
    }
}
