//! Output rendering for the chat application.
//!
//! The controller never prints directly; it goes through [`Renderer`] so that
//! tests can record output and so styling lives in one place.

use std::io::{self, Stdout, Write};

use crossterm::style::Stylize;

use crate::spinner::Spinner;

/// Label shown next to the spinner.
const WAITING_LABEL: &str = "Waiting for response...";

/// Trait for rendering chat output.
pub trait Renderer: Send {
    /// Print the per-turn prompt header.
    fn print_prompt(&mut self);

    /// Print an assistant reply.
    fn print_response(&mut self, text: &str);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Start a progress indicator for a pending request.
    ///
    /// The caller stops it before printing anything else.
    fn start_progress(&mut self) -> Option<Spinner> {
        None
    }
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
    show_spinner: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors and the spinner enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
            show_spinner: true,
        }
    }

    /// Enables or disables the progress spinner.
    pub fn with_spinner(mut self, show_spinner: bool) -> Self {
        self.show_spinner = show_spinner;
        self
    }

    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn print_prompt(&mut self) {
        println!("\nEnter your message (or /menu):");
        self.flush();
    }

    fn print_response(&mut self, text: &str) {
        if self.use_color {
            println!("\n{} {text}", "Response:".bold().cyan());
        } else {
            println!("\nResponse: {text}");
        }
        self.flush();
    }

    fn print_error(&mut self, error: &str) {
        if self.use_color {
            eprintln!("\n{} {error}", "Error:".bold().red());
        } else {
            eprintln!("\nError: {error}");
        }
    }

    fn print_info(&mut self, info: &str) {
        println!("{info}");
        self.flush();
    }

    fn start_progress(&mut self) -> Option<Spinner> {
        if self.show_spinner {
            Some(Spinner::start(WAITING_LABEL))
        } else {
            None
        }
    }
}
