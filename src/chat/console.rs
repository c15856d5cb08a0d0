//! Terminal input: prompt lines, modal menus and screen clearing.

use std::io;

use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::error::{Error, Result};
use crate::menu::{MenuSelector, run_menu};

/// Interactive input consumed by the session controller.
pub trait Console {
    /// Reads one line. `Ok(None)` means the input stream has ended.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;

    /// Shows `menu` and returns the committed index, or `None` if aborted.
    fn choose(&mut self, menu: MenuSelector) -> Result<Option<usize>>;

    /// Clears the screen.
    fn clear_screen(&mut self) -> Result<()>;
}

/// [`Console`] backed by rustyline for lines and crossterm for menus.
pub struct TerminalConsole {
    editor: DefaultEditor,
    use_color: bool,
}

impl TerminalConsole {
    /// Creates a console on the process terminal.
    pub fn new(use_color: bool) -> Result<Self> {
        let editor = DefaultEditor::new().map_err(readline_error)?;
        Ok(Self { editor, use_color })
    }
}

impl Console for TerminalConsole {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(Some(line))
            }
            // Ctrl+C at the prompt abandons the line only.
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(readline_error(err)),
        }
    }

    fn choose(&mut self, mut menu: MenuSelector) -> Result<Option<usize>> {
        run_menu(&mut io::stdout(), &mut menu, self.use_color)
    }

    fn clear_screen(&mut self) -> Result<()> {
        execute!(io::stdout(), Clear(ClearType::All), MoveTo(0, 0))
            .map_err(|e| Error::io("failed to clear screen", e))
    }
}

fn readline_error(err: ReadlineError) -> Error {
    match err {
        ReadlineError::Io(e) => Error::io("failed to read input", e),
        other => Error::io(
            "failed to read input",
            io::Error::other(other.to_string()),
        ),
    }
}
