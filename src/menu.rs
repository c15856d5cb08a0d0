//! Modal single-choice menus.
//!
//! [`MenuSelector`] is a pure state machine over key presses; [`run_menu`]
//! drives it from crossterm events on a raw-mode terminal. What an aborted
//! menu means is decided by the caller, not by the selector.

use std::io::{self, Write};

use crossterm::cursor::{self, MoveToColumn, MoveUp};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Color, Print, Stylize};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{execute, queue};

use crate::error::{Error, Result};

const FOOTER: &str = "(use arrow keys to select, enter to confirm)";
const TITLE_FG: Color = Color::Rgb {
    r: 0xfa,
    g: 0xfa,
    b: 0xfa,
};
const TITLE_BG: Color = Color::Rgb {
    r: 0x7d,
    g: 0x56,
    b: 0xf4,
};
const SELECTED_FG: Color = Color::AnsiValue(170);
const SELECTED_BG: Color = Color::AnsiValue(222);

/// A navigation or decision key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKey {
    /// Move the cursor up one row.
    Up,
    /// Move the cursor down one row.
    Down,
    /// Jump to the first row.
    First,
    /// Jump to the last row.
    Last,
    /// Commit the highlighted row.
    Commit,
    /// Leave without committing.
    Abort,
}

impl MenuKey {
    /// Maps a terminal key event; keys without meaning in a menu map to `None`.
    pub fn from_key_event(key: &KeyEvent) -> Option<Self> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => Some(MenuKey::Abort),
                _ => None,
            };
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(MenuKey::Up),
            KeyCode::Down | KeyCode::Char('j') => Some(MenuKey::Down),
            KeyCode::Home => Some(MenuKey::First),
            KeyCode::End => Some(MenuKey::Last),
            KeyCode::Enter => Some(MenuKey::Commit),
            KeyCode::Esc | KeyCode::Char('q') => Some(MenuKey::Abort),
            _ => None,
        }
    }
}

/// Result of feeding one key to a menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuStep {
    /// The menu is still open.
    Pending,
    /// The row at this index was chosen.
    Committed(usize),
    /// The menu was left without a choice.
    Aborted,
}

/// A titled list of options with one highlighted row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuSelector {
    title: String,
    options: Vec<String>,
    cursor: usize,
}

impl MenuSelector {
    /// Creates a menu with the cursor on the first option.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `options` is empty.
    pub fn new(title: impl Into<String>, options: Vec<String>) -> Result<Self> {
        if options.is_empty() {
            return Err(Error::config("a menu needs at least one option", None));
        }
        Ok(Self {
            title: title.into(),
            options,
            cursor: 0,
        })
    }

    /// Returns the menu title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the option labels.
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Returns the highlighted index.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Applies one key. The cursor is clamped to the option range and never wraps.
    pub fn handle_key(&mut self, key: MenuKey) -> MenuStep {
        let last = self.options.len() - 1;
        match key {
            MenuKey::Up => self.cursor = self.cursor.saturating_sub(1),
            MenuKey::Down => self.cursor = (self.cursor + 1).min(last),
            MenuKey::First => self.cursor = 0,
            MenuKey::Last => self.cursor = last,
            MenuKey::Commit => return MenuStep::Committed(self.cursor),
            MenuKey::Abort => return MenuStep::Aborted,
        }
        MenuStep::Pending
    }

    /// Renders the menu as display lines.
    pub fn render(&self, use_color: bool) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.options.len() + 4);
        let title = format!(" {} ", self.title);
        if use_color {
            lines.push(title.bold().with(TITLE_FG).on(TITLE_BG).to_string());
        } else {
            lines.push(title);
        }
        lines.push(String::new());
        for (i, option) in self.options.iter().enumerate() {
            if i == self.cursor {
                let label = if use_color {
                    option.as_str().with(SELECTED_FG).on(SELECTED_BG).to_string()
                } else {
                    option.clone()
                };
                lines.push(format!("> {label}"));
            } else {
                lines.push(format!("  {option}"));
            }
        }
        lines.push(String::new());
        lines.push(FOOTER.to_string());
        lines
    }
}

/// Shows `menu` on the terminal and blocks until it is committed or aborted.
///
/// Returns the committed index, or `None` if the user aborted.
///
/// # Errors
///
/// Returns [`Error::MenuRender`] if raw mode cannot be entered or the menu
/// cannot be drawn.
pub fn run_menu<W: Write>(out: &mut W, menu: &mut MenuSelector, use_color: bool) -> Result<Option<usize>> {
    let _raw = RawModeGuard::enable()?;
    drive_menu(out, menu, use_color, event::read)
}

/// Runs the draw/read loop against an arbitrary event source.
pub(crate) fn drive_menu<W, F>(
    out: &mut W,
    menu: &mut MenuSelector,
    use_color: bool,
    mut next_event: F,
) -> Result<Option<usize>>
where
    W: Write,
    F: FnMut() -> io::Result<Event>,
{
    let mut drawn = draw(out, &menu.render(use_color), 0)?;
    loop {
        let event =
            next_event().map_err(|e| Error::menu_render("failed to read terminal event", Some(e)))?;
        let Event::Key(key) = event else {
            continue;
        };
        let Some(key) = MenuKey::from_key_event(&key) else {
            continue;
        };
        match menu.handle_key(key) {
            MenuStep::Pending => drawn = draw(out, &menu.render(use_color), drawn)?,
            MenuStep::Committed(index) => return Ok(Some(index)),
            MenuStep::Aborted => return Ok(None),
        }
    }
}

fn draw<W: Write>(out: &mut W, lines: &[String], previous: u16) -> Result<u16> {
    let result = (|| -> io::Result<()> {
        if previous > 0 {
            queue!(out, MoveUp(previous))?;
        }
        queue!(out, MoveToColumn(0), Clear(ClearType::FromCursorDown))?;
        for line in lines {
            queue!(out, Print(line), Print("\r\n"))?;
        }
        out.flush()
    })();
    result.map_err(|e| Error::menu_render("failed to draw menu", Some(e)))?;
    Ok(u16::try_from(lines.len()).unwrap_or(u16::MAX))
}

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        terminal::enable_raw_mode()
            .map_err(|e| Error::menu_render("failed to enable raw mode", Some(e)))?;
        let _ = execute!(io::stdout(), cursor::Hide);
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), cursor::Show);
        let _ = terminal::disable_raw_mode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu(n: usize) -> MenuSelector {
        MenuSelector::new("Pick", (0..n).map(|i| format!("option {i}")).collect()).unwrap()
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn empty_menu_rejected() {
        assert!(MenuSelector::new("Pick", Vec::new()).is_err());
    }

    #[test]
    fn cursor_clamps_at_top() {
        let mut menu = menu(3);
        assert_eq!(menu.handle_key(MenuKey::Up), MenuStep::Pending);
        assert_eq!(menu.cursor(), 0);
    }

    #[test]
    fn cursor_clamps_at_bottom() {
        let mut menu = menu(3);
        for _ in 0..5 {
            menu.handle_key(MenuKey::Down);
        }
        assert_eq!(menu.cursor(), 2);
        assert_eq!(menu.handle_key(MenuKey::Commit), MenuStep::Committed(2));
    }

    #[test]
    fn home_end_and_single_option() {
        let mut menu = menu(4);
        menu.handle_key(MenuKey::Last);
        assert_eq!(menu.cursor(), 3);
        menu.handle_key(MenuKey::First);
        assert_eq!(menu.cursor(), 0);

        let mut single = self::menu(1);
        single.handle_key(MenuKey::Down);
        single.handle_key(MenuKey::Up);
        assert_eq!(single.cursor(), 0);
    }

    #[test]
    fn abort_keeps_cursor() {
        let mut menu = menu(3);
        menu.handle_key(MenuKey::Down);
        assert_eq!(menu.handle_key(MenuKey::Abort), MenuStep::Aborted);
        assert_eq!(menu.cursor(), 1);
    }

    #[test]
    fn key_mapping() {
        let map = |code| MenuKey::from_key_event(&KeyEvent::new(code, KeyModifiers::NONE));
        assert_eq!(map(KeyCode::Up), Some(MenuKey::Up));
        assert_eq!(map(KeyCode::Char('k')), Some(MenuKey::Up));
        assert_eq!(map(KeyCode::Down), Some(MenuKey::Down));
        assert_eq!(map(KeyCode::Char('j')), Some(MenuKey::Down));
        assert_eq!(map(KeyCode::Enter), Some(MenuKey::Commit));
        assert_eq!(map(KeyCode::Esc), Some(MenuKey::Abort));
        assert_eq!(map(KeyCode::Char('q')), Some(MenuKey::Abort));
        assert_eq!(map(KeyCode::Char('x')), None);

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(MenuKey::from_key_event(&ctrl_c), Some(MenuKey::Abort));
        let ctrl_j = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::CONTROL);
        assert_eq!(MenuKey::from_key_event(&ctrl_j), None);
    }

    #[test]
    fn plain_render() {
        let mut menu = menu(2);
        menu.handle_key(MenuKey::Down);
        assert_eq!(
            menu.render(false),
            vec![
                " Pick ".to_string(),
                String::new(),
                "  option 0".to_string(),
                "> option 1".to_string(),
                String::new(),
                FOOTER.to_string(),
            ]
        );
    }

    #[test]
    fn colored_render_highlights_selection() {
        let menu = menu(2);
        let lines = menu.render(true);
        assert!(lines[0].contains("\x1b["));
        assert!(lines[2].starts_with("> "));
        assert!(lines[2].contains("\x1b["));
        assert_eq!(lines[3], "  option 1");
    }

    #[test]
    fn drive_commits_after_navigation() {
        let mut events = vec![
            key(KeyCode::Down),
            Event::FocusGained,
            key(KeyCode::Char('x')),
            key(KeyCode::Down),
            key(KeyCode::Up),
            key(KeyCode::Enter),
        ]
        .into_iter();
        let mut out = Vec::new();
        let mut menu = menu(3);
        let chosen = drive_menu(&mut out, &mut menu, false, || {
            Ok(events.next().expect("menu read past script"))
        })
        .unwrap();
        assert_eq!(chosen, Some(1));
        let drawn = String::from_utf8_lossy(&out);
        assert!(drawn.contains("> option 1"));
        assert!(drawn.contains(FOOTER));
    }

    #[test]
    fn drive_aborts() {
        let mut events = vec![key(KeyCode::Esc)].into_iter();
        let mut menu = menu(3);
        let chosen = drive_menu(&mut Vec::new(), &mut menu, false, || {
            Ok(events.next().expect("menu read past script"))
        })
        .unwrap();
        assert_eq!(chosen, None);
    }

    #[test]
    fn drive_read_failure_is_menu_error() {
        let mut menu = menu(2);
        let err = drive_menu(&mut Vec::new(), &mut menu, false, || {
            Err(io::Error::other("no tty"))
        })
        .unwrap_err();
        assert!(err.is_menu_render());
    }
}
