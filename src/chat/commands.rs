//! Classification of chat input and the in-chat action menu.
//!
//! Only one input is reserved: [`MENU_COMMAND`]. Everything else typed at the
//! prompt is sent to the model.

/// Input that opens the action menu instead of being sent.
pub const MENU_COMMAND: &str = "/menu";

/// Title of the action menu.
pub const ACTION_MENU_TITLE: &str = "What would you like to do?";

/// A classified line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput {
    /// Open the action menu.
    Menu,

    /// Send this text to the model.
    Message(String),

    /// Nothing to do.
    Empty,
}

/// Classifies one line read from the prompt.
///
/// The menu command must match exactly; surrounding whitespace turns it into
/// an ordinary message. Blank lines are never sent.
///
/// # Examples
///
/// ```
/// # use routechat::chat::{ChatInput, parse_input};
/// assert_eq!(parse_input("/menu"), ChatInput::Menu);
/// assert_eq!(parse_input("hello"), ChatInput::Message("hello".to_string()));
/// assert_eq!(parse_input("   "), ChatInput::Empty);
/// ```
pub fn parse_input(line: &str) -> ChatInput {
    let line = line.trim_end_matches(['\r', '\n']);
    if line == MENU_COMMAND {
        ChatInput::Menu
    } else if line.trim().is_empty() {
        ChatInput::Empty
    } else {
        ChatInput::Message(line.to_string())
    }
}

/// An entry of the action menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Return to the chat unchanged.
    Continue,

    /// Empty the history and return to the chat.
    ClearHistory,

    /// Leave the chat and pick a model again.
    ChooseModel,

    /// Quit the program.
    Exit,
}

impl MenuAction {
    /// Every action, in menu order.
    pub const ALL: [MenuAction; 4] = [
        MenuAction::Continue,
        MenuAction::ClearHistory,
        MenuAction::ChooseModel,
        MenuAction::Exit,
    ];

    /// Returns the menu label.
    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::Continue => "Continue chat",
            MenuAction::ClearHistory => "Clear chat history",
            MenuAction::ChooseModel => "Choose another model",
            MenuAction::Exit => "Exit program",
        }
    }

    /// Returns the labels of every action, in menu order.
    pub fn labels() -> Vec<String> {
        Self::ALL.iter().map(|action| action.label().to_string()).collect()
    }

    /// Maps a menu result to an action; an aborted menu continues the chat.
    pub fn from_selection(selection: Option<usize>) -> MenuAction {
        selection
            .and_then(|index| Self::ALL.get(index).copied())
            .unwrap_or(MenuAction::Continue)
    }
}
