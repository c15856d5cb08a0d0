//! Interactive chat application.
//!
//! This module ties the client library into a menu-driven REPL:
//!
//! - A model is picked from the catalog through a modal menu
//! - Free text is sent to the model together with the conversation so far
//! - `/menu` opens the action menu to clear history, switch model or exit
//!
//! # Architecture
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`commands`]: Input classification and the action menu
//! - [`session`]: Conversation history and the per-turn exchange
//! - [`controller`]: The state machine driving model selection and the chat loop
//! - [`console`]: Line input, menus and screen clearing on a real terminal
//! - [`interrupt`]: Ctrl+C cancellation of the in-flight request
//! - [`render`]: Output of prompts, replies and notices

mod commands;
mod config;
mod console;
mod controller;
mod interrupt;
mod render;
mod session;

pub use commands::{ACTION_MENU_TITLE, ChatInput, MENU_COMMAND, MenuAction, parse_input};
pub use config::{ChatArgs, ChatConfig};
pub use console::{Console, TerminalConsole};
pub use controller::{MODEL_MENU_TITLE, Outcome, SessionController, USER_PROMPT};
pub use interrupt::InterruptSignal;
pub use render::{PlainTextRenderer, Renderer};
pub use session::ChatSession;
