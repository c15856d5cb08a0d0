//! The session controller.
//!
//! The controller walks the user through model selection and the chat loop:
//!
//! ```text
//! SelectingModel --model--> Chatting --/menu--> ShowingMenu
//!       ^  |                   |  ^                 |
//!       |  +--abort--> Exit    |  +--continue/clear-+
//!       +----end of input------+                    |
//!       +----------------choose another model-------+
//!                                   Exit <--exit----+
//! ```
//!
//! Exchange failures never leave the chat loop: they are reported and the
//! user can try again. Only menu, terminal and other unrecoverable errors end
//! [`SessionController::run`] with `Err`.

use std::sync::Arc;
use std::time::Instant;

use crate::chat::commands::{ACTION_MENU_TITLE, ChatInput, MenuAction, parse_input};
use crate::chat::console::Console;
use crate::chat::interrupt::InterruptSignal;
use crate::chat::render::Renderer;
use crate::chat::session::ChatSession;
use crate::client::Transport;
use crate::error::{Error, Result};
use crate::menu::MenuSelector;
use crate::observability::{
    SESSION_EXCHANGE_DURATION, SESSION_EXCHANGE_FAILURES, SESSION_EXCHANGES,
    SESSION_HISTORY_CLEARS, SESSION_MODEL_SELECTIONS,
};
use crate::types::{Model, ModelCatalog};

/// Title of the model menu.
pub const MODEL_MENU_TITLE: &str = "Select an LLM:";

/// Prompt shown on the input line.
pub const USER_PROMPT: &str = "User: ";

/// How a run ended. Both outcomes are graceful.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The user chose "Exit program".
    Exit,

    /// The model menu was aborted.
    NoModelSelected,
}

/// Why the chat loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChatEnd {
    SwitchModel,
    EndOfInput,
    Exit,
}

/// Drives model selection, the chat loop and the action menu.
pub struct SessionController<T: Transport, C: Console, R: Renderer> {
    transport: Arc<T>,
    catalog: ModelCatalog,
    console: C,
    renderer: R,
    interrupt: Arc<InterruptSignal>,
    session: Option<ChatSession<T>>,
}

impl<T: Transport, C: Console, R: Renderer> SessionController<T, C, R> {
    /// Creates a controller that offers `catalog` and talks through `transport`.
    pub fn new(transport: Arc<T>, catalog: ModelCatalog, console: C, renderer: R) -> Self {
        Self {
            transport,
            catalog,
            console,
            renderer,
            interrupt: Arc::new(InterruptSignal::new()),
            session: None,
        }
    }

    /// Uses `signal` to cancel in-flight requests; trigger it from a signal handler.
    pub fn with_interrupt(mut self, signal: Arc<InterruptSignal>) -> Self {
        self.interrupt = signal;
        self
    }

    /// Returns the signal that cancels an in-flight request when triggered.
    pub fn interrupt_signal(&self) -> Arc<InterruptSignal> {
        Arc::clone(&self.interrupt)
    }

    /// Returns the current chat session, if a model is selected.
    pub fn session(&self) -> Option<&ChatSession<T>> {
        self.session.as_ref()
    }

    /// Returns the console.
    pub fn console(&self) -> &C {
        &self.console
    }

    /// Returns the renderer.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Runs until the user exits or declines to pick a model.
    ///
    /// # Errors
    ///
    /// Returns menu, terminal and configuration errors. Exchange errors are
    /// reported through the renderer and do not end the run.
    pub async fn run(&mut self) -> Result<Outcome> {
        loop {
            self.session = None;
            let Some(model) = self.select_model()? else {
                self.renderer.print_info("No model selected");
                return Ok(Outcome::NoModelSelected);
            };
            SESSION_MODEL_SELECTIONS.click();
            tracing::info!(model = %model, "model selected");
            self.console.clear_screen()?;
            self.session = Some(ChatSession::new(Arc::clone(&self.transport), model));

            match self.chat().await? {
                ChatEnd::Exit => return Ok(Outcome::Exit),
                ChatEnd::SwitchModel => tracing::info!("returning to model selection"),
                ChatEnd::EndOfInput => tracing::info!("input ended; returning to model selection"),
            }
        }
    }

    fn select_model(&mut self) -> Result<Option<Model>> {
        let menu = MenuSelector::new(MODEL_MENU_TITLE, self.catalog.labels())?;
        let selection = self.console.choose(menu)?;
        Ok(selection.and_then(|index| self.catalog.get(index).cloned()))
    }

    async fn chat(&mut self) -> Result<ChatEnd> {
        loop {
            self.renderer.print_prompt();
            let Some(line) = self.console.read_line(USER_PROMPT)? else {
                return Ok(ChatEnd::EndOfInput);
            };
            match parse_input(&line) {
                ChatInput::Empty => continue,
                ChatInput::Menu => {
                    if let Some(end) = self.show_menu()? {
                        return Ok(end);
                    }
                }
                ChatInput::Message(text) => self.exchange(&text).await?,
            }
        }
    }

    fn show_menu(&mut self) -> Result<Option<ChatEnd>> {
        self.console.clear_screen()?;
        let menu = MenuSelector::new(ACTION_MENU_TITLE, MenuAction::labels())?;
        let action = MenuAction::from_selection(self.console.choose(menu)?);
        tracing::debug!(?action, "menu action");
        self.console.clear_screen()?;
        match action {
            MenuAction::Continue => Ok(None),
            MenuAction::ClearHistory => {
                if let Some(session) = self.session.as_mut() {
                    session.clear();
                }
                SESSION_HISTORY_CLEARS.click();
                self.renderer.print_info("Chat history cleared!");
                Ok(None)
            }
            MenuAction::ChooseModel => Ok(Some(ChatEnd::SwitchModel)),
            MenuAction::Exit => {
                self.renderer.print_info("Goodbye!");
                Ok(Some(ChatEnd::Exit))
            }
        }
    }

    async fn exchange(&mut self, text: &str) -> Result<()> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        SESSION_EXCHANGES.click();
        self.interrupt.reset();
        let spinner = self.renderer.start_progress();
        let start = Instant::now();

        let result = tokio::select! {
            result = session.exchange(text) => result,
            _ = self.interrupt.triggered() => {
                Err(Error::interrupted("request cancelled"))
            }
        };

        if let Some(spinner) = spinner {
            spinner.stop().await;
        }
        SESSION_EXCHANGE_DURATION.add(start.elapsed().as_secs_f64());

        match result {
            Ok(Some(reply)) => self.renderer.print_response(&reply),
            Ok(None) => tracing::debug!("response carried no choices"),
            Err(err) if err.is_exchange_recoverable() => {
                SESSION_EXCHANGE_FAILURES.click();
                tracing::warn!(error = %err, "exchange failed");
                self.renderer.print_error(&err.to_string());
            }
            Err(err) => return Err(err),
        }
        Ok(())
    }
}
