//! Progress indicator shown while a request is in flight.

use std::io::{self, Write};
use std::time::Duration;

use crossterm::cursor::MoveToColumn;
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const TICK: Duration = Duration::from_millis(80);

/// An animated one-line spinner running on its own task.
///
/// The spinner carries no state of the conversation. [`Spinner::stop`] must be
/// awaited before anything else is printed; it erases the spinner line.
pub struct Spinner {
    token: CancellationToken,
    cleared: CancellationToken,
    handle: JoinHandle<()>,
}

impl Spinner {
    /// Starts animating `label` on stdout.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(label: impl Into<String>) -> Self {
        let label = label.into();
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let cleared = CancellationToken::new();
        let done = cleared.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK);
            let mut frame = 0usize;
            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = interval.tick() => {
                        let mut stdout = io::stdout();
                        let _ = queue!(
                            stdout,
                            MoveToColumn(0),
                            Print(format!("{} {label}", FRAMES[frame % FRAMES.len()]))
                        );
                        let _ = stdout.flush();
                        frame += 1;
                    }
                }
            }
            let mut stdout = io::stdout();
            let _ = queue!(stdout, MoveToColumn(0), Clear(ClearType::CurrentLine));
            let _ = stdout.flush();
            done.cancel();
        });
        Self {
            token,
            cleared,
            handle,
        }
    }

    /// Returns a token that is cancelled once the spinner line has been erased.
    pub fn cleared(&self) -> CancellationToken {
        self.cleared.clone()
    }

    /// Stops the animation and waits until its line has been cleared.
    pub async fn stop(self) {
        self.token.cancel();
        if let Err(err) = self.handle.await {
            tracing::debug!(error = %err, "spinner task ended abnormally");
        }
    }
}
