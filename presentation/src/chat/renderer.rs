//! Live console rendering of a streaming reply

use crate::output::console::ConsoleFormatter;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;
use threadline_application::SessionObserver;
use threadline_domain::{Message, Origin, SessionState, TURN_FAILED_TEXT, ThreadId};

/// What still has to be printed once a reply completes.
#[derive(Debug, PartialEq, Eq)]
enum Completion<'a> {
    /// The final text extends what was streamed; print the rest.
    Append(&'a str),
    /// The final text differs (e.g. a failure message); print it on its own line.
    Replace(&'a str),
}

fn completion<'a>(streamed: &str, final_text: &'a str) -> Completion<'a> {
    if final_text == TURN_FAILED_TEXT {
        return Completion::Replace(final_text);
    }
    match final_text.strip_prefix(streamed) {
        Some(rest) => Completion::Append(rest),
        None => Completion::Replace(final_text),
    }
}

#[derive(Default)]
struct RenderState {
    spinner: Option<ProgressBar>,
    streamed: String,
}

/// Renders a conversation to the terminal as it happens.
///
/// Shows a spinner until the first fragment arrives, then prints fragments
/// as they stream in.
pub struct ConsoleRenderer {
    show_progress: bool,
    state: Mutex<RenderState>,
}

impl ConsoleRenderer {
    pub fn new() -> Self {
        Self {
            show_progress: true,
            state: Mutex::new(RenderState::default()),
        }
    }

    /// Set whether to show the waiting spinner
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn start_spinner(state: &mut RenderState) {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(Self::spinner_style());
        spinner.set_message("Waiting for reply...");
        spinner.enable_steady_tick(Duration::from_millis(100));
        state.spinner = Some(spinner);
    }

    fn clear_spinner(state: &mut RenderState) {
        if let Some(spinner) = state.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn lock(&self) -> Option<std::sync::MutexGuard<'_, RenderState>> {
        self.state.lock().ok()
    }
}

impl Default for ConsoleRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionObserver for ConsoleRenderer {
    fn on_state_change(&self, state: SessionState) {
        let Some(mut render) = self.lock() else {
            return;
        };
        match state {
            SessionState::AwaitingFirstByte => {
                render.streamed.clear();
                print!("{} ", ConsoleFormatter::label(Origin::Assistant));
                let _ = std::io::stdout().flush();
                if self.show_progress {
                    Self::start_spinner(&mut render);
                }
            }
            SessionState::Streaming | SessionState::Idle | SessionState::Errored => {
                Self::clear_spinner(&mut render);
            }
        }
    }

    fn on_delta(&self, fragment: &str) {
        let Some(mut render) = self.lock() else {
            return;
        };
        Self::clear_spinner(&mut render);
        render.streamed.push_str(fragment);
        print!("{}", fragment);
        let _ = std::io::stdout().flush();
    }

    fn on_turn_complete(&self, message: &Message) {
        let Some(mut render) = self.lock() else {
            return;
        };
        Self::clear_spinner(&mut render);

        match completion(&render.streamed, message.text()) {
            Completion::Append(rest) => println!("{}", rest),
            Completion::Replace(text) => {
                if !render.streamed.is_empty() {
                    println!();
                }
                println!("{}", ConsoleFormatter::format_failure(text));
            }
        }
        println!();
        render.streamed.clear();
    }

    fn on_thread_assigned(&self, id: &ThreadId) {
        if let Some(render) = self.lock()
            && let Some(spinner) = &render.spinner
        {
            spinner.set_message(format!("Waiting for reply (thread {})...", id));
        }
    }
}
