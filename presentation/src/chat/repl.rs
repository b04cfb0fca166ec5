//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::output::console::ConsoleFormatter;
use colored::Colorize;
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use std::path::PathBuf;
use std::sync::Arc;
use threadline_application::{ConversationController, RejectReason, SendOutcome};

const HISTORY_CAPACITY: usize = 1000;

/// A line entered at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    Thread,
    History,
    Quit,
    Unknown(String),
    /// Anything that is not a slash command is a message.
    Message(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        if !line.starts_with('/') {
            return Some(ReplCommand::Message(line.to_string()));
        }

        Some(match line {
            "/help" | "/h" | "/?" => ReplCommand::Help,
            "/thread" => ReplCommand::Thread,
            "/history" => ReplCommand::History,
            "/quit" | "/exit" | "/q" => ReplCommand::Quit,
            other => ReplCommand::Unknown(other.to_string()),
        })
    }
}

/// Interactive chat REPL
pub struct ChatRepl {
    controller: Arc<ConversationController>,
    history_file: Option<PathBuf>,
}

impl ChatRepl {
    pub fn new(controller: Arc<ConversationController>) -> Self {
        Self {
            controller,
            history_file: dirs::data_dir().map(|d| d.join("threadline").join("history.txt")),
        }
    }

    /// Set the line editor history file (`None` keeps history in memory)
    pub fn with_history_file(mut self, path: Option<PathBuf>) -> Self {
        self.history_file = path;
        self
    }

    fn line_editor(&self) -> Reedline {
        let editor = Reedline::create();
        let Some(path) = &self.history_file else {
            return editor;
        };

        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match FileBackedHistory::with_file(HISTORY_CAPACITY, path.clone()) {
            Ok(history) => editor.with_history(Box::new(history)),
            Err(e) => {
                eprintln!("Could not open history file {}: {}", path.display(), e);
                editor
            }
        }
    }

    /// Run the interactive REPL until `/quit` or Ctrl-D
    pub async fn run(&self) -> std::io::Result<()> {
        let mut line_editor = self.line_editor();
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("threadline".to_string()),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome();

        loop {
            match line_editor.read_line(&prompt)? {
                Signal::Success(line) => {
                    let Some(command) = ReplCommand::parse(&line) else {
                        continue;
                    };
                    if self.handle(command).await {
                        break;
                    }
                }
                Signal::CtrlC => continue,
                Signal::CtrlD => {
                    println!("Bye!");
                    break;
                }
            }
        }

        self.controller.close();
        Ok(())
    }

    /// Send one message; Ctrl-C interrupts the reply.
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        let send = self.controller.send(text);
        tokio::pin!(send);

        let outcome = tokio::select! {
            outcome = &mut send => outcome,
            _ = tokio::signal::ctrl_c() => {
                self.controller.interrupt();
                send.await
            }
        };

        match &outcome {
            SendOutcome::Rejected(RejectReason::Busy) => {
                println!("{}", "A reply is still streaming; wait for it to finish.".yellow());
            }
            SendOutcome::Rejected(RejectReason::Closed) => {
                println!("{}", "The session is closed.".yellow());
            }
            SendOutcome::Interrupted => {
                println!("{}", "(interrupted)".dimmed());
            }
            SendOutcome::Rejected(RejectReason::EmptyMessage)
            | SendOutcome::Completed(_)
            | SendOutcome::Failed(_) => {}
        }
        outcome
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│                 Threadline                  │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!(
            "{}",
            ConsoleFormatter::format_thread(self.controller.thread_id().as_ref())
        );

        let messages = self.controller.messages();
        if !messages.is_empty() {
            println!();
            print!("{}", ConsoleFormatter::format_transcript(&messages));
        }

        println!();
        Self::print_help();
    }

    fn print_help() {
        println!("Commands:");
        println!("  /help, /h, /?     - Show this help");
        println!("  /thread           - Show the current thread id");
        println!("  /history          - Show the conversation so far");
        println!("  /quit, /exit, /q  - Exit chat");
        println!();
        println!("Press Ctrl-C while a reply is streaming to stop it.");
        println!();
    }

    /// Handle one command. Returns true if the REPL should exit.
    async fn handle(&self, command: ReplCommand) -> bool {
        match command {
            ReplCommand::Quit => {
                println!("Bye!");
                return true;
            }
            ReplCommand::Help => Self::print_help(),
            ReplCommand::Thread => {
                println!(
                    "{}",
                    ConsoleFormatter::format_thread(self.controller.thread_id().as_ref())
                );
            }
            ReplCommand::History => {
                print!(
                    "{}",
                    ConsoleFormatter::format_transcript(&self.controller.messages())
                );
            }
            ReplCommand::Unknown(cmd) => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
            }
            ReplCommand::Message(text) => {
                println!();
                self.send_message(&text).await;
            }
        }
        false
    }
}
