//! Console output formatter for conversation transcripts

use colored::Colorize;
use threadline_domain::{Message, Origin, ThreadId};

/// Formats messages and session info for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Speaker label shown before a message.
    pub fn label(origin: Origin) -> String {
        match origin {
            Origin::User => format!("{}", "you ›".cyan().bold()),
            Origin::Assistant => format!("{}", "assistant ›".green().bold()),
        }
    }

    /// Format one message, indenting continuation lines under the label.
    pub fn format_message(message: &Message) -> String {
        let mut text = Self::indent_continuation(message.text(), "  ");
        if message.is_pending() {
            text.push_str(&format!(" {}", "…".dimmed()));
        }
        format!("{} {}", Self::label(message.origin()), text)
    }

    /// Format the full transcript.
    pub fn format_transcript(messages: &[Message]) -> String {
        if messages.is_empty() {
            return format!("{}\n", "(no messages yet)".dimmed());
        }

        let mut output = String::new();
        output.push_str(&Self::header("Conversation"));
        output.push('\n');
        for message in messages {
            output.push_str(&Self::format_message(message));
            output.push_str("\n\n");
        }
        output
    }

    pub fn format_thread(thread_id: Option<&ThreadId>) -> String {
        match thread_id {
            Some(id) => format!("{} {}", "Thread:".cyan().bold(), id),
            None => format!(
                "{} {}",
                "Thread:".cyan().bold(),
                "(none yet, one is assigned on the first reply)".dimmed()
            ),
        }
    }

    /// Error line shown when a reply fails.
    pub fn format_failure(text: &str) -> String {
        format!("{}", text.red())
    }

    fn header(title: &str) -> String {
        let line = "─".repeat(48);
        format!("{}\n{}\n{}", line.dimmed(), title.bold(), line.dimmed())
    }

    /// Indent every line after the first
    pub fn indent_continuation(text: &str, prefix: &str) -> String {
        text.lines()
            .enumerate()
            .map(|(i, line)| {
                if i == 0 {
                    line.to_string()
                } else {
                    format!("{}{}", prefix, line)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
