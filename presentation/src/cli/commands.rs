//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for threadline
#[derive(Parser, Debug)]
#[command(name = "threadline")]
#[command(author, version, about = "Streaming chat client with resumable conversation threads")]
#[command(long_about = r#"
Threadline sends messages to a chat service and streams the reply as it is
generated. The conversation thread is remembered between runs, so the next
session picks up where the last one stopped.

Configuration files are loaded from (in priority order):
1. THREADLINE_* environment variables (e.g. THREADLINE_SERVICE__BASE_URL)
2. --config <path>     Explicit config file
3. ./threadline.toml   Project-level config
4. ~/.config/threadline/config.toml   Global config

Example:
  threadline                        Start an interactive chat
  threadline "Summarize our plan"   Send one message and exit
  threadline --new-thread           Forget the stored thread and start over
"#)]
pub struct Cli {
    /// Message to send (starts interactive chat when omitted)
    pub message: Option<String>,

    /// Forget the stored thread and start a new conversation
    #[arg(long)]
    pub new_thread: bool,

    /// Chat service base URL (overrides configuration)
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration sources and effective configuration, then exit
    #[arg(long)]
    pub show_config: bool,
}
