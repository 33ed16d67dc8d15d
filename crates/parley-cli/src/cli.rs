use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Parley: talk to a hosted assistant from the terminal.
#[derive(Parser, Debug)]
#[command(name = "parley", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ask the assistant a question and wait for its reply.
    Ask {
        question: String,

        /// Thread to continue; a new one is created when omitted.
        #[arg(short, long)]
        thread: Option<String>,
    },

    /// Show a thread's messages, newest first.
    History {
        thread: String,

        #[arg(short, long, default_value_t = 100)]
        limit: u32,
    },

    /// One-shot completion, without an assistant or thread.
    Chat {
        message: String,

        /// System prompt sent before the message.
        #[arg(short, long)]
        system: Option<String>,

        /// Request the reply as a stream of fragments.
        #[arg(long)]
        stream: bool,
    },

    /// Show the configured assistant.
    Assistant,

    /// Print the effective configuration as JSON.
    Config,
}

pub fn parse() -> Args {
    Args::parse()
}
