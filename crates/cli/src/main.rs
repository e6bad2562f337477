//! Nova CLI: the main entry point.
//!
//! Commands:
//! - `chat`      Interactive tutoring session or single-message mode
//! - `history`   List, show, or delete saved conversations
//! - `calc`      Evaluate an expression without calling the model
//! - `subjects`  List the subject modes
//! - `onboard`   Write the default config file

use clap::{Parser, Subcommand};
use nova_core::subject::SubjectMode;
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "nova",
    about = "Nova: your educational AI study buddy",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Config file (defaults to $NOVA_CONFIG or ~/.nova/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with Nova
    Chat {
        /// Resume a saved session instead of starting a new one
        #[arg(long, value_name = "ID")]
        session: Option<String>,

        /// Subject focus (general, math, science, history, literature, programming, geography, art)
        #[arg(long, value_name = "KEY")]
        subject: Option<SubjectMode>,

        /// Explain like I'm five
        #[arg(long)]
        eli5: bool,

        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Manage saved conversations
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Evaluate a math expression
    Calc {
        /// The expression, e.g. "(2 + 3) * 4"
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        expression: Vec<String>,
    },

    /// List subject modes
    Subjects,

    /// Write the default configuration
    Onboard,
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List saved conversations, most recent first
    List {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Print one conversation
    Show {
        #[arg(value_name = "ID")]
        session: String,
    },

    /// Delete one conversation
    Delete {
        #[arg(value_name = "ID")]
        session: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so chat output stays clean.
    let filter = if cli.verbose { "debug" } else { "warn" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Chat {
            session,
            subject,
            eli5,
            message,
        } => {
            let options = commands::chat::ChatOptions {
                session,
                subject,
                eli5,
                message,
            };
            commands::chat::run(config_path, options).await?
        }
        Commands::History { action } => match action {
            HistoryAction::List { limit } => commands::history::list(config_path, limit).await?,
            HistoryAction::Show { session } => commands::history::show(config_path, &session).await?,
            HistoryAction::Delete { session } => {
                commands::history::delete(config_path, &session).await?
            }
        },
        Commands::Calc { expression } => commands::calc::run(&expression.join(" ")),
        Commands::Subjects => commands::subjects::run(),
        Commands::Onboard => commands::onboard::run(config_path)?,
    }

    Ok(())
}
