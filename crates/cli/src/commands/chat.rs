//! `nova chat`: interactive tutoring session or single-message mode.

use nova_agent::{BotDeps, BotSettings, ChatReply, InvokerLimits, KnowledgeBot, ToolInvoker};
use nova_config::AppConfig;
use nova_core::message::SessionId;
use nova_core::subject::SubjectMode;
use nova_providers::ModelClient;
use nova_tools::{DuckDuckGoVideoSearch, DuckDuckGoWebSearch, WikipediaLookup};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{self, AsyncBufReadExt, BufReader};

const TOOL_INDICATOR: &str = "🔍 Searched for information";

pub struct ChatOptions {
    pub session: Option<String>,
    pub subject: Option<SubjectMode>,
    pub eli5: bool,
    pub message: Option<String>,
}

/// The one-click prompts from the quick-action commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickAction {
    Quiz,
    Flashcards,
    Videos,
    Math,
}

impl QuickAction {
    pub fn prompt(self, subject: SubjectMode) -> String {
        let name = subject.display_name();
        match self {
            Self::Quiz => format!("Generate a quiz about {name}"),
            Self::Flashcards => format!("Create flashcards for {name}"),
            Self::Videos => format!("Find educational videos about {name}"),
            Self::Math => "Help me with a math calculation".into(),
        }
    }
}

/// One line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Exit,
    Help,
    /// `/subject` alone shows the current subject
    Subject(Option<String>),
    Subjects,
    /// `/eli5` alone toggles
    Eli5(Option<bool>),
    New,
    History,
    /// `/suggest` lists, `/suggest N` sends suggestion N
    Suggest(Option<usize>),
    Quick(QuickAction),
    Message(String),
    Unknown(String),
}

pub fn parse_command(line: &str) -> ReplCommand {
    let line = line.trim();
    if matches!(line, "exit" | "quit" | "/exit" | "/quit" | ":q") {
        return ReplCommand::Exit;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return ReplCommand::Message(line.to_string());
    };

    let (command, arg) = match rest.split_once(char::is_whitespace) {
        Some((command, arg)) => (command, Some(arg.trim()).filter(|a| !a.is_empty())),
        None => (rest, None),
    };

    match command.to_lowercase().as_str() {
        "help" | "?" => ReplCommand::Help,
        "subject" => ReplCommand::Subject(arg.map(String::from)),
        "subjects" => ReplCommand::Subjects,
        "eli5" => match arg.map(str::to_lowercase).as_deref() {
            None => ReplCommand::Eli5(None),
            Some("on" | "true" | "yes") => ReplCommand::Eli5(Some(true)),
            Some("off" | "false" | "no") => ReplCommand::Eli5(Some(false)),
            Some(_) => ReplCommand::Unknown(line.to_string()),
        },
        "new" => ReplCommand::New,
        "history" => ReplCommand::History,
        "suggest" => match arg {
            None => ReplCommand::Suggest(None),
            Some(n) => match n.parse::<usize>() {
                Ok(n) => ReplCommand::Suggest(Some(n)),
                Err(_) => ReplCommand::Unknown(line.to_string()),
            },
        },
        "quiz" => ReplCommand::Quick(QuickAction::Quiz),
        "cards" | "flashcards" => ReplCommand::Quick(QuickAction::Flashcards),
        "videos" => ReplCommand::Quick(QuickAction::Videos),
        "math" => ReplCommand::Quick(QuickAction::Math),
        _ => ReplCommand::Unknown(line.to_string()),
    }
}

/// Wire the bot's collaborators from config.
pub fn build_deps(config: &AppConfig) -> anyhow::Result<BotDeps> {
    let provider = nova_providers::build_from_config(config)?;
    let model = ModelClient::from_config(provider, config);

    let timeout = Duration::from_secs(config.lookup.timeout_secs);
    let invoker = ToolInvoker::new(
        Arc::new(WikipediaLookup::new(
            &config.lookup.language,
            config.lookup.encyclopedia_sentences,
            timeout,
        )),
        Arc::new(DuckDuckGoWebSearch::new(timeout)),
        Arc::new(DuckDuckGoVideoSearch::new(timeout)),
        InvokerLimits::from(&config.lookup),
    );

    Ok(BotDeps {
        model: Arc::new(model),
        invoker: Arc::new(invoker),
        store: Arc::new(super::open_store(config)?),
    })
}

pub async fn run(config_path: Option<&Path>, options: ChatOptions) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;

    let deps = match build_deps(&config) {
        Ok(deps) => deps,
        Err(e) => {
            print_setup_help(&config);
            return Err(e);
        }
    };

    let mut settings = BotSettings::from(&config.bot);
    if let Some(subject) = options.subject {
        settings.subject = subject;
    }
    settings.eli5 |= options.eli5;

    let session_id = options
        .session
        .as_deref()
        .map(SessionId::from)
        .unwrap_or_default();
    let mut bot = KnowledgeBot::new(session_id, deps, settings).await;

    if let Some(message) = options.message {
        eprint!("  Thinking...");
        let reply = bot.chat(&message).await;
        eprint!("\r              \r");
        println!("{}", render_reply(&reply));
        return Ok(());
    }

    print_banner(&bot, &config);
    repl(&mut bot).await
}

async fn repl(bot: &mut KnowledgeBot) -> anyhow::Result<()> {
    let mut lines = BufReader::new(io::stdin()).lines();

    prompt()?;
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            prompt()?;
            continue;
        }

        let message = match parse_command(&line) {
            ReplCommand::Exit => break,
            ReplCommand::Message(text) => Some(text),
            ReplCommand::Quick(action) => Some(action.prompt(bot.settings().subject)),
            ReplCommand::Suggest(Some(n)) => {
                let suggestions = bot.settings().subject.suggestions();
                match n.checked_sub(1).and_then(|i| suggestions.get(i)) {
                    Some(suggestion) => Some(suggestion.to_string()),
                    None => {
                        println!("  Pick a number from 1 to {}.", suggestions.len());
                        None
                    }
                }
            }
            command => {
                handle_command(bot, command).await;
                None
            }
        };

        if let Some(message) = message {
            println!("  You > {message}");
            eprint!("  ...");
            let reply = bot.chat(&message).await;
            eprint!("\r     \r");
            println!();
            for line in reply_lines(&bot.settings().name, &reply) {
                println!("{line}");
            }
            println!();
        }

        prompt()?;
    }

    println!();
    println!("  Goodbye! Keep learning! 👋");
    println!();
    Ok(())
}

async fn handle_command(bot: &mut KnowledgeBot, command: ReplCommand) {
    match command {
        ReplCommand::Help => print_help(),
        ReplCommand::Subject(None) => {
            println!("  Current subject: {}", bot.settings().subject);
        }
        ReplCommand::Subject(Some(key)) => match key.parse::<SubjectMode>() {
            Ok(subject) => {
                bot.set_subject(subject);
                println!("  Subject set to {subject}");
            }
            Err(e) => println!("  {e}. Try /subjects."),
        },
        ReplCommand::Subjects => {
            for mode in SubjectMode::ALL {
                println!("  {:<12} {mode}", mode.key());
            }
        }
        ReplCommand::Eli5(flag) => {
            let enabled = flag.unwrap_or(!bot.settings().eli5);
            bot.set_eli5_mode(enabled);
            if enabled {
                println!("  🧒 ELI5 mode on: explanations will be super simple");
            } else {
                println!("  ELI5 mode off");
            }
        }
        ReplCommand::New => {
            bot.switch_session(SessionId::new()).await;
            println!("  ✨ New conversation started ({})", bot.session_id());
        }
        ReplCommand::History => {
            if bot.history().is_empty() {
                println!("  No messages yet in this conversation.");
            }
            for turn in bot.history() {
                let first_line = turn.content.lines().next().unwrap_or_default();
                println!("  {}: {first_line}", turn.speaker());
            }
        }
        ReplCommand::Suggest(_) => {
            let subject = bot.settings().subject;
            println!("  💡 Try asking ({subject}):");
            for (i, suggestion) in subject.suggestions().iter().enumerate() {
                println!("    {}. {suggestion}", i + 1);
            }
            println!("  Send one with /suggest <number>.");
        }
        ReplCommand::Unknown(line) => {
            println!("  Unknown command: {line}. Type /help for the list.");
        }
        ReplCommand::Exit | ReplCommand::Message(_) | ReplCommand::Quick(_) => {}
    }
}

/// The reply text, followed by the tool indicator when helpers contributed.
pub fn render_reply(reply: &ChatReply) -> String {
    if reply.used_tools() {
        format!("{}\n\n{TOOL_INDICATOR}", reply.text)
    } else {
        reply.text.clone()
    }
}

/// REPL output lines, each prefixed with the bot's name.
pub fn reply_lines(name: &str, reply: &ChatReply) -> Vec<String> {
    render_reply(reply)
        .lines()
        .map(|line| format!("  {name} > {line}"))
        .collect()
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}

fn print_banner(bot: &KnowledgeBot, config: &AppConfig) {
    let settings = bot.settings();
    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║   🎓 {:<10} Your Educational Study Buddy  ║", settings.name);
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Model:     {} ({})", config.model, config.provider);
    println!("  Subject:   {}", settings.subject);
    println!("  ELI5:      {}", if settings.eli5 { "on" } else { "off" });
    println!("  Session:   {}", bot.session_id());
    if !bot.history().is_empty() {
        println!("  Resumed:   {} earlier messages", bot.history().len());
    }
    println!();
    println!("  Ask anything, or type /help for commands.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();
}

fn print_help() {
    println!("  Commands:");
    println!("    /subject <key>   Switch subject focus");
    println!("    /subjects        List subjects");
    println!("    /eli5 [on|off]   Toggle simple explanations");
    println!("    /new             Start a new conversation");
    println!("    /history         Show this conversation");
    println!("    /suggest [N]     Show (or send) a suggested question");
    println!("    /quiz            Generate a quiz on the current subject");
    println!("    /cards           Create flashcards on the current subject");
    println!("    /videos          Find educational videos on the current subject");
    println!("    /math            Get help with a calculation");
    println!("    exit, quit       Leave");
}

fn print_setup_help(config: &AppConfig) {
    if config.has_api_key() {
        return;
    }
    eprintln!();
    eprintln!("  ERROR: No API key configured!");
    eprintln!();
    eprintln!("  Set one of these environment variables:");
    eprintln!("    GOOGLE_API_KEY=...   (Gemini, the default provider)");
    eprintln!("    NOVA_API_KEY=...     (any provider)");
    eprintln!();
    eprintln!("  Or add api_key to your config file:");
    eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
    eprintln!();
}
