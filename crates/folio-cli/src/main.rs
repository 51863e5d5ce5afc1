//! folio - chat with a portfolio's QA endpoint and serve the portfolio

mod commands;
mod config;
mod portfolio;
mod server;
mod ui;
mod utils;

use clap::Parser;
use folio_chat::{Chat, TurnOutcome};
use folio_qa::{Message, QaClient, display_text};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// folio - ask questions about a portfolio and browse it
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// QA endpoint URL (default: http://localhost:3000/api/qanything)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Ask a single question and print the answer
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// List the portfolio's assignments and exit
    #[arg(long)]
    portfolio: bool,

    /// Directory holding the portfolio's .html files
    #[arg(long)]
    portfolio_dir: Option<PathBuf>,

    /// Serve the portfolio over HTTP
    #[arg(long)]
    serve: bool,

    /// Port for --serve
    #[arg(long)]
    port: Option<u16>,

    /// Disable TUI mode (use simple stdin/stdout)
    #[arg(long)]
    no_tui: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

const FOLIO_TARGETS: &str = "folio=debug,folio_qa=debug,folio_chat=debug,folio_tui=debug";

/// `RUST_LOG` wins; otherwise -v, then --serve, then warnings only.
/// The TUI owns the terminal, so it stays quiet unless asked.
fn init_tracing(verbose: bool, serve: bool, tui: bool) {
    let default = if verbose {
        FOLIO_TARGETS.to_string()
    } else if serve {
        FOLIO_TARGETS.replace("debug", "info")
    } else if tui {
        "error".to_string()
    } else {
        "warn".to_string()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let cfg = config::Config::load();
    let use_tui = !args.no_tui
        && args.command.is_none()
        && !args.portfolio
        && !args.serve
        && cfg.tui.unwrap_or(true);
    init_tracing(args.verbose, args.serve, use_tui);

    // CLI takes precedence over the config file
    let portfolio_dir = args.portfolio_dir.unwrap_or_else(|| cfg.portfolio_dir());

    if args.portfolio {
        return list_portfolio(&portfolio_dir);
    }

    if args.serve {
        let port = args.port.unwrap_or_else(|| cfg.port());
        return server::run_server(portfolio_dir, port).await;
    }

    let endpoint = args
        .endpoint
        .unwrap_or_else(|| cfg.endpoint().to_string());
    let mut client = QaClient::new(&endpoint)?;
    if let Some(key) = cfg.api_key() {
        client = client.with_api_key(key);
    }
    tracing::debug!(endpoint = client.endpoint(), "using QA endpoint");
    let mut chat = Chat::new(Arc::new(client));

    if let Some(question) = args.command {
        return run_command(&mut chat, &question).await;
    }

    if use_tui {
        return ui::run_tui(&mut chat, &endpoint).await;
    }

    run_interactive(&mut chat, &endpoint).await
}

fn list_portfolio(dir: &Path) -> anyhow::Result<()> {
    let assignments = portfolio::list_assignments(dir)?;
    if assignments.is_empty() {
        println!("The portfolio is empty.");
        println!("Add .html files to the {} directory.", dir.display());
        return Ok(());
    }
    let width = assignments
        .iter()
        .map(|a| a.title.chars().count())
        .max()
        .unwrap_or(0);
    for assignment in &assignments {
        let pad = width - assignment.title.chars().count();
        println!("{}{}  {}", assignment.title, " ".repeat(pad), assignment.href);
    }
    Ok(())
}

fn print_answer(message: &Message) {
    if let Some(thinking) = message.thinking() {
        println!("[thinking]");
        for line in thinking.lines() {
            println!("  {}", line);
        }
        println!();
    }
    println!("{}", display_text(&message.content));

    let sources = message.source_list();
    if !sources.is_empty() {
        println!();
        println!("[{} source(s)]", sources.len());
        for (i, source) in sources.iter().enumerate() {
            println!("  {}. {} (relevance {})", i + 1, source.file_name, source.relevance());
        }
    }
}

async fn run_command(chat: &mut Chat, question: &str) -> anyhow::Result<()> {
    println!("folio> {}", question);
    println!();

    let outcome = chat.submit(question).await?;
    if let Some(answer) = chat.messages().last() {
        print_answer(answer);
    }

    match outcome {
        TurnOutcome::Completed => Ok(()),
        TurnOutcome::Failed(reason) => Err(anyhow::anyhow!(reason)),
    }
}

async fn run_interactive(chat: &mut Chat, endpoint: &str) -> anyhow::Result<()> {
    use commands::CommandResult;
    use std::io::{self, Write};

    let mut show_sources = true;

    if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
        eprintln!("folio ({})", endpoint);
        eprintln!("Type /help for commands.");
        eprintln!();
    }

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        if let Some(result) = commands::execute_command(input) {
            match result {
                CommandResult::Clear => {
                    chat.clear()?;
                    println!("Cleared conversation.");
                }
                CommandResult::ToggleSources => {
                    show_sources = !show_sources;
                    println!("Sources {}.", if show_sources { "shown" } else { "hidden" });
                }
                CommandResult::History => {
                    println!("{}", commands::format_history(&chat.history()));
                }
                CommandResult::Message(msg) => println!("{}", msg),
                CommandResult::Exit => break,
                CommandResult::Unknown(cmd) => {
                    println!("Unknown command: /{}", cmd);
                    println!("Type /help for available commands.");
                }
            }
            continue;
        }

        chat.submit(input).await?;
        if let Some(answer) = chat.messages().last() {
            if show_sources {
                print_answer(answer);
            } else {
                let mut bare = answer.clone();
                bare.sources = None;
                print_answer(&bare);
            }
        }
        println!();
    }

    Ok(())
}
