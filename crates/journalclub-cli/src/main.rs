//! Journal Club CLI - crawl sources, pick the next paper, regenerate the page

use clap::{Parser, Subcommand};
use journalclub::{Config, CrawlReport, Curator, Detail, Identifier};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Journal Club - reading-list curator
#[derive(Parser, Debug)]
#[command(name = "journalclub")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory holding the dataset, lists and page
    #[arg(long, short, default_value = ".", global = true)]
    dir: PathBuf,

    /// TOML config file (paths in it are relative to --dir)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Custom User-Agent
    #[arg(long, global = true)]
    user_agent: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Crawl the source pages and merge new papers into the dataset
    Fetch,
    /// Pick an unread paper at random as the next one
    Next,
    /// Make a specific paper the next one
    Set {
        /// Identifier (DOI URL) already in the dataset
        identifier: String,
    },
    /// Regenerate the next and history sections of the page
    Page,
    /// Print the title and citation lines of the next paper
    Message,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing();

    let Some(command) = cli.command else {
        eprintln!("Usage: journalclub <fetch|next|set <IDENTIFIER>|page|message>");
        eprintln!("   or: journalclub --help");
        std::process::exit(1);
    };

    let config = load_config(&cli.dir, cli.config.as_deref(), cli.user_agent);
    let curator = Curator::new(config).unwrap_or_else(|e| fail(e));

    match command {
        Commands::Fetch => match curator.crawl().await {
            Ok(report) => writeln_safe(&format_report(&report)),
            Err(e) => fail(e),
        },
        Commands::Next => match curator.choose_next(&mut rand::thread_rng()).await {
            Ok(detail) => writeln_safe(&format_detail(&detail)),
            Err(e) => fail(e),
        },
        Commands::Set { identifier } => match curator.set_next(Identifier::new(identifier)).await {
            Ok(detail) => writeln_safe(&format_detail(&detail)),
            Err(e) => fail(e),
        },
        Commands::Page => match curator.update_page().await {
            Ok(true) => writeln_safe("Page updated"),
            Ok(false) => writeln_safe("Page unchanged"),
            Err(e) => fail(e),
        },
        Commands::Message => match curator.message().await {
            Ok(Some(message)) => writeln_safe(&message),
            Ok(None) => {
                eprintln!("Error: next description has no title and citation lines");
                std::process::exit(1);
            }
            Err(e) => fail(e),
        },
    }
}

/// Log to stderr; `RUST_LOG` overrides the default level
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("journalclub=info,warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config(dir: &Path, config: Option<&Path>, user_agent: Option<String>) -> Config {
    let mut config = match config {
        Some(path) => Config::load(path, dir).unwrap_or_else(|e| fail(e)),
        None => Config::for_dir(dir),
    };
    if user_agent.is_some() {
        config.fetch.user_agent = user_agent;
    }
    config
}

fn format_report(report: &CrawlReport) -> String {
    let mut output = format!(
        "sources: {}\ncandidates: {}\nadded: {}\npruned: {}\n\
         skipped_empty: {}\nskipped_stopword: {}",
        report.sources,
        report.candidates,
        report.added.len(),
        report.pruned.len(),
        report.skipped_empty,
        report.skipped_stopword,
    );
    for id in &report.added {
        output.push_str(&format!("\n+ {id}"));
    }
    for id in &report.pruned {
        output.push_str(&format!("\n- {id}"));
    }
    output
}

fn format_detail(detail: &Detail) -> String {
    format!("next: {}\n{}", detail.id, detail.render())
}

fn fail(err: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", err);
    std::process::exit(1);
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}
