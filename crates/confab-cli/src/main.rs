//! confab - terminal chat client for a remote generation endpoint

mod config;
mod ui;

use clap::Parser;
use std::sync::Arc;
use std::time::Duration;

use confab_client::{ClientConfig, GenerationClient, HttpGenerationClient};
use confab_core::ConversationStore;
use confab_tui::Theme;

/// confab - chat with a remote generation service
#[derive(Parser, Debug)]
#[command(name = "confab")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base URL of the generation service (POSTs to <base-url>generate/)
    #[arg(short, long)]
    base_url: Option<String>,

    /// Send a single prompt, print the reply, and exit
    #[arg(short, long)]
    prompt: Option<String>,

    /// Total request timeout in seconds (default 60)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Connect timeout in seconds (default 60)
    #[arg(long)]
    connect_timeout_secs: Option<u64>,

    /// Theme (dark, light)
    #[arg(long)]
    theme: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,
}

fn parse_theme(s: &str) -> Theme {
    match s.to_lowercase().as_str() {
        "light" => Theme::light(),
        _ => Theme::dark(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup tracing
    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("confab=debug")
            .init();
    }

    // Initialize config and exit
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

    let file_config = config::Config::load();

    let base_url = args
        .base_url
        .or(file_config.base_url)
        .unwrap_or_else(|| config::DEFAULT_BASE_URL.to_string());

    let mut client_config = ClientConfig::new(base_url);
    if let Some(secs) = args.connect_timeout_secs.or(file_config.connect_timeout_secs) {
        client_config = client_config.with_connect_timeout(Duration::from_secs(secs));
    }
    if let Some(secs) = args.timeout_secs.or(file_config.request_timeout_secs) {
        client_config = client_config.with_request_timeout(Duration::from_secs(secs));
    }

    // One shared client for the whole session, injected into the store.
    let client = HttpGenerationClient::new(client_config)?;
    tracing::debug!(url = %client.url(), "configured generation endpoint");
    let client: Arc<dyn GenerationClient> = Arc::new(client);

    // One-shot mode
    if let Some(prompt) = args.prompt {
        return run_once(client, &prompt).await;
    }

    let theme = args
        .theme
        .or(file_config.theme)
        .map(|name| parse_theme(&name))
        .unwrap_or_default();

    ui::run_tui(client, theme).await
}

/// Send a single prompt through the store and print the reply.
///
/// Goes through the same submit lifecycle as the interactive screen,
/// so a failed request surfaces as the synthesized error line.
async fn run_once(client: Arc<dyn GenerationClient>, prompt: &str) -> anyhow::Result<()> {
    let store = ConversationStore::new(client);
    if !store.submit(prompt).is_accepted() {
        anyhow::bail!("prompt is empty");
    }
    store.wait_for_idle().await;

    match store.messages().last() {
        Some(reply) if !reply.is_user() => {
            println!("{}", reply.text);
            Ok(())
        }
        _ => anyhow::bail!("no reply received"),
    }
}
