use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

mod config;

use config::{expand_home, load_config, resolve_api_base, WidgetConfig, API_BASE_ENV};
use faqchat_client::{CatalogQuery, FaqApi, HttpFaqClient};
use faqchat_schema::{CatalogEntry, SuggestionBlock};
use faqchat_tui::framing_prefix;

const DEFAULT_CONFIG_PATH: &str = "~/.faqchat/config.yaml";

#[derive(Parser)]
#[command(name = "faqchat", version, about = "Floating FAQ chat widget for the terminal")]
struct Cli {
    #[arg(long, help = "Config file (default ~/.faqchat/config.yaml, optional)")]
    config: Option<PathBuf>,

    #[arg(long, help = "FAQ service base address (overrides env and config)")]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Open the chat widget (default)")]
    Widget,
    #[command(about = "Ask a single question and print the answer")]
    Ask {
        #[arg(required = true, trailing_var_arg = true, help = "Question text")]
        text: Vec<String>,
    },
    #[command(about = "List or search the FAQ catalog")]
    Faq {
        #[arg(long, short = 's', default_value = "", help = "Search term")]
        search: String,
        #[arg(long, help = "Page number, starting at 1")]
        page: Option<u32>,
        #[arg(long, help = "Entries per page")]
        page_size: Option<u32>,
        #[arg(long, help = "Print raw JSON")]
        json: bool,
    },
    #[command(about = "Check that the FAQ service is reachable")]
    Health,
    #[command(about = "Validate the config file and show effective settings")]
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = expand_home(
        cli.config
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH)),
    );
    let config = load_config(&config_path, cli.config.is_some())?;

    let command = cli.command.unwrap_or(Commands::Widget);
    let interactive = matches!(command, Commands::Widget);
    let _guard = init_logging(&config, &config_path, interactive)?;

    let env_api_base = std::env::var(API_BASE_ENV).ok();
    let api_base = resolve_api_base(cli.api_base.as_deref(), env_api_base.as_deref(), &config);
    tracing::info!(%api_base, config = %config_path.display(), "faqchat starting");

    match command {
        Commands::Validate => {
            println!("Config valid.");
            println!("  config file:     {}", config_path.display());
            println!("  api base:        {api_base}");
            match config.request_timeout_secs {
                Some(secs) => println!("  request timeout: {secs}s"),
                None => println!("  request timeout: none"),
            }
            println!("  greeting:        {}", config.greeting);
        }
        Commands::Widget => {
            let api = build_client(&api_base, &config)?;
            faqchat_tui::run_widget(Arc::new(api), config.greeting.clone()).await?;
        }
        Commands::Ask { text } => {
            let api = build_client(&api_base, &config)?;
            let question = text.join(" ");
            let result = api
                .submit_query(&question)
                .await
                .with_context(|| format!("failed to query FAQ service at {api_base}"))?;

            println!("{}", result.answer);
            if let Some(block) = SuggestionBlock::from_result(&result) {
                println!();
                println!("{}", framing_prefix(block.framing).trim_end());
                for link in &block.links {
                    println!("  › {link}");
                }
            }
        }
        Commands::Faq {
            search,
            page,
            page_size,
            json,
        } => {
            let api = build_client(&api_base, &config)?;
            let mut query = CatalogQuery::search(search);
            query.page = page;
            query.page_size = page_size;
            let entries = api
                .search_catalog_page(&query)
                .await
                .with_context(|| format!("failed to list FAQ catalog at {api_base}"))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                print_catalog(&entries);
            }
        }
        Commands::Health => {
            let api = build_client(&api_base, &config)?;
            let info = api
                .health()
                .await
                .with_context(|| format!("FAQ service unreachable at {api_base}"))?;
            let status = if info.ok { "ok" } else { "not ok" };
            println!("{} at {api_base}: {status}", info.service);
            if let Some(docs) = info.docs {
                println!("  docs: {api_base}{docs}");
            }
        }
    }

    Ok(())
}

fn build_client(api_base: &str, config: &WidgetConfig) -> Result<HttpFaqClient> {
    HttpFaqClient::with_timeout(api_base, config.request_timeout())
        .with_context(|| format!("failed to create FAQ client for {api_base}"))
}

fn print_catalog(entries: &[CatalogEntry]) {
    if entries.is_empty() {
        println!("No FAQ entries found.");
        return;
    }
    for entry in entries {
        println!("#{} {}", entry.id, entry.question);
        println!("    {}", entry.answer);
        let tags = entry.tag_list();
        if !tags.is_empty() {
            println!("    tags: {}", tags.join(", "));
        }
    }
}

/// Daily rolling log file, plus stderr when the terminal is not owned by the
/// widget.
fn init_logging(
    config: &WidgetConfig,
    config_path: &Path,
    interactive: bool,
) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let log_dir = config.log_dir.clone().unwrap_or_else(|| {
        config_path
            .parent()
            .map(|dir| dir.join("logs"))
            .unwrap_or_else(|| PathBuf::from("logs"))
    });
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log dir: {}", log_dir.display()))?;
    let file_appender = tracing_appender::rolling::daily(&log_dir, "faqchat.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let stderr_layer = (!interactive).then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(tracing_subscriber::filter::LevelFilter::WARN)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking),
        )
        .init();

    Ok(guard)
}
