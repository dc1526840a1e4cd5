//! Review crawler CLI
//!
//! Local execution entry point.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use review_crawler::{
    error::Result,
    models::{Category, Config},
    pipeline,
    services::{PageFetcher, SessionClient},
    storage::LocalStorage,
};

/// Review crawler - exports the reviews of one catalog item to CSV
#[derive(Parser, Debug)]
#[command(
    name = "review-crawler",
    version,
    about = "Crawls the review listing of a single catalog item"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl reviews and write one CSV per category
    Crawl {
        /// Catalog item id (e.g. 10583099)
        item_id: String,

        /// Restrict to these categories (read, reading, want-to-read)
        #[arg(long = "category", value_delimiter = ',')]
        categories: Vec<Category>,

        /// Credential cookie string (overrides config and environment)
        #[arg(long)]
        cookies: Option<String>,

        /// Output directory (overrides config and environment)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show item metadata and review totals without crawling
    Info {
        /// Catalog item id
        item_id: String,
    },

    /// Validate configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Load a `.env` file from the working directory into the process
/// environment. Variables already set take precedence.
fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => log::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => log::warn!("Ignoring unreadable .env file: {}", e),
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    load_dotenv();

    let mut config = Config::load_or_default(&cli.config);
    config.apply_env_overrides(|key| std::env::var(key).ok());

    match cli.command {
        Command::Crawl {
            item_id,
            categories,
            cookies,
            output,
        } => {
            if let Some(cookies) = cookies {
                config.auth.cookies = Some(cookies);
            }
            if let Some(dir) = output {
                config.output.dir = dir;
            }
            config.validate()?;

            let categories = if categories.is_empty() {
                Category::ALL.to_vec()
            } else {
                categories
            };

            log::info!("Crawling reviews of item {}", item_id);
            let fetcher: Arc<dyn PageFetcher> = Arc::new(SessionClient::new(&config)?);
            let storage = LocalStorage::new(&config.output.dir);

            let summary =
                pipeline::run_crawler(&config, fetcher, &storage, &item_id, &categories).await?;

            for report in &summary.categories {
                match &report.written {
                    Some(meta) => log::info!(
                        "[{}] {}/{} reviews ({} pages, {:?}) -> {}",
                        report.category,
                        report.collected,
                        report.limit,
                        report.pages,
                        report.stop,
                        meta.path.display()
                    ),
                    None if report.export_failed => log::error!(
                        "[{}] {} reviews collected but not saved",
                        report.category,
                        report.collected
                    ),
                    None => log::warn!("[{}] No reviews collected", report.category),
                }
            }
            log::info!(
                "Crawl complete: {} reviews of \"{}\"",
                summary.collected(),
                summary.item.title
            );
        }

        Command::Info { item_id } => {
            config.validate()?;
            let fetcher: Arc<dyn PageFetcher> = Arc::new(SessionClient::new(&config)?);
            let (item, counts) = pipeline::fetch_metadata(&config, fetcher, &item_id).await?;

            log::info!("Item {}: \"{}\" by {}", item.item_id, item.title, item.author);
            for (category, total) in &counts {
                log::info!(
                    "  {}: {} reported, {} would be crawled",
                    category,
                    total,
                    config.crawl_limit(*total)
                );
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
            log::info!("  Base URL: {}", config.crawler.base());
            log::info!(
                "  Delay: {}-{} ms per request",
                config.crawler.min_delay_ms,
                config.crawler.max_delay_ms
            );
            log::info!("  Output: {}", config.output.dir.display());
            log::info!(
                "  Credential: {}",
                if config.is_authenticated() {
                    "configured"
                } else {
                    "none"
                }
            );
        }
    }

    Ok(())
}
