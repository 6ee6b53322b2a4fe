use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use anuvad::catalog::{CatalogLoader, CatalogSource, DirectorySource, HttpSource};
use anuvad::config::{Config, LoggingConfig};
use anuvad::dom::Page;
use anuvad::engine::{Localizer, SnapshotStore};
use anuvad::models::LanguageCode;

#[derive(Parser)]
#[command(
    name = "anuvad",
    version,
    about = "In-place HTML text localization: rewrite pages into a language and back",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML config file (environment variables are used otherwise)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite a page into a target language
    Apply {
        /// Page file to localize
        #[arg(short, long)]
        page: PathBuf,

        /// Target language code
        #[arg(short, long)]
        language: String,

        /// Output file (the rewritten page goes to stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the localizable strings a page exposes
    Keys {
        /// Page file to scan
        #[arg(short, long)]
        page: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Report catalog coverage for a page
    Check {
        /// Page file to check
        #[arg(short, long)]
        page: PathBuf,

        /// Target language code
        #[arg(short, long)]
        language: String,
    },

    /// List the languages the catalog source offers
    Languages,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    config.validate()?;

    setup_tracing(&config.logging, cli.log_format.as_deref(), cli.verbose)?;

    tracing::info!("anuvad page localizer starting");

    match cli.command {
        Commands::Apply {
            page,
            language,
            output,
        } => {
            tracing::info!(
                page = %page.display(),
                language = %language,
                output = ?output,
                "Starting apply command"
            );
            apply(&config, page, &language, output).await?;
        }

        Commands::Keys { page, format } => {
            tracing::info!(
                page = %page.display(),
                format = %format,
                "Starting keys command"
            );
            keys(&config, page, &format).await?;
        }

        Commands::Check { page, language } => {
            tracing::info!(
                page = %page.display(),
                language = %language,
                "Starting check command"
            );
            check(&config, page, &language).await?;
        }

        Commands::Languages => {
            tracing::info!("Starting languages command");
            languages(&config).await?;
        }
    }

    tracing::info!("anuvad completed successfully");
    Ok(())
}

fn setup_tracing(logging: &LoggingConfig, format_override: Option<&str>, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("anuvad=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new(format!("anuvad={},warn", logging.level))
    };

    let format = format_override.unwrap_or(&logging.format);
    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

fn catalog_loader(config: &Config) -> Result<CatalogLoader> {
    let source: Arc<dyn CatalogSource> = match &config.catalog.base_url {
        Some(url) => Arc::new(HttpSource::new(url, config.request_timeout())?),
        None => Arc::new(DirectorySource::new(&config.catalog.directory)),
    };
    Ok(CatalogLoader::new(source))
}

async fn apply(
    config: &Config,
    page_path: PathBuf,
    language: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let language = LanguageCode::parse(language)?;
    let mut page = Page::read_file(&page_path).await?;

    let loader = catalog_loader(config)?;
    let catalog = loader.load(&language).await;
    if catalog.is_empty() {
        anyhow::bail!(
            "No catalog entries for '{language}' from {}",
            loader.describe_source()
        );
    }

    let localizer = Localizer::new(config.engine.clone());
    let mut snapshots = SnapshotStore::new();
    let report = localizer.apply(&mut page, &mut snapshots, &catalog);

    match output {
        Some(path) => {
            page.write_file(&path).await?;
            println!("Localized {} into '{language}'", page_path.display());
            println!("  Texts: {}", report.texts);
            println!("  Attributes: {}", report.attributes);
            println!("  Tagged: {}", report.tagged);
            println!("  Misses: {}", report.misses);
            println!("  Output: {}", path.display());
        }
        None => {
            tracing::info!(
                replaced = report.total(),
                misses = report.misses,
                "Rewrote page"
            );
            println!("{}", page.html());
        }
    }

    Ok(())
}

async fn keys(config: &Config, page_path: PathBuf, format: &str) -> Result<()> {
    let page = Page::read_file(&page_path).await?;
    let localizer = Localizer::new(config.engine.clone());
    let strings = localizer.source_strings(&page);

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&strings)?),
        _ => {
            println!("Localizable strings in {}:", page_path.display());
            for s in &strings {
                println!("  {:<10} {}", s.kind.to_string(), s.value);
            }
            println!("  ({} total)", strings.len());
        }
    }

    Ok(())
}

async fn check(config: &Config, page_path: PathBuf, language: &str) -> Result<()> {
    let language = LanguageCode::parse(language)?;
    let page = Page::read_file(&page_path).await?;

    let loader = catalog_loader(config)?;
    let catalog = loader.load(&language).await;

    let localizer = Localizer::new(config.engine.clone());
    let coverage = localizer.coverage(&page, &catalog);
    println!("{}", coverage.display());

    if !coverage.is_complete() {
        std::process::exit(1);
    }
    Ok(())
}

async fn languages(config: &Config) -> Result<()> {
    let loader = catalog_loader(config)?;
    let languages = loader.languages().await?;

    if languages.is_empty() {
        println!("No languages discovered from {}", loader.describe_source());
    } else {
        println!("Available languages:");
        for language in &languages {
            let catalog = loader.load(language).await;
            println!("  {language} ({} entries)", catalog.len());
        }
    }

    Ok(())
}
