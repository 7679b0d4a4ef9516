//! Command-line interface for the `sift` site search server.

use std::{
    env, fs, future, io,
    net::SocketAddr,
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
    time::Duration,
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use sift::{SearchService, http, spawn_indexers};
use sift_config::{CONFIG_FILENAME, Config, ConfigWarning, config_template};
use sift_crawl::{Crawler, HttpFetcher};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sift")]
#[command(about = "Fuzzy search server for static multi-locale sites")]
/// Top-level CLI options.
struct Cli {
    #[command(subcommand)]
    /// Subcommand to execute.
    command: Commands,
}

#[derive(Subcommand)]
/// Supported `sift` subcommands.
enum Commands {
    /// Crawl every site and serve search queries
    Serve {
        /// Configuration file
        #[arg(short, long, default_value = CONFIG_FILENAME)]
        config: PathBuf,

        /// Address to listen on, overriding the configuration
        #[arg(short, long)]
        bind: Option<SocketAddr>,

        /// Log at debug level
        #[arg(short, long)]
        verbose: bool,
    },

    /// Crawl one site and print the documents it yields
    Crawl {
        /// Site id
        site: String,

        /// Configuration file
        #[arg(short, long, default_value = CONFIG_FILENAME)]
        config: PathBuf,

        /// Print documents as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration and diagnose issues
    Check {
        /// Configuration file
        #[arg(short, long, default_value = CONFIG_FILENAME)]
        config: PathBuf,
    },

    /// Write a configuration file to the current directory
    Init {
        /// Overwrite existing configuration file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            config,
            bind,
            verbose,
        } => {
            init_tracing(verbose);
            match serve(&config, bind).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("error: {e:#}");
                    ExitCode::FAILURE
                }
            }
        }
        Commands::Crawl { site, config, json } => {
            init_tracing(false);
            cmd_crawl(&config, &site, json).await
        }
        Commands::Check { config } => cmd_check(&config),
        Commands::Init { force } => cmd_init(force),
    }
}

/// Installs the log subscriber. `RUST_LOG` wins unless `verbose` is set.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

/// Loads the configuration and logs any warnings.
fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = Config::load(path)?;
    for warning in config.validate() {
        warn!("config: {warning}");
    }
    Ok(config)
}

/// Creates the production crawler.
fn http_crawler(config: &Config) -> anyhow::Result<Crawler> {
    let fetcher = HttpFetcher::new(&config.crawl)?;
    Ok(Crawler::new(
        Arc::new(fetcher),
        &config.crawl,
        &config.selectors,
    )?)
}

/// Implements `sift serve`.
async fn serve(config_path: &Path, bind: Option<SocketAddr>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let crawler = Arc::new(http_crawler(&config)?);
    let service = Arc::new(SearchService::new(&config));

    let refresh = (config.crawl.refresh_interval_secs > 0)
        .then(|| Duration::from_secs(config.crawl.refresh_interval_secs));
    let indexers = spawn_indexers(&service, &crawler, refresh);

    let app = http::router(Arc::clone(&service), &config.rate_limit);
    let addr = bind.unwrap_or(config.server.bind);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("listening on http://{addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    for handle in indexers {
        handle.abort();
    }
    info!("shut down");
    Ok(())
}

/// Resolves when the process receives Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {e}");
        future::pending::<()>().await;
    }
}

/// Implements `sift crawl`.
async fn cmd_crawl(config_path: &Path, site_id: &str, json: bool) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let Some(site) = config.site(site_id) else {
        eprintln!("error: site not found: {site_id}");
        return ExitCode::FAILURE;
    };

    let crawler = match http_crawler(&config) {
        Ok(crawler) => crawler,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let documents = match crawler.crawl(&site.url).await {
        Ok(documents) => documents,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if json {
        match serde_json::to_string_pretty(&documents) {
            Ok(out) => println!("{out}"),
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        for doc in &documents {
            println!("{}", doc.title);
            println!("  {}", doc.url);
            println!(
                "  {} sentences, tags: {}",
                doc.content.len(),
                doc.tags.join(", ")
            );
        }
        println!("{} documents", documents.len());
    }

    ExitCode::SUCCESS
}

/// Implements the `sift init` command.
fn cmd_init(force: bool) -> ExitCode {
    let cwd = match env::current_dir() {
        Ok(cwd) => cwd,
        Err(e) => {
            eprintln!("error: could not determine current directory: {e}");
            return ExitCode::FAILURE;
        }
    };
    let config_path = cwd.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        eprintln!(
            "error: configuration file already exists: {}",
            config_path.display()
        );
        eprintln!("use --force to overwrite");
        return ExitCode::FAILURE;
    }

    if let Err(e) = fs::write(&config_path, config_template()) {
        eprintln!("error: failed to write {}: {e}", config_path.display());
        return ExitCode::FAILURE;
    }

    println!("Created {}", config_path.display());
    ExitCode::SUCCESS
}

/// Exit codes for `sift check`.
mod exit_codes {
    use std::process::ExitCode;

    /// Configuration is valid with no warnings.
    pub const OK: ExitCode = ExitCode::SUCCESS;
    /// Configuration has warnings but is usable.
    pub const WARNINGS: ExitCode = ExitCode::FAILURE;
    /// Configuration has errors and cannot be used.
    pub const ERROR: ExitCode = ExitCode::FAILURE;
}

/// Implements the `sift check` command.
fn cmd_check(config_path: &Path) -> ExitCode {
    println!("Checking configuration...");
    println!();

    if !config_path.exists() {
        println!("No configuration file found at {}.", config_path.display());
        println!();
        println!("Run 'sift init' to create a configuration file.");
        return exit_codes::OK;
    }

    let config = match Config::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return exit_codes::ERROR;
        }
    };

    println!("Sites:");
    if config.sites.is_empty() {
        println!("  (none defined)");
    } else {
        for site in &config.sites {
            println!("  {} -> {}", site.id, site.url);
        }
    }
    println!();

    println!("Effective settings:");
    print!("{}", config.settings_to_toml());
    println!();

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("No issues found.");
        return exit_codes::OK;
    }

    println!("Warnings ({}):", warnings.len());
    for warning in &warnings {
        println!("  - {warning}");
    }
    println!();

    print_hints(&warnings);

    exit_codes::WARNINGS
}

/// Prints hints for resolving common warnings.
fn print_hints(warnings: &[ConfigWarning]) {
    let mut hints: Vec<&str> = warnings
        .iter()
        .map(|warning| match warning {
            ConfigWarning::NoSitesDefined => "Add a [site.<id>] section with the site url.",
            ConfigWarning::SiteUrlNotDirectory { .. } => {
                "End site urls with '/' so sitemap.xml resolves beneath them."
            }
            ConfigWarning::UnsupportedScheme { .. } => "Site urls must use http or https.",
            ConfigWarning::ThresholdOutOfRange { .. } | ConfigWarning::WeightOutOfRange { .. } => {
                "Scores run from 0 to 1; keep thresholds and weights in that range."
            }
            ConfigWarning::PatternLengthCapped { .. } => {
                "Longer queries fall back to token matching regardless."
            }
            ConfigWarning::InconsistentLimits { .. } => {
                "Set search.default_limit between 1 and search.max_limit."
            }
            ConfigWarning::ZeroConcurrency => "Set crawl.concurrency to at least 1.",
        })
        .collect();

    hints.sort_unstable();
    hints.dedup();

    if !hints.is_empty() {
        println!("Hints:");
        for hint in hints {
            println!("  - {hint}");
        }
    }
}
