//! audiobook-watch CLI
//!
//! Local execution entry point; meant to be run from cron or a timer.
//! Log lines go to stderr and are appended to a log file (`parser.log`
//! unless `--log-file` or `LOG_FILE` says otherwise).

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use audiobook_watch::{
    error::{AppError, Result},
    models::{Config, SinkKind},
    pipeline::{Pipeline, RunOutcome, SearchRequest},
    services::{Crawler, Discovery, HttpFetcher},
    sinks::{DocumentExporter, MailNotifier, Sink},
    utils::http,
};
use clap::{Args, Parser, Subcommand};

/// audiobook-watch - New audiobook releases, exported or mailed
#[derive(Parser, Debug)]
#[command(name = "audiobook-watch", version, about = "Audiobook release watcher")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "bookwatch.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// File that log lines are appended to
    #[arg(long, env = "LOG_FILE", default_value = "parser.log")]
    log_file: PathBuf,

    /// Log to stderr only
    #[arg(long)]
    no_log_file: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl, extract and deliver new audiobooks
    Run {
        #[command(flatten)]
        search: SearchArgs,

        /// Save documents instead of sending the digest mail
        #[arg(long)]
        export: bool,
    },

    /// List new detail pages without extracting them
    Discover {
        #[command(flatten)]
        search: SearchArgs,
    },

    /// Validate configuration, with the same overrides as `run`
    Validate {
        #[command(flatten)]
        search: SearchArgs,
    },
}

/// Overrides for the `[search]` section.
#[derive(Args, Debug)]
struct SearchArgs {
    /// Category slug, e.g. "scifi"
    #[arg(long, env = "CATEGORY")]
    category: Option<String>,

    /// Number of listing pages to fetch
    #[arg(long)]
    pages: Option<usize>,

    /// Recency window in days
    #[arg(long)]
    days: Option<u32>,
}

impl SearchArgs {
    fn apply(self, config: &mut Config) {
        if let Some(category) = self.category {
            config.search.category = category;
        }
        if let Some(pages) = self.pages {
            config.search.pages = pages;
        }
        if let Some(days) = self.days {
            config.search.window_days = days;
        }
    }
}

/// Log writer copying every line to stderr and to the log file.
struct Tee {
    file: File,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // A closed stderr must not stop the file log.
        let _ = io::stderr().write_all(buf);
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let _ = io::stderr().flush();
        self.file.flush()
    }
}

fn open_log_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Initialize logging based on verbosity flag and log file.
fn init_logging(verbose: bool, log_file: Option<&Path>) {
    let level = if verbose { "debug" } else { "info" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));
    builder.format_timestamp_secs();

    let mut open_error = None;
    if let Some(path) = log_file {
        match open_log_file(path) {
            Ok(file) => {
                builder
                    .write_style(env_logger::WriteStyle::Never)
                    .target(env_logger::Target::Pipe(Box::new(Tee { file })));
            }
            Err(e) => open_error = Some((path, e)),
        }
    }
    builder.init();

    if let Some((path, e)) = open_error {
        log::warn!("Cannot open log file {}: {}. Logging to stderr only.", path.display(), e);
    }
}

fn search_request(config: &Config) -> SearchRequest {
    SearchRequest::recent(
        config.search.category.clone(),
        config.search.pages,
        config.search.window_days,
    )
}

/// Build the pipeline and its sink from configuration.
fn build_pipeline(config: &Config) -> Result<Pipeline> {
    let client = http::create_async_client(&config.crawler)?;
    let fetcher = Arc::new(HttpFetcher::new(client.clone()));

    let sink = match config.search.sink {
        SinkKind::Export => Sink::Export(Arc::new(DocumentExporter::new(
            fetcher.clone(),
            &config.export,
        ))),
        SinkKind::Notify => Sink::Notify(Arc::new(MailNotifier::from_config(
            client,
            &config.notify,
        )?)),
    };

    Pipeline::from_config(config, fetcher, sink)
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let log_file = (!cli.no_log_file).then_some(cli.log_file.as_path());
    init_logging(cli.verbose, log_file);

    let mut config = Config::load_or_default(&cli.config);
    log::debug!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Command::Run { search, export } => {
            search.apply(&mut config);
            if export {
                config.search.sink = SinkKind::Export;
            }
            config.validate()?;

            let pipeline = build_pipeline(&config)?;
            match pipeline.run(&search_request(&config)).await? {
                RunOutcome::Aborted(abort) => return Err(AppError::Aborted(abort.to_string())),
                outcome => log::info!("Done: {}", outcome),
            }
        }

        Command::Discover { search } => {
            search.apply(&mut config);
            config.validate()?;

            let fetcher = Arc::new(HttpFetcher::from_config(&config.crawler)?);
            let crawler = Crawler::from_config(&config, fetcher)?;
            let search = search_request(&config);

            match crawler
                .crawl(&search.category, search.pages, search.cutoff)
                .await?
            {
                Discovery::NoNewItems => log::info!("No new audiobooks found"),
                Discovery::Unavailable(pages) => {
                    return Err(AppError::Aborted(format!(
                        "all {} listing page(s) failed",
                        pages.len()
                    )));
                }
                Discovery::Found(mut links) => {
                    links.sort_by(|a, b| b.published.cmp(&a.published).then(a.url.cmp(&b.url)));
                    for link in links {
                        println!("{}\t{}", link.published, link.url);
                    }
                }
            }
        }

        Command::Validate { search } => {
            search.apply(&mut config);
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
            log::info!("  category: {}", config.search.category);
            log::info!(
                "  pages: {}, window: {} days, sink: {:?}",
                config.search.pages,
                config.search.window_days,
                config.search.sink
            );
            log::info!("  max concurrent fetches: {}", config.crawler.max_concurrent);
        }
    }

    Ok(())
}
