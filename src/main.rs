//! Scrapeddit main entry point
//!
//! This is the command-line interface for the scrapeddit thread extractor.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use scrapeddit::config::{load_config_with_hash, validate_max_workers, Config};
use scrapeddit::crawler::{
    self, CommentArgs, CrawlArgs, RedditorArgs, ScrapeTarget, SubmissionArgs, SubredditArgs,
    ThreadArgs,
};
use scrapeddit::output::{
    load_statistics, print_statistics, render_raw_outcome, summarize, summarize_cleared,
};
use scrapeddit::source::{AuthorSort, CommentExpansion, ListingSort, SubmissionRef};
use scrapeddit::storage::{ClearTarget, RunCounts, RunStatus};
use scrapeddit::{Progress, ResourceProvider, Resources};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

/// Scrapeddit: bulk extraction of Reddit threads into SQLite
///
/// Scrapeddit fetches submissions, comment trees and author histories from
/// Reddit's public JSON API and keeps a local SQLite copy in sync, only
/// rewriting comments that materially changed.
#[derive(Parser, Debug)]
#[command(name = "scrapeddit")]
#[command(version)]
#[command(about = "Bulk extraction of Reddit threads into SQLite", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", default_value = "scrapeddit.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape content into the store
    Scrape {
        #[command(subcommand)]
        target: ScrapeCommand,
    },

    /// Delete stored rows
    Delete {
        #[arg(value_enum)]
        target: DeleteTarget,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Execute a raw SQL statement against the store
    Db {
        #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
        sql: Vec<String>,
    },

    /// Show store statistics and recent runs
    Stats {
        /// Number of recent runs to list
        #[arg(long, default_value_t = 10)]
        runs: usize,
    },
}

#[derive(Subcommand, Debug)]
enum ScrapeCommand {
    /// A submission and its full comment tree
    Thread {
        /// Submission id, fullname or URL
        target: String,

        /// Update rows that are already stored
        #[arg(short, long)]
        overwrite: bool,

        /// Maximum number of "more comments" stubs to expand (default: all)
        #[arg(long)]
        limit: Option<usize>,

        /// Only expand stubs hiding at least this many comments
        #[arg(long)]
        threshold: Option<u32>,
    },

    /// A single submission, without comments
    Submission {
        /// Submission id, fullname or URL
        target: String,

        #[arg(short, long)]
        overwrite: bool,
    },

    /// A single comment
    Comment {
        /// Comment id or fullname
        id: String,

        #[arg(short, long)]
        overwrite: bool,
    },

    /// A community listing and the comments of its threads
    Subreddit {
        /// Community name, with or without the r/ prefix
        name: String,

        #[arg(short, long)]
        overwrite: bool,

        /// Listing order: new, hot, top, rising, controversial
        #[arg(long, default_value = "new")]
        sort: String,

        /// Number of submissions to fetch
        #[arg(long)]
        limit: Option<usize>,

        /// Only expand stubs hiding at least this many comments
        #[arg(long)]
        threshold: Option<u32>,

        /// Worker pool width for comment sync
        #[arg(short = 'w', long)]
        max_workers: Option<usize>,

        /// Skip submissions that are already stored
        #[arg(short, long)]
        skip_existing: bool,

        /// Store submissions only, no comments
        #[arg(long)]
        subs_only: bool,
    },

    /// An author's recent comment history
    Redditor {
        /// Username, without the u/ prefix
        name: String,

        #[arg(short, long)]
        overwrite: bool,

        /// History order: new, top
        #[arg(long, default_value = "new")]
        sort: String,

        /// Number of comments to fetch
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Discover communities by following authors from a seed community
    Crawl {
        /// Seed community, with or without the r/ prefix
        seed: String,

        #[arg(short, long)]
        overwrite: bool,

        /// Recursion depth
        #[arg(long)]
        depth: Option<u32>,

        /// Authors pulled per community
        #[arg(long)]
        author_limit: Option<usize>,

        /// Comments fetched per author
        #[arg(long)]
        limit: Option<usize>,

        /// History order: new, top
        #[arg(long, default_value = "new")]
        sort: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DeleteTarget {
    Submissions,
    Comments,
    All,
}

impl From<DeleteTarget> for ClearTarget {
    fn from(target: DeleteTarget) -> Self {
        match target {
            DeleteTarget::Submissions => Self::Submissions,
            DeleteTarget::Comments => Self::Comments,
            DeleteTarget::All => Self::All,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::debug!("Configuration loaded (hash: {})", config_hash);

    let resources = Arc::new(Resources::new(config));

    match cli.command {
        Command::Scrape { target } => {
            let target = build_target(target, resources.config())?;
            handle_scrape(resources, target, &config_hash, cli.quiet).await
        }
        Command::Delete { target, yes } => handle_delete(&*resources, target, yes, &config_hash),
        Command::Db { sql } => handle_db(&*resources, &sql.join(" "), &config_hash),
        Command::Stats { runs } => handle_stats(&resources, runs),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("scrapeddit=info,warn"),
            1 => EnvFilter::new("scrapeddit=debug,info"),
            2 => EnvFilter::new("scrapeddit=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Resolves CLI arguments against configured defaults
fn build_target(command: ScrapeCommand, config: &Config) -> anyhow::Result<ScrapeTarget> {
    let scrape = &config.scrape;

    let target = match command {
        ScrapeCommand::Thread {
            target,
            overwrite,
            limit,
            threshold,
        } => ScrapeTarget::Thread(ThreadArgs {
            target: SubmissionRef::parse(&target),
            expansion: CommentExpansion {
                limit,
                threshold: threshold.unwrap_or(scrape.more_threshold),
            },
            overwrite,
        }),
        ScrapeCommand::Submission { target, overwrite } => {
            ScrapeTarget::Submission(SubmissionArgs {
                target: SubmissionRef::parse(&target),
                overwrite,
            })
        }
        ScrapeCommand::Comment { id, overwrite } => {
            ScrapeTarget::Comment(CommentArgs { id, overwrite })
        }
        ScrapeCommand::Subreddit {
            name,
            overwrite,
            sort,
            limit,
            threshold,
            max_workers,
            skip_existing,
            subs_only,
        } => {
            let max_workers = max_workers.unwrap_or(scrape.max_workers);
            validate_max_workers(max_workers)?;

            ScrapeTarget::Subreddit(SubredditArgs {
                name,
                sort: sort.parse::<ListingSort>()?,
                limit: limit.unwrap_or(scrape.listing_limit),
                overwrite,
                skip_existing,
                subs_only,
                max_workers,
                expansion: CommentExpansion {
                    limit: None,
                    threshold: threshold.unwrap_or(scrape.more_threshold),
                },
            })
        }
        ScrapeCommand::Redditor {
            name,
            overwrite,
            sort,
            limit,
        } => ScrapeTarget::Redditor(RedditorArgs {
            name,
            sort: sort.parse::<AuthorSort>()?,
            limit: limit.unwrap_or(scrape.author_comment_limit),
            overwrite,
        }),
        ScrapeCommand::Crawl {
            seed,
            overwrite,
            depth,
            author_limit,
            limit,
            sort,
        } => ScrapeTarget::Crawl(CrawlArgs {
            seed,
            depth: depth.unwrap_or(scrape.crawl_depth),
            author_limit: author_limit.unwrap_or(scrape.author_limit),
            comment_limit: limit.unwrap_or(scrape.author_comment_limit),
            sort: sort.parse::<AuthorSort>()?,
            overwrite,
        }),
    };

    Ok(target)
}

/// Handles `scrape`: runs the operation and records it as a run
async fn handle_scrape(
    resources: Arc<Resources>,
    target: ScrapeTarget,
    config_hash: &str,
    quiet: bool,
) -> anyhow::Result<()> {
    let mut store = resources.open_store()?;
    let run_id = store.create_run(&target.to_string(), config_hash)?;

    let progress = Progress::new();
    let display = (!quiet).then(|| ProgressDisplay::spawn(progress.clone()));

    let result = crawler::run(target, resources.clone(), &progress).await;

    if let Some(display) = display {
        display.stop().await;
    }

    match result {
        Ok(report) => {
            store.finish_run(run_id, RunStatus::Completed, &report.run_counts())?;
            tracing::info!("{}", summarize(&report));
            Ok(())
        }
        Err(e) => {
            store.finish_run(run_id, RunStatus::Failed, &RunCounts::default())?;
            tracing::error!("Scrape failed: {}", e);
            Err(e.into())
        }
    }
}

/// Handles `delete`: empties one or both tables
fn handle_delete(
    resources: &dyn ResourceProvider,
    target: DeleteTarget,
    yes: bool,
    config_hash: &str,
) -> anyhow::Result<()> {
    if !yes {
        bail!("Refusing to delete {:?} without --yes", target);
    }

    let mut store = resources.open_store()?;
    let run_id = store.create_run(&format!("delete {:?}", target).to_lowercase(), config_hash)?;

    let cleared = store.clear(target.into())?;
    store.finish_run(
        run_id,
        RunStatus::Completed,
        &RunCounts {
            changed: (cleared.submissions + cleared.comments) as u64,
            ..RunCounts::default()
        },
    )?;

    println!("{}", summarize_cleared(&cleared));
    Ok(())
}

/// Handles `db`: SQL errors are printed, not returned
fn handle_db(resources: &dyn ResourceProvider, sql: &str, config_hash: &str) -> anyhow::Result<()> {
    let mut store = resources.open_store()?;
    let run_id = store.create_run("db", config_hash)?;

    let status = match store.execute_raw(sql) {
        Ok(outcome) => {
            println!("{}", render_raw_outcome(&outcome));
            RunStatus::Completed
        }
        Err(e) => {
            println!("{}", e);
            RunStatus::Failed
        }
    };

    store.finish_run(run_id, status, &RunCounts::default())?;
    Ok(())
}

/// Handles `stats`: shows statistics from the database
fn handle_stats(resources: &Resources, runs: usize) -> anyhow::Result<()> {
    println!("Database: {}\n", resources.config().database.path);

    let store = resources.open_store()?;
    let stats = load_statistics(&*store, runs)?;
    print_statistics(&stats);

    Ok(())
}

/// Renders a [`Progress`] counter as a progress bar while a dispatch runs
struct ProgressDisplay {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl ProgressDisplay {
    fn spawn(progress: Progress) -> Self {
        let (stop, mut stopped) = oneshot::channel();

        let handle = tokio::spawn(async move {
            let mut bar: Option<ProgressBar> = None;
            let mut ticker = tokio::time::interval(Duration::from_millis(100));

            loop {
                tokio::select! {
                    _ = &mut stopped => break,
                    _ = ticker.tick() => {}
                }

                let snapshot = progress.snapshot();
                match (&bar, snapshot.enabled) {
                    (None, true) => {
                        let new_bar = ProgressBar::new(snapshot.total as u64);
                        new_bar.set_style(bar_style());
                        new_bar.set_message("threads");
                        new_bar.set_position(snapshot.current as u64);
                        bar = Some(new_bar);
                    }
                    (Some(active), true) => active.set_position(snapshot.current as u64),
                    (Some(active), false) => {
                        active.finish_and_clear();
                        bar = None;
                    }
                    (None, false) => {}
                }
            }

            if let Some(active) = bar {
                active.finish_and_clear();
            }
        });

        Self { stop, handle }
    }

    async fn stop(self) {
        let _ = self.stop.send(());
        let _ = self.handle.await;
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{spinner:.green} {msg} {pos}/{len} [{bar:.cyan/blue}] {percent:>3}%  \
         elapsed: {elapsed_precise}  eta: {eta_precise}",
    )
    .map(|style| style.progress_chars("█▉▊▋▌▍▎▏  "))
    .unwrap_or_else(|_| ProgressStyle::default_bar())
}
