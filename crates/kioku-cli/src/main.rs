//! Kioku CLI
//!
//! Review vocabulary from the terminal with SM-2 scheduling.

mod config;

use std::io;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use colored::{ColoredString, Colorize};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use kioku_core::{
    describe_quality, quality_labels, Quality, QualityTier, RetentionState, ReviewService,
    SqliteStore, VocabularyProgress,
};

use crate::config::Config;

/// Kioku - spaced repetition for vocabulary
#[derive(Parser)]
#[command(name = "kioku")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Vocabulary review scheduled with the SM-2 algorithm")]
#[command(
    long_about = "Kioku tracks how well you know each vocabulary item and schedules the next review.\n\nRate each recall from 0 (blackout) to 5 (perfect), or use the Again/Hard/Good/Easy buttons."
)]
struct Cli {
    /// Custom data directory (overrides KIOKU_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Write logs to stderr as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start studying an item (due today)
    Start { learner: String, item: String },

    /// Rate a recall: 0-5, or again/hard/good/easy
    Review {
        learner: String,
        item: String,
        quality: String,
    },

    /// Record a plain right/wrong answer
    Answer {
        learner: String,
        item: String,
        #[arg(value_enum)]
        result: AnswerResult,
    },

    /// List items due today, earliest first
    Due {
        learner: String,
        /// Maximum items to list (overrides KIOKU_DUE_LIMIT)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show review statistics for an item
    Stats { learner: String, item: String },

    /// Show what each answer button would schedule, without saving
    Preview { learner: String, item: String },

    /// List the answer buttons
    Qualities,

    /// Describe a 0-5 quality rating
    Describe {
        #[arg(allow_negative_numbers = true)]
        quality: i32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AnswerResult {
    Correct,
    Wrong,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.log_json);

    let output = Output { json: cli.json };

    match cli.command {
        Commands::Start { learner, item } => {
            let config = Config::load(cli.data_dir, None)?;
            run_start(&config, output, &learner, &item)
        }
        Commands::Review {
            learner,
            item,
            quality,
        } => {
            let config = Config::load(cli.data_dir, None)?;
            run_review(&config, output, &learner, &item, &quality)
        }
        Commands::Answer {
            learner,
            item,
            result,
        } => {
            let config = Config::load(cli.data_dir, None)?;
            run_answer(&config, output, &learner, &item, result)
        }
        Commands::Due { learner, limit } => {
            let config = Config::load(cli.data_dir, limit)?;
            run_due(&config, output, &learner)
        }
        Commands::Stats { learner, item } => {
            let config = Config::load(cli.data_dir, None)?;
            run_stats(&config, output, &learner, &item)
        }
        Commands::Preview { learner, item } => {
            let config = Config::load(cli.data_dir, None)?;
            run_preview(&config, output, &learner, &item)
        }
        Commands::Qualities => run_qualities(output),
        Commands::Describe { quality } => run_describe(output, quality),
    }
}

/// Logs go to stderr so stdout stays clean for `--json`
fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false);

    if json {
        builder.json().init();
    } else {
        builder.with_ansi(false).init();
    }
}

fn open_service(config: &Config) -> anyhow::Result<ReviewService<SqliteStore>> {
    debug!(path = %config.db_path.display(), "Opening progress database");
    let store = SqliteStore::new(Some(config.db_path.clone()))?;
    Ok(ReviewService::new(store))
}

// ============================================================================
// COMMANDS
// ============================================================================

fn run_start(config: &Config, output: Output, learner: &str, item: &str) -> anyhow::Result<()> {
    let service = open_service(config)?;
    let progress = service.start_studying(learner, item)?;

    output.emit(&progress, || {
        println!("{}", "=== Kioku Start ===".cyan().bold());
        println!();
        println!("{} {}", "Now studying:".green(), progress.item_id.bold());
        println!(
            "{}: {}",
            "First review".white().bold(),
            progress.retention.next_review_date
        );
    })
}

fn run_review(
    config: &Config,
    output: Output,
    learner: &str,
    item: &str,
    quality: &str,
) -> anyhow::Result<()> {
    let quality: Quality = quality.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let service = open_service(config)?;
    let progress = service.submit_review(learner, item, quality.into())?;

    output.emit(&progress, || print_review_result(&progress, quality))
}

fn run_answer(
    config: &Config,
    output: Output,
    learner: &str,
    item: &str,
    result: AnswerResult,
) -> anyhow::Result<()> {
    let correct = result == AnswerResult::Correct;

    let service = open_service(config)?;
    let progress = service.submit_answer(learner, item, correct)?;
    let quality = kioku_core::quality_from_correct(correct);

    output.emit(&progress, || print_review_result(&progress, quality))
}

fn run_due(config: &Config, output: Output, learner: &str) -> anyhow::Result<()> {
    let service = open_service(config)?;
    let due = service.due_items(learner, config.due_limit)?;

    output.emit(&due, || {
        println!("{}", "=== Kioku Due ===".cyan().bold());
        println!();

        if due.is_empty() {
            println!("{}", "Nothing due today.".dimmed());
            return;
        }

        for progress in &due {
            println!(
                "  {:24} {} {}  {} {:.2}",
                progress.item_id.bold(),
                "due".dimmed(),
                progress.retention.next_review_date,
                "EF".dimmed(),
                progress.retention.ease_factor
            );
        }
        println!();
        println!("{}: {}", "Items".white().bold(), due.len());
    })
}

fn run_stats(config: &Config, output: Output, learner: &str, item: &str) -> anyhow::Result<()> {
    let service = open_service(config)?;
    let stats = service.review_stats(learner, item)?;

    output.emit(&stats, || {
        println!("{}", format!("=== Kioku Stats: {} ===", item).cyan().bold());
        println!();

        println!("{}: {}", "Total Reviews".white().bold(), stats.total_reviews);
        println!("{}: {}", "Correct Reviews".white().bold(), stats.correct_reviews);
        print_rate_bar("Success Rate", stats.success_rate);
        println!();
        println!("{}: {:.2}", "Ease Factor".white().bold(), stats.ease_factor);
        println!("{}: {} days", "Interval".white().bold(), stats.current_interval_days);
        println!("{}: {}", "Repetitions".white().bold(), stats.repetitions);

        match stats.days_since_last_review {
            Some(days) => println!("{}: {} days ago", "Last Review".white().bold(), days),
            None => println!("{}: {}", "Last Review".white().bold(), "never".dimmed()),
        }

        if stats.is_due {
            println!("{}: {}", "Next Review".white().bold(), "due now".yellow().bold());
        } else {
            println!(
                "{}: in {} days",
                "Next Review".white().bold(),
                stats.days_until_next_review
            );
        }
    })
}

fn run_preview(config: &Config, output: Output, learner: &str, item: &str) -> anyhow::Result<()> {
    let service = open_service(config)?;
    let preview = service.preview(learner, item)?;

    output.emit(&preview, || {
        println!("{}", format!("=== Kioku Preview: {} ===", item).cyan().bold());
        println!();

        let outcomes = [preview.again, preview.hard, preview.good, preview.easy];
        for (button, state) in quality_labels().iter().zip(outcomes.iter()) {
            print_outcome(tier_colored(button.label, button.tier), state);
        }
    })
}

fn run_qualities(output: Output) -> anyhow::Result<()> {
    let buttons = quality_labels();

    output.emit(&buttons, || {
        println!("{}", "=== Kioku Answer Buttons ===".cyan().bold());
        println!();
        for button in &buttons {
            println!(
                "  {} {:6} {}",
                button.quality,
                tier_colored(button.label, button.tier),
                button.quality.description().dimmed()
            );
        }
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QualityDescription {
    quality: i32,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    passing: Option<bool>,
}

fn run_describe(output: Output, quality: i32) -> anyhow::Result<()> {
    let described = QualityDescription {
        quality,
        description: describe_quality(quality),
        passing: Quality::new(quality).ok().map(|q| q.is_passing()),
    };

    output.emit(&described, || match described.passing {
        Some(true) => println!("{}: {}", quality, described.description.green()),
        Some(false) => println!("{}: {}", quality, described.description.red()),
        None => println!("{}: {}", quality, described.description.dimmed()),
    })
}

// ============================================================================
// OUTPUT
// ============================================================================

#[derive(Clone, Copy)]
struct Output {
    json: bool,
}

impl Output {
    /// Print `value` as JSON, or run the text renderer
    fn emit<T: Serialize>(self, value: &T, text: impl FnOnce()) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            text();
        }
        Ok(())
    }
}

fn print_review_result(progress: &VocabularyProgress, quality: Quality) {
    println!("{}", "=== Kioku Review ===".cyan().bold());
    println!();

    let verdict = if quality.is_passing() {
        quality.description().green()
    } else {
        quality.description().red()
    };
    println!("{}: {} ({})", "Rated".white().bold(), quality, verdict);
    println!(
        "{}: {} days, on {}",
        "Next Review".white().bold(),
        progress.retention.interval,
        progress.retention.next_review_date
    );
    println!(
        "{}: {:.2}",
        "Ease Factor".white().bold(),
        progress.retention.ease_factor
    );
    println!("{}: {}", "Streak".white().bold(), progress.retention.repetitions);
}

fn print_outcome(label: ColoredString, state: &RetentionState) {
    println!(
        "  {:6} {:>5} days  {}  {} {:.2}",
        label,
        state.interval,
        format_date(state.next_review_date).dimmed(),
        "EF".dimmed(),
        state.ease_factor
    );
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d (%a)").to_string()
}

fn tier_colored(label: &str, tier: QualityTier) -> ColoredString {
    match tier {
        QualityTier::Danger => label.red().bold(),
        QualityTier::Warning => label.yellow().bold(),
        QualityTier::Primary => label.blue().bold(),
        QualityTier::Success => label.green().bold(),
    }
}

fn print_rate_bar(label: &str, percentage: f64) {
    let bar_width: usize = 30;
    let filled = ((percentage.clamp(0.0, 100.0) / 100.0) * bar_width as f64) as usize;
    let empty = bar_width.saturating_sub(filled);

    let bar = format!("{}{}", "#".repeat(filled), "-".repeat(empty));
    let colored_bar = if percentage >= 80.0 {
        bar.green()
    } else if percentage >= 50.0 {
        bar.yellow()
    } else {
        bar.red()
    };

    println!(
        "{}: [{:30}] {:>5.1}%",
        label.white().bold(),
        colored_bar,
        percentage
    );
}
