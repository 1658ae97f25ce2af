//! chatpulse-report - chat assistant analytics from recorded events
//!
//! Replays a JSONL chat-event log into an in-memory analytics engine and
//! prints the dashboard, a range export or the generated insights.

mod terminal;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chatpulse_core::analytics::{render, ExportFormat, ReportPeriod};
use chatpulse_core::replay::read_events;
use chatpulse_core::{ChatAnalytics, ChatEvent, Config, FaqMatcher, KnowledgeBase};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "chatpulse-report")]
#[command(about = "Reports over recorded chat assistant sessions")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Today vs. yesterday overview
    Dashboard {
        /// Chat event log (JSONL)
        events: PathBuf,

        /// Day to report on (default: date of the latest event)
        #[arg(long)]
        as_of: Option<NaiveDate>,

        /// Output format: text or json
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Per-day statistics over a date range
    Export {
        /// Chat event log (JSONL)
        events: PathBuf,

        /// First day of the range (default: end minus --days)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last day of the range (default: date of the latest event)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Window length when --from is not given
        #[arg(long, default_value_t = 7)]
        days: u32,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Rule-based observations over a trailing window
    Insights {
        /// Chat event log (JSONL)
        events: PathBuf,

        /// Window length in days
        #[arg(long, default_value_t = 7)]
        days: u32,

        /// Last day of the window (default: date of the latest event)
        #[arg(long)]
        as_of: Option<NaiveDate>,

        /// Output format: text or json
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Look a question up in the knowledge base
    Ask {
        question: String,

        /// Knowledge base file (default: from config, else built-in)
        #[arg(long)]
        knowledge_base: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Csv,
}

fn main() -> Result<()> {
    let args = Args::parse();

    Config::ensure_xdg_env();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;
    let _log_guard = chatpulse_core::logging::init(&config.logging).ok();

    match args.command {
        Command::Dashboard {
            events,
            as_of,
            format,
        } => {
            let (analytics, latest) = load(&events, &config)?;
            let day = as_of.or(latest).unwrap_or_else(today);
            let dashboard = analytics.dashboard_at(day);
            match format {
                OutputFormat::Text => terminal::print_dashboard(&dashboard),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&dashboard)?),
                OutputFormat::Csv => anyhow::bail!("csv is only supported by export"),
            }
        }
        Command::Export {
            events,
            from,
            to,
            days,
            format,
        } => {
            let (analytics, latest) = load(&events, &config)?;
            let end = to.or(latest).unwrap_or_else(today);
            let start = from.unwrap_or_else(|| ReportPeriod::last_days(days).ending_on(end).start);
            if start > end {
                anyhow::bail!("--from {} is after --to {}", start, end);
            }

            let stats = analytics.export_stats(start, end);
            match format {
                OutputFormat::Text => terminal::print_export(&stats),
                OutputFormat::Json => print!("{}", with_newline(render(&stats, ExportFormat::Json)?)),
                OutputFormat::Csv => print!("{}", render(&stats, ExportFormat::Csv)?),
            }
        }
        Command::Insights {
            events,
            days,
            as_of,
            format,
        } => {
            let (analytics, latest) = load(&events, &config)?;
            let end = as_of.or(latest).unwrap_or_else(today);
            let period = ReportPeriod::last_days(days);
            let insights = analytics.insights_at(period, end);
            match format {
                OutputFormat::Text => terminal::print_insights(&period, end, &insights),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&insights)?),
                OutputFormat::Csv => anyhow::bail!("csv is only supported by export"),
            }
        }
        Command::Ask {
            question,
            knowledge_base,
        } => {
            let kb = match knowledge_base.or(config.faq.knowledge_base.clone()) {
                Some(path) => KnowledgeBase::load_from(&path)
                    .with_context(|| format!("failed to load knowledge base {}", path.display()))?,
                None => KnowledgeBase::builtin().context("failed to load built-in knowledge base")?,
            };
            let matcher = FaqMatcher::with_min_confidence(Arc::new(kb), config.faq.min_confidence);
            terminal::print_match(&question, &matcher.find(&question));
        }
    }

    Ok(())
}

/// Replay an event log. Also returns the date of the latest event, in the
/// offset it was recorded with.
fn load(path: &Path, config: &Config) -> Result<(ChatAnalytics, Option<NaiveDate>)> {
    let events = read_events(path)
        .with_context(|| format!("failed to read events from {}", path.display()))?;

    let analytics = ChatAnalytics::new(config.analytics.clone());
    analytics.replay(&events);

    let latest = events.iter().map(ChatEvent::at).max().map(|at| at.date_naive());
    tracing::info!(
        path = %path.display(),
        events = events.len(),
        latest = ?latest,
        "Event log loaded"
    );
    Ok((analytics, latest))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn with_newline(mut s: String) -> String {
    if !s.ends_with('\n') {
        s.push('\n');
    }
    s
}
