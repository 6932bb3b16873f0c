//! `slot` CLI — find free meeting slots and book calendar events.
//!
//! ## Usage
//!
//! ```sh
//! # Free 60-minute slots over the next 7 days (queries the calendar backend)
//! SLOT_ACCESS_TOKEN=... slot slots --duration 60
//!
//! # Same search against busy intervals from a JSON file, no network
//! slot slots --duration 30 --from 2026-03-16 --busy busy.json
//!
//! # Book an event at a fixed time
//! slot book --title "Sync" --start 2026-03-16T10:00:00Z --end 2026-03-16T10:30:00Z \
//!     --attendee ada@example.com
//!
//! # Find the earliest free slot and book it
//! slot schedule --title "Project Kickoff" --duration 60 --attendee ada@example.com
//! ```
//!
//! Backend settings come from `--config FILE` (TOML) and `SLOT_*` environment
//! variables. Logs go to stderr; set `RUST_LOG` or pass `-v` for more.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use slot_booking::{Config, EventRequest, GoogleCalendar, MeetingRequest, Scheduler};
use slot_engine::{AvailabilityRequest, BusySet, SlotSearchResult, TimeInterval};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "slot", version, about = "Find free meeting slots and book calendar events")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List free slots of a given length
    Slots {
        #[command(flatten)]
        search: SearchArgs,
        /// JSON file of busy intervals ([{"start": ..., "end": ...}]); skips the backend
        #[arg(long)]
        busy: Option<PathBuf>,
    },
    /// Create a calendar event at a fixed time
    Book {
        #[arg(long)]
        title: String,
        /// Start instant (RFC 3339)
        #[arg(long, value_parser = parse_instant)]
        start: DateTime<Utc>,
        /// End instant (RFC 3339)
        #[arg(long, value_parser = parse_instant)]
        end: DateTime<Utc>,
        #[command(flatten)]
        event: EventArgs,
    },
    /// Book the earliest free slot
    Schedule {
        #[arg(long)]
        title: String,
        #[command(flatten)]
        search: SearchArgs,
        #[command(flatten)]
        event: EventArgs,
        /// Book this start instant (RFC 3339) instead of the earliest slot
        #[arg(long, value_parser = parse_instant)]
        at: Option<DateTime<Utc>>,
        /// Print the outcome as JSON instead of a text summary
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct SearchArgs {
    /// Meeting length in minutes
    #[arg(long)]
    duration: i64,
    /// Number of days to search
    #[arg(long, default_value_t = 7)]
    days: u32,
    /// First day to search (YYYY-MM-DD); defaults to today
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Daily window opening (HH:MM)
    #[arg(long, default_value = "10:00", value_parser = parse_time)]
    window_start: NaiveTime,
    /// Daily window closing (HH:MM)
    #[arg(long, default_value = "17:00", value_parser = parse_time)]
    window_end: NaiveTime,
    /// Scan step in minutes
    #[arg(long, default_value_t = 15)]
    step: i64,
    /// Comma-separated weekdays to skip, or "none"
    #[arg(long, default_value = "sat,sun")]
    exclude_days: String,
    /// IANA timezone of the daily window
    #[arg(long, default_value = "UTC", value_parser = parse_timezone)]
    timezone: Tz,
}

#[derive(Args)]
struct EventArgs {
    /// Attendee email (repeatable)
    #[arg(long = "attendee")]
    attendees: Vec<String>,
    #[arg(long)]
    description: Option<String>,
    /// Timezone label attached to the event
    #[arg(long = "event-timezone", default_value = "UTC")]
    event_timezone: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Slots { search, busy } => {
            let req = build_search(&search)?;
            let result = match busy {
                Some(path) => {
                    let busy = read_busy(&path)?;
                    slot_engine::find_slots(&busy, &req).unwrap_or_else(|e| {
                        SlotSearchResult::empty(format!("Error finding slots: {}", e))
                    })
                }
                None => scheduler(&config)?.find_slots(&req),
            };
            print_json(&result)?;
        }
        Commands::Book {
            title,
            start,
            end,
            event,
        } => {
            // Not via TimeInterval: an inverted range is reported by booking validation.
            let req = EventRequest {
                title,
                description: event.description,
                start,
                end,
                attendee_emails: event.attendees.into_iter().collect(),
                timezone: event.event_timezone,
            };
            let result = scheduler(&config)?.book(&req);
            print_json(&result)?;
            if !result.is_success() {
                process::exit(1);
            }
        }
        Commands::Schedule {
            title,
            search,
            event,
            at,
            json,
        } => {
            let req = build_search(&search)?;
            let slot = match at {
                Some(start) => {
                    let end = start
                        .checked_add_signed(req.duration)
                        .context("Invalid --at: meeting end is out of range")?;
                    Some(TimeInterval::new(start, end).context("Invalid --at")?)
                }
                None => None,
            };
            let meeting = MeetingRequest {
                title,
                description: event.description,
                attendee_emails: event.attendees.into_iter().collect::<BTreeSet<_>>(),
                timezone: event.event_timezone,
                search: req,
                slot,
            };
            let outcome = scheduler(&config)?.schedule(&meeting);
            if json {
                print_json(&outcome)?;
            } else {
                print!("{}", outcome.summary());
            }
            if !outcome.is_booked() {
                process::exit(1);
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn scheduler(config: &Config) -> Result<Scheduler<GoogleCalendar>> {
    let backend =
        GoogleCalendar::from_config(config).context("Failed to create calendar client")?;
    Ok(Scheduler::from_config(backend, config))
}

/// Build the engine request. Without `--from` the search starts today and
/// skips slots that have already begun.
fn build_search(args: &SearchArgs) -> Result<AvailabilityRequest> {
    let now = Utc::now();
    let from = args
        .from
        .unwrap_or_else(|| now.with_timezone(&args.timezone).date_naive());

    let mut req = AvailabilityRequest::new(minutes("--duration", args.duration)?, from)
        .with_range_days(args.days)
        .with_window(args.window_start, args.window_end)
        .with_step(minutes("--step", args.step)?)
        .with_excluded_weekdays(parse_weekdays(&args.exclude_days)?)
        .with_timezone(args.timezone);
    if args.from.is_none() {
        req = req.with_not_before(now);
    }
    Ok(req)
}

fn minutes(flag: &str, value: i64) -> Result<Duration> {
    Duration::try_minutes(value)
        .with_context(|| format!("{} of {} minutes is out of range", flag, value))
}

fn parse_weekdays(raw: &str) -> Result<Vec<Weekday>> {
    if raw.trim().eq_ignore_ascii_case("none") {
        return Ok(Vec::new());
    }
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<Weekday>()
                .map_err(|_| anyhow::anyhow!("Unknown weekday: '{}'", part))
        })
        .collect()
}

fn parse_instant(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 instant: {}", e))
}

fn parse_timezone(raw: &str) -> std::result::Result<Tz, String> {
    raw.parse::<Tz>()
        .map_err(|_| format!("unknown IANA timezone '{}'", raw))
}

fn parse_time(raw: &str) -> std::result::Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw, "%H:%M").map_err(|e| format!("expected HH:MM: {}", e))
}

fn read_busy(path: &Path) -> Result<BusySet> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let intervals: Vec<TimeInterval> = serde_json::from_str(&text)
        .with_context(|| format!("Invalid busy intervals in {}", path.display()))?;
    if let Some(bad) = intervals.iter().find(|iv| iv.start >= iv.end) {
        anyhow::bail!(
            "Busy interval {} - {} in {} is empty or inverted",
            bad.start.to_rfc3339(),
            bad.end.to_rfc3339(),
            path.display()
        );
    }
    Ok(BusySet::new(intervals))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
