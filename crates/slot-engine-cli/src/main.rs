//! `slots` CLI: resolve conflicts and availability for a bookable variant
//! described by a JSON scenario.
//!
//! ## Usage
//!
//! ```sh
//! # Conflicting time for the first week of July (stdin → stdout)
//! slots conflicts --from 2025-07-01 --to 2025-07-07 < scenario.json
//!
//! # Available time, read from and written to files
//! slots available --from 2025-07-01 --to 2025-07-07 -i scenario.json -o free.json
//!
//! # Can the variant be booked for this interval?
//! slots check --start 2025-07-01T09:00:00Z --end 2025-07-01T10:00:00Z -i scenario.json
//!
//! # The variant's business hours, one rule per line
//! slots hours -i scenario.json
//!
//! # Resolver diagnostics on stderr
//! slots --verbose conflicts --from 2025-07-01 --to 2025-07-01 -i scenario.json
//! ```

use std::io::{self, Read};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use slot_engine::{
    BookableVariant, BookingContext, CalendarEvent, Resource, ResourceGroup, TimeSlot, TimeSlots,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "slots",
    version,
    about = "Resource availability and booking-conflict resolver"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log resolver diagnostics to stderr
    #[arg(long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the time the variant cannot be booked, as JSON
    Conflicts {
        #[command(flatten)]
        range: DateRange,
        #[command(flatten)]
        io: IoArgs,
    },
    /// Print the time the variant can be booked, as JSON
    Available {
        #[command(flatten)]
        range: DateRange,
        #[command(flatten)]
        io: IoArgs,
    },
    /// Print `true` if the interval fits the variant's available time
    Check {
        /// Requested start (RFC 3339)
        #[arg(long)]
        start: DateTime<Utc>,
        /// Requested end (RFC 3339)
        #[arg(long)]
        end: DateTime<Utc>,
        #[command(flatten)]
        io: IoArgs,
    },
    /// Print the variant's business hours
    Hours {
        #[command(flatten)]
        io: IoArgs,
    },
}

#[derive(Args)]
struct DateRange {
    /// First local date of the range (YYYY-MM-DD)
    #[arg(long)]
    from: NaiveDate,
    /// Last local date of the range, inclusive (YYYY-MM-DD)
    #[arg(long)]
    to: NaiveDate,
}

#[derive(Args)]
struct IoArgs {
    /// Scenario file (reads from stdin if omitted)
    #[arg(short, long)]
    input: Option<String>,
    /// Output file (writes to stdout if omitted)
    #[arg(short, long)]
    output: Option<String>,
}

/// Everything the resolver needs, as read from JSON.
#[derive(Deserialize)]
struct Scenario {
    timezone: String,
    today: NaiveDate,
    #[serde(default)]
    resources: Vec<Resource>,
    #[serde(default)]
    resource_groups: Vec<ResourceGroup>,
    #[serde(default)]
    calendar_events: Vec<CalendarEvent>,
    #[serde(default)]
    variant: BookableVariant,
}

impl Scenario {
    fn load(path: Option<&str>) -> Result<Self> {
        let json = read_input(path)?;
        serde_json::from_str(&json).context("Failed to parse scenario JSON")
    }

    fn into_parts(self) -> Result<(BookingContext, BookableVariant)> {
        let timezone = slot_engine::parse_timezone(&self.timezone)?;
        tracing::debug!(
            %timezone,
            today = %self.today,
            resources = self.resources.len(),
            groups = self.resource_groups.len(),
            events = self.calendar_events.len(),
            "loaded scenario"
        );
        let mut ctx = BookingContext::new(timezone, self.today);
        ctx.resources = self.resources;
        ctx.resource_groups = self.resource_groups;
        ctx.calendar_events = self.calendar_events;
        Ok((ctx, self.variant))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Conflicts { range, io } => {
            let (ctx, variant) = Scenario::load(io.input.as_deref())?.into_parts()?;
            let conflicts = slot_engine::conflicting_timeslots(&variant, &ctx, range.from, range.to)
                .context("Failed to resolve conflicts")?;
            write_output(io.output.as_deref(), &slots_json(&conflicts)?)?;
        }
        Commands::Available { range, io } => {
            let (ctx, variant) = Scenario::load(io.input.as_deref())?.into_parts()?;
            let available = slot_engine::available_timeslots(&variant, &ctx, range.from, range.to)
                .context("Failed to resolve availability")?;
            write_output(io.output.as_deref(), &slots_json(&available)?)?;
        }
        Commands::Check { start, end, io } => {
            let requested = TimeSlot::new(start, end).context("Invalid requested interval")?;
            let (ctx, variant) = Scenario::load(io.input.as_deref())?.into_parts()?;
            let fits = slot_engine::check_booking(&variant, &ctx, &requested)
                .context("Failed to check booking")?;
            write_output(io.output.as_deref(), &format!("{fits}\n"))?;
        }
        Commands::Hours { io } => {
            let scenario = Scenario::load(io.input.as_deref())?;
            let lines: String = scenario
                .variant
                .business_hours()
                .iter()
                .map(|rule| format!("{rule}\n"))
                .collect();
            write_output(io.output.as_deref(), &lines)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "warn,slot_engine=debug,slots=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn slots_json(slots: &TimeSlots) -> Result<String> {
    let mut json = serde_json::to_string_pretty(slots)?;
    json.push('\n');
    Ok(json)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
