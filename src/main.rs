mod work_hours;
use work_hours::{
    config::{parse_time_zone, Config},
    dashboard::{Action, Dashboard, DashboardState},
    label::format_hours,
    period::{parse_reference_date, Direction, Granularity},
    source::JsonFileSource,
};
use std::{io::Write, path::PathBuf};

use anyhow::{anyhow, Context, Error};
use chrono::Utc;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(about)]
/// Hours worked per employee over a day, a week or a month
struct Cli {
    /// JSON file with the exported work records [WORK_HOURS_RECORDS_PATH]
    #[arg(short, long)]
    records: Option<PathBuf>,
    /// JSON file with the employee list [WORK_HOURS_EMPLOYEES_PATH]
    #[arg(short, long)]
    employees: Option<PathBuf>,
    /// Aggregation unit [day, week, month]
    #[arg(short, long, value_parser = parse_granularity, default_value = "day")]
    granularity: Granularity,
    /// Reference date [YYYY-MM-DD, DD/MM/YYYY or RFC 3339], today when omitted
    #[arg(short, long)]
    date: Option<String>,
    /// Move back this many days, weeks or months from the reference date
    #[arg(long, default_value_t = 0, hide_default_value = true)]
    prev: u32,
    /// Move forward this many days, weeks or months from the reference date
    #[arg(long, default_value_t = 0, hide_default_value = true)]
    next: u32,
    /// IANA time zone used for day boundaries [WORK_HOURS_TIMEZONE]
    #[arg(long)]
    tz: Option<String>,
    /// Also write the summary as JSON to this file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<(), Error> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to read WORK_HOURS_* environment")?;

    let tz = match &cli.tz {
        Some(name) => parse_time_zone(name)?,
        None => config.time_zone()?,
    };
    let records_path = cli.records.or(config.records_path).ok_or_else(|| {
        anyhow!("no work records file, pass --records or set WORK_HOURS_RECORDS_PATH")
    })?;
    let employees_path = cli.employees.or(config.employees_path).ok_or_else(|| {
        anyhow!("no employees file, pass --employees or set WORK_HOURS_EMPLOYEES_PATH")
    })?;

    let today = Utc::now().with_timezone(&tz).date_naive();
    let mut state = DashboardState::new(today).reduce(Action::SelectGranularity(cli.granularity))?;
    if let Some(date) = &cli.date {
        state = state.reduce(Action::JumpTo(parse_reference_date(date, &tz)?))?;
    }
    for _ in 0..cli.prev {
        state = state.reduce(Action::Navigate(Direction::Backward))?;
    }
    for _ in 0..cli.next {
        state = state.reduce(Action::Navigate(Direction::Forward))?;
    }

    info!(
        "Summarizing {} of {} in {}",
        state.granularity, state.reference, tz
    );
    let dashboard = Dashboard::new(JsonFileSource::new(records_path, employees_path), tz);
    let view = dashboard.load(&state)?;

    println!("{}", view.label);
    for row in &view.rows {
        println!("{:<32} {}", row.employee_name, format_hours(row.total_hours));
    }

    if let Some(path) = &cli.output {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {}", path.to_string_lossy()))?;
        file.write_all(serde_json::to_string_pretty(&view)?.as_bytes())?;
    }

    Ok(())
}

fn parse_granularity(s: &str) -> Result<Granularity, String> {
    s.parse().map_err(|err: work_hours::period::UnknownGranularity| err.to_string())
}
