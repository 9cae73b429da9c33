//! Momentum CLI - command-line interface for the Momentum engine
//!
//! Commands:
//! - report / insights / trend: derive analytics from a snapshot
//! - validate: check snapshot integrity
//! - goal / habit / check-in / toggle: edit the tracker state in a data directory
//! - doctor: diagnose the data directory

use clap::{Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use momentum_engine::store::{
    load_collection, load_snapshot, FileStore, SnapshotStore, GOALS_KEY, HABITS_KEY,
};
use momentum_engine::types::{parse_day, Goal, Habit, HabitType, Snapshot};
use momentum_engine::{
    generate_insights, trend_series, validate_snapshot, EngineError, ReportBuilder, ToggleOutcome,
    Tracker, ENGINE_NAME, ENGINE_VERSION,
};

/// Momentum - goal and habit analytics
#[derive(Parser)]
#[command(name = "momentum")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Track habits and derive progress, impact and insights", long_about = None)]
struct Cli {
    /// Directory holding the tracker state
    #[arg(long, global = true, env = "MOMENTUM_DATA_DIR", default_value = ".momentum")]
    data_dir: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the full report
    Report(AnalyticsArgs),

    /// Print the ranked insight list
    Insights(AnalyticsArgs),

    /// Print the 7-day trend series
    Trend(AnalyticsArgs),

    /// Check snapshot integrity
    Validate {
        /// Snapshot file (use - for stdin); defaults to the data directory
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage goals
    #[command(subcommand)]
    Goal(GoalCommand),

    /// Manage habits
    #[command(subcommand)]
    Habit(HabitCommand),

    /// Record a completion with a friction rating
    CheckIn {
        habit_id: String,

        /// Difficulty from 1 (very easy) to 5 (very hard)
        #[arg(short, long, default_value = "3")]
        friction: u8,

        /// Optional note
        #[arg(short, long)]
        note: Option<String>,

        /// Day to record (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },

    /// Uncomplete a habit for a day, or complete it when --friction is given
    Toggle {
        habit_id: String,

        /// Friction used when the toggle completes the habit
        #[arg(short, long)]
        friction: Option<u8>,

        /// Day to toggle (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },

    /// Diagnose the data directory
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args)]
struct AnalyticsArgs {
    /// Snapshot file (use - for stdin); defaults to the data directory
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Reference date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    date: Option<String>,

    /// Output format
    #[arg(long, default_value = "json-pretty")]
    output_format: OutputFormat,
}

#[derive(Subcommand)]
enum GoalCommand {
    /// Create a goal
    Add {
        name: String,

        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Delete a goal and all of its habits
    Delete { goal_id: String },
    /// List goals
    List,
}

#[derive(Subcommand)]
enum HabitCommand {
    /// Create a habit under a goal
    Add {
        goal_id: String,
        name: String,

        #[arg(long, value_enum, default_value = "growth")]
        kind: HabitKindArg,
    },
    /// Delete a habit
    Delete { habit_id: String },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, Copy, ValueEnum)]
enum HabitKindArg {
    Growth,
    Maintenance,
}

impl From<HabitKindArg> for HabitType {
    fn from(kind: HabitKindArg) -> Self {
        match kind {
            HabitKindArg::Growth => HabitType::Growth,
            HabitKindArg::Maintenance => HabitType::Maintenance,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).with_target(false).compact())
        .init();
}

fn run(cli: Cli) -> Result<(), MomentumCliError> {
    let data_dir = cli.data_dir;

    match cli.command {
        Commands::Report(args) => {
            let (snapshot, date) = analytics_inputs(&data_dir, &args)?;
            let report = ReportBuilder::new().build(&snapshot, date);
            print_json(&report, &args.output_format)
        }

        Commands::Insights(args) => {
            let (snapshot, date) = analytics_inputs(&data_dir, &args)?;
            print_json(&generate_insights(&snapshot.habits, date), &args.output_format)
        }

        Commands::Trend(args) => {
            let (snapshot, date) = analytics_inputs(&data_dir, &args)?;
            print_json(&trend_series(&snapshot.habits, date), &args.output_format)
        }

        Commands::Validate { input, json } => cmd_validate(&data_dir, input.as_deref(), json),

        Commands::Goal(command) => cmd_goal(&data_dir, command),

        Commands::Habit(command) => cmd_habit(&data_dir, command),

        Commands::CheckIn {
            habit_id,
            friction,
            note,
            date,
        } => {
            let date = resolve_date(date.as_deref())?;
            with_tracker(&data_dir, |tracker| {
                tracker.complete_with_friction(&habit_id, date, friction, note.as_deref())?;
                println!("Checked in {habit_id} on {date} (friction {friction})");
                Ok(())
            })
        }

        Commands::Toggle {
            habit_id,
            friction,
            date,
        } => {
            let date = resolve_date(date.as_deref())?;
            with_tracker(&data_dir, |tracker| {
                match (tracker.toggle(&habit_id, date)?, friction) {
                    (ToggleOutcome::Uncompleted, _) => {
                        println!("Uncompleted {habit_id} on {date}");
                        Ok(())
                    }
                    (ToggleOutcome::NeedsCheckIn, Some(friction)) => {
                        tracker.complete_with_friction(&habit_id, date, friction, None)?;
                        println!("Checked in {habit_id} on {date} (friction {friction})");
                        Ok(())
                    }
                    (ToggleOutcome::NeedsCheckIn, None) => {
                        Err(MomentumCliError::NeedsCheckIn(habit_id.clone()))
                    }
                }
            })
        }

        Commands::Doctor { json } => cmd_doctor(&data_dir, json),
    }
}

fn cmd_goal(data_dir: &Path, command: GoalCommand) -> Result<(), MomentumCliError> {
    match command {
        GoalCommand::Add { name, description } => with_tracker(data_dir, |tracker| {
            let goal = tracker.add_goal(&name, &description)?;
            println!("{}", goal.id);
            Ok(())
        }),
        GoalCommand::Delete { goal_id } => with_tracker(data_dir, |tracker| {
            let removed = tracker.delete_goal(&goal_id)?;
            println!("Deleted goal {goal_id} and {removed} habit(s)");
            Ok(())
        }),
        GoalCommand::List => {
            let snapshot = load_snapshot(&FileStore::new(data_dir));
            for goal in &snapshot.goals {
                let habits = snapshot.habits_for_goal(&goal.id).count();
                println!("{}  {}  ({} habit(s))", goal.id, goal.name, habits);
            }
            Ok(())
        }
    }
}

fn cmd_habit(data_dir: &Path, command: HabitCommand) -> Result<(), MomentumCliError> {
    match command {
        HabitCommand::Add {
            goal_id,
            name,
            kind,
        } => with_tracker(data_dir, |tracker| {
            let habit = tracker.add_habit(&goal_id, &name, kind.into())?;
            println!("{}", habit.id);
            Ok(())
        }),
        HabitCommand::Delete { habit_id } => with_tracker(data_dir, |tracker| {
            tracker.delete_habit(&habit_id)?;
            println!("Deleted habit {habit_id}");
            Ok(())
        }),
    }
}

fn cmd_validate(data_dir: &Path, input: Option<&Path>, json: bool) -> Result<(), MomentumCliError> {
    let snapshot = read_snapshot(data_dir, input)?;
    let issues = validate_snapshot(&snapshot);

    let report = ValidationReport {
        goals: snapshot.goals.len(),
        habits: snapshot.habits.len(),
        completions: snapshot.habits.iter().map(|h| h.completions.len()).sum(),
        issues: issues.iter().map(|i| i.to_string()).collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Goals:       {}", report.goals);
        println!("Habits:      {}", report.habits);
        println!("Completions: {}", report.completions);
        println!("Issues:      {}", report.issues.len());

        if !report.issues.is_empty() {
            println!("\nIssues:");
            for issue in &report.issues {
                println!("  - {issue}");
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(MomentumCliError::ValidationFailed(issues.len()))
    }
}

fn cmd_doctor(data_dir: &Path, json: bool) -> Result<(), MomentumCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "engine_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("{ENGINE_NAME} {ENGINE_VERSION}"),
    });

    if data_dir.is_dir() {
        checks.push(DoctorCheck {
            name: "data_dir".to_string(),
            status: CheckStatus::Ok,
            message: format!("Data directory {}", data_dir.display()),
        });
    } else {
        checks.push(DoctorCheck {
            name: "data_dir".to_string(),
            status: CheckStatus::Warning,
            message: format!(
                "Data directory {} does not exist yet; it is created on first write",
                data_dir.display()
            ),
        });
    }

    let store = FileStore::new(data_dir);
    checks.push(collection_check::<Goal>(&store, GOALS_KEY));
    checks.push(collection_check::<Habit>(&store, HABITS_KEY));

    let snapshot = load_snapshot(&store);
    let issues = validate_snapshot(&snapshot);
    checks.push(DoctorCheck {
        name: "integrity".to_string(),
        status: if issues.is_empty() {
            CheckStatus::Ok
        } else {
            CheckStatus::Warning
        },
        message: format!("{} integrity issue(s)", issues.len()),
    });

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (use --input for snapshot files)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (--input - ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        engine: ENGINE_NAME.to_string(),
        version: ENGINE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Momentum Doctor Report");
        println!("======================");
        println!("Engine:  {}", report.engine);
        println!("Version: {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(MomentumCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

/// Decode a stored collection with the same types the tracker loads
fn collection_check<T: DeserializeOwned>(store: &FileStore, key: &str) -> DoctorCheck {
    let (status, message) = match store.get(key) {
        Ok(None) => (CheckStatus::Ok, "Not written yet".to_string()),
        Ok(Some(_)) => match load_collection::<T>(store, key) {
            Ok(items) => (CheckStatus::Ok, format!("{} record(s)", items.len())),
            Err(e) => (
                CheckStatus::Error,
                format!("{e}; edits are refused until it is repaired"),
            ),
        },
        Err(e) => (CheckStatus::Error, format!("Cannot read: {e}")),
    };

    DoctorCheck {
        name: key.to_string(),
        status,
        message,
    }
}

fn with_tracker<F>(data_dir: &Path, f: F) -> Result<(), MomentumCliError>
where
    F: FnOnce(&mut Tracker) -> Result<(), MomentumCliError>,
{
    let mut store = FileStore::new(data_dir);
    let mut tracker = Tracker::load(&store)?;
    f(&mut tracker)?;
    tracker.save(&mut store)?;
    Ok(())
}

fn analytics_inputs(
    data_dir: &Path,
    args: &AnalyticsArgs,
) -> Result<(Snapshot, chrono::NaiveDate), MomentumCliError> {
    let snapshot = read_snapshot(data_dir, args.input.as_deref())?;
    let date = resolve_date(args.date.as_deref())?;
    Ok((snapshot, date))
}

/// Snapshot from a file or stdin when given, otherwise from the data directory
fn read_snapshot(data_dir: &Path, input: Option<&Path>) -> Result<Snapshot, MomentumCliError> {
    let Some(input) = input else {
        return Ok(load_snapshot(&FileStore::new(data_dir)));
    };

    let data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    Ok(Snapshot::from_json(&data)?)
}

/// The only place the CLI reads the clock
fn resolve_date(date: Option<&str>) -> Result<chrono::NaiveDate, MomentumCliError> {
    match date {
        Some(value) => Ok(parse_day(value)?),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

fn print_json<T: Serialize>(value: &T, format: &OutputFormat) -> Result<(), MomentumCliError> {
    let output = match format {
        OutputFormat::Json => serde_json::to_string(value)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(value)?,
    };
    println!("{output}");
    Ok(())
}

// Error types

#[derive(Debug)]
enum MomentumCliError {
    Io(io::Error),
    Engine(EngineError),
    Json(serde_json::Error),
    NeedsCheckIn(String),
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for MomentumCliError {
    fn from(e: io::Error) -> Self {
        MomentumCliError::Io(e)
    }
}

impl From<EngineError> for MomentumCliError {
    fn from(e: EngineError) -> Self {
        MomentumCliError::Engine(e)
    }
}

impl From<serde_json::Error> for MomentumCliError {
    fn from(e: serde_json::Error) -> Self {
        MomentumCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<MomentumCliError> for CliError {
    fn from(e: MomentumCliError) -> Self {
        match e {
            MomentumCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            MomentumCliError::Engine(e) => {
                let (code, hint) = match &e {
                    EngineError::Json(_) => (
                        "PARSE_ERROR",
                        "Ensure the input is a snapshot with goals and habits",
                    ),
                    EngineError::Io(_) => ("IO_ERROR", "Check the data directory and permissions"),
                    EngineError::InvalidDate(_) => ("INVALID_DATE", "Use the YYYY-MM-DD format"),
                    EngineError::InvalidFriction(_) => {
                        ("INVALID_FRICTION", "Friction must be between 1 and 5")
                    }
                    EngineError::EmptyName(_) => ("EMPTY_NAME", "Provide a non-empty name"),
                    EngineError::GoalNotFound(_) => {
                        ("GOAL_NOT_FOUND", "Run 'momentum goal list' for ids")
                    }
                    EngineError::HabitNotFound(_) => ("HABIT_NOT_FOUND", "Check the habit id"),
                    EngineError::Store(_) => ("STORE_ERROR", "Run 'momentum doctor' for details"),
                    EngineError::CorruptCollection { .. } => (
                        "CORRUPT_STORE",
                        "Repair or move the file in the data directory; nothing was written",
                    ),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            MomentumCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            MomentumCliError::NeedsCheckIn(habit_id) => CliError {
                code: "NEEDS_CHECK_IN".to_string(),
                message: format!("Habit {habit_id} is not completed on that day"),
                hint: Some("Pass --friction or use 'momentum check-in'".to_string()),
            },
            MomentumCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{count} integrity issue(s) found"),
                hint: Some("Fix the reported issues and retry".to_string()),
            },
            MomentumCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(Serialize)]
struct ValidationReport {
    goals: usize,
    habits: usize,
    completions: usize,
    issues: Vec<String>,
}

#[derive(Serialize)]
struct DoctorReport {
    engine: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
