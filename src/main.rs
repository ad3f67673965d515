use anyhow::Context;
use breathlog::{
    config::{Config, ConfigPatch, ConfigStore, FileConfigStore},
    export::write_sessions_csv,
    journal::{Journal, ProcessReport},
    logging,
    profile::{Profile, ProfilePatch},
    stats::JournalStats,
    stopwatch::{self, CrosstermEventSource, FixedTicker, Runner, StopwatchState},
    store::SqliteStore,
    util::format_seconds,
    BreathError, PhaseKind, TimingRecord,
};
use chrono::Local;
use clap::{Parser, Subcommand};
use crossterm::{
    terminal::{disable_raw_mode, enable_raw_mode},
    tty::IsTty,
};
use serde::Serialize;
use std::{
    fs::File,
    io::{self, stdin, Write},
    path::PathBuf,
    process::ExitCode,
};

/// breath phase stopwatch journal with 1:4:2 ratio analysis
#[derive(Parser, Debug)]
#[clap(
    version,
    about,
    long_about = "Time inhalation, breath-hold and exhalation, group the latest of each into sessions, and see how each session's ratio compares with the 1:4:2 pattern."
)]
pub struct Cli {
    /// database file to use instead of the configured one
    #[clap(long, global = true)]
    db: Option<PathBuf>,

    /// config file to use instead of the default location
    #[clap(long, global = true)]
    config_file: Option<PathBuf>,

    /// print JSON instead of tables
    #[clap(long, global = true)]
    json: bool,

    /// enable debug logging on stderr
    #[clap(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// add, list or delete individual timings
    #[clap(subcommand)]
    Timing(TimingCommand),

    /// time one phase with an interactive stopwatch and save it
    Time {
        #[clap(value_enum)]
        kind: PhaseKind,
    },

    /// save, list, process or export sessions
    #[clap(subcommand)]
    Session(SessionCommand),

    /// show or update the profile
    #[clap(subcommand)]
    Profile(ProfileCommand),

    /// totals and per-phase averages
    Stats,

    /// delete every timing, session and the profile
    Clear {
        /// confirm the reset
        #[clap(long)]
        yes: bool,
    },

    /// show or change the configuration (shows when no action is given)
    Config {
        #[clap(subcommand)]
        action: Option<ConfigCommand>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// show the effective configuration
    Show,
    /// update the given settings and write the config file
    Set {
        /// database file used when --db is not given
        #[clap(long)]
        database_path: Option<PathBuf>,
        /// stopwatch refresh interval in milliseconds
        #[clap(long, value_parser = clap::value_parser!(u64).range(1..))]
        tick_rate_ms: Option<u64>,
    },
}

#[derive(Subcommand, Debug)]
enum TimingCommand {
    /// record a duration in seconds
    Add {
        #[clap(value_enum)]
        kind: PhaseKind,
        seconds: f64,
    },
    /// list timings, newest first
    List,
    /// delete a timing by id
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
enum SessionCommand {
    /// build a session from the latest inhale, hold and exhale timings
    Save,
    /// list sessions, newest first
    List,
    /// classify every session against the 1:4:2 pattern
    Process,
    /// write processed sessions as CSV
    Export {
        /// output file (stdout when omitted)
        #[clap(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
    Show,
    /// update the given fields, keeping the rest
    Set {
        #[clap(long)]
        full_name: Option<String>,
        #[clap(long)]
        age: Option<String>,
        #[clap(long)]
        email: Option<String>,
        #[clap(long)]
        phone: Option<String>,
        #[clap(long)]
        height: Option<String>,
        #[clap(long)]
        weight: Option<String>,
        #[clap(long)]
        medical: Option<String>,
        #[clap(long)]
        notes: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            let code = err
                .downcast_ref::<BreathError>()
                .map(BreathError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code as u8)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_store = cli
        .config_file
        .as_ref()
        .map(FileConfigStore::with_path)
        .unwrap_or_default();
    let config = config_store.load();

    if let Command::Config { action } = cli.command {
        return configure(action, config, &config_store, cli.db.as_deref(), cli.json);
    }

    let db_path = config.resolve_database_path(cli.db.as_deref());

    let store = SqliteStore::open(&db_path)
        .with_context(|| format!("opening database {}", db_path.display()))?;
    let mut journal = Journal::new(store);

    match cli.command {
        Command::Timing(TimingCommand::Add { kind, seconds }) => {
            let id = journal.record_timing(kind, seconds)?;
            print_id(&id, cli.json)?;
        }
        Command::Timing(TimingCommand::List) => {
            let timings = journal.timings()?;
            if cli.json {
                print_json(&timings)?;
            } else {
                print_timings(&timings);
            }
        }
        Command::Timing(TimingCommand::Delete { id }) => {
            journal.delete_timing(&id)?;
            if cli.json {
                print_json(&serde_json::json!({ "success": true }))?;
            } else {
                println!("deleted timing {id}");
            }
        }
        Command::Time { kind } => {
            if let Some(seconds) = time_phase(kind, config.tick_rate())? {
                let id = journal.record_timing(kind, seconds)?;
                print_id(&id, cli.json)?;
            } else {
                eprintln!("cancelled, nothing saved");
            }
        }
        Command::Session(SessionCommand::Save) => {
            let id = journal.save_session()?;
            print_id(&id, cli.json)?;
        }
        Command::Session(SessionCommand::List) => {
            let sessions = journal.sessions()?;
            if cli.json {
                print_json(&sessions)?;
            } else if sessions.is_empty() {
                println!("No complete sessions saved yet.");
            } else {
                println!(
                    "{:<6} {:<10} {:>9} {:>9} {:>9}",
                    "ID", "DATE", "INHALE", "HOLD", "EXHALE"
                );
                for s in &sessions {
                    println!(
                        "{:<6} {:<10} {:>9} {:>9} {:>9}",
                        s.id,
                        s.recorded_date.to_string(),
                        format_seconds(s.inhale_seconds),
                        format_seconds(s.hold_seconds),
                        format_seconds(s.exhale_seconds)
                    );
                }
            }
        }
        Command::Session(SessionCommand::Process) => {
            let report = journal.process_sessions()?;
            if cli.json {
                print_json(&report)?;
            } else {
                print_report(&report);
            }
        }
        Command::Session(SessionCommand::Export { output }) => {
            let report = journal.process_sessions()?;
            match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("creating {}", path.display()))?;
                    write_sessions_csv(file, &report.processed)?;
                    eprintln!(
                        "exported {} sessions to {}",
                        report.processed.len(),
                        path.display()
                    );
                }
                None => write_sessions_csv(io::stdout().lock(), &report.processed)?,
            }
        }
        Command::Profile(ProfileCommand::Show) => {
            let profile = journal.profile()?;
            if cli.json {
                print_json(&profile.unwrap_or_default())?;
            } else {
                match profile {
                    Some(p) => print_profile(&p),
                    None => println!("No profile saved yet."),
                }
            }
        }
        Command::Profile(ProfileCommand::Set {
            full_name,
            age,
            email,
            phone,
            height,
            weight,
            medical,
            notes,
        }) => {
            let profile = journal.update_profile(ProfilePatch {
                full_name,
                age,
                email,
                phone,
                height,
                weight,
                medical,
                notes,
            })?;
            if cli.json {
                print_json(&profile)?;
            } else {
                print_profile(&profile);
            }
        }
        Command::Stats => {
            let stats = journal.stats()?;
            if cli.json {
                print_json(&stats)?;
            } else {
                print_stats(&stats);
            }
        }
        Command::Clear { yes } => {
            if !yes {
                return Err(BreathError::Validation(
                    "clearing deletes all data; pass --yes to confirm".to_string(),
                )
                .into());
            }
            journal.clear_all()?;
            if cli.json {
                print_json(&serde_json::json!({
                    "success": true,
                    "message": "All data cleared"
                }))?;
            } else {
                println!("All data cleared");
            }
        }
        Command::Config { .. } => unreachable!("handled before the database is opened"),
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_id(id: &str, json: bool) -> anyhow::Result<()> {
    if json {
        print_json(&serde_json::json!({ "success": true, "id": id }))
    } else {
        println!("{id}");
        Ok(())
    }
}

fn print_timings(timings: &[TimingRecord]) {
    if timings.is_empty() {
        println!("No timings recorded yet.");
        return;
    }
    println!(
        "{:<6} {:<19} {:<12} {:>9}",
        "ID", "RECORDED", "KIND", "DURATION"
    );
    for t in timings {
        println!(
            "{:<6} {:<19} {:<12} {:>9}",
            t.id,
            t.recorded_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            t.kind.to_string(),
            format_seconds(t.duration_seconds)
        );
    }
}

fn print_report(report: &ProcessReport) {
    if report.processed.is_empty() && report.rejected.is_empty() {
        println!("No sessions to process. Save a session first.");
        return;
    }
    println!(
        "{:<4} {:>8} {:>8} {:>8}  {:<16} {:>9}  {:<15} {:<10}",
        "#", "INHALE", "HOLD", "EXHALE", "RATIO", "DEVIATION", "CATEGORY", "DATE"
    );
    for (idx, p) in report.processed.iter().enumerate() {
        let c = &p.classification;
        println!(
            "{:<4} {:>8.2} {:>8.2} {:>8.2}  {:<16} {:>9.2}  {:<15} {:<10}",
            format!("#{}", idx + 1),
            p.session.inhale_seconds,
            p.session.hold_seconds,
            p.session.exhale_seconds,
            format!("{:.2} : {:.2}", c.hold_ratio, c.exhale_ratio),
            c.deviation,
            c.category.to_string(),
            p.session.recorded_date.to_string()
        );
    }
    for r in &report.rejected {
        println!("session {} skipped: {}", r.id, r.reason);
    }
}

fn print_profile(p: &Profile) {
    let rows = [
        ("Full name", &p.full_name),
        ("Age", &p.age),
        ("Email", &p.email),
        ("Phone", &p.phone),
        ("Height", &p.height),
        ("Weight", &p.weight),
        ("Medical", &p.medical),
        ("Notes", &p.notes),
    ];
    for (label, value) in rows {
        println!("{label:<10} {value}");
    }
    if let Some(updated) = p.updated {
        println!(
            "{:<10} {}",
            "Updated",
            updated.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        );
    }
}

fn print_stats(stats: &JournalStats) {
    println!("Timings   {}", stats.total_timings);
    println!("Sessions  {}", stats.total_sessions);
    println!();
    println!("{:<12} {:>6} {:>9} {:>9}", "PHASE", "COUNT", "AVERAGE", "STD DEV");
    for phase in &stats.phases {
        println!(
            "{:<12} {:>6} {:>9} {:>9}",
            phase.kind.to_string(),
            phase.count,
            format_seconds(phase.average_seconds),
            phase
                .std_dev_seconds
                .map(format_seconds)
                .unwrap_or_else(|| "-".to_string())
        );
    }
}

fn configure(
    action: Option<ConfigCommand>,
    config: Config,
    store: &FileConfigStore,
    db_override: Option<&std::path::Path>,
    json: bool,
) -> anyhow::Result<()> {
    let config = match action {
        None | Some(ConfigCommand::Show) => config,
        Some(ConfigCommand::Set {
            database_path,
            tick_rate_ms,
        }) => {
            let patch = ConfigPatch {
                database_path,
                tick_rate_ms,
            };
            if patch.is_empty() {
                return Err(BreathError::Validation(
                    "config set needs at least one setting".to_string(),
                )
                .into());
            }
            let updated = patch.apply(config);
            store
                .save(&updated)
                .with_context(|| format!("writing config {}", store.path().display()))?;
            updated
        }
    };
    let db_path = config.resolve_database_path(db_override);
    print_config(&config, store, &db_path, json)
}

fn print_config(
    config: &Config,
    store: &FileConfigStore,
    db_path: &std::path::Path,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        return print_json(&serde_json::json!({
            "configPath": store.path(),
            "databasePath": db_path,
            "config": config,
        }));
    }
    println!("config file   {}", store.path().display());
    println!("database      {}", db_path.display());
    println!("tick rate     {} ms", config.tick_rate_ms);
    Ok(())
}

/// Restores cooked mode however the stopwatch exits
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

fn time_phase(kind: PhaseKind, tick_rate: std::time::Duration) -> anyhow::Result<Option<f64>> {
    if !stdin().is_tty() {
        return Err(BreathError::Validation(
            "the stopwatch needs an interactive terminal".to_string(),
        )
        .into());
    }

    println!("{kind}: press space or enter to start, again to stop, esc to cancel");
    let guard = RawModeGuard::enable().context("enabling raw terminal mode")?;
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::new(tick_rate));

    let mut stdout = io::stdout();
    let measured = stopwatch::run(&runner, |sw, elapsed| {
        let label = match sw.state() {
            StopwatchState::Ready => "ready",
            StopwatchState::Running { .. } => "timing",
            StopwatchState::Stopped { .. } => "done",
            StopwatchState::Cancelled => "cancelled",
        };
        let _ = write!(
            stdout,
            "\r{kind} {label:<9} {:>9}",
            format_seconds(elapsed.as_secs_f64())
        );
        let _ = stdout.flush();
    });
    drop(guard);
    println!();

    Ok(measured.map(|d| d.as_secs_f64()))
}
