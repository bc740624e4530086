use clap::Parser;
use clap::error::ErrorKind;
use dayplan_cli::cli::{Cli, Command, NotificationsAction, ResetScope};
use dayplan_core::clock::{Clock, FixedClock, SystemClock, parse_local_datetime};
use dayplan_core::config::{self, Config};
use dayplan_core::error::AppError;
use dayplan_core::model::{Alert, CompletionMap, ScheduleCatalog, Task, parse_weekday};
use dayplan_core::notify::{self, Notifier};
use dayplan_core::planner::{DayView, Planner};
use dayplan_core::runtime::{self, WatchOptions};
use dayplan_core::stats::{Summary, Tally};
use dayplan_core::storage::{self, archive_key};
use std::io::Write;
use std::path::Path;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use time::macros::format_description;
use time::{Date, PrimitiveDateTime};
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "DAYPLAN_LOG";

/// `--at` pins the clock; otherwise local wall time.
enum AppClock {
    System(SystemClock),
    Fixed(FixedClock),
}

impl Clock for AppClock {
    fn now(&self) -> PrimitiveDateTime {
        match self {
            Self::System(clock) => clock.now(),
            Self::Fixed(clock) => clock.now(),
        }
    }

    fn wait(&self, interval: std::time::Duration) {
        match self {
            Self::System(clock) => clock.wait(interval),
            Self::Fixed(clock) => clock.wait(interval),
        }
    }
}

#[derive(Tabled)]
struct TaskTableRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Task")]
    description: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Status")]
    status: String,
}

#[derive(Tabled)]
struct TallyTableRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Done")]
    completed: usize,
    #[tabled(rename = "Total")]
    total: usize,
    #[tabled(rename = "Rate")]
    rate: String,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn format_percent(tally: &Tally) -> String {
    format!("{:.0}%", tally.percent())
}

fn format_alert(alert: &Alert) -> String {
    format!("[{}] {}", alert.title, alert.body)
}

fn print_alert_line(alert: &Alert, json: bool) {
    if json {
        match serde_json::to_string(alert) {
            Ok(line) => println!("{line}"),
            Err(err) => tracing::warn!(error = %err, "failed to encode alert"),
        }
    } else {
        println!("{}", format_alert(alert));
    }
    std::io::stdout().flush().ok();
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    let rendered =
        serde_json::to_string(value).map_err(|err| AppError::invalid_data(err.to_string()))?;
    println!("{rendered}");
    Ok(())
}

fn print_day_plain(view: &DayView, current_id: Option<&str>) {
    if view.rows.is_empty() {
        println!("No tasks scheduled for {}.", view.weekday);
        return;
    }

    let rows: Vec<TaskTableRow> = view
        .rows
        .iter()
        .map(|row| {
            let marker = if current_id == Some(row.task.id.as_str()) {
                "> "
            } else {
                ""
            };
            TaskTableRow {
                id: format!("{marker}{}", row.task.id),
                time: format!("{}-{}", row.task.start_time, row.task.end_time),
                description: row.task.description.clone(),
                category: row.task.category.clone().unwrap_or_else(|| "-".to_string()),
                status: row.status.label().to_string(),
            }
        })
        .collect();

    println!(
        "{}: {}/{} completed ({})",
        view.weekday,
        view.progress.completed,
        view.progress.total,
        format_percent(&view.progress)
    );
    println!("{}", Table::new(rows).with(Style::psql()));
}

fn print_completion(task: &Task, completed: bool, json: bool) -> Result<(), AppError> {
    if json {
        return print_json(&serde_json::json!({
            "id": task.id,
            "description": task.description,
            "completed": completed,
        }));
    }

    let verb = if completed { "Completed" } else { "Reopened" };
    println!("{verb} task: {} ({})", task.description, task.id);
    Ok(())
}

fn print_archive_entry(key: &str, entry: &CompletionMap) {
    let done: Vec<&str> = entry
        .iter()
        .filter(|(_, completed)| **completed)
        .map(|(id, _)| id.as_str())
        .collect();
    if done.is_empty() {
        println!("{key}: nothing completed");
    } else {
        println!("{key}: {} ({} completed)", done.join(", "), done.len());
    }
}

fn tally_rows(tallies: &std::collections::BTreeMap<String, Tally>) -> Vec<TallyTableRow> {
    tallies
        .iter()
        .filter(|(_, tally)| tally.total > 0)
        .map(|(name, tally)| TallyTableRow {
            name: name.clone(),
            completed: tally.completed,
            total: tally.total,
            rate: format_percent(tally),
        })
        .collect()
}

fn print_summary_plain(summary: &Summary) {
    println!(
        "Overall: {}/{} completed ({})",
        summary.overall.completed,
        summary.overall.total,
        format_percent(&summary.overall)
    );
    println!(
        "Streak: {} day(s), longest {}",
        summary.streaks.current, summary.streaks.longest
    );
    println!(
        "Most productive day: {}",
        summary.most_productive_day.as_deref().unwrap_or("-")
    );
    println!(
        "Most productive category: {}",
        summary.most_productive_category.as_deref().unwrap_or("-")
    );

    let by_day = tally_rows(&summary.by_weekday);
    if !by_day.is_empty() {
        println!();
        println!("{}", Table::new(by_day).with(Style::psql()));
    }
    let by_category = tally_rows(&summary.by_category);
    if !by_category.is_empty() {
        println!();
        println!("{}", Table::new(by_category).with(Style::psql()));
    }
}

fn parse_archive_date(raw: &str) -> Result<Date, AppError> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::invalid_input("date must be YYYY-MM-DD"))
}

/// A missing schedule file is an empty week; a malformed one is fatal.
fn load_catalog(path: &Path) -> Result<ScheduleCatalog, AppError> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "schedule not found, every day is empty");
        return Ok(ScheduleCatalog::default());
    }
    let catalog = ScheduleCatalog::load(path)?;
    tracing::debug!(path = %path.display(), "schedule loaded");
    Ok(catalog)
}

fn load_config(cli: &Cli, store_dir: &Path) -> Result<Config, AppError> {
    let loaded = config::load_config_with_fallback(store_dir);
    if let Some(err) = &loaded.error {
        tracing::warn!(error = %err, "config unreadable, using defaults");
    }

    let overrides = cli
        .config_override
        .iter()
        .map(|raw| config::parse_config_override(raw))
        .collect::<Result<Vec<_>, _>>()?;
    config::merge_overrides(&loaded.config, &overrides)
}

fn open_planner(cli: &Cli, config: &Config, store_dir: &Path) -> Result<Planner<AppClock>, AppError> {
    let schedule_path = config.resolve_schedule_path(cli.schedule.as_deref(), store_dir);
    let catalog = load_catalog(&schedule_path)?;
    let clock = match cli.at.as_deref() {
        Some(raw) => AppClock::Fixed(FixedClock::new(parse_local_datetime(raw)?)),
        None => AppClock::System(SystemClock),
    };
    Ok(Planner::open(
        clock,
        catalog,
        store_dir,
        config.rollover_policy(),
    ))
}

fn run_command(cli: Cli) -> Result<(), AppError> {
    let store_dir = storage::store_dir()?;
    let config = load_config(&cli, &store_dir)?;
    let mut planner = open_planner(&cli, &config, &store_dir)?;
    let json = cli.json;

    match cli.command.unwrap_or(Command::Today) {
        Command::Today => {
            let view = planner.day_view(planner.today())?;
            if json {
                print_json(&view)?;
            } else {
                let current = planner.current_task()?.map(|task| task.id.clone());
                print_day_plain(&view, current.as_deref());
            }
        }
        Command::Day { weekday } => {
            let weekday = parse_weekday(&weekday)
                .ok_or_else(|| AppError::invalid_input(format!("unknown weekday '{weekday}'")))?;
            let view = planner.day_view(weekday)?;
            if json {
                print_json(&view)?;
            } else {
                print_day_plain(&view, None);
            }
        }
        Command::Done { id } => {
            let task = planner.set_completion(&id, true)?;
            print_completion(&task, true, json)?;
        }
        Command::Undo { id } => {
            let task = planner.set_completion(&id, false)?;
            print_completion(&task, false, json)?;
        }
        Command::Toggle { id } => {
            let (task, completed) = planner.toggle_completion(&id)?;
            print_completion(&task, completed, json)?;
        }
        Command::Reset { scope } => match scope {
            ResetScope::Today => {
                let cleared = planner.reset_today();
                if json {
                    print_json(&serde_json::json!({ "scope": "today", "cleared": cleared }))?;
                } else {
                    println!("Cleared {cleared} completion(s) for today.");
                }
            }
            ResetScope::All => {
                planner.reset_all();
                if json {
                    print_json(&serde_json::json!({ "scope": "all" }))?;
                } else {
                    println!("Cleared all completions.");
                }
            }
        },
        Command::Notifications { action } => {
            let notifier: Box<dyn Notifier> = notify::notifier_from_env();
            match action {
                NotificationsAction::On => planner.set_notifications_enabled(true),
                NotificationsAction::Off => planner.set_notifications_enabled(false),
                NotificationsAction::Status => {}
            }

            let enabled = planner.notifications_enabled();
            let available = notifier.is_available();
            if json {
                print_json(&serde_json::json!({
                    "enabled": enabled,
                    "platform_available": available,
                }))?;
            } else {
                let state = if enabled { "on" } else { "off" };
                println!("Notifications are {state}.");
                if action == NotificationsAction::On && !available {
                    println!("Desktop notifications are unavailable; alerts are shown here only.");
                }
            }
        }
        Command::Tick => {
            let notifier = notify::notifier_from_env();
            let mut alerts = Vec::new();
            if let Some(outcome) = planner.check_rollover()? {
                alerts.push(outcome.alert);
            }
            alerts.extend(planner.tick()?);

            let mut shown = Vec::with_capacity(alerts.len());
            notify::dispatch(&alerts, notifier.as_ref(), &mut |alert: &Alert| {
                shown.push(alert.clone())
            });

            if json {
                print_json(&shown)?;
            } else if shown.is_empty() {
                println!("No alerts.");
            } else {
                for alert in &shown {
                    println!("{}", format_alert(alert));
                }
            }
        }
        Command::Rollover => {
            let outcome = planner.check_rollover()?;
            if json {
                let payload = match &outcome {
                    Some(outcome) => serde_json::json!({
                        "rolled_over": true,
                        "archived_date": archive_key(outcome.archived_date),
                        "archived": outcome.archived,
                        "persisted": outcome.persisted,
                        "snapshot": outcome.snapshot,
                    }),
                    None => serde_json::json!({ "rolled_over": false }),
                };
                print_json(&payload)?;
            } else {
                match outcome {
                    Some(outcome) => {
                        let key = archive_key(outcome.archived_date);
                        if outcome.archived {
                            println!("Archived {key} ({} completed).", outcome.snapshot.len());
                        } else {
                            println!("Nothing to archive for {key}.");
                        }
                        println!("{}", format_alert(&outcome.alert));
                    }
                    None => println!("No rollover due."),
                }
            }
        }
        Command::Archive { date } => match date {
            Some(raw) => {
                let key = archive_key(parse_archive_date(&raw)?);
                let entry = planner.archive().get(&key);
                if json {
                    print_json(&entry)?;
                } else {
                    match entry {
                        Some(entry) => print_archive_entry(&key, entry),
                        None => println!("No archive entry for {key}."),
                    }
                }
            }
            None => {
                if json {
                    print_json(planner.archive())?;
                } else if planner.archive().is_empty() {
                    println!("Archive is empty.");
                } else {
                    for (key, entry) in planner.archive() {
                        print_archive_entry(key, entry);
                    }
                }
            }
        },
        Command::Stats => {
            let summary = planner.summary();
            if json {
                print_json(&summary)?;
            } else {
                print_summary_plain(&summary);
            }
        }
        Command::Watch { ticks } => {
            let notifier = notify::notifier_from_env();
            let options = WatchOptions {
                tick_interval: config.tick_interval(),
                rollover_poll_interval: config.rollover_poll_interval(),
                max_ticks: ticks,
            };
            let report = runtime::watch(&mut planner, notifier.as_ref(), options, &mut |alert: &Alert| {
                print_alert_line(alert, json)
            })?;

            if !json {
                println!(
                    "Stopped after {} tick(s): {} alert(s), {} rollover(s).",
                    report.ticks, report.alerts, report.rollovers
                );
            }
        }
    }

    Ok(())
}

fn main() {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                err.exit();
            }
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
