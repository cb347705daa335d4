//! Plain-text views of the farm for the terminal.

use farm_control::{CommandOutcome, FarmStatus, WeatherReport};
use farm_core::{FarmSession, Metric, SessionReport, Task, WeatherSummary};

pub fn rule() -> String {
    "-".repeat(80)
}

/// Header line plus one row per grid row of canopy cover percentages.
pub fn print_status(session: &FarmSession) {
    let status = FarmStatus::of(session);
    println!(
        "[{date}  session={session:3}  season={season}]  AP={used}/{max}  pending={pending}",
        date = status.date,
        session = status.session_number,
        season = status.season_index,
        used = status.activity_points_used,
        max = status.max_activity_points,
        pending = status.pending_tasks,
    );

    let grid = session.grid();
    let canopy = grid.aggregate(Metric::CanopyCover);
    let mut header = String::from("    ");
    for col in 1..=grid.cols() {
        header.push_str(&format!("{col:>6}"));
    }
    println!("{header}");
    for row in grid.sector_ids().chunks(grid.cols().max(1)) {
        let Some(first) = row.first() else {
            continue;
        };
        let mut line = format!("  {} ", first.row_letter());
        for id in row {
            let cover = canopy.get(id).copied().unwrap_or(0.0);
            line.push_str(&format!("{:>5.1}%", cover * 100.0));
        }
        println!("{line}");
    }
}

fn print_weather(label: &str, summary: Option<&WeatherSummary>) {
    match summary {
        Some(w) => println!(
            "  {label:<10} {:>5.1}°C .. {:>5.1}°C  rain {:>6.1}mm  ({} days)",
            w.min_temp, w.max_temp, w.precipitation, w.days
        ),
        None => println!("  {label:<10} no data"),
    }
}

fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No pending tasks.");
    }
    for task in tasks {
        println!("  {:<4} {:<28} {} AP", task.id, task.description, task.cost);
    }
}

fn print_step(report: &SessionReport) {
    println!(
        "Session {} ran {} days: {} -> {}, {} task(s) committed to the journal.",
        report.session_number,
        report.days_run,
        report.previous_date,
        report.date,
        report.committed_tasks,
    );
    if report.season_changed {
        println!("*** A new season has begun (season {}) ***", report.season_index);
    }
    if report.finished {
        println!("*** Every sector has reached the end of the simulation ***");
    }
}

pub fn print_outcome(outcome: &CommandOutcome, session: &FarmSession) {
    match outcome {
        CommandOutcome::Help(text) => println!("{text}"),
        CommandOutcome::Stepped(report) => {
            print_step(report);
            print_status(session);
        }
        CommandOutcome::TaskAdded {
            id,
            description,
            remaining_points,
        } => println!("Queued {id}: {description} ({remaining_points} AP left)"),
        CommandOutcome::TaskRemoved {
            task,
            remaining_points,
        } => println!(
            "Removed {}: {} ({remaining_points} AP left)",
            task.id, task.description
        ),
        CommandOutcome::Tasks(tasks) => print_tasks(tasks),
        CommandOutcome::Journal(entries) => {
            if entries.is_empty() {
                println!("The journal is empty.");
            }
            for entry in entries {
                println!("{}", entry.session_date);
                for description in &entry.descriptions {
                    println!("  - {description}");
                }
            }
        }
        CommandOutcome::Status(_) => print_status(session),
        CommandOutcome::Weather(WeatherReport {
            previous_session,
            forecast,
        }) => {
            print_weather("last", previous_session.as_ref());
            print_weather("forecast", forecast.as_ref());
        }
    }
}
