use chrono::NaiveDate;
use farm_core::{
    FarmError, FarmSession, JournalEntry, SectorId, SessionReport, Task, TaskId, TaskKind,
    TaskTarget, WeatherSummary,
};
use serde::Serialize;

pub const HELP_TEXT: &str = "\
Commands:
  /step                                   advance every sector by one session
  /task add investigate <sector>          1 AP, e.g. /task add investigate B3
  /task add irrigate <sector|ALL> <mm>    2 AP, e.g. /task add irrigate ALL 20mm
  /task add pesticide <sector|ALL>        1 AP
  /task remove <id>                       refund a pending task, e.g. /task remove T3
  /tasks                                  list pending tasks
  /journal                                list committed tasks by session date
  /status                                 session, season and activity points
  /weather                                last session's weather and the forecast
  /help                                   this text";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PlayerCommand {
    Help,
    Step,
    AddTask(TaskKind),
    RemoveTask(TaskId),
    Tasks,
    Journal,
    Status,
    Weather,
}

fn malformed(message: impl Into<String>) -> FarmError {
    FarmError::MalformedCommand(message.into())
}

fn no_arguments(
    command: PlayerCommand,
    name: &str,
    rest: &[&str],
) -> Result<PlayerCommand, FarmError> {
    if rest.is_empty() {
        Ok(command)
    } else {
        Err(malformed(format!("{name} takes no arguments")))
    }
}

/// Parse one line of player input.
///
/// Keywords, task kinds and sector letters are case-insensitive.
pub fn parse_command(line: &str) -> Result<PlayerCommand, FarmError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((&head, rest)) = tokens.split_first() else {
        return Err(malformed("empty command"));
    };
    if !head.starts_with('/') {
        return Err(malformed(format!("`{head}` is not a command, try /help")));
    }

    match head.to_ascii_lowercase().as_str() {
        "/help" => no_arguments(PlayerCommand::Help, "/help", rest),
        "/step" => no_arguments(PlayerCommand::Step, "/step", rest),
        "/tasks" => no_arguments(PlayerCommand::Tasks, "/tasks", rest),
        "/journal" => no_arguments(PlayerCommand::Journal, "/journal", rest),
        "/status" => no_arguments(PlayerCommand::Status, "/status", rest),
        "/weather" => no_arguments(PlayerCommand::Weather, "/weather", rest),
        "/task" => parse_task(rest),
        _ => Err(malformed(format!("unknown command `{head}`, try /help"))),
    }
}

fn parse_task(args: &[&str]) -> Result<PlayerCommand, FarmError> {
    match args {
        [action, rest @ ..] if action.eq_ignore_ascii_case("add") => {
            parse_task_kind(rest).map(PlayerCommand::AddTask)
        }
        [action, id] if action.eq_ignore_ascii_case("remove") => {
            parse_task_id(id).map(PlayerCommand::RemoveTask)
        }
        [action, ..] if action.eq_ignore_ascii_case("remove") => {
            Err(malformed("usage: /task remove <id>"))
        }
        _ => Err(malformed("usage: /task add <kind> <params> | /task remove <id>")),
    }
}

fn parse_task_kind(args: &[&str]) -> Result<TaskKind, FarmError> {
    let Some((&kind, params)) = args.split_first() else {
        return Err(malformed("missing task kind: investigate, irrigate or pesticide"));
    };
    match (kind.to_ascii_lowercase().as_str(), params) {
        ("investigate", [sector]) => Ok(TaskKind::Investigate {
            sector: sector.parse::<SectorId>()?,
        }),
        ("investigate", _) => Err(malformed("usage: /task add investigate <sector>")),
        ("irrigate", [target, depth]) => Ok(TaskKind::Irrigate {
            target: parse_target(target)?,
            depth_mm: parse_depth(depth)?,
        }),
        ("irrigate", _) => Err(malformed("usage: /task add irrigate <sector|ALL> <mm>")),
        ("pesticide", [target]) => Ok(TaskKind::Pesticide {
            target: parse_target(target)?,
        }),
        ("pesticide", _) => Err(malformed("usage: /task add pesticide <sector|ALL>")),
        _ => Err(malformed(format!("unknown task kind `{kind}`"))),
    }
}

fn parse_target(token: &str) -> Result<TaskTarget, FarmError> {
    if token.eq_ignore_ascii_case("all") {
        Ok(TaskTarget::All)
    } else {
        token.parse().map(TaskTarget::Sector)
    }
}

/// `20`, `20mm` and `12.5MM` all mean millimetres.
fn parse_depth(token: &str) -> Result<f64, FarmError> {
    let lower = token.to_ascii_lowercase();
    let number = lower.strip_suffix("mm").unwrap_or(&lower);
    match number.parse::<f64>() {
        Ok(depth) if depth.is_finite() && depth > 0.0 => Ok(depth),
        _ => Err(malformed(format!(
            "irrigation depth must be a positive number of mm, got `{token}`"
        ))),
    }
}

/// `3` and `T3` name the same task.
fn parse_task_id(token: &str) -> Result<TaskId, FarmError> {
    let digits = token
        .strip_prefix('T')
        .or_else(|| token.strip_prefix('t'))
        .unwrap_or(token);
    digits
        .parse::<u64>()
        .map(TaskId)
        .map_err(|_| malformed(format!("`{token}` is not a task id")))
}

/// Scheduler state as shown by `/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FarmStatus {
    pub session_number: u32,
    pub date: NaiveDate,
    pub season_index: u32,
    pub activity_points_used: u32,
    pub max_activity_points: u32,
    pub pending_tasks: usize,
    pub finished: bool,
}

impl FarmStatus {
    pub fn of(session: &FarmSession) -> Self {
        let scheduler = session.scheduler();
        Self {
            session_number: scheduler.session_number(),
            date: scheduler.current_session_date(),
            season_index: scheduler.current_season_index(),
            activity_points_used: scheduler.activity_points_used(),
            max_activity_points: scheduler.max_activity_points(),
            pending_tasks: session.queue().len(),
            finished: session.grid().is_finished(),
        }
    }
}

/// `/weather` output. Either half is `None` when no records cover it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub previous_session: Option<WeatherSummary>,
    pub forecast: Option<WeatherSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CommandOutcome {
    Help(&'static str),
    Stepped(SessionReport),
    TaskAdded {
        id: TaskId,
        description: String,
        remaining_points: u32,
    },
    TaskRemoved {
        task: Task,
        remaining_points: u32,
    },
    Tasks(Vec<Task>),
    Journal(Vec<JournalEntry>),
    Status(FarmStatus),
    Weather(WeatherReport),
}

/// Apply `command` to `session`. Rejections leave the session untouched.
pub fn dispatch(
    session: &mut FarmSession,
    command: PlayerCommand,
) -> Result<CommandOutcome, FarmError> {
    let outcome = match command {
        PlayerCommand::Help => CommandOutcome::Help(HELP_TEXT),
        PlayerCommand::Step => CommandOutcome::Stepped(session.step()),
        PlayerCommand::AddTask(kind) => {
            let id = session.add_task(kind)?;
            let description = session
                .queue()
                .get(id)
                .map(|task| task.description.clone())
                .unwrap_or_default();
            CommandOutcome::TaskAdded {
                id,
                description,
                remaining_points: session.scheduler().remaining_points(),
            }
        }
        PlayerCommand::RemoveTask(id) => {
            let task = session.remove_task(id)?;
            CommandOutcome::TaskRemoved {
                task,
                remaining_points: session.scheduler().remaining_points(),
            }
        }
        PlayerCommand::Tasks => CommandOutcome::Tasks(session.queue().pending().to_vec()),
        PlayerCommand::Journal => CommandOutcome::Journal(session.journal().entries().to_vec()),
        PlayerCommand::Status => CommandOutcome::Status(FarmStatus::of(session)),
        PlayerCommand::Weather => CommandOutcome::Weather(WeatherReport {
            previous_session: session.previous_session_weather(),
            forecast: session.next_session_forecast(),
        }),
    };
    Ok(outcome)
}
