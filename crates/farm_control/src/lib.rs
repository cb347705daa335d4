//! `farm_control`: the player command surface.
//!
//! Text commands are parsed into `PlayerCommand`s and dispatched into a
//! `FarmSession`. Command streams come from a `CommandSource`: a script, the
//! interactive prompt, or the irrigation autopilot.

mod autopilot;
mod command;

pub use autopilot::IrrigationAutopilot;
pub use command::{
    dispatch, parse_command, CommandOutcome, FarmStatus, PlayerCommand, WeatherReport, HELP_TEXT,
};

use farm_core::FarmSession;

/// Yields command lines one at a time, looking at the session when it needs to.
pub trait CommandSource {
    /// `None` once the source has nothing left to say.
    fn next_line(&mut self, session: &FarmSession) -> Option<String>;
}

/// Replays a fixed list of command lines. Blank lines and `#` comments are skipped.
#[derive(Debug, Clone, Default)]
pub struct ScriptedCommands {
    lines: std::collections::VecDeque<String>,
}

impl ScriptedCommands {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines
                .into_iter()
                .map(Into::into)
                .filter(|line: &String| {
                    let line = line.trim();
                    !line.is_empty() && !line.starts_with('#')
                })
                .collect(),
        }
    }

    /// One command per line of `text`.
    pub fn from_script(text: &str) -> Self {
        Self::new(text.lines())
    }

    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl CommandSource for ScriptedCommands {
    fn next_line(&mut self, _session: &FarmSession) -> Option<String> {
        self.lines.pop_front()
    }
}
