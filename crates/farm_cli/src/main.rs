mod render;

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use farm_control::{
    dispatch, parse_command, CommandOutcome, CommandSource, IrrigationAutopilot, ScriptedCommands,
};
use farm_core::{compute_metrics, FarmSession, MetricsFileWriter};
use farm_world::load_farm;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::render::{print_outcome, print_status, rule};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "farm_cli", about = "Grid farm simulation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the farm from the prompt, a script, or the autopilot.
    Run {
        /// Seed for penalty cells and synthetic weather. Random when omitted.
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value = "./content")]
        content_dir: String,
        /// Replay commands from this file, one per line. Mutually exclusive with --autopilot.
        #[arg(long, conflicts_with = "autopilot")]
        script: Option<PathBuf>,
        /// Let the irrigation autopilot play.
        #[arg(long)]
        autopilot: bool,
        /// Stop after this many sessions.
        #[arg(long)]
        sessions: Option<u32>,
        /// Disable metrics collection to the runs/ directory.
        #[arg(long)]
        no_metrics: bool,
        /// Write logs to this file instead of stderr.
        #[arg(long)]
        log_file: Option<PathBuf>,
    },
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("creating log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Command sources
// ---------------------------------------------------------------------------

/// Reads commands from stdin, prompting with the date and remaining points.
/// `/quit` or end of input stops the run.
struct PromptCommands {
    stdin: std::io::StdinLock<'static>,
}

impl PromptCommands {
    fn new() -> Self {
        Self {
            stdin: std::io::stdin().lock(),
        }
    }
}

impl CommandSource for PromptCommands {
    fn next_line(&mut self, session: &FarmSession) -> Option<String> {
        let scheduler = session.scheduler();
        print!(
            "[{} {}/{} AP]> ",
            scheduler.current_session_date(),
            scheduler.activity_points_used(),
            scheduler.max_activity_points(),
        );
        std::io::stdout().flush().ok()?;

        let mut line = String::new();
        match self.stdin.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) if matches!(line.trim(), "/quit" | "/exit") => None,
            Ok(_) => Some(line),
        }
    }
}

fn command_source(script: Option<&Path>, autopilot: bool) -> Result<Box<dyn CommandSource>> {
    if let Some(path) = script {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?;
        return Ok(Box::new(ScriptedCommands::from_script(&text)));
    }
    if autopilot {
        return Ok(Box::new(IrrigationAutopilot::default()));
    }
    println!("Type /help for commands, /quit to leave.");
    Ok(Box::new(PromptCommands::new()))
}

// ---------------------------------------------------------------------------
// Run directory
// ---------------------------------------------------------------------------

fn generate_run_id(seed: u64) -> String {
    let now = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    format!("{now}_seed{seed}")
}

fn create_run_dir(run_id: &str) -> Result<PathBuf> {
    let dir = PathBuf::from("runs").join(run_id);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating run directory: {}", dir.display()))?;
    Ok(dir)
}

fn write_run_info(
    dir: &Path,
    run_id: &str,
    seed: u64,
    content_version: &str,
    mode: &str,
    sessions: Option<u32>,
) -> Result<()> {
    let info = serde_json::json!({
        "run_id": run_id,
        "seed": seed,
        "start_time": run_id.split('_').take(2).collect::<Vec<_>>().join("_"),
        "content_version": content_version,
        "runner": "farm_cli",
        "args": {
            "mode": mode,
            "sessions": sessions,
        }
    });
    let path = dir.join("run_info.json");
    let file =
        std::fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, &info)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

struct RunOptions {
    seed: Option<u64>,
    content_dir: String,
    script: Option<PathBuf>,
    autopilot: bool,
    sessions: Option<u32>,
    no_metrics: bool,
}

impl RunOptions {
    fn mode(&self) -> &'static str {
        match (&self.script, self.autopilot) {
            (Some(_), _) => "script",
            (None, true) => "autopilot",
            (None, false) => "interactive",
        }
    }
}

fn run(options: &RunOptions) -> Result<()> {
    let seed = options.seed.unwrap_or_else(rand::random);
    let (config, mut session) = load_farm(&options.content_dir, seed)?;

    let mut metrics_writer: Option<MetricsFileWriter> = None;
    if !options.no_metrics {
        let run_id = generate_run_id(seed);
        let run_dir = create_run_dir(&run_id)?;
        write_run_info(
            &run_dir,
            &run_id,
            seed,
            &config.content_version,
            options.mode(),
            options.sessions,
        )?;
        let mut writer = MetricsFileWriter::new(&run_dir)
            .with_context(|| format!("opening metrics CSV in {}", run_dir.display()))?;
        writer
            .write_row(&compute_metrics(&session))
            .context("writing metrics row")?;
        metrics_writer = Some(writer);
        println!("Run directory: {}", run_dir.display());
    }

    println!(
        "Starting farm: seed={seed} grid={}x{} crop={} {}..{} content_version={}",
        config.grid.rows,
        config.grid.cols,
        config.crop.name,
        config.simulation.start_date,
        config.simulation.end_date,
        config.content_version,
    );
    println!("{}", rule());
    print_status(&session);

    let mut source = command_source(options.script.as_deref(), options.autopilot)?;
    let mut sessions_run = 0u32;
    while let Some(line) = source.next_line(&session) {
        let line = line.trim();
        match parse_command(line).and_then(|command| dispatch(&mut session, command)) {
            Ok(outcome) => {
                print_outcome(&outcome, &session);
                if let CommandOutcome::Stepped(_) = outcome {
                    sessions_run += 1;
                    if let Some(ref mut writer) = metrics_writer {
                        writer
                            .write_row(&compute_metrics(&session))
                            .context("writing metrics row")?;
                    }
                }
            }
            Err(err) => {
                warn!(command = line, %err, "command rejected");
                println!("! {err}");
            }
        }
        if options.sessions.is_some_and(|limit| sessions_run >= limit) {
            info!(sessions_run, "session limit reached");
            break;
        }
    }

    println!("{}", rule());
    println!("Done after {sessions_run} session(s). Final state:");
    print_status(&session);
    println!(
        "Journal: {} entr{}",
        session.journal().len(),
        if session.journal().len() == 1 { "y" } else { "ies" }
    );

    if let Some(ref mut writer) = metrics_writer {
        writer.flush().context("final metrics flush")?;
        println!("Metrics written to runs/ directory.");
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            seed,
            content_dir,
            script,
            autopilot,
            sessions,
            no_metrics,
            log_file,
        } => {
            init_logging(log_file.as_deref())?;
            run(&RunOptions {
                seed,
                content_dir,
                script,
                autopilot,
                sessions,
                no_metrics,
            })?;
        }
    }
    Ok(())
}
