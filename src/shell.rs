//! Interactive shell
//!
//! Line-oriented command loop: `help`, `go`, `settings`, `set <key> <value>`
//! and `stop`. Command words are case-insensitive. Errors in a command are
//! reported and the loop continues.

use anyhow::{Context, Result};
use axlekit_camtools::{MachineCodeGenerator, MachineCodeParameters};
use axlekit_optimizer::{Planner, PlanningReport, SearchConfig};
use axlekit_settings::{Config, SettingsPersistence, SETTING_KEYS};
use axlekit_visualizer::render_report;
use std::io::{BufRead, Write};
use thiserror::Error;
use tracing::{error, info};

/// Width of report drawings
pub const REPORT_WIDTH: usize = 80;

/// A parsed shell command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Go,
    Settings,
    Set { key: String, value: String },
    Stop,
}

/// Errors produced while parsing a command line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command \"{0}\". Enter \"help\" for a list of usable commands.")]
    Unknown(String),

    #[error("Usage: set <key> <value>")]
    MissingArgument,
}

impl Command {
    pub fn parse(line: &str) -> Result<Command, ParseError> {
        let mut words = line.split_whitespace();
        let Some(first) = words.next() else {
            return Err(ParseError::Empty);
        };

        match first.to_ascii_lowercase().as_str() {
            "help" => Ok(Command::Help),
            "go" => Ok(Command::Go),
            "settings" => Ok(Command::Settings),
            "stop" | "exit" | "quit" => Ok(Command::Stop),
            "set" => {
                let key = words.next().ok_or(ParseError::MissingArgument)?;
                let value = words.collect::<Vec<_>>().join(" ");
                if value.is_empty() {
                    return Err(ParseError::MissingArgument);
                }
                Ok(Command::Set {
                    key: key.to_string(),
                    value,
                })
            }
            _ => Err(ParseError::Unknown(first.to_string())),
        }
    }
}

/// Command list with every setting key
pub fn help_text() -> String {
    let mut text = String::from(
        "List of commands:\n\
         \x20 help      show this list\n\
         \x20 go        plan the current catalog and print the result\n\
         \x20 settings  show the current settings\n\
         \x20 set       change a setting: set <key> <value>\n\
         \x20 stop      exit\n\
         \nSettings:",
    );
    for (key, description, example) in SETTING_KEYS {
        text.push_str(&format!(
            "\n  {:<15} {} (e.g. \"set {} {}\")",
            key, description, key, example
        ));
    }
    text
}

/// Search configuration from the planner section
pub fn search_config(config: &Config) -> SearchConfig {
    let planner = &config.planner;
    let mut search = SearchConfig::new()
        .with_restarts(planner.restarts)
        .with_parallel(planner.parallel);
    if let Some(seed) = planner.seed {
        search = search.with_seed(seed);
    }
    if let Some(sweeps) = planner.max_sweeps {
        search = search.with_max_sweeps(sweeps);
    }
    search
}

/// Run the planner on a configuration
pub fn plan(config: &Config) -> axlekit_core::Result<PlanningReport> {
    Planner::new(config.catalog.clone(), config.machine_parameters())
        .with_search(search_config(config))
        .run()
}

/// What the loop does after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// The command loop over any input and output
pub struct Shell<R, W> {
    settings: SettingsPersistence,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(settings: SettingsPersistence, input: R, output: W) -> Self {
        Self {
            settings,
            input,
            output,
        }
    }

    pub fn settings(&self) -> &SettingsPersistence {
        &self.settings
    }

    /// Print the banner, then read commands until `stop` or end of input
    pub fn run(&mut self) -> Result<()> {
        writeln!(
            self.output,
            "Starting axle optimisation. DateTime: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(
            self.output,
            "AxleKit {} (built {})",
            crate::VERSION,
            crate::BUILD_DATE
        )?;
        writeln!(self.output, "\n{}", self.settings.config())?;
        writeln!(
            self.output,
            "\nYou can change the current settings or start the planner. Enter \"help\" for a list of usable commands."
        )?;

        let mut line = String::new();
        loop {
            writeln!(self.output, "\nUser input:")?;
            self.output.flush()?;

            line.clear();
            if self.input.read_line(&mut line).context("Failed to read command")? == 0 {
                break;
            }

            match Command::parse(&line) {
                Ok(command) => {
                    if self.execute(command)? == Flow::Stop {
                        break;
                    }
                }
                Err(ParseError::Empty) => {}
                Err(e) => writeln!(self.output, "{}", e)?,
            }
        }

        Ok(())
    }

    /// Run one command
    ///
    /// Only output failures are returned as errors; planning and settings
    /// problems are printed.
    pub fn execute(&mut self, command: Command) -> Result<Flow> {
        match command {
            Command::Help => writeln!(self.output, "\n{}", help_text())?,
            Command::Settings => writeln!(self.output, "\n{}", self.settings.config())?,
            Command::Set { key, value } => match self.settings.set_and_save(&key, &value) {
                Ok(()) => writeln!(
                    self.output,
                    "Wrote \"{}\" => \"{}\" to {}",
                    key,
                    value,
                    self.settings.path().display()
                )?,
                Err(e) => writeln!(self.output, "Error setting {}: {}", key, e)?,
            },
            Command::Go => self.go()?,
            Command::Stop => return Ok(Flow::Stop),
        }
        Ok(Flow::Continue)
    }

    fn go(&mut self) -> Result<()> {
        let config = self.settings.config().clone();
        let report = match plan(&config) {
            Ok(report) => report,
            Err(e) => {
                error!("Planning failed: {}", e);
                writeln!(self.output, "Planning failed: {}", e)?;
                return Ok(());
            }
        };

        writeln!(self.output, "\n{}", render_report(&report, REPORT_WIDTH))?;

        if config.machine_code.enabled {
            let generator = MachineCodeGenerator::new(MachineCodeParameters::from_machine(
                &report.params,
                config.machine_code.max_waste_cut_length,
            ));
            match generator.write_program(
                &report.bars(),
                &report.catalog,
                &config.machine_code.output_dir,
                &chrono::Local::now(),
            ) {
                Ok(path) => writeln!(self.output, "\nMachine code written to {}", path.display())?,
                Err(e) => writeln!(self.output, "\nNo machine code written: {}", e)?,
            }
        }

        info!("Run {} complete", report.run_id);
        Ok(())
    }
}
