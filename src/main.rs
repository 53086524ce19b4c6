/*  Copyright (C) 2012-2023 by László Nagy
    This file is part of Bear.

    Bear is a tool to generate compilation database for clang tooling.

    Bear is free software: you can redistribute it and/or modify
    it under the terms of the GNU General Public License as published by
    the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    Bear is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU General Public License for more details.

    You should have received a copy of the GNU General Public License
    along with this program.  If not, see <http://www.gnu.org/licenses/>.
 */

use std::fs::{File, OpenOptions};
use std::io::{stdin, stdout, BufReader, BufWriter};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use clap::{arg, command, ArgAction, ArgMatches, Command};
use is_terminal::IsTerminal;
use log::LevelFilter;
use simple_logger::SimpleLogger;

use crate::compilation::CompilationRecord;
use crate::configuration::{Compilation, Configuration};
use crate::database::builder::{Builder, PathStyle};
use crate::database::Entry;
use crate::input::Input;
use crate::interpreter::Interpreter;

mod compilation;
mod configuration;
mod database;
mod execution;
mod filter;
mod input;
mod interpreter;
mod paths;
mod shell;
mod tools;

fn main() -> Result<()> {
    let arguments = Arguments::parse().validate()?;
    arguments.prepare_logging()?;
    let application = Application::configure(arguments)?;
    application.run()?;

    Ok(())
}

#[derive(Debug, PartialEq)]
struct Arguments {
    input: Option<String>,
    dry_run: Option<String>,
    output: String,
    config: Option<String>,
    relative: bool,
    base_dir: Option<String>,
    append: bool,
    verbose: u8,
}

fn cli() -> Command {
    command!()
        .args(&[
            arg!(-i --input <FILE> "Path of the make log file, '-' for the standard input"),
            arg!(-n --"dry-run" <MAKE_COMMAND> "Run the make command in dry-run mode and read its output")
                .conflicts_with("input"),
            arg!(-o --output <FILE> "Path of the result file")
                .default_value("compile_commands.json")
                .hide_default_value(false),
            arg!(-r --relative "Write paths relative to the base directory")
                .action(ArgAction::SetTrue),
            arg!(-b --"base-dir" <DIR> "Base directory of the relative paths, also the initial working directory"),
            arg!(-c --config <FILE> "Path of the config file"),
            arg!(-a --append "Append result to an existing output file")
                .action(ArgAction::SetTrue),
            arg!(-v --verbose ... "Sets the level of verbosity")
                .action(ArgAction::Count),
        ])
}

impl Arguments {
    fn parse() -> Self {
        Arguments::from(&cli().get_matches())
    }

    fn from(matches: &ArgMatches) -> Self {
        Arguments {
            input: matches.get_one::<String>("input")
                .map(String::to_string),
            dry_run: matches.get_one::<String>("dry-run")
                .map(String::to_string),
            output: matches.get_one::<String>("output")
                .map(String::to_string)
                .unwrap_or_else(|| String::from("compile_commands.json")),
            config: matches.get_one::<String>("config")
                .map(String::to_string),
            relative: matches.get_flag("relative"),
            base_dir: matches.get_one::<String>("base-dir")
                .map(String::to_string),
            append: matches.get_flag("append"),
            verbose: matches.get_count("verbose"),
        }
    }

    fn validate(self) -> Result<Self> {
        if self.input.is_some() && self.dry_run.is_some() {
            return Err(anyhow!("Multiple input sources provided, specify only one of: --input, --dry-run."));
        }
        if self.input.is_none() && self.dry_run.is_none() && stdin().is_terminal() {
            return Err(anyhow!("No input source provided, specify one of: --input, --dry-run, or pipe the log to the standard input."));
        }
        if self.reads_stdin() && self.config.as_deref() == Some("-") {
            return Err(anyhow!("Both input and config reading the standard input."));
        }
        if self.append && self.output == "-" {
            return Err(anyhow!("Append can't applied to the standard output."));
        }

        Ok(self)
    }

    fn reads_stdin(&self) -> bool {
        matches!(self.input(), Input::Stdin)
    }

    fn input(&self) -> Input {
        match (self.input.as_deref(), self.dry_run.as_deref()) {
            (Some("-"), _) | (Some("/dev/stdin"), _) =>
                Input::Stdin,
            (Some(file), _) =>
                Input::File(file.into()),
            (None, Some(command)) =>
                Input::Make(command.to_string()),
            (None, None) =>
                Input::Stdin,
        }
    }

    fn path_style(&self) -> Result<PathStyle> {
        if !self.relative {
            return Ok(PathStyle::Resolved);
        }
        let base = paths::relative_base(self.base_dir.as_deref().map(Path::new), Path::new(&self.output))
            .context("Failed to find the base directory")?;
        log::info!("Using relative paths, base directory: {}", base.display());
        Ok(PathStyle::RelativeTo(base))
    }

    fn prepare_logging(&self) -> Result<()> {
        let level = match &self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };
        let mut logger = SimpleLogger::new()
            .with_level(level);
        if level >= LevelFilter::Debug {
            logger = logger.with_local_timestamps()
        }
        logger.init()?;

        Ok(())
    }

    fn configuration(&self) -> Result<Configuration> {
        let configuration = match self.config.as_deref() {
            Some("-") | Some("/dev/stdin") =>
                configuration::io::from_stdin()
                    .context("Failed to read configuration from stdin")?,
            Some(file) =>
                configuration::io::from_file(Path::new(file))
                    .with_context(|| format!("Failed to read configuration from file: {}", file))?,
            None =>
                Configuration::default(),
        };
        Ok(configuration)
    }
}

#[derive(Debug, PartialEq)]
struct Application {
    arguments: Arguments,
    configuration: Configuration,
}

impl Application {
    fn configure(arguments: Arguments) -> Result<Self> {
        let configuration = arguments.configuration()?;

        Ok(Application { arguments, configuration })
    }

    fn run(self) -> Result<()> {
        let compilation_config = self.configuration.compilation.unwrap_or_default();
        let output_config = self.configuration.output.unwrap_or_default();
        let path_style = self.arguments.path_style()?;

        let records = interpret(&self.arguments, &compilation_config)?;

        let builder = Builder::new(path_style.clone(), &output_config.format.unwrap_or_default());
        let mut entries = builder.build_all(&records);
        if self.arguments.append {
            entries.extend(read_entries(Path::new(&self.arguments.output))?);
        }

        let mut predicate = filter::entry_predicate(&output_config.content.unwrap_or_default(), path_style.base());
        entries.retain(|entry| predicate(entry));
        entries.iter().for_each(|entry| log::debug!("{:?}", entry));

        let validation = database::validate(&entries, path_style.base())
            .context("Failed to validate the compilation database")?;
        write_entries(&self.arguments.output, &entries)?;

        if validation.missing_sources > 0 {
            log::warn!("{} entries have non-existent source files", validation.missing_sources);
        }
        log::info!("Successfully generated {} with {} entries", self.arguments.output, validation.entries);

        Ok(())
    }
}

fn interpret(arguments: &Arguments, config: &Compilation) -> Result<Vec<CompilationRecord>> {
    let input = arguments.input();
    log::info!("Reading the build log from: {:?}", input);

    let mut source = input.open()?;
    let mut interpreter = Interpreter::new(config.into(), arguments.base_dir.as_deref().map(Path::new));
    let records = interpreter.interpret(source.reader())
        .with_context(|| format!("Failed to process the build log: {:?}", input))?;
    source.finish()?;

    Ok(records)
}

fn read_entries(source: &Path) -> Result<Vec<Entry>> {
    if !source.exists() {
        log::debug!("No entries from previous run, {:?} does not exist.", source);
        return Ok(vec![]);
    }
    let file = OpenOptions::new().read(true).open(source)
        .with_context(|| format!("Failed to open file: {:?}", source))?;
    let entries = database::read(BufReader::new(file))
        .with_context(|| format!("Failed to read compilation database: {:?}", source))?;

    log::debug!("Found {} entries from previous run.", entries.len());
    Ok(entries)
}

fn write_entries(output: &str, entries: &[Entry]) -> Result<()> {
    match output {
        "-" | "/dev/stdout" =>
            database::write(stdout().lock(), entries)?,
        output => {
            if let Some(parent) = Path::new(output).parent().filter(|parent| !parent.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {:?}", parent))?;
            }
            let temp = format!("{}.tmp", output);
            // Create scope for the file, so it will be closed when the scope is over.
            let written = {
                let file = File::create(&temp)
                    .with_context(|| format!("Failed to create file: {}", temp))?;
                database::write(BufWriter::new(file), entries)
                    .with_context(|| format!("Failed to write file: {}", temp))
            };
            if let Err(error) = written {
                let _ = std::fs::remove_file(&temp);
                return Err(error);
            }
            std::fs::rename(&temp, output)
                .with_context(|| format!("Failed to rename file from '{}' to '{}'.", temp, output))?;
        }
    };

    Ok(())
}
