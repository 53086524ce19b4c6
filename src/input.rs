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

use std::fs::OpenOptions;
use std::io::{stdin, BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

use thiserror::Error;

use crate::shell;
use crate::tools::matchers::compiler::executable_name;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to open file: {path}")]
    Open { path: PathBuf, #[source] source: std::io::Error },
    #[error("Not a make command: '{0}'")]
    NotMake(String),
    #[error("Failed to execute command: {command}")]
    Execution { command: String, #[source] source: std::io::Error },
}

/// Where the build log comes from.
#[derive(Clone, Debug, PartialEq)]
pub enum Input {
    File(PathBuf),
    Stdin,
    /// The make command line, which will run in dry-run mode.
    Make(String),
}

/// An open build log.
pub struct Source {
    reader: Box<dyn BufRead>,
    child: Option<(String, Child)>,
}

impl Input {
    pub fn open(&self) -> Result<Source, Error> {
        match self {
            Input::File(path) => {
                let file = OpenOptions::new().read(true).open(path)
                    .map_err(|source| Error::Open { path: path.clone(), source })?;
                Ok(Source { reader: Box::new(BufReader::new(file)), child: None })
            }
            Input::Stdin =>
                Ok(Source { reader: Box::new(BufReader::new(stdin())), child: None }),
            Input::Make(command_line) => {
                let mut command = make_command(command_line)?;
                log::info!("Executing: {:?}", command);
                let mut child = command.spawn()
                    .map_err(|source| Error::Execution { command: command_line.clone(), source })?;
                let stdout = child.stdout.take()
                    .ok_or_else(|| Error::Execution {
                        command: command_line.clone(),
                        source: std::io::Error::new(std::io::ErrorKind::Other, "standard output is not captured"),
                    })?;
                Ok(Source { reader: Box::new(BufReader::new(stdout)), child: Some((command_line.clone(), child)) })
            }
        }
    }
}

impl Source {
    pub fn reader(&mut self) -> &mut dyn BufRead {
        self.reader.as_mut()
    }

    /// Waits for the make process to finish.
    ///
    /// Failing build is not an error, the log of the dry-run can still have
    /// the compiler calls in it.
    pub fn finish(self) -> Result<(), Error> {
        if let Some((command, mut child)) = self.child {
            drop(self.reader);
            let status = child.wait()
                .map_err(|source| Error::Execution { command: command.clone(), source })?;
            if !status.success() {
                log::warn!("Command '{}' finished with {}", command, status);
            }
        }
        Ok(())
    }
}

/// Creates the dry-run command (`make -Bnkw ...`) from the given make command line.
///
/// `-B` to consider all targets out of date, `-n` to print the commands only,
/// `-k` to continue after errors and `-w` to print the directory changes.
pub fn make_command(command_line: &str) -> Result<Command, Error> {
    let mut words = shell::split(command_line).into_iter();
    let program = words.next()
        .filter(|program| executable_name(program).trim_end_matches(".exe").ends_with("make"))
        .ok_or_else(|| Error::NotMake(command_line.to_string()))?;

    let mut command = Command::new(program);
    command.arg("-Bnkw")
        .args(words)
        .stdin(Stdio::null())
        .stdout(Stdio::piped());
    Ok(command)
}
