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

//! The JSON compilation database.
//!
//! The format is described at <https://clang.llvm.org/docs/JSONCompilationDatabase.html>.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::paths;
use crate::shell;

pub mod builder;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    #[error("JSON error")]
    JsonError(#[from] serde_json::Error),
    #[error("The compilation database is empty")]
    EmptyDatabase,
    #[error("Entry #{index} is invalid: {reason}")]
    InvalidEntry { index: usize, reason: &'static str },
}

/// Represents an entry of the compilation database.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub directory: PathBuf,
    #[serde(flatten)]
    pub invocation: Invocation,
    pub file: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

/// The compiler call is either a single shell command or an argument list.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Invocation {
    Command(String),
    Arguments(Vec<String>),
}

impl Invocation {
    pub fn arguments(&self) -> Vec<String> {
        match self {
            Invocation::Command(command) => shell::split(command),
            Invocation::Arguments(arguments) => arguments.clone(),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Invocation::Command(command) => command.trim().is_empty(),
            Invocation::Arguments(arguments) => arguments.is_empty(),
        }
    }
}

impl Entry {
    /// The location of the source file on the disk.
    ///
    /// Relative file names are relative to the base directory when the
    /// database was made with relative paths, otherwise to the current one.
    pub fn source_location(&self, base: Option<&Path>) -> PathBuf {
        match base {
            Some(base) if !paths::is_absolute(&self.file) => base.join(&self.file),
            _ => self.file.clone(),
        }
    }
}

/// The outcome of the validation.
#[derive(Debug, Default, PartialEq)]
pub struct Validation {
    pub entries: usize,
    pub missing_sources: usize,
}

/// Validates the database before it gets written.
///
/// Empty database and incomplete entries are errors. Source files which are
/// not on the disk are only counted.
pub fn validate(entries: &[Entry], base: Option<&Path>) -> Result<Validation, Error> {
    if entries.is_empty() {
        return Err(Error::EmptyDatabase);
    }
    let mut missing_sources = 0;
    for (index, entry) in entries.iter().enumerate() {
        if entry.directory.as_os_str().is_empty() {
            return Err(Error::InvalidEntry { index, reason: "directory is empty" });
        }
        if entry.file.as_os_str().is_empty() {
            return Err(Error::InvalidEntry { index, reason: "file is empty" });
        }
        if entry.invocation.is_empty() {
            return Err(Error::InvalidEntry { index, reason: "command is empty" });
        }
        if !entry.source_location(base).exists() {
            log::warn!("source file does not exist: {} (entry {})", entry.file.display(), index + 1);
            missing_sources += 1;
        }
    }
    Ok(Validation { entries: entries.len(), missing_sources })
}

/// Write the entries as pretty printed JSON array, followed by a new line.
pub fn write(mut writer: impl Write, entries: &[Entry]) -> Result<(), Error> {
    serde_json::to_writer_pretty(&mut writer, entries)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    Ok(())
}

pub fn read(reader: impl Read) -> Result<Vec<Entry>, Error> {
    let entries = serde_json::from_reader(reader)?;

    Ok(entries)
}
