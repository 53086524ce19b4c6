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

//! The optional configuration file of the run.
//!
//! Every section and every field is optional, the run works without any
//! configuration. The accessors return the effective values.

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct Configuration {
    pub output: Option<Output>,
    pub compilation: Option<Compilation>,
}

/// Which words of the log are taken as compiler calls, beside the built-in
/// compiler name patterns.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct Compilation {
    #[serde(default)]
    pub compilers_to_recognize: Vec<CompilerToRecognize>,
    #[serde(default)]
    pub compilers_to_exclude: Vec<PathBuf>,
}

/// A compiler the name patterns would not find (like `xc8-cc` or `armcl`).
///
/// An executable without directory matches any path with that file name.
/// The listed flags are edited on the recorded command.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct CompilerToRecognize {
    pub executable: PathBuf,
    #[serde(default)]
    pub flags_to_add: Vec<String>,
    #[serde(default)]
    pub flags_to_remove: Vec<String>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct Output {
    pub format: Option<Format>,
    pub content: Option<Content>,
}

/// Shape of the written entries.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct Format {
    pub command_as_array: Option<bool>,
    pub drop_output_field: Option<bool>,
}

/// Which entries are written.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct Content {
    pub include_only_existing_source: Option<bool>,
    pub duplicate_filter_fields: Option<DuplicateFilterFields>,
}

/// Represents how the duplicate filtering detects duplicate entries.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(try_from = "String")]
pub enum DuplicateFilterFields {
    FileOnly,
    FileAndOutputOnly,
    All,
}

impl TryFrom<String> for DuplicateFilterFields {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "file" =>
                Ok(DuplicateFilterFields::FileOnly),
            "file_output" =>
                Ok(DuplicateFilterFields::FileAndOutputOnly),
            "all" =>
                Ok(DuplicateFilterFields::All),
            _ =>
                Err(format!(r#"Unknown value "{value}" for duplicate filter, expected one of: "file", "file_output", "all""#)),
        }
    }
}

impl Format {
    /// The `arguments` field is written unless the `command` string is asked.
    pub fn command_as_array(&self) -> bool {
        self.command_as_array.unwrap_or(true)
    }

    pub fn drop_output_field(&self) -> bool {
        self.drop_output_field.unwrap_or(false)
    }
}

impl Content {
    pub fn include_only_existing_source(&self) -> bool {
        self.include_only_existing_source.unwrap_or(false)
    }
}

impl Compilation {
    /// A compiler can't be recognized and excluded at the same time, and
    /// every recognized compiler needs an executable.
    fn check(&self) -> Result<(), String> {
        for compiler in &self.compilers_to_recognize {
            if compiler.executable.as_os_str().is_empty() {
                return Err(String::from("compiler to recognize has an empty executable"));
            }
            if self.compilers_to_exclude.contains(&compiler.executable) {
                return Err(format!("compiler {:?} is both recognized and excluded", compiler.executable));
            }
        }
        Ok(())
    }
}

pub mod io {
    use std::io::stdin;
    use std::path::Path;

    use thiserror::Error;

    use super::*;

    #[derive(Error, Debug)]
    pub enum Error {
        #[error("Failed to read the configuration")]
        IoError(#[from] std::io::Error),
        #[error("Configuration syntax error")]
        SyntaxError(#[from] serde_json::Error),
        #[error("Invalid configuration: {0}")]
        Invalid(String),
    }

    pub fn from_file(file: &Path) -> Result<Configuration, Error> {
        let reader = std::fs::OpenOptions::new().read(true).open(file)?;
        from_reader(reader)
    }

    pub fn from_stdin() -> Result<Configuration, Error> {
        from_reader(stdin())
    }

    /// Parse the stream as JSON and check the compiler lists.
    pub fn from_reader(reader: impl std::io::Read) -> Result<Configuration, Error> {
        let configuration: Configuration = serde_json::from_reader(reader)?;
        if let Some(compilation) = &configuration.compilation {
            compilation.check().map_err(Error::Invalid)?;
        }
        Ok(configuration)
    }

}
