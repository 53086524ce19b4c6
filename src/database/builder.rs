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

use std::path::{Path, PathBuf};

use crate::compilation::CompilationRecord;
use crate::configuration::Format;
use crate::database::{Entry, Invocation};
use crate::paths;
use crate::shell;

/// Represents how the file names are written into the database.
#[derive(Clone, Debug, PartialEq)]
pub enum PathStyle {
    /// Joined to the working directory of the compiler.
    Resolved,
    /// Relative to the given (absolute) base directory, when possible.
    RelativeTo(PathBuf),
}

impl PathStyle {
    pub fn base(&self) -> Option<&Path> {
        match self {
            PathStyle::Resolved => None,
            PathStyle::RelativeTo(base) => Some(base.as_path()),
        }
    }

    fn apply(&self, path: PathBuf) -> PathBuf {
        match self {
            PathStyle::Resolved => path,
            PathStyle::RelativeTo(base) => paths::relative_to(&path, base),
        }
    }
}

/// Turns compilation records into compilation database entries.
#[derive(Debug)]
pub struct Builder {
    paths: PathStyle,
    command_as_array: bool,
    drop_output_field: bool,
}

impl Builder {
    pub fn new(paths: PathStyle, format: &Format) -> Self {
        Builder {
            paths,
            command_as_array: format.command_as_array(),
            drop_output_field: format.drop_output_field(),
        }
    }

    pub fn build(&self, record: &CompilationRecord) -> Entry {
        let directory = if record.working_dir.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            paths::normalize(&record.working_dir)
        };
        let file = paths::join(&directory, &record.source);
        let output = record.output.as_ref()
            .filter(|_| !self.drop_output_field)
            .map(|output| self.paths.apply(paths::join(&directory, output)));

        let invocation = if self.command_as_array {
            Invocation::Arguments(record.arguments.clone())
        } else {
            Invocation::Command(shell::join(&record.arguments))
        };

        Entry {
            file: self.paths.apply(file),
            directory: self.paths.apply(directory),
            invocation,
            output,
        }
    }

    /// The entries are in the same order as the records.
    pub fn build_all(&self, records: &[CompilationRecord]) -> Vec<Entry> {
        records.iter()
            .map(|record| self.build(record))
            .collect()
    }
}
