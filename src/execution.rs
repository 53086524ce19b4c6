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

use std::path::PathBuf;

/// A shell command recovered from the build log.
///
/// The arguments are the words of the command line after the clean up,
/// the working directory is the one make was in when it printed the line.
/// An empty working directory means it's not known.
#[derive(Debug, PartialEq)]
pub(crate) struct Execution {
    pub working_dir: PathBuf,
    pub arguments: Vec<String>,
}
