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

use std::path::Path;

use crate::compilation::CompilationRecord;
use crate::configuration::Compilation;
use crate::execution::Execution;
use crate::tools::configured::Configured;
use crate::tools::known::KnownCompilers;
use crate::tools::matchers::compiler::executable_name;
use crate::tools::RecognitionResult::{NotRecognized, Recognized};

mod configured;
mod known;
pub(crate) mod matchers;

/// This abstraction is representing a tool which is known by us.
pub(crate) trait Tool {
    /// Tells if the word of a command line names this tool.
    fn is_compiler(&self, word: &str) -> bool;

    /// A tool has a potential to recognize a command execution and identify
    /// the semantic of that command.
    ///
    /// Words before the first compiler are wrappers (like `ccache`), those are
    /// not part of the compiler call.
    fn recognize(&self, x: &Execution) -> RecognitionResult {
        match x.arguments.iter().position(|word| self.is_compiler(word)) {
            Some(index) =>
                Recognized(CompilationRecord::from_arguments(x.working_dir.clone(), x.arguments[index..].to_vec())),
            None =>
                NotRecognized,
        }
    }
}

#[derive(Debug, PartialEq)]
pub(crate) enum RecognitionResult {
    Recognized(Result<CompilationRecord, String>),
    NotRecognized,
}

struct Any {
    tools: Vec<Box<dyn Tool>>,
}

impl Tool for Any {
    fn is_compiler(&self, word: &str) -> bool {
        self.tools.iter().any(|tool| tool.is_compiler(word))
    }

    /// Any of the tool recognize the semantic, will be returned as result.
    fn recognize(&self, x: &Execution) -> RecognitionResult {
        for tool in &self.tools {
            match tool.recognize(x) {
                Recognized(result) =>
                    return Recognized(result),
                _ => continue,
            }
        }
        NotRecognized
    }
}

struct ExcludeOr {
    excludes: Vec<std::path::PathBuf>,
    or: Box<dyn Tool>,
}

impl ExcludeOr {
    fn is_excluded(&self, word: &str) -> bool {
        self.excludes.iter()
            .any(|exclude| Path::new(word) == exclude || Path::new(executable_name(word)) == exclude)
    }
}

impl Tool for ExcludeOr {
    fn is_compiler(&self, word: &str) -> bool {
        !self.is_excluded(word) && self.or.is_compiler(word)
    }

    /// Check if the compiler is on the exclude list, return as not recognized.
    /// Otherwise delegate the recognition to the tool given.
    fn recognize(&self, x: &Execution) -> RecognitionResult {
        match self.or.recognize(x) {
            Recognized(Ok(call)) if self.is_excluded(&call.compiler) =>
                NotRecognized,
            result =>
                result,
        }
    }
}

impl From<&Compilation> for Box<dyn Tool> {
    fn from(value: &Compilation) -> Self {
        let mut tools = vec![
            Box::new(KnownCompilers) as Box<dyn Tool>,
        ];

        // The hinted tools should be the first to recognize.
        if !value.compilers_to_recognize.is_empty() {
            let configured = Configured::from(&value.compilers_to_recognize);
            tools.insert(0, configured)
        }
        // Excluded compiler check should be done before anything.
        if !value.compilers_to_exclude.is_empty() {
            return Box::new(
                ExcludeOr {
                    // exclude the executables are explicitly mentioned in the config file.
                    excludes: value.compilers_to_exclude.clone(),
                    or: Box::new(Any { tools }),
                }
            );
        }
        // Return the tools we configured.
        Box::new(Any { tools })
    }
}
