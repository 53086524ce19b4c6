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
use crate::configuration::CompilerToRecognize;
use crate::execution::Execution;
use crate::tools::{Any, RecognitionResult, Tool};
use crate::tools::matchers::compiler::executable_name;
use crate::tools::RecognitionResult::{NotRecognized, Recognized};

pub(crate) struct Configured {
    config: CompilerToRecognize,
}

impl Configured {
    pub(crate) fn new(config: &CompilerToRecognize) -> Box<dyn Tool> {
        Box::new(Configured { config: config.clone() })
    }

    pub(crate) fn from(configs: &[CompilerToRecognize]) -> Box<dyn Tool> {
        Box::new(Any { tools: configs.iter().map(Configured::new).collect() })
    }
}

impl Tool for Configured {
    /// The executable from the configuration is compared to the word as is,
    /// or only to its file name when the configuration has no directory.
    fn is_compiler(&self, word: &str) -> bool {
        let executable = self.config.executable.as_path();
        Path::new(word) == executable
            || (executable.parent() == Some(Path::new("")) && Path::new(executable_name(word)) == executable)
    }

    fn recognize(&self, x: &Execution) -> RecognitionResult {
        match x.arguments.iter().position(|word| self.is_compiler(word)) {
            Some(index) => {
                // filter out requested flags, extend with requested flags.
                let arguments: Vec<String> = x.arguments[index..].iter()
                    .enumerate()
                    .filter(|(position, argument)| *position == 0 || !self.config.flags_to_remove.contains(*argument))
                    .map(|(_, argument)| argument.clone())
                    .chain(self.config.flags_to_add.iter().cloned())
                    .collect();

                Recognized(CompilationRecord::from_arguments(x.working_dir.clone(), arguments))
            }
            None =>
                NotRecognized,
        }
    }
}
