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

use crate::tools::matchers::source::looks_like_a_source_file;

/// Represents a compiler call found in the build log.
#[derive(Clone, Debug, PartialEq)]
pub struct CompilationRecord {
    /// Empty when the log did not tell where the compiler was running.
    pub working_dir: PathBuf,
    pub compiler: String,
    /// The compiler itself is the first element.
    pub arguments: Vec<String>,
    /// As it was written on the command line.
    pub source: PathBuf,
    pub output: Option<PathBuf>,
}

impl CompilationRecord {
    /// Creates the record from the compiler arguments.
    ///
    /// The output is the operand of the `-o` flag. The source is the last
    /// argument which looks like a source file. Fails when there is no source.
    pub fn from_arguments(working_dir: PathBuf, arguments: Vec<String>) -> Result<Self, String> {
        let compiler = arguments.first()
            .cloned()
            .ok_or_else(|| String::from("compiler is not found"))?;

        let mut source = None;
        let mut output = None;
        let mut iterator = arguments.iter().skip(1);
        while let Some(argument) = iterator.next() {
            if argument == "-o" {
                if let Some(file) = iterator.next() {
                    output = Some(PathBuf::from(file));
                }
            } else if looks_like_a_source_file(argument) {
                source = Some(PathBuf::from(argument));
            }
        }

        match source {
            Some(source) =>
                Ok(CompilationRecord { working_dir, compiler, arguments, source, output }),
            None =>
                Err(String::from("source file is not found")),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn arguments(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_source_and_output() {
        let input = arguments(&["gcc", "-c", "-Wall", "main.c", "-o", "main.o"]);

        let result = CompilationRecord::from_arguments(PathBuf::from("/p"), input.clone());

        let expected = CompilationRecord {
            working_dir: PathBuf::from("/p"),
            compiler: String::from("gcc"),
            arguments: input,
            source: PathBuf::from("main.c"),
            output: Some(PathBuf::from("main.o")),
        };
        assert_eq!(Ok(expected), result);
    }

    #[test]
    fn test_files_from_various_commands() {
        let cases = [
            (vec!["g++", "-c", "main.cpp", "-o", "main.o"], "main.cpp", Some("main.o")),
            (vec!["arm-none-eabi-gcc", "-c", "startup.s", "-o", "startup.o"], "startup.s", Some("startup.o")),
            (vec!["gcc", "-c", "main.c"], "main.c", None),
            (vec!["gcc", "-I", "include", "-c", "src/utils/helper.c", "-o", "build/helper.o"], "src/utils/helper.c", Some("build/helper.o")),
            (vec!["gcc", "-S", "main.c", "-o", "main.s"], "main.c", Some("main.s")),
        ];

        for (input, source, output) in cases {
            let result = CompilationRecord::from_arguments(PathBuf::new(), arguments(&input)).unwrap();

            assert_eq!(PathBuf::from(source), result.source);
            assert_eq!(output.map(PathBuf::from), result.output);
        }
    }

    #[test]
    fn test_last_source_wins() {
        let input = arguments(&["gcc", "-c", "first.c", "second.cc", "-o", "out.o"]);

        let result = CompilationRecord::from_arguments(PathBuf::new(), input).unwrap();

        assert_eq!(PathBuf::from("second.cc"), result.source);
    }

    #[test]
    fn test_without_source() {
        let input = arguments(&["gcc", "main.o", "util.o", "-o", "program"]);

        let result = CompilationRecord::from_arguments(PathBuf::new(), input);

        assert_eq!(Err(String::from("source file is not found")), result);
    }

    #[test]
    fn test_dangling_output_flag() {
        let input = arguments(&["gcc", "-c", "main.c", "-o"]);

        let result = CompilationRecord::from_arguments(PathBuf::new(), input).unwrap();

        assert_eq!(None, result.output);
    }
}
