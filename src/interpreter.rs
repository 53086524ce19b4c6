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

//! Reads the log of a make invocation and finds the compiler calls in it.
//!
//! The interpreter is a line based scanner. It follows the working directory
//! of make from the directory change messages, and turns the compiler command
//! lines into compilation records. Other lines are ignored.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::compilation::CompilationRecord;
use crate::execution::Execution;
use crate::interpreter::marker::{directory_marker, DirectoryMarker};
use crate::interpreter::sanitize::sanitize;
use crate::paths;
use crate::shell;
use crate::tools::{RecognitionResult, Tool};

mod marker;
mod sanitize;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read the build log")]
    Input(#[from] std::io::Error),
}

/// The kind of a log line. The variants are listed in the order of precedence.
#[derive(Debug, PartialEq)]
pub(crate) enum LineKind<'a> {
    Blank,
    Comment,
    EnterDirectory(&'a str),
    LeaveDirectory,
    Echo,
    CompilerCandidate(&'a str),
    Other,
}

/// Classify a single line of the log.
///
/// An echo is never a compiler call, even if the echoed text names one.
/// Compilers are looked for in the words of the command, quotes are honored.
pub(crate) fn classify<'a>(line: &'a str, tool: &dyn Tool) -> LineKind<'a> {
    let line = line.trim();
    if line.is_empty() {
        return LineKind::Blank;
    }
    if line.starts_with('#') {
        return LineKind::Comment;
    }
    match directory_marker(line) {
        Some(DirectoryMarker::Enter(directory)) =>
            return LineKind::EnterDirectory(directory),
        Some(DirectoryMarker::Leave) =>
            return LineKind::LeaveDirectory,
        None => {}
    }
    if is_echo(line) {
        return LineKind::Echo;
    }
    if shell::split(&sanitize(line)).iter().any(|word| tool.is_compiler(word)) {
        LineKind::CompilerCandidate(line)
    } else {
        LineKind::Other
    }
}

fn is_echo(command: &str) -> bool {
    command.split_whitespace().next() == Some("echo")
}

/// The working directories of make, the last one is the current.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DirectoryStack(Vec<PathBuf>);

impl DirectoryStack {
    pub fn new(base: Option<&Path>) -> Self {
        DirectoryStack(base.map(Path::to_path_buf).into_iter().collect())
    }

    pub fn push(&mut self, directory: &str) {
        self.0.push(PathBuf::from(directory))
    }

    /// Mismatched leave messages are tolerated, popping an empty stack is a no-op.
    pub fn pop(&mut self) -> Option<PathBuf> {
        self.0.pop()
    }

    pub fn current(&self) -> Option<&Path> {
        self.0.last().map(PathBuf::as_path)
    }
}

pub struct Interpreter {
    directories: DirectoryStack,
    tool: Box<dyn Tool>,
}

impl Interpreter {
    /// The base directory (when given) is the initial working directory.
    pub(crate) fn new(tool: Box<dyn Tool>, base: Option<&Path>) -> Self {
        Interpreter { directories: DirectoryStack::new(base), tool }
    }

    /// Process the whole log and return the compilation records in the order
    /// as they were found.
    ///
    /// Only the read failure of the input is an error. Lines which can't be
    /// understood are skipped.
    pub fn interpret(&mut self, reader: impl BufRead) -> Result<Vec<CompilationRecord>, Error> {
        let mut records = vec![];
        for line in reader.split(b'\n') {
            let bytes = line?;
            let line = String::from_utf8_lossy(&bytes);
            if let Some(record) = self.feed(line.trim_end_matches('\r')) {
                records.push(record);
            }
        }
        log::debug!("Found {} compilation(s) in the log.", records.len());
        Ok(records)
    }

    /// Process a single line of the log.
    pub fn feed(&mut self, line: &str) -> Option<CompilationRecord> {
        match classify(line, self.tool.as_ref()) {
            LineKind::Blank | LineKind::Comment =>
                None,
            LineKind::EnterDirectory(directory) => {
                log::debug!("Entering directory: {}", directory);
                self.directories.push(directory);
                None
            }
            LineKind::LeaveDirectory => {
                match self.directories.pop() {
                    Some(directory) => log::debug!("Leaving directory: {}", directory.display()),
                    None => log::debug!("Leaving directory, but no directory was entered."),
                }
                None
            }
            LineKind::Echo => {
                log::trace!("echo line skipped: {}", line);
                None
            }
            LineKind::CompilerCandidate(command) =>
                self.compilation(command),
            LineKind::Other => {
                log::trace!("line not recognized: {}", line);
                None
            }
        }
    }

    fn compilation(&self, line: &str) -> Option<CompilationRecord> {
        let sanitized = sanitize(line);
        let (working_dir, command) = self.working_directory(&sanitized);
        if is_echo(command) {
            log::debug!("echo after directory change skipped: {}", line);
            return None;
        }

        let execution = Execution { working_dir, arguments: shell::split(command) };
        match self.tool.recognize(&execution) {
            RecognitionResult::Recognized(Ok(record)) => {
                log::debug!("compiler call recognized: {:?}", record);
                Some(record)
            }
            RecognitionResult::Recognized(Err(reason)) => {
                log::debug!("compiler call recognized with failure, {} : {}", reason, line);
                None
            }
            RecognitionResult::NotRecognized => {
                log::debug!("compiler call not recognized: {}", line);
                None
            }
        }
    }

    /// Follows the `cd <dir> &&` prefixes of the command. These change the
    /// directory only for this command, the stack is not modified.
    fn working_directory<'a>(&self, line: &'a str) -> (PathBuf, &'a str) {
        let mut working_dir = self.directories.current()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let mut command = line;
        while let Some(captures) = CHANGE_DIRECTORY.captures(command) {
            let target = shell::split(&captures[1]).into_iter().next().unwrap_or_default();
            working_dir = paths::change_directory(&working_dir, Path::new(&target));
            command = captures.get(2).map_or("", |rest| rest.as_str());
        }
        (working_dir, command)
    }
}

lazy_static! {
    static ref CHANGE_DIRECTORY: Regex = Regex::new(r"^\s*cd\s+([^&]+?)\s*&&\s*(.*)$").unwrap();
}

#[cfg(test)]
mod test {
    use crate::configuration::Compilation;

    use super::*;

    fn sut() -> Interpreter {
        Interpreter::new((&Compilation::default()).into(), None)
    }

    fn sut_in(directory: &str) -> Interpreter {
        let mut sut = sut();
        sut.directories.push(directory);
        sut
    }

    fn arguments(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_classify() {
        let sut = sut();
        let tool = sut.tool.as_ref();

        assert_eq!(LineKind::Blank, classify("   ", tool));
        assert_eq!(LineKind::Comment, classify("  # gcc -c main.c", tool));
        assert_eq!(LineKind::EnterDirectory("/p"), classify("make: Entering directory '/p'", tool));
        assert_eq!(LineKind::LeaveDirectory, classify("make[1]: Leaving directory '/p'", tool));
        assert_eq!(LineKind::Echo, classify("  echo \"gcc -c main.c\"", tool));
        assert_eq!(LineKind::CompilerCandidate("gcc -c main.c"), classify("\tgcc -c main.c ", tool));
        assert_eq!(LineKind::CompilerCandidate("cd src && gcc -c util.c"), classify("cd src && gcc -c util.c", tool));
        assert_eq!(LineKind::CompilerCandidate("\"/opt/my tools/gcc\" -c a.c"), classify("\"/opt/my tools/gcc\" -c a.c", tool));
        assert_eq!(LineKind::Other, classify("mkdir -p build", tool));
        assert_eq!(LineKind::Other, classify("make: Nothing to be done for 'all'.", tool));
    }

    #[test]
    fn test_directory_stack() {
        let mut sut = sut();

        sut.feed("make: Entering directory '/test'");
        let before = sut.directories.clone();
        sut.feed("make: Entering directory '/home/user/project'");
        sut.feed("make[1]: Entering directory '/home/user/project/subdir'");
        assert_eq!(Some(Path::new("/home/user/project/subdir")), sut.directories.current());

        sut.feed("make[1]: Leaving directory '/home/user/project/subdir'");
        assert_eq!(Some(Path::new("/home/user/project")), sut.directories.current());

        sut.feed("make: Leaving directory '/home/user/project'");
        assert_eq!(before, sut.directories);

        sut.feed("gcc --version");
        assert_eq!(before, sut.directories);
    }

    #[test]
    fn test_directory_with_quote_in_name() {
        let mut sut = sut();

        sut.feed("make: Entering directory '/home/o'neil/proj'");
        assert_eq!(Some(Path::new("/home/o'neil/proj")), sut.directories.current());

        let record = sut.feed("gcc -c main.c").unwrap();
        assert_eq!(PathBuf::from("/home/o'neil/proj"), record.working_dir);
    }

    #[test]
    fn test_unbalanced_leave_is_ignored() {
        let mut sut = sut();

        sut.feed("make: Leaving directory '/a'");
        sut.feed("make: Leaving directory '/b'");
        assert_eq!(None, sut.directories.current());

        sut.feed("make: Entering directory '/c'");
        sut.feed("make: Leaving directory '/other'");
        assert_eq!(None, sut.directories.current());
    }

    #[test]
    fn test_base_directory_seeds_the_stack() {
        let mut sut = Interpreter::new((&Compilation::default()).into(), Some(Path::new("/base")));

        let record = sut.feed("gcc -c main.c").unwrap();

        assert_eq!(PathBuf::from("/base"), record.working_dir);
    }

    #[test]
    fn test_scenario_single_compilation() {
        let input = "make: Entering directory '/p'\n\
                     gcc -c -Wall main.c -o main.o\n\
                     make: Leaving directory '/p'\n";

        let result = sut().interpret(input.as_bytes()).unwrap();

        let expected = vec![
            CompilationRecord {
                working_dir: PathBuf::from("/p"),
                compiler: String::from("gcc"),
                arguments: arguments(&["gcc", "-c", "-Wall", "main.c", "-o", "main.o"]),
                source: PathBuf::from("main.c"),
                output: Some(PathBuf::from("main.o")),
            }
        ];
        assert_eq!(expected, result);
    }

    #[test]
    fn test_empty_input() {
        let result = sut().interpret("".as_bytes()).unwrap();

        assert!(result.is_empty());
    }

    #[test]
    fn test_without_directory() {
        let record = sut().feed("gcc -c main.c").unwrap();

        assert_eq!(PathBuf::new(), record.working_dir);
        assert_eq!(None, record.output);
    }

    #[test]
    fn test_change_directory_chain() {
        let mut sut = sut_in("/t");

        let record = sut.feed("cd src && gcc -c util.c -o util.o").unwrap();

        assert_eq!(PathBuf::from("/t/src"), record.working_dir);
        assert_eq!("gcc", record.compiler);
        assert_eq!(arguments(&["gcc", "-c", "util.c", "-o", "util.o"]), record.arguments);
        assert_eq!(PathBuf::from("util.c"), record.source);
        assert_eq!(Some(PathBuf::from("util.o")), record.output);
        assert_eq!(Some(Path::new("/t")), sut.directories.current());
    }

    #[test]
    fn test_change_directory_chains() {
        let mut sut = sut_in("/t");

        let record = sut.feed("cd lib && cd \"sub dir\" && gcc -c x.c").unwrap();
        assert_eq!(PathBuf::from("/t/lib/sub dir"), record.working_dir);

        let record = sut.feed("cd /abs && gcc -c x.c").unwrap();
        assert_eq!(PathBuf::from("/abs"), record.working_dir);

        let record = sut.feed("cd ../lib && gcc -c utils.c -o utils.o -I../include -Wall").unwrap();
        assert_eq!(PathBuf::from("/lib"), record.working_dir);
        assert_eq!(arguments(&["gcc", "-c", "utils.c", "-o", "utils.o", "-I../include", "-Wall"]), record.arguments);
    }

    #[test]
    fn test_change_directory_without_compiler() {
        let mut sut = sut_in("/t");

        assert_eq!(None, sut.feed("cd src && echo hello"));
        assert_eq!(None, sut.feed("cd src && echo gcc -c main.c"));
        assert_eq!(None, sut.feed("cd build && gcc main.o -o program"));
    }

    #[test]
    fn test_echo_lines_are_skipped() {
        let input = "make: Entering directory '/home/user/project'\n\
                     echo \"/bin/date +%T Compiling /home/user/project/main.c 2>/dev/null\"\n\
                     gcc -c -Wall main.c -o main.o\n\
                     echo gcc -c -Wall util.c -o util.o\n\
                     gcc -c -Wall util.c -o util.o\n\
                     gcc main.o util.o -o program\n\
                     make: Leaving directory '/home/user/project'\n";

        let result = sut().interpret(input.as_bytes()).unwrap();

        assert_eq!(2, result.len());
        assert_eq!(PathBuf::from("main.c"), result[0].source);
        assert_eq!(PathBuf::from("/home/user/project"), result[0].working_dir);
        assert_eq!(PathBuf::from("util.c"), result[1].source);
    }

    #[test]
    fn test_wrapper_prefix() {
        let mut sut = sut_in("/project/build");

        let record = sut.feed("path/to/check path/to/check -p gcc -DTEST=1 -c main.c -o main.o").unwrap();

        assert_eq!(PathBuf::from("/project/build"), record.working_dir);
        assert_eq!("gcc", record.compiler);
        assert_eq!(arguments(&["gcc", "-DTEST=1", "-c", "main.c", "-o", "main.o"]), record.arguments);
    }

    #[test]
    fn test_redirection_and_substitution() {
        let mut sut = sut_in("/w");

        let record = sut.feed("gcc -c -o foo.o `test -f 'src/foo.c' || echo './'`src/foo.c >build.log 2>&1").unwrap();

        assert_eq!(arguments(&["gcc", "-c", "-o", "foo.o", "./src/foo.c"]), record.arguments);
        assert_eq!(PathBuf::from("./src/foo.c"), record.source);
        assert_eq!(Some(PathBuf::from("foo.o")), record.output);
    }

    #[test]
    fn test_cross_compiler_drivers() {
        let mut sut = sut_in("/w");

        let record = sut.feed("x86_64-w64-mingw32-gcc-posix -c a.c -o a.o").unwrap();
        assert_eq!("x86_64-w64-mingw32-gcc-posix", record.compiler);
        assert_eq!(Some(PathBuf::from("a.o")), record.output);

        let record = sut.feed("i686-w64-mingw32-g++-win32 -c a.cpp").unwrap();
        assert_eq!("i686-w64-mingw32-g++-win32", record.compiler);
        assert_eq!(PathBuf::from("a.cpp"), record.source);

        let record = sut.feed("gcc-mp-12 -c a.c").unwrap();
        assert_eq!("gcc-mp-12", record.compiler);

        let record = sut.feed("ccache gcc -c a.c").unwrap();
        assert_eq!("gcc", record.compiler);

        assert_eq!(None, sut.feed("gcc-ar rcs libx.a a.o b.o"));
        assert_eq!(None, sut.feed("clang-tidy a.c -- -Iinclude"));
    }

    #[test]
    fn test_quoted_compiler_path() {
        let record = sut().feed("\"/opt/my tools/gcc\" -c a.c").unwrap();

        assert_eq!("/opt/my tools/gcc", record.compiler);
        assert_eq!(arguments(&["/opt/my tools/gcc", "-c", "a.c"]), record.arguments);
        assert_eq!(PathBuf::from("a.c"), record.source);
    }

    #[test]
    fn test_quoted_arguments() {
        let record = sut().feed("gcc -DMESSAGE=\"Hello World\" -c 'my file.c'").unwrap();

        assert_eq!(arguments(&["gcc", "-DMESSAGE=Hello World", "-c", "my file.c"]), record.arguments);
        assert_eq!(PathBuf::from("my file.c"), record.source);
    }

    #[test]
    fn test_multiple_directories() {
        let input = "make: Entering directory '/project/root'\n\
                     make[1]: Entering directory '/project/root/subdir1'\n\
                     gcc -c main1.c -o main1.o\n\
                     gcc -c util1.c -o util1.o\n\
                     make[1]: Leaving directory '/project/root/subdir1'\n\
                     make[1]: Entering directory '/project/root/subdir2'\n\
                     \n\
                     # comment gcc -c ignored.c\n\
                     gcc -c main2.c -o main2.o\r\n\
                     arm-none-eabi-gcc -c -mcpu=cortex-m0 -DSTM32F030x6 -ICore/Inc util2.c -o util2.o\n\
                     make[1]: Leaving directory '/project/root/subdir2'\n\
                     make: Leaving directory '/project/root'\n";

        let result = sut().interpret(input.as_bytes()).unwrap();

        let summary: Vec<(PathBuf, PathBuf)> = result.into_iter()
            .map(|record| (record.working_dir, record.source))
            .collect();
        assert_eq!(
            vec![
                (PathBuf::from("/project/root/subdir1"), PathBuf::from("main1.c")),
                (PathBuf::from("/project/root/subdir1"), PathBuf::from("util1.c")),
                (PathBuf::from("/project/root/subdir2"), PathBuf::from("main2.c")),
                (PathBuf::from("/project/root/subdir2"), PathBuf::from("util2.c")),
            ],
            summary);
    }

    #[test]
    fn test_invalid_utf8_is_tolerated() {
        let input: &[u8] = b"make: Entering directory '/p'\n\xff\xfe garbage\ngcc -c main.c\n";

        let result = sut().interpret(input).unwrap();

        assert_eq!(1, result.len());
        assert_eq!(PathBuf::from("/p"), result[0].working_dir);
    }

    #[test]
    fn test_read_failure() {
        struct Failing;

        impl std::io::Read for Failing {
            fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "broken"))
            }
        }

        let result = sut().interpret(std::io::BufReader::new(Failing));

        assert!(matches!(result, Err(Error::Input(_))));
    }
}
