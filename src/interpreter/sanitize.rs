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

//! Best-effort clean up of a shell command line before it gets tokenized.
//!
//! Build logs show the command as make passed it to the shell. Command
//! substitutions and redirections are shell features, not compiler arguments,
//! so these are rewritten or removed by simple textual rules.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

/// Resolves backtick substitutions and strips redirections.
///
/// A substitution which echoes a literal (automake's
/// `` `test -f 'x.c' || echo './'` `` idiom) is replaced by that literal,
/// any other substitution is deleted. A literal which is not a directory
/// prefix is kept apart from the word glued to it.
pub fn sanitize(line: &str) -> String {
    let substituted = BACKTICK.replace_all(line, |captures: &Captures| {
        match echoed_literal(&captures[1]) {
            Some(literal) => {
                log::debug!("backtick substitution resolved to: {}", literal);
                let end = captures.get(0).map_or(line.len(), |whole| whole.end());
                let glued = line[end..].starts_with(|c: char| c.is_ascii_alphanumeric());
                if glued && !literal.ends_with('/') {
                    format!("{} ", literal)
                } else {
                    literal.to_string()
                }
            }
            None => {
                log::debug!("backtick substitution dropped: {}", &captures[0]);
                String::new()
            }
        }
    });
    REDIRECTION.replace_all(&substituted, "").trim().to_string()
}

fn echoed_literal(command: &str) -> Option<&str> {
    ECHO_QUOTED.captures(command)
        .or_else(|| ECHO_BARE.captures(command))
        .and_then(|captures| captures.get(1))
        .map(|literal| literal.as_str())
}

lazy_static! {
    static ref BACKTICK: Regex = Regex::new(r"`([^`]*)`").unwrap();
    static ref ECHO_QUOTED: Regex = Regex::new(r#"echo\s+['"]([^'"]+)['"]"#).unwrap();
    static ref ECHO_BARE: Regex = Regex::new(r"echo\s+(\S+)").unwrap();
    // `>f`, `>>f`, `<f`, `2>f`, `2>&1`, `N>&M`, `&>f`, target optionally separated by spaces.
    static ref REDIRECTION: Regex = Regex::new(r"\s+(?:\d+|&)?(?:>>|>|<)(?:&\d+|\s*[^\s<>|&;]+)").unwrap();
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_redirections() {
        assert_eq!("gcc main.c -o main", sanitize("gcc main.c -o main 2>&1"));
        assert_eq!("gcc -c file.c -o file.o", sanitize("gcc -c file.c -o file.o >output.log"));
        assert_eq!("gcc -Wall test.c -o test", sanitize("gcc -Wall test.c -o test >>build.log"));
        assert_eq!("arm-none-eabi-gcc -c src.c -o obj.o", sanitize("arm-none-eabi-gcc -c src.c -o obj.o 2>error.log"));
        assert_eq!("clang++ hello.cpp -o hello", sanitize("clang++ hello.cpp -o hello <input.txt"));
        assert_eq!("gcc -c file.c -o file.o", sanitize("gcc -c file.c -o file.o >output.log 2>&1"));
        assert_eq!("gcc test.c -o test", sanitize("gcc test.c -o test 3>debug.log"));
        assert_eq!("gcc main.c -o main", sanitize("gcc main.c -o main 3>&2"));
        assert_eq!("gcc main.c -o main", sanitize("gcc main.c -o main > build.log"));
        assert_eq!("gcc main.c -o main", sanitize("gcc main.c -o main &>all.log"));
        assert_eq!("gcc normal.c -o normal", sanitize("gcc normal.c -o normal"));
    }

    #[test]
    fn test_backtick_with_quoted_echo() {
        assert_eq!(
            "gcc -c -o foo.o ./src/foo.c",
            sanitize("gcc -c -o foo.o `test -f 'src/foo.c' || echo './'`src/foo.c"));
        assert_eq!(
            "gcc -c ../lib/bar.c",
            sanitize("gcc -c `echo \"../lib/\"`bar.c"));
    }

    #[test]
    fn test_backtick_with_bare_echo() {
        assert_eq!("gcc -c src/foo.c", sanitize("gcc -c `echo src/`foo.c"));
    }

    #[test]
    fn test_backtick_literal_kept_apart() {
        assert_eq!("gcc -c src foo.c", sanitize("gcc -c `echo src`foo.c"));
        assert_eq!("gcc -c -DVERSION=3 main.c", sanitize("gcc -c -DVERSION=`echo 3` main.c"));
        assert_eq!("gcc -c lib/ foo.c", sanitize("gcc -c `echo lib/` foo.c"));
    }

    #[test]
    fn test_backtick_without_echo() {
        assert_eq!("gcc  -c foo.c", sanitize("gcc `pkg-config --cflags gtk` -c foo.c"));
    }
}
