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

//! Parser of the directory change messages printed by make.
//!
//! GNU make prints these when it runs with `-w`, or recursively with `-C`:
//!
//! ```text
//! make[2]: Entering directory '/home/user/project/src'
//! make[2]: Leaving directory '/home/user/project/src'
//! ```
//!
//! Older versions open the quote with a backtick, localized ones with `‘`.

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag},
    character::complete::{char, digit1, one_of, space1},
    combinator::{opt, value, verify},
    error::{Error, ErrorKind},
    sequence::{delimited, tuple},
    IResult,
};

#[derive(Debug, Clone, PartialEq)]
pub enum DirectoryMarker<'a> {
    Enter(&'a str),
    Leave,
}

/// Recognize the line as directory change message.
pub fn directory_marker(line: &str) -> Option<DirectoryMarker<'_>> {
    marker(line).ok().map(|(_, marker)| marker)
}

fn marker(input: &str) -> IResult<&str, DirectoryMarker<'_>> {
    let (input, _) = tuple((program, opt(level), tag(": ")))(input)?;
    alt((enter, leave))(input)
}

/// `make`, `gmake`, `mingw32-make` or `/usr/bin/make`
fn program(input: &str) -> IResult<&str, &str> {
    verify(is_not("[: \t"), |name: &str| name.ends_with("make"))(input)
}

/// The recursion level, like `[2]`.
fn level(input: &str) -> IResult<&str, &str> {
    delimited(char('['), digit1, char(']'))(input)
}

fn enter(input: &str) -> IResult<&str, DirectoryMarker<'_>> {
    let (input, _) = tuple((tag("Entering directory"), space1))(input)?;
    let (input, path) = delimited(
        one_of("'`\u{2018}"),
        till_last_quote,
        one_of("'\u{2019}"),
    )(input)?;
    Ok((input, DirectoryMarker::Enter(path)))
}

/// The path may contain quotes itself, only the last one closes it.
fn till_last_quote(input: &str) -> IResult<&str, &str> {
    match input.rfind(['\'', '\u{2019}']) {
        Some(end) if end > 0 =>
            Ok((&input[end..], &input[..end])),
        _ =>
            Err(nom::Err::Error(Error::new(input, ErrorKind::TakeTill1))),
    }
}

// The path of the leave message is not used, it's not parsed.
fn leave(input: &str) -> IResult<&str, DirectoryMarker<'_>> {
    value(DirectoryMarker::Leave, tag("Leaving directory"))(input)
}
