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

//! Word splitting and quoting of shell command lines.
//!
//! This is not a shell parser. It knows about quotes and backslash escapes,
//! which is enough to recover the compiler arguments from a build log.

/// Splits the command line into words.
///
/// Single and double quotes group text (the quote characters are removed),
/// a backslash takes the next character literally. An unterminated quote
/// keeps the text collected so far.
pub fn split(line: &str) -> Vec<String> {
    let mut words = vec![];
    let mut current = String::new();
    let mut started = false;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in line.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match (quote, c) {
            (_, '\\') => {
                escaped = true;
                started = true;
            }
            (None, '\'' | '"') => {
                quote = Some(c);
                started = true;
            }
            (Some(open), _) if open == c =>
                quote = None,
            (None, _) if c.is_whitespace() => {
                if started {
                    words.push(std::mem::take(&mut current));
                    started = false;
                }
            }
            _ => {
                current.push(c);
                started = true;
            }
        }
    }
    if started {
        words.push(current);
    }
    words
}

/// Quotes a single word, so `split` would return it unchanged.
pub fn quote(word: &str) -> String {
    let safe = !word.is_empty() && word.chars().all(|c| c.is_ascii_alphanumeric() || "_@%+=:,./-".contains(c));
    if safe {
        return word.to_string();
    }
    let mut result = String::with_capacity(word.len() + 2);
    result.push('"');
    for c in word.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            result.push('\\');
        }
        result.push(c);
    }
    result.push('"');
    result
}

/// Joins the words into a single command line.
pub fn join<S: AsRef<str>>(words: &[S]) -> String {
    words.iter()
        .map(|word| quote(word.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}
