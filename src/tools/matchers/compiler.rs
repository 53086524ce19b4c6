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

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

/// Returns the last path component, accepting both separator styles.
pub fn executable_name(word: &str) -> &str {
    word.rsplit(['/', '\\']).next().unwrap_or(word)
}

/// Tells if the word names one of the well known C/C++ compiler drivers.
///
/// Cross compilers are matched by their target triple prefix
/// (`arm-none-eabi-gcc`), distribution builds by their suffix (`clang-17`,
/// `gcc-mp-12`, `x86_64-w64-mingw32-gcc-posix`). The driver family also ships
/// tools which are not compilers (`gcc-ar`, `clang-tidy`), those are rejected.
pub fn looks_like_a_compiler(word: &str) -> bool {
    let name = executable_name(word);
    let name = name.strip_suffix(".exe").unwrap_or(name);
    match COMPILER.captures(name) {
        Some(captures) => {
            let tool = captures.name("suffix")
                .and_then(|suffix| suffix.as_str().split('-').nth(1));
            !tool.map_or(false, |tool| NOT_COMPILERS.contains(tool))
        }
        None => false,
    }
}

lazy_static! {
    static ref COMPILER: Regex = Regex::new(
        r"^(?:[A-Za-z0-9_.+]+-)*(?:gcc|g\+\+|clang|clang\+\+|cc|c\+\+)(?P<suffix>(?:-[A-Za-z0-9_+]+(?:\.\d+)*)*)$"
    ).unwrap();

    static ref NOT_COMPILERS: HashSet<&'static str> = {
        let mut set = HashSet::new();

        // binutils wrappers
        set.insert("ar");
        set.insert("nm");
        set.insert("ranlib");
        // clang tools
        set.insert("tidy");
        set.insert("format");
        set.insert("check");
        set.insert("query");
        set.insert("apply");
        set.insert("scan");
        set.insert("doc");
        set.insert("rename");
        set.insert("refactor");
        set.insert("include");
        set.insert("extdef");
        set.insert("offload");
        set.insert("linker");
        set.insert("repl");
        // preprocessor only
        set.insert("cpp");

        set.shrink_to_fit();
        set
    };
}
