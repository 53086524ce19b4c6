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

/// Tells if the argument names a file which the compiler would translate.
///
/// Only the extension is checked, case-insensitive.
pub fn looks_like_a_source_file(argument: &str) -> bool {
    // unix flags
    if argument.starts_with('-') {
        return false;
    }
    let file_name = argument.rsplit(['/', '\\']).next().unwrap_or(argument);
    match file_name.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() =>
            EXTENSIONS.contains(extension.to_ascii_lowercase().as_str()),
        _ => false,
    }
}

lazy_static! {
    static ref EXTENSIONS: HashSet<&'static str> = {
        let mut set = HashSet::new();

        // C
        set.insert("c");
        // C++
        set.insert("cc");
        set.insert("c++");
        set.insert("cxx");
        set.insert("cpp");
        // Assembly
        set.insert("s");
        set.insert("asm");

        set.shrink_to_fit();
        set
    };
}

#[cfg(test)]
mod test {
    use crate::tools::matchers::source::looks_like_a_source_file;

    #[test]
    fn test_filenames() {
        assert!(looks_like_a_source_file("source.c"));
        assert!(looks_like_a_source_file("source.cpp"));
        assert!(looks_like_a_source_file("source.cxx"));
        assert!(looks_like_a_source_file("source.cc"));
        assert!(looks_like_a_source_file("source.c++"));
        assert!(looks_like_a_source_file("startup.s"));
        assert!(looks_like_a_source_file("startup.S"));
        assert!(looks_like_a_source_file("vectors.asm"));
        assert!(looks_like_a_source_file("MAIN.C"));
        assert!(looks_like_a_source_file("src/utils/helper.c"));
        assert!(looks_like_a_source_file("..\\src\\win.cpp"));

        assert!(!looks_like_a_source_file("source.h"));
        assert!(!looks_like_a_source_file("main.o"));
        assert!(!looks_like_a_source_file("gcc"));
        assert!(!looks_like_a_source_file("clang"));
        assert!(!looks_like_a_source_file("-o"));
        assert!(!looks_like_a_source_file("-Wall"));
        assert!(!looks_like_a_source_file(".c"));
        assert!(!looks_like_a_source_file("dir.c/"));
    }
}
