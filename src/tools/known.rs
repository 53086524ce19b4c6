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

use crate::tools::matchers::compiler::looks_like_a_compiler;
use crate::tools::Tool;

/// Recognizes the GCC and Clang compiler drivers by their name.
pub(crate) struct KnownCompilers;

impl Tool for KnownCompilers {
    fn is_compiler(&self, word: &str) -> bool {
        looks_like_a_compiler(word)
    }
}
