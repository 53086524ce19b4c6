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

use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use crate::configuration::{Content, DuplicateFilterFields};
use crate::database::Entry;

impl DuplicateFilterFields {
    fn hash_source(entry: &Entry) -> u64 {
        let mut s = DefaultHasher::default();
        entry.file.hash(&mut s);
        s.finish()
    }

    fn hash_source_and_output(entry: &Entry) -> u64 {
        let mut s = DefaultHasher::default();
        entry.file.hash(&mut s);
        entry.output.hash(&mut s);
        s.finish()
    }

    fn hash_all(entry: &Entry) -> u64 {
        let mut s = DefaultHasher::default();
        entry.file.hash(&mut s);
        entry.directory.hash(&mut s);
        entry.invocation.arguments().hash(&mut s);
        s.finish()
    }

    fn hash(&self) -> fn(&Entry) -> u64 {
        match self {
            DuplicateFilterFields::FileOnly =>
                DuplicateFilterFields::hash_source,
            DuplicateFilterFields::FileAndOutputOnly =>
                DuplicateFilterFields::hash_source_and_output,
            DuplicateFilterFields::All =>
                DuplicateFilterFields::hash_all,
        }
    }
}

pub(crate) type EntryPredicate = Box<dyn FnMut(&Entry) -> bool>;

impl From<DuplicateFilterFields> for EntryPredicate {
    fn from(value: DuplicateFilterFields) -> Self {
        let mut have_seen = HashSet::new();
        let hash_calculation = DuplicateFilterFields::hash(&value);

        Box::new(move |entry: &Entry| {
            let hash = hash_calculation(entry);
            have_seen.insert(hash)
        })
    }
}

/// Creates the predicate which keeps the entries to write.
///
/// The base directory is used to locate the source files of relative entries.
pub(crate) fn entry_predicate(content: &Content, base: Option<&Path>) -> EntryPredicate {
    let mut duplicates: Option<EntryPredicate> = content.duplicate_filter_fields.clone().map(Into::into);
    let only_existing_source = content.include_only_existing_source();
    let base: Option<PathBuf> = base.map(Path::to_path_buf);

    Box::new(move |entry: &Entry| {
        if only_existing_source && !entry.source_location(base.as_deref()).exists() {
            log::debug!("entry dropped, source file does not exist: {:?}", entry);
            return false;
        }
        if let Some(is_new) = duplicates.as_mut() {
            if !is_new(entry) {
                log::debug!("entry dropped as duplicate: {:?}", entry);
                return false;
            }
        }
        true
    })
}
