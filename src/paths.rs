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

use std::path::{Component, Path, PathBuf};

use path_absolutize::Absolutize;

/// Tells if the path is absolute, either by the host conventions or by
/// starting with any of the separators.
pub fn is_absolute(path: &Path) -> bool {
    path.is_absolute()
        || path.to_str().map_or(false, |text| text.starts_with('/') || text.starts_with('\\'))
}

/// Lexical normalization: redundant separators and `.` components are dropped,
/// `..` components are collapsed where there is something to collapse.
pub fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir =>
                result.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir =>
                match result.components().next_back() {
                    Some(Component::Normal(_)) => {
                        result.pop();
                    }
                    Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                    _ => result.push(".."),
                },
            Component::Normal(name) =>
                result.push(name),
        }
    }
    if result.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        result
    }
}

/// Resolves the directory change target against the current directory.
///
/// Absolute target overrides the current directory. Unknown (empty) current
/// directory leaves the target as it is.
pub fn change_directory(current: &Path, target: &Path) -> PathBuf {
    if is_absolute(target) || current.as_os_str().is_empty() {
        normalize(target)
    } else {
        normalize(&current.join(target))
    }
}

/// Joins the file to the directory it was referenced from.
pub fn join(directory: &Path, file: &Path) -> PathBuf {
    let candidate = if is_absolute(file) {
        file.absolutize()
    } else if directory.is_absolute() {
        file.absolutize_from(directory)
    } else {
        return normalize(&directory.join(file));
    };
    match candidate {
        Ok(path) => path.to_path_buf(),
        Err(error) => {
            log::debug!("failed to absolutize {}: {}", file.display(), error);
            normalize(&directory.join(file))
        }
    }
}

/// Makes the path relative to the base directory.
///
/// Relative paths are returned as they are. Paths outside of the base
/// directory are also returned unchanged.
pub fn relative_to(path: &Path, base: &Path) -> PathBuf {
    if !is_absolute(path) {
        return path.to_path_buf();
    }
    match path.strip_prefix(base) {
        Ok(rest) if rest.as_os_str().is_empty() =>
            PathBuf::from("."),
        Ok(rest) =>
            rest.to_path_buf(),
        Err(_) =>
            path.to_path_buf(),
    }
}

/// Select the base directory for relative paths.
///
/// It's the given directory, or the directory of the output file, or the
/// current working directory. The result is an absolute path.
pub fn relative_base(base: Option<&Path>, output: &Path) -> std::io::Result<PathBuf> {
    let candidate = match base {
        Some(directory) => directory,
        None => match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        },
    };
    Ok(normalize(&candidate.absolutize()?))
}
