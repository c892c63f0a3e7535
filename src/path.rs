//! Command lookup through the `PATH` search directories.

use nix::unistd::{AccessFlags, access};
use std::path::{Path, PathBuf};

/// One directory of the search path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathEntry {
    /// An empty `PATH` component (`::`, leading or trailing `:`), meaning the working directory.
    CurrentDir,
    Dir(PathBuf),
}

impl PathEntry {
    fn candidate(&self, command: &str) -> PathBuf {
        match self {
            PathEntry::CurrentDir => Path::new(".").join(command),
            PathEntry::Dir(dir) => dir.join(command),
        }
    }
}

/// Outcome of looking a command up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// An executable regular file at this location.
    Found(PathBuf),
    /// The command names an existing file that cannot be executed.
    NotExecutable(PathBuf),
    NotFound,
}

/// Ordered search directories parsed from `PATH`.
///
/// The list remembers the `PATH` value it was built from and is rebuilt by
/// [`PathList::refresh`] only when that value changes.
#[derive(Debug, Clone, Default)]
pub struct PathList {
    source: Option<String>,
    entries: Vec<PathEntry>,
}

impl PathList {
    /// Parse a `PATH` value.
    ///
    /// When `PATH` is unset or empty the list holds only [`PathEntry::CurrentDir`], so a bare
    /// command name is looked up in the working directory and nowhere else.
    pub fn parse(path: Option<&str>) -> Self {
        let entries = match path {
            None | Some("") => vec![PathEntry::CurrentDir],
            Some(value) => value
                .split(':')
                .map(|dir| {
                    if dir.is_empty() {
                        PathEntry::CurrentDir
                    } else {
                        PathEntry::Dir(PathBuf::from(dir))
                    }
                })
                .collect(),
        };
        Self {
            source: path.map(String::from),
            entries,
        }
    }

    /// Rebuild the list if `path` differs from the value it was parsed from.
    pub fn refresh(&mut self, path: Option<&str>) {
        if self.entries.is_empty() || self.source.as_deref() != path {
            tracing::debug!(?path, "rebuilding search path");
            *self = Self::parse(path);
        }
    }

    pub fn entries(&self) -> &[PathEntry] {
        &self.entries
    }

    /// Resolve a command name the way a typical shell would.
    ///
    /// Behavior:
    /// - A name containing `/` is used as-is: [`Resolution::Found`] if it is an executable
    ///   file, [`Resolution::NotExecutable`] if it exists but is not, otherwise `NotFound`.
    /// - A bare name is joined to each search directory in order; the first executable
    ///   regular file wins.
    /// - Empty name: `NotFound`.
    pub fn resolve(&self, command: &str) -> Resolution {
        if command.is_empty() {
            return Resolution::NotFound;
        }

        if command.contains('/') {
            let path = Path::new(command);
            return if is_executable_file(path) {
                Resolution::Found(path.to_path_buf())
            } else if path.exists() {
                Resolution::NotExecutable(path.to_path_buf())
            } else {
                Resolution::NotFound
            };
        }

        self.entries
            .iter()
            .map(|entry| entry.candidate(command))
            .find(|candidate| is_executable_file(candidate))
            .map_or(Resolution::NotFound, Resolution::Found)
    }
}

fn is_executable_file(path: &Path) -> bool {
    path.is_file() && access(path, AccessFlags::X_OK).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::lock_current_dir;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn make_file(dir: &Path, name: &str, mode: u32) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, "#!/bin/sh\nexit 0\n").expect("write file");
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).expect("chmod");
        path
    }

    fn path_of(dirs: &[&Path]) -> String {
        dirs.iter()
            .map(|d| d.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(":")
    }

    #[test]
    fn test_parse_keeps_order_and_marks_empty_components() {
        let list = PathList::parse(Some(":/usr/bin::/bin:"));
        assert_eq!(
            list.entries(),
            &[
                PathEntry::CurrentDir,
                PathEntry::Dir(PathBuf::from("/usr/bin")),
                PathEntry::CurrentDir,
                PathEntry::Dir(PathBuf::from("/bin")),
                PathEntry::CurrentDir,
            ]
        );
    }

    #[test]
    fn test_parse_unset_or_empty_falls_back_to_current_dir() {
        assert_eq!(PathList::parse(None).entries(), &[PathEntry::CurrentDir]);
        assert_eq!(PathList::parse(Some("")).entries(), &[PathEntry::CurrentDir]);
    }

    #[test]
    fn test_first_directory_in_order_wins() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        make_file(second.path(), "tool", 0o755);
        let expected = make_file(first.path(), "tool", 0o755);

        let list = PathList::parse(Some(&path_of(&[first.path(), second.path()])));
        assert_eq!(list.resolve("tool"), Resolution::Found(expected));
    }

    #[test]
    fn test_non_executable_candidates_are_skipped() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        make_file(first.path(), "tool", 0o644);
        let expected = make_file(second.path(), "tool", 0o755);

        let list = PathList::parse(Some(&path_of(&[first.path(), second.path()])));
        assert_eq!(list.resolve("tool"), Resolution::Found(expected));
    }

    #[test]
    fn test_directories_are_not_commands() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let list = PathList::parse(Some(&path_of(&[dir.path()])));
        assert_eq!(list.resolve("sub"), Resolution::NotFound);
    }

    #[test]
    fn test_missing_command_is_not_found() {
        let dir = TempDir::new().unwrap();
        let list = PathList::parse(Some(&path_of(&[dir.path()])));
        assert_eq!(list.resolve("nonexisting"), Resolution::NotFound);
        assert_eq!(list.resolve(""), Resolution::NotFound);
    }

    #[test]
    fn test_slash_commands_skip_the_search() {
        let dir = TempDir::new().unwrap();
        let exe = make_file(dir.path(), "run", 0o755);
        let plain = make_file(dir.path(), "data", 0o644);
        // PATH deliberately points elsewhere
        let list = PathList::parse(Some("/nonexistent"));

        assert_eq!(
            list.resolve(exe.to_str().unwrap()),
            Resolution::Found(exe.clone())
        );
        assert_eq!(
            list.resolve(plain.to_str().unwrap()),
            Resolution::NotExecutable(plain.clone())
        );
        assert_eq!(
            list.resolve(dir.path().to_str().unwrap()),
            Resolution::NotExecutable(dir.path().to_path_buf())
        );
        let missing = dir.path().join("missing");
        assert_eq!(list.resolve(missing.to_str().unwrap()), Resolution::NotFound);
    }

    #[test]
    fn test_unset_path_searches_only_current_dir() {
        let _lock = lock_current_dir();
        let dir = TempDir::new().unwrap();
        make_file(dir.path(), "localtool", 0o755);
        let orig = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir.path()).unwrap();

        let list = PathList::parse(None);
        let local = list.resolve("localtool");
        // `sh` lives in /bin, which is not searched without PATH
        let system = list.resolve("sh");

        std::env::set_current_dir(orig).unwrap();
        assert_eq!(local, Resolution::Found(PathBuf::from("./localtool")));
        assert_eq!(system, Resolution::NotFound);
    }

    #[test]
    fn test_refresh_rebuilds_only_on_change() {
        let mut list = PathList::default();
        list.refresh(Some("/a:/b"));
        assert_eq!(list.entries().len(), 2);
        list.refresh(Some("/a:/b"));
        assert_eq!(list.entries().len(), 2);
        list.refresh(Some("/c"));
        assert_eq!(list.entries(), &[PathEntry::Dir(PathBuf::from("/c"))]);
        list.refresh(None);
        assert_eq!(list.entries(), &[PathEntry::CurrentDir]);
    }
}
