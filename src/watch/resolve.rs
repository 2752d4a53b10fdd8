// src/watch/resolve.rs

//! Turning a requested watch list into the canonical set of files to hash.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::fs::FileSystem;

/// Resolve `files` into a duplicate-free list of canonical absolute paths.
///
/// Entries that cannot be canonicalized (missing, permission denied, ...)
/// or that resolve to a directory are skipped; one bad entry never keeps
/// the rest from being watched. Output keeps first-seen order, but callers
/// should treat it as a set.
pub fn resolve_paths<I, P>(fs: &dyn FileSystem, files: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut seen = HashSet::new();
    let mut resolved = Vec::new();

    for file in files {
        let file = file.as_ref();

        let canonical = match fs.canonicalize(file) {
            Ok(p) => p,
            Err(err) => {
                trace!(path = ?file, error = %err, "skipping unresolvable watch entry");
                continue;
            }
        };

        if fs.is_dir(&canonical) {
            trace!(path = ?canonical, "skipping directory in watch list");
            continue;
        }

        if seen.insert(canonical.clone()) {
            resolved.push(canonical);
        }
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn drops_missing_dirs_and_duplicates() {
        let fs = MockFileSystem::new();
        fs.add_file("a.txt", b"a");
        fs.add_file("sub/b.txt", b"b");
        fs.add_dir("sub/nested");

        let resolved = resolve_paths(
            &fs,
            [
                "a.txt",
                "./a.txt",
                "/work/a.txt",
                "missing.txt",
                "sub",
                "sub/nested",
                "sub/../sub/b.txt",
            ],
        );

        assert_eq!(
            resolved,
            vec![PathBuf::from("/work/a.txt"), PathBuf::from("/work/sub/b.txt")]
        );
    }

    #[test]
    fn empty_input_resolves_to_empty_set() {
        let fs = MockFileSystem::new();
        let resolved = resolve_paths(&fs, Vec::<String>::new());
        assert!(resolved.is_empty());
    }

    #[test]
    fn unreadable_files_are_still_watched() {
        let fs = MockFileSystem::new();
        fs.add_unreadable("locked.txt");

        let resolved = resolve_paths(&fs, ["locked.txt"]);
        assert_eq!(resolved, vec![PathBuf::from("/work/locked.txt")]);
    }
}
