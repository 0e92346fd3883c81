//! Static asset copying.

use std::io;
use std::path::Path;

/// Copy the static assets tree into the build directory.
///
/// A previous copy at `target` is replaced. If `source` turns out not to be
/// a directory the copy falls back to a single-file copy; any other I/O
/// error propagates.
///
/// # Errors
///
/// Returns the underlying I/O error for anything other than the
/// not-a-directory fallback case.
pub fn copy_static(source: &Path, target: &Path) -> io::Result<()> {
    if target.is_dir() {
        std::fs::remove_dir_all(target)?;
    }

    match copy_tree(source, target) {
        Err(e) if e.kind() == io::ErrorKind::NotADirectory => {
            std::fs::copy(source, target)?;
            Ok(())
        }
        other => other,
    }
}

/// Recursively copy a directory tree.
fn copy_tree(source: &Path, target: &Path) -> io::Result<()> {
    let entries = std::fs::read_dir(source)?;
    std::fs::create_dir_all(target)?;
    for entry in entries {
        let entry = entry?;
        let dest = target.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &dest)?;
        } else {
            std::fs::copy(entry.path(), &dest)?;
        }
    }
    Ok(())
}
