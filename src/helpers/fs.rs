//! File system helpers

use std::io::{self, Write};
use std::path::Path;

/// Replace `path` with `contents` in one step.
///
/// The data goes to a hidden temp file in `dir` first and is then renamed over
/// the target, so readers see either the old file or the new one.
pub fn write_atomic(dir: &Path, path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut tmp = tempfile::Builder::new()
        .prefix(".tmp-")
        .suffix(".part")
        .tempfile_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
