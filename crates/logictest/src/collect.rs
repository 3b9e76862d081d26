//! Collection of test files from the paths given on the command line.

use std::path::{Path, PathBuf};

use crate::error_handling::TestError;

/// Expands `paths` into the test files to run, in a stable order.
///
/// Directories are walked recursively for files ending in `extension`. Paths holding glob
/// characters are expanded as patterns. Any other path is taken as a test file as is.
pub fn collect_test_files(
    paths: &[impl AsRef<Path>],
    extension: &str,
) -> Result<Vec<PathBuf>, TestError> {
    let mut files = vec![];
    for path in paths {
        let path = path.as_ref();
        if path.is_dir() {
            // the directory name is matched literally
            let dir = glob::Pattern::escape(&path.to_string_lossy());
            let pattern = Path::new(&dir).join("**").join(format!("*{extension}"));
            let mut found = expand_pattern(&pattern.to_string_lossy())?;
            found.retain(|f| f.is_file());
            found.sort();
            tracing::debug!(dir = %path.display(), count = found.len(), "collected test files");
            files.extend(found);
        } else if is_pattern(path) {
            files.extend(expand_pattern(&path.to_string_lossy())?);
        } else {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

fn is_pattern(path: &Path) -> bool {
    path.to_string_lossy().contains(['*', '?', '['])
}

fn expand_pattern(pattern: &str) -> Result<Vec<PathBuf>, TestError> {
    glob::glob(pattern)
        .map_err(|e| TestError::Pattern(format!("{pattern}: {e}")))?
        .map(|entry| entry.map_err(|e| TestError::Io(e.into_error())))
        .collect()
}
