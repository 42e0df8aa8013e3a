//! Temporary directories and reference-data files for tests.

use std::fs;
use std::path::{Path, PathBuf};

/// Creates a temporary directory for test output.
///
/// The directory is automatically cleaned up when the returned `TempDir` is dropped.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary test directory")
}

/// Writes a comma separated matrix to `dir/name` and returns its path.
///
/// Parent directories are created as needed.
pub fn write_csv_matrix<T: ToString>(dir: &Path, name: &str, rows: &[Vec<T>]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create test data directory");
    }
    let body: Vec<String> = rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect();
    fs::write(&path, body.join("\n") + "\n").expect("Failed to write test CSV");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_csv_matrix() {
        let dir = temp_test_dir();
        let path = write_csv_matrix(dir.path(), "sub/m.csv", &[vec![1, 0], vec![0, 1]]);
        assert_eq!(fs::read_to_string(path).unwrap(), "1,0\n0,1\n");
    }
}
