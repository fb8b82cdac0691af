//! Persistence sink - one CSV file per game

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{HarnessError, Result};
use crate::table::Table;

/// File name for a game id: unsafe characters become `_`, plus `.csv`
pub fn game_file_name(game_id: &str) -> String {
    let stem: String = game_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}.csv", stem)
}

/// Write `table` to `<dir>/<game id>.csv`
///
/// Creates `dir` (recursively) when missing; an existing file for the same
/// id is overwritten.
pub fn save_table(table: &Table, game_id: &str, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|source| HarnessError::Persistence {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(game_file_name(game_id));
    std::fs::write(&path, table.to_csv()).map_err(|source| HarnessError::Persistence {
        path: path.clone(),
        source,
    })?;

    tracing::debug!("Saved {} rows to {}", table.len(), path.display());
    Ok(path)
}

/// [`save_table`], retried once after `backoff` on failure
pub fn save_with_retry(
    table: &Table,
    game_id: &str,
    dir: &Path,
    backoff: Duration,
) -> Result<PathBuf> {
    match save_table(table, game_id, dir) {
        Ok(path) => Ok(path),
        Err(first) => {
            tracing::debug!("Retrying save of {} after error: {}", game_id, first);
            std::thread::sleep(backoff);
            save_table(table, game_id, dir)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;

    fn table(value: i64) -> Table {
        let mut t = Table::new(vec!["TURN".to_string(), "VALUE".to_string()]);
        t.push_row(vec![Cell::Int(0), Cell::Int(value)]);
        t
    }

    #[test]
    fn test_file_name_sanitized() {
        assert_eq!(game_file_name("swift-wolf-0001"), "swift-wolf-0001.csv");
        assert_eq!(game_file_name("../etc/passwd"), ".._etc_passwd.csv");
        assert_eq!(game_file_name("a b"), "a_b.csv");
    }

    #[test]
    fn test_creates_missing_directory() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("nested").join("results");
        assert!(!dir.exists());

        let path = save_table(&table(1), "g1", &dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(path, dir.join("g1.csv"));

        // Second save into the now-existing directory must not fail.
        save_table(&table(2), "g2", &dir).unwrap();
    }

    #[test]
    fn test_overwrites_same_id() {
        let root = tempfile::tempdir().unwrap();
        save_table(&table(1), "g1", root.path()).unwrap();
        save_table(&table(2), "g1", root.path()).unwrap();

        let files: Vec<_> = std::fs::read_dir(root.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
        let content = std::fs::read_to_string(root.path().join("g1.csv")).unwrap();
        assert_eq!(content, table(2).to_csv());
    }

    #[test]
    fn test_unwritable_target_is_persistence_error() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("not-a-dir");
        std::fs::write(&blocker, "x").unwrap();

        let err = save_with_retry(&table(1), "g1", &blocker, Duration::from_millis(1)).unwrap_err();
        assert!(matches!(err, HarnessError::Persistence { .. }));
    }
}
