// ============================================================
// Layer 4 — Dataset Loader
// ============================================================
// Reads one numeric table from a plain-text file:
//
//   0.25 1 0 0.5 ...      ← one row per line
//   0.75 0 1 0.0 ...      ← fields separated by whitespace
//
// Every row in a file must have the same number of fields.
// Rows keep the order they appear in; nothing is shuffled or
// normalised. Blank lines (e.g. a trailing newline) are skipped.
//
// The first successful parse is mirrored to a binary cache
// next to the source file (see infra::dataset_cache) so the
// next run can skip the text parse entirely.

use std::{fs, path::Path};

use crate::data::dataset::Table;
use crate::error::{PipelineError, Result};
use crate::infra::dataset_cache::DatasetCache;

/// Load a table, preferring a fresh binary cache when `use_cache` is set.
pub fn load_table(path: &Path, use_cache: bool) -> Result<Table> {
    if !use_cache {
        return parse_table(path);
    }

    let cache = DatasetCache::for_source(path);
    if cache.is_fresh() {
        tracing::debug!("Reading cached table '{}'", cache.path().display());
        match cache.read() {
            Ok(table) => return Ok(table),
            Err(e) => tracing::warn!(
                "Unreadable cache '{}', re-parsing source: {}",
                cache.path().display(),
                e
            ),
        }
    }

    let table = parse_table(path)?;

    if let Err(e) = cache.write(&table) {
        tracing::warn!("Could not write cache '{}': {}", cache.path().display(), e);
    }
    Ok(table)
}

/// Parse a whitespace-separated text table.
pub fn parse_table(path: &Path) -> Result<Table> {
    let text = fs::read_to_string(path)?;

    let mut width: Option<usize> = None;
    let mut values = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let before = values.len();
        for (field_no, field) in line.split_whitespace().enumerate() {
            let value: f32 = field.parse().map_err(|_| PipelineError::Format {
                path:   path.to_path_buf(),
                line:   line_no,
                reason: format!("field {} ('{}') is not a number", field_no + 1, field),
            })?;
            values.push(value);
        }

        let fields = values.len() - before;
        match width {
            None => width = Some(fields),
            Some(w) if w != fields => {
                return Err(PipelineError::Format {
                    path:   path.to_path_buf(),
                    line:   line_no,
                    reason: format!("expected {w} fields, found {fields}"),
                });
            }
            Some(_) => {}
        }
    }

    let width = width.ok_or_else(|| PipelineError::Format {
        path:   path.to_path_buf(),
        line:   0,
        reason: "file contains no rows".to_string(),
    })?;

    let table = Table::new(width, values)?;
    tracing::debug!(
        "Parsed '{}': {} rows x {} fields",
        path.display(),
        table.rows(),
        table.width()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_parse_keeps_row_order() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("features");
        fs::write(&path, "1 2 3\n4 5 6\n-0.5 1e-3 7\n").unwrap();

        let t = parse_table(&path).unwrap();
        assert_eq!(t.rows(), 3);
        assert_eq!(t.width(), 3);
        assert_eq!(t.row(2), &[-0.5, 1e-3, 7.0]);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels");
        fs::write(&path, "0 1\n\n1 0\n\n").unwrap();
        assert_eq!(parse_table(&path).unwrap().rows(), 2);
    }

    #[test]
    fn test_non_numeric_field_is_format_error() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad");
        fs::write(&path, "1 2\n3 x\n").unwrap();

        match parse_table(&path) {
            Err(PipelineError::Format { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected format error, got {other:?}"),
        }
    }

    #[test]
    fn test_inconsistent_width_is_format_error() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("ragged");
        fs::write(&path, "1 2 3\n4 5\n").unwrap();
        assert!(matches!(parse_table(&path), Err(PipelineError::Format { line: 2, .. })));
    }

    #[test]
    fn test_empty_file_is_format_error() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty");
        fs::write(&path, "\n").unwrap();
        assert!(matches!(parse_table(&path), Err(PipelineError::Format { .. })));
    }

    #[test]
    fn test_cached_reload_is_bit_identical() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("features");
        fs::write(&path, "0.1 0.2 0.3\n1e-7 -2.5 3.4028235e38\n").unwrap();

        let direct = parse_table(&path).unwrap();
        let first  = load_table(&path, true).unwrap();
        assert!(DatasetCache::for_source(&path).path().exists());

        let cached = load_table(&path, true).unwrap();
        let bits   = |t: &Table| t.values().iter().map(|v| v.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&direct), bits(&first));
        assert_eq!(bits(&direct), bits(&cached));
        assert_eq!(cached.width(), 3);
    }

    #[test]
    fn test_disabled_cache_writes_nothing() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("features");
        fs::write(&path, "1 2\n").unwrap();
        load_table(&path, false).unwrap();
        assert!(!DatasetCache::for_source(&path).path().exists());
    }
}
