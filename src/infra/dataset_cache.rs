// ============================================================
// Layer 6 — Dataset Cache
// ============================================================
// Binary mirror of a parsed text table, stored next to the
// source with a `.bin` suffix:
//
//   data/preflop_features       ← text source
//   data/preflop_features.bin   ← cache
//
// Layout (little endian):
//   [4]  magic "PNT1"
//   [8]  row count   (u64)
//   [8]  row width   (u64)
//   [4 × rows × width] values (f32)
//
// A cache is only trusted when it was modified no earlier than
// its source, so editing the text file forces a re-parse.
// Writes go to `<cache>.tmp` and are renamed into place.

use std::{
    ffi::OsString,
    fs::{self, File},
    io::{BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::data::dataset::Table;
use crate::error::{PipelineError, Result};

const MAGIC: &[u8; 4] = b"PNT1";
const SUFFIX: &str = ".bin";
const HEADER_LEN: u64 = 4 + 8 + 8;

pub struct DatasetCache {
    source: PathBuf,
    path:   PathBuf,
}

impl DatasetCache {
    pub fn for_source(source: &Path) -> Self {
        let mut name = OsString::from(source.as_os_str());
        name.push(SUFFIX);
        Self {
            source: source.to_path_buf(),
            path:   PathBuf::from(name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when the cache exists and is not older than its source.
    /// A cache whose source has disappeared is still usable.
    pub fn is_fresh(&self) -> bool {
        let Ok(cached) = fs::metadata(&self.path).and_then(|m| m.modified()) else {
            return false;
        };
        match fs::metadata(&self.source).and_then(|m| m.modified()) {
            Ok(source) => cached >= source,
            Err(_)     => true,
        }
    }

    pub fn read(&self) -> Result<Table> {
        let file     = File::open(&self.path)?;
        let file_len = file.metadata()?.len();
        let mut r    = BufReader::new(file);

        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(self.corrupt("not a dataset cache file".to_string()));
        }

        let rows  = r.read_u64::<LittleEndian>()?;
        let width = r.read_u64::<LittleEndian>()?;
        let body  = rows
            .checked_mul(width)
            .and_then(|n| n.checked_mul(4))
            .and_then(|n| n.checked_add(HEADER_LEN));
        if body != Some(file_len) {
            return Err(self.corrupt(format!(
                "header claims {rows} rows of width {width} but the file is {file_len} bytes"
            )));
        }

        let mut values = vec![0f32; (rows * width) as usize];
        r.read_f32_into::<LittleEndian>(&mut values)?;

        Table::new(width as usize, values)
    }

    pub fn write(&self, table: &Table) -> Result<()> {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let written = Self::write_to(&tmp, table)
            .and_then(|()| fs::rename(&tmp, &self.path).map_err(PipelineError::from));
        if written.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        written?;

        tracing::debug!("Wrote dataset cache '{}'", self.path.display());
        Ok(())
    }

    fn write_to(path: &Path, table: &Table) -> Result<()> {
        let mut w = BufWriter::new(File::create(path)?);
        w.write_all(MAGIC)?;
        w.write_u64::<LittleEndian>(table.rows() as u64)?;
        w.write_u64::<LittleEndian>(table.width() as u64)?;
        for &v in table.values() {
            w.write_f32::<LittleEndian>(v)?;
        }
        w.into_inner().map_err(|e| e.into_error())?.sync_all()?;
        Ok(())
    }

    fn corrupt(&self, reason: String) -> PipelineError {
        PipelineError::Format { path: self.path.clone(), line: 0, reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_table;
    use std::time::{Duration, SystemTime};

    #[test]
    fn test_cache_path_appends_suffix() {
        let cache = DatasetCache::for_source(Path::new("data/flop.txt"));
        assert_eq!(cache.path(), Path::new("data/flop.txt.bin"));
    }

    #[test]
    fn test_write_then_read() {
        let dir    = tempfile::tempdir().unwrap();
        let source = dir.path().join("labels");
        let table  = Table::new(2, vec![0.0, 1.0, 1.0, 0.0, 0.5, 0.5]).unwrap();

        let cache = DatasetCache::for_source(&source);
        cache.write(&table).unwrap();
        assert_eq!(cache.read().unwrap(), table);
    }

    #[test]
    fn test_missing_cache_is_not_fresh() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!DatasetCache::for_source(&dir.path().join("nothing")).is_fresh());
    }

    #[test]
    fn test_corrupt_magic_rejected() {
        let dir    = tempfile::tempdir().unwrap();
        let source = dir.path().join("features");
        let cache  = DatasetCache::for_source(&source);
        fs::write(cache.path(), b"JUNKJUNKJUNK").unwrap();
        assert!(matches!(cache.read(), Err(PipelineError::Format { .. })));
    }

    #[test]
    fn test_stale_cache_is_reparsed() {
        let dir    = tempfile::tempdir().unwrap();
        let source = dir.path().join("features");
        fs::write(&source, "1 2\n").unwrap();
        load_table(&source, true).unwrap();

        let cache      = DatasetCache::for_source(&source);
        let cache_time = fs::metadata(cache.path()).unwrap().modified().unwrap();

        // Edit the source and make sure it is visibly newer than the cache.
        fs::write(&source, "3 4\n5 6\n").unwrap();
        let newer = cache_time.max(SystemTime::now()) + Duration::from_secs(10);
        File::options().write(true).open(&source).unwrap().set_modified(newer).unwrap();

        assert!(!cache.is_fresh());
        let reloaded = load_table(&source, true).unwrap();
        assert_eq!(reloaded.rows(), 2);
        assert_eq!(reloaded.row(1), &[5.0, 6.0]);
    }

    #[test]
    fn test_write_leaves_no_temp_file() {
        let dir    = tempfile::tempdir().unwrap();
        let source = dir.path().join("labels");
        let cache  = DatasetCache::for_source(&source);
        cache.write(&Table::new(1, vec![1.0, 2.0]).unwrap()).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path()).unwrap().map(|e| e.unwrap().file_name()).collect();
        assert_eq!(names, vec![OsString::from("labels.bin")]);
    }

    #[test]
    fn test_truncated_cache_rejected() {
        let dir    = tempfile::tempdir().unwrap();
        let source = dir.path().join("features");
        let cache  = DatasetCache::for_source(&source);
        cache.write(&Table::new(2, vec![1.0, 2.0, 3.0, 4.0]).unwrap()).unwrap();

        let len = fs::metadata(cache.path()).unwrap().len();
        File::options().write(true).open(cache.path()).unwrap().set_len(len - 6).unwrap();
        assert!(matches!(cache.read(), Err(PipelineError::Format { .. })));
    }

    #[test]
    fn test_oversized_header_rejected() {
        let dir   = tempfile::tempdir().unwrap();
        let cache = DatasetCache::for_source(&dir.path().join("features"));

        let mut bytes = MAGIC.to_vec();
        bytes.extend(u64::MAX.to_le_bytes());
        bytes.extend(2u64.to_le_bytes());
        bytes.extend(1.0f32.to_le_bytes());
        fs::write(cache.path(), bytes).unwrap();

        assert!(matches!(cache.read(), Err(PipelineError::Format { .. })));
    }

    #[test]
    fn test_truncated_cache_falls_back_to_source() {
        let dir    = tempfile::tempdir().unwrap();
        let source = dir.path().join("features");
        fs::write(&source, "1 2\n3 4\n").unwrap();
        load_table(&source, true).unwrap();

        let cache = DatasetCache::for_source(&source);
        let len   = fs::metadata(cache.path()).unwrap().len();
        File::options().write(true).open(cache.path()).unwrap().set_len(len - 6).unwrap();
        assert!(cache.is_fresh());

        let table = load_table(&source, true).unwrap();
        assert_eq!(table.rows(), 2);
        assert_eq!(table.row(1), &[3.0, 4.0]);
        assert_eq!(cache.read().unwrap(), table);
    }
}
