//! Chunked reading of delimited sample files.
//!
//! Sample files are read in bounded batches so a whole file is never held in
//! memory. A batch exposes its rows through named columns; a cell that is
//! empty or whitespace-only reads as null.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use csv::StringRecord;
use tracing::debug;

/// Default maximum number of rows per batch.
pub const DEFAULT_BATCH_SIZE: usize = 800_000;

// Base columns of the event schema.
pub const FIELD_TYPOLOGY: &str = "name";
pub const FIELD_SOURCE: &str = "devicevendor";
pub const FIELD_FIABILITY: &str = "flexnumber1";
pub const FIELD_SEVERITY: &str = "deviceseverity";

/// Lists the `.csv` sample files in the input directory, sorted by name.
/// An empty input directory is fatal.
pub fn list_sample_files(input_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(input_dir)
        .with_context(|| format!("input directory {} can not be opened", input_dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) == Some("csv") {
            files.push(path);
        }
    }
    files.sort();

    if files.is_empty() {
        bail!("no input files found in {}", input_dir.display());
    }
    Ok(files)
}

/// One bounded chunk of rows from a sample file.
#[derive(Debug)]
pub struct RecordBatch {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<StringRecord>,
}

impl RecordBatch {
    /// Builds a batch from already-materialized rows. Cells line up with
    /// `columns` positionally; empty strings read as null.
    pub fn new(columns: Vec<String>, rows: Vec<StringRecord>) -> Self {
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        RecordBatch {
            columns,
            index,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// The cell at (row, column index), or `None` when the cell is absent,
    /// empty, or whitespace-only.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        let raw = self.rows[row].get(col)?;
        let trimmed = raw.trim();
        if trimmed.is_empty() { None } else { Some(trimmed) }
    }
}

/// Reads one sample file in batches of at most `batch_size` rows.
pub struct BatchReader {
    reader: csv::Reader<File>,
    columns: Vec<String>,
    index: HashMap<String, usize>,
    batch_size: usize,
    path: PathBuf,
}

impl BatchReader {
    pub fn open(path: &Path, separator: u8, batch_size: usize) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(separator)
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("data sample file {} can not be opened", path.display()))?;

        let headers = reader
            .headers()
            .with_context(|| format!("data sample file {} can not be opened", path.display()))?;
        let columns: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();

        debug!(file = %path.display(), columns = columns.len(), "Sample file opened");

        Ok(BatchReader {
            reader,
            columns,
            index,
            batch_size,
            path: path.to_path_buf(),
        })
    }

    /// Returns the next batch, or `None` once the file is exhausted.
    pub fn next_batch(&mut self) -> Result<Option<RecordBatch>> {
        let mut rows = Vec::new();
        let mut record = StringRecord::new();

        while rows.len() < self.batch_size {
            let more = self
                .reader
                .read_record(&mut record)
                .with_context(|| format!("data sample file {} can not be read", self.path.display()))?;
            if !more {
                break;
            }
            rows.push(record.clone());
        }

        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(RecordBatch {
            columns: self.columns.clone(),
            index: self.index.clone(),
            rows,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    fn temp_csv(name: &str, content: &str) -> PathBuf {
        let path = env::temp_dir().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_batches_are_bounded() {
        let path = temp_csv(
            "source_quality_rater_reader_bounds.csv",
            "a,b\n1,2\n3,4\n5,6\n7,8\n9,10\n",
        );
        let mut reader = BatchReader::open(&path, b',', 2).unwrap();

        let mut sizes = Vec::new();
        while let Some(batch) = reader.next_batch().unwrap() {
            sizes.push(batch.len());
        }
        assert_eq!(sizes, vec![2, 2, 1]);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_empty_and_whitespace_cells_are_null() {
        let path = temp_csv(
            "source_quality_rater_reader_nulls.csv",
            "a,b,c\nx,,  \n",
        );
        let mut reader = BatchReader::open(&path, b',', 10).unwrap();
        let batch = reader.next_batch().unwrap().unwrap();

        assert_eq!(batch.cell(0, batch.column_index("a").unwrap()), Some("x"));
        assert_eq!(batch.cell(0, batch.column_index("b").unwrap()), None);
        assert_eq!(batch.cell(0, batch.column_index("c").unwrap()), None);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_custom_separator() {
        let path = temp_csv(
            "source_quality_rater_reader_sep.csv",
            "a;b\n1;2\n",
        );
        let mut reader = BatchReader::open(&path, b';', 10).unwrap();
        let batch = reader.next_batch().unwrap().unwrap();

        assert_eq!(batch.columns(), &["a".to_string(), "b".to_string()]);
        assert_eq!(batch.cell(0, 1), Some("2"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_short_rows_read_as_null() {
        let path = temp_csv(
            "source_quality_rater_reader_short.csv",
            "a,b,c\n1,2\n",
        );
        let mut reader = BatchReader::open(&path, b',', 10).unwrap();
        let batch = reader.next_batch().unwrap().unwrap();

        assert_eq!(batch.cell(0, 2), None);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_list_sample_files_empty_dir_is_error() {
        let dir = env::temp_dir().join("source_quality_rater_reader_empty");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();

        assert!(list_sample_files(&dir).is_err());

        fs::remove_dir_all(&dir).unwrap();
    }
}
