//! In-memory tabular data with CSV load and save.
//!
//! The whole catalogue fits in memory and is rewritten wholesale on every
//! save; there is no partial-row persistence. Cells are plain strings and
//! rows are padded to the header width on load so positional access is
//! always in bounds.

use std::io::{Read, Write};
use std::path::Path;

use crate::domain::PipelineError;

#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Startup check for mandatory columns. A missing column is fatal,
    /// not a row-level error.
    pub fn require_columns(&self, names: &[&str]) -> Result<(), PipelineError> {
        for name in names {
            if self.column_index(name).is_none() {
                return Err(PipelineError::MissingColumn((*name).to_string()));
            }
        }
        Ok(())
    }

    /// Index of `name`, appending an empty column when absent.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.headers.push(name.to_string());
        for row in &mut self.rows {
            row.push(String::new());
        }
        self.headers.len() - 1
    }

    pub fn get(&self, row: usize, col: usize) -> &str {
        &self.rows[row][col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: String) {
        self.rows[row][col] = value;
    }

    /// Append a row, padding or truncating to the header width.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(|r| r.as_slice())
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .map_err(|e| PipelineError::Io(format!("Cannot open '{}': {}", path.display(), e)))?;
        Self::from_csv_reader(file)
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, PipelineError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()
            .map_err(|e| PipelineError::Csv(format!("Cannot read header row: {}", e)))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut table = Table::new(headers);

        for result in rdr.records() {
            let record = result.map_err(|e| PipelineError::Csv(format!("CSV parse error: {}", e)))?;
            table.push_row(record.iter().map(|v| v.to_string()).collect());
        }

        Ok(table)
    }

    /// Full rewrite: header first, then every row. Checkpoint saves go
    /// through here too, so intermediate output is always a complete file.
    pub fn write_csv_path<P: AsRef<Path>>(&self, path: P) -> Result<(), PipelineError> {
        let path = path.as_ref();
        let file = std::fs::File::create(path)
            .map_err(|e| PipelineError::Io(format!("Cannot create '{}': {}", path.display(), e)))?;
        self.write_csv(file)
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), PipelineError> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}
