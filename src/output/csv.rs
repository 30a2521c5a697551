//! CSV export of stored tables

use csv::Writer;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

use super::{OutputError, OutputResult, OutputWriter, TableWriter};
use crate::store::Store;

const DEFAULT_BUFFER_SIZE: usize = 8192; // 8KB buffer

/// CSV writer over any byte sink
pub struct CsvTableWriter<W: Write> {
    writer: Writer<W>,
    rows_written: u64,
}

impl CsvTableWriter<BufWriter<File>> {
    /// Create a buffered writer for a file, creating parent directories
    pub fn create<P: AsRef<Path>>(path: P) -> OutputResult<Self> {
        let path = path.as_ref();
        info!("Creating CSV writer: path={}", path.display());

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| OutputError::IoError(format!("Failed to create directory: {e}")))?;
        }

        let file = File::create(path)
            .map_err(|e| OutputError::IoError(format!("Failed to create file: {e}")))?;

        Ok(Self::from_writer(BufWriter::with_capacity(
            DEFAULT_BUFFER_SIZE,
            file,
        )))
    }
}

impl<W: Write> CsvTableWriter<W> {
    /// Wrap an existing sink
    pub fn from_writer(inner: W) -> Self {
        Self {
            writer: Writer::from_writer(inner),
            rows_written: 0,
        }
    }

    /// Data rows written so far (header excluded)
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Flush and return the sink
    pub fn into_inner(self) -> OutputResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| OutputError::FlushError(format!("Failed to finalize CSV: {e}")))
    }
}

impl<W: Write> OutputWriter for CsvTableWriter<W> {
    fn flush(&mut self) -> OutputResult<()> {
        self.writer
            .flush()
            .map_err(|e| OutputError::FlushError(format!("Failed to flush: {e}")))
    }

    fn close(mut self) -> OutputResult<()> {
        self.flush()?;
        debug!("CSV writer closed: {} rows written", self.rows_written);
        Ok(())
    }
}

impl<W: Write> TableWriter for CsvTableWriter<W> {
    fn write_header(&mut self, columns: &[String]) -> OutputResult<()> {
        self.writer
            .write_record(columns)
            .map_err(|e| OutputError::CsvError(format!("Failed to write header: {e}")))
    }

    fn write_row(&mut self, cells: &[String]) -> OutputResult<()> {
        self.writer
            .write_record(cells)
            .map_err(|e| OutputError::CsvError(format!("Failed to write row: {e}")))?;
        self.rows_written += 1;
        Ok(())
    }
}

/// Write a stored table to a CSV file and return the number of data rows.
///
/// # Errors
/// `StoreError` for unknown tables; IO or CSV errors while writing.
pub fn export_table(
    store: &Store,
    table: &str,
    path: impl AsRef<Path>,
    limit: Option<usize>,
) -> OutputResult<u64> {
    let rows = store.select_rows(table, limit)?;

    let mut writer = CsvTableWriter::create(path.as_ref())?;
    writer.write_header(&rows.columns)?;
    writer.write_rows(rows.rendered())?;
    let written = writer.rows_written();
    writer.close()?;

    info!(
        table = table,
        rows = written,
        "Exported table to {}",
        path.as_ref().display()
    );
    Ok(written)
}
