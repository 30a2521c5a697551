//! Export writers for stored tables

pub mod csv;

/// Output writer errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// CSV write error
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Source table could not be read
    #[error("store error: {0}")]
    StoreError(#[from] crate::store::StoreError),

    /// Buffer flush error
    #[error("flush error: {0}")]
    FlushError(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Generic output writer
pub trait OutputWriter {
    /// Flush any buffered data to disk
    fn flush(&mut self) -> OutputResult<()>;

    /// Close the writer and finalize output
    fn close(self) -> OutputResult<()>;
}

/// Writer for rows of string cells under a fixed header
pub trait TableWriter: OutputWriter {
    /// Write the header row
    fn write_header(&mut self, columns: &[String]) -> OutputResult<()>;

    /// Write one data row
    fn write_row(&mut self, cells: &[String]) -> OutputResult<()>;

    /// Write multiple rows at once
    fn write_rows<I>(&mut self, rows: I) -> OutputResult<()>
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        for row in rows {
            self.write_row(&row)?;
        }
        Ok(())
    }
}
