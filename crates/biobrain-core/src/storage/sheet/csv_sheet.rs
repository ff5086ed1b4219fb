use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{SheetConnection, SheetTable};
use crate::storage::error::{StoreError, StoreResult};

/// Worksheets stored as CSV files, one per worksheet, under a directory.
///
/// Updates rewrite the whole file through a temporary file and a rename, so a
/// reader never sees a half-written sheet. Two writers still overwrite each
/// other.
pub struct CsvSheetConnection {
    dir: PathBuf,
}

impl CsvSheetConnection {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File backing `worksheet`. Names that could leave the sheet directory
    /// are rejected.
    pub fn worksheet_path(&self, worksheet: &str) -> StoreResult<PathBuf> {
        let name = worksheet.trim();
        if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
            return Err(StoreError::InvalidWorksheet(worksheet.to_string()));
        }
        Ok(self.dir.join(format!("{name}.csv")))
    }

    fn write_table(path: &Path, table: &SheetTable) -> StoreResult<()> {
        let mut writer = csv::WriterBuilder::new().flexible(true).from_path(path)?;
        writer.write_record(&table.headers)?;
        for row in &table.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl SheetConnection for CsvSheetConnection {
    fn create(&self, worksheet: &str, headers: &[&str]) -> StoreResult<bool> {
        let path = self.worksheet_path(worksheet)?;
        fs::create_dir_all(&self.dir)?;
        let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(headers)?;
        writer.flush()?;
        Ok(true)
    }

    fn read(&self, worksheet: &str) -> StoreResult<SheetTable> {
        let path = self.worksheet_path(worksheet)?;
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotInitialized(format!(
                    "worksheet '{worksheet}' does not exist at {}",
                    path.display()
                )));
            }
            Err(e) => return Err(e.into()),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let mut cells: Vec<String> = record.iter().map(str::to_string).collect();
            cells.resize(headers.len().max(cells.len()), String::new());
            rows.push(cells);
        }

        Ok(SheetTable { headers, rows })
    }

    fn update(&self, worksheet: &str, table: &SheetTable) -> StoreResult<()> {
        let path = self.worksheet_path(worksheet)?;
        fs::create_dir_all(&self.dir)?;
        let tmp = self.dir.join(format!(".{}.csv.tmp", worksheet.trim()));
        let written = Self::write_table(&tmp, table)
            .and_then(|()| fs::rename(&tmp, &path).map_err(StoreError::from));
        if written.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        written
    }
}
