//! CSV persistence helpers

use crate::error::Result;
use crate::table::PriceTable;
use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Create `path` and its parents if needed
pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let path = path.as_ref();
    fs::create_dir_all(path)?;
    Ok(path.to_path_buf())
}

/// Write `df` to `path` with a header row, overwriting any existing file
pub fn save_table_csv<P: AsRef<Path>>(df: &mut DataFrame, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).has_header(true).finish(df)?;
    debug!("Wrote {} rows to {}", df.height(), path.display());
    Ok(())
}

/// Read a CSV file with a header row
pub fn load_table_csv<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
    let file = File::open(path.as_ref())?;
    let df = CsvReader::new(file)
        .infer_schema(None)
        .has_header(true)
        .finish()?;
    Ok(df)
}

/// Save a price table to CSV
pub fn save_prices<P: AsRef<Path>>(table: &mut PriceTable, path: P) -> Result<()> {
    save_table_csv(table.dataframe_mut(), path)
}

/// Load a price table saved by [`save_prices`]
pub fn load_prices<P: AsRef<Path>>(path: P) -> Result<PriceTable> {
    PriceTable::from_dataframe(load_table_csv(path)?)
}
