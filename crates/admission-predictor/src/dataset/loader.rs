use super::{ColumnSet, DatasetError, Record, Table};
use std::io::Read;
use std::path::Path;
use tracing::{error, info, warn};

/// Startup bootstrap: never fails, substitutes an empty table and logs the cause.
pub fn load_or_empty<P: AsRef<Path>>(path: P, columns: ColumnSet) -> Table {
    let path = path.as_ref();
    match load_csv(path, columns) {
        Ok(table) if table.is_empty() => {
            warn!(path = %path.display(), "dataset loaded without rows; predictions will report it unavailable");
            table
        }
        Ok(table) => {
            info!(rows = table.len(), path = %path.display(), "loaded dataset");
            table
        }
        Err(err) => {
            error!(path = %path.display(), error = %err, "failed to load dataset");
            Table::empty()
        }
    }
}

pub fn load_csv<P: AsRef<Path>>(path: P, columns: ColumnSet) -> Result<Table, DatasetError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| DatasetError::Io {
        path: path.display().to_string(),
        source,
    })?;
    read_csv(file, columns)
}

/// Parses CSV with trimmed headers and fields. Rows with unparseable numbers are skipped.
pub fn read_csv<R: Read>(reader: R, columns: ColumnSet) -> Result<Table, DatasetError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let headers: Vec<&str> = headers.iter().collect();
    if let Some(missing) = columns.missing_from(&headers) {
        return Err(DatasetError::MissingColumn(missing));
    }

    let mut records = Vec::new();
    for (index, row) in csv_reader.deserialize::<Record>().enumerate() {
        // header is line 1
        let line = index + 2;
        match row {
            Ok(record) if record_is_usable(&record, columns) => records.push(record),
            Ok(_) => warn!(line, "skipping dataset row with non-finite or missing figures"),
            Err(err) if err.is_io_error() => return Err(err.into()),
            Err(err) => warn!(line, error = %err, "skipping malformed dataset row"),
        }
    }

    Ok(Table::new(records))
}

fn record_is_usable(record: &Record, columns: ColumnSet) -> bool {
    let bounds_ok = match columns {
        ColumnSet::Heuristic => true,
        ColumnSet::Full => matches!(
            (record.min, record.max),
            (Some(min), Some(max)) if min.is_finite() && max.is_finite()
        ),
    };
    record.mean.is_finite() && bounds_ok
}
