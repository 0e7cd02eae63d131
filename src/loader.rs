use crate::error::ReportResult;
use crate::types::{RawRow, ShiftRecord};
use crate::util::parse_hours;
use csv::{ReaderBuilder, Trim};
use serde::Serialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub duplicate_rows: usize,
    /// Rows missing one of `tienda`, `semana`, `nombre`.
    pub rejected_rows: usize,
    /// Rows the CSV reader could not decode at all.
    pub parse_errors: usize,
    /// Loaded rows whose `horas` was absent, empty or not numeric and became NaN.
    pub unparsed_hours: usize,
}

pub fn load_records(path: impl AsRef<Path>) -> ReportResult<(Vec<ShiftRecord>, LoadReport)> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let (records, report) = read_records(file)?;
    info!(
        path = %path.display(),
        total = report.total_rows,
        loaded = report.loaded_rows,
        duplicates = report.duplicate_rows,
        rejected = report.rejected_rows,
        "loaded shift records"
    );
    Ok((records, report))
}

/// Read `;`-separated rows with a header line and deduplicate them.
pub fn read_records<R: Read>(reader: R) -> ReportResult<(Vec<ShiftRecord>, LoadReport)> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(reader);

    let mut rows = Vec::new();
    let mut parse_errors = 0usize;
    for (idx, result) in rdr.deserialize::<RawRow>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => {
                warn!(row = idx + 1, error = %e, "skipping undecodable row");
                parse_errors += 1;
            }
        }
    }

    let (records, mut report) = dedup_rows(rows);
    report.total_rows += parse_errors;
    report.parse_errors = parse_errors;
    Ok((records, report))
}

/// Type the raw rows and drop repeated (store, week, name) keys.
///
/// The first occurrence of a key wins; later ones are discarded without
/// touching the hours already kept. Output keeps first-seen order.
/// A row without `horas` still claims its key, with NaN hours.
pub fn dedup_rows<I>(rows: I) -> (Vec<ShiftRecord>, LoadReport)
where
    I: IntoIterator<Item = RawRow>,
{
    let mut report = LoadReport::default();
    let mut seen: HashSet<(String, String, String)> = HashSet::new();
    let mut records = Vec::new();

    for (idx, row) in rows.into_iter().enumerate() {
        report.total_rows += 1;
        let (Some(store), Some(week), Some(name)) = (row.store, row.week, row.name) else {
            warn!(row = idx + 1, "rejecting row with missing field");
            report.rejected_rows += 1;
            continue;
        };

        if !seen.insert((store.clone(), week.clone(), name.clone())) {
            debug!(row = idx + 1, %store, %week, %name, "dropping duplicate shift");
            report.duplicate_rows += 1;
            continue;
        }

        let hours = parse_hours(row.hours.as_deref().unwrap_or(""));
        if hours.is_nan() {
            report.unparsed_hours += 1;
        }
        records.push(ShiftRecord {
            store,
            week,
            name,
            hours,
        });
    }

    report.loaded_rows = records.len();
    (records, report)
}
