//! Flat-file persistence: the CSV cache of the observation table, the raw-data
//! export and the Gini series.

use crate::dashboard::ExportRow;
use crate::stats::GiniSeries;
use crate::table::{Observation, ObservationTable};
use anyhow::{Context, Result, anyhow};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::File;
use std::io::Write;
use std::path::Path;

const COUNTRY: &str = "country";
const COUNTRY_NAME: &str = "country_name";
const YEAR: &str = "year";

/// Byte order mark so spreadsheet tools detect UTF-8.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

fn fmt_cell(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

/// Write the observation table to the cache file, replacing any previous content.
pub fn save_table_csv<P: AsRef<Path>>(table: &ObservationTable, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("create {}", path.display()))?;

    let mut header = vec![COUNTRY, COUNTRY_NAME, YEAR];
    header.extend(table.columns().iter().map(String::as_str));
    wtr.write_record(&header)?;

    for row in table.rows() {
        let mut record = vec![row.country.clone(), row.country_name.clone(), row.year.to_string()];
        record.extend(row.values.iter().map(|v| fmt_cell(*v)));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read a cache file written by [`save_table_csv`]. Every column other than
/// `country`, `country_name` and `year` is taken as an indicator column, whatever
/// its name, so older cache layouts still load.
pub fn load_table_csv<P: AsRef<Path>>(path: P) -> Result<ObservationTable> {
    let path = path.as_ref();
    let mut rdr = ReaderBuilder::new()
        .from_path(path)
        .with_context(|| format!("open {}", path.display()))?;
    let headers = rdr.headers()?.clone();

    let find = |name: &str| headers.iter().position(|h| h.trim_start_matches('\u{feff}') == name);
    let country_idx = find(COUNTRY).ok_or_else(|| anyhow!("cache file has no `{COUNTRY}` column"))?;
    let year_idx = find(YEAR).ok_or_else(|| anyhow!("cache file has no `{YEAR}` column"))?;
    let name_idx = find(COUNTRY_NAME);

    let indicator_idx: Vec<usize> = (0..headers.len())
        .filter(|i| *i != country_idx && *i != year_idx && Some(*i) != name_idx)
        .collect();
    let columns = indicator_idx.iter().map(|&i| headers[i].to_string()).collect();
    let mut table = ObservationTable::new(columns);

    for (line, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("read record {}", line + 1))?;
        let cell = |i: usize| record.get(i).unwrap_or("").trim();

        let year = cell(year_idx)
            .parse::<i32>()
            .with_context(|| format!("record {}: invalid year {:?}", line + 1, cell(year_idx)))?;
        let values = indicator_idx
            .iter()
            .map(|&i| match cell(i) {
                "" => Ok(None),
                s => s
                    .parse::<f64>()
                    .map(Some)
                    .with_context(|| format!("record {}: invalid number {:?}", line + 1, s)),
            })
            .collect::<Result<Vec<_>>>()?;

        table.push(Observation {
            country: cell(country_idx).to_string(),
            country_name: name_idx.map(cell).unwrap_or_default().to_string(),
            year,
            values,
        })?;
    }
    Ok(table)
}

/// Prefix cells that spreadsheet software would evaluate as a formula.
fn neutralize_formula(cell: &str) -> String {
    match cell.chars().next() {
        Some('=' | '+' | '-' | '@' | '\t' | '\r') => format!("'{cell}"),
        _ => cell.to_string(),
    }
}

/// Raw-data export as bytes: UTF-8 with BOM, `country,year,<indicator>`.
pub fn export_csv_bytes(rows: &[ExportRow], indicator: &str) -> Result<Vec<u8>> {
    let mut buf = UTF8_BOM.to_vec();
    {
        let mut wtr = WriterBuilder::new().from_writer(&mut buf);
        wtr.write_record([COUNTRY, YEAR, indicator])?;
        for r in rows {
            wtr.write_record([
                neutralize_formula(&r.country),
                r.year.to_string(),
                r.value.to_string(),
            ])?;
        }
        wtr.flush()?;
    }
    Ok(buf)
}

pub fn save_export_csv<P: AsRef<Path>>(rows: &[ExportRow], indicator: &str, path: P) -> Result<()> {
    let bytes = export_csv_bytes(rows, indicator)?;
    let mut f = File::create(path.as_ref())
        .with_context(|| format!("create {}", path.as_ref().display()))?;
    f.write_all(&bytes)?;
    Ok(())
}

/// Save a Gini series as CSV (`year,gini`); undefined years have an empty cell.
pub fn save_gini_csv<P: AsRef<Path>>(series: &GiniSeries, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("create {}", path.display()))?;
    wtr.write_record([YEAR, "gini"])?;
    for p in &series.points {
        wtr.write_record([p.year.to_string(), fmt_cell(p.gini)])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save a Gini series as pretty JSON.
pub fn save_gini_json<P: AsRef<Path>>(series: &GiniSeries, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let s = serde_json::to_string_pretty(series)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}
