//! CSV telemetry and JSON report export.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::error::HarvestError;
use crate::sim::report::Report;
use crate::sim::types::PerformanceRecord;

/// Column header for CSV telemetry export.
const HEADER: &str = "time_index,day_of_year,wind_speed,ambient_temp,\
                      kinetic_w,thermal_w,em_w,chemical_w,total_w,\
                      maintenance_w,net_w,soc,health,cycles";

/// Exports step records to a CSV file at the given path.
///
/// Writes a header row followed by one data row per record. Produces
/// deterministic output for identical inputs.
///
/// # Arguments
///
/// * `records` - Step records in time order
/// * `path` - Output file path
///
/// # Errors
///
/// Returns [`HarvestError::Io`] if the file cannot be created, or
/// [`HarvestError::Csv`] if writing fails.
pub fn export_csv<'a>(
    records: impl IntoIterator<Item = &'a PerformanceRecord>,
    path: &Path,
) -> Result<(), HarvestError> {
    let file = File::create(path)?;
    write_csv(records, io::BufWriter::new(file))
}

/// Writes step records as CSV to any writer.
///
/// # Errors
///
/// Returns [`HarvestError::Csv`] if writing fails.
pub fn write_csv<'a>(
    records: impl IntoIterator<Item = &'a PerformanceRecord>,
    writer: impl Write,
) -> Result<(), HarvestError> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for r in records {
        wtr.write_record(&[
            r.time_index.to_string(),
            r.day_of_year.to_string(),
            format!("{:.4}", r.environment.wind_speed),
            format!("{:.4}", r.environment.ambient_temperature),
            format!("{:.6}", r.power_w.kinetic),
            format!("{:.6}", r.power_w.thermal),
            format!("{:.6}", r.power_w.electromagnetic),
            format!("{:.6}", r.power_w.chemical),
            format!("{:.6}", r.total_harvested_w),
            format!("{:.4}", r.maintenance_w),
            format!("{:.6}", r.net_w),
            format!("{:.6}", r.storage.soc),
            format!("{:.6}", r.storage.health),
            format!("{:.6}", r.storage.cycles),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes the report as pretty-printed JSON to the given path.
///
/// # Errors
///
/// Returns [`HarvestError::Io`] or [`HarvestError::Json`] on failure.
pub fn export_report_json(report: &Report, path: &Path) -> Result<(), HarvestError> {
    let file = File::create(path)?;
    write_report_json(report, io::BufWriter::new(file))
}

/// Writes the report as pretty-printed JSON to any writer.
///
/// # Errors
///
/// Returns [`HarvestError::Json`] if serialization or writing fails.
pub fn write_report_json(report: &Report, mut writer: impl Write) -> Result<(), HarvestError> {
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::PerModality;
    use crate::sim::history::History;
    use crate::sim::types::tests::record;

    fn records(n: usize) -> Vec<PerformanceRecord> {
        (0..n)
            .map(|t| record(t, 3.5, PerModality::splat(1.5)))
            .collect()
    }

    #[test]
    fn header_matches_schema() {
        let mut buf = Vec::new();
        write_csv(&records(1), &mut buf).ok();
        let output = String::from_utf8(buf).ok();
        let first_line = output.as_deref().unwrap_or("").lines().next().unwrap_or("");
        assert_eq!(
            first_line,
            "time_index,day_of_year,wind_speed,ambient_temp,kinetic_w,thermal_w,em_w,\
             chemical_w,total_w,maintenance_w,net_w,soc,health,cycles"
        );
    }

    #[test]
    fn row_count_matches_record_count() {
        let mut buf = Vec::new();
        write_csv(&records(24), &mut buf).ok();
        let output = String::from_utf8(buf).ok();
        let lines: Vec<&str> = output.as_deref().unwrap_or("").lines().collect();
        // 1 header + 24 data rows
        assert_eq!(lines.len(), 25);
    }

    #[test]
    fn deterministic_output() {
        let rs = records(5);
        let mut buf1 = Vec::new();
        let mut buf2 = Vec::new();
        write_csv(&rs, &mut buf1).ok();
        write_csv(&rs, &mut buf2).ok();
        assert_eq!(buf1, buf2);
    }

    #[test]
    fn rows_are_parseable() {
        let mut buf = Vec::new();
        write_csv(&records(3), &mut buf).ok();

        let mut rdr = csv::ReaderBuilder::new().from_reader(buf.as_slice());
        let headers = rdr.headers().cloned().ok();
        assert_eq!(headers.as_ref().map(csv::StringRecord::len), Some(14));

        let mut row_count = 0;
        for rec in rdr.records() {
            let rec = rec.expect("every row should parse");
            for i in 2..14 {
                assert!(rec[i].parse::<f64>().is_ok(), "column {i} should parse as f64");
            }
            assert_eq!(&rec[10], "3.500000");
            row_count += 1;
        }
        assert_eq!(row_count, 3);
    }

    #[test]
    fn accepts_history_iterator() {
        let mut history = History::new();
        for r in records(4) {
            history.push(r);
        }
        let mut buf = Vec::new();
        assert!(write_csv(history.iter(), &mut buf).is_ok());
        assert_eq!(String::from_utf8_lossy(&buf).lines().count(), 5);
    }

    #[test]
    fn report_json_has_sections() {
        let mut history = History::new();
        for r in records(24) {
            history.push(r);
        }
        let report =
            Report::from_history(&history, 24, PerModality::splat(0.25), None).expect("non-empty");
        let mut buf = Vec::new();
        write_report_json(&report, &mut buf).expect("serializes");
        let json: serde_json::Value = serde_json::from_slice(&buf).expect("valid JSON");
        assert!(json.get("performance").is_some());
        assert!(json.get("recommendations").is_some());
        assert_eq!(json["period"]["steps"], 24);
    }
}
