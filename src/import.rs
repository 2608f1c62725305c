use std::path::Path;

use serde_json::{Number, Value};

use crate::error::DashboardError;
use crate::models::RawPollutionRecord;

/// Reads pollution readings from a `year,date,value` CSV export. Cells are
/// kept loose so bad rows are skipped by the aggregator, not here.
pub fn read_pollution_csv(csv_path: &Path) -> Result<Vec<RawPollutionRecord>, DashboardError> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        year: Option<String>,
        date: Option<String>,
        value: Option<String>,
    }

    let import_error = |message: String| DashboardError::Import {
        path: csv_path.to_path_buf(),
        message,
    };

    let mut reader = csv::Reader::from_path(csv_path).map_err(|e| import_error(e.to_string()))?;
    let mut records = Vec::new();

    for result in reader.deserialize::<CsvRow>() {
        let row = result.map_err(|e| import_error(e.to_string()))?;
        records.push(RawPollutionRecord {
            year: row.year.map(Value::String),
            date: row.date.filter(|d| !d.trim().is_empty()),
            value: row.value.map(|raw| cell_value(&raw)),
        });
    }

    Ok(records)
}

fn cell_value(raw: &str) -> Value {
    raw.trim()
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::aggregate::{bucket_records, summary_stats};

    #[test]
    fn csv_rows_flow_into_the_aggregator() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "year,date,value").unwrap();
        writeln!(file, "2020,2020-01-15,10").unwrap();
        writeln!(file, "2020,15-01-2020,20").unwrap();
        writeln!(file, "2020,2020-02-01,n/a").unwrap();
        file.flush().unwrap();

        let records = read_pollution_csv(file.path()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].value, Some(Value::String("n/a".to_string())));

        let buckets = bucket_records(&records);
        assert_eq!(buckets.years[&2020][0].count, 2);
        assert_eq!(buckets.years[&2020][1].count, 0);
        assert_eq!(summary_stats(&records).unwrap().count, 2);
    }

    #[test]
    fn missing_file_is_an_import_error() {
        let err = read_pollution_csv(Path::new("/nonexistent/readings.csv")).unwrap_err();
        assert!(matches!(err, DashboardError::Import { .. }));
    }
}
