//! CSV-based assumption loader
//!
//! Reads `parameter,value` rows, e.g. `stock.pe_overvalued_above,30`

use std::fs::File;
use std::path::Path;

use thiserror::Error;

/// Assumptions file the CLI loads when `--assumptions` is not given and the file exists
pub const DEFAULT_ASSUMPTIONS_FILE: &str = "data/advisory_assumptions.csv";

#[derive(Error, Debug)]
pub enum AssumptionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("unknown assumption parameter '{0}'")]
    UnknownParameter(String),

    #[error("invalid value for '{parameter}': {reason}")]
    InvalidValue { parameter: String, reason: String },
}

#[derive(Debug, serde::Deserialize)]
struct ParameterRow {
    parameter: String,
    value: f64,
}

/// Load every `(parameter, value)` pair from a CSV file
pub fn load_parameters(path: &Path) -> Result<Vec<(String, f64)>, AssumptionError> {
    load_parameters_from_reader(File::open(path)?)
}

/// Load `(parameter, value)` pairs from any reader
pub fn load_parameters_from_reader<R: std::io::Read>(
    reader: R,
) -> Result<Vec<(String, f64)>, AssumptionError> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);
    collect_rows(reader)
}

fn collect_rows<R: std::io::Read>(
    mut reader: csv::Reader<R>,
) -> Result<Vec<(String, f64)>, AssumptionError> {
    let mut parameters = Vec::new();
    for result in reader.deserialize() {
        let row: ParameterRow = result?;
        if !row.value.is_finite() {
            return Err(AssumptionError::InvalidValue {
                parameter: row.parameter,
                reason: "value must be finite".to_string(),
            });
        }
        parameters.push((row.parameter, row.value));
    }
    Ok(parameters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_parameters_skips_comments() {
        let csv = "parameter,value\n# tuned for the 2024 review\n stock.growth_high_above , 12.5\n";
        let rows = load_parameters_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(rows, vec![("stock.growth_high_above".to_string(), 12.5)]);
    }

    #[test]
    fn test_bad_value_is_csv_error() {
        let csv = "parameter,value\nstock.growth_high_above,lots\n";
        assert!(matches!(
            load_parameters_from_reader(csv.as_bytes()),
            Err(AssumptionError::Csv(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            load_parameters(Path::new("data/no_such_assumptions.csv")),
            Err(AssumptionError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound
        ));
    }

    #[test]
    fn test_shipped_assumptions_file_loads() {
        let rows = load_parameters(Path::new(DEFAULT_ASSUMPTIONS_FILE)).unwrap();
        assert!(rows.iter().any(|(p, _)| p == "retirement.withdrawal_rate"));
    }
}
