//! Normalizes researched loan-product JSON into the flat CSV layout consumed
//! by the catalog loader.

use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;
use thiserror::Error;

/// Output column order. Downstream loaders depend on it.
pub const COLUMNS: [&str; 41] = [
    "bank_legal_name",
    "fdic_certificate",
    "website",
    "lending_footprint",
    "excluded_states",
    "product_type",
    "purpose_allowed",
    "min_loan_amount_usd",
    "max_loan_amount_usd",
    "rate_structure",
    "interest_rate_min",
    "interest_rate_max",
    "rate_floor_or_spread",
    "introductory_rate",
    "loan_term_months_min",
    "loan_term_months_max",
    "amortization_type",
    "min_years_in_business",
    "min_annual_revenue_usd",
    "min_personal_credit_score",
    "min_dscr",
    "other_financial_ratios",
    "collateral_required",
    "eligible_collateral_types",
    "max_ltv_real_estate",
    "max_ltv_equipment",
    "max_ltv_receivables",
    "max_ltv_inventory",
    "personal_guarantee",
    "guarantee_type",
    "origination_fee",
    "annual_fee",
    "other_fees",
    "prepayment_penalty",
    "decision_timeline_prequal_days",
    "decision_timeline_underwriting_days",
    "average_time_to_fund_days",
    "industry_restrictions",
    "special_conditions",
    "source_url",
    "last_verified",
];

/// Written wherever a record has no usable value
pub const FALLBACK_VALUE: &str = "Unknown/Not disclosed";

pub type Record = Map<String, Value>;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Failed to read JSON from {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON from {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Input JSON must be a list of objects")]
    NotAList,

    #[error("Element at index {0} is not an object")]
    NotAnObject(usize),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Load records from a JSON file
pub fn load_json(path: &Path) -> Result<Vec<Record>, ConvertError> {
    let shown = path.display().to_string();
    let file = File::open(path).map_err(|source| ConvertError::Read {
        path: shown.clone(),
        source,
    })?;
    let data: Value = serde_json::from_reader(BufReader::new(file))
        .map_err(|source| ConvertError::Parse { path: shown, source })?;

    records_from_value(data)
}

/// Accepts a list of objects, a single object, or an object wrapping one list
pub fn records_from_value(data: Value) -> Result<Vec<Record>, ConvertError> {
    let data = match data {
        Value::Object(object) => unwrap_single_list(object),
        other => other,
    };

    let Value::Array(items) = data else {
        return Err(ConvertError::NotAList);
    };

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| match item {
            Value::Object(record) => Ok(record),
            _ => Err(ConvertError::NotAnObject(idx)),
        })
        .collect()
}

fn unwrap_single_list(object: Record) -> Value {
    if object.len() == 1 && object.values().all(Value::is_array) {
        return object.into_iter().next().map(|(_, list)| list).unwrap_or_default();
    }
    Value::Array(vec![Value::Object(object)])
}

/// Produce one value per entry of [`COLUMNS`], in order
pub fn normalize_record(record: &Record) -> Vec<String> {
    COLUMNS
        .iter()
        .map(|column| match record.get(*column) {
            None | Some(Value::Null) => FALLBACK_VALUE.to_string(),
            Some(Value::String(text)) if text.is_empty() => FALLBACK_VALUE.to_string(),
            Some(Value::String(text)) => text.clone(),
            Some(nested @ (Value::Array(_) | Value::Object(_))) => nested.to_string(),
            Some(scalar) => scalar.to_string(),
        })
        .collect()
}

/// Write the header and normalized rows, returning the row count
pub fn write_csv<W: Write>(records: &[Record], writer: W) -> Result<usize, ConvertError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(COLUMNS)?;

    for record in records {
        csv_writer.write_record(normalize_record(record))?;
    }
    csv_writer.flush()?;

    Ok(records.len())
}

/// Read `input`, write the normalized CSV to `output`, and return the row count
pub fn convert_json_to_csv(input: &Path, output: &Path) -> Result<usize, ConvertError> {
    let records = load_json(input)?;
    let count = write_csv(&records, File::create(output)?)?;

    tracing::debug!("Wrote {} rows to {}", count, output.display());

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_fills_fallback() {
        let record = json!({
            "bank_legal_name": "Example Bank",
            "website": "",
            "lending_footprint": null,
            "min_dscr": 1.25,
            "eligible_collateral_types": ["Equipment", "Real Estate"],
            "personal_guarantee": true
        });
        let Value::Object(record) = record else { unreachable!() };

        let row = normalize_record(&record);
        let column = |name: &str| {
            let idx = COLUMNS.iter().position(|c| *c == name).unwrap();
            row[idx].clone()
        };

        assert_eq!(row.len(), COLUMNS.len());
        assert_eq!(column("bank_legal_name"), "Example Bank");
        assert_eq!(column("website"), FALLBACK_VALUE);
        assert_eq!(column("lending_footprint"), FALLBACK_VALUE);
        assert_eq!(column("fdic_certificate"), FALLBACK_VALUE);
        assert_eq!(column("min_dscr"), "1.25");
        assert_eq!(column("eligible_collateral_types"), r#"["Equipment","Real Estate"]"#);
        assert_eq!(column("personal_guarantee"), "true");
    }

    #[test]
    fn test_records_from_wrapped_list() {
        let records = records_from_value(json!({ "products": [{ "a": 1 }, { "b": 2 }] })).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_records_from_single_object() {
        let records = records_from_value(json!({ "bank_legal_name": "Solo", "other": 1 })).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["bank_legal_name"], "Solo");
    }

    #[test]
    fn test_records_reject_bad_shapes() {
        assert!(matches!(records_from_value(json!("nope")), Err(ConvertError::NotAList)));
        assert!(matches!(
            records_from_value(json!([{ "a": 1 }, 5])),
            Err(ConvertError::NotAnObject(1))
        ));
    }

    #[test]
    fn test_write_csv_header_order() {
        let mut buffer = Vec::new();
        let count = write_csv(&[], &mut buffer).unwrap();
        assert_eq!(count, 0);

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text.trim_end(), COLUMNS.join(","));
    }
}
