use serde_json::Value;
use std::io::{self, Write};

use land_credit_core::analysis::combo::LandCreditCombo;
use land_credit_core::export::csv_export;

use super::ROW_ARRAY_KEYS;

/// Write output as CSV to stdout.
///
/// Analysed pairings use the fixed presentation rows; schedules and
/// scenario lists become one row per element; anything else is written as
/// `field,value` pairs.
pub fn print_csv(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Some(csv) = presentation_csv(result) {
        let _ = io::stdout().lock().write_all(csv.as_bytes());
        return;
    }

    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match result {
        Value::Object(map) => {
            let rows = ROW_ARRAY_KEYS
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_array));
            if let Some(rows) = rows {
                write_array_csv(&mut wtr, rows);
            } else {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in map {
                    let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
                }
            }
        }
        Value::Array(arr) => {
            write_array_csv(&mut wtr, arr);
        }
        _ => {
            let _ = wtr.write_record([&format_csv_value(result)]);
        }
    }

    let _ = wtr.flush();
}

/// The `Metric,Value` export for a single combo or a comparison report.
fn presentation_csv(result: &Value) -> Option<String> {
    if result.get("analysis").is_some() {
        let combo: LandCreditCombo = serde_json::from_value(result.clone()).ok()?;
        return csv_export::export_combo_csv(&combo).ok();
    }
    let combos: Vec<LandCreditCombo> =
        serde_json::from_value(result.get("combos")?.clone()).ok()?;
    csv_export::export_comparison_csv(&combos).ok()
}

fn write_array_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    // Extract headers from first object
    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
