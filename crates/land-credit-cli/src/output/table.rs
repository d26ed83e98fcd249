use serde_json::Value;
use tabled::{builder::Builder, Table};

use land_credit_core::analysis::combo::LandCreditCombo;
use land_credit_core::export::csv_export;

use super::ROW_ARRAY_KEYS;

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            // Check if "result" key holds the primary data
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_flat_object(value);
            }
        }
        Value::Array(arr) => {
            print_array_table(arr);
        }
        _ => {
            println!("{}", value);
        }
    }
}

fn print_result_table(result: &Value, envelope: &serde_json::Map<String, Value>) {
    if !print_presentation_table(result) {
        match result {
            Value::Object(res_map) => {
                let rows = ROW_ARRAY_KEYS
                    .iter()
                    .find_map(|key| res_map.get(*key).and_then(Value::as_array));
                match rows {
                    Some(rows) => print_array_table(rows),
                    None => print_flat_object(result),
                }
            }
            _ => print_flat_object(&Value::Object(envelope.clone())),
        }
    }

    // Print warnings if any
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    // Print methodology
    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

/// Combos and comparisons render as the fixed metric rows. Returns false
/// when `result` is neither.
fn print_presentation_table(result: &Value) -> bool {
    if result.get("analysis").is_some() {
        let Ok(combo) = serde_json::from_value::<LandCreditCombo>(result.clone()) else {
            return false;
        };
        let mut builder = Builder::default();
        builder.push_record(["Metric", "Value"]);
        for (label, value) in csv_export::combo_csv_rows(&combo) {
            builder.push_record([label, value]);
        }
        println!("{}", Table::from(builder));

        let mut breakdown = Builder::default();
        breakdown.push_record(["Factor", "Points"]);
        for adj in &combo.analysis.score_breakdown {
            breakdown.push_record([adj.factor.clone(), format!("{:+}", adj.points)]);
        }
        println!("\nScore breakdown:\n{}", Table::from(breakdown));
        return true;
    }

    let Some(combos) = result
        .get("combos")
        .and_then(|c| serde_json::from_value::<Vec<LandCreditCombo>>(c.clone()).ok())
    else {
        return false;
    };
    if combos.is_empty() {
        println!("(empty)");
        return true;
    }

    let columns: Vec<Vec<(String, String)>> =
        combos.iter().map(csv_export::combo_csv_rows).collect();
    let mut builder = Builder::default();
    let mut header = vec!["Metric".to_string()];
    header.extend(combos.iter().map(|c| c.land.name.clone()));
    builder.push_record(header);
    for (i, label) in csv_export::ROW_LABELS.iter().enumerate() {
        let mut row = vec![label.to_string()];
        row.extend(columns.iter().map(|rows| rows[i].1.clone()));
        builder.push_record(row);
    }
    println!("{}", Table::from(builder));
    true
}

fn print_flat_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        let table = Table::from(builder);
        println!("{}", table);
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    // Collect all keys from first object for headers
    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        let table = Table::from(builder);
        println!("{}", table);
    } else {
        // Simple array of values
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
