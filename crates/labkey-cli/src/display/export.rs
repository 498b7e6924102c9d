//! JSON and CSV renderings of query results

use super::InstanceResult;
use serde_json::{Value, json};

pub fn render_json(results: &[InstanceResult]) -> serde_json::Result<String> {
    let documents: Vec<Value> = results
        .iter()
        .map(|result| {
            json!({
                "host": result.host,
                "columns": result.table.columns(),
                "rows": result.table.rows(),
                "metadata": result.table.metadata(),
            })
        })
        .collect();
    serde_json::to_string_pretty(&documents)
}

/// One header line plus rows per instance
pub fn render_csv(results: &[InstanceResult]) -> String {
    let mut out = String::new();

    for result in results {
        let header: Vec<String> = result.table.columns().iter().map(|c| quote(c)).collect();
        out.push_str(&header.join(","));
        out.push('\n');

        for row in result.table.rows() {
            let fields: Vec<String> = row.values().map(|value| quote(&csv_value(value))).collect();
            out.push_str(&fields.join(","));
            out.push('\n');
        }
    }

    out
}

fn csv_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
