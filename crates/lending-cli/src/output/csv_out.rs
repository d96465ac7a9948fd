use serde_json::{Map, Value};
use std::io;

use super::{flatten, row_cells, row_headers, row_sets};

/// Write output as CSV to stdout.
///
/// A result holding a list of records (schedule periods, offers) is written
/// one record per row; anything else as `field,value` pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => {
            let body = match map.get("result") {
                Some(Value::Object(result)) => result,
                _ => map,
            };
            match row_sets(body).first() {
                Some((_, rows)) => write_rows(&mut wtr, rows),
                None => write_fields(&mut wtr, body),
            }
        }
        Value::Array(arr) => write_rows(&mut wtr, arr),
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_fields(wtr: &mut csv::Writer<io::StdoutLock<'_>>, map: &Map<String, Value>) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in flatten(map) {
        let _ = wtr.write_record([key.as_str(), &format_csv_value(&val)]);
    }
}

fn write_rows(wtr: &mut csv::Writer<io::StdoutLock<'_>>, rows: &[Value]) {
    if rows.is_empty() {
        return;
    }
    if !rows.iter().all(Value::is_object) {
        for item in rows {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
        return;
    }

    let headers = row_headers(rows);
    let _ = wtr.write_record(&headers);
    for row in rows {
        let _ = wtr.write_record(row_cells(row, &headers, format_csv_value));
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
