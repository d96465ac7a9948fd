use serde_json::Value;

/// Fields tried in order; the first non-null match anywhere in the result
/// is printed.
const PRIORITY_KEYS: [&str; 4] = ["monthly_payment", "level_payment", "late_fee", "amount"];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        for key in PRIORITY_KEYS {
            if let Some(val) = find_key(result_obj, key) {
                println!("{}", format_minimal(val));
                return;
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

/// Breadth-first search through nested objects, so a top-level field wins
/// over one inside `payment` or `quote`. Arrays are not searched.
fn find_key<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let mut level: Vec<&Value> = vec![value];
    while !level.is_empty() {
        let mut next = Vec::new();
        for node in level {
            if let Value::Object(map) = node {
                if let Some(v) = map.get(key) {
                    if !v.is_null() {
                        return Some(v);
                    }
                }
                next.extend(map.values().filter(|v| v.is_object()));
            }
        }
        level = next;
    }
    None
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_find_key_prefers_shallow_match() {
        let value = json!({
            "quote": {"payment": {"monthly_payment": "1"}},
            "agreement": {"monthly_payment": "2"},
        });
        assert_eq!(find_key(&value, "monthly_payment"), Some(&json!("2")));
        assert_eq!(find_key(&value, "missing"), None);
    }
}
