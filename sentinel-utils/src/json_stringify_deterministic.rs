use serde_json::Value;

/// Serializes a JSON value with object keys sorted at every level and no
/// whitespace, so equal payloads always hash equally.
pub fn stringify_deterministic(value: &Value) -> String {
    match value {
        Value::Array(items) => {
            let out: Vec<String> = items.iter().map(stringify_deterministic).collect();
            format!("[{}]", out.join(","))
        }
        Value::Object(obj) => {
            let mut keys: Vec<&String> = obj.keys().collect();
            keys.sort();
            let out: Vec<String> = keys
                .into_iter()
                .map(|key| {
                    format!(
                        "{}:{}",
                        Value::String(key.clone()),
                        stringify_deterministic(&obj[key.as_str()])
                    )
                })
                .collect();
            format!("{{{}}}", out.join(","))
        }
        scalar => scalar.to_string(),
    }
}
