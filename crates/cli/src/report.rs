use argtable::{Dispatch, Value};
use indexmap::IndexMap;
use serde::Serialize;

/// JSON view of a successful dispatch, printed by `argtable parse`.
#[derive(Debug, Serialize)]
pub struct ParseReport<'a> {
    pub command: &'a str,
    pub flags: Vec<&'a str>,
    pub counts: IndexMap<&'a str, u32>,
    pub options: IndexMap<&'a str, serde_json::Value>,
    pub multi: IndexMap<&'a str, Vec<&'a str>>,
    pub positionals: Vec<&'a str>,
}

impl<'a> ParseReport<'a> {
    pub fn new(dispatch: &'a Dispatch<'_>) -> Self {
        let args = &dispatch.args;
        let options = args
            .options()
            .map(|(name, raw)| {
                let value = match args.typed(name) {
                    Some(typed) => typed_json(typed),
                    None => serde_json::Value::String(raw.to_string()),
                };
                (name, value)
            })
            .collect();

        Self {
            command: &dispatch.path,
            flags: args.flags().collect(),
            counts: args.counts().collect(),
            options,
            multi: args
                .multi_values()
                .map(|(name, values)| (name, values.to_vec()))
                .collect(),
            positionals: args.positionals().to_vec(),
        }
    }
}

fn typed_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(n) => serde_json::Value::from(*n),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Str(s) => serde_json::Value::String(s.clone()),
    }
}
