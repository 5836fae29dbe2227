use anyhow::Context;
use tagfill_engine::{Dict, Value};

/// Reads render data from TOML. Tables keep their key order.
pub fn load(source: &str) -> anyhow::Result<Dict> {
    let table: toml::Table = source.parse().context("data is not valid TOML")?;
    Ok(to_dict(&table))
}

fn to_dict(table: &toml::Table) -> Dict {
    table.iter().map(|(k, v)| (k.as_str(), to_value(v))).collect()
}

fn to_value(value: &toml::Value) -> Value {
    match value {
        toml::Value::String(v) => Value::String(v.clone()),
        toml::Value::Integer(v) => Value::Integer(*v),
        toml::Value::Float(v) => Value::Number(*v),
        toml::Value::Boolean(v) => Value::Boolean(*v),
        toml::Value::Datetime(v) => Value::String(v.to_string()),
        toml::Value::Array(items) => Value::List(items.iter().map(to_value).collect()),
        toml::Value::Table(table) => Value::Dict(to_dict(table)),
    }
}
