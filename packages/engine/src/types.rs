use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    None,
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    List(Vec<Value>),
    Dict(Dict),
}

impl Value {
    pub fn value_name(&self) -> String {
        match self {
            Value::None => "none",
            Value::String(_) => "string",
            Value::Integer(_) => "integer",
            Value::Number(_) => "number",
            Value::Boolean(_) => "boolean",
            Value::List(_) => "list",
            Value::Dict(_) => "dict",
        }
        .to_string()
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        if let Self::List(v) = self {
            Some(v)
        } else {
            None
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        if let Self::Dict(v) = self {
            Some(v)
        } else {
            None
        }
    }

    /// `none`, an empty string or an empty list: nothing to show.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::None => true,
            Value::String(s) => s.is_empty(),
            Value::List(v) => v.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => Ok(()),
            Value::String(v) => write!(f, "{v}"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Number(v) => write!(f, "{v}"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Value::Dict(dict) => write!(f, "{dict}"),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<Dict> for Value {
    fn from(v: Dict) -> Self {
        Value::Dict(v)
    }
}

/// A mapping that keeps keys in insertion order. Inserting an existing key
/// replaces its value without moving it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dict(Vec<(String, Value)>);

impl Dict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Lookup ignoring ASCII and Unicode case.
    pub fn get_ignore_case(&self, key: &str) -> Option<&Value> {
        let key = key.to_lowercase();
        self.0
            .iter()
            .find(|(k, _)| k.to_lowercase() == key)
            .map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Dict {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut dict = Dict::new();
        for (k, v) in iter {
            dict.insert(k, v);
        }
        dict
    }
}

impl fmt::Display for Dict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{k}: {v}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_render_without_trailing_zero() {
        assert_eq!(Value::from(3i64).to_string(), "3");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
        assert_eq!(Value::None.to_string(), "");
    }

    #[test]
    fn integers_stay_exact() {
        let big = Value::from(9_007_199_254_740_993i64);
        assert_eq!(big.to_string(), "9007199254740993");
        assert_eq!(big.value_name(), "integer");
    }

    #[test]
    fn lists_and_dicts_render_inline() {
        let list = Value::from(vec![Value::from("Rust"), Value::from("Go")]);
        assert_eq!(list.to_string(), "Rust, Go");

        let dict: Dict = [("city", "Oslo"), ("zip", "0150")].into_iter().collect();
        assert_eq!(Value::from(dict).to_string(), "city: Oslo, zip: 0150");
    }

    #[test]
    fn insert_keeps_first_position() {
        let mut dict = Dict::new();
        dict.insert("a", 1i64);
        dict.insert("b", 2i64);
        dict.insert("a", 3i64);
        assert_eq!(dict.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(dict.get("a"), Some(&Value::Integer(3)));
        assert_eq!(dict.get_ignore_case("B"), Some(&Value::Integer(2)));
    }

    #[test]
    fn blank_values() {
        assert!(Value::None.is_blank());
        assert!(Value::from("").is_blank());
        assert!(Value::List(vec![]).is_blank());
        assert!(!Value::from(false).is_blank());
    }
}
