use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A boolean marker as the feed encodes it. The feed mostly sends `"1"` and
/// `"0"`, but real booleans and numbers are accepted too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeedFlag(bool);

impl FeedFlag {
    pub fn is_set(self) -> bool {
        self.0
    }

    fn from_value(value: &Value) -> Self {
        let set = match value {
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
            Value::String(s) => matches!(
                s.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "y"
            ),
            _ => false,
        };
        FeedFlag(set)
    }
}

impl<'de> Deserialize<'de> for FeedFlag {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.map(|v| FeedFlag::from_value(&v)).unwrap_or_default())
    }
}

/// Reads a scalar the feed may send as a string or a number, keeping it as
/// text. `null` and empty strings become `None`.
pub(crate) fn opaque_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}
