use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One logged hunt, as stored by the spreadsheet endpoint.
///
/// Decoding is lenient: spreadsheet cells come back as numbers, strings,
/// empty strings or null depending on how they were typed in, so every field
/// goes through one of the coercions below instead of failing the row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HuntRecord {
    #[serde(default, deserialize_with = "optional_text")]
    pub hunt_date: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub blind_location: Option<String>,
    #[serde(default, deserialize_with = "count")]
    pub ducks: u32,
    #[serde(default, deserialize_with = "count")]
    pub geese: u32,
    #[serde(default, deserialize_with = "optional_text")]
    pub photo_link: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub weather: String,
    #[serde(default, deserialize_with = "text")]
    pub notes: String,
}

fn value_to_text(value: Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    };
    if text.trim().is_empty() { None } else { Some(text) }
}

fn optional_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(value_to_text(Value::deserialize(d)?))
}

fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(value_to_text(Value::deserialize(d)?).unwrap_or_default())
}

fn count<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    Ok(coerce_count(&Value::deserialize(d)?))
}

/// Coerce a bird count to a non-negative integer, falling back to 0.
pub fn coerce_count(value: &Value) -> u32 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(|v| v.min(u32::MAX as u64) as u32)
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f.trunc().min(u32::MAX as f64) as u32)
            })
            .unwrap_or(0),
        Value::String(s) => parse_leading_count(s),
        _ => 0,
    }
}

/// Leading decimal digits of `s`, so `"3 drakes"` counts as 3.
pub fn parse_leading_count(s: &str) -> u32 {
    let digits: String = s
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits
        .parse::<u64>()
        .map(|v| v.min(u32::MAX as u64) as u32)
        .unwrap_or(0)
}
