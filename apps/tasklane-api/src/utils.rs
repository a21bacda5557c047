use serde::Deserialize;

/// Integer id that clients send either as a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum IdField {
    Int(i64),
    Text(String),
}

impl IdField {
    /// `Ok(None)` for the "unset" encodings (`0`, `""`), `Err` for text that
    /// is not an integer.
    pub fn resolve(&self) -> Result<Option<i64>, std::num::ParseIntError> {
        match self {
            IdField::Int(0) => Ok(None),
            IdField::Int(v) => Ok(Some(*v)),
            IdField::Text(s) if s.trim().is_empty() => Ok(None),
            IdField::Text(s) => match s.trim().parse::<i64>()? {
                0 => Ok(None),
                v => Ok(Some(v)),
            },
        }
    }
}

/// Active flag as sent by clients: `true`, `1`, `"1"` and `"true"` all mean
/// active.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FlagField {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl FlagField {
    /// `None` when the client sent an empty string.
    pub fn resolve(&self) -> Option<bool> {
        match self {
            FlagField::Bool(b) => Some(*b),
            FlagField::Int(v) => Some(*v != 0),
            FlagField::Text(s) => match s.trim() {
                "" => None,
                "1" => Some(true),
                other => Some(other.eq_ignore_ascii_case("true")),
            },
        }
    }
}

/// Trimmed-empty strings count as absent.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
