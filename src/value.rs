//! Value types stored on catalog parts.
//!
//! A part carries two kinds of fields: string specs (free-form text such as
//! the processor or display description) and numeric specs, which pair a
//! number with its unit so they can be compared.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A numeric spec: a comparable value and the unit it is expressed in.
///
/// Persisted as the two-element JSON array `[value, unit]`.
///
/// # Examples
///
/// ```
/// use lelnovo::NumSpec;
///
/// let price = NumSpec::new(1399.99, "$");
/// assert_eq!(price.to_string(), "1399.99 $");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, String)", into = "(f64, String)")]
pub struct NumSpec {
    /// The numeric value.
    pub value: f64,
    /// Unit or currency symbol, possibly empty.
    pub unit: String,
}

impl NumSpec {
    /// Creates a numeric spec.
    #[must_use]
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }
}

impl From<(f64, String)> for NumSpec {
    fn from((value, unit): (f64, String)) -> Self {
        Self { value, unit }
    }
}

impl From<NumSpec> for (f64, String) {
    fn from(n: NumSpec) -> Self {
        (n.value, n.unit)
    }
}

impl fmt::Display for NumSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

/// Value of a string-keyed spec on a part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpecValue {
    /// Plain text; the only kind searched by free-text queries.
    Text(String),
    /// A list of strings, e.g. the part numbers of a bundle.
    List(Vec<String>),
}

impl SpecValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            Self::List(_) => None,
        }
    }

    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

impl Default for SpecValue {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl fmt::Display for SpecValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(v) => f.write_str(v),
            Self::List(v) => f.write_str(&v.join(", ")),
        }
    }
}

impl From<&str> for SpecValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for SpecValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<String>> for SpecValue {
    fn from(v: Vec<String>) -> Self {
        Self::List(v)
    }
}

/// Either kind of field value, as reported by projections and diffs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Num(NumSpec),
    List(Vec<String>),
}

impl FieldValue {
    /// Returns the numeric spec if this is a numeric value.
    pub const fn as_num(&self) -> Option<&NumSpec> {
        match self {
            Self::Num(n) => Some(n),
            _ => None,
        }
    }

    pub const fn is_num(&self) -> bool {
        matches!(self, Self::Num(_))
    }
}

impl From<&SpecValue> for FieldValue {
    fn from(v: &SpecValue) -> Self {
        match v {
            SpecValue::Text(s) => Self::Text(s.clone()),
            SpecValue::List(l) => Self::List(l.clone()),
        }
    }
}

impl From<&NumSpec> for FieldValue {
    fn from(v: &NumSpec) -> Self {
        Self::Num(v.clone())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(v) => f.write_str(v),
            Self::Num(n) => write!(f, "{n}"),
            Self::List(v) => f.write_str(&v.join(", ")),
        }
    }
}
