//! The catalog query language.
//!
//! A query is a comma-separated list of terms, all of which must match a
//! part for it to be returned:
//!
//! - `term` searches for `term` in the product line id and any text field
//! - `spec:term` searches for `term` within `spec` (`product` targets the
//!   product line id)
//! - `num_spec<num` compares a numeric spec; valid operators are
//!   `< <= = == != >= >`, and an empty number matches every part that has
//!   the spec
//!
//! ```
//! use lelnovo::query::{search, SearchOptions};
//! use lelnovo::{AliasTable, CatalogBuilder, NumSpec, Part};
//!
//! let catalog = CatalogBuilder::new("us/en", "https://www.lenovo.com/us/en")
//!     .part(
//!         "thinkpadx1",
//!         "thinkpadx1e",
//!         Part::new("20TK001EUS", "X1 Extreme")
//!             .with_spec("status", "Available")
//!             .with_spec("display", "15.6\" FHD IPS")
//!             .with_num_spec("price", NumSpec::new(1399.99, "$")),
//!     )
//!     .build();
//!
//! let outcome = search(
//!     &catalog,
//!     &AliasTable::default(),
//!     &SearchOptions::default(),
//!     "x1e, price<1400, display:fhd",
//! );
//! assert_eq!(outcome.hits().len(), 1);
//! ```

mod evaluator;
mod parser;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::alias::AliasTable;
use crate::catalog::{Catalog, Part};
use crate::error::QueryError;

pub use evaluator::evaluate;
pub use parser::QueryParser;

/// Field name reported when a term matched the product line id.
pub const PRODUCT_LINE_FIELD: &str = "product line";

/// Comparison operator of a numeric term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Lt,
    Le,
    Eq,
    Ne,
    Ge,
    Gt,
}

impl CompareOp {
    /// Parses an operator token; `==` is accepted as `=`.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        Some(match token {
            "<" => Self::Lt,
            "<=" => Self::Le,
            "=" | "==" => Self::Eq,
            "!=" => Self::Ne,
            ">=" => Self::Ge,
            ">" => Self::Gt,
            _ => return None,
        })
    }

    /// Applies `lhs OP rhs`.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn apply(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Self::Lt => lhs < rhs,
            Self::Le => lhs <= rhs,
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
            Self::Ge => lhs >= rhs,
            Self::Gt => lhs > rhs,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Ge => ">=",
            Self::Gt => ">",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One predicate of a parsed query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Term {
    /// Substring of the product line id or any text field.
    FreeText {
        /// Text to look for.
        text: String,
    },

    /// Substring of one named spec (or the product line id for `product`).
    SpecMatch {
        /// Canonical spec name.
        spec: String,
        /// Text to look for.
        text: String,
    },

    /// Numeric comparison against a numeric spec.
    NumericCompare {
        /// Canonical numeric spec name.
        spec: String,
        /// Operator.
        op: CompareOp,
        /// Right-hand side; `None` matches any value.
        threshold: Option<f64>,
    },
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FreeText { text } => f.write_str(text),
            Self::SpecMatch { spec, text } => write!(f, "{spec}:{text}"),
            Self::NumericCompare {
                spec,
                op,
                threshold: Some(t),
            } => write!(f, "{spec}{op}{t}"),
            Self::NumericCompare {
                spec,
                op,
                threshold: None,
            } => write!(f, "{spec}{op}"),
        }
    }
}

/// Why a query term was left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// `spec:text` named a spec that is not known and has no alias.
    UnknownSpec,
    /// A comparison named a numeric spec that is not known and has no alias.
    UnknownNumericSpec,
    /// A comparison's number did not parse.
    MalformedNumber,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownSpec => f.write_str("unknown spec"),
            Self::UnknownNumericSpec => f.write_str("unknown numeric spec"),
            Self::MalformedNumber => f.write_str("malformed number"),
        }
    }
}

/// A term that was left out of a query, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedTerm {
    /// The trimmed term text as typed.
    pub term: String,
    pub reason: DropReason,
}

/// The ordered predicates of one query string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedQuery {
    pub terms: Vec<Term>,

    #[serde(default)]
    pub dropped: Vec<DroppedTerm>,
}

impl ParsedQuery {
    /// True when no usable term survived parsing.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }
}

/// Evaluation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Long free-form fields skipped by free-text terms.
    #[serde(default = "default_excluded_fields")]
    pub excluded_fields: Vec<String>,
}

fn default_excluded_fields() -> Vec<String> {
    vec!["description".to_string()]
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            excluded_fields: default_excluded_fields(),
        }
    }
}

impl SearchOptions {
    pub(crate) fn is_excluded(&self, field: &str) -> bool {
        self.excluded_fields.iter().any(|f| f == field)
    }
}

/// A field that satisfied a term, rendered for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMatch {
    pub field: String,
    pub value: String,
}

impl FieldMatch {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// A part that satisfied every term of a query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit<'a> {
    pub brand: &'a str,
    pub product_line: &'a str,
    pub part: &'a Part,
    /// Matched fields, in term order.
    pub matches: Vec<FieldMatch>,
}

/// Result of [`search`]: the hits (or the empty-query error) plus any
/// terms that were dropped while parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome<'a> {
    pub result: Result<Vec<SearchHit<'a>>, QueryError>,
    pub dropped: Vec<DroppedTerm>,
}

impl<'a> SearchOutcome<'a> {
    /// True when the query had no usable terms.
    pub const fn is_error(&self) -> bool {
        self.result.is_err()
    }

    /// Matching parts; empty for an invalid query.
    pub fn hits(&self) -> &[SearchHit<'a>] {
        self.result.as_deref().unwrap_or_default()
    }
}

/// Parses `query` against `catalog` and evaluates it.
pub fn search<'a>(
    catalog: &'a Catalog,
    aliases: &AliasTable,
    options: &SearchOptions,
    query: &str,
) -> SearchOutcome<'a> {
    let parsed = QueryParser::new(catalog, aliases).parse(query);
    let result = evaluate(catalog, &parsed, options);
    SearchOutcome {
        result,
        dropped: parsed.dropped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_op_parse() {
        assert_eq!(CompareOp::parse("<"), Some(CompareOp::Lt));
        assert_eq!(CompareOp::parse("=="), Some(CompareOp::Eq));
        assert_eq!(CompareOp::parse("="), Some(CompareOp::Eq));
        assert_eq!(CompareOp::parse("=>"), None);
    }

    #[test]
    fn test_compare_op_apply() {
        assert!(CompareOp::Lt.apply(1399.99, 1400.0));
        assert!(!CompareOp::Lt.apply(1400.0, 1400.0));
        assert!(CompareOp::Le.apply(1400.0, 1400.0));
        assert!(CompareOp::Ne.apply(1.0, 2.0));
        assert!(CompareOp::Ge.apply(16.0, 16.0));
        assert!(!CompareOp::Gt.apply(f64::NAN, 0.0));
    }

    #[test]
    fn test_term_display() {
        let t = Term::NumericCompare {
            spec: "price".into(),
            op: CompareOp::Le,
            threshold: Some(900.0),
        };
        assert_eq!(t.to_string(), "price<=900");
        let t = Term::NumericCompare {
            spec: "price".into(),
            op: CompareOp::Gt,
            threshold: None,
        };
        assert_eq!(t.to_string(), "price>");
    }

    #[test]
    fn test_outcome_hits_empty_on_error() {
        let outcome = SearchOutcome {
            result: Err(QueryError::EmptyQuery),
            dropped: Vec::new(),
        };
        assert!(outcome.is_error());
        assert!(outcome.hits().is_empty());
    }
}
