//! The catalog snapshot model.
//!
//! A [`Catalog`] is one capture of the product database:
//! brand → product line → ordered list of [`Part`]s. Catalogs are built
//! wholesale (by the loader or a [`CatalogBuilder`]) and are never mutated
//! while a query or diff runs over them.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::diff::ChangeSet;
use crate::error::ValidationError;
use crate::value::{NumSpec, SpecValue};

/// Field holding a part's part number.
pub const PART_NUMBER: &str = "part number";
/// Field holding a part's display name.
pub const NAME: &str = "name";
/// Field holding a part's purchase status.
pub const STATUS: &str = "status";
/// Numeric spec holding a part's price.
pub const PRICE: &str = "price";
/// Reserved key under which numeric specs are persisted.
pub const NUM_SPECS_KEY: &str = "num_specs";
/// Pseudo-spec that targets the product line id instead of a part field.
pub const PRODUCT: &str = "product";

/// Ordered product lines of one brand, keyed by product line id.
pub type ProductLines = IndexMap<String, Vec<Part>>;

/// Purchase status of a part.
///
/// The set of statuses is open; comparisons are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartStatus {
    Available,
    Unavailable,
    Customize,
    Other(String),
}

impl PartStatus {
    /// Parses a status string, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "available" => Self::Available,
            "unavailable" => Self::Unavailable,
            "customize" => Self::Customize,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

impl fmt::Display for PartStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available => f.write_str("Available"),
            Self::Unavailable => f.write_str("Unavailable"),
            Self::Customize => f.write_str("Customize"),
            Self::Other(s) => f.write_str(s),
        }
    }
}

/// One purchasable product configuration.
///
/// String specs are stored flat on the persisted object; numeric specs live
/// under the reserved `num_specs` key.
///
/// # Examples
///
/// ```
/// use lelnovo::{NumSpec, Part};
///
/// let part = Part::new("20TK001EUS", "ThinkPad X1 Extreme Gen 3")
///     .with_spec("status", "Available")
///     .with_spec("processor", "Intel Core i7-10750H")
///     .with_num_spec("price", NumSpec::new(1399.99, "$"));
///
/// assert_eq!(part.part_number(), "20TK001EUS");
/// assert_eq!(part.price().map(|p| p.value), Some(1399.99));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Part {
    /// String specs, in scrape order.
    #[serde(flatten)]
    pub specs: IndexMap<String, SpecValue>,

    /// Numeric specs, in scrape order.
    #[serde(default)]
    pub num_specs: IndexMap<String, NumSpec>,
}

impl Part {
    /// Creates a part with its part number and name set.
    #[must_use]
    pub fn new(part_number: impl Into<String>, name: impl Into<String>) -> Self {
        Self::default()
            .with_spec(PART_NUMBER, part_number.into())
            .with_spec(NAME, name.into())
    }

    /// Sets a string spec.
    #[must_use]
    pub fn with_spec(mut self, spec: impl Into<String>, value: impl Into<SpecValue>) -> Self {
        self.specs.insert(spec.into(), value.into());
        self
    }

    /// Sets a numeric spec.
    #[must_use]
    pub fn with_num_spec(mut self, spec: impl Into<String>, value: NumSpec) -> Self {
        self.num_specs.insert(spec.into(), value);
        self
    }

    /// Returns the text value of a string spec, if present and textual.
    pub fn text(&self, spec: &str) -> Option<&str> {
        self.specs.get(spec).and_then(SpecValue::as_text)
    }

    /// Returns a numeric spec, if present.
    pub fn num(&self, spec: &str) -> Option<&NumSpec> {
        self.num_specs.get(spec)
    }

    pub fn part_number(&self) -> &str {
        self.text(PART_NUMBER).unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        self.text(NAME).unwrap_or_default()
    }

    pub fn status(&self) -> PartStatus {
        PartStatus::parse(self.text(STATUS).unwrap_or_default())
    }

    pub fn price(&self) -> Option<&NumSpec> {
        self.num(PRICE)
    }
}

/// Snapshot metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub region: String,

    #[serde(default, rename = "short region")]
    pub short_region: String,

    #[serde(default, rename = "base url")]
    pub base_url: String,

    /// Capture instant in seconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: f64,

    /// Number of parts across all product lines.
    #[serde(default)]
    pub total: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passcode: Option<String>,
}

/// Every spec name seen across the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpecKeys {
    /// String spec names.
    #[serde(default)]
    pub info: BTreeSet<String>,

    /// Numeric spec names.
    #[serde(default)]
    pub num_specs: BTreeSet<String>,
}

/// One snapshot of the product database.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub metadata: Metadata,

    #[serde(default)]
    pub keys: SpecKeys,

    /// Brand → ordered `(product line id, display name)` pairs.
    #[serde(default, rename = "brands")]
    pub product_line_names: IndexMap<String, Vec<(String, String)>>,

    /// Brand → product line id → parts.
    #[serde(default)]
    pub data: IndexMap<String, ProductLines>,

    /// Changes against the previous snapshot, when recorded.
    #[serde(default, skip_serializing_if = "ChangeSet::is_unrecorded")]
    pub changes: ChangeSet,
}

impl Catalog {
    /// Iterates `(brand, product line id, part)` in catalog order.
    pub fn iter_parts(&self) -> impl Iterator<Item = (&str, &str, &Part)> + '_ {
        self.data.iter().flat_map(|(brand, lines)| {
            lines.iter().flat_map(move |(line, parts)| {
                parts.iter().map(move |p| (brand.as_str(), line.as_str(), p))
            })
        })
    }

    /// Counts parts actually present, independent of `metadata.total`.
    pub fn part_count(&self) -> usize {
        self.data.values().flat_map(IndexMap::values).map(Vec::len).sum()
    }

    pub fn product_line_count(&self) -> usize {
        self.data.values().map(IndexMap::len).sum()
    }

    /// Returns the parts listed under a brand/product line slot.
    pub fn parts(&self, brand: &str, line: &str) -> Option<&[Part]> {
        self.data.get(brand)?.get(line).map(Vec::as_slice)
    }

    /// Display name for a product line, falling back to its id.
    pub fn product_line_name<'a>(&'a self, brand: &str, line: &'a str) -> &'a str {
        self.product_line_names
            .get(brand)
            .and_then(|lines| lines.iter().find(|(id, _)| id == line))
            .map_or(line, |(_, name)| name.as_str())
    }

    pub fn is_known_spec(&self, name: &str) -> bool {
        self.keys.info.contains(name)
    }

    pub fn is_known_num_spec(&self, name: &str) -> bool {
        self.keys.num_specs.contains(name)
    }

    /// Capture instant, if the timestamp is representable.
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        let ts = self.metadata.timestamp;
        if !ts.is_finite() {
            return None;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let nanos = (ts.fract().abs() * 1e9) as u32;
        #[allow(clippy::cast_possible_truncation)]
        DateTime::from_timestamp(ts.trunc() as i64, nanos)
    }

    /// Checks the structural invariants of a snapshot.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (brand, lines) in &self.data {
            if lines.is_empty() {
                return Err(ValidationError::EmptyBrand {
                    brand: brand.clone(),
                });
            }
            for (line, parts) in lines {
                if parts.is_empty() {
                    return Err(ValidationError::EmptyProductLine {
                        brand: brand.clone(),
                        line: line.clone(),
                    });
                }
                for part in parts {
                    for field in [PART_NUMBER, NAME, STATUS] {
                        if part.text(field).map_or(true, |v| v.trim().is_empty()) {
                            return Err(ValidationError::MissingField {
                                brand: brand.clone(),
                                line: line.clone(),
                                field: field.to_string(),
                            });
                        }
                    }
                    if let Some(spec) = part
                        .num_specs
                        .keys()
                        .find(|k| !self.keys.num_specs.contains(*k))
                    {
                        return Err(ValidationError::UnknownNumericSpec {
                            part_number: part.part_number().to_string(),
                            spec: spec.clone(),
                        });
                    }
                }
            }
        }

        let actual = self.part_count();
        if actual != self.metadata.total {
            return Err(ValidationError::TotalMismatch {
                declared: self.metadata.total,
                actual,
            });
        }
        Ok(())
    }
}

/// Builds a [`Catalog`] in code, keeping `total` and the key sets in step
/// with the parts added.
///
/// # Examples
///
/// ```
/// use lelnovo::{CatalogBuilder, NumSpec, Part};
///
/// let catalog = CatalogBuilder::new("us/en", "https://www.lenovo.com/us/en")
///     .product_line("thinkpadx1", "22TP2X1X1E3", "ThinkPad X1 Extreme Gen 3")
///     .part(
///         "thinkpadx1",
///         "22TP2X1X1E3",
///         Part::new("20TK001EUS", "X1 Extreme")
///             .with_spec("status", "Available")
///             .with_num_spec("price", NumSpec::new(1399.99, "$")),
///     )
///     .build();
///
/// assert_eq!(catalog.metadata.total, 1);
/// assert!(catalog.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CatalogBuilder {
    metadata: Metadata,
    names: IndexMap<String, Vec<(String, String)>>,
    data: IndexMap<String, ProductLines>,
}

impl CatalogBuilder {
    /// Creates a builder for the given region and site base URL.
    pub fn new(region: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            metadata: Metadata {
                region: region.into(),
                base_url: base_url.into(),
                ..Metadata::default()
            },
            ..Self::default()
        }
    }

    #[must_use]
    pub fn short_region(mut self, short_region: impl Into<String>) -> Self {
        self.metadata.short_region = short_region.into();
        self
    }

    /// Sets the capture instant in epoch seconds.
    #[must_use]
    pub fn timestamp(mut self, timestamp: f64) -> Self {
        self.metadata.timestamp = timestamp;
        self
    }

    /// Declares a product line and its display name.
    #[must_use]
    pub fn product_line(
        mut self,
        brand: impl Into<String>,
        line: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let brand = brand.into();
        let line = line.into();
        let names = self.names.entry(brand.clone()).or_default();
        if !names.iter().any(|(id, _)| *id == line) {
            names.push((line.clone(), name.into()));
        }
        self.data.entry(brand).or_default().entry(line).or_default();
        self
    }

    /// Appends a part to a product line, declaring the line if needed.
    #[must_use]
    pub fn part(mut self, brand: impl Into<String>, line: impl Into<String>, part: Part) -> Self {
        self.data
            .entry(brand.into())
            .or_default()
            .entry(line.into())
            .or_default()
            .push(part);
        self
    }

    /// Finishes the catalog, pruning empty product lines and brands.
    #[must_use]
    pub fn build(self) -> Catalog {
        let Self {
            mut metadata,
            mut names,
            mut data,
        } = self;

        for lines in data.values_mut() {
            lines.retain(|_, parts| !parts.is_empty());
        }
        data.retain(|_, lines| !lines.is_empty());

        let mut keys = SpecKeys::default();
        let mut product_line_names = IndexMap::new();
        for (brand, lines) in &data {
            let declared = names.shift_remove(brand).unwrap_or_default();
            let mut ordered = Vec::with_capacity(lines.len());
            for (line, parts) in lines {
                let name = declared
                    .iter()
                    .find(|(id, _)| id == line)
                    .map_or_else(|| line.clone(), |(_, n)| n.clone());
                ordered.push((line.clone(), name));
                for part in parts {
                    keys.info.extend(part.specs.keys().cloned());
                    keys.num_specs.extend(part.num_specs.keys().cloned());
                }
            }
            product_line_names.insert(brand.clone(), ordered);
        }

        metadata.total = data.values().flat_map(IndexMap::values).map(Vec::len).sum();

        Catalog {
            metadata,
            keys,
            product_line_names,
            data,
            changes: ChangeSet::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(pn: &str, price: f64) -> Part {
        Part::new(pn, format!("Laptop {pn}"))
            .with_spec(STATUS, "Available")
            .with_num_spec(PRICE, NumSpec::new(price, "$"))
    }

    fn sample() -> Catalog {
        CatalogBuilder::new("us/en", "https://www.lenovo.com/us/en")
            .timestamp(1_609_459_200.5)
            .product_line("thinkpadx1", "22TP2X1X1E3", "ThinkPad X1 Extreme Gen 3")
            .part("thinkpadx1", "22TP2X1X1E3", part("20TK001EUS", 1399.99))
            .part("thinkpadx1", "22TP2X1X1E3", part("20TK001FUS", 1599.99))
            .part("legion-7-series", "88GMY701406", part("82K6000FUS", 2099.0))
            .build()
    }

    #[test]
    fn test_part_status_case_insensitive() {
        assert_eq!(PartStatus::parse("available"), PartStatus::Available);
        assert_eq!(PartStatus::parse(" UNAVAILABLE "), PartStatus::Unavailable);
        assert_eq!(PartStatus::parse("Customize"), PartStatus::Customize);
        assert_eq!(
            PartStatus::parse("Coming Soon"),
            PartStatus::Other("Coming Soon".to_string())
        );
    }

    #[test]
    fn test_builder_maintains_total_and_keys() {
        let catalog = sample();
        assert_eq!(catalog.metadata.total, 3);
        assert_eq!(catalog.part_count(), 3);
        assert!(catalog.is_known_spec(PART_NUMBER));
        assert!(catalog.is_known_spec(STATUS));
        assert!(catalog.is_known_num_spec(PRICE));
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn test_builder_prunes_empty_lines() {
        let catalog = CatalogBuilder::new("us/en", "")
            .product_line("yoga", "EMPTY", "Nothing here")
            .part("thinkbook-series", "TB14", part("20VD0009US", 749.0))
            .build();
        assert!(!catalog.data.contains_key("yoga"));
        assert!(!catalog.product_line_names.contains_key("yoga"));
        assert_eq!(catalog.product_line_count(), 1);
    }

    #[test]
    fn test_product_line_name_fallback() {
        let catalog = sample();
        assert_eq!(
            catalog.product_line_name("thinkpadx1", "22TP2X1X1E3"),
            "ThinkPad X1 Extreme Gen 3"
        );
        // Lines added without a declared name use their id.
        assert_eq!(
            catalog.product_line_name("legion-7-series", "88GMY701406"),
            "88GMY701406"
        );
        assert_eq!(catalog.product_line_name("nope", "X"), "X");
    }

    #[test]
    fn test_iter_parts_in_catalog_order() {
        let catalog = sample();
        let pns: Vec<&str> = catalog.iter_parts().map(|(_, _, p)| p.part_number()).collect();
        assert_eq!(pns, vec!["20TK001EUS", "20TK001FUS", "82K6000FUS"]);
    }

    #[test]
    fn test_validate_total_mismatch() {
        let mut catalog = sample();
        catalog.metadata.total = 7;
        assert_eq!(
            catalog.validate(),
            Err(ValidationError::TotalMismatch {
                declared: 7,
                actual: 3
            })
        );
    }

    #[test]
    fn test_validate_unknown_numeric_spec() {
        let mut catalog = sample();
        catalog.keys.num_specs.remove(PRICE);
        assert!(matches!(
            catalog.validate(),
            Err(ValidationError::UnknownNumericSpec { .. })
        ));
    }

    #[test]
    fn test_validate_missing_name() {
        let catalog = CatalogBuilder::new("us/en", "")
            .part("yoga", "Y9", Part::new("81XX", "  ").with_spec(STATUS, "Available"))
            .build();
        assert!(matches!(
            catalog.validate(),
            Err(ValidationError::MissingField { field, .. }) if field == NAME
        ));
    }

    #[test]
    fn test_captured_at() {
        let catalog = sample();
        let at = catalog.captured_at().unwrap();
        assert_eq!(at.timestamp(), 1_609_459_200);
        assert_eq!(at.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn test_part_json_shape() {
        let json = r#"{
            "part number": "20TK001EUS",
            "name": "X1 Extreme",
            "status": "Available",
            "bundle": ["20TK001EUS", "4X40Q62615"],
            "num_specs": {"price": [1399.99, "$"], "memory": [16, "GB"]}
        }"#;
        let part: Part = serde_json::from_str(json).unwrap();
        assert_eq!(part.part_number(), "20TK001EUS");
        assert_eq!(part.num("memory"), Some(&NumSpec::new(16.0, "GB")));
        assert!(part.text("bundle").is_none());
        assert!(!part.specs.contains_key(NUM_SPECS_KEY));
    }
}
