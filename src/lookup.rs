//! Part lookup by part number, with optional field projection.

use serde::Serialize;

use crate::alias::AliasTable;
use crate::catalog::{Catalog, Part, PartStatus};
use crate::value::{FieldValue, NumSpec};

/// A located part together with where it lives in the catalog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartRef<'a> {
    pub brand: &'a str,
    pub product_line: &'a str,
    pub part: &'a Part,
}

/// Summary shown above any projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartInfo {
    pub name: String,
    pub part_number: String,
    pub price: Option<NumSpec>,
    #[serde(serialize_with = "serialize_status")]
    pub status: PartStatus,
}

fn serialize_status<S: serde::Serializer>(status: &PartStatus, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(status)
}

impl From<&Part> for PartInfo {
    fn from(part: &Part) -> Self {
        Self {
            name: part.name().to_string(),
            part_number: part.part_number().to_string(),
            price: part.price().cloned(),
            status: part.status(),
        }
    }
}

/// The fields returned for a found part.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection<'a> {
    /// No fields were requested: the whole record.
    Full(&'a Part),
    /// The requested fields that exist, in request order, under their
    /// canonical names.
    Fields(Vec<(String, FieldValue)>),
}

/// Outcome of [`get_specs`].
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<'a> {
    Found {
        info: PartInfo,
        location: PartRef<'a>,
        specs: Projection<'a>,
    },
    NotFound {
        part_number: String,
    },
}

impl Lookup<'_> {
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}

/// Finds the first part whose part number equals `part_number`, ignoring
/// case and surrounding whitespace.
pub fn find_part<'a>(catalog: &'a Catalog, part_number: &str) -> Option<PartRef<'a>> {
    let wanted = part_number.trim().to_lowercase();
    catalog
        .iter_parts()
        .find(|(_, _, part)| part.part_number().trim().to_lowercase() == wanted)
        .map(|(brand, product_line, part)| PartRef {
            brand,
            product_line,
            part,
        })
}

/// Projects `requested` fields of `part`.
///
/// Each name is trimmed, lower-cased and resolved through the string alias
/// table, then the numeric one; names that match no field are omitted.
pub fn project<'a>(part: &'a Part, aliases: &AliasTable, requested: &[&str]) -> Projection<'a> {
    if requested.is_empty() {
        return Projection::Full(part);
    }

    let mut fields = Vec::new();
    for raw in requested {
        let name = raw.trim().to_lowercase();
        if name.is_empty() {
            continue;
        }
        let spec = aliases.resolve_spec(&name);
        if let Some(value) = part.specs.get(spec) {
            fields.push((spec.to_string(), FieldValue::from(value)));
            continue;
        }
        let num_spec = aliases.resolve_num_spec(&name);
        if let Some(value) = part.num(num_spec) {
            fields.push((num_spec.to_string(), FieldValue::from(value)));
        }
    }
    Projection::Fields(fields)
}

/// Looks up a part and projects the requested fields.
///
/// # Examples
///
/// ```
/// use lelnovo::lookup::{get_specs, Lookup};
/// use lelnovo::{AliasTable, CatalogBuilder, NumSpec, Part};
///
/// let catalog = CatalogBuilder::new("us/en", "")
///     .part(
///         "thinkpadx1",
///         "thinkpadx1e",
///         Part::new("20TK001EUS", "X1 Extreme")
///             .with_spec("status", "Available")
///             .with_num_spec("price", NumSpec::new(1399.99, "$")),
///     )
///     .build();
///
/// let found = get_specs(&catalog, &AliasTable::default(), " 20tk001eus ", &["price"]);
/// assert!(found.is_found());
///
/// let missing = get_specs(&catalog, &AliasTable::default(), "nope", &[]);
/// assert!(matches!(missing, Lookup::NotFound { .. }));
/// ```
pub fn get_specs<'a>(
    catalog: &'a Catalog,
    aliases: &AliasTable,
    part_number: &str,
    requested: &[&str],
) -> Lookup<'a> {
    match find_part(catalog, part_number) {
        Some(location) => Lookup::Found {
            info: PartInfo::from(location.part),
            specs: project(location.part, aliases, requested),
            location,
        },
        None => Lookup::NotFound {
            part_number: part_number.trim().to_string(),
        },
    }
}
