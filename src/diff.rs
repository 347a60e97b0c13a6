//! Snapshot diffing.
//!
//! [`diff`] classifies every part of two snapshots as added, removed or
//! changed, slot by slot (a slot is one brand/product line pair). Part
//! numbers are not unique within a slot, so pairing is multiset-style:
//! each new part consumes at most one old part with the same part number,
//! taking the first unconsumed one in list order.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{Catalog, Part, PRICE};
use crate::value::{FieldValue, NumSpec};

/// Parts of one product line within a change section.
///
/// Persisted as the pair `[display name, [items...]]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(String, Vec<T>)", into = "(String, Vec<T>)")]
#[serde(bound(
    serialize = "T: Serialize + Clone",
    deserialize = "T: Deserialize<'de>"
))]
pub struct LineChanges<T> {
    /// Display name of the product line.
    pub name: String,
    pub items: Vec<T>,
}

impl<T> From<(String, Vec<T>)> for LineChanges<T> {
    fn from((name, items): (String, Vec<T>)) -> Self {
        Self { name, items }
    }
}

impl<T> From<LineChanges<T>> for (String, Vec<T>) {
    fn from(l: LineChanges<T>) -> Self {
        (l.name, l.items)
    }
}

/// Brand → product line id → entries.
pub type ChangeSection<T> = IndexMap<String, IndexMap<String, LineChanges<T>>>;

/// One field that differs between the old and new version of a part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub spec: String,
    pub is_num_spec: bool,
    pub before: FieldValue,
    pub after: FieldValue,
}

/// A part present in both snapshots with at least one differing field.
///
/// Persisted as the pair `[part, [field changes...]]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(Part, Vec<FieldChange>)", into = "(Part, Vec<FieldChange>)")]
pub struct PartChange {
    /// The part as it appears in the new snapshot.
    pub part: Part,
    pub fields: Vec<FieldChange>,
}

impl From<(Part, Vec<FieldChange>)> for PartChange {
    fn from((part, fields): (Part, Vec<FieldChange>)) -> Self {
        Self { part, fields }
    }
}

impl From<PartChange> for (Part, Vec<FieldChange>) {
    fn from(c: PartChange) -> Self {
        (c.part, c.fields)
    }
}

impl PartChange {
    /// The price change, if the price field changed.
    pub fn price_change(&self) -> Option<(&NumSpec, &NumSpec)> {
        self.fields
            .iter()
            .find(|f| f.is_num_spec && f.spec == PRICE)
            .and_then(|f| Some((f.before.as_num()?, f.after.as_num()?)))
    }
}

/// Added, removed and changed parts between two snapshots.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChangeSet {
    /// Capture instant of the older snapshot, in epoch seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_old: Option<f64>,

    #[serde(default)]
    pub added: ChangeSection<Part>,

    #[serde(default)]
    pub removed: ChangeSection<Part>,

    #[serde(default)]
    pub changed: ChangeSection<PartChange>,
}

/// Number of parts in each section of a [`ChangeSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ChangeCounts {
    pub added: usize,
    pub removed: usize,
    pub changed: usize,
}

fn section_len<T>(section: &ChangeSection<T>) -> usize {
    section
        .values()
        .flat_map(IndexMap::values)
        .map(|l| l.items.len())
        .sum()
}

impl ChangeSet {
    /// True when nothing was added, removed or changed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }

    /// True when no diff was ever recorded: no sections and no old
    /// timestamp. A diff against an unchanged snapshot is not unrecorded.
    pub fn is_unrecorded(&self) -> bool {
        self.is_empty() && self.timestamp_old.is_none()
    }

    pub fn counts(&self) -> ChangeCounts {
        ChangeCounts {
            added: section_len(&self.added),
            removed: section_len(&self.removed),
            changed: section_len(&self.changed),
        }
    }
}

fn push<T>(section: &mut ChangeSection<T>, brand: &str, line: &str, name: &str, items: Vec<T>) {
    if items.is_empty() {
        return;
    }
    section
        .entry(brand.to_string())
        .or_default()
        .entry(line.to_string())
        .or_insert_with(|| LineChanges {
            name: name.to_string(),
            items: Vec::new(),
        })
        .items
        .extend(items);
}

/// Field-by-field differences from `old` to `new`.
///
/// Text fields are compared exactly, with a missing field read as the
/// empty string. Numeric fields are compared as `(value, unit)` pairs and
/// only when both versions carry them: a numeric spec that appears or
/// disappears between snapshots (a part losing its `price`, say) never
/// produces a [`FieldChange`].
pub fn compare_parts(new: &Part, old: &Part) -> Vec<FieldChange> {
    let empty = FieldValue::Text(String::new());
    let mut changes = Vec::new();

    for (spec, value) in &new.specs {
        let after = FieldValue::from(value);
        let before = old.specs.get(spec).map_or_else(|| empty.clone(), FieldValue::from);
        if before != after {
            changes.push(FieldChange {
                spec: spec.clone(),
                is_num_spec: false,
                before,
                after,
            });
        }
    }
    for (spec, value) in &old.specs {
        if !new.specs.contains_key(spec) {
            changes.push(FieldChange {
                spec: spec.clone(),
                is_num_spec: false,
                before: FieldValue::from(value),
                after: empty.clone(),
            });
        }
    }
    for (spec, after) in &new.num_specs {
        if let Some(before) = old.num_specs.get(spec) {
            if before != after {
                changes.push(FieldChange {
                    spec: spec.clone(),
                    is_num_spec: true,
                    before: FieldValue::from(before),
                    after: FieldValue::from(after),
                });
            }
        }
    }
    changes
}

/// Result of pairing one slot's parts.
struct SlotDiff<'a> {
    added: Vec<&'a Part>,
    removed: Vec<&'a Part>,
    paired: Vec<(&'a Part, &'a Part)>,
}

fn pair_slot<'a>(new: &'a [Part], old: &'a [Part]) -> SlotDiff<'a> {
    let mut consumed = vec![false; old.len()];
    let mut added = Vec::new();
    let mut paired = Vec::new();

    for part in new {
        let pn = part.part_number();
        let found = old
            .iter()
            .enumerate()
            .position(|(i, o)| !consumed[i] && o.part_number() == pn);
        match found {
            Some(i) => {
                consumed[i] = true;
                paired.push((part, &old[i]));
            }
            None => added.push(part),
        }
    }

    let removed = old
        .iter()
        .zip(consumed)
        .filter_map(|(p, used)| (!used).then_some(p))
        .collect();

    SlotDiff {
        added,
        removed,
        paired,
    }
}

/// Compares `new` against `old`.
///
/// Added and changed entries follow the new snapshot's order; removed
/// entries follow the old snapshot's order. The result depends only on the
/// two catalogs, never on hash iteration order.
///
/// # Examples
///
/// ```
/// use lelnovo::{diff, CatalogBuilder, NumSpec, Part};
///
/// let snapshot = |price| {
///     CatalogBuilder::new("us/en", "")
///         .part(
///             "x1",
///             "22ABC",
///             Part::new("123", "X1")
///                 .with_spec("status", "Available")
///                 .with_num_spec("price", NumSpec::new(price, "$")),
///         )
///         .build()
/// };
///
/// let changes = diff(&snapshot(899.0), &snapshot(999.0));
/// assert_eq!(changes.counts().changed, 1);
/// assert!(diff(&snapshot(999.0), &snapshot(999.0)).is_empty());
/// ```
pub fn diff(new: &Catalog, old: &Catalog) -> ChangeSet {
    let mut changes = ChangeSet {
        timestamp_old: Some(old.metadata.timestamp),
        ..ChangeSet::default()
    };

    for (brand, lines) in &new.data {
        for (line, parts) in lines {
            let name = new.product_line_name(brand, line);
            let old_parts = old.parts(brand, line).unwrap_or_default();
            let slot = pair_slot(parts, old_parts);

            push(&mut changes.added, brand, line, name, slot.added.into_iter().cloned().collect());

            let changed: Vec<PartChange> = slot
                .paired
                .into_iter()
                .filter_map(|(n, o)| {
                    let fields = compare_parts(n, o);
                    (!fields.is_empty()).then(|| PartChange {
                        part: n.clone(),
                        fields,
                    })
                })
                .collect();
            push(&mut changes.changed, brand, line, name, changed);
        }
    }

    for (brand, lines) in &old.data {
        for (line, parts) in lines {
            let name = old.product_line_name(brand, line);
            let removed: Vec<Part> = match new.parts(brand, line) {
                Some(new_parts) => pair_slot(new_parts, parts)
                    .removed
                    .into_iter()
                    .cloned()
                    .collect(),
                None => parts.clone(),
            };
            push(&mut changes.removed, brand, line, name, removed);
        }
    }

    let counts = changes.counts();
    debug!(
        added = counts.added,
        removed = counts.removed,
        changed = counts.changed,
        "computed catalog diff"
    );
    changes
}

/// Mean price movement of one product line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSummary {
    pub brand: String,
    pub product_line: String,
    /// Display name of the product line.
    pub name: String,
    /// Mean of each part's percentage change; negative means cheaper.
    pub average_percent: f64,
    /// Number of parts whose price changed.
    pub parts: usize,
}

/// Per product line, the mean percentage price change across changed parts
/// whose price moved, cheapest movement first.
///
/// Parts whose old price is zero are left out since no percentage exists.
pub fn price_changes(changes: &ChangeSet) -> Vec<PriceSummary> {
    let mut summaries = Vec::new();
    for (brand, lines) in &changes.changed {
        for (line, entry) in lines {
            let percents: Vec<f64> = entry
                .items
                .iter()
                .filter_map(PartChange::price_change)
                .filter(|(before, _)| before.value != 0.0)
                .map(|(before, after)| (after.value - before.value) / before.value * 100.0)
                .filter(|p| p.is_finite())
                .collect();
            if percents.is_empty() {
                continue;
            }
            #[allow(clippy::cast_precision_loss)]
            let average_percent = percents.iter().sum::<f64>() / percents.len() as f64;
            summaries.push(PriceSummary {
                brand: brand.clone(),
                product_line: line.clone(),
                name: entry.name.clone(),
                average_percent,
                parts: percents.len(),
            });
        }
    }
    summaries.sort_by(|a, b| {
        a.average_percent
            .total_cmp(&b.average_percent)
            .then_with(|| a.brand.cmp(&b.brand))
            .then_with(|| a.product_line.cmp(&b.product_line))
    });
    summaries
}

/// Part numbers that appear more than once within a single slot.
///
/// Such duplicates make diff pairing depend on list order; callers can use
/// this to warn about it.
pub fn duplicate_part_numbers(catalog: &Catalog) -> Vec<(String, String, String)> {
    let mut out = Vec::new();
    for (brand, lines) in &catalog.data {
        for (line, parts) in lines {
            let mut seen = HashSet::new();
            let mut reported = HashSet::new();
            for part in parts {
                let pn = part.part_number();
                if !seen.insert(pn) && reported.insert(pn) {
                    out.push((brand.clone(), line.clone(), pn.to_string()));
                }
            }
        }
    }
    out
}
