//! Plain-text rendering for console front ends.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::catalog::{Catalog, Part};
use crate::diff::{price_changes, ChangeSet, LineChanges};
use crate::lookup::{PartInfo, Projection};
use crate::query::{DroppedTerm, SearchHit};

const WEEKS_PER_MONTH: f64 = 365.242 / 12.0 / 7.0;

/// Renders a duration as its coarsest whole unit, e.g. `3 days`.
///
/// ```
/// use lelnovo::report::pretty_duration;
///
/// assert_eq!(pretty_duration(59.0), "59 seconds");
/// assert_eq!(pretty_duration(3_600.0), "1 hour");
/// assert_eq!(pretty_duration(-86_400.0 * 3.5), "3 days");
/// ```
pub fn pretty_duration(seconds: f64) -> String {
    let intervals = [
        ("minute", 60.0),
        ("hour", 60.0),
        ("day", 24.0),
        ("week", 7.0),
        ("month", WEEKS_PER_MONTH),
        ("year", 12.0),
    ];

    let (mut unit, mut number) = ("second", seconds.abs());
    for (next_unit, ratio) in intervals {
        let next = number / ratio;
        if next < 1.0 {
            break;
        }
        unit = next_unit;
        number = next;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let shown = number as u64;
    format!("{shown} {unit}{}", if shown == 1 { "" } else { "s" })
}

/// One-line size summary of a catalog.
pub fn status_line(catalog: &Catalog) -> String {
    format!(
        "{} products total across {} product lines",
        catalog.metadata.total,
        catalog.product_line_count()
    )
}

/// Base URL, passcode and capture age of a catalog.
pub fn footer(catalog: &Catalog, now: DateTime<Utc>) -> String {
    let mut out = format!("{}\n{}\n", "_".repeat(30), catalog.metadata.base_url);
    if let Some(passcode) = &catalog.metadata.passcode {
        let _ = writeln!(out, "passcode: {passcode}");
    }
    if let Some(at) = catalog.captured_at() {
        let _ = write!(
            out,
            "last update: {} UTC ({} ago)",
            at.format("%c"),
            ago(now, at)
        );
    }
    out
}

fn ago(now: DateTime<Utc>, at: DateTime<Utc>) -> String {
    #[allow(clippy::cast_precision_loss)]
    let seconds = (now - at).num_seconds() as f64;
    pretty_duration(seconds)
}

fn part_url(catalog: &Catalog, part_number: &str) -> String {
    format!("{}/p/{part_number}", catalog.metadata.base_url)
}

/// Every known spec name, in columns.
pub fn spec_keys(catalog: &Catalog) -> String {
    let mut out = String::from("valid specs:\n");
    let specs: Vec<&String> = catalog.keys.info.iter().collect();
    for row in specs.chunks(5) {
        let cells: Vec<String> = row.iter().map(|s| format!("{s:20}")).collect();
        let _ = writeln!(out, "  {}", cells.join(" ").trim_end());
    }
    out.push_str("valid num_specs:\n");
    let nums: Vec<&String> = catalog.keys.num_specs.iter().collect();
    for row in nums.chunks(3) {
        let cells: Vec<String> = row.iter().map(|s| format!("{s:30}")).collect();
        let _ = writeln!(out, "  {}", cells.join(" ").trim_end());
    }
    out
}

/// Search hits with the fields that matched each one.
pub fn search_results(query: &str, hits: &[SearchHit<'_>], dropped: &[DroppedTerm]) -> String {
    let mut out = String::new();
    for d in dropped {
        let _ = writeln!(out, "ignored '{}': {}", d.term, d.reason);
    }
    for hit in hits {
        let _ = writeln!(
            out,
            "{} -> {} | {}",
            hit.product_line,
            hit.part.part_number(),
            hit.part.name()
        );
        for m in &hit.matches {
            let _ = writeln!(out, "  {:12} {}", m.field, m.value);
        }
    }
    let _ = write!(out, "Found {} results for '{query}'", hits.len());
    out
}

fn aligned<'a>(out: &mut String, rows: impl Iterator<Item = (&'a str, String)> + Clone) {
    let width = rows.clone().map(|(k, _)| k.len()).max().unwrap_or(0);
    for (k, v) in rows {
        let _ = writeln!(out, "  {k:>width$}  {v}");
    }
}

fn full_part(out: &mut String, part: &Part) {
    aligned(out, part.specs.iter().map(|(k, v)| (k.as_str(), v.to_string())));
    if !part.num_specs.is_empty() {
        out.push_str("  num_specs:\n");
        aligned(
            out,
            part.num_specs.iter().map(|(k, v)| (k.as_str(), format!("  {v}"))),
        );
    }
}

/// A part's summary line, link and requested fields.
pub fn part_specs(catalog: &Catalog, info: &PartInfo, specs: &Projection<'_>) -> String {
    let price = info
        .price
        .as_ref()
        .map_or_else(String::new, |p| format!("{}{}", p.unit, p.value));
    let mut out = format!(
        "{} ({}) --- {price} [{}]\n{}\n",
        info.name,
        info.part_number,
        info.status,
        part_url(catalog, &info.part_number)
    );
    match specs {
        Projection::Full(part) => full_part(&mut out, part),
        Projection::Fields(fields) => {
            aligned(&mut out, fields.iter().map(|(k, v)| (k.as_str(), v.to_string())));
        }
    }
    out
}

fn section<T>(
    out: &mut String,
    title: &str,
    section: &indexmap::IndexMap<String, indexmap::IndexMap<String, LineChanges<T>>>,
    mut line_item: impl FnMut(&mut String, &T),
) {
    if section.is_empty() {
        return;
    }
    let _ = writeln!(out, "{title}:");
    for (brand, lines) in section {
        for entry in lines.values() {
            let _ = writeln!(out, "  {brand} / {}", entry.name);
            for item in &entry.items {
                line_item(out, item);
            }
        }
    }
}

fn part_line(out: &mut String, part: &Part) {
    let price = part.price().map_or_else(String::new, |p| format!(" {}{}", p.unit, p.value));
    let _ = writeln!(out, "    {} | {}{price}", part.part_number(), part.name());
}

/// A change set, framed by the age of the older snapshot.
pub fn changes(changes: &ChangeSet, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let since = changes.timestamp_old.and_then(|ts| {
        #[allow(clippy::cast_possible_truncation)]
        DateTime::from_timestamp(ts as i64, 0)
    });
    match since {
        Some(at) => {
            let _ = writeln!(
                out,
                "Changes since {} UTC ({} ago)",
                at.format("%c"),
                ago(now, at)
            );
        }
        None => out.push_str("Changes\n"),
    }
    if changes.is_empty() {
        out.push_str("no changes\n");
        return out;
    }

    section(&mut out, "added", &changes.added, part_line);
    section(&mut out, "removed", &changes.removed, part_line);
    section(&mut out, "changed", &changes.changed, |out, change| {
        part_line(out, &change.part);
        for field in &change.fields {
            let _ = writeln!(out, "      {}: {} -> {}", field.spec, field.before, field.after);
        }
    });

    let prices = price_changes(changes);
    if !prices.is_empty() {
        out.push_str("price changes:\n");
        for p in prices {
            let _ = writeln!(
                out,
                "  {:+.1}% {} / {} ({} parts)",
                p.average_percent, p.brand, p.name, p.parts
            );
        }
    }
    out
}
