//! Property-based tests for diff and search invariants.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use lelnovo::{diff, search, AliasTable, Catalog, CatalogBuilder, NumSpec, Part, SearchOptions};

/// Small part-number alphabet so duplicates within a line are common.
fn arb_part() -> impl Strategy<Value = Part> {
    (
        "[A-C][0-2]",
        prop::sample::select(vec!["Available", "Unavailable", "Customize"]),
        prop::sample::select(vec!["Intel Core i5", "Intel Core i7", "AMD Ryzen 7"]),
        0u32..3_000,
    )
        .prop_map(|(pn, status, cpu, price)| {
            Part::new(pn.clone(), format!("Laptop {pn}"))
                .with_spec("status", status)
                .with_spec("processor", cpu)
                .with_num_spec("price", NumSpec::new(f64::from(price), "$"))
        })
}

fn arb_slot() -> impl Strategy<Value = (String, String, Vec<Part>)> {
    (
        prop::sample::select(vec!["thinkpadx1", "yoga", "legion"]),
        prop::sample::select(vec!["l1", "l2"]),
        prop::collection::vec(arb_part(), 0..6),
    )
        .prop_map(|(brand, line, parts)| (brand.to_string(), line.to_string(), parts))
}

fn arb_catalog() -> impl Strategy<Value = Catalog> {
    prop::collection::vec(arb_slot(), 0..5).prop_map(|slots| {
        let mut builder = CatalogBuilder::new("us/en", "");
        for (brand, line, parts) in slots {
            for part in parts {
                builder = builder.part(brand.clone(), line.clone(), part);
            }
        }
        builder.build()
    })
}

proptest! {
    #[test]
    fn diff_of_catalog_with_itself_is_empty(catalog in arb_catalog()) {
        prop_assert!(diff(&catalog, &catalog).is_empty());
    }

    #[test]
    fn diff_is_deterministic(new in arb_catalog(), old in arb_catalog()) {
        prop_assert_eq!(diff(&new, &old), diff(&new, &old));
    }

    #[test]
    fn diff_counts_balance_part_totals(new in arb_catalog(), old in arb_catalog()) {
        let counts = diff(&new, &old).counts();
        let new_total = i64::try_from(new.part_count()).unwrap();
        let old_total = i64::try_from(old.part_count()).unwrap();
        let added = i64::try_from(counts.added).unwrap();
        let removed = i64::try_from(counts.removed).unwrap();
        prop_assert_eq!(added - removed, new_total - old_total);
    }

    #[test]
    fn search_never_panics_and_hits_come_from_catalog(
        catalog in arb_catalog(),
        query in "[a-z0-9:<>=!, ]{0,24}",
    ) {
        let outcome = search(&catalog, &AliasTable::default(), &SearchOptions::default(), &query);
        for hit in outcome.hits() {
            let slot = catalog.parts(hit.brand, hit.product_line).unwrap();
            prop_assert!(slot.iter().any(|p| std::ptr::eq(p, hit.part)));
        }
    }

    #[test]
    fn price_threshold_filters_exactly(catalog in arb_catalog(), threshold in 0u32..3_000) {
        let query = format!("price<{threshold}");
        let outcome = search(&catalog, &AliasTable::default(), &SearchOptions::default(), &query);
        let expected = catalog
            .iter_parts()
            .filter(|(_, _, p)| p.price().is_some_and(|n| n.value < f64::from(threshold)))
            .count();
        prop_assert_eq!(outcome.hits().len(), expected);
    }
}
