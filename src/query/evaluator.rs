//! Evaluation of a [`ParsedQuery`] over a catalog snapshot.

use tracing::debug;

use crate::catalog::{Catalog, Part, PRODUCT};
use crate::error::QueryError;

use super::{FieldMatch, ParsedQuery, SearchHit, SearchOptions, Term, PRODUCT_LINE_FIELD};

/// A term with its search text lower-cased once up front.
enum Prepared<'q> {
    FreeText(String),
    SpecMatch(&'q str, String),
    NumericCompare(&'q Term),
}

impl<'q> Prepared<'q> {
    fn new(term: &'q Term) -> Self {
        match term {
            Term::FreeText { text } => Self::FreeText(text.to_lowercase()),
            Term::SpecMatch { spec, text } => Self::SpecMatch(spec, text.to_lowercase()),
            Term::NumericCompare { .. } => Self::NumericCompare(term),
        }
    }

    /// Pushes every field that satisfies this term; returns whether any did.
    fn collect(
        &self,
        line: &str,
        part: &Part,
        options: &SearchOptions,
        out: &mut Vec<FieldMatch>,
    ) -> bool {
        let before = out.len();
        match self {
            Self::FreeText(needle) => {
                if contains_ci(line, needle) {
                    out.push(FieldMatch::new(PRODUCT_LINE_FIELD, line));
                }
                for (field, value) in &part.specs {
                    if options.is_excluded(field) {
                        continue;
                    }
                    if let Some(text) = value.as_text() {
                        if contains_ci(text, needle) {
                            out.push(FieldMatch::new(field.as_str(), text));
                        }
                    }
                }
            }
            Self::SpecMatch(spec, needle) if *spec == PRODUCT => {
                if contains_ci(line, needle) {
                    out.push(FieldMatch::new(PRODUCT_LINE_FIELD, line));
                }
            }
            Self::SpecMatch(spec, needle) => {
                if let Some(text) = part.text(spec) {
                    if contains_ci(text, needle) {
                        out.push(FieldMatch::new(*spec, text));
                    }
                }
            }
            Self::NumericCompare(Term::NumericCompare {
                spec,
                op,
                threshold,
            }) => {
                if let Some(num) = part.num(spec) {
                    if threshold.map_or(true, |t| op.apply(num.value, t)) {
                        out.push(FieldMatch::new(spec.as_str(), num.to_string()));
                    }
                }
            }
            Self::NumericCompare(_) => {}
        }
        out.len() > before
    }
}

fn contains_ci(haystack: &str, lowered_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowered_needle)
}

/// Scans `catalog` for parts matching every term of `query`.
///
/// Hits come back in catalog order (brand, product line, part list order)
/// with no ranking.
///
/// # Errors
///
/// Returns [`QueryError::EmptyQuery`] without scanning when `query` has no
/// terms, so that "no valid query" is distinguishable from "no matches".
pub fn evaluate<'a>(
    catalog: &'a Catalog,
    query: &ParsedQuery,
    options: &SearchOptions,
) -> Result<Vec<SearchHit<'a>>, QueryError> {
    if query.is_empty() {
        return Err(QueryError::EmptyQuery);
    }

    let prepared: Vec<Prepared<'_>> = query.terms.iter().map(Prepared::new).collect();
    let mut hits = Vec::new();

    for (brand, line, part) in catalog.iter_parts() {
        let mut matches = Vec::new();
        let all = prepared
            .iter()
            .all(|term| term.collect(line, part, options, &mut matches));
        if all {
            hits.push(SearchHit {
                brand,
                product_line: line,
                part,
                matches,
            });
        }
    }

    debug!(
        terms = query.len(),
        scanned = catalog.part_count(),
        hits = hits.len(),
        "evaluated query"
    );
    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::AliasTable;
    use crate::catalog::{CatalogBuilder, PRICE, STATUS};
    use crate::query::{CompareOp, QueryParser};
    use crate::value::NumSpec;

    fn part(pn: &str, price: f64, display: &str) -> Part {
        Part::new(pn, format!("ThinkPad {pn}"))
            .with_spec(STATUS, "Available")
            .with_spec("display", display)
            .with_spec("description", "A long marketing blurb mentioning OLED")
            .with_num_spec(PRICE, NumSpec::new(price, "$"))
    }

    fn catalog() -> Catalog {
        CatalogBuilder::new("us/en", "")
            .part("thinkpadx1", "thinkpadx1e", part("20TK001EUS", 1399.99, "15.6\" FHD"))
            .part("thinkpadx1", "thinkpadx1e", part("20TK001FUS", 1400.0, "15.6\" UHD OLED"))
            .part("thinkpadt", "thinkpadt14", part("20S0000AUS", 899.0, "14\" FHD"))
            .build()
    }

    fn run<'a>(catalog: &'a Catalog, query: &str) -> Result<Vec<SearchHit<'a>>, QueryError> {
        let aliases = AliasTable::default();
        let parsed = QueryParser::new(catalog, &aliases).parse(query);
        evaluate(catalog, &parsed, &SearchOptions::default())
    }

    fn pns(hits: &[SearchHit<'_>]) -> Vec<String> {
        hits.iter().map(|h| h.part.part_number().to_string()).collect()
    }

    #[test]
    fn test_empty_query_is_error() {
        let catalog = catalog();
        assert_eq!(run(&catalog, ""), Err(QueryError::EmptyQuery));
        assert_eq!(run(&catalog, "unknownspec:foo"), Err(QueryError::EmptyQuery));
    }

    #[test]
    fn test_free_text_matches_product_line() {
        let catalog = catalog();
        let hits = run(&catalog, "X1E").unwrap();
        assert_eq!(pns(&hits), vec!["20TK001EUS", "20TK001FUS"]);
        assert_eq!(hits[0].matches[0], FieldMatch::new(PRODUCT_LINE_FIELD, "thinkpadx1e"));
    }

    #[test]
    fn test_free_text_collects_every_field() {
        let catalog = catalog();
        let hits = run(&catalog, "20s0").unwrap();
        assert_eq!(hits.len(), 1);
        let fields: Vec<&str> = hits[0].matches.iter().map(|m| m.field.as_str()).collect();
        assert_eq!(fields, vec!["part number", "name"]);
    }

    #[test]
    fn test_free_text_skips_description_and_num_specs() {
        let catalog = catalog();
        let hits = run(&catalog, "oled").unwrap();
        assert_eq!(pns(&hits), vec!["20TK001FUS"]);
        assert!(run(&catalog, "1399").unwrap().is_empty());
    }

    #[test]
    fn test_numeric_strict_less_than() {
        let catalog = catalog();
        let hits = run(&catalog, "price<1400").unwrap();
        assert_eq!(pns(&hits), vec!["20TK001EUS", "20S0000AUS"]);
        assert_eq!(hits[0].matches, vec![FieldMatch::new(PRICE, "1399.99 $")]);
    }

    #[test]
    fn test_empty_threshold_matches_all_with_spec() {
        let catalog = catalog();
        for query in ["price<", "price>"] {
            let hits = run(&catalog, query).unwrap();
            assert_eq!(hits.len(), 3);
            assert!(hits.iter().all(|h| h.matches[0].field == PRICE));
        }
    }

    #[test]
    fn test_terms_are_anded() {
        let catalog = catalog();
        let hits = run(&catalog, "x1e, price<1400, display:fhd").unwrap();
        assert_eq!(pns(&hits), vec!["20TK001EUS"]);
        let fields: Vec<&str> = hits[0].matches.iter().map(|m| m.field.as_str()).collect();
        assert_eq!(fields, vec![PRODUCT_LINE_FIELD, PRICE, "display"]);
    }

    #[test]
    fn test_product_spec_targets_line_only() {
        let catalog = catalog();
        let hits = run(&catalog, "product:t14").unwrap();
        assert_eq!(pns(&hits), vec!["20S0000AUS"]);
    }

    #[test]
    fn test_spec_absent_is_no_match() {
        let catalog = CatalogBuilder::new("us/en", "")
            .part("yoga", "Y7", part("82BH0001US", 999.0, "14\" FHD").with_spec("keyboard", "Backlit"))
            .part("yoga", "Y7", part("82BH0002US", 999.0, "14\" FHD"))
            .build();
        let hits = run(&catalog, "keyboard:backlit").unwrap();
        assert_eq!(pns(&hits), vec!["82BH0001US"]);
    }

    #[test]
    fn test_valid_query_without_matches_is_ok() {
        let catalog = catalog();
        assert_eq!(run(&catalog, "legion"), Ok(Vec::new()));
    }

    #[test]
    fn test_numeric_ne() {
        let catalog = catalog();
        let parsed = ParsedQuery {
            terms: vec![Term::NumericCompare {
                spec: PRICE.into(),
                op: CompareOp::Ne,
                threshold: Some(899.0),
            }],
            dropped: Vec::new(),
        };
        let hits = evaluate(&catalog, &parsed, &SearchOptions::default()).unwrap();
        assert_eq!(hits.len(), 2);
    }
}
