//! Query string → [`ParsedQuery`].

use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::alias::AliasTable;
use crate::catalog::{Catalog, PRODUCT};

use super::{CompareOp, DropReason, DroppedTerm, ParsedQuery, Term};

static NUMERIC_TERM: OnceLock<Regex> = OnceLock::new();

// Alternation order gives longest-operator-first matching.
fn numeric_term() -> &'static Regex {
    NUMERIC_TERM.get_or_init(|| {
        Regex::new(r"^([\w ]+?)\s*(<=|>=|!=|==|<|>|=)\s*(.*)$")
            .expect("numeric term pattern is valid")
    })
}

/// Parses query strings against the spec names known to one catalog.
#[derive(Debug, Clone, Copy)]
pub struct QueryParser<'a> {
    catalog: &'a Catalog,
    aliases: &'a AliasTable,
}

impl<'a> QueryParser<'a> {
    #[must_use]
    pub const fn new(catalog: &'a Catalog, aliases: &'a AliasTable) -> Self {
        Self { catalog, aliases }
    }

    /// Splits `query` on commas and parses each term.
    ///
    /// Terms naming unknown specs, and comparisons whose number does not
    /// parse, are dropped and recorded in [`ParsedQuery::dropped`]; they
    /// never abort the rest of the query. There is no escaping: a comma
    /// always separates terms.
    pub fn parse(&self, query: &str) -> ParsedQuery {
        let mut parsed = ParsedQuery::default();
        for raw in query.split(',') {
            let term = raw.trim();
            if term.is_empty() {
                continue;
            }
            match self.parse_term(term) {
                Ok(t) => parsed.terms.push(t),
                Err(reason) => {
                    warn!(term, %reason, "ignoring query term");
                    parsed.dropped.push(DroppedTerm {
                        term: term.to_string(),
                        reason,
                    });
                }
            }
        }
        debug!(
            query,
            terms = parsed.terms.len(),
            dropped = parsed.dropped.len(),
            "parsed query"
        );
        parsed
    }

    fn parse_term(&self, term: &str) -> Result<Term, DropReason> {
        if let Some((spec, text)) = term.split_once(':') {
            let spec = self.resolve_spec(spec).ok_or(DropReason::UnknownSpec)?;
            return Ok(Term::SpecMatch {
                spec,
                text: text.trim().to_string(),
            });
        }

        if let Some(caps) = numeric_term().captures(term) {
            let (name, op, number) = (&caps[1], &caps[2], caps[3].trim());
            let spec = self
                .resolve_num_spec(name)
                .ok_or(DropReason::UnknownNumericSpec)?;
            let op = CompareOp::parse(op).ok_or(DropReason::UnknownNumericSpec)?;
            let threshold = if number.is_empty() {
                None
            } else {
                Some(
                    number
                        .parse::<f64>()
                        .map_err(|_| DropReason::MalformedNumber)?,
                )
            };
            return Ok(Term::NumericCompare {
                spec,
                op,
                threshold,
            });
        }

        Ok(Term::FreeText {
            text: term.to_string(),
        })
    }

    fn resolve_spec(&self, name: &str) -> Option<String> {
        let name = name.trim().to_lowercase();
        if name == PRODUCT || self.catalog.is_known_spec(&name) {
            return Some(name);
        }
        let resolved = self.aliases.resolve_spec(&name);
        (resolved == PRODUCT || self.catalog.is_known_spec(resolved)).then(|| resolved.to_string())
    }

    fn resolve_num_spec(&self, name: &str) -> Option<String> {
        let name = name.trim().to_lowercase();
        if self.catalog.is_known_num_spec(&name) {
            return Some(name);
        }
        let resolved = self.aliases.resolve_num_spec(&name);
        self.catalog
            .is_known_num_spec(resolved)
            .then(|| resolved.to_string())
    }
}
