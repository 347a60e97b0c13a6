//! # lelnovo - Query and Diff Engine for Laptop Catalog Snapshots
//!
//! A catalog snapshot is a scraped copy of a vendor's laptop offerings:
//! brands, product lines and parts, each part carrying string specs and
//! unit-tagged numeric specs. This crate answers questions over a snapshot
//! and compares two snapshots.
//!
//! ## Core Concepts
//!
//! - **Catalog**: one snapshot, ordered by brand and product line
//! - **Query**: comma-separated terms, ANDed (`x1, cpu:i7, price<1500`)
//! - **Lookup**: a part's specs, projected by (aliased) field name
//! - **ChangeSet**: parts added, removed and changed between snapshots
//!
//! ## Usage
//!
//! ```rust
//! use lelnovo::{search, AliasTable, CatalogBuilder, NumSpec, Part, SearchOptions};
//!
//! let catalog = CatalogBuilder::new("us/en", "https://www.lenovo.com/us/en")
//!     .part(
//!         "thinkpadx1",
//!         "thinkpadx1e",
//!         Part::new("20TK001EUS", "X1 Extreme")
//!             .with_spec("processor", "Intel Core i7-10750H")
//!             .with_num_spec("price", NumSpec::new(1399.99, "$")),
//!     )
//!     .build();
//!
//! let outcome = search(
//!     &catalog,
//!     &AliasTable::default(),
//!     &SearchOptions::default(),
//!     "cpu:i7, price<1500",
//! );
//! assert_eq!(outcome.hits().len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Snapshot model
pub mod alias;
pub mod catalog;
pub mod error;
pub mod value;

// Engine
pub mod diff;
pub mod lookup;
pub mod query;

// Surroundings
pub mod config;
pub mod report;
pub mod storage;

// Re-export primary types at crate root for convenience
pub use alias::AliasTable;
pub use catalog::{
    Catalog, CatalogBuilder, Metadata, Part, PartStatus, ProductLines, SpecKeys, NAME,
    NUM_SPECS_KEY, PART_NUMBER, PRICE, PRODUCT, STATUS,
};
pub use config::LelnovoConfig;
pub use diff::{
    compare_parts, diff, price_changes, ChangeCounts, ChangeSet, FieldChange, LineChanges,
    PartChange, PriceSummary,
};
pub use error::{LelnovoError, LelnovoResult, QueryError, StorageError, ValidationError};
pub use lookup::{find_part, get_specs, Lookup, PartInfo, PartRef, Projection};
pub use query::{
    search, CompareOp, DropReason, DroppedTerm, FieldMatch, ParsedQuery, QueryParser, SearchHit,
    SearchOptions, SearchOutcome, Term,
};
pub use storage::CatalogHandle;
pub use value::{FieldValue, NumSpec, SpecValue};
