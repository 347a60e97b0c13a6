//! Alias resolution for spec names.
//!
//! Users type short or alternate spec names (`cpu`, `ram`); the catalog
//! stores canonical ones (`processor`, `memory`). String specs and numeric
//! specs have independent tables since the same alias may point at
//! different canonical names in each (`ram` is the `memory` text field or
//! the `memory` size in GB).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

const DEFAULT_SPEC_ALIASES: &[(&str, &str)] = &[
    ("cpu", "processor"),
    ("proc", "processor"),
    ("gpu", "graphics"),
    ("video", "graphics"),
    ("ram", "memory"),
    ("mem", "memory"),
    ("os", "operating system"),
    ("ssd", "storage"),
    ("hdd", "storage"),
    ("disk", "storage"),
    ("drive", "storage"),
    ("screen", "display"),
    ("wifi", "wireless"),
    ("wlan", "wireless"),
    ("bt", "bluetooth"),
    ("kb", "keyboard"),
    ("fingerprint", "fp reader"),
    ("pn", "part number"),
    ("part", "part number"),
    ("colour", "color"),
    ("webcam", "camera"),
    ("lte", "wwan"),
];

const DEFAULT_NUM_SPEC_ALIASES: &[(&str, &str)] = &[
    ("cost", "price"),
    ("ram", "memory"),
    ("mem", "memory"),
    ("cores", "cpu cores"),
    ("ppi", "pixel density"),
    ("dpi", "pixel density"),
    ("size", "display size"),
    ("screen", "display size"),
    ("thick", "thickness"),
    ("ssd", "storage"),
    ("disk", "storage"),
    ("charger", "ac adapter"),
    ("hres", "display res horizontal"),
    ("vres", "display res vertical"),
];

/// Alias → canonical name mappings for string and numeric specs.
///
/// Lookups are case-sensitive; callers lower-case user input first.
///
/// # Examples
///
/// ```
/// use lelnovo::AliasTable;
///
/// let aliases = AliasTable::default();
/// assert_eq!(aliases.resolve_spec("cpu"), "processor");
/// assert_eq!(aliases.resolve_num_spec("ram"), "memory");
/// assert_eq!(aliases.resolve_spec("display"), "display");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasTable {
    /// Aliases for string specs.
    #[serde(default)]
    pub specs: HashMap<String, String>,

    /// Aliases for numeric specs.
    #[serde(default)]
    pub num_specs: HashMap<String, String>,
}

impl AliasTable {
    /// Creates a table with no aliases.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            specs: HashMap::new(),
            num_specs: HashMap::new(),
        }
    }

    /// Adds or replaces a string spec alias.
    #[must_use]
    pub fn with_spec_alias(mut self, alias: impl Into<String>, canonical: impl Into<String>) -> Self {
        self.specs.insert(alias.into(), canonical.into());
        self
    }

    /// Adds or replaces a numeric spec alias.
    #[must_use]
    pub fn with_num_spec_alias(
        mut self,
        alias: impl Into<String>,
        canonical: impl Into<String>,
    ) -> Self {
        self.num_specs.insert(alias.into(), canonical.into());
        self
    }

    /// Overlays `other` on top of this table; `other` wins on collisions.
    pub fn merge(&mut self, other: Self) {
        self.specs.extend(other.specs);
        self.num_specs.extend(other.num_specs);
    }

    /// Canonical string spec name, or `name` unchanged when unmapped.
    pub fn resolve_spec<'a>(&'a self, name: &'a str) -> &'a str {
        self.specs.get(name).map_or(name, String::as_str)
    }

    /// Canonical numeric spec name, or `name` unchanged when unmapped.
    pub fn resolve_num_spec<'a>(&'a self, name: &'a str) -> &'a str {
        self.num_specs.get(name).map_or(name, String::as_str)
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        let collect = |pairs: &[(&str, &str)]| {
            pairs
                .iter()
                .map(|(a, c)| ((*a).to_string(), (*c).to_string()))
                .collect()
        };
        Self {
            specs: collect(DEFAULT_SPEC_ALIASES),
            num_specs: collect(DEFAULT_NUM_SPEC_ALIASES),
        }
    }
}
