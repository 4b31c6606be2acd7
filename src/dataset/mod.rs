//! In-memory model of a geosite domain-list dataset.
//!
//! A [`GeoSiteList`] is an ordered list of [`GeoSite`] records. Each record
//! is keyed by a country or category code and holds an ordered list of
//! [`Domain`] rules. Keys are compared case-insensitively and are not unique;
//! lookups scan in order and return the first match.

use crate::DomainType;

/// Typed value of a domain attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
}

/// Attribute attached to a domain rule, e.g. `@ads` or `@cn`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Attribute {
    pub key: String,
    pub value: Option<AttributeValue>,
    /// Raw bytes of fields not understood by this crate
    pub unknown_fields: Vec<u8>,
}

/// A single domain-matching rule.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Domain {
    pub kind: DomainType,
    pub value: String,
    pub attributes: Vec<Attribute>,
    /// Raw bytes of fields not understood by this crate
    pub unknown_fields: Vec<u8>,
}

impl Domain {
    /// Create a rule with the given match type and value.
    pub fn new(kind: DomainType, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            ..Default::default()
        }
    }

    /// Create a root-domain rule.
    pub fn root(value: impl Into<String>) -> Self {
        Self::new(DomainType::RootDomain, value)
    }
}

/// One country or category record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GeoSite {
    pub country_code: String,
    pub domains: Vec<Domain>,
    pub resource_hash: Vec<u8>,
    pub code: String,
    pub file_path: String,
    /// Raw bytes of fields not understood by this crate
    pub unknown_fields: Vec<u8>,
}

impl GeoSite {
    /// Create an empty record with the given key.
    pub fn new(country_code: impl Into<String>) -> Self {
        Self {
            country_code: country_code.into(),
            ..Default::default()
        }
    }

    /// Create a record holding the given rules.
    pub fn with_domains(country_code: impl Into<String>, domains: Vec<Domain>) -> Self {
        Self {
            country_code: country_code.into(),
            domains,
            ..Default::default()
        }
    }

    /// Whether this record's key matches `code`, ignoring case.
    pub fn is_keyed(&self, code: &str) -> bool {
        keys_equal(&self.country_code, code)
    }

    /// Whether a rule with exactly this value exists.
    pub fn contains_value(&self, value: &str) -> bool {
        self.domains.iter().any(|d| d.value == value)
    }

    /// Rule values in order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.domains.iter().map(|d| d.value.as_str())
    }
}

/// The full ordered dataset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GeoSiteList {
    pub entries: Vec<GeoSite>,
    /// Raw bytes of fields not understood by this crate
    pub unknown_fields: Vec<u8>,
}

impl GeoSiteList {
    /// Create an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a dataset from records.
    pub fn from_entries(entries: Vec<GeoSite>) -> Self {
        Self {
            entries,
            unknown_fields: Vec::new(),
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of rules across all records.
    pub fn domain_count(&self) -> usize {
        self.entries.iter().map(|e| e.domains.len()).sum()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GeoSite> {
        self.entries.iter()
    }

    /// Index of the first record keyed `code` (case-insensitive).
    pub fn find_index(&self, code: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.is_keyed(code))
    }

    /// First record keyed `code` (case-insensitive).
    pub fn find(&self, code: &str) -> Option<&GeoSite> {
        self.entries.iter().find(|e| e.is_keyed(code))
    }

    /// Record keys in order.
    pub fn country_codes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.country_code.as_str())
    }
}

impl<'a> IntoIterator for &'a GeoSiteList {
    type Item = &'a GeoSite;
    type IntoIter = std::slice::Iter<'a, GeoSite>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Case-insensitive key comparison: ASCII fast path, else Unicode lowercase comparison.
pub fn keys_equal(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        return a.eq_ignore_ascii_case(b);
    }
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}
