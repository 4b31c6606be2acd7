//! Domain rule match classification.

use std::fmt;

/// DomainType describes how a rule's value is matched against a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DomainType {
    /// Substring match anywhere in the host
    #[default]
    Plain,
    /// Regular expression match
    Regex,
    /// The domain itself and all of its subdomains
    RootDomain,
    /// Exact host match
    Full,
    /// A wire value this crate does not know, kept as-is
    Unknown(i32),
}

impl DomainType {
    /// Convert from the protobuf enum value.
    pub fn from_i32(v: i32) -> Self {
        match v {
            0 => DomainType::Plain,
            1 => DomainType::Regex,
            2 => DomainType::RootDomain,
            3 => DomainType::Full,
            other => DomainType::Unknown(other),
        }
    }

    /// Convert to the protobuf enum value.
    pub fn as_i32(&self) -> i32 {
        match self {
            DomainType::Plain => 0,
            DomainType::Regex => 1,
            DomainType::RootDomain => 2,
            DomainType::Full => 3,
            DomainType::Unknown(v) => *v,
        }
    }

    /// Get the canonical prefix representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DomainType::Plain => "keyword",
            DomainType::Regex => "regexp",
            DomainType::RootDomain => "domain",
            DomainType::Full => "full",
            DomainType::Unknown(_) => "unknown",
        }
    }
}

impl fmt::Display for DomainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainType::Unknown(v) => write!(f, "unknown({})", v),
            _ => write!(f, "{}", self.as_str()),
        }
    }
}
