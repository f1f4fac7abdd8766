//! CAIP-2 chain identifiers.
//!
//! A chain is addressed as `namespace:reference`, e.g. `eip155:1` for Ethereum
//! mainnet or `eip155:56` for BNB Smart Chain. Wallet sessions usually report a
//! bare numeric id, so `"137"` is accepted as shorthand for `eip155:137`.
//!
//! ```
//! use evm_pay_types::chain::ChainId;
//!
//! let polygon: ChainId = "eip155:137".parse().unwrap();
//! assert_eq!(polygon, "137".parse().unwrap());
//! assert_eq!(polygon.to_string(), "eip155:137");
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::networks;

/// Namespace assumed for bare numeric chain ids.
pub const DEFAULT_NAMESPACE: &str = "eip155";

/// A CAIP-2 blockchain identifier. Serializes as `"namespace:reference"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChainId {
    pub namespace: String,
    pub reference: String,
}

impl ChainId {
    pub fn new<N: Into<String>, R: Into<String>>(namespace: N, reference: R) -> Self {
        Self {
            namespace: namespace.into(),
            reference: reference.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Looks a chain up by its well-known name, e.g. `"polygon"`.
    pub fn from_network_name(network_name: &str) -> Option<Self> {
        networks::chain_id_by_network_name(network_name).cloned()
    }

    /// Well-known name of this chain, if it has one.
    pub fn as_network_name(&self) -> Option<&'static str> {
        networks::network_name_by_chain_id(self)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.reference)
    }
}

impl From<ChainId> for String {
    fn from(value: ChainId) -> Self {
        value.to_string()
    }
}

/// Error returned when parsing an invalid chain id or chain id pattern.
#[derive(Debug, thiserror::Error)]
#[error("Invalid chain id format {0}")]
pub struct ChainIdFormatError(String);

impl FromStr for ChainId {
    type Err = ChainIdFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(ChainId::new(DEFAULT_NAMESPACE, s));
        }
        match s.split_once(':') {
            Some((namespace, reference)) if !namespace.is_empty() && !reference.is_empty() => {
                Ok(ChainId::new(namespace, reference))
            }
            _ => Err(ChainIdFormatError(s.into())),
        }
    }
}

impl TryFrom<String> for ChainId {
    type Error = ChainIdFormatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A pattern over chain ids, used for allow-lists in configuration.
///
/// - `eip155:*` matches every chain in the namespace
/// - `eip155:1` matches one chain
/// - `eip155:{1,137,10}` matches any chain from the set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ChainIdPattern {
    Wildcard {
        namespace: String,
    },
    Exact {
        namespace: String,
        reference: String,
    },
    Set {
        namespace: String,
        references: BTreeSet<String>,
    },
}

impl ChainIdPattern {
    pub fn wildcard<S: Into<String>>(namespace: S) -> Self {
        Self::Wildcard {
            namespace: namespace.into(),
        }
    }

    pub fn exact<N: Into<String>, R: Into<String>>(namespace: N, reference: R) -> Self {
        Self::Exact {
            namespace: namespace.into(),
            reference: reference.into(),
        }
    }

    pub fn set<N, I, R>(namespace: N, references: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        Self::Set {
            namespace: namespace.into(),
            references: references.into_iter().map(Into::into).collect(),
        }
    }

    pub fn matches(&self, chain_id: &ChainId) -> bool {
        match self {
            ChainIdPattern::Wildcard { namespace } => chain_id.namespace == *namespace,
            ChainIdPattern::Exact {
                namespace,
                reference,
            } => chain_id.namespace == *namespace && chain_id.reference == *reference,
            ChainIdPattern::Set {
                namespace,
                references,
            } => chain_id.namespace == *namespace && references.contains(&chain_id.reference),
        }
    }

    pub fn namespace(&self) -> &str {
        match self {
            ChainIdPattern::Wildcard { namespace } => namespace,
            ChainIdPattern::Exact { namespace, .. } => namespace,
            ChainIdPattern::Set { namespace, .. } => namespace,
        }
    }
}

impl fmt::Display for ChainIdPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainIdPattern::Wildcard { namespace } => write!(f, "{}:*", namespace),
            ChainIdPattern::Exact {
                namespace,
                reference,
            } => write!(f, "{}:{}", namespace, reference),
            ChainIdPattern::Set {
                namespace,
                references,
            } => {
                let refs: Vec<&str> = references.iter().map(String::as_str).collect();
                write!(f, "{}:{{{}}}", namespace, refs.join(","))
            }
        }
    }
}

impl FromStr for ChainIdPattern {
    type Err = ChainIdFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (namespace, rest) = s.split_once(':').ok_or(ChainIdFormatError(s.into()))?;
        if namespace.is_empty() || rest.is_empty() {
            return Err(ChainIdFormatError(s.into()));
        }
        if rest == "*" {
            return Ok(ChainIdPattern::wildcard(namespace));
        }
        if let Some(inner) = rest.strip_prefix('{').and_then(|r| r.strip_suffix('}')) {
            let references = inner.split(',').map(str::trim).collect::<Vec<_>>();
            if references.iter().any(|r| r.is_empty()) {
                return Err(ChainIdFormatError(s.into()));
            }
            return Ok(ChainIdPattern::set(namespace, references));
        }
        Ok(ChainIdPattern::exact(namespace, rest))
    }
}

impl TryFrom<String> for ChainIdPattern {
    type Error = ChainIdFormatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ChainIdPattern> for String {
    fn from(value: ChainIdPattern) -> Self {
        value.to_string()
    }
}

impl From<ChainId> for ChainIdPattern {
    fn from(chain_id: ChainId) -> Self {
        ChainIdPattern::exact(chain_id.namespace, chain_id.reference)
    }
}
