//! EVM value types: checksummed addresses and numeric chain references.

use alloy_primitives::{Address, hex};
use evm_pay_types::chain::ChainId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An Ethereum address that displays and serializes with EIP-55 checksum encoding.
///
/// ```
/// use evm_pay_eip155::chain::ChecksummedAddress;
///
/// let addr: ChecksummedAddress = "0xcba852ef29a43a7542b88f60c999ed9cb66f6000".parse().unwrap();
/// assert_eq!(addr.to_string(), "0xcBa852Ef29a43a7542B88F60C999eD9cB66f6000");
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChecksummedAddress(pub Address);

impl FromStr for ChecksummedAddress {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ChecksummedAddress)
    }
}

impl TryFrom<String> for ChecksummedAddress {
    type Error = hex::FromHexError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ChecksummedAddress> for String {
    fn from(value: ChecksummedAddress) -> Self {
        value.0.to_checksum(None)
    }
}

impl fmt::Display for ChecksummedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_checksum(None))
    }
}

impl From<ChecksummedAddress> for Address {
    fn from(value: ChecksummedAddress) -> Self {
        value.0
    }
}

impl From<Address> for ChecksummedAddress {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

/// CAIP-2 namespace of EVM chains.
pub const EIP155_NAMESPACE: &str = "eip155";

/// Numeric EVM chain id, e.g. `56` for BNB Smart Chain.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Eip155ChainReference(u64);

impl Eip155ChainReference {
    pub const fn new(chain_id: u64) -> Self {
        Self(chain_id)
    }

    pub fn inner(&self) -> u64 {
        self.0
    }

    pub fn as_chain_id(&self) -> ChainId {
        ChainId::new(EIP155_NAMESPACE, self.0.to_string())
    }
}

impl From<Eip155ChainReference> for ChainId {
    fn from(value: Eip155ChainReference) -> Self {
        value.as_chain_id()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Eip155ChainReferenceFormatError {
    #[error("Chain {0} is not an eip155 chain")]
    ForeignNamespace(ChainId),
    #[error("Chain reference {0:?} is not a number")]
    NotNumeric(String),
}

impl TryFrom<&ChainId> for Eip155ChainReference {
    type Error = Eip155ChainReferenceFormatError;

    fn try_from(chain_id: &ChainId) -> Result<Self, Self::Error> {
        if chain_id.namespace() != EIP155_NAMESPACE {
            return Err(Eip155ChainReferenceFormatError::ForeignNamespace(
                chain_id.clone(),
            ));
        }
        chain_id
            .reference()
            .parse()
            .map(Eip155ChainReference)
            .map_err(|_| Eip155ChainReferenceFormatError::NotNumeric(chain_id.reference().into()))
    }
}

impl fmt::Display for Eip155ChainReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksummed_address_serde() {
        let addr: ChecksummedAddress =
            serde_json::from_str("\"0x55d398326f99059ff775485246999027b3197955\"").unwrap();
        assert_eq!(
            serde_json::to_string(&addr).unwrap(),
            "\"0x55d398326f99059fF775485246999027B3197955\""
        );
    }

    #[test]
    fn test_checksummed_address_rejects_short() {
        assert!("0x1234".parse::<ChecksummedAddress>().is_err());
        assert!("".parse::<ChecksummedAddress>().is_err());
    }

    #[test]
    fn test_chain_reference_from_chain_id() {
        let bsc = Eip155ChainReference::try_from(&ChainId::new("eip155", "56")).unwrap();
        assert_eq!(bsc.inner(), 56);
        assert_eq!(ChainId::from(bsc).to_string(), "eip155:56");
        assert!(matches!(
            Eip155ChainReference::try_from(&ChainId::new("solana", "56")),
            Err(Eip155ChainReferenceFormatError::ForeignNamespace(_))
        ));
        assert!(matches!(
            Eip155ChainReference::try_from(&ChainId::new("eip155", "abc")),
            Err(Eip155ChainReferenceFormatError::NotNumeric(_))
        ));
    }
}
