// Address canonicalization for the trace engine
//
// Raw indexer data references accounts in raw `workchain:hex` form while the
// wallet compares everything in user-friendly base64 form. The address book
// supplied with every indexer response is the source of truth for that
// mapping; the codec below re-encodes already-canonical addresses when a
// specific representation (bounceable, testnet) is required.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::{EngineError, EngineResult};

pub mod codec;

pub use codec::TonAddress;

/// Chain selector. Only affects the testnet flag of rendered addresses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

/// One address book entry as reported by the indexer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressBookEntry {
    pub user_friendly: String,
    #[serde(default)]
    pub domain: Option<String>,
}

/// Mapping from raw address strings to their canonical representation.
///
/// Must be pre-populated for every address referenced by the actions being
/// classified; a miss is a caller bug and fails the affected action.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressBook {
    entries: HashMap<String, AddressBookEntry>,
}

impl AddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, raw: impl Into<String>, user_friendly: impl Into<String>) {
        self.entries.insert(
            raw.into(),
            AddressBookEntry { user_friendly: user_friendly.into(), domain: None },
        );
    }

    pub fn insert_with_domain(
        &mut self,
        raw: impl Into<String>,
        user_friendly: impl Into<String>,
        domain: impl Into<String>,
    ) {
        self.entries.insert(
            raw.into(),
            AddressBookEntry {
                user_friendly: user_friendly.into(),
                domain: Some(domain.into()),
            },
        );
    }

    /// Canonical user-friendly form of a raw address
    pub fn canonical(&self, raw: &str) -> EngineResult<&str> {
        self.entries
            .get(raw)
            .map(|entry| entry.user_friendly.as_str())
            .ok_or_else(|| EngineError::UnknownAddress(raw.to_string()))
    }

    /// DNS domain attached to a raw address, when the indexer resolved one
    pub fn domain(&self, raw: &str) -> Option<&str> {
        self.entries.get(raw).and_then(|entry| entry.domain.as_deref())
    }

    pub fn contains(&self, raw: &str) -> bool {
        self.entries.contains_key(raw)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, AddressBookEntry)> for AddressBook {
    fn from_iter<T: IntoIterator<Item = (String, AddressBookEntry)>>(iter: T) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

/// Re-encode any address form as canonical bounceable base64 for the network
pub fn normalize_address(address: &str, network: Network) -> EngineResult<String> {
    let parsed = TonAddress::parse(address)?;
    Ok(parsed.to_base64(true, network))
}
