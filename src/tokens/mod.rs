// Token and NFT metadata as supplied by the indexer, plus asset display
// helpers (slugs and decimal rendering).

use std::collections::HashMap;

use serde::Deserialize;

use crate::constants::TON_DECIMALS;

/// Raw address -> indexed metadata, attached to every actions response
pub type MetadataMap = HashMap<String, MetadataEntry>;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetadataEntry {
    #[serde(default)]
    pub is_indexed: bool,
    #[serde(default)]
    pub token_info: Vec<TokenInfo>,
}

/// One metadata record; the indexer mixes NFT and jetton records in the
/// same list and tags them by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum TokenInfo {
    #[serde(rename = "nft_items")]
    NftItem(NftItemMetadata),
    #[serde(rename = "nft_collections")]
    NftCollection(NftCollectionMetadata),
    #[serde(rename = "jetton_masters")]
    JettonMaster(JettonMasterMetadata),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NftItemMetadata {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub extra: Option<NftExtra>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NftExtra {
    pub render_type: Option<String>,
    pub domain: Option<String>,
    #[serde(rename = "_image_medium")]
    pub image_medium: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NftCollectionMetadata {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JettonMasterMetadata {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub extra: Option<JettonExtra>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JettonExtra {
    pub decimals: Option<String>,
}

/// Find the NFT item record for a raw address, if it was indexed
pub fn nft_item_metadata<'a>(
    metadata: &'a MetadataMap,
    raw_address: &str,
) -> Option<&'a NftItemMetadata> {
    indexed_info(metadata, raw_address)?.iter().find_map(|info| match info {
        TokenInfo::NftItem(item) => Some(item),
        _ => None,
    })
}

/// Find the NFT collection record for a raw address, if it was indexed
pub fn nft_collection_metadata<'a>(
    metadata: &'a MetadataMap,
    raw_address: &str,
) -> Option<&'a NftCollectionMetadata> {
    indexed_info(metadata, raw_address)?.iter().find_map(|info| match info {
        TokenInfo::NftCollection(collection) => Some(collection),
        _ => None,
    })
}

/// Find the jetton master record for a raw address, if it was indexed
pub fn jetton_master_metadata<'a>(
    metadata: &'a MetadataMap,
    raw_address: &str,
) -> Option<&'a JettonMasterMetadata> {
    indexed_info(metadata, raw_address)?.iter().find_map(|info| match info {
        TokenInfo::JettonMaster(master) => Some(master),
        _ => None,
    })
}

fn indexed_info<'a>(metadata: &'a MetadataMap, raw_address: &str) -> Option<&'a [TokenInfo]> {
    let entry = metadata.get(raw_address)?;
    if !entry.is_indexed {
        return None;
    }
    Some(&entry.token_info)
}

/// Decimal count of a jetton; falls back to the native coin's 9
pub fn jetton_decimals(metadata: &MetadataMap, raw_address: &str) -> u8 {
    jetton_master_metadata(metadata, raw_address)
        .and_then(|master| master.extra.as_ref())
        .and_then(|extra| extra.decimals.as_deref())
        .and_then(|decimals| decimals.parse::<u8>().ok())
        .unwrap_or(TON_DECIMALS)
}

/// Build the stable display slug of an asset from its minter address
pub fn build_token_slug(chain: &str, address: &str) -> String {
    let address_part: String = address
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(10)
        .collect();
    format!("{}-{}", chain, address_part).to_lowercase()
}

/// Render a minimal-unit amount as a decimal string
pub fn to_decimal(amount: u128, decimals: u8) -> String {
    let divisor = 10u128.pow(decimals as u32);
    let whole = amount / divisor;
    let fraction = amount % divisor;
    if fraction == 0 {
        return whole.to_string();
    }
    let fraction = format!("{:0width$}", fraction, width = decimals as usize);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}
