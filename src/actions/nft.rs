// NFT extraction from indexer metadata

use crate::activities::ApiNft;
use crate::address::{normalize_address, Network};
use crate::tokens::{nft_collection_metadata, nft_item_metadata, MetadataMap};

/// Build the display-ready NFT record for an activity.
///
/// Returns `None` when the item was not indexed yet or any address fails to
/// parse; the activity is still shown, just without the NFT preview.
pub fn parse_nft(
    metadata: &MetadataMap,
    network: Network,
    raw_nft_address: &str,
    raw_collection_address: Option<&str>,
    index: Option<&str>,
) -> Option<ApiNft> {
    let item = nft_item_metadata(metadata, raw_nft_address)?;
    let address = normalize_address(raw_nft_address, network).ok()?;

    let collection_address =
        raw_collection_address.and_then(|raw| normalize_address(raw, network).ok());
    let collection_name = raw_collection_address
        .and_then(|raw| nft_collection_metadata(metadata, raw))
        .and_then(|collection| collection.name.clone());

    let extra = item.extra.as_ref();
    // Domain NFTs carry their name in the DNS extra rather than the item name
    let name = extra
        .and_then(|e| e.domain.clone())
        .or_else(|| item.name.clone());
    let is_hidden = extra.and_then(|e| e.render_type.as_deref()) == Some("hidden");

    let image = item.image.clone();
    let thumbnail = extra
        .and_then(|e| e.image_medium.clone())
        .or_else(|| image.clone());

    Some(ApiNft {
        index: index.and_then(|i| i.parse().ok()),
        name,
        address,
        thumbnail,
        image,
        description: item.description.clone(),
        collection_address,
        collection_name,
        is_hidden,
    })
}

/// Staking payout collections produce synthetic NFTs the wallet hides
pub fn is_hidden_collection(metadata: &MetadataMap, raw_collection_address: &str) -> bool {
    nft_collection_metadata(metadata, raw_collection_address)
        .and_then(|collection| collection.name.as_deref())
        .map(|name| name.contains("Withdrawal Payout"))
        .unwrap_or(false)
}
