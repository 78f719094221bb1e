// NFT multi-transaction fee extrapolation
//
// Transferring many NFTs splits into batches of NFT_BATCH_SIZE messages.
// Only the first batch is emulated; the total blockchain fee is
// extrapolated from it with exact integer ratio math.

/// Extrapolate the total fee of an NFT multi-transfer from the emulated
/// first batch.
///
/// The blockchain fee of the first NFT in a batch is almost twice the fee
/// of the others, so averaging the batch fee underestimates the last
/// incomplete batch. The last batch is therefore counted one NFT larger.
///
/// Reference points (batch of up to 4):
/// 1 NFT  in the batch: 0.002939195 TON
/// 2 NFTs in the batch: 0.004470516 TON
/// 3 NFTs in the batch: 0.006001837 TON
/// 4 NFTs in the batch: 0.007533158 TON
pub fn calculate_nft_transfer_fee(
    total_nft_count: usize,
    estimated_batch_size: usize,
    estimated_batch_fee: u128,
    amount_per_nft: u128,
) -> u128 {
    if total_nft_count == 0 || estimated_batch_size == 0 {
        return 0;
    }

    let full_batch_count = total_nft_count / estimated_batch_size;
    let mut remaining_batch_size = total_nft_count % estimated_batch_size;

    if remaining_batch_size > 0 && remaining_batch_size < estimated_batch_size {
        remaining_batch_size += 1;
    }

    let effective_batches = (full_batch_count * estimated_batch_size + remaining_batch_size) as u128;
    let blockchain_fee = estimated_batch_fee * effective_batches / estimated_batch_size as u128;

    blockchain_fee + total_nft_count as u128 * amount_per_nft
}
