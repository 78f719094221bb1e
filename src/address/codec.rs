// TON address codec
//
// Two wire forms exist: raw `workchain:hex` and user-friendly base64
// (36 bytes: tag, workchain, 32-byte account hash, CRC-16/XMODEM). The tag
// is 0x11 for bounceable, 0x51 for non-bounceable, with 0x80 OR-ed in for
// testnet-only addresses.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use crc::{Crc, CRC_16_XMODEM};

use super::Network;
use crate::errors::{EngineError, EngineResult};

const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

const TAG_BOUNCEABLE: u8 = 0x11;
const TAG_NON_BOUNCEABLE: u8 = 0x51;
const TAG_TEST_ONLY: u8 = 0x80;

/// A parsed account address: workchain plus 32-byte account hash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TonAddress {
    pub workchain: i8,
    pub hash: [u8; 32],
}

impl TonAddress {
    /// Parse either the raw `workchain:hex` form or the user-friendly
    /// base64 form.
    pub fn parse(address: &str) -> EngineResult<Self> {
        if address.contains(':') {
            Self::parse_raw(address)
        } else {
            Self::parse_base64(address)
        }
    }

    fn parse_raw(address: &str) -> EngineResult<Self> {
        let (workchain_part, hash_part) = address
            .split_once(':')
            .ok_or_else(|| EngineError::InvalidAddress(address.to_string()))?;

        let workchain: i32 = workchain_part
            .parse()
            .map_err(|_| EngineError::InvalidAddress(address.to_string()))?;
        if workchain < i8::MIN as i32 || workchain > i8::MAX as i32 {
            return Err(EngineError::InvalidAddress(address.to_string()));
        }

        let bytes = hex::decode(hash_part)
            .map_err(|_| EngineError::InvalidAddress(address.to_string()))?;
        let hash: [u8; 32] = bytes
            .try_into()
            .map_err(|_| EngineError::InvalidAddress(address.to_string()))?;

        Ok(Self { workchain: workchain as i8, hash })
    }

    fn parse_base64(address: &str) -> EngineResult<Self> {
        // Both the standard and the url-safe alphabet occur in the wild
        let normalized = address.replace('+', "-").replace('/', "_");
        let normalized = normalized.trim_end_matches('=');

        let data = URL_SAFE_NO_PAD
            .decode(normalized)
            .map_err(|_| EngineError::InvalidAddress(address.to_string()))?;
        if data.len() != 36 {
            return Err(EngineError::InvalidAddress(address.to_string()));
        }

        let checksum = ((data[34] as u16) << 8) | data[35] as u16;
        if checksum != CRC16.checksum(&data[..34]) {
            return Err(EngineError::InvalidAddress(address.to_string()));
        }

        let tag = data[0] & !TAG_TEST_ONLY;
        if tag != TAG_BOUNCEABLE && tag != TAG_NON_BOUNCEABLE {
            return Err(EngineError::InvalidAddress(address.to_string()));
        }

        let mut hash = [0u8; 32];
        hash.copy_from_slice(&data[2..34]);

        Ok(Self { workchain: data[1] as i8, hash })
    }

    /// Render the canonical user-friendly base64 form
    pub fn to_base64(&self, bounceable: bool, network: Network) -> String {
        let mut tag = if bounceable { TAG_BOUNCEABLE } else { TAG_NON_BOUNCEABLE };
        if network == Network::Testnet {
            tag |= TAG_TEST_ONLY;
        }

        let mut data = Vec::with_capacity(36);
        data.push(tag);
        data.push(self.workchain as u8);
        data.extend_from_slice(&self.hash);

        let checksum = CRC16.checksum(&data);
        data.push((checksum >> 8) as u8);
        data.push((checksum & 0xff) as u8);

        URL_SAFE_NO_PAD.encode(data)
    }

    /// Render the raw `workchain:hex` form
    pub fn to_raw_string(&self) -> String {
        format!("{}:{}", self.workchain, hex::encode_upper(self.hash))
    }
}
