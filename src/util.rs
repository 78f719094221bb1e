// Shared parsing helpers for indexer payloads
//
// The indexing service serializes amounts and logical times as JSON strings
// (they routinely exceed 2^53), but older snapshots carry plain numbers.
// The serde adapters here accept both.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumOrStr {
    Num(u64),
    Str(String),
}

fn parse_u128(raw: NumOrStr, what: &str) -> Result<u128, String> {
    match raw {
        NumOrStr::Num(n) => Ok(n as u128),
        NumOrStr::Str(s) => s
            .trim()
            .parse::<u128>()
            .map_err(|_| format!("invalid {}: {:?}", what, s)),
    }
}

/// Deserialize an unsigned amount from a JSON string or number
pub mod serde_amount {
    use super::*;
    use serde::de::Error;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let raw = NumOrStr::deserialize(deserializer)?;
        parse_u128(raw, "amount").map_err(D::Error::custom)
    }
}

/// Deserialize an optional unsigned amount (`null` maps to `None`)
pub mod serde_amount_opt {
    use super::*;
    use serde::de::Error;

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<u128>, D::Error> {
        let raw = Option::<NumOrStr>::deserialize(deserializer)?;
        raw.map(|r| parse_u128(r, "amount").map_err(D::Error::custom))
            .transpose()
    }
}

/// Deserialize a logical time from a JSON string or number
pub mod serde_lt {
    use super::*;
    use serde::de::Error;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let raw = NumOrStr::deserialize(deserializer)?;
        match raw {
            NumOrStr::Num(n) => Ok(n),
            NumOrStr::Str(s) => s
                .trim()
                .parse::<u64>()
                .map_err(|_| D::Error::custom(format!("invalid logical time: {:?}", s))),
        }
    }
}

/// Deserialize an optional logical time
pub mod serde_lt_opt {
    use super::*;
    use serde::de::Error;

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<u64>, D::Error> {
        let raw = Option::<NumOrStr>::deserialize(deserializer)?;
        raw.map(|r| match r {
            NumOrStr::Num(n) => Ok(n),
            NumOrStr::Str(s) => s
                .trim()
                .parse::<u64>()
                .map_err(|_| D::Error::custom(format!("invalid logical time: {:?}", s))),
        })
        .transpose()
    }
}

/// Parse a message op code reported as `"0x..."` hex or plain decimal
pub fn parse_opcode(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).ok()
    } else {
        raw.parse::<u32>().ok()
    }
}

/// Magnitude of a signed amount
pub fn bigint_abs(value: i128) -> u128 {
    value.unsigned_abs()
}
