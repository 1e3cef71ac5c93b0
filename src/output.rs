//! Tracked wallet outputs as seen by this crate
//!
//! Outputs are owned by the storage layer; this crate only reads them.

use bitcoin::OutPoint;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnspentOutput {
    pub outpoint: OutPoint,
    /// Value in the smallest unit
    pub value: u64,
    #[serde(default)]
    pub address: Option<String>,
    /// Height of the block containing the output; `None` while unconfirmed
    #[serde(default)]
    pub block_height: Option<u32>,
    /// Height the output stays locked through; `None` if not time-locked
    #[serde(default)]
    pub unlocked_height: Option<u32>,
    #[serde(default, with = "hex_tag")]
    pub reserve_tag: Option<Vec<u8>>,
}

impl UnspentOutput {
    pub fn new(outpoint: OutPoint, value: u64) -> Self {
        Self {
            outpoint,
            value,
            address: None,
            block_height: None,
            unlocked_height: None,
            reserve_tag: None,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn mined_at(mut self, height: u32) -> Self {
        self.block_height = Some(height);
        self
    }

    pub fn locked_until(mut self, height: u32) -> Self {
        self.unlocked_height = Some(height);
        self
    }

    pub fn with_reserve_tag(mut self, tag: impl Into<Vec<u8>>) -> Self {
        self.reserve_tag = Some(tag.into());
        self
    }

    pub fn reserve_tag(&self) -> Option<&[u8]> {
        self.reserve_tag.as_deref()
    }
}

/// Reserve tags are stored as hex strings in JSON snapshots
mod hex_tag {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(tag: &Option<Vec<u8>>, s: S) -> Result<S::Ok, S::Error> {
        match tag {
            Some(bytes) => s.serialize_some(&hex::encode(bytes)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded: Option<String> = Option::deserialize(d)?;
        encoded
            .map(|s| hex::decode(s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
