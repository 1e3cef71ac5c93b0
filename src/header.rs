//! Fixed-layout block header codec
//!
//! Checkpoint records use the 80-byte consensus header followed by the
//! block height and the header hash:
//!
//! | field         | bytes | encoding          |
//! |---------------|-------|-------------------|
//! | version       | 4     | i32 little-endian |
//! | previous hash | 32    | raw               |
//! | merkle root   | 32    | raw               |
//! | timestamp     | 4     | u32 little-endian |
//! | bits          | 4     | u32 little-endian |
//! | nonce         | 4     | u32 little-endian |
//! | height        | 4     | u32 little-endian |
//! | header hash   | 32    | raw               |
//!
//! The header hash is taken from the stream as-is. Decoding never checks
//! proof-of-work or linkage to a previous block.

use bitcoin::block::Version;
use bitcoin::hashes::Hash;
use bitcoin::{BlockHash, CompactTarget, TxMerkleNode};

use crate::error::HeaderError;

/// Length of the consensus part of a header
pub const HEADER_LEN: usize = 80;

/// Length of a checkpoint record (header + height + hash)
pub const CHECKPOINT_RECORD_LEN: usize = HEADER_LEN + 4 + 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockHeader {
    pub version: Version,
    pub previous_hash: BlockHash,
    pub merkle_root: TxMerkleNode,
    /// Seconds since the Unix epoch
    pub timestamp: u32,
    pub bits: CompactTarget,
    pub nonce: u32,
    /// Supplied by the checkpoint data, not recomputed
    pub header_hash: BlockHash,
}

/// A header anchored at a known height
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Block {
    pub header: BlockHeader,
    pub height: u32,
}

impl Block {
    pub fn hash(&self) -> BlockHash {
        self.header.header_hash
    }

    /// Decode one checkpoint record from the front of `bytes`
    ///
    /// Returns the block and the number of bytes consumed. Trailing bytes
    /// are left for the caller to judge.
    pub fn decode(bytes: &[u8]) -> Result<(Self, usize), HeaderError> {
        let mut reader = HeaderReader::new(bytes);

        let version = Version::from_consensus(reader.read_i32("version")?);
        let previous_hash = BlockHash::from_byte_array(reader.read_array("previous_hash")?);
        let merkle_root = TxMerkleNode::from_byte_array(reader.read_array("merkle_root")?);
        let timestamp = reader.read_u32("timestamp")?;
        let bits = CompactTarget::from_consensus(reader.read_u32("bits")?);
        let nonce = reader.read_u32("nonce")?;
        let height = reader.read_u32("height")?;
        let header_hash = BlockHash::from_byte_array(reader.read_array("header_hash")?);

        let block = Block {
            header: BlockHeader {
                version,
                previous_hash,
                merkle_root,
                timestamp,
                bits,
                nonce,
                header_hash,
            },
            height,
        };
        Ok((block, reader.position()))
    }

    /// Inverse of [`Block::decode`]
    ///
    /// Production code never writes checkpoint records; this exists so test
    /// harnesses and tooling can build fixtures.
    pub fn encode(&self) -> Vec<u8> {
        let header = &self.header;
        let mut out = Vec::with_capacity(CHECKPOINT_RECORD_LEN);
        out.extend_from_slice(&header.version.to_consensus().to_le_bytes());
        out.extend_from_slice(&header.previous_hash.to_byte_array());
        out.extend_from_slice(&header.merkle_root.to_byte_array());
        out.extend_from_slice(&header.timestamp.to_le_bytes());
        out.extend_from_slice(&header.bits.to_consensus().to_le_bytes());
        out.extend_from_slice(&header.nonce.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        out.extend_from_slice(&header.header_hash.to_byte_array());
        out
    }
}

/// Bounds-checked little-endian cursor over a header byte stream
struct HeaderReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> HeaderReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn read_array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], HeaderError> {
        let remaining = self.bytes.len() - self.pos;
        if remaining < N {
            return Err(HeaderError::MalformedHeader {
                field,
                needed: N,
                remaining,
            });
        }
        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }

    fn read_u32(&mut self, field: &'static str) -> Result<u32, HeaderError> {
        self.read_array::<4>(field).map(u32::from_le_bytes)
    }

    fn read_i32(&mut self, field: &'static str) -> Result<i32, HeaderError> {
        self.read_array::<4>(field).map(i32::from_le_bytes)
    }
}
