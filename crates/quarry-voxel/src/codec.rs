//! Compressed chunk payload codec.
//!
//! ## Binary Layout
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 4 | Compressed length `L` (`u32`, big-endian) |
//! | 4 | L | LZ4 block of the raw grid bytes |
//!
//! The raw grid is [`CHUNK_VOLUME`] bytes, one [`BlockType`] discriminant per
//! voxel in [`VoxelGrid`] storage order. Anything after `4 + L` (sector
//! padding written by region storage) is ignored on decode.

use lz4_flex::block::{compress, decompress_into};

use crate::block::BlockType;
use crate::grid::{CHUNK_VOLUME, VoxelGrid};

/// Size of the big-endian length prefix.
const LENGTH_PREFIX: usize = 4;

/// Errors produced while decoding a chunk payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// Fewer bytes than the length prefix.
    #[error("payload truncated: {len} bytes cannot hold the length prefix")]
    Truncated {
        /// Bytes received.
        len: usize,
    },
    /// The length prefix claims more bytes than the payload holds.
    #[error("declared compressed length {declared} exceeds {available} available bytes")]
    LengthOverrun {
        /// Length read from the prefix.
        declared: usize,
        /// Bytes remaining after the prefix.
        available: usize,
    },
    /// The LZ4 block could not be decompressed.
    #[error("decompression failed: {0}")]
    Decompress(String),
    /// Decompression produced the wrong number of voxels.
    #[error("decompressed {actual} bytes, expected {expected}")]
    SizeMismatch {
        /// Bytes expected (`CHUNK_VOLUME`).
        expected: usize,
        /// Bytes produced.
        actual: usize,
    },
    /// A voxel byte is not a known block type.
    #[error("unknown block value {value} at voxel index {index}")]
    UnknownBlock {
        /// The offending byte.
        value: u8,
        /// Its position in storage order.
        index: usize,
    },
}

impl CodecError {
    /// `true` for framing errors (the payload is not a chunk at all),
    /// `false` for corruption inside an otherwise well-framed payload.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Truncated { .. } | Self::LengthOverrun { .. })
    }
}

/// Encodes a grid into `[u32 BE compressed length][LZ4 block]`.
pub fn encode(grid: &VoxelGrid) -> Vec<u8> {
    let raw: Vec<u8> = grid.blocks().iter().map(|b| b.to_u8()).collect();
    let compressed = compress(&raw);

    let mut buf = Vec::with_capacity(LENGTH_PREFIX + compressed.len());
    buf.extend_from_slice(&(compressed.len() as u32).to_be_bytes());
    buf.extend_from_slice(&compressed);
    buf
}

/// Decodes a payload produced by [`encode`], ignoring trailing padding.
pub fn decode(data: &[u8]) -> Result<VoxelGrid, CodecError> {
    if data.len() < LENGTH_PREFIX {
        return Err(CodecError::Truncated { len: data.len() });
    }
    let declared = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
    let body = &data[LENGTH_PREFIX..];
    if declared > body.len() {
        return Err(CodecError::LengthOverrun {
            declared,
            available: body.len(),
        });
    }

    let mut raw = vec![0u8; CHUNK_VOLUME];
    let written = decompress_into(&body[..declared], &mut raw)
        .map_err(|e| CodecError::Decompress(e.to_string()))?;
    if written != CHUNK_VOLUME {
        return Err(CodecError::SizeMismatch {
            expected: CHUNK_VOLUME,
            actual: written,
        });
    }

    let blocks = raw
        .iter()
        .enumerate()
        .map(|(index, &value)| {
            BlockType::from_u8(value).ok_or(CodecError::UnknownBlock { value, index })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(VoxelGrid::from_blocks(blocks))
}
