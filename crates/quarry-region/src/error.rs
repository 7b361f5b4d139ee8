//! Region storage error types.

use std::path::PathBuf;

/// Errors raised by [`RegionFile`](crate::RegionFile) operations.
#[derive(Debug, thiserror::Error)]
pub enum RegionError {
    /// The region file could not be created or opened.
    #[error("region file {} unavailable: {source}", .path.display())]
    Unavailable {
        /// Path of the region file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The file exists but is too small to hold the header tables.
    #[error("region file {} is {len} bytes, smaller than its header", .path.display())]
    InvalidFile {
        /// Path of the region file.
        path: PathBuf,
        /// Actual file length.
        len: u64,
    },

    /// A read or write failed after the file was opened.
    #[error("region i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// The encoded chunk needs more sectors than a location entry can describe.
    #[error("chunk payload needs {sectors} sectors, more than a location entry can address")]
    ChunkTooLarge {
        /// Sectors required.
        sectors: usize,
    },

    /// The allocation would start past the largest addressable sector.
    #[error("region file is full: sector offset {offset} does not fit in 24 bits")]
    RegionFull {
        /// Offset that could not be encoded.
        offset: u32,
    },
}

impl RegionError {
    /// `true` when the region as a whole cannot be used (create/open/validation failures).
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::InvalidFile { .. })
    }
}
