//! Chunk streaming error types.

use std::path::PathBuf;

use quarry_region::RegionError;
use quarry_voxel::ChunkCoord;

/// Errors raised by [`ChunkStreamer`](crate::ChunkStreamer).
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The world directory could not be created.
    #[error("world directory {} unavailable: {source}", .path.display())]
    WorldDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading or writing a chunk through its region file failed.
    #[error("storage for chunk ({}, {}) failed: {source}", .coord.x, .coord.z)]
    Storage {
        coord: ChunkCoord,
        #[source]
        source: RegionError,
    },

    /// The background worker thread could not be started.
    #[error("failed to spawn chunk worker: {0}")]
    Spawn(#[source] std::io::Error),

    /// The streamer was shut down and no longer accepts load requests.
    #[error("chunk streamer has been shut down")]
    Stopped,
}
