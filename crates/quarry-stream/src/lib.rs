//! Chunk lifecycle management: background loading and generation with
//! main-thread upload.
//!
//! A [`ChunkStreamer`] keeps the chunks around a focal point resident. Missing
//! chunks are queued for a single background worker, which reads them from
//! their region file (or asks the terrain generator for fresh content) and
//! builds CPU-side geometry. The main thread drains a bounded number of
//! finished chunks per call and hands them to a [`ChunkRenderer`] for upload.
//! Chunks that leave the radius are saved back to disk and released.

mod chunk;
mod error;
mod region_cache;
mod renderer;
mod streamer;
mod work_queue;
mod worker;

pub use chunk::Chunk;
pub use error::StreamError;
pub use region_cache::RegionCache;
pub use renderer::ChunkRenderer;
pub use streamer::{ActiveChunk, ChunkStreamer, DrainReport, EnsureReport, StreamerConfig};
pub use work_queue::WorkQueue;
pub use worker::WORKER_THREAD_NAME;
