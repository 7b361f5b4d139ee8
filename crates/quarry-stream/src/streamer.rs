//! The chunk lifecycle manager.
//!
//! A chunk moves through `Queued → Loading → Ready → Active` and back out on
//! eviction. Queued, Loading and Ready are tracked together as the pending
//! set so a coordinate is never requested twice; Active chunks live in the
//! active map. Both are touched only by the thread that owns the streamer.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::Receiver;
use quarry_terrain::TerrainGenerator;
use quarry_voxel::ChunkCoord;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, error, info, warn};

use crate::chunk::Chunk;
use crate::error::StreamError;
use crate::region_cache::RegionCache;
use crate::renderer::ChunkRenderer;
use crate::work_queue::WorkQueue;
use crate::worker::{Completion, Worker};

/// Where the streamer keeps its region files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamerConfig {
    /// Directory holding the region files. Created on start if missing.
    pub world_dir: PathBuf,
    /// File extension of region files.
    pub region_extension: String,
}

impl Default for StreamerConfig {
    fn default() -> Self {
        Self {
            world_dir: PathBuf::from("world"),
            region_extension: "mca".to_string(),
        }
    }
}

/// A resident chunk and its uploaded mesh.
pub struct ActiveChunk<H> {
    chunk: Chunk,
    handle: H,
}

impl<H> ActiveChunk<H> {
    /// The chunk's voxels and CPU-side geometry.
    pub fn chunk(&self) -> &Chunk {
        &self.chunk
    }

    /// The renderer's handle for the uploaded mesh.
    pub fn handle(&self) -> &H {
        &self.handle
    }
}

/// What one [`ChunkStreamer::ensure_present`] call changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EnsureReport {
    /// Load requests placed on the work queue.
    pub enqueued: usize,
    /// Active chunks saved and released.
    pub evicted: usize,
}

/// What one [`ChunkStreamer::drain_ready`] call consumed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Chunks uploaded and made active.
    pub uploaded: usize,
    /// Completions that carried a load failure.
    pub failed: usize,
}

/// Keeps the chunks around a focal point loaded, uploaded and persisted.
///
/// `H` is the renderer's mesh handle type. The streamer owns one background
/// worker thread; dropping the streamer stops and joins it, but only
/// [`evict_all`](Self::evict_all) persists the active chunks.
pub struct ChunkStreamer<H> {
    active: FxHashMap<ChunkCoord, ActiveChunk<H>>,
    pending: FxHashSet<ChunkCoord>,
    /// Chunks whose load failed; not requested again until they leave the radius.
    failed: FxHashSet<ChunkCoord>,
    regions: Arc<RegionCache>,
    work: Arc<WorkQueue>,
    ready: Receiver<Completion>,
    worker: Option<JoinHandle<()>>,
}

impl<H> ChunkStreamer<H> {
    /// Creates the world directory and starts the worker thread.
    ///
    /// Without a terrain generator, chunks absent from disk come up as air.
    pub fn new(
        config: StreamerConfig,
        terrain: Option<Arc<dyn TerrainGenerator>>,
    ) -> Result<Self, StreamError> {
        std::fs::create_dir_all(&config.world_dir).map_err(|source| {
            StreamError::WorldDirectory {
                path: config.world_dir.clone(),
                source,
            }
        })?;

        let regions = Arc::new(RegionCache::new(
            config.world_dir,
            config.region_extension,
        ));
        let work = Arc::new(WorkQueue::new());
        let (ready_tx, ready_rx) = crossbeam_channel::unbounded();
        let generator = terrain.is_some();

        let worker = Worker {
            work: Arc::clone(&work),
            regions: Arc::clone(&regions),
            terrain,
            ready: ready_tx,
        }
        .spawn()
        .map_err(StreamError::Spawn)?;

        info!(
            world = %regions.world_dir().display(),
            generator,
            "Chunk streamer started"
        );

        Ok(Self {
            active: FxHashMap::default(),
            pending: FxHashSet::default(),
            failed: FxHashSet::default(),
            regions,
            work,
            ready: ready_rx,
            worker: Some(worker),
        })
    }

    /// Requests every chunk within the square `radius` of `center` and evicts
    /// active chunks outside it.
    ///
    /// Requests go out nearest first. Eviction stops at the first chunk that
    /// fails to save; that chunk stays active.
    pub fn ensure_present<R>(
        &mut self,
        center: ChunkCoord,
        radius: u32,
        renderer: &mut R,
    ) -> Result<EnsureReport, StreamError>
    where
        R: ChunkRenderer<Handle = H>,
    {
        if self.worker.is_none() {
            return Err(StreamError::Stopped);
        }
        let mut report = EnsureReport::default();
        self.failed
            .retain(|coord| coord.square_distance(center) <= radius);

        // Clipped to the i32 grid; coordinates past its edge do not exist.
        let r = i32::try_from(radius).unwrap_or(i32::MAX);
        let xs = center.x.saturating_sub(r)..=center.x.saturating_add(r);
        let zs = center.z.saturating_sub(r)..=center.z.saturating_add(r);
        let mut wanted: Vec<ChunkCoord> = zs
            .flat_map(|z| xs.clone().map(move |x| ChunkCoord::new(x, z)))
            .filter(|coord| {
                !self.active.contains_key(coord)
                    && !self.pending.contains(coord)
                    && !self.failed.contains(coord)
            })
            .collect();
        wanted.sort_by_key(|coord| coord.square_distance(center));

        for coord in wanted {
            self.pending.insert(coord);
            self.work.push(coord);
            report.enqueued += 1;
        }

        let outside: Vec<ChunkCoord> = self
            .active
            .keys()
            .copied()
            .filter(|coord| coord.square_distance(center) > radius)
            .collect();
        for coord in outside {
            if self.evict(coord, renderer)? {
                report.evicted += 1;
            }
        }

        if report != EnsureReport::default() {
            debug!(
                center = ?center,
                radius,
                enqueued = report.enqueued,
                evicted = report.evicted,
                pending = self.pending.len(),
                queued = self.work.len(),
                "Updated streaming radius"
            );
        }
        Ok(report)
    }

    /// Uploads up to `max` finished chunks and makes them active.
    ///
    /// Failed loads count against `max` too. Never blocks.
    pub fn drain_ready<R>(&mut self, max: usize, renderer: &mut R) -> DrainReport
    where
        R: ChunkRenderer<Handle = H>,
    {
        let mut report = DrainReport::default();
        for _ in 0..max {
            let Ok(Completion { coord, result }) = self.ready.try_recv() else {
                break;
            };
            self.pending.remove(&coord);

            match result {
                Ok(mut chunk) => {
                    let handle = renderer.upload(coord, chunk.ensure_geometry());
                    if let Some(stale) = self.active.insert(coord, ActiveChunk { chunk, handle }) {
                        renderer.release(stale.handle);
                    }
                    report.uploaded += 1;
                }
                Err(e) => {
                    warn!(?coord, error = %e, "Skipping chunk until it leaves the radius");
                    self.failed.insert(coord);
                    report.failed += 1;
                }
            }
        }
        report
    }

    /// Saves an active chunk, releases its mesh and drops it.
    ///
    /// Returns `Ok(false)` if `coord` is not active. On a save failure the
    /// chunk stays active with its mesh intact.
    pub fn evict<R>(&mut self, coord: ChunkCoord, renderer: &mut R) -> Result<bool, StreamError>
    where
        R: ChunkRenderer<Handle = H>,
    {
        let Some(active) = self.active.get(&coord) else {
            return Ok(false);
        };
        self.persist(&active.chunk)?;

        if let Some(ActiveChunk { mut chunk, handle }) = self.active.remove(&coord) {
            renderer.release(handle);
            chunk.clear_geometry();
        }
        debug!(?coord, "Evicted chunk");
        Ok(true)
    }

    /// Evicts every active chunk, attempting all of them even if some fail.
    ///
    /// Returns how many were evicted, or the first save error.
    pub fn evict_all<R>(&mut self, renderer: &mut R) -> Result<usize, StreamError>
    where
        R: ChunkRenderer<Handle = H>,
    {
        let coords: Vec<ChunkCoord> = self.active.keys().copied().collect();
        let mut evicted = 0;
        let mut first_error = None;
        for coord in coords {
            match self.evict(coord, renderer) {
                Ok(true) => evicted += 1,
                Ok(false) => {}
                Err(e) => {
                    error!(?coord, error = %e, "Failed to persist chunk");
                    first_error.get_or_insert(e);
                }
            }
        }
        if let Err(e) = self.regions.sync_all() {
            warn!(error = %e, "Failed to flush region files");
        }
        info!(evicted, remaining = self.active.len(), "Persisted active chunks");
        match first_error {
            Some(e) => Err(e),
            None => Ok(evicted),
        }
    }

    /// Rebuilds and re-uploads the mesh of an active chunk after its voxels
    /// were edited through [`get_mut`](Self::get_mut).
    pub fn remesh<R>(&mut self, coord: ChunkCoord, renderer: &mut R) -> bool
    where
        R: ChunkRenderer<Handle = H>,
    {
        let Some(active) = self.active.get_mut(&coord) else {
            return false;
        };
        let handle = renderer.upload(coord, active.chunk.build_geometry());
        let stale = std::mem::replace(&mut active.handle, handle);
        renderer.release(stale);
        true
    }

    /// Draws every active chunk.
    pub fn draw_active<R>(&self, renderer: &mut R)
    where
        R: ChunkRenderer<Handle = H>,
    {
        for active in self.active.values() {
            renderer.draw(&active.handle);
        }
    }

    /// Active chunks in arbitrary order.
    pub fn active_chunks(&self) -> impl Iterator<Item = &ActiveChunk<H>> {
        self.active.values()
    }

    /// The active chunk at `coord`, if it has been uploaded.
    pub fn get(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.active.get(&coord).map(|active| &active.chunk)
    }

    /// Mutable access to an active chunk's voxels. Edits are saved on eviction.
    pub fn get_mut(&mut self, coord: ChunkCoord) -> Option<&mut Chunk> {
        self.active.get_mut(&coord).map(|active| &mut active.chunk)
    }

    /// Whether `coord` is resident and renderable.
    pub fn is_active(&self, coord: ChunkCoord) -> bool {
        self.active.contains_key(&coord)
    }

    /// Whether `coord` is queued, loading, or waiting to be drained.
    pub fn is_pending(&self, coord: ChunkCoord) -> bool {
        self.pending.contains(&coord)
    }

    /// Number of active chunks.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Number of chunks requested but not yet drained.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// The open region files.
    pub fn regions(&self) -> &RegionCache {
        &self.regions
    }

    /// Stops the worker and waits for it to exit.
    ///
    /// An in-flight load finishes first; queued requests are dropped. Active
    /// chunks are left in place for [`evict_all`](Self::evict_all).
    pub fn shutdown(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        self.work.stop();
        if worker.join().is_err() {
            error!("Chunk worker panicked");
        }
        self.pending.clear();
        info!(active = self.active.len(), "Chunk streamer shut down");
    }

    fn persist(&self, chunk: &Chunk) -> Result<(), StreamError> {
        let coord = chunk.coord();
        let storage = |source| StreamError::Storage { coord, source };
        let region = self.regions.region_for(coord).map_err(storage)?;
        region.save_chunk(coord, chunk.grid()).map_err(storage)?;
        Ok(())
    }
}

impl<H> Drop for ChunkStreamer<H> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
