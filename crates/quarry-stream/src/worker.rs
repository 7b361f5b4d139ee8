//! Background worker: turns load requests into finished chunks.

use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::Sender;
use quarry_terrain::TerrainGenerator;
use quarry_voxel::{ChunkCoord, VoxelGrid, codec};
use tracing::{debug, error, warn};

use crate::chunk::Chunk;
use crate::error::StreamError;
use crate::region_cache::RegionCache;
use crate::work_queue::WorkQueue;

/// Name of the background loading thread, as shown in logs.
pub const WORKER_THREAD_NAME: &str = "chunk-stream-worker";

/// Outcome of one load request, sent back to the main thread.
pub(crate) struct Completion {
    pub coord: ChunkCoord,
    pub result: Result<Chunk, StreamError>,
}

pub(crate) struct Worker {
    pub work: Arc<WorkQueue>,
    pub regions: Arc<RegionCache>,
    pub terrain: Option<Arc<dyn TerrainGenerator>>,
    pub ready: Sender<Completion>,
}

impl Worker {
    pub(crate) fn spawn(self) -> io::Result<JoinHandle<()>> {
        std::thread::Builder::new()
            .name(WORKER_THREAD_NAME.into())
            .spawn(move || self.run())
    }

    fn run(self) {
        debug!("Chunk worker started");
        while let Some(coord) = self.work.next() {
            let result = self.load(coord);
            if let Err(e) = &result {
                error!(?coord, error = %e, "Chunk load failed");
            }
            if self.ready.send(Completion { coord, result }).is_err() {
                break;
            }
        }
        debug!("Chunk worker stopped");
    }

    /// Reads the chunk from its region file, falling back to generation when
    /// it is absent or unreadable, and builds its geometry.
    ///
    /// Never touches the renderer.
    pub(crate) fn load(&self, coord: ChunkCoord) -> Result<Chunk, StreamError> {
        let storage = |source| StreamError::Storage { coord, source };
        let region = self.regions.region_for(coord).map_err(storage)?;

        let grid = match region.load_chunk(coord).map_err(storage)? {
            Some(bytes) => match codec::decode(&bytes) {
                Ok(grid) => {
                    debug!(?coord, "Decoded stored chunk");
                    grid
                }
                Err(e) => {
                    warn!(
                        ?coord,
                        error = %e,
                        malformed = e.is_malformed(),
                        "Stored chunk is unreadable; regenerating"
                    );
                    self.populate(coord)
                }
            },
            None => self.populate(coord),
        };

        let mut chunk = Chunk::new(coord, grid);
        chunk.build_geometry();
        Ok(chunk)
    }

    fn populate(&self, coord: ChunkCoord) -> VoxelGrid {
        match &self.terrain {
            Some(terrain) => terrain.populate(coord),
            None => VoxelGrid::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Seek, SeekFrom, Write};

    use quarry_region::{HEADER_BYTES, RegionFile};
    use quarry_terrain::FlatTerrain;
    use quarry_voxel::BlockType;

    fn worker(dir: &std::path::Path, terrain: Option<Arc<dyn TerrainGenerator>>) -> Worker {
        let (ready, _) = crossbeam_channel::unbounded();
        Worker {
            work: Arc::new(WorkQueue::new()),
            regions: Arc::new(RegionCache::new(dir, "mca")),
            terrain,
            ready,
        }
    }

    #[test]
    fn test_absent_chunk_is_generated() {
        let dir = tempfile::tempdir().unwrap();
        let terrain: Arc<dyn TerrainGenerator> = Arc::new(FlatTerrain::new(8));
        let chunk = worker(dir.path(), Some(terrain)).load(ChunkCoord::new(3, 3)).unwrap();

        assert_eq!(chunk.coord(), ChunkCoord::new(3, 3));
        assert_eq!(chunk.block(0, 7, 0).unwrap(), BlockType::Grass);
        assert!(chunk.has_geometry(), "geometry is built off the main thread");
    }

    #[test]
    fn test_absent_chunk_without_generator_is_air() {
        let dir = tempfile::tempdir().unwrap();
        let chunk = worker(dir.path(), None).load(ChunkCoord::new(0, 0)).unwrap();
        assert_eq!(chunk.grid().non_air_count(), 0);
        assert!(chunk.geometry().is_some_and(|g| g.is_empty()));
    }

    #[test]
    fn test_stored_chunk_wins_over_generator() {
        let dir = tempfile::tempdir().unwrap();
        let coord = ChunkCoord::new(-5, 2);
        RegionFile::open(&dir.path().join("r.-1.0.mca"))
            .unwrap()
            .save_chunk(coord, &VoxelGrid::filled(BlockType::Sand))
            .unwrap();

        let terrain: Arc<dyn TerrainGenerator> = Arc::new(FlatTerrain::default());
        let chunk = worker(dir.path(), Some(terrain)).load(coord).unwrap();
        assert_eq!(chunk.grid(), &VoxelGrid::filled(BlockType::Sand));
    }

    #[test]
    fn test_corrupt_payload_is_regenerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("r.0.0.mca");
        let coord = ChunkCoord::new(0, 0);
        RegionFile::open(&path)
            .unwrap()
            .save_chunk(coord, &VoxelGrid::filled(BlockType::Lava))
            .unwrap();

        // Declared length 16, followed by bytes that are not a valid LZ4 block.
        let mut file = std::fs::OpenOptions::new().write(true).open(&path).unwrap();
        file.seek(SeekFrom::Start(HEADER_BYTES as u64)).unwrap();
        file.write_all(&[0, 0, 0, 16]).unwrap();
        file.write_all(&[0xF0; 16]).unwrap();
        drop(file);

        let terrain: Arc<dyn TerrainGenerator> = Arc::new(FlatTerrain::new(4));
        let chunk = worker(dir.path(), Some(terrain)).load(coord).unwrap();
        assert_eq!(chunk.grid(), &FlatTerrain::new(4).populate(coord));
    }

    #[test]
    fn test_malformed_payload_is_regenerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("r.0.0.mca");
        let coord = ChunkCoord::new(1, 0);
        RegionFile::open(&path)
            .unwrap()
            .save_chunk(coord, &VoxelGrid::filled(BlockType::Lava))
            .unwrap();

        // Declares more bytes than the single sector holds.
        let mut file = std::fs::OpenOptions::new().write(true).open(&path).unwrap();
        file.seek(SeekFrom::Start(HEADER_BYTES as u64)).unwrap();
        file.write_all(&u32::MAX.to_be_bytes()).unwrap();
        drop(file);

        let chunk = worker(dir.path(), None).load(coord).unwrap();
        assert_eq!(chunk.grid().non_air_count(), 0);
    }

    #[test]
    fn test_unavailable_region_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("r.0.0.mca")).unwrap();

        let err = worker(dir.path(), None)
            .load(ChunkCoord::new(0, 0))
            .err()
            .expect("a directory is not a region file");
        assert!(
            matches!(&err, StreamError::Storage { source, .. } if source.is_unavailable()),
            "got {err:?}"
        );
    }
}
