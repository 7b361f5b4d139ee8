//! Open region files, shared by the main thread and the worker.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use quarry_region::{RegionError, RegionFile, region_file_name};
use quarry_voxel::{ChunkCoord, RegionCoord};
use rustc_hash::FxHashMap;

/// Lazily opens one [`RegionFile`] per region under a world directory.
pub struct RegionCache {
    world_dir: PathBuf,
    extension: String,
    regions: Mutex<FxHashMap<RegionCoord, Arc<RegionFile>>>,
}

impl RegionCache {
    pub fn new(world_dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            world_dir: world_dir.into(),
            extension: extension.into(),
            regions: Mutex::new(FxHashMap::default()),
        }
    }

    /// Returns the region file holding `coord`, opening or creating it on first use.
    ///
    /// Failed opens are not cached.
    pub fn region_for(&self, coord: ChunkCoord) -> Result<Arc<RegionFile>, RegionError> {
        let region = coord.region();
        let mut regions = self.lock();
        if let Some(file) = regions.get(&region) {
            return Ok(Arc::clone(file));
        }
        let file = Arc::new(RegionFile::open(&self.region_path(region))?);
        regions.insert(region, Arc::clone(&file));
        Ok(file)
    }

    /// Path of the file backing `region`.
    pub fn region_path(&self, region: RegionCoord) -> PathBuf {
        self.world_dir.join(region_file_name(region, &self.extension))
    }

    pub fn world_dir(&self) -> &Path {
        &self.world_dir
    }

    /// Number of region files currently open.
    pub fn open_count(&self) -> usize {
        self.lock().len()
    }

    /// Flushes every open region file to disk.
    pub fn sync_all(&self) -> Result<(), RegionError> {
        let files: Vec<Arc<RegionFile>> = self.lock().values().cloned().collect();
        for file in files {
            file.sync()?;
        }
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, FxHashMap<RegionCoord, Arc<RegionFile>>> {
        self.regions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunks_in_one_region_share_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let cache = RegionCache::new(dir.path(), "mca");

        let a = cache.region_for(ChunkCoord::new(0, 0)).unwrap();
        let b = cache.region_for(ChunkCoord::new(31, 31)).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.open_count(), 1);
        assert!(dir.path().join("r.0.0.mca").exists());
    }

    #[test]
    fn test_negative_chunks_open_negative_regions() {
        let dir = tempfile::tempdir().unwrap();
        let cache = RegionCache::new(dir.path(), "mca");

        let file = cache.region_for(ChunkCoord::new(-1, 32)).unwrap();
        assert_eq!(file.path(), dir.path().join("r.-1.1.mca"));
        cache.region_for(ChunkCoord::new(0, 0)).unwrap();
        assert_eq!(cache.open_count(), 2);
        cache.sync_all().unwrap();
    }

    #[test]
    fn test_custom_extension() {
        let dir = tempfile::tempdir().unwrap();
        let cache = RegionCache::new(dir.path(), "qr");
        assert_eq!(
            cache.region_path(RegionCoord::new(2, -5)),
            dir.path().join("r.2.-5.qr")
        );
    }

    #[test]
    fn test_failed_open_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let cache = RegionCache::new(dir.path().join("missing"), "mca");

        let err = cache.region_for(ChunkCoord::new(0, 0)).err().expect("must fail");
        assert!(err.is_unavailable(), "got {err:?}");
        assert_eq!(cache.open_count(), 0);

        std::fs::create_dir(dir.path().join("missing")).unwrap();
        assert!(cache.region_for(ChunkCoord::new(0, 0)).is_ok());
    }
}
