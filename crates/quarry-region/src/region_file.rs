//! On-disk region file: header tables plus sector-aligned chunk payloads.
//!
//! ## File Layout
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | N×4 | Location table, `N = REGION_SIZE²` big-endian `u32` entries |
//! | N×4 | N×4 | Timestamp table, big-endian `u32` unix seconds |
//! | 2×N×4 | … | Chunk payloads in 4096-byte sectors |
//!
//! A location entry is `sector_offset << 8 | sector_count`; zero means the
//! slot is empty. Slot index is `local_x + local_z × REGION_SIZE`. Every
//! multi-byte integer in the file is big-endian.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use quarry_voxel::{ChunkCoord, REGION_SIZE, RegionCoord, VoxelGrid, codec};
use tracing::{debug, info, warn};

use crate::error::RegionError;
use crate::free_list::{FreeList, SectorRange};

/// Size of one allocation unit in bytes.
pub const SECTOR_BYTES: usize = 4096;

/// Number of slots in a region.
const SLOT_COUNT: usize = (REGION_SIZE * REGION_SIZE) as usize;

/// Size of the location and timestamp tables combined.
pub const HEADER_BYTES: usize = SLOT_COUNT * 4 * 2;

/// Sectors occupied by the header tables (always 0 and 1).
pub const HEADER_SECTORS: u32 = (HEADER_BYTES / SECTOR_BYTES) as u32;

/// Largest sector count a location entry can hold (8 bits).
pub const MAX_SECTOR_COUNT: u32 = 0xFF;

/// Largest sector offset a location entry can hold (24 bits).
pub const MAX_SECTOR_OFFSET: u32 = 0x00FF_FFFF;

/// Byte offset of the timestamp table.
const TIMESTAMP_TABLE: u64 = (SLOT_COUNT * 4) as u64;

/// Returns the file name of a region: `r.<x>.<z>.<extension>`.
pub fn region_file_name(region: RegionCoord, extension: &str) -> String {
    format!("r.{}.{}.{}", region.x, region.z, extension)
}

/// Where a chunk's payload lives in the file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Location {
    /// First sector of the payload.
    pub offset: u32,
    /// Number of sectors reserved for the payload.
    pub count: u32,
}

impl Location {
    /// Decodes a raw table entry. Returns `None` for empty slots.
    pub fn from_entry(entry: u32) -> Option<Self> {
        let offset = entry >> 8;
        let count = entry & 0xFF;
        if offset == 0 || count == 0 {
            return None;
        }
        Some(Self { offset, count })
    }

    /// Encodes this location as a raw table entry.
    pub fn to_entry(self) -> u32 {
        (self.offset << 8) | (self.count & 0xFF)
    }

    /// The sectors covered by this location.
    pub fn range(self) -> SectorRange {
        SectorRange::new(self.offset, self.count)
    }
}

struct RegionInner {
    file: File,
    free: FreeList,
    /// First sector past everything in use; appends start here.
    end_sector: u32,
}

/// Storage for one region, safe to share between threads.
///
/// Every public method takes the region's own lock for the full duration of
/// its file access, so a worker read and a main-thread write to the same
/// region never interleave.
pub struct RegionFile {
    path: PathBuf,
    inner: Mutex<RegionInner>,
}

impl RegionFile {
    /// Opens the region file at `path`, creating it with an empty header if absent,
    /// and rebuilds the free list from its location table.
    pub fn open(path: &Path) -> Result<Self, RegionError> {
        let unavailable = |source| RegionError::Unavailable {
            path: path.to_path_buf(),
            source,
        };

        let mut file = match OpenOptions::new().read(true).write(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Self::create(path).map_err(unavailable)?
            }
            Err(e) => return Err(unavailable(e)),
        };

        let (free, end_sector) = Self::rebuild_free_list(path, &mut file)?;
        info!(
            path = %path.display(),
            free_sectors = free.free_sectors(),
            end_sector,
            "Opened region file"
        );

        Ok(Self {
            path: path.to_path_buf(),
            inner: Mutex::new(RegionInner {
                file,
                free,
                end_sector,
            }),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the raw, sector-padded payload of a chunk.
    ///
    /// Returns `Ok(None)` when the slot is empty or its entry points outside
    /// the payload area of the file.
    pub fn load_chunk(&self, coord: ChunkCoord) -> Result<Option<Vec<u8>>, RegionError> {
        let mut inner = self.lock();
        let Some(location) = inner.read_location(coord.slot())? else {
            return Ok(None);
        };
        let file_len = inner.file.metadata()?.len();
        let end_byte = location.range().end() as u64 * SECTOR_BYTES as u64;
        if location.offset < HEADER_SECTORS || end_byte > file_len {
            warn!(
                ?coord,
                offset = location.offset,
                count = location.count,
                "Location entry points outside the payload area; treating chunk as absent"
            );
            return Ok(None);
        }

        let mut data = vec![0u8; location.count as usize * SECTOR_BYTES];
        inner
            .file
            .seek(SeekFrom::Start(location.offset as u64 * SECTOR_BYTES as u64))?;
        inner.file.read_exact(&mut data)?;
        debug!(?coord, offset = location.offset, count = location.count, "Loaded chunk payload");
        Ok(Some(data))
    }

    /// Encodes and writes a chunk, returning where it was stored.
    ///
    /// A payload that fits in the chunk's previous allocation is rewritten in
    /// place; otherwise the old sectors are released and new ones taken
    /// first-fit from the free list, or appended at the end of the file.
    /// Allocator state is committed only after every write succeeded.
    pub fn save_chunk(&self, coord: ChunkCoord, grid: &VoxelGrid) -> Result<Location, RegionError> {
        let mut payload = codec::encode(grid);
        let sectors = payload.len().div_ceil(SECTOR_BYTES);
        if sectors > MAX_SECTOR_COUNT as usize {
            return Err(RegionError::ChunkTooLarge { sectors });
        }
        payload.resize(sectors * SECTOR_BYTES, 0);
        let sectors = sectors as u32;

        let mut inner = self.lock();
        let slot = coord.slot();
        let previous = inner
            .read_location(slot)?
            .filter(|loc| loc.offset >= HEADER_SECTORS);

        let mut free = inner.free.clone();
        let mut end_sector = inner.end_sector;
        let offset = match previous {
            Some(prev) if sectors <= prev.count => prev.offset,
            _ => {
                if let Some(prev) = previous {
                    free.release(prev.range());
                }
                match free.allocate(sectors) {
                    Some(offset) => offset,
                    None => {
                        let offset = end_sector;
                        end_sector += sectors;
                        offset
                    }
                }
            }
        };
        if offset > MAX_SECTOR_OFFSET {
            return Err(RegionError::RegionFull { offset });
        }

        let location = Location {
            offset,
            count: sectors,
        };
        inner
            .file
            .seek(SeekFrom::Start(offset as u64 * SECTOR_BYTES as u64))?;
        inner.file.write_all(&payload)?;
        inner.write_table_entry(TIMESTAMP_TABLE, slot, unix_timestamp())?;
        inner.write_table_entry(0, slot, location.to_entry())?;

        inner.free = free;
        inner.end_sector = end_sector.max(location.range().end());
        debug!(
            ?coord,
            offset,
            sectors,
            reused = previous.is_some_and(|p| p.offset == offset),
            "Saved chunk"
        );
        Ok(location)
    }

    /// Returns `true` if the chunk's slot holds a payload.
    pub fn contains(&self, coord: ChunkCoord) -> Result<bool, RegionError> {
        Ok(self.lock().read_location(coord.slot())?.is_some())
    }

    /// Returns the location of the chunk's payload, if any.
    pub fn location(&self, coord: ChunkCoord) -> Result<Option<Location>, RegionError> {
        self.lock().read_location(coord.slot())
    }

    /// Unix time (seconds) of the chunk's last save, or 0 if never saved.
    pub fn timestamp(&self, coord: ChunkCoord) -> Result<u32, RegionError> {
        self.lock().read_table_entry(TIMESTAMP_TABLE, coord.slot())
    }

    /// Snapshot of the free sector ranges.
    pub fn free_ranges(&self) -> Vec<SectorRange> {
        self.lock().free.ranges().to_vec()
    }

    /// Every allocated slot and its location, in slot order.
    pub fn allocations(&self) -> Result<Vec<(usize, Location)>, RegionError> {
        let mut inner = self.lock();
        let table = inner.read_location_table()?;
        Ok(table
            .iter()
            .enumerate()
            .filter_map(|(slot, &entry)| Location::from_entry(entry).map(|loc| (slot, loc)))
            .collect())
    }

    /// Current length of the backing file in bytes.
    pub fn file_len(&self) -> Result<u64, RegionError> {
        Ok(self.lock().file.metadata()?.len())
    }

    /// Flushes file contents to disk.
    pub fn sync(&self) -> Result<(), RegionError> {
        self.lock().file.sync_data()?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, RegionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates a new file whose header tables are all zero.
    fn create(path: &Path) -> std::io::Result<File> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;
        file.write_all(&[0u8; HEADER_BYTES])?;
        file.sync_data()?;
        info!(path = %path.display(), "Created region file");
        Ok(file)
    }

    /// Marks the header and every sector claimed by the location table as used;
    /// the remaining runs become the free list.
    fn rebuild_free_list(path: &Path, file: &mut File) -> Result<(FreeList, u32), RegionError> {
        let len = file.metadata()?.len();
        if len < HEADER_BYTES as u64 {
            return Err(RegionError::InvalidFile {
                path: path.to_path_buf(),
                len,
            });
        }
        let total_sectors = (len / SECTOR_BYTES as u64) as u32;
        let mut end_sector = len.div_ceil(SECTOR_BYTES as u64) as u32;

        let mut used = vec![false; total_sectors as usize];
        for sector in used.iter_mut().take(HEADER_SECTORS as usize) {
            *sector = true;
        }

        let table = read_location_table(file)?;
        for (slot, &entry) in table.iter().enumerate() {
            let Some(location) = Location::from_entry(entry) else {
                continue;
            };
            if location.offset < HEADER_SECTORS {
                warn!(slot, offset = location.offset, "Location entry overlaps the header; ignoring");
                continue;
            }
            end_sector = end_sector.max(location.range().end());
            for sector in location.offset..location.range().end().min(total_sectors) {
                used[sector as usize] = true;
            }
        }

        Ok((FreeList::from_usage(&used), end_sector))
    }
}

impl RegionInner {
    fn read_location(&mut self, slot: usize) -> Result<Option<Location>, RegionError> {
        Ok(Location::from_entry(self.read_table_entry(0, slot)?))
    }

    fn read_location_table(&mut self) -> Result<Vec<u32>, RegionError> {
        Ok(read_location_table(&mut self.file)?)
    }

    fn read_table_entry(&mut self, table: u64, slot: usize) -> Result<u32, RegionError> {
        let mut bytes = [0u8; 4];
        self.file.seek(SeekFrom::Start(table + slot as u64 * 4))?;
        self.file.read_exact(&mut bytes)?;
        Ok(u32::from_be_bytes(bytes))
    }

    fn write_table_entry(&mut self, table: u64, slot: usize, value: u32) -> Result<(), RegionError> {
        self.file.seek(SeekFrom::Start(table + slot as u64 * 4))?;
        self.file.write_all(&value.to_be_bytes())?;
        Ok(())
    }
}

fn read_location_table(file: &mut File) -> std::io::Result<Vec<u32>> {
    let mut bytes = vec![0u8; SLOT_COUNT * 4];
    file.seek(SeekFrom::Start(0))?;
    file.read_exact(&mut bytes)?;
    Ok(bytes
        .chunks_exact(4)
        .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

fn unix_timestamp() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0)
}
