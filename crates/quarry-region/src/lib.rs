//! Region-file chunk storage.
//!
//! A region file holds the payloads of a `REGION_SIZE × REGION_SIZE` grid of
//! chunks in fixed 4 KiB sectors. Sectors 0 and 1 hold the location and
//! timestamp tables; payload sectors are handed out by a first-fit free list
//! that is rebuilt from the location table whenever the file is opened.

pub mod error;
pub mod free_list;
pub mod region_file;

pub use error::RegionError;
pub use free_list::{FreeList, SectorRange};
pub use region_file::{
    HEADER_BYTES, HEADER_SECTORS, Location, MAX_SECTOR_COUNT, MAX_SECTOR_OFFSET, RegionFile,
    SECTOR_BYTES, region_file_name,
};
