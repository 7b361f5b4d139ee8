//! CPU-side chunk geometry: face directions, vertex/index buffers, and the
//! culled-face geometry builder. Nothing in this crate touches the GPU, so it
//! is safe to run on worker threads.

pub mod culled;
pub mod face_direction;
pub mod geometry;

pub use culled::build_geometry;
pub use face_direction::FaceDirection;
pub use geometry::{ChunkGeometry, MeshVertex};
