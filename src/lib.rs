//! Drum Reorder Engine
//!
//! A command-reordering engine for a rotating-media storage controller.
//! Given a stream of pending requests identified by logical block address
//! (LBA), the engine repeatedly picks the next request to service so that
//! physical positioning cost (seek plus rotational delay on a drum that
//! spins in one fixed direction) is minimized, with bounded memory and
//! fully deterministic tie-breaking.
//!
//! # Overview
//!
//! A driver feeds arrivals in with [`ReorderEngine::add_request`], peeks
//! at the provisional best candidate with [`ReorderEngine::select_target`]
//! as often as it likes, and commits arrival with
//! [`ReorderEngine::complete_target`], which frees the record and moves
//! the head. Selection never mutates anything; completion is the only
//! operation that does.
//!
//! # Features
//!
//! - **Shortest-positioning-time selection**: weighted seek plus
//!   one-directional rotational delay, minimized over the pending set
//! - **Bounded memory**: a fixed arena of request slots allocated up
//!   front; admission beyond capacity fails instead of growing
//! - **Dual indexing**: every pending request is reachable by LBA and by
//!   physical location in logarithmic time, via threaded AVL trees over
//!   arena indices
//! - **Deterministic ties**: equal costs break by rotational delay, then
//!   seek distance, then LBA, so reruns always agree
//!
//! # Quick Start
//!
//! ```rust
//! use drum_reorder::ReorderEngine;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Room for 16 simultaneously pending requests, default drum layout
//! let mut engine = ReorderEngine::new(16)?;
//!
//! engine.add_request(1_200, 1)?;
//! engine.add_request(640_000, 1)?;
//!
//! let target = engine.select_target()?;
//! println!("service LBA {} at cost {}", target.lba, target.distance);
//!
//! engine.complete_target(target.lba)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`ReorderEngine`]: owns the head position and orchestrates the rest
//! - [`Geometry`]: pure LBA-to-physical mapping under a zoned layout
//! - [`DistanceMetric`]: one-directional positioning cost between locations
//! - request pool (internal): fixed arena with by-LBA and by-location
//!   indices over the same records
//!
//! # Configuration
//!
//! The drum layout and cost weights load from YAML via
//! [`EngineConfig::from_file`]:
//!
//! ```yaml
//! geometry:
//!   num_service_groups: 360   # angular sectors per revolution
//!   num_tracks: 5000
//!   blocks_per_sg: 10
//!   track_skew: 0             # SGs of stagger per track
//! weights:
//!   seek_weight: 1            # cost per track of head movement
//!   rotation_weight: 1        # cost per SG of rotational wait
//! ```
//!
//! The engine performs no I/O and no internal locking: calls are
//! synchronous and assume one caller at a time.

pub mod config;
pub mod distance;
pub mod error;
pub mod geometry;
mod pool;
pub mod scheduler;

pub use config::{CostWeights, EngineConfig, GeometryConfig};
pub use distance::{DistanceMetric, Positioning};
pub use error::{ReorderError, Result};
pub use geometry::{Geometry, PhysicalLocation};
pub use pool::RequestRecord;
pub use scheduler::{ReorderEngine, Target};
