//! Logical-to-physical address mapping
//!
//! Maps a logical block address to its fixed location on the drum. The
//! mapping is a pure function of the configured layout: it never depends
//! on what is pending, and two calls with the same LBA always agree.

use crate::config::GeometryConfig;
use crate::error::{ReorderError, Result};
use serde::{Deserialize, Serialize};

/// A physical position on the drum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhysicalLocation {
    /// Angular sector index, reached at a fixed rotational offset
    pub service_group: u32,
    /// Radial position of the head
    pub track: u32,
}

/// Resolved drum layout with the derived block count
#[derive(Debug, Clone, Copy)]
pub struct Geometry {
    num_service_groups: u32,
    num_tracks: u32,
    blocks_per_sg: u32,
    track_skew: u32,
    num_blocks: u64,
}

impl Geometry {
    /// Build the layout from a validated configuration
    pub fn new(config: &GeometryConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            num_service_groups: config.num_service_groups,
            num_tracks: config.num_tracks,
            blocks_per_sg: config.blocks_per_sg,
            track_skew: config.track_skew,
            num_blocks: config.num_blocks(),
        })
    }

    /// Total number of addressable blocks
    pub fn num_blocks(&self) -> u64 {
        self.num_blocks
    }

    /// Number of service groups per revolution
    pub fn num_service_groups(&self) -> u32 {
        self.num_service_groups
    }

    /// Number of tracks
    pub fn num_tracks(&self) -> u32 {
        self.num_tracks
    }

    /// Number of blocks in one service group of one track
    pub fn blocks_per_sg(&self) -> u32 {
        self.blocks_per_sg
    }

    /// Map a logical block address to its physical location
    ///
    /// Addresses fill a track service group by service group before
    /// stepping to the next track. With a nonzero track skew the service
    /// group index is additionally rotated by `track_skew` per track.
    ///
    /// # Returns
    /// * `Ok(PhysicalLocation)` for `lba < num_blocks`
    /// * `Err(ReorderError::OutOfRange)` otherwise
    pub fn map_to_physical(&self, lba: u64) -> Result<PhysicalLocation> {
        if lba >= self.num_blocks {
            return Err(ReorderError::OutOfRange {
                lba,
                num_blocks: self.num_blocks,
            });
        }

        let sg_index = lba / self.blocks_per_sg as u64;
        let track = sg_index / self.num_service_groups as u64;
        let base_sg = sg_index % self.num_service_groups as u64;
        let skewed_sg =
            (base_sg + self.track_skew as u64 * track) % self.num_service_groups as u64;

        Ok(PhysicalLocation {
            service_group: skewed_sg as u32,
            track: track as u32,
        })
    }
}
