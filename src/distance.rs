//! Positioning cost between two physical locations
//!
//! The drum rotates in a single fixed direction at constant angular
//! velocity, so rotational delay is the number of service groups the
//! drum must turn before the target passes under the head. That makes
//! the cost asymmetric: going "back" one service group costs nearly a
//! full revolution. Seek cost is plain track distance and is symmetric.

use crate::config::CostWeights;
use crate::geometry::PhysicalLocation;

/// Breakdown of the positioning cost for one candidate move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Positioning {
    /// Weighted total cost
    pub cost: u64,
    /// Service groups of rotation until the target arrives under the head
    pub rotational_delta: u64,
    /// Tracks of head movement
    pub seek_delta: u64,
}

/// Computes one-directional positioning cost between drum locations
#[derive(Debug, Clone, Copy)]
pub struct DistanceMetric {
    num_service_groups: u32,
    weights: CostWeights,
}

impl DistanceMetric {
    /// Create a metric for a drum with the given number of service groups
    pub fn new(num_service_groups: u32, weights: CostWeights) -> Self {
        Self {
            num_service_groups,
            weights,
        }
    }

    /// The configured cost weights
    pub fn weights(&self) -> CostWeights {
        self.weights
    }

    /// Service groups of rotation from `from` until `to` passes under the head
    ///
    /// Always in `[0, num_service_groups)`. Zero means the target sits in
    /// the same angular sector as the head.
    pub fn rotational_delta(&self, from: PhysicalLocation, to: PhysicalLocation) -> u64 {
        let s = self.num_service_groups as u64;
        let from_sg = from.service_group as u64 % s;
        let to_sg = to.service_group as u64 % s;
        (to_sg + s - from_sg) % s
    }

    /// Tracks of head movement between `from` and `to`
    pub fn seek_delta(&self, from: PhysicalLocation, to: PhysicalLocation) -> u64 {
        (from.track as i64 - to.track as i64).unsigned_abs()
    }

    /// Full cost breakdown for moving the head from `from` to `to`
    ///
    /// `cost = seek_weight * seek_delta + rotation_weight * rotational_delta`.
    /// The cost of staying put is zero.
    pub fn evaluate(&self, from: PhysicalLocation, to: PhysicalLocation) -> Positioning {
        let rotational_delta = self.rotational_delta(from, to);
        let seek_delta = self.seek_delta(from, to);
        let cost = self
            .weights
            .seek_weight
            .saturating_mul(seek_delta)
            .saturating_add(self.weights.rotation_weight.saturating_mul(rotational_delta));
        Positioning {
            cost,
            rotational_delta,
            seek_delta,
        }
    }

    /// Weighted total cost of moving the head from `from` to `to`
    pub fn cost(&self, from: PhysicalLocation, to: PhysicalLocation) -> u64 {
        self.evaluate(from, to).cost
    }
}
