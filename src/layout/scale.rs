// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use float_cmp::approx_eq;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Dims;
use super::dimensions::Size;

/// One-dimensional linear mapping from a domain onto a pixel range.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    pub domain: [f64; 2],
    pub range: [f64; 2],
}

impl LinearScale {
    pub fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self { domain, range }
    }

    /// A degenerate (zero-width) domain maps everything to the range start.
    pub fn map(&self, value: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        if approx_eq!(f64, d0, d1) {
            return r0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }

    pub fn invert(&self, pixel: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        if approx_eq!(f64, r0, r1) {
            return d0;
        }
        d0 + (pixel - r0) / (r1 - r0) * (d1 - d0)
    }
}

impl Default for LinearScale {
    fn default() -> Self {
        Self::new([0.0, 1.0], [0.0, 1.0])
    }
}

/// Current and previous x/y mappings; the renderer interpolates between
/// the two when animating a re-layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CoordinateMapping {
    pub x: LinearScale,
    pub y: LinearScale,
    pub prev_x: LinearScale,
    pub prev_y: LinearScale,
}

impl CoordinateMapping {
    /// Copy the current mappings into the previous ones.
    pub fn preserve(&mut self) {
        self.prev_x = self.x;
        self.prev_y = self.y;
    }
}

/// Derives pixel mappings from the zoomed element's normalized geometry
/// and owns the decision whether a pass may animate.
#[derive(Clone, Debug)]
pub struct ScaleManager {
    mapping: CoordinateMapping,
    has_previous: bool,
    transitions_allowed: bool,
}

impl ScaleManager {
    /// Manager for the first layout ever computed.
    pub fn new() -> Self {
        Self {
            mapping: CoordinateMapping::default(),
            has_previous: false,
            transitions_allowed: true,
        }
    }

    /// Manager continuing from the mappings of an earlier pass.
    pub fn from_previous(mapping: CoordinateMapping) -> Self {
        Self {
            mapping,
            has_previous: true,
            transitions_allowed: true,
        }
    }

    /// Recompute the current mappings, preserving the old ones first unless
    /// this is the first layout.
    ///
    /// x maps `[zoomed.x, 1]` onto `[parent column, tree width]` (the parent
    /// column is 0 when zoomed at the root); y maps the zoomed element's
    /// vertical extent onto `[0, tree height]`.
    pub fn update_scale_values(
        &mut self,
        zoomed: Dims,
        zoomed_is_root: bool,
        tree: Size,
        parent_node_width: f64,
    ) {
        if self.has_previous {
            self.mapping.preserve();
        }

        let x_start = if zoomed_is_root { 0.0 } else { parent_node_width };
        self.mapping.x = LinearScale::new([zoomed.x, 1.0], [x_start, tree.width]);
        self.mapping.y =
            LinearScale::new([zoomed.y, zoomed.y + zoomed.height], [0.0, tree.height]);

        if !self.has_previous {
            self.mapping.preserve();
            self.has_previous = true;
        }
    }

    /// Suppress animation when either the outgoing or the incoming layout
    /// shows more than `max_visible` rows.
    pub fn set_transition_permission(
        &mut self,
        prev_visible: usize,
        cur_visible: usize,
        max_visible: usize,
    ) -> bool {
        let highest = prev_visible.max(cur_visible);
        self.transitions_allowed = highest <= max_visible;
        debug!(
            highest,
            max_visible,
            allowed = self.transitions_allowed,
            "transition permission"
        );
        self.transitions_allowed
    }

    pub fn transitions_allowed(&self) -> bool {
        self.transitions_allowed
    }

    pub fn mapping(&self) -> &CoordinateMapping {
        &self.mapping
    }
}

impl Default for ScaleManager {
    fn default() -> Self {
        Self::new()
    }
}
