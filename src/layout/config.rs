// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use serde::{Deserialize, Serialize};

/// Thresholds for the size-adaptive auto-collapse applied to large models.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollapseConfig {
    /// Auto-collapse only runs when the model has more reachable nodes
    /// than this.
    pub node_count_threshold: usize,
    /// Expandable nodes at a depth holding more than this many nodes
    /// (model-wide) are collapsed.
    pub depth_count_threshold: usize,
    /// Nodes with more children than this are collapsed once they are
    /// at least `group_depth_start`/`component_depth_start` deep.
    pub child_count_threshold: usize,
    pub group_depth_start: usize,
    pub component_depth_start: usize,
}

impl Default for CollapseConfig {
    fn default() -> Self {
        Self {
            node_count_threshold: 1000,
            depth_count_threshold: 200,
            child_count_threshold: 50,
            group_depth_start: 2,
            component_depth_start: 3,
        }
    }
}

/// Layout configuration for the partition tree and matrix views.
///
/// All sizes are in pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Width given to a node whose row is too short to show its label.
    pub min_column_width: f64,
    /// Rows shorter than this hide their label.
    pub font_height_px: f64,
    /// Space added on each side of a measured label.
    pub right_text_margin: f64,
    /// Width of the single column that stands in for the ancestors of a
    /// zoomed-in element.
    pub parent_node_width: f64,
    /// Height of the partition tree; the matrix is a square of this side.
    pub tree_height_px: f64,
    /// Margin around the matrix.
    pub matrix_margin: f64,
    /// Space kept free around the diagram when fitting it to the viewport.
    pub viewport_margin: f64,

    /// Animated transitions are suppressed when a pass shows (or showed)
    /// more rows than this.
    pub max_visible_for_transitions: usize,

    /// Start the auto-generated aggregate collapsed.
    pub minimize_auto_aggregate: bool,
    pub collapse: CollapseConfig,

    /// Enable per-node trace logging.
    pub debug: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_column_width: 5.0,
            font_height_px: 11.0,
            right_text_margin: 8.0,
            parent_node_width: 30.0,
            tree_height_px: 600.0,
            matrix_margin: 10.0,
            viewport_margin: 50.0,
            max_visible_for_transitions: 2000,
            minimize_auto_aggregate: true,
            collapse: CollapseConfig::default(),
            debug: false,
        }
    }
}

impl LayoutConfig {
    /// Clamp values that would break the sizing math: sizes must be finite
    /// and non-negative, and the font height and column width must be
    /// positive.
    pub fn validate(&mut self) {
        fn non_negative(v: &mut f64, fallback: f64) {
            if !v.is_finite() || *v < 0.0 {
                *v = fallback;
            }
        }

        let defaults = LayoutConfig::default();
        non_negative(&mut self.min_column_width, defaults.min_column_width);
        non_negative(&mut self.font_height_px, defaults.font_height_px);
        non_negative(&mut self.right_text_margin, 0.0);
        non_negative(&mut self.parent_node_width, 0.0);
        non_negative(&mut self.tree_height_px, 0.0);
        non_negative(&mut self.matrix_margin, 0.0);
        non_negative(&mut self.viewport_margin, 0.0);

        if self.min_column_width == 0.0 {
            self.min_column_width = f64::EPSILON;
        }
        if self.font_height_px == 0.0 {
            self.font_height_px = 1.0;
        }
    }
}
