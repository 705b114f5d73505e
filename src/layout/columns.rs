// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};
use tracing::{debug, trace};

use crate::common::Result;
use crate::layout_err;
use crate::model::{Model, NodeId};

use super::config::LayoutConfig;
use super::text::MeasureCache;
use super::{DrawState, is_expanded, is_hidden};

/// One partition tree column; column index equals node depth.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub width: f64,
    /// Offset of the column's left edge from the left of the tree.
    pub location: f64,
}

/// Output of [`compute_columns`].
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnSizing {
    pub columns: Vec<Column>,
    /// Widest leaf label at each depth.
    pub leaf_widths: Vec<f64>,
    /// Sum of all column widths.
    pub tree_width: f64,
}

/// Label shown for a node: its name, or its full path when it is the
/// zoomed element below the root.
pub fn display_text<'m>(model: &'m Model, zoomed: NodeId, id: NodeId) -> &'m str {
    let node = model.node(id);
    if id == zoomed && !model.is_root(id) {
        &node.path
    } else {
        &node.name
    }
}

/// Size each depth's column so no label visible under `zoomed` is clipped.
///
/// Expects leaf counts from [`super::collapse::compute_leaves`]. Sets
/// `name_width_px` and `text_opacity` for every node it walks.
pub fn compute_columns(
    model: &Model,
    zoomed: NodeId,
    config: &LayoutConfig,
    draw: &mut [DrawState],
    measure: &mut MeasureCache<'_>,
) -> Result<ColumnSizing> {
    let max_depth = model.max_depth();
    let mut columns = vec![Column::default(); max_depth + 1];
    let mut leaf_widths = vec![0.0_f64; max_depth + 1];
    let zoomed_leaves = draw[zoomed.index()].num_leaves;

    let mut stack: SmallVec<[NodeId; 64]> = smallvec![zoomed];
    let mut visits = 0;
    while let Some(id) = stack.pop() {
        visits += 1;
        if visits > model.len() {
            return layout_err!(
                MalformedModel,
                format!("visited more than {} nodes while sizing columns", model.len())
            );
        }

        let node = model.node(id);
        if is_hidden(node) {
            continue;
        }

        let text_width = measure.width(display_text(model, zoomed, id))?;
        let state = &mut draw[id.index()];
        state.name_width_px = text_width + 2.0 * config.right_text_margin;

        let row_height = if zoomed_leaves > 0 {
            config.tree_height_px * state.num_leaves as f64 / zoomed_leaves as f64
        } else {
            0.0
        };
        let labeled = row_height > config.font_height_px;
        state.text_opacity = if labeled { 1.0 } else { 0.0 };
        let width = if labeled {
            state.name_width_px
        } else {
            config.min_column_width
        };

        if config.debug {
            trace!(node = %node.path, row_height, width, "sized label");
        }

        if is_expanded(model, draw, id) {
            let col = &mut columns[node.depth];
            col.width = col.width.max(width);
            stack.extend(node.children.iter().rev().copied());
        } else {
            let leaf = &mut leaf_widths[node.depth];
            *leaf = leaf.max(width);
        }
    }

    // The rightmost column absorbs whatever the widest leaf label at any
    // depth needs beyond the columns to its right.
    let zoomed_depth = model.node(zoomed).depth;
    let mut sum = 0.0;
    let mut last_width = 0.0_f64;
    for depth in (zoomed_depth..=max_depth).rev() {
        sum += columns[depth].width;
        last_width = last_width.max(leaf_widths[depth] - sum);
    }

    if zoomed_depth > 0 {
        columns[zoomed_depth - 1].width = config.parent_node_width;
    }
    columns[max_depth].width = last_width;

    let mut location = 0.0;
    for col in columns.iter_mut() {
        col.location = location;
        location += col.width;
    }

    debug!(
        tree_width = location,
        columns = columns.len(),
        zoomed_depth,
        "computed column widths"
    );

    Ok(ColumnSizing {
        columns,
        leaf_widths,
        tree_width: location,
    })
}
