// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

pub mod collapse;
pub mod columns;
pub mod config;
pub mod dimensions;
pub mod position;
pub mod scale;
pub mod text;

use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span, warn};

use crate::common::Result;
use crate::layout_err;
use crate::model::{Model, NodeId, TreeNode};

use self::collapse::compute_leaves;
use self::columns::{Column, compute_columns};
use self::config::LayoutConfig;
use self::dimensions::{DimensionPlanner, FitDimensions, Size};
use self::position::compute_positions;
use self::scale::{CoordinateMapping, ScaleManager};
use self::text::{MeasureCache, TextMeasurer};

/// Normalized geometry of one node, each component in [0, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dims {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Per-node state written by a layout pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawState {
    pub num_leaves: usize,
    pub name_width_px: f64,
    /// 1 when the label fits in the node's row, otherwise 0.
    pub text_opacity: f64,
    /// Effective collapse state: user-minimized or collapsed by policy.
    pub minimized: bool,
    pub dims: Dims,
    /// Geometry from the previous pass, for interpolation.
    pub prev_dims: Dims,
}

/// Hidden, or a filter collector with nothing in it.
pub(crate) fn is_hidden(node: &TreeNode) -> bool {
    node.flags.hidden || (node.kind.is_filter() && node.children.is_empty())
}

pub(crate) fn is_displayed(node: &TreeNode) -> bool {
    !is_hidden(node) && !node.flags.filtered
}

pub(crate) fn has_displayed_children(model: &Model, node: &TreeNode) -> bool {
    node.children
        .iter()
        .any(|&child| is_displayed(model.node(child)))
}

/// Displayed, not minimized, and with something to show underneath.
pub(crate) fn is_expanded(model: &Model, draw: &[DrawState], id: NodeId) -> bool {
    let node = model.node(id);
    is_displayed(node) && !draw[id.index()].minimized && has_displayed_children(model, node)
}

/// State carried from one pass to the next so the renderer can animate.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub dims: Vec<Dims>,
    pub mapping: CoordinateMapping,
    pub visible_count: usize,
}

/// Everything a renderer needs from one layout pass.
#[derive(Clone, Debug, Serialize)]
pub struct LayoutFrame {
    pub zoomed: NodeId,
    pub draw_states: Vec<DrawState>,
    pub columns: Vec<Column>,
    /// Matrix rows, in pre-order.
    pub visible_nodes: Vec<NodeId>,
    pub zoomed_nodes: Vec<NodeId>,
    /// Nodes collapsed by policy this pass rather than by the user.
    pub auto_minimized: Vec<NodeId>,
    pub mapping: CoordinateMapping,
    /// When false the renderer must apply this pass without animating.
    pub transitions_allowed: bool,
    pub tree_size: Size,
    pub planner: DimensionPlanner,
}

impl LayoutFrame {
    pub fn draw_state(&self, id: NodeId) -> &DrawState {
        &self.draw_states[id.index()]
    }

    pub fn dims(&self, id: NodeId) -> Dims {
        self.draw_states[id.index()].dims
    }

    pub fn outer_dimensions(&self) -> Size {
        self.planner.outer_dimensions()
    }

    pub fn inner_dimensions(&self) -> Size {
        self.planner.inner_dimensions()
    }

    pub fn fit_dimensions(&self, viewport: Size, manually_resized: bool) -> FitDimensions {
        self.planner.fit_dimensions(viewport, manually_resized)
    }

    /// Carry-forward state for the next pass.
    pub fn transition(&self) -> Transition {
        Transition {
            dims: self.draw_states.iter().map(|s| s.dims).collect(),
            mapping: self.mapping,
            visible_count: self.visible_nodes.len(),
        }
    }
}

/// Layout engine bound to one model snapshot.
///
/// Each [`Layout::compute`] call is one pass: it computes into scratch
/// state and hands back a complete [`LayoutFrame`], or an error and no
/// frame at all.
pub struct Layout<'a> {
    model: &'a Model,
    config: LayoutConfig,
}

impl<'a> Layout<'a> {
    pub fn new(model: &'a Model, mut config: LayoutConfig) -> Self {
        config.validate();
        Self { model, config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Run the full pipeline for `zoomed`: leaf counts, column widths,
    /// normalized positions, pixel mappings, transition permission and
    /// container dimensions.
    pub fn compute(
        &self,
        zoomed: NodeId,
        measurer: &mut dyn TextMeasurer,
        previous: Option<&Transition>,
    ) -> Result<LayoutFrame> {
        let model = self.model;
        let config = &self.config;
        let _span = debug_span!("layout_pass", zoomed = %zoomed).entered();

        if model.get(zoomed).is_none() || !model.is_reachable(zoomed) {
            return layout_err!(
                EmptyZoomTarget,
                format!("node {zoomed} has no path to the model root")
            );
        }

        let (mut draw, seeded) = seed_draw_states(model, previous);

        let auto_minimized = compute_leaves(model, config, &mut draw)?;

        let sizing = {
            let mut cache = MeasureCache::new(measurer);
            let sizing = compute_columns(model, zoomed, config, &mut draw, &mut cache)?;
            debug!(measured = cache.misses(), "label widths measured");
            sizing
        };

        let placement = compute_positions(
            model,
            zoomed,
            &mut draw,
            &sizing.columns,
            sizing.tree_width,
            seeded,
        )?;

        if !seeded {
            for state in draw.iter_mut() {
                state.prev_dims = state.dims;
            }
        }

        let tree_size = Size::new(sizing.tree_width, config.tree_height_px);
        let mut scales = match previous {
            Some(prev) => ScaleManager::from_previous(prev.mapping),
            None => ScaleManager::new(),
        };
        scales.update_scale_values(
            draw[zoomed.index()].dims,
            model.is_root(zoomed),
            tree_size,
            config.parent_node_width,
        );
        let prev_visible = previous.map_or(0, |prev| prev.visible_count);
        let transitions_allowed = scales.set_transition_permission(
            prev_visible,
            placement.visible_nodes.len(),
            config.max_visible_for_transitions,
        );

        let planner =
            DimensionPlanner::new(tree_size, config.matrix_margin, config.viewport_margin);

        Ok(LayoutFrame {
            zoomed,
            draw_states: draw,
            columns: sizing.columns,
            visible_nodes: placement.visible_nodes,
            zoomed_nodes: placement.zoomed_nodes,
            auto_minimized,
            mapping: *scales.mapping(),
            transitions_allowed,
            tree_size,
            planner,
        })
    }
}

/// Fresh draw states seeded with the previous pass's geometry. Returns
/// whether previous geometry was available.
fn seed_draw_states(model: &Model, previous: Option<&Transition>) -> (Vec<DrawState>, bool) {
    let mut draw = vec![DrawState::default(); model.len()];
    let Some(prev) = previous else {
        return (draw, false);
    };
    if prev.dims.len() != model.len() {
        warn!(
            previous = prev.dims.len(),
            current = model.len(),
            "discarding previous geometry recorded for a different model"
        );
        return (draw, false);
    }
    for (state, &dims) in draw.iter_mut().zip(prev.dims.iter()) {
        state.dims = dims;
        state.prev_dims = dims;
    }
    (draw, true)
}
