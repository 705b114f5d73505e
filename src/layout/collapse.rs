// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use smallvec::{SmallVec, smallvec};
use tracing::{debug, trace};

use crate::common::Result;
use crate::layout_err;
use crate::model::{Model, NodeId};

use super::config::{CollapseConfig, LayoutConfig};
use super::{DrawState, has_displayed_children, is_displayed, is_expanded};

/// Apply the collapse policy and compute every node's leaf count.
///
/// Hidden and filtered nodes count zero leaves and are not descended into.
/// A minimized node counts as exactly one leaf regardless of its subtree.
/// Returns the nodes minimized by policy rather than by the user, in
/// pre-order.
pub fn compute_leaves(
    model: &Model,
    config: &LayoutConfig,
    draw: &mut [DrawState],
) -> Result<Vec<NodeId>> {
    let large = model.node_count() > config.collapse.node_count_threshold;
    let mut auto_minimized = Vec::new();

    for id in model.ids() {
        draw[id.index()].minimized = model.node(id).flags.minimized;
    }

    // pre-order: decide collapse state top-down
    let mut order: Vec<NodeId> = Vec::with_capacity(model.node_count());
    let mut stack: SmallVec<[NodeId; 64]> = smallvec![model.root()];
    let mut visits = 0;
    while let Some(id) = stack.pop() {
        visits += 1;
        if visits > model.len() {
            return layout_err!(
                MalformedModel,
                format!("visited more than {} nodes while counting leaves", model.len())
            );
        }

        let node = model.node(id);
        let state = &mut draw[id.index()];
        if !is_displayed(node) {
            state.num_leaves = 0;
            continue;
        }

        if !state.minimized {
            let aggregate = config.minimize_auto_aggregate
                && node.flags.auto_aggregate
                && !node.flags.manually_expanded;
            if aggregate || (large && should_auto_minimize(model, &config.collapse, id)) {
                state.minimized = true;
                auto_minimized.push(id);
                if config.debug {
                    trace!(node = %node.path, depth = node.depth, "auto-minimized");
                }
            }
        }

        order.push(id);
        if !state.minimized && has_displayed_children(model, node) {
            stack.extend(node.children.iter().rev().copied());
        }
    }

    // post-order: sum leaves bottom-up
    for &id in order.iter().rev() {
        let leaves = if is_expanded(model, draw, id) {
            model
                .node(id)
                .children
                .iter()
                .map(|child| draw[child.index()].num_leaves)
                .sum()
        } else {
            1
        };
        draw[id.index()].num_leaves = leaves;
    }

    debug!(
        root_leaves = draw[model.root().index()].num_leaves,
        auto_minimized = auto_minimized.len(),
        large,
        "computed leaf counts"
    );

    Ok(auto_minimized)
}

/// Size-based test bounding how many rows can be visible at one depth: a
/// node whose children would crowd their depth past the ceiling shows as a
/// single row instead.
fn should_auto_minimize(model: &Model, collapse: &CollapseConfig, id: NodeId) -> bool {
    let node = model.node(id);
    if model.is_root(id) || node.flags.manually_expanded || !has_displayed_children(model, node)
    {
        return false;
    }

    let depth_start = if node.kind.is_component() {
        collapse.component_depth_start
    } else {
        collapse.group_depth_start
    };

    (node.depth >= depth_start && node.children.len() > collapse.child_count_threshold)
        || model.depth_count(node.depth + 1) > collapse.depth_count_threshold
}
