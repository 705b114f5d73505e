// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use smallvec::{SmallVec, smallvec};
use tracing::{debug, trace};

use crate::common::Result;
use crate::layout_err;
use crate::model::{Model, NodeId};

use super::columns::Column;
use super::{Dims, DrawState, is_displayed, is_expanded};

/// Width and height given to nodes that are out of view, so they can be
/// animated shrinking into their parent rather than vanishing.
pub const COLLAPSED_EXTENT: f64 = 1e-6;

/// Node sequences produced by [`compute_positions`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Placement {
    /// Displayed nodes in the zoomed subtree that are not inside a
    /// minimized subtree, in pre-order.
    pub zoomed_nodes: Vec<NodeId>,
    /// The rows of the matrix: displayed leaves and minimized roots in
    /// the zoomed subtree, in pre-order.
    pub visible_nodes: Vec<NodeId>,
}

#[derive(Clone, Copy)]
struct Frame {
    id: NodeId,
    leaf_counter: usize,
    in_zoomed: bool,
    /// The minimized (or leaf) node standing in for this branch.
    earliest_minimized: Option<NodeId>,
    hidden_above: bool,
}

/// Compute every node's normalized (0..1) geometry.
///
/// x is the node's column location over the tree width; y is the running
/// leaf count over the root's leaves. Nodes below a minimized node share
/// its box, and the leaf counter does not advance inside it.
///
/// `seeded` says whether `draw` carries geometry from a previous pass. An
/// input or output leaving view inside a minimized box keeps that previous
/// geometry; without it, it collapses onto its parent like any other
/// undisplayed node.
pub fn compute_positions(
    model: &Model,
    zoomed: NodeId,
    draw: &mut [DrawState],
    columns: &[Column],
    tree_width: f64,
    seeded: bool,
) -> Result<Placement> {
    let root = model.root();
    let root_leaves = match draw[root.index()].num_leaves {
        0 => 1.0,
        n => n as f64,
    };
    let tree_width = if tree_width > 0.0 { tree_width } else { 1.0 };

    let mut placement = Placement::default();
    let mut stack: SmallVec<[Frame; 64]> = smallvec![Frame {
        id: root,
        leaf_counter: 0,
        in_zoomed: false,
        earliest_minimized: None,
        hidden_above: false,
    }];
    let mut visits = 0;

    while let Some(frame) = stack.pop() {
        visits += 1;
        if visits > model.len() {
            return layout_err!(
                MalformedModel,
                format!("visited more than {} nodes while positioning", model.len())
            );
        }

        let id = frame.id;
        let node = model.node(id);
        let in_zoomed = frame.in_zoomed || id == zoomed;
        let visible = !frame.hidden_above && is_displayed(node);
        let expanded = is_expanded(model, draw, id);
        let mut earliest = frame.earliest_minimized;

        if earliest.is_none() && in_zoomed && visible {
            placement.zoomed_nodes.push(id);
            if !expanded {
                placement.visible_nodes.push(id);
                earliest = Some(id);
            }
        }

        let dims = if !visible {
            collapsed_onto(model, draw, columns, tree_width, node.parent)
        } else {
            let effective = earliest.unwrap_or(id);
            let col = columns[model.node(effective).depth];
            let x = col.location / tree_width;
            let width = if earliest.is_none() && expanded {
                col.width / tree_width
            } else {
                1.0 - x
            };
            Dims {
                x,
                y: frame.leaf_counter as f64 / root_leaves,
                width,
                height: draw[effective.index()].num_leaves as f64 / root_leaves,
            }
        };
        draw[id.index()].dims = dims;

        // undisplayed subtrees are still walked so every descendant
        // collapses toward its parent
        let mut leaf_counter = frame.leaf_counter;
        let mut children: SmallVec<[Frame; 16]> = SmallVec::new();
        for &child in &node.children {
            let child_node = model.node(child);
            let child_visible = visible && is_displayed(child_node);
            // an input/output leaving view inside a collapsed box keeps its
            // previous geometry, if the pass has any
            let frozen =
                child_node.kind.is_input_or_output() && !child_visible && earliest.is_some();
            if !frozen {
                children.push(Frame {
                    id: child,
                    leaf_counter,
                    in_zoomed,
                    earliest_minimized: earliest,
                    hidden_above: !visible,
                });
            } else if seeded {
                let state = &mut draw[child.index()];
                state.dims = state.prev_dims;
            } else {
                let dims = collapsed_onto(model, draw, columns, tree_width, Some(id));
                draw[child.index()].dims = dims;
            }
            if earliest.is_none() {
                leaf_counter += draw[child.index()].num_leaves;
            }
        }
        stack.extend(children.into_iter().rev());
    }

    debug!(
        zoomed_nodes = placement.zoomed_nodes.len(),
        visible_nodes = placement.visible_nodes.len(),
        "computed normalized positions"
    );
    if let Some(first) = placement.visible_nodes.first() {
        trace!(first = %model.node(*first).path, "first visible row");
    }

    Ok(placement)
}

/// Sentinel box at the parent's column and row.
fn collapsed_onto(
    model: &Model,
    draw: &[DrawState],
    columns: &[Column],
    tree_width: f64,
    parent: Option<NodeId>,
) -> Dims {
    match parent {
        Some(parent) => Dims {
            x: columns[model.node(parent).depth].location / tree_width,
            y: draw[parent.index()].dims.y,
            width: COLLAPSED_EXTENT,
            height: COLLAPSED_EXTENT,
        },
        None => Dims {
            x: 0.0,
            y: 0.0,
            width: COLLAPSED_EXTENT,
            height: COLLAPSED_EXTENT,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::collapse::compute_leaves;
    use crate::layout::columns::compute_columns;
    use crate::layout::config::LayoutConfig;
    use crate::layout::text::{EstimatedTextMeasurer, MeasureCache};
    use crate::model::NodeKind;

    const EPS: f64 = 1e-9;

    fn place(model: &Model, zoomed: NodeId) -> (Vec<DrawState>, Placement) {
        place_from(model, zoomed, None)
    }

    fn place_from(
        model: &Model,
        zoomed: NodeId,
        previous: Option<&[Dims]>,
    ) -> (Vec<DrawState>, Placement) {
        let config = LayoutConfig::default();
        let mut draw = vec![DrawState::default(); model.len()];
        if let Some(previous) = previous {
            for (state, &dims) in draw.iter_mut().zip(previous) {
                state.dims = dims;
                state.prev_dims = dims;
            }
        }
        compute_leaves(model, &config, &mut draw).unwrap();
        let mut measurer = EstimatedTextMeasurer::default();
        let mut cache = MeasureCache::new(&mut measurer);
        let sizing = compute_columns(model, zoomed, &config, &mut draw, &mut cache).unwrap();
        let placement = compute_positions(
            model,
            zoomed,
            &mut draw,
            &sizing.columns,
            sizing.tree_width,
            previous.is_some(),
        )
        .unwrap();
        (draw, placement)
    }

    fn minimized_component_with_hidden_input() -> (Model, NodeId, NodeId) {
        let mut model = Model::new("root");
        let root = model.root();
        let comp = model.add_child(root, "comp", NodeKind::Component).unwrap();
        let input = model.add_child(comp, "in", NodeKind::Input).unwrap();
        model.add_child(comp, "out", NodeKind::Output).unwrap();
        model.add_child(root, "tail", NodeKind::Output).unwrap();
        model.flags_mut(comp).unwrap().minimized = true;
        model.flags_mut(input).unwrap().hidden = true;
        (model, comp, input)
    }

    #[test]
    fn test_two_leaves_split_height() {
        let mut model = Model::new("root");
        let root = model.root();
        let a = model.add_child(root, "A", NodeKind::Output).unwrap();
        let b = model.add_child(root, "B", NodeKind::Output).unwrap();

        let (draw, placement) = place(&model, root);
        assert_eq!(placement.visible_nodes, vec![a, b]);
        assert_eq!(placement.zoomed_nodes, vec![root, a, b]);
        assert!((draw[a.index()].dims.y - 0.0).abs() < EPS);
        assert!((draw[b.index()].dims.y - 0.5).abs() < EPS);
        assert!((draw[a.index()].dims.height - 0.5).abs() < EPS);
        assert!((draw[root.index()].dims.height - 1.0).abs() < EPS);
        // leaves extend to the right edge
        assert!((draw[a.index()].dims.x + draw[a.index()].dims.width - 1.0).abs() < EPS);
    }

    #[test]
    fn test_minimized_subtree_is_one_row() {
        let mut model = Model::new("root");
        let root = model.root();
        let g = model.add_child(root, "g", NodeKind::Group).unwrap();
        let c = model.add_child(g, "c", NodeKind::Component).unwrap();
        let x = model.add_child(c, "x", NodeKind::Input).unwrap();
        model.add_child(c, "y", NodeKind::Output).unwrap();
        let leaf = model.add_child(root, "z", NodeKind::Output).unwrap();
        model.flags_mut(g).unwrap().minimized = true;

        let (draw, placement) = place(&model, root);
        assert_eq!(placement.visible_nodes, vec![g, leaf]);
        assert!((draw[g.index()].dims.height - 0.5).abs() < EPS);
        assert!((draw[leaf.index()].dims.y - 0.5).abs() < EPS);

        // descendants share the minimized box
        assert_eq!(draw[c.index()].dims, draw[g.index()].dims);
        assert!((draw[x.index()].dims.y - draw[g.index()].dims.y).abs() < EPS);
        assert!((draw[x.index()].dims.x - draw[g.index()].dims.x).abs() < EPS);
    }

    #[test]
    fn test_hidden_input_collapses_to_parent() {
        let mut model = Model::new("root");
        let root = model.root();
        let c = model.add_child(root, "c", NodeKind::Component).unwrap();
        let x = model.add_child(c, "x", NodeKind::Input).unwrap();
        let y = model.add_child(c, "y", NodeKind::Output).unwrap();
        model.flags_mut(x).unwrap().hidden = true;

        let (draw, placement) = place(&model, root);
        assert_eq!(placement.visible_nodes, vec![y]);

        let dims = draw[x.index()].dims;
        assert!((dims.width - COLLAPSED_EXTENT).abs() < EPS);
        assert!((dims.height - COLLAPSED_EXTENT).abs() < EPS);
        assert!((dims.y - draw[c.index()].dims.y).abs() < EPS);
        assert!((dims.x - draw[c.index()].dims.x).abs() < EPS);
        assert!(dims.width > 0.0);
    }

    #[test]
    fn test_first_pass_hidden_input_under_minimized_collapses() {
        let (model, comp, input) = minimized_component_with_hidden_input();
        let (draw, placement) = place(&model, model.root());
        assert!(placement.visible_nodes.contains(&comp));

        let parent = draw[comp.index()].dims;
        let dims = draw[input.index()].dims;
        assert!(dims.width > 0.0);
        assert!((dims.width - COLLAPSED_EXTENT).abs() < EPS);
        assert!((dims.height - COLLAPSED_EXTENT).abs() < EPS);
        assert!((dims.x - parent.x).abs() < EPS);
        assert!((dims.y - parent.y).abs() < EPS);
    }

    #[test]
    fn test_hidden_input_under_minimized_keeps_previous() {
        let (model, _, input) = minimized_component_with_hidden_input();
        let mut previous = vec![Dims::default(); model.len()];
        let earlier = Dims {
            x: 0.5,
            y: 0.25,
            width: 0.5,
            height: 0.25,
        };
        previous[input.index()] = earlier;

        let (draw, _) = place_from(&model, model.root(), Some(&previous));
        assert_eq!(draw[input.index()].dims, earlier);
    }

    #[test]
    fn test_zoomed_subtree_only_rows() {
        let mut model = Model::new("root");
        let root = model.root();
        let g1 = model.add_child(root, "g1", NodeKind::Group).unwrap();
        let a = model.add_child(g1, "a", NodeKind::Output).unwrap();
        let b = model.add_child(g1, "b", NodeKind::Output).unwrap();
        let g2 = model.add_child(root, "g2", NodeKind::Group).unwrap();
        let c = model.add_child(g2, "c", NodeKind::Output).unwrap();

        let (draw, placement) = place(&model, g2);
        assert_eq!(placement.visible_nodes, vec![c]);
        assert_eq!(placement.zoomed_nodes, vec![g2, c]);

        // geometry outside the zoomed subtree is still computed
        assert!((draw[a.index()].dims.y - 0.0).abs() < EPS);
        assert!((draw[b.index()].dims.y - 1.0 / 3.0).abs() < EPS);
        assert!((draw[g2.index()].dims.y - 2.0 / 3.0).abs() < EPS);
    }

    #[test]
    fn test_bounds_hold() {
        let mut model = Model::new("root");
        let root = model.root();
        let g = model.add_child(root, "group", NodeKind::Group).unwrap();
        for i in 0..3 {
            let c = model
                .add_child(g, &format!("comp{i}"), NodeKind::Component)
                .unwrap();
            for j in 0..i + 1 {
                model
                    .add_child(c, &format!("v{j}"), NodeKind::Output)
                    .unwrap();
            }
        }
        model.add_child(root, "tail", NodeKind::Output).unwrap();

        let (draw, _placement) = place(&model, root);
        for state in &draw {
            let d = state.dims;
            assert!((0.0..=1.0).contains(&d.x));
            assert!((0.0..=1.0).contains(&d.y));
            assert!(d.x + d.width <= 1.0 + EPS);
            assert!(d.y + d.height <= 1.0 + EPS);
        }
    }
}
