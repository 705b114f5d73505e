// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Property-based tests for the layout pipeline using proptest.
//!
//! These tests verify that, for arbitrary small hierarchies:
//! 1. Leaf counts match the number of displayed leaves
//! 2. Column locations are exactly the running sum of widths
//! 3. Normalized geometry stays inside the unit square
//! 4. Repeated passes produce identical geometry
//! 5. A minimized subtree lays out exactly like a single leaf

use proptest::prelude::*;

use crate::layout::config::LayoutConfig;
use crate::layout::text::EstimatedTextMeasurer;
use crate::layout::{Layout, LayoutFrame};
use crate::model::{Model, NodeId, NodeKind};

const EPS: f64 = 1e-9;

#[derive(Clone, Debug)]
struct NodeSpec {
    parent: usize,
    kind: NodeKind,
    hidden: bool,
}

fn kind_strategy() -> impl Strategy<Value = NodeKind> {
    prop_oneof![
        Just(NodeKind::Group),
        Just(NodeKind::Component),
        Just(NodeKind::Input),
        Just(NodeKind::Output),
    ]
}

fn node_specs(hidden_allowed: bool) -> impl Strategy<Value = Vec<NodeSpec>> {
    prop::collection::vec(
        (any::<usize>(), kind_strategy(), any::<bool>()),
        1..48,
    )
    .prop_map(move |raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (parent, kind, hidden))| NodeSpec {
                parent: parent % (i + 1),
                kind,
                hidden: hidden_allowed && hidden,
            })
            .collect()
    })
}

fn build(specs: &[NodeSpec]) -> Model {
    let mut model = Model::new("root");
    for (i, spec) in specs.iter().enumerate() {
        let id = model
            .add_child(NodeId::new(spec.parent), &format!("n{i}"), spec.kind)
            .unwrap();
        model.flags_mut(id).unwrap().hidden = spec.hidden;
    }
    model
}

fn run(model: &Model, zoomed: NodeId) -> LayoutFrame {
    let mut measurer = EstimatedTextMeasurer::default();
    Layout::new(model, LayoutConfig::default())
        .compute(zoomed, &mut measurer, None)
        .unwrap()
}

fn zoom_target(model: &Model, pick: usize) -> NodeId {
    let candidates: Vec<NodeId> = model
        .ids()
        .filter(|&id| model.node(id).has_children() && !model.node(id).flags.hidden)
        .collect();
    if candidates.is_empty() {
        model.root()
    } else {
        candidates[pick % candidates.len()]
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn leaf_count_matches_displayed_leaves(specs in node_specs(false)) {
        let model = build(&specs);
        let frame = run(&model, model.root());
        let leaves = model.ids().filter(|&id| !model.node(id).has_children()).count();
        prop_assert_eq!(frame.draw_state(model.root()).num_leaves, leaves);
        prop_assert_eq!(frame.visible_nodes.len(), leaves);
    }

    #[test]
    fn columns_are_contiguous(specs in node_specs(true), pick in any::<usize>()) {
        let model = build(&specs);
        let zoomed = zoom_target(&model, pick);
        let frame = run(&model, zoomed);
        let mut expected = 0.0;
        for col in &frame.columns {
            prop_assert!((col.location - expected).abs() < EPS);
            prop_assert!(col.width >= 0.0);
            expected += col.width;
        }
        prop_assert!((frame.tree_size.width - expected).abs() < EPS);
    }

    #[test]
    fn geometry_stays_normalized(specs in node_specs(true), pick in any::<usize>()) {
        let model = build(&specs);
        let zoomed = zoom_target(&model, pick);
        let frame = run(&model, zoomed);
        for state in &frame.draw_states {
            let d = state.dims;
            prop_assert!(d.x >= 0.0 && d.x <= 1.0 + EPS, "x out of range: {:?}", d);
            prop_assert!(d.y >= 0.0 && d.y <= 1.0 + EPS, "y out of range: {:?}", d);
            prop_assert!(d.width >= 0.0 && d.height >= 0.0, "negative extent: {:?}", d);
            prop_assert!(d.x + d.width <= 1.0 + EPS, "x overflow: {:?}", d);
            prop_assert!(d.y + d.height <= 1.0 + EPS, "y overflow: {:?}", d);
        }
    }

    #[test]
    fn repeated_passes_are_identical(specs in node_specs(true), pick in any::<usize>()) {
        let model = build(&specs);
        let zoomed = zoom_target(&model, pick);
        let first = run(&model, zoomed);
        let second = run(&model, zoomed);
        prop_assert_eq!(&first.draw_states, &second.draw_states);
        prop_assert_eq!(&first.columns, &second.columns);
        prop_assert_eq!(&first.visible_nodes, &second.visible_nodes);
        prop_assert_eq!(&first.zoomed_nodes, &second.zoomed_nodes);
        prop_assert_eq!(first.mapping, second.mapping);
    }

    #[test]
    fn minimized_subtree_matches_single_leaf(specs in node_specs(false), pick in any::<usize>()) {
        let model = build(&specs);
        let target = zoom_target(&model, pick);
        prop_assume!(!model.is_root(target));

        let mut minimized = model.clone();
        minimized.flags_mut(target).unwrap().minimized = true;

        let mut pruned = model.clone();
        for &child in &model.node(target).children {
            pruned.flags_mut(child).unwrap().hidden = true;
        }

        let a = run(&minimized, minimized.root());
        let b = run(&pruned, pruned.root());

        prop_assert_eq!(a.visible_nodes.iter().filter(|&&id| id == target).count(), 1);
        prop_assert_eq!(
            a.draw_state(minimized.root()).num_leaves,
            b.draw_state(pruned.root()).num_leaves
        );
        prop_assert_eq!(&a.visible_nodes, &b.visible_nodes);
        let root_leaves = a.draw_state(minimized.root()).num_leaves as f64;
        let d = a.dims(target);
        prop_assert!((d.height - 1.0 / root_leaves).abs() < EPS);
        prop_assert_eq!(d, b.dims(target));
    }
}
