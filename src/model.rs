// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Index-addressed arena holding the model hierarchy.
//!
//! The layout engine only ever borrows a `Model`: structure (parent and
//! child links, depth, path) is fixed once the arena is built, and the
//! per-node flags are changed by the diagram controller between layout
//! passes through [`Model::flags_mut`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::Result;
use crate::layout_err;

/// Index of a node in its owning [`Model`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Indices above `u32::MAX` are truncated; use [`NodeId::try_new`]
    /// for indices that come from arena sizes.
    pub fn new(index: usize) -> Self {
        NodeId(index as u32)
    }

    pub fn try_new(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(NodeId)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Root,
    Group,
    Component,
    Input,
    Output,
    /// Collector for variables removed from view by a search filter.
    Filter,
}

impl NodeKind {
    pub fn is_input_or_output(self) -> bool {
        matches!(self, NodeKind::Input | NodeKind::Output)
    }

    pub fn is_filter(self) -> bool {
        self == NodeKind::Filter
    }

    pub fn is_component(self) -> bool {
        self == NodeKind::Component
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeFlags {
    pub hidden: bool,
    pub filtered: bool,
    pub minimized: bool,
    pub manually_expanded: bool,
    /// Set on the aggregate the model preprocessor generates at the top of
    /// the hierarchy, which starts out collapsed.
    pub auto_aggregate: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub name: String,
    /// Dot-joined absolute path; empty for the root.
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub depth: usize,
    #[serde(default)]
    pub parent: Option<NodeId>,
    #[serde(default)]
    pub children: Vec<NodeId>,
    pub kind: NodeKind,
    #[serde(default)]
    pub flags: NodeFlags,
}

impl TreeNode {
    pub fn new(name: &str, kind: NodeKind) -> Self {
        TreeNode {
            name: name.to_string(),
            path: String::new(),
            depth: 0,
            parent: None,
            children: Vec::new(),
            kind,
            flags: NodeFlags::default(),
        }
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Neither hidden nor filtered.
    pub fn is_displayed(&self) -> bool {
        !(self.flags.hidden || self.flags.filtered)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Model {
    nodes: Vec<TreeNode>,
    root: NodeId,
    /// Number of root-reachable nodes at each depth.
    depth_counts: Vec<usize>,
    reachable: Vec<bool>,
}

impl Model {
    /// Start a model containing only its root.
    pub fn new(root_name: &str) -> Self {
        Model {
            nodes: vec![TreeNode::new(root_name, NodeKind::Root)],
            root: NodeId(0),
            depth_counts: vec![1],
            reachable: vec![true],
        }
    }

    /// Append `name` as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeId, name: &str, kind: NodeKind) -> Result<NodeId> {
        let Some(parent_node) = self.nodes.get(parent.index()) else {
            return layout_err!(
                MalformedModel,
                format!("parent {parent} is not in the model")
            );
        };

        let Some(id) = NodeId::try_new(self.nodes.len()) else {
            return layout_err!(
                MalformedModel,
                format!("model already holds {} nodes", self.nodes.len())
            );
        };
        let depth = parent_node.depth + 1;
        let path = join_path(&parent_node.path, name);
        let reachable = self.reachable[parent.index()];

        let mut node = TreeNode::new(name, kind);
        node.depth = depth;
        node.path = path;
        node.parent = Some(parent);

        self.nodes.push(node);
        self.nodes[parent.index()].children.push(id);
        self.reachable.push(reachable);
        if reachable {
            if self.depth_counts.len() <= depth {
                self.depth_counts.resize(depth + 1, 0);
            }
            self.depth_counts[depth] += 1;
        }

        Ok(id)
    }

    /// Adopt a pre-materialized arena, checking that its links form a
    /// forest and recomputing every node's depth and path.
    ///
    /// Nodes that have no parent and are not `root` are kept as detached
    /// subtrees; they take no part in layout.
    pub fn from_nodes(mut nodes: Vec<TreeNode>, root: NodeId) -> Result<Model> {
        let n = nodes.len();
        if n > 0 && NodeId::try_new(n - 1).is_none() {
            return layout_err!(
                MalformedModel,
                format!("arena of {n} nodes does not fit node ids")
            );
        }
        if root.index() >= n {
            return layout_err!(MalformedModel, format!("root {root} is not in the arena"));
        }
        if let Some(parent) = nodes[root.index()].parent {
            return layout_err!(
                MalformedModel,
                format!("root {root} has parent {parent}")
            );
        }

        let mut claimed = vec![false; n];
        for (i, node) in nodes.iter().enumerate() {
            let id = NodeId::new(i);
            if let Some(parent) = node.parent {
                let Some(parent_node) = nodes.get(parent.index()) else {
                    return layout_err!(
                        MalformedModel,
                        format!("node {id} references missing parent {parent}")
                    );
                };
                if !parent_node.children.contains(&id) {
                    return layout_err!(
                        MalformedModel,
                        format!("node {id} is not listed as a child of its parent {parent}")
                    );
                }
            }
            for &child in &node.children {
                let Some(child_node) = nodes.get(child.index()) else {
                    return layout_err!(
                        MalformedModel,
                        format!("node {id} references missing child {child}")
                    );
                };
                if child_node.parent != Some(id) || claimed[child.index()] {
                    return layout_err!(
                        MalformedModel,
                        format!("child {child} of node {id} has inconsistent parent links")
                    );
                }
                claimed[child.index()] = true;
            }
        }

        // Consistent links still allow parent cycles among detached nodes.
        for start in 0..n {
            let mut steps = 0;
            let mut cur = nodes[start].parent;
            while let Some(p) = cur {
                steps += 1;
                if steps > n {
                    return layout_err!(
                        MalformedModel,
                        format!("cycle detected above node {start}")
                    );
                }
                cur = nodes[p.index()].parent;
            }
        }

        let mut reachable = vec![false; n];
        let mut depth_counts = Vec::new();
        let tops: Vec<usize> = (0..n).filter(|&i| nodes[i].parent.is_none()).collect();
        for top in tops {
            let from_root = top == root.index();
            nodes[top].depth = 0;
            nodes[top].path = String::new();
            let mut stack = vec![top];
            while let Some(i) = stack.pop() {
                let depth = nodes[i].depth;
                if from_root {
                    reachable[i] = true;
                    if depth_counts.len() <= depth {
                        depth_counts.resize(depth + 1, 0);
                    }
                    depth_counts[depth] += 1;
                }
                let children = nodes[i].children.clone();
                for child in children {
                    let path = join_path(&nodes[i].path, &nodes[child.index()].name);
                    let child_node = &mut nodes[child.index()];
                    child_node.depth = depth + 1;
                    child_node.path = path;
                    stack.push(child.index());
                }
            }
        }

        Ok(Model {
            nodes,
            root,
            depth_counts,
            reachable,
        })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Panics if `id` came from a different model.
    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.index())
    }

    pub fn flags_mut(&mut self, id: NodeId) -> Option<&mut NodeFlags> {
        self.nodes.get_mut(id.index()).map(|node| &mut node.flags)
    }

    /// Arena size, including detached nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of nodes reachable from the root.
    pub fn node_count(&self) -> usize {
        self.depth_counts.iter().sum()
    }

    pub fn depth_count(&self, depth: usize) -> usize {
        self.depth_counts.get(depth).copied().unwrap_or(0)
    }

    /// Greatest depth of any node reachable from the root.
    pub fn max_depth(&self) -> usize {
        self.depth_counts.len().saturating_sub(1)
    }

    pub fn is_reachable(&self, id: NodeId) -> bool {
        self.reachable.get(id.index()).copied().unwrap_or(false)
    }

    pub fn is_root(&self, id: NodeId) -> bool {
        id == self.root
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId::new)
    }

    /// Look a node up by absolute path.
    pub fn find(&self, path: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .find(|(i, node)| self.reachable[*i] && node.path == path)
            .map(|(i, _)| NodeId::new(i))
    }
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}
