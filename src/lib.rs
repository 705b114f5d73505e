// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Layout engine for a hierarchical model diagram that pairs a collapsible
//! partition tree with a matrix of the same hierarchy.
//!
//! A [`layout::Layout`] pass turns a borrowed [`model::Model`] and a zoomed
//! element into normalized node geometry, per-depth columns, pixel
//! mappings for animated transitions, and container dimensions.

#![forbid(unsafe_code)]

pub mod common;
pub mod layout;
pub mod model;

#[cfg(test)]
mod layout_proptest;

pub use self::common::{Error, ErrorCode, Result};
pub use self::layout::config::{CollapseConfig, LayoutConfig};
pub use self::layout::text::{EstimatedTextMeasurer, TextMeasurer};
pub use self::layout::{Dims, DrawState, Layout, LayoutFrame, Transition};
pub use self::model::{Model, NodeFlags, NodeId, NodeKind, TreeNode};
