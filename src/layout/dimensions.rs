// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Container size chosen to fit a viewport, and the scale it implies.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FitDimensions {
    pub width: f64,
    pub height: f64,
    /// At most 1.
    pub ratio: f64,
}

/// Pixel arithmetic for the diagram container: the partition tree on the
/// left, the square matrix on the right, with a margin around the matrix.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DimensionPlanner {
    pub tree: Size,
    pub matrix: Size,
    pub margin: f64,
    pub viewport_margin: f64,
}

impl DimensionPlanner {
    pub fn new(tree: Size, margin: f64, viewport_margin: f64) -> Self {
        Self {
            tree,
            matrix: Size::new(tree.height, tree.height),
            margin,
            viewport_margin,
        }
    }

    pub fn inner_dimensions(&self) -> Size {
        Size::new(self.tree.width + self.matrix.width, self.matrix.height)
    }

    pub fn outer_dimensions(&self) -> Size {
        let inner = self.inner_dimensions();
        Size::new(
            inner.width + 2.0 * self.margin,
            inner.height + 2.0 * self.margin,
        )
    }

    /// Size the container to the viewport, height first, then clamp by
    /// width. The matrix stays square, so the outer width grows one pixel
    /// per pixel of outer height.
    pub fn fit_dimensions(&self, viewport: Size, manually_resized: bool) -> FitDimensions {
        let outer = self.outer_dimensions();
        let available = Size::new(
            (viewport.width - self.viewport_margin).max(0.0),
            (viewport.height - self.viewport_margin).max(0.0),
        );

        if manually_resized || (outer.width <= available.width && outer.height <= available.height)
        {
            return FitDimensions {
                width: outer.width,
                height: outer.height,
                ratio: 1.0,
            };
        }

        let mut height = available.height;
        let mut width = self.width_for_height(height);
        if width > available.width {
            width = available.width;
            height = self.height_for_width(width);
        }

        let ratio = if outer.height > 0.0 {
            (height / outer.height).min(1.0)
        } else {
            1.0
        };

        FitDimensions {
            width,
            height,
            ratio,
        }
    }

    fn width_for_height(&self, height: f64) -> f64 {
        self.tree.width + height
    }

    fn height_for_width(&self, width: f64) -> f64 {
        (width - self.tree.width).max(0.0)
    }
}
