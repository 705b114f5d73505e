// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::HashMap;

use tracing::warn;

use crate::common::Result;
use crate::layout_err;

const CHAR_WIDTH: f64 = 7.0;

/// Source of rendered label widths, normally backed by the drawing surface.
pub trait TextMeasurer {
    /// Width of `text` in pixels.
    fn measure(&mut self, text: &str) -> Result<f64>;
}

/// Estimate text width based on character count.
///
/// Each character is assumed to be `char_width` pixels wide. Suitable for
/// headless layout and tests, not for precise rendering.
#[derive(Clone, Debug)]
pub struct EstimatedTextMeasurer {
    pub char_width: f64,
}

impl Default for EstimatedTextMeasurer {
    fn default() -> Self {
        Self {
            char_width: CHAR_WIDTH,
        }
    }
}

impl TextMeasurer for EstimatedTextMeasurer {
    fn measure(&mut self, text: &str) -> Result<f64> {
        Ok(text.chars().count() as f64 * self.char_width)
    }
}

/// Memoizes widths by exact string for the duration of one layout pass.
///
/// Must not outlive the pass that created it.
pub struct MeasureCache<'a> {
    measurer: &'a mut dyn TextMeasurer,
    widths: HashMap<String, f64>,
    misses: usize,
}

impl<'a> MeasureCache<'a> {
    pub fn new(measurer: &'a mut dyn TextMeasurer) -> Self {
        Self {
            measurer,
            widths: HashMap::new(),
            misses: 0,
        }
    }

    pub fn width(&mut self, text: &str) -> Result<f64> {
        if let Some(&width) = self.widths.get(text) {
            return Ok(width);
        }

        let width = self.measurer.measure(text)?;
        if !width.is_finite() || width < 0.0 {
            warn!(text, width, "text measurer returned an unusable width");
            return layout_err!(
                MeasurementUnavailable,
                format!("measured width {width} for {text:?}")
            );
        }

        self.misses += 1;
        self.widths.insert(text.to_string(), width);
        Ok(width)
    }

    /// Number of distinct strings measured so far.
    pub fn misses(&self) -> usize {
        self.misses
    }
}
