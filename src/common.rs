// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fmt;
use std::{error, result};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// A node references a parent or child outside the arena, the
    /// parent/child links disagree, or a cycle was found.
    MalformedModel,
    /// The text measurement collaborator could not produce a width.
    MeasurementUnavailable,
    /// The zoomed element is not reachable from the model root.
    EmptyZoomTarget,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ErrorCode::*;
        let name = match self {
            MalformedModel => "malformed_model",
            MeasurementUnavailable => "measurement_unavailable",
            EmptyZoomTarget => "empty_zoom_target",
        };

        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub code: ErrorCode,
    pub details: Option<String>,
}

impl Error {
    pub fn new(code: ErrorCode, details: Option<String>) -> Self {
        Error { code, details }
    }

    pub fn get_details(&self) -> Option<String> {
        self.details.clone()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.details {
            Some(ref details) => write!(f, "LayoutError{{{}: {}}}", self.code, details),
            None => write!(f, "LayoutError{{{}}}", self.code),
        }
    }
}

impl error::Error for Error {}

pub type Result<T> = result::Result<T, Error>;

#[macro_export]
macro_rules! layout_err {
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode};
        Err(Error::new(ErrorCode::$code, Some($str)))
    }};
    ($code:tt) => {{
        use $crate::common::{Error, ErrorCode};
        Err(Error::new(ErrorCode::$code, None))
    }};
}

#[test]
fn test_error_display() {
    let err = Error::new(ErrorCode::MalformedModel, Some("cycle at node 3".to_string()));
    assert_eq!(
        format!("{err}"),
        "LayoutError{malformed_model: cycle at node 3}"
    );

    let err = Error::new(ErrorCode::EmptyZoomTarget, None);
    assert_eq!(format!("{err}"), "LayoutError{empty_zoom_target}");
    assert_eq!(err.get_details(), None);
}

#[test]
fn test_layout_err_macro() {
    fn fails() -> Result<()> {
        layout_err!(MeasurementUnavailable, "surface not mounted".to_string())
    }

    let err = fails().unwrap_err();
    assert_eq!(err.code, ErrorCode::MeasurementUnavailable);
    assert_eq!(err.get_details().as_deref(), Some("surface not mounted"));
}

#[test]
fn test_error_code_names() {
    let names: Vec<String> = [
        ErrorCode::MalformedModel,
        ErrorCode::MeasurementUnavailable,
        ErrorCode::EmptyZoomTarget,
    ]
    .iter()
    .map(|code| code.to_string())
    .collect();
    assert_eq!(
        names,
        ["malformed_model", "measurement_unavailable", "empty_zoom_target"]
    );
}
