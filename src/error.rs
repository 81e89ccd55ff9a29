//! Error types for the particle field.
//!
//! None of these ever reach the end user: the field is decoration, so the
//! scheduler logs them and degrades to an idle or stopped state.

use std::fmt;

/// Errors that can occur while setting up or driving a particle field.
#[derive(Debug)]
pub enum FieldError {
    /// The drawing surface (canvas / 2D context) could not be acquired.
    SurfaceUnavailable(String),
    /// Settings parsed but failed validation.
    InvalidSettings(String),
    /// Settings override was not valid JSON for `FieldSettings`.
    SettingsJson(serde_json::Error),
    /// The host refused a frame request or listener registration.
    Host(String),
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::SurfaceUnavailable(msg) => write!(f, "Drawing surface unavailable: {}", msg),
            FieldError::InvalidSettings(msg) => write!(f, "Invalid field settings: {}", msg),
            FieldError::SettingsJson(e) => write!(f, "Failed to parse field settings: {}", e),
            FieldError::Host(msg) => write!(f, "Host error: {}", msg),
        }
    }
}

impl std::error::Error for FieldError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FieldError::SettingsJson(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for FieldError {
    fn from(e: serde_json::Error) -> Self {
        FieldError::SettingsJson(e)
    }
}
