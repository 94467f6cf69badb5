use thiserror::Error;

/// A simulation input (plate parameters, step settings or a config field)
/// fell outside its valid range.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid parameter `{field}`: {reason}")]
pub struct InvalidParameterError {
    pub field: &'static str,
    pub reason: String,
}

impl InvalidParameterError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// A seismic record failed validation. `index` is its position in the input.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid event #{index} ({location}) field `{field}`: {reason}")]
pub struct InvalidEventError {
    pub index: usize,
    pub location: String,
    pub field: &'static str,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    #[error("report metadata field `{0}` must not be empty")]
    EmptyField(&'static str),
}

/// Crate-level error used by the analysis pipeline and the binaries.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parameter(#[from] InvalidParameterError),
    #[error(transparent)]
    Event(#[from] InvalidEventError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("image encoding error: {0}")]
    Image(#[from] image::ImageError),
}

/// Reject NaN and infinities with a field-named error.
pub(crate) fn require_finite(field: &'static str, v: f64) -> Result<f64, InvalidParameterError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(InvalidParameterError::new(field, format!("must be finite, got {v}")))
    }
}
