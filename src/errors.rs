//! Error types shared by the inference adapters and the model cache.

use std::path::PathBuf;

use thiserror::Error;

/// Boxed cause carried by load and prediction failures.
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced to callers of the inference adapters.
///
/// Each kind is terminal for the request that produced it. No kind is ever
/// replaced by a default prediction.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The model artefact is missing, corrupt, or incompatible.
    #[error("failed to load model from {path}: {source}")]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: BoxedCause,
    },
    /// The caller supplied input outside the accepted schema or format.
    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),
    /// The model rejected well-formed input or returned output that breaks
    /// its contract.
    #[error("prediction failed: {0}")]
    Prediction(#[source] BoxedCause),
}

impl ClassifyError {
    /// Whether this error came from caller input.
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    pub(crate) fn prediction(cause: impl Into<BoxedCause>) -> Self {
        Self::Prediction(cause.into())
    }
}

/// Caller errors detected before any model is invoked.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    #[error("missing value for feature \"{name}\"")]
    MissingFeature { name: &'static str },
    #[error("unknown feature \"{name}\"")]
    UnknownFeature { name: String },
    #[error("feature \"{name}\" was given more than once")]
    DuplicateFeature { name: String },
    #[error("code {code:?} is not valid for feature \"{name}\"; expected one of {allowed:?}")]
    InvalidCode {
        name: &'static str,
        code: String,
        allowed: &'static [&'static str],
    },
    #[error("malformed trait pair {pair:?}; expected name=code")]
    MalformedPair { pair: String },
    #[error("failed to read image {path}: {source}")]
    UnreadableImage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported image format; expected JPEG or PNG")]
    UnsupportedImageFormat,
    #[error("failed to decode image: {0}")]
    UndecodableImage(#[source] image::ImageError),
}

/// Errors describing a model output that does not match the label set.
#[derive(Debug, Error, PartialEq)]
pub enum OutputContractError {
    #[error("model returned no label")]
    EmptyLabel,
    #[error("model returned {actual} probabilities but {expected} classes are configured")]
    ProbabilityCount { expected: usize, actual: usize },
    #[error("model returned non-finite probability {value} at index {index}")]
    NonFinite { index: usize, value: f32 },
    #[error("model returned probability {value} outside [0, 1] at index {index}")]
    OutOfRange { index: usize, value: f32 },
    #[error("preprocessed batch has {actual} values but shape {shape:?} requires {expected}")]
    BatchShape {
        shape: [usize; 4],
        expected: usize,
        actual: usize,
    },
}
