use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the ONNX Runtime backed classifiers.
#[derive(Debug, Error)]
pub enum OnnxModelError {
    #[error("failed to read artefact at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("artefact at {path} expected SHA-256 {expected} but found {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },
    #[error("failed to construct ONNX session builder: {0}")]
    CreateSessionBuilder(#[source] ort::Error),
    #[error("failed to create ONNX session: {0}")]
    CreateSession(#[source] ort::Error),
    #[error("model graph declares no inputs")]
    NoInputs,
    #[error("model graph declares no outputs")]
    NoOutputs,
    #[error("model graph has no input named \"{name}\"")]
    MissingInput { name: String },
    #[error("model graph has no output named \"{name}\"")]
    MissingOutput { name: String },
    #[error("image classifier requires class_count > 0")]
    ZeroClassCount,
    #[error("failed to convert input into tensor: {0}")]
    EncodeTensor(#[source] ort::Error),
    #[error("session mutex was poisoned by a previous panic")]
    SessionPoisoned,
    #[error("failed to run inference: {0}")]
    Inference(#[source] ort::Error),
    #[error("ONNX output \"{name}\" missing from session results")]
    OutputMissing { name: String },
    #[error("ONNX output \"{name}\" is empty")]
    EmptyOutput { name: String },
    #[error("ONNX output \"{name}\" has {actual} values but expected {expected}")]
    UnexpectedOutputLength {
        name: String,
        expected: usize,
        actual: usize,
    },
}
