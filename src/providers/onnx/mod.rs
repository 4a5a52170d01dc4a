//! ONNX Runtime backed tabular and image classifiers with artefact
//! verification.
//!
//! Both models are consumed as ONNX graphs: the scikit-learn pipeline
//! exported with `skl2onnx` and the Keras network exported with `tf2onnx`.
mod artefact;
mod config;
mod errors;
mod session;
mod tabular;
mod vision;

pub use artefact::{OnnxArtefact, compute_sha256, normalise_hex};
pub use config::{DEFAULT_LABEL_OUTPUT, OnnxImageConfig, OnnxTabularConfig, TabularInputLayout};
pub use errors::OnnxModelError;
pub use tabular::OnnxTabularClassifier;
pub use vision::OnnxImageClassifier;
