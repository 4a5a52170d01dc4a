//! Configuration types for the ONNX tabular and image classifiers.

use serde::{Deserialize, Serialize};

use super::artefact::OnnxArtefact;

/// Default string output holding the predicted label in skl2onnx exports.
pub const DEFAULT_LABEL_OUTPUT: &str = "output_label";

/// How the validated row is fed to the tabular graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "layout", rename_all = "snake_case", deny_unknown_fields)]
pub enum TabularInputLayout {
    /// One `[1, 1]` string tensor per feature, named after the feature.
    ///
    /// This is what skl2onnx produces for a pipeline fitted on a data frame.
    PerColumn,
    /// A single `[1, feature_count]` string tensor in schema order.
    Packed {
        /// Graph input receiving the packed row.
        input_name: String,
    },
}

/// Configuration for the tabular edibility classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnnxTabularConfig {
    /// Model artefact (ONNX graph exported from the fitted pipeline).
    pub model: OnnxArtefact,
    /// Input tensor arrangement.
    pub layout: TabularInputLayout,
    /// String output carrying the predicted label.
    pub label_output: String,
}

impl OnnxTabularConfig {
    /// Per-column layout reading [`DEFAULT_LABEL_OUTPUT`].
    #[must_use]
    pub fn per_column(model: OnnxArtefact) -> Self {
        Self {
            model,
            layout: TabularInputLayout::PerColumn,
            label_output: DEFAULT_LABEL_OUTPUT.to_owned(),
        }
    }
}

/// Configuration for the species image classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnnxImageConfig {
    /// Model artefact (ONNX graph exported from the trained network).
    pub model: OnnxArtefact,
    /// Graph input receiving the NHWC batch; the first input when unset.
    #[serde(default)]
    pub input_name: Option<String>,
    /// Graph output holding the probability vector; the first output when unset.
    #[serde(default)]
    pub output_name: Option<String>,
    /// Number of classes the output vector must contain.
    /// Must be greater than zero and equal to the label set length.
    pub class_count: usize,
}
