//! Model interfaces consumed by the inference adapters.
//!
//! The adapters only depend on these traits. Concrete backends (the ONNX
//! Runtime sessions in [`onnx`]) and test fakes implement them.

#[cfg(feature = "onnx")]
pub mod onnx;

use crate::{tabular::TabularRow, vision::ImageBatch};

/// A classifier over the categorical feature schema.
pub trait TabularModel {
    /// Error type returned when the model call fails.
    ///
    /// Errors must be `Send + Sync + 'static` so adapters can box them as
    /// the cause of a prediction failure.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Predict the class label of a single validated row.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying model call fails.
    fn predict_label(&self, row: &TabularRow) -> Result<String, Self::Error>;
}

/// A multi-class classifier over preprocessed pixel batches.
pub trait ImageModel {
    /// Error type returned when the model call fails.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Return the class probability vector for a batch holding one image.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying model call fails.
    fn predict_probabilities(&self, batch: &ImageBatch) -> Result<Vec<f32>, Self::Error>;
}

impl<M: TabularModel + ?Sized> TabularModel for std::sync::Arc<M> {
    type Error = M::Error;

    fn predict_label(&self, row: &TabularRow) -> Result<String, Self::Error> {
        (**self).predict_label(row)
    }
}

impl<M: ImageModel + ?Sized> ImageModel for std::sync::Arc<M> {
    type Error = M::Error;

    fn predict_probabilities(&self, batch: &ImageBatch) -> Result<Vec<f32>, Self::Error> {
        (**self).predict_probabilities(batch)
    }
}
