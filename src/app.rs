//! Request handling for the front end: runs each requested prediction path
//! through its model cache and collects the outcomes into a [`Report`].
//!
//! The two paths share no state. A failure on one is recorded and the other
//! still runs.

use std::path::Path;

use serde::Serialize;
use tracing::warn;

use crate::{
    api::{ImagePrediction, TabularPrediction, format_percent},
    config::{ClassLabelSet, IMAGE_SIZE},
    errors::{BoxedCause, ClassifyError},
    loader::ModelCache,
    providers::{ImageModel, TabularModel},
    schema::get_features,
    tabular::{TabularInputRecord, predict_row},
    vision::{predict_batch, preprocess},
};

/// Holds the loaded-model caches and the image label set.
#[derive(Debug)]
pub struct Classifier<T, I> {
    tabular_models: ModelCache<T>,
    image_models: ModelCache<I>,
    labels: ClassLabelSet,
}

impl<T: TabularModel, I: ImageModel> Classifier<T, I> {
    #[must_use]
    pub fn new(labels: ClassLabelSet) -> Self {
        Self {
            tabular_models: ModelCache::new(),
            image_models: ModelCache::new(),
            labels,
        }
    }

    #[must_use]
    pub fn labels(&self) -> &ClassLabelSet {
        &self.labels
    }

    /// Classify trait codes with the tabular model at `model_path`.
    ///
    /// The record is validated first; a rejected record never triggers a
    /// model load.
    ///
    /// # Errors
    ///
    /// Propagates load, input, and prediction failures as [`ClassifyError`].
    pub fn classify_traits<F, E>(
        &self,
        model_path: &Path,
        load: F,
        record: &TabularInputRecord,
    ) -> Result<TabularPrediction, ClassifyError>
    where
        F: FnOnce(&Path) -> Result<T, E>,
        E: Into<BoxedCause>,
    {
        let row = record.to_row(&get_features())?;
        let model = self.tabular_models.get_or_load(model_path, load)?;
        predict_row(&*model, &row)
    }

    /// Classify an encoded photo with the image model at `model_path`.
    ///
    /// The photo is decoded before the model is loaded.
    ///
    /// # Errors
    ///
    /// Propagates load, input, and prediction failures as [`ClassifyError`].
    pub fn classify_photo<F, E>(
        &self,
        model_path: &Path,
        load: F,
        image: &[u8],
    ) -> Result<ImagePrediction, ClassifyError>
    where
        F: FnOnce(&Path) -> Result<I, E>,
        E: Into<BoxedCause>,
    {
        let batch = preprocess(image, IMAGE_SIZE)?;
        let model = self.image_models.get_or_load(model_path, load)?;
        predict_batch(&*model, &batch, &self.labels)
    }
}

/// Result of one prediction path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome<P> {
    Ok { prediction: P },
    Failed { error: String },
}

impl<P> Outcome<P> {
    /// Record a prediction result, logging failures.
    pub fn from_result(path: &str, result: Result<P, ClassifyError>) -> Self {
        match result {
            Ok(prediction) => Self::Ok { prediction },
            Err(err) => {
                warn!(path, error = %err, "prediction path failed");
                Self::Failed {
                    error: err.to_string(),
                }
            }
        }
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Outcomes of the requested prediction paths.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tabular: Option<Outcome<TabularPrediction>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Outcome<ImagePrediction>>,
}

impl Report {
    /// Whether any requested path failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.tabular.as_ref().is_some_and(Outcome::is_failed)
            || self.image.as_ref().is_some_and(Outcome::is_failed)
    }

    /// Render successful results as text.
    ///
    /// Failures are omitted here; callers report them on stderr with
    /// [`Report::failures`].
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut lines = Vec::new();
        if let Some(Outcome::Ok { prediction }) = &self.tabular {
            lines.push(format!(
                "Traits: {} (label \"{}\")",
                prediction.edibility.as_str(),
                prediction.label
            ));
        }
        if let Some(Outcome::Ok { prediction }) = &self.image {
            lines.push(format!("Predicted class: {}", prediction.predicted_class));
            lines.push(format!("Confidence: {}", prediction.confidence_percent()));
            lines.push("Per-class probabilities:".to_owned());
            for entry in &prediction.per_class_probabilities {
                lines.push(format!(
                    "  {}: {}",
                    entry.class_name,
                    format_percent(entry.probability)
                ));
            }
        }
        lines.join("\n")
    }

    /// Human-readable failure messages, one per failed path.
    #[must_use]
    pub fn failures(&self) -> Vec<String> {
        let mut messages = Vec::new();
        if let Some(Outcome::Failed { error }) = &self.tabular {
            messages.push(format!("tabular classification failed: {error}"));
        }
        if let Some(Outcome::Failed { error }) = &self.image {
            messages.push(format!("image classification failed: {error}"));
        }
        messages
    }
}
