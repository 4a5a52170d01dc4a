//! Core library entry point.
//!
//! Classifies mushrooms from categorical trait codes with a tabular model
//! and from photos with an image model. Re-exports the adapter entry points
//! and their public types.

pub mod api;
pub mod app;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod errors;
pub mod loader;
pub mod providers;
pub mod prune;
pub mod schema;
pub mod tabular;
pub mod vision;

pub use api::{ClassProbability, Edibility, ImagePrediction, TabularPrediction};
pub use app::{Classifier, Outcome, Report};
#[cfg(feature = "cli")]
pub use cli::{MushcArgs, PruneArgs};
pub use config::{ClassLabelSet, IMAGE_SIZE};
pub use errors::{ClassifyError, InvalidInputError};
pub use loader::ModelCache;
pub use providers::{ImageModel, TabularModel};
pub use schema::{FeatureSchema, FeatureSpec, get_features};
pub use tabular::{TabularInputRecord, TabularRow, predict_row, predict_tabular};
pub use vision::{ImageBatch, predict_batch, predict_image, preprocess};

#[doc(hidden)]
pub mod tests;
