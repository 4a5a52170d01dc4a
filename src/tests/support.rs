//! Test doubles for the model traits and common fixtures.

use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;

use crate::{
    providers::{ImageModel, TabularModel},
    schema::get_features,
    tabular::{TabularInputRecord, TabularRow},
    vision::ImageBatch,
};

#[expect(clippy::float_arithmetic, reason = "tolerance comparison")]
#[must_use]
pub fn approx_eq(a: f32, b: f32, tol: f32) -> bool {
    (a - b).abs() < tol
}

/// Error returned by the fake models.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("fake model failure: {0}")]
pub struct FakeModelError(pub String);

/// A record holding the first allowed code of every feature.
#[must_use]
pub fn valid_record() -> TabularInputRecord {
    get_features()
        .iter()
        .filter_map(|feature| {
            feature
                .allowed_codes
                .first()
                .map(|code| (feature.name, *code))
        })
        .collect()
}

/// Tabular model that returns a fixed label and counts its calls.
#[derive(Debug)]
pub struct RecordingTabular {
    outcome: Result<String, String>,
    calls: AtomicUsize,
}

impl RecordingTabular {
    #[must_use]
    pub fn returning(label: &str) -> Self {
        Self {
            outcome: Ok(label.to_owned()),
            calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_owned()),
            calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TabularModel for RecordingTabular {
    type Error = FakeModelError;

    fn predict_label(&self, _row: &TabularRow) -> Result<String, Self::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone().map_err(FakeModelError)
    }
}

/// Tabular model that is edible exactly when the odour is `n`.
#[derive(Debug, Default)]
pub struct OdorRule;

impl TabularModel for OdorRule {
    type Error = FakeModelError;

    fn predict_label(&self, row: &TabularRow) -> Result<String, Self::Error> {
        let odor = row
            .columns()
            .iter()
            .find(|(name, _)| *name == "odor")
            .map(|(_, code)| code.as_str())
            .ok_or_else(|| FakeModelError("row has no odor column".into()))?;
        Ok(if odor == "n" { "e" } else { "p" }.to_owned())
    }
}

/// Image model that returns a fixed probability vector and counts its calls.
#[derive(Debug)]
pub struct FixedImageModel {
    outcome: Result<Vec<f32>, String>,
    calls: AtomicUsize,
}

impl FixedImageModel {
    #[must_use]
    pub fn returning(probabilities: &[f32]) -> Self {
        Self {
            outcome: Ok(probabilities.to_vec()),
            calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_owned()),
            calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ImageModel for FixedImageModel {
    type Error = FakeModelError;

    fn predict_probabilities(&self, _batch: &ImageBatch) -> Result<Vec<f32>, Self::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone().map_err(FakeModelError)
    }
}

/// Encode a solid-colour RGB image of the given size as PNG.
///
/// # Panics
///
/// Panics if PNG encoding fails.
#[must_use]
pub fn png_bytes(width: u32, height: u32, pixel: [u8; 3]) -> Vec<u8> {
    let buffer = image::RgbImage::from_pixel(width, height, image::Rgb(pixel));
    let mut bytes = std::io::Cursor::new(Vec::new());
    buffer
        .write_to(&mut bytes, image::ImageFormat::Png)
        .unwrap_or_else(|e| panic!("encode png: {e}"));
    bytes.into_inner()
}
