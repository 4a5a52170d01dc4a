//! Image inference: decode an upload, reproduce the training-time
//! preprocessing, and read the class probability vector.
//!
//! Preprocessing mirrors the pipeline the network was trained with:
//! RGB conversion, a bicubic resize to [`IMAGE_SIZE`] square, scaling from
//! `0..=255` to `[0, 1]`, and a leading batch axis. The tensor layout is
//! NHWC, `(1, height, width, 3)`.

use image::{ImageFormat, RgbImage, imageops::FilterType};
use tracing::{debug, warn};

use crate::{
    api::{ClassProbability, ImagePrediction},
    config::{ClassLabelSet, IMAGE_SIZE},
    errors::{ClassifyError, InvalidInputError, OutputContractError},
    providers::ImageModel,
};

/// Channels per pixel after RGB conversion.
pub const CHANNELS: usize = 3;

/// Tolerated deviation of a probability vector's sum from one.
pub const PROBABILITY_SUM_TOLERANCE: f32 = 1e-3;

/// A preprocessed single-image batch in NHWC layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBatch {
    shape: [usize; 4],
    data: Vec<f32>,
}

impl ImageBatch {
    /// Wrap raw tensor data.
    ///
    /// # Errors
    ///
    /// Returns [`OutputContractError::BatchShape`] when `data` does not fill
    /// `shape` exactly.
    pub fn new(shape: [usize; 4], data: Vec<f32>) -> Result<Self, OutputContractError> {
        let expected = shape.iter().product::<usize>();
        if data.len() == expected {
            Ok(Self { shape, data })
        } else {
            Err(OutputContractError::BatchShape {
                shape,
                expected,
                actual: data.len(),
            })
        }
    }

    /// `[batch, height, width, channels]`.
    #[must_use]
    pub fn shape(&self) -> [usize; 4] {
        self.shape
    }

    /// Row-major pixel values.
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }
}

/// Decode JPEG or PNG bytes into an RGB raster.
///
/// # Errors
///
/// Returns [`InvalidInputError::UnsupportedImageFormat`] when the bytes are
/// not recognisably JPEG or PNG, and [`InvalidInputError::UndecodableImage`]
/// when decoding fails.
pub fn decode_rgb(bytes: &[u8]) -> Result<RgbImage, InvalidInputError> {
    let format =
        image::guess_format(bytes).map_err(|_| InvalidInputError::UnsupportedImageFormat)?;
    if !matches!(format, ImageFormat::Jpeg | ImageFormat::Png) {
        return Err(InvalidInputError::UnsupportedImageFormat);
    }
    let decoded = image::load_from_memory_with_format(bytes, format)
        .map_err(InvalidInputError::UndecodableImage)?;
    Ok(decoded.to_rgb8())
}

/// Resize to a `size` square, leaving already-sized rasters untouched.
#[must_use]
pub fn resize_square(rgb: RgbImage, size: u32) -> RgbImage {
    if rgb.dimensions() == (size, size) {
        rgb
    } else {
        image::imageops::resize(&rgb, size, size, FilterType::CatmullRom)
    }
}

/// Scale an RGB raster to `[0, 1]` and add the batch axis.
#[must_use]
pub fn to_batch(rgb: RgbImage) -> ImageBatch {
    let (width, height) = rgb.dimensions();
    let shape = [1, height as usize, width as usize, CHANNELS];
    #[expect(clippy::float_arithmetic, reason = "pixel scaling")]
    let data = rgb
        .into_raw()
        .into_iter()
        .map(|value| f32::from(value) / 255.0)
        .collect();
    ImageBatch { shape, data }
}

/// Decode and preprocess an upload into a model-ready batch.
///
/// # Errors
///
/// Returns [`InvalidInputError`] when the bytes are not a decodable JPEG or
/// PNG image.
///
/// # Examples
///
/// ```no_run
/// use mushroom_classify::vision::preprocess;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes = std::fs::read("amanita.jpg")?;
/// let batch = preprocess(&bytes, 128)?;
/// assert_eq!(batch.shape(), [1, 128, 128, 3]);
/// # Ok(())
/// # }
/// ```
pub fn preprocess(bytes: &[u8], size: u32) -> Result<ImageBatch, InvalidInputError> {
    let rgb = decode_rgb(bytes)?;
    let (width, height) = rgb.dimensions();
    debug!(width, height, size, "preprocessing image");
    Ok(to_batch(resize_square(rgb, size)))
}

/// Classify a mushroom photo.
///
/// The predicted class is the first index holding the maximum probability;
/// ties resolve to the lowest index.
///
/// # Errors
///
/// Returns [`ClassifyError::InvalidInput`] for uploads that are not
/// decodable JPEG or PNG images (the model is not called), and
/// [`ClassifyError::Prediction`] when the model fails or its output length
/// or values break the label-set contract.
pub fn predict_image<M: ImageModel + ?Sized>(
    model: &M,
    image: &[u8],
    labels: &ClassLabelSet,
) -> Result<ImagePrediction, ClassifyError> {
    let batch = preprocess(image, IMAGE_SIZE)?;
    predict_batch(model, &batch, labels)
}

/// Classify an already preprocessed batch.
///
/// # Errors
///
/// Returns [`ClassifyError::Prediction`] when the batch is not
/// `[1, IMAGE_SIZE, IMAGE_SIZE, 3]`, the model fails, or its output breaks
/// the label-set contract.
pub fn predict_batch<M: ImageModel + ?Sized>(
    model: &M,
    batch: &ImageBatch,
    labels: &ClassLabelSet,
) -> Result<ImagePrediction, ClassifyError> {
    let size = IMAGE_SIZE as usize;
    let expected_shape = [1, size, size, CHANNELS];
    let expected_len: usize = expected_shape.iter().product();
    if batch.shape() != expected_shape || batch.data().len() != expected_len {
        return Err(ClassifyError::prediction(OutputContractError::BatchShape {
            shape: batch.shape(),
            expected: expected_len,
            actual: batch.data().len(),
        }));
    }

    let probabilities = model
        .predict_probabilities(batch)
        .map_err(ClassifyError::prediction)?;
    let prediction = interpret_probabilities(&probabilities, labels)?;
    debug!(
        class = %prediction.predicted_class,
        confidence = prediction.confidence,
        "image prediction"
    );
    Ok(prediction)
}

/// Pair a probability vector with its labels and select the argmax.
///
/// # Errors
///
/// Returns [`ClassifyError::Prediction`] when the vector length differs from
/// the label count or any value is non-finite or outside `[0, 1]`.
pub fn interpret_probabilities(
    probabilities: &[f32],
    labels: &ClassLabelSet,
) -> Result<ImagePrediction, ClassifyError> {
    if probabilities.len() != labels.len() {
        return Err(ClassifyError::prediction(
            OutputContractError::ProbabilityCount {
                expected: labels.len(),
                actual: probabilities.len(),
            },
        ));
    }
    if let Some((index, &value)) = probabilities
        .iter()
        .enumerate()
        .find(|(_, value)| !value.is_finite())
    {
        return Err(ClassifyError::prediction(OutputContractError::NonFinite {
            index,
            value,
        }));
    }
    if let Some((index, &value)) = probabilities
        .iter()
        .enumerate()
        .find(|(_, value)| !(0.0..=1.0).contains(*value))
    {
        return Err(ClassifyError::prediction(OutputContractError::OutOfRange {
            index,
            value,
        }));
    }

    let sum = probabilities.iter().copied().sum::<f32>();
    #[expect(clippy::float_arithmetic, reason = "sum tolerance check")]
    let deviation = (sum - 1.0).abs();
    if deviation > PROBABILITY_SUM_TOLERANCE {
        warn!(sum, "image model probabilities do not sum to one");
    }

    let (best_index, confidence) = argmax(probabilities).ok_or_else(|| {
        ClassifyError::prediction(OutputContractError::ProbabilityCount {
            expected: labels.len(),
            actual: 0,
        })
    })?;
    let predicted_class = labels
        .get(best_index)
        .ok_or_else(|| {
            ClassifyError::prediction(OutputContractError::ProbabilityCount {
                expected: labels.len(),
                actual: probabilities.len(),
            })
        })?
        .to_owned();
    let per_class_probabilities = labels
        .iter()
        .zip(probabilities)
        .map(|(class_name, &probability)| ClassProbability {
            class_name: class_name.to_owned(),
            probability,
        })
        .collect();

    Ok(ImagePrediction {
        predicted_class,
        confidence,
        per_class_probabilities,
    })
}

/// Index and value of the first maximum, or `None` for an empty slice.
#[must_use]
pub fn argmax(values: &[f32]) -> Option<(usize, f32)> {
    values
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best, (index, value)| match best {
            Some((_, top)) if value <= top => best,
            _ => Some((index, value)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::support::{FixedImageModel, approx_eq, png_bytes};
    use rstest::rstest;

    #[rstest]
    #[case(&[0.2, 0.7, 0.1], Some(1))]
    #[case(&[0.4, 0.4, 0.2], Some(0))]
    #[case(&[0.1, 0.45, 0.45], Some(1))]
    #[case(&[], None)]
    fn argmax_prefers_lowest_index(#[case] values: &[f32], #[case] expected: Option<usize>) {
        assert_eq!(argmax(values).map(|(index, _)| index), expected);
    }

    #[rstest]
    fn landscape_upload_is_resized_to_model_input() {
        let bytes = png_bytes(300, 200, [200, 40, 10]);
        #[expect(clippy::expect_used, reason = "test should fail loudly")]
        let batch = preprocess(&bytes, IMAGE_SIZE).expect("preprocess png");
        assert_eq!(batch.shape(), [1, 128, 128, 3]);
        assert_eq!(batch.data().len(), 128 * 128 * 3);
        assert!(batch.data().iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[rstest]
    fn resize_is_identity_at_target_size() {
        let mut rgb = RgbImage::new(128, 128);
        for (x, y, pixel) in rgb.enumerate_pixels_mut() {
            #[expect(clippy::cast_possible_truncation, reason = "coordinates below 256")]
            let channel = |v: u32| (v % 256) as u8;
            *pixel = image::Rgb([channel(x), channel(y), channel(x + y)]);
        }
        let resized = resize_square(rgb.clone(), 128);
        assert_eq!(resized, rgb);
    }

    #[rstest]
    fn white_pixels_scale_to_one() {
        let batch = to_batch(RgbImage::from_pixel(2, 2, image::Rgb([255, 255, 255])));
        assert!(batch.data().iter().all(|v| approx_eq(*v, 1.0, 1e-6)));
    }

    #[rstest]
    #[case(b"definitely not an image".as_slice())]
    #[case(b"BM\x00\x00\x00\x00\x00\x00\x00\x00".as_slice())]
    fn non_images_fail_before_model_call(#[case] bytes: &[u8]) {
        let model = FixedImageModel::returning(&[1.0, 0.0, 0.0]);
        let result = predict_image(&model, bytes, &ClassLabelSet::default());
        assert!(matches!(
            result,
            Err(ClassifyError::InvalidInput(
                InvalidInputError::UnsupportedImageFormat
            ))
        ));
        assert_eq!(model.calls(), 0);
    }

    #[rstest]
    fn truncated_png_is_undecodable() {
        let bytes = png_bytes(16, 16, [1, 2, 3]);
        let truncated = bytes.get(..40).unwrap_or(&bytes);
        let model = FixedImageModel::returning(&[1.0, 0.0, 0.0]);
        let result = predict_image(&model, truncated, &ClassLabelSet::default());
        assert!(matches!(
            result,
            Err(ClassifyError::InvalidInput(
                InvalidInputError::UndecodableImage(_)
            ))
        ));
    }

    #[rstest]
    #[case(&[0.5, 0.5])]
    #[case(&[0.2, 0.2, 0.2, 0.4])]
    fn wrong_probability_count_is_prediction_error(#[case] probabilities: &[f32]) {
        let result = interpret_probabilities(probabilities, &ClassLabelSet::default());
        assert!(matches!(result, Err(ClassifyError::Prediction(_))));
    }

    #[rstest]
    fn nan_probability_is_prediction_error() {
        let result = interpret_probabilities(&[0.5, f32::NAN, 0.5], &ClassLabelSet::default());
        assert!(matches!(result, Err(ClassifyError::Prediction(_))));
    }

    #[rstest]
    #[case(&[2.3, -1.0, 0.5], 0, 2.3)]
    #[case(&[0.5, -0.1, 0.6], 1, -0.1)]
    #[case(&[0.0, 0.0, 1.5], 2, 1.5)]
    fn logits_are_rejected(
        #[case] probabilities: &[f32],
        #[case] index: usize,
        #[case] value: f32,
    ) {
        let result = interpret_probabilities(probabilities, &ClassLabelSet::default());
        match result {
            Err(ClassifyError::Prediction(cause)) => {
                let contract = cause.downcast_ref::<OutputContractError>();
                assert_eq!(
                    contract,
                    Some(&OutputContractError::OutOfRange { index, value })
                );
            }
            other => panic!("expected out-of-range failure, got {other:?}"),
        }
    }

    #[rstest]
    fn boundary_probabilities_are_accepted() {
        let result = interpret_probabilities(&[0.0, 1.0, 0.0], &ClassLabelSet::default());
        assert!(result.is_ok());
    }

    #[rstest]
    fn undersized_batch_never_reaches_model() {
        let model = FixedImageModel::returning(&[1.0, 0.0, 0.0]);
        let batch = to_batch(RgbImage::new(4, 4));
        let result = predict_batch(&model, &batch, &ClassLabelSet::default());
        assert!(matches!(result, Err(ClassifyError::Prediction(_))));
        assert_eq!(model.calls(), 0);
    }

    #[rstest]
    fn probabilities_keep_label_order() {
        #[expect(clippy::expect_used, reason = "test should fail loudly")]
        let prediction = interpret_probabilities(&[0.1, 0.2, 0.7], &ClassLabelSet::default())
            .expect("interpret probabilities");
        assert_eq!(prediction.predicted_class, "Laetiporus sulphureus");
        assert!(approx_eq(prediction.confidence, 0.7, 1e-6));
        let names: Vec<&str> = prediction
            .per_class_probabilities
            .iter()
            .map(|p| p.class_name.as_str())
            .collect();
        assert_eq!(
            names,
            ["Amanita muscaria", "Coprinus comatus", "Laetiporus sulphureus"]
        );
    }

    #[rstest]
    fn batch_shape_must_match_data() {
        assert!(ImageBatch::new([1, 2, 2, 3], vec![0.0; 11]).is_err());
        assert!(ImageBatch::new([1, 2, 2, 3], vec![0.0; 12]).is_ok());
    }
}
