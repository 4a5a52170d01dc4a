//! Behaviour tests for photo-based classification.

use mushroom_classify::{
    ClassLabelSet, ClassifyError, ImagePrediction, predict_image,
    tests::support::{FixedImageModel, approx_eq, png_bytes},
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;

#[derive(Default)]
struct ImageContext {
    model: RefCell<Option<FixedImageModel>>,
    result: RefCell<Option<Result<ImagePrediction, ClassifyError>>>,
}

#[fixture]
fn image_context() -> ImageContext {
    ImageContext::default()
}

impl ImageContext {
    fn classify(&self, bytes: &[u8]) {
        let model = self.model.borrow();
        let result = predict_image(
            model.as_ref().unwrap_or_else(|| panic!("model to be set")),
            bytes,
            &ClassLabelSet::default(),
        );
        self.result.replace(Some(result));
    }
}

#[given("an image model favouring class 1")]
fn given_model(#[from(image_context)] ctx: &ImageContext) {
    ctx.model
        .replace(Some(FixedImageModel::returning(&[0.15, 0.8, 0.05])));
}

#[when("classifying the bytes \"{text}\"")]
#[expect(
    clippy::needless_pass_by_value,
    reason = "BDD macro injects owned value"
)]
fn when_bytes(text: String, #[from(image_context)] ctx: &ImageContext) {
    ctx.classify(text.as_bytes());
}

#[when("classifying a {width:u32} by {height:u32} photo")]
fn when_photo(width: u32, height: u32, #[from(image_context)] ctx: &ImageContext) {
    ctx.classify(&png_bytes(width, height, [180, 120, 60]));
}

#[then("the upload is rejected")]
fn then_rejected(#[from(image_context)] ctx: &ImageContext) {
    assert!(matches!(
        ctx.result.borrow().as_ref(),
        Some(Err(ClassifyError::InvalidInput(_)))
    ));
}

#[then("the image model was not called")]
fn then_not_called(#[from(image_context)] ctx: &ImageContext) {
    let model = ctx.model.borrow();
    let calls = model
        .as_ref()
        .map(FixedImageModel::calls)
        .unwrap_or_else(|| panic!("model to be set"));
    assert_eq!(calls, 0);
}

#[then("the predicted class is \"{name}\"")]
#[expect(
    clippy::needless_pass_by_value,
    reason = "BDD macro injects owned value"
)]
fn then_class(name: String, #[from(image_context)] ctx: &ImageContext) {
    match ctx.result.borrow().as_ref() {
        Some(Ok(prediction)) => assert_eq!(prediction.predicted_class, name),
        other => panic!("expected a prediction, got {other:?}"),
    }
}

#[then("the probabilities sum to one")]
fn then_sum(#[from(image_context)] ctx: &ImageContext) {
    match ctx.result.borrow().as_ref() {
        Some(Ok(prediction)) => {
            let sum: f32 = prediction
                .per_class_probabilities
                .iter()
                .map(|p| p.probability)
                .sum();
            assert!(approx_eq(sum, 1.0, 1e-3));
            assert_eq!(prediction.per_class_probabilities.len(), 3);
        }
        other => panic!("expected a prediction, got {other:?}"),
    }
}

#[scenario(path = "tests/features/image.feature", index = 0)]
fn non_image_rejected(image_context: ImageContext) {
    let _ = image_context;
}

#[scenario(path = "tests/features/image.feature", index = 1)]
fn landscape_classified(image_context: ImageContext) {
    let _ = image_context;
}
