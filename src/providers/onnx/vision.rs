use std::sync::{Arc, Mutex};

use ort::{session::Session, value::TensorRef};

use super::{
    config::OnnxImageConfig,
    errors::OnnxModelError,
    session::{input_names, open_session, output_names, require_input, require_output},
};
use crate::{providers::ImageModel, vision::ImageBatch};

/// Species classifier backed by an exported convolutional network.
#[derive(Debug)]
pub struct OnnxImageClassifier {
    session: Arc<Mutex<Session>>,
    input_name: String,
    output_name: String,
    class_count: usize,
}

impl OnnxImageClassifier {
    /// Builds the classifier, resolving unset tensor names from the graph.
    ///
    /// # Errors
    ///
    /// Returns [`OnnxModelError`] when `class_count` is zero, the artefact
    /// fails verification, the session cannot be created, or a configured
    /// tensor name is absent from the graph.
    pub fn new(config: OnnxImageConfig) -> Result<Self, OnnxModelError> {
        if config.class_count == 0 {
            return Err(OnnxModelError::ZeroClassCount);
        }
        let session = open_session(&config.model)?;

        let input_name = match config.input_name {
            Some(name) => {
                require_input(&session, &name)?;
                name
            }
            None => input_names(&session)
                .first()
                .map(|name| (*name).to_owned())
                .ok_or(OnnxModelError::NoInputs)?,
        };
        let output_name = match config.output_name {
            Some(name) => {
                require_output(&session, &name)?;
                name
            }
            None => output_names(&session)
                .first()
                .map(|name| (*name).to_owned())
                .ok_or(OnnxModelError::NoOutputs)?,
        };

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            output_name,
            class_count: config.class_count,
        })
    }
}

impl ImageModel for OnnxImageClassifier {
    type Error = OnnxModelError;

    fn predict_probabilities(&self, batch: &ImageBatch) -> Result<Vec<f32>, Self::Error> {
        let tensor = TensorRef::from_array_view((batch.shape(), batch.data()))
            .map_err(OnnxModelError::EncodeTensor)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| OnnxModelError::SessionPoisoned)?;
        let outputs = session
            .run(ort::inputs! { self.input_name.as_str() => tensor })
            .map_err(OnnxModelError::Inference)?;

        let value = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| OnnxModelError::OutputMissing {
                name: self.output_name.clone(),
            })?;
        let (_, probabilities) = value
            .try_extract_tensor::<f32>()
            .map_err(OnnxModelError::Inference)?;
        checked_probabilities(&self.output_name, self.class_count, probabilities)
    }
}

/// Copy the output vector, rejecting one of the wrong length.
fn checked_probabilities(
    name: &str,
    class_count: usize,
    probabilities: &[f32],
) -> Result<Vec<f32>, OnnxModelError> {
    if probabilities.len() == class_count {
        Ok(probabilities.to_vec())
    } else {
        Err(OnnxModelError::UnexpectedOutputLength {
            name: name.to_owned(),
            expected: class_count,
            actual: probabilities.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::onnx::OnnxArtefact;
    use rstest::rstest;

    #[rstest]
    #[case(&[0.2, 0.5, 0.3], true)]
    #[case(&[0.5, 0.5], false)]
    #[case(&[], false)]
    fn output_length_must_match_class_count(#[case] values: &[f32], #[case] accepted: bool) {
        let result = checked_probabilities("probabilities", 3, values);
        if accepted {
            assert_eq!(result.ok().as_deref(), Some(values));
        } else {
            assert!(matches!(
                result,
                Err(OnnxModelError::UnexpectedOutputLength { expected: 3, .. })
            ));
        }
    }

    #[rstest]
    fn zero_classes_are_rejected_before_opening_artefact() {
        let config = OnnxImageConfig {
            model: OnnxArtefact::unpinned("/nonexistent/image.onnx"),
            input_name: None,
            output_name: None,
            class_count: 0,
        };
        assert!(matches!(
            OnnxImageClassifier::new(config),
            Err(OnnxModelError::ZeroClassCount)
        ));
    }
}
