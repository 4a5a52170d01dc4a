use std::sync::{Arc, Mutex};

use ort::{
    session::{Session, SessionInputValue},
    value::Tensor,
};

use super::{
    config::{OnnxTabularConfig, TabularInputLayout},
    errors::OnnxModelError,
    session::{open_session, require_input, require_output},
};
use crate::{providers::TabularModel, schema::get_features, tabular::TabularRow};

/// Edibility classifier backed by an exported scikit-learn pipeline.
#[derive(Debug)]
pub struct OnnxTabularClassifier {
    session: Arc<Mutex<Session>>,
    layout: TabularInputLayout,
    label_output: String,
}

impl OnnxTabularClassifier {
    /// Builds the classifier and checks the graph against the feature schema.
    ///
    /// # Errors
    ///
    /// Returns [`OnnxModelError`] when the artefact fails verification, the
    /// session cannot be created, or the graph lacks an input required by
    /// the layout or the configured label output.
    ///
    /// # Examples
    /// ```no_run
    /// use mushroom_classify::providers::onnx::{OnnxArtefact, OnnxModelError, OnnxTabularClassifier, OnnxTabularConfig};
    ///
    /// # fn main() -> Result<(), OnnxModelError> {
    /// let config = OnnxTabularConfig::per_column(OnnxArtefact::unpinned("models/mushroom_tabular.onnx"));
    /// let classifier = OnnxTabularClassifier::new(config)?;
    /// # let _ = classifier;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: OnnxTabularConfig) -> Result<Self, OnnxModelError> {
        let session = open_session(&config.model)?;
        match &config.layout {
            TabularInputLayout::PerColumn => {
                for name in get_features().names() {
                    require_input(&session, name)?;
                }
            }
            TabularInputLayout::Packed { input_name } => require_input(&session, input_name)?,
        }
        require_output(&session, &config.label_output)?;

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            layout: config.layout,
            label_output: config.label_output,
        })
    }

    fn encode(&self, row: &TabularRow) -> Result<Vec<(String, SessionInputValue<'static>)>, OnnxModelError> {
        plan_inputs(&self.layout, row)
            .into_iter()
            .map(|input| {
                let tensor = Tensor::from_string_array((input.shape, input.codes.as_slice()))
                    .map_err(OnnxModelError::EncodeTensor)?;
                Ok((input.name, SessionInputValue::from(tensor.into_dyn())))
            })
            .collect()
    }
}

/// A named `[rows, columns]` string tensor fed to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringInput {
    pub name: String,
    pub shape: [usize; 2],
    pub codes: Vec<String>,
}

/// Lay out a validated row as the string tensors `layout` expects.
///
/// Per-column graphs get one `[1, 1]` tensor per feature named after it;
/// a packed graph gets a single `[1, 21]` tensor in schema order.
#[must_use]
pub fn plan_inputs(layout: &TabularInputLayout, row: &TabularRow) -> Vec<StringInput> {
    match layout {
        TabularInputLayout::PerColumn => row
            .columns()
            .iter()
            .map(|(name, code)| StringInput {
                name: (*name).to_owned(),
                shape: [1, 1],
                codes: vec![code.clone()],
            })
            .collect(),
        TabularInputLayout::Packed { input_name } => {
            let codes: Vec<String> = row.codes().map(str::to_owned).collect();
            vec![StringInput {
                name: input_name.clone(),
                shape: [1, codes.len()],
                codes,
            }]
        }
    }
}

/// First label of the named output tensor.
fn first_label(name: &str, labels: Vec<String>) -> Result<String, OnnxModelError> {
    labels
        .into_iter()
        .next()
        .ok_or_else(|| OnnxModelError::EmptyOutput {
            name: name.to_owned(),
        })
}

impl TabularModel for OnnxTabularClassifier {
    type Error = OnnxModelError;

    fn predict_label(&self, row: &TabularRow) -> Result<String, Self::Error> {
        let inputs = self.encode(row)?;
        let mut session = self
            .session
            .lock()
            .map_err(|_| OnnxModelError::SessionPoisoned)?;
        let outputs = session.run(inputs).map_err(OnnxModelError::Inference)?;
        let value = outputs
            .get(self.label_output.as_str())
            .ok_or_else(|| OnnxModelError::OutputMissing {
                name: self.label_output.clone(),
            })?;
        let (_, labels) = value
            .try_extract_strings()
            .map_err(OnnxModelError::Inference)?;
        first_label(&self.label_output, labels)
    }
}
