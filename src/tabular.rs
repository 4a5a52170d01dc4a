//! Tabular inference: validate trait codes against the schema, assemble a
//! single-row record in column order, and interpret the binary label.

use std::collections::HashMap;

use tracing::debug;

use crate::{
    api::{Edibility, TabularPrediction},
    errors::{ClassifyError, InvalidInputError, OutputContractError},
    providers::TabularModel,
    schema::{FeatureSchema, get_features},
};

/// Caller-supplied feature codes keyed by feature name.
///
/// The record is unchecked until [`TabularInputRecord::to_row`] validates it
/// against the schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabularInputRecord {
    values: HashMap<String, String>,
}

impl TabularInputRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the code for `name`, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, code: impl Into<String>) -> &mut Self {
        self.values.insert(name.into(), code.into());
        self
    }

    /// Builder-style variant of [`TabularInputRecord::insert`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, code: impl Into<String>) -> Self {
        self.insert(name, code);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parse a comma-separated list of `name=code` pairs.
    ///
    /// Whitespace around names and codes is trimmed; empty segments are
    /// ignored. Values are not checked against the schema here.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError::MalformedPair`] for a segment without
    /// `=` or with an empty name, and [`InvalidInputError::DuplicateFeature`]
    /// when a name repeats.
    ///
    /// # Examples
    ///
    /// ```
    /// use mushroom_classify::tabular::TabularInputRecord;
    ///
    /// let record = TabularInputRecord::parse_pairs("odor=n, bruises=t").unwrap();
    /// assert_eq!(record.get("odor"), Some("n"));
    /// assert_eq!(record.len(), 2);
    /// ```
    pub fn parse_pairs(input: &str) -> Result<Self, InvalidInputError> {
        let mut record = Self::new();
        for segment in input.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let Some((name, code)) = segment.split_once('=') else {
                return Err(InvalidInputError::MalformedPair {
                    pair: segment.to_owned(),
                });
            };
            let name = name.trim();
            if name.is_empty() {
                return Err(InvalidInputError::MalformedPair {
                    pair: segment.to_owned(),
                });
            }
            if record.values.contains_key(name) {
                return Err(InvalidInputError::DuplicateFeature {
                    name: name.to_owned(),
                });
            }
            record.insert(name, code.trim());
        }
        Ok(record)
    }

    /// Validate the record against `schema` and order it into a row.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError`] when a schema feature is missing, a key
    /// is not in the schema, or a code lies outside its feature's alphabet.
    pub fn to_row(&self, schema: &FeatureSchema) -> Result<TabularRow, InvalidInputError> {
        if let Some(unknown) = self.values.keys().find(|name| schema.get(name).is_none()) {
            return Err(InvalidInputError::UnknownFeature {
                name: unknown.clone(),
            });
        }
        let columns = schema
            .iter()
            .map(|feature| {
                let code = self
                    .values
                    .get(feature.name)
                    .ok_or(InvalidInputError::MissingFeature { name: feature.name })?;
                if feature.allows(code) {
                    Ok((feature.name, code.clone()))
                } else {
                    Err(InvalidInputError::InvalidCode {
                        name: feature.name,
                        code: code.clone(),
                        allowed: feature.allowed_codes,
                    })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TabularRow { columns })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TabularInputRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(name, code)| (name.into(), code.into()))
                .collect(),
        }
    }
}

/// A validated single-row record whose columns follow schema order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularRow {
    columns: Vec<(&'static str, String)>,
}

impl TabularRow {
    /// `(name, code)` pairs in schema order.
    #[must_use]
    pub fn columns(&self) -> &[(&'static str, String)] {
        &self.columns
    }

    /// Codes in schema order.
    pub fn codes(&self) -> impl ExactSizeIterator<Item = &str> {
        self.columns.iter().map(|(_, code)| code.as_str())
    }
}

/// Classify a mushroom from its trait codes.
///
/// The record is validated before the model is called; a rejected record
/// never reaches the model.
///
/// # Errors
///
/// Returns [`ClassifyError::InvalidInput`] for records outside the schema
/// and [`ClassifyError::Prediction`] when the model call fails or yields an
/// empty label.
pub fn predict_tabular<M: TabularModel + ?Sized>(
    model: &M,
    values: &TabularInputRecord,
) -> Result<TabularPrediction, ClassifyError> {
    let row = values.to_row(&get_features())?;
    predict_row(model, &row)
}

/// Classify an already validated row.
///
/// # Errors
///
/// Returns [`ClassifyError::Prediction`] when the model call fails or yields
/// an empty label.
pub fn predict_row<M: TabularModel + ?Sized>(
    model: &M,
    row: &TabularRow,
) -> Result<TabularPrediction, ClassifyError> {
    let label = model
        .predict_label(row)
        .map_err(ClassifyError::prediction)?;
    if label.is_empty() {
        return Err(ClassifyError::prediction(OutputContractError::EmptyLabel));
    }
    let edibility = Edibility::from_label(&label);
    debug!(label = %label, edibility = edibility.as_str(), "tabular prediction");
    Ok(TabularPrediction { edibility, label })
}
