//! Model-facing configuration: the image class list and preprocessing size.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Side length, in pixels, of the square input the image model was trained on.
pub const IMAGE_SIZE: u32 = 128;

/// Class names in the order of the image model's output vector.
pub const DEFAULT_CLASS_NAMES: [&str; 3] = [
    "Amanita muscaria",
    "Coprinus comatus",
    "Laetiporus sulphureus",
];

/// Errors returned when a label set is malformed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LabelSetError {
    #[error("class label set must not be empty")]
    Empty,
    #[error("class label \"{0}\" appears more than once")]
    Duplicate(String),
}

/// Ordered class names; position `i` names output `i` of the image model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ClassLabelSet {
    names: Vec<String>,
}

impl ClassLabelSet {
    /// Build a label set from ordered names.
    ///
    /// # Errors
    ///
    /// Returns [`LabelSetError`] if `names` is empty or contains duplicates.
    ///
    /// # Examples
    ///
    /// ```
    /// use mushroom_classify::config::ClassLabelSet;
    ///
    /// let labels = ClassLabelSet::new(vec!["a".into(), "b".into()]).unwrap();
    /// assert_eq!(labels.get(1), Some("b"));
    /// assert!(ClassLabelSet::new(vec!["a".into(), "a".into()]).is_err());
    /// ```
    pub fn new(names: Vec<String>) -> Result<Self, LabelSetError> {
        if names.is_empty() {
            return Err(LabelSetError::Empty);
        }
        for (index, name) in names.iter().enumerate() {
            if names.iter().skip(index + 1).any(|other| other == name) {
                return Err(LabelSetError::Duplicate(name.clone()));
            }
        }
        Ok(Self { names })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Position of `name` in the set.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|candidate| candidate == name)
    }
}

impl Default for ClassLabelSet {
    fn default() -> Self {
        Self {
            names: DEFAULT_CLASS_NAMES.iter().map(|&name| name.to_owned()).collect(),
        }
    }
}

impl TryFrom<Vec<String>> for ClassLabelSet {
    type Error = LabelSetError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(names)
    }
}

impl From<ClassLabelSet> for Vec<String> {
    fn from(labels: ClassLabelSet) -> Self {
        labels.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn default_set_lists_three_species() {
        let labels = ClassLabelSet::default();
        assert_eq!(labels.len(), 3);
        assert_eq!(labels.get(0), Some("Amanita muscaria"));
        assert_eq!(labels.position("Laetiporus sulphureus"), Some(2));
    }

    #[rstest]
    fn serialise_as_plain_list() {
        #[expect(clippy::expect_used, reason = "test should fail loudly")]
        let json = serde_json::to_string(&ClassLabelSet::default()).expect("serialise labels");
        assert_eq!(
            json,
            r#"["Amanita muscaria","Coprinus comatus","Laetiporus sulphureus"]"#
        );
    }

    #[rstest]
    #[case("[]")]
    #[case(r#"["a","b","a"]"#)]
    fn deserialise_invalid(#[case] json: &str) {
        let labels: Result<ClassLabelSet, _> = serde_json::from_str(json);
        assert!(labels.is_err());
    }

    #[rstest]
    fn empty_set_is_rejected() {
        assert_eq!(ClassLabelSet::new(Vec::new()), Err(LabelSetError::Empty));
    }
}
