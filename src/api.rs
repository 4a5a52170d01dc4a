use serde::{Deserialize, Serialize};

/// Binary outcome of the tabular classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edibility {
    Edible,
    Poisonous,
}

impl Edibility {
    /// Label emitted by the tabular pipeline for edible specimens.
    pub const EDIBLE_LABEL: &'static str = "e";

    /// Map a raw model label onto an outcome.
    ///
    /// The pipeline was trained on the UCI encoding where `"e"` marks edible
    /// and `"p"` poisonous. Any label other than `"e"` is treated as
    /// poisonous, so a re-encoded training set changes the meaning of this
    /// mapping without raising an error.
    ///
    /// # Examples
    ///
    /// ```
    /// use mushroom_classify::api::Edibility;
    ///
    /// assert_eq!(Edibility::from_label("e"), Edibility::Edible);
    /// assert_eq!(Edibility::from_label("p"), Edibility::Poisonous);
    /// ```
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        if label == Self::EDIBLE_LABEL {
            Self::Edible
        } else {
            Self::Poisonous
        }
    }

    /// Human-readable name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Edible => "edible",
            Self::Poisonous => "poisonous",
        }
    }
}

/// Result of a tabular prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabularPrediction {
    pub edibility: Edibility,
    /// Label exactly as returned by the model.
    pub label: String,
}

/// Probability assigned to one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassProbability {
    pub class_name: String,
    pub probability: f32,
}

/// Result of an image prediction.
///
/// # Examples
///
/// ```
/// use mushroom_classify::api::{ClassProbability, ImagePrediction};
///
/// let prediction = ImagePrediction {
///     predicted_class: "Coprinus comatus".into(),
///     confidence: 0.8,
///     per_class_probabilities: vec![ClassProbability {
///         class_name: "Coprinus comatus".into(),
///         probability: 0.8,
///     }],
/// };
/// assert_eq!(prediction.confidence_percent(), "80.00%");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePrediction {
    pub predicted_class: String,
    pub confidence: f32,
    /// Probabilities in label-set order.
    pub per_class_probabilities: Vec<ClassProbability>,
}

impl ImagePrediction {
    /// Confidence formatted as a percentage with two decimals.
    #[must_use]
    pub fn confidence_percent(&self) -> String {
        format_percent(self.confidence)
    }
}

/// Format a probability as a percentage with two decimals.
#[must_use]
pub fn format_percent(probability: f32) -> String {
    #[expect(clippy::float_arithmetic, reason = "percentage scaling")]
    let percent = probability * 100.0;
    format!("{percent:.2}%")
}
