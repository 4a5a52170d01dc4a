//! Categorical feature schema the tabular model was trained on.
//!
//! Feature names, their order, and each feature's code alphabet form a hard
//! contract with the exported pipeline. A renamed or reordered column is not
//! rejected by the model; it silently corrupts predictions. Bump
//! [`SCHEMA_VERSION`] whenever the table changes and re-export the model.

/// Version of the feature table below.
pub const SCHEMA_VERSION: u32 = 1;

/// One categorical input column and the codes it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSpec {
    /// Column name exactly as seen by the model.
    pub name: &'static str,
    /// Single-character codes accepted for this column.
    pub allowed_codes: &'static [&'static str],
}

impl FeatureSpec {
    /// Whether `code` is in this feature's alphabet.
    ///
    /// Matching is exact; codes are neither trimmed nor case folded.
    #[must_use]
    pub fn allows(&self, code: &str) -> bool {
        self.allowed_codes.contains(&code)
    }
}

/// Ordered, immutable set of feature specifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSchema {
    features: &'static [FeatureSpec],
}

impl FeatureSchema {
    /// Iterate the features in model column order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &'static FeatureSpec> + use<> {
        self.features.iter()
    }

    /// Number of features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the schema has no features.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Look up a feature by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'static FeatureSpec> {
        self.features.iter().find(|feature| feature.name == name)
    }

    /// Column names in model order.
    pub fn names(&self) -> impl ExactSizeIterator<Item = &'static str> + use<> {
        self.features.iter().map(|feature| feature.name)
    }
}

/// Returns the feature schema of the tabular mushroom model.
///
/// # Examples
///
/// ```
/// use mushroom_classify::schema::get_features;
///
/// let schema = get_features();
/// assert_eq!(schema.len(), 21);
/// assert!(schema.get("odor").is_some_and(|f| f.allows("n")));
/// ```
#[must_use]
pub fn get_features() -> FeatureSchema {
    FeatureSchema { features: FEATURES }
}

static FEATURES: &[FeatureSpec] = &[
    FeatureSpec {
        name: "cap-shape",
        allowed_codes: &["b", "c", "x", "f", "k", "s"],
    },
    FeatureSpec {
        name: "cap-surface",
        allowed_codes: &["f", "g", "y", "s"],
    },
    FeatureSpec {
        name: "cap-color",
        allowed_codes: &["n", "b", "c", "g", "r", "p", "u", "e", "w", "y"],
    },
    FeatureSpec {
        name: "bruises",
        allowed_codes: &["t", "f"],
    },
    FeatureSpec {
        name: "odor",
        allowed_codes: &["a", "l", "c", "y", "f", "m", "n", "p", "s"],
    },
    FeatureSpec {
        name: "gill-attachment",
        allowed_codes: &["a", "d", "f", "n"],
    },
    FeatureSpec {
        name: "gill-spacing",
        allowed_codes: &["c", "w", "d"],
    },
    FeatureSpec {
        name: "gill-size",
        allowed_codes: &["b", "n"],
    },
    FeatureSpec {
        name: "gill-color",
        allowed_codes: &["k", "n", "b", "h", "g", "r", "o", "p", "u", "e", "w", "y"],
    },
    FeatureSpec {
        name: "stalk-shape",
        allowed_codes: &["e", "t"],
    },
    FeatureSpec {
        name: "stalk-surface-above-ring",
        allowed_codes: &["f", "y", "k", "s"],
    },
    FeatureSpec {
        name: "stalk-surface-below-ring",
        allowed_codes: &["f", "y", "k", "s"],
    },
    FeatureSpec {
        name: "stalk-color-above-ring",
        allowed_codes: &["n", "b", "c", "g", "o", "p", "e", "w", "y"],
    },
    FeatureSpec {
        name: "stalk-color-below-ring",
        allowed_codes: &["n", "b", "c", "g", "o", "p", "e", "w", "y"],
    },
    FeatureSpec {
        name: "veil-type",
        allowed_codes: &["p", "u"],
    },
    FeatureSpec {
        name: "veil-color",
        allowed_codes: &["n", "o", "w", "y"],
    },
    FeatureSpec {
        name: "ring-number",
        allowed_codes: &["n", "o", "t"],
    },
    FeatureSpec {
        name: "ring-type",
        allowed_codes: &["c", "e", "f", "l", "n", "p", "s", "z"],
    },
    FeatureSpec {
        name: "spore-print-color",
        allowed_codes: &["k", "n", "b", "h", "r", "o", "u", "w", "y"],
    },
    FeatureSpec {
        name: "population",
        allowed_codes: &["a", "c", "n", "s", "v", "y"],
    },
    FeatureSpec {
        name: "habitat",
        allowed_codes: &["g", "l", "m", "p", "u", "w", "d"],
    },
];
