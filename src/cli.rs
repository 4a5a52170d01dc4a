//! CLI argument types and layered configuration for the `mushc` and
//! `prune_images` binaries.
//!
//! Values load from CLI args, environment (prefixes `MUSHC_` and
//! `PRUNE_IMAGES_`), and an optional TOML configuration file, in that order
//! of precedence.

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use ortho_config::OrthoError;
use serde::Deserialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::prune::PruneConfig;

/// Default location of the tabular model artefact.
pub const DEFAULT_TABULAR_MODEL: &str = "models/mushroom_tabular.onnx";
/// Default location of the image model artefact.
pub const DEFAULT_IMAGE_MODEL: &str = "models/mushroom_image.onnx";
/// Log filter used when none is configured.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Command-line arguments for the `mushc` binary.
///
/// At least one of `traits` and `image` selects a prediction path; both
/// may be given and run independently.
///
/// # Examples
///
/// Parse flags directly:
/// ```
/// use mushroom_classify::cli::MushcArgs;
/// use ortho_config::OrthoConfig;
///
/// let args = MushcArgs::load_from_iter(["mushc", "--traits", "odor=n", "--json=true"])
///     .expect("load args from CLI iterator");
/// assert_eq!(args.traits.as_deref(), Some("odor=n"));
/// assert!(args.json);
/// ```
///
/// Load from a configuration file:
/// ```
/// use mushroom_classify::cli::MushcArgs;
/// use ortho_config::OrthoConfig;
/// use std::io::Write;
/// use tempfile::NamedTempFile;
///
/// let mut file = NamedTempFile::new().expect("create temp file");
/// writeln!(file, "image_model = \"/srv/models/species.onnx\"").expect("write config");
/// let path = file.path().to_str().expect("path str");
/// let args = MushcArgs::load_from_iter(["mushc", "--config-path", path])
///     .expect("load args from config path");
/// assert_eq!(args.image_model_path().to_str(), Some("/srv/models/species.onnx"));
/// ```
#[derive(Debug, Deserialize, ortho_config::OrthoConfig)]
#[ortho_config(prefix = "MUSHC")]
pub struct MushcArgs {
    /// Tabular model artefact path.
    #[serde(default)]
    pub tabular_model: Option<PathBuf>,

    /// Expected SHA-256 of the tabular model.
    #[serde(default)]
    pub tabular_sha256: Option<String>,

    /// Image model artefact path.
    #[serde(default)]
    pub image_model: Option<PathBuf>,

    /// Expected SHA-256 of the image model.
    #[serde(default)]
    pub image_sha256: Option<String>,

    /// Trait codes as comma-separated `name=code` pairs.
    #[serde(default)]
    pub traits: Option<String>,

    /// JPEG or PNG photo to classify.
    #[serde(default)]
    pub image: Option<PathBuf>,

    /// Emit the report as JSON.
    #[ortho_config(default = false)]
    #[serde(default)]
    pub json: bool,

    /// Log filter directive, e.g. `info` or `mushroom_classify=debug`.
    #[serde(default)]
    pub log_level: Option<String>,

    /// Optional path to a configuration file.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl MushcArgs {
    /// Load configuration solely from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an [`OrthoError`] if any variable cannot be parsed.
    pub fn load_from_env() -> Result<Self, OrthoError> {
        Figment::new()
            .merge(Env::prefixed("MUSHC_"))
            .extract()
            .map_err(Into::into)
    }

    /// Load configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an [`OrthoError`] if the file cannot be read or parsed.
    pub fn load_from_config(path: &str) -> Result<Self, OrthoError> {
        Figment::new()
            .merge(Toml::file(path))
            .extract()
            .map_err(Into::into)
    }

    /// Load configuration from environment variables and a file path.
    ///
    /// # Errors
    ///
    /// Returns an [`OrthoError`] if either source contains invalid values.
    pub fn load_from_env_and_config(path: &str) -> Result<Self, OrthoError> {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("MUSHC_"))
            .extract()
            .map_err(Into::into)
    }

    /// Tabular model path, falling back to [`DEFAULT_TABULAR_MODEL`].
    #[must_use]
    pub fn tabular_model_path(&self) -> PathBuf {
        self.tabular_model
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TABULAR_MODEL))
    }

    /// Image model path, falling back to [`DEFAULT_IMAGE_MODEL`].
    #[must_use]
    pub fn image_model_path(&self) -> PathBuf {
        self.image_model
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_IMAGE_MODEL))
    }

    /// Whether any prediction path was requested.
    #[must_use]
    pub fn has_work(&self) -> bool {
        self.traits.is_some() || self.image.is_some()
    }
}

/// Command-line arguments for the `prune_images` binary.
#[derive(Debug, Deserialize, ortho_config::OrthoConfig)]
#[ortho_config(prefix = "PRUNE_IMAGES")]
pub struct PruneArgs {
    /// Dataset split directory holding one folder per class.
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// Comma-separated class folder names.
    #[serde(default)]
    pub classes: Option<String>,

    /// Number of images to delete.
    #[serde(default)]
    pub count: Option<usize>,

    /// List the sample without deleting.
    #[ortho_config(default = false)]
    #[serde(default)]
    pub dry_run: bool,

    /// Seed for a reproducible sample.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Log filter directive.
    #[serde(default)]
    pub log_level: Option<String>,

    /// Optional path to a configuration file.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl PruneArgs {
    /// Resolve the arguments against [`PruneConfig`] defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use mushroom_classify::cli::PruneArgs;
    /// use ortho_config::OrthoConfig;
    ///
    /// let args = PruneArgs::load_from_iter(["prune_images", "--classes", "a, b", "--count", "5"])
    ///     .expect("load args");
    /// let config = args.to_config();
    /// assert_eq!(config.classes, ["a", "b"]);
    /// assert_eq!(config.count, 5);
    /// ```
    #[must_use]
    pub fn to_config(&self) -> PruneConfig {
        let defaults = PruneConfig::default();
        PruneConfig {
            root: self.root.clone().unwrap_or(defaults.root),
            classes: self.classes.as_deref().map_or(defaults.classes, |list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|class| !class.is_empty())
                    .map(str::to_owned)
                    .collect()
            }),
            count: self.count.unwrap_or(defaults.count),
            dry_run: self.dry_run,
        }
    }
}

/// Install a stderr `fmt` subscriber filtered by `directive`.
///
/// An unparsable directive falls back to [`DEFAULT_LOG_LEVEL`]. Calling this
/// more than once keeps the first subscriber.
pub fn init_tracing(directive: Option<&str>) {
    let filter = EnvFilter::try_new(directive.unwrap_or(DEFAULT_LOG_LEVEL))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
