//! Memoising model loader.
//!
//! A [`ModelCache`] owns loaded model handles keyed by artefact path. Each
//! path is loaded at most once; later lookups take only a shared read lock
//! and return the same [`Arc`]. Failed loads are never stored, so a later
//! call attempts the load again.
//!
//! The cache is an ordinary value passed to whoever needs it rather than a
//! process global.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError, RwLock},
    time::Instant,
};

use thiserror::Error;
use tracing::{debug, info};

use crate::errors::{BoxedCause, ClassifyError};

/// Reasons a load fails before the backend is consulted.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("artefact does not exist")]
    Missing,
    #[error("model cache lock was poisoned by a previous panic")]
    Poisoned,
}

/// Lazily populated map from artefact path to loaded model.
#[derive(Debug)]
pub struct ModelCache<M> {
    entries: RwLock<HashMap<PathBuf, Arc<M>>>,
    load_lock: Mutex<()>,
}

impl<M> Default for ModelCache<M> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            load_lock: Mutex::new(()),
        }
    }
}

impl<M> ModelCache<M> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the model cached for `path`, loading it with `load` on first use.
    ///
    /// `load` runs at most once per successfully loaded path, even with
    /// concurrent callers. A path that does not exist fails without calling
    /// `load`.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::ModelLoad`] when the path is missing, `load`
    /// fails, or a cache lock is poisoned.
    ///
    /// # Examples
    ///
    /// ```
    /// use mushroom_classify::loader::ModelCache;
    /// use std::sync::Arc;
    ///
    /// let file = tempfile::NamedTempFile::new().unwrap();
    /// let cache: ModelCache<String> = ModelCache::new();
    /// let first = cache
    ///     .get_or_load(file.path(), |_| Ok::<_, std::io::Error>("model".to_owned()))
    ///     .unwrap();
    /// let second = cache
    ///     .get_or_load(file.path(), |_| Ok::<_, std::io::Error>("other".to_owned()))
    ///     .unwrap();
    /// assert!(Arc::ptr_eq(&first, &second));
    /// ```
    pub fn get_or_load<F, E>(&self, path: &Path, load: F) -> Result<Arc<M>, ClassifyError>
    where
        F: FnOnce(&Path) -> Result<M, E>,
        E: Into<BoxedCause>,
    {
        if let Some(model) = self.lookup(path)? {
            debug!(path = %path.display(), "model cache hit");
            return Ok(model);
        }

        let _guard = self
            .load_lock
            .lock()
            .map_err(|_| load_error(path, LoaderError::Poisoned))?;
        if let Some(model) = self.lookup(path)? {
            return Ok(model);
        }
        if !path.exists() {
            return Err(load_error(path, LoaderError::Missing));
        }

        let started = Instant::now();
        let model = Arc::new(load(path).map_err(|source| load_error(path, source))?);
        info!(
            path = %path.display(),
            elapsed = ?started.elapsed(),
            "model loaded"
        );
        self.entries
            .write()
            .map_err(|_| load_error(path, LoaderError::Poisoned))?
            .insert(path.to_path_buf(), Arc::clone(&model));
        Ok(model)
    }

    /// Whether a model is cached for `path`.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(path)
    }

    /// Number of cached models.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, path: &Path) -> Result<Option<Arc<M>>, ClassifyError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| load_error(path, LoaderError::Poisoned))?;
        Ok(entries.get(path).map(Arc::clone))
    }
}

fn load_error(path: &Path, source: impl Into<BoxedCause>) -> ClassifyError {
    ClassifyError::ModelLoad {
        path: path.to_path_buf(),
        source: source.into(),
    }
}
