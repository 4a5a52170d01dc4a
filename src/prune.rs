//! Random dataset pruning.
//!
//! Removes a uniformly random sample of image files from selected class
//! folders of an image-classification dataset laid out as
//! `root/<class>/<image>`. Used to rebalance classes before training.

use std::{
    fs,
    path::{Path, PathBuf},
};

use rand::{Rng, seq::SliceRandom};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

/// File extensions treated as images, compared case-insensitively.
pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Errors returned while pruning a dataset.
#[derive(Debug, Error)]
pub enum PruneError {
    #[error("failed to list class folder {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to delete {path} after removing {deleted} files: {source}")]
    Remove {
        path: PathBuf,
        /// Files removed before the failure.
        deleted: usize,
        #[source]
        source: std::io::Error,
    },
}

/// What to prune and how much.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PruneConfig {
    /// Dataset split directory containing one folder per class.
    pub root: PathBuf,
    /// Class folders to draw from.
    pub classes: Vec<String>,
    /// Number of images to remove across all listed classes.
    pub count: usize,
    /// Report the sample without deleting anything.
    pub dry_run: bool,
}

impl Default for PruneConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./dataset/train/"),
            classes: vec!["Amanita muscaria".into(), "Laetiporus sulphureus".into()],
            count: 200,
            dry_run: false,
        }
    }
}

/// Outcome of a pruning run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PruneReport {
    /// Images found across the listed classes.
    pub found: usize,
    /// Images chosen for deletion.
    pub selected: Vec<PathBuf>,
    /// Images actually removed; zero for a dry run.
    pub deleted: usize,
}

/// Whether `path` has an image extension.
///
/// # Examples
///
/// ```
/// use mushroom_classify::prune::is_image_file;
/// use std::path::Path;
///
/// assert!(is_image_file(Path::new("cap.JPG")));
/// assert!(!is_image_file(Path::new("notes.txt")));
/// ```
#[must_use]
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// List image files directly inside each `root/<class>` folder.
///
/// Paths are sorted within each class so a seeded selection is reproducible.
///
/// # Errors
///
/// Returns [`PruneError::ReadDir`] when a class folder cannot be listed.
pub fn collect_images(root: &Path, classes: &[String]) -> Result<Vec<PathBuf>, PruneError> {
    let mut images = Vec::new();
    for class in classes {
        let folder = root.join(class);
        let read_error = |source| PruneError::ReadDir {
            path: folder.clone(),
            source,
        };
        let mut found = Vec::new();
        for entry in fs::read_dir(&folder).map_err(read_error)? {
            let path = entry.map_err(read_error)?.path();
            if path.is_file() && is_image_file(&path) {
                found.push(path);
            }
        }
        found.sort();
        debug!(class = %class, images = found.len(), "collected class images");
        images.append(&mut found);
    }
    Ok(images)
}

/// Choose `min(count, images.len())` distinct paths uniformly at random.
pub fn select_for_deletion<R: Rng + ?Sized>(
    images: &[PathBuf],
    count: usize,
    rng: &mut R,
) -> Vec<PathBuf> {
    images
        .choose_multiple(rng, count.min(images.len()))
        .cloned()
        .collect()
}

/// Delete a random sample of images as described by `config`.
///
/// # Errors
///
/// Returns [`PruneError`] when a class folder cannot be listed or a
/// selected file cannot be removed. Files removed before the failure stay
/// removed.
pub fn prune<R: Rng + ?Sized>(config: &PruneConfig, rng: &mut R) -> Result<PruneReport, PruneError> {
    let images = collect_images(&config.root, &config.classes)?;
    info!(root = %config.root.display(), found = images.len(), "images found");
    let selected = select_for_deletion(&images, config.count, rng);

    let deleted = if config.dry_run {
        info!(selected = selected.len(), "dry run; nothing deleted");
        0
    } else {
        let deleted = delete_all(&selected)?;
        info!(deleted, "images deleted");
        deleted
    };

    Ok(PruneReport {
        found: images.len(),
        selected,
        deleted,
    })
}

/// Remove every path in order, stopping at the first failure.
///
/// # Errors
///
/// Returns [`PruneError::Remove`] carrying the number of files already
/// removed.
pub fn delete_all(paths: &[PathBuf]) -> Result<usize, PruneError> {
    let mut deleted = 0;
    for path in paths {
        fs::remove_file(path).map_err(|source| PruneError::Remove {
            path: path.clone(),
            deleted,
            source,
        })?;
        debug!(path = %path.display(), "deleted");
        deleted += 1;
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};
    use rstest::rstest;
    use std::collections::HashSet;

    #[rstest]
    #[case("a.jpg", true)]
    #[case("a.JPEG", true)]
    #[case("a.Png", true)]
    #[case("a.gif", false)]
    #[case("jpg", false)]
    fn recognises_image_extensions(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_image_file(Path::new(name)), expected);
    }

    #[rstest]
    #[case(3, 3)]
    #[case(10, 5)]
    #[case(0, 0)]
    fn selection_is_capped_and_distinct(#[case] count: usize, #[case] expected: usize) {
        let images: Vec<PathBuf> = (0..5).map(|i| PathBuf::from(format!("{i}.png"))).collect();
        let mut rng = StdRng::seed_from_u64(7);
        let selected = select_for_deletion(&images, count, &mut rng);
        let unique: HashSet<&PathBuf> = selected.iter().collect();
        assert_eq!(selected.len(), expected);
        assert_eq!(unique.len(), expected);
    }

    #[rstest]
    fn seeded_selection_is_reproducible() {
        let images: Vec<PathBuf> = (0..20).map(|i| PathBuf::from(format!("{i}.jpg"))).collect();
        let first = select_for_deletion(&images, 4, &mut StdRng::seed_from_u64(42));
        let second = select_for_deletion(&images, 4, &mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);
    }

    #[rstest]
    fn failed_removal_reports_files_already_deleted() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("create temp dir: {e}"));
        let present = dir.path().join("a.jpg");
        fs::write(&present, b"jpg").unwrap_or_else(|e| panic!("write image: {e}"));
        let vanished = dir.path().join("b.jpg");

        let result = delete_all(&[present.clone(), vanished.clone()]);
        match result {
            Err(PruneError::Remove { path, deleted, .. }) => {
                assert_eq!(path, vanished);
                assert_eq!(deleted, 1);
            }
            other => panic!("expected removal failure, got {other:?}"),
        }
        assert!(!present.exists());
    }
}
