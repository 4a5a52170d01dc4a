use std::{fs, path::Path};

use tempfile::TempDir;

/// Create `root/<class>/<file>` for every `(class, files)` entry.
#[must_use]
pub fn dataset(layout: &[(&str, &[&str])]) -> TempDir {
    let root = TempDir::new().unwrap_or_else(|e| panic!("create dataset dir: {e}"));
    for (class, files) in layout {
        let folder = root.path().join(class);
        fs::create_dir_all(&folder).unwrap_or_else(|e| panic!("create class dir: {e}"));
        for file in *files {
            fs::write(folder.join(file), b"x").unwrap_or_else(|e| panic!("write file: {e}"));
        }
    }
    root
}

/// Number of files directly inside `root/class`.
#[must_use]
pub fn count_files(root: &Path, class: &str) -> usize {
    fs::read_dir(root.join(class))
        .unwrap_or_else(|e| panic!("read class dir: {e}"))
        .count()
}
