//! Enumerating labeled images from a directory tree.

use crate::types::{DatasetError, DatasetResult, ImageRecord, LabelSource};
use std::fs;
use std::path::{Path, PathBuf};

/// Extensions accepted by the enumerator. The comparison is byte-exact, so
/// uppercase variants like `.JPG` are skipped.
pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["jpg", "png"];

/// Walk `root` recursively and produce one record per supported image file,
/// sorted by path. Files with other extensions are skipped silently; an empty
/// tree yields an empty vec rather than an error.
pub fn enumerate_images(root: &Path, source: LabelSource) -> DatasetResult<Vec<ImageRecord>> {
    let mut files = Vec::new();
    walk(root, &mut files)?;
    files.sort();

    let mut records = Vec::new();
    for path in files {
        if !has_supported_extension(&path) {
            continue;
        }
        let label = derive_label(&path, source);
        records.push(ImageRecord { path, label });
    }
    Ok(records)
}

fn walk(dir: &Path, out: &mut Vec<PathBuf>) -> DatasetResult<()> {
    let entries = fs::read_dir(dir).map_err(|e| DatasetError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;
    for entry in entries {
        let Ok(entry) = entry else { continue };
        let path = entry.path();
        if path.is_dir() {
            walk(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

fn has_supported_extension(path: &Path) -> bool {
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) => SUPPORTED_EXTENSIONS.contains(&ext),
        None => false,
    }
}

fn derive_label(path: &Path, source: LabelSource) -> String {
    match source {
        LabelSource::FolderName => path
            .parent()
            .and_then(Path::file_name)
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string(),
        LabelSource::FileNamePrefix => {
            let name = path
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or_default();
            name.chars().take_while(|c| c.is_alphabetic()).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_label_stops_at_first_non_letter() {
        let path = Path::new("assets/Daisy123.jpg");
        assert_eq!(derive_label(path, LabelSource::FileNamePrefix), "Daisy");
    }

    #[test]
    fn prefix_label_is_empty_for_leading_digit() {
        let path = Path::new("assets/1tulip.jpg");
        assert_eq!(derive_label(path, LabelSource::FileNamePrefix), "");
    }

    #[test]
    fn folder_label_uses_immediate_parent() {
        let path = Path::new("assets/cat/a.jpg");
        assert_eq!(derive_label(path, LabelSource::FolderName), "cat");
    }

    #[test]
    fn uppercase_extensions_are_not_supported() {
        assert!(has_supported_extension(Path::new("a.jpg")));
        assert!(has_supported_extension(Path::new("b.png")));
        assert!(!has_supported_extension(Path::new("c.JPG")));
        assert!(!has_supported_extension(Path::new("d.gif")));
        assert!(!has_supported_extension(Path::new("noext")));
    }
}
