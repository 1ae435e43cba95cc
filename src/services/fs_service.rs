use crate::error::AppError;
use image::{DynamicImage, ImageReader};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp", "tiff", "tif"];

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|s| s.starts_with('.'))
            .unwrap_or(false)
}

/// Expands `path` into image files. A file is returned as-is; a directory is
/// walked recursively, skipping hidden entries.
pub fn list_image_files(path: &Path) -> Result<Vec<PathBuf>, AppError> {
    if !path.exists() {
        return Err(format!("Path does not exist: {}", path.display()).into());
    }
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_image_file(e.path()))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    Ok(files)
}

pub fn open_image(path: &Path) -> Result<DynamicImage, AppError> {
    ImageReader::open(path)
        .map_err(|e| AppError::Decode(format!("Failed to open image {}: {}", path.display(), e)))?
        .with_guessed_format()
        .map_err(|e| AppError::Decode(format!("Failed to read image {}: {}", path.display(), e)))?
        .decode()
        .map_err(|e| AppError::Decode(format!("Failed to decode image {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn recognizes_image_extensions() {
        assert!(is_image_file(Path::new("beach.JPG")));
        assert!(is_image_file(Path::new("dir/peak.webp")));
        assert!(!is_image_file(Path::new("notes.txt")));
        assert!(!is_image_file(Path::new("no_extension")));
    }

    #[test]
    fn walks_directories_skipping_hidden_entries() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("trip/day1")).unwrap();
        std::fs::create_dir_all(root.join(".thumbs")).unwrap();
        for name in ["b.png", "a.jpg", "trip/day1/c.jpeg", ".thumbs/d.png", ".e.png", "readme.md"] {
            std::fs::write(root.join(name), b"").unwrap();
        }

        let files = list_image_files(root).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.png", "trip/day1/c.jpeg"]);
    }

    #[test]
    fn single_file_is_returned_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("scan.raw");
        std::fs::write(&file, b"").unwrap();
        assert_eq!(list_image_files(&file).unwrap(), vec![file]);
    }

    #[test]
    fn missing_path_is_an_error() {
        assert!(list_image_files(Path::new("/nonexistent/photos")).is_err());
    }

    #[test]
    fn decodes_by_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tile.png");
        RgbImage::from_pixel(3, 2, Rgb([10, 20, 30])).save(&path).unwrap();

        let img = open_image(&path).unwrap();
        assert_eq!((img.width(), img.height()), (3, 2));
        assert!(matches!(
            open_image(&dir.path().join("missing.png")),
            Err(AppError::Decode(_))
        ));
    }
}
