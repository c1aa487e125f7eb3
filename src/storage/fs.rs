//! Module to find music files to import in the file system

use walkdir::WalkDir;

use std::path::{Path, PathBuf};

use crate::storage::error::StorageError;

const MUSIC_EXTENSIONS: &[&str] = &["mp3", "flac", "wav", "m4a", "ogg", "aac"];

pub fn is_music_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| MUSIC_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Collects music files to import.
///
/// A directory is scanned recursively, a file is returned as is.
/// Entries that cannot be read while scanning are skipped with a warning.
pub fn collect_music_files(
    path: &Path,
    follow_symlinks: bool,
) -> Result<Vec<PathBuf>, StorageError> {
    let meta = std::fs::metadata(path)?;
    if meta.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let root_str = path.to_string_lossy();

    let mut paths = WalkDir::new(path)
        .follow_links(follow_symlinks)
        .into_iter()
        .filter_map(|e| match e {
            Ok(e) => Some(e),
            Err(err) => {
                log::warn!("error while scanning dir {root_str}, skipping an entry: {err:?}");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .filter(|e| is_music_file(e))
        .collect::<Vec<PathBuf>>();

    // stable import order, whatever order the directory is read in
    paths.sort();
    Ok(paths)
}

/// Map file extension (without dot) to proper MIME type for browser playback.
/// Returns None if the extension is not recognized.
pub fn mime_from_ext(ext: &str) -> Option<String> {
    match ext {
        "m4a" => Some("audio/x-m4a".to_string()), // Safari iOS compatible
        "aac" => Some("audio/aac".to_string()),
        "mp3" => Some("audio/mpeg".to_string()),
        "wav" => Some("audio/wav".to_string()),
        "ogg" => Some("audio/ogg".to_string()),
        "flac" => Some("audio/flac".to_string()),
        _ => None,
    }
}

pub fn mime_for_path(path: &Path) -> String {
    let ext = path
        .extension()
        .map(|ext| ext.to_string_lossy())
        .map(|s| s.to_lowercase());
    let default = || {
        mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string()
    };
    ext.and_then(|ext| mime_from_ext(ext.as_str()))
        .unwrap_or_else(default)
}
