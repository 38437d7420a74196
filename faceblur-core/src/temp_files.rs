//! Temporary file management utilities.
//!
//! Temporary files are created through the tempfile crate so they are removed
//! when their guard is dropped, including on error paths.

use crate::error::CoreResult;
use std::path::Path;
use tempfile::{Builder as TempFileBuilder, NamedTempFile};

/// Creates a temporary file with prefix and extension in `dir`. Auto-deleted when dropped.
pub fn create_temp_file(dir: &Path, prefix: &str, extension: &str) -> CoreResult<NamedTempFile> {
    std::fs::create_dir_all(dir)?;
    let temp_file = TempFileBuilder::new()
        .prefix(&format!("{prefix}_"))
        .suffix(&format!(".{extension}"))
        .tempfile_in(dir)?;

    Ok(temp_file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_file_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let file = create_temp_file(dir.path(), "faceblur_audio", "aac").unwrap();
        let path = file.path().to_path_buf();

        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("faceblur_audio_"));
        assert!(name.ends_with(".aac"));
        assert!(path.exists());

        drop(file);
        assert!(!path.exists());
    }
}
