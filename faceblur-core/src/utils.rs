//! Utility functions for formatting and file operations.
//!
//! This module provides general-purpose helpers used throughout the
//! faceblur-core library: duration and byte formatting, the processing-time
//! estimate wording, and derivation of the prefixed output file names.

use crate::error::{CoreError, CoreResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Estimates longer than this many minutes are shown in hours.
const ESTIMATE_HOURS_THRESHOLD_MINUTES: f64 = 120.0;

/// Formats seconds as HH:MM:SS (e.g., 3725.0 -> "01:02:05"). Returns "??:??:??" for invalid inputs.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "??:??:??".to_string();
    }

    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Formats bytes with appropriate binary units (B, KiB, MiB, GiB).
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    const GIB: f64 = MIB * 1024.0;

    let bytes_f64 = bytes as f64;
    if bytes_f64 >= GIB {
        format!("{:.2} GiB", bytes_f64 / GIB)
    } else if bytes_f64 >= MIB {
        format!("{:.2} MiB", bytes_f64 / MIB)
    } else if bytes_f64 >= KIB {
        format!("{:.2} KiB", bytes_f64 / KIB)
    } else {
        format!("{bytes} B")
    }
}

/// Wording for a processing-time estimate: minutes, or hours once the
/// estimate passes two hours.
#[must_use]
pub fn format_estimate(estimate: Duration) -> String {
    let minutes = estimate.as_secs_f64() / 60.0;
    if minutes > ESTIMATE_HOURS_THRESHOLD_MINUTES {
        format!("{:.1} hours", minutes / 60.0)
    } else {
        format!("{minutes:.1} minutes")
    }
}

/// Extracts the file name of `path`, failing with `PathError` when it has none.
pub fn get_filename_safe(path: &Path) -> CoreResult<String> {
    Ok(path
        .file_name()
        .ok_or_else(|| CoreError::PathError(format!("Failed to get filename for {}", path.display())))?
        .to_string_lossy()
        .to_string())
}

/// Path next to `path` whose file name carries `prefix`
/// (`/v/clip.mp4` + `cut_` gives `/v/cut_clip.mp4`).
pub fn prefixed_sibling(path: &Path, prefix: &str) -> CoreResult<PathBuf> {
    let name = get_filename_safe(path)?;
    Ok(path.with_file_name(format!("{prefix}{name}")))
}

/// Removes `path` if it exists, so a tool writing there starts clean.
pub fn remove_if_exists(path: &Path) -> CoreResult<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            log::debug!("Removed existing output {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "00:00:00");
        assert_eq!(format_duration(3725.0), "01:02:05");
        assert_eq!(format_duration(-1.0), "??:??:??");
        assert_eq!(format_duration(f64::NAN), "??:??:??");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.00 KiB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.00 MiB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.00 GiB");
    }

    #[test]
    fn test_format_estimate_switches_to_hours() {
        assert_eq!(format_estimate(Duration::from_secs(90)), "1.5 minutes");
        assert_eq!(format_estimate(Duration::from_secs(120 * 60)), "120.0 minutes");
        assert_eq!(format_estimate(Duration::from_secs(180 * 60)), "3.0 hours");
    }

    #[test]
    fn test_prefixed_sibling() {
        assert_eq!(
            prefixed_sibling(Path::new("/videos/clip.mp4"), "cut_").unwrap(),
            PathBuf::from("/videos/cut_clip.mp4")
        );
        assert_eq!(
            prefixed_sibling(Path::new("clip.mp4"), "resized_720p_").unwrap(),
            PathBuf::from("resized_720p_clip.mp4")
        );
        assert!(matches!(
            prefixed_sibling(Path::new("/"), "cut_"),
            Err(CoreError::PathError(_))
        ));
    }

    #[test]
    fn test_remove_if_exists() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("old.mp4");
        std::fs::write(&file, b"stale").unwrap();
        remove_if_exists(&file).unwrap();
        assert!(!file.exists());
        remove_if_exists(&file).unwrap();
    }
}
