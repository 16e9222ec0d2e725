// SPDX-License-Identifier: MPL-2.0

//! Output locations and file naming for exported frames

use crate::backends::sensor::RelativeTime;
use crate::constants::APP_DIR_NAME;
use crate::constants::export::{CSV_EXTENSION, CSV_FILENAME_FORMAT};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// Default export directory (`~/Pictures/depth-recorder`)
pub fn default_output_dir() -> PathBuf {
    dirs::picture_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join(APP_DIR_NAME)
}

/// Image path for a frame: `<dir>/<sanitized relative time>.<extension>`
///
/// Frames with the same relative time overwrite each other.
pub fn frame_path(dir: &Path, time: RelativeTime, extension: &str) -> PathBuf {
    dir.join(format!("{}.{}", time.sanitized(), extension))
}

/// Skeleton table path: `<dir>/<yyyyMMdd_HHmmss>.csv` in local time
pub fn csv_path(dir: &Path, now: DateTime<Local>) -> PathBuf {
    dir.join(format!(
        "{}.{}",
        now.format(CSV_FILENAME_FORMAT),
        CSV_EXTENSION
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_frame_path_is_sanitized() {
        let path = frame_path(
            Path::new("/tmp/out"),
            RelativeTime::from_ticks(123_456_789),
            "jpg",
        );
        assert_eq!(path, PathBuf::from("/tmp/out/0000123456789.jpg"));
    }

    #[test]
    fn test_csv_path_uses_local_timestamp() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            csv_path(Path::new("/tmp/out"), now),
            PathBuf::from("/tmp/out/20240309_140507.csv")
        );
    }

    #[test]
    fn test_default_output_dir_name() {
        assert!(default_output_dir().ends_with(APP_DIR_NAME));
    }
}
