// SPDX-License-Identifier: GPL-3.0-only

//! Skeleton table writer
//!
//! One file per export session. Two header rows name the joints and their
//! coordinate columns; every tracked body in a body frame then becomes one
//! row of `time,tracking id` followed by 25 `x,y,z` triplets.

use crate::backends::sensor::{Body, BodyFrame, JointType, RelativeTime, TrackingState};
use crate::errors::AppResult;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Both header rows, newline terminated
pub fn header() -> String {
    let mut out = String::from(",");
    for joint in JointType::ALL {
        out.push_str(&format!(",{},,", joint.name()));
    }
    out.push('\n');

    out.push_str("Retrieved Time,Tracking ID");
    for _ in JointType::ALL {
        out.push_str(",x,y,z");
    }
    out.push('\n');
    out
}

/// Row for one body; joints that are not `Tracked` leave their cells empty
pub fn format_row(time: RelativeTime, body: &Body) -> String {
    let mut out = format!("{},{}", time, body.tracking_id);
    for joint in &body.joints {
        if joint.tracking_state == TrackingState::Tracked {
            let p = joint.position;
            out.push_str(&format!(",{},{},{}", p.x, p.y, p.z));
        } else {
            out.push_str(",,,");
        }
    }
    out.push('\n');
    out
}

/// Appending CSV writer for one export session
#[derive(Debug)]
pub struct SkeletonCsvWriter {
    path: PathBuf,
    out: BufWriter<File>,
    rows_written: u64,
}

impl SkeletonCsvWriter {
    /// Open `path` for appending (created if missing) and write the header
    pub fn create(path: &Path) -> AppResult<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut out = BufWriter::new(file);
        out.write_all(header().as_bytes())?;

        info!(path = %path.display(), "Skeleton table opened");
        Ok(Self {
            path: path.to_path_buf(),
            out,
            rows_written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Append one row per tracked body; returns the number of rows
    pub fn write_frame(&mut self, frame: &BodyFrame) -> AppResult<usize> {
        let mut rows = 0;
        for body in frame.tracked() {
            self.out
                .write_all(format_row(frame.relative_time, body).as_bytes())?;
            rows += 1;
        }
        self.rows_written += rows as u64;
        Ok(rows)
    }

    /// Flush buffered rows and close the file
    pub fn finish(mut self) -> AppResult<PathBuf> {
        self.out.flush()?;
        debug!(
            path = %self.path.display(),
            rows = self.rows_written,
            "Skeleton table closed"
        );
        Ok(self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::sensor::CameraSpacePoint;

    fn body_with_head(id: u64) -> Body {
        let mut body = Body::new(id);
        body.set_joint(
            JointType::Head,
            CameraSpacePoint::new(0.5, -0.25, 2.0),
            TrackingState::Tracked,
        );
        body.set_joint(
            JointType::HandLeft,
            CameraSpacePoint::new(1.0, 1.0, 1.0),
            TrackingState::Inferred,
        );
        body
    }

    #[test]
    fn test_header_rows() {
        let header = header();
        let lines: Vec<&str> = header.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(",,SpineBase,,,SpineMid,,"));
        assert!(lines[0].ends_with(",ThumbRight,,"));
        assert!(lines[1].starts_with("Retrieved Time,Tracking ID,x,y,z,x,y,z"));
        assert_eq!(lines[1].matches(",x,y,z").count(), 25);
        // Both rows have the same column count
        assert_eq!(lines[0].matches(',').count(), lines[1].matches(',').count());
    }

    #[test]
    fn test_row_layout() {
        let body = body_with_head(42);
        let row = format_row(RelativeTime::from_ticks(10_000_000), &body);

        assert!(row.starts_with("00:00:01,42,"));
        assert!(row.ends_with('\n'));
        let fields: Vec<&str> = row.trim_end().split(',').collect();
        assert_eq!(fields.len(), 2 + 25 * 3);

        // Head is joint index 3
        let head = 2 + JointType::Head.index() * 3;
        assert_eq!(&fields[head..head + 3], &["0.5", "-0.25", "2"]);

        // Inferred joints are left empty
        let hand = 2 + JointType::HandLeft.index() * 3;
        assert_eq!(&fields[hand..hand + 3], &["", "", ""]);
    }

    #[test]
    fn test_only_tracked_bodies_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skeleton.csv");
        let mut writer = SkeletonCsvWriter::create(&path).unwrap();

        let frame = BodyFrame {
            relative_time: RelativeTime::from_ticks(333_333),
            bodies: vec![
                Some(body_with_head(1)),
                None,
                Some(Body::untracked()),
                Some(body_with_head(2)),
            ],
        };
        assert_eq!(writer.write_frame(&frame).unwrap(), 2);
        writer.finish().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("00:00:00.0333333,1,"));
        assert!(lines[3].starts_with("00:00:00.0333333,2,"));
    }

    #[test]
    fn test_appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skeleton.csv");
        std::fs::write(&path, "previous\n").unwrap();

        SkeletonCsvWriter::create(&path).unwrap().finish().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("previous\n,,SpineBase"));
    }
}
