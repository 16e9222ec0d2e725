// SPDX-License-Identifier: MPL-2.0

//! Integration tests for frame export

use depth_recorder::backends::sensor::{SyntheticSensor, SyntheticSensorConfig};
use depth_recorder::pipelines::capture::CaptureSession;
use depth_recorder::pipelines::export::{ExportOptions, ExportStreams, WriterMode};
use depth_recorder::AppError;
use std::collections::BTreeMap;
use std::path::Path;

type Session = CaptureSession<SyntheticSensor>;

fn session(writer_mode: WriterMode) -> Session {
    let options = ExportOptions {
        writer_mode,
        ..ExportOptions::default()
    };
    CaptureSession::with_options(
        SyntheticSensor::new(SyntheticSensorConfig::small()),
        options,
        Default::default(),
    )
}

fn record(dir: &Path, writer_mode: WriterMode, ticks: usize) {
    let mut session = session(writer_mode);
    session
        .exporter_mut()
        .start(dir, ExportStreams::ALL)
        .unwrap();
    for _ in 0..ticks {
        session.tick().unwrap();
    }
    session.exporter_mut().stop().unwrap();
}

/// File name -> contents, skipping the timestamped skeleton table
fn images(dir: &Path) -> BTreeMap<String, Vec<u8>> {
    std::fs::read_dir(dir)
        .unwrap()
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext != "csv"))
        .map(|p| {
            let name = p.file_name().unwrap().to_string_lossy().into_owned();
            (name, std::fs::read(&p).unwrap())
        })
        .collect()
}

fn csv_files(dir: &Path) -> Vec<std::path::PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "csv"))
        .collect()
}

#[test]
fn test_export_writes_images_and_table() {
    let dir = tempfile::tempdir().unwrap();
    record(dir.path(), WriterMode::Blocking, 3);

    let images = images(dir.path());
    // Frame 0 has relative time zero, so its files are named "000000"
    assert!(images.contains_key("000000.jpg"));
    assert!(images.contains_key("000000.png"));
    assert!(images.contains_key("0000000333333.jpg"));
    assert_eq!(images.len(), 6);

    let csv = csv_files(dir.path());
    assert_eq!(csv.len(), 1);
    let contents = std::fs::read_to_string(&csv[0]).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    // Two header rows plus one tracked body per tick
    assert_eq!(lines.len(), 5);
    assert!(lines[1].starts_with("Retrieved Time,Tracking ID"));
    assert!(lines[2].starts_with("00:00:00,72057594037927936,"));

    // Hand tips and thumbs are inferred: the row ends with four empty triplets
    assert!(lines[2].ends_with(",,,,,,,,,,,,"));
    assert_eq!(lines[2].split(',').count(), 77);
}

#[test]
fn test_queued_writer_matches_blocking() {
    let blocking = tempfile::tempdir().unwrap();
    let queued = tempfile::tempdir().unwrap();

    record(blocking.path(), WriterMode::Blocking, 5);
    record(queued.path(), WriterMode::Queued { capacity: 2 }, 5);

    assert_eq!(images(blocking.path()), images(queued.path()));
}

#[test]
fn test_depth_png_keeps_millimeters() {
    let dir = tempfile::tempdir().unwrap();
    record(dir.path(), WriterMode::Blocking, 1);

    let png = image::open(dir.path().join("000000.png"))
        .unwrap()
        .into_luma16();
    assert_eq!(png.dimensions(), (8, 6));
    // First column of the synthetic ramp is zero, the rest increase
    assert_eq!(png.get_pixel(0, 0).0, [0]);
    assert_eq!(png.get_pixel(1, 0).0, [1000]);
}

#[test]
fn test_start_errors() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session(WriterMode::Blocking);

    let none = ExportStreams {
        color: false,
        depth: false,
        body: false,
    };
    assert!(matches!(
        session.exporter_mut().start(dir.path(), none),
        Err(AppError::InvalidConfiguration(_))
    ));
    assert!(matches!(
        session
            .exporter_mut()
            .start(&dir.path().join("missing"), ExportStreams::ALL),
        Err(AppError::InvalidConfiguration(_))
    ));
    assert!(!session.exporter().is_recording());
}

#[test]
fn test_dropped_session_closes_table() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut session = session(WriterMode::Queued { capacity: 1 });
        session
            .exporter_mut()
            .start(dir.path(), ExportStreams::ALL)
            .unwrap();
        session.tick().unwrap();
    }

    let csv = csv_files(dir.path());
    let contents = std::fs::read_to_string(&csv[0]).unwrap();
    assert_eq!(contents.lines().count(), 3);
    assert_eq!(images(dir.path()).len(), 2);
}
