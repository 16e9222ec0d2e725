// SPDX-License-Identifier: GPL-3.0-only

//! Image file writer for an export session
//!
//! Blocking mode writes on the capture thread. Queued mode hands encoded
//! images to a dedicated thread through a bounded channel; a full queue
//! blocks the producer until the writer catches up.

use crate::errors::{AppError, AppResult};
use crate::media::EncodedImage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::mpsc::{self, SyncSender};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, warn};

/// How exported images reach the disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum WriterMode {
    /// Write on the capture thread before `write` returns
    #[default]
    Blocking,
    /// Write on a background thread fed by a queue of `capacity` images
    Queued { capacity: usize },
}

/// An encoded image and its destination
#[derive(Debug)]
pub struct WriteJob {
    pub path: PathBuf,
    pub image: EncodedImage,
}

/// Image writer bound to one export session
pub enum FrameWriter {
    Blocking {
        written: usize,
    },
    Queued {
        sender: Option<SyncSender<WriteJob>>,
        handle: Option<JoinHandle<AppResult<usize>>>,
    },
}

impl FrameWriter {
    pub fn new(mode: WriterMode) -> AppResult<Self> {
        match mode {
            WriterMode::Blocking => Ok(FrameWriter::Blocking { written: 0 }),
            WriterMode::Queued { capacity } => {
                let (sender, receiver) = mpsc::sync_channel::<WriteJob>(capacity.max(1));

                let handle = thread::Builder::new()
                    .name("frame-writer".to_string())
                    .spawn(move || {
                        let mut written = 0;
                        // Drains until every sender is gone
                        for job in receiver {
                            if let Err(e) = job.image.save(&job.path) {
                                error!(path = %job.path.display(), error = %e, "Image write failed");
                                return Err(e);
                            }
                            written += 1;
                        }
                        debug!(written, "Writer queue drained");
                        Ok(written)
                    })?;

                Ok(FrameWriter::Queued {
                    sender: Some(sender),
                    handle: Some(handle),
                })
            }
        }
    }

    /// Write (or enqueue) one image
    ///
    /// In queued mode a failed write surfaces here on the next submission
    /// after the writer thread gave up.
    pub fn submit(&mut self, job: WriteJob) -> AppResult<()> {
        match self {
            FrameWriter::Blocking { written } => {
                job.image.save(&job.path)?;
                *written += 1;
                Ok(())
            }
            FrameWriter::Queued { sender, handle } => {
                let Some(tx) = sender.as_ref() else {
                    return Err(writer_gone());
                };
                if tx.send(job).is_ok() {
                    return Ok(());
                }

                // Receiver dropped: the writer thread exited with an error
                sender.take();
                match handle.take() {
                    Some(handle) => match join_writer(handle) {
                        Err(e) => Err(e),
                        Ok(_) => Err(writer_gone()),
                    },
                    None => Err(writer_gone()),
                }
            }
        }
    }

    /// Drain pending writes and stop the writer thread
    ///
    /// Returns the number of images written, or the first write error.
    pub fn finish(mut self) -> AppResult<usize> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> AppResult<usize> {
        match self {
            FrameWriter::Blocking { written } => Ok(*written),
            FrameWriter::Queued { sender, handle } => {
                // Closing the channel ends the writer loop
                sender.take();
                match handle.take() {
                    Some(handle) => join_writer(handle),
                    None => Ok(0),
                }
            }
        }
    }
}

impl Drop for FrameWriter {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!(error = %e, "Frame writer stopped with an error");
        }
    }
}

fn join_writer(handle: JoinHandle<AppResult<usize>>) -> AppResult<usize> {
    handle
        .join()
        .map_err(|_| AppError::Storage(std::io::Error::other("frame writer thread panicked")))?
}

fn writer_gone() -> AppError {
    AppError::Storage(std::io::Error::other("frame writer is no longer running"))
}
