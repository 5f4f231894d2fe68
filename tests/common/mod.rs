#![allow(dead_code)]

use image::{DynamicImage, Rgb, RgbImage};
use photo_squeeze::{BatchEvent, BatchObserver, CompressionService, RemoteError};
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

/// Writes a gradient photo so encoders produce realistic, non-trivial sizes.
pub fn create_test_photo(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x * y) % 256) as u8])
    });
    DynamicImage::ImageRgb8(img).save(&path).unwrap();
    path
}

/// Compression service that halves every upload, or fails as scripted.
pub struct FakeService {
    pub calls: Cell<u32>,
    failure: Option<RemoteError>,
    fail_on_call: Option<u32>,
}

impl FakeService {
    pub fn halving() -> Self {
        Self {
            calls: Cell::new(0),
            failure: None,
            fail_on_call: None,
        }
    }

    pub fn failing(err: RemoteError) -> Self {
        Self {
            calls: Cell::new(0),
            failure: Some(err),
            fail_on_call: None,
        }
    }

    /// Succeeds until the `call`-th request (1-based), which fails with `err`.
    pub fn failing_on(call: u32, err: RemoteError) -> Self {
        Self {
            calls: Cell::new(0),
            failure: Some(err),
            fail_on_call: Some(call),
        }
    }
}

impl CompressionService for FakeService {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, RemoteError> {
        let call = self.calls.get() + 1;
        self.calls.set(call);
        match (&self.failure, self.fail_on_call) {
            (Some(err), None) => Err(err.clone()),
            (Some(err), Some(n)) if n == call => Err(err.clone()),
            _ => Ok(data[..data.len() / 2].to_vec()),
        }
    }
}

/// Keeps a plain-text trace of every event.
#[derive(Default)]
pub struct RecordingObserver {
    pub events: RefCell<Vec<String>>,
}

impl BatchObserver for RecordingObserver {
    fn on_event(&self, event: BatchEvent<'_>) {
        let line = match event {
            BatchEvent::FileStarted { index, total, path } => format!(
                "start {}/{} {}",
                index + 1,
                total,
                path.file_name().unwrap().to_string_lossy()
            ),
            BatchEvent::StageFinished(result) => format!(
                "{} {} {}",
                result.stage,
                if result.success { "ok" } else { "failed" },
                result.input.file_name().unwrap().to_string_lossy()
            ),
            BatchEvent::MetadataSkipped(path) => format!(
                "no metadata {}",
                path.file_name().unwrap().to_string_lossy()
            ),
            BatchEvent::Finished(summary) => format!("finished {}", summary.files_processed),
        };
        self.events.borrow_mut().push(line);
    }
}
