//! Console rendering of batch progress.

use crate::batch::{BatchEvent, BatchObserver};
use crate::logger::is_quiet;
use crate::utils::create_progress_bar;
use indicatif::ProgressBar;

pub struct ConsoleObserver {
    bar: ProgressBar,
}

impl ConsoleObserver {
    pub fn new(total_files: usize) -> Self {
        let bar = if is_quiet() {
            ProgressBar::hidden()
        } else {
            create_progress_bar(total_files as u64)
        };
        Self { bar }
    }
}

impl BatchObserver for ConsoleObserver {
    fn on_event(&self, event: BatchEvent<'_>) {
        match event {
            BatchEvent::FileStarted { index, path, .. } => {
                self.bar.set_position(index as u64);
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                self.bar.set_message(name);
            }
            BatchEvent::StageFinished(result) => {
                let name = result
                    .input
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                if result.success {
                    self.bar.suspend(|| {
                        crate::info!("✅ {} \"{}\": {}", result.stage, name, result.message);
                    });
                } else {
                    // The batch stops here; the caller reports the error itself.
                    tracing::debug!("{} of {} failed: {}", result.stage, name, result.message);
                    self.bar.abandon();
                }
            }
            BatchEvent::MetadataSkipped(path) => {
                tracing::debug!("{} keeps no EXIF tags", path.display());
            }
            BatchEvent::Finished(summary) => {
                self.bar.set_position(summary.files_processed as u64);
                self.bar.finish_and_clear();
            }
        }
    }
}

impl Drop for ConsoleObserver {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.abandon();
        }
    }
}
