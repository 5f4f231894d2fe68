use crate::compress::{compress_file, CompressionService, QuotaCounter};
use crate::constants::COMPRESS_SUFFIX;
use crate::error::{Result, SqueezeError};
use crate::metadata::restore_metadata;
use crate::outcome::{BatchSummary, ProcessingResult, Stage};
use crate::resize::{resize_image, ResizeConfig};
use crate::utils::{file_size_kb, is_image_file};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Which stages run for every file of a batch, and where results go.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    /// `None` writes each result next to its source.
    pub output_dir: Option<PathBuf>,
    pub resize: Option<ResizeConfig>,
    pub compress: bool,
    pub restore_metadata: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            resize: Some(ResizeConfig::default()),
            compress: false,
            restore_metadata: true,
        }
    }
}

#[derive(Debug)]
pub enum BatchEvent<'a> {
    FileStarted {
        index: usize,
        total: usize,
        path: &'a Path,
    },
    /// Emitted for failed stages too, right before the batch stops.
    StageFinished(&'a ProcessingResult),
    /// The final output's format cannot carry EXIF tags.
    MetadataSkipped(&'a Path),
    Finished(&'a BatchSummary),
}

/// Receives progress while a batch runs.
pub trait BatchObserver {
    fn on_event(&self, event: BatchEvent<'_>);
}

pub struct NoopObserver;

impl BatchObserver for NoopObserver {
    fn on_event(&self, _event: BatchEvent<'_>) {}
}

/// Runs resize, compression and EXIF restoration over a list of files.
pub struct Orchestrator<'a> {
    config: BatchConfig,
    service: Option<&'a dyn CompressionService>,
    quota: &'a dyn QuotaCounter,
}

impl<'a> Orchestrator<'a> {
    pub fn new(config: BatchConfig) -> Self {
        Self {
            config,
            service: None,
            quota: &(),
        }
    }

    pub fn with_compression(
        mut self,
        service: &'a dyn CompressionService,
        quota: &'a dyn QuotaCounter,
    ) -> Self {
        self.service = Some(service);
        self.quota = quota;
        self
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Processes `files` in order.
    ///
    /// The first stage failure stops the whole batch: files after it are not
    /// touched and the failing stage's error is returned.
    pub fn run(&self, files: &[PathBuf], observer: &dyn BatchObserver) -> Result<BatchSummary> {
        if files.is_empty() {
            return Err(SqueezeError::EmptyBatch);
        }
        if self.config.resize.is_none() && !self.config.compress {
            return Err(SqueezeError::NothingToDo);
        }
        let service = match (self.config.compress, self.service) {
            (true, Some(service)) => Some(service),
            (true, None) => return Err(SqueezeError::MissingApiKey),
            (false, _) => None,
        };
        let out_dir = self.config.output_dir.as_deref();

        let mut summary = BatchSummary::default();
        for (index, file) in files.iter().enumerate() {
            observer.on_event(BatchEvent::FileStarted {
                index,
                total: files.len(),
                path: file,
            });
            let original_kb = file_size_kb(file)
                .map_err(|_| SqueezeError::FileNotFound(file.to_path_buf()))?;
            summary.add_original(original_kb);

            let mut last_output: Option<PathBuf> = None;

            if let Some(resize) = &self.config.resize {
                let result = resize_image(file, out_dir, &resize.suffix, resize.max_pixels());
                let result = finish_stage(Stage::Resize, file, result, observer)?;
                last_output = result.output.clone();
                summary.record(result);
            }

            if let Some(service) = service {
                // A resized intermediate is replaced in place; an untouched
                // source gets its own suffix so it is never overwritten.
                let (input, suffix) = match &last_output {
                    Some(resized) => (resized.as_path(), ""),
                    None => (file.as_path(), COMPRESS_SUFFIX),
                };
                let result = compress_file(service, self.quota, input, out_dir, suffix);
                let result = finish_stage(Stage::Compress, input, result, observer)?;
                last_output = result.output.clone();
                summary.record(result);
            }

            if self.config.restore_metadata {
                if let Some(output) = &last_output {
                    if !restore_best_effort(file, output) {
                        observer.on_event(BatchEvent::MetadataSkipped(output));
                    }
                }
            }
            summary.files_processed += 1;
        }

        observer.on_event(BatchEvent::Finished(&summary));
        Ok(summary)
    }
}

fn finish_stage(
    stage: Stage,
    file: &Path,
    result: Result<ProcessingResult>,
    observer: &dyn BatchObserver,
) -> Result<ProcessingResult> {
    match result {
        Ok(result) => {
            observer.on_event(BatchEvent::StageFinished(&result));
            Ok(result)
        }
        Err(err) => {
            let failed = ProcessingResult::failed(stage, file, &err);
            observer.on_event(BatchEvent::StageFinished(&failed));
            Err(SqueezeError::StageFailed {
                stage: stage.as_str(),
                file: file.to_path_buf(),
                cause: Box::new(err),
            })
        }
    }
}

/// Returns `false` when the output format has no place for EXIF tags.
fn restore_best_effort(original: &Path, output: &Path) -> bool {
    match restore_metadata(original, output) {
        Ok(report) if report.applicable => {
            tracing::debug!(
                "restored {} EXIF tag(s) onto {} ({} skipped)",
                report.copied,
                output.display(),
                report.skipped
            );
            true
        }
        Ok(_) => false,
        Err(err) => {
            tracing::warn!(
                "could not restore EXIF tags from {} onto {}: {}",
                original.display(),
                output.display(),
                err
            );
            true
        }
    }
}

/// Lists the JPEG and PNG files of `dir`, sorted by path.
///
/// Hidden entries are ignored. Subdirectories are only entered when
/// `recursive` is set.
pub fn collect_image_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(SqueezeError::InputFolderNotFound(dir.to_path_buf()));
    }

    let walker = if recursive {
        WalkDir::new(dir)
    } else {
        WalkDir::new(dir).max_depth(1)
    };

    let mut image_files = Vec::new();
    for entry in walker
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
    {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && is_image_file(path) {
            image_files.push(path.to_path_buf());
        }
    }

    if image_files.is_empty() {
        return Err(SqueezeError::NoImageFilesFound(dir.to_path_buf()));
    }
    image_files.sort();
    Ok(image_files)
}
