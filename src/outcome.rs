//! Values produced by the stages and aggregated by the batch orchestrator.

use crate::error::{Result, SqueezeError};
use crate::utils::validate_file_exists;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// An input photo: never modified by any stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub width: u32,
    pub height: u32,
}

impl SourceImage {
    /// Reads the file size and the pixel dimensions from the image header.
    pub fn open(path: &Path) -> Result<Self> {
        validate_file_exists(path)?;
        let size_bytes = fs::metadata(path)?.len();
        let (width, height) = image::image_dimensions(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            size_bytes,
            width,
            height,
        })
    }

    pub fn size_kb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Resize,
    Compress,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Resize => "Resize",
            Stage::Compress => "Compression",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one stage applied to one file.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingResult {
    pub stage: Stage,
    pub success: bool,
    pub message: String,
    pub input: PathBuf,
    /// `None` when the stage failed.
    pub output: Option<PathBuf>,
    pub original_kb: f64,
    pub final_kb: f64,
    /// Original minus final size in KB; negative when the file grew.
    pub saved_kb: f64,
}

impl ProcessingResult {
    pub fn succeeded(
        stage: Stage,
        input: &Path,
        output: PathBuf,
        original_kb: f64,
        final_kb: f64,
    ) -> Self {
        Self {
            stage,
            success: true,
            message: crate::utils::savings_message(stage.as_str(), original_kb, final_kb),
            input: input.to_path_buf(),
            output: Some(output),
            original_kb,
            final_kb,
            saved_kb: original_kb - final_kb,
        }
    }

    pub fn failed(stage: Stage, input: &Path, err: &SqueezeError) -> Self {
        Self {
            stage,
            success: false,
            message: err.to_string(),
            input: input.to_path_buf(),
            output: None,
            original_kb: 0.0,
            final_kb: 0.0,
            saved_kb: 0.0,
        }
    }
}

/// Totals across every file of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub files_processed: usize,
    pub total_original_kb: f64,
    pub total_saved_kb: f64,
    pub results: Vec<ProcessingResult>,
}

impl BatchSummary {
    pub fn add_original(&mut self, size_kb: f64) {
        self.total_original_kb += size_kb;
    }

    pub fn record(&mut self, result: ProcessingResult) {
        self.total_saved_kb += result.saved_kb;
        self.results.push(result);
    }

    pub fn total_final_kb(&self) -> f64 {
        self.total_original_kb - self.total_saved_kb
    }

    /// `None` when nothing with a size was processed.
    pub fn percent_saved(&self) -> Option<f64> {
        if self.total_original_kb <= 0.0 {
            return None;
        }
        Some(self.total_saved_kb / self.total_original_kb * 100.0)
    }

    pub fn message(&self) -> String {
        match self.percent_saved() {
            Some(percent) => format!(
                "Saved a total of {:.0} KB = {:.1}%",
                self.total_saved_kb, percent
            ),
            None => format!("Saved a total of {:.0} KB", self.total_saved_kb),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(stage: Stage, original_kb: f64, final_kb: f64) -> ProcessingResult {
        ProcessingResult::succeeded(
            stage,
            Path::new("in.jpg"),
            PathBuf::from("out.jpg"),
            original_kb,
            final_kb,
        )
    }

    #[test]
    fn test_percent_saved_across_two_files() {
        let mut summary = BatchSummary::default();
        summary.add_original(100.0);
        summary.record(ok(Stage::Compress, 100.0, 80.0));
        summary.add_original(200.0);
        summary.record(ok(Stage::Compress, 200.0, 150.0));

        let percent = summary.percent_saved().unwrap();
        assert!((percent - 70.0 / 300.0 * 100.0).abs() < 1e-9);
        assert_eq!(format!("{:.2}", percent), "23.33");
        assert_eq!(summary.total_final_kb(), 230.0);
        assert_eq!(summary.message(), "Saved a total of 70 KB = 23.3%");
    }

    #[test]
    fn test_stage_savings_add_up_to_end_to_end_savings() {
        let mut summary = BatchSummary::default();
        summary.add_original(500.0);
        summary.record(ok(Stage::Resize, 500.0, 200.0));
        summary.record(ok(Stage::Compress, 200.0, 120.0));

        assert_eq!(summary.total_saved_kb, 380.0);
        assert_eq!(summary.total_final_kb(), 120.0);
    }

    #[test]
    fn test_percent_saved_undefined_for_empty_batch() {
        let summary = BatchSummary::default();
        assert_eq!(summary.percent_saved(), None);
        assert_eq!(summary.message(), "Saved a total of 0 KB");
    }

    #[test]
    fn test_negative_savings_are_reported() {
        let result = ok(Stage::Resize, 100.0, 110.0);
        assert!(result.success);
        assert_eq!(result.saved_kb, -10.0);
        assert_eq!(result.message, "Resize complete! (saved -10 KB = -10.0%)");
    }

    #[test]
    fn test_failed_result_has_no_output() {
        let err = SqueezeError::FileNotFound(PathBuf::from("gone.jpg"));
        let result = ProcessingResult::failed(Stage::Resize, Path::new("gone.jpg"), &err);
        assert!(!result.success);
        assert!(result.output.is_none());
        assert_eq!(result.message, "File does not exist: gone.jpg");
    }

    #[test]
    fn test_source_image_missing() {
        let result = SourceImage::open(Path::new("/nonexistent/photo.jpg"));
        assert!(matches!(result, Err(SqueezeError::FileNotFound(_))));
    }
}
