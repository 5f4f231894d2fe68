use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqueezeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    ImageProcessing(#[from] image::ImageError),

    #[error("File does not exist: {0}")]
    FileNotFound(PathBuf),

    #[error("Bad input directory {0}")]
    InputFolderNotFound(PathBuf),

    #[error("No files to resize/compress in specified input folder {0}")]
    NoImageFilesFound(PathBuf),

    #[error("Failed to create output directory: {0}")]
    DirectoryCreationFailed(PathBuf),

    #[error("Walkdir error: {0}")]
    WalkdirError(#[from] walkdir::Error),

    #[error("Bad max dimension {0} px, expected 1 to 16384")]
    InvalidDimension(u32),

    #[error("Unknown dimension unit: {0}. Expected px, in or cm")]
    InvalidUnit(String),

    #[error("No files selected")]
    EmptyBatch,

    #[error("Neither resizing nor compression is enabled")]
    NothingToDo,

    #[error("Compression requested, but no TinyPNG API key was given")]
    MissingApiKey,

    #[error("Cannot do any more compressions - already compressed {used} of {limit} images this month")]
    QuotaExceeded { used: u32, limit: u32 },

    #[error("Compression limit reached! The error message is: {0}")]
    AccountRejected(String),

    #[error("Encountered ServerError {attempts} times. Aborted compression. Last error: {last}")]
    RetriesExhausted { attempts: u32, last: String },

    #[error("Compression failed: {0}")]
    CompressionFailed(String),

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Settings error: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("{stage} failed for {file}: {cause}")]
    StageFailed {
        stage: &'static str,
        file: PathBuf,
        cause: Box<SqueezeError>,
    },
}

impl From<exif::Error> for SqueezeError {
    fn from(err: exif::Error) -> Self {
        SqueezeError::Metadata(err.to_string())
    }
}

impl From<img_parts::Error> for SqueezeError {
    fn from(err: img_parts::Error) -> Self {
        SqueezeError::Metadata(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SqueezeError>;
