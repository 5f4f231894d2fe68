pub mod batch;
pub mod cli;
pub mod compress;
pub mod constants;
pub mod error;
pub mod logger;
pub mod metadata;
pub mod outcome;
pub mod progress;
pub mod resize;
pub mod settings;
pub mod tinify;
pub mod utils;

pub use batch::{collect_image_files, BatchConfig, BatchEvent, BatchObserver, NoopObserver, Orchestrator};
pub use compress::{
    check_quota, compress_file, compress_with_retries, CompressionService, FixedQuota,
    QuotaCounter, RemoteError,
};
pub use error::{Result, SqueezeError};
pub use metadata::{restore_metadata, RestoreReport};
pub use outcome::{BatchSummary, ProcessingResult, SourceImage, Stage};
pub use resize::{resize_image, target_dimensions, DimensionUnit, ResizeConfig};
pub use settings::{JsonFileStore, MemoryStore, Settings, SettingsStore};
pub use tinify::TinifyClient;
