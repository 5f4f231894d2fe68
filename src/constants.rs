pub const DEFAULT_MAX_DIMENSION: u32 = 1200;
/// Largest bounding dimension, in pixels, a resize may target.
pub const MAX_IMAGE_DIMENSION: u32 = 16_384;
pub const RESIZE_SUFFIX: &str = "_small";
pub const COMPRESS_SUFFIX: &str = "_tiny";

/// Resolution used when a bounding dimension is given in inches or centimetres.
pub const DOTS_PER_INCH: f64 = 100.0;
pub const CM_PER_INCH: f64 = 2.54;

pub const MONTHLY_COMPRESSION_LIMIT: u32 = 500;
pub const MAX_COMPRESSION_ATTEMPTS: u32 = 5;

pub const TINIFY_API_URL: &str = "https://api.tinify.com";
pub const TINIFY_TIMEOUT_SECS: u64 = 60;
pub const COMPRESSION_COUNT_HEADER: &str = "Compression-Count";

pub const SETTINGS_DIR_NAME: &str = "photo-squeeze";
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Extensions picked up when scanning an input folder.
pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];
/// Extensions whose files carry EXIF tags worth restoring.
pub const EXIF_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

pub const PROGRESS_SPINNER_TEMPLATE: &str = "{spinner:.green} [{pos}/{len}] {msg}";
