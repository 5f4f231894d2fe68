//! Helpers shared by the resize, compress and metadata stages.

use crate::constants::{EXIF_EXTENSIONS, PROGRESS_SPINNER_TEMPLATE, SUPPORTED_IMAGE_EXTENSIONS};
use crate::error::{Result, SqueezeError};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};

fn has_extension_in(path: &Path, allowed: &[&str]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| allowed.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Check if a file path represents an image the batch picks up (JPEG or PNG).
pub fn is_image_file(path: &Path) -> bool {
    has_extension_in(path, SUPPORTED_IMAGE_EXTENSIONS)
}

/// Check if a file format can carry EXIF tags.
pub fn carries_exif(path: &Path) -> bool {
    has_extension_in(path, EXIF_EXTENSIONS)
}

/// Validate that a file exists and return a descriptive error if not
pub fn validate_file_exists(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(SqueezeError::FileNotFound(path.to_path_buf()));
    }
    Ok(())
}

/// Resolves the directory a stage writes into.
///
/// `None` means "next to the input file"; an explicit directory is created
/// when it does not exist yet.
pub fn resolve_output_dir(input: &Path, out_dir: Option<&Path>) -> Result<PathBuf> {
    match out_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .map_err(|_| SqueezeError::DirectoryCreationFailed(dir.to_path_buf()))?;
            Ok(dir.to_path_buf())
        }
        None => {
            let absolute = if input.is_absolute() {
                input.to_path_buf()
            } else {
                std::env::current_dir()?.join(input)
            };
            Ok(absolute
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")))
        }
    }
}

/// `out_dir / stem + suffix + .ext`, keeping the input's extension untouched.
pub fn suffixed_output_path(input: &Path, out_dir: &Path, suffix: &str) -> Result<PathBuf> {
    let file_stem = input
        .file_stem()
        .ok_or_else(|| SqueezeError::FileNotFound(input.to_path_buf()))?;

    let mut file_name = file_stem.to_os_string();
    file_name.push(suffix);
    if let Some(ext) = input.extension() {
        file_name.push(".");
        file_name.push(ext);
    }
    Ok(out_dir.join(file_name))
}

pub fn file_size_kb(path: &Path) -> Result<f64> {
    Ok(fs::metadata(path)?.len() as f64 / 1024.0)
}

/// Calculate savings as a percentage of the original size.
///
/// Returns 0 for an empty original so single-file messages never divide by zero.
pub fn calculate_compression_ratio(original_kb: f64, final_kb: f64) -> f64 {
    if original_kb <= 0.0 {
        return 0.0;
    }
    (original_kb - final_kb) * 100.0 / original_kb
}

/// `"<what> complete! (saved N KB = P%)"`
pub fn savings_message(what: &str, original_kb: f64, final_kb: f64) -> String {
    format!(
        "{} complete! (saved {:.0} KB = {:.1}%)",
        what,
        original_kb - final_kb,
        calculate_compression_ratio(original_kb, final_kb)
    )
}

/// Format file size in human-readable format
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Progress bar with the crate's spinner styling, sized to the batch.
pub fn create_progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_spinner().template(PROGRESS_SPINNER_TEMPLATE) {
        pb.set_style(style);
    }
    pb
}
