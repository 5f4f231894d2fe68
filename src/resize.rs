use crate::constants::{
    CM_PER_INCH, DEFAULT_MAX_DIMENSION, DOTS_PER_INCH, MAX_IMAGE_DIMENSION, RESIZE_SUFFIX,
};
use crate::error::{Result, SqueezeError};
use crate::outcome::{ProcessingResult, SourceImage, Stage};
use crate::utils::{file_size_kb, resolve_output_dir, suffixed_output_path, validate_file_exists};
use image::imageops::FilterType;
use image::ImageReader;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Unit the bounding dimension is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DimensionUnit {
    #[default]
    Px,
    In,
    Cm,
}

impl DimensionUnit {
    /// Converts `value` in this unit to whole pixels.
    pub fn to_pixels(self, value: f64) -> u32 {
        let px = match self {
            DimensionUnit::Px => value,
            DimensionUnit::In => value * DOTS_PER_INCH,
            DimensionUnit::Cm => value / CM_PER_INCH * DOTS_PER_INCH,
        };
        px.round().max(0.0) as u32
    }
}

impl FromStr for DimensionUnit {
    type Err = SqueezeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "px" => Ok(DimensionUnit::Px),
            "in" => Ok(DimensionUnit::In),
            "cm" => Ok(DimensionUnit::Cm),
            _ => Err(SqueezeError::InvalidUnit(s.to_string())),
        }
    }
}

impl fmt::Display for DimensionUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DimensionUnit::Px => "px",
            DimensionUnit::In => "in",
            DimensionUnit::Cm => "cm",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResizeConfig {
    pub max_dimension: u32,
    pub unit: DimensionUnit,
    pub suffix: String,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_MAX_DIMENSION,
            unit: DimensionUnit::Px,
            suffix: RESIZE_SUFFIX.to_string(),
        }
    }
}

impl ResizeConfig {
    /// Fails unless the bound converts to 1..=`MAX_IMAGE_DIMENSION` pixels.
    pub fn new(max_dimension: u32, unit: DimensionUnit) -> Result<Self> {
        let config = Self {
            max_dimension,
            unit,
            ..Self::default()
        };
        check_bound(config.max_pixels())?;
        Ok(config)
    }

    /// Bounding dimension in pixels.
    pub fn max_pixels(&self) -> u32 {
        self.unit.to_pixels(self.max_dimension as f64)
    }
}

fn check_bound(max_pixels: u32) -> Result<()> {
    if max_pixels == 0 || max_pixels > MAX_IMAGE_DIMENSION {
        return Err(SqueezeError::InvalidDimension(max_pixels));
    }
    Ok(())
}

/// Size that fits `width` x `height` into a `max_dimension` square.
///
/// The longer side becomes exactly `max_dimension`; a square image is treated
/// as landscape. Neither side drops below one pixel.
pub fn target_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let max = max_dimension as f64;
    if width >= height {
        let scaled = (max * height as f64 / width as f64).round() as u32;
        (max_dimension, scaled.max(1))
    } else {
        let scaled = (max * width as f64 / height as f64).round() as u32;
        (scaled.max(1), max_dimension)
    }
}

/// Resizes `file` so its longer side equals `max_dimension` pixels.
///
/// The result is written as `stem + suffix + ext` into `out_dir`, or next to
/// the source when `out_dir` is `None`. The encoder writes no EXIF block, so
/// callers that care about capture metadata restore it afterwards.
pub fn resize_image(
    file: &Path,
    out_dir: Option<&Path>,
    suffix: &str,
    max_dimension: u32,
) -> Result<ProcessingResult> {
    validate_file_exists(file)?;
    check_bound(max_dimension)?;

    let out_dir = resolve_output_dir(file, out_dir)?;
    let out_file = suffixed_output_path(file, &out_dir, suffix)?;

    let source = SourceImage::open(file)?;
    let img = ImageReader::open(file)?.with_guessed_format()?.decode()?;

    let (new_width, new_height) = target_dimensions(source.width, source.height, max_dimension);
    tracing::debug!(
        "resizing {} from {}x{} to {}x{}",
        file.display(),
        source.width,
        source.height,
        new_width,
        new_height
    );
    let resized = img.resize_exact(new_width, new_height, FilterType::Lanczos3);
    resized.save(&out_file)?;

    let final_kb = file_size_kb(&out_file)?;
    Ok(ProcessingResult::succeeded(
        Stage::Resize,
        file,
        out_file,
        source.size_kb(),
        final_kb,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GenericImageView};
    use tempfile::TempDir;

    fn write_test_jpeg(dir: &Path, name: &str, width: u32, height: u32) -> std::path::PathBuf {
        let path = dir.join(name);
        DynamicImage::new_rgb8(width, height).save(&path).unwrap();
        path
    }

    #[test]
    fn test_target_dimensions_landscape() {
        assert_eq!(target_dimensions(4000, 3000, 1200), (1200, 900));
    }

    #[test]
    fn test_target_dimensions_portrait() {
        assert_eq!(target_dimensions(3000, 4000, 1200), (900, 1200));
    }

    #[test]
    fn test_target_dimensions_square() {
        assert_eq!(target_dimensions(500, 500, 1200), (1200, 1200));
    }

    #[test]
    fn test_target_dimensions_rounds() {
        // 1200 * 1000 / 3000 = 400, 1200 * 1001 / 3000 = 400.4, 1200 * 1002 / 3000 = 400.8
        assert_eq!(target_dimensions(3000, 1001, 1200), (1200, 400));
        assert_eq!(target_dimensions(3000, 1002, 1200), (1200, 401));
    }

    #[test]
    fn test_target_dimensions_never_zero() {
        assert_eq!(target_dimensions(10000, 1, 100), (100, 1));
    }

    #[test]
    fn test_dimension_unit_conversion() {
        assert_eq!(DimensionUnit::Px.to_pixels(1200.0), 1200);
        assert_eq!(DimensionUnit::In.to_pixels(12.0), 1200);
        assert_eq!(DimensionUnit::Cm.to_pixels(2.54), 100);
    }

    #[test]
    fn test_dimension_unit_parse() {
        assert_eq!("PX".parse::<DimensionUnit>().unwrap(), DimensionUnit::Px);
        assert_eq!("cm".parse::<DimensionUnit>().unwrap(), DimensionUnit::Cm);
        assert!(matches!(
            "mm".parse::<DimensionUnit>(),
            Err(SqueezeError::InvalidUnit(_))
        ));
    }

    #[test]
    fn test_resize_config_rejects_zero() {
        assert!(matches!(
            ResizeConfig::new(0, DimensionUnit::Px),
            Err(SqueezeError::InvalidDimension(0))
        ));
        let config = ResizeConfig::new(10, DimensionUnit::In).unwrap();
        assert_eq!(config.max_pixels(), 1000);
        assert_eq!(config.suffix, "_small");
    }

    #[test]
    fn test_resize_config_rejects_oversized_bound() {
        assert!(ResizeConfig::new(MAX_IMAGE_DIMENSION, DimensionUnit::Px).is_ok());
        assert!(matches!(
            ResizeConfig::new(MAX_IMAGE_DIMENSION + 1, DimensionUnit::Px),
            Err(SqueezeError::InvalidDimension(_))
        ));
        // 200 in at 100 dpi is 20000 px.
        assert!(matches!(
            ResizeConfig::new(200, DimensionUnit::In),
            Err(SqueezeError::InvalidDimension(20_000))
        ));
        assert!(matches!(
            ResizeConfig::new(0, DimensionUnit::Cm),
            Err(SqueezeError::InvalidDimension(0))
        ));
    }

    #[test]
    fn test_resize_image_rejects_huge_target() {
        let temp_dir = TempDir::new().unwrap();
        let input = write_test_jpeg(temp_dir.path(), "small.jpg", 4, 3);

        let result = resize_image(&input, None, "_small", 2_000_000_000);

        assert!(matches!(
            result,
            Err(SqueezeError::InvalidDimension(2_000_000_000))
        ));
        assert!(!temp_dir.path().join("small_small.jpg").exists());
    }

    #[test]
    fn test_resize_image_writes_suffixed_file() {
        let temp_dir = TempDir::new().unwrap();
        let input = write_test_jpeg(temp_dir.path(), "wide.jpg", 400, 200);
        let out_dir = temp_dir.path().join("out");

        let result = resize_image(&input, Some(&out_dir), "_small", 100).unwrap();

        let output = result.output.clone().unwrap();
        assert!(result.success);
        assert_eq!(output, out_dir.join("wide_small.jpg"));
        assert!(result.message.starts_with("Resize complete! (saved "));
        let img = image::open(&output).unwrap();
        assert_eq!(img.dimensions(), (100, 50));
    }

    #[test]
    fn test_resize_image_defaults_to_source_directory() {
        let temp_dir = TempDir::new().unwrap();
        let input = write_test_jpeg(temp_dir.path(), "tall.jpg", 100, 300);

        let result = resize_image(&input, None, "_small", 150).unwrap();

        let output = result.output.unwrap();
        assert_eq!(output.parent().unwrap(), temp_dir.path());
        assert_eq!(image::open(&output).unwrap().dimensions(), (50, 150));
    }

    #[test]
    fn test_resize_image_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let out_dir = temp_dir.path().join("out");
        let missing = temp_dir.path().join("missing.jpg");

        let result = resize_image(&missing, Some(&out_dir), "_small", 1200);

        assert!(matches!(result, Err(SqueezeError::FileNotFound(_))));
        assert!(!out_dir.join("missing_small.jpg").exists());
    }
}
