//! Best-effort EXIF restoration.
//!
//! Resampling and remote compression both drop the EXIF block. This module
//! copies the original's tags back onto the final JPEG one by one, leaving
//! out any tag that cannot be re-encoded instead of giving up on the file.

use crate::error::Result;
use crate::utils::{carries_exif, validate_file_exists};
use exif::experimental::Writer;
use exif::{Exif, Field, In, Reader};
use img_parts::jpeg::Jpeg;
use img_parts::ImageEXIF;
use std::fs::{self, File};
use std::io::{BufReader, Cursor};
use std::path::Path;
use tempfile::NamedTempFile;

/// What a restoration did to the destination file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RestoreReport {
    /// `false` when the destination format carries no EXIF and was left alone.
    pub applicable: bool,
    pub copied: usize,
    pub skipped: usize,
}

impl RestoreReport {
    pub fn skipped_format() -> Self {
        Self::default()
    }
}

/// Copies every primary-IFD EXIF tag of `original` onto `final_file`,
/// overwriting tags the destination already has.
pub fn restore_metadata(original: &Path, final_file: &Path) -> Result<RestoreReport> {
    if !carries_exif(final_file) {
        tracing::debug!("{} cannot carry EXIF, skipping", final_file.display());
        return Ok(RestoreReport::skipped_format());
    }
    validate_file_exists(original)?;
    validate_file_exists(final_file)?;

    let source = match read_exif(original)? {
        Some(exif) => exif,
        None => {
            return Ok(RestoreReport {
                applicable: true,
                ..RestoreReport::default()
            })
        }
    };
    // The destination may legitimately have no EXIF block at all.
    let existing: Vec<Field> = read_exif(final_file)
        .ok()
        .flatten()
        .map(|exif| primary_fields(&exif))
        .unwrap_or_default();

    let (merged, copied, skipped) = merge_fields(&primary_fields(&source), &existing);
    if skipped > 0 {
        tracing::debug!(
            "{} EXIF tag(s) of {} could not be copied",
            skipped,
            original.display()
        );
    }

    let tiff = encode_fields(&merged, source.little_endian())?;
    write_exif_block(final_file, tiff)?;

    Ok(RestoreReport {
        applicable: true,
        copied,
        skipped,
    })
}

/// `Ok(None)` when the file has no EXIF block.
fn read_exif(path: &Path) -> Result<Option<Exif>> {
    let mut reader = BufReader::new(File::open(path)?);
    match Reader::new().read_from_container(&mut reader) {
        Ok(exif) => Ok(Some(exif)),
        Err(exif::Error::NotFound(_)) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn primary_fields(exif: &Exif) -> Vec<Field> {
    exif.fields()
        .filter(|f| f.ifd_num == In::PRIMARY)
        .cloned()
        .collect()
}

fn encodes_alone(field: &Field) -> bool {
    let mut writer = Writer::new();
    writer.push_field(field);
    writer.write(&mut Cursor::new(Vec::new()), false).is_ok()
}

/// Overlays `source` onto `existing`. Returns the merged set together with
/// the number of source tags copied and skipped.
pub fn merge_fields(source: &[Field], existing: &[Field]) -> (Vec<Field>, usize, usize) {
    let mut merged: Vec<Field> = existing.iter().filter(|f| encodes_alone(f)).cloned().collect();
    let mut copied = 0;
    let mut skipped = 0;

    for field in source {
        if !encodes_alone(field) {
            skipped += 1;
            continue;
        }
        match merged
            .iter_mut()
            .find(|f| f.tag == field.tag && f.ifd_num == field.ifd_num)
        {
            Some(slot) => *slot = field.clone(),
            None => merged.push(field.clone()),
        }
        copied += 1;
    }

    (merged, copied, skipped)
}

/// Serializes fields into a TIFF-structured EXIF block.
pub fn encode_fields(fields: &[Field], little_endian: bool) -> Result<Vec<u8>> {
    let mut writer = Writer::new();
    for field in fields {
        writer.push_field(field);
    }
    let mut buf = Cursor::new(Vec::new());
    writer.write(&mut buf, little_endian)?;
    Ok(buf.into_inner())
}

/// Replaces the EXIF segment of a JPEG file.
///
/// The new file is written next to the old one and renamed over it, so a
/// failed write leaves the original untouched.
pub fn write_exif_block(jpeg_path: &Path, tiff: Vec<u8>) -> Result<()> {
    let data = fs::read(jpeg_path)?;
    let mut jpeg = Jpeg::from_bytes(data.into())?;
    jpeg.set_exif(Some(tiff.into()));

    let dir = jpeg_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut staged = NamedTempFile::new_in(dir)?;
    jpeg.encoder().write_to(&mut staged)?;
    staged.persist(jpeg_path).map_err(|e| e.error)?;
    Ok(())
}
