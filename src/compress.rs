//! Remote compression stage: quota check, bounded retries, write the result.

use crate::constants::{MAX_COMPRESSION_ATTEMPTS, MONTHLY_COMPRESSION_LIMIT};
use crate::error::{Result, SqueezeError};
use crate::outcome::{ProcessingResult, Stage};
use crate::utils::{file_size_kb, resolve_output_dir, suffixed_output_path, validate_file_exists};
use std::fmt;
use std::fs;
use std::path::Path;

/// Failure reported by a remote compression service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Credential or account problem (bad key, monthly limit hit server-side).
    Account(String),
    /// Server-side failure; worth another attempt.
    Server(String),
    /// The request itself was rejected (bad input, unsupported type).
    Client(String),
    Connection(String),
    UnexpectedResponse(String),
}

impl RemoteError {
    pub fn is_transient(&self) -> bool {
        matches!(self, RemoteError::Server(_))
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::Account(msg) => write!(f, "account error: {}", msg),
            RemoteError::Server(msg) => write!(f, "server error: {}", msg),
            RemoteError::Client(msg) => write!(f, "client error: {}", msg),
            RemoteError::Connection(msg) => write!(f, "connection error: {}", msg),
            RemoteError::UnexpectedResponse(msg) => write!(f, "unexpected response: {}", msg),
        }
    }
}

impl std::error::Error for RemoteError {}

/// Port to a service that turns image bytes into smaller image bytes.
pub trait CompressionService {
    fn compress(&self, data: &[u8]) -> std::result::Result<Vec<u8>, RemoteError>;
}

/// Port to the monthly compression counter kept by the remote service.
pub trait QuotaCounter {
    /// Compressions used this month, or `None` before the service has reported one.
    fn compression_count(&self) -> Option<u32>;
}

/// No counter available; never blocks a compression.
impl QuotaCounter for () {
    fn compression_count(&self) -> Option<u32> {
        None
    }
}

/// A counter pinned to a known value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedQuota(pub u32);

impl QuotaCounter for FixedQuota {
    fn compression_count(&self) -> Option<u32> {
        Some(self.0)
    }
}

/// Fails with `QuotaExceeded` once the monthly ceiling is reached.
pub fn check_quota(quota: &dyn QuotaCounter) -> Result<()> {
    match quota.compression_count() {
        Some(used) if used >= MONTHLY_COMPRESSION_LIMIT => Err(SqueezeError::QuotaExceeded {
            used,
            limit: MONTHLY_COMPRESSION_LIMIT,
        }),
        _ => Ok(()),
    }
}

/// Runs the service until it succeeds, fails permanently, or
/// `MAX_COMPRESSION_ATTEMPTS` server errors have been seen.
pub fn compress_with_retries(service: &dyn CompressionService, data: &[u8]) -> Result<Vec<u8>> {
    let mut last_error = String::new();

    for attempt in 1..=MAX_COMPRESSION_ATTEMPTS {
        match service.compress(data) {
            Ok(bytes) => return Ok(bytes),
            Err(RemoteError::Account(msg)) => return Err(SqueezeError::AccountRejected(msg)),
            Err(err) if err.is_transient() => {
                tracing::warn!(
                    "compression attempt {}/{} failed: {}",
                    attempt,
                    MAX_COMPRESSION_ATTEMPTS,
                    err
                );
                last_error = err.to_string();
            }
            Err(err) => return Err(SqueezeError::CompressionFailed(err.to_string())),
        }
    }

    Err(SqueezeError::RetriesExhausted {
        attempts: MAX_COMPRESSION_ATTEMPTS,
        last: last_error,
    })
}

/// Compresses `file` through `service` and writes `stem + suffix + ext` into
/// `out_dir` (or next to the source).
///
/// The quota is read before anything is sent; at or above the monthly limit
/// no request is made.
pub fn compress_file(
    service: &dyn CompressionService,
    quota: &dyn QuotaCounter,
    file: &Path,
    out_dir: Option<&Path>,
    suffix: &str,
) -> Result<ProcessingResult> {
    validate_file_exists(file)?;
    check_quota(quota)?;

    let out_dir = resolve_output_dir(file, out_dir)?;
    let out_file = suffixed_output_path(file, &out_dir, suffix)?;

    let data = fs::read(file)?;
    let original_kb = data.len() as f64 / 1024.0;

    let compressed = compress_with_retries(service, &data)?;
    fs::write(&out_file, &compressed)?;

    let final_kb = file_size_kb(&out_file)?;
    Ok(ProcessingResult::succeeded(
        Stage::Compress,
        file,
        out_file,
        original_kb,
        final_kb,
    ))
}
