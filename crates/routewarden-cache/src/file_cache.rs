// crates/routewarden-cache/src/file_cache.rs
// ============================================================================
// Module: File Cache
// Description: Get-or-compute over timestamped JSON records on disk.
// Purpose: Serve fresh cached values without recomputation and refresh
//          expired or unreadable records transparently.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Each cache key maps to one JSON file holding `{"timestamp": secs,
//! "value": ...}`. A record is served while `timestamp > now - ttl`; an
//! expired, missing, or unreadable record is treated as a miss and the
//! value is recomputed. Recomputed non-empty values are persisted before
//! being returned; a persist failure is a hard error, since silently
//! recomputing on every call would hide the broken cache. Empty values
//! (JSON null, empty string, empty array, empty object) are returned
//! without being persisted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum length of a sanitized key, keeping the filename within common
/// filesystem component limits.
const MAX_KEY_LENGTH: usize = 200;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// File cache errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The key is empty or too long to become a filename.
    #[error("cache key is not usable: '{key}'")]
    InvalidKey {
        /// Offending key.
        key: String,
    },
    /// The computed value could not be serialized.
    #[error("cache serialization error: {0}")]
    Serialize(String),
    /// A non-empty computed value could not be persisted.
    #[error("unable to persist cache record: {0}")]
    Persist(String),
    /// The compute closure failed.
    #[error("cache compute failed: {0}")]
    Compute(String),
}

// ============================================================================
// SECTION: Records
// ============================================================================

/// Persisted cache record.
#[derive(Debug, Serialize, Deserialize)]
struct CacheRecord {
    /// Seconds since the Unix epoch at which the value was computed.
    timestamp: u64,
    /// The cached value.
    value: Value,
}

/// Value returned by [`FileCache::get_or_compute`], with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheOutcome<T> {
    /// The cached or freshly computed value.
    pub value: T,
    /// Whether the value was served from a fresh record.
    pub from_cache: bool,
}

// ============================================================================
// SECTION: File Cache
// ============================================================================

/// TTL-gated file cache rooted at one directory.
#[derive(Debug, Clone)]
pub struct FileCache {
    /// Directory holding the record files.
    dir: PathBuf,
    /// Record lifetime in seconds.
    ttl_seconds: u64,
}

impl FileCache {
    /// Creates a cache rooted at `dir` with records living `ttl_seconds`.
    ///
    /// The directory is created lazily on the first persisted record.
    #[must_use]
    pub const fn new(dir: PathBuf, ttl_seconds: u64) -> Self {
        Self {
            dir,
            ttl_seconds,
        }
    }

    /// Returns the cached value for `key`, recomputing it when no fresh
    /// record exists.
    ///
    /// # Errors
    /// Returns [`CacheError`] when the key is unusable, `compute` fails,
    /// the computed value cannot be serialized, or a non-empty value
    /// cannot be persisted.
    pub fn get_or_compute<T, F>(&self, key: &str, compute: F) -> Result<CacheOutcome<T>, CacheError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T, CacheError>,
    {
        let path = self.record_path(key)?;

        if let Some(value) = self.read_fresh(&path) {
            return Ok(CacheOutcome {
                value,
                from_cache: true,
            });
        }

        let value = compute()?;
        let serialized =
            serde_json::to_value(&value).map_err(|err| CacheError::Serialize(err.to_string()))?;
        if !is_empty_value(&serialized) {
            self.persist(&path, serialized)?;
        }
        Ok(CacheOutcome {
            value,
            from_cache: false,
        })
    }

    /// Reads a record and returns its value when fresh and decodable.
    fn read_fresh<T: DeserializeOwned>(&self, path: &Path) -> Option<T> {
        let bytes = fs::read(path).ok()?;
        let record: CacheRecord = serde_json::from_slice(&bytes).ok()?;
        let oldest_valid = unix_now().saturating_sub(self.ttl_seconds);
        if record.timestamp <= oldest_valid {
            return None;
        }
        serde_json::from_value(record.value).ok()
    }

    /// Writes a record, creating the cache directory when needed.
    fn persist(&self, path: &Path, value: Value) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir)
            .map_err(|err| CacheError::Persist(format!("unable to create cache dir: {err}")))?;
        let record = CacheRecord {
            timestamp: unix_now(),
            value,
        };
        let bytes =
            serde_json::to_vec(&record).map_err(|err| CacheError::Serialize(err.to_string()))?;
        fs::write(path, bytes).map_err(|err| CacheError::Persist(err.to_string()))
    }

    /// Resolves the record file of a key.
    fn record_path(&self, key: &str) -> Result<PathBuf, CacheError> {
        let sanitized = sanitize_key(key);
        if sanitized.is_empty() || sanitized.len() > MAX_KEY_LENGTH {
            return Err(CacheError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(self.dir.join(format!("{sanitized}.json")))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Maps a key to a safe filename stem.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|character| {
            if character.is_ascii_alphanumeric() || matches!(character, '.' | '_' | '-') {
                character
            } else {
                '_'
            }
        })
        .collect()
}

/// Returns whether a serialized value counts as empty.
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(entries) => entries.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Seconds since the Unix epoch, zero when the clock is before the epoch.
fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_secs())
}
