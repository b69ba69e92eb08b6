use crate::constants::MAX_KEYWORD_LEN;
use crate::error::AppError;
use log::warn;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Keywords decoded from a caller payload, plus how many entries were dropped
/// because they were not strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordBatch {
    pub keywords: Vec<String>,
    pub malformed: usize,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BlocklistPayload {
    Wrapped { packages: Vec<Value> },
    Bare(Vec<Value>),
}

/// Decode a blocklist payload: either `{"packages": [...]}` or a bare array.
///
/// Any other shape is rejected as invalid input. Non-string entries are dropped and
/// counted rather than failing the whole update.
pub fn decode_blocklist(payload: &Value) -> Result<KeywordBatch, AppError> {
    let entries = match BlocklistPayload::deserialize(payload) {
        Ok(BlocklistPayload::Wrapped { packages }) => packages,
        Ok(BlocklistPayload::Bare(entries)) => entries,
        Err(_) => {
            return Err(AppError::InvalidInput {
                field: "packages",
                reason: "expected an array of strings or an object with a \"packages\" array".into(),
            })
        }
    };

    let mut batch = KeywordBatch::default();
    for entry in entries {
        match entry {
            Value::String(keyword) => batch.keywords.push(keyword),
            Value::Null
            | Value::Bool(_)
            | Value::Number(_)
            | Value::Array(_)
            | Value::Object(_) => batch.malformed += 1,
        }
    }

    if batch.malformed > 0 {
        warn!("Dropped {} non-string blocklist entries", batch.malformed);
    }

    Ok(batch)
}

/// Validate a blocklist keyword. Returns the trimmed keyword if valid.
///
/// An empty keyword would be a substring of every app, so it is rejected.
pub fn validate_keyword(keyword: &str) -> Result<&str, AppError> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Err(AppError::InvalidInput {
            field: "keyword",
            reason: "cannot be empty".into(),
        });
    }
    if keyword.chars().count() > MAX_KEYWORD_LEN {
        return Err(AppError::InvalidInput {
            field: "keyword",
            reason: format!("cannot exceed {MAX_KEYWORD_LEN} characters"),
        });
    }
    Ok(keyword)
}

/// Validate the self marker used for self-exclusion.
pub fn validate_self_id(self_id: &str) -> Result<&str, AppError> {
    let self_id = self_id.trim();
    if self_id.is_empty() {
        // An empty marker would exclude every app from matching.
        return Err(AppError::InvalidInput {
            field: "self_id",
            reason: "cannot be empty".into(),
        });
    }
    Ok(self_id)
}

/// Validate poll period against the lookback window.
///
/// A window shorter than one period lets an app observed right after a tick
/// age out before the next one.
pub fn validate_cadence(poll_interval: Duration, lookback_window: Duration) -> Result<(), AppError> {
    if poll_interval.is_zero() {
        return Err(AppError::InvalidInput {
            field: "poll_interval_ms",
            reason: "must be positive".into(),
        });
    }
    if lookback_window.is_zero() {
        return Err(AppError::InvalidInput {
            field: "lookback_window_ms",
            reason: "must be positive".into(),
        });
    }
    if lookback_window < poll_interval {
        return Err(AppError::InvalidInput {
            field: "lookback_window_ms",
            reason: format!(
                "must be at least the poll interval ({} ms)",
                poll_interval.as_millis()
            ),
        });
    }
    Ok(())
}
