//! Limit and skip stages: a single non-negative integer each.
//!
//! Both re-validate defensively; a UI-side guard is never trusted.

use serde_json::Value;

use stagecraft_core::{StageConfig, StageType, ValidationError};

use crate::stages::{StageBody, StageCompiler};

/// Read a non-negative integer config value under `key`.
///
/// Absent key or empty string means unconfigured; anything present but
/// negative or non-numeric is a validation error.
fn non_negative_integer(
    config: &StageConfig,
    key: &str,
) -> Result<Option<u64>, ValidationError> {
    let value = match config.get(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value,
    };

    match value {
        Value::Number(n) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| ValidationError::new(key, "must be a non-negative integer")),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<u64>()
                .map(Some)
                .map_err(|_| ValidationError::new(key, "must be a non-negative integer"))
        }
        _ => Err(ValidationError::new(key, "must be a non-negative integer")),
    }
}

pub struct LimitCompiler;

impl StageCompiler for LimitCompiler {
    fn stage_type(&self) -> StageType {
        StageType::Limit
    }

    fn compile(&self, config: &StageConfig) -> Result<StageBody, ValidationError> {
        Ok(match non_negative_integer(config, "limit")? {
            Some(n) => StageBody::Compiled(Value::from(n)),
            None => StageBody::Empty,
        })
    }
}

pub struct SkipCompiler;

impl StageCompiler for SkipCompiler {
    fn stage_type(&self) -> StageType {
        StageType::Skip
    }

    fn compile(&self, config: &StageConfig) -> Result<StageBody, ValidationError> {
        Ok(match non_negative_integer(config, "skip")? {
            Some(n) => StageBody::Compiled(Value::from(n)),
            None => StageBody::Empty,
        })
    }
}
