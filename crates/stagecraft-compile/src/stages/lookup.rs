//! Lookup stage: a left outer join against another collection.
//!
//! Unlike other stages, lookup's required fields fail validation even on a
//! freshly dropped node; there is no meaningful "partially joined" state.

use serde_json::{Map, Value};

use stagecraft_core::{StageConfig, StageType, ValidationError};

use crate::stages::{StageBody, StageCompiler};

const DEFAULT_AS: &str = "joined";

pub struct LookupCompiler;

fn required_string(config: &StageConfig, key: &str) -> Result<String, ValidationError> {
    config
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ValidationError::required(key))
}

impl StageCompiler for LookupCompiler {
    fn stage_type(&self) -> StageType {
        StageType::Lookup
    }

    fn compile(&self, config: &StageConfig) -> Result<StageBody, ValidationError> {
        let from = required_string(config, "from")?;
        let local_field = required_string(config, "localField")?;
        let foreign_field = required_string(config, "foreignField")?;
        let as_field = config
            .get("as")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_AS)
            .to_string();

        let mut body = Map::new();
        body.insert("from".to_string(), Value::String(from));
        body.insert("localField".to_string(), Value::String(local_field));
        body.insert("foreignField".to_string(), Value::String(foreign_field));
        body.insert("as".to_string(), Value::String(as_field));
        Ok(StageBody::Compiled(Value::Object(body)))
    }
}
