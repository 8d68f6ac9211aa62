//! Loading the operator-supplied desired set from disk.

use std::path::Path;

use crate::error::CoreError;
use crate::resource::{DesiredResource, validate_desired};

/// Load and validate a desired set from a JSON file.
pub fn load_desired(path: &Path) -> Result<Vec<DesiredResource>, CoreError> {
    let raw = std::fs::read_to_string(path)?;
    parse_desired(&raw)
}

/// Parse a desired set from raw JSON: either a bare array of resources or
/// an object with a `resources` array.
pub fn parse_desired(raw: &str) -> Result<Vec<DesiredResource>, CoreError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    let desired: Vec<DesiredResource> = match value {
        serde_json::Value::Array(_) => serde_json::from_value(value)?,
        serde_json::Value::Object(mut map) => match map.remove("resources") {
            Some(list) => serde_json::from_value(list)?,
            None => {
                return Err(CoreError::Validation(
                    "expected a `resources` array".into(),
                ));
            }
        },
        _ => {
            return Err(CoreError::Validation(
                "expected an array of resources".into(),
            ));
        }
    };
    validate_desired(&desired)?;
    Ok(desired)
}
