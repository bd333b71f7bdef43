use serde::Serialize;

use crate::error::MyGeneError;

pub fn to_pretty<T: Serialize>(value: &T) -> Result<String, MyGeneError> {
    Ok(serde_json::to_string_pretty(value)?)
}
