use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// Tool argument that accepts either a JSON list of strings or one
/// comma-separated string (`"symbol,name"`).
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum StringOrVec {
    #[default]
    None,
    Single(String),
    Multiple(Vec<String>),
}

impl StringOrVec {
    /// Flattens into trimmed, non-empty items; a single string is split on commas.
    pub fn into_items(self) -> Vec<String> {
        let raw = match self {
            Self::None => Vec::new(),
            Self::Single(value) => value.split(',').map(str::to_string).collect(),
            Self::Multiple(values) => values,
        };
        raw.into_iter()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect()
    }
}

/// `deserialize_with` adapter for optional list arguments.
///
/// Null, an empty list and a blank string all mean "not given".
pub(crate) fn optional_items<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = StringOrVec::deserialize(deserializer)?.into_items();
    Ok((!items.is_empty()).then_some(items))
}
