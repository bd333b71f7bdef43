use serde_json::{Map, Value, json};

use super::field_or;

/// Per-dataset expression payloads, keyed by dataset name.
///
/// Only datasets present on the record appear; `exac` contributes its
/// `expression` sub-object alone.
pub(crate) fn expression_data(record: &Value) -> Map<String, Value> {
    let mut data = Map::new();

    if let Some(hpa) = record.get("hpa") {
        data.insert(
            "hpa".into(),
            json!({
                "tissues": field_or(hpa, "tissue", json!([])),
                "subcellular_location": field_or(hpa, "subcellular_location", json!([])),
                "rna_tissue_specificity": field_or(hpa, "rna_tissue_specificity", json!({})),
            }),
        );
    }
    for dataset in ["gtex", "biogps"] {
        if let Some(payload) = record.get(dataset) {
            data.insert(dataset.into(), payload.clone());
        }
    }
    if let Some(expression) = record.get("exac").and_then(|exac| exac.get("expression")) {
        data.insert("exac".into(), expression.clone());
    }

    data
}
