use std::collections::BTreeMap;

use serde_json::{Value, json};

use super::{as_list, field, field_or};
use crate::entities::go::{ASPECTS, GoAnnotation};

pub(crate) fn go_annotation(raw: &Value) -> GoAnnotation {
    GoAnnotation {
        id: field(raw, "id"),
        term: field(raw, "term"),
        evidence: field(raw, "evidence"),
        qualifier: field_or(raw, "qualifier", json!([])),
        pubmed: field_or(raw, "pubmed", json!([])),
    }
}

fn evidence_allowed(raw: &Value, codes: Option<&[String]>) -> bool {
    match codes {
        Some(codes) if !codes.is_empty() => raw
            .get("evidence")
            .and_then(Value::as_str)
            .is_some_and(|evidence| codes.iter().any(|c| c == evidence)),
        _ => true,
    }
}

/// Annotations grouped under `BP`, `MF` and `CC`.
///
/// An aspect missing from the record is left out of the map rather than
/// reported as an empty list.
pub(crate) fn annotations_by_aspect(
    record: &Value,
    aspect: Option<&str>,
    evidence_codes: Option<&[String]>,
) -> BTreeMap<String, Vec<GoAnnotation>> {
    let mut grouped = BTreeMap::new();
    let Some(go) = record.get("go") else {
        return grouped;
    };

    for name in ASPECTS {
        if aspect.is_some_and(|wanted| wanted != *name) {
            continue;
        }
        let Some(entries) = go.get(*name) else {
            continue;
        };
        let items = as_list(entries)
            .into_iter()
            .filter(|raw| evidence_allowed(raw, evidence_codes))
            .map(go_annotation)
            .collect();
        grouped.insert((*name).to_string(), items);
    }
    grouped
}
