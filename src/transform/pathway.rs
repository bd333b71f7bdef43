use std::collections::BTreeMap;

use serde_json::Value;

use crate::entities::pathway::DETAIL_SOURCES;

/// Groups a record's `pathway` object by source.
///
/// Returns the contributing sources in canonical order alongside the
/// per-source lists. Sources that are absent or filtered out never appear.
pub(crate) fn pathways_by_source(
    record: &Value,
    sources: Option<&[String]>,
) -> (Vec<String>, BTreeMap<String, Vec<Value>>) {
    let mut order = Vec::new();
    let mut grouped = BTreeMap::new();
    let Some(pathway) = record.get("pathway") else {
        return (order, grouped);
    };

    for source in DETAIL_SOURCES {
        let Some(entries) = pathway.get(*source) else {
            continue;
        };
        if !super::source_allowed(sources, source) {
            continue;
        }
        let entries: Vec<Value> = super::as_list(entries).into_iter().cloned().collect();
        order.push((*source).to_string());
        grouped.insert((*source).to_string(), entries);
    }
    (order, grouped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_object_source_becomes_one_element_list() {
        let (order, grouped) = pathways_by_source(
            &json!({"pathway": {"pid": {"id": "p53downstreampathway"}}}),
            None,
        );
        assert_eq!(order, vec!["pid"]);
        assert_eq!(grouped["pid"], vec![json!({"id": "p53downstreampathway"})]);
    }

    #[test]
    fn unknown_sources_are_ignored() {
        let (order, grouped) =
            pathways_by_source(&json!({"pathway": {"smpdb": [{"id": "x"}]}}), None);
        assert!(order.is_empty());
        assert!(grouped.is_empty());
    }

    #[test]
    fn missing_pathway_yields_empty_breakdown() {
        let (order, grouped) = pathways_by_source(&json!({"symbol": "X"}), None);
        assert!(order.is_empty() && grouped.is_empty());
    }
}
