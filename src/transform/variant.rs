use serde_json::{Map, Value, json};

use super::{as_list, display_value, field, field_or, list_at};
use crate::entities::variant::{
    ClinvarEntries, GraspAssociations, SnpeffAnnotations, VariantSources,
};

fn significance_matches(rcv: &Value, wanted: Option<&str>) -> bool {
    let Some(wanted) = wanted.map(str::to_lowercase) else {
        return true;
    };
    let significance = rcv
        .get("clinical_significance")
        .map(display_value)
        .unwrap_or_default()
        .to_lowercase();
    significance.contains(&wanted)
}

/// One clinvar review entry.
///
/// Measures are walked in order and every measure passing the type filter
/// overwrites `variant_type` and `name`, so the last match wins. An entry
/// with no matching measure is still returned, without those two keys.
pub(crate) fn clinvar_entry(rcv: &Value, variant_type: Option<&str>) -> Value {
    let mut entry = Map::new();
    let accession = rcv
        .get("accession")
        .map(|a| field(a, "accession"))
        .unwrap_or(Value::Null);
    entry.insert("accession".into(), accession);
    entry.insert("title".into(), field(rcv, "title"));
    entry.insert("clinical_significance".into(), field(rcv, "clinical_significance"));
    entry.insert("last_evaluated".into(), field(rcv, "last_evaluated"));
    entry.insert("review_status".into(), field(rcv, "review_status"));
    entry.insert("conditions".into(), field_or(rcv, "conditions", json!({})));

    let measures = rcv
        .get("measure_set")
        .map(|set| list_at(set, "measure"))
        .unwrap_or_default();
    for measure in measures {
        let kind = field(measure, "type");
        if variant_type.is_some_and(|wanted| kind.as_str() != Some(wanted)) {
            continue;
        }
        entry.insert("variant_type".into(), kind);
        entry.insert("name".into(), field(measure, "name"));
    }
    Value::Object(entry)
}

fn snpeff_annotation(raw: &Value) -> Value {
    json!({
        "effect": field(raw, "effect"),
        "putative_impact": field(raw, "putative_impact"),
        "gene_name": field(raw, "gene_name"),
        "feature_type": field(raw, "feature_type"),
    })
}

fn grasp_association(raw: &Value) -> Value {
    json!({
        "phenotype": field(raw, "phenotype"),
        "snp_id": field(raw, "snp_id"),
        "p_value": field(raw, "p_value"),
        "pmid": field(raw, "pmid"),
    })
}

pub(crate) fn variant_sources(
    record: &Value,
    variant_type: Option<&str>,
    clinical_significance: Option<&str>,
) -> VariantSources {
    let clinvar = record.get("clinvar").map(|clinvar| {
        let variants: Vec<Value> = list_at(clinvar, "rcv")
            .into_iter()
            .filter(|rcv| significance_matches(rcv, clinical_significance))
            .map(|rcv| clinvar_entry(rcv, variant_type))
            .collect();
        ClinvarEntries {
            total: variants.len(),
            variants,
        }
    });

    let snpeff = record.get("snpeff").map(|snpeff| {
        let annotations: Vec<Value> = list_at(snpeff, "ann")
            .into_iter()
            .map(snpeff_annotation)
            .collect();
        SnpeffAnnotations {
            total: annotations.len(),
            annotations,
        }
    });

    let grasp = record.get("grasp").map(|grasp| {
        let associations: Vec<Value> = grasp
            .get("publication")
            .map(as_list)
            .unwrap_or_default()
            .into_iter()
            .map(grasp_association)
            .collect();
        GraspAssociations {
            total: associations.len(),
            associations,
        }
    });

    VariantSources {
        clinvar,
        snpeff,
        grasp,
    }
}
