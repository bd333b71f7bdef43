use serde_json::{Value, json};

use super::{as_list, field, field_or, list_at, source_allowed};
use crate::entities::disease::{ClinvarVariants, DiseaseList, DiseaseSources};

fn disgenet_disease(raw: &Value) -> Value {
    json!({
        "disease_id": field(raw, "disease_id"),
        "disease_name": field(raw, "disease_name"),
        "score": field(raw, "score"),
        "source": field(raw, "source"),
    })
}

fn clinvar_condition(rcv: &Value) -> Value {
    let accession = rcv
        .get("accession")
        .map(|a| field(a, "accession"))
        .unwrap_or(Value::Null);
    json!({
        "rcv_accession": accession,
        "conditions": field_or(rcv, "conditions", json!({})),
        "clinical_significance": field(rcv, "clinical_significance"),
        "last_evaluated": field(rcv, "last_evaluated"),
    })
}

fn omim_entry(raw: &Value) -> Value {
    json!({
        "omim_id": field(raw, "omim_id"),
        "name": field(raw, "name"),
        "inheritance": field(raw, "inheritance"),
    })
}

/// Per-source disease breakdown for one gene record.
pub(crate) fn disease_sources(record: &Value, sources: Option<&[String]>) -> DiseaseSources {
    let sources = sources.filter(|s| !s.is_empty());
    let wanted = |name: &str| record.get(name).filter(|_| source_allowed(sources, name));

    let disgenet = wanted("disgenet").map(|disgenet| {
        let diseases: Vec<Value> = list_at(disgenet, "diseases")
            .into_iter()
            .map(disgenet_disease)
            .collect();
        DiseaseList {
            total: diseases.len(),
            diseases,
        }
    });

    let clinvar = wanted("clinvar").map(|clinvar| {
        let variants: Vec<Value> = list_at(clinvar, "rcv")
            .into_iter()
            .map(clinvar_condition)
            .collect();
        ClinvarVariants {
            total: variants.len(),
            variants,
        }
    });

    let omim = wanted("omim").map(|omim| {
        let diseases: Vec<Value> = as_list(omim)
            .into_iter()
            .filter(|entry| entry.is_object())
            .map(omim_entry)
            .collect();
        DiseaseList {
            total: diseases.len(),
            diseases,
        }
    });

    DiseaseSources {
        disgenet,
        clinvar,
        omim,
    }
}
