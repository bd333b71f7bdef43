use serde_json::{Value, json};

use super::{as_list, field, field_or, list_at, source_allowed};
use crate::entities::chemical::{
    ChebiCompounds, ChemblTargets, ChemicalSources, DrugbankDrugs, PharmgkbChemicals,
};

fn pharmgkb_chemical(raw: &Value) -> Value {
    json!({
        "name": field(raw, "name"),
        "id": field(raw, "id"),
        "type": field(raw, "type"),
    })
}

fn chebi_compound(raw: &Value) -> Value {
    json!({
        "id": field(raw, "id"),
        "name": field(raw, "name"),
        "definition": field(raw, "definition"),
    })
}

fn drugbank_drug(raw: &Value) -> Value {
    json!({
        "id": field(raw, "id"),
        "name": field(raw, "name"),
        "groups": field_or(raw, "groups", json!([])),
    })
}

fn objects(value: &Value) -> impl Iterator<Item = &Value> {
    as_list(value).into_iter().filter(|v| v.is_object())
}

/// Per-source chemical breakdown for one gene record.
///
/// `chembl` only contributes when it carries `target_component`.
pub(crate) fn chemical_sources(record: &Value, sources: Option<&[String]>) -> ChemicalSources {
    let sources = sources.filter(|s| !s.is_empty());
    let wanted = |name: &str| record.get(name).filter(|_| source_allowed(sources, name));

    let pharmgkb = wanted("pharmgkb").map(|pharmgkb| {
        let chemicals: Vec<Value> = list_at(pharmgkb, "chemical")
            .into_iter()
            .map(pharmgkb_chemical)
            .collect();
        PharmgkbChemicals {
            total: chemicals.len(),
            chemicals,
        }
    });

    let chebi = wanted("chebi").map(|chebi| {
        let compounds: Vec<Value> = objects(chebi).map(chebi_compound).collect();
        ChebiCompounds {
            total: compounds.len(),
            compounds,
        }
    });

    let chembl = wanted("chembl")
        .and_then(|chembl| chembl.get("target_component"))
        .map(|targets| {
            let targets: Vec<Value> = as_list(targets).into_iter().cloned().collect();
            ChemblTargets {
                total: targets.len(),
                targets,
            }
        });

    let drugbank = wanted("drugbank").map(|drugbank| {
        let drugs: Vec<Value> = objects(drugbank).map(drugbank_drug).collect();
        DrugbankDrugs {
            total: drugs.len(),
            drugs,
        }
    });

    ChemicalSources {
        pharmgkb,
        chebi,
        chembl,
        drugbank,
    }
}
