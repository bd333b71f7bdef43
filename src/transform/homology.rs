use std::collections::BTreeMap;

use serde_json::{Value, json};

use super::{as_list, display_value, field};
use crate::entities::homology::{HomologyGene, HomologyGroup};

const SPECIES_ALIASES: &[(&str, u64)] = &[("human", 9606), ("mouse", 10090), ("rat", 10116)];

/// Whether a caller species token names `taxid`.
///
/// Accepts an all-digit taxonomy id or one of three lower-case aliases;
/// any other string matches nothing.
pub(crate) fn species_matches(token: &str, taxid: &Value) -> bool {
    let Some(taxid) = taxid.as_u64() else {
        return false;
    };
    if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
        return token.parse::<u64>().is_ok_and(|wanted| wanted == taxid);
    }
    SPECIES_ALIASES
        .iter()
        .any(|(alias, id)| *alias == token && *id == taxid)
}

fn homologene_entries(
    record: &Value,
    gene_id: &str,
    target_species: Option<&[String]>,
) -> Option<Vec<Value>> {
    let homologene = record.get("homologene")?;
    let homologene_id = homologene.get("id").filter(|id| !id.is_null())?;
    let genes = homologene.get("genes")?;

    let mut entries = Vec::new();
    for pair in as_list(genes) {
        let (taxid, entrezgene) = match pair.as_array().map(Vec::as_slice) {
            Some([taxid, entrezgene, ..]) => (taxid, entrezgene),
            _ => continue,
        };
        if display_value(entrezgene) == gene_id {
            continue;
        }
        let species = target_species.filter(|s| !s.is_empty());
        if species.is_some_and(|species| {
            !species.iter().any(|token| species_matches(token, taxid))
        }) {
            continue;
        }
        entries.push(json!({
            "taxid": taxid,
            "entrezgene": entrezgene,
            "homologene_id": homologene_id,
        }));
    }
    // A group with no surviving entries is reported as absent.
    (!entries.is_empty()).then_some(entries)
}

/// Orthologs keyed by source (`homologene`, `ensembl`, `pantherdb`).
pub(crate) fn orthologs_by_source(
    record: &Value,
    gene_id: &str,
    target_species: Option<&[String]>,
    sources: Option<&[String]>,
) -> BTreeMap<String, Vec<Value>> {
    let mut grouped = BTreeMap::new();

    if let Some(entries) = homologene_entries(record, gene_id, target_species) {
        grouped.insert("homologene".to_string(), entries);
    }
    if let Some(homologs) = record.get("ensembl").and_then(|e| e.get("homologene")) {
        grouped.insert("ensembl".to_string(), as_list(homologs).into_iter().cloned().collect());
    }
    if let Some(orthologs) = record.get("pantherdb").and_then(|p| p.get("ortholog")) {
        grouped.insert("pantherdb".to_string(), as_list(orthologs).into_iter().cloned().collect());
    }

    let sources = sources.filter(|s| !s.is_empty());
    grouped.retain(|source, _| super::source_allowed(sources, source));
    grouped
}

/// Groups search hits by `homologene.id`, first-seen order.
pub(crate) fn group_by_homologene(hits: &[Value]) -> Vec<HomologyGroup> {
    let mut groups: Vec<HomologyGroup> = Vec::new();
    for hit in hits {
        let Some(id) = hit.get("homologene").and_then(|h| h.get("id")) else {
            continue;
        };
        let gene = HomologyGene {
            symbol: field(hit, "symbol"),
            name: field(hit, "name"),
            entrezgene: field(hit, "entrezgene"),
            taxid: field(hit, "taxid"),
        };
        match groups.iter_mut().find(|g| &g.homologene_id == id) {
            Some(group) => group.genes.push(gene),
            None => groups.push(HomologyGroup {
                homologene_id: id.clone(),
                genes: vec![gene],
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cdk2_record() -> Value {
        json!({
            "symbol": "CDK2",
            "homologene": {
                "id": 74409,
                "genes": [[9606, 1017], [10090, 12566], [10116, 362817]]
            },
            "pantherdb": {"ortholog": {"taxid": 10090, "SwissProt": "P97377"}}
        })
    }

    #[test]
    fn species_filter_excludes_self_and_other_species() {
        let species = vec!["mouse".to_string()];
        let grouped = orthologs_by_source(&cdk2_record(), "1017", Some(&species), None);
        let homologene = &grouped["homologene"];
        assert_eq!(homologene.len(), 1);
        assert_eq!(homologene[0]["taxid"], 10090);
        assert_eq!(homologene[0]["homologene_id"], 74409);
    }

    #[test]
    fn self_is_excluded_without_species_filter() {
        let grouped = orthologs_by_source(&cdk2_record(), "1017", None, None);
        assert_eq!(grouped["homologene"].len(), 2);
        assert_eq!(grouped["pantherdb"].len(), 1);
    }

    #[test]
    fn species_matches_taxid_string_and_aliases_only() {
        assert!(species_matches("10116", &json!(10116)));
        assert!(species_matches("rat", &json!(10116)));
        assert!(!species_matches("Mouse", &json!(10090)));
        assert!(!species_matches("zebrafish", &json!(7955)));
    }

    #[test]
    fn source_allowlist_drops_other_sources() {
        let only = vec!["pantherdb".to_string()];
        let grouped = orthologs_by_source(&cdk2_record(), "1017", None, Some(&only));
        assert_eq!(grouped.keys().collect::<Vec<_>>(), vec!["pantherdb"]);
    }

    #[test]
    fn group_by_homologene_keeps_first_seen_order() {
        let hits = vec![
            json!({"symbol": "TP53", "taxid": 9606, "homologene": {"id": 460}}),
            json!({"symbol": "Cdk2", "taxid": 10090, "homologene": {"id": 74409}}),
            json!({"symbol": "Trp53", "taxid": 10090, "homologene": {"id": 460}}),
            json!({"symbol": "orphan"}),
        ];
        let groups = group_by_homologene(&hits);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].homologene_id, json!(460));
        assert_eq!(groups[0].genes.len(), 2);
        assert_eq!(groups[1].genes[0].symbol, json!("Cdk2"));
    }
}
