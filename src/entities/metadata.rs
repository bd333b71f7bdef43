use serde::Serialize;
use serde_json::Value;

use crate::error::MyGeneError;
use crate::sources::mygene::MyGeneClient;
use crate::utils::query::QueryParams;

const SPECIES_NAMES: &[(u64, &str)] = &[
    (9606, "human"),
    (10090, "mouse"),
    (10116, "rat"),
    (7227, "fruitfly"),
    (6239, "nematode"),
    (7955, "zebrafish"),
    (3702, "thale-cress"),
    (8364, "frog"),
    (9823, "pig"),
];

#[derive(Debug, Clone, Serialize)]
pub struct MetadataResult {
    pub success: bool,
    pub metadata: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldsResult {
    pub success: bool,
    pub fields: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeciesEntry {
    pub taxid: Value,
    pub name: String,
    pub gene_count: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpeciesListResult {
    pub success: bool,
    pub total_species: usize,
    pub species: Vec<SpeciesEntry>,
}

pub(crate) fn species_name(taxid: &Value) -> String {
    taxid
        .as_u64()
        .and_then(|id| SPECIES_NAMES.iter().find(|(known, _)| *known == id))
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| format!("taxid:{}", crate::transform::display_value(taxid)))
}

pub(crate) fn species_from_facets(raw: &Value) -> Vec<SpeciesEntry> {
    let Some(terms) = raw.pointer("/facets/taxid/terms") else {
        return Vec::new();
    };
    crate::transform::as_list(terms)
        .into_iter()
        .map(|term| {
            let taxid = crate::transform::field(term, "term");
            SpeciesEntry {
                name: species_name(&taxid),
                gene_count: crate::transform::field(term, "count"),
                taxid,
            }
        })
        .collect()
}

pub async fn get_metadata(client: &MyGeneClient) -> Result<MetadataResult, MyGeneError> {
    let metadata = client.get("metadata", &QueryParams::new()).await?;
    Ok(MetadataResult {
        success: true,
        metadata,
    })
}

pub async fn list_fields(client: &MyGeneClient) -> Result<FieldsResult, MyGeneError> {
    let fields = client.get("metadata/fields", &QueryParams::new()).await?;
    Ok(FieldsResult {
        success: true,
        fields,
    })
}

pub async fn list_species(client: &MyGeneClient) -> Result<SpeciesListResult, MyGeneError> {
    let mut params = QueryParams::with_query("*");
    params
        .push("facets", "taxid")
        .push("facet_size", 1000)
        .push("size", 0);

    let raw = client.get("query", &params).await?;
    let species = species_from_facets(&raw);
    Ok(SpeciesListResult {
        success: true,
        total_species: species.len(),
        species,
    })
}
