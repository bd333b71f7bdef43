use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::MyGeneError;
use crate::sources::mygene::MyGeneClient;
use crate::utils::query::{exists_any, join_and, phrase, phrase_any_field, present, route_by_prefix};

const FIELDS: &str = "symbol,name,entrezgene,disgenet,clinvar,omim";
const SOURCES: &[&str] = &["disgenet", "clinvar", "omim"];

/// Field holding a disease name, per source.
const NAME_FIELDS: &[(&str, &str)] = &[
    ("disgenet", "disgenet.diseases.disease_name"),
    ("clinvar", "clinvar.rcv.conditions.name"),
    ("omim", "omim.name"),
];

/// Unqualified disease ids route by literal prefix; first match wins.
const ID_PREFIXES: &[(&str, &str)] = &[
    ("OMIM:", "omim.omim_id"),
    ("C", "disgenet.diseases.disease_id"),
];
const ID_FALLBACK_FIELD: &str = "disease_id";

/// Find genes associated with a disease, by name or id.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct DiseaseSearchRequest {
    /// Disease name (e.g. 'breast cancer', 'alzheimer disease')
    #[serde(default)]
    pub disease_name: Option<String>,
    /// Disease ID (e.g. 'OMIM:114480', 'C0006142')
    #[serde(default)]
    pub disease_id: Option<String>,
    /// Disease database source: disgenet, clinvar, omim
    #[serde(default)]
    pub source: Option<String>,
    /// Species filter
    #[serde(default = "super::default_species")]
    pub species: Option<String>,
    /// Number of results
    #[serde(default = "super::default_size")]
    pub size: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DiseaseAssociationsRequest {
    /// Gene ID (Entrez, Ensembl, or symbol)
    pub gene_id: String,
    /// Disease sources to include: disgenet, clinvar, omim (default: all)
    #[serde(default, deserialize_with = "crate::utils::serde::optional_items")]
    #[schemars(with = "crate::utils::serde::StringOrVec")]
    pub sources: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiseaseList {
    pub total: usize,
    pub diseases: Vec<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClinvarVariants {
    pub total: usize,
    pub variants: Vec<Value>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DiseaseSources {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disgenet: Option<DiseaseList>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinvar: Option<ClinvarVariants>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub omim: Option<DiseaseList>,
}

impl DiseaseSources {
    pub fn total(&self) -> usize {
        self.disgenet.as_ref().map_or(0, |d| d.total)
            + self.clinvar.as_ref().map_or(0, |c| c.total)
            + self.omim.as_ref().map_or(0, |o| o.total)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneDiseaseAssociations {
    pub gene_id: String,
    pub symbol: Value,
    pub name: Value,
    pub disease_sources: DiseaseSources,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiseaseAssociationsResult {
    pub success: bool,
    pub total_associations: usize,
    pub disease_associations: GeneDiseaseAssociations,
}

fn name_clause(source: Option<&str>, name: &str) -> Option<String> {
    match source {
        Some(source) => NAME_FIELDS
            .iter()
            .find(|(known, _)| *known == source)
            .map(|(_, field)| phrase(field, name)),
        None => {
            let fields = NAME_FIELDS.iter().map(|(_, f)| *f).collect::<Vec<_>>();
            Some(phrase_any_field(&fields, name))
        }
    }
}

fn id_clause(source: Option<&str>, id: &str) -> String {
    if let Some(source) = source {
        return phrase(&format!("{source}.disease_id"), id);
    }
    match route_by_prefix(id, ID_PREFIXES) {
        Some(("OMIM:", field)) => phrase(field, &id["OMIM:".len()..]),
        Some((_, field)) => phrase(field, id),
        None => phrase(ID_FALLBACK_FIELD, id),
    }
}

/// Compiles the disease selectors.
///
/// A name with an unrecognized `source` contributes no clause.
pub(crate) fn build_query(req: &DiseaseSearchRequest) -> String {
    let source = present(req.source.as_deref());
    let mut parts = Vec::new();
    if let Some(clause) =
        present(req.disease_name.as_deref()).and_then(|name| name_clause(source, name))
    {
        parts.push(clause);
    }
    if let Some(id) = present(req.disease_id.as_deref()) {
        parts.push(id_clause(source, id));
    }
    if parts.is_empty() {
        return exists_any(SOURCES);
    }
    join_and(&parts)
}

pub async fn search(
    client: &MyGeneClient,
    req: &DiseaseSearchRequest,
) -> Result<super::SearchResult, MyGeneError> {
    super::run_search(client, build_query(req), FIELDS, req.species.as_deref(), req.size).await
}

pub async fn associations(
    client: &MyGeneClient,
    req: &DiseaseAssociationsRequest,
) -> Result<DiseaseAssociationsResult, MyGeneError> {
    let record = super::fetch_gene(client, &req.gene_id, FIELDS).await?;
    let (symbol, name) = super::symbol_and_name(&record);
    let disease_sources =
        crate::transform::disease::disease_sources(&record, req.sources.as_deref());

    Ok(DiseaseAssociationsResult {
        success: true,
        total_associations: disease_sources.total(),
        disease_associations: GeneDiseaseAssociations {
            gene_id: req.gene_id.clone(),
            symbol,
            name,
            disease_sources,
        },
    })
}
