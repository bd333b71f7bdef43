use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::MyGeneError;
use crate::sources::mygene::MyGeneClient;
use crate::utils::query::{exists_any, join_and, phrase, phrase_any_field, present, route_by_prefix};

const FIELDS: &str = "symbol,name,entrezgene,pharmgkb,chebi,chembl,drugbank";
const SOURCES: &[&str] = &["pharmgkb", "chebi", "chembl", "drugbank"];
const NAME_FIELDS: &[&str] = &[
    "pharmgkb.chemical.name",
    "chebi.name",
    "chembl.molecule_chembl_id",
    "drugbank.name",
];

/// Chemical ids route by literal prefix; first match wins.
const ID_PREFIXES: &[(&str, &str)] = &[
    ("CHEMBL", "chembl.molecule_chembl_id"),
    ("DB", "drugbank.id"),
    ("CHEBI:", "chebi.id"),
];
const ID_FALLBACK_FIELD: &str = "chemical_id";

/// Find genes that interact with a chemical or drug.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ChemicalSearchRequest {
    /// Chemical or drug name (e.g. 'aspirin', 'imatinib')
    #[serde(default)]
    pub chemical_name: Option<String>,
    /// Chemical ID (e.g. 'CHEMBL25', 'DB00619', 'CHEBI:15365')
    #[serde(default)]
    pub chemical_id: Option<String>,
    /// Type of interaction (PharmGKB)
    #[serde(default)]
    pub interaction_type: Option<String>,
    /// Species filter
    #[serde(default = "super::default_species")]
    pub species: Option<String>,
    /// Number of results
    #[serde(default = "super::default_size")]
    pub size: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ChemicalInteractionsRequest {
    /// Gene ID (Entrez, Ensembl, or symbol)
    pub gene_id: String,
    /// Chemical sources to include: pharmgkb, chebi, chembl, drugbank (default: all)
    #[serde(default, deserialize_with = "crate::utils::serde::optional_items")]
    #[schemars(with = "crate::utils::serde::StringOrVec")]
    pub sources: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PharmgkbChemicals {
    pub total: usize,
    pub chemicals: Vec<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChebiCompounds {
    pub total: usize,
    pub compounds: Vec<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChemblTargets {
    pub total: usize,
    pub targets: Vec<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DrugbankDrugs {
    pub total: usize,
    pub drugs: Vec<Value>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ChemicalSources {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pharmgkb: Option<PharmgkbChemicals>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chebi: Option<ChebiCompounds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chembl: Option<ChemblTargets>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drugbank: Option<DrugbankDrugs>,
}

impl ChemicalSources {
    pub fn total(&self) -> usize {
        self.pharmgkb.as_ref().map_or(0, |p| p.total)
            + self.chebi.as_ref().map_or(0, |c| c.total)
            + self.chembl.as_ref().map_or(0, |c| c.total)
            + self.drugbank.as_ref().map_or(0, |d| d.total)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneChemicalInteractions {
    pub gene_id: String,
    pub symbol: Value,
    pub name: Value,
    pub chemical_sources: ChemicalSources,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChemicalInteractionsResult {
    pub success: bool,
    pub total_interactions: usize,
    pub chemical_interactions: GeneChemicalInteractions,
}

pub(crate) fn id_clause(id: &str) -> String {
    let field = route_by_prefix(id, ID_PREFIXES)
        .map(|(_, field)| field)
        .unwrap_or(ID_FALLBACK_FIELD);
    phrase(field, id)
}

pub(crate) fn build_query(req: &ChemicalSearchRequest) -> String {
    let mut parts = Vec::new();
    if let Some(name) = present(req.chemical_name.as_deref()) {
        parts.push(phrase_any_field(NAME_FIELDS, name));
    }
    if let Some(id) = present(req.chemical_id.as_deref()) {
        parts.push(id_clause(id));
    }
    if let Some(kind) = present(req.interaction_type.as_deref()) {
        parts.push(phrase("pharmgkb.type", kind));
    }
    if parts.is_empty() {
        return exists_any(SOURCES);
    }
    join_and(&parts)
}

pub async fn search(
    client: &MyGeneClient,
    req: &ChemicalSearchRequest,
) -> Result<super::SearchResult, MyGeneError> {
    super::run_search(client, build_query(req), FIELDS, req.species.as_deref(), req.size).await
}

pub async fn interactions(
    client: &MyGeneClient,
    req: &ChemicalInteractionsRequest,
) -> Result<ChemicalInteractionsResult, MyGeneError> {
    let record = super::fetch_gene(client, &req.gene_id, FIELDS).await?;
    let (symbol, name) = super::symbol_and_name(&record);
    let chemical_sources =
        crate::transform::chemical::chemical_sources(&record, req.sources.as_deref());

    Ok(ChemicalInteractionsResult {
        success: true,
        total_interactions: chemical_sources.total(),
        chemical_interactions: GeneChemicalInteractions {
            gene_id: req.gene_id.clone(),
            symbol,
            name,
            chemical_sources,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn id_prefixes_route_to_source_fields() {
        assert_eq!(id_clause("CHEMBL25"), r#"chembl.molecule_chembl_id:"CHEMBL25""#);
        assert_eq!(id_clause("DB00619"), r#"drugbank.id:"DB00619""#);
        assert_eq!(id_clause("CHEBI:15365"), r#"chebi.id:"CHEBI:15365""#);
        assert_eq!(id_clause("PA448497"), r#"chemical_id:"PA448497""#);
    }

    #[test]
    fn name_and_interaction_type_are_and_ed() {
        let req: ChemicalSearchRequest = serde_json::from_value(json!({
            "chemical_name": "imatinib",
            "interaction_type": "inhibitor"
        }))
        .unwrap();
        assert_eq!(
            build_query(&req),
            concat!(
                r#"(pharmgkb.chemical.name:"imatinib" OR chebi.name:"imatinib" OR "#,
                r#"chembl.molecule_chembl_id:"imatinib" OR drugbank.name:"imatinib") AND "#,
                r#"pharmgkb.type:"inhibitor""#,
            )
        );
    }

    #[test]
    fn empty_request_falls_back_to_existence() {
        assert_eq!(
            build_query(&ChemicalSearchRequest::default()),
            "_exists_:pharmgkb OR _exists_:chebi OR _exists_:chembl OR _exists_:drugbank"
        );
    }

    #[tokio::test]
    async fn interactions_counts_each_source() {
        let server = MockServer::start().await;
        let client = MyGeneClient::new_for_test(format!("{}/v3", server.uri())).unwrap();

        Mock::given(method("GET"))
            .and(path("/v3/gene/25"))
            .and(query_param("fields", FIELDS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "symbol": "ABL1",
                "pharmgkb": {"chemical": [
                    {"name": "imatinib", "id": "PA10804", "type": "Drug"},
                    {"name": "dasatinib", "id": "PA164776", "type": "Drug"}
                ]},
                "drugbank": {"id": "DB00619", "name": "Imatinib"},
                "chembl": {"pref_name": "ABL1"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let out = interactions(
            &client,
            &serde_json::from_value(json!({"gene_id": "25"})).unwrap(),
        )
        .await
        .unwrap();
        assert_eq!(out.total_interactions, 3);
        let sources = &out.chemical_interactions.chemical_sources;
        assert!(sources.chembl.is_none());
        assert_eq!(
            sources.drugbank.as_ref().map(|d| d.drugs[0]["groups"].clone()),
            Some(json!([]))
        );
    }
}
