use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::MyGeneError;
use crate::sources::mygene::MyGeneClient;
use crate::utils::query::{QueryParams, phrase};

const ORTHOLOG_FIELDS: &str =
    "symbol,name,entrezgene,homologene,ensembl.homologene,pantherdb.ortholog";
const HOMOLOG_SEARCH_FIELDS: &str = "symbol,name,entrezgene,taxid,homologene,pantherdb";

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct OrthologsRequest {
    /// Gene ID (Entrez, Ensembl, or symbol)
    pub gene_id: String,
    /// Target species (e.g. ['human', 'mouse', 'rat'] or taxids)
    #[serde(default, deserialize_with = "crate::utils::serde::optional_items")]
    #[schemars(with = "crate::utils::serde::StringOrVec")]
    pub target_species: Option<Vec<String>>,
    /// Homology data sources to use: homologene, ensembl, pantherdb
    #[serde(default, deserialize_with = "crate::utils::serde::optional_items")]
    #[schemars(with = "crate::utils::serde::StringOrVec")]
    pub sources: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneOrthologs {
    pub gene_id: String,
    pub symbol: Value,
    pub name: Value,
    pub orthologs: BTreeMap<String, Vec<Value>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrthologsResult {
    pub success: bool,
    pub total_orthologs: usize,
    pub ortholog_data: GeneOrthologs,
}

fn default_homology_type() -> String {
    "ortholog".to_string()
}

/// Find genes sharing a symbol across several species.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct HomologousGenesRequest {
    /// Gene symbol to search for
    pub gene_symbol: String,
    /// List of species to search
    pub species_list: Vec<String>,
    /// Type of homology: ortholog or paralog
    #[serde(default = "default_homology_type")]
    pub homology_type: String,
    /// Results per species
    #[serde(default = "super::default_size")]
    pub size: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomologyGene {
    pub symbol: Value,
    pub name: Value,
    pub entrezgene: Value,
    pub taxid: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomologyGroup {
    pub homologene_id: Value,
    pub genes: Vec<HomologyGene>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HomologousGenesResult {
    pub success: bool,
    pub query: String,
    pub total_genes: u64,
    pub homology_groups: Vec<HomologyGroup>,
    pub homology_type: String,
}

/// One `(symbol:"S" AND species:X)` clause per species, OR-ed.
pub(crate) fn build_query(symbol: &str, species_list: &[String]) -> String {
    species_list
        .iter()
        .map(|species| format!("({} AND species:{species})", phrase("symbol", symbol)))
        .collect::<Vec<_>>()
        .join(" OR ")
}

pub async fn orthologs(
    client: &MyGeneClient,
    req: &OrthologsRequest,
) -> Result<OrthologsResult, MyGeneError> {
    let gene_id = super::require_gene_id(&req.gene_id)?;
    let record = super::fetch_gene(client, gene_id, ORTHOLOG_FIELDS).await?;
    let (symbol, name) = super::symbol_and_name(&record);
    let orthologs = crate::transform::homology::orthologs_by_source(
        &record,
        gene_id,
        req.target_species.as_deref(),
        req.sources.as_deref(),
    );

    Ok(OrthologsResult {
        success: true,
        total_orthologs: orthologs.values().map(Vec::len).sum(),
        ortholog_data: GeneOrthologs {
            gene_id: req.gene_id.clone(),
            symbol,
            name,
            orthologs,
        },
    })
}

pub async fn homologous_genes(
    client: &MyGeneClient,
    req: &HomologousGenesRequest,
) -> Result<HomologousGenesResult, MyGeneError> {
    let symbol = req.gene_symbol.trim();
    if symbol.is_empty() {
        return Err(MyGeneError::InvalidArgument("gene_symbol is required".into()));
    }
    if req.species_list.is_empty() {
        return Err(MyGeneError::InvalidArgument(
            "species_list must name at least one species".into(),
        ));
    }

    let q = build_query(symbol, &req.species_list);
    let per_species = req.size.unwrap_or(10);
    let species_count = u32::try_from(req.species_list.len()).unwrap_or(u32::MAX);
    let mut params = QueryParams::with_query(q.as_str());
    params
        .push("fields", HOMOLOG_SEARCH_FIELDS)
        .push("size", per_species.saturating_mul(species_count));

    let raw = client.get("query", &params).await?;
    let hits = super::hits_of(&raw);
    Ok(HomologousGenesResult {
        success: true,
        query: q,
        total_genes: super::total_of(&raw),
        homology_groups: crate::transform::homology::group_by_homologene(&hits),
        homology_type: req.homology_type.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn build_query_pairs_symbol_with_each_species() {
        let species = vec!["human".to_string(), "10090".to_string()];
        assert_eq!(
            build_query("CDK2", &species),
            r#"(symbol:"CDK2" AND species:human) OR (symbol:"CDK2" AND species:10090)"#
        );
    }

    #[tokio::test]
    async fn orthologs_returns_only_mouse_for_mouse_filter() {
        let server = MockServer::start().await;
        let client = MyGeneClient::new_for_test(format!("{}/v3", server.uri())).unwrap();

        Mock::given(method("GET"))
            .and(path("/v3/gene/1017"))
            .and(query_param("fields", ORTHOLOG_FIELDS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "symbol": "CDK2",
                "name": "cyclin dependent kinase 2",
                "homologene": {
                    "id": 74409,
                    "genes": [[9606, 1017], [10090, 12566], [10116, 362817]]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let out = orthologs(
            &client,
            &serde_json::from_value(json!({"gene_id": "1017", "target_species": ["mouse"]}))
                .unwrap(),
        )
        .await
        .unwrap();
        assert_eq!(out.total_orthologs, 1);
        let entries = &out.ortholog_data.orthologs["homologene"];
        assert_eq!(entries[0]["entrezgene"], 12566);
    }

    #[tokio::test]
    async fn homologous_genes_scales_size_by_species_count() {
        let server = MockServer::start().await;
        let client = MyGeneClient::new_for_test(format!("{}/v3", server.uri())).unwrap();

        Mock::given(method("GET"))
            .and(path("/v3/query"))
            .and(query_param("size", "10"))
            .and(query_param("fields", HOMOLOG_SEARCH_FIELDS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total": 2,
                "hits": [
                    {
                        "symbol": "CDK2",
                        "taxid": 9606,
                        "entrezgene": 1017,
                        "homologene": {"id": 74409}
                    },
                    {
                        "symbol": "Cdk2",
                        "taxid": 10090,
                        "entrezgene": 12566,
                        "homologene": {"id": 74409}
                    }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let out = homologous_genes(
            &client,
            &serde_json::from_value(json!({
                "gene_symbol": "CDK2",
                "species_list": ["human", "mouse"],
                "size": 5
            }))
            .unwrap(),
        )
        .await
        .unwrap();
        assert_eq!(out.total_genes, 2);
        assert_eq!(out.homology_type, "ortholog");
        assert_eq!(out.homology_groups.len(), 1);
        assert_eq!(out.homology_groups[0].genes.len(), 2);
    }

    #[tokio::test]
    async fn homologous_genes_requires_species() {
        let client = MyGeneClient::new_for_test("http://127.0.0.1/v3".into()).unwrap();
        let err = homologous_genes(
            &client,
            &serde_json::from_value(json!({"gene_symbol": "CDK2", "species_list": []})).unwrap(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), "ValueError");
    }
}
