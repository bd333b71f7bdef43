use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::MyGeneError;
use crate::sources::mygene::MyGeneClient;
use crate::utils::query::{join_and, phrase, phrase_any_field, present};

const FIELDS: &str = "symbol,name,entrezgene,pathway";
const ID_SOURCES: &[&str] = &["kegg", "reactome", "wikipathways"];
const NAME_SOURCES: &[&str] = &["kegg", "reactome", "wikipathways", "netpath", "biocarta"];
pub(crate) const DETAIL_SOURCES: &[&str] =
    &["kegg", "reactome", "wikipathways", "netpath", "biocarta", "pid"];

/// Find genes that belong to a pathway, by id or name.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct PathwaySearchRequest {
    /// Pathway ID (e.g. 'hsa04110' for KEGG cell cycle)
    #[serde(default)]
    pub pathway_id: Option<String>,
    /// Pathway name (e.g. 'Cell cycle', 'Apoptosis')
    #[serde(default)]
    pub pathway_name: Option<String>,
    /// Pathway database source: kegg, reactome, wikipathways, netpath, biocarta, pid
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
pub struct GenePathwaysRequest {
    /// Gene ID
    pub gene_id: String,
    /// Pathway sources to include (default: all)
    #[serde(default, deserialize_with = "crate::utils::serde::optional_items")]
    #[schemars(with = "crate::utils::serde::StringOrVec")]
    pub sources: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenePathways {
    pub gene_id: String,
    pub symbol: Value,
    pub name: Value,
    pub pathways: BTreeMap<String, Vec<Value>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenePathwaysResult {
    pub success: bool,
    pub total_pathways: usize,
    pub pathway_sources: Vec<String>,
    pub pathways: GenePathways,
}

fn source_clause(source: Option<&str>, all: &[&str], attr: &str, value: &str) -> String {
    match source {
        Some(source) => phrase(&format!("pathway.{source}.{attr}"), value),
        None => {
            let fields = all
                .iter()
                .map(|s| format!("pathway.{s}.{attr}"))
                .collect::<Vec<_>>();
            let fields = fields.iter().map(String::as_str).collect::<Vec<_>>();
            phrase_any_field(&fields, value)
        }
    }
}

pub(crate) fn build_query(req: &PathwaySearchRequest) -> String {
    let source = present(req.source.as_deref());
    let mut parts = Vec::new();
    if let Some(id) = present(req.pathway_id.as_deref()) {
        parts.push(source_clause(source, ID_SOURCES, "id", id));
    }
    if let Some(name) = present(req.pathway_name.as_deref()) {
        parts.push(source_clause(source, NAME_SOURCES, "name", name));
    }
    if parts.is_empty() {
        return "_exists_:pathway".to_string();
    }
    join_and(&parts)
}

pub async fn search(
    client: &MyGeneClient,
    req: &PathwaySearchRequest,
) -> Result<super::SearchResult, MyGeneError> {
    super::run_search(client, build_query(req), FIELDS, req.species.as_deref(), req.size).await
}

pub async fn gene_pathways(
    client: &MyGeneClient,
    req: &GenePathwaysRequest,
) -> Result<GenePathwaysResult, MyGeneError> {
    let record = super::fetch_gene(client, &req.gene_id, FIELDS).await?;
    let (symbol, name) = super::symbol_and_name(&record);
    let (pathway_sources, pathways) =
        crate::transform::pathway::pathways_by_source(&record, req.sources.as_deref());

    Ok(GenePathwaysResult {
        success: true,
        total_pathways: pathways.values().map(Vec::len).sum(),
        pathway_sources,
        pathways: GenePathways {
            gene_id: req.gene_id.clone(),
            symbol,
            name,
            pathways,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn req(args: Value) -> PathwaySearchRequest {
        serde_json::from_value(args).unwrap()
    }

    #[test]
    fn id_without_source_spans_id_sources() {
        assert_eq!(
            build_query(&req(json!({"pathway_id": "hsa04110"}))),
            concat!(
                r#"(pathway.kegg.id:"hsa04110" OR pathway.reactome.id:"hsa04110" OR "#,
                r#"pathway.wikipathways.id:"hsa04110")"#,
            )
        );
    }

    #[test]
    fn source_narrows_both_selectors() {
        assert_eq!(
            build_query(&req(json!({
                "pathway_id": "R-HSA-69278",
                "pathway_name": "Cell Cycle",
                "source": "reactome"
            }))),
            r#"pathway.reactome.id:"R-HSA-69278" AND pathway.reactome.name:"Cell Cycle""#
        );
    }

    #[test]
    fn name_without_source_spans_five_sources() {
        let q = build_query(&req(json!({"pathway_name": "Apoptosis"})));
        assert_eq!(q.matches(" OR ").count(), 4);
        assert!(q.contains(r#"pathway.biocarta.name:"Apoptosis""#));
        assert!(!q.contains("pid"));
    }

    #[test]
    fn no_selectors_falls_back_to_existence() {
        assert_eq!(build_query(&req(json!({"species": "mouse"}))), "_exists_:pathway");
    }

    #[tokio::test]
    async fn gene_pathways_counts_filtered_sources() {
        let server = MockServer::start().await;
        let client = MyGeneClient::new_for_test(format!("{}/v3", server.uri())).unwrap();

        Mock::given(method("GET"))
            .and(path("/v3/gene/1017"))
            .and(query_param("fields", "symbol,name,entrezgene,pathway"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "symbol": "CDK2",
                "name": "cyclin dependent kinase 2",
                "pathway": {
                    "kegg": {"id": "hsa04110", "name": "Cell cycle"},
                    "reactome": [
                        {"id": "R-HSA-69278", "name": "Cell Cycle, Mitotic"},
                        {"id": "R-HSA-69620", "name": "Cell Cycle Checkpoints"}
                    ],
                    "wikipathways": {"id": "WP179", "name": "Cell cycle"}
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let out = gene_pathways(
            &client,
            &serde_json::from_value(json!({"gene_id": "1017", "sources": ["kegg", "reactome"]}))
                .unwrap(),
        )
        .await
        .unwrap();
        assert_eq!(out.total_pathways, 3);
        assert_eq!(out.pathway_sources, vec!["kegg", "reactome"]);
        assert_eq!(out.pathways.pathways["kegg"].len(), 1);
    }
}
