use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::MyGeneError;
use crate::sources::mygene::MyGeneClient;
use crate::utils::query::{any_of, join_and, phrase, phrase_any_field, present};

const FIELDS: &str = "symbol,name,entrezgene,go";
pub(crate) const ASPECTS: &[&str] = &["BP", "MF", "CC"];

/// Find genes annotated with a GO term, optionally narrowed by evidence.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct GoSearchRequest {
    /// GO ID (e.g. 'GO:0006468' for protein phosphorylation)
    #[serde(default)]
    pub go_id: Option<String>,
    /// GO term name (e.g. 'protein kinase activity')
    #[serde(default)]
    pub go_name: Option<String>,
    /// Evidence codes (e.g. ['EXP', 'IDA', 'IMP'])
    #[serde(default, deserialize_with = "crate::utils::serde::optional_items")]
    #[schemars(with = "crate::utils::serde::StringOrVec")]
    pub evidence_codes: Option<Vec<String>>,
    /// GO qualifier: enables, NOT, contributes_to, involved_in, located_in
    #[serde(default)]
    pub qualifier: Option<String>,
    /// GO aspect: BP, MF or CC
    #[serde(default)]
    pub aspect: Option<String>,
    /// Species filter
    #[serde(default = "super::default_species")]
    pub species: Option<String>,
    /// Number of results
    #[serde(default = "super::default_size")]
    pub size: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GoAnnotationsRequest {
    /// Gene ID (Entrez, Ensembl, or symbol)
    pub gene_id: String,
    /// Filter by GO aspect: BP, MF or CC
    #[serde(default)]
    pub aspect: Option<String>,
    /// Filter by evidence codes
    #[serde(default, deserialize_with = "crate::utils::serde::optional_items")]
    #[schemars(with = "crate::utils::serde::StringOrVec")]
    pub evidence_codes: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoAnnotation {
    pub id: Value,
    pub term: Value,
    pub evidence: Value,
    pub qualifier: Value,
    pub pubmed: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneGoAnnotations {
    pub gene_id: String,
    pub symbol: Value,
    pub name: Value,
    pub annotations: BTreeMap<String, Vec<GoAnnotation>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoAnnotationsResult {
    pub success: bool,
    pub total_annotations: usize,
    pub go_annotations: GeneGoAnnotations,
}

fn aspect_clause(aspect: Option<&str>, suffix: &str, value: &str) -> String {
    match aspect {
        Some(aspect) => phrase(&format!("go.{aspect}{suffix}"), value),
        None => {
            let fields = ASPECTS
                .iter()
                .map(|a| format!("go.{a}{suffix}"))
                .collect::<Vec<_>>();
            let fields = fields.iter().map(String::as_str).collect::<Vec<_>>();
            phrase_any_field(&fields, value)
        }
    }
}

pub(crate) fn build_query(req: &GoSearchRequest) -> String {
    let aspect = present(req.aspect.as_deref());
    let mut parts = Vec::new();

    if let Some(go_id) = present(req.go_id.as_deref()) {
        parts.push(aspect_clause(aspect, "", go_id));
    }
    if let Some(go_name) = present(req.go_name.as_deref()) {
        parts.push(aspect_clause(aspect, ".term", go_name));
    }
    if let Some(codes) = req.evidence_codes.as_deref().filter(|c| !c.is_empty()) {
        let clauses = codes
            .iter()
            .map(|code| phrase("go.evidence", code))
            .collect::<Vec<_>>();
        parts.push(any_of(&clauses));
    }
    if let Some(qualifier) = present(req.qualifier.as_deref()) {
        parts.push(phrase("go.qualifier", qualifier));
    }

    if parts.is_empty() {
        return "_exists_:go".to_string();
    }
    join_and(&parts)
}

pub async fn search(
    client: &MyGeneClient,
    req: &GoSearchRequest,
) -> Result<super::SearchResult, MyGeneError> {
    super::run_search(client, build_query(req), FIELDS, req.species.as_deref(), req.size).await
}

pub async fn gene_annotations(
    client: &MyGeneClient,
    req: &GoAnnotationsRequest,
) -> Result<GoAnnotationsResult, MyGeneError> {
    let record = super::fetch_gene(client, &req.gene_id, FIELDS).await?;
    let (symbol, name) = super::symbol_and_name(&record);
    let annotations = crate::transform::go::annotations_by_aspect(
        &record,
        present(req.aspect.as_deref()),
        req.evidence_codes.as_deref(),
    );

    Ok(GoAnnotationsResult {
        success: true,
        total_annotations: annotations.values().map(Vec::len).sum(),
        go_annotations: GeneGoAnnotations {
            gene_id: req.gene_id.clone(),
            symbol,
            name,
            annotations,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn req(args: Value) -> GoSearchRequest {
        serde_json::from_value(args).unwrap()
    }

    #[test]
    fn go_id_without_aspect_spans_all_aspects() {
        assert_eq!(
            build_query(&req(json!({"go_id": "GO:0006468"}))),
            r#"(go.BP:"GO:0006468" OR go.MF:"GO:0006468" OR go.CC:"GO:0006468")"#
        );
    }

    #[test]
    fn name_with_aspect_targets_term_field() {
        assert_eq!(
            build_query(&req(json!({"go_name": "protein kinase activity", "aspect": "MF"}))),
            r#"go.MF.term:"protein kinase activity""#
        );
    }

    #[test]
    fn evidence_and_qualifier_are_and_ed() {
        assert_eq!(
            build_query(&req(json!({
                "go_id": "GO:0005634",
                "aspect": "CC",
                "evidence_codes": ["IDA", "EXP"],
                "qualifier": "located_in"
            }))),
            concat!(
                r#"go.CC:"GO:0005634" AND (go.evidence:"IDA" OR go.evidence:"EXP") AND "#,
                r#"go.qualifier:"located_in""#,
            )
        );
    }

    #[test]
    fn empty_evidence_list_adds_nothing() {
        assert_eq!(build_query(&req(json!({"evidence_codes": []}))), "_exists_:go");
    }

    #[tokio::test]
    async fn gene_annotations_filters_by_evidence() {
        let server = MockServer::start().await;
        let client = MyGeneClient::new_for_test(format!("{}/v3", server.uri())).unwrap();

        Mock::given(method("GET"))
            .and(path("/v3/gene/1017"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "symbol": "CDK2",
                "go": {
                    "BP": [
                        {"id": "GO:0006468", "term": "protein phosphorylation", "evidence": "IDA"},
                        {"id": "GO:0007049", "term": "cell cycle", "evidence": "IEA"}
                    ],
                    "MF": {
                        "id": "GO:0004672",
                        "term": "protein kinase activity",
                        "evidence": "IDA",
                        "pubmed": [1]
                    }
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let out = gene_annotations(
            &client,
            &serde_json::from_value(json!({"gene_id": "1017", "evidence_codes": ["IDA"]}))
                .unwrap(),
        )
        .await
        .unwrap();
        assert_eq!(out.total_annotations, 2);
        let annotations = &out.go_annotations.annotations;
        assert_eq!(annotations["BP"].len(), 1);
        assert_eq!(annotations["MF"][0].pubmed, json!([1]));
        assert!(!annotations.contains_key("CC"));
    }
}
