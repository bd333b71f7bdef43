use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::MyGeneError;
use crate::sources::mygene::MyGeneClient;
use crate::utils::query::{exists_any, join_and, phrase, present};

const FIELDS: &str = "symbol,name,entrezgene,clinvar,snpeff,grasp";
const SOURCES: &[&str] = &["clinvar", "snpeff", "grasp"];

/// Find genes carrying variants with given clinical or functional properties.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct VariantSearchRequest {
    /// ClinVar clinical significance (e.g. 'Pathogenic')
    #[serde(default)]
    pub clinical_significance: Option<String>,
    /// ClinVar variant type (e.g. 'Deletion', 'single nucleotide variant')
    #[serde(default)]
    pub variant_type: Option<String>,
    /// GRASP association phenotype (e.g. 'Height')
    #[serde(default)]
    pub phenotype: Option<String>,
    /// SnpEff predicted effect (e.g. 'missense_variant')
    #[serde(default)]
    pub effect: Option<String>,
    /// Restrict to genes with data from one source: clinvar, snpeff, grasp
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
pub struct GeneVariantsRequest {
    /// Gene ID (Entrez, Ensembl, or symbol)
    pub gene_id: String,
    /// Type of variant: Deletion, Duplication, Insertion, Indel, single nucleotide variant
    #[serde(default)]
    pub variant_type: Option<String>,
    /// Clinical significance filter (case-insensitive substring)
    #[serde(default)]
    pub clinical_significance: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClinvarEntries {
    pub total: usize,
    pub variants: Vec<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnpeffAnnotations {
    pub total: usize,
    pub annotations: Vec<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraspAssociations {
    pub total: usize,
    pub associations: Vec<Value>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VariantSources {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinvar: Option<ClinvarEntries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snpeff: Option<SnpeffAnnotations>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grasp: Option<GraspAssociations>,
}

impl VariantSources {
    pub fn total(&self) -> usize {
        self.clinvar.as_ref().map_or(0, |c| c.total)
            + self.snpeff.as_ref().map_or(0, |s| s.total)
            + self.grasp.as_ref().map_or(0, |g| g.total)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneVariants {
    pub gene_id: String,
    pub symbol: Value,
    pub name: Value,
    pub variant_sources: VariantSources,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneVariantsResult {
    pub success: bool,
    pub total_variants: usize,
    pub variants: GeneVariants,
}

pub(crate) fn build_query(req: &VariantSearchRequest) -> String {
    let selectors = [
        ("clinvar.rcv.clinical_significance", &req.clinical_significance),
        ("clinvar.rcv.measure_set.measure.type", &req.variant_type),
        ("grasp.publication.phenotype", &req.phenotype),
        ("snpeff.ann.effect", &req.effect),
    ];
    let mut parts = selectors
        .iter()
        .filter_map(|(field, value)| present(value.as_deref()).map(|v| phrase(field, v)))
        .collect::<Vec<_>>();
    if let Some(source) = present(req.source.as_deref()) {
        parts.push(format!("_exists_:{source}"));
    }

    if parts.is_empty() {
        return exists_any(SOURCES);
    }
    join_and(&parts)
}

pub async fn search(
    client: &MyGeneClient,
    req: &VariantSearchRequest,
) -> Result<super::SearchResult, MyGeneError> {
    super::run_search(client, build_query(req), FIELDS, req.species.as_deref(), req.size).await
}

pub async fn gene_variants(
    client: &MyGeneClient,
    req: &GeneVariantsRequest,
) -> Result<GeneVariantsResult, MyGeneError> {
    let record = super::fetch_gene(client, &req.gene_id, FIELDS).await?;
    let (symbol, name) = super::symbol_and_name(&record);
    let variant_sources = crate::transform::variant::variant_sources(
        &record,
        present(req.variant_type.as_deref()),
        present(req.clinical_significance.as_deref()),
    );

    Ok(GeneVariantsResult {
        success: true,
        total_variants: variant_sources.total(),
        variants: GeneVariants {
            gene_id: req.gene_id.clone(),
            symbol,
            name,
            variant_sources,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn req(args: Value) -> VariantSearchRequest {
        serde_json::from_value(args).unwrap()
    }

    #[test]
    fn no_selectors_falls_back_to_existence() {
        assert_eq!(
            build_query(&req(json!({}))),
            "_exists_:clinvar OR _exists_:snpeff OR _exists_:grasp"
        );
    }

    #[test]
    fn selectors_and_source_are_and_ed() {
        assert_eq!(
            build_query(&req(json!({
                "clinical_significance": "Pathogenic",
                "effect": "stop_gained",
                "source": "clinvar"
            }))),
            concat!(
                r#"clinvar.rcv.clinical_significance:"Pathogenic" AND "#,
                r#"snpeff.ann.effect:"stop_gained" AND _exists_:clinvar"#,
            )
        );
    }

    #[tokio::test]
    async fn search_uses_variant_fields() {
        let server = MockServer::start().await;
        let client = MyGeneClient::new_for_test(format!("{}/v3", server.uri())).unwrap();

        Mock::given(method("GET"))
            .and(path("/v3/query"))
            .and(query_param("q", r#"grasp.publication.phenotype:"Height""#))
            .and(query_param("fields", FIELDS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total": 1,
                "hits": [{"symbol": "HMGA2"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let out = search(&client, &req(json!({"phenotype": "Height"})))
            .await
            .unwrap();
        assert_eq!(out.total, 1);
    }

    #[tokio::test]
    async fn gene_variants_totals_all_sources() {
        let server = MockServer::start().await;
        let client = MyGeneClient::new_for_test(format!("{}/v3", server.uri())).unwrap();

        Mock::given(method("GET"))
            .and(path("/v3/gene/672"))
            .and(query_param("fields", FIELDS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "symbol": "BRCA1",
                "clinvar": {"rcv": [
                    {"accession": {"accession": "RCV1"}, "clinical_significance": "Pathogenic"},
                    {"accession": {"accession": "RCV2"}, "clinical_significance": "Benign"}
                ]},
                "snpeff": {"ann": [{"effect": "intron_variant"}]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let out = gene_variants(
            &client,
            &serde_json::from_value(json!({
                "gene_id": "672",
                "clinical_significance": "pathogenic"
            }))
            .unwrap(),
        )
        .await
        .unwrap();
        assert_eq!(out.total_variants, 2);
        let encoded = serde_json::to_value(&out.variants.variant_sources).unwrap();
        assert_eq!(encoded["clinvar"]["variants"][0]["accession"], "RCV1");
        assert!(encoded.get("grasp").is_none());
    }
}
