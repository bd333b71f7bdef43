use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::MyGeneError;
use crate::sources::mygene::MyGeneClient;
use crate::utils::query::QueryParams;

/// Annotation lookup for one gene (Entrez like '1017' or Ensembl like 'ENSG00000123374').
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AnnotationRequest {
    /// Gene ID (Entrez or Ensembl)
    pub gene_id: String,
    /// Comma-separated fields to return (default: all)
    #[serde(default)]
    pub fields: Option<String>,
    /// Species filter
    #[serde(default)]
    pub species: Option<String>,
    /// Use dotted field notation in the response
    #[serde(default = "super::default_true")]
    pub dotfield: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnnotationResult {
    pub success: bool,
    pub gene: Value,
}

pub(crate) fn build_params(req: &AnnotationRequest) -> QueryParams {
    let mut params = QueryParams::new();
    params
        .push_non_empty("fields", req.fields.as_deref())
        .push_non_empty("species", req.species.as_deref());
    // Upstream expects the literal string, not a JSON boolean.
    if !req.dotfield {
        params.push("dotfield", "false");
    }
    params
}

pub async fn get_annotation(
    client: &MyGeneClient,
    req: &AnnotationRequest,
) -> Result<AnnotationResult, MyGeneError> {
    let gene_id = super::require_gene_id(&req.gene_id)?;
    let gene = client
        .get(&format!("gene/{gene_id}"), &build_params(req))
        .await?;
    Ok(AnnotationResult {
        success: true,
        gene,
    })
}
