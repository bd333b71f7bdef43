//! Query compilers: typed requests in, MyGene calls out, normalized results back.

use serde::Serialize;
use serde_json::Value;

use crate::error::MyGeneError;
use crate::sources::mygene::MyGeneClient;
use crate::utils::query::QueryParams;

pub(crate) mod advanced;
pub(crate) mod annotation;
pub(crate) mod batch;
pub(crate) mod chemical;
pub(crate) mod disease;
pub(crate) mod export;
pub(crate) mod expression;
pub(crate) mod go;
pub(crate) mod homology;
pub(crate) mod interval;
pub(crate) mod metadata;
pub(crate) mod pathway;
pub(crate) mod query;
pub(crate) mod variant;

pub(crate) const DEFAULT_FIELDS: &str = "symbol,name,taxid,entrezgene";
pub(crate) const MAX_BATCH_SIZE: usize = 1000;

pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn default_species() -> Option<String> {
    Some("human".to_string())
}

pub(crate) fn default_size() -> Option<u32> {
    Some(10)
}

pub(crate) fn default_fields() -> Option<String> {
    Some(DEFAULT_FIELDS.to_string())
}

/// Shared result of every domain search: the compiled query plus the page.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub success: bool,
    pub query: String,
    pub total: u64,
    pub hits: Vec<Value>,
}

pub(crate) fn total_of(raw: &Value) -> u64 {
    raw.get("total").and_then(Value::as_u64).unwrap_or(0)
}

pub(crate) fn hits_of(raw: &Value) -> Vec<Value> {
    raw.get("hits")
        .map(|hits| crate::transform::into_list(hits.clone()))
        .unwrap_or_default()
}

/// Runs a compiled domain query against `/query`.
pub(crate) async fn run_search(
    client: &MyGeneClient,
    q: String,
    fields: &str,
    species: Option<&str>,
    size: Option<u32>,
) -> Result<SearchResult, MyGeneError> {
    let mut params = QueryParams::with_query(q.as_str());
    params
        .push("fields", fields)
        .push_non_empty("species", species)
        .push_opt("size", size);

    let raw = client.get("query", &params).await?;
    Ok(SearchResult {
        success: true,
        query: q,
        total: total_of(&raw),
        hits: hits_of(&raw),
    })
}

/// Fetches one gene record with a fixed field list.
pub(crate) async fn fetch_gene(
    client: &MyGeneClient,
    gene_id: &str,
    fields: &str,
) -> Result<Value, MyGeneError> {
    let gene_id = require_gene_id(gene_id)?;
    let mut params = QueryParams::new();
    params.push("fields", fields);
    client.get(&format!("gene/{gene_id}"), &params).await
}

pub(crate) fn require_gene_id(gene_id: &str) -> Result<&str, MyGeneError> {
    let gene_id = gene_id.trim();
    if gene_id.is_empty() {
        return Err(MyGeneError::InvalidArgument(
            "gene_id is required. Example: 1017 or ENSG00000123374".into(),
        ));
    }
    Ok(gene_id)
}

pub(crate) fn check_batch_size(len: usize) -> Result<(), MyGeneError> {
    if len > MAX_BATCH_SIZE {
        return Err(MyGeneError::BatchSizeExceeded {
            limit: MAX_BATCH_SIZE,
        });
    }
    Ok(())
}

/// `symbol` and `name` of a fetched record, echoed in every detail result.
pub(crate) fn symbol_and_name(record: &Value) -> (Value, Value) {
    (
        crate::transform::field(record, "symbol"),
        crate::transform::field(record, "name"),
    )
}
