use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::MyGeneError;
use crate::sources::mygene::MyGeneClient;
use crate::utils::query::{escape_phrase, exists_any, join_and, phrase, present};

const SEARCH_FIELDS: &str = "symbol,name,hpa,gtex,biogps";
const DEFAULT_DATASETS: &str = "hpa,gtex,biogps,exac";
const TISSUE_SOURCES: &[&str] = &["hpa", "gtex", "biogps"];

/// Find genes by tissue, subcellular location or expression level.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ExpressionSearchRequest {
    /// Tissue type (e.g. 'brain', 'liver', 'heart')
    #[serde(default)]
    pub tissue: Option<String>,
    /// Cell type or subcellular location
    #[serde(default)]
    pub cell_type: Option<String>,
    /// Expression level: 'high', 'medium', 'low', 'not detected'
    #[serde(default)]
    pub expression_level: Option<String>,
    /// Dataset source: 'hpa', 'gtex', 'biogps'
    #[serde(default)]
    pub dataset: Option<String>,
    /// Species filter
    #[serde(default = "super::default_species")]
    pub species: Option<String>,
    /// Number of results
    #[serde(default = "super::default_size")]
    pub size: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ExpressionProfileRequest {
    /// Gene ID (Entrez, Ensembl, or symbol)
    pub gene_id: String,
    /// Specific datasets to include (default: all)
    #[serde(default, deserialize_with = "crate::utils::serde::optional_items")]
    #[schemars(with = "crate::utils::serde::StringOrVec")]
    pub datasets: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpressionProfile {
    pub gene_id: String,
    pub symbol: Value,
    pub name: Value,
    pub expression_data: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpressionProfileResult {
    pub success: bool,
    pub total_datasets: usize,
    pub expression_profile: ExpressionProfile,
}

pub(crate) fn build_query(req: &ExpressionSearchRequest) -> String {
    let tissue = present(req.tissue.as_deref());
    let level = present(req.expression_level.as_deref());
    let dataset = present(req.dataset.as_deref());
    let mut parts = Vec::new();

    if let Some(tissue) = tissue {
        let tissue = escape_phrase(tissue);
        let clauses = TISSUE_SOURCES
            .iter()
            .map(|source| format!("{source}.tissue.\"{tissue}\""))
            .collect::<Vec<_>>();
        parts.push(format!("({})", clauses.join(" OR ")));
    }
    if let Some(cell_type) = present(req.cell_type.as_deref()) {
        parts.push(phrase("hpa.subcellular_location", cell_type));
    }
    if let Some(level) = level {
        match dataset {
            Some(dataset) => parts.push(phrase(&format!("{dataset}.expression_level"), level)),
            None => parts.push(phrase("expression_level", level)),
        }
    }
    if let (Some(dataset), None, None) = (dataset, level, tissue) {
        parts.push(format!("_exists_:{dataset}"));
    }

    if parts.is_empty() {
        return exists_any(TISSUE_SOURCES);
    }
    join_and(&parts)
}

pub(crate) fn profile_fields(datasets: Option<&[String]>) -> String {
    let datasets = match datasets {
        Some(list) if !list.is_empty() => list.join(","),
        _ => DEFAULT_DATASETS.to_string(),
    };
    format!("{datasets},symbol,name,entrezgene")
}

pub async fn search(
    client: &MyGeneClient,
    req: &ExpressionSearchRequest,
) -> Result<super::SearchResult, MyGeneError> {
    super::run_search(
        client,
        build_query(req),
        SEARCH_FIELDS,
        req.species.as_deref(),
        req.size,
    )
    .await
}

pub async fn profile(
    client: &MyGeneClient,
    req: &ExpressionProfileRequest,
) -> Result<ExpressionProfileResult, MyGeneError> {
    let fields = profile_fields(req.datasets.as_deref());
    let record = super::fetch_gene(client, &req.gene_id, &fields).await?;
    let (symbol, name) = super::symbol_and_name(&record);
    let expression_data = crate::transform::expression::expression_data(&record);

    Ok(ExpressionProfileResult {
        success: true,
        total_datasets: expression_data.len(),
        expression_profile: ExpressionProfile {
            gene_id: req.gene_id.clone(),
            symbol,
            name,
            expression_data,
        },
    })
}
