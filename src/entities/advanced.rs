use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::MyGeneError;
use crate::sources::mygene::MyGeneClient;
use crate::transform::display_value;
use crate::utils::query::{QueryParams, all_of, any_of, join_and, phrase};

const FILTERED_FIELDS: &str = "symbol,name,taxid,type_of_gene,genomic_pos,ensembl,refseq";
const DEFAULT_FACET_SIZE: u64 = 10;

/// One `field:"value"` condition.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct Clause {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub value: Option<Value>,
}

impl Clause {
    /// `None` when either side is missing or blank.
    fn compile(&self) -> Option<String> {
        let field = self.field.as_deref().map(str::trim).filter(|f| !f.is_empty())?;
        let value = self.value.as_ref().map(display_value)?;
        if value.is_empty() {
            return None;
        }
        Some(phrase(field, &value))
    }
}

/// Boolean clause set compiled into one Lucene query.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ComplexQueryRequest {
    /// Conditions that must all be true (AND)
    #[serde(default)]
    pub must: Option<Vec<Clause>>,
    /// At least one condition must be true (OR)
    #[serde(default)]
    pub should: Option<Vec<Clause>>,
    /// Conditions that must not be true (NOT)
    #[serde(default)]
    pub must_not: Option<Vec<Clause>>,
    /// Additional filters as field:value pairs; list values match any
    #[serde(default)]
    pub filters: Option<Map<String, Value>>,
    /// Fields to aggregate, each optionally with {"size": N}
    #[serde(default)]
    pub aggregations: Option<Map<String, Value>>,
    /// Number of results
    #[serde(default = "super::default_size")]
    pub size: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComplexQueryResult {
    pub success: bool,
    pub query: String,
    pub total: u64,
    pub hits: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregations: Option<Value>,
}

/// A base query narrowed by predefined gene filters.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FilteredQueryRequest {
    /// Base query string
    #[serde(skip_serializing)]
    pub q: String,
    /// Gene types (e.g. ['protein-coding', 'ncRNA'])
    #[serde(default)]
    pub type_of_gene: Option<Vec<String>>,
    /// Chromosomes (e.g. ['1', '2', 'X'])
    #[serde(default)]
    pub chromosome: Option<Vec<String>>,
    /// Taxonomy IDs (e.g. [9606, 10090])
    #[serde(default)]
    pub taxid: Option<Vec<u64>>,
    /// Filter by Ensembl annotation presence
    #[serde(default)]
    pub ensembl_gene_exists: Option<bool>,
    /// Filter by RefSeq annotation presence
    #[serde(default)]
    pub refseq_exists: Option<bool>,
    /// Filter by GO annotation presence
    #[serde(default)]
    pub has_go_annotation: Option<bool>,
    /// Filter by pathway annotation presence
    #[serde(default)]
    pub has_pathway_annotation: Option<bool>,
    /// Number of results
    #[serde(default = "super::default_size", skip_serializing)]
    pub size: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FilteredQueryResult {
    pub success: bool,
    pub query: String,
    /// Every filter argument as received, nulls included.
    pub filters_applied: FilteredQueryRequest,
    pub total: u64,
    pub hits: Vec<Value>,
}

fn compiled(clauses: Option<&[Clause]>) -> Vec<String> {
    clauses
        .unwrap_or_default()
        .iter()
        .filter_map(Clause::compile)
        .collect()
}

fn filter_clause(field: &str, values: &Value) -> Option<String> {
    match values {
        Value::Array(items) if items.is_empty() => None,
        Value::Array(items) => {
            let clauses = items
                .iter()
                .map(|v| phrase(field, &display_value(v)))
                .collect::<Vec<_>>();
            Some(any_of(&clauses))
        }
        other => Some(phrase(field, &display_value(other))),
    }
}

/// Compiles the clause set; nothing compiles to the match-all `*`.
pub(crate) fn build_query(req: &ComplexQueryRequest) -> String {
    let mut parts = Vec::new();

    let must = compiled(req.must.as_deref());
    if !must.is_empty() {
        parts.push(all_of(&must));
    }
    let should = compiled(req.should.as_deref());
    if !should.is_empty() {
        parts.push(any_of(&should));
    }
    parts.extend(
        compiled(req.must_not.as_deref())
            .into_iter()
            .map(|clause| format!("NOT {clause}")),
    );
    if let Some(filters) = &req.filters {
        parts.extend(
            filters
                .iter()
                .filter_map(|(field, values)| filter_clause(field, values)),
        );
    }

    if parts.is_empty() {
        return "*".to_string();
    }
    join_and(&parts)
}

/// `facets` and `facet_size` for an aggregation map.
///
/// Facets keep the caller's key order. A numeric top-level `size` entry sets
/// the bucket count and is not itself a facet; otherwise the first
/// aggregation's own `size` does, defaulting to 10.
pub(crate) fn facet_params(aggregations: &Map<String, Value>) -> Option<(String, u64)> {
    let top_size = aggregations.get("size").and_then(Value::as_u64);
    let entries = aggregations
        .iter()
        .filter(|(key, _)| !(top_size.is_some() && key.as_str() == "size"))
        .collect::<Vec<_>>();
    let (_, first) = entries.first()?;
    let facet_size = top_size
        .or_else(|| first.get("size").and_then(Value::as_u64))
        .unwrap_or(DEFAULT_FACET_SIZE);
    let facets = entries
        .iter()
        .map(|(key, _)| key.as_str())
        .collect::<Vec<_>>();
    Some((facets.join(","), facet_size))
}

pub async fn complex_query(
    client: &MyGeneClient,
    req: &ComplexQueryRequest,
) -> Result<ComplexQueryResult, MyGeneError> {
    let q = build_query(req);
    let mut params = QueryParams::with_query(q.as_str());
    params.push_opt("size", req.size);

    let aggregations = req.aggregations.as_ref().filter(|a| !a.is_empty());
    if let Some((facets, facet_size)) = aggregations.and_then(facet_params) {
        params.push("facets", facets).push("facet_size", facet_size);
    }

    let raw = client.get("query", &params).await?;
    Ok(ComplexQueryResult {
        success: true,
        total: super::total_of(&raw),
        hits: super::hits_of(&raw),
        aggregations: aggregations.and_then(|_| raw.get("facets").cloned()),
        query: q,
    })
}

pub(crate) fn build_filtered_query(req: &FilteredQueryRequest) -> String {
    let mut parts = vec![req.q.clone()];

    let list_filters: [(&str, Option<Vec<String>>); 3] = [
        ("type_of_gene", req.type_of_gene.clone()),
        ("genomic_pos.chr", req.chromosome.clone()),
        (
            "taxid",
            req.taxid
                .as_ref()
                .map(|ids| ids.iter().map(u64::to_string).collect()),
        ),
    ];
    for (field, values) in list_filters {
        let Some(values) = values.filter(|v| !v.is_empty()) else {
            continue;
        };
        let clauses = values
            .iter()
            .map(|v| {
                if field == "taxid" {
                    format!("taxid:{v}")
                } else {
                    phrase(field, v)
                }
            })
            .collect::<Vec<_>>();
        parts.push(any_of(&clauses));
    }

    let existence = [
        ("ensembl.gene", req.ensembl_gene_exists),
        ("refseq", req.refseq_exists),
        ("go", req.has_go_annotation),
        ("pathway", req.has_pathway_annotation),
    ];
    for (field, wanted) in existence {
        match wanted {
            Some(true) => parts.push(format!("_exists_:{field}")),
            Some(false) => parts.push(format!("NOT _exists_:{field}")),
            None => {}
        }
    }

    join_and(&parts)
}

pub async fn filtered_query(
    client: &MyGeneClient,
    req: &FilteredQueryRequest,
) -> Result<FilteredQueryResult, MyGeneError> {
    if req.q.trim().is_empty() {
        return Err(MyGeneError::InvalidArgument(
            "q is required. Example: kinase or symbol:CDK*".into(),
        ));
    }
    let q = build_filtered_query(req);
    let mut params = QueryParams::with_query(q.as_str());
    params
        .push_opt("size", req.size)
        .push("fields", FILTERED_FIELDS);

    let raw = client.get("query", &params).await?;
    Ok(FilteredQueryResult {
        success: true,
        query: q,
        filters_applied: req.clone(),
        total: super::total_of(&raw),
        hits: super::hits_of(&raw),
    })
}
