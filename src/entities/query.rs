use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::MyGeneError;
use crate::sources::mygene::MyGeneClient;
use crate::utils::query::QueryParams;

const DEFAULT_FACET_SIZE: u32 = 10;
const DEFAULT_STATISTICS_SIZE: u32 = 100;

/// Free-text or fielded gene query (`CDK2`, `cyclin*`, `entrezgene:1017`).
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct QueryRequest {
    /// Query string (e.g. 'CDK2', 'cyclin*', 'entrezgene:1017')
    pub q: String,
    /// Comma-separated fields to return
    #[serde(default = "super::default_fields")]
    pub fields: Option<String>,
    /// Species filter (e.g. 'human', 'mouse', or a taxonomy id)
    #[serde(default)]
    pub species: Option<String>,
    /// Number of results to return (max 1000); the remote default applies when omitted
    #[serde(default)]
    pub size: Option<u32>,
    /// Starting result offset for pagination
    #[serde(default, rename = "from", alias = "from_")]
    pub from: Option<u32>,
    /// Sort order for results
    #[serde(default)]
    pub sort: Option<String>,
    /// Facet fields for aggregation
    #[serde(default)]
    pub facets: Option<String>,
    /// Number of facet buckets (sent only together with facets, default 10)
    #[serde(default)]
    pub facet_size: Option<u32>,
    /// Fetch all results; the response carries a scroll_id for continuation
    #[serde(default)]
    pub fetch_all: bool,
    /// Scroll id returned by a previous fetch_all query
    #[serde(default)]
    pub scroll_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub success: bool,
    pub total: u64,
    pub took: u64,
    pub hits: Vec<Value>,
    pub scroll_id: Option<String>,
    pub facets: Value,
}

pub(crate) fn build_params(req: &QueryRequest) -> QueryParams {
    let mut params = QueryParams::with_query(req.q.as_str());
    params
        .push_non_empty("fields", req.fields.as_deref())
        .push_non_empty("species", req.species.as_deref())
        .push_opt("size", req.size)
        .push_opt("from", req.from)
        .push_non_empty("sort", req.sort.as_deref());

    if let Some(facets) = req.facets.as_deref().filter(|f| !f.trim().is_empty()) {
        params
            .push("facets", facets)
            .push("facet_size", req.facet_size.unwrap_or(DEFAULT_FACET_SIZE));
    }
    if req.fetch_all {
        params.push("fetch_all", "true");
    }
    params.push_non_empty("scroll_id", req.scroll_id.as_deref());
    params
}

pub async fn query(client: &MyGeneClient, req: &QueryRequest) -> Result<QueryResult, MyGeneError> {
    let raw = client.get("query", &build_params(req)).await?;
    Ok(QueryResult {
        success: true,
        total: super::total_of(&raw),
        took: raw.get("took").and_then(Value::as_u64).unwrap_or(0),
        hits: super::hits_of(&raw),
        scroll_id: raw
            .get("_scroll_id")
            .and_then(Value::as_str)
            .map(str::to_string),
        facets: raw
            .get("facets")
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new())),
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, JsonSchema)]
pub enum FieldOperator {
    #[default]
    #[serde(rename = "AND", alias = "and")]
    And,
    #[serde(rename = "OR", alias = "or")]
    Or,
}

impl FieldOperator {
    fn joiner(self) -> &'static str {
        match self {
            Self::And => " AND ",
            Self::Or => " OR ",
        }
    }
}

/// Field-specific search built from `{field: value}` pairs.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct FieldSearchRequest {
    /// Map of field name to value (e.g. {"go.BP.term": "cell cycle"})
    pub field_queries: BTreeMap<String, String>,
    /// How the field clauses are combined
    #[serde(default)]
    pub operator: FieldOperator,
    /// Comma-separated fields to return
    #[serde(default = "super::default_fields")]
    pub fields: Option<String>,
    /// Species filter
    #[serde(default)]
    pub species: Option<String>,
    /// Number of results
    #[serde(default = "super::default_size")]
    pub size: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldSearchResult {
    pub query: String,
    #[serde(flatten)]
    pub result: QueryResult,
}

fn is_quoted(value: &str) -> bool {
    value.len() >= 2 && value.starts_with('"') && value.ends_with('"')
}

/// Quotes values containing whitespace unless they already are quoted.
pub(crate) fn field_clause(field: &str, value: &str) -> String {
    if value.chars().any(char::is_whitespace) && !is_quoted(value) {
        return format!("{field}:\"{value}\"");
    }
    format!("{field}:{value}")
}

pub(crate) fn compile_field_query(
    field_queries: &BTreeMap<String, String>,
    operator: FieldOperator,
) -> String {
    field_queries
        .iter()
        .map(|(field, value)| field_clause(field, value))
        .collect::<Vec<_>>()
        .join(operator.joiner())
}

pub async fn search_by_field(
    client: &MyGeneClient,
    req: &FieldSearchRequest,
) -> Result<FieldSearchResult, MyGeneError> {
    if req.field_queries.is_empty() {
        return Err(MyGeneError::InvalidArgument(
            "field_queries must contain at least one field".into(),
        ));
    }
    let q = compile_field_query(&req.field_queries, req.operator);
    let result = query(
        client,
        &QueryRequest {
            q: q.clone(),
            fields: req.fields.clone(),
            species: req.species.clone(),
            size: req.size,
            ..QueryRequest::default()
        },
    )
    .await?;
    Ok(FieldSearchResult { query: q, result })
}

/// Value distribution of one field across all genes.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct FieldStatisticsRequest {
    /// Field to aggregate (e.g. 'type_of_gene', 'taxid')
    pub field: String,
    /// Number of distinct values to return (default 100)
    #[serde(default)]
    pub size: Option<u32>,
    /// Species filter
    #[serde(default)]
    pub species: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValueCount {
    pub value: Value,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldStatistics {
    pub success: bool,
    pub field: String,
    pub total: u64,
    pub unique_values: usize,
    pub statistics: Vec<FieldValueCount>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Reshapes the facet buckets of `field` into value/count/percentage rows.
pub(crate) fn facet_statistics(raw: &Value, field: &str) -> Vec<FieldValueCount> {
    let total = super::total_of(raw);
    let divisor = if total == 0 { 1.0 } else { total as f64 };
    let terms = raw
        .get("facets")
        .and_then(|f| f.get(field))
        .map(|f| crate::transform::list_at(f, "terms"))
        .unwrap_or_default();

    terms
        .into_iter()
        .map(|term| {
            let count = term.get("count").and_then(Value::as_u64).unwrap_or(0);
            FieldValueCount {
                value: crate::transform::field(term, "term"),
                count,
                percentage: round2(count as f64 / divisor * 100.0),
            }
        })
        .collect()
}

pub async fn field_statistics(
    client: &MyGeneClient,
    req: &FieldStatisticsRequest,
) -> Result<FieldStatistics, MyGeneError> {
    let field = req.field.trim();
    if field.is_empty() {
        return Err(MyGeneError::InvalidArgument("field is required".into()));
    }

    let mut params = QueryParams::with_query("*");
    params
        .push("size", 0)
        .push("facets", field)
        .push("facet_size", req.size.unwrap_or(DEFAULT_STATISTICS_SIZE))
        .push_non_empty("species", req.species.as_deref());

    let raw = client.get("query", &params).await?;
    let statistics = facet_statistics(&raw, field);
    Ok(FieldStatistics {
        success: true,
        field: field.to_string(),
        total: super::total_of(&raw),
        unique_values: statistics.len(),
        statistics,
    })
}
