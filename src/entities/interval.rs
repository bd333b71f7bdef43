use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::MyGeneError;
use crate::sources::mygene::MyGeneClient;
use crate::utils::query::QueryParams;

/// Genes overlapping a chromosome interval.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct IntervalRequest {
    /// Chromosome (e.g. '1', 'X', 'chr1')
    pub chr: String,
    /// Start position
    pub start: u64,
    /// End position
    pub end: u64,
    /// Species for the query
    #[serde(default = "super::default_species")]
    pub species: Option<String>,
    /// Comma-separated fields to return
    #[serde(default = "super::default_fields")]
    pub fields: Option<String>,
    /// Number of results to return
    #[serde(default = "super::default_size")]
    pub size: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interval {
    pub chr: String,
    pub start: u64,
    pub end: u64,
    pub species: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IntervalResult {
    pub success: bool,
    pub interval: Interval,
    pub total: u64,
    pub hits: Vec<Value>,
}

/// `chr{N}:{start}-{end}`; the `chr` prefix is added only when missing.
pub(crate) fn interval_query(chr: &str, start: u64, end: u64) -> String {
    if chr.starts_with("chr") {
        format!("{chr}:{start}-{end}")
    } else {
        format!("chr{chr}:{start}-{end}")
    }
}

pub async fn query_interval(
    client: &MyGeneClient,
    req: &IntervalRequest,
) -> Result<IntervalResult, MyGeneError> {
    let chr = req.chr.trim();
    if chr.is_empty() {
        return Err(MyGeneError::InvalidArgument("chr is required".into()));
    }
    if req.end < req.start {
        return Err(MyGeneError::InvalidArgument(format!(
            "end ({}) must not be before start ({})",
            req.end, req.start
        )));
    }

    let mut params = QueryParams::with_query(interval_query(chr, req.start, req.end));
    params
        .push_non_empty("species", req.species.as_deref())
        .push_non_empty("fields", req.fields.as_deref())
        .push_opt("size", req.size);

    let raw = client.get("query", &params).await?;
    Ok(IntervalResult {
        success: true,
        interval: Interval {
            chr: req.chr.clone(),
            start: req.start,
            end: req.end,
            species: req.species.clone(),
        },
        total: super::total_of(&raw),
        hits: super::hits_of(&raw),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn interval_query_normalizes_chr_prefix_once() {
        assert_eq!(interval_query("1", 100, 200), "chr1:100-200");
        assert_eq!(interval_query("chr1", 100, 200), "chr1:100-200");
        assert_eq!(interval_query("X", 5, 6), "chrX:5-6");
    }

    #[test]
    fn interval_query_prefix_check_is_case_sensitive() {
        assert_eq!(interval_query("Chr1", 1, 2), "chrChr1:1-2");
    }

    #[tokio::test]
    async fn query_interval_echoes_original_chromosome() {
        let server = MockServer::start().await;
        let client = MyGeneClient::new_for_test(format!("{}/v3", server.uri())).unwrap();

        Mock::given(method("GET"))
            .and(path("/v3/query"))
            .and(query_param("q", "chr12:55966769-55972784"))
            .and(query_param("species", "human"))
            .and(query_param("fields", "symbol,name,taxid,entrezgene"))
            .and(query_param("size", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total": 1,
                "hits": [{"symbol": "CDK2"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let req: IntervalRequest = serde_json::from_value(json!({
            "chr": "12",
            "start": 55966769,
            "end": 55972784
        }))
        .unwrap();
        let out = query_interval(&client, &req).await.unwrap();
        assert_eq!(out.interval.chr, "12");
        assert_eq!(out.interval.species.as_deref(), Some("human"));
        assert_eq!(out.total, 1);
    }

    #[tokio::test]
    async fn query_interval_rejects_inverted_range() {
        let client = MyGeneClient::new_for_test("http://127.0.0.1/v3".into()).unwrap();
        let req: IntervalRequest =
            serde_json::from_value(json!({"chr": "1", "start": 10, "end": 5})).unwrap();
        let err = query_interval(&client, &req).await.unwrap_err();
        assert!(matches!(err, MyGeneError::InvalidArgument(_)));
    }
}
