use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::MyGeneError;
use crate::sources::mygene::MyGeneClient;

const DEFAULT_SCOPES: &str = "entrezgene,ensemblgene,symbol";

fn default_scopes() -> String {
    DEFAULT_SCOPES.to_string()
}

fn default_batch_fields() -> String {
    super::DEFAULT_FIELDS.to_string()
}

/// Resolve up to 1000 identifiers or symbols in one POST to `/query`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct BatchQueryRequest {
    /// List of gene IDs or symbols to query
    pub gene_ids: Vec<String>,
    /// Comma-separated fields to search
    #[serde(default = "default_scopes")]
    pub scopes: String,
    /// Comma-separated fields to return
    #[serde(default = "default_batch_fields")]
    pub fields: String,
    /// Species filter
    #[serde(default)]
    pub species: Option<String>,
    /// Use dotted field notation
    #[serde(default = "super::default_true")]
    pub dotfield: bool,
    /// Return all results including non-matches
    #[serde(default = "super::default_true")]
    pub returnall: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchQueryResult {
    pub success: bool,
    pub total: usize,
    pub found: usize,
    pub missing: usize,
    pub results: Vec<Value>,
    pub missing_ids: Vec<Value>,
}

/// Full annotations for up to 1000 gene ids in one POST to `/gene`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct BatchGetRequest {
    /// List of gene IDs
    pub gene_ids: Vec<String>,
    /// Comma-separated fields to return
    #[serde(default)]
    pub fields: Option<String>,
    /// Species filter
    #[serde(default)]
    pub species: Option<String>,
    /// Use dotted field notation
    #[serde(default = "super::default_true")]
    pub dotfield: bool,
    /// Filter expression
    #[serde(default, rename = "filter", alias = "filter_")]
    pub filter: Option<String>,
    /// Contact email for large requests
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchGetResult {
    pub success: bool,
    pub total: usize,
    pub genes: Vec<Value>,
}

fn insert_non_empty(body: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
        body.insert(key.to_string(), Value::String(value.to_string()));
    }
}

pub(crate) fn query_body(req: &BatchQueryRequest) -> Value {
    let mut body = Map::new();
    body.insert("ids".into(), json!(req.gene_ids));
    body.insert("scopes".into(), json!(req.scopes));
    body.insert("fields".into(), json!(req.fields));
    insert_non_empty(&mut body, "species", req.species.as_deref());
    if !req.dotfield {
        body.insert("dotfield".into(), Value::Bool(false));
    }
    body.insert("returnall".into(), Value::Bool(req.returnall));
    Value::Object(body)
}

pub(crate) fn get_body(req: &BatchGetRequest) -> Value {
    let mut body = Map::new();
    body.insert("ids".into(), json!(req.gene_ids));
    insert_non_empty(&mut body, "fields", req.fields.as_deref());
    insert_non_empty(&mut body, "species", req.species.as_deref());
    if !req.dotfield {
        body.insert("dotfield".into(), Value::Bool(false));
    }
    insert_non_empty(&mut body, "filter", req.filter.as_deref());
    insert_non_empty(&mut body, "email", req.email.as_deref());
    Value::Object(body)
}

/// Splits batch rows on their `found` flag.
///
/// Missing rows echo the original `query` value so callers can see what
/// they asked for, not a resolved id.
pub(crate) fn partition_found(results: Vec<Value>) -> BatchQueryResult {
    let mut found = 0usize;
    let mut missing_ids = Vec::new();
    for row in &results {
        if row.get("found").and_then(Value::as_bool).unwrap_or(false) {
            found += 1;
        } else {
            missing_ids.push(
                row.get("query")
                    .cloned()
                    .unwrap_or_else(|| Value::String("Unknown".into())),
            );
        }
    }

    BatchQueryResult {
        success: true,
        total: results.len(),
        found,
        missing: missing_ids.len(),
        results,
        missing_ids,
    }
}

pub async fn query_batch(
    client: &MyGeneClient,
    req: &BatchQueryRequest,
) -> Result<BatchQueryResult, MyGeneError> {
    super::check_batch_size(req.gene_ids.len())?;
    let raw = client.post("query", &query_body(req)).await?;
    Ok(partition_found(crate::transform::into_list(raw)))
}

pub async fn get_batch(
    client: &MyGeneClient,
    req: &BatchGetRequest,
) -> Result<BatchGetResult, MyGeneError> {
    super::check_batch_size(req.gene_ids.len())?;
    let raw = client.post("gene", &get_body(req)).await?;
    let genes = crate::transform::into_list(raw);
    Ok(BatchGetResult {
        success: true,
        total: genes.len(),
        genes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn query_req(args: Value) -> BatchQueryRequest {
        serde_json::from_value(args).unwrap()
    }

    #[test]
    fn query_body_uses_defaults_and_always_sends_returnall() {
        let body = query_body(&query_req(json!({"gene_ids": ["CDK2", "1017"]})));
        assert_eq!(
            body,
            json!({
                "ids": ["CDK2", "1017"],
                "scopes": "entrezgene,ensemblgene,symbol",
                "fields": "symbol,name,taxid,entrezgene",
                "returnall": true
            })
        );
    }

    #[test]
    fn query_body_sends_dotfield_false_as_boolean() {
        let body = query_body(&query_req(json!({
            "gene_ids": ["CDK2"],
            "species": "human",
            "dotfield": false,
            "returnall": false
        })));
        assert_eq!(body["dotfield"], json!(false));
        assert_eq!(body["species"], json!("human"));
        assert_eq!(body["returnall"], json!(false));
    }

    #[test]
    fn get_body_accepts_legacy_filter_name() {
        let req: BatchGetRequest = serde_json::from_value(json!({
            "gene_ids": ["1017"],
            "filter_": "symbol",
            "email": "a@b.org"
        }))
        .unwrap();
        assert_eq!(
            get_body(&req),
            json!({"ids": ["1017"], "filter": "symbol", "email": "a@b.org"})
        );
    }

    #[test]
    fn partition_found_echoes_query_for_missing_rows() {
        let out = partition_found(vec![
            json!({"query": "CDK2", "_id": "1017", "found": true}),
            json!({"query": "FAKE1", "notfound": true}),
            json!({"found": false}),
        ]);
        assert_eq!(out.total, 3);
        assert_eq!(out.found, 1);
        assert_eq!(out.missing, 2);
        assert_eq!(out.missing_ids, vec![json!("FAKE1"), json!("Unknown")]);
    }

    #[tokio::test]
    async fn query_batch_empty_list_returns_zero_counts() {
        let server = MockServer::start().await;
        let client = MyGeneClient::new_for_test(format!("{}/v3", server.uri())).unwrap();

        Mock::given(method("POST"))
            .and(path("/v3/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let out = query_batch(&client, &query_req(json!({"gene_ids": []})))
            .await
            .unwrap();
        assert!(out.success);
        assert_eq!((out.total, out.found, out.missing), (0, 0, 0));
    }

    #[tokio::test]
    async fn query_batch_over_limit_never_calls_gateway() {
        let server = MockServer::start().await;
        let client = MyGeneClient::new_for_test(format!("{}/v3", server.uri())).unwrap();

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let ids: Vec<String> = (0..1001).map(|i| i.to_string()).collect();
        let err = query_batch(&client, &query_req(json!({"gene_ids": ids})))
            .await
            .unwrap_err();
        assert!(matches!(err, MyGeneError::BatchSizeExceeded { limit: 1000 }));

        let ids = (0..1001).map(|i| i.to_string()).collect::<Vec<_>>();
        let err = get_batch(
            &client,
            &serde_json::from_value(json!({"gene_ids": ids})).unwrap(),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("1000"));
    }

    #[tokio::test]
    async fn get_batch_returns_raw_array_with_count() {
        let server = MockServer::start().await;
        let client = MyGeneClient::new_for_test(format!("{}/v3", server.uri())).unwrap();

        Mock::given(method("POST"))
            .and(path("/v3/gene"))
            .and(body_json(json!({"ids": ["1017", "1018"], "fields": "symbol"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"_id": "1017", "symbol": "CDK2"},
                {"_id": "1018", "symbol": "CDK3"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let req: BatchGetRequest =
            serde_json::from_value(json!({"gene_ids": ["1017", "1018"], "fields": "symbol"}))
                .unwrap();
        let out = get_batch(&client, &req).await.unwrap();
        assert_eq!(out.total, 2);
        assert_eq!(out.genes[1]["symbol"], "CDK3");
    }
}
