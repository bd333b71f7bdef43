use std::borrow::Cow;
use std::time::Instant;
#[cfg(test)]
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::debug;

use crate::error::MyGeneError;
use crate::utils::query::QueryParams;

const MYGENE_BASE: &str = "https://mygene.info/v3";
const MYGENE_BASE_ENV: &str = "MYGENE_MCP_BASE";

/// The single outbound chokepoint for MyGene.info calls.
///
/// Every transport failure (timeout, non-2xx status, connect or decode
/// failure) surfaces as [`MyGeneError::Gateway`].
#[derive(Debug, Clone)]
pub struct MyGeneClient {
    client: reqwest::Client,
    base: Cow<'static, str>,
}

impl MyGeneClient {
    pub fn new() -> Result<Self, MyGeneError> {
        Ok(Self {
            client: crate::sources::http_client(crate::sources::env_timeout())?,
            base: crate::sources::env_base(MYGENE_BASE, MYGENE_BASE_ENV),
        })
    }

    #[cfg(test)]
    pub(crate) fn new_for_test(base: String) -> Result<Self, MyGeneError> {
        Self::new_for_test_with_timeout(base, Duration::from_secs(5))
    }

    #[cfg(test)]
    pub(crate) fn new_for_test_with_timeout(
        base: String,
        timeout: Duration,
    ) -> Result<Self, MyGeneError> {
        Ok(Self {
            client: crate::sources::http_client(timeout)?,
            base: Cow::Owned(base),
        })
    }

    pub fn base(&self) -> &str {
        self.base.as_ref()
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base.as_ref().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// GET `{base}/{endpoint}` with the given query parameters.
    ///
    /// The parsed body may be an object or an array depending on the endpoint.
    pub(crate) async fn get(
        &self,
        endpoint: &str,
        params: &QueryParams,
    ) -> Result<Value, MyGeneError> {
        let req = self
            .client
            .get(self.endpoint(endpoint))
            .query(params.as_pairs());
        self.send_json("GET", endpoint, req).await
    }

    /// POST a JSON body to `{base}/{endpoint}`.
    pub(crate) async fn post(&self, endpoint: &str, body: &Value) -> Result<Value, MyGeneError> {
        let req = self
            .client
            .post(self.endpoint(endpoint))
            .header(CONTENT_TYPE, "application/json")
            .json(body);
        self.send_json("POST", endpoint, req).await
    }

    async fn send_json(
        &self,
        method: &'static str,
        endpoint: &str,
        req: reqwest::RequestBuilder,
    ) -> Result<Value, MyGeneError> {
        let started = Instant::now();
        let resp = req.send().await.map_err(transport_error)?;
        let status = resp.status();
        let bytes = resp.bytes().await.map_err(transport_error)?;
        debug!(
            method,
            endpoint,
            status = status.as_u16(),
            elapsed_ms = elapsed_ms(started),
            "mygene.info call"
        );

        if !status.is_success() {
            return Err(MyGeneError::gateway(format!(
                "HTTP error {}: {}",
                status.as_u16(),
                crate::sources::body_excerpt(&bytes)
            )));
        }

        serde_json::from_slice(&bytes)
            .map_err(|err| MyGeneError::gateway(format!("Request failed: {err}")))
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn transport_error(err: reqwest::Error) -> MyGeneError {
    if err.is_timeout() {
        return MyGeneError::gateway("Request timed out. Please try again.");
    }
    MyGeneError::gateway(format!("Request failed: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn get_sends_params_and_returns_object() {
        let server = MockServer::start().await;
        let client = MyGeneClient::new_for_test(format!("{}/v3", server.uri())).unwrap();

        Mock::given(method("GET"))
            .and(path("/v3/query"))
            .and(query_param("q", "CDK2"))
            .and(query_param("size", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 1, "hits": []})))
            .expect(1)
            .mount(&server)
            .await;

        let mut params = QueryParams::with_query("CDK2");
        params.push("size", 5);
        let body = client.get("query", &params).await.unwrap();
        assert_eq!(body["total"], 1);
    }

    #[tokio::test]
    async fn post_sends_json_body_and_returns_array() {
        let server = MockServer::start().await;
        let client = MyGeneClient::new_for_test(format!("{}/v3", server.uri())).unwrap();

        Mock::given(method("POST"))
            .and(path("/v3/gene"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"ids": ["1017"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"_id": "1017", "symbol": "CDK2"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let body = client
            .post("gene", &json!({"ids": ["1017"]}))
            .await
            .unwrap();
        assert_eq!(body.as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn non_success_status_becomes_gateway_error_with_body() {
        let server = MockServer::start().await;
        let client = MyGeneClient::new_for_test(format!("{}/v3", server.uri())).unwrap();

        Mock::given(method("GET"))
            .and(path("/v3/gene/nope"))
            .respond_with(ResponseTemplate::new(404).set_body_string("gene not found"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client.get("gene/nope", &QueryParams::new()).await.unwrap_err();
        assert!(matches!(err, MyGeneError::Gateway { .. }));
        assert_eq!(err.to_string(), "HTTP error 404: gene not found");
    }

    #[tokio::test]
    async fn slow_response_becomes_timeout_message() {
        let server = MockServer::start().await;
        let client = MyGeneClient::new_for_test_with_timeout(
            format!("{}/v3", server.uri()),
            Duration::from_millis(100),
        )
        .unwrap();

        Mock::given(method("GET"))
            .and(path("/v3/metadata"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let err = client.get("metadata", &QueryParams::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "Request timed out. Please try again.");
    }

    #[tokio::test]
    async fn invalid_json_body_becomes_request_failed() {
        let server = MockServer::start().await;
        let client = MyGeneClient::new_for_test(format!("{}/v3", server.uri())).unwrap();

        Mock::given(method("GET"))
            .and(path("/v3/metadata"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client.get("metadata", &QueryParams::new()).await.unwrap_err();
        assert!(err.to_string().starts_with("Request failed:"));
    }
}
