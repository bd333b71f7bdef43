use std::time::Instant;

use crate::sources::mygene::MyGeneClient;
use crate::utils::query::QueryParams;

#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthRow {
    pub endpoint: String,
    pub status: String,
    pub latency: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthReport {
    pub base: String,
    pub healthy: usize,
    pub total: usize,
    pub rows: Vec<HealthRow>,
}

impl HealthReport {
    pub fn all_healthy(&self) -> bool {
        self.healthy == self.total
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# MyGene MCP Health Check\n\n");
        out.push_str(&format!("Base: {}\n\n", self.base));
        out.push_str("| Endpoint | Status | Latency |\n");
        out.push_str("|----------|--------|---------|\n");
        for row in &self.rows {
            out.push_str(&format!(
                "| {} | {} | {} |\n",
                row.endpoint, row.status, row.latency
            ));
        }
        out.push_str(&format!(
            "\nStatus: {}/{} endpoints healthy\n",
            self.healthy, self.total
        ));
        out
    }
}

async fn check_one(client: &MyGeneClient, path: &str, params: QueryParams) -> HealthRow {
    let start = Instant::now();
    let result = client.get(path, &params).await;
    let elapsed = start.elapsed().as_millis();

    match result {
        Ok(_) => HealthRow {
            endpoint: path.to_string(),
            status: "ok".into(),
            latency: format!("{elapsed}ms"),
        },
        Err(err) => {
            tracing::warn!(endpoint = path, error = %err, "Health probe failed");
            HealthRow {
                endpoint: path.to_string(),
                status: "error".into(),
                latency: format!("{elapsed}ms ({err})"),
            }
        }
    }
}

/// Probes the metadata and query endpoints of the configured gateway.
pub(crate) async fn check(client: &MyGeneClient) -> HealthReport {
    let mut probe = QueryParams::with_query("CDK2");
    probe.push("size", 1);

    let (metadata, query) = tokio::join!(
        check_one(client, "metadata", QueryParams::new()),
        check_one(client, "query", probe),
    );

    let rows = vec![metadata, query];
    let healthy = rows.iter().filter(|r| r.status == "ok").count();
    HealthReport {
        base: client.base().to_string(),
        healthy,
        total: rows.len(),
        rows,
    }
}
