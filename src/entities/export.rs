use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::MyGeneError;
use crate::sources::mygene::MyGeneClient;

const DEFAULT_EXPORT_FIELDS: &[&str] = &[
    "symbol",
    "name",
    "taxid",
    "entrezgene",
    "ensembl.gene",
    "type_of_gene",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Tsv,
    Csv,
    Xml,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Tsv => "tsv",
            Self::Csv => "csv",
            Self::Xml => "xml",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = MyGeneError;

    /// Exact, case-sensitive match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "tsv" => Ok(Self::Tsv),
            "csv" => Ok(Self::Csv),
            "xml" => Ok(Self::Xml),
            other => Err(MyGeneError::UnsupportedFormat(other.to_string())),
        }
    }
}

fn default_format() -> String {
    "tsv".to_string()
}

/// Fetch genes in one POST and render them as text.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ExportRequest {
    /// List of gene IDs to export
    pub gene_ids: Vec<String>,
    /// Export format: tsv, csv, json or xml
    #[serde(default = "default_format")]
    pub format: String,
    /// Fields to include in export
    #[serde(default, deserialize_with = "crate::utils::serde::optional_items")]
    #[schemars(with = "crate::utils::serde::StringOrVec")]
    pub fields: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportResult {
    pub success: bool,
    pub format: String,
    pub total: usize,
    pub content: String,
}

pub(crate) fn export_fields(fields: Option<&[String]>) -> Vec<String> {
    match fields {
        Some(list) if !list.is_empty() => list.to_vec(),
        _ => DEFAULT_EXPORT_FIELDS.iter().map(|f| (*f).to_string()).collect(),
    }
}

pub(crate) fn render(
    format: ExportFormat,
    genes: &[Value],
    fields: &[String],
) -> Result<String, MyGeneError> {
    match format {
        ExportFormat::Json => crate::render::json::to_pretty(&genes),
        ExportFormat::Tsv => crate::render::export::delimited(genes, fields, b'\t'),
        ExportFormat::Csv => crate::render::export::delimited(genes, fields, b','),
        ExportFormat::Xml => Ok(crate::render::export::xml(genes, fields)),
    }
}

pub async fn export(
    client: &MyGeneClient,
    req: &ExportRequest,
) -> Result<ExportResult, MyGeneError> {
    let format = req.format.parse::<ExportFormat>()?;
    super::check_batch_size(req.gene_ids.len())?;

    let fields = export_fields(req.fields.as_deref());
    let body = json!({"ids": req.gene_ids, "fields": fields.join(",")});
    let raw = client.post("gene", &body).await?;
    let genes = crate::transform::into_list(raw);

    Ok(ExportResult {
        success: true,
        format: format.to_string(),
        total: genes.len(),
        content: render(format, &genes, &fields)?,
    })
}
