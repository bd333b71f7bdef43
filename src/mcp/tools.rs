//! Static tool table: names, descriptions, input schemas and dispatch.

use std::collections::HashSet;

use rmcp::model::JsonObject;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tracing::{info, warn};

use crate::entities::{
    advanced, annotation, batch, chemical, disease, export, expression, go, homology, interval,
    metadata, pathway, query, variant,
};
use crate::error::MyGeneError;
use crate::sources::mygene::MyGeneClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    QueryGenes,
    SearchByField,
    GetFieldStatistics,
    GetGeneAnnotation,
    QueryGenesBatch,
    GetGenesBatch,
    QueryGenesByInterval,
    GetMygeneMetadata,
    GetAvailableFields,
    GetSpeciesList,
    QueryGenesByExpression,
    GetGeneExpressionProfile,
    QueryGenesByPathway,
    GetGenePathways,
    QueryGenesByGoTerm,
    GetGeneGoAnnotations,
    GetGeneOrthologs,
    QueryHomologousGenes,
    QueryGenesByDisease,
    GetGeneDiseaseAssociations,
    GetGeneVariants,
    QueryGenesByVariant,
    QueryGenesByChemical,
    GetGeneChemicalInteractions,
    BuildComplexQuery,
    QueryWithFilters,
    ExportGeneList,
}

impl ToolName {
    pub const ALL: [ToolName; 27] = [
        Self::QueryGenes,
        Self::SearchByField,
        Self::GetFieldStatistics,
        Self::GetGeneAnnotation,
        Self::QueryGenesBatch,
        Self::GetGenesBatch,
        Self::QueryGenesByInterval,
        Self::GetMygeneMetadata,
        Self::GetAvailableFields,
        Self::GetSpeciesList,
        Self::QueryGenesByExpression,
        Self::GetGeneExpressionProfile,
        Self::QueryGenesByPathway,
        Self::GetGenePathways,
        Self::QueryGenesByGoTerm,
        Self::GetGeneGoAnnotations,
        Self::GetGeneOrthologs,
        Self::QueryHomologousGenes,
        Self::QueryGenesByDisease,
        Self::GetGeneDiseaseAssociations,
        Self::GetGeneVariants,
        Self::QueryGenesByVariant,
        Self::QueryGenesByChemical,
        Self::GetGeneChemicalInteractions,
        Self::BuildComplexQuery,
        Self::QueryWithFilters,
        Self::ExportGeneList,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::QueryGenes => "query_genes",
            Self::SearchByField => "search_by_field",
            Self::GetFieldStatistics => "get_field_statistics",
            Self::GetGeneAnnotation => "get_gene_annotation",
            Self::QueryGenesBatch => "query_genes_batch",
            Self::GetGenesBatch => "get_genes_batch",
            Self::QueryGenesByInterval => "query_genes_by_interval",
            Self::GetMygeneMetadata => "get_mygene_metadata",
            Self::GetAvailableFields => "get_available_fields",
            Self::GetSpeciesList => "get_species_list",
            Self::QueryGenesByExpression => "query_genes_by_expression",
            Self::GetGeneExpressionProfile => "get_gene_expression_profile",
            Self::QueryGenesByPathway => "query_genes_by_pathway",
            Self::GetGenePathways => "get_gene_pathways",
            Self::QueryGenesByGoTerm => "query_genes_by_go_term",
            Self::GetGeneGoAnnotations => "get_gene_go_annotations",
            Self::GetGeneOrthologs => "get_gene_orthologs",
            Self::QueryHomologousGenes => "query_homologous_genes",
            Self::QueryGenesByDisease => "query_genes_by_disease",
            Self::GetGeneDiseaseAssociations => "get_gene_disease_associations",
            Self::GetGeneVariants => "get_gene_variants",
            Self::QueryGenesByVariant => "query_genes_by_variant",
            Self::QueryGenesByChemical => "query_genes_by_chemical",
            Self::GetGeneChemicalInteractions => "get_gene_chemical_interactions",
            Self::BuildComplexQuery => "build_complex_query",
            Self::QueryWithFilters => "query_with_filters",
            Self::ExportGeneList => "export_gene_list",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::QueryGenes => {
                "Search for genes using various query types (symbol, name, wildcards, etc.)"
            }
            Self::SearchByField => {
                "Search genes by specific field values combined with AND or OR"
            }
            Self::GetFieldStatistics => {
                "Get value counts and percentages for a field across all genes"
            }
            Self::GetGeneAnnotation => {
                "Get detailed annotation for a specific gene by ID (Entrez or Ensembl)"
            }
            Self::QueryGenesBatch => "Query multiple genes in a single request (up to 1000)",
            Self::GetGenesBatch => "Get full annotations for multiple genes (up to 1000)",
            Self::QueryGenesByInterval => {
                "Find genes in a genomic region by chromosome position (end must be >= start)"
            }
            Self::GetMygeneMetadata => {
                "Get metadata about MyGene.info API including data sources and statistics"
            }
            Self::GetAvailableFields => "Get a list of all available fields in MyGene.info",
            Self::GetSpeciesList => "Get supported species with taxonomy IDs and gene counts",
            Self::QueryGenesByExpression => {
                "Find genes based on expression patterns in tissues or cell types"
            }
            Self::GetGeneExpressionProfile => {
                "Get comprehensive expression profile for a gene across tissues and datasets"
            }
            Self::QueryGenesByPathway => "Find genes involved in specific biological pathways",
            Self::GetGenePathways => "Get all pathways associated with a specific gene",
            Self::QueryGenesByGoTerm => {
                "Find genes associated with specific GO terms and evidence"
            }
            Self::GetGeneGoAnnotations => {
                "Get detailed GO annotations for a gene with evidence codes"
            }
            Self::GetGeneOrthologs => "Get orthologous genes across different species",
            Self::QueryHomologousGenes => {
                "Find homologous genes with the same symbol across species"
            }
            Self::QueryGenesByDisease => "Find genes associated with specific diseases",
            Self::GetGeneDiseaseAssociations => {
                "Get all disease associations for a specific gene"
            }
            Self::GetGeneVariants => {
                "Get genetic variants associated with a gene from ClinVar and other sources"
            }
            Self::QueryGenesByVariant => {
                "Find genes with variants by clinical significance, type, phenotype or effect"
            }
            Self::QueryGenesByChemical => {
                "Find genes that interact with specific chemicals or drugs"
            }
            Self::GetGeneChemicalInteractions => {
                "Get all chemical/drug interactions for a specific gene"
            }
            Self::BuildComplexQuery => {
                "Build complex boolean queries with must/should/must_not clauses"
            }
            Self::QueryWithFilters => "Query genes with multiple predefined filters",
            Self::ExportGeneList => "Export gene data in various formats (TSV, CSV, JSON, XML)",
        }
    }

    pub fn input_schema(self) -> JsonObject {
        match self {
            Self::QueryGenes => schema::<query::QueryRequest>(),
            Self::SearchByField => schema::<query::FieldSearchRequest>(),
            Self::GetFieldStatistics => schema::<query::FieldStatisticsRequest>(),
            Self::GetGeneAnnotation => schema::<annotation::AnnotationRequest>(),
            Self::QueryGenesBatch => schema::<batch::BatchQueryRequest>(),
            Self::GetGenesBatch => schema::<batch::BatchGetRequest>(),
            Self::QueryGenesByInterval => schema::<interval::IntervalRequest>(),
            Self::GetMygeneMetadata | Self::GetAvailableFields | Self::GetSpeciesList => {
                empty_schema()
            }
            Self::QueryGenesByExpression => schema::<expression::ExpressionSearchRequest>(),
            Self::GetGeneExpressionProfile => schema::<expression::ExpressionProfileRequest>(),
            Self::QueryGenesByPathway => schema::<pathway::PathwaySearchRequest>(),
            Self::GetGenePathways => schema::<pathway::GenePathwaysRequest>(),
            Self::QueryGenesByGoTerm => schema::<go::GoSearchRequest>(),
            Self::GetGeneGoAnnotations => schema::<go::GoAnnotationsRequest>(),
            Self::GetGeneOrthologs => schema::<homology::OrthologsRequest>(),
            Self::QueryHomologousGenes => schema::<homology::HomologousGenesRequest>(),
            Self::QueryGenesByDisease => schema::<disease::DiseaseSearchRequest>(),
            Self::GetGeneDiseaseAssociations => schema::<disease::DiseaseAssociationsRequest>(),
            Self::GetGeneVariants => schema::<variant::GeneVariantsRequest>(),
            Self::QueryGenesByVariant => schema::<variant::VariantSearchRequest>(),
            Self::QueryGenesByChemical => schema::<chemical::ChemicalSearchRequest>(),
            Self::GetGeneChemicalInteractions => {
                schema::<chemical::ChemicalInteractionsRequest>()
            }
            Self::BuildComplexQuery => schema::<advanced::ComplexQueryRequest>(),
            Self::QueryWithFilters => schema::<advanced::FilteredQueryRequest>(),
            Self::ExportGeneList => schema::<export::ExportRequest>(),
        }
    }

    /// Deserialize `args` into the tool's request type, run it and return
    /// the serialized result.
    pub async fn invoke(self, client: &MyGeneClient, args: Value) -> Result<Value, MyGeneError> {
        let args = match args {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };

        match self {
            Self::QueryGenes => respond(query::query(client, &parse(args)?).await?),
            Self::SearchByField => respond(query::search_by_field(client, &parse(args)?).await?),
            Self::GetFieldStatistics => {
                respond(query::field_statistics(client, &parse(args)?).await?)
            }
            Self::GetGeneAnnotation => {
                respond(annotation::get_annotation(client, &parse(args)?).await?)
            }
            Self::QueryGenesBatch => respond(batch::query_batch(client, &parse(args)?).await?),
            Self::GetGenesBatch => respond(batch::get_batch(client, &parse(args)?).await?),
            Self::QueryGenesByInterval => {
                respond(interval::query_interval(client, &parse(args)?).await?)
            }
            Self::GetMygeneMetadata => respond(metadata::get_metadata(client).await?),
            Self::GetAvailableFields => respond(metadata::list_fields(client).await?),
            Self::GetSpeciesList => respond(metadata::list_species(client).await?),
            Self::QueryGenesByExpression => {
                respond(expression::search(client, &parse(args)?).await?)
            }
            Self::GetGeneExpressionProfile => {
                respond(expression::profile(client, &parse(args)?).await?)
            }
            Self::QueryGenesByPathway => respond(pathway::search(client, &parse(args)?).await?),
            Self::GetGenePathways => {
                respond(pathway::gene_pathways(client, &parse(args)?).await?)
            }
            Self::QueryGenesByGoTerm => respond(go::search(client, &parse(args)?).await?),
            Self::GetGeneGoAnnotations => {
                respond(go::gene_annotations(client, &parse(args)?).await?)
            }
            Self::GetGeneOrthologs => respond(homology::orthologs(client, &parse(args)?).await?),
            Self::QueryHomologousGenes => {
                respond(homology::homologous_genes(client, &parse(args)?).await?)
            }
            Self::QueryGenesByDisease => respond(disease::search(client, &parse(args)?).await?),
            Self::GetGeneDiseaseAssociations => {
                respond(disease::associations(client, &parse(args)?).await?)
            }
            Self::GetGeneVariants => {
                respond(variant::gene_variants(client, &parse(args)?).await?)
            }
            Self::QueryGenesByVariant => respond(variant::search(client, &parse(args)?).await?),
            Self::QueryGenesByChemical => {
                respond(chemical::search(client, &parse(args)?).await?)
            }
            Self::GetGeneChemicalInteractions => {
                respond(chemical::interactions(client, &parse(args)?).await?)
            }
            Self::BuildComplexQuery => {
                respond(advanced::complex_query(client, &parse(args)?).await?)
            }
            Self::QueryWithFilters => {
                respond(advanced::filtered_query(client, &parse(args)?).await?)
            }
            Self::ExportGeneList => respond(export::export(client, &parse(args)?).await?),
        }
    }
}

fn parse<T: DeserializeOwned>(args: Value) -> Result<T, MyGeneError> {
    serde_json::from_value(args).map_err(|err| MyGeneError::InvalidArgument(err.to_string()))
}

fn respond<T: Serialize>(result: T) -> Result<Value, MyGeneError> {
    Ok(serde_json::to_value(result)?)
}

fn schema<T: schemars::JsonSchema>() -> JsonObject {
    match serde_json::to_value(schemars::schema_for!(T)) {
        Ok(Value::Object(map)) => map,
        _ => empty_schema(),
    }
}

fn empty_schema() -> JsonObject {
    let mut map = Map::new();
    map.insert("type".into(), Value::String("object".into()));
    map.insert("properties".into(), Value::Object(Map::new()));
    map
}

/// Checks that every tool name is unique and resolves back to its variant.
pub fn validate_registry() -> Result<(), MyGeneError> {
    let mut seen = HashSet::new();
    for tool in ToolName::ALL {
        let name = tool.as_str();
        if !seen.insert(name) || ToolName::from_name(name) != Some(tool) {
            return Err(MyGeneError::UnknownMethod(name.to_string()));
        }
    }
    Ok(())
}

/// Runs one tool call and returns either its result or an error envelope
/// `{error, message, tool_name}`.
pub async fn call_tool(client: &MyGeneClient, name: &str, args: Value) -> Value {
    info!(tool = name, "Handling call for tool");

    let result = match ToolName::from_name(name) {
        Some(tool) => tool.invoke(client, args).await,
        None => {
            warn!(tool = name, "Unknown tool requested");
            Err(MyGeneError::UnknownTool(name.to_string()))
        }
    };

    match result {
        Ok(value) => value,
        Err(err) => {
            warn!(tool = name, kind = err.kind(), error = %err, "Tool call failed");
            json!({
                "error": err.kind(),
                "message": err.to_string(),
                "tool_name": name,
            })
        }
    }
}
