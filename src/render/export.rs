//! Text renderings of fetched gene records for `export_gene_list`.

use serde_json::Value;

use crate::error::MyGeneError;
use crate::transform::lookup_path;

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Header row of field names, then one row per gene.
///
/// Dotted field names are walked through nested objects; anything missing
/// renders as an empty cell.
pub(crate) fn delimited(
    genes: &[Value],
    fields: &[String],
    delimiter: u8,
) -> Result<String, MyGeneError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(fields)?;
    for gene in genes {
        writer.write_record(fields.iter().map(|field| cell(lookup_path(gene, field))))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| MyGeneError::Export(err.into_error().into()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Minimal XML document with one `<gene>` element per record.
///
/// Fields are looked up as top-level keys only and values are written
/// without escaping.
pub(crate) fn xml(genes: &[Value], fields: &[String]) -> String {
    let mut lines = vec![
        r#"<?xml version="1.0" encoding="UTF-8"?>"#.to_string(),
        "<genes>".to_string(),
    ];
    for gene in genes {
        lines.push("  <gene>".to_string());
        for field in fields {
            let value = cell(gene.get(field.as_str()));
            lines.push(format!("    <{field}>{value}</{field}>"));
        }
        lines.push("  </gene>".to_string());
    }
    lines.push("</genes>".to_string());
    lines.join("\n")
}
