//! Lucene query-string building blocks and the ordered parameter list sent to `/query`.

/// Ordered `key=value` pairs for a MyGene GET request.
///
/// Only keys that were explicitly pushed are sent; nothing is defaulted here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct QueryParams(Vec<(&'static str, String)>);

impl QueryParams {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_query(q: impl Into<String>) -> Self {
        let mut params = Self::new();
        params.push("q", q.into());
        params
    }

    pub(crate) fn push(&mut self, key: &'static str, value: impl ToString) -> &mut Self {
        self.0.push((key, value.to_string()));
        self
    }

    pub(crate) fn push_opt<V: ToString>(
        &mut self,
        key: &'static str,
        value: Option<V>,
    ) -> &mut Self {
        if let Some(value) = value {
            self.push(key, value);
        }
        self
    }

    /// Pushes a string value only when it is present and non-blank.
    pub(crate) fn push_non_empty(&mut self, key: &'static str, value: Option<&str>) -> &mut Self {
        if let Some(value) = present(value) {
            self.push(key, value);
        }
        self
    }

    pub(crate) fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub(crate) fn as_pairs(&self) -> &[(&'static str, String)] {
        &self.0
    }
}

/// Trimmed argument value, or `None` when absent or blank.
pub(crate) fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Escapes the two characters that would terminate or corrupt a quoted phrase.
pub(crate) fn escape_phrase(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '"') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// `field:"value"`
pub(crate) fn phrase(field: &str, value: &str) -> String {
    format!("{field}:\"{}\"", escape_phrase(value))
}

/// `(a OR b OR c)`
pub(crate) fn any_of(clauses: &[String]) -> String {
    format!("({})", clauses.join(" OR "))
}

/// `(a AND b)`
pub(crate) fn all_of(clauses: &[String]) -> String {
    format!("({})", clauses.join(" AND "))
}

/// `_exists_:a OR _exists_:b`, the fallback for a search with no selectors.
pub(crate) fn exists_any(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|f| format!("_exists_:{f}"))
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// One phrase clause per field, OR-ed and parenthesized.
pub(crate) fn phrase_any_field(fields: &[&str], value: &str) -> String {
    let clauses = fields
        .iter()
        .map(|field| phrase(field, value))
        .collect::<Vec<_>>();
    any_of(&clauses)
}

pub(crate) fn join_and(parts: &[String]) -> String {
    parts.join(" AND ")
}

/// Returns the field for the first prefix that `id` starts with.
///
/// Tables are checked in order and the first match wins; this is exact
/// string-prefix matching, not longest-prefix.
pub(crate) fn route_by_prefix<'a>(
    id: &str,
    table: &'a [(&'a str, &'a str)],
) -> Option<(&'a str, &'a str)> {
    table
        .iter()
        .find(|(prefix, _)| id.starts_with(prefix))
        .map(|(prefix, field)| (*prefix, *field))
}
