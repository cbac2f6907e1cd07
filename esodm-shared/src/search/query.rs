//! Query clauses.

use serde_json::{json, Value};

/// A query clause added to a [`Search`](super::Search).
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Query-string syntax, optionally scoped to a default field. The query
    /// text is passed through unescaped.
    QueryString {
        query: String,
        default_field: Option<String>,
    },
    /// Exact term match on a field.
    Term { field: String, value: Value },
    /// Analyzed match on a field.
    Match { field: String, query: String },
    /// Matches every document.
    MatchAll,
}

impl Query {
    /// Query-string clause over `default_field`.
    pub fn query_string(query: impl Into<String>, default_field: impl Into<String>) -> Self {
        Query::QueryString {
            query: query.into(),
            default_field: Some(default_field.into()),
        }
    }

    /// Query-string clause that matches any of `values` in `field`.
    ///
    /// Values are joined with ` OR `, so `["best", "worst"]` on `group`
    /// means `group:(best OR worst)`.
    pub fn any_of<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = values
            .into_iter()
            .map(|v| v.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(" OR ");
        Self::query_string(joined, field)
    }

    pub fn term(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Query::Term {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matching(field: impl Into<String>, query: impl Into<String>) -> Self {
        Query::Match {
            field: field.into(),
            query: query.into(),
        }
    }

    /// Request body fragment for this clause.
    pub fn to_json(&self) -> Value {
        match self {
            Query::QueryString {
                query,
                default_field,
            } => {
                let mut body = json!({ "query": query });
                if let Some(field) = default_field {
                    body["default_field"] = json!(field);
                }
                json!({ "query_string": body })
            }
            Query::Term { field, value } => json!({ "term": { field.as_str(): value } }),
            Query::Match { field, query } => {
                json!({ "match": { field.as_str(): { "query": query } } })
            }
            Query::MatchAll => json!({ "match_all": {} }),
        }
    }
}
