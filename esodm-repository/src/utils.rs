//! Utility functions for building and reading client parameters.

use serde_json::Value;

use crate::errors::SearchIndexError;
use crate::interfaces::ClientParams;

/// Name of the concrete index a document type lives in.
///
/// Each document type gets its own index: `{index}-{doc_type}`.
///
/// # Example
///
/// ```
/// use esodm_repository::utils::physical_index_name;
///
/// assert_eq!(physical_index_name("shop", "product"), "shop-product");
/// ```
pub fn physical_index_name(index: &str, doc_type: &str) -> String {
    format!("{}-{}", index, doc_type)
}

/// Merge caller overrides into base parameters. Overrides win.
pub fn merge_params(mut base: ClientParams, overrides: ClientParams) -> ClientParams {
    for (key, value) in overrides {
        base.insert(key, value);
    }
    base
}

/// Read a required string parameter.
pub fn required_str<'a>(params: &'a ClientParams, key: &str) -> Result<&'a str, SearchIndexError> {
    params
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| SearchIndexError::validation(format!("Missing string parameter '{}'", key)))
}

/// Resolve the concrete indices a request targets.
///
/// `index` is required. `type` may be absent (the index itself is
/// targeted), a string, or an array of strings (one index per type).
pub fn resolve_indices(params: &ClientParams) -> Result<Vec<String>, SearchIndexError> {
    let index = required_str(params, "index")?;

    match params.get("type") {
        None | Some(Value::Null) => Ok(vec![index.to_string()]),
        Some(Value::String(doc_type)) => Ok(vec![physical_index_name(index, doc_type)]),
        Some(Value::Array(types)) if types.is_empty() => Ok(vec![index.to_string()]),
        Some(Value::Array(types)) => types
            .iter()
            .map(|t| {
                t.as_str()
                    .map(|doc_type| physical_index_name(index, doc_type))
                    .ok_or_else(|| {
                        SearchIndexError::validation("Parameter 'type' must hold strings")
                    })
            })
            .collect(),
        Some(_) => Err(SearchIndexError::validation(
            "Parameter 'type' must be a string or an array of strings",
        )),
    }
}

/// Resolve the single concrete index of a document-level request.
pub fn resolve_single_index(params: &ClientParams) -> Result<String, SearchIndexError> {
    let mut indices = resolve_indices(params)?;
    match indices.len() {
        1 => Ok(indices.remove(0)),
        n => Err(SearchIndexError::validation(format!(
            "Document requests target exactly one type, got {}",
            n
        ))),
    }
}

/// Read the document id parameter. Numbers are accepted and stringified.
pub fn document_id(params: &ClientParams) -> Result<String, SearchIndexError> {
    match params.get("id") {
        Some(Value::String(id)) => Ok(id.clone()),
        Some(Value::Number(id)) => Ok(id.to_string()),
        _ => Err(SearchIndexError::validation("Missing parameter 'id'")),
    }
}
