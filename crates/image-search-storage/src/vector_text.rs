//! pgvector text representation: `[0.1,0.2,0.3]`.
//!
//! Vectors are bound and read as text and cast in SQL (`$1::text::vector`,
//! `embedding::text`), which keeps the driver free of a pgvector type.

use crate::error::StorageError;

/// Format values as a pgvector literal.
pub fn format_vector(values: &[f32]) -> String {
    let mut out = String::with_capacity(values.len() * 12 + 2);
    out.push('[');
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&v.to_string());
    }
    out.push(']');
    out
}

/// Parse a pgvector literal, rejecting empty vectors and non-finite values.
pub fn parse_vector(text: &str) -> Result<Vec<f32>, StorageError> {
    let inner = text
        .trim()
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| StorageError::MalformedVector(format!("missing brackets in '{}'", text)))?;

    if inner.trim().is_empty() {
        return Err(StorageError::MalformedVector("empty vector".into()));
    }

    inner
        .split(',')
        .map(|part| {
            let part = part.trim();
            match part.parse::<f32>() {
                Ok(v) if v.is_finite() => Ok(v),
                Ok(_) => Err(StorageError::MalformedVector(format!(
                    "non-finite component '{}'",
                    part
                ))),
                Err(e) => Err(StorageError::MalformedVector(format!(
                    "component '{}': {}",
                    part, e
                ))),
            }
        })
        .collect()
}
