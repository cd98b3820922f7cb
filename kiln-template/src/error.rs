//! Error types for kiln-template.

use std::error::Error as _;

use thiserror::Error;

/// All errors that can arise from path-template parsing or evaluation.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The template text is not valid tera syntax.
    #[error("unable to parse path_template {template:?}: {message}")]
    Parse { template: String, message: String },

    /// The template references a field or filter argument that cannot be
    /// resolved for this requirement.
    #[error("unable to evaluate path_template {template:?}: {message}")]
    Evaluate { template: String, message: String },
}

/// Flatten a tera error and its sources into one line.
///
/// Tera keeps the useful part ("Variable `x` not found…") in the source chain,
/// not in the top-level message.
pub(crate) fn describe(err: &tera::Error) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(inner) = source {
        parts.push(inner.to_string());
        source = inner.source();
    }
    parts.join(": ")
}
